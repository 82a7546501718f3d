//! ADXL345 / ADXL375 加速度计驱动
//!
//! 通过 [`RegisterBus`] 读写寄存器。灵敏度（g/LSB）由型号决定。

use gearbot_bus::RegisterBus;
use gearbot_protocol::{
    ADXL_DATA_LEN, ADXL_DEVICE_ID, ADXL_POWER_MEASURE, ADXL_REG_DATA_FORMAT, ADXL_REG_DATAX0,
    ADXL_REG_DEVID, ADXL_REG_POWER_CTL, AdxlModel, bytes_to_i16_le,
};
use tracing::{debug, error};

use crate::error::DriverError;

/// 三轴加速度（g）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Acceleration {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// 三轴原始读数（LSB）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawAcceleration {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl RawAcceleration {
    /// 解析 DATAX0..DATAZ1（每轴低字节在前）
    pub fn from_bytes(buffer: [u8; ADXL_DATA_LEN]) -> Self {
        Self {
            x: bytes_to_i16_le([buffer[0], buffer[1]]),
            y: bytes_to_i16_le([buffer[2], buffer[3]]),
            z: bytes_to_i16_le([buffer[4], buffer[5]]),
        }
    }
}

/// ADXL 加速度计
pub struct Adxl<B: RegisterBus> {
    bus: B,
    address: u8,
    model: AdxlModel,
    g_per_lsb: f64,
}

impl<B: RegisterBus> Adxl<B> {
    pub fn new(bus: B, address: u8, model: AdxlModel) -> Self {
        Self {
            bus,
            address,
            model,
            g_per_lsb: model.g_per_lsb(),
        }
    }

    /// 校验设备 ID 并开启测量
    pub fn begin(&mut self) -> Result<(), DriverError> {
        let device_id = self.bus.read_register(self.address, ADXL_REG_DEVID)?;
        if device_id != ADXL_DEVICE_ID {
            error!(
                "Could not find ADXL sensor at address 0x{:02X} (id 0x{:02X})",
                self.address, device_id
            );
            return Err(DriverError::DeviceIdMismatch {
                address: self.address,
                expected: ADXL_DEVICE_ID,
                found: device_id,
            });
        }

        self.bus
            .write_register(self.address, ADXL_REG_POWER_CTL, ADXL_POWER_MEASURE)?;
        self.bus
            .write_register(self.address, ADXL_REG_DATA_FORMAT, self.model.data_format())?;
        debug!("{:?} at 0x{:02X} started", self.model, self.address);
        Ok(())
    }

    /// 读取原始三轴数据
    ///
    /// 传输失败或字节不足时返回错误，不返回部分数据。
    pub fn read_raw(&mut self) -> Result<RawAcceleration, DriverError> {
        let mut buffer = [0u8; ADXL_DATA_LEN];
        self.bus
            .read_registers(self.address, ADXL_REG_DATAX0, &mut buffer)?;
        Ok(RawAcceleration::from_bytes(buffer))
    }

    /// 读取三轴加速度（g）
    pub fn read_acceleration(&mut self) -> Result<Acceleration, DriverError> {
        let raw = self.read_raw()?;
        Ok(Acceleration {
            x: f64::from(raw.x) * self.g_per_lsb,
            y: f64::from(raw.y) * self.g_per_lsb,
            z: f64::from(raw.z) * self.g_per_lsb,
        })
    }

    pub fn model(&self) -> AdxlModel {
        self.model
    }

    pub fn g_per_lsb(&self) -> f64 {
        self.g_per_lsb
    }

    pub fn address(&self) -> u8 {
        self.address
    }
}
