//! ADXL345 / ADXL375 加速度计寄存器表

/// 默认 I2C 地址（ALT ADDRESS 接地）
pub const ADXL_DEFAULT_ADDRESS: u8 = 0x53;

/// DEVID 寄存器
pub const ADXL_REG_DEVID: u8 = 0x00;
/// POWER_CTL 寄存器
pub const ADXL_REG_POWER_CTL: u8 = 0x2D;
/// DATA_FORMAT 寄存器
pub const ADXL_REG_DATA_FORMAT: u8 = 0x31;
/// DATAX0 寄存器（X0 X1 Y0 Y1 Z0 Z1 连续 6 字节）
pub const ADXL_REG_DATAX0: u8 = 0x32;

/// DEVID 期望值
pub const ADXL_DEVICE_ID: u8 = 0xE5;
/// POWER_CTL: Measure 位
pub const ADXL_POWER_MEASURE: u8 = 0x08;
/// DATA_FORMAT: FULL_RES + ±16g
pub const ADXL_DATA_FORMAT_FULL_RES: u8 = 0x0B;
/// 数据寄存器长度
pub const ADXL_DATA_LEN: usize = 6;

/// 加速度计型号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AdxlModel {
    /// ±16g，4 mg/LSB
    Adxl345,
    /// ±200g，约 49 mg/LSB
    Adxl375,
}

impl AdxlModel {
    /// 灵敏度（g/LSB）
    pub fn g_per_lsb(self) -> f64 {
        match self {
            AdxlModel::Adxl345 => 0.0040,
            AdxlModel::Adxl375 => 0.049,
        }
    }

    /// DATA_FORMAT 寄存器配置值
    pub fn data_format(self) -> u8 {
        match self {
            AdxlModel::Adxl345 => ADXL_DATA_FORMAT_FULL_RES,
            AdxlModel::Adxl375 => ADXL_DATA_FORMAT_FULL_RES,
        }
    }
}
