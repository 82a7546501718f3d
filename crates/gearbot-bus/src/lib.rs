//! # Gearbot Bus Adapter Layer
//!
//! 总线硬件抽象层：
//! - [`CanAdapter`]：CAN 帧收发（电调反馈/指令）
//! - [`RegisterBus`]：按地址读写寄存器（I2C 类外设，如加速度计）
//!
//! 具体的 SocketCAN / I2C 实现由上层应用提供；本 crate 只定义接口，
//! 并在 `mock` feature 下提供内存实现用于测试。

use std::time::Duration;
use thiserror::Error;

pub use gearbot_protocol::BusFrame;

#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "mock")]
pub use mock::{MockCanAdapter, MockRegisterBus};

/// 总线层统一错误类型
#[derive(Error, Debug)]
pub enum BusError {
    #[error("Read timeout")]
    Timeout,
    #[error("Bus off")]
    BusOff,
    #[error("Transaction to device 0x{address:02X} failed")]
    Nack { address: u8 },
    #[error("Short read: expected {expected} bytes, received {received}")]
    ShortRead { expected: usize, received: usize },
}

/// CAN 适配器
pub trait CanAdapter {
    fn send(&mut self, frame: BusFrame) -> Result<(), BusError>;
    fn receive(&mut self) -> Result<BusFrame, BusError>;
    fn set_receive_timeout(&mut self, _timeout: Duration) {}
    fn receive_timeout(&mut self, timeout: Duration) -> Result<BusFrame, BusError> {
        self.set_receive_timeout(timeout);
        self.receive()
    }
    /// 非阻塞接收；总线空闲时返回 `Ok(None)`
    fn try_receive(&mut self) -> Result<Option<BusFrame>, BusError> {
        match self.receive_timeout(Duration::ZERO) {
            Ok(frame) => Ok(Some(frame)),
            Err(BusError::Timeout) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// 寄存器总线（I2C 风格）
///
/// 实现必须保证：传输失败或字节数不足时返回错误，不返回部分数据。
pub trait RegisterBus {
    fn write_register(&mut self, address: u8, register: u8, value: u8) -> Result<(), BusError>;

    /// 从 `register` 开始连续读取 `buffer.len()` 个字节
    fn read_registers(
        &mut self,
        address: u8,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<(), BusError>;

    fn read_register(&mut self, address: u8, register: u8) -> Result<u8, BusError> {
        let mut value = [0u8; 1];
        self.read_registers(address, register, &mut value)?;
        Ok(value[0])
    }
}

impl<T: CanAdapter + ?Sized> CanAdapter for &mut T {
    fn send(&mut self, frame: BusFrame) -> Result<(), BusError> {
        (**self).send(frame)
    }
    fn receive(&mut self) -> Result<BusFrame, BusError> {
        (**self).receive()
    }
    fn set_receive_timeout(&mut self, timeout: Duration) {
        (**self).set_receive_timeout(timeout)
    }
    fn try_receive(&mut self) -> Result<Option<BusFrame>, BusError> {
        (**self).try_receive()
    }
}
