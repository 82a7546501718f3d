//! Mock 总线实现
//!
//! 用于测试的内存总线。句柄内部使用 `Arc<Mutex<_>>`，克隆后的句柄共享同一队列，
//! 因此可以在适配器被驱动持有后继续注入帧、检查已发送帧。

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{BusError, BusFrame, CanAdapter, RegisterBus};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// 模拟 CAN 适配器
#[derive(Debug, Clone, Default)]
pub struct MockCanAdapter {
    receive_queue: Arc<Mutex<VecDeque<BusFrame>>>,
    sent_frames: Arc<Mutex<Vec<BusFrame>>>,
    bus_off: Arc<Mutex<bool>>,
}

impl MockCanAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注入一帧（硬件 -> 控制器）
    pub fn queue_frame(&self, frame: BusFrame) {
        lock(&self.receive_queue).push_back(frame);
    }

    /// 取出所有已发送帧（控制器 -> 硬件）
    pub fn take_sent_frames(&self) -> Vec<BusFrame> {
        std::mem::take(&mut *lock(&self.sent_frames))
    }

    /// 模拟总线关闭
    pub fn simulate_bus_off(&self, enable: bool) {
        *lock(&self.bus_off) = enable;
    }

    pub fn pending_rx(&self) -> usize {
        lock(&self.receive_queue).len()
    }
}

impl CanAdapter for MockCanAdapter {
    fn send(&mut self, frame: BusFrame) -> Result<(), BusError> {
        if *lock(&self.bus_off) {
            return Err(BusError::BusOff);
        }
        lock(&self.sent_frames).push(frame);
        Ok(())
    }

    fn receive(&mut self) -> Result<BusFrame, BusError> {
        if *lock(&self.bus_off) {
            return Err(BusError::BusOff);
        }
        lock(&self.receive_queue).pop_front().ok_or(BusError::Timeout)
    }
}

#[derive(Debug, Default)]
struct RegisterState {
    registers: HashMap<u8, u8>,
    writes: Vec<(u8, u8)>,
    truncate_reads_to: Option<usize>,
    nack: bool,
}

/// 模拟寄存器总线（单个设备地址）
#[derive(Debug, Clone)]
pub struct MockRegisterBus {
    address: u8,
    state: Arc<Mutex<RegisterState>>,
}

impl MockRegisterBus {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            state: Arc::new(Mutex::new(RegisterState::default())),
        }
    }

    /// 预置寄存器值
    pub fn set_register(&self, register: u8, value: u8) {
        lock(&self.state).registers.insert(register, value);
    }

    /// 预置从 `register` 开始的连续寄存器
    pub fn set_registers(&self, register: u8, values: &[u8]) {
        let mut state = lock(&self.state);
        for (offset, value) in values.iter().enumerate() {
            state
                .registers
                .insert(register.wrapping_add(offset as u8), *value);
        }
    }

    /// 已写入的 (寄存器, 值) 序列
    pub fn writes(&self) -> Vec<(u8, u8)> {
        lock(&self.state).writes.clone()
    }

    /// 模拟读取时设备只返回前 `len` 个字节
    pub fn truncate_reads_to(&self, len: Option<usize>) {
        lock(&self.state).truncate_reads_to = len;
    }

    /// 模拟设备无应答
    pub fn simulate_nack(&self, enable: bool) {
        lock(&self.state).nack = enable;
    }
}

impl RegisterBus for MockRegisterBus {
    fn write_register(&mut self, address: u8, register: u8, value: u8) -> Result<(), BusError> {
        let mut state = lock(&self.state);
        if state.nack || address != self.address {
            return Err(BusError::Nack { address });
        }
        state.registers.insert(register, value);
        state.writes.push((register, value));
        Ok(())
    }

    fn read_registers(
        &mut self,
        address: u8,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<(), BusError> {
        let state = lock(&self.state);
        if state.nack || address != self.address {
            return Err(BusError::Nack { address });
        }
        let available = state.truncate_reads_to.unwrap_or(buffer.len());
        if available < buffer.len() {
            return Err(BusError::ShortRead {
                expected: buffer.len(),
                received: available,
            });
        }
        for (offset, byte) in buffer.iter_mut().enumerate() {
            *byte = state
                .registers
                .get(&register.wrapping_add(offset as u8))
                .copied()
                .unwrap_or(0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_can_roundtrip() {
        let mut adapter = MockCanAdapter::new();
        let handle = adapter.clone();

        handle.queue_frame(BusFrame::new_standard(0x201, &[1, 2]));
        assert_eq!(adapter.receive().unwrap().id, 0x201);
        assert!(matches!(adapter.receive(), Err(BusError::Timeout)));

        adapter.send(BusFrame::new_standard(0x200, &[0; 8])).unwrap();
        assert_eq!(handle.take_sent_frames().len(), 1);
        assert!(handle.take_sent_frames().is_empty());
    }

    #[test]
    fn test_mock_can_bus_off() {
        let mut adapter = MockCanAdapter::new();
        adapter.simulate_bus_off(true);
        assert!(matches!(
            adapter.send(BusFrame::new_standard(0x200, &[])),
            Err(BusError::BusOff)
        ));
    }

    #[test]
    fn test_mock_register_bus() {
        let mut bus = MockRegisterBus::new(0x53);
        bus.set_registers(0x32, &[1, 2, 3]);

        let mut buf = [0u8; 3];
        bus.read_registers(0x53, 0x32, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);

        bus.write_register(0x53, 0x2D, 0x08).unwrap();
        assert_eq!(bus.read_register(0x53, 0x2D).unwrap(), 0x08);
        assert_eq!(bus.writes(), vec![(0x2D, 0x08)]);

        assert!(matches!(
            bus.read_register(0x1D, 0x00),
            Err(BusError::Nack { address: 0x1D })
        ));

        bus.truncate_reads_to(Some(2));
        assert!(matches!(
            bus.read_registers(0x53, 0x32, &mut buf),
            Err(BusError::ShortRead {
                expected: 3,
                received: 2
            })
        ));
    }
}
