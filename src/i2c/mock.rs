use std::collections::HashMap;
use super::{BusError, BusResult, RegisterBus, RW_MAX};

//byte-addressed register memory standing in for a peripheral
//multi-byte registers live at consecutive addresses, high byte first,
//matching the auto-increment behaviour of the real devices
pub struct MockBus{
    memory: HashMap<u8, u8>,
    writes: Vec<(u8, u16, usize)>,   //register writes in issue order
    raw_writes: Vec<Vec<u8>>,        //write_raw frames in issue order
    short_read: Option<(u8, usize)>, //(register, bytes actually delivered)
}

impl MockBus{
    pub fn new() -> Self{
        MockBus{
            memory: HashMap::new(),
            writes: Vec::new(),
            raw_writes: Vec::new(),
            short_read: None,
        }
    }

    pub fn set_byte(&mut self, addr: u8, value: u8){
        self.memory.insert(addr, value);
    }

    //preload a 16-bit register, high byte at `addr`
    pub fn set_word(&mut self, addr: u8, value: u16){
        self.memory.insert(addr, (value >> 8) as u8);
        self.memory.insert(addr.wrapping_add(1), value as u8);
    }

    pub fn byte(&self, addr: u8) -> u8{
        *self.memory.get(&addr).unwrap_or(&0)
    }

    pub fn word(&self, addr: u8) -> u16{
        ((self.byte(addr) as u16) << 8) | self.byte(addr.wrapping_add(1)) as u16
    }

    //the next read of `reg` returns only `got` bytes
    pub fn inject_short_read(&mut self, reg: u8, got: usize){
        self.short_read = Some((reg, got));
    }

    pub fn writes(&self) -> &[(u8, u16, usize)]{
        &self.writes
    }

    pub fn raw_writes(&self) -> &[Vec<u8>]{
        &self.raw_writes
    }

    pub fn clear_writes(&mut self){
        self.writes.clear();
        self.raw_writes.clear();
    }
}

impl Default for MockBus{
    fn default() -> Self{
        MockBus::new()
    }
}

impl RegisterBus for MockBus{
    fn read_register(&mut self, reg: u8, len: usize) -> BusResult<u16>{
        assert!(len >= 1 && len <= RW_MAX, "register length must be 1 or 2");

        if let Some((short_reg, got)) = self.short_read{
            if short_reg == reg && got < len{
                self.short_read = None;
                return Err(BusError::ShortRead{ expected: len, got });
            }
        }

        if len == 1{
            Ok(self.byte(reg) as u16)
        }else{
            Ok(self.word(reg))
        }
    }

    fn write_register(&mut self, reg: u8, value: u16, len: usize) -> BusResult<()>{
        assert!(len >= 1 && len <= RW_MAX, "register length must be 1 or 2");

        self.writes.push((reg, value, len));
        if len == 1{
            self.memory.insert(reg, value as u8);
        }else{
            self.memory.insert(reg, (value >> 8) as u8);
            self.memory.insert(reg.wrapping_add(1), value as u8);
        }
        Ok(())
    }

    fn write_raw(&mut self, bytes: &[u8]) -> BusResult<()>{
        //first byte selects the register, the rest land at consecutive addresses
        if let Some((&reg, payload)) = bytes.split_first(){
            for (i, &b) in payload.iter().enumerate(){
                self.memory.insert(reg.wrapping_add(i as u8), b);
            }
        }
        self.raw_writes.push(bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_writes_are_recorded_in_order(){
        let mut bus = MockBus::new();
        bus.write_register(0x00, 0x10, 1).unwrap();
        bus.write_register(0xFE, 121, 1).unwrap();
        bus.write_register(0x01, 0x0ABC, 2).unwrap();
        assert_eq!(bus.writes(), &[(0x00, 0x10, 1), (0xFE, 121, 1), (0x01, 0x0ABC, 2)]);
        assert_eq!(bus.byte(0xFE), 121);
        assert_eq!(bus.word(0x01), 0x0ABC);
    }

    #[test]
    fn test_raw_write_lands_at_consecutive_addresses(){
        let mut bus = MockBus::new();
        bus.write_raw(&[0x6B, 0x00, 0x42]).unwrap();
        assert_eq!(bus.byte(0x6B), 0x00);
        assert_eq!(bus.byte(0x6C), 0x42);
        assert_eq!(bus.raw_writes().len(), 1);
    }

    #[test]
    fn test_short_read_injection_fires_once(){
        let mut bus = MockBus::new();
        bus.set_word(0x0C, 0x0123);
        bus.inject_short_read(0x0C, 0);
        assert!(matches!(
            bus.read_register(0x0C, 2),
            Err(BusError::ShortRead{ expected: 2, got: 0 })
        ));
        //next read goes through
        assert_eq!(bus.read_register(0x0C, 2).unwrap(), 0x0123);
    }
}
