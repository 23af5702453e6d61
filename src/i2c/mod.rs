pub mod mock;
pub use mock::MockBus;

use std::ffi::CString;
use std::fmt;
use std::io;
use std::os::unix::io::RawFd;

//register-select ioctl from linux/i2c-dev.h
const I2C_SLAVE: libc::c_ulong = 0x0703;

//largest register payload on any of our peripherals (16-bit, big-endian)
pub const RW_MAX: usize = 2;

#[derive(Debug)]
pub enum BusError{
    BusOpenFailed(io::Error),
    AddressSelectFailed(io::Error),
    WriteFailed(io::Error),
    ReadFailed(io::Error),
    ShortRead{ expected: usize, got: usize },
    NotOpen,
    //driver-level argument validation, reported instead of panicking
    OutOfRange(&'static str),
}

impl fmt::Display for BusError{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result{
        match self{
            BusError::BusOpenFailed(e) => write!(f, "failed to open bus device: {}", e),
            BusError::AddressSelectFailed(e) => write!(f, "peripheral did not accept address select: {}", e),
            BusError::WriteFailed(e) => write!(f, "bus write failed: {}", e),
            BusError::ReadFailed(e) => write!(f, "bus read failed: {}", e),
            BusError::ShortRead{ expected, got } =>
                write!(f, "short read: expected {} bytes, got {}", expected, got),
            BusError::NotOpen => write!(f, "operation on a closed bus handle"),
            BusError::OutOfRange(what) => write!(f, "value out of range: {}", what),
        }
    }
}

impl std::error::Error for BusError{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)>{
        match self{
            BusError::BusOpenFailed(e)
            | BusError::AddressSelectFailed(e)
            | BusError::WriteFailed(e)
            | BusError::ReadFailed(e) => Some(e),
            _ => None,
        }
    }
}

pub type BusResult<T> = Result<T, BusError>;

//seam the drivers talk through, so driver logic is testable against MockBus
pub trait RegisterBus{
    //select `reg`, then read exactly `len` bytes (1 or 2)
    //two-byte registers combine big-endian: (b0 << 8) | b1
    fn read_register(&mut self, reg: u8, len: usize) -> BusResult<u16>;

    //single contiguous write of [reg, hi?, lo]; for len == 1 only the low byte is sent
    fn write_register(&mut self, reg: u8, value: u16, len: usize) -> BusResult<()>;

    //escape hatch for register+payload shapes outside the single-value model
    fn write_raw(&mut self, bytes: &[u8]) -> BusResult<()>;
}

/// Handle to one peripheral on a Linux i2c-dev character device.
///
/// Bound to exactly one 7-bit address at open time; every subsequent
/// transfer implicitly targets that address. Single-owner, blocking,
/// no retries: every fault surfaces to the caller as a `BusError`.
pub struct I2cBus{
    fd: RawFd,
    address: u8,
    open: bool,
}

impl I2cBus{
    pub fn open(path: &str, address: u8) -> BusResult<Self>{
        let c_path = CString::new(path).map_err(|_|{
            BusError::BusOpenFailed(io::Error::new(
                io::ErrorKind::InvalidInput,
                "bus path contains a NUL byte",
            ))
        })?;

        let fd = unsafe{ libc::open(c_path.as_ptr(), libc::O_RDWR) };
        if fd < 0{
            return Err(BusError::BusOpenFailed(io::Error::last_os_error()));
        }

        if unsafe{ libc::ioctl(fd, I2C_SLAVE, address as libc::c_ulong) } < 0{
            let err = io::Error::last_os_error();
            unsafe{ libc::close(fd); }
            return Err(BusError::AddressSelectFailed(err));
        }

        Ok(I2cBus{ fd, address, open: true })
    }

    pub fn address(&self) -> u8{
        self.address
    }

    pub fn is_open(&self) -> bool{
        self.open
    }

    //explicit release; every later operation returns NotOpen
    pub fn close(&mut self) -> BusResult<()>{
        self.check_open()?;
        self.open = false;
        unsafe{ libc::close(self.fd); }
        Ok(())
    }

    fn check_open(&self) -> BusResult<()>{
        if self.open{
            Ok(())
        }else{
            Err(BusError::NotOpen)
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> BusResult<()>{
        let n = unsafe{
            libc::write(self.fd, bytes.as_ptr() as *const libc::c_void, bytes.len())
        };
        if n < 0{
            return Err(BusError::WriteFailed(io::Error::last_os_error()));
        }
        if n as usize != bytes.len(){
            return Err(BusError::WriteFailed(io::Error::new(
                io::ErrorKind::WriteZero,
                "partial bus write",
            )));
        }
        Ok(())
    }
}

impl RegisterBus for I2cBus{
    fn read_register(&mut self, reg: u8, len: usize) -> BusResult<u16>{
        assert!(len >= 1 && len <= RW_MAX, "register length must be 1 or 2");
        self.check_open()?;

        self.write_all(&[reg])?;

        let mut buf = [0u8; RW_MAX];
        let n = unsafe{ libc::read(self.fd, buf.as_mut_ptr() as *mut libc::c_void, len) };
        if n < 0{
            return Err(BusError::ReadFailed(io::Error::last_os_error()));
        }
        //a partial transfer is a hard error, never a truncated value
        if n as usize != len{
            return Err(BusError::ShortRead{ expected: len, got: n as usize });
        }

        if len == 1{
            Ok(buf[0] as u16)
        }else{
            Ok(((buf[0] as u16) << 8) | buf[1] as u16)
        }
    }

    fn write_register(&mut self, reg: u8, value: u16, len: usize) -> BusResult<()>{
        assert!(len >= 1 && len <= RW_MAX, "register length must be 1 or 2");
        self.check_open()?;

        //one underlying transfer, so the register write is atomic from our side
        if len == 1{
            self.write_all(&[reg, value as u8])
        }else{
            self.write_all(&[reg, (value >> 8) as u8, value as u8])
        }
    }

    fn write_raw(&mut self, bytes: &[u8]) -> BusResult<()>{
        self.check_open()?;
        self.write_all(bytes)
    }
}

impl Drop for I2cBus{
    fn drop(&mut self){
        if self.open{
            unsafe{ libc::close(self.fd); }
        }
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_closed_handle_reports_not_open(){
        //fd -1 is never touched because the open flag gates every call
        let mut bus = I2cBus{ fd: -1, address: 0x36, open: false };
        assert!(matches!(bus.read_register(0x0C, 2), Err(BusError::NotOpen)));
        assert!(matches!(bus.write_register(0x01, 0, 2), Err(BusError::NotOpen)));
        assert!(matches!(bus.write_raw(&[0xFF]), Err(BusError::NotOpen)));
        assert!(matches!(bus.close(), Err(BusError::NotOpen)));
    }

    #[test]
    fn test_open_missing_device_fails(){
        let result = I2cBus::open("/dev/i2c-no-such-bus", 0x36);
        assert!(matches!(result, Err(BusError::BusOpenFailed(_))));
    }

    #[test]
    fn test_error_display(){
        let err = BusError::ShortRead{ expected: 2, got: 1 };
        assert_eq!(err.to_string(), "short read: expected 2 bytes, got 1");
        assert_eq!(BusError::NotOpen.to_string(), "operation on a closed bus handle");
        assert_eq!(
            BusError::OutOfRange("channel out of range").to_string(),
            "value out of range: channel out of range"
        );
    }

    #[test]
    fn test_big_endian_combine_via_mock(){
        let mut bus = MockBus::new();
        bus.set_byte(0x0C, 0x0A);
        bus.set_byte(0x0D, 0xBC);
        assert_eq!(bus.read_register(0x0C, 2).unwrap(), 0x0ABC);
        assert_eq!(bus.read_register(0x0C, 1).unwrap(), 0x000A);
    }

    #[test]
    fn test_short_read_is_hard_error(){
        let mut bus = MockBus::new();
        bus.set_byte(0x0C, 0x12);
        bus.inject_short_read(0x0C, 1);
        match bus.read_register(0x0C, 2){
            Err(BusError::ShortRead{ expected, got }) =>{
                assert_eq!(expected, 2);
                assert_eq!(got, 1);
            }
            other => panic!("expected ShortRead, got {:?}", other.map(|_| ())),
        }
    }
}
