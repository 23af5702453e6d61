pub mod angle;
pub use angle::*;

use crate::i2c::{BusResult, I2cBus, RegisterBus};

pub const AS5600_ADDRESS: u8 = 0x36;

//12-bit raw angle space, mapped onto 0-360 degrees
pub const FULL_SCALE: u16 = 4096;

//burn command codes; see As5600::burn_angle / burn_settings
pub const BURN_ANGLE_CMD: u8 = 0x80;
pub const BURN_SETTINGS_CMD: u8 = 0x40;

//register map: address and byte length are fixed per entry so a driver
//call can never pair an address with the wrong transfer size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register{
    Zmco,
    Zpos,
    Mpos,
    Mang,
    Conf,
    Status,
    RawAngle,
    Angle,
    Agc,
    Magnitude,
    Burn,
}

impl Register{
    pub fn addr(&self) -> u8{
        match self{
            Register::Zmco => 0x00,
            Register::Zpos => 0x01,
            Register::Mpos => 0x03,
            Register::Mang => 0x05,
            Register::Conf => 0x07,
            Register::Status => 0x0B,
            Register::RawAngle => 0x0C,
            Register::Angle => 0x0E,
            Register::Agc => 0x1A,
            Register::Magnitude => 0x1B,
            Register::Burn => 0xFF,
        }
    }

    pub fn len(&self) -> usize{
        match self{
            Register::Zmco | Register::Status | Register::Agc | Register::Burn => 1,
            _ => 2,
        }
    }
}

/// AS5600 magnetic rotary angle sensor.
///
/// Every accessor is a fresh bus transaction against live hardware;
/// nothing is cached. Reads of different registers are separate
/// transfers, so a value pair taken with two calls can tear.
pub struct As5600<B: RegisterBus>{
    bus: B,
}

impl As5600<I2cBus>{
    /// Open the sensor on a Linux i2c-dev path, e.g. `/dev/i2c-1`.
    pub fn open(path: &str) -> BusResult<Self>{
        Ok(As5600{ bus: I2cBus::open(path, AS5600_ADDRESS)? })
    }

    pub fn close(&mut self) -> BusResult<()>{
        self.bus.close()
    }
}

impl<B: RegisterBus> As5600<B>{
    pub fn new(bus: B) -> Self{
        As5600{ bus }
    }

    pub fn into_bus(self) -> B{
        self.bus
    }

    fn read(&mut self, reg: Register) -> BusResult<u16>{
        self.bus.read_register(reg.addr(), reg.len())
    }

    fn write(&mut self, reg: Register, value: u16) -> BusResult<()>{
        self.bus.write_register(reg.addr(), value, reg.len())
    }

    /// How many times the zero position has been burned (0-3).
    pub fn zero_position_burns(&mut self) -> BusResult<u8>{
        Ok(self.read(Register::Zmco)? as u8)
    }

    pub fn zero_position(&mut self) -> BusResult<u16>{
        self.read(Register::Zpos)
    }

    pub fn set_zero_position(&mut self, raw: u16) -> BusResult<()>{
        self.write(Register::Zpos, raw)
    }

    pub fn max_position(&mut self) -> BusResult<u16>{
        self.read(Register::Mpos)
    }

    pub fn set_max_position(&mut self, raw: u16) -> BusResult<()>{
        self.write(Register::Mpos, raw)
    }

    pub fn max_angle(&mut self) -> BusResult<u16>{
        self.read(Register::Mang)
    }

    pub fn set_max_angle(&mut self, raw: u16) -> BusResult<()>{
        self.write(Register::Mang, raw)
    }

    pub fn config(&mut self) -> BusResult<u16>{
        self.read(Register::Conf)
    }

    pub fn set_config(&mut self, value: u16) -> BusResult<()>{
        self.write(Register::Conf, value)
    }

    /// Unfiltered 12-bit angle count.
    pub fn raw_angle(&mut self) -> BusResult<u16>{
        self.read(Register::RawAngle)
    }

    /// Hysteresis/filter compensated 12-bit angle count.
    pub fn angle(&mut self) -> BusResult<u16>{
        self.read(Register::Angle)
    }

    pub fn status(&mut self) -> BusResult<u8>{
        Ok(self.read(Register::Status)? as u8)
    }

    /// Automatic gain control value.
    pub fn gain(&mut self) -> BusResult<u8>{
        Ok(self.read(Register::Agc)? as u8)
    }

    pub fn magnitude(&mut self) -> BusResult<u16>{
        self.read(Register::Magnitude)
    }

    /// Angle and magnet status sampled back-to-back.
    ///
    /// Still two bus transactions, so a magnet moving between them can
    /// leave the pair inconsistent; this accessor just keeps the window
    /// as small as the transport allows.
    pub fn angle_with_status(&mut self) -> BusResult<(u16, u8)>{
        let raw = self.raw_angle()?;
        let status = self.status()?;
        Ok((raw, status))
    }

    /// Signed magnet proximity scale in {-2, -1, 0, 1, 2}, decoded from
    /// the live status register on every call.
    pub fn magnet_scale(&mut self) -> BusResult<i8>{
        Ok(status_to_scale(self.status()?))
    }

    /// Compensated angle as full-circle degrees (zpos 0, mpos 4096).
    pub fn degrees(&mut self) -> BusResult<f32>{
        Ok(raw_to_degrees_f32(self.angle()?, 0, FULL_SCALE))
    }

    /// Permanently burn the current zero/max position into the sensor's
    /// non-volatile memory.
    ///
    /// One-way and count-limited: the hardware allows at most three
    /// burns, and `zero_position_burns` reports how many are used up.
    /// There is no undo.
    pub fn burn_angle(&mut self) -> BusResult<()>{
        self.write(Register::Burn, BURN_ANGLE_CMD as u16)
    }

    /// Permanently burn the configuration registers. Same warnings as
    /// `burn_angle`: non-idempotent, hardware-limited, irreversible.
    pub fn burn_settings(&mut self) -> BusResult<()>{
        self.write(Register::Burn, BURN_SETTINGS_CMD as u16)
    }
}
