use crate::i2c::{BusResult, I2cBus, RegisterBus};

pub const MPU6050_ADDRESS: u8 = 0x68;

pub const GRAVITY_MS2: f32 = 9.80665;

//sleep bit in PWR_MGMT_1
const SLEEP_BIT: u8 = 0x40;

//range bits live in [4:3] of the config registers
const RANGE_MASK: u8 = 0x18;

//register map from the MPU-6050 register map rev 4.2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register{
    PwrMgmt1,
    DlpfConfig,
    GyroConfig,
    AccelConfig,
    AccelXOutH,
    AccelYOutH,
    AccelZOutH,
    TempOutH,
    GyroXOutH,
    GyroYOutH,
    GyroZOutH,
}

impl Register{
    pub fn addr(&self) -> u8{
        match self{
            Register::PwrMgmt1 => 0x6B,
            Register::DlpfConfig => 0x1A,
            Register::GyroConfig => 0x1B,
            Register::AccelConfig => 0x1C,
            Register::AccelXOutH => 0x3B,
            Register::AccelYOutH => 0x3D,
            Register::AccelZOutH => 0x3F,
            Register::TempOutH => 0x41,
            Register::GyroXOutH => 0x43,
            Register::GyroYOutH => 0x45,
            Register::GyroZOutH => 0x47,
        }
    }

    pub fn len(&self) -> usize{
        match self{
            Register::PwrMgmt1
            | Register::DlpfConfig
            | Register::GyroConfig
            | Register::AccelConfig => 1,
            _ => 2,
        }
    }
}

/// Accelerometer full-scale range and its counts-per-g scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccelRange{
    G2,
    G4,
    G8,
    G16,
}

impl AccelRange{
    pub fn bits(&self) -> u8{
        match self{
            AccelRange::G2 => 0x00,
            AccelRange::G4 => 0x08,
            AccelRange::G8 => 0x10,
            AccelRange::G16 => 0x18,
        }
    }

    pub fn from_bits(bits: u8) -> Self{
        match bits & RANGE_MASK{
            0x08 => AccelRange::G4,
            0x10 => AccelRange::G8,
            0x18 => AccelRange::G16,
            _ => AccelRange::G2,
        }
    }

    //LSB per g
    pub fn scale(&self) -> f32{
        match self{
            AccelRange::G2 => 16384.0,
            AccelRange::G4 => 8192.0,
            AccelRange::G8 => 4096.0,
            AccelRange::G16 => 2048.0,
        }
    }
}

/// Gyroscope full-scale range and its counts-per-(deg/s) scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GyroRange{
    Dps250,
    Dps500,
    Dps1000,
    Dps2000,
}

impl GyroRange{
    pub fn bits(&self) -> u8{
        match self{
            GyroRange::Dps250 => 0x00,
            GyroRange::Dps500 => 0x08,
            GyroRange::Dps1000 => 0x10,
            GyroRange::Dps2000 => 0x18,
        }
    }

    pub fn from_bits(bits: u8) -> Self{
        match bits & RANGE_MASK{
            0x08 => GyroRange::Dps500,
            0x10 => GyroRange::Dps1000,
            0x18 => GyroRange::Dps2000,
            _ => GyroRange::Dps250,
        }
    }

    //LSB per deg/s
    pub fn scale(&self) -> f32{
        match self{
            GyroRange::Dps250 => 131.0,
            GyroRange::Dps500 => 65.5,
            GyroRange::Dps1000 => 32.8,
            GyroRange::Dps2000 => 16.4,
        }
    }
}

/// Digital low-pass filter bandwidth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DlpfBandwidth{
    Hz256,
    Hz188,
    Hz98,
    Hz42,
    Hz20,
    Hz10,
    Hz5,
}

impl DlpfBandwidth{
    pub fn bits(&self) -> u8{
        match self{
            DlpfBandwidth::Hz256 => 0x00,
            DlpfBandwidth::Hz188 => 0x01,
            DlpfBandwidth::Hz98 => 0x02,
            DlpfBandwidth::Hz42 => 0x03,
            DlpfBandwidth::Hz20 => 0x04,
            DlpfBandwidth::Hz10 => 0x05,
            DlpfBandwidth::Hz5 => 0x06,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3{
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// MPU-6050 3-axis accelerometer + gyroscope.
///
/// Construction wakes the device (clears the sleep bit) so sampling
/// starts immediately. The configured full-scale range is re-read from
/// the device on every sample call rather than cached: a range change
/// between the axis reads and the range read is a documented hazard,
/// not something this driver hides.
pub struct Mpu6050<B: RegisterBus>{
    bus: B,
}

impl Mpu6050<I2cBus>{
    /// Open and wake the sensor on a Linux i2c-dev path.
    pub fn open(path: &str) -> BusResult<Self>{
        Mpu6050::new(I2cBus::open(path, MPU6050_ADDRESS)?)
    }

    pub fn close(&mut self) -> BusResult<()>{
        self.bus.close()
    }
}

impl<B: RegisterBus> Mpu6050<B>{
    pub fn new(bus: B) -> BusResult<Self>{
        let mut dev = Mpu6050{ bus };
        dev.wake()?;
        Ok(dev)
    }

    pub fn into_bus(self) -> B{
        self.bus
    }

    //clear the sleep bit so the device begins sampling
    pub fn wake(&mut self) -> BusResult<()>{
        self.bus.write_raw(&[Register::PwrMgmt1.addr(), 0x00])
    }

    pub fn sleep(&mut self) -> BusResult<()>{
        self.bus.write_register(Register::PwrMgmt1.addr(), SLEEP_BIT as u16, 1)
    }

    //big-endian 16-bit register, two's complement
    fn read_word(&mut self, reg: Register) -> BusResult<i16>{
        Ok(self.bus.read_register(reg.addr(), reg.len())? as i16)
    }

    /// Die temperature in degrees Celsius (datasheet formula).
    pub fn temperature_c(&mut self) -> BusResult<f32>{
        let raw = self.read_word(Register::TempOutH)?;
        Ok(raw as f32 / 340.0 + 36.53)
    }

    pub fn accel_range(&mut self) -> BusResult<AccelRange>{
        let bits = self.bus.read_register(Register::AccelConfig.addr(), 1)? as u8;
        Ok(AccelRange::from_bits(bits))
    }

    pub fn set_accel_range(&mut self, range: AccelRange) -> BusResult<()>{
        self.bus.write_register(Register::AccelConfig.addr(), range.bits() as u16, 1)
    }

    pub fn gyro_range(&mut self) -> BusResult<GyroRange>{
        let bits = self.bus.read_register(Register::GyroConfig.addr(), 1)? as u8;
        Ok(GyroRange::from_bits(bits))
    }

    pub fn set_gyro_range(&mut self, range: GyroRange) -> BusResult<()>{
        self.bus.write_register(Register::GyroConfig.addr(), range.bits() as u16, 1)
    }

    pub fn set_dlpf(&mut self, bandwidth: DlpfBandwidth) -> BusResult<()>{
        self.bus.write_register(Register::DlpfConfig.addr(), bandwidth.bits() as u16, 1)
    }

    /// Raw signed axis counts, no scaling applied.
    pub fn accel_raw(&mut self) -> BusResult<(i16, i16, i16)>{
        let x = self.read_word(Register::AccelXOutH)?;
        let y = self.read_word(Register::AccelYOutH)?;
        let z = self.read_word(Register::AccelZOutH)?;
        Ok((x, y, z))
    }

    pub fn gyro_raw(&mut self) -> BusResult<(i16, i16, i16)>{
        let x = self.read_word(Register::GyroXOutH)?;
        let y = self.read_word(Register::GyroYOutH)?;
        let z = self.read_word(Register::GyroZOutH)?;
        Ok((x, y, z))
    }

    /// Acceleration in g, scaled by the range currently configured in
    /// ACCEL_CONFIG. The range is read after the axis samples; each is
    /// its own transaction and the set is not atomic.
    pub fn acceleration_g(&mut self) -> BusResult<Vec3>{
        let (x, y, z) = self.accel_raw()?;
        let scale = self.accel_range()?.scale();
        Ok(Vec3{
            x: x as f32 / scale,
            y: y as f32 / scale,
            z: z as f32 / scale,
        })
    }

    /// Acceleration in m/s².
    pub fn acceleration_ms2(&mut self) -> BusResult<Vec3>{
        let g = self.acceleration_g()?;
        Ok(Vec3{
            x: g.x * GRAVITY_MS2,
            y: g.y * GRAVITY_MS2,
            z: g.z * GRAVITY_MS2,
        })
    }

    /// Angular rate in deg/s, scaled by the range currently configured
    /// in GYRO_CONFIG (read live on every call, never assumed).
    pub fn angular_rate(&mut self) -> BusResult<Vec3>{
        let (x, y, z) = self.gyro_raw()?;
        let scale = self.gyro_range()?.scale();
        Ok(Vec3{
            x: x as f32 / scale,
            y: y as f32 / scale,
            z: z as f32 / scale,
        })
    }
}
