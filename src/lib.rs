pub mod i2c;
pub mod as5600;
pub mod mpu6050;
pub mod pca9685;
pub mod ffi;

#[cfg(feature = "python")]
pub mod python;

pub use i2c::{BusError, BusResult, I2cBus, MockBus, RegisterBus};

pub use as5600::As5600;
pub use mpu6050::{AccelRange, DlpfBandwidth, GyroRange, Mpu6050, Vec3};
pub use pca9685::Pca9685;
