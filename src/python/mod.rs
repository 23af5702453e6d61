use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;

use crate::as5600::{status_to_scale, As5600};
use crate::i2c::{BusError, I2cBus};
use crate::mpu6050::Mpu6050;
use crate::pca9685::{Pca9685, CHANNEL_COUNT};

fn bus_err(err: BusError) -> PyErr{
    match err{
        BusError::OutOfRange(_) => PyValueError::new_err(err.to_string()),
        _ => PyIOError::new_err(err.to_string()),
    }
}

#[pyclass]
pub struct PyAs5600{
    inner: As5600<I2cBus>,
}

#[pymethods]
impl PyAs5600{
    #[new]
    fn new(path: &str) -> PyResult<Self>{
        Ok(PyAs5600{
            inner: As5600::open(path).map_err(bus_err)?,
        })
    }

    fn raw_angle(&mut self) -> PyResult<u16>{
        self.inner.raw_angle().map_err(bus_err)
    }

    fn angle(&mut self) -> PyResult<u16>{
        self.inner.angle().map_err(bus_err)
    }

    fn degrees(&mut self) -> PyResult<f32>{
        self.inner.degrees().map_err(bus_err)
    }

    fn status(&mut self) -> PyResult<u8>{
        self.inner.status().map_err(bus_err)
    }

    fn angle_with_status(&mut self) -> PyResult<(u16, u8)>{
        self.inner.angle_with_status().map_err(bus_err)
    }

    fn magnet_scale(&mut self) -> PyResult<i8>{
        self.inner.magnet_scale().map_err(bus_err)
    }

    fn gain(&mut self) -> PyResult<u8>{
        self.inner.gain().map_err(bus_err)
    }

    fn magnitude(&mut self) -> PyResult<u16>{
        self.inner.magnitude().map_err(bus_err)
    }

    fn zero_position(&mut self) -> PyResult<u16>{
        self.inner.zero_position().map_err(bus_err)
    }

    fn set_zero_position(&mut self, raw: u16) -> PyResult<()>{
        self.inner.set_zero_position(raw).map_err(bus_err)
    }
}

#[pyclass]
pub struct PyMpu6050{
    inner: Mpu6050<I2cBus>,
}

#[pymethods]
impl PyMpu6050{
    #[new]
    fn new(path: &str) -> PyResult<Self>{
        Ok(PyMpu6050{
            inner: Mpu6050::open(path).map_err(bus_err)?,
        })
    }

    fn acceleration_g(&mut self) -> PyResult<(f32, f32, f32)>{
        let v = self.inner.acceleration_g().map_err(bus_err)?;
        Ok((v.x, v.y, v.z))
    }

    fn acceleration_ms2(&mut self) -> PyResult<(f32, f32, f32)>{
        let v = self.inner.acceleration_ms2().map_err(bus_err)?;
        Ok((v.x, v.y, v.z))
    }

    fn angular_rate(&mut self) -> PyResult<(f32, f32, f32)>{
        let v = self.inner.angular_rate().map_err(bus_err)?;
        Ok((v.x, v.y, v.z))
    }

    fn temperature_c(&mut self) -> PyResult<f32>{
        self.inner.temperature_c().map_err(bus_err)
    }
}

#[pyclass]
pub struct PyPca9685{
    inner: Pca9685<I2cBus>,
}

#[pymethods]
impl PyPca9685{
    #[new]
    fn new(path: &str, address: u8) -> PyResult<Self>{
        Ok(PyPca9685{
            inner: Pca9685::open(path, address).map_err(bus_err)?,
        })
    }

    fn frequency(&self) -> f64{
        self.inner.frequency()
    }

    fn set_frequency(&mut self, freq_hz: f64) -> PyResult<()>{
        if freq_hz <= 0.0{
            return Err(PyValueError::new_err("frequency must be positive"));
        }
        self.inner.set_frequency(freq_hz).map_err(bus_err)
    }

    fn set_channel(&mut self, channel: u8, on: u16, off: u16) -> PyResult<()>{
        if channel >= CHANNEL_COUNT || on >= 4096 || off >= 4096{
            return Err(PyValueError::new_err("channel or tick count out of range"));
        }
        self.inner.set_channel(channel, on, off).map_err(bus_err)
    }

    fn set_pulse_ms(&mut self, channel: u8, ms: f64) -> PyResult<()>{
        if channel >= CHANNEL_COUNT{
            return Err(PyValueError::new_err("channel out of range"));
        }
        self.inner.set_pulse_ms(channel, ms).map_err(bus_err)
    }
}

//pure conversion exposed directly, no device needed
#[pyfunction]
fn magnet_status_to_scale(status: u8) -> i8{
    status_to_scale(status)
}

#[pymodule]
fn gimbal_hal(_py: Python<'_>, m: &PyModule) -> PyResult<()>{
    m.add_class::<PyAs5600>()?;
    m.add_class::<PyMpu6050>()?;
    m.add_class::<PyPca9685>()?;
    m.add_function(wrap_pyfunction!(magnet_status_to_scale, m)?)?;
    Ok(())
}
