use std::ffi::{c_char, CStr};
use std::ptr;

use crate::as5600::As5600;
use crate::i2c::{BusError, I2cBus};
use crate::mpu6050::Mpu6050;
use crate::pca9685::Pca9685;

//status codes shared by every accessor:
//0 ok, -1 null/invalid argument, -2 bus error

pub struct GimbalAs5600{
    inner: As5600<I2cBus>,
}

pub struct GimbalMpu6050{
    inner: Mpu6050<I2cBus>,
}

pub struct GimbalPca9685{
    inner: Pca9685<I2cBus>,
}

unsafe fn path_from_c<'a>(path: *const c_char) -> Option<&'a str>{
    if path.is_null(){
        return None;
    }
    unsafe{ CStr::from_ptr(path).to_str().ok() }
}

#[no_mangle]
pub unsafe extern "C" fn gimbal_as5600_open(path: *const c_char) -> *mut GimbalAs5600{
    let path = match unsafe{ path_from_c(path) }{
        Some(p) => p,
        None => return ptr::null_mut(),
    };

    match As5600::open(path){
        Ok(inner) => Box::into_raw(Box::new(GimbalAs5600{ inner })),
        Err(_) => ptr::null_mut(),
    }
}

#[no_mangle]
pub unsafe extern "C" fn gimbal_as5600_free(dev: *mut GimbalAs5600){
    if !dev.is_null(){
        unsafe{ drop(Box::from_raw(dev)); }
    }
}

#[no_mangle]
pub unsafe extern "C" fn gimbal_as5600_raw_angle(dev: *mut GimbalAs5600, out: *mut u16) -> i32{
    if dev.is_null() || out.is_null(){
        return -1;
    }

    unsafe{
        let d = &mut *dev;
        match d.inner.raw_angle(){
            Ok(raw) =>{
                *out = raw;
                0
            }
            Err(_) => -2,
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn gimbal_as5600_degrees(dev: *mut GimbalAs5600, out: *mut f32) -> i32{
    if dev.is_null() || out.is_null(){
        return -1;
    }

    unsafe{
        let d = &mut *dev;
        match d.inner.degrees(){
            Ok(degrees) =>{
                *out = degrees;
                0
            }
            Err(_) => -2,
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn gimbal_as5600_angle_with_status(
    dev: *mut GimbalAs5600,
    out_raw: *mut u16,
    out_status: *mut u8,
) -> i32{
    if dev.is_null() || out_raw.is_null() || out_status.is_null(){
        return -1;
    }

    unsafe{
        let d = &mut *dev;
        match d.inner.angle_with_status(){
            Ok((raw, status)) =>{
                *out_raw = raw;
                *out_status = status;
                0
            }
            Err(_) => -2,
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn gimbal_as5600_magnet_scale(dev: *mut GimbalAs5600, out: *mut i8) -> i32{
    if dev.is_null() || out.is_null(){
        return -1;
    }

    unsafe{
        let d = &mut *dev;
        match d.inner.magnet_scale(){
            Ok(scale) =>{
                *out = scale;
                0
            }
            Err(_) => -2,
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn gimbal_mpu6050_open(path: *const c_char) -> *mut GimbalMpu6050{
    let path = match unsafe{ path_from_c(path) }{
        Some(p) => p,
        None => return ptr::null_mut(),
    };

    match Mpu6050::open(path){
        Ok(inner) => Box::into_raw(Box::new(GimbalMpu6050{ inner })),
        Err(_) => ptr::null_mut(),
    }
}

#[no_mangle]
pub unsafe extern "C" fn gimbal_mpu6050_free(dev: *mut GimbalMpu6050){
    if !dev.is_null(){
        unsafe{ drop(Box::from_raw(dev)); }
    }
}

//in_g != 0 leaves the result in g, otherwise m/s²
#[no_mangle]
pub unsafe extern "C" fn gimbal_mpu6050_accel(
    dev: *mut GimbalMpu6050,
    out_x: *mut f32,
    out_y: *mut f32,
    out_z: *mut f32,
    in_g: i32,
) -> i32{
    if dev.is_null() || out_x.is_null() || out_y.is_null() || out_z.is_null(){
        return -1;
    }

    unsafe{
        let d = &mut *dev;
        let sample = if in_g != 0{
            d.inner.acceleration_g()
        }else{
            d.inner.acceleration_ms2()
        };
        match sample{
            Ok(v) =>{
                *out_x = v.x;
                *out_y = v.y;
                *out_z = v.z;
                0
            }
            Err(_) => -2,
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn gimbal_mpu6050_gyro(
    dev: *mut GimbalMpu6050,
    out_x: *mut f32,
    out_y: *mut f32,
    out_z: *mut f32,
) -> i32{
    if dev.is_null() || out_x.is_null() || out_y.is_null() || out_z.is_null(){
        return -1;
    }

    unsafe{
        let d = &mut *dev;
        match d.inner.angular_rate(){
            Ok(v) =>{
                *out_x = v.x;
                *out_y = v.y;
                *out_z = v.z;
                0
            }
            Err(_) => -2,
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn gimbal_mpu6050_temperature(dev: *mut GimbalMpu6050, out: *mut f32) -> i32{
    if dev.is_null() || out.is_null(){
        return -1;
    }

    unsafe{
        let d = &mut *dev;
        match d.inner.temperature_c(){
            Ok(t) =>{
                *out = t;
                0
            }
            Err(_) => -2,
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn gimbal_pca9685_open(path: *const c_char, address: u8) -> *mut GimbalPca9685{
    let path = match unsafe{ path_from_c(path) }{
        Some(p) => p,
        None => return ptr::null_mut(),
    };

    match Pca9685::open(path, address){
        Ok(inner) => Box::into_raw(Box::new(GimbalPca9685{ inner })),
        Err(_) => ptr::null_mut(),
    }
}

#[no_mangle]
pub unsafe extern "C" fn gimbal_pca9685_free(dev: *mut GimbalPca9685){
    if !dev.is_null(){
        unsafe{ drop(Box::from_raw(dev)); }
    }
}

#[no_mangle]
pub unsafe extern "C" fn gimbal_pca9685_set_frequency(dev: *mut GimbalPca9685, freq_hz: f64) -> i32{
    if dev.is_null(){
        return -1;
    }
    if !(freq_hz > 0.0){
        return -1;
    }

    unsafe{
        let d = &mut *dev;
        match d.inner.set_frequency(freq_hz){
            Ok(()) => 0,
            Err(BusError::OutOfRange(_)) => -1,
            Err(_) => -2,
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn gimbal_pca9685_set_channel(
    dev: *mut GimbalPca9685,
    channel: u8,
    on: u16,
    off: u16,
) -> i32{
    if channel >= crate::pca9685::CHANNEL_COUNT || on >= 4096 || off >= 4096{
        return -1;
    }
    if dev.is_null(){
        return -1;
    }

    unsafe{
        let d = &mut *dev;
        match d.inner.set_channel(channel, on, off){
            Ok(()) => 0,
            Err(BusError::OutOfRange(_)) => -1,
            Err(_) => -2,
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn gimbal_pca9685_set_pulse_ms(
    dev: *mut GimbalPca9685,
    channel: u8,
    ms: f64,
) -> i32{
    if channel >= crate::pca9685::CHANNEL_COUNT{
        return -1;
    }
    if dev.is_null(){
        return -1;
    }

    unsafe{
        let d = &mut *dev;
        //an over-long or negative pulse is an argument error, not a bus fault
        match d.inner.set_pulse_ms(channel, ms){
            Ok(()) => 0,
            Err(BusError::OutOfRange(_)) => -1,
            Err(_) => -2,
        }
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_ffi_null_device_is_rejected(){
        let mut raw: u16 = 0;
        let mut status: u8 = 0;
        let mut degrees: f32 = 0.0;
        unsafe{
            assert_eq!(gimbal_as5600_raw_angle(ptr::null_mut(), &mut raw), -1);
            assert_eq!(gimbal_as5600_degrees(ptr::null_mut(), &mut degrees), -1);
            assert_eq!(
                gimbal_as5600_angle_with_status(ptr::null_mut(), &mut raw, &mut status),
                -1
            );
            assert_eq!(gimbal_pca9685_set_frequency(ptr::null_mut(), 50.0), -1);
        }
    }

    #[test]
    fn test_ffi_null_out_pointer_is_rejected(){
        let mut x: f32 = 0.0;
        unsafe{
            assert_eq!(
                gimbal_mpu6050_accel(ptr::null_mut(), &mut x, &mut x, ptr::null_mut(), 1),
                -1
            );
            assert_eq!(gimbal_mpu6050_temperature(ptr::null_mut(), ptr::null_mut()), -1);
        }
    }

    #[test]
    fn test_ffi_free_null_is_harmless(){
        unsafe{
            gimbal_as5600_free(ptr::null_mut());
            gimbal_mpu6050_free(ptr::null_mut());
            gimbal_pca9685_free(ptr::null_mut());
        }
    }

    #[test]
    fn test_ffi_open_with_null_path_fails(){
        unsafe{
            assert!(gimbal_as5600_open(ptr::null()).is_null());
            assert!(gimbal_mpu6050_open(ptr::null()).is_null());
            assert!(gimbal_pca9685_open(ptr::null(), 0x40).is_null());
        }
    }

    #[test]
    fn test_ffi_channel_and_tick_bounds(){
        unsafe{
            //bounds are rejected before the device pointer is touched
            assert_eq!(gimbal_pca9685_set_channel(ptr::null_mut(), 16, 0, 0), -1);
            assert_eq!(gimbal_pca9685_set_channel(ptr::null_mut(), 0, 4096, 0), -1);
            assert_eq!(gimbal_pca9685_set_pulse_ms(ptr::null_mut(), 16, 1.5), -1);
            assert_eq!(gimbal_pca9685_set_frequency(ptr::null_mut(), 0.0), -1);
        }
    }
}
