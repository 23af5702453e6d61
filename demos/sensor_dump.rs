/**
 * Sensor Dump Demo
 *
 * Reads the AS5600 angle sensor and MPU6050 IMU on one bus and
 * prints a line of physical-unit readings every 100ms.
 *
 * Usage: sensor_dump [bus] [seconds]
 * Default: /dev/i2c-1, 10
 */

use gimbal_hal::{As5600, Mpu6050};
use std::thread;
use std::time::{Duration, Instant};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let bus = args.get(1).map(|s| s.as_str()).unwrap_or("/dev/i2c-1");
    let seconds: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(10);

    println!("==============================================");
    println!("  Gimbal-HAL Sensor Dump");
    println!("==============================================");
    println!("  Bus:      {}", bus);
    println!("  Duration: {}s", seconds);
    println!("==============================================\n");

    // Each peripheral gets its own address-bound handle on the same bus
    let mut encoder = match As5600::open(bus) {
        Ok(dev) => dev,
        Err(e) => {
            eprintln!("Failed to open AS5600: {}", e);
            std::process::exit(1);
        }
    };

    let mut imu = match Mpu6050::open(bus) {
        Ok(dev) => dev,
        Err(e) => {
            eprintln!("Failed to open MPU6050: {}", e);
            std::process::exit(1);
        }
    };

    let start = Instant::now();

    while start.elapsed() < Duration::from_secs(seconds) {
        match encoder.angle_with_status() {
            Ok((raw, status)) => {
                let degrees = gimbal_hal::as5600::raw_to_degrees_f32(raw, 0, 4096);
                let scale = gimbal_hal::as5600::status_to_scale(status);
                println!("[ANGLE] raw={:4} deg={:6.1} magnet_scale={:+}", raw, degrees, scale);
            }
            Err(e) => eprintln!("[ANGLE] Read error: {}", e),
        }

        match imu.acceleration_ms2() {
            Ok(a) => println!("[ACCEL] x={:6.2} y={:6.2} z={:6.2} m/s²", a.x, a.y, a.z),
            Err(e) => eprintln!("[ACCEL] Read error: {}", e),
        }

        match imu.angular_rate() {
            Ok(w) => println!("[GYRO]  x={:7.2} y={:7.2} z={:7.2} °/s", w.x, w.y, w.z),
            Err(e) => eprintln!("[GYRO]  Read error: {}", e),
        }

        match imu.temperature_c() {
            Ok(t) => println!("[TEMP]  {:.2} °C\n", t),
            Err(e) => eprintln!("[TEMP]  Read error: {}\n", e),
        }

        thread::sleep(Duration::from_millis(100));
    }

    println!("Done.");
}
