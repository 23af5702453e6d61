/**
 * PCA9685 Servo Sweep Demo
 *
 * Brings up the PWM controller, sets 50Hz, then sweeps a servo
 * between 1.0ms and 2.0ms pulse widths.
 *
 * Usage: servo_sweep [bus] [address] [channel]
 * Default: /dev/i2c-1, 0x40, 0
 */

use gimbal_hal::Pca9685;
use std::thread;
use std::time::Duration;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let bus = args.get(1).map(|s| s.as_str()).unwrap_or("/dev/i2c-1");
    let address: u8 = args.get(2)
        .and_then(|s| u8::from_str_radix(s.trim_start_matches("0x"), 16).ok())
        .unwrap_or(0x40);
    let channel: u8 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(0);

    println!("==============================================");
    println!("  Gimbal-HAL Servo Sweep");
    println!("==============================================");
    println!("  Bus:     {}", bus);
    println!("  Address: 0x{:02X}", address);
    println!("  Channel: {}", channel);
    println!("==============================================\n");

    let mut pca = match Pca9685::open(bus, address) {
        Ok(pca) => pca,
        Err(e) => {
            eprintln!("Failed to open PCA9685: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = pca.set_frequency(50.0) {
        eprintln!("Failed to set frequency: {}", e);
        std::process::exit(1);
    }
    println!("[PWM] Frequency set to {:.1} Hz\n", pca.frequency());

    println!("Sweeping 1.0ms -> 2.0ms -> 1.0ms (ctrl-c to stop)\n");

    loop {
        for step in (10..=20).chain((10..20).rev()) {
            let ms = step as f64 / 10.0;
            if let Err(e) = pca.set_pulse_ms(channel, ms) {
                eprintln!("[PWM] Write failed: {}", e);
                std::process::exit(1);
            }
            println!("[PWM] pulse = {:.1} ms", ms);
            thread::sleep(Duration::from_millis(200));
        }
    }
}
