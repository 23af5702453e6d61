use std::thread;
use std::time::Duration;

use crate::i2c::{BusError, BusResult, I2cBus, RegisterBus};

//registers
pub const MODE1: u8 = 0x00;
pub const MODE2: u8 = 0x01;
pub const SUBADR1: u8 = 0x02;
pub const SUBADR2: u8 = 0x03;
pub const SUBADR3: u8 = 0x04;
pub const LED0_ON_L: u8 = 0x06;
pub const LED0_ON_H: u8 = 0x07;
pub const LED0_OFF_L: u8 = 0x08;
pub const LED0_OFF_H: u8 = 0x09;
pub const ALL_LED_ON_L: u8 = 0xFA;
pub const ALL_LED_ON_H: u8 = 0xFB;
pub const ALL_LED_OFF_L: u8 = 0xFC;
pub const ALL_LED_OFF_H: u8 = 0xFD;
pub const PRESCALE: u8 = 0xFE;

//MODE1 bits
pub const RESTART: u8 = 0x80;
pub const SLEEP: u8 = 0x10;
pub const ALLCALL: u8 = 0x01;

//MODE2 bits
pub const INVRT: u8 = 0x10;
pub const OUTDRV: u8 = 0x04;

pub const CHANNEL_COUNT: u8 = 16;

//12-bit on/off counters, 4096 ticks per PWM period
pub const TICKS_PER_PERIOD: u16 = 4096;

//internal oscillator the prescaler divides down
pub const OSC_CLOCK_HZ: f64 = 25_000_000.0;

//hardware limits on the prescale register; they bound the achievable
//output frequency to roughly 24Hz..1526Hz
pub const PRESCALE_MIN: u8 = 3;
pub const PRESCALE_MAX: u8 = 255;

//the prescaler must settle for ~5ms before outputs are valid again
const SETTLE: Duration = Duration::from_millis(5);

/// PCA9685 16-channel 12-bit PWM controller.
///
/// Owns the target output frequency alongside the bus handle; the
/// frequency only changes through `set_frequency`, which drives the
/// hardware-mandated sleep -> reconfigure -> restart sequence.
pub struct Pca9685<B: RegisterBus>{
    bus: B,
    frequency: f64,
}

impl Pca9685<I2cBus>{
    /// Open and bring up the controller on a Linux i2c-dev path.
    /// The 7-bit address is caller-supplied (commonly 0x40).
    pub fn open(path: &str, address: u8) -> BusResult<Self>{
        Pca9685::new(I2cBus::open(path, address)?)
    }

    pub fn close(&mut self) -> BusResult<()>{
        self.bus.close()
    }
}

impl<B: RegisterBus> Pca9685<B>{
    /// Bring-up sequence: silence every channel before enabling the
    /// output drivers, then wake. Reordering this glitches the outputs
    /// on power-up.
    pub fn new(bus: B) -> BusResult<Self>{
        let mut pca = Pca9685{ bus, frequency: 0.0 };

        pca.set_all_channels(0, 0)?;
        pca.write_byte(MODE2, OUTDRV)?;
        pca.write_byte(MODE1, ALLCALL)?;
        thread::sleep(SETTLE);

        let mode1 = pca.read_byte(MODE1)?;
        pca.write_byte(MODE1, mode1 & !SLEEP)?;
        thread::sleep(SETTLE);

        //derive the output frequency from whatever prescale the device
        //currently holds, so set_pulse_ms works before any set_frequency
        let prescale = pca.read_byte(PRESCALE)?;
        pca.frequency = OSC_CLOCK_HZ / TICKS_PER_PERIOD as f64 / (prescale as f64 + 1.0);

        Ok(pca)
    }

    pub fn into_bus(self) -> B{
        self.bus
    }

    /// Configured output frequency in Hz.
    pub fn frequency(&self) -> f64{
        self.frequency
    }

    fn read_byte(&mut self, reg: u8) -> BusResult<u8>{
        Ok(self.bus.read_register(reg, 1)? as u8)
    }

    fn write_byte(&mut self, reg: u8, value: u8) -> BusResult<()>{
        self.bus.write_register(reg, value as u16, 1)
    }

    /// Set one channel's 12-bit on/off counters. `on` is the tick the
    /// output rises, `off` the tick it falls, within a 4096-tick period.
    /// Channel or tick values outside the hardware range are rejected
    /// with `OutOfRange` before anything is written.
    pub fn set_channel(&mut self, channel: u8, on: u16, off: u16) -> BusResult<()>{
        if channel >= CHANNEL_COUNT{
            return Err(BusError::OutOfRange("channel out of range"));
        }
        if on >= TICKS_PER_PERIOD || off >= TICKS_PER_PERIOD{
            return Err(BusError::OutOfRange("tick count out of range"));
        }

        let offset = 4 * channel;
        self.write_byte(LED0_ON_L + offset, on as u8)?;
        self.write_byte(LED0_ON_H + offset, (on >> 8) as u8)?;
        self.write_byte(LED0_OFF_L + offset, off as u8)?;
        self.write_byte(LED0_OFF_H + offset, (off >> 8) as u8)
    }

    /// Same as `set_channel` but against the broadcast register block.
    pub fn set_all_channels(&mut self, on: u16, off: u16) -> BusResult<()>{
        if on >= TICKS_PER_PERIOD || off >= TICKS_PER_PERIOD{
            return Err(BusError::OutOfRange("tick count out of range"));
        }

        self.write_byte(ALL_LED_ON_L, on as u8)?;
        self.write_byte(ALL_LED_ON_H, (on >> 8) as u8)?;
        self.write_byte(ALL_LED_OFF_L, off as u8)?;
        self.write_byte(ALL_LED_OFF_H, (off >> 8) as u8)
    }

    /// Reprogram the oscillator prescaler for a target frequency in Hz.
    ///
    /// `prescale = round(25MHz / 4096 / freq - 1)`; 50Hz gives 121.
    /// Targets whose prescale falls outside the hardware's 3..=255
    /// register range are rejected with `OutOfRange`; the stored
    /// frequency only changes once the device accepted the new
    /// prescale, so a failed call never skews later pulse math.
    pub fn set_frequency(&mut self, freq_hz: f64) -> BusResult<()>{
        if !freq_hz.is_finite() || freq_hz <= 0.0{
            return Err(BusError::OutOfRange("frequency must be positive"));
        }

        let prescale = (OSC_CLOCK_HZ / TICKS_PER_PERIOD as f64 / freq_hz - 1.0).round();
        if prescale < PRESCALE_MIN as f64 || prescale > PRESCALE_MAX as f64{
            return Err(BusError::OutOfRange("frequency outside the achievable prescale range"));
        }

        self.write_prescale_asleep(prescale as u8)?;
        self.frequency = freq_hz;
        Ok(())
    }

    pub fn prescale(&mut self) -> BusResult<u8>{
        self.read_byte(PRESCALE)
    }

    //the hardware state machine for prescale changes:
    //awake -> asleep -> write prescale -> restore mode -> settle -> restart
    //PRESCALE is only writable while the SLEEP bit is set, so this is the
    //single place that touches it
    fn write_prescale_asleep(&mut self, prescale: u8) -> BusResult<()>{
        let old_mode = self.read_byte(MODE1)?;
        //restart must not be set while entering sleep
        let sleep_mode = (old_mode & 0x7F) | SLEEP;

        self.write_byte(MODE1, sleep_mode)?;
        self.write_byte(PRESCALE, prescale)?;
        self.write_byte(MODE1, old_mode)?;
        thread::sleep(SETTLE);
        self.write_byte(MODE1, old_mode | RESTART)
    }

    /// Drive a leading-edge pulse of `ms` milliseconds on a channel:
    /// on at tick 0, off at `round(ms * 4096 / period_ms)`.
    /// A pulse that does not fit the configured period (or a negative
    /// width) is rejected with `OutOfRange` rather than wrapped.
    pub fn set_pulse_ms(&mut self, channel: u8, ms: f64) -> BusResult<()>{
        let period_ms = 1000.0 / self.frequency;
        let ticks_per_ms = TICKS_PER_PERIOD as f64 / period_ms;
        let off = (ms * ticks_per_ms).round();
        if !(off >= 0.0 && off < TICKS_PER_PERIOD as f64){
            return Err(BusError::OutOfRange("pulse width does not fit the PWM period"));
        }
        self.set_channel(channel, 0, off as u16)
    }
}

#[cfg(test)]
mod tests{
    use super::*;
    use crate::i2c::MockBus;

    fn device_at_50hz() -> Pca9685<MockBus>{
        let mut pca = Pca9685::new(MockBus::new()).unwrap();
        pca.set_frequency(50.0).unwrap();
        pca.bus.clear_writes();
        pca
    }

    #[test]
    fn test_bring_up_silences_outputs_before_drive_enable(){
        let pca = Pca9685::new(MockBus::new()).unwrap();
        let writes = pca.bus.writes();
        //all four broadcast counters zeroed first
        assert_eq!(
            &writes[..4],
            &[
                (ALL_LED_ON_L, 0, 1),
                (ALL_LED_ON_H, 0, 1),
                (ALL_LED_OFF_L, 0, 1),
                (ALL_LED_OFF_H, 0, 1),
            ]
        );
        //then output-driver mode, then all-call, then sleep cleared
        assert_eq!(writes[4], (MODE2, OUTDRV as u16, 1));
        assert_eq!(writes[5], (MODE1, ALLCALL as u16, 1));
        assert_eq!(writes[6], (MODE1, ALLCALL as u16, 1)); //sleep bit already clear
    }

    #[test]
    fn test_prescale_for_50hz_is_121(){
        let mut pca = device_at_50hz();
        assert_eq!(pca.prescale().unwrap(), 121);
        assert!((pca.frequency() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_frequency_change_goes_through_sleep_sequence(){
        let mut pca = Pca9685::new(MockBus::new()).unwrap();
        pca.bus.clear_writes();
        pca.set_frequency(50.0).unwrap();

        let mode = ALLCALL as u16; //mode restored by bring-up
        assert_eq!(
            pca.bus.writes(),
            &[
                (MODE1, mode | SLEEP as u16, 1), //asleep, restart masked off
                (PRESCALE, 121, 1),              //reconfigure while asleep
                (MODE1, mode, 1),                //original mode restored
                (MODE1, mode | RESTART as u16, 1),
            ]
        );
    }

    #[test]
    fn test_set_channel_targets_channel_block(){
        let mut pca = device_at_50hz();
        pca.set_channel(3, 0x0123, 0x0456).unwrap();
        assert_eq!(
            pca.bus.writes(),
            &[
                (LED0_ON_L + 12, 0x23, 1),
                (LED0_ON_H + 12, 0x01, 1),
                (LED0_OFF_L + 12, 0x56, 1),
                (LED0_OFF_H + 12, 0x04, 1),
            ]
        );
    }

    #[test]
    fn test_pulse_ms_at_50hz(){
        //1.5ms at 50Hz (20ms period) is round(1.5 * 4096 / 20) = 307 ticks
        let mut pca = device_at_50hz();
        pca.set_pulse_ms(0, 1.5).unwrap();
        assert_eq!(
            pca.bus.writes(),
            &[
                (LED0_ON_L, 0, 1),
                (LED0_ON_H, 0, 1),
                (LED0_OFF_L, 307 & 0xFF, 1),
                (LED0_OFF_H, 307 >> 8, 1),
            ]
        );
    }

    #[test]
    fn test_frequency_derived_from_existing_prescale(){
        let mut bus = MockBus::new();
        bus.set_byte(PRESCALE, 121);
        let pca = Pca9685::new(bus).unwrap();
        //25MHz / 4096 / (121 + 1) = 50.03Hz
        assert!((pca.frequency() - 50.03).abs() < 0.01, "got {}", pca.frequency());
    }

    #[test]
    fn test_channel_and_tick_bounds_are_errors(){
        let mut pca = device_at_50hz();
        assert!(matches!(pca.set_channel(16, 0, 0), Err(BusError::OutOfRange(_))));
        assert!(matches!(pca.set_channel(0, 4096, 0), Err(BusError::OutOfRange(_))));
        assert!(matches!(pca.set_all_channels(0, 4096), Err(BusError::OutOfRange(_))));
        //nothing reached the bus
        assert!(pca.bus.writes().is_empty());
    }

    #[test]
    fn test_pulse_longer_than_period_is_rejected(){
        //25ms cannot fit a 20ms period: error, not a panic or a wrap
        let mut pca = device_at_50hz();
        assert!(matches!(pca.set_pulse_ms(0, 25.0), Err(BusError::OutOfRange(_))));
        assert!(matches!(pca.set_pulse_ms(0, -1.5), Err(BusError::OutOfRange(_))));
        assert!(pca.bus.writes().is_empty());

        //the longest pulse that still fits goes through
        pca.set_pulse_ms(0, 19.99).unwrap();
        assert_eq!(pca.bus.writes()[2], (LED0_OFF_L, 4094 & 0xFF, 1));
    }

    #[test]
    fn test_unachievable_frequency_is_rejected(){
        let mut pca = device_at_50hz();
        for freq in [0.0, -5.0, f64::NAN, 10.0, 10_000.0]{
            assert!(
                matches!(pca.set_frequency(freq), Err(BusError::OutOfRange(_))),
                "freq {} accepted",
                freq
            );
        }
        //failed calls leave the stored frequency untouched
        assert!((pca.frequency() - 50.0).abs() < 1e-9);
        assert!(pca.bus.writes().is_empty());

        //both ends of the prescale range are reachable
        pca.set_frequency(24.0).unwrap();  //prescale 253
        pca.set_frequency(1500.0).unwrap(); //prescale 3
    }
}
