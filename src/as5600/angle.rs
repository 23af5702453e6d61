//pure conversions between the 12-bit raw angle space and degrees

use super::FULL_SCALE;

//status register bits
pub const STATUS_MAGNET_HIGH: u8 = 0x40;     //magnet too close
pub const STATUS_MAGNET_DETECTED: u8 = 0x20;
pub const STATUS_MAGNET_LOW: u8 = 0x10;      //magnet too far

/// Derive the max-position register value from a zero position and an
/// angular range, reduced into the 12-bit raw angle space.
pub fn mpos_from_zpos_and_mang(zpos: u16, mang: u16) -> u16{
    (zpos as u32 + mang as u32) as u16 % FULL_SCALE
}

/// Map a raw 12-bit count into the angular span configured between
/// `zpos` and `mpos`, in whole degrees. Full-circle mapping needs
/// `zpos = 0, mpos = 4096`.
pub fn raw_to_degrees(raw: u16, zpos: u16, mpos: u16) -> u16{
    let span = mpos.wrapping_sub(zpos) as u32;
    (raw as u32 * span / (FULL_SCALE as u32 * FULL_SCALE as u32 / 360)) as u16
}

pub fn raw_to_degrees_f32(raw: u16, zpos: u16, mpos: u16) -> f32{
    let span = mpos.wrapping_sub(zpos) as f32;
    raw as f32 * span / (FULL_SCALE as f32 * FULL_SCALE as f32 / 360.0)
}

/// Degrees to raw 12-bit count, full-circle mapping. Input is reduced
/// modulo 360 before scaling, so 370 behaves like 10.
pub fn degrees_to_raw(degrees: u16) -> u16{
    let degrees = degrees % 360;
    (FULL_SCALE as u32 * degrees as u32 / 360) as u16
}

//float variant; % on floats follows the sign of the numerator, so a
//negative input reduces to a negative remainder and the final cast
//saturates it to raw 0 (-10 maps to 0, not to 350's count)
pub fn degrees_to_raw_f32(degrees: f32) -> u16{
    let degrees = degrees % 360.0;
    (FULL_SCALE as f32 * degrees / 360.0) as u16
}

/// Decode the magnet status bits into a signed proximity scale:
/// 2 means too close, -2 too far, +/-1 the same with the magnet still
/// detected, 0 neither. Qualitative only, recomputed from the live
/// status on every call.
pub fn status_to_scale(status: u8) -> i8{
    if status & STATUS_MAGNET_HIGH != 0{
        return if status & STATUS_MAGNET_DETECTED != 0{ 1 }else{ 2 };
    }
    if status & STATUS_MAGNET_LOW != 0{
        return if status & STATUS_MAGNET_DETECTED != 0{ -1 }else{ -2 };
    }
    0
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_mpos_wraps_into_full_scale(){
        assert_eq!(mpos_from_zpos_and_mang(0, 1024), 1024);
        assert_eq!(mpos_from_zpos_and_mang(4000, 200), 104);
        assert_eq!(mpos_from_zpos_and_mang(4095, 4095), 4094);
    }

    #[test]
    fn test_full_circle_round_trip(){
        //degrees_to_raw(raw_to_degrees(raw)) stays within rounding error
        for raw in 0..FULL_SCALE{
            let degrees = raw_to_degrees_f32(raw, 0, FULL_SCALE);
            let back = degrees_to_raw_f32(degrees);
            let diff = (back as i32 - raw as i32).abs();
            assert!(diff <= 1, "raw {} -> {}° -> {}", raw, degrees, back);
        }
    }

    #[test]
    fn test_raw_to_degrees_known_points(){
        assert_eq!(raw_to_degrees(0, 0, FULL_SCALE), 0);
        assert_eq!(raw_to_degrees(2048, 0, FULL_SCALE), 180);
        assert_eq!(raw_to_degrees(4095, 0, FULL_SCALE), 359);
    }

    #[test]
    fn test_raw_to_degrees_partial_span(){
        //half-range configuration rescales the count into half the circle
        let half = raw_to_degrees_f32(2048, 0, 2048);
        assert!((half - 90.0).abs() < 0.1, "got {}", half);
    }

    #[test]
    fn test_degrees_to_raw_modulo_reduction(){
        assert_eq!(degrees_to_raw(370), degrees_to_raw(10));
        assert_eq!(degrees_to_raw_f32(370.0), degrees_to_raw_f32(10.0));
        assert_eq!(degrees_to_raw(360), 0);
        assert_eq!(degrees_to_raw(90), 1024);
    }

    #[test]
    fn test_degrees_to_raw_f32_negative_saturates_to_zero(){
        //remainder keeps the numerator's sign; the u16 cast then
        //saturates every negative angle to 0
        assert_eq!(degrees_to_raw_f32(-10.0), 0);
        assert_eq!(degrees_to_raw_f32(-370.0), 0);
        assert_eq!(degrees_to_raw_f32(-0.0), 0);
    }

    #[test]
    fn test_status_scale_table(){
        assert_eq!(status_to_scale(STATUS_MAGNET_HIGH), 2);
        assert_eq!(status_to_scale(STATUS_MAGNET_HIGH | STATUS_MAGNET_DETECTED), 1);
        assert_eq!(status_to_scale(STATUS_MAGNET_LOW), -2);
        assert_eq!(status_to_scale(STATUS_MAGNET_LOW | STATUS_MAGNET_DETECTED), -1);
        assert_eq!(status_to_scale(STATUS_MAGNET_DETECTED), 0);
        assert_eq!(status_to_scale(0), 0);
    }
}
