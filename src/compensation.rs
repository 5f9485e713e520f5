//! Integer compensation formulas (vendor API v3.3.6, 32-bit temperature and
//! humidity, 64-bit pressure).
//!
//! All divisions truncate toward zero, which is what Rust's `/` does for
//! signed integers. Products the vendor code lets wrap are computed with
//! `wrapping_*` so that degenerate calibration data clamps instead of
//! panicking on overflow.

use crate::{Bme280Error, CalibrationData, CompensatedData, Components, RawData};

pub const TEMPERATURE_MIN: i32 = -4000;
pub const TEMPERATURE_MAX: i32 = 8500;
pub const PRESSURE_MIN: u32 = 3_000_000;
pub const PRESSURE_MAX: u32 = 11_000_000;
pub const HUMIDITY_MAX: u32 = 102_400;

/// Output of the temperature step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TemperatureReading {
    /// Hundredths of a degree Celsius, clamped
    pub temperature: i32,
    /// Unclamped intermediate consumed by the pressure and humidity steps
    pub fine_temperature: i32,
}

pub fn compensate_temperature(raw: &RawData, calib: &CalibrationData) -> TemperatureReading {
    let t1 = i32::from(calib.t1);
    let t2 = i32::from(calib.t2);
    let t3 = i32::from(calib.t3);

    let var1 = ((raw.temperature / 8) as i32).wrapping_sub(t1 * 2);
    let var1 = var1.wrapping_mul(t2) / 2048;
    let var2 = ((raw.temperature / 16) as i32).wrapping_sub(t1);
    let var2 = (var2.wrapping_mul(var2) / 4096).wrapping_mul(t3) / 16384;

    let fine_temperature = var1.wrapping_add(var2);
    let temperature = fine_temperature.wrapping_mul(5).wrapping_add(128) / 256;

    TemperatureReading {
        temperature: temperature.clamp(TEMPERATURE_MIN, TEMPERATURE_MAX),
        fine_temperature,
    }
}

/// Returns pressure in hundredths of a Pascal.
///
/// A calibration set whose derived divisor is zero yields [`PRESSURE_MIN`].
pub fn compensate_pressure(raw: &RawData, calib: &CalibrationData, fine_temperature: i32) -> u32 {
    let p1 = i64::from(calib.p1);
    let p2 = i64::from(calib.p2);
    let p3 = i64::from(calib.p3);
    let p4 = i64::from(calib.p4);
    let p5 = i64::from(calib.p5);
    let p6 = i64::from(calib.p6);
    let p7 = i64::from(calib.p7);
    let p8 = i64::from(calib.p8);
    let p9 = i64::from(calib.p9);

    let mut var1 = i64::from(fine_temperature) - 128_000;
    let mut var2 = var1.wrapping_mul(var1).wrapping_mul(p6);
    var2 = var2.wrapping_add(var1.wrapping_mul(p5).wrapping_mul(131_072));
    var2 = var2.wrapping_add(p4 * 34_359_738_368);
    var1 = (var1.wrapping_mul(var1).wrapping_mul(p3) / 256)
        .wrapping_add(var1.wrapping_mul(p2).wrapping_mul(4096));
    var1 = 140_737_488_355_328i64.wrapping_add(var1).wrapping_mul(p1) / 8_589_934_592;

    if var1 == 0 {
        return PRESSURE_MIN;
    }

    // unsigned in the vendor code, wraps for readings above 20 bits
    let mut var4 = i64::from(1_048_576u32.wrapping_sub(raw.pressure));
    var4 = var4
        .wrapping_mul(2_147_483_648)
        .wrapping_sub(var2)
        .wrapping_mul(3125)
        .wrapping_div(var1);
    var1 = p9.wrapping_mul(var4 / 8192).wrapping_mul(var4 / 8192) / 33_554_432;
    var2 = p8.wrapping_mul(var4) / 524_288;
    var4 = (var4.wrapping_add(var1).wrapping_add(var2) / 256).wrapping_add(p7 * 16);

    // truncation to 32 bits happens before the clamp
    let pressure = ((var4 / 2).wrapping_mul(100) / 128) as u32;
    pressure.clamp(PRESSURE_MIN, PRESSURE_MAX)
}

/// Returns relative humidity in 1/1024 %RH.
pub fn compensate_humidity(raw: &RawData, calib: &CalibrationData, fine_temperature: i32) -> u32 {
    let h1 = i32::from(calib.h1);
    let h2 = i32::from(calib.h2);
    let h3 = i32::from(calib.h3);
    let h4 = i32::from(calib.h4);
    let h5 = i32::from(calib.h5);
    let h6 = i32::from(calib.h6);

    let var1 = fine_temperature.wrapping_sub(76_800);
    let var2 = raw.humidity.wrapping_mul(16_384) as i32;
    let var3 = h4.wrapping_mul(1_048_576);
    let var4 = h5.wrapping_mul(var1);
    let var5 = var2.wrapping_sub(var3).wrapping_sub(var4).wrapping_add(16_384) / 32_768;
    let var2 = var1.wrapping_mul(h6) / 1024;
    let var3 = var1.wrapping_mul(h3) / 2048;
    let var4 = (var2.wrapping_mul(var3.wrapping_add(32_768)) / 1024).wrapping_add(2_097_152);
    let var2 = var4.wrapping_mul(h2).wrapping_add(8192) / 16_384;
    let var3 = var5.wrapping_mul(var2);
    let var4 = ((var3 / 32_768).wrapping_mul(var3 / 32_768)) / 128;
    let var5 = var3.wrapping_sub(var4.wrapping_mul(h1) / 16);

    let humidity = (var5.clamp(0, 419_430_400) / 4096) as u32;
    humidity.min(HUMIDITY_MAX)
}

/// Runs the requested formulas and records the fine temperature in `calib`.
///
/// Temperature is computed and reported whenever any component is requested,
/// even if the temperature bit itself is clear.
pub fn compensate(
    components: Components,
    raw: &RawData,
    calib: &mut CalibrationData,
) -> CompensatedData {
    let mut comp_data = CompensatedData::default();
    if !components.intersects(Components::ALL) {
        return comp_data;
    }

    let reading = compensate_temperature(raw, calib);
    calib.fine_temperature = reading.fine_temperature;
    comp_data.temperature = reading.temperature;

    if components.contains(Components::PRESSURE) {
        comp_data.pressure = compensate_pressure(raw, calib, reading.fine_temperature);
    }
    if components.contains(Components::HUMIDITY) {
        comp_data.humidity = compensate_humidity(raw, calib, reading.fine_temperature);
    }
    comp_data
}

/// Checked form of [`compensate`] writing into caller-owned output.
///
/// Fails with [`Bme280Error::NullPointer`] if any argument is `None`, in
/// which case nothing is written. Otherwise the whole output is overwritten,
/// unrequested fields with zero.
pub fn compensate_data(
    components: Components,
    raw: Option<&RawData>,
    comp_data: Option<&mut CompensatedData>,
    calib: Option<&mut CalibrationData>,
) -> Result<(), Bme280Error> {
    let (Some(raw), Some(comp_data), Some(calib)) = (raw, comp_data, calib) else {
        return Err(Bme280Error::NullPointer);
    };
    *comp_data = compensate(components, raw, calib);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datasheet_calib() -> CalibrationData {
        CalibrationData {
            t1: 27504,
            t2: 26435,
            t3: -1000,
            p1: 36477,
            p2: -10685,
            p3: 3024,
            p4: 2855,
            p5: 140,
            p6: -7,
            p7: 15500,
            p8: -14600,
            p9: 6000,
            h1: 75,
            h2: 362,
            h3: 0,
            h4: 313,
            h5: 50,
            h6: 30,
            fine_temperature: 0,
        }
    }

    fn raw(temperature: u32, pressure: u32, humidity: u32) -> RawData {
        RawData {
            pressure,
            temperature,
            humidity,
        }
    }

    #[test]
    fn temperature_reference_value() {
        let reading = compensate_temperature(&raw(519888, 0, 0), &datasheet_calib());
        assert_eq!(reading.temperature, 2508);
        assert_eq!(reading.fine_temperature, 128423);
    }

    #[test]
    fn temperature_clamps_to_range() {
        let calib = datasheet_calib();

        let hot = compensate_temperature(&raw((1 << 20) - 1, 0, 0), &calib);
        assert_eq!(hot.temperature, TEMPERATURE_MAX);
        // the fine temperature itself is not clamped
        assert_eq!(hot.fine_temperature, 960247);

        let cold = compensate_temperature(&raw(0, 0, 0), &calib);
        assert_eq!(cold.temperature, TEMPERATURE_MIN);
        assert_eq!(cold.fine_temperature, -721299);
    }

    #[test]
    fn temperature_division_truncates_toward_zero() {
        // var1 = -1 * 32767 / 2048 -> -15 (flooring would give -16)
        let calib = CalibrationData {
            t1: 1,
            t2: 32767,
            ..CalibrationData::default()
        };
        let reading = compensate_temperature(&raw(8, 0, 0), &calib);
        assert_eq!(reading.fine_temperature, -15);
        assert_eq!(reading.temperature, 0);
    }

    #[test]
    fn pressure_reference_value() {
        let pressure = compensate_pressure(&raw(0, 415148, 0), &datasheet_calib(), 128423);
        assert_eq!(pressure, 10065328);
    }

    #[test]
    fn pressure_zero_divisor_returns_minimum() {
        let calib = CalibrationData {
            p1: 0,
            ..datasheet_calib()
        };
        assert_eq!(compensate_pressure(&raw(0, 415148, 0), &calib, 128423), PRESSURE_MIN);

        // p1 non-zero, p3 cancels the 2^47 offset exactly at fine_temperature = 2^20 + 128000
        let calib = CalibrationData {
            p1: 36477,
            p2: 0,
            p3: -32768,
            p4: 0,
            p5: 0,
            p6: 0,
            p7: 0,
            p8: 0,
            p9: 0,
            ..CalibrationData::default()
        };
        assert_eq!(compensate_pressure(&raw(0, 415148, 0), &calib, 1_176_576), PRESSURE_MIN);
        assert_eq!(compensate_pressure(&raw(0, 415148, 0), &calib, 1_176_577), PRESSURE_MAX);
    }

    #[test]
    fn pressure_stays_in_range() {
        let calib = datasheet_calib();
        assert_eq!(compensate_pressure(&raw(0, 0, 0), &calib, 128423), PRESSURE_MAX);
        for adc_p in (0..(1 << 20)).step_by(4099) {
            let p = compensate_pressure(&raw(0, adc_p, 0), &calib, 128423);
            assert!((PRESSURE_MIN..=PRESSURE_MAX).contains(&p), "adc_p {adc_p} -> {p}");
        }
    }

    #[test]
    fn pressure_survives_degenerate_calibration() {
        let calib = CalibrationData {
            p1: u16::MAX,
            p2: i16::MIN,
            p3: i16::MIN,
            p4: i16::MAX,
            p5: i16::MIN,
            p6: i16::MAX,
            p7: i16::MIN,
            p8: i16::MAX,
            p9: i16::MIN,
            ..CalibrationData::default()
        };
        for fine_temperature in [i32::MIN, -1, 0, 128000, i32::MAX] {
            let p = compensate_pressure(&raw(0, u32::MAX, 0), &calib, fine_temperature);
            assert!((PRESSURE_MIN..=PRESSURE_MAX).contains(&p));
        }
    }

    #[test]
    fn humidity_reference_values() {
        let calib = datasheet_calib();
        assert_eq!(compensate_humidity(&raw(0, 0, 30000), &calib, 128423), 56317);
        assert_eq!(compensate_humidity(&raw(0, 0, 27000), &calib, 128423), 39190);
    }

    #[test]
    fn humidity_clamps_to_range() {
        let calib = datasheet_calib();
        assert_eq!(compensate_humidity(&raw(0, 0, 0), &calib, 128423), 0);
        assert_eq!(compensate_humidity(&raw(0, 0, 0xFFFF), &calib, 128423), HUMIDITY_MAX);
    }

    #[test]
    fn humidity_bounds_hold_across_inputs() {
        let calib = datasheet_calib();
        // simple LCG so the sweep is deterministic
        let mut seed: u32 = 0x2545_F491;
        for _ in 0..20_000 {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let adc_h = seed >> 16;
            let fine_temperature = (seed % 600_000) as i32 - 300_000;
            let h = compensate_humidity(&raw(0, 0, adc_h), &calib, fine_temperature);
            assert!(h <= HUMIDITY_MAX);
        }
    }

    #[test]
    fn compensate_all_components() {
        let mut calib = datasheet_calib();
        let out = compensate(Components::ALL, &raw(519888, 415148, 30000), &mut calib);
        assert_eq!(
            out,
            CompensatedData {
                temperature: 2508,
                pressure: 10065328,
                humidity: 56317,
            }
        );
        assert_eq!(calib.fine_temperature, 128423);
    }

    #[test]
    fn pressure_only_still_reports_temperature() {
        let mut calib = datasheet_calib();
        let out = compensate(Components::PRESSURE, &raw(519888, 415148, 30000), &mut calib);
        assert_eq!(out.temperature, 2508);
        assert_eq!(out.pressure, 10065328);
        assert_eq!(out.humidity, 0);
    }

    #[test]
    fn humidity_only_still_reports_temperature() {
        let mut calib = datasheet_calib();
        let out = compensate(Components::HUMIDITY, &raw(519888, 415148, 30000), &mut calib);
        assert_eq!(out.temperature, 2508);
        assert_eq!(out.pressure, 0);
        assert_eq!(out.humidity, 56317);
    }

    #[test]
    fn empty_mask_leaves_fine_temperature_alone() {
        let mut calib = CalibrationData {
            fine_temperature: 42,
            ..datasheet_calib()
        };
        let out = compensate(Components::NONE, &raw(519888, 415148, 30000), &mut calib);
        assert_eq!(out, CompensatedData::default());
        assert_eq!(calib.fine_temperature, 42);
    }

    #[test]
    fn compensate_data_zeroes_previous_output() {
        let mut calib = datasheet_calib();
        let mut out = CompensatedData {
            temperature: 1,
            pressure: 2,
            humidity: 3,
        };
        let raw = raw(519888, 415148, 30000);

        compensate_data(Components::NONE, Some(&raw), Some(&mut out), Some(&mut calib)).unwrap();
        assert_eq!(out, CompensatedData::default());

        compensate_data(Components::TEMPERATURE, Some(&raw), Some(&mut out), Some(&mut calib))
            .unwrap();
        assert_eq!(
            out,
            CompensatedData {
                temperature: 2508,
                pressure: 0,
                humidity: 0,
            }
        );
    }

    #[test]
    fn compensate_data_rejects_missing_arguments() {
        let raw = raw(519888, 415148, 30000);
        let untouched = CompensatedData {
            temperature: 7,
            pressure: 8,
            humidity: 9,
        };
        let mut calib = datasheet_calib();
        let mut out = untouched;

        assert_eq!(
            compensate_data(Components::ALL, None, Some(&mut out), Some(&mut calib)),
            Err(Bme280Error::NullPointer)
        );
        assert_eq!(
            compensate_data(Components::ALL, Some(&raw), None, Some(&mut calib)),
            Err(Bme280Error::NullPointer)
        );
        assert_eq!(
            compensate_data(Components::ALL, Some(&raw), Some(&mut out), None),
            Err(Bme280Error::NullPointer)
        );
        assert_eq!(out, untouched);
        assert_eq!(calib.fine_temperature, 0);
    }
}
