//! Factory calibration decoding.
//!
//! The coefficients live in two separate NVM regions: 0x88..0xA1
//! (temperature, pressure and `dig_H1`) and 0xE1..0xE7 (the rest of the
//! humidity coefficients). Register pairs are stored little-endian.
//! `dig_H4` and `dig_H5` are 12-bit values sharing the nibbles of 0xE5.

use crate::{Bme280Error, CalibrationData};

/// Registers 0x88..0xA1. Byte 24 (0xA0) is reserved.
pub const TEMP_PRESS_CALIB_LEN: usize = 26;
/// Registers 0xE1..0xE7.
pub const HUMIDITY_CALIB_LEN: usize = 7;

/// Fills the temperature and pressure coefficients and `h1`.
pub fn parse_temp_press_calib(reg_data: &[u8; TEMP_PRESS_CALIB_LEN], calib: &mut CalibrationData) {
    let u16_at = |i: usize| u16::from_le_bytes([reg_data[i], reg_data[i + 1]]);
    let i16_at = |i: usize| i16::from_le_bytes([reg_data[i], reg_data[i + 1]]);

    calib.t1 = u16_at(0);
    calib.t2 = i16_at(2);
    calib.t3 = i16_at(4);
    calib.p1 = u16_at(6);
    calib.p2 = i16_at(8);
    calib.p3 = i16_at(10);
    calib.p4 = i16_at(12);
    calib.p5 = i16_at(14);
    calib.p6 = i16_at(16);
    calib.p7 = i16_at(18);
    calib.p8 = i16_at(20);
    calib.p9 = i16_at(22);
    calib.h1 = reg_data[25];
}

/// Fills `h2`..`h6`.
pub fn parse_humidity_calib(reg_data: &[u8; HUMIDITY_CALIB_LEN], calib: &mut CalibrationData) {
    calib.h2 = i16::from_le_bytes([reg_data[0], reg_data[1]]);
    calib.h3 = reg_data[2];
    // 0xE4 holds H4[11:4], 0xE5[3:0] holds H4[3:0]
    calib.h4 = (i16::from(reg_data[3] as i8) * 16) | i16::from(reg_data[4] & 0x0F);
    // 0xE6 holds H5[11:4], 0xE5[7:4] holds H5[3:0]
    calib.h5 = (i16::from(reg_data[5] as i8) * 16) | i16::from(reg_data[4] >> 4);
    calib.h6 = reg_data[6] as i8;
}

impl CalibrationData {
    /// Decodes both calibration blocks. `fine_temperature` starts at zero.
    pub fn from_blocks(
        temp_press: &[u8; TEMP_PRESS_CALIB_LEN],
        humidity: &[u8; HUMIDITY_CALIB_LEN],
    ) -> Self {
        let mut calib = Self::default();
        parse_temp_press_calib(temp_press, &mut calib);
        parse_humidity_calib(humidity, &mut calib);
        calib
    }

    /// Like [`CalibrationData::from_blocks`], for buffers whose length is only known at runtime.
    pub fn from_slices(temp_press: &[u8], humidity: &[u8]) -> Result<Self, Bme280Error> {
        let temp_press: &[u8; TEMP_PRESS_CALIB_LEN] =
            temp_press.try_into().map_err(|_| Bme280Error::InvalidLength)?;
        let humidity: &[u8; HUMIDITY_CALIB_LEN] =
            humidity.try_into().map_err(|_| Bme280Error::InvalidLength)?;
        Ok(Self::from_blocks(temp_press, humidity))
    }
}
