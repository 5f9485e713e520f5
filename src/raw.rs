//! Measurement burst decoding (registers 0xF7..0xFE).

use crate::{Bme280Error, RawData};

/// press_msb, press_lsb, press_xlsb, temp_msb, temp_lsb, temp_xlsb, hum_msb, hum_lsb
pub const RAW_DATA_LEN: usize = 8;

/// Splits the burst into 20-bit pressure, 20-bit temperature and 16-bit humidity.
///
/// The low nibble of each xlsb byte is not part of the reading and is dropped.
pub fn parse_sensor_data(reg_data: &[u8; RAW_DATA_LEN]) -> RawData {
    RawData {
        pressure: adc20(reg_data[0], reg_data[1], reg_data[2]),
        temperature: adc20(reg_data[3], reg_data[4], reg_data[5]),
        humidity: (u32::from(reg_data[6]) << 8) | u32::from(reg_data[7]),
    }
}

#[inline]
fn adc20(msb: u8, lsb: u8, xlsb: u8) -> u32 {
    (u32::from(msb) << 12) | (u32::from(lsb) << 4) | (u32::from(xlsb) >> 4)
}

impl RawData {
    /// Like [`parse_sensor_data`], for buffers whose length is only known at runtime.
    pub fn from_slice(reg_data: &[u8]) -> Result<Self, Bme280Error> {
        let burst: &[u8; RAW_DATA_LEN] = reg_data
            .try_into()
            .map_err(|_| Bme280Error::InvalidLength)?;
        Ok(parse_sensor_data(burst))
    }
}
