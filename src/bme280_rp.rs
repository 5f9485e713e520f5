#[cfg(feature = "defmt")]
use defmt::{debug, info, warn};
use embedded_hal_async::i2c::I2c;

use crate::calibration::{
    parse_humidity_calib, parse_temp_press_calib, HUMIDITY_CALIB_LEN, TEMP_PRESS_CALIB_LEN,
};
use crate::compensation::compensate;
use crate::raw::{parse_sensor_data, RAW_DATA_LEN};
use crate::{Bme280Error, CalibrationData, CompensatedData, Components, RawData};

/// SDO pulled low.
pub const DEFAULT_ADDRESS: u8 = 0x76;
/// SDO pulled high.
pub const SECONDARY_ADDRESS: u8 = 0x77;

const REG_CALIB_TEMP_PRESS: u8 = 0x88;
const REG_CALIB_HUMIDITY: u8 = 0xE1;
const REG_MEASUREMENT: u8 = 0xF7;

// Reset value of the temperature registers; the sensor has not measured yet
const SKIPPED_TEMPERATURE: u32 = 0x80000;

/// Reads calibration and measurement registers and compensates them.
///
/// The reader never writes to the device. Oversampling and power mode are
/// left to the application, which must put the sensor in normal mode (or
/// trigger forced measurements) before calling [`Bme280Sensor::read`].
pub struct Bme280Sensor<'a, T: I2c> {
    i2c: &'a mut T,
    address: u8,
    calibration: Option<CalibrationData>,
}

impl<'a, T: I2c> Bme280Sensor<'a, T> {
    pub fn new(i2c: &'a mut T, address: u8) -> Self {
        Self {
            i2c,
            address,
            calibration: None,
        }
    }

    /// Creates a reader with already known calibration, skipping the NVM reads.
    pub fn with_calibration(i2c: &'a mut T, address: u8, calibration: CalibrationData) -> Self {
        Self {
            i2c,
            address,
            calibration: Some(calibration),
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Calibration cached by the last successful [`Bme280Sensor::read_calibration`].
    pub fn calibration(&self) -> Option<&CalibrationData> {
        self.calibration.as_ref()
    }

    /// Temperature, pressure and humidity.
    pub async fn read(&mut self) -> Result<CompensatedData, Bme280Error> {
        self.read_components(Components::ALL).await
    }

    pub async fn read_components(
        &mut self,
        components: Components,
    ) -> Result<CompensatedData, Bme280Error> {
        if self.calibration.is_none() {
            self.read_calibration().await?;
        }

        let raw = self.read_raw().await?;
        if raw.temperature == SKIPPED_TEMPERATURE {
            #[cfg(feature = "defmt")]
            info!("No measurement available yet");
            return Err(Bme280Error::NoData);
        }

        let calibration = self.calibration.as_mut().ok_or(Bme280Error::NoData)?;
        let response = compensate(components, &raw, calibration);
        #[cfg(feature = "defmt")]
        debug!("Compensated: {:?}", response);
        Ok(response)
    }

    /// Reads both calibration blocks and caches the result.
    pub async fn read_calibration(&mut self) -> Result<CalibrationData, Bme280Error> {
        let mut calibration = CalibrationData::default();

        let mut temp_press = [0u8; TEMP_PRESS_CALIB_LEN];
        self.i2c_write_read(&[REG_CALIB_TEMP_PRESS], &mut temp_press).await?;
        parse_temp_press_calib(&temp_press, &mut calibration);

        let mut humidity = [0u8; HUMIDITY_CALIB_LEN];
        self.i2c_write_read(&[REG_CALIB_HUMIDITY], &mut humidity).await?;
        parse_humidity_calib(&humidity, &mut calibration);

        #[cfg(feature = "defmt")]
        info!("Calibration loaded: {:?}", calibration);
        self.calibration = Some(calibration);
        Ok(calibration)
    }

    /// Burst-reads the measurement registers without compensating them.
    pub async fn read_raw(&mut self) -> Result<RawData, Bme280Error> {
        let mut buf = [0u8; RAW_DATA_LEN];
        self.i2c_write_read(&[REG_MEASUREMENT], &mut buf).await?;
        #[cfg(feature = "defmt")]
        debug!("Received I2C data: {:?}", &buf);
        Ok(parse_sensor_data(&buf))
    }

    async fn i2c_write_read(&mut self, write: &[u8], read: &mut [u8]) -> Result<(), Bme280Error> {
        match self.i2c.write_read(self.address, write, read).await {
            Ok(_) => Ok(()),
            Err(_) => {
                #[cfg(feature = "defmt")]
                warn!("I2C read of register {=u8:#x} failed", write[0]);
                Err(Bme280Error::I2CError)
            }
        }
    }
}
