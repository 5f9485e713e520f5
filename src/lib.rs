#![cfg_attr(not(test), no_std)]

//! BME280 integer compensation core plus an async register reader.
//!
//! The core (`raw`, `calibration`, `compensation`) is pure: it turns the
//! register blocks read from the sensor into fixed-point readings using the
//! vendor's integer formulas. [`Bme280Sensor`] does the bus reads and feeds
//! the core.
//!
//! Units of [`CompensatedData`]:
//! - temperature: 1/100 °C, `2508` = 25.08 °C
//! - pressure: 1/100 Pa, `10065328` = 100653.28 Pa
//! - humidity: 1/1024 %RH, `56317` = 54.99 %RH

mod bme280_rp;
pub mod calibration;
pub mod compensation;
pub mod raw;

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

pub use bme280_rp::{Bme280Sensor, DEFAULT_ADDRESS, SECONDARY_ADDRESS};
pub use calibration::{HUMIDITY_CALIB_LEN, TEMP_PRESS_CALIB_LEN};
pub use compensation::{compensate, compensate_data, TemperatureReading};
pub use raw::RAW_DATA_LEN;

/// Uncompensated ADC readings from one measurement burst.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawData {
    /// 20-bit pressure reading
    pub pressure: u32,
    /// 20-bit temperature reading
    pub temperature: u32,
    /// 16-bit humidity reading
    pub humidity: u32,
}

/// Factory calibration coefficients (`dig_T*`, `dig_P*`, `dig_H*`).
///
/// `fine_temperature` is not read from the device. It holds the last fine
/// temperature produced by [`compensate_data`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationData {
    pub t1: u16,
    pub t2: i16,
    pub t3: i16,
    pub p1: u16,
    pub p2: i16,
    pub p3: i16,
    pub p4: i16,
    pub p5: i16,
    pub p6: i16,
    pub p7: i16,
    pub p8: i16,
    pub p9: i16,
    pub h1: u8,
    pub h2: i16,
    pub h3: u8,
    /// 12-bit signed, packed with `h5` in the humidity block
    pub h4: i16,
    /// 12-bit signed, packed with `h4` in the humidity block
    pub h5: i16,
    pub h6: i8,
    pub fine_temperature: i32,
}

/// Compensated reading in the vendor's fixed-point units.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CompensatedData {
    /// Hundredths of a degree Celsius, within [-4000, 8500]
    pub temperature: i32,
    /// Hundredths of a Pascal, within [3000000, 11000000]
    pub pressure: u32,
    /// 1/1024 %RH, within [0, 102400]
    pub humidity: u32,
}

/// Selects which readings [`compensate_data`] produces.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Components(u8);

impl Components {
    pub const NONE: Self = Self(0);
    pub const PRESSURE: Self = Self(1 << 0);
    pub const TEMPERATURE: Self = Self(1 << 1);
    pub const HUMIDITY: Self = Self(1 << 2);
    pub const ALL: Self = Self(0b111);

    /// Drops bits that do not name a component.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Components {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Components {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bme280Error {
    /// A required argument of `compensate_data` was absent
    NullPointer,
    /// A register block had the wrong number of bytes
    InvalidLength,
    I2CError,
    /// The sensor has not produced a measurement yet
    NoData,
}

impl fmt::Display for Bme280Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bme280Error::NullPointer => f.write_str("required argument is missing"),
            Bme280Error::InvalidLength => f.write_str("register block has the wrong length"),
            Bme280Error::I2CError => f.write_str("I2C communication error"),
            Bme280Error::NoData => f.write_str("no measurement available"),
        }
    }
}
