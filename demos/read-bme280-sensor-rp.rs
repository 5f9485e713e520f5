#![no_std]
#![no_main]

use defmt::{error, info};
use defmt_rtt as _;
use embassy_bme280_sensor::{Bme280Error, Bme280Sensor, DEFAULT_ADDRESS};
use embassy_executor::Spawner;
use embassy_rp::peripherals::I2C0;
use embassy_rp::{bind_interrupts, i2c};
use embassy_time::{Duration, Timer};
use embedded_hal_async::i2c::I2c;
use panic_probe as _;

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

// ctrl_hum: humidity oversampling x1
const CTRL_HUM: [u8; 2] = [0xF2, 0x01];
// ctrl_meas: temperature x1, pressure x1, normal mode
const CTRL_MEAS: [u8; 2] = [0xF4, 0x27];
// config: 1000 ms standby, filter off
const CONFIG: [u8; 2] = [0xF5, 0xA0];

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    let p = embassy_rp::init(Default::default());

    let sda = p.PIN_0;
    let scl = p.PIN_1;

    // Configure I2C
    let mut i2c = i2c::I2c::new_async(p.I2C0, scl, sda, Irqs, Default::default());

    // Start continuous measurements
    for command in [CTRL_HUM, CTRL_MEAS, CONFIG] {
        if i2c.write(DEFAULT_ADDRESS, &command).await.is_err() {
            error!("Failed to configure sensor");
        }
    }

    // Create sensor instance
    let mut sensor = Bme280Sensor::new(&mut i2c, DEFAULT_ADDRESS);

    // Read sensor data
    loop {
        match sensor.read().await {
            Ok(data) => {
                info!(
                    "Temperature: {} (0.01°C), Pressure: {} (0.01Pa), Humidity: {} (1/1024 %)",
                    data.temperature, data.pressure, data.humidity
                );
            }
            Err(e) => match e {
                Bme280Error::NoData => error!("No data"),
                Bme280Error::I2CError => error!("I2C communication error"),
                other => error!("Compensation failed: {}", other),
            },
        }

        Timer::after(Duration::from_secs(1)).await;
    }
}
