// GestLock — MPU6050 Gyroscope Driver
//
// Register-level driver over the shared I2C bus. Only the gyroscope is used:
// ±500 °/s, DLPF on, sample-rate divider from the requested rate, and a
// latched data-ready interrupt that clears on any register read.

use std::sync::Mutex;

use anyhow::anyhow;
use esp_idf_hal::i2c::I2cDriver;

use gestlock::config::*;
use gestlock::gesture::capture::{Gyroscope, SensorConfig};
use gestlock::gesture::Sample3;

/// Thread-safe handle to a shared I2C bus.
pub type SharedBus = &'static Mutex<I2cDriver<'static>>;

// MPU6050 register addresses
const REG_SMPLRT_DIV: u8 = 0x19;
const REG_CONFIG: u8 = 0x1A;
const REG_GYRO_CONFIG: u8 = 0x1B;
const REG_INT_PIN_CFG: u8 = 0x37;
const REG_INT_ENABLE: u8 = 0x38;
const REG_GYRO_XOUT_H: u8 = 0x43; // Start of 6-byte gyro burst
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_WHO_AM_I: u8 = 0x75;
const WHO_AM_I_EXPECTED: u8 = 0x68;

const INT_LATCH_EN: u8 = 0x20;
const INT_RD_CLEAR: u8 = 0x10;
const DATA_RDY_EN: u8 = 0x01;

pub struct Mpu6050 {
    bus: SharedBus,
    offset: Sample3,
}

impl Mpu6050 {
    pub fn new(bus: SharedBus) -> Self {
        Self {
            bus,
            offset: Sample3::default(),
        }
    }

    /// Verify the device is reachable on the I2C bus.
    pub fn is_connected(&self) -> bool {
        let Ok(mut bus) = self.bus.lock() else {
            return false;
        };
        let mut buf = [0u8; 1];
        match bus.write_read(I2C_ADDR_MPU6050, &[REG_WHO_AM_I], &mut buf, I2C_TIMEOUT_TICKS) {
            Ok(()) => buf[0] == WHO_AM_I_EXPECTED,
            Err(_) => false,
        }
    }

    fn write_reg(bus: &mut I2cDriver<'static>, reg: u8, value: u8) -> anyhow::Result<()> {
        bus.write(I2C_ADDR_MPU6050, &[reg, value], I2C_TIMEOUT_TICKS)?;
        Ok(())
    }
}

/// Divider so that base_rate / (1 + div) lands on `rate_hz`.
fn sample_rate_divider(rate_hz: u32) -> u8 {
    let rate = rate_hz.clamp(4, GYRO_BASE_RATE_HZ);
    (GYRO_BASE_RATE_HZ / rate - 1).min(u32::from(u8::MAX)) as u8
}

fn to_rad_s(hi: u8, lo: u8) -> f32 {
    (i16::from_be_bytes([hi, lo]) as f32 / GYRO_SCALE_500).to_radians()
}

impl Gyroscope for Mpu6050 {
    fn initiate(&mut self, config: &SensorConfig) -> anyhow::Result<()> {
        let mut bus = self.bus.lock().map_err(|_| anyhow!("I2C bus lock poisoned"))?;

        // Wake up (clear SLEEP bit)
        Self::write_reg(&mut bus, REG_PWR_MGMT_1, 0x00)?;
        // DLPF bandwidth 21 Hz, gyro output at 1 kHz
        Self::write_reg(&mut bus, REG_CONFIG, 0x04)?;
        // Gyroscope: ±500 °/s
        Self::write_reg(&mut bus, REG_GYRO_CONFIG, 0x08)?;
        Self::write_reg(&mut bus, REG_SMPLRT_DIV, sample_rate_divider(config.rate_hz))?;
        // INT held high until the next read, active high push-pull
        Self::write_reg(&mut bus, REG_INT_PIN_CFG, INT_LATCH_EN | INT_RD_CLEAR)?;
        Self::write_reg(&mut bus, REG_INT_ENABLE, DATA_RDY_EN)?;

        self.offset = config.offset;
        log::info!("MPU6050 initialised (±500°/s, {} Hz, data-ready latched)", config.rate_hz);
        Ok(())
    }

    fn read_calibrated(&mut self) -> anyhow::Result<Sample3> {
        let mut bus = self.bus.lock().map_err(|_| anyhow!("I2C bus lock poisoned"))?;
        let mut raw = [0u8; 6];
        bus.write_read(I2C_ADDR_MPU6050, &[REG_GYRO_XOUT_H], &mut raw, I2C_TIMEOUT_TICKS)?;

        Ok(Sample3::new(
            to_rad_s(raw[0], raw[1]) - self.offset.x,
            to_rad_s(raw[2], raw[3]) - self.offset.y,
            to_rad_s(raw[4], raw[5]) - self.offset.z,
        ))
    }
}
