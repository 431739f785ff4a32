use tracing::warn;

use crate::error::Error;
use crate::peripheral::pca9685::{self, prescale_for};
use crate::servo::{Servo, DEFAULT_MAX_ANGLE, DEFAULT_SERVO};

/// Standard rate for analog hobby servos
pub const SERVO_FREQUENCY_HZ: u32 = 50;

/// Where the chip lives and how it is driven
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Config {
    /// Bus number, opened as `/dev/i2c-<bus>`
    pub bus: u8,
    /// 7 bit chip address
    pub address: u16,
    pub oscillator_hz: u32,
    pub frequency_hz: u32,
    /// Highest angle accepted, see `servo::LEGACY_MAX_ANGLE`
    pub max_angle: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bus: pca9685::I2C_BUS,
            address: pca9685::I2C_ADDRESS,
            oscillator_hz: pca9685::OSCILLATOR_HZ,
            frequency_hz: SERVO_FREQUENCY_HZ,
            max_angle: DEFAULT_MAX_ANGLE,
        }
    }
}

/// Values derived from a checked `Config`
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Setup {
    pub prescale: u8,
    pub servo: Servo,
}

impl Config {
    pub fn validate(&self) -> Result<Setup, Error> {
        if self.address > 0x7F {
            return Err(Error::InvalidAddress(self.address));
        }

        let prescale =
            prescale_for(self.oscillator_hz, self.frequency_hz).ok_or(Error::InvalidFrequency {
                frequency_hz: self.frequency_hz,
                oscillator_hz: self.oscillator_hz,
            })?;

        let servo = DEFAULT_SERVO.with_max_angle(self.max_angle)?;
        if self.max_angle > DEFAULT_MAX_ANGLE {
            warn!(
                "Accepting angles up to {} degrees, servos are only rated to {DEFAULT_MAX_ANGLE}",
                self.max_angle
            );
        }

        Ok(Setup { prescale, servo })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::servo::LEGACY_MAX_ANGLE;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.bus, 1);
        assert_eq!(config.address, 0x40);

        let setup = config.validate().unwrap();
        assert_eq!(setup.prescale, 121);
        assert_eq!(setup.servo.max_angle(), 180);
    }

    #[test]
    fn legacy_bound() {
        let config = Config {
            max_angle: LEGACY_MAX_ANGLE,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap().servo.max_angle(), 203);
    }

    #[test]
    fn rejects_wide_address() {
        let config = Config {
            address: 0x80,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidAddress(0x80))));
    }

    #[test]
    fn rejects_unreachable_frequency() {
        let config = Config {
            frequency_hz: 5000,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidFrequency { frequency_hz: 5000, .. })
        ));
    }

    #[test]
    fn rejects_overflowing_max_angle() {
        let config = Config {
            max_angle: 1000,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidMaxAngle(1000))));
    }
}
