use clap::Parser;
use tracing::Level;

use crate::config::{Config, SERVO_FREQUENCY_HZ};
use crate::error::Error;
use crate::peripheral::pca9685;
use crate::servo::DEFAULT_MAX_ANGLE;

/// Positions a hobby servo connected to a PCA9685
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// <channel> <angle>: the servo channel number (0 to 15) and the desired angle in degrees
    #[arg(value_names = ["CHANNEL", "ANGLE"], num_args = 1.., allow_negative_numbers = true)]
    pub positionals: Vec<i64>,

    /// I2C bus number, opened as /dev/i2c-<BUS>
    #[arg(long, default_value_t = pca9685::I2C_BUS)]
    pub bus: u8,

    /// 7 bit chip address, decimal or 0x prefixed hex
    #[arg(long, default_value = "0x40", value_parser = parse_address)]
    pub address: u16,

    /// PWM frame rate (Hz)
    #[arg(long, default_value_t = SERVO_FREQUENCY_HZ)]
    pub frequency: u32,

    /// Chip oscillator clock (Hz)
    #[arg(long, default_value_t = pca9685::OSCILLATOR_HZ)]
    pub oscillator: u32,

    /// Highest accepted angle. Older setups allowed up to 203
    #[arg(long, default_value_t = DEFAULT_MAX_ANGLE)]
    pub max_angle: u16,

    /// Log every register write
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Exactly `<channel> <angle>`
    pub fn arguments(&self) -> Result<(i64, i64), Error> {
        match *self.positionals.as_slice() {
            [channel, angle] => Ok((channel, angle)),
            ref other => Err(Error::ArgumentCount(other.len())),
        }
    }

    #[must_use]
    pub fn config(&self) -> Config {
        Config {
            bus: self.bus,
            address: self.address,
            oscillator_hz: self.oscillator,
            frequency_hz: self.frequency,
            max_angle: self.max_angle,
        }
    }

    #[must_use]
    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }
}

fn parse_address(value: &str) -> Result<u16, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => value.parse(),
    };

    parsed.map_err(|err| format!("`{value}` is not an address: {err}"))
}
