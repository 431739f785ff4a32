use thiserror::Error;

use crate::peripheral::bus::BusError;

pub type ServoResult<T> = Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Expected 2 arguments <channel> <angle>, got {0}")]
    ArgumentCount(usize),
    #[error("Invalid channel number {0}. Please specify a channel number between 0 and 15")]
    InvalidChannel(i64),
    #[error("Invalid angle {angle}. Please specify an angle between 0 and {max} degrees")]
    InvalidAngle { angle: i64, max: u16 },
    #[error("Max angle {0} would overflow the 12 bit pulse counter")]
    InvalidMaxAngle(u16),
    #[error("Chip address {0:#04x} is not a 7 bit address")]
    InvalidAddress(u16),
    #[error("Cannot reach {frequency_hz} Hz from a {oscillator_hz} Hz oscillator")]
    InvalidFrequency { frequency_hz: u32, oscillator_hz: u32 },
    #[error(transparent)]
    Bus(#[from] BusError),
}

impl Error {
    /// Raised before any bus traffic, fixable by re-invoking with other arguments
    #[must_use]
    pub fn is_usage(&self) -> bool {
        !matches!(self, Error::Bus(_))
    }
}
