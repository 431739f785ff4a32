//! Register level driver for the PCA9685 16 channel PWM chip

use bitflags::bitflags;
use tracing::{debug, trace};

use crate::error::Error;
use crate::peripheral::bus::BusError;
use crate::peripheral::Device;
use crate::servo::{Angle, PulseWidth, Servo};

pub const PCA9685_MODE1: u8 = 0x00;
pub const PCA9685_LED0_ON_L: u8 = 0x06;
pub const PCA9685_PRE_SCALE: u8 = 0xFE;

/// `/dev/i2c-1`
pub const I2C_BUS: u8 = 1;
pub const I2C_ADDRESS: u16 = 0x40;
/// Internal oscillator
pub const OSCILLATOR_HZ: u32 = 25_000_000;
/// PRE_SCALE older setups hard-coded for 50 Hz. `prescale_for` rounds to 0x79 instead.
/// The chip ignores PRE_SCALE while awake, so both leave the power-on rate in place.
pub const LEGACY_PRESCALE: u8 = 0x78;

pub const CHANNELS: u8 = 16;
const REGISTERS_PER_CHANNEL: u8 = 4;

/// Steps in one PWM frame
const FRAME_STEPS: u64 = 4096;
/// The chip clamps anything lower to 3
const PRESCALE_MIN: u64 = 3;

bitflags! {
    pub struct Mode1: u8 {
        const RESTART        = 0b1000_0000;
        const EXTCLK         = 0b0100_0000;
        const AUTO_INCREMENT = 0b0010_0000;
        const SLEEP          = 0b0001_0000;
        const SUB1           = 0b0000_1000;
        const SUB2           = 0b0000_0100;
        const SUB3           = 0b0000_0010;
        const ALLCALL        = 0b0000_0001;
    }
}

/// One of the chip's 16 PWM outputs
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Channel(u8);

impl Channel {
    pub fn new(channel: i64) -> Result<Self, Error> {
        match u8::try_from(channel) {
            Ok(channel) if channel < CHANNELS => Ok(Self(channel)),
            _ => Err(Error::InvalidChannel(channel)),
        }
    }

    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }
}

/// Low byte addresses of a channel's on and off counters.
/// The high bytes follow at `+ 1`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ChannelRegisters {
    pub on: u8,
    pub off: u8,
}

impl ChannelRegisters {
    /// ON_L, ON_H, OFF_L, OFF_H
    #[must_use]
    pub const fn all(&self) -> [u8; 4] {
        [self.on, self.on + 1, self.off, self.off + 1]
    }
}

#[must_use]
pub const fn registers_for(channel: Channel) -> ChannelRegisters {
    let on = PCA9685_LED0_ON_L + REGISTERS_PER_CHANNEL * channel.0;

    ChannelRegisters { on, off: on + 2 }
}

/// `round(oscillator / (4096 * frequency)) - 1`.
/// `None` if the chip can't produce `frequency_hz`.
#[must_use]
pub fn prescale_for(oscillator_hz: u32, frequency_hz: u32) -> Option<u8> {
    if frequency_hz == 0 {
        return None;
    }

    let divisor = FRAME_STEPS * u64::from(frequency_hz);
    let prescale = (u64::from(oscillator_hz) + divisor / 2) / divisor;
    let prescale = prescale.checked_sub(1)?;

    if prescale < PRESCALE_MIN {
        return None;
    }

    u8::try_from(prescale).ok()
}

#[derive(Debug)]
pub struct Pca9685<D> {
    device: D,
    prescale: u8,
}

impl<D: Device> Pca9685<D> {
    pub fn new(device: D, prescale: u8) -> Self {
        trace!("Pca9685::new()");

        Self { device, prescale }
    }

    /// Wakes the chip with auto increment enabled and sets the frame rate.
    /// Safe to repeat.
    pub fn initialize(&mut self) -> Result<(), BusError> {
        let mode = Mode1::AUTO_INCREMENT;
        debug!("MODE1 <- {:#04x}, PRE_SCALE <- {:#04x}", mode.bits(), self.prescale);

        self.device.write_byte(PCA9685_MODE1, mode.bits())?;
        self.device.write_byte(PCA9685_PRE_SCALE, self.prescale)?;

        Ok(())
    }

    /// Positions the servo on `channel` at `angle`
    pub fn program(
        &mut self,
        servo: &Servo,
        channel: Channel,
        angle: Angle,
    ) -> Result<(), BusError> {
        let pulse = servo.to_pulse_width(angle);
        debug!(
            "Channel {} at {} degrees is {} ticks",
            channel.index(),
            angle.degrees(),
            pulse.ticks()
        );

        self.set_pulse(channel, pulse)
    }

    /// Pulse starts at tick zero and ends after `pulse` ticks
    pub fn set_pulse(&mut self, channel: Channel, pulse: PulseWidth) -> Result<(), BusError> {
        let registers = registers_for(channel);

        self.device.write(registers.on, &[0x00, 0x00])?;
        self.device.write(registers.off, &pulse.to_le_bytes())?;

        Ok(())
    }

    pub fn into_inner(self) -> D {
        self.device
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::peripheral::mock::Recorder;

    #[test]
    fn mode1_wakes_with_auto_increment() {
        assert_eq!(Mode1::AUTO_INCREMENT.bits(), 0x20);
        assert!(!Mode1::AUTO_INCREMENT.contains(Mode1::SLEEP));
    }

    #[test]
    fn prescale() {
        assert_eq!(prescale_for(25_000_000, 50), Some(121));
        assert_eq!(prescale_for(25_000_000, 200), Some(30));
        assert_eq!(prescale_for(25_000_000, 1526), Some(3));
        assert_eq!(prescale_for(25_000_000, 24), Some(253));

        assert_eq!(prescale_for(25_000_000, 0), None);
        assert_eq!(prescale_for(25_000_000, 10), None);
        assert_eq!(prescale_for(25_000_000, 2000), None);
    }

    #[test]
    fn prescale_rounds_past_legacy_value() {
        // 25 MHz / (4096 * 50) = 122.07
        let prescale = prescale_for(OSCILLATOR_HZ, 50).unwrap();
        assert_eq!(prescale, 0x79);
        assert_eq!(prescale, LEGACY_PRESCALE + 1);
    }

    #[test]
    fn channel_range() {
        assert!(Channel::new(0).is_ok());
        assert!(Channel::new(15).is_ok());
        assert!(matches!(Channel::new(-1), Err(Error::InvalidChannel(-1))));
        assert!(matches!(Channel::new(16), Err(Error::InvalidChannel(16))));
    }

    #[test]
    fn register_map() {
        let first = registers_for(Channel::new(0).unwrap());
        assert_eq!(first, ChannelRegisters { on: 0x06, off: 0x08 });

        let third = registers_for(Channel::new(2).unwrap());
        assert_eq!(third, ChannelRegisters { on: 0x0E, off: 0x10 });

        let last = registers_for(Channel::new(15).unwrap());
        assert_eq!(last.all(), [0x42, 0x43, 0x44, 0x45]);
    }

    #[test]
    fn register_map_no_overlap() {
        let mut seen = HashSet::new();
        for index in 0..i64::from(CHANNELS) {
            for register in registers_for(Channel::new(index).unwrap()).all() {
                assert!(seen.insert(register), "register {register:#04x} reused");
                assert_ne!(register, PCA9685_MODE1);
                assert_ne!(register, PCA9685_PRE_SCALE);
            }
        }
        assert_eq!(seen.len(), 64);
    }

    #[test]
    fn initialize_writes_mode_then_prescale() {
        let mut pca = Pca9685::new(Recorder::default(), 121);
        pca.initialize().unwrap();
        pca.initialize().unwrap();

        let writes = pca.into_inner().writes;
        assert_eq!(
            writes,
            vec![
                vec![0x00, 0x20],
                vec![0xFE, 121],
                vec![0x00, 0x20],
                vec![0xFE, 121]
            ]
        );
    }

    #[test]
    fn program_channel_zero() {
        let servo = Servo::default();
        let mut pca = Pca9685::new(Recorder::default(), 121);
        let channel = Channel::new(0).unwrap();
        pca.program(&servo, channel, servo.angle(90).unwrap()).unwrap();

        let writes = pca.into_inner().writes;
        assert_eq!(writes, vec![vec![0x06, 0x00, 0x00], vec![0x08, 0xE2, 0x04]]);
    }

    #[test]
    fn program_other_channels() {
        let servo = Servo::default();
        let mut pca = Pca9685::new(Recorder::default(), 121);
        let channel = Channel::new(7).unwrap();
        pca.program(&servo, channel, servo.angle(180).unwrap()).unwrap();

        // 1664 = 0x0680
        let writes = pca.into_inner().writes;
        assert_eq!(writes, vec![vec![0x22, 0x00, 0x00], vec![0x24, 0x80, 0x06]]);
    }

    #[test]
    fn short_write_stops_programming() {
        let servo = Servo::default();
        let recorder = Recorder {
            fail_at: Some(0),
            ..Default::default()
        };
        let mut pca = Pca9685::new(recorder, 121);
        let err = pca
            .program(&servo, Channel::new(3).unwrap(), servo.angle(0).unwrap())
            .unwrap_err();

        assert!(matches!(err, BusError::WriteFailed { register: 0x12, .. }));
        assert!(pca.into_inner().writes.is_empty());
    }
}
