//! One-shot servo positioning through a PCA9685 on the Linux i2c bus

pub mod cli;
pub mod config;
pub mod error;
pub mod peripheral;
pub mod servo;

use tracing::info;

use crate::config::{Config, Setup};
use crate::error::ServoResult;
use crate::peripheral::bus::BusHandle;
use crate::peripheral::pca9685::{Channel, Pca9685};
use crate::peripheral::Device;
use crate::servo::{Angle, Servo};

/// A checked channel and angle pair
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Request {
    pub channel: Channel,
    pub angle: Angle,
}

impl Request {
    pub fn new(servo: &Servo, channel: i64, angle: i64) -> ServoResult<Self> {
        Ok(Self {
            channel: Channel::new(channel)?,
            angle: servo.angle(angle)?,
        })
    }
}

/// Validates everything, then opens the bus and programs the chip.
/// The bus is released when this returns.
#[tracing::instrument]
pub fn run(config: &Config, channel: i64, angle: i64) -> ServoResult<()> {
    let setup = config.validate()?;
    let request = Request::new(&setup.servo, channel, angle)?;

    let bus = BusHandle::acquire(config.bus, config.address)?;
    apply(bus, &setup, request)
}

/// Initializes the chip behind `device` and programs one channel
pub fn apply<D: Device>(device: D, setup: &Setup, request: Request) -> ServoResult<()> {
    let mut pca = Pca9685::new(device, setup.prescale);
    pca.initialize()?;
    pca.program(&setup.servo, request.channel, request.angle)?;

    info!(
        "Channel {} set to {} degrees",
        request.channel.index(),
        request.angle.degrees()
    );

    Ok(())
}
