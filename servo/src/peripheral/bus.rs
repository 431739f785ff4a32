use std::io;

use rppal::i2c::{self, I2c};
use thiserror::Error;
use tracing::{debug, trace};

use crate::peripheral::Device;

#[derive(Error, Debug)]
pub enum BusError {
    #[error("Could not open i2c bus /dev/i2c-{bus}")]
    Unopenable {
        bus: u8,
        #[source]
        source: i2c::Error,
    },
    #[error("Could not bind chip address {address:#04x}")]
    AddressBindFailed {
        address: u16,
        #[source]
        source: i2c::Error,
    },
    #[error("Write to register {register:#04x} failed")]
    WriteFailed {
        register: u8,
        #[source]
        source: io::Error,
    },
}

/// Exclusive connection to one chip on one i2c bus.
/// The bus is released when the handle is dropped.
#[derive(Debug)]
pub struct BusHandle {
    i2c: I2c,
}

impl BusHandle {
    /// Opens `/dev/i2c-<bus>` and binds `address` for every following transaction
    #[tracing::instrument]
    pub fn acquire(bus: u8, address: u16) -> Result<Self, BusError> {
        trace!("BusHandle::acquire()");

        let mut i2c = I2c::with_bus(bus).map_err(|source| BusError::Unopenable { bus, source })?;
        i2c.set_slave_address(address)
            .map_err(|source| BusError::AddressBindFailed { address, source })?;

        debug!("Bound chip {address:#04x} on /dev/i2c-{bus}");

        Ok(Self { i2c })
    }
}

impl Device for BusHandle {
    fn write(&mut self, register: u8, payload: &[u8]) -> Result<(), BusError> {
        let mut frame = Vec::with_capacity(payload.len() + 1);
        frame.push(register);
        frame.extend_from_slice(payload);

        trace!("Writing {frame:02x?}");

        let written = self
            .i2c
            .write(&frame)
            .map_err(|err| BusError::WriteFailed {
                register,
                source: into_io(err),
            })?;

        if written != frame.len() {
            return Err(BusError::WriteFailed {
                register,
                source: io::Error::new(
                    io::ErrorKind::WriteZero,
                    format!("wrote {written} of {} bytes", frame.len()),
                ),
            });
        }

        Ok(())
    }
}

fn into_io(err: i2c::Error) -> io::Error {
    match err {
        i2c::Error::Io(err) => err,
        other => io::Error::new(io::ErrorKind::Other, other),
    }
}
