pub mod bus;
pub mod pca9685;

use crate::peripheral::bus::BusError;

/// A chip reachable over a register-addressed bus
pub trait Device {
    fn write_byte(&mut self, register: u8, byte: u8) -> Result<(), BusError> {
        self.write(register, &[byte])
    }

    /// Sends `register` followed by `payload` as a single transaction.
    /// Callers must send full register contents, this is not a read-modify-write.
    fn write(&mut self, register: u8, payload: &[u8]) -> Result<(), BusError>;
}

impl<D: Device + ?Sized> Device for &mut D {
    fn write(&mut self, register: u8, payload: &[u8]) -> Result<(), BusError> {
        (**self).write(register, payload)
    }
}
