use crate::error::Error;

/// Highest angle a standard hobby servo is commanded to
pub const DEFAULT_MAX_ANGLE: u16 = 180;
/// Range check used by older setups, overshoots a standard servo
pub const LEGACY_MAX_ANGLE: u16 = 203;

/// Off-time counters only hold 12 bits
pub const MAX_TICKS: u16 = 0x0FFF;

pub const DEFAULT_SERVO: Servo = Servo {
    // Taken from servo spec, ~1.2us per tick
    min: PulseWidth(836),
    max: PulseWidth(1664),
    sweep: 180,
    max_angle: DEFAULT_MAX_ANGLE,
};

/// Requested servo position in whole degrees
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Angle(u16);

impl Angle {
    #[must_use]
    pub const fn degrees(self) -> u16 {
        self.0
    }
}

/// Off-time of a channel, counted in chip clock ticks from the start of the frame
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct PulseWidth(u16);

impl PulseWidth {
    #[must_use]
    pub const fn ticks(self) -> u16 {
        self.0
    }

    /// Low byte first, matching the chip's counter layout
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 2] {
        self.0.to_le_bytes()
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Servo {
    /// Pulse at 0 degrees
    min: PulseWidth,
    /// Pulse at `sweep` degrees
    max: PulseWidth,
    sweep: u16,

    /// Accepted upper bound, may exceed `sweep`
    max_angle: u16,
}

impl Servo {
    /// Fails if `max_angle` would overflow the 12 bit counter
    pub fn with_max_angle(self, max_angle: u16) -> Result<Self, Error> {
        let servo = Self { max_angle, ..self };
        if servo.ticks_at(max_angle) > u32::from(MAX_TICKS) {
            return Err(Error::InvalidMaxAngle(max_angle));
        }

        Ok(servo)
    }

    #[must_use]
    pub const fn max_angle(&self) -> u16 {
        self.max_angle
    }

    /// Checks `degrees` against `0..=max_angle`
    pub fn angle(&self, degrees: i64) -> Result<Angle, Error> {
        match u16::try_from(degrees) {
            Ok(degrees) if degrees <= self.max_angle => Ok(Angle(degrees)),
            _ => Err(Error::InvalidAngle {
                angle: degrees,
                max: self.max_angle,
            }),
        }
    }

    /// Linear map from degrees to ticks, truncating
    #[must_use]
    pub fn to_pulse_width(&self, angle: Angle) -> PulseWidth {
        let ticks = self.ticks_at(angle.0);
        // `angle <= max_angle`, which `with_max_angle` keeps inside the counter
        debug_assert!(ticks <= u32::from(MAX_TICKS));

        PulseWidth(ticks as u16)
    }

    fn ticks_at(&self, degrees: u16) -> u32 {
        let min = u32::from(self.min.0);
        let max = u32::from(self.max.0);

        min + u32::from(degrees) * (max - min) / u32::from(self.sweep)
    }
}

impl Default for Servo {
    fn default() -> Self {
        DEFAULT_SERVO
    }
}
