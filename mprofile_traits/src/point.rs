//! Trajectory samples and the motion-profile set value.

/// One authored trajectory sample, streamed to the device in playback order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPoint {
    /// Target position in sensor rotations.
    pub position: f64,
    /// Target velocity in rotations per minute.
    pub velocity: f64,
    /// How long the device executes this point before moving on.
    pub duration_ms: u32,
    /// Marks the final point of the profile.
    pub is_last_point: bool,
    /// Ask the device to zero its sensor position before executing this point.
    pub zero_position: bool,
}

impl TrajectoryPoint {
    pub const fn new(position: f64, velocity: f64, duration_ms: u32) -> Self {
        Self {
            position,
            velocity,
            duration_ms,
            is_last_point: false,
            zero_position: false,
        }
    }

    pub const fn last(mut self) -> Self {
        self.is_last_point = true;
        self
    }

    pub const fn zeroing(mut self) -> Self {
        self.zero_position = true;
        self
    }
}

/// Output state of the device while it is in motion-profile mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetValue {
    /// Neutral output; buffered points are kept but not executed.
    #[default]
    Disable,
    /// Execute buffered points.
    Enable,
    /// Servo on the last executed setpoint.
    Hold,
}

impl SetValue {
    /// Numeric code the device expects as its set value.
    #[inline]
    pub const fn code(self) -> u8 {
        match self {
            SetValue::Disable => 0,
            SetValue::Enable => 1,
            SetValue::Hold => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            SetValue::Disable => "disable",
            SetValue::Enable => "enable",
            SetValue::Hold => "hold",
        }
    }
}

impl core::fmt::Display for SetValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
