//! Camera constraint value objects

use std::fmt;
use std::str::FromStr;

/// Which physical camera to prefer when several are present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FacingMode {
    /// Rear camera, pointing away from the user
    #[default]
    Environment,
    /// Front camera, pointing at the user
    User,
}

impl FacingMode {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Environment => "environment",
            Self::User => "user",
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FacingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "environment" | "rear" | "back" => Ok(Self::Environment),
            "user" | "front" => Ok(Self::User),
            other => Err(format!("Invalid facing mode: \"{}\"", other)),
        }
    }
}

/// Requested size along one axis, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionRange {
    pub ideal: u32,
    pub max: u32,
}

impl DimensionRange {
    pub const fn new(ideal: u32, max: u32) -> Self {
        Self { ideal, max }
    }

    /// Check whether an actual size is acceptable
    pub const fn allows(&self, actual: u32) -> bool {
        actual > 0 && actual <= self.max
    }
}

/// Constraints passed to the camera device when opening a stream.
/// Video only; audio is never requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraConstraints {
    pub facing_mode: FacingMode,
    pub width: DimensionRange,
    pub height: DimensionRange,
}

impl CameraConstraints {
    /// Rear camera at HD resolution, tried first
    pub const fn preferred() -> Self {
        Self {
            facing_mode: FacingMode::Environment,
            width: DimensionRange::new(1280, 1920),
            height: DimensionRange::new(720, 1080),
        }
    }

    /// Front camera at a small portrait resolution, tried when the
    /// preferred stream has no video track
    pub const fn fallback() -> Self {
        Self {
            facing_mode: FacingMode::User,
            width: DimensionRange::new(300, 640),
            height: DimensionRange::new(400, 480),
        }
    }

    /// Check whether an actual frame size satisfies the max bounds
    pub const fn allows(&self, width: u32, height: u32) -> bool {
        self.width.allows(width) && self.height.allows(height)
    }
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self::preferred()
    }
}

impl fmt::Display for CameraConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}x{} (max {}x{})",
            self.facing_mode, self.width.ideal, self.height.ideal, self.width.max, self.height.max
        )
    }
}
