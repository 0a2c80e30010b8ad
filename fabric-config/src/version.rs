use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum MySQL server version the fleet will accept on `group.add`.
///
/// The reference minimum from the original Fabric implementation is 5.6.8;
/// we keep that as our default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MinServerVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

impl MinServerVersion {
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a `major.minor.patch` version string, ignoring any trailing
    /// vendor suffix (e.g. `"5.7.30-log"`).
    pub fn parse(s: &str) -> Option<Self> {
        let core = s.split(['-', '+']).next().unwrap_or(s);
        let mut parts = core.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch = parts.next().unwrap_or("0").parse().ok()?;
        Some(Self::new(major, minor, patch))
    }
}

impl Default for MinServerVersion {
    fn default() -> Self {
        Self::new(5, 6, 8)
    }
}

impl fmt::Display for MinServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vendor_suffix() {
        assert_eq!(
            MinServerVersion::parse("5.7.30-log"),
            Some(MinServerVersion::new(5, 7, 30))
        );
    }

    #[test]
    fn default_is_5_6_8() {
        assert_eq!(MinServerVersion::default(), MinServerVersion::new(5, 6, 8));
    }

    #[test]
    fn ordering() {
        assert!(MinServerVersion::new(5, 6, 8) < MinServerVersion::new(5, 7, 0));
    }
}
