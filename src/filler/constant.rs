//! Constant-byte filler.

use crate::config::FillerPolicy;
use crate::filler::FillerSource;

/// Fills every byte with the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantFiller {
    byte: u8,
}

impl ConstantFiller {
    pub fn new(byte: u8) -> Self {
        Self { byte }
    }

    /// Filler made of ASCII `.` (0x2E).
    pub fn dot() -> Self {
        Self::new(b'.')
    }
}

impl FillerSource for ConstantFiller {
    fn fill(&self, buf: &mut [u8]) {
        buf.fill(self.byte);
    }

    fn policy(&self) -> FillerPolicy {
        FillerPolicy::Dot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_with_dots() {
        let mut buf = [0u8; 8];
        ConstantFiller::dot().fill(&mut buf);
        assert_eq!(&buf, b"........");
    }
}
