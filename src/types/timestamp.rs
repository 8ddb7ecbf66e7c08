use serde::{Deserialize, Serialize};

use super::packet::constants::SENTINEL;

/// Photon arrival time of one slot.
///
/// The dense matrix stores `-1` for `Invalid`; this type is the checked view
/// of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Timestamp {
    /// Arrival time in picoseconds
    Valid(f64),
    /// No hit recorded in this slot
    Invalid,
}

impl Timestamp {
    /// Any negative value reads as `Invalid`
    #[inline]
    pub fn from_sentinel(value: f64) -> Self {
        if value >= 0.0 {
            Self::Valid(value)
        } else {
            Self::Invalid
        }
    }

    #[inline]
    pub fn to_sentinel(self) -> f64 {
        match self {
            Self::Valid(ps) => ps,
            Self::Invalid => SENTINEL,
        }
    }

    #[inline]
    pub fn ps(self) -> Option<f64> {
        match self {
            Self::Valid(ps) => Some(ps),
            Self::Invalid => None,
        }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

impl From<Timestamp> for Option<f64> {
    fn from(ts: Timestamp) -> Self {
        ts.ps()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_conversion() {
        assert_eq!(Timestamp::from_sentinel(-1.0), Timestamp::Invalid);
        assert_eq!(Timestamp::from_sentinel(0.0), Timestamp::Valid(0.0));
        assert_eq!(Timestamp::Invalid.to_sentinel(), -1.0);
        assert_eq!(Timestamp::Valid(35.714).to_sentinel(), 35.714);
    }

    #[test]
    fn test_ps() {
        assert_eq!(Timestamp::Valid(1.5).ps(), Some(1.5));
        assert_eq!(Timestamp::Invalid.ps(), None);
        assert!(!Timestamp::Invalid.is_valid());
    }
}
