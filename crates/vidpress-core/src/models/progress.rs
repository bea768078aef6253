use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Processing progress, always within 0..=100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Percentage(u8);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0);
    pub const COMPLETE: Percentage = Percentage(100);

    /// Clamp an arbitrary backend-reported number into range.
    /// NaN is treated as 0; fractional values are rounded.
    pub fn from_raw(raw: f64) -> Self {
        if raw.is_nan() {
            return Percentage::ZERO;
        }
        Percentage(raw.clamp(0.0, 100.0).round() as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_complete(self) -> bool {
        self.0 == 100
    }
}

impl From<u8> for Percentage {
    fn from(value: u8) -> Self {
        Percentage(value.min(100))
    }
}

impl Display for Percentage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}%", self.0)
    }
}

/// Payload of the real-time `progress` event: `{"percentage": number}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressPayload {
    pub percentage: f64,
}

impl ProgressPayload {
    pub fn clamped(&self) -> Percentage {
        Percentage::from_raw(self.percentage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(Percentage::from_raw(-5.0), Percentage::ZERO);
        assert_eq!(Percentage::from_raw(150.0), Percentage::COMPLETE);
        assert_eq!(Percentage::from_raw(f64::INFINITY), Percentage::COMPLETE);
        assert_eq!(Percentage::from_raw(f64::NEG_INFINITY), Percentage::ZERO);
        assert_eq!(Percentage::from_raw(f64::NAN), Percentage::ZERO);
    }

    #[test]
    fn rounds_fractional_values() {
        assert_eq!(Percentage::from_raw(42.4).value(), 42);
        assert_eq!(Percentage::from_raw(42.5).value(), 43);
        assert_eq!(Percentage::from_raw(99.9).value(), 100);
    }

    #[test]
    fn from_u8_caps_at_100() {
        assert_eq!(Percentage::from(250).value(), 100);
        assert_eq!(Percentage::from(7).to_string(), "7%");
    }

    #[test]
    fn payload_accepts_integers_and_floats() {
        let payload: ProgressPayload = serde_json::from_str(r#"{"percentage":37}"#).unwrap();
        assert_eq!(payload.clamped().value(), 37);
        let payload: ProgressPayload = serde_json::from_str(r#"{"percentage":-12.5}"#).unwrap();
        assert_eq!(payload.clamped(), Percentage::ZERO);
    }
}
