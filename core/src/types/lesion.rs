use crate::error::{Result, ScintiError};
use std::fmt;

/// Stable lesion identifier stored in the `id` attribute of both halves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(transparent))]
pub struct LesionId(u64);

impl LesionId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Returns the id following this one, or `None` once ids run out
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    /// Parses an integer-like attribute value ("12", " 12 ", "12.0")
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<u64>() {
            return Ok(Self(value));
        }
        // Some hosts store numbers as floats when they round-trip a project
        match trimmed.parse::<f64>() {
            Ok(f) if f.fract() == 0.0 && f >= 0.0 && f < u64::MAX as f64 => Ok(Self(f as u64)),
            _ => Err(ScintiError::InvalidLesionId(s.to_string())),
        }
    }
}

impl fmt::Display for LesionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for LesionId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", 1)]
    #[case(" 42 ", 42)]
    #[case("7.0", 7)]
    #[case("5000000000", 5_000_000_000)]
    #[case("18446744073709551615", u64::MAX)]
    fn test_parse(#[case] input: &str, #[case] expected: u64) {
        assert_eq!(LesionId::parse(input).unwrap().value(), expected);
    }

    #[rstest]
    #[case("abc")]
    #[case("1.5")]
    #[case("-3")]
    #[case("")]
    #[case("18446744073709551616")]
    fn test_parse_invalid(#[case] input: &str) {
        assert!(LesionId::parse(input).is_err());
    }

    #[test]
    fn test_ordering_and_next() {
        assert!(LesionId::new(2) < LesionId::new(10));
        assert_eq!(LesionId::new(9).next(), Some(LesionId::new(10)));
        assert_eq!(LesionId::new(u64::MAX).next(), None);
        assert_eq!(LesionId::new(3).to_string(), "3");
    }
}
