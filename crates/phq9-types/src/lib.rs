//! Validated primitive types shared across the PHQ-9 workspace.
//!
//! These types enforce their invariants at construction so that downstream code (scoring,
//! configuration, FHIR rendering) never has to re-check them.

/// Errors that can occur when constructing validated types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TypeError {
    /// The input text was empty or contained only whitespace.
    #[error("text cannot be empty")]
    EmptyText,

    /// A questionnaire response value was outside the 0–3 option range.
    #[error("response value {0} is out of range (expected 0-3)")]
    ResponseOutOfRange(i64),

    /// A response value was submitted as text that is not a whole number.
    #[error("response value '{0}' is not a number (expected 0-3)")]
    ResponseNotANumber(String),
}

// ============================================================================
// NonEmptyText
// ============================================================================

/// A trimmed string that is guaranteed to contain at least one non-whitespace character.
///
/// Used for externally supplied configuration values (client id, issuer, scopes) which must be
/// present before the application starts serving launches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText`, trimming leading and trailing whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::EmptyText`] if nothing remains after trimming.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TypeError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TypeError::EmptyText);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for NonEmptyText {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ============================================================================
// ResponseValue
// ============================================================================

/// The value of a single PHQ-9 answer.
///
/// Each question is answered on a four-point frequency scale, so the only valid values are
/// `0..=3`. Serialises as a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResponseValue(u8);

impl ResponseValue {
    /// Largest value an answer can take.
    pub const MAX: u8 = 3;

    /// All valid response values in ascending order.
    pub const ALL: [ResponseValue; 4] = [
        ResponseValue(0),
        ResponseValue(1),
        ResponseValue(2),
        ResponseValue(3),
    ];

    /// Creates a response value from any integer.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::ResponseOutOfRange`] unless `value` is in `0..=3`.
    pub fn new(value: i64) -> Result<Self, TypeError> {
        match u8::try_from(value) {
            Ok(v) if v <= Self::MAX => Ok(Self(v)),
            _ => Err(TypeError::ResponseOutOfRange(value)),
        }
    }

    /// Returns the numeric value.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for ResponseValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ResponseValue {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let value = text
            .parse::<i64>()
            .map_err(|_| TypeError::ResponseNotANumber(text.to_string()))?;
        Self::new(value)
    }
}

impl serde::Serialize for ResponseValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for ResponseValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = i64::deserialize(deserializer)?;
        ResponseValue::new(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  phq9-app  ").expect("valid text");
        assert_eq!(text.as_str(), "phq9-app");
    }

    #[test]
    fn non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new(" \t ").unwrap_err(), TypeError::EmptyText);
        assert_eq!("".parse::<NonEmptyText>().unwrap_err(), TypeError::EmptyText);
    }

    #[test]
    fn response_value_accepts_option_range() {
        for v in 0..=3 {
            assert_eq!(ResponseValue::new(v).expect("in range").get() as i64, v);
        }
    }

    #[test]
    fn response_value_rejects_out_of_range() {
        assert_eq!(
            ResponseValue::new(4).unwrap_err(),
            TypeError::ResponseOutOfRange(4)
        );
        assert_eq!(
            ResponseValue::new(-1).unwrap_err(),
            TypeError::ResponseOutOfRange(-1)
        );
        assert_eq!(" 2 ".parse::<ResponseValue>().expect("parse"), ResponseValue::ALL[2]);
        assert_eq!(
            "9".parse::<ResponseValue>().unwrap_err(),
            TypeError::ResponseOutOfRange(9)
        );
    }

    #[test]
    fn response_value_text_keeps_what_was_sent() {
        let err = "abc".parse::<ResponseValue>().unwrap_err();
        assert_eq!(err, TypeError::ResponseNotANumber("abc".into()));
        assert_eq!(
            err.to_string(),
            "response value 'abc' is not a number (expected 0-3)"
        );
    }

    #[test]
    fn response_value_serde_is_bare_integer() {
        let json = serde_json::to_string(&ResponseValue::ALL[3]).expect("serialise");
        assert_eq!(json, "3");

        let err = serde_json::from_str::<ResponseValue>("7").expect_err("should reject 7");
        assert!(err.to_string().contains("out of range"));
    }
}
