//! Validated primitive types shared by the dashboard service and its clients.

use std::fmt;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Opaque patient identifier.
///
/// Patient rosters in the wild carry ids either as JSON strings or as JSON numbers, so
/// deserialisation accepts both and keeps the textual form. Serialisation always emits a
/// string. An empty id is representable (a request may omit it); use [`PatientId::is_blank`]
/// before trusting it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatientId(String);

impl PatientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Returns a copy with surrounding whitespace removed.
    pub fn trimmed(&self) -> Self {
        Self(self.0.trim().to_owned())
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PatientId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for PatientId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for PatientId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for PatientId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PatientId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct PatientIdVisitor;

        impl serde::de::Visitor<'_> for PatientIdVisitor {
            type Value = PatientId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a patient id as a string or a number")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<PatientId, E> {
                Ok(PatientId::from(v))
            }

            fn visit_string<E: serde::de::Error>(self, v: String) -> Result<PatientId, E> {
                Ok(PatientId(v))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<PatientId, E> {
                Ok(PatientId(v.to_string()))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<PatientId, E> {
                Ok(PatientId(v.to_string()))
            }

            // Whole floats print without a fractional part, so `1.0` becomes "1".
            fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<PatientId, E> {
                Ok(PatientId(v.to_string()))
            }
        }

        deserializer.deserialize_any(PatientIdVisitor)
    }
}
