use std::fmt;

/// The one-line status shown under the detail form.
///
/// Success and failure are tagged explicitly; the wording of a message never decides how it is
/// displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Success(String),
    Error(String),
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self::Success(text.into())
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::Error(text.into())
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Success(text) | Self::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
