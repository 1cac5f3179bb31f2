//! The dynamic thrown-error value a stubbed or delegated call can raise.

use std::backtrace::Backtrace;
use std::rc::Rc;

/// An error value crossing the double boundary.
///
/// `kind` plays the role a thrown exception's type would play; `message` its
/// payload. A backtrace string is captured at construction for diagnostics
/// and is excluded from equality.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Fault {
    kind: String,
    message: String,
    trace: Rc<str>,
}

impl Fault {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            trace: Backtrace::capture().to_string().into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The backtrace captured where this fault was constructed. Empty-ish
    /// ("disabled backtrace") when `RUST_BACKTRACE` is not set.
    #[must_use]
    pub fn trace(&self) -> &str {
        &self.trace
    }
}

impl PartialEq for Fault {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.message == other.message
    }
}

#[cfg(test)]
mod tests {
    use super::Fault;

    #[test]
    fn equality_ignores_trace() {
        let a = Fault::new("IoError", "file missing");
        let b = Fault::new("IoError", "file missing");
        assert_eq!(a, b);
        assert_ne!(a, Fault::new("IoError", "other"));
        assert_ne!(a, Fault::new("ParseError", "file missing"));
    }

    #[test]
    fn renders_kind_and_message() {
        let fault = Fault::new("IoError", "file missing");
        assert_eq!(fault.to_string(), "IoError: file missing");
    }
}
