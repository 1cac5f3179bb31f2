use thiserror::Error;

/// Failures the engine raises at the point of the offending operation.
///
/// Never deferred and never swallowed: the double surface converts these
/// into panics at the offending call, which is how a test-double assertion
/// aborts the running test.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// Stub dispatch found no matching expectation.
    #[error("unexpected call: {call}")]
    UnexpectedCall { call: String },

    /// Unverified recorded calls remain at no-other-calls time.
    #[error("also invoked: {{\n{}\n}}", .rendered.join("\n"))]
    UnverifiedCalls { rendered: Vec<String> },

    /// An expected quoted call never appeared in the log.
    #[error("never invoked: {expected}\nactually saw: {{\n{log}\n}}")]
    NeverInvoked { expected: String, log: String },

    /// An asserted-not-called call did appear in the log.
    #[error("should not have invoked: {call}")]
    UnexpectedlyInvoked { call: String },

    /// A delegated call returned a value the matcher rejected.
    #[error("when calling {context}, expected: {expected} but got {actual}")]
    ReturnMismatch {
        context: String,
        expected: String,
        actual: String,
    },

    /// A delegated call raised a fault the matcher rejected. The message
    /// carries the actual fault's string form and its captured trace.
    #[error("expected: {expected} but got {actual}\n{trace}")]
    FaultMismatch {
        expected: String,
        actual: String,
        trace: String,
    },

    /// A call expected to raise a fault completed normally.
    #[error("no fault raised, expected: {expected}")]
    NothingThrown { expected: String },
}

#[cfg(test)]
mod tests {
    use super::EngineError;

    #[test]
    fn never_invoked_message_embeds_the_log() {
        let err = EngineError::NeverInvoked {
            expected: "get_eval(a)".to_owned(),
            log: "get_eval(b)".to_owned(),
        };
        let message = err.to_string();
        assert!(message.starts_with("never invoked: get_eval(a)"));
        assert!(message.contains("{\nget_eval(b)\n}"));
    }

    #[test]
    fn fault_mismatch_message_carries_the_trace() {
        let err = EngineError::FaultMismatch {
            expected: "fault of kind IoError".to_owned(),
            actual: "ArithmeticError: divide by zero".to_owned(),
            trace: "at divide (calculator)".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "expected: fault of kind IoError but got ArithmeticError: divide by zero\nat divide (calculator)"
        );
    }

    #[test]
    fn unverified_calls_message_lists_each_call() {
        let err = EngineError::UnverifiedCalls {
            rendered: vec!["get_eval(a)".to_owned(), "get_eval(b)".to_owned()],
        };
        assert_eq!(
            err.to_string(),
            "also invoked: {\nget_eval(a)\nget_eval(b)\n}"
        );
    }
}
