//! Matcher traits and combinators.
//!
//! A [`ValueMatcher`] is the pluggable half of the equality-with-exceptions
//! ruleset: argument positions default to exact equality, and a stand-in
//! substitutes one of these predicates instead. [`FaultMatcher`] is the
//! analogous seam for thrown-error assertions.

use std::fmt;
use std::rc::Rc;

use crate::fault::Fault;
use crate::value::Value;

/// A pure predicate over one argument value. `Display` is the description
/// that appears in diagnostics.
pub trait ValueMatcher: fmt::Display {
    fn matches(&self, actual: &Value) -> bool;
}

pub type SharedMatcher = Rc<dyn ValueMatcher>;

struct EqMatcher(Value);

impl ValueMatcher for EqMatcher {
    fn matches(&self, actual: &Value) -> bool {
        self.0 == *actual
    }
}

impl fmt::Display for EqMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Matches exactly the given value.
pub fn eq(expected: impl Into<Value>) -> SharedMatcher {
    Rc::new(EqMatcher(expected.into()))
}

struct AnyMatcher;

impl ValueMatcher for AnyMatcher {
    fn matches(&self, _actual: &Value) -> bool {
        true
    }
}

impl fmt::Display for AnyMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<any>")
    }
}

/// Matches every value.
pub fn any() -> SharedMatcher {
    Rc::new(AnyMatcher)
}

struct ContainsStr(String);

impl ValueMatcher for ContainsStr {
    fn matches(&self, actual: &Value) -> bool {
        match actual {
            Value::Str(s) => s.contains(&self.0),
            _ => false,
        }
    }
}

impl fmt::Display for ContainsStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contains({})", self.0)
    }
}

/// Matches string values containing the given substring.
pub fn contains_str(needle: impl Into<String>) -> SharedMatcher {
    Rc::new(ContainsStr(needle.into()))
}

struct StartsWith(String);

impl ValueMatcher for StartsWith {
    fn matches(&self, actual: &Value) -> bool {
        match actual {
            Value::Str(s) => s.starts_with(&self.0),
            _ => false,
        }
    }
}

impl fmt::Display for StartsWith {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "starts_with({})", self.0)
    }
}

/// Matches string values starting with the given prefix.
pub fn starts_with(prefix: impl Into<String>) -> SharedMatcher {
    Rc::new(StartsWith(prefix.into()))
}

struct PredicateMatcher<F> {
    description: String,
    check: F,
}

impl<F: Fn(&Value) -> bool> ValueMatcher for PredicateMatcher<F> {
    fn matches(&self, actual: &Value) -> bool {
        (self.check)(actual)
    }
}

impl<F> fmt::Display for PredicateMatcher<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}

/// Matches values accepted by an arbitrary predicate; `description` is used
/// in diagnostics.
pub fn predicate(
    description: impl Into<String>,
    check: impl Fn(&Value) -> bool + 'static,
) -> SharedMatcher {
    Rc::new(PredicateMatcher {
        description: description.into(),
        check,
    })
}

/// A pure predicate over a raised [`Fault`].
pub trait FaultMatcher: fmt::Display {
    fn matches(&self, actual: &Fault) -> bool;
}

pub type SharedFaultMatcher = Rc<dyn FaultMatcher>;

struct FaultEq(Fault);

impl FaultMatcher for FaultEq {
    fn matches(&self, actual: &Fault) -> bool {
        self.0 == *actual
    }
}

impl fmt::Display for FaultEq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Matches a fault equal (kind and message) to the given one.
pub fn fault_eq(expected: Fault) -> SharedFaultMatcher {
    Rc::new(FaultEq(expected))
}

struct FaultKind(String);

impl FaultMatcher for FaultKind {
    fn matches(&self, actual: &Fault) -> bool {
        actual.kind() == self.0
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fault of kind {}", self.0)
    }
}

/// Matches any fault of the given kind, regardless of message.
pub fn fault_kind(kind: impl Into<String>) -> SharedFaultMatcher {
    Rc::new(FaultKind(kind.into()))
}

struct FaultMessageContains(String);

impl FaultMatcher for FaultMessageContains {
    fn matches(&self, actual: &Fault) -> bool {
        actual.message().contains(&self.0)
    }
}

impl fmt::Display for FaultMessageContains {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fault with message containing({})", self.0)
    }
}

/// Matches any fault whose message contains the given substring.
pub fn fault_message_contains(needle: impl Into<String>) -> SharedFaultMatcher {
    Rc::new(FaultMessageContains(needle.into()))
}

struct AnyFault;

impl FaultMatcher for AnyFault {
    fn matches(&self, _actual: &Fault) -> bool {
        true
    }
}

impl fmt::Display for AnyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<any fault>")
    }
}

/// Matches every fault.
pub fn any_fault() -> SharedFaultMatcher {
    Rc::new(AnyFault)
}
