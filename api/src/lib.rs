//! Effigy: test doubles with recording, stubbing, and call assertions.
//!
//! A double is driven through a thin shim: a newtype over [`Double`] that
//! implements the trait under test and forwards every method through
//! [`Double::invoke`]. This crate is the fluent surface over the engine —
//! free functions that read like sentences, each routing to the controller
//! the target double remembers.
//!
//! Recording and asserting:
//!
//! ```
//! use effigy::{Call, assert_called, recorder};
//!
//! let browser = recorder("Browser");
//! browser
//!     .invoke(Call::of("click", vec!["link=Sign in".into()]))
//!     .unwrap();
//! assert_called(&browser)
//!     .invoke(Call::of("click", vec!["link=Sign in".into()]))
//!     .unwrap();
//! ```
//!
//! Stubbing:
//!
//! ```
//! use effigy::{Call, TypeDescriptor, Value, stub, will_return};
//!
//! let source = stub("FileNameSource");
//! will_return("cached.txt")
//!     .from(&source)
//!     .invoke(Call::returning("get_filename", vec![], TypeDescriptor::Str))
//!     .unwrap();
//!
//! let name = source
//!     .invoke(Call::returning("get_filename", vec![], TypeDescriptor::Str))
//!     .unwrap();
//! assert_eq!(name, Value::from("cached.txt"));
//! ```
//!
//! Single-threaded by construction: doubles and controllers are `Rc`-based
//! and must stay on the test thread that created them.

use std::rc::Rc;

mod builders;

pub use builders::{
    AssertWhereCollector, FaultAssertionBuilder, ReturnAssertionBuilder, StubExpectationBuilder,
};
pub use effigy_core::{
    CallHandler, CallPredicate, DefaultValues, Double, Dupplery, EngineError, Expectation,
    IgnoredMethods, MatchingRuleset, Outcome, Response,
};
pub use effigy_types::{
    Call, Fault, FaultMatcher, MethodId, OpaqueValue, SharedFaultMatcher, SharedMatcher, TargetId,
    TypeDescriptor, Value, ValueMatcher, any, any_fault, contains_str, eq, fault_eq, fault_kind,
    fault_message_contains, predicate, starts_with,
};

// ── Recording ────────────────────────────────────────────────────

/// A double for `type_name` that remembers all incoming calls for later
/// [`assert_called`] checks, answering each with a default value.
#[must_use]
pub fn recorder(type_name: &str) -> Double {
    Dupplery::new().record_calls(type_name)
}

/// A wrapper around `target` that remembers all incoming calls and delegates
/// each one to `target` for its result and side effects. This is how
/// record-and-stub is composed.
#[must_use]
pub fn recorder_of(target: &Double) -> Double {
    target
        .creator()
        .record_calls_on(target.imposterized_type(), Rc::new(target.clone()))
}

/// Ordered views of the calls recorded against doubles from `target`'s
/// controller. The views answer `==`, hashing, and `to_string()` correctly.
#[must_use]
pub fn calls_to(target: &Double) -> Vec<Call> {
    target.creator().invocations()
}

/// A quoted-call proxy: the next call invoked against it must match a
/// recorded call, or the assertion panics. Matching uses the default
/// ruleset, in which every argument must be exactly equal.
#[must_use]
pub fn assert_called(target: &Double) -> Double {
    target.creator().assert_called(target)
}

/// A quoted-call proxy: the next call invoked against it must NOT match any
/// recorded call, or the assertion panics.
#[must_use]
pub fn assert_not_called(target: &Double) -> Double {
    target.creator().assert_not_called(target)
}

/// Panics unless every call recorded against `target` has been matched by a
/// previous [`assert_called`].
pub fn assert_no_other_calls(target: &Double) {
    target.creator().assert_no_other_calls(target);
}

/// Starts an assertion chain in which argument positions holding `sentinel`
/// are matched by `matcher` instead of equality:
///
/// ```
/// use effigy::{Call, contains_str, recorder, where_arg};
///
/// let person = recorder("Person");
/// person
///     .invoke(Call::of("set_name", vec!["Bob Martin".into()]))
///     .unwrap();
/// where_arg("x", contains_str("Bob"))
///     .assert_called(&person)
///     .invoke(Call::of("set_name", vec!["x".into()]))
///     .unwrap();
/// ```
#[must_use]
pub fn where_arg(sentinel: impl Into<Value>, matcher: SharedMatcher) -> AssertWhereCollector {
    AssertWhereCollector::new(sentinel.into(), matcher)
}

// ── Stubbing ─────────────────────────────────────────────────────

/// A stub for `type_name` that panics on any call until expectations are set
/// with [`will_return`], [`will_fail`], etc.
#[must_use]
pub fn stub(type_name: &str) -> Double {
    Dupplery::new().stub(type_name)
}

/// A stub for `type_name` that answers every call with a default value for
/// its return type.
#[must_use]
pub fn permissive_stub(type_name: &str) -> Double {
    Dupplery::new().permissive_stub(type_name)
}

/// Begins an expectation whose matching call will return `value`.
#[must_use]
pub fn will_return(value: impl Into<Value>) -> StubExpectationBuilder {
    StubExpectationBuilder::new(Response::Return(value.into()))
}

/// Begins an expectation whose matching call will return the default value
/// for its return type (false for booleans, zero for numbers, a registered
/// fallback for designated named types).
#[must_use]
pub fn will_return_default() -> StubExpectationBuilder {
    StubExpectationBuilder::new(Response::DefaultValue)
}

/// Begins an expectation whose matching call will raise `fault`.
#[must_use]
pub fn will_fail(fault: Fault) -> StubExpectationBuilder {
    StubExpectationBuilder::new(Response::Fail(fault))
}

// ── One-line behavior assertions ─────────────────────────────────

/// Begins an assertion that an upcoming call raises a fault accepted by
/// `matcher`. Complete it with [`FaultAssertionBuilder::from`].
#[must_use]
pub fn assert_fault(matcher: SharedFaultMatcher) -> FaultAssertionBuilder {
    FaultAssertionBuilder::new(matcher)
}

/// Begins an assertion that an upcoming call raises exactly `fault`
/// (compared by kind and message).
#[must_use]
pub fn assert_fault_raised(fault: Fault) -> FaultAssertionBuilder {
    FaultAssertionBuilder::new(fault_eq(fault))
}

/// Begins an assertion that an upcoming call returns a value accepted by
/// `matcher`. Complete it with [`ReturnAssertionBuilder::from`].
#[must_use]
pub fn assert_returned(matcher: SharedMatcher) -> ReturnAssertionBuilder {
    ReturnAssertionBuilder::new(matcher)
}
