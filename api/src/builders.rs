//! Builder structs behind the fluent surface.
//!
//! Each builder remembers half of a sentence ("will return 5 ...", "assert a
//! fault matching ...") and completes it when given a target: either by
//! producing a quoted-call proxy whose next call finishes the build, or by
//! installing the expectation immediately.

use std::cell::Cell;
use std::rc::Rc;

use effigy_core::{
    CallHandler, DefaultValues, Double, Dupplery, EngineError, Expectation, MatchingRuleset,
    Outcome, Response,
};
use effigy_types::{Call, SharedFaultMatcher, SharedMatcher, Value};

/// Builds one stub expectation: knows the response; the target and call
/// shape arrive later in the chain.
///
/// `from` returns a quoted-call proxy: the next call invoked against it is
/// the call shape being stubbed, not an action.
pub struct StubExpectationBuilder {
    response: Response,
    low_priority: bool,
}

impl StubExpectationBuilder {
    pub(crate) fn new(response: Response) -> Self {
        Self {
            response,
            low_priority: false,
        }
    }

    /// Marks this as a low-priority expectation, consulted after every
    /// normal expectation, including normal expectations added later.
    #[must_use]
    pub fn with_low_priority(mut self) -> Self {
        self.low_priority = true;
        self
    }

    /// A quoted-call proxy for `target`: invoke the call to stub against it.
    #[must_use]
    pub fn from(&self, target: &Double) -> Double {
        target.creator().quote_expectation(
            target.imposterized_type(),
            self.response.clone(),
            self.low_priority,
        )
    }

    /// Installs the response for any call to `target`, immediately.
    pub fn from_any_call_to(&self, target: &Double) {
        let expectation = Expectation::any_call(self.response.clone());
        let dupplery = target.creator();
        if self.low_priority {
            dupplery.add_low_priority_expectation(expectation);
        } else {
            dupplery.add_normal_expectation(expectation);
        }
    }
}

/// Accumulates stand-ins for an assertion where some argument positions are
/// matched by predicate rather than equality.
pub struct AssertWhereCollector {
    ruleset: MatchingRuleset,
}

impl AssertWhereCollector {
    pub(crate) fn new(sentinel: Value, matcher: SharedMatcher) -> Self {
        let mut ruleset = MatchingRuleset::exact();
        ruleset.add_stand_in(sentinel, matcher);
        Self { ruleset }
    }

    /// Adds another stand-in. Use a distinct sentinel per argument position;
    /// reusing one overwrites the earlier predicate.
    #[must_use]
    pub fn and_where(mut self, sentinel: impl Into<Value>, matcher: SharedMatcher) -> Self {
        self.ruleset.add_stand_in(sentinel.into(), matcher);
        self
    }

    /// A quoted-call proxy asserting the described call was recorded.
    #[must_use]
    pub fn assert_called(&self, target: &Double) -> Double {
        target
            .creator()
            .assert_called_with_ruleset(self.ruleset.clone(), target, true)
    }

    /// A quoted-call proxy asserting the described call was never recorded.
    #[must_use]
    pub fn assert_not_called(&self, target: &Double) -> Double {
        target
            .creator()
            .assert_called_with_ruleset(self.ruleset.clone(), target, false)
    }
}

/// Remembers the desired property of a fault expected from an upcoming call.
pub struct FaultAssertionBuilder {
    matcher: SharedFaultMatcher,
}

impl FaultAssertionBuilder {
    pub(crate) fn new(matcher: SharedFaultMatcher) -> Self {
        Self { matcher }
    }

    /// A probing proxy around `backing`: every call is delegated, and must
    /// raise a fault accepted by the matcher. A matching fault is swallowed
    /// and a default value returned; a non-matching fault or a normal
    /// completion panics with the actual outcome (including the fault's
    /// captured trace).
    #[must_use]
    pub fn from(&self, type_name: &str, backing: impl CallHandler + 'static) -> Double {
        let handler = Rc::new(FaultCheckHandler {
            backing: Rc::new(backing),
            matcher: self.matcher.clone(),
            defaults: DefaultValues::new(),
        });
        Dupplery::new().imposterize(type_name, handler)
    }
}

struct FaultCheckHandler {
    backing: Rc<dyn CallHandler>,
    matcher: SharedFaultMatcher,
    defaults: DefaultValues,
}

impl CallHandler for FaultCheckHandler {
    fn handle(&self, call: Call) -> Outcome {
        match self.backing.handle(call.clone()) {
            Err(actual) => {
                if self.matcher.matches(&actual) {
                    Ok(self.defaults.default_for(call.returns()))
                } else {
                    panic!(
                        "{}",
                        EngineError::FaultMismatch {
                            expected: self.matcher.to_string(),
                            actual: actual.to_string(),
                            trace: actual.trace().to_owned(),
                        }
                    );
                }
            }
            Ok(_) => panic!(
                "{}",
                EngineError::NothingThrown {
                    expected: self.matcher.to_string(),
                }
            ),
        }
    }
}

/// Remembers the desired property of the value an upcoming call returns.
pub struct ReturnAssertionBuilder {
    matcher: SharedMatcher,
}

impl ReturnAssertionBuilder {
    pub(crate) fn new(matcher: SharedMatcher) -> Self {
        Self { matcher }
    }

    /// A probing proxy around `backing`: the first call is delegated and its
    /// returned value checked against the matcher; later calls delegate
    /// unchecked. The proxy itself answers with a default value; faults from
    /// the backing target propagate unmodified.
    #[must_use]
    pub fn from(&self, type_name: &str, backing: impl CallHandler + 'static) -> Double {
        let handler = Rc::new(ReturnCheckHandler {
            backing: Rc::new(backing),
            matcher: self.matcher.clone(),
            defaults: DefaultValues::new(),
            first_invocation: Cell::new(true),
        });
        Dupplery::new().imposterize(type_name, handler)
    }
}

struct ReturnCheckHandler {
    backing: Rc<dyn CallHandler>,
    matcher: SharedMatcher,
    defaults: DefaultValues,
    first_invocation: Cell<bool>,
}

impl CallHandler for ReturnCheckHandler {
    fn handle(&self, call: Call) -> Outcome {
        let returned = self.backing.handle(call.clone())?;
        if self.first_invocation.replace(false) && !self.matcher.matches(&returned) {
            panic!(
                "{}",
                EngineError::ReturnMismatch {
                    context: call.to_string(),
                    expected: self.matcher.to_string(),
                    actual: returned.to_string(),
                }
            );
        }
        Ok(self.defaults.default_for(call.returns()))
    }
}
