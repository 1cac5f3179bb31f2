//! The double controller.
//!
//! A [`Dupplery`] owns one invocation log and one expectation registry, and
//! creates doubles bound to one of three handlers: recording (append to the
//! log, then delegate or default), stub-dispatch (route to the registry), or
//! assertion-check (treat the next call as a quoted call and match it
//! against the log). A double's handler is fixed at creation; composed
//! behavior such as record-and-stub is built by wrapping a stub double with
//! a recording double, never by switching modes.

use std::cell::RefCell;
use std::rc::Rc;

use effigy_types::{Call, TargetId, Value};
use tracing::{debug, trace};

use crate::defaults::DefaultValues;
use crate::double::{CallHandler, Double, IgnoredMethods, Outcome};
use crate::error::EngineError;
use crate::invocation::InvocationRecord;
use crate::log::InvocationLog;
use crate::naming::NameSequence;
use crate::registry::{Expectation, ExpectationRegistry, Response};
use crate::ruleset::MatchingRuleset;

#[derive(Debug)]
struct State {
    log: InvocationLog,
    expectations: ExpectationRegistry,
    defaults: DefaultValues,
    namer: NameSequence,
    ignored: IgnoredMethods,
    next_target: u64,
}

/// A handle on one test-double family: the log and registry its doubles
/// share, and the operations layered on them.
///
/// Cloning the handle shares the underlying state; controller identity is
/// the shared state's identity ([`Dupplery::eq`] is pointer equality).
/// Doubles from different controllers never share state, and one
/// controller's doubles are meant to be driven from a single test thread.
#[derive(Debug, Clone)]
pub struct Dupplery {
    state: Rc<RefCell<State>>,
}

impl Default for Dupplery {
    fn default() -> Self {
        Self::with_ignored_methods(IgnoredMethods::origin_introspection())
    }
}

impl PartialEq for Dupplery {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl Dupplery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A controller whose recording doubles filter the given method
    /// identities instead of the standard origin-introspection set.
    #[must_use]
    pub fn with_ignored_methods(ignored: IgnoredMethods) -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                log: InvocationLog::new(),
                expectations: ExpectationRegistry::new(),
                defaults: DefaultValues::new(),
                namer: NameSequence::new(),
                ignored,
                next_target: 1,
            })),
        }
    }

    /// Registers the default value returned for a named type, used whenever
    /// a call falls back to its return type's default.
    pub fn set_default_fallback(&self, type_name: impl Into<String>, value: Value) {
        self.state
            .borrow_mut()
            .defaults
            .set_fallback(type_name, value);
    }

    // ── Double creation ──────────────────────────────────────────

    /// A double that appends every non-ignored call to the log and returns
    /// the default value for the call's return type.
    #[must_use]
    pub fn record_calls(&self, type_name: &str) -> Double {
        self.recording_double(type_name, None)
    }

    /// A double that appends every non-ignored call to the log and then
    /// delegates the call to `backing` for its result. Faults raised by the
    /// backing target propagate unmodified; the call is recorded regardless.
    #[must_use]
    pub fn record_calls_on(&self, type_name: &str, backing: Rc<dyn CallHandler>) -> Double {
        self.recording_double(type_name, Some(backing))
    }

    /// A double that routes every call to the expectation registry. A call
    /// no expectation matches is always a failure.
    #[must_use]
    pub fn stub(&self, type_name: &str) -> Double {
        let handler = Rc::new(StubHandler {
            dupplery: self.clone(),
        });
        self.imposterize(type_name, handler)
    }

    /// A stub with a pre-installed low-priority expectation answering any
    /// call with the default value for its return type.
    #[must_use]
    pub fn permissive_stub(&self, type_name: &str) -> Double {
        let stub = self.stub(type_name);
        self.add_low_priority_expectation(Expectation::any_call(Response::DefaultValue));
        stub
    }

    /// Binds an externally built handler to a fresh double identity. This is
    /// the imposter-factory seam the builder layer uses for its probing
    /// proxies.
    #[must_use]
    pub fn imposterize(&self, type_name: &str, handler: Rc<dyn CallHandler>) -> Double {
        let (target, name) = self.allocate_identity(type_name);
        debug!(%target, %name, imposterized = type_name, "double created");
        Double::new(target, name, type_name.to_owned(), self.clone(), handler)
    }

    fn recording_double(&self, type_name: &str, backing: Option<Rc<dyn CallHandler>>) -> Double {
        let (target, name) = self.allocate_identity(type_name);
        debug!(%target, %name, imposterized = type_name, "recording double created");
        let handler = Rc::new(RecordingHandler {
            dupplery: self.clone(),
            target,
            backing,
        });
        Double::new(target, name, type_name.to_owned(), self.clone(), handler)
    }

    fn allocate_identity(&self, type_name: &str) -> (TargetId, String) {
        let mut state = self.state.borrow_mut();
        let target = TargetId::new(state.next_target);
        state.next_target += 1;
        let name = state.namer.name_for(type_name);
        (target, name)
    }

    // ── Assertions over the log ──────────────────────────────────

    /// A proxy whose next call is a quoted call: it must match a recorded
    /// call (default exact ruleset) or the assertion panics.
    #[must_use]
    pub fn assert_called(&self, target: &Double) -> Double {
        self.assert_called_with_ruleset(MatchingRuleset::exact(), target, true)
    }

    /// A proxy whose next call is a quoted call: it must NOT match any
    /// recorded call (default exact ruleset) or the assertion panics.
    #[must_use]
    pub fn assert_not_called(&self, target: &Double) -> Double {
        self.assert_called_with_ruleset(MatchingRuleset::exact(), target, false)
    }

    /// The general form: the quoted call is turned into a predicate by
    /// `ruleset` and searched for in the log (earliest match wins, matched
    /// record marked verified). `should_have_been_called` selects whether a
    /// hit or a miss is the failure.
    #[must_use]
    pub fn assert_called_with_ruleset(
        &self,
        ruleset: MatchingRuleset,
        target: &Double,
        should_have_been_called: bool,
    ) -> Double {
        let handler = Rc::new(MatchCheckHandler {
            dupplery: self.clone(),
            ruleset,
            should_have_been_called,
        });
        self.imposterize(target.imposterized_type(), handler)
    }

    /// Panics unless every recorded call against `target` has been matched
    /// by a prior quoted-call assertion.
    pub fn assert_no_other_calls(&self, target: &Double) {
        if let Err(err) = self.try_assert_no_other_calls(target) {
            panic!("{err}");
        }
    }

    pub fn try_assert_no_other_calls(&self, target: &Double) -> Result<(), EngineError> {
        self.state.borrow().log.check_no_unverified(target.target())
    }

    /// Ordered views of every call recorded by this controller's doubles.
    #[must_use]
    pub fn invocations(&self) -> Vec<Call> {
        self.state
            .borrow()
            .log
            .records()
            .iter()
            .map(|record| record.call().clone())
            .collect()
    }

    // ── Expectation surface (consumed by the builder layer) ──────

    pub fn add_normal_expectation(&self, expectation: Expectation) {
        self.state.borrow_mut().expectations.add_normal(expectation);
    }

    pub fn add_low_priority_expectation(&self, expectation: Expectation) {
        self.state
            .borrow_mut()
            .expectations
            .add_low_priority(expectation);
    }

    /// A proxy whose next call is a quoted call describing the expectation
    /// shape: the call is converted via the exact ruleset into an
    /// expectation carrying `response` and appended to the chosen bucket.
    /// The quoted call itself returns a default value.
    #[must_use]
    pub fn quote_expectation(
        &self,
        type_name: &str,
        response: Response,
        low_priority: bool,
    ) -> Double {
        let handler = Rc::new(ExpectationCaptureHandler {
            dupplery: self.clone(),
            response,
            low_priority,
        });
        self.imposterize(type_name, handler)
    }

    fn default_for(&self, call: &Call) -> Value {
        self.state.borrow().defaults.default_for(call.returns())
    }
}

// ── Handlers ─────────────────────────────────────────────────────

struct RecordingHandler {
    dupplery: Dupplery,
    target: TargetId,
    backing: Option<Rc<dyn CallHandler>>,
}

impl CallHandler for RecordingHandler {
    fn handle(&self, call: Call) -> Outcome {
        let ignored = self.dupplery.state.borrow().ignored.contains(call.method());
        if ignored {
            trace!(%call, "introspection call filtered before append");
        } else {
            self.dupplery
                .state
                .borrow_mut()
                .log
                .append(InvocationRecord::new(self.target, call.clone()));
        }
        // The borrow is released before delegation: the backing target may
        // be another double of this same controller.
        match &self.backing {
            Some(backing) => backing.handle(call),
            None => Ok(self.dupplery.default_for(&call)),
        }
    }
}

struct StubHandler {
    dupplery: Dupplery,
}

impl CallHandler for StubHandler {
    fn handle(&self, call: Call) -> Outcome {
        let dispatched = self.dupplery.state.borrow().expectations.dispatch(&call);
        match dispatched {
            Ok(Response::Return(value)) => Ok(value),
            Ok(Response::Fail(fault)) => Err(fault),
            Ok(Response::DefaultValue) => Ok(self.dupplery.default_for(&call)),
            Err(err) => panic!("{err}"),
        }
    }
}

struct MatchCheckHandler {
    dupplery: Dupplery,
    ruleset: MatchingRuleset,
    should_have_been_called: bool,
}

impl CallHandler for MatchCheckHandler {
    fn handle(&self, call: Call) -> Outcome {
        let predicate = self.ruleset.expect_match_of(&call);
        let (matched, log_rendering) = {
            let mut state = self.dupplery.state.borrow_mut();
            let matched = state.log.first_match(&predicate).is_some();
            let rendering = if matched {
                String::new()
            } else {
                state.log.render_all()
            };
            (matched, rendering)
        };
        if matched && !self.should_have_been_called {
            panic!(
                "{}",
                EngineError::UnexpectedlyInvoked {
                    call: call.to_string(),
                }
            );
        }
        if !matched && self.should_have_been_called {
            panic!(
                "{}",
                EngineError::NeverInvoked {
                    expected: call.to_string(),
                    log: log_rendering,
                }
            );
        }
        Ok(self.dupplery.default_for(&call))
    }
}

struct ExpectationCaptureHandler {
    dupplery: Dupplery,
    response: Response,
    low_priority: bool,
}

impl CallHandler for ExpectationCaptureHandler {
    fn handle(&self, call: Call) -> Outcome {
        let predicate = MatchingRuleset::exact().expect_match_of(&call);
        let expectation = Expectation::matching(predicate, self.response.clone());
        if self.low_priority {
            self.dupplery.add_low_priority_expectation(expectation);
        } else {
            self.dupplery.add_normal_expectation(expectation);
        }
        Ok(self.dupplery.default_for(&call))
    }
}

#[cfg(test)]
mod tests {
    use super::Dupplery;
    use crate::registry::{Expectation, Response};
    use crate::ruleset::MatchingRuleset;
    use effigy_types::{Call, TypeDescriptor, Value, contains_str};
    use std::rc::Rc;

    fn get_eval(expr: &str) -> Call {
        Call::returning("get_eval", vec![expr.into()], TypeDescriptor::Str)
    }

    #[test]
    fn recording_double_logs_in_order_and_returns_defaults() {
        let dupplery = Dupplery::new();
        let recorder = dupplery.record_calls("Browser");

        let returned = recorder.invoke(get_eval("a")).expect("recording never faults");
        assert_eq!(returned, Value::Str(String::new()));
        recorder.invoke(get_eval("b")).expect("recording never faults");

        assert_eq!(
            dupplery.invocations(),
            vec![get_eval("a"), get_eval("b")]
        );
    }

    #[test]
    fn doubles_remember_their_creator() {
        let dupplery = Dupplery::new();
        let recorder = dupplery.record_calls("Browser");
        assert_eq!(recorder.creator(), dupplery);
        assert_ne!(recorder.creator(), Dupplery::new());
        assert_eq!(recorder.imposterized_type(), "Browser");
        assert_eq!(recorder.name(), "browser");
    }

    #[test]
    fn quoted_expectation_stubs_the_matching_call_only() {
        let dupplery = Dupplery::new();
        let stub = dupplery.stub("Browser");

        let quoter =
            dupplery.quote_expectation("Browser", Response::Return("result".into()), false);
        quoter.invoke(get_eval("a")).expect("quoting never faults");

        assert_eq!(stub.invoke(get_eval("a")), Ok(Value::from("result")));
    }

    #[test]
    #[should_panic(expected = "unexpected call: get_eval(other)")]
    fn stub_panics_on_unmatched_call() {
        let dupplery = Dupplery::new();
        let stub = dupplery.stub("Browser");

        let quoter =
            dupplery.quote_expectation("Browser", Response::Return("result".into()), false);
        quoter.invoke(get_eval("a")).expect("quoting never faults");

        let _ = stub.invoke(get_eval("other"));
    }

    #[test]
    fn permissive_stub_answers_anything_with_defaults() {
        let dupplery = Dupplery::new();
        let stub = dupplery.permissive_stub("Browser");

        assert_eq!(stub.invoke(get_eval("a")), Ok(Value::Str(String::new())));
        assert_eq!(
            stub.invoke(Call::of("click", vec!["link=Go".into()])),
            Ok(Value::Unit)
        );
    }

    #[test]
    fn default_fallback_covers_named_return_types() {
        let dupplery = Dupplery::new();
        dupplery.set_default_fallback("FileName", Value::from("no_default"));
        let stub = dupplery.permissive_stub("Source");

        let call = Call::returning(
            "get_filename",
            vec![],
            TypeDescriptor::Named("FileName".to_owned()),
        );
        assert_eq!(stub.invoke(call), Ok(Value::from("no_default")));
    }

    #[test]
    fn assert_called_matches_and_verifies() {
        let dupplery = Dupplery::new();
        let recorder = dupplery.record_calls("Browser");
        recorder.invoke(get_eval("a")).expect("recording never faults");

        let asserter = dupplery.assert_called(&recorder);
        asserter.invoke(get_eval("a")).expect("assertion passes");

        assert!(dupplery.try_assert_no_other_calls(&recorder).is_ok());
    }

    #[test]
    #[should_panic(expected = "never invoked: get_eval(b)")]
    fn assert_called_panics_when_the_quoted_call_was_not_observed() {
        let dupplery = Dupplery::new();
        let recorder = dupplery.record_calls("Browser");
        recorder.invoke(get_eval("a")).expect("recording never faults");

        let asserter = dupplery.assert_called(&recorder);
        let _ = asserter.invoke(get_eval("b"));
    }

    #[test]
    #[should_panic(expected = "should not have invoked: get_eval(a)")]
    fn assert_not_called_panics_when_the_quoted_call_was_observed() {
        let dupplery = Dupplery::new();
        let recorder = dupplery.record_calls("Browser");
        recorder.invoke(get_eval("a")).expect("recording never faults");

        let asserter = dupplery.assert_not_called(&recorder);
        let _ = asserter.invoke(get_eval("a"));
    }

    #[test]
    fn ruleset_assertions_use_stand_ins() {
        let dupplery = Dupplery::new();
        let recorder = dupplery.record_calls("Browser");
        recorder
            .invoke(get_eval("here's sub"))
            .expect("recording never faults");

        let mut ruleset = MatchingRuleset::exact();
        ruleset.add_stand_in("x".into(), contains_str("sub"));
        let asserter = dupplery.assert_called_with_ruleset(ruleset, &recorder, true);
        asserter.invoke(get_eval("x")).expect("assertion passes");
    }

    #[test]
    fn no_other_calls_fails_while_any_record_is_unverified() {
        let dupplery = Dupplery::new();
        let recorder = dupplery.record_calls("Browser");
        recorder.invoke(get_eval("a")).expect("recording never faults");
        recorder.invoke(get_eval("b")).expect("recording never faults");

        dupplery
            .assert_called(&recorder)
            .invoke(get_eval("a"))
            .expect("assertion passes");

        let err = dupplery
            .try_assert_no_other_calls(&recorder)
            .expect_err("b is unmatched");
        assert!(err.to_string().contains("get_eval(b)"));
    }

    #[test]
    fn record_over_stub_composes_within_one_controller() {
        let dupplery = Dupplery::new();
        let stub = dupplery.permissive_stub("Browser");
        let quoter =
            dupplery.quote_expectation("Browser", Response::Return("stubbed".into()), false);
        quoter.invoke(get_eval("a")).expect("quoting never faults");

        let recorder = dupplery.record_calls_on("Browser", Rc::new(stub));
        assert_eq!(recorder.invoke(get_eval("a")), Ok(Value::from("stubbed")));
        assert_eq!(dupplery.invocations(), vec![get_eval("a")]);
    }

    #[test]
    fn origin_identities_are_filtered_but_lookalikes_record() {
        let dupplery = Dupplery::new();
        let recorder = dupplery.record_calls("Widget");

        recorder
            .invoke(Call::of("creator", vec![]))
            .expect("recording never faults");
        assert_eq!(dupplery.invocations().len(), 0);

        recorder
            .invoke(Call::of("creator", vec!["of_widgets".into()]))
            .expect("recording never faults");
        assert_eq!(
            dupplery.invocations(),
            vec![Call::of("creator", vec!["of_widgets".into()])]
        );
    }

    #[test]
    fn expectation_buckets_respect_priority_across_interleaving() {
        let dupplery = Dupplery::new();
        let stub = dupplery.stub("Browser");

        dupplery.add_low_priority_expectation(Expectation::any_call(Response::Return(
            "fallback".into(),
        )));
        let quoter =
            dupplery.quote_expectation("Browser", Response::Return("specific".into()), false);
        quoter.invoke(get_eval("a")).expect("quoting never faults");

        assert_eq!(stub.invoke(get_eval("a")), Ok(Value::from("specific")));
        assert_eq!(stub.invoke(get_eval("other")), Ok(Value::from("fallback")));
    }
}
