use std::fmt;
use std::rc::Rc;

use effigy_types::{Call, Fault, Value};
use tracing::trace;

use crate::error::EngineError;
use crate::ruleset::CallPredicate;

/// What a stubbed call produces when its expectation matches.
#[derive(Debug, Clone)]
pub enum Response {
    /// Return this value.
    Return(Value),
    /// Raise this fault.
    Fail(Fault),
    /// Return the default value for the call's return type.
    DefaultValue,
}

/// Which calls an expectation covers.
#[derive(Debug, Clone)]
pub enum CallShape {
    /// Every call.
    Any,
    /// Calls satisfying the predicate a quoted call described.
    Matching(CallPredicate),
}

/// One (call shape, response) pair in the registry.
#[derive(Debug, Clone)]
pub struct Expectation {
    shape: CallShape,
    response: Response,
}

impl Expectation {
    #[must_use]
    pub fn matching(predicate: CallPredicate, response: Response) -> Self {
        Self {
            shape: CallShape::Matching(predicate),
            response,
        }
    }

    #[must_use]
    pub fn any_call(response: Response) -> Self {
        Self {
            shape: CallShape::Any,
            response,
        }
    }

    #[must_use]
    pub fn matches(&self, call: &Call) -> bool {
        match &self.shape {
            CallShape::Any => true,
            CallShape::Matching(predicate) => predicate.matches(call),
        }
    }

    #[must_use]
    pub fn response(&self) -> &Response {
        &self.response
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.shape {
            CallShape::Any => write!(f, "<any call>"),
            CallShape::Matching(predicate) => write!(f, "{predicate}"),
        }
    }
}

/// Two append-only buckets of expectations, dispatched first-match-wins.
///
/// Normal-bucket entries are always consulted before any low-priority entry,
/// regardless of insertion interleaving; within a bucket, insertion order
/// decides.
#[derive(Debug, Default)]
pub struct ExpectationRegistry {
    normal: Vec<Rc<Expectation>>,
    low_priority: Vec<Rc<Expectation>>,
}

impl ExpectationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_normal(&mut self, expectation: Expectation) {
        trace!(%expectation, "normal expectation added");
        self.normal.push(Rc::new(expectation));
    }

    pub fn add_low_priority(&mut self, expectation: Expectation) {
        trace!(%expectation, "low-priority expectation added");
        self.low_priority.push(Rc::new(expectation));
    }

    /// Routes `call` to the first matching expectation's response, or fails
    /// with [`EngineError::UnexpectedCall`].
    ///
    /// The buckets are snapshotted before iterating, so an expectation added
    /// while a response is being acted on cannot affect the dispatch that
    /// produced it.
    pub fn dispatch(&self, call: &Call) -> Result<Response, EngineError> {
        let snapshot: Vec<Rc<Expectation>> = self
            .normal
            .iter()
            .chain(self.low_priority.iter())
            .cloned()
            .collect();

        for expectation in snapshot {
            if expectation.matches(call) {
                trace!(%call, %expectation, "dispatched to expectation");
                return Ok(expectation.response().clone());
            }
        }
        Err(EngineError::UnexpectedCall {
            call: call.to_string(),
        })
    }
}
