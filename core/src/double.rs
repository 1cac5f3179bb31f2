//! The double itself: a call router plus an explicit origin capability.
//!
//! Rust cannot synthesize an implementation of an arbitrary trait at
//! runtime, so a double is driven through a thin per-trait shim: a newtype
//! over [`Double`] that implements the user's trait and forwards every
//! method through [`Double::invoke`] as a [`Call`]. The handler bound at
//! creation decides what interception means (record, stub-dispatch, or
//! assertion-check), and never changes for the double's lifetime.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use effigy_types::{Call, Fault, MethodId, TargetId, Value};

use crate::dupplery::Dupplery;

/// What one intercepted call produces: a value, or a raised fault.
pub type Outcome = Result<Value, Fault>;

/// Receives every call routed through a double.
///
/// Also the shape of a "real backing target": anything that can answer calls
/// can back a recording double or be probed by a fault/return assertion.
pub trait CallHandler {
    fn handle(&self, call: Call) -> Outcome;
}

impl<F> CallHandler for F
where
    F: Fn(Call) -> Outcome,
{
    fn handle(&self, call: Call) -> Outcome {
        self(call)
    }
}

/// A synthesized stand-in bound to one handler and one controller.
///
/// The origin capability is explicit struct surface ([`Double::creator`],
/// [`Double::imposterized_type`], [`Double::name`]): answering "who created
/// me" never routes through the handler, so it can never be logged.
#[derive(Clone)]
pub struct Double {
    target: TargetId,
    name: String,
    imposterized: String,
    creator: Dupplery,
    handler: Rc<dyn CallHandler>,
}

impl Double {
    pub(crate) fn new(
        target: TargetId,
        name: String,
        imposterized: String,
        creator: Dupplery,
        handler: Rc<dyn CallHandler>,
    ) -> Self {
        Self {
            target,
            name,
            imposterized,
            creator,
            handler,
        }
    }

    /// Routes one call to the bound handler.
    ///
    /// # Panics
    ///
    /// Panics when the handler hits an assertion or dispatch failure (an
    /// unexpected stub call, a failed quoted-call assertion); the panic
    /// message is the rendered engine error. A stubbed fault is returned as
    /// `Err`, not a panic.
    pub fn invoke(&self, call: Call) -> Outcome {
        self.handler.handle(call)
    }

    /// The controller that created this double.
    #[must_use]
    pub fn creator(&self) -> Dupplery {
        self.creator.clone()
    }

    /// The type this double impersonates.
    #[must_use]
    pub fn imposterized_type(&self) -> &str {
        &self.imposterized
    }

    /// The generated name of this double, unique within its controller.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn target(&self) -> TargetId {
        self.target
    }
}

/// A double can back another double (record-and-stub composition) or be
/// probed by a fault/return assertion.
impl CallHandler for Double {
    fn handle(&self, call: Call) -> Outcome {
        self.invoke(call)
    }
}

impl fmt::Debug for Double {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Double")
            .field("target", &self.target)
            .field("name", &self.name)
            .field("imposterized", &self.imposterized)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Double {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The call-identity filter applied before a recording handler appends.
///
/// Holds the method identities whose calls are interception plumbing rather
/// than behavior under test; by default, the origin capability's own
/// accessor set. A user method that merely shares a name with one of these
/// but differs in arity is recorded normally.
#[derive(Debug, Clone, Default)]
pub struct IgnoredMethods {
    methods: HashSet<MethodId>,
}

impl IgnoredMethods {
    /// Ignores nothing.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// The origin capability's method set: `creator()`,
    /// `imposterized_type()`, and `name()`, all nullary.
    #[must_use]
    pub fn origin_introspection() -> Self {
        let methods = ["creator", "imposterized_type", "name"]
            .into_iter()
            .map(|name| MethodId::new(name, 0))
            .collect();
        Self { methods }
    }

    pub fn insert(&mut self, method: MethodId) {
        self.methods.insert(method);
    }

    #[must_use]
    pub fn contains(&self, method: &MethodId) -> bool {
        self.methods.contains(method)
    }
}
