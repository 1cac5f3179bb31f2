//! The Effigy engine: invocation interception, recording, and matching.
//!
//! Every call made against a double is converted into a [`Call`] snapshot and
//! routed to the handler the double was created with. Handlers read and write
//! the [`InvocationLog`] and [`ExpectationRegistry`] owned by the originating
//! [`Dupplery`] (the double controller); a double keeps a back-reference to
//! its controller so later builder operations route to the right state.
//!
//! Everything here is single-threaded by construction (`Rc`/`RefCell`, no
//! `Send` or `Sync` anywhere): one controller's doubles are meant to be
//! driven from one test thread, and concurrent use is out of contract.
//!
//! [`Call`]: effigy_types::Call

mod defaults;
mod double;
mod dupplery;
mod error;
mod invocation;
mod log;
mod naming;
mod registry;
mod ruleset;

pub use defaults::DefaultValues;
pub use double::{CallHandler, Double, IgnoredMethods, Outcome};
pub use dupplery::Dupplery;
pub use error::EngineError;
pub use invocation::InvocationRecord;
pub use log::InvocationLog;
pub use naming::NameSequence;
pub use registry::{CallShape, Expectation, ExpectationRegistry, Response};
pub use ruleset::{CallPredicate, MatchingRuleset};
