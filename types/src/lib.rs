//! Core domain types for Effigy.
//!
//! This crate contains pure domain types with no IO, no async, and minimal
//! dependencies: the dynamic [`Value`] that flows through intercepted calls,
//! the [`Call`] snapshot of one invocation, the matcher traits that drive
//! equality-with-exceptions comparison, and the [`Fault`] value a stubbed
//! call can raise.

mod fault;
mod ids;
mod matcher;
mod method;
mod value;

pub use fault::Fault;
pub use ids::TargetId;
pub use matcher::{
    FaultMatcher, SharedFaultMatcher, SharedMatcher, ValueMatcher, any, any_fault, contains_str,
    eq, fault_eq, fault_kind, fault_message_contains, predicate, starts_with,
};
pub use method::{Call, MethodId, TypeDescriptor};
pub use value::{OpaqueValue, Value};
