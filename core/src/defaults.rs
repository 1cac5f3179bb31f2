use std::collections::HashMap;

use effigy_types::{TypeDescriptor, Value};

/// Produces the value a call falls back to when no explicit result applies:
/// false/zero/empty for the structural kinds, a caller-registered fallback
/// for designated named types.
///
/// A named type with no registered fallback defaults to [`Value::Unit`]; a
/// dynamic value cannot carry a fresh double for a trait the engine has
/// never seen, so designated fallbacks are the supported path for reference
/// types.
#[derive(Debug, Clone, Default)]
pub struct DefaultValues {
    fallbacks: HashMap<String, Value>,
}

impl DefaultValues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the default for a named type, replacing any earlier one.
    pub fn set_fallback(&mut self, type_name: impl Into<String>, value: Value) {
        self.fallbacks.insert(type_name.into(), value);
    }

    #[must_use]
    pub fn default_for(&self, descriptor: &TypeDescriptor) -> Value {
        match descriptor {
            TypeDescriptor::Unit => Value::Unit,
            TypeDescriptor::Bool => Value::Bool(false),
            TypeDescriptor::Int => Value::Int(0),
            TypeDescriptor::Float => Value::Float(0.0),
            TypeDescriptor::Str => Value::Str(String::new()),
            TypeDescriptor::List => Value::List(Vec::new()),
            TypeDescriptor::Named(name) => {
                self.fallbacks.get(name).cloned().unwrap_or(Value::Unit)
            }
        }
    }
}
