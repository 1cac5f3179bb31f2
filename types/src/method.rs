//! Method identity and the immutable snapshot of one intercepted call.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Identity of a method on a capability surface.
///
/// Name plus arity is enough to disambiguate the overload-like shapes a shim
/// can forward; parameter types are already erased into [`Value`] by then.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodId {
    name: String,
    arity: usize,
}

impl MethodId {
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// Describes a call's return type, for default-value generation only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TypeDescriptor {
    #[default]
    Unit,
    Bool,
    Int,
    Float,
    Str,
    List,
    /// A named capability or user type; defaults come from a registered
    /// fallback, if any.
    Named(String),
}

/// One dynamic call: method identity plus ordered argument values.
///
/// Equality and hashing cover method and arguments only; the return-type
/// descriptor is advisory (it feeds default-value computation and never
/// participates in matching).
#[derive(Debug, Clone)]
pub struct Call {
    method: MethodId,
    args: Vec<Value>,
    returns: TypeDescriptor,
}

impl Call {
    /// A call with a unit return type; arity is taken from the arguments.
    pub fn of(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self::returning(name, args, TypeDescriptor::Unit)
    }

    pub fn returning(name: impl Into<String>, args: Vec<Value>, returns: TypeDescriptor) -> Self {
        let method = MethodId::new(name, args.len());
        Self {
            method,
            args,
            returns,
        }
    }

    #[must_use]
    pub fn method(&self) -> &MethodId {
        &self.method
    }

    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    #[must_use]
    pub fn returns(&self) -> &TypeDescriptor {
        &self.returns
    }
}

impl PartialEq for Call {
    fn eq(&self, other: &Self) -> bool {
        self.method == other.method && self.args == other.args
    }
}

impl Hash for Call {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.method.hash(state);
        self.args.hash(state);
    }
}

/// Renders `methodName(arg1, arg2, ...)`, used verbatim in failure messages.
impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.method.name())?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::{Call, MethodId, TypeDescriptor};
    use crate::value::Value;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(call: &Call) -> u64 {
        let mut hasher = DefaultHasher::new();
        call.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn arity_comes_from_args() {
        let call = Call::of("key_press", vec!["name=q".into(), "\n".into()]);
        assert_eq!(call.method(), &MethodId::new("key_press", 2));
    }

    #[test]
    fn equality_ignores_return_type() {
        let a = Call::returning("get_eval", vec!["a".into()], TypeDescriptor::Str);
        let b = Call::of("get_eval", vec!["a".into()]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn renders_name_and_args() {
        let call = Call::of("get_eval", vec![Value::from("a")]);
        assert_eq!(call.to_string(), "get_eval(a)");
        let nullary = Call::of("size", vec![]);
        assert_eq!(nullary.to_string(), "size()");
    }
}
