//! The dynamic value that flows through intercepted calls.
//!
//! Arguments and return values cross the double boundary as [`Value`], so the
//! engine can compare, hash, and render them without knowing the user's trait.
//! Arbitrary user types participate through the [`OpaqueValue`] escape hatch.

use std::any::{self, Any};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::rc::Rc;

/// A user type lifted into [`Value::Opaque`].
///
/// Equality is by downcast: two opaque values are equal only when they wrap
/// the same concrete type and that type's `PartialEq` agrees.
pub trait OpaqueValue: fmt::Debug + fmt::Display {
    fn eq_value(&self, other: &dyn OpaqueValue) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

struct OpaqueBox<T>(T);

impl<T> OpaqueValue for OpaqueBox<T>
where
    T: PartialEq + fmt::Debug + fmt::Display + 'static,
{
    fn eq_value(&self, other: &dyn OpaqueValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|v| self.0 == *v)
    }

    fn as_any(&self) -> &dyn Any {
        &self.0
    }

    fn type_name(&self) -> &'static str {
        any::type_name::<T>()
    }
}

impl<T: fmt::Debug> fmt::Debug for OpaqueBox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<T: fmt::Display> fmt::Display for OpaqueBox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A dynamically typed argument or return value.
///
/// Not serializable: an opaque value carries an arbitrary user type.
#[derive(Debug, Clone)]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Opaque(Rc<dyn OpaqueValue>),
}

impl Value {
    /// Lift an arbitrary user value into the dynamic value space.
    pub fn opaque<T>(value: T) -> Self
    where
        T: PartialEq + fmt::Debug + fmt::Display + 'static,
    {
        Value::Opaque(Rc::new(OpaqueBox(value)))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => a.eq_value(b.as_ref()),
            _ => false,
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Value::Unit => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            // Bit pattern keeps the equal-values-hash-equal contract.
            Value::Float(f) => f.to_bits().hash(state),
            Value::Str(s) => s.hash(state),
            Value::List(items) => items.hash(state),
            // Opaque payloads only contribute their type, which is the
            // widest hash consistent with downcast equality.
            Value::Opaque(o) => o.type_name().hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Opaque(o) => write!(f, "{o}"),
        }
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

#[cfg(test)]
mod tests {
    use super::Value;
    use std::collections::hash_map::DefaultHasher;
    use std::fmt;
    use std::hash::{Hash, Hasher};

    fn hash_of(value: &Value) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn equality_is_positional_by_variant() {
        assert_eq!(Value::from("a"), Value::from("a"));
        assert_ne!(Value::from("a"), Value::from("b"));
        assert_ne!(Value::from(1), Value::from("1"));
        assert_eq!(Value::from(vec![Value::from(1)]), Value::from(vec![Value::from(1)]));
    }

    #[test]
    fn equal_values_hash_equal() {
        assert_eq!(hash_of(&Value::from("a")), hash_of(&Value::from("a")));
        assert_eq!(hash_of(&Value::from(1.5)), hash_of(&Value::from(1.5)));
    }

    #[test]
    fn opaque_equality_requires_same_type() {
        #[derive(Debug, PartialEq)]
        struct Locator(u32);
        impl fmt::Display for Locator {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "locator#{}", self.0)
            }
        }

        assert_eq!(Value::opaque(Locator(7)), Value::opaque(Locator(7)));
        assert_ne!(Value::opaque(Locator(7)), Value::opaque(Locator(8)));
        assert_ne!(Value::opaque(Locator(7)), Value::opaque(7u32.to_string()));
    }

    #[test]
    fn renders_bare_values() {
        assert_eq!(Value::from("a").to_string(), "a");
        assert_eq!(Value::from(3).to_string(), "3");
        let list = Value::from(vec![Value::from(1), Value::from(2)]);
        assert_eq!(list.to_string(), "[1, 2]");
    }
}
