//! Equality-with-exceptions matching.
//!
//! A ruleset decides whether a quoted call matches a recorded one. By default
//! every argument position is compared by value equality; a stand-in maps a
//! sentinel argument value to a predicate, so positions holding that sentinel
//! are matched by the predicate instead.

use std::fmt;

use effigy_types::{Call, MethodId, SharedMatcher, Value, eq};
use tracing::debug;

/// Builds match predicates for quoted calls, with optional stand-ins.
#[derive(Clone, Default)]
pub struct MatchingRuleset {
    stand_ins: Vec<(Value, SharedMatcher)>,
}

impl MatchingRuleset {
    /// A ruleset with no stand-ins: exact equality on every argument.
    #[must_use]
    pub fn exact() -> Self {
        Self::default()
    }

    /// Maps a sentinel value to a predicate. The table is a single mapping:
    /// re-adding an equal sentinel overwrites the earlier predicate, so a
    /// sentinel reused across argument positions silently drops its first
    /// predicate. Use a distinct sentinel per position, and keep sentinels
    /// distinguishable by equality from real argument values in the same
    /// assertion.
    pub fn add_stand_in(&mut self, sentinel: Value, matcher: SharedMatcher) {
        if let Some(slot) = self.stand_ins.iter_mut().find(|(key, _)| *key == sentinel) {
            debug!(sentinel = %sentinel, "stand-in overwritten; earlier predicate dropped");
            slot.1 = matcher;
        } else {
            self.stand_ins.push((sentinel, matcher));
        }
    }

    fn matcher_for(&self, arg: &Value) -> SharedMatcher {
        self.stand_ins
            .iter()
            .find(|(key, _)| key == arg)
            .map(|(_, matcher)| matcher.clone())
            .unwrap_or_else(|| eq(arg.clone()))
    }

    /// Builds the predicate a quoted call describes: method identity plus,
    /// per argument position, the stand-in's predicate when the quoted
    /// argument equals a sentinel, else equality with the literal argument.
    #[must_use]
    pub fn expect_match_of(&self, quoted: &Call) -> CallPredicate {
        let args = quoted.args().iter().map(|arg| self.matcher_for(arg)).collect();
        CallPredicate {
            method: quoted.method().clone(),
            args,
        }
    }
}

impl fmt::Debug for MatchingRuleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, matcher) in &self.stand_ins {
            map.entry(&key.to_string(), &matcher.to_string());
        }
        map.finish()
    }
}

/// A pure predicate over (method identity, arguments), built by a ruleset
/// from one quoted call. Stateless once built.
#[derive(Clone)]
pub struct CallPredicate {
    method: MethodId,
    args: Vec<SharedMatcher>,
}

impl CallPredicate {
    #[must_use]
    pub fn method(&self) -> &MethodId {
        &self.method
    }

    /// True when `call` has the same method identity and every positional
    /// matcher accepts the corresponding argument.
    #[must_use]
    pub fn matches(&self, call: &Call) -> bool {
        self.method == *call.method()
            && self.args.len() == call.args().len()
            && self
                .args
                .iter()
                .zip(call.args())
                .all(|(matcher, arg)| matcher.matches(arg))
    }
}

impl fmt::Display for CallPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.method.name())?;
        for (i, matcher) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{matcher}")?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for CallPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallPredicate({self})")
    }
}
