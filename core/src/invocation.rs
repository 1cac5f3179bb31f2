use std::fmt;
use std::hash::{Hash, Hasher};

use effigy_types::{Call, TargetId};

/// One intercepted call against a recording double, plus whether an
/// assertion has matched it yet.
///
/// Created once per call and owned by the log it is appended to. `verified`
/// flips false to true exactly once and only ever gates the no-other-calls
/// check; a verified record stays eligible for later matches.
///
/// Records compare and hash by their call alone: two records with the same
/// method and arguments are equal even when they were observed against
/// different doubles.
#[derive(Debug, Clone)]
pub struct InvocationRecord {
    target: TargetId,
    call: Call,
    verified: bool,
}

impl InvocationRecord {
    #[must_use]
    pub fn new(target: TargetId, call: Call) -> Self {
        Self {
            target,
            call,
            verified: false,
        }
    }

    #[must_use]
    pub fn target(&self) -> TargetId {
        self.target
    }

    #[must_use]
    pub fn call(&self) -> &Call {
        &self.call
    }

    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verified
    }

    pub(crate) fn mark_verified(&mut self) {
        self.verified = true;
    }
}

impl PartialEq for InvocationRecord {
    fn eq(&self, other: &Self) -> bool {
        self.call == other.call
    }
}

impl Hash for InvocationRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.call.hash(state);
    }
}

impl fmt::Display for InvocationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.call)
    }
}

#[cfg(test)]
mod tests {
    use super::InvocationRecord;
    use effigy_types::{Call, TargetId};
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(record: &InvocationRecord) -> u64 {
        let mut hasher = DefaultHasher::new();
        record.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn records_compare_by_call_not_target() {
        let a = InvocationRecord::new(TargetId::new(1), Call::of("get_eval", vec!["a".into()]));
        let b = InvocationRecord::new(TargetId::new(2), Call::of("get_eval", vec!["a".into()]));
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let c = InvocationRecord::new(TargetId::new(1), Call::of("get_eval", vec!["b".into()]));
        assert_ne!(a, c);
    }

    #[test]
    fn verification_is_one_way() {
        let mut record =
            InvocationRecord::new(TargetId::new(1), Call::of("get_eval", vec!["a".into()]));
        assert!(!record.is_verified());
        record.mark_verified();
        assert!(record.is_verified());
    }

    #[test]
    fn renders_as_the_call() {
        let record =
            InvocationRecord::new(TargetId::new(1), Call::of("get_eval", vec!["a".into()]));
        assert_eq!(record.to_string(), "get_eval(a)");
    }
}
