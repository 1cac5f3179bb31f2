use effigy_types::TargetId;
use tracing::{debug, trace};

use crate::error::EngineError;
use crate::invocation::InvocationRecord;
use crate::ruleset::CallPredicate;

/// Ordered record of the calls made against one or more doubles.
///
/// Appending never fails; records are never removed for the lifetime of the
/// owning controller.
#[derive(Debug, Default)]
pub struct InvocationLog {
    records: Vec<InvocationRecord>,
}

impl InvocationLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: InvocationRecord) {
        debug!(call = %record.call(), target = %record.target(), "recorded invocation");
        self.records.push(record);
    }

    #[must_use]
    pub fn records(&self) -> &[InvocationRecord] {
        &self.records
    }

    /// All unverified records for `target`, in recording order.
    pub fn unverified_against(&self, target: TargetId) -> impl Iterator<Item = &InvocationRecord> {
        self.records
            .iter()
            .filter(move |r| r.target() == target && !r.is_verified())
    }

    /// Fails when any call against `target` has not been matched by a prior
    /// assertion; the error lists each unmatched call rendering.
    pub fn check_no_unverified(&self, target: TargetId) -> Result<(), EngineError> {
        let rendered: Vec<String> = self
            .unverified_against(target)
            .map(ToString::to_string)
            .collect();
        if rendered.is_empty() {
            Ok(())
        } else {
            Err(EngineError::UnverifiedCalls { rendered })
        }
    }

    /// Scans in recording order and returns the first record satisfying
    /// `predicate`, marking it verified as a side effect.
    ///
    /// Ties break to the earliest call. Already-verified records stay
    /// eligible: the flag only gates [`InvocationLog::check_no_unverified`],
    /// so a later assertion may match a record a previous one verified.
    pub fn first_match(&mut self, predicate: &CallPredicate) -> Option<&InvocationRecord> {
        let index = self
            .records
            .iter()
            .position(|r| predicate.matches(r.call()))?;
        let record = &mut self.records[index];
        trace!(call = %record.call(), %predicate, "matched recorded invocation");
        record.mark_verified();
        Some(&self.records[index])
    }

    /// Newline-joined rendering of every record, for failure messages.
    #[must_use]
    pub fn render_all(&self) -> String {
        self.records
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::InvocationLog;
    use crate::invocation::InvocationRecord;
    use crate::ruleset::MatchingRuleset;
    use effigy_types::{Call, TargetId};

    fn record(target: u64, expr: &str) -> InvocationRecord {
        InvocationRecord::new(TargetId::new(target), Call::of("get_eval", vec![expr.into()]))
    }

    fn predicate_for(expr: &str) -> crate::ruleset::CallPredicate {
        MatchingRuleset::exact().expect_match_of(&Call::of("get_eval", vec![expr.into()]))
    }

    #[test]
    fn first_match_takes_earliest_and_marks_verified() {
        let mut log = InvocationLog::new();
        log.append(record(1, "a"));
        log.append(record(2, "a"));

        let matched = log.first_match(&predicate_for("a")).expect("should match");
        assert_eq!(matched.target(), TargetId::new(1));
        assert!(log.records()[0].is_verified());
        assert!(!log.records()[1].is_verified());
    }

    #[test]
    fn verified_records_stay_eligible_for_later_matches() {
        let mut log = InvocationLog::new();
        log.append(record(1, "a"));

        assert!(log.first_match(&predicate_for("a")).is_some());
        assert!(log.first_match(&predicate_for("a")).is_some());
    }

    #[test]
    fn first_match_returns_none_without_a_hit() {
        let mut log = InvocationLog::new();
        log.append(record(1, "a"));
        assert!(log.first_match(&predicate_for("b")).is_none());
    }

    #[test]
    fn check_no_unverified_lists_unmatched_calls() {
        let mut log = InvocationLog::new();
        log.append(record(1, "a"));
        log.append(record(1, "b"));
        log.append(record(2, "c"));

        assert!(log.first_match(&predicate_for("a")).is_some());

        let err = log
            .check_no_unverified(TargetId::new(1))
            .expect_err("b is unverified");
        assert!(err.to_string().contains("get_eval(b)"));
        assert!(!err.to_string().contains("get_eval(c)"));

        assert!(log.first_match(&predicate_for("b")).is_some());
        assert!(log.check_no_unverified(TargetId::new(1)).is_ok());
    }

    #[test]
    fn unverified_query_is_scoped_to_the_target() {
        let mut log = InvocationLog::new();
        log.append(record(1, "a"));
        log.append(record(2, "b"));

        let against_one: Vec<_> = log.unverified_against(TargetId::new(1)).collect();
        assert_eq!(against_one.len(), 1);
        assert_eq!(against_one[0].to_string(), "get_eval(a)");
    }

    #[test]
    fn render_all_joins_in_recording_order() {
        let mut log = InvocationLog::new();
        log.append(record(1, "a"));
        log.append(record(1, "b"));
        assert_eq!(log.render_all(), "get_eval(a)\nget_eval(b)");
    }
}
