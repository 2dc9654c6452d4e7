use std::cmp::Ordering;

use crate::reconcile::ComparisonRecord;

/// Put discrepancies first, then cancellation mismatches, then by invoice.
/// The sort is stable.
pub fn sort_records(records: &mut [ComparisonRecord]) {
    records.sort_by(record_order);
}

fn record_order(a: &ComparisonRecord, b: &ComparisonRecord) -> Ordering {
    a.status
        .rank()
        .cmp(&b.status.rank())
        .then_with(|| a.cancellation.rank().cmp(&b.cancellation.rank()))
        .then_with(|| empty_last(a.accounting_id.as_deref(), b.accounting_id.as_deref()))
        .then_with(|| empty_last(a.authority_id.as_deref(), b.authority_id.as_deref()))
}

fn empty_last(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a.filter(|s| !s.is_empty()), b.filter(|s| !s.is_empty())) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
