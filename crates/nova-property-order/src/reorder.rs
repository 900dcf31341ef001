use std::collections::HashMap;

use crate::member::OrderedMember;
use crate::recovery::RecoverOrder;

/// What [`reorder_in_place`] did to each run of same-owner members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReorderReport {
    pub runs: usize,
    /// Runs sorted into recovered declaration order (possibly already in it).
    pub reordered: usize,
    /// Runs left alone because no order could be recovered.
    pub skipped_unavailable: usize,
    /// Runs left alone because the recovered order did not cover every member.
    pub skipped_incomplete: usize,
}

/// Returns `members` with each contiguous same-owner run sorted into its
/// declaration order, where that order can be recovered and covers the run.
pub fn reorder<M: OrderedMember>(mut members: Vec<M>, recovery: &impl RecoverOrder) -> Vec<M> {
    reorder_in_place(&mut members, recovery);
    members
}

/// Reorders `members` in place; see [`reorder`].
///
/// Members sharing an owner must be contiguous. Runs are never merged and
/// never change length; a run is either fully sorted or left untouched.
pub fn reorder_in_place<M: OrderedMember>(
    members: &mut [M],
    recovery: &impl RecoverOrder,
) -> ReorderReport {
    let mut report = ReorderReport::default();
    let mut start = 0;
    while start < members.len() {
        let end = run_end(members, start);
        report.runs += 1;
        match reorder_run(&mut members[start..end], recovery) {
            RunOutcome::Reordered => report.reordered += 1,
            RunOutcome::Unavailable => report.skipped_unavailable += 1,
            RunOutcome::Incomplete => report.skipped_incomplete += 1,
        }
        start = end;
    }
    report
}

fn run_end<M: OrderedMember>(members: &[M], start: usize) -> usize {
    let owner = members[start].owner();
    members[start..]
        .iter()
        .position(|m| m.owner() != owner)
        .map_or(members.len(), |len| start + len)
}

enum RunOutcome {
    Reordered,
    Unavailable,
    Incomplete,
}

fn reorder_run<M: OrderedMember>(run: &mut [M], recovery: &impl RecoverOrder) -> RunOutcome {
    let owner = run[0].owner();
    let Some(order) = recovery.recover_order(owner) else {
        tracing::debug!(
            target = "nova.property_order",
            ty = %owner,
            "declaration order unavailable; keeping supplied order"
        );
        return RunOutcome::Unavailable;
    };

    let mut index: HashMap<&str, usize> = HashMap::with_capacity(order.names().len());
    for (idx, name) in order.names().iter().enumerate() {
        index.entry(name.as_str()).or_insert(idx);
    }

    if let Some(missing) = run.iter().find(|m| !index.contains_key(m.name())) {
        tracing::debug!(
            target = "nova.property_order",
            ty = %owner,
            missing = missing.name(),
            origin = ?order.origin(),
            "recovered order does not cover every member; keeping supplied order"
        );
        return RunOutcome::Incomplete;
    }

    // Stable, so duplicate names keep their relative order.
    run.sort_by_cached_key(|m| index[m.name()]);
    RunOutcome::Reordered
}
