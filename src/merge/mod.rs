//! Merge-based overlap resolution.
//!
//! Instead of discarding overlapping rows, the mergers group them under a
//! keeper. Every input index ends up in exactly one group, either as the
//! keeper or as one of its merge targets.

use crate::geometry::{pool_overlaps, Detection, MatchParams};
use crate::trace::{trace_event, trace_span};
use crate::util::order::{sort_desc, sort_pop_order};

/// A keeper and the rows to fold into it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeGroup {
    /// Index of the row that represents the group.
    pub keep: usize,
    /// Indices of the rows to merge into `keep`, in fusion order.
    ///
    /// [`greedy_nmm`] lists them by descending score. [`nmm`] appends the
    /// rows claimed by each visited row in ascending score order.
    pub merge: Vec<usize>,
}

impl MergeGroup {
    /// Creates a group with no merge targets.
    pub fn singleton(keep: usize) -> Self {
        Self {
            keep,
            merge: Vec::new(),
        }
    }

    /// Iterates over the keeper followed by its merge targets.
    pub fn members(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::once(self.keep).chain(self.merge.iter().copied())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Claim {
    Free,
    Keeper(usize),
    Member(usize),
}

/// Single-pass non-maximum merging.
///
/// Rows are visited once in descending score order. A visited row that is not
/// yet claimed opens a group and claims every free row it overlaps. A visited
/// row that was already claimed forwards the free rows it overlaps to its own
/// keeper, so overlapping chains collapse into the group of the highest
/// scoring member. The first claim on a row is final.
///
/// Groups are returned in the order their keepers were visited. Within a
/// group, the rows claimed by one visited row are listed lowest score first.
pub fn nmm(rows: &[Detection], params: MatchParams) -> Vec<MergeGroup> {
    let _span = trace_span!("nmm", rows = rows.len()).entered();
    if rows.is_empty() {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..rows.len()).collect();
    sort_desc(rows, &mut order);

    let mut claims = vec![Claim::Free; rows.len()];
    let mut groups: Vec<MergeGroup> = Vec::new();
    let mut others = Vec::with_capacity(rows.len());
    let mut overlaps = Vec::with_capacity(rows.len());

    for &pivot in &order {
        let slot = match claims[pivot] {
            Claim::Free => {
                groups.push(MergeGroup::singleton(pivot));
                let slot = groups.len() - 1;
                claims[pivot] = Claim::Keeper(slot);
                slot
            }
            Claim::Keeper(slot) | Claim::Member(slot) => slot,
        };

        others.clear();
        others.extend(order.iter().copied().filter(|&idx| idx != pivot));
        pool_overlaps(rows, pivot, &others, params.metric, &mut overlaps);

        // Each pivot appends its matches lowest score first.
        for (&idx, &value) in others.iter().zip(overlaps.iter()).rev() {
            if value >= params.threshold && claims[idx] == Claim::Free {
                claims[idx] = Claim::Member(slot);
                groups[slot].merge.push(idx);
            }
        }
    }

    trace_event!("nmm_groups", groups = groups.len());
    groups
}

/// Greedy non-maximum merging.
///
/// Pops the best remaining row, moves every pool member overlapping it at or
/// above the threshold into its group, and continues with the unmatched rows.
/// Matched rows leave the pool for good, so they can neither join another
/// group nor become keepers. Groups are returned in pop order.
pub fn greedy_nmm(rows: &[Detection], params: MatchParams) -> Vec<MergeGroup> {
    let _span = trace_span!("greedy_nmm", rows = rows.len()).entered();
    if rows.is_empty() {
        return Vec::new();
    }

    let mut pool: Vec<usize> = (0..rows.len()).collect();
    sort_pop_order(rows, &mut pool);

    let mut groups = Vec::new();
    let mut overlaps = Vec::with_capacity(pool.len());

    while let Some(pivot) = pool.pop() {
        let mut group = MergeGroup::singleton(pivot);
        if !pool.is_empty() {
            pool_overlaps(rows, pivot, &pool, params.metric, &mut overlaps);
            let mut values = overlaps.iter();
            pool.retain(|&idx| {
                let matched = values.next().is_some_and(|&v| v >= params.threshold);
                if matched {
                    group.merge.push(idx);
                }
                !matched
            });
            // Pool order is ascending; merge targets go best first.
            group.merge.reverse();
        }
        groups.push(group);
    }

    trace_event!("greedy_nmm_groups", groups = groups.len());
    groups
}
