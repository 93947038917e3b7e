//! Per-category batching of the suppression and merge algorithms.
//!
//! Rows are partitioned by category id, each category runs on its own local
//! sub-array, and local result indices are mapped back to the global index
//! space. Categories never interact. With the `rayon` feature and
//! `parallel = true`, categories run on the rayon pool; per-category results
//! are collected first and combined afterwards in category order.

use crate::geometry::{Detection, MatchParams};
use crate::merge::{greedy_nmm, nmm, MergeGroup};
use crate::suppress::{nms, origin_nms};
use crate::trace::{trace_debug, trace_event, trace_span};
use crate::util::order::sort_desc;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Rows of one category: its id and the global indices of its members.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryBatch {
    /// Category id shared by all members.
    pub category_id: u32,
    /// Global row indices, ascending.
    pub indices: Vec<usize>,
}

impl CategoryBatch {
    /// Copies the member rows into a contiguous local array.
    fn local_rows(&self, rows: &[Detection]) -> Vec<Detection> {
        self.indices.iter().map(|&idx| rows[idx]).collect()
    }

    /// Maps a local result index back to its global index.
    #[inline]
    fn global(&self, local: usize) -> usize {
        debug_assert!(
            local < self.indices.len(),
            "local index {local} out of range for category {} with {} rows",
            self.category_id,
            self.indices.len()
        );
        self.indices[local]
    }
}

/// Partitions rows by category, in ascending category id order.
pub fn partition_by_category(rows: &[Detection]) -> Vec<CategoryBatch> {
    let mut by_id: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (idx, row) in rows.iter().enumerate() {
        by_id.entry(row.category_id).or_default().push(idx);
    }
    by_id
        .into_iter()
        .map(|(category_id, indices)| CategoryBatch {
            category_id,
            indices,
        })
        .collect()
}

#[cfg(feature = "rayon")]
fn dispatch<T, F>(batches: &[CategoryBatch], parallel: bool, job: F) -> Vec<T>
where
    T: Send,
    F: Fn(&CategoryBatch) -> T + Sync + Send,
{
    if parallel {
        batches.par_iter().map(job).collect()
    } else {
        batches.iter().map(job).collect()
    }
}

#[cfg(not(feature = "rayon"))]
fn dispatch<T, F>(batches: &[CategoryBatch], _parallel: bool, job: F) -> Vec<T>
where
    F: Fn(&CategoryBatch) -> T,
{
    batches.iter().map(job).collect()
}

/// Runs `run` on every category and pairs each result with its batch.
fn for_each_category<T, F>(rows: &[Detection], parallel: bool, run: F) -> Vec<(CategoryBatch, T)>
where
    T: Send,
    F: Fn(&[Detection], &CategoryBatch) -> T + Sync + Send,
{
    let batches = partition_by_category(rows);
    let results = dispatch(&batches, parallel, |batch| {
        trace_debug!(
            "category_batch",
            category_id = batch.category_id,
            rows = batch.indices.len()
        );
        let local = batch.local_rows(rows);
        run(&local, batch)
    });
    batches.into_iter().zip(results).collect()
}

fn remap_keep(batch: &CategoryBatch, keep: Vec<usize>) -> impl Iterator<Item = usize> + '_ {
    keep.into_iter().map(move |local| batch.global(local))
}

fn remap_groups(batch: &CategoryBatch, groups: Vec<MergeGroup>) -> impl Iterator<Item = MergeGroup> + '_ {
    groups.into_iter().map(move |group| MergeGroup {
        keep: batch.global(group.keep),
        merge: group.merge.into_iter().map(|local| batch.global(local)).collect(),
    })
}

/// Per-category [`nms`]; kept indices are sorted by descending score.
pub fn batched_nms(rows: &[Detection], params: MatchParams, parallel: bool) -> Vec<usize> {
    let _span = trace_span!("batched_nms", rows = rows.len()).entered();
    let per_category = for_each_category(rows, parallel, |local, _| nms(local, params));

    let categories = per_category.len();

    let mut keep = Vec::with_capacity(rows.len());
    for (batch, local_keep) in per_category {
        keep.extend(remap_keep(&batch, local_keep));
    }
    sort_desc(rows, &mut keep);

    trace_event!("batched_nms_kept", kept = keep.len(), categories = categories);
    keep
}

/// Per-category [`origin_nms`].
///
/// The first `len_new` global rows are new detections. Inside a category the
/// members keep their global order, so the category's own new count is the
/// number of its members with a global index below `len_new`.
pub fn batched_origin_nms(
    rows: &[Detection],
    len_new: usize,
    params: MatchParams,
    parallel: bool,
) -> Vec<usize> {
    let _span = trace_span!("batched_origin_nms", rows = rows.len(), len_new = len_new).entered();
    let per_category = for_each_category(rows, parallel, |local, batch| {
        let local_new = batch.indices.partition_point(|&idx| idx < len_new);
        origin_nms(local, local_new, params)
    });

    let mut keep = Vec::with_capacity(rows.len());
    for (batch, local_keep) in per_category {
        keep.extend(remap_keep(&batch, local_keep));
    }
    sort_desc(rows, &mut keep);

    trace_event!("batched_origin_nms_kept", kept = keep.len());
    keep
}

/// Per-category [`nmm`]; groups are concatenated in category order.
pub fn batched_nmm(rows: &[Detection], params: MatchParams, parallel: bool) -> Vec<MergeGroup> {
    let _span = trace_span!("batched_nmm", rows = rows.len()).entered();
    let per_category = for_each_category(rows, parallel, |local, _| nmm(local, params));

    let mut groups = Vec::new();
    for (batch, local_groups) in per_category {
        groups.extend(remap_groups(&batch, local_groups));
    }

    trace_event!("batched_nmm_groups", groups = groups.len());
    groups
}

/// Per-category [`greedy_nmm`]; groups are concatenated in category order.
pub fn batched_greedy_nmm(
    rows: &[Detection],
    params: MatchParams,
    parallel: bool,
) -> Vec<MergeGroup> {
    let _span = trace_span!("batched_greedy_nmm", rows = rows.len()).entered();
    let per_category = for_each_category(rows, parallel, |local, _| greedy_nmm(local, params));

    let mut groups = Vec::new();
    for (batch, local_groups) in per_category {
        groups.extend(remap_groups(&batch, local_groups));
    }

    trace_event!("batched_greedy_nmm_groups", groups = groups.len());
    groups
}
