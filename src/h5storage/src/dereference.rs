// Copyright 2023 RisingWave Labs
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The dereferencing engine: given a selection over the source side of a
//! reference table, returns a rectangular masked join against a target
//! table. `dereference_chain` composes single hops with
//! `indices_only` intermediates and mask carry-over.

use std::collections::HashMap;

use h5flow_common::MaskedRect;

use crate::container::{require_len, Container, Row};
use crate::error::{Error, Result};
use crate::selection::Selection;
use crate::types::{RefPair, RefRegion};

/// `(src, dst)` column selection: `(0, 1)` reads parent→child, `(1, 0)`
/// reads child→parent over the same shared `ref` table.
pub type RefDirection = (u8, u8);

#[derive(Clone, Copy, Default)]
pub struct DereferenceOpts<'a> {
    pub region_path: Option<&'a str>,
    pub ref_direction: Option<RefDirection>,
    pub mask: Option<&'a [bool]>,
}

impl<'a> DereferenceOpts<'a> {
    fn direction(&self) -> RefDirection {
        self.ref_direction.unwrap_or((0, 1))
    }
}

/// Single-hop dereference returning target-side indices (the `indices_only`
/// path; also the building block `dereference` and `dereference_chain`
/// hydrate rows from).
pub fn dereference_indices<C: Container>(
    container: &C,
    sel: &Selection,
    population: u64,
    ref_path: &str,
    opts: DereferenceOpts<'_>,
) -> Result<MaskedRect<i64>> {
    let n = sel.len();
    if let Some(mask) = opts.mask {
        assert_eq!(mask.len(), n, "mask must align with the selection");
    }

    for (i, &s) in sel.0.iter().enumerate() {
        if is_masked(opts.mask, i) {
            continue;
        }
        if s < 0 || s as u64 >= population {
            return Err(Error::InvalidSelection {
                index: s,
                population,
            });
        }
    }

    let (src_col, dst_col) = opts.direction();
    let pairs = gather_pairs(container, ref_path, opts.region_path, population, sel, opts.mask)?;

    let mut buckets: HashMap<i64, Vec<i64>> = HashMap::new();
    for pair in &pairs {
        let src_val = column(pair, src_col);
        let dst_val = column(pair, dst_col);
        buckets.entry(src_val).or_default().push(dst_val);
    }

    let mut rows = Vec::with_capacity(n);
    for (i, &s) in sel.0.iter().enumerate() {
        if is_masked(opts.mask, i) {
            rows.push(Vec::new());
        } else {
            rows.push(buckets.get(&s).cloned().unwrap_or_default());
        }
    }

    let mut rect = MaskedRect::from_rows(rows, -1i64);
    if let Some(mask) = opts.mask {
        for (i, &m) in mask.iter().enumerate() {
            if m {
                rect.mask_row(i);
            }
        }
    }
    Ok(rect)
}

/// Single-hop dereference returning hydrated target rows of type `T`.
pub fn dereference<C: Container, T: Row>(
    container: &C,
    sel: &Selection,
    population: u64,
    ref_path: &str,
    target_path: &str,
    opts: DereferenceOpts<'_>,
) -> Result<MaskedRect<T>> {
    let indices = dereference_indices(container, sel, population, ref_path, opts)?;
    hydrate(container, target_path, &indices)
}

/// One hop of a [`dereference_chain`] call.
pub struct ChainHop<'a> {
    pub ref_path: &'a str,
    pub region_path: Option<&'a str>,
    pub ref_direction: Option<RefDirection>,
    /// Row count of this hop's source-side group.
    pub population: u64,
}

/// Composes single hops: hop `i`'s flattened result (and mask) becomes hop
/// `i+1`'s input selection and mask; intermediate hops are always
/// `indices_only`. The final shape is the accumulated product of each
/// hop's column count, reshaped back to `(n, k1*k2*...*km)`.
pub fn dereference_chain<C: Container, T: Row>(
    container: &C,
    sel: &Selection,
    hops: &[ChainHop<'_>],
    target_path: &str,
) -> Result<MaskedRect<T>> {
    assert!(!hops.is_empty(), "a chain needs at least one hop");
    let n = sel.len();

    let mut current_sel = sel.clone();
    let mut current_mask: Option<Vec<bool>> = None;
    let mut accumulated_cols = 1usize;
    let mut last = None;

    for (i, hop) in hops.iter().enumerate() {
        let opts = DereferenceOpts {
            region_path: hop.region_path,
            ref_direction: hop.ref_direction,
            mask: current_mask.as_deref(),
        };
        let rect = dereference_indices(container, &current_sel, hop.population, hop.ref_path, opts)?;
        if i + 1 == hops.len() {
            last = Some((rect, accumulated_cols));
            break;
        }
        let hop_cols = rect.shape().1;
        accumulated_cols *= hop_cols;
        let (flat_values, flat_mask) = flatten(&rect);
        current_sel = Selection::from_indices(flat_values);
        current_mask = Some(flat_mask);
    }

    let (final_rect, cols_before_last) = last.expect("loop always assigns `last` on its final iteration");
    let final_cols = final_rect.shape().1;
    let indices = final_rect.reshape(n, cols_before_last * final_cols);
    hydrate(container, target_path, &indices)
}

fn flatten(rect: &MaskedRect<i64>) -> (Vec<i64>, Vec<bool>) {
    let (rows, cols) = rect.shape();
    let mut values = Vec::with_capacity(rows * cols);
    let mut mask = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            match rect.get(r, c) {
                Some(&v) => {
                    values.push(v);
                    mask.push(false);
                }
                None => {
                    // Masked slots carry no valid index; `0` is a safe
                    // placeholder because the mask makes the next hop skip
                    // validating and looking it up entirely.
                    values.push(0);
                    mask.push(true);
                }
            }
        }
    }
    (values, mask)
}

fn hydrate<C: Container, T: Row>(
    container: &C,
    target_path: &str,
    indices: &MaskedRect<i64>,
) -> Result<MaskedRect<T>> {
    let (rows, cols) = indices.shape();
    let mut out = MaskedRect::filled(rows, cols, T::default());
    for r in 0..rows {
        for c in 0..cols {
            if let Some(&idx) = indices.get(r, c) {
                let value = container.read_one::<T>(target_path, idx as u64)?;
                out.set(r, c, value);
            }
        }
    }
    Ok(out)
}

fn is_masked(mask: Option<&[bool]>, i: usize) -> bool {
    mask.map(|m| m[i]).unwrap_or(false)
}

fn column(pair: &RefPair, which: u8) -> i64 {
    if which == 0 {
        pair.parent
    } else {
        pair.child
    }
}

fn gather_pairs<C: Container>(
    container: &C,
    ref_path: &str,
    region_path: Option<&str>,
    population: u64,
    sel: &Selection,
    mask: Option<&[bool]>,
) -> Result<Vec<RefPair>> {
    let remap_type_error = |path: &str| {
        move |err: Error| match err {
            Error::AlreadyExistsWithDifferentType { .. } => Error::TypeMismatch {
                path: path.to_string(),
            },
            other => other,
        }
    };

    match region_path {
        None => {
            let len = require_len(container.dataset_len(ref_path)?, ref_path)?;
            container
                .read_slice::<RefPair>(ref_path, 0, len)
                .map_err(remap_type_error(ref_path))
        }
        Some(region_path) => {
            let region_len = require_len(container.dataset_len(region_path)?, region_path)?;
            if region_len != population {
                return Err(Error::ShapeMismatch {
                    region_len,
                    expected: population,
                });
            }

            let mut windows = Vec::new();
            for (i, &s) in sel.0.iter().enumerate() {
                if is_masked(mask, i) {
                    continue;
                }
                let region = container.read_one::<RefRegion>(region_path, s as u64)?;
                if !region.is_null() {
                    windows.push((region.start, region.stop));
                }
            }
            let merged = merge_windows(windows);

            let mut pairs = Vec::new();
            for (start, stop) in merged {
                let chunk = container
                    .read_slice::<RefPair>(ref_path, start as u64, (stop - start) as u64)
                    .map_err(remap_type_error(ref_path))?;
                pairs.extend(chunk);
            }
            Ok(pairs)
        }
    }
}

/// Sorts and merges overlapping/adjacent `[start, stop)` windows so each
/// region of the shared `ref` table is read at most once, keeping the
/// I/O cost `O(n·w)` in the window count rather than the row count.
fn merge_windows(mut windows: Vec<(i64, i64)>) -> Vec<(i64, i64)> {
    windows.sort_unstable();
    let mut merged: Vec<(i64, i64)> = Vec::with_capacity(windows.len());
    for (start, stop) in windows {
        match merged.last_mut() {
            Some((_, last_stop)) if start <= *last_stop => {
                *last_stop = (*last_stop).max(stop);
            }
            _ => merged.push((start, stop)),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_windows_collapses_overlap_and_adjacency() {
        let merged = merge_windows(vec![(0, 2), (2, 4), (10, 12), (1, 3)]);
        assert_eq!(merged, vec![(0, 4), (10, 12)]);
    }

    #[test]
    fn merge_windows_keeps_disjoint_ranges_separate() {
        let merged = merge_windows(vec![(5, 6), (0, 1)]);
        assert_eq!(merged, vec![(0, 1), (5, 6)]);
    }
}
