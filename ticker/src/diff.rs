//! Incremental Diff Engine
//!
//! Computes the row operations that turn one displayed list into the next.
//! Rows are matched by `id` only; a matched row whose fields differ is reported
//! as [`DiffOp::Changed`] rather than as a removal followed by an insertion.
//!
//! ## Algorithm
//! 1. Strip the common prefix and suffix (by id). Ticker updates usually keep
//!    the same rows, so this often leaves nothing to do.
//! 2. Build a suffix LCS table over the remaining window (quadratic in the
//!    window size) and walk it left to right: equal ids are always taken as a
//!    match; otherwise a removal is preferred whenever it keeps the LCS length,
//!    else an insertion. The walk never consults hash order, so the same pair
//!    of lists always yields the same script.
//! 3. An id that the script both removes and inserts is reported once, as a
//!    [`DiffOp::Moved`]. With id-sorted inputs this cannot happen.
//!
//! ## Positions
//! Every position refers to the list as it looks *after* the preceding
//! operations were applied. Replaying `ops` in order on a copy of the old list
//! produces the new list; see [`DiffResult::apply`].

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::PatchError;
use corelib::StockListing;

/// One row operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DiffOp {
    /// Insert `new[new_index]` at `at`.
    Inserted { at: usize, new_index: usize },
    /// Remove the row at `at`.
    Removed { at: usize },
    /// Take the row at `from` out and reinsert it at `to`.
    Moved { from: usize, to: usize },
    /// Same identity, different content: replace the row at `at` with
    /// `new[new_index]`.
    Changed { at: usize, new_index: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    pub ops: Vec<DiffOp>,
    /// Rows matched by id whose content is identical.
    pub unchanged: usize,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn inserted(&self) -> usize {
        self.count(|op| matches!(op, DiffOp::Inserted { .. }))
    }

    pub fn removed(&self) -> usize {
        self.count(|op| matches!(op, DiffOp::Removed { .. }))
    }

    pub fn moved(&self) -> usize {
        self.count(|op| matches!(op, DiffOp::Moved { .. }))
    }

    pub fn changed(&self) -> usize {
        self.count(|op| matches!(op, DiffOp::Changed { .. }))
    }

    fn count(&self, pred: impl Fn(&DiffOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }

    /// Replay the operations on `rows`, which must hold the old list this
    /// result was computed from. `new` is the list it was computed against.
    ///
    /// Stops at the first operation that does not fit and leaves `rows`
    /// partially patched.
    pub fn apply(
        &self,
        rows: &mut Vec<StockListing>,
        new: &[StockListing],
    ) -> Result<(), PatchError> {
        for (index, op) in self.ops.iter().enumerate() {
            let len = rows.len();
            let out_of_range = || PatchError::OutOfRange {
                index,
                op: *op,
                len,
            };

            match *op {
                DiffOp::Inserted { at, new_index } => {
                    let row = new.get(new_index).ok_or_else(out_of_range)?;
                    if at > len {
                        return Err(out_of_range());
                    }
                    rows.insert(at, row.clone());
                }
                DiffOp::Removed { at } => {
                    if at >= len {
                        return Err(out_of_range());
                    }
                    rows.remove(at);
                }
                DiffOp::Moved { from, to } => {
                    if from >= len || to >= len {
                        return Err(out_of_range());
                    }
                    let row = rows.remove(from);
                    rows.insert(to, row);
                }
                DiffOp::Changed { at, new_index } => {
                    let row = new.get(new_index).ok_or_else(out_of_range)?;
                    let slot = rows.get_mut(at).ok_or_else(out_of_range)?;
                    *slot = row.clone();
                }
            }
        }
        Ok(())
    }
}

/// Alignment step over old/new indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Keep(usize, usize),
    Delete(usize),
    Insert(usize),
}

/// Diff two lists of listings. Both are expected to hold unique ids.
pub fn diff(old: &[StockListing], new: &[StockListing]) -> DiffResult {
    let script = edit_script(old, new);

    let deleted: HashSet<&str> = script
        .iter()
        .filter_map(|e| match *e {
            Edit::Delete(i) => Some(old[i].id.as_str()),
            _ => None,
        })
        .collect();
    let moved: HashSet<&str> = script
        .iter()
        .filter_map(|e| match *e {
            Edit::Insert(j) if deleted.contains(new[j].id.as_str()) => Some(new[j].id.as_str()),
            _ => None,
        })
        .collect();
    let old_index: HashMap<&str, usize> = if moved.is_empty() {
        HashMap::new()
    } else {
        old.iter()
            .enumerate()
            .map(|(i, l)| (l.id.as_str(), i))
            .collect()
    };

    let mut result = DiffResult::default();
    // Ids in their current on-screen order while the script is replayed.
    let mut working: Vec<&str> = old.iter().map(|l| l.id.as_str()).collect();
    // Moved ids relocated before the script reached their old slot.
    let mut relocated: HashSet<&str> = HashSet::new();
    let mut cursor = 0usize;

    for edit in script {
        match edit {
            Edit::Keep(i, j) => {
                if old[i] == new[j] {
                    result.unchanged += 1;
                } else {
                    result.ops.push(DiffOp::Changed {
                        at: cursor,
                        new_index: j,
                    });
                }
                cursor += 1;
            }
            Edit::Delete(i) => {
                let id = old[i].id.as_str();
                if !moved.contains(id) {
                    result.ops.push(DiffOp::Removed { at: cursor });
                    working.remove(cursor);
                } else if !relocated.contains(id) {
                    // Stays put until its insertion point is reached.
                    cursor += 1;
                }
            }
            Edit::Insert(j) => {
                let id = new[j].id.as_str();
                let from = if moved.contains(id) {
                    working.iter().position(|w| *w == id)
                } else {
                    None
                };

                match from {
                    Some(from) => {
                        working.remove(from);
                        if from < cursor {
                            cursor -= 1;
                        } else {
                            relocated.insert(id);
                        }
                        working.insert(cursor, id);
                        result.ops.push(DiffOp::Moved { from, to: cursor });

                        if old_index.get(id).is_some_and(|&i| old[i] != new[j]) {
                            result.ops.push(DiffOp::Changed {
                                at: cursor,
                                new_index: j,
                            });
                        } else {
                            result.unchanged += 1;
                        }
                    }
                    None => {
                        working.insert(cursor, id);
                        result.ops.push(DiffOp::Inserted {
                            at: cursor,
                            new_index: j,
                        });
                    }
                }
                cursor += 1;
            }
        }
    }

    result
}

/// Minimal insert/delete alignment of `old` onto `new`, matching on id.
fn edit_script(old: &[StockListing], new: &[StockListing]) -> Vec<Edit> {
    let same = |i: usize, j: usize| old[i].id == new[j].id;
    let (n, m) = (old.len(), new.len());

    let mut prefix = 0;
    while prefix < n && prefix < m && same(prefix, prefix) {
        prefix += 1;
    }
    let mut suffix = 0;
    while suffix < n - prefix && suffix < m - prefix && same(n - 1 - suffix, m - 1 - suffix) {
        suffix += 1;
    }

    let rows = n - prefix - suffix;
    let cols = m - prefix - suffix;
    let mut script = Vec::with_capacity(n.max(m));

    script.extend((0..prefix).map(|k| Edit::Keep(k, k)));

    if rows == 0 {
        script.extend((0..cols).map(|j| Edit::Insert(prefix + j)));
    } else if cols == 0 {
        script.extend((0..rows).map(|i| Edit::Delete(prefix + i)));
    } else {
        // lcs[i * width + j] = LCS length of old[prefix+i..] and new[prefix+j..]
        // within the trimmed window.
        let width = cols + 1;
        let mut lcs = vec![0u32; (rows + 1) * width];
        for i in (0..rows).rev() {
            for j in (0..cols).rev() {
                lcs[i * width + j] = if same(prefix + i, prefix + j) {
                    lcs[(i + 1) * width + j + 1] + 1
                } else {
                    lcs[(i + 1) * width + j].max(lcs[i * width + j + 1])
                };
            }
        }

        let (mut i, mut j) = (0, 0);
        while i < rows || j < cols {
            if i < rows && j < cols && same(prefix + i, prefix + j) {
                script.push(Edit::Keep(prefix + i, prefix + j));
                i += 1;
                j += 1;
            } else if j == cols
                || (i < rows && lcs[(i + 1) * width + j] >= lcs[i * width + j + 1])
            {
                script.push(Edit::Delete(prefix + i));
                i += 1;
            } else {
                script.push(Edit::Insert(prefix + j));
                j += 1;
            }
        }
    }

    for k in 0..suffix {
        script.push(Edit::Keep(n - suffix + k, m - suffix + k));
    }
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, price: f64) -> StockListing {
        StockListing::new(id, id, price)
    }

    fn rows(ids: &[&str]) -> Vec<StockListing> {
        ids.iter().map(|id| row(id, 1.0)).collect()
    }

    fn ins(at: usize, new_index: usize) -> DiffOp {
        DiffOp::Inserted { at, new_index }
    }

    fn rm(at: usize) -> DiffOp {
        DiffOp::Removed { at }
    }

    fn chg(at: usize, new_index: usize) -> DiffOp {
        DiffOp::Changed { at, new_index }
    }

    fn replay(old: &[StockListing], new: &[StockListing]) -> DiffResult {
        let d = diff(old, new);
        let mut list = old.to_vec();
        d.apply(&mut list, new).unwrap();
        assert_eq!(list, new, "replayed {:?}", d.ops);
        d
    }

    #[test]
    fn identical_lists_have_no_ops() {
        let s = vec![row("FOO", 900.0), row("MAR", 900.0), row("TEST", 900.0)];
        let d = diff(&s, &s);

        assert!(d.is_empty());
        assert_eq!(d.unchanged, 3);
    }

    #[test]
    fn price_change_is_reported_as_changed() {
        let old = vec![row("FOO", 900.0)];
        let new = vec![row("FOO", 1000.0).with_delta(100.0)];

        let d = replay(&old, &new);

        assert_eq!(d.ops, vec![chg(0, 0)]);
        assert_eq!((d.inserted(), d.removed()), (0, 0));
    }

    #[test]
    fn delta_only_change_is_still_a_change() {
        let old = vec![row("FOO", 10.0)];
        let new = vec![row("FOO", 10.0).with_delta(0.0)];
        assert_eq!(diff(&old, &new).changed(), 1);
    }

    #[test]
    fn empty_old_is_pure_insertion() {
        let new = rows(&["A", "B", "C"]);
        let d = replay(&[], &new);

        assert_eq!(d.ops, vec![ins(0, 0), ins(1, 1), ins(2, 2)]);
    }

    #[test]
    fn empty_new_is_pure_removal() {
        let old = rows(&["A", "B"]);
        let d = replay(&old, &[]);
        assert_eq!(d.ops, vec![rm(0), rm(0)]);
    }

    #[test]
    fn both_empty_is_empty() {
        let d = diff(&[], &[]);
        assert!(d.is_empty());
        assert_eq!(d.unchanged, 0);
    }

    #[test]
    fn filtering_out_middle_rows_removes_only_them() {
        let old = rows(&["A", "B", "C", "D"]);
        let new = rows(&["A", "D"]);
        let d = replay(&old, &new);

        assert_eq!(d.ops, vec![rm(1), rm(1)]);
        assert_eq!(d.unchanged, 2);
    }

    #[test]
    fn interleaved_insert_and_remove() {
        let old = rows(&["A", "C", "E"]);
        let new = rows(&["A", "B", "E", "F"]);
        let d = replay(&old, &new);

        assert_eq!(d.ops, vec![rm(1), ins(1, 1), ins(3, 3)]);
    }

    #[test]
    fn swapped_rows_become_a_move() {
        let old = rows(&["A", "B"]);
        let new = rows(&["B", "A"]);
        let d = replay(&old, &new);

        assert_eq!(d.moved(), 1);
        assert_eq!((d.inserted(), d.removed()), (0, 0));
        assert_eq!(d.unchanged, 2);
    }

    #[test]
    fn moved_row_with_new_price_is_also_changed() {
        let old = vec![row("A", 1.0), row("B", 1.0), row("C", 1.0)];
        let new = vec![row("C", 2.0), row("A", 1.0), row("B", 1.0)];
        let d = replay(&old, &new);

        assert_eq!(d.moved(), 1);
        assert_eq!(d.changed(), 1);
    }

    #[test]
    fn reversal_replays_correctly() {
        let old = rows(&["A", "B", "C", "D", "E"]);
        let new = rows(&["E", "D", "C", "B", "A"]);
        let d = replay(&old, &new);
        assert_eq!((d.inserted(), d.removed()), (0, 0));
    }

    #[test]
    fn output_is_deterministic() {
        let old = rows(&["A", "B", "C", "D", "E", "F"]);
        let new = rows(&["B", "X", "D", "A", "F", "Y"]);
        let first = diff(&old, &new);
        for _ in 0..10 {
            assert_eq!(diff(&old, &new), first);
        }
    }

    #[test]
    fn apply_rejects_foreign_list() {
        let old = rows(&["A", "B", "C"]);
        let new = rows(&["A"]);
        let d = diff(&old, &new);

        let mut wrong = rows(&["A"]);
        let err = d.apply(&mut wrong, &new).unwrap_err();
        assert!(matches!(err, PatchError::OutOfRange { index: 0, .. }));
    }

    #[test]
    fn ops_serialize_with_tag() {
        let json = serde_json::to_value(chg(2, 3)).unwrap();
        let expected = serde_json::json!({"op": "changed", "at": 2, "new_index": 3});
        assert_eq!(json, expected);
    }
}
