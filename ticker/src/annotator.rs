//! Price-Delta Annotator
//!
//! Keeps the last two raw snapshots and stamps every listing of the newest one
//! with `price - previous price` when the same id was present in the snapshot
//! immediately before it. Listings seen for the first time get no delta.
//!
//! The output is always sorted by id ascending. Sorting happens after the
//! deltas are attached, so the lookup never depends on feed order.

use std::collections::HashMap;

use tracing::debug;

use crate::rolling_window::RollingWindow;
use corelib::Snapshot;

/// Current and previous snapshot; nothing older is ever needed.
const WINDOW_LEN: usize = 2;

#[derive(Debug, Clone)]
pub struct PriceDeltaAnnotator {
    window: RollingWindow<Snapshot>,
}

impl Default for PriceDeltaAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceDeltaAnnotator {
    pub fn new() -> Self {
        Self {
            window: RollingWindow::new(WINDOW_LEN),
        }
    }

    /// Ingest one raw snapshot and return it annotated and sorted.
    ///
    /// Any delta already present on the raw listings is overwritten: only the
    /// annotator decides what a delta is.
    pub fn annotate(&mut self, raw: Snapshot) -> Snapshot {
        let mut current = raw;

        match self.window.latest() {
            None => {
                for listing in current.iter_mut() {
                    listing.price_delta = None;
                }
            }
            Some(previous) => {
                let previous_prices: HashMap<&str, f64> = previous
                    .iter()
                    .map(|l| (l.id.as_str(), l.price))
                    .collect();

                for listing in current.iter_mut() {
                    listing.price_delta = previous_prices
                        .get(listing.id.as_str())
                        .map(|old| listing.price - old);
                }
            }
        }

        current.sort_by(|a, b| a.id.cmp(&b.id));

        debug!(
            listings = current.len(),
            with_delta = current.iter().filter(|l| l.price_delta.is_some()).count(),
            "snapshot annotated"
        );

        self.window.push(current.clone());
        current
    }

    /// Whether at least one snapshot has been observed since the last reset.
    pub fn has_history(&self) -> bool {
        !self.window.is_empty()
    }

    /// Forget every retained snapshot; the next one is treated as the first.
    pub fn reset(&mut self) {
        self.window.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::StockListing;

    fn listing(id: &str, price: f64) -> StockListing {
        StockListing::new(id, id, price).with_tags(["Tech", "Fake"])
    }

    fn ids(s: &Snapshot) -> Vec<&str> {
        s.iter().map(|l| l.id.as_str()).collect()
    }

    #[test]
    fn first_snapshot_is_sorted_without_deltas() {
        let mut a = PriceDeltaAnnotator::new();

        let out = a.annotate(vec![
            listing("FOO", 900.0),
            listing("TEST", 900.0),
            listing("MAR", 900.0),
        ]);

        assert_eq!(ids(&out), vec!["FOO", "MAR", "TEST"]);
        assert!(out.iter().all(|l| l.price_delta.is_none()));
    }

    #[test]
    fn second_snapshot_gets_deltas_from_first() {
        let mut a = PriceDeltaAnnotator::new();
        a.annotate(vec![
            listing("FOO", 900.0),
            listing("TEST", 900.0),
            listing("MAR", 900.0),
        ]);

        let out = a.annotate(vec![
            listing("FOO", 1000.0),
            listing("TEST", 800.0),
            listing("MAR", 500.0),
        ]);

        assert_eq!(ids(&out), vec!["FOO", "MAR", "TEST"]);
        let deltas: Vec<Option<f64>> = out.iter().map(|l| l.price_delta).collect();
        assert_eq!(deltas, vec![Some(100.0), Some(-400.0), Some(-100.0)]);
    }

    #[test]
    fn new_ids_have_no_delta() {
        let mut a = PriceDeltaAnnotator::new();
        a.annotate(vec![listing("FOO", 10.0)]);

        let out = a.annotate(vec![listing("FOO", 12.0), listing("BAR", 3.0)]);

        assert_eq!(ids(&out), vec!["BAR", "FOO"]);
        assert_eq!(out[0].price_delta, None);
        assert_eq!(out[1].price_delta, Some(2.0));
    }

    #[test]
    fn delta_only_looks_one_snapshot_back() {
        let mut a = PriceDeltaAnnotator::new();
        a.annotate(vec![listing("FOO", 10.0)]);
        a.annotate(vec![listing("BAR", 1.0)]);

        // FOO skipped a snapshot, so it has no immediate predecessor.
        let out = a.annotate(vec![listing("FOO", 15.0)]);
        assert_eq!(out[0].price_delta, None);
    }

    #[test]
    fn raw_deltas_are_overwritten() {
        let mut a = PriceDeltaAnnotator::new();
        let out = a.annotate(vec![listing("FOO", 10.0).with_delta(15.0)]);
        assert_eq!(out[0].price_delta, None);

        let out = a.annotate(vec![listing("FOO", 11.0).with_delta(15.0)]);
        assert_eq!(out[0].price_delta, Some(1.0));
    }

    #[test]
    fn ids_are_case_sensitive() {
        let mut a = PriceDeltaAnnotator::new();
        a.annotate(vec![listing("foo", 10.0)]);
        let out = a.annotate(vec![listing("FOO", 11.0)]);
        assert_eq!(out[0].price_delta, None);
    }

    #[test]
    fn reset_forgets_previous_snapshot() {
        let mut a = PriceDeltaAnnotator::new();
        a.annotate(vec![listing("FOO", 10.0)]);
        assert!(a.has_history());

        a.reset();
        assert!(!a.has_history());

        let out = a.annotate(vec![listing("FOO", 20.0)]);
        assert_eq!(out[0].price_delta, None);
    }
}
