use std::collections::BTreeMap;

use proptest::prelude::*;

use ticker::StockListing;
use ticker::diff::diff;

fn to_rows(entries: Vec<(String, u8)>) -> Vec<StockListing> {
    entries
        .into_iter()
        .map(|(id, price)| StockListing::new(&id, &id, f64::from(price)))
        .collect()
}

/// Unique ids from a small alphabet so old and new overlap often.
fn rows_any_order() -> impl Strategy<Value = Vec<StockListing>> {
    prop::collection::btree_map("[A-F]{1,2}", 0u8..3, 0..10)
        .prop_map(|m| m.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
        .prop_map(to_rows)
}

fn rows_sorted() -> impl Strategy<Value = Vec<StockListing>> {
    prop::collection::btree_map("[A-F]{1,2}", 0u8..3, 0..10)
        .prop_map(|m: BTreeMap<String, u8>| to_rows(m.into_iter().collect()))
}

proptest! {
    #[test]
    fn replaying_ops_reaches_new_list(old in rows_any_order(), new in rows_any_order()) {
        let d = diff(&old, &new);
        let mut displayed = old.clone();
        d.apply(&mut displayed, &new).unwrap();
        prop_assert_eq!(displayed, new);
    }

    #[test]
    fn diff_against_self_is_empty(rows in rows_any_order()) {
        let d = diff(&rows, &rows);
        prop_assert!(d.is_empty());
        prop_assert_eq!(d.unchanged, rows.len());
    }

    #[test]
    fn sorted_inputs_only_insert_remove_or_change(old in rows_sorted(), new in rows_sorted()) {
        let d = diff(&old, &new);
        let only_old = old.iter().filter(|o| !new.iter().any(|n| n.id == o.id)).count();
        let only_new = new.iter().filter(|n| !old.iter().any(|o| o.id == n.id)).count();
        let common = old.len() - only_old;

        prop_assert_eq!(d.moved(), 0);
        prop_assert_eq!(d.removed(), only_old);
        prop_assert_eq!(d.inserted(), only_new);
        prop_assert_eq!(d.changed() + d.unchanged, common);
    }
}
