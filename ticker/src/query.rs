//! Query Compiler
//!
//! Turns the live text of the search box into a [`Predicate`]. The query is
//! upper-cased and split on ASCII spaces; every non-empty token becomes one
//! clause and the clauses are AND-ed together:
//!
//! ```text
//! "f tag:tech"  ->  And([PrefixMatch("F"), TagMatch("TECH")])
//! ```
//!
//! A token containing `TAG:` anywhere is a tag clause on whatever follows the
//! first `TAG:`; every other token matches listings whose id starts with it.
//! Everything here is pure: same text in, same predicate out.

use std::fmt;

use serde::{Deserialize, Serialize};

use corelib::StockListing;

/// Marker that turns a token into a tag clause. Compared after upper-casing.
pub const TAG_PREFIX: &str = "TAG:";

/// A filter over listings, kept as data so it can be compared, logged and
/// serialized.
///
/// Text inside `PrefixMatch` and `TagMatch` is stored upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Predicate {
    /// Identity: matches every listing.
    #[default]
    AlwaysTrue,
    /// Id starts with the text, ignoring case.
    PrefixMatch(String),
    /// Some tag equals the text, ignoring case.
    TagMatch(String),
    /// Every inner predicate matches.
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn prefix(text: &str) -> Self {
        Self::PrefixMatch(text.to_uppercase())
    }

    pub fn tag(text: &str) -> Self {
        Self::TagMatch(text.to_uppercase())
    }

    pub fn matches(&self, listing: &StockListing) -> bool {
        match self {
            Self::AlwaysTrue => true,
            Self::PrefixMatch(prefix) => listing.id.to_uppercase().starts_with(prefix.as_str()),
            Self::TagMatch(tag) => listing.has_tag_upper(tag),
            Self::And(clauses) => clauses.iter().all(|p| p.matches(listing)),
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Self::AlwaysTrue)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlwaysTrue => write!(f, "*"),
            Self::PrefixMatch(prefix) => write!(f, "{prefix}*"),
            Self::TagMatch(tag) => write!(f, "tag={tag}"),
            Self::And(clauses) => {
                for (i, clause) in clauses.iter().enumerate() {
                    if i > 0 {
                        write!(f, " & ")?;
                    }
                    write!(f, "{clause}")?;
                }
                Ok(())
            }
        }
    }
}

/// Conjoin clauses. No clauses is the identity predicate and a single clause
/// is returned as is.
pub fn chain_predicates(clauses: Vec<Predicate>) -> Predicate {
    let mut clauses = clauses;
    match clauses.len() {
        0 => Predicate::AlwaysTrue,
        1 => clauses.remove(0),
        _ => Predicate::And(clauses),
    }
}

/// Compile one raw query string.
pub fn compile(raw: &str) -> Predicate {
    let upper = raw.to_uppercase();

    let clauses = upper
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(compile_token)
        .collect();

    chain_predicates(clauses)
}

fn compile_token(token: &str) -> Predicate {
    match token.split_once(TAG_PREFIX) {
        Some((_, tag)) => Predicate::tag(tag),
        None => Predicate::prefix(token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str, tags: &[&str]) -> StockListing {
        StockListing::new(id, id, 1.0).with_tags(tags.iter().copied())
    }

    fn sample() -> Vec<StockListing> {
        vec![
            listing("FOO", &["Tech", "Fake"]),
            listing("FAB", &["Retail"]),
            listing("TEST", &["Tech"]),
            listing("MAR", &["Space"]),
        ]
    }

    fn matching<'a>(p: &Predicate, items: &'a [StockListing]) -> Vec<&'a str> {
        items
            .iter()
            .filter(|l| p.matches(l))
            .map(|l| l.id.as_str())
            .collect()
    }

    #[test]
    fn blank_queries_compile_to_identity() {
        for raw in ["", " ", "    "] {
            assert_eq!(compile(raw), Predicate::AlwaysTrue, "query {raw:?}");
        }
    }

    #[test]
    fn chaining_zero_clauses_is_identity() {
        assert_eq!(chain_predicates(vec![]), Predicate::AlwaysTrue);
        assert!(chain_predicates(vec![]).is_identity());
    }

    #[test]
    fn identity_matches_everything() {
        let items = sample();
        assert_eq!(matching(&Predicate::AlwaysTrue, &items).len(), items.len());
    }

    #[test]
    fn prefix_query_ignores_case() {
        let items = sample();
        assert_eq!(matching(&compile("F"), &items), vec!["FOO", "FAB"]);
        assert_eq!(matching(&compile("fo"), &items), vec!["FOO"]);
        assert!(matching(&compile("Z"), &items).is_empty());
    }

    #[test]
    fn tag_query_ignores_case_and_id() {
        let items = sample();
        assert_eq!(matching(&compile("tag:TECH"), &items), vec!["FOO", "TEST"]);
        assert_eq!(matching(&compile("TAG:tech"), &items), vec!["FOO", "TEST"]);
    }

    #[test]
    fn tokens_are_conjoined() {
        let items = sample();
        let p = compile("F tag:TECH");

        assert_eq!(
            p,
            Predicate::And(vec![
                Predicate::PrefixMatch("F".into()),
                Predicate::TagMatch("TECH".into()),
            ])
        );
        assert_eq!(matching(&p, &items), vec!["FOO"]);
    }

    #[test]
    fn repeated_spaces_are_ignored() {
        assert_eq!(compile("  F   tag:tech "), compile("F tag:TECH"));
    }

    #[test]
    fn tag_marker_may_appear_mid_token() {
        assert_eq!(compile("xtag:space"), Predicate::TagMatch("SPACE".into()));
        assert_eq!(compile("tag:a:tag:b"), Predicate::tag("a:tag:b"));
    }

    #[test]
    fn bare_tag_marker_matches_nothing() {
        let items = sample();
        let p = compile("tag:");
        assert_eq!(p, Predicate::TagMatch(String::new()));
        assert!(matching(&p, &items).is_empty());
    }

    #[test]
    fn constructors_normalize_case() {
        assert_eq!(Predicate::prefix("fo"), Predicate::PrefixMatch("FO".into()));
        assert_eq!(Predicate::tag("Tech"), Predicate::TagMatch("TECH".into()));
    }

    #[test]
    fn compiled_tokens_match_constructors() {
        assert_eq!(compile("fo"), Predicate::prefix("fo"));
        assert_eq!(compile("tag:Tech"), Predicate::tag("tech"));
        assert_eq!(
            compile("fo tag:tech"),
            chain_predicates(vec![Predicate::prefix("FO"), Predicate::tag("Tech")])
        );
    }

    #[test]
    fn display_is_readable() {
        assert_eq!(compile("").to_string(), "*");
        assert_eq!(compile("f tag:tech").to_string(), "F* & tag=TECH");
    }

    #[test]
    fn predicates_serialize() {
        let p = compile("f tag:tech");
        let json = serde_json::to_string(&p).unwrap();
        let back: Predicate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
