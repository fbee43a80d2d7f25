//! Orderings over gem collections
//!
//! All sorts are stable: gems with equal keys keep their relative input order.

use std::cmp::Ordering;

use crate::model::Gem;

/// Available sort orders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Case-insensitive name
    Name,
    /// Ascending value
    Value,
    /// Case-insensitive origin
    Origin,
    /// Precious before semi-precious, then ascending value
    CategoryThenValue,
}

impl SortKey {
    /// The comparison function for this key
    pub fn comparator(&self) -> fn(&Gem, &Gem) -> Ordering {
        match self {
            SortKey::Name => by_name,
            SortKey::Value => by_value,
            SortKey::Origin => by_origin,
            SortKey::CategoryThenValue => by_category_then_value,
        }
    }
}

/// Compare two strings ignoring case
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Order by name, ignoring case
pub fn by_name(a: &Gem, b: &Gem) -> Ordering {
    cmp_ignore_case(&a.name, &b.name)
}

/// Order by value, ascending; gems without a value come first
pub fn by_value(a: &Gem, b: &Gem) -> Ordering {
    a.value.cmp(&b.value)
}

/// Order by origin, ignoring case
pub fn by_origin(a: &Gem, b: &Gem) -> Ordering {
    cmp_ignore_case(&a.origin, &b.origin)
}

/// Order by category rank, then ascending value
pub fn by_category_then_value(a: &Gem, b: &Gem) -> Ordering {
    a.preciousness
        .map(|p| p.rank())
        .cmp(&b.preciousness.map(|p| p.rank()))
        .then_with(|| by_value(a, b))
}

/// Sort gems in place by `key`
pub fn sort_gems(gems: &mut [Gem], key: SortKey) {
    gems.sort_by(key.comparator());
}

/// Sorted copy of `gems`, leaving the input untouched
pub fn sorted(gems: &[Gem], key: SortKey) -> Vec<Gem> {
    let mut copy = gems.to_vec();
    sort_gems(&mut copy, key);
    copy
}
