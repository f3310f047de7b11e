//! Environment variable maps.

use std::collections::BTreeMap;

/// Merge string maps into a new map.
///
/// Maps are applied in order, so on key collision the value from the later
/// map wins.
#[must_use]
pub fn merge_string_maps<'a, I>(maps: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = &'a BTreeMap<String, String>>,
{
    let mut merged = BTreeMap::new();
    for map in maps {
        for (key, value) in map {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn later_maps_win() {
        let low = map(&[("A", "1"), ("B", "1")]);
        let high = map(&[("B", "2"), ("C", "2")]);

        let merged = merge_string_maps([&low, &high]);
        assert_eq!(merged, map(&[("A", "1"), ("B", "2"), ("C", "2")]));
    }

    #[test]
    fn empty_input() {
        assert!(merge_string_maps(std::iter::empty()).is_empty());
    }
}
