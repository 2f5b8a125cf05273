use std::collections::{HashMap, HashSet};

use super::PriceRange;

pub fn fold_unit_prices(rows: &[(i32, f64)]) -> HashMap<i32, PriceRange> {
    let mut folded: HashMap<i32, PriceRange> = HashMap::new();

    for (property_id, price) in rows {
        folded
            .entry(*property_id)
            .and_modify(|range| {
                if *price < range.min {
                    range.min = *price;
                }
                if *price > range.max {
                    range.max = *price;
                }
            })
            .or_insert(PriceRange {
                min: *price,
                max: *price,
            });
    }

    folded
}

// @NOTE: title hits rank before location hits, duplicated rows keep
//        their first slot
pub fn merge_search_hits<T, F>(
    by_title: Vec<T>,
    by_location: Vec<T>,
    limit: usize,
    id_of: F,
) -> Vec<T>
where
    F: Fn(&T) -> i32,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for hit in by_title.into_iter().chain(by_location.into_iter()) {
        if merged.len() >= limit {
            break;
        }

        if seen.insert(id_of(&hit)) {
            merged.push(hit);
        }
    }

    merged
}
