//! Merging a page of entities into the displayed list

use crate::decode::Entity;
use std::collections::HashMap;

/// Merge `incoming` into `current`.
///
/// With `replace`, or when `current` is empty, the result is `incoming`
/// verbatim. Otherwise an incoming entity whose id is already present
/// overwrites that entry in place; new ids are appended in incoming order.
pub fn merge_entities<E: Entity>(current: &[E], incoming: Vec<E>, replace: bool) -> Vec<E> {
    if replace || current.is_empty() {
        return incoming;
    }

    let mut merged = current.to_vec();
    let mut positions: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, e)| (e.id().to_string(), i))
        .collect();

    for entity in incoming {
        match positions.get(entity.id()) {
            Some(&i) => merged[i] = entity,
            None => {
                positions.insert(entity.id().to_string(), merged.len());
                merged.push(entity);
            }
        }
    }

    merged
}
