use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::error::SblError;

/// One node of the dependency graph: a registered tag and the id it must
/// be evaluated after, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub direction: Option<String>,
}

/// Kahn's algorithm with a FIFO queue, so independent tags keep their
/// registration order. A direction naming an unknown id and a cycle are
/// both errors; duplicated ids collapse to one node and surface as a
/// cycle through the length check.
pub fn topological_sort(items: &[Edge]) -> Result<Vec<Edge>, SblError> {
    let mut id_to_item: FxHashMap<String, Edge> = FxHashMap::default();
    let mut in_degree: FxHashMap<String, usize> = FxHashMap::default();
    let mut graph: FxHashMap<String, Vec<String>> = FxHashMap::default();
    let mut order: Vec<String> = Vec::new();

    for item in items {
        if !id_to_item.contains_key(&item.id) {
            order.push(item.id.clone());
        }
        id_to_item.insert(item.id.clone(), item.clone());
        in_degree.insert(item.id.clone(), 0);
        graph.insert(item.id.clone(), Vec::new());
    }

    for item in items {
        if let Some(direction) = &item.direction {
            let Some(list) = graph.get_mut(direction) else {
                return Err(SblError::DirectionNotFound {
                    id: item.id.clone(),
                    direction: direction.clone(),
                });
            };
            list.push(item.id.clone());
            *in_degree.entry(item.id.clone()).or_insert(0) += 1;
        }
    }

    let mut queue: VecDeque<String> = order
        .iter()
        .filter(|id| in_degree.get(*id).copied().unwrap_or(0) == 0)
        .cloned()
        .collect();

    let mut sorted = Vec::new();
    while let Some(id) = queue.pop_front() {
        if let Some(item) = id_to_item.get(&id) {
            sorted.push(item.clone());
        }
        if let Some(neighbors) = graph.get(&id) {
            for neighbor in neighbors {
                if let Some(degree) = in_degree.get_mut(neighbor) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(neighbor.clone());
                    }
                }
            }
        }
    }

    if sorted.len() != items.len() {
        return Err(SblError::CycleDetected);
    }

    Ok(sorted)
}
