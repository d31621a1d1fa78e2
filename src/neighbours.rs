//! Neighbour queries over an assembled edge set.

use anyhow::{bail, Result};
use std::collections::BTreeSet;

use crate::graph::Edge;

/// How far a neighbour query reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degree {
    One,
    Two,
}

impl TryFrom<u8> for Degree {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => bail!("Unsupported neighbour degree {other}, expected 1 or 2"),
        }
    }
}

/// Every node sharing an edge with `node_id`, deduplicated, in edge order.
pub fn immediate_neighbours(node_id: usize, edges: &[Edge]) -> Vec<usize> {
    let mut seen = BTreeSet::new();
    edges
        .iter()
        .filter_map(|edge| {
            if edge.from == node_id {
                Some(edge.to)
            } else if edge.to == node_id {
                Some(edge.from)
            } else {
                None
            }
        })
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Neighbours of `node_id` up to `degree`.
///
/// Degree two takes the degree-one set, expands it by one hop, then collects
/// the immediate neighbours of every node reached. The result is not pruned:
/// it contains the degree-one members and usually `node_id` itself, and
/// comes back sorted.
///
/// ```
/// use tunegraph::graph::Edge;
/// use tunegraph::neighbours::{neighbours, Degree};
///
/// let edges = [(0, 1), (1, 2), (2, 3)].map(|(from, to)| Edge { from, to, value: 1.0 });
/// assert_eq!(neighbours(0, Degree::One, &edges), vec![1]);
/// assert_eq!(neighbours(0, Degree::Two, &edges), vec![0, 1, 2, 3]);
/// ```
pub fn neighbours(node_id: usize, degree: Degree, edges: &[Edge]) -> Vec<usize> {
    let first = immediate_neighbours(node_id, edges);
    if degree == Degree::One {
        return first;
    }

    let reached: BTreeSet<usize> = first
        .iter()
        .flat_map(|&id| immediate_neighbours(id, edges))
        .chain(first.iter().copied())
        .collect();

    reached
        .iter()
        .flat_map(|&id| immediate_neighbours(id, edges))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
