//! Tree-DP problems solved by merging per-subtree segment trees.
//!
//! Each adapter takes already-parsed input and returns one answer per vertex
//! or per query. Vertices are 0-based and roots have depth 1.

pub mod blood_cousins;
pub mod dominant_index;
pub mod dominating_colours;
pub mod more_powerful;
pub mod palindrome;
pub mod path_mode;
pub mod rotation;
pub mod subtree_kth;

/// Query indices grouped by the vertex they are answered at.
pub(crate) fn group_by_vertex(
    n: usize,
    at: impl IntoIterator<Item = (usize, usize)>,
) -> Vec<Vec<usize>> {
    let mut grouped = vec![Vec::new(); n];
    for (vertex, query) in at {
        grouped[vertex].push(query);
    }
    grouped
}
