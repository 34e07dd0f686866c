//! Addressing of rules stored per unordered layer pair.
//!
//! A technology with `n` layers has `n (n + 1) / 2` unordered pairs,
//! counting each layer paired with itself. The pairs are packed row by row
//! into one flat array: row `i` holds the pairs `(i, i) .. (i, n - 1)`.

/// Number of slots needed for `n` layers.
pub fn pair_count(n: usize) -> usize {
    n * (n + 1) / 2
}

/// Slot of the unordered pair `(i, j)`, or `None` when either layer is not
/// below `n`.
pub fn rule_index(i: usize, j: usize, n: usize) -> Option<usize> {
    if i >= n || j >= n {
        return None;
    }
    let (i, j) = if i <= j { (i, j) } else { (j, i) };
    // (i+1)*floor(i/2) + (i%2)*ceil((i+1)/2) == i*(i+1)/2 for every i
    let skipped = (i + 1) * (i / 2) + (i % 2) * ((i + 2) / 2);
    Some(j + n * i - skipped)
}

/// Slots holding a node's minimum width and height.
pub fn node_size_slots(node: usize) -> (usize, usize) {
    (2 * node, 2 * node + 1)
}
