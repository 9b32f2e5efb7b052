use std::collections::HashMap;

use serde::Serialize;

/// Pairwise co-purchase counts over product ids
///
/// Maps a product id to the products it has been ordered together with and
/// how often. Symmetric by construction: builders insert every unordered
/// pair in both directions, so `counts[a][b] == counts[b][a]` and a product
/// never appears as its own neighbor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CoPurchaseMatrix {
    counts: HashMap<String, HashMap<String, u32>>,
}

impl CoPurchaseMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties the structure
    pub fn clear(&mut self) {
        self.counts.clear();
    }

    /// Increments the co-occurrence count for `a` → `b`, starting missing
    /// entries at zero
    pub fn add_pair(&mut self, a: &str, b: &str) {
        let count = self
            .counts
            .entry(a.to_string())
            .or_default()
            .entry(b.to_string())
            .or_insert(0);
        *count += 1;
    }

    /// Neighbor → count mapping for `a`; empty for an unknown product
    pub fn neighbors(&self, a: &str) -> HashMap<String, u32> {
        self.counts.get(a).cloned().unwrap_or_default()
    }

    /// Neighbors of `a` ranked by count descending, truncated to `limit`
    ///
    /// Equal counts order by ascending product id so rankings are stable
    /// across rebuilds from the same order history.
    pub fn ranked(&self, a: &str, limit: usize) -> Vec<(String, u32)> {
        let row = match self.counts.get(a) {
            Some(row) => row,
            None => return Vec::new(),
        };

        let mut entries: Vec<(String, u32)> =
            row.iter().map(|(id, count)| (id.clone(), *count)).collect();
        entries.sort_by(|(a_id, a_count), (b_id, b_count)| {
            b_count.cmp(a_count).then_with(|| a_id.cmp(b_id))
        });
        entries.truncate(limit);
        entries
    }

    /// Number of products with at least one neighbor
    pub fn product_count(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
