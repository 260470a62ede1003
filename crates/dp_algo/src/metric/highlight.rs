//! Highlight Calculator (§4.8): per-failing-cluster explanation, plus
//! six stable sort disciplines. Grounded on the original engine's
//! `highlight_calculator.h` sort-direction surface
//! (`SortHighlightsBy{Distance,FurthestIndex,Index}{Ascending,Descending}`).

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Highlight {
    pub cluster_id: usize,
    pub data_index: usize,
    pub furthest_data_index: usize,
    pub max_distance: f64,
    pub furthest_data_index_for_sorting: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKey {
    MaxDistance,
    FurthestDataIndex,
    DataIndex,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Sorts `highlights` in place by `key`/`direction`. Uses `sort_by` (a
/// stable sort), so ties preserve their incoming relative order, matching
/// §4.8 ("sorts are stable... subsequent sorts sort from the current
/// order").
pub fn sort_highlights(highlights: &mut [Highlight], key: SortKey, direction: SortDirection) {
    highlights.sort_by(|a, b| {
        let ord = match key {
            SortKey::MaxDistance => a.max_distance.partial_cmp(&b.max_distance).expect("distances are never NaN"),
            SortKey::FurthestDataIndex => a.furthest_data_index_for_sorting.cmp(&b.furthest_data_index_for_sorting),
            SortKey::DataIndex => a.data_index.cmp(&b.data_index),
        };
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(cluster_id: usize, data_index: usize, furthest: usize, dist: f64) -> Highlight {
        Highlight {
            cluster_id,
            data_index,
            furthest_data_index: furthest,
            max_distance: dist,
            furthest_data_index_for_sorting: furthest,
        }
    }

    #[test]
    fn sorts_by_max_distance_ascending() {
        let mut hs = vec![h(0, 0, 1, 3.0), h(1, 2, 3, 1.0), h(2, 4, 5, 2.0)];
        sort_highlights(&mut hs, SortKey::MaxDistance, SortDirection::Ascending);
        let dists: Vec<f64> = hs.iter().map(|h| h.max_distance).collect();
        assert_eq!(dists, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let mut hs = vec![h(0, 10, 0, 1.0), h(1, 20, 0, 1.0), h(2, 5, 0, 1.0)];
        sort_highlights(&mut hs, SortKey::MaxDistance, SortDirection::Ascending);
        // All tie on distance: original relative order (by cluster_id) must survive.
        let ids: Vec<usize> = hs.iter().map(|h| h.cluster_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn descending_reverses_ascending() {
        let mut asc = vec![h(0, 0, 0, 1.0), h(1, 0, 0, 2.0), h(2, 0, 0, 3.0)];
        let mut desc = asc.clone();
        sort_highlights(&mut asc, SortKey::MaxDistance, SortDirection::Ascending);
        sort_highlights(&mut desc, SortKey::MaxDistance, SortDirection::Descending);
        let asc_ids: Vec<usize> = asc.iter().map(|h| h.cluster_id).collect();
        let desc_ids: Vec<usize> = desc.iter().map(|h| h.cluster_id).collect();
        assert_eq!(asc_ids, vec![0, 1, 2]);
        assert_eq!(desc_ids, vec![2, 1, 0]);
    }

    #[test]
    fn sorts_by_data_index_descending() {
        let mut hs = vec![h(0, 1, 0, 0.0), h(1, 3, 0, 0.0), h(2, 2, 0, 0.0)];
        sort_highlights(&mut hs, SortKey::DataIndex, SortDirection::Descending);
        let idx: Vec<usize> = hs.iter().map(|h| h.data_index).collect();
        assert_eq!(idx, vec![3, 2, 1]);
    }
}
