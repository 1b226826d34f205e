// ─────────────────────────────────────────────────────────────────────
// SCPN CryoFlow — 2-D kd-tree
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Static 2-D kd-tree with nearest and k-nearest queries.
//!
//! Median-split build over (z, r) sample coordinates; queries return the
//! caller's item index alongside the Euclidean distance. The tree is
//! built once per flow field and only read afterwards.

const NIL: usize = usize::MAX;

#[derive(Debug, Clone)]
struct KdNode {
    point: [f64; 2],
    item: usize,
    left: usize,
    right: usize,
}

#[derive(Debug, Clone)]
pub struct KdTree2 {
    nodes: Vec<KdNode>,
    root: usize,
}

/// Max-heap entry for the bounded k-nearest frontier.
#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    dist2: f64,
    item: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.dist2.total_cmp(&other.dist2).is_eq()
    }
}
impl Eq for HeapEntry {}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.dist2.total_cmp(&other.dist2)
    }
}

fn dist2(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

impl KdTree2 {
    /// Build from a point set; `points[i]` is addressable as item `i`.
    /// An empty input yields an empty tree that answers no queries.
    pub fn build(points: &[[f64; 2]]) -> Self {
        let mut entries: Vec<(usize, [f64; 2])> =
            points.iter().copied().enumerate().collect();
        let mut nodes = Vec::with_capacity(points.len());
        let root = Self::build_rec(&mut entries, 0, &mut nodes);
        KdTree2 { nodes, root }
    }

    fn build_rec(
        entries: &mut [(usize, [f64; 2])],
        depth: usize,
        nodes: &mut Vec<KdNode>,
    ) -> usize {
        if entries.is_empty() {
            return NIL;
        }
        let axis = depth % 2;
        let median = entries.len() / 2;
        entries.select_nth_unstable_by(median, |a, b| a.1[axis].total_cmp(&b.1[axis]));
        let (item, point) = entries[median];

        let id = nodes.len();
        nodes.push(KdNode {
            point,
            item,
            left: NIL,
            right: NIL,
        });
        let (lo, hi) = entries.split_at_mut(median);
        let left = Self::build_rec(lo, depth + 1, nodes);
        let right = Self::build_rec(&mut hi[1..], depth + 1, nodes);
        nodes[id].left = left;
        nodes[id].right = right;
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nearest item to `query`, with its Euclidean distance.
    pub fn nearest(&self, query: [f64; 2]) -> Option<(usize, f64)> {
        if self.is_empty() {
            return None;
        }
        let mut best = (NIL, f64::INFINITY);
        self.nearest_rec(self.root, query, 0, &mut best);
        Some((best.0, best.1.sqrt()))
    }

    fn nearest_rec(&self, id: usize, query: [f64; 2], depth: usize, best: &mut (usize, f64)) {
        if id == NIL {
            return;
        }
        let node = &self.nodes[id];
        let d2 = dist2(node.point, query);
        if d2 < best.1 {
            *best = (node.item, d2);
        }
        let axis = depth % 2;
        let diff = query[axis] - node.point[axis];
        let (near, far) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };
        self.nearest_rec(near, query, depth + 1, best);
        if diff * diff < best.1 {
            self.nearest_rec(far, query, depth + 1, best);
        }
    }

    /// Up to `k` nearest items, sorted by ascending distance.
    pub fn k_nearest(&self, query: [f64; 2], k: usize) -> Vec<(usize, f64)> {
        if k == 0 || self.is_empty() {
            return Vec::new();
        }
        let mut heap: std::collections::BinaryHeap<HeapEntry> =
            std::collections::BinaryHeap::with_capacity(k + 1);
        self.knn_rec(self.root, query, 0, k, &mut heap);
        heap.into_sorted_vec()
            .into_iter()
            .map(|e| (e.item, e.dist2.sqrt()))
            .collect()
    }

    fn knn_rec(
        &self,
        id: usize,
        query: [f64; 2],
        depth: usize,
        k: usize,
        heap: &mut std::collections::BinaryHeap<HeapEntry>,
    ) {
        if id == NIL {
            return;
        }
        let node = &self.nodes[id];
        let d2 = dist2(node.point, query);
        if heap.len() < k {
            heap.push(HeapEntry {
                dist2: d2,
                item: node.item,
            });
        } else if let Some(top) = heap.peek() {
            if d2 < top.dist2 {
                heap.pop();
                heap.push(HeapEntry {
                    dist2: d2,
                    item: node.item,
                });
            }
        }
        let axis = depth % 2;
        let diff = query[axis] - node.point[axis];
        let (near, far) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };
        self.knn_rec(near, query, depth + 1, k, heap);
        let worst = heap.peek().map(|e| e.dist2).unwrap_or(f64::INFINITY);
        if heap.len() < k || diff * diff < worst {
            self.knn_rec(far, query, depth + 1, k, heap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_points() -> Vec<[f64; 2]> {
        let mut pts = Vec::new();
        for i in 0..12 {
            for j in 0..9 {
                pts.push([i as f64 * 0.7 - 3.0, j as f64 * 0.4]);
            }
        }
        pts
    }

    fn brute_nearest(pts: &[[f64; 2]], q: [f64; 2]) -> (usize, f64) {
        let mut best = (0, f64::INFINITY);
        for (i, &p) in pts.iter().enumerate() {
            let d = dist2(p, q);
            if d < best.1 {
                best = (i, d);
            }
        }
        (best.0, best.1.sqrt())
    }

    #[test]
    fn test_empty_tree() {
        let tree = KdTree2::build(&[]);
        assert!(tree.is_empty());
        assert!(tree.nearest([0.0, 0.0]).is_none());
        assert!(tree.k_nearest([0.0, 0.0], 4).is_empty());
    }

    #[test]
    fn test_nearest_matches_brute_force() {
        let pts = grid_points();
        let tree = KdTree2::build(&pts);
        for step in 0..40 {
            let q = [
                (step as f64 * 0.619).sin() * 6.0,
                (step as f64 * 0.377).cos() * 4.0,
            ];
            let (item, dist) = tree.nearest(q).unwrap();
            let (b_item, b_dist) = brute_nearest(&pts, q);
            assert!(
                (dist - b_dist).abs() < 1e-12,
                "query {q:?}: kd item {item} dist {dist}, brute item {b_item} dist {b_dist}"
            );
        }
    }

    #[test]
    fn test_k_nearest_sorted_and_complete() {
        let pts = grid_points();
        let tree = KdTree2::build(&pts);
        let q = [0.33, 1.21];
        let k = 10;
        let got = tree.k_nearest(q, k);
        assert_eq!(got.len(), k);
        for w in got.windows(2) {
            assert!(w[0].1 <= w[1].1, "k-nearest not sorted");
        }
        // matches the k smallest brute-force distances
        let mut all: Vec<f64> = pts.iter().map(|&p| dist2(p, q).sqrt()).collect();
        all.sort_by(f64::total_cmp);
        for (i, &(_, d)) in got.iter().enumerate() {
            assert!((d - all[i]).abs() < 1e-12, "rank {i}: {d} vs {}", all[i]);
        }
    }

    #[test]
    fn test_k_larger_than_population() {
        let pts = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 2.0]];
        let tree = KdTree2::build(&pts);
        let got = tree.k_nearest([0.1, 0.1], 10);
        assert_eq!(got.len(), 3);
    }

    #[test]
    fn test_self_query_returns_zero_distance() {
        let pts = grid_points();
        let tree = KdTree2::build(&pts);
        let (item, dist) = tree.nearest(pts[17]).unwrap();
        assert_eq!(item, 17);
        assert!(dist < 1e-15);
    }
}
