//! Point k-d tree.

use crate::geometry::*;
use crate::pbrt::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A node of the k-d tree. Interior nodes store their split plane and the
/// offset of their right child; the left child is always the next node in
/// the array. Leaves reference a contiguous range of `indices`.
enum KdNode {
    Interior {
        /// Split axis.
        axis: Axis,

        /// Split plane position along `axis`.
        split: Float,

        /// Offset of the right child node.
        right: usize,
    },
    Leaf {
        /// Offset of the first point index.
        start: usize,

        /// Number of point indices.
        count: usize,
    },
}

/// A k-d tree over a fixed cloud of 3-D points supporting k-nearest-neighbour
/// and radius queries. Distances are reported squared. The maximum leaf size
/// is chosen at build time, which also makes the leaves usable as coarse
/// spatial clusters of the cloud.
pub struct PointKdTree {
    /// The indexed points.
    points: Vec<Point3f>,

    /// Flattened tree nodes in depth first order.
    nodes: Vec<KdNode>,

    /// Point indices reordered so each leaf covers a contiguous range.
    indices: Vec<usize>,
}

/// An entry of the bounded max-heap used for k-nearest-neighbour queries.
struct HeapEntry {
    dist_squared: Float,
    index: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.dist_squared == other.dist_squared
    }
}
impl Eq for HeapEntry {}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist_squared.total_cmp(&other.dist_squared)
    }
}

impl PointKdTree {
    /// Build a k-d tree over the given points.
    ///
    /// * `points`        - The points to index.
    /// * `max_leaf_size` - Maximum number of points per leaf.
    pub fn new(points: Vec<Point3f>, max_leaf_size: usize) -> Self {
        let max_leaf_size = max(1, max_leaf_size);
        let mut indices: Vec<usize> = (0..points.len()).collect();
        let mut nodes = Vec::new();
        if !points.is_empty() {
            build(&points, &mut indices, 0, max_leaf_size, &mut nodes);
        }
        Self { points, nodes, indices }
    }

    /// Returns the number of indexed points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the tree indexes no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the position of an indexed point.
    ///
    /// * `i` - The point index.
    pub fn point(&self, i: usize) -> Point3f {
        self.points[i]
    }

    /// Returns the `k` points closest to the query point as `(index, squared
    /// distance)` pairs ordered by increasing distance. Fewer than `k` results
    /// are returned when the cloud is smaller than `k`.
    ///
    /// * `p` - The query point.
    /// * `k` - Number of neighbours to return.
    pub fn knn(&self, p: &Point3f, k: usize) -> Vec<(usize, Float)> {
        if self.nodes.is_empty() || k == 0 {
            return Vec::new();
        }

        let mut heap: BinaryHeap<HeapEntry> = BinaryHeap::with_capacity(k + 1);
        self.knn_node(0, p, k, &mut heap);

        let mut matches: Vec<(usize, Float)> = heap
            .into_iter()
            .map(|e| (e.index, e.dist_squared))
            .collect();
        matches.sort_by(|a, b| a.1.total_cmp(&b.1));
        matches
    }

    fn knn_node(&self, node: usize, p: &Point3f, k: usize, heap: &mut BinaryHeap<HeapEntry>) {
        match self.nodes[node] {
            KdNode::Leaf { start, count } => {
                for &index in &self.indices[start..start + count] {
                    let dist_squared = self.points[index].distance_squared(*p);
                    if heap.len() < k {
                        heap.push(HeapEntry { dist_squared, index });
                    } else if dist_squared < heap.peek().unwrap().dist_squared {
                        heap.pop();
                        heap.push(HeapEntry { dist_squared, index });
                    }
                }
            }
            KdNode::Interior { axis, split, right } => {
                let delta = p[axis] - split;
                let (near, far) = if delta < 0.0 {
                    (node + 1, right)
                } else {
                    (right, node + 1)
                };
                self.knn_node(near, p, k, heap);

                // Only descend the far side if it can still hold a closer
                // point than the current k-th best.
                if heap.len() < k || delta * delta < heap.peek().unwrap().dist_squared {
                    self.knn_node(far, p, k, heap);
                }
            }
        }
    }

    /// Returns all points within the given squared distance of the query
    /// point as `(index, squared distance)` pairs.
    ///
    /// * `p`              - The query point.
    /// * `radius_squared` - The squared search radius.
    pub fn radius(&self, p: &Point3f, radius_squared: Float) -> Vec<(usize, Float)> {
        let mut matches = Vec::new();
        if !self.nodes.is_empty() {
            self.radius_node(0, p, radius_squared, &mut matches);
        }
        matches
    }

    fn radius_node(
        &self,
        node: usize,
        p: &Point3f,
        radius_squared: Float,
        matches: &mut Vec<(usize, Float)>,
    ) {
        match self.nodes[node] {
            KdNode::Leaf { start, count } => {
                for &index in &self.indices[start..start + count] {
                    let dist_squared = self.points[index].distance_squared(*p);
                    if dist_squared <= radius_squared {
                        matches.push((index, dist_squared));
                    }
                }
            }
            KdNode::Interior { axis, split, right } => {
                let delta = p[axis] - split;
                let (near, far) = if delta < 0.0 {
                    (node + 1, right)
                } else {
                    (right, node + 1)
                };
                self.radius_node(near, p, radius_squared, matches);
                if delta * delta <= radius_squared {
                    self.radius_node(far, p, radius_squared, matches);
                }
            }
        }
    }

    /// Enumerate the point indices held by each leaf. Because the build
    /// splits at the median, the leaves partition the cloud into spatially
    /// compact cells of at most the build-time leaf size.
    pub fn enumerate_leaves(&self) -> Vec<Vec<usize>> {
        let mut leaves = Vec::new();
        for node in self.nodes.iter() {
            if let KdNode::Leaf { start, count } = node {
                leaves.push(self.indices[*start..*start + *count].to_vec());
            }
        }
        leaves
    }
}

/// Recursively build the node for `indices[start..start + count]`, splitting
/// at the median along the widest axis. Returns the offset of the built node.
fn build(
    points: &[Point3f],
    indices: &mut [usize],
    start: usize,
    max_leaf_size: usize,
    nodes: &mut Vec<KdNode>,
) -> usize {
    let offset = nodes.len();
    let count = indices.len();

    if count <= max_leaf_size {
        nodes.push(KdNode::Leaf { start, count });
        return offset;
    }

    // Split along the axis with the widest extent.
    let mut bounds = Bounds3f::new(points[indices[0]], points[indices[0]]);
    for &i in indices.iter() {
        bounds = bounds.union(&points[i]);
    }
    let axis = bounds.maximum_extent();

    let mid = count / 2;
    indices.select_nth_unstable_by(mid, |&a, &b| points[a][axis].total_cmp(&points[b][axis]));
    let split = points[indices[mid]][axis];

    // Placeholder; patched once the right child offset is known.
    nodes.push(KdNode::Leaf { start, count });

    let (left, right) = indices.split_at_mut(mid);
    build(points, left, start, max_leaf_size, nodes);
    let right_offset = build(points, right, start + mid, max_leaf_size, nodes);

    nodes[offset] = KdNode::Interior {
        axis,
        split,
        right: right_offset,
    };
    offset
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
