//! Configured pairwise collision queries
//!
//! [`CollisionQuery`] applies a [`CollisionConfig`] to the box-level tests in
//! [`crate::bounds`]. Batches are checked with a plain double loop; there is
//! no spatial partitioning, so this is meant for small sets of boxes.

use std::collections::HashSet;

use crate::bounds::OrientedBoundingBox;
use crate::config::CollisionConfig;
use crate::spatial::{NodeHandle, SpatialProvider};

/// Indices of two overlapping boxes in a batch, smaller index first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollisionPair {
    /// Index of the first box
    pub first: usize,
    /// Index of the second box
    pub second: usize,
}

impl CollisionPair {
    /// Create a new collision pair (always stores the smaller index first)
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }
}

/// Pairwise overlap queries driven by a [`CollisionConfig`]
#[derive(Debug, Clone, Default)]
pub struct CollisionQuery {
    config: CollisionConfig,
}

impl CollisionQuery {
    /// Create a query helper with the given configuration
    pub fn new(config: CollisionConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Test a pair using the configured precision
    pub fn test<P>(&self, a: &OrientedBoundingBox, b: &OrientedBoundingBox, provider: &mut P) -> bool
    where
        P: SpatialProvider + ?Sized,
    {
        self.test_with(a, b, provider, self.config.precise_by_default)
    }

    /// Test a pair with explicit precision
    pub fn test_with<P>(&self, a: &OrientedBoundingBox, b: &OrientedBoundingBox, provider: &mut P, precise: bool) -> bool
    where
        P: SpatialProvider + ?Sized,
    {
        a.intersects_with(b, provider, precise, self.config.stale_policy())
    }

    /// Refresh every stale node referenced by `boxes` once
    ///
    /// Returns the number of nodes that needed a refresh. Nodes brought up to
    /// date as part of an ancestor's recursive refresh are not counted.
    pub fn refresh_all<P>(&self, provider: &mut P, boxes: &[OrientedBoundingBox]) -> usize
    where
        P: SpatialProvider + ?Sized,
    {
        let mut seen: HashSet<NodeHandle> = HashSet::new();
        let mut refreshed = 0;
        for node in boxes.iter().map(OrientedBoundingBox::node) {
            if seen.insert(node) && provider.is_world_stale(node) {
                provider.update_world(node, false, true);
                refreshed += 1;
            }
        }
        refreshed
    }

    /// Indices of boxes whose node is gone or has no transform
    ///
    /// Such boxes never overlap anything.
    pub fn unresolved<P>(&self, boxes: &[OrientedBoundingBox], provider: &P) -> Vec<usize>
    where
        P: SpatialProvider + ?Sized,
    {
        boxes
            .iter()
            .enumerate()
            .filter(|(_, obb)| !provider.has_spatial(obb.node()))
            .map(|(i, _)| i)
            .collect()
    }

    /// Every overlapping pair in `boxes`, ordered by `(first, second)`
    ///
    /// Boxes without a usable node are reported by a single warning per call.
    pub fn overlapping_pairs<P>(&self, boxes: &[OrientedBoundingBox], provider: &mut P, precise: bool) -> Vec<CollisionPair>
    where
        P: SpatialProvider + ?Sized,
    {
        if self.config.refresh_stale_transforms {
            self.refresh_all(provider, boxes);
        }

        let unresolved = self.unresolved(boxes, provider);
        if !unresolved.is_empty() {
            log::warn!(
                "{} of {} box(es) reference nodes without a transform and are skipped: {:?}",
                unresolved.len(),
                boxes.len(),
                unresolved
            );
        }

        let mut pairs = Vec::new();
        for (i, a) in boxes.iter().enumerate() {
            for (j, b) in boxes.iter().enumerate().skip(i + 1) {
                if self.test_with(a, b, provider, precise) {
                    pairs.push(CollisionPair::new(i, j));
                }
            }
        }

        log::debug!(
            "{} overlapping pair(s) among {} box(es) (precise: {})",
            pairs.len(),
            boxes.len(),
            precise
        );
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Transform, Vec3};
    use crate::scene::SceneGraph;

    fn unit_box_at(graph: &mut SceneGraph, position: Vec3) -> OrientedBoundingBox {
        let node = graph.add_node("box", Transform::from_position(position));
        OrientedBoundingBox::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0), node)
    }

    #[test]
    fn test_pair_ordering() {
        assert_eq!(CollisionPair::new(3, 1), CollisionPair { first: 1, second: 3 });
        assert_eq!(CollisionPair::new(1, 3), CollisionPair::new(3, 1));
    }

    #[test]
    fn test_default_mode_is_precise() {
        let mut graph = SceneGraph::new();
        // Spheres (radius sqrt 3) overlap at distance 2.5, boxes do not
        let a = unit_box_at(&mut graph, Vec3::zeros());
        let b = unit_box_at(&mut graph, Vec3::new(2.5, 0.0, 0.0));

        let precise = CollisionQuery::default();
        assert!(!precise.test(&a, &b, &mut graph));

        let approximate = CollisionQuery::new(CollisionConfig {
            precise_by_default: false,
            ..CollisionConfig::default()
        });
        assert!(approximate.test(&a, &b, &mut graph));
    }

    #[test]
    fn test_overlapping_pairs() {
        let mut graph = SceneGraph::new();
        let boxes = [
            unit_box_at(&mut graph, Vec3::zeros()),
            unit_box_at(&mut graph, Vec3::new(1.5, 0.0, 0.0)),
            unit_box_at(&mut graph, Vec3::new(3.0, 0.0, 0.0)),
            unit_box_at(&mut graph, Vec3::new(20.0, 0.0, 0.0)),
        ];

        let query = CollisionQuery::default();
        let pairs = query.overlapping_pairs(&boxes, &mut graph, true);
        assert_eq!(pairs, vec![CollisionPair::new(0, 1), CollisionPair::new(1, 2)]);

        // At distance 3 the spheres still overlap even though the boxes do not
        let loose = query.overlapping_pairs(&boxes, &mut graph, false);
        assert_eq!(
            loose,
            vec![CollisionPair::new(0, 1), CollisionPair::new(0, 2), CollisionPair::new(1, 2)]
        );
    }

    #[test]
    fn test_unresolved_boxes_are_skipped() {
        let mut graph = SceneGraph::new();
        let logic = graph.add_logic_node("logic");
        let doomed = graph.add_node("doomed", Transform::identity());
        graph.remove_node(doomed).unwrap();

        let boxes = [
            unit_box_at(&mut graph, Vec3::zeros()),
            OrientedBoundingBox::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0), logic),
            unit_box_at(&mut graph, Vec3::new(1.0, 0.0, 0.0)),
            OrientedBoundingBox::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0), doomed),
        ];

        let query = CollisionQuery::default();
        assert_eq!(query.unresolved(&boxes, &graph), vec![1, 3]);
        for precise in [false, true] {
            assert_eq!(query.overlapping_pairs(&boxes, &mut graph, precise), vec![CollisionPair::new(0, 2)]);
        }
    }

    #[test]
    fn test_refresh_all_counts_distinct_nodes() {
        let mut graph = SceneGraph::new();
        let a = unit_box_at(&mut graph, Vec3::zeros());
        let b = unit_box_at(&mut graph, Vec3::new(5.0, 0.0, 0.0));
        let a_again = a.translate(&Vec3::new(0.0, 1.0, 0.0));

        let query = CollisionQuery::default();
        assert_eq!(query.refresh_all(&mut graph, &[a, b, a_again]), 2);
        assert_eq!(query.refresh_all(&mut graph, &[a, b, a_again]), 0);
    }

    #[test]
    fn test_sample_as_is_uses_cached_transforms() {
        let mut graph = SceneGraph::new();
        let a = unit_box_at(&mut graph, Vec3::zeros());
        let b = unit_box_at(&mut graph, Vec3::new(10.0, 0.0, 0.0));

        let query = CollisionQuery::new(CollisionConfig {
            refresh_stale_transforms: false,
            ..CollisionConfig::default()
        });
        query.refresh_all(&mut graph, &[a, b]);

        graph
            .set_local_transform(b.node(), Transform::from_position(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();
        assert!(!query.test(&a, &b, &mut graph));
        assert!(query.overlapping_pairs(&[a, b], &mut graph, true).is_empty());

        query.refresh_all(&mut graph, &[a, b]);
        assert!(query.test(&a, &b, &mut graph));
    }
}
