//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree over shared primitives. Each level splits on a randomly
//! chosen axis at the median of the primitives' box minimums, so build
//! order is reproducible for a seeded generator.

use std::sync::Arc;
use std::time::Instant;

use crate::error::{RenderError, RenderResult};
use crate::hittable::{HitRecord, Hittable};
use ember_math::{sampling, Aabb, Interval, Ray};
use rand::RngCore;

/// BVH node - either a branch with two children or a single primitive.
pub enum BvhNode {
    /// Internal node with two children and their cached union box.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// A single primitive.
    Leaf { object: Arc<dyn Hittable>, bbox: Aabb },
}

impl BvhNode {
    /// Create a BVH from a list of hittable objects.
    ///
    /// Every object must report a finite bounding box.
    pub fn new(objects: Vec<Arc<dyn Hittable>>, rng: &mut dyn RngCore) -> RenderResult<Self> {
        if objects.is_empty() {
            log::warn!("Refusing to build a BVH with no objects");
            return Err(RenderError::EmptyBvh);
        }

        let start = Instant::now();
        let count = objects.len();

        let mut items = Vec::with_capacity(count);
        for (index, object) in objects.into_iter().enumerate() {
            match object.bounding_box() {
                Some(bbox) if bbox.is_finite() => items.push((object, bbox)),
                _ => {
                    log::warn!("Object {} is unbounded and cannot be placed in a BVH", index);
                    return Err(RenderError::MissingBoundingBox { index });
                }
            }
        }

        let root = Self::build(items, rng);

        log::debug!(
            "Built BVH: {} primitives, depth {}, in {:.2?}",
            count,
            root.depth(),
            start.elapsed()
        );

        Ok(root)
    }

    /// Recursive median split on a random axis.
    fn build(mut items: Vec<(Arc<dyn Hittable>, Aabb)>, rng: &mut dyn RngCore) -> Self {
        if items.len() == 1 {
            let (object, bbox) = items.remove(0);
            return BvhNode::Leaf { object, bbox };
        }

        let axis = sampling::gen_int(rng, 0, 2) as usize;
        items.sort_by(|(_, a), (_, b)| {
            a.axis_interval(axis)
                .min
                .total_cmp(&b.axis_interval(axis).min)
        });

        // Split at midpoint
        let mid = items.len() / 2;
        let right_items = items.split_off(mid);

        let left = Self::build(items, rng);
        let right = Self::build(right_items, rng);
        let bbox = Aabb::surrounding(&left.bbox(), &right.bbox());

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox,
        }
    }

    fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => *bbox,
        }
    }

    /// Number of primitives under this node.
    pub fn len(&self) -> usize {
        match self {
            BvhNode::Branch { left, right, .. } => left.len() + right.len(),
            BvhNode::Leaf { .. } => 1,
        }
    }

    /// A BVH always holds at least one primitive.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
            BvhNode::Leaf { .. } => 1,
        }
    }
}

impl Hittable for BvhNode {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        match self {
            BvhNode::Leaf { object, .. } => object.hit(ray, ray_t, rng),

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = left.hit(ray, ray_t, rng);

                // Only check right up to closest hit
                let right_max = hit_left.as_ref().map_or(ray_t.max, |rec| rec.t);
                let hit_right = right.hit(ray, ray_t.with_max(right_max), rng);

                hit_right.or(hit_left)
            }
        }
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox())
    }
}
