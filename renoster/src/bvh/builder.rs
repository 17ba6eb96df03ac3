//! Binned SAH builder for the 4-wide BVH.
//!
//! The tree is built top-down. Each node starts as a single group spanning a
//! contiguous primitive range; groups are repeatedly split (always picking
//! the group with the largest bounding surface area) until four groups exist
//! or no remaining group is worth splitting further. This directly produces
//! 4-wide interior nodes instead of building a binary tree and collapsing it
//! afterwards.

use itertools;

use bounds::{Axis, Bounds3f};
use primitive::Primitive;
use std::sync::Arc;
use Point3f;

const N_BINS: usize = 16;

pub(super) struct BVHPrimitiveInfo {
    pub prim_number: usize,
    pub centroid: Point3f,
    pub bounds: Bounds3f,
}

impl BVHPrimitiveInfo {
    pub(super) fn new(pn: usize, bb: Bounds3f) -> BVHPrimitiveInfo {
        BVHPrimitiveInfo {
            prim_number: pn,
            centroid: 0.5 * bb[0] + 0.5 * bb[1],
            bounds: bb,
        }
    }
}

#[derive(Copy, Clone, Default)]
struct Bin {
    count: usize,
    bounds: Bounds3f,
}

/// A contiguous, not-yet-built range of `primitive_info`, tracked alongside
/// the union of its primitives' bounds so the group-selection step doesn't
/// need to rescan it every iteration.
#[derive(Copy, Clone)]
pub(super) struct Group {
    pub start: usize,
    pub end: usize,
    pub bounds: Bounds3f,
}

impl Group {
    pub(super) fn len(&self) -> usize {
        self.end - self.start
    }
}

fn bin_index(centroid_bounds: &Bounds3f, axis: Axis, centroid: Point3f) -> usize {
    let b = (N_BINS as f32 * centroid_bounds.offset(&centroid)[axis]) as usize;
    if b >= N_BINS {
        N_BINS - 1
    } else {
        b
    }
}

/// Choose the axis and bin index minimizing the surface-area-heuristic cost
/// of splitting `group`, scanning all three axes. Returns `None` if every
/// axis has a degenerate centroid extent (all centroids coincide).
fn choose_split(primitive_info: &[BVHPrimitiveInfo], group: &Group) -> Option<(Axis, usize)> {
    let centroid_bounds = primitive_info[group.start..group.end]
        .iter()
        .fold(Bounds3f::new(), |b, pi| Bounds3f::union_point(&b, &pi.centroid));

    let mut best: Option<(Axis, usize, f32)> = None;
    for &axis in &[Axis::X, Axis::Y, Axis::Z] {
        let extent = centroid_bounds.p_max[axis] - centroid_bounds.p_min[axis];
        if extent <= 0.0 {
            continue;
        }

        let mut bins = [Bin::default(); N_BINS];
        for pi in &primitive_info[group.start..group.end] {
            let b = bin_index(&centroid_bounds, axis, pi.centroid);
            bins[b].count += 1;
            bins[b].bounds = Bounds3f::union(&bins[b].bounds, &pi.bounds);
        }

        let mut left_count = [0usize; N_BINS];
        let mut left_area = [0.0f32; N_BINS];
        let mut b = Bounds3f::new();
        let mut c = 0;
        for i in 0..N_BINS {
            b = Bounds3f::union(&b, &bins[i].bounds);
            c += bins[i].count;
            left_count[i] = c;
            left_area[i] = b.surface_area();
        }

        let mut right_count = [0usize; N_BINS];
        let mut right_area = [0.0f32; N_BINS];
        let mut b = Bounds3f::new();
        let mut c = 0;
        for i in (0..N_BINS).rev() {
            b = Bounds3f::union(&b, &bins[i].bounds);
            c += bins[i].count;
            right_count[i] = c;
            right_area[i] = b.surface_area();
        }

        for split in 0..(N_BINS - 1) {
            let lc = left_count[split];
            let rc = right_count[split + 1];
            if lc == 0 || rc == 0 {
                continue;
            }
            let cost = lc as f32 * left_area[split] + rc as f32 * right_area[split + 1];
            let better = match best {
                None => true,
                Some((_, _, best_cost)) => cost < best_cost,
            };
            if better {
                best = Some((axis, split, cost));
            }
        }
    }

    best.map(|(axis, split, _)| (axis, split))
}

fn median_split(primitive_info: &mut [BVHPrimitiveInfo], group: &Group) -> (Group, Group) {
    let axis = group.bounds.maximum_extent();
    primitive_info[group.start..group.end].sort_by(|a, b| {
        a.centroid[axis]
            .partial_cmp(&b.centroid[axis])
            .expect("NaN centroid coordinate")
    });
    let mid = (group.start + group.end) / 2;
    split_at(primitive_info, group, mid)
}

fn split_at(primitive_info: &[BVHPrimitiveInfo], group: &Group, mid: usize) -> (Group, Group) {
    let b0 = primitive_info[group.start..mid]
        .iter()
        .fold(Bounds3f::new(), |b, pi| Bounds3f::union(&b, &pi.bounds));
    let b1 = primitive_info[mid..group.end]
        .iter()
        .fold(Bounds3f::new(), |b, pi| Bounds3f::union(&b, &pi.bounds));
    (
        Group {
            start: group.start,
            end: mid,
            bounds: b0,
        },
        Group {
            start: mid,
            end: group.end,
            bounds: b1,
        },
    )
}

fn split_group(primitive_info: &mut [BVHPrimitiveInfo], group: &Group) -> (Group, Group) {
    match choose_split(primitive_info, group) {
        None => median_split(primitive_info, group),
        Some((axis, split_bin)) => {
            let centroid_bounds = primitive_info[group.start..group.end]
                .iter()
                .fold(Bounds3f::new(), |b, pi| Bounds3f::union_point(&b, &pi.centroid));
            let mid = group.start
                + itertools::partition(primitive_info[group.start..group.end].iter_mut(), |pi| {
                    bin_index(&centroid_bounds, axis, pi.centroid) <= split_bin
                });
            if mid == group.start || mid == group.end {
                median_split(primitive_info, group)
            } else {
                split_at(primitive_info, group, mid)
            }
        }
    }
}

/// Split `group` into up to 4 sibling groups, repeatedly subdividing the
/// group with the largest surface area. A group is only a candidate for
/// further splitting once it holds more than `max_prims_per_node` primitives.
pub(super) fn build_groups(
    primitive_info: &mut [BVHPrimitiveInfo],
    group: Group,
    max_prims_per_node: usize,
) -> Vec<Group> {
    let mut groups = vec![group];

    while groups.len() < 4 {
        let candidate = groups
            .iter()
            .enumerate()
            .filter(|(_, g)| g.len() > max_prims_per_node)
            .max_by(|(_, a), (_, b)| a.bounds.surface_area().partial_cmp(&b.bounds.surface_area()).unwrap());

        let idx = match candidate {
            Some((idx, _)) => idx,
            None => break,
        };

        let (left, right) = split_group(primitive_info, &groups[idx]);
        groups.splice(idx..=idx, vec![left, right]);
    }

    groups
}

pub(super) fn ordered_prims_for(
    primitives: &[Arc<dyn Primitive>],
    primitive_info: &[BVHPrimitiveInfo],
    group: &Group,
    ordered_prims: &mut Vec<Arc<dyn Primitive>>,
) -> (usize, usize) {
    let first_prim_offset = ordered_prims.len();
    for pi in &primitive_info[group.start..group.end] {
        ordered_prims.push(Arc::clone(&primitives[pi.prim_number]));
    }
    (first_prim_offset, group.len())
}
