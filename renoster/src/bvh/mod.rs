mod builder;

use std::sync::Arc;

use arena::Allocator;

use self::builder::{build_groups, ordered_prims_for, BVHPrimitiveInfo, Group};
use accel::{NodeRef, NodeTag};
use bounds::Bounds3f;
use interaction::SurfaceInteraction;
use light::AreaLight;
use material::{Material, TransportMode};
use paramset::ParamSet;
use primitive::Primitive;
use ray::Ray;
use simd::Float4;
use Vector3f;

stat_memory_counter!("Memory/BVH tree", tree_bytes);
stat_ratio!("BVH/Primitives per leaf node", total_primitives_per_leaf);
stat_counter!("BVH/Interior nodes", interior_nodes);
stat_counter!("BVH/Leaf nodes", leaf_nodes);
pub fn init_stats() {
    tree_bytes::init();
    total_primitives_per_leaf::init();
    interior_nodes::init();
    leaf_nodes::init();
}

const MAX_STACK_DEPTH: usize = 64;

/// 4-wide interior node: bounds are stored as one `Float4` per axis per
/// min/max, so testing a ray against all four children is 6 SIMD
/// subtractions/multiplies and 6 min/max instead of 4 separate scalar slab
/// tests. Unused child slots keep `Bounds3f::new()`'s empty bounds (p_min >
/// p_max), which always produces `t_near > t_far`, so they're skipped
/// without a separate "is this slot used" check.
///
/// Only the `Aligned` and `Leaf` variants are ever constructed: nothing in
/// this crate has motion blur or instance transforms, so the builder never
/// needs `AlignedMB`/`Unaligned`/etc. They stay in `NodeTag` so a `NodeRef`
/// is a complete tagged pointer per the data model, not because this crate
/// produces them.
#[derive(Debug)]
struct AlignedNode {
    bounds_min: [Float4; 3],
    bounds_max: [Float4; 3],
    children: [NodeRef; 4],
}

#[derive(Debug)]
struct LeafNode {
    primitives_offset: usize,
    num_prims: usize,
}

#[derive(Debug)]
enum Node {
    Aligned(AlignedNode),
    Leaf(LeafNode),
}

#[derive(Debug)]
pub struct BVH {
    max_prims_per_node: usize,
    primitives: Vec<Arc<dyn Primitive>>,
    nodes: Vec<Node>,
    root: NodeRef,
}

impl BVH {
    pub fn create(prims: &[Arc<dyn Primitive>], ps: &ParamSet) -> BVH {
        let max_prims_per_node = ps.find_one_int("maxnodeprims", 1);
        BVH::new(max_prims_per_node as usize, prims)
    }

    pub fn new(max_prims_per_node: usize, prims: &[Arc<dyn Primitive>]) -> BVH {
        info!("Generating 4-wide BVH");
        let max_prims_per_node = ::std::cmp::min(max_prims_per_node, 255);

        if prims.is_empty() {
            return BVH {
                max_prims_per_node,
                primitives: Vec::new(),
                nodes: Vec::new(),
                root: NodeRef::EMPTY,
            };
        }

        info!("\tGenerating primitive info");
        let mut primitive_info: Vec<BVHPrimitiveInfo> = prims
            .iter()
            .enumerate()
            .map(|(i, p)| BVHPrimitiveInfo::new(i, p.world_bounds()))
            .collect();

        info!("\tBuilding tree for {} primitives", prims.len());
        let mut nodes = Vec::new();
        let mut ordered_prims = Vec::with_capacity(prims.len());
        let bounds = primitive_info
            .iter()
            .fold(Bounds3f::new(), |b, pi| Bounds3f::union(&b, &pi.bounds));
        let root = build(
            prims,
            &mut primitive_info,
            Group {
                start: 0,
                end: prims.len(),
                bounds,
            },
            max_prims_per_node,
            &mut ordered_prims,
            &mut nodes,
        );

        info!("\tCreated {} nodes", nodes.len());

        let bvh = BVH {
            max_prims_per_node,
            primitives: ordered_prims,
            nodes,
            root,
        };
        tree_bytes::add(
            (bvh.nodes.len() * ::std::mem::size_of::<Node>()
                + ::std::mem::size_of_val(&bvh)
                + prims.len() * ::std::mem::size_of_val(&prims[0])) as u64,
        );
        info!("BVH created with {} nodes for {} primitives", bvh.nodes.len(), bvh.primitives.len());

        bvh
    }

    fn bounds(&self) -> Bounds3f {
        if self.nodes.is_empty() {
            return Bounds3f::new();
        }
        node_bounds(&self.nodes, self.root)
    }
}

fn node_bounds(nodes: &[Node], node_ref: NodeRef) -> Bounds3f {
    match &nodes[node_ref.index()] {
        Node::Leaf(_) => unreachable!("leaf bounds are only needed while building"),
        Node::Aligned(n) => {
            let mut b = Bounds3f::new();
            for c in &n.children {
                if !c.is_empty() {
                    b = Bounds3f::union(&b, &node_bounds(nodes, *c));
                }
            }
            b
        }
    }
}

fn build(
    primitives: &[Arc<dyn Primitive>],
    primitive_info: &mut [BVHPrimitiveInfo],
    group: Group,
    max_prims_per_node: usize,
    ordered_prims: &mut Vec<Arc<dyn Primitive>>,
    nodes: &mut Vec<Node>,
) -> NodeRef {
    if group.len() <= max_prims_per_node {
        return make_leaf(primitives, primitive_info, &group, ordered_prims, nodes);
    }

    let groups = build_groups(primitive_info, group, max_prims_per_node);

    let mut children = [NodeRef::EMPTY; 4];
    let mut bounds = [Bounds3f::new(); 4];
    for (i, g) in groups.iter().enumerate() {
        children[i] = build(primitives, primitive_info, *g, max_prims_per_node, ordered_prims, nodes);
        bounds[i] = g.bounds;
    }

    make_interior(children, bounds, nodes)
}

fn make_leaf(
    primitives: &[Arc<dyn Primitive>],
    primitive_info: &[BVHPrimitiveInfo],
    group: &Group,
    ordered_prims: &mut Vec<Arc<dyn Primitive>>,
    nodes: &mut Vec<Node>,
) -> NodeRef {
    let (primitives_offset, num_prims) = ordered_prims_for(primitives, primitive_info, group, ordered_prims);
    leaf_nodes::inc();
    total_primitives_per_leaf::add(num_prims as u64);
    total_primitives_per_leaf::inc_total();
    let idx = nodes.len();
    nodes.push(Node::Leaf(LeafNode {
        primitives_offset,
        num_prims,
    }));
    NodeRef::pack(NodeTag::Leaf, idx)
}

fn make_interior(children: [NodeRef; 4], bounds: [Bounds3f; 4], nodes: &mut Vec<Node>) -> NodeRef {
    let axis_bounds = |get: fn(&Bounds3f) -> f32| Float4::new([get(&bounds[0]), get(&bounds[1]), get(&bounds[2]), get(&bounds[3])]);

    let bounds_min = [
        axis_bounds(|b| b.p_min.x),
        axis_bounds(|b| b.p_min.y),
        axis_bounds(|b| b.p_min.z),
    ];
    let bounds_max = [
        axis_bounds(|b| b.p_max.x),
        axis_bounds(|b| b.p_max.y),
        axis_bounds(|b| b.p_max.z),
    ];

    interior_nodes::inc();
    let idx = nodes.len();
    nodes.push(Node::Aligned(AlignedNode {
        bounds_min,
        bounds_max,
        children,
    }));
    NodeRef::pack(NodeTag::Aligned, idx)
}

/// Test a ray against all 4 children of `node` at once. Returns, for each
/// child slot, `t_near` if the ray hits that child's bounds before
/// `ray.t_max`, or `None` otherwise.
fn intersect_children(node: &AlignedNode, ray: &Ray, inv_dir: Vector3f) -> [Option<f32>; 4] {
    let ox = Float4::splat(ray.o.x);
    let oy = Float4::splat(ray.o.y);
    let oz = Float4::splat(ray.o.z);
    let dx = Float4::splat(inv_dir.x);
    let dy = Float4::splat(inv_dir.y);
    let dz = Float4::splat(inv_dir.z);

    let t0x = (node.bounds_min[0] - ox) * dx;
    let t1x = (node.bounds_max[0] - ox) * dx;
    let t0y = (node.bounds_min[1] - oy) * dy;
    let t1y = (node.bounds_max[1] - oy) * dy;
    let t0z = (node.bounds_min[2] - oz) * dz;
    let t1z = (node.bounds_max[2] - oz) * dz;

    let mut t_near = t0x.min(t1x);
    let mut t_far = t0x.max(t1x);
    t_near = t_near.max(t0y.min(t1y));
    t_far = t_far.min(t0y.max(t1y));
    t_near = t_near.max(t0z.min(t1z));
    t_far = t_far.min(t0z.max(t1z));

    let t_far = t_far.min(Float4::splat(ray.t_max));
    let t_near = t_near.max(Float4::splat(0.0));

    let hit_mask = t_near.le(t_far).move_mask();
    let t_near = t_near.to_array();

    let mut out = [None; 4];
    for i in 0..4 {
        if hit_mask & (1 << i) != 0 && !node.children[i].is_empty() {
            out[i] = Some(t_near[i]);
        }
    }
    out
}

/// Sort the hit children of a node nearest-first, then push them onto the
/// traversal stack farthest-first so the nearest child is popped next. With
/// at most 4 elements an insertion sort is simpler (and just as fast) as
/// reaching for a bit trick to compute traversal order.
fn push_hits(hits: [Option<f32>; 4], children: &[NodeRef; 4], stack: &mut [NodeRef; MAX_STACK_DEPTH], sp: &mut usize) -> Option<NodeRef> {
    let mut ordered: [(f32, NodeRef); 4] = [(0.0, NodeRef::EMPTY); 4];
    let mut count = 0;
    for i in 0..4 {
        if let Some(t) = hits[i] {
            ordered[count] = (t, children[i]);
            count += 1;
        }
    }
    ordered[..count].sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

    if count == 0 {
        return None;
    }
    for &(_, child) in ordered[1..count].iter().rev() {
        stack[*sp] = child;
        *sp += 1;
    }
    Some(ordered[0].1)
}

impl Primitive for BVH {
    fn world_bounds(&self) -> Bounds3f {
        self.bounds()
    }

    fn intersect(&self, ray: &mut Ray) -> Option<SurfaceInteraction<'_, '_>> {
        if self.nodes.is_empty() {
            return None;
        }
        let mut result = None;
        let inv_dir = Vector3f::new(1.0 / ray.d.x, 1.0 / ray.d.y, 1.0 / ray.d.z);

        let mut stack = [NodeRef::EMPTY; MAX_STACK_DEPTH];
        let mut sp = 0usize;
        let mut current = self.root;
        loop {
            match current.tag() {
                NodeTag::Leaf => {
                    let leaf = match &self.nodes[current.index()] {
                        Node::Leaf(l) => l,
                        _ => unreachable!(),
                    };
                    for i in 0..leaf.num_prims {
                        result = self.primitives[leaf.primitives_offset + i].intersect(ray).or(result);
                    }
                }
                NodeTag::Aligned => {
                    let node = match &self.nodes[current.index()] {
                        Node::Aligned(n) => n,
                        _ => unreachable!(),
                    };
                    let hits = intersect_children(node, ray, inv_dir);
                    if let Some(next) = push_hits(hits, &node.children, &mut stack, &mut sp) {
                        current = next;
                        continue;
                    }
                }
                _ => unreachable!("motion-blurred/unaligned nodes are never constructed by this builder"),
            }
            if sp == 0 {
                break;
            }
            sp -= 1;
            current = stack[sp];
        }
        result
    }

    fn intersect_p(&self, ray: &Ray) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        let inv_dir = Vector3f::new(1.0 / ray.d.x, 1.0 / ray.d.y, 1.0 / ray.d.z);

        let mut stack = [NodeRef::EMPTY; MAX_STACK_DEPTH];
        let mut sp = 0usize;
        let mut current = self.root;
        loop {
            match current.tag() {
                NodeTag::Leaf => {
                    let leaf = match &self.nodes[current.index()] {
                        Node::Leaf(l) => l,
                        _ => unreachable!(),
                    };
                    for i in 0..leaf.num_prims {
                        if self.primitives[leaf.primitives_offset + i].intersect_p(ray) {
                            return true;
                        }
                    }
                }
                NodeTag::Aligned => {
                    let node = match &self.nodes[current.index()] {
                        Node::Aligned(n) => n,
                        _ => unreachable!(),
                    };
                    let hits = intersect_children(node, ray, inv_dir);
                    let mut any = false;
                    for i in 0..4 {
                        if hits[i].is_some() && !node.children[i].is_empty() {
                            stack[sp] = node.children[i];
                            sp += 1;
                            any = true;
                        }
                    }
                    if any {
                        sp -= 1;
                        current = stack[sp];
                        continue;
                    }
                }
                _ => unreachable!("motion-blurred/unaligned nodes are never constructed by this builder"),
            }
            if sp == 0 {
                break;
            }
            sp -= 1;
            current = stack[sp];
        }
        false
    }

    fn area_light(&self) -> Option<Arc<dyn AreaLight>> {
        panic!("area_light() should not be called on an Aggregate Primitive!");
    }

    fn material(&self) -> Option<Arc<dyn Material>> {
        panic!("material() should not be called on an Aggregate Primitive!");
    }

    fn compute_scattering_functions<'a, 'b>(
        &self,
        _isect: &mut SurfaceInteraction<'a, 'b>,
        _mode: TransportMode,
        _allow_multiple_lobes: bool,
        _arena: &'b Allocator,
    ) {
        panic!("compute_scattering_functions() should not be called on an Aggregate Primitive!");
    }
}
