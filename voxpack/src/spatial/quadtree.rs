use glam::{Mat4, Vec3};

use crate::{Error, Result};

use super::{
    Aabb2d, CullVolume, CullVolumeId,
    cull_volume::snap_footprint,
    frustum::{box_corners, outside_view},
};

#[derive(Debug, Clone, PartialEq)]
pub struct QuadTreeConfig {
    /// Edge of the world square in tiles, rounded up to a power of two.
    pub world_size: u32,
    /// Nodes stop subdividing at this edge, rounded up to a power of two.
    pub min_cell_size: u32,
    /// World units per tile.
    pub tile_size: f32,
    pub min_height: f32,
    pub max_height: f32,
    /// Subtracted from every node's lower corner before frustum tests.
    pub padding_min: Vec3,
    /// Added to every node's upper corner before frustum tests.
    pub padding_max: Vec3,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            world_size: 512,
            min_cell_size: 2,
            tile_size: 1.0,
            min_height: 0.0,
            max_height: 8.0,
            padding_min: Vec3::new(20.0, 0.0, 2.0),
            padding_max: Vec3::new(20.0, 0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct NodeId(u32);

impl NodeId {
    const ROOT: NodeId = NodeId(0);

    #[inline(always)]
    const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
struct QuadNode {
    bounds: Aabb2d,
    corners: [Vec3; 8],
    children: Option<[NodeId; 4]>,
    volumes: Vec<CullVolumeId>,
    /// Volumes stored in this node and all of its descendants.
    population: u32,
}

#[derive(Debug, Default)]
struct VolumeSlot {
    generation: u32,
    entry: Option<(CullVolume, NodeId)>,
}

/// Quadtree over the world's XZ square that tracks which registered volumes intersect the view.
///
/// Nodes live in a flat arena built once in [`CullingQuadTree::new`]; volumes are stored in the
/// node whose cell equals their snapped footprint and are addressed by [`CullVolumeId`].
#[derive(Debug)]
pub struct CullingQuadTree {
    config: QuadTreeConfig,
    nodes: Vec<QuadNode>,
    slots: Vec<VolumeSlot>,
    free_slots: Vec<u32>,
    volume_count: usize,
    tree_updated: bool,
    volumes_changed: bool,
    stack: Vec<NodeId>,
}

impl CullingQuadTree {
    pub fn new(config: QuadTreeConfig) -> Self {
        #[cfg(feature = "tracy")]
        let _span = tracy_client::span!("CullingQuadTree::new");

        let mut config = config;
        config.world_size = config.world_size.max(1).next_power_of_two();
        config.min_cell_size = config
            .min_cell_size
            .max(1)
            .next_power_of_two()
            .min(config.world_size);

        let mut tree = Self {
            config,
            nodes: Vec::new(),
            slots: Vec::new(),
            free_slots: Vec::new(),
            volume_count: 0,
            tree_updated: false,
            volumes_changed: false,
            stack: Vec::new(),
        };

        tree.build_nodes();

        log::debug!(
            "Culling quadtree: world {}x{}, min cell {}, {} nodes",
            tree.config.world_size,
            tree.config.world_size,
            tree.config.min_cell_size,
            tree.nodes.len()
        );

        tree
    }

    fn build_nodes(&mut self) {
        let root = self.new_node(Aabb2d::square(0, 0, self.config.world_size));
        self.stack.push(root);

        while let Some(id) = self.stack.pop() {
            let bounds = self.nodes[id.index()].bounds;
            let w = bounds.size().x as u32;
            if w <= self.config.min_cell_size {
                continue;
            }

            let half = w / 2;
            let (x, z) = (bounds.min.x, bounds.min.y);
            let (mx, mz) = (x + half as i32, z + half as i32);
            let children = [
                self.new_node(Aabb2d::square(x, z, half)),
                self.new_node(Aabb2d::square(mx, z, half)),
                self.new_node(Aabb2d::square(x, mz, half)),
                self.new_node(Aabb2d::square(mx, mz, half)),
            ];

            self.nodes[id.index()].children = Some(children);
            self.stack.extend(children);
        }
    }

    fn new_node(&mut self, bounds: Aabb2d) -> NodeId {
        let tile = self.config.tile_size;
        let min = Vec3::new(
            bounds.min.x as f32 * tile,
            self.config.min_height,
            bounds.min.y as f32 * tile,
        ) - self.config.padding_min;
        let max = Vec3::new(
            bounds.max.x as f32 * tile,
            self.config.max_height,
            bounds.max.y as f32 * tile,
        ) + self.config.padding_max;

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(QuadNode {
            bounds,
            corners: box_corners(min, max),
            children: None,
            volumes: Vec::new(),
            population: 0,
        });
        id
    }

    #[must_use]
    pub fn config(&self) -> &QuadTreeConfig {
        &self.config
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Registers a footprint of `w x w` tiles at `(x, z)`.
    ///
    /// The footprint is snapped to the smallest aligned power-of-two cell containing it. The
    /// returned volume stays culled until the next [`update_cull_tree`](Self::update_cull_tree).
    pub fn add_volume(&mut self, x: i32, z: i32, w: u32) -> Result<CullVolumeId> {
        let world_size = self.config.world_size;
        let end = |start: i32| start as i64 + w.max(1) as i64;
        if x < 0 || z < 0 || end(x) > world_size as i64 || end(z) > world_size as i64 {
            return Err(Error::VolumeOutOfBounds {
                x,
                z,
                w,
                world_size,
            });
        }

        let (bx, bz, bw) = snap_footprint(x, z, w, self.config.min_cell_size);
        debug_assert!(
            Aabb2d::square(bx, bz, bw).contains_rect(&Aabb2d::square(x, z, w.max(1))),
            "snapped cell must cover the footprint"
        );

        let mut node_id = NodeId::ROOT;
        loop {
            let node = &mut self.nodes[node_id.index()];
            node.population += 1;

            let node_w = node.bounds.size().x as u32;
            let Some(children) = node.children else {
                break;
            };
            if node_w <= bw {
                break;
            }

            let mid = node.bounds.center();
            let quadrant = usize::from(bx >= mid.x) | (usize::from(bz >= mid.y) << 1);
            node_id = children[quadrant];
        }

        let index = match self.free_slots.pop() {
            Some(index) => index,
            None => {
                self.slots.push(VolumeSlot::default());
                (self.slots.len() - 1) as u32
            }
        };

        let slot = &mut self.slots[index as usize];
        slot.entry = Some((CullVolume::new(bx, bz, bw), node_id));
        let id = CullVolumeId::new(index, slot.generation);

        self.nodes[node_id.index()].volumes.push(id);
        self.volume_count += 1;
        self.volumes_changed = true;

        Ok(id)
    }

    /// Unregisters a volume, returning its last state.
    pub fn remove_volume_exact(&mut self, id: CullVolumeId) -> Result<CullVolume> {
        let slot = self
            .slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .ok_or(Error::UnknownVolume(id))?;
        let (volume, node_id) = slot.entry.take().ok_or(Error::UnknownVolume(id))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_slots.push(id.index());

        let volumes = &mut self.nodes[node_id.index()].volumes;
        if let Some(position) = volumes.iter().position(|stored| *stored == id) {
            volumes.swap_remove(position);
        }

        // Walk the same path down to the owning node to keep populations exact
        let target = self.nodes[node_id.index()].bounds;
        let mut current = NodeId::ROOT;
        loop {
            let node = &mut self.nodes[current.index()];
            node.population -= 1;
            if current == node_id {
                break;
            }
            let Some(children) = node.children else {
                break;
            };
            let mid = node.bounds.center();
            let quadrant =
                usize::from(target.min.x >= mid.x) | (usize::from(target.min.y >= mid.y) << 1);
            current = children[quadrant];
        }

        self.volume_count -= 1;
        self.volumes_changed = true;

        Ok(volume)
    }

    /// Recomputes visibility for every volume against `view_projection`.
    pub fn update_cull_tree(&mut self, view_projection: &Mat4) {
        #[cfg(feature = "tracy")]
        let _span = tracy_client::span!("CullingQuadTree::update_cull_tree");

        for (volume, _) in self.slots.iter_mut().filter_map(|slot| slot.entry.as_mut()) {
            volume.is_culled = true;
        }

        let mut visible_nodes = 0usize;
        self.stack.clear();
        self.stack.push(NodeId::ROOT);

        while let Some(id) = self.stack.pop() {
            let node = &self.nodes[id.index()];
            if node.population == 0 || outside_view(&node.corners, view_projection) {
                continue;
            }
            visible_nodes += 1;

            for volume_id in &node.volumes {
                if let Some((volume, _)) = self.slots[volume_id.index() as usize].entry.as_mut() {
                    volume.is_culled = false;
                }
            }

            if let Some(children) = node.children {
                self.stack.extend(children);
            }
        }

        let mut changed = 0usize;
        for (volume, _) in self.slots.iter_mut().filter_map(|slot| slot.entry.as_mut()) {
            if volume.changed() {
                changed += 1;
            }
            volume.prev_is_culled = volume.is_culled;
        }

        self.tree_updated = changed > 0;
        self.volumes_changed = false;

        log::trace!(
            "Cull update: {visible_nodes} visible nodes, {changed}/{} volumes changed",
            self.volume_count
        );
    }

    #[must_use]
    pub fn volume(&self, id: CullVolumeId) -> Option<&CullVolume> {
        self.entry(id).map(|(volume, _)| volume)
    }

    /// Unknown ids report as culled.
    #[must_use]
    pub fn is_culled(&self, id: CullVolumeId) -> bool {
        self.volume(id).is_none_or(|volume| volume.is_culled)
    }

    /// Whether the last [`update_cull_tree`](Self::update_cull_tree) changed any visibility.
    #[must_use]
    pub fn tree_updated(&self) -> bool {
        self.tree_updated
    }

    /// Whether volumes were added or removed since the last update.
    #[must_use]
    pub fn volumes_changed(&self) -> bool {
        self.volumes_changed
    }

    #[must_use]
    pub fn volume_count(&self) -> usize {
        self.volume_count
    }

    pub fn volumes(&self) -> impl Iterator<Item = (CullVolumeId, &CullVolume)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entry
                .as_ref()
                .map(|(volume, _)| (CullVolumeId::new(index as u32, slot.generation), volume))
        })
    }

    /// Bounds of the node that stores the volume.
    #[must_use]
    pub fn node_bounds_of(&self, id: CullVolumeId) -> Option<Aabb2d> {
        self.entry(id)
            .map(|(_, node_id)| self.nodes[node_id.index()].bounds)
    }

    fn entry(&self, id: CullVolumeId) -> Option<&(CullVolume, NodeId)> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.entry.as_ref())
    }
}
