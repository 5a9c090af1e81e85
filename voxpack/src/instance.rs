//! Placed copies of one render mesh, bound to the culling quadtree.
//!
//! Each instance registers a cull volume sized to the mesh footprint. After the tree is updated,
//! [`InstanceSet::build_instance_buffer`] emits one packed word per visible instance:
//!
//! ```ignore
//!   31-23   22-14   13-0
//! +-------+-------+--------+
//! |   x   |   z   | unused |
//! +-------+-------+--------+
//!  9 bits  9 bits
//! ```

use crate::{
    Error, Result,
    spatial::{CullVolumeId, CullingQuadTree},
};

const COORD_MASK: u32 = 0x1FF;

/// Packs a tile position into the per-instance transform word.
#[must_use]
#[inline(always)]
pub const fn pack_instance_transform(x: u32, z: u32) -> u32 {
    ((x & COORD_MASK) << 23) | ((z & COORD_MASK) << 14)
}

#[must_use]
#[inline(always)]
pub const fn unpack_instance_transform(bits: u32) -> (u32, u32) {
    ((bits >> 23) & COORD_MASK, (bits >> 14) & COORD_MASK)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(u32);

impl InstanceId {
    #[inline(always)]
    pub const fn raw(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instance {
    pub id: InstanceId,
    pub x: u32,
    pub z: u32,
    pub volume: CullVolumeId,
}

#[derive(Debug)]
pub struct InstanceSet {
    name: String,
    footprint: u32,
    instances: Vec<Instance>,
    next_id: u32,
    dirty: bool,
}

impl InstanceSet {
    /// `footprint` is the edge of the square the mesh covers, in tiles.
    pub fn new(name: impl Into<String>, footprint: u32) -> Self {
        Self {
            name: name.into(),
            footprint: footprint.max(1),
            instances: Vec::new(),
            next_id: 0,
            dirty: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn footprint(&self) -> u32 {
        self.footprint
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn add_instance(&mut self, tree: &mut CullingQuadTree, x: u32, z: u32) -> Result<InstanceId> {
        let volume = tree.add_volume(x as i32, z as i32, self.footprint)?;

        let id = InstanceId(self.next_id);
        self.next_id += 1;
        self.instances.push(Instance { id, x, z, volume });
        self.dirty = true;

        Ok(id)
    }

    /// Removes an instance and its cull volume. The last instance takes its place.
    pub fn remove_instance(&mut self, tree: &mut CullingQuadTree, id: InstanceId) -> Result<()> {
        let position = self
            .instances
            .iter()
            .position(|instance| instance.id == id)
            .ok_or(Error::UnknownInstance(id.0))?;

        tree.remove_volume_exact(self.instances[position].volume)?;
        self.instances.swap_remove(position);
        self.dirty = true;

        Ok(())
    }

    /// Refills `buffer` with the packed transforms of unculled instances, in list order.
    pub fn build_instance_buffer(&mut self, tree: &CullingQuadTree, buffer: &mut Vec<u32>) {
        buffer.clear();
        buffer.extend(
            self.instances
                .iter()
                .filter(|instance| !tree.is_culled(instance.volume))
                .map(|instance| pack_instance_transform(instance.x, instance.z)),
        );
        self.dirty = false;

        log::trace!(
            "Instance buffer '{}': {}/{} visible",
            self.name,
            buffer.len(),
            self.instances.len()
        );
    }

    pub fn needs_rebuild(&self, tree: &CullingQuadTree) -> bool {
        self.dirty || tree.tree_updated()
    }
}

#[cfg(test)]
mod tests {
    use crate::spatial::{QuadTreeConfig, frustum::tests::top_down};

    use super::*;

    fn tree() -> CullingQuadTree {
        CullingQuadTree::new(QuadTreeConfig {
            world_size: 64,
            ..Default::default()
        })
    }

    #[test]
    fn test_pack_transform() {
        assert_eq!(pack_instance_transform(1, 0), 1 << 23);
        assert_eq!(pack_instance_transform(0, 1), 1 << 14);
        assert_eq!(pack_instance_transform(511, 511), 0xFFFF_C000);
        assert_eq!(pack_instance_transform(512, 513), 1 << 14);
        assert_eq!(unpack_instance_transform(pack_instance_transform(300, 17)), (300, 17));
    }

    #[test]
    fn test_add_and_build() {
        let mut tree = tree();
        let mut set = InstanceSet::new("tower", 1);
        set.add_instance(&mut tree, 2, 2).unwrap();
        set.add_instance(&mut tree, 60, 60).unwrap();
        set.add_instance(&mut tree, 3, 1).unwrap();
        assert!(set.needs_rebuild(&tree));

        let mut buffer = Vec::new();
        set.build_instance_buffer(&tree, &mut buffer);
        assert!(buffer.is_empty());

        tree.update_cull_tree(&top_down(4.0, 4.0, 4.0));
        assert!(set.needs_rebuild(&tree));

        set.build_instance_buffer(&tree, &mut buffer);
        assert_eq!(
            buffer,
            vec![pack_instance_transform(2, 2), pack_instance_transform(3, 1)]
        );

        tree.update_cull_tree(&top_down(4.0, 4.0, 4.0));
        assert!(!set.needs_rebuild(&tree));
    }

    #[test]
    fn test_remove() {
        let mut tree = tree();
        let mut set = InstanceSet::new("tower", 2);
        let a = set.add_instance(&mut tree, 2, 2).unwrap();
        let b = set.add_instance(&mut tree, 6, 6).unwrap();
        let mut buffer = Vec::new();
        set.build_instance_buffer(&tree, &mut buffer);

        set.remove_instance(&mut tree, a).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.instances()[0].id, b);
        assert_eq!(tree.volume_count(), 1);
        assert!(set.needs_rebuild(&tree));

        assert!(matches!(
            set.remove_instance(&mut tree, a),
            Err(Error::UnknownInstance(0))
        ));
    }

    #[test]
    fn test_out_of_bounds_instance() {
        let mut tree = tree();
        let mut set = InstanceSet::new("wall", 4);
        assert!(matches!(
            set.add_instance(&mut tree, 62, 0),
            Err(Error::VolumeOutOfBounds { .. })
        ));
        assert!(set.is_empty());
        assert!(!set.needs_rebuild(&tree));
    }
}
