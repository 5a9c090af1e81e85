use glam::{Mat4, Vec3};

use super::{CullingQuadTree, QuadTreeConfig};

/// Camera state read by the culling system once per tick.
pub trait CullCamera {
    fn view_projection(&self) -> Mat4;
    fn position(&self) -> Vec3;
    fn zoom(&self) -> f32;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CullUpdatePolicy {
    /// Camera travel (world units) that forces a re-cull.
    pub position_threshold: f32,
    /// Change of camera zoom distance that forces a re-cull.
    pub zoom_threshold: f32,
}

impl Default for CullUpdatePolicy {
    fn default() -> Self {
        Self {
            position_threshold: 1.5,
            zoom_threshold: 1.5,
        }
    }
}

/// Decides whether the cull tree needs to be re-evaluated this tick.
#[derive(Debug, Default)]
pub struct CullUpdateGate {
    policy: CullUpdatePolicy,
    last: Option<(Vec3, f32)>,
}

impl CullUpdateGate {
    pub fn new(policy: CullUpdatePolicy) -> Self {
        Self { policy, last: None }
    }

    pub fn policy(&self) -> &CullUpdatePolicy {
        &self.policy
    }

    /// Returns `true` and records the camera state when an update is due.
    ///
    /// The camera state is only recorded on `true`, so slow drift accumulates until it crosses
    /// a threshold.
    pub fn should_update(&mut self, volumes_changed: bool, position: Vec3, zoom: f32) -> bool {
        let due = match self.last {
            None => true,
            Some((last_position, last_zoom)) => {
                volumes_changed
                    || last_position.distance(position) > self.policy.position_threshold
                    || (last_zoom - zoom).abs() > self.policy.zoom_threshold
            }
        };

        if due {
            self.last = Some((position, zoom));
        }

        due
    }

    /// Forgets the recorded camera so the next query updates.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// A [`CullingQuadTree`] driven by a [`CullUpdateGate`].
#[derive(Debug)]
pub struct CullingSystem {
    tree: CullingQuadTree,
    gate: CullUpdateGate,
}

impl CullingSystem {
    pub fn new(config: QuadTreeConfig, policy: CullUpdatePolicy) -> Self {
        Self {
            tree: CullingQuadTree::new(config),
            gate: CullUpdateGate::new(policy),
        }
    }

    pub fn tree(&self) -> &CullingQuadTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut CullingQuadTree {
        &mut self.tree
    }

    /// Runs one tick. Returns whether the tree was re-evaluated.
    pub fn tick(&mut self, camera: &impl CullCamera) -> bool {
        let run =
            self.gate
                .should_update(self.tree.volumes_changed(), camera.position(), camera.zoom());
        if run {
            self.tree.update_cull_tree(&camera.view_projection());
        }
        run
    }
}
