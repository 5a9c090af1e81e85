use glam::{Mat4, Vec3};

/// World-space corners of a box spanning `min..max`.
pub fn box_corners(min: Vec3, max: Vec3) -> [Vec3; 8] {
    [
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(max.x, min.y, min.z),
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(max.x, min.y, max.z),
        Vec3::new(min.x, max.y, max.z),
        Vec3::new(max.x, max.y, max.z),
    ]
}

/// Returns `true` when every projected corner lies beyond the same side of the clip square.
///
/// Only the four side planes are tested; depth is ignored. Boxes straddling a plane
/// without any corner inside the view are kept (conservative).
pub fn outside_view(corners: &[Vec3; 8], view_projection: &Mat4) -> bool {
    let mut left = true;
    let mut right = true;
    let mut bottom = true;
    let mut top = true;

    for corner in corners {
        let p = view_projection.project_point3(*corner);
        left &= p.x < -1.0;
        right &= p.x > 1.0;
        bottom &= p.y < -1.0;
        top &= p.y > 1.0;
    }

    left || right || bottom || top
}
