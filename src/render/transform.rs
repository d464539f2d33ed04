use nalgebra::{vector, Rotation3, Vector3};

use crate::camera::Camera;
use crate::scene::object::Transform;

/// Logical horizontal resolution the scene is authored against. Projected
/// coordinates are scaled from this up to the actual target resolution, so
/// scene units stay the same across window sizes.
pub const SOURCE_WIDTH: f32 = 1920.0;

/// Applies Euler rotations around x, then y, then z.
pub fn rotate_euler(v: Vector3<f32>, rotation: Vector3<f32>) -> Vector3<f32> {
    return Rotation3::from_euler_angles(rotation.x, rotation.y, rotation.z) * v;
}

/// Rotates `point` around `origin` by the given Euler angles.
pub fn rotate_euler_about(
    point: Vector3<f32>,
    rotation: Vector3<f32>,
    origin: Vector3<f32>,
) -> Vector3<f32> {
    return rotate_euler(point - origin, rotation) + origin;
}

/// Per-frame projection constants, shared by the vertex transform, the
/// culling stages and the lighting stage (which needs to undo the mapping).
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub half_width: f32,
    pub half_height: f32,
    /// Target resolution divided by the aspect-corrected source resolution.
    pub scale: Vector3<f32>,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Viewport {
        let aspect = width as f32 / height as f32;
        let source = vector![SOURCE_WIDTH, SOURCE_WIDTH / aspect, 1.0];
        let target = vector![width as f32, height as f32, 1.0];
        return Viewport {
            width,
            height,
            half_width: (width / 2) as f32,
            half_height: (height / 2) as f32,
            scale: target.component_div(&source),
        };
    }
}

/// Object space to world space: scale by dimensions, rotate, translate.
pub fn to_world(transform: &Transform, local: Vector3<f32>) -> Vector3<f32> {
    return rotate_euler(
        local.component_mul(&transform.dimensions),
        transform.rotation,
    ) + transform.position;
}

/// World space to screen space: subtract the camera position, rotate into the
/// camera frame, pinhole-project x and y keeping raw z, scale to pixel units.
/// Screen coordinates are centered on the viewport; x grows right, y down.
pub fn project_world(camera: &Camera, world: Vector3<f32>, viewport: &Viewport) -> Vector3<f32> {
    let cam = rotate_euler(world - camera.position, camera.rotation);
    return scale_z(cam, camera.z_near).component_mul(&viewport.scale);
}

/// Full per-vertex transform from object space to screen space.
pub fn project(
    camera: &Camera,
    transform: &Transform,
    local: Vector3<f32>,
    viewport: &Viewport,
) -> Vector3<f32> {
    return project_world(camera, to_world(transform, local), viewport);
}

/// The classic pinhole projection: x and y scaled by near / z, z untouched.
/// Callers cull z <= 0 before any division that depends on this.
pub fn scale_z(v: Vector3<f32>, z_near: f32) -> Vector3<f32> {
    let factor = z_near / v.z;
    return vector![v.x * factor, v.y * factor, v.z];
}

/// Inverse of the projection, recovering the camera-space position of a
/// fragment from its screen coordinate and interpolated depth. Lighting needs
/// this for the view and light direction vectors.
pub fn unproject_fragment(
    screen: Vector3<f32>,
    z_near: f32,
    viewport: &Viewport,
) -> Vector3<f32> {
    let scaled = screen.component_div(&viewport.scale);
    let factor = scaled.z / z_near;
    return vector![scaled.x * factor, scaled.y * factor, scaled.z];
}

/// Normalized copy of `v`, or zero when the input has no direction.
pub fn normalize_or_zero(v: Vector3<f32>) -> Vector3<f32> {
    let norm = v.norm();
    if norm == 0.0 {
        return Vector3::zeros();
    }
    return v / norm;
}

/// 8 corners of the axis-aligned extent of `dimensions` around `position`,
/// used for the object-level culling stages. Object rotation is ignored here;
/// the extent is deliberately conservative for roughly box-shaped meshes.
pub fn bounding_corners(position: Vector3<f32>, dimensions: Vector3<f32>) -> [Vector3<f32>; 8] {
    let mut corners = [Vector3::zeros(); 8];
    let mut index = 0;
    for sx in [1.0, -1.0] {
        for sy in [1.0, -1.0] {
            for sz in [1.0, -1.0] {
                corners[index] = vector![
                    position.x + sx * dimensions.x,
                    position.y + sy * dimensions.y,
                    position.z + sz * dimensions.z
                ];
                index += 1;
            }
        }
    }
    return corners;
}
