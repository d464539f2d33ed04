pub mod animator;
pub mod object;

use nalgebra::Vector3;

use crate::scene::animator::Interpolator;
use crate::scene::object::{Light, TriangleObject};

/// Which transform field an animator drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationTarget {
    Position,
    Rotation,
}

/// Connects one interpolator to one object's transform.
pub struct ObjectAnimator {
    pub object_index: usize,
    pub target: AnimationTarget,
    pub interpolator: Interpolator,
}

/// All objects of a simulation plus the animators driving their transforms.
/// Objects are constructed once at setup; per frame only transforms mutate.
#[derive(Default)]
pub struct Scene {
    pub objects: Vec<TriangleObject>,
    pub animators: Vec<ObjectAnimator>,
}

impl Scene {
    pub fn new(objects: Vec<TriangleObject>) -> Scene {
        return Scene {
            objects,
            animators: Vec::new(),
        };
    }

    /// Advances every animator and writes the interpolated values into the
    /// object transforms.
    pub fn update(&mut self, dt: f32) {
        for animator in &mut self.animators {
            animator.interpolator.tick(dt);
            let value = animator.interpolator.value();
            let Some(object) = self.objects.get_mut(animator.object_index) else {
                continue;
            };
            match animator.target {
                AnimationTarget::Position => object.transform.position = value,
                AnimationTarget::Rotation => object.transform.rotation = value,
            }
        }
    }

    /// Per-frame light descriptors from every emitting object, transformed
    /// into camera-relative rotated space.
    pub fn lights(&self, camera_position: Vector3<f32>, camera_rotation: Vector3<f32>) -> Vec<Light> {
        return self
            .objects
            .iter()
            .filter(|object| object.emission.emits)
            .map(|object| object.light_source(camera_position, camera_rotation))
            .collect();
    }
}
