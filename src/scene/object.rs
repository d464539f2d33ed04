use std::f32::consts::PI;

use nalgebra::{vector, Vector2, Vector3};

use crate::noise::NoiseField;
use crate::render::frame::Rgba;
use crate::render::transform::{normalize_or_zero, rotate_euler};

/// How the vertex list is grouped into triangles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Topology {
    /// Independent triples: vertices 0-2, 3-5, ...
    #[default]
    Triangles,
    /// Connected strip: every vertex after the second starts a new triangle.
    /// Winding alternates so all triangles keep a consistent orientation.
    Strip,
}

impl Topology {
    pub fn step(self) -> usize {
        return match self {
            Topology::Triangles => 3,
            Topology::Strip => 1,
        };
    }

    /// Vertex indices of the triangle starting at `j`, winding-corrected for
    /// strips.
    pub fn triangle_indices(self, j: usize) -> (usize, usize, usize) {
        return match self {
            Topology::Triangles => (j, j + 1, j + 2),
            Topology::Strip => {
                if j & 1 == 1 {
                    (j, j + 1, j + 2)
                } else {
                    (j, j + 2, j + 1)
                }
            }
        };
    }
}

/// How barycentric weights turn into attribute weights per pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AttributeInterpolation {
    /// Weights corrected by the interpolated true depth.
    #[default]
    PerspectiveCorrect,
    /// The first vertex's attributes over the whole triangle.
    FirstVertex,
    /// Attributes of whichever vertex carries the largest weight.
    NearestVertex,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NormalInterpolation {
    /// Blend with the attribute weights, then normalize.
    #[default]
    PerspectiveCorrect,
    /// Blend linearly with the raw corrected weights, then normalize.
    Linear,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorSource {
    #[default]
    Vertex,
    /// Sample the object's assigned texture at the interpolated uv. Falls
    /// back to vertex color when the texture index is out of range.
    Texture,
}

/// Per-object draw configuration. Defaults produce a plain vertex-colored,
/// unlit mesh of independent triangles.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderSettings {
    pub topology: Topology,
    pub attribute_interpolation: AttributeInterpolation,
    pub normal_interpolation: NormalInterpolation,
    pub color_source: ColorSource,
    pub lighting: bool,
    pub texture_index: usize,
}

/// Placement of an object: position, non-uniform extent, Euler rotation in
/// radians per axis. The only part of an object that mutates after setup.
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub dimensions: Vector3<f32>,
    pub rotation: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Transform {
        return Transform {
            position: Vector3::zeros(),
            dimensions: vector![1.0, 1.0, 1.0],
            rotation: Vector3::zeros(),
        };
    }
}

/// Light emission parameters of an object.
#[derive(Debug, Clone, Copy)]
pub struct Emission {
    pub emits: bool,
    pub color: Rgba,
    pub diffuse_intensity: f32,
    pub diffuse_exponent: f32,
    pub specular_intensity: f32,
    pub specular_exponent: f32,
}

impl Default for Emission {
    fn default() -> Emission {
        return Emission {
            emits: false,
            color: Rgba::WHITE,
            diffuse_intensity: 0.0,
            diffuse_exponent: 1.0,
            specular_intensity: 0.0,
            specular_exponent: 1.0,
        };
    }
}

/// Per-frame light descriptor derived from an emitting object. Position is
/// camera-relative and rotated into the camera frame; lives for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Light {
    pub position: Vector3<f32>,
    pub color: Rgba,
    pub diffuse_intensity: f32,
    pub diffuse_exponent: f32,
    pub specular_intensity: f32,
    pub specular_exponent: f32,
}

/// How vertex colors are derived when no attribute buffer is supplied.
#[derive(Debug, Clone, Copy)]
pub enum ColorMap {
    /// Same color at every vertex.
    Constant(Rgba),
    /// Signed position mapped to [0, 255] per channel, fully opaque.
    Position,
    /// As `Position` but with partial alpha.
    PositionTranslucent,
    /// Four noise samples offset in space, mapped to RGBA.
    Noise,
}

impl Default for ColorMap {
    fn default() -> ColorMap {
        return ColorMap::Constant(Rgba::WHITE);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NormalMap {
    /// Vertex position direction, for sphere-like meshes centered at origin.
    #[default]
    Radial,
    /// Face normal of the owning triangle, from the cross product of its two
    /// edges off the first vertex.
    Face,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UvMap {
    /// Longitude/latitude of the normalized position, both mapped into
    /// [0, 1]. Degenerate inputs fall back to the origin coordinate.
    #[default]
    Spherical,
    /// x/z position offset by 0.5, second axis flipped.
    Planar,
}

/// Attribute generation configuration, consumed once at construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingSettings {
    pub color: ColorMap,
    pub normal: NormalMap,
    pub uv: UvMap,
}

/// Shading attributes of one vertex. Generated once from the mapping
/// configuration; never mutated unless regenerated.
#[derive(Debug, Clone, Copy)]
pub struct VertexAttributes {
    pub color: Rgba,
    pub normal: Vector3<f32>,
    pub uv: Vector2<f32>,
}

/// Immutable mesh plus mutable placement and appearance. The vertex buffer is
/// fixed at construction and never resized; per frame only the transform may
/// change (usually through an animator).
pub struct TriangleObject {
    pub vertices: Vec<Vector3<f32>>,
    pub attributes: Vec<VertexAttributes>,
    pub transform: Transform,
    pub render_settings: RenderSettings,
    pub emission: Emission,
}

impl TriangleObject {
    /// Builds an object, deriving the attribute buffer from the mapping
    /// configuration. `noise` backs the noise-based color map.
    pub fn new(
        vertices: Vec<Vector3<f32>>,
        transform: Transform,
        render_settings: RenderSettings,
        emission: Emission,
        mapping: MappingSettings,
        noise: &NoiseField,
    ) -> TriangleObject {
        let attributes = derive_attributes(
            &vertices,
            render_settings.topology,
            &mapping,
            transform.dimensions,
            noise,
        );
        return TriangleObject {
            vertices,
            attributes,
            transform,
            render_settings,
            emission,
        };
    }

    /// Builds an object with an explicit attribute buffer (same length and
    /// indexing as the vertex list).
    pub fn with_attributes(
        vertices: Vec<Vector3<f32>>,
        attributes: Vec<VertexAttributes>,
        transform: Transform,
        render_settings: RenderSettings,
        emission: Emission,
    ) -> TriangleObject {
        assert_eq!(vertices.len(), attributes.len());
        return TriangleObject {
            vertices,
            attributes,
            transform,
            render_settings,
            emission,
        };
    }

    /// Per-frame light descriptor with the object's position transformed into
    /// camera-relative rotated space. Callers filter on `emission.emits`
    /// first; the descriptor itself is meaningless for non-emitting objects.
    pub fn light_source(
        &self,
        camera_position: Vector3<f32>,
        camera_rotation: Vector3<f32>,
    ) -> Light {
        return Light {
            position: rotate_euler(self.transform.position - camera_position, camera_rotation),
            color: self.emission.color,
            diffuse_intensity: self.emission.diffuse_intensity,
            diffuse_exponent: self.emission.diffuse_exponent,
            specular_intensity: self.emission.specular_intensity,
            specular_exponent: self.emission.specular_exponent,
        };
    }
}

fn derive_attributes(
    vertices: &[Vector3<f32>],
    topology: Topology,
    mapping: &MappingSettings,
    dimensions: Vector3<f32>,
    noise: &NoiseField,
) -> Vec<VertexAttributes> {
    let mut attributes = Vec::with_capacity(vertices.len());
    for (i, &v) in vertices.iter().enumerate() {
        attributes.push(VertexAttributes {
            color: map_color(mapping.color, v, dimensions, noise),
            normal: map_normal(mapping.normal, vertices, topology, i),
            uv: map_uv(mapping.uv, v),
        });
    }
    return attributes;
}

fn map_color(map: ColorMap, v: Vector3<f32>, dimensions: Vector3<f32>, noise: &NoiseField) -> Rgba {
    return match map {
        ColorMap::Constant(color) => color,
        ColorMap::Position | ColorMap::PositionTranslucent => {
            // Signed unit-ish position mapped to [0, 255] per channel.
            let scaled = (v * 0.5 + vector![0.5, 0.5, 0.5]) * 255.0;
            let alpha = if matches!(map, ColorMap::Position) { 255 } else { 100 };
            Rgba::new(scaled.x as u8, scaled.y as u8, scaled.z as u8, alpha)
        }
        ColorMap::Noise => {
            // Sample positions offset against each other so channels decorrelate.
            let (o1, o2, o3) = (0.0, 25.0, 50.0);
            let p = (v * 0.5 + vector![0.5, 0.5, 0.5]).component_mul(&dimensions);
            let channel = |x: f32, y: f32, z: f32| -> u8 {
                ((noise.sample3(x, y, z) * 0.5 + 0.5) * 255.0) as u8
            };
            Rgba::new(
                channel(p.x + o1, p.y + o2, p.z + o3),
                channel(p.x + o2, p.y + o3, p.z + o1),
                channel(p.x + o3, p.y + o1, p.z + o2),
                channel(p.x, p.y, p.z),
            )
        }
    };
}

fn map_normal(
    map: NormalMap,
    vertices: &[Vector3<f32>],
    topology: Topology,
    i: usize,
) -> Vector3<f32> {
    let n = vertices.len();
    if matches!(map, NormalMap::Face) && n >= 3 {
        // First triangle containing vertex i, honoring strip winding. The
        // start is clamped so a dangling vertex past the last complete
        // triangle still resolves to in-range indices.
        let start = match topology {
            Topology::Triangles => (i - i % 3).min(n - 3),
            Topology::Strip => i.saturating_sub(2).min(n - 3),
        };
        let (i1, i2, i3) = topology.triangle_indices(start);
        let edge_a = vertices[i1] - vertices[i2];
        let edge_b = vertices[i1] - vertices[i3];
        return normalize_or_zero(edge_a.cross(&edge_b));
    }
    return normalize_or_zero(vertices[i]);
}

fn map_uv(map: UvMap, v: Vector3<f32>) -> Vector2<f32> {
    return match map {
        UvMap::Spherical => {
            let n = normalize_or_zero(v);
            let u = n.y.atan2(n.x) / (2.0 * PI) + 0.5;
            let w = n.z.asin() / PI + 0.5;
            if u.is_finite() && w.is_finite() {
                vector![u, w]
            } else {
                Vector2::zeros()
            }
        }
        UvMap::Planar => vector![v.x + 0.5, -(v.z + 0.5)],
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn noise() -> NoiseField {
        return NoiseField::new(0);
    }

    #[test]
    fn position_color_map_spans_channel_range() {
        let vertices = vec![vector![-1.0, 0.0, 1.0], vector![1.0, 1.0, 1.0], vector![0.0, 0.0, 0.0]];
        let object = TriangleObject::new(
            vertices,
            Transform::default(),
            RenderSettings::default(),
            Emission::default(),
            MappingSettings {
                color: ColorMap::Position,
                ..Default::default()
            },
            &noise(),
        );
        assert_eq!(object.attributes[0].color, Rgba::new(0, 127, 255, 255));
        assert_eq!(object.attributes[1].color, Rgba::new(255, 255, 255, 255));
        assert_eq!(object.attributes[2].color, Rgba::new(127, 127, 127, 255));
    }

    #[test]
    fn translucent_map_keeps_partial_alpha() {
        let object = TriangleObject::new(
            vec![vector![0.0, 0.0, 0.0]; 3],
            Transform::default(),
            RenderSettings::default(),
            Emission::default(),
            MappingSettings {
                color: ColorMap::PositionTranslucent,
                ..Default::default()
            },
            &noise(),
        );
        assert_eq!(object.attributes[0].color.a, 100);
    }

    #[test]
    fn face_normals_are_constant_per_triangle() {
        // One triangle in the xy plane; its face normal is +-z for all three
        // vertices.
        let vertices = vec![
            vector![0.0, 0.0, 0.0],
            vector![1.0, 0.0, 0.0],
            vector![0.0, 1.0, 0.0],
        ];
        let object = TriangleObject::new(
            vertices,
            Transform::default(),
            RenderSettings::default(),
            Emission::default(),
            MappingSettings {
                normal: NormalMap::Face,
                ..Default::default()
            },
            &noise(),
        );
        for attributes in &object.attributes {
            assert_relative_eq!(attributes.normal.z.abs(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn face_normals_tolerate_dangling_vertices() {
        // One complete triple plus a dangling vertex the rasterizer never
        // draws; attribute derivation must still cover it.
        let vertices = vec![
            vector![0.0, 0.0, 0.0],
            vector![1.0, 0.0, 0.0],
            vector![0.0, 1.0, 0.0],
            vector![5.0, 5.0, 5.0],
        ];
        let object = TriangleObject::new(
            vertices,
            Transform::default(),
            RenderSettings::default(),
            Emission::default(),
            MappingSettings {
                normal: NormalMap::Face,
                ..Default::default()
            },
            &noise(),
        );
        assert_eq!(object.attributes.len(), 4);
        for attributes in &object.attributes {
            assert!(attributes.normal.norm() > 0.0);
        }
    }

    #[test]
    fn spherical_uv_falls_back_on_degenerate_input() {
        assert_eq!(map_uv(UvMap::Spherical, Vector3::zeros()), Vector2::zeros());
        let uv = map_uv(UvMap::Spherical, vector![1.0, 0.0, 0.0]);
        assert_relative_eq!(uv.x, 0.5);
        assert_relative_eq!(uv.y, 0.5);
    }

    #[test]
    fn planar_uv_offsets_and_flips() {
        let uv = map_uv(UvMap::Planar, vector![0.25, 9.0, -0.25]);
        assert_relative_eq!(uv.x, 0.75);
        assert_relative_eq!(uv.y, -0.25);
    }

    #[test]
    fn strip_indices_alternate_winding() {
        assert_eq!(Topology::Strip.triangle_indices(0), (0, 2, 1));
        assert_eq!(Topology::Strip.triangle_indices(1), (1, 2, 3));
        assert_eq!(Topology::Strip.triangle_indices(2), (2, 4, 3));
        assert_eq!(Topology::Triangles.triangle_indices(3), (3, 4, 5));
    }

    #[test]
    fn light_source_is_camera_relative() {
        let mut object = TriangleObject::new(
            vec![vector![0.0, 0.0, 0.0]; 3],
            Transform::default(),
            RenderSettings::default(),
            Emission {
                emits: true,
                ..Default::default()
            },
            MappingSettings::default(),
            &noise(),
        );
        object.transform.position = vector![10.0, 0.0, 0.0];
        let light = object.light_source(vector![4.0, 0.0, 0.0], Vector3::zeros());
        assert_relative_eq!(light.position.x, 6.0);
    }
}
