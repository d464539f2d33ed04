use nalgebra::{vector, Vector3};

/// Unit icosphere as a flat list of independent triangles (three vertices per
/// face). `subdivisions` splits every icosahedron face into 4 smaller faces
/// per level, so the vertex count is 60 * 4^subdivisions.
pub fn icosphere(subdivisions: u32) -> Vec<Vector3<f32>> {
    // Golden-ratio icosahedron corners.
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let corners: [Vector3<f32>; 12] = [
        vector![-1.0, t, 0.0],
        vector![1.0, t, 0.0],
        vector![-1.0, -t, 0.0],
        vector![1.0, -t, 0.0],
        vector![0.0, -1.0, t],
        vector![0.0, 1.0, t],
        vector![0.0, -1.0, -t],
        vector![0.0, 1.0, -t],
        vector![t, 0.0, -1.0],
        vector![t, 0.0, 1.0],
        vector![-t, 0.0, -1.0],
        vector![-t, 0.0, 1.0],
    ];
    let faces: [[usize; 3]; 20] = [
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 3],
    ];

    let mut vertices = Vec::with_capacity(60 * 4_usize.pow(subdivisions));
    for face in faces {
        subdivide(
            corners[face[0]].normalize(),
            corners[face[1]].normalize(),
            corners[face[2]].normalize(),
            subdivisions,
            &mut vertices,
        );
    }
    return vertices;
}

fn subdivide(
    a: Vector3<f32>,
    b: Vector3<f32>,
    c: Vector3<f32>,
    level: u32,
    out: &mut Vec<Vector3<f32>>,
) {
    if level == 0 {
        out.push(a);
        out.push(b);
        out.push(c);
        return;
    }

    // Midpoints pushed back onto the unit sphere.
    let ab = ((a + b) / 2.0).normalize();
    let bc = ((b + c) / 2.0).normalize();
    let ca = ((c + a) / 2.0).normalize();

    subdivide(a, ab, ca, level - 1, out);
    subdivide(ab, b, bc, level - 1, out);
    subdivide(ca, bc, c, level - 1, out);
    subdivide(ab, bc, ca, level - 1, out);
}

/// Flat grid on the xz plane spanning [-0.5, 0.5] in both axes at y = 0,
/// two independent triangles per cell.
pub fn plane(rows: u32, cols: u32) -> Vec<Vector3<f32>> {
    let mut vertices = Vec::with_capacity((rows * cols * 6) as usize);
    for row in 0..rows {
        for col in 0..cols {
            let x0 = col as f32 / cols as f32 - 0.5;
            let x1 = (col + 1) as f32 / cols as f32 - 0.5;
            let z0 = row as f32 / rows as f32 - 0.5;
            let z1 = (row + 1) as f32 / rows as f32 - 0.5;

            vertices.push(vector![x0, 0.0, z0]);
            vertices.push(vector![x1, 0.0, z0]);
            vertices.push(vector![x0, 0.0, z1]);

            vertices.push(vector![x1, 0.0, z0]);
            vertices.push(vector![x1, 0.0, z1]);
            vertices.push(vector![x0, 0.0, z1]);
        }
    }
    return vertices;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn icosphere_vertex_counts() {
        assert_eq!(icosphere(0).len(), 60);
        assert_eq!(icosphere(1).len(), 240);
        assert_eq!(icosphere(2).len(), 960);
    }

    #[test]
    fn icosphere_vertices_lie_on_unit_sphere() {
        for vertex in icosphere(2) {
            assert_relative_eq!(vertex.norm(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn plane_counts_and_extent() {
        let grid = plane(2, 3);
        assert_eq!(grid.len(), 2 * 3 * 6);
        for vertex in grid {
            assert_eq!(vertex.y, 0.0);
            assert!(vertex.x >= -0.5 && vertex.x <= 0.5);
            assert!(vertex.z >= -0.5 && vertex.z <= 0.5);
        }
    }
}
