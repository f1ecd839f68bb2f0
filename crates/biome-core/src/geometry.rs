//! CPU-side mesh generation: node shapes, Catmull-Rom curves and tubes.

use glam::Vec3;
use std::f32::consts::{PI, TAU};

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    #[inline]
    fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }
}

/// Indexed triangle list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Unit-radius UV sphere.
pub fn uv_sphere(segments: u32, rings: u32) -> Mesh {
    let segments = segments.max(3);
    let rings = rings.max(2);
    let mut mesh = Mesh::default();
    for r in 0..=rings {
        let v = r as f32 / rings as f32;
        let theta = v * PI;
        for s in 0..=segments {
            let u = s as f32 / segments as f32;
            let phi = u * TAU;
            let n = Vec3::new(
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            );
            mesh.vertices.push(MeshVertex::new(n, n));
        }
    }
    let stride = segments + 1;
    for r in 0..rings {
        for s in 0..segments {
            let a = r * stride + s;
            let b = a + stride;
            if r != 0 {
                mesh.indices.extend_from_slice(&[a, b, a + 1]);
            }
            if r != rings - 1 {
                mesh.indices.extend_from_slice(&[a + 1, b, b + 1]);
            }
        }
    }
    mesh
}

/// Unit-radius octahedron with flat face normals.
pub fn octahedron() -> Mesh {
    let px = Vec3::X;
    let nx = -Vec3::X;
    let py = Vec3::Y;
    let ny = -Vec3::Y;
    let pz = Vec3::Z;
    let nz = -Vec3::Z;
    let faces = [
        [px, py, pz],
        [pz, py, nx],
        [nx, py, nz],
        [nz, py, px],
        [px, pz, ny],
        [pz, nx, ny],
        [nx, nz, ny],
        [nz, px, ny],
    ];
    let mut mesh = Mesh::default();
    for face in faces {
        let normal = (face[0] + face[1] + face[2]).normalize();
        for p in face {
            mesh.indices.push(mesh.vertices.len() as u32);
            mesh.vertices.push(MeshVertex::new(p, normal));
        }
    }
    mesh
}

/// Open uniform Catmull-Rom spline through `points`.
///
/// End segments use reflected phantom control points so the curve starts and
/// ends exactly on the first and last point.
#[derive(Clone, Debug)]
pub struct CatmullRom {
    points: Vec<Vec3>,
}

impl CatmullRom {
    pub fn new(points: Vec<Vec3>) -> Self {
        Self { points }
    }

    fn control(&self, i: isize) -> Vec3 {
        let n = self.points.len() as isize;
        if i < 0 {
            2.0 * self.points[0] - self.points[1]
        } else if i >= n {
            2.0 * self.points[(n - 1) as usize] - self.points[(n - 2) as usize]
        } else {
            self.points[i as usize]
        }
    }

    fn segment(&self, u: f32) -> (isize, f32) {
        let segs = (self.points.len() - 1) as f32;
        let scaled = u.clamp(0.0, 1.0) * segs;
        let i = (scaled.floor() as isize).min(segs as isize - 1);
        (i, scaled - i as f32)
    }

    /// Point at normalized parameter `u` in \[0, 1\].
    pub fn point(&self, u: f32) -> Vec3 {
        match self.points.len() {
            0 => return Vec3::ZERO,
            1 => return self.points[0],
            _ => {}
        }
        let (i, t) = self.segment(u);
        let (p0, p1, p2, p3) = (
            self.control(i - 1),
            self.control(i),
            self.control(i + 1),
            self.control(i + 2),
        );
        let t2 = t * t;
        let t3 = t2 * t;
        0.5 * (2.0 * p1
            + (p2 - p0) * t
            + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
            + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
    }

    /// Unit tangent at `u`; falls back to +X where the curve is degenerate.
    pub fn tangent(&self, u: f32) -> Vec3 {
        if self.points.len() < 2 {
            return Vec3::X;
        }
        let (i, t) = self.segment(u);
        let (p0, p1, p2, p3) = (
            self.control(i - 1),
            self.control(i),
            self.control(i + 1),
            self.control(i + 2),
        );
        let d = 0.5
            * ((p2 - p0)
                + 2.0 * (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t
                + 3.0 * (3.0 * p1 - p0 - 3.0 * p2 + p3) * t * t);
        let n = d.normalize_or_zero();
        if n == Vec3::ZERO {
            Vec3::X
        } else {
            n
        }
    }
}

fn any_perpendicular(t: Vec3) -> Vec3 {
    // Pick the axis the tangent is least aligned with.
    let a = t.abs();
    let axis = if a.x <= a.y && a.x <= a.z {
        Vec3::X
    } else if a.y <= a.z {
        Vec3::Y
    } else {
        Vec3::Z
    };
    t.cross(axis).normalize_or_zero()
}

/// Tube of constant `radius` swept along `curve` using parallel-transport
/// frames. Vertex and index counts depend only on the segment counts, so a
/// re-tessellated tube can overwrite the previous buffers in place.
pub fn tube(curve: &CatmullRom, tubular_segments: usize, radius: f32, radial_segments: usize) -> Mesh {
    let tubular = tubular_segments.max(1);
    let radial = radial_segments.max(3);

    let mut tangents = Vec::with_capacity(tubular + 1);
    let mut centers = Vec::with_capacity(tubular + 1);
    for i in 0..=tubular {
        let u = i as f32 / tubular as f32;
        centers.push(curve.point(u));
        tangents.push(curve.tangent(u));
    }

    let mut normal = any_perpendicular(tangents[0]);
    if normal == Vec3::ZERO {
        normal = Vec3::Y;
    }
    let mut mesh = Mesh {
        vertices: Vec::with_capacity((tubular + 1) * (radial + 1)),
        indices: Vec::with_capacity(tubular * radial * 6),
    };
    for i in 0..=tubular {
        let t = tangents[i];
        if i > 0 {
            let prev = tangents[i - 1];
            let axis = prev.cross(t);
            if axis.length_squared() > 1e-12 {
                let angle = prev.dot(t).clamp(-1.0, 1.0).acos();
                normal = glam::Quat::from_axis_angle(axis.normalize(), angle) * normal;
            }
        }
        let binormal = t.cross(normal).normalize_or_zero();
        for j in 0..=radial {
            let v = j as f32 / radial as f32 * TAU;
            let n = (-v.cos() * normal + v.sin() * binormal).normalize_or_zero();
            mesh.vertices
                .push(MeshVertex::new(centers[i] + n * radius, n));
        }
    }

    let ring = (radial + 1) as u32;
    for i in 1..=tubular as u32 {
        for j in 1..=radial as u32 {
            let a = ring * (i - 1) + (j - 1);
            let b = ring * i + (j - 1);
            let c = ring * i + j;
            let d = ring * (i - 1) + j;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catmull_rom_passes_through_control_points() {
        let a = Vec3::new(-10.0, 0.0, 0.0);
        let m = Vec3::new(0.0, 4.0, 1.0);
        let b = Vec3::new(10.0, 0.0, 0.0);
        let c = CatmullRom::new(vec![a, m, b]);
        assert!(c.point(0.0).distance(a) < 1e-5);
        assert!(c.point(0.5).distance(m) < 1e-5);
        assert!(c.point(1.0).distance(b) < 1e-5);
    }

    #[test]
    fn straight_curve_has_constant_tangent() {
        let c = CatmullRom::new(vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)]);
        for k in 0..=10 {
            let t = c.tangent(k as f32 / 10.0);
            assert!(t.distance(Vec3::X) < 1e-4, "tangent {t:?}");
        }
    }

    #[test]
    fn tube_vertex_count_is_fixed_by_segments() {
        let c = CatmullRom::new(vec![Vec3::ZERO, Vec3::new(3.0, 2.0, 0.0), Vec3::new(6.0, 0.0, 1.0)]);
        let m = tube(&c, 12, 0.5, 6);
        assert_eq!(m.vertices.len(), 13 * 7);
        assert_eq!(m.indices.len(), 12 * 6 * 6);
        assert!(m.indices.iter().all(|&i| (i as usize) < m.vertices.len()));
    }

    #[test]
    fn tube_vertices_sit_at_radius() {
        let c = CatmullRom::new(vec![Vec3::ZERO, Vec3::new(0.0, 5.0, 5.0), Vec3::new(0.0, 0.0, 10.0)]);
        let m = tube(&c, 8, 0.25, 8);
        for (i, ring) in m.vertices.chunks(9).enumerate() {
            let center = c.point(i as f32 / 8.0);
            for v in ring {
                let d = Vec3::from(v.position).distance(center);
                assert!((d - 0.25).abs() < 1e-3, "ring {i} distance {d}");
            }
        }
    }

    #[test]
    fn degenerate_tube_is_finite() {
        let c = CatmullRom::new(vec![Vec3::ONE, Vec3::ONE, Vec3::ONE]);
        let m = tube(&c, 4, 0.1, 4);
        assert!(m
            .vertices
            .iter()
            .all(|v| v.position.iter().all(|x| x.is_finite())));
    }

    #[test]
    fn node_meshes_are_unit_radius() {
        for mesh in [uv_sphere(12, 8), octahedron()] {
            for v in &mesh.vertices {
                assert!((Vec3::from(v.position).length() - 1.0).abs() < 1e-4);
            }
            assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
        }
        assert_eq!(octahedron().triangle_count(), 8);
    }
}
