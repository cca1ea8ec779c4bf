//! Indexed triangle meshes and the 3D draw path
//!
//! Vertices are transformed by a caller-supplied MVP matrix, projected to
//! pixel space and rasterized with perspective-correct attributes. There is
//! no frustum clipping: a triangle is dropped whole if any vertex has a
//! near-zero `w` or lands outside a slightly widened NDC depth range.

use serde::{Deserialize, Serialize};

use crate::math3d::{Mat4, Vec2, Vec3};
use crate::raster::{rasterize_triangle, ScreenVertex, Varying};
use crate::surface::{Color, PixelSurface};
use crate::texture::Image;

/// Vertices with |clip.w| below this are rejected
const MIN_CLIP_W: f32 = 1e-8;
/// NDC depth outside ±this rejects the vertex
const NDC_Z_LIMIT: f32 = 1.2;
/// Pixels whose interpolated 1/w is at or below this are skipped
const MIN_INV_W: f32 = 1e-12;

/// Mesh vertex: object-space position, 0..1 color and 0..1 texture coordinate
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex3D {
    pub pos: Vec3,
    pub color: Vec3,
    pub uv: Vec2,
}

impl Vertex3D {
    pub const fn new(pos: Vec3, color: Vec3, uv: Vec2) -> Self {
        Self { pos, color, uv }
    }
}

/// An indexed triangle list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex3D>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Cube with half-extent `size`, corner colors and per-corner UVs.
    /// Non-positive sizes fall back to 1.
    pub fn cube(size: f32) -> Self {
        let s = if size > 0.0 { size } else { 1.0 };
        let v = |x: f32, y: f32, z: f32, col: (f32, f32, f32), u: f32, t: f32| {
            Vertex3D::new(Vec3::new(x, y, z), Vec3::new(col.0, col.1, col.2), Vec2::new(u, t))
        };
        let vertices = vec![
            // front (+z)
            v(-s, -s, s, (1.0, 0.0, 0.0), 0.0, 1.0),
            v(s, -s, s, (0.0, 1.0, 0.0), 1.0, 1.0),
            v(s, s, s, (0.0, 0.0, 1.0), 1.0, 0.0),
            v(-s, s, s, (1.0, 1.0, 0.0), 0.0, 0.0),
            // back (-z)
            v(-s, -s, -s, (1.0, 0.0, 1.0), 1.0, 1.0),
            v(s, -s, -s, (0.0, 1.0, 1.0), 0.0, 1.0),
            v(s, s, -s, (1.0, 1.0, 1.0), 0.0, 0.0),
            v(-s, s, -s, (0.5, 0.5, 0.5), 1.0, 0.0),
        ];

        #[rustfmt::skip]
        let indices = vec![
            0, 1, 2, 0, 2, 3, // front
            1, 5, 6, 1, 6, 2, // right
            5, 4, 7, 5, 7, 6, // back
            4, 0, 3, 4, 3, 7, // left
            3, 2, 6, 3, 6, 7, // top
            4, 5, 1, 4, 1, 0, // bottom
        ];

        Self { vertices, indices }
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Draw with `mvp`, optionally textured, depth-tested if requested
    pub fn draw(&self, surface: &mut PixelSurface, mvp: &Mat4, texture: Option<&Image>, depth_test: bool) {
        draw_mesh(surface, &self.vertices, &self.indices, mvp, texture, depth_test);
    }
}

// ============================================================================
// Projection
// ============================================================================

/// Attributes pre-multiplied by 1/w so screen-space interpolation followed by
/// a divide by the interpolated 1/w is perspective-correct
#[derive(Debug, Clone, Copy)]
struct PerspAttr {
    inv_w: f32,
    z: f32,
    color: Vec3,
    uv: Vec2,
}

impl Varying for PerspAttr {
    #[inline]
    fn weighted(v: &[Self; 3], w: [f32; 3]) -> Self {
        Self {
            inv_w: f32::weighted(&[v[0].inv_w, v[1].inv_w, v[2].inv_w], w),
            z: f32::weighted(&[v[0].z, v[1].z, v[2].z], w),
            color: Vec3::weighted(&[v[0].color, v[1].color, v[2].color], w),
            uv: Vec2::weighted(&[v[0].uv, v[1].uv, v[2].uv], w),
        }
    }
}

/// Clip -> NDC -> pixel space. None when the vertex must be rejected.
fn project_vertex(v: &Vertex3D, mvp: &Mat4, width: f32, height: f32) -> Option<ScreenVertex<PerspAttr>> {
    let clip = mvp.transform(v.pos.extend(1.0));
    if clip.w.abs() < MIN_CLIP_W {
        return None;
    }
    let inv_w = 1.0 / clip.w;
    let ndc = Vec3::new(clip.x * inv_w, clip.y * inv_w, clip.z * inv_w);
    if !(-NDC_Z_LIMIT..=NDC_Z_LIMIT).contains(&ndc.z) {
        return None;
    }

    let pos = Vec2::new(
        (ndc.x * 0.5 + 0.5) * width,
        (1.0 - (ndc.y * 0.5 + 0.5)) * height,
    );
    let depth = ndc.z * 0.5 + 0.5;
    Some(ScreenVertex::new(
        pos,
        PerspAttr {
            inv_w,
            z: depth * inv_w,
            color: v.color * inv_w,
            uv: v.uv * inv_w,
        },
    ))
}

/// Transform, project and rasterize an indexed triangle list.
///
/// Empty input or an index count that is not a multiple of 3 draws nothing.
/// Triangles with an out-of-range index or a rejected vertex are skipped.
/// Depth testing only happens when requested and the surface has depth enabled.
pub fn draw_mesh(
    surface: &mut PixelSurface,
    vertices: &[Vertex3D],
    indices: &[u32],
    mvp: &Mat4,
    texture: Option<&Image>,
    depth_test: bool,
) {
    if vertices.is_empty() || indices.is_empty() || indices.len() % 3 != 0 {
        return;
    }

    let (w, h) = (surface.width() as f32, surface.height() as f32);
    let projected: Vec<_> = vertices.iter().map(|v| project_vertex(v, mvp, w, h)).collect();
    let texture = texture.filter(|t| t.is_valid());
    let test_depth = depth_test && surface.depth_enabled();

    for tri in indices.chunks_exact(3) {
        let corner = |i: u32| projected.get(i as usize).copied().flatten();
        let (Some(a), Some(b), Some(c)) = (corner(tri[0]), corner(tri[1]), corner(tri[2])) else {
            continue;
        };

        rasterize_triangle(surface, [a, b, c], |s, frag| {
            let p = frag.interpolate();
            if p.inv_w <= MIN_INV_W {
                return;
            }
            let w = 1.0 / p.inv_w;
            if test_depth && !s.depth_test_write(frag.x, frag.y, p.z * w) {
                return;
            }

            let color = p.color * w;
            let base = Color::from_unit(color.x, color.y, color.z);
            let out = match texture {
                Some(tex) => {
                    let uv = p.uv * w;
                    tex.sample_nearest(uv.x, uv.y).modulate(base)
                },
                None => base,
            };
            s.write_pixel(frag.x, frag.y, out);
        });
    }
}
