// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `cubes-hardware`.
//
// `cubes-hardware` is free software: you can redistribute it and/or modify it under the
// terms of either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
//   version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `cubes-hardware` is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR
// PURPOSE. See the GNU Lesser General Public License or the Mozilla Public License for more
// details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `cubes-hardware`. If not, see <https://www.gnu.org/licenses/>.

//! The textured cube mesh.
//!
//! Every face has its own four vertices so that it can sample its own cell of the texture.
//! The texture is treated as a 2x3 atlas: front/back on the bottom row, left/right in the
//! middle and top/bottom on the top row.

/// The vertex type used by the cube mesh.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Vertex {
    /// The position of the vertex in model space.
    pub pos: [f32; 3],

    /// The coordinate of the vertex in the texture.
    pub uv: [f32; 2],
}

const fn v(pos: [f32; 3], uv: [f32; 2]) -> Vertex {
    Vertex { pos, uv }
}

const THIRD: f32 = 0.333;
const TWO_THIRDS: f32 = 0.666;

/// The 24 vertices of a cube spanning `-1..=1` on every axis.
pub const CUBE_VERTICES: [Vertex; 24] = [
    // Front
    v([-1.0, 1.0, 1.0], [0.0, THIRD]),
    v([-1.0, -1.0, 1.0], [0.0, 0.0]),
    v([1.0, 1.0, 1.0], [0.5, THIRD]),
    v([1.0, -1.0, 1.0], [0.5, 0.0]),
    // Back
    v([-1.0, 1.0, -1.0], [1.0, THIRD]),
    v([-1.0, -1.0, -1.0], [1.0, 0.0]),
    v([1.0, 1.0, -1.0], [0.5, THIRD]),
    v([1.0, -1.0, -1.0], [0.5, 0.0]),
    // Left
    v([-1.0, 1.0, 1.0], [0.0, TWO_THIRDS]),
    v([-1.0, -1.0, 1.0], [0.0, THIRD]),
    v([-1.0, 1.0, -1.0], [0.5, TWO_THIRDS]),
    v([-1.0, -1.0, -1.0], [0.5, THIRD]),
    // Right
    v([1.0, 1.0, 1.0], [0.5, TWO_THIRDS]),
    v([1.0, -1.0, 1.0], [0.5, THIRD]),
    v([1.0, 1.0, -1.0], [1.0, TWO_THIRDS]),
    v([1.0, -1.0, -1.0], [1.0, THIRD]),
    // Top
    v([-1.0, 1.0, 1.0], [0.0, TWO_THIRDS]),
    v([1.0, 1.0, 1.0], [0.5, TWO_THIRDS]),
    v([-1.0, 1.0, -1.0], [0.0, 1.0]),
    v([1.0, 1.0, -1.0], [0.5, 1.0]),
    // Bottom
    v([-1.0, -1.0, 1.0], [0.5, 1.0]),
    v([1.0, -1.0, 1.0], [1.0, 1.0]),
    v([-1.0, -1.0, -1.0], [0.5, TWO_THIRDS]),
    v([1.0, -1.0, -1.0], [1.0, TWO_THIRDS]),
];

/// Two triangles per face, indexing into [`CUBE_VERTICES`].
pub const CUBE_INDICES: [u32; 36] = [
    0, 1, 2, 2, 3, 1, // front
    4, 5, 6, 6, 7, 5, // back
    10, 11, 8, 8, 9, 11, // left
    14, 15, 12, 12, 13, 15, // right
    19, 18, 17, 17, 16, 18, // top
    23, 22, 21, 20, 21, 22, // bottom
];
