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

//! A shader program wrapper for a small spinning-cubes renderer.
//!
//! The centerpiece of this crate is [`ShaderProgram`], which compiles a vertex and a fragment
//! shader, links them, and lets you activate the result and write uniforms into it. It talks to
//! the GPU through the [`GpuContext`] trait, so the same code runs on top of [`glow`] (see the
//! `cubes-glow` crate) or any other driver that exposes the classic compile/link primitives.
//!
//! The crate also carries the geometry and camera math of the demo scene in [`mesh`] and
//! [`scene`].
//!
//! [`glow`]: https://crates.io/crates/glow

pub use glam;

mod gpu_backend;
#[cfg(test)]
mod mock;
mod program;
mod resources;

pub mod mesh;
pub mod scene;

pub use gpu_backend::{GpuContext, ShaderStage, UniformKind, UniformValue};
pub use program::{BoundProgram, ProgramError, ShaderProgram};
