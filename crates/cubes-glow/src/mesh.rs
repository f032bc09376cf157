// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `cubes-hardware`.
//
// `cubes-hardware` is free software: you can redistribute it and/or modify it under the terms of
// either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
// version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `cubes-hardware` is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Lesser General Public License or the Mozilla Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `cubes-hardware`. If not, see <https://www.gnu.org/licenses/>.

//! Indexed meshes stored in GPU buffers.

use crate::{gl_error, CallOnDrop, GlContext, GlError, ResultExt};

use cubes_hardware::mesh::Vertex;
use cubes_hardware::ShaderProgram;
use glow::HasContext;

use std::fmt;
use std::mem;
use std::rc::Rc;

/// A vertex array with its vertex and index buffers.
pub struct GlMesh<H: HasContext + ?Sized> {
    /// The context the buffers live in.
    context: Rc<GlContext<H>>,

    /// The underlying vertex buffer.
    vbo: H::Buffer,

    /// The index buffer.
    ebo: H::Buffer,

    /// The vertex array object.
    vao: H::VertexArray,

    /// The number of indices.
    num_indices: usize,
}

impl<H: HasContext + ?Sized> fmt::Debug for GlMesh<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlMesh")
            .field("num_indices", &self.num_indices)
            .finish_non_exhaustive()
    }
}

impl<H: HasContext + ?Sized> GlMesh<H> {
    /// Upload `vertices` and `indices` and describe their layout to `program`.
    ///
    /// The program must declare the `aPos` and `aTexCoord` attributes.
    pub fn new(
        context: &Rc<GlContext<H>>,
        program: &ShaderProgram<GlContext<H>>,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<Self, GlError> {
        debug_assert!(indices.iter().all(|&i| i < vertices.len() as u32));
        let gl = context.context();

        unsafe {
            // Each object is deleted again if a later step fails.
            let vbo = gl.create_buffer().gl_err()?;
            let delete_vbo = CallOnDrop(|| gl.delete_buffer(vbo));
            let ebo = gl.create_buffer().gl_err()?;
            let delete_ebo = CallOnDrop(|| gl.delete_buffer(ebo));
            let vao = gl.create_vertex_array().gl_err()?;
            let delete_vao = CallOnDrop(|| gl.delete_vertex_array(vao));

            // Bind the buffers.
            gl.bind_vertex_array(Some(vao));
            let _guard = CallOnDrop(|| {
                gl.bind_vertex_array(None);
            });
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));

            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(vertices),
                glow::STATIC_DRAW,
            );
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(indices),
                glow::STATIC_DRAW,
            );

            // Set up vertex attributes.
            let vertex_attributes = [
                ("aPos", 3, bytemuck::offset_of!(Vertex, pos)),
                ("aTexCoord", 2, bytemuck::offset_of!(Vertex, uv)),
            ];

            let stride = std::mem::size_of::<Vertex>() as i32;
            for (name, size, offset) in vertex_attributes {
                let location = gl
                    .get_attrib_location(*program.handle(), name)
                    .ok_or_else(|| {
                        GlError(format!("failed to get attribute location for {name}"))
                    })?;

                gl.enable_vertex_attrib_array(location);
                gl.vertex_attrib_pointer_f32(
                    location,
                    size,
                    glow::FLOAT,
                    false,
                    stride,
                    offset as i32,
                );
            }

            gl_error(gl);

            mem::forget(delete_vao);
            mem::forget(delete_ebo);
            mem::forget(delete_vbo);

            Ok(Self {
                context: context.clone(),
                vbo,
                ebo,
                vao,
                num_indices: indices.len(),
            })
        }
    }

    /// Draw the mesh as triangles with whatever program and textures are current.
    pub fn draw(&self) {
        let gl = self.context.context();

        unsafe {
            gl.bind_vertex_array(Some(self.vao));
            let _unbind_vao = CallOnDrop(|| {
                gl.bind_vertex_array(None);
            });

            gl.draw_elements(
                glow::TRIANGLES,
                self.num_indices as i32,
                glow::UNSIGNED_INT,
                0,
            );
        }

        gl_error(gl);
    }
}

impl<H: HasContext + ?Sized> Drop for GlMesh<H> {
    fn drop(&mut self) {
        let gl = self.context.context();

        unsafe {
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.vbo);
            gl.delete_buffer(self.ebo);
        }
    }
}
