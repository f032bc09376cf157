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

//! Mipmapped 2D textures.

use crate::{gl_error, CallOnDrop, GlContext, GlError, ResultExt};

use glow::HasContext;

use std::fmt;
use std::rc::Rc;

/// A repeating, trilinear-filtered 2D texture.
pub struct GlTexture<H: HasContext + ?Sized> {
    context: Rc<GlContext<H>>,
    texture: H::Texture,
}

impl<H: HasContext + ?Sized> fmt::Debug for GlTexture<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlTexture").finish_non_exhaustive()
    }
}

impl<H: HasContext + ?Sized> GlTexture<H> {
    /// Create an empty texture.
    pub fn new(context: &Rc<GlContext<H>>) -> Result<Self, GlError> {
        let gl = context.context();

        unsafe {
            let texture = gl.create_texture().gl_err()?;

            // Bind the texture.
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            let _guard = CallOnDrop(|| {
                gl.bind_texture(glow::TEXTURE_2D, None);
            });

            let parameters = [
                (glow::TEXTURE_WRAP_S, glow::REPEAT),
                (glow::TEXTURE_WRAP_T, glow::REPEAT),
                (glow::TEXTURE_MIN_FILTER, glow::LINEAR_MIPMAP_LINEAR),
                (glow::TEXTURE_MAG_FILTER, glow::LINEAR),
            ];
            for (parameter, value) in parameters {
                gl.tex_parameter_i32(glow::TEXTURE_2D, parameter, value as i32);
            }

            gl_error(gl);

            Ok(Self {
                context: context.clone(),
                texture,
            })
        }
    }

    /// Upload tightly packed RGB8 pixels and regenerate the mipmap chain.
    ///
    /// Rows are expected bottom-up, as OpenGL samples them.
    ///
    /// Fails if `data` does not hold exactly `width * height` pixels.
    pub fn write_rgb(&self, (width, height): (u32, u32), data: &[u8]) -> Result<(), GlError> {
        if rgb_len(width, height) != Some(data.len()) {
            return Err(GlError(format!(
                "{} bytes is not a {width}x{height} RGB8 image",
                data.len()
            )));
        }
        let gl = self.context.context();

        unsafe {
            gl.bind_texture(glow::TEXTURE_2D, Some(self.texture));
            let _guard = CallOnDrop(|| {
                gl.bind_texture(glow::TEXTURE_2D, None);
            });

            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGB8 as i32,
                width as i32,
                height as i32,
                0,
                glow::RGB,
                glow::UNSIGNED_BYTE,
                Some(data),
            );
            gl.generate_mipmap(glow::TEXTURE_2D);
        }

        gl_error(gl);
        Ok(())
    }

    /// Bind the texture to texture unit `unit`.
    ///
    /// The texture stays bound until something else is bound to the same unit.
    pub fn bind(&self, unit: u32) {
        let gl = self.context.context();

        unsafe {
            gl.active_texture(glow::TEXTURE0 + unit);
            gl.bind_texture(glow::TEXTURE_2D, Some(self.texture));
        }
    }
}

impl<H: HasContext + ?Sized> Drop for GlTexture<H> {
    fn drop(&mut self) {
        unsafe {
            self.context.context().delete_texture(self.texture);
        }
    }
}

/// The byte length of a tightly packed RGB8 image, if it fits in memory.
fn rgb_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(3)
}
