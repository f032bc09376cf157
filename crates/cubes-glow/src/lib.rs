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

//! An OpenGL backend for `cubes-hardware` that uses the [`glow`] crate.
//!
//! [`GlContext`] implements [`GpuContext`] so that a [`ShaderProgram`] can be built on top of
//! it. [`GlMesh`] and [`GlTexture`] cover the rest of what the spinning-cubes demo needs.
//!
//! [`glow`]: https://crates.io/crates/glow
//! [`ShaderProgram`]: cubes_hardware::ShaderProgram

use cubes_hardware::glam::Mat4;
use cubes_hardware::{GpuContext, ShaderStage, UniformKind, UniformValue};
use glow::HasContext;

use std::fmt;

mod mesh;
mod texture;

pub use mesh::GlMesh;
pub use texture::GlTexture;

/// A [`ShaderProgram`] running on a [`GlContext`].
///
/// [`ShaderProgram`]: cubes_hardware::ShaderProgram
pub type GlProgram<H> = cubes_hardware::ShaderProgram<GlContext<H>>;

/// A wrapper around a `glow` context.
pub struct GlContext<H: HasContext + ?Sized> {
    /// The underlying context.
    context: H,
}

impl<H: HasContext + ?Sized> fmt::Debug for GlContext<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlContext")
            .field("version", &self.context.version())
            .finish_non_exhaustive()
    }
}

impl<H: HasContext> GlContext<H> {
    /// Create a new [`GlContext`] from a [`glow`] context.
    ///
    /// # Safety
    ///
    /// The context must be current while calling new, and the context must be current
    /// when this type and every resource created from it are dropped.
    pub unsafe fn new(context: H) -> Result<Self, GlError> {
        // Get the current version.
        let version = context.version();
        tracing::debug!("OpenGL version: {version:?}");

        // Check that the version is supported.
        let has_supported_version = if version.is_embedded {
            version.major >= 3
        } else {
            version.major >= 4 || (version.major >= 3 && version.minor >= 3)
        };
        if !has_supported_version {
            return Err(GlError(
                "OpenGL version 3.3 (or 3.0 ES) or higher is required".into(),
            ));
        }

        Ok(Self { context })
    }
}

impl<H: HasContext + ?Sized> GlContext<H> {
    /// Get a reference to the underlying [`glow`] context.
    pub fn context(&self) -> &H {
        &self.context
    }

    /// Set up the viewport and clear the color and depth buffers for a new frame.
    pub fn begin_frame(&self, (width, height): (u32, u32), [r, g, b, a]: [f32; 4]) {
        unsafe {
            self.context.viewport(0, 0, width as i32, height as i32);
            self.context.enable(glow::DEPTH_TEST);
            self.context.clear_color(r, g, b, a);
            self.context
                .clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        gl_error(&self.context);
    }
}

impl<H: HasContext + ?Sized> GpuContext for GlContext<H> {
    type Shader = H::Shader;
    type Program = H::Program;
    type UniformLocation = H::UniformLocation;
    type Error = GlError;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, Self::Error> {
        let shader_type = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };

        unsafe { self.context.create_shader(shader_type).gl_err() }
    }

    fn compile_shader(&self, shader: &Self::Shader, source: &str) {
        unsafe {
            self.context.shader_source(*shader, source);
            self.context.compile_shader(*shader);
        }
    }

    fn shader_compile_status(&self, shader: &Self::Shader) -> bool {
        unsafe { self.context.get_shader_compile_status(*shader) }
    }

    fn shader_info_log(&self, shader: &Self::Shader) -> String {
        unsafe { self.context.get_shader_info_log(*shader) }
    }

    fn delete_shader(&self, shader: &Self::Shader) {
        unsafe { self.context.delete_shader(*shader) }
    }

    fn create_program(&self) -> Result<Self::Program, Self::Error> {
        unsafe { self.context.create_program().gl_err() }
    }

    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader) {
        unsafe { self.context.attach_shader(*program, *shader) }
    }

    fn detach_shader(&self, program: &Self::Program, shader: &Self::Shader) {
        unsafe { self.context.detach_shader(*program, *shader) }
    }

    fn link_program(&self, program: &Self::Program) {
        unsafe { self.context.link_program(*program) }
    }

    fn program_link_status(&self, program: &Self::Program) -> bool {
        unsafe { self.context.get_program_link_status(*program) }
    }

    fn program_info_log(&self, program: &Self::Program) -> String {
        unsafe { self.context.get_program_info_log(*program) }
    }

    fn delete_program(&self, program: &Self::Program) {
        unsafe { self.context.delete_program(*program) }
    }

    fn use_program(&self, program: Option<&Self::Program>) {
        unsafe { self.context.use_program(program.copied()) }
    }

    fn uniform_location(
        &self,
        program: &Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.context.get_uniform_location(*program, name) }
    }

    fn set_uniform(&self, location: &Self::UniformLocation, value: &UniformValue) {
        let location = Some(location);

        unsafe {
            match value {
                // GLSL bools are set through the integer entry point.
                UniformValue::Bool(value) => self.context.uniform_1_i32(location, *value as i32),
                UniformValue::Int(value) => self.context.uniform_1_i32(location, *value),
                UniformValue::Float(value) => self.context.uniform_1_f32(location, *value),
                UniformValue::Mat4(value) => self.context.uniform_matrix_4_f32_slice(
                    location,
                    false,
                    &value.to_cols_array(),
                ),
            }
        }

        gl_error(&self.context);
    }

    fn read_uniform(
        &self,
        program: &Self::Program,
        location: &Self::UniformLocation,
        kind: UniformKind,
    ) -> Option<UniformValue> {
        let value = unsafe {
            match kind {
                UniformKind::Bool | UniformKind::Int => {
                    let mut value = [0i32];
                    self.context
                        .get_uniform_i32(*program, location, &mut value);

                    if kind == UniformKind::Bool {
                        UniformValue::Bool(value[0] != 0)
                    } else {
                        UniformValue::Int(value[0])
                    }
                }
                UniformKind::Float => {
                    let mut value = [0f32];
                    self.context
                        .get_uniform_f32(*program, location, &mut value);
                    UniformValue::Float(value[0])
                }
                UniformKind::Mat4 => {
                    let mut value = [0f32; 16];
                    self.context
                        .get_uniform_f32(*program, location, &mut value);
                    UniformValue::Mat4(Mat4::from_cols_array(&value))
                }
            }
        };

        gl_error(&self.context);
        Some(value)
    }
}

/// An error from the OpenGL driver.
#[derive(Debug)]
pub struct GlError(String);

impl From<String> for GlError {
    fn from(s: String) -> Self {
        GlError(s)
    }
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gl error: {}", self.0)
    }
}

impl std::error::Error for GlError {}

/// Log any pending OpenGL error.
pub(crate) fn gl_error(h: &(impl HasContext + ?Sized)) {
    let err = unsafe { h.get_error() };

    if err != glow::NO_ERROR {
        tracing::error!("GL error: {}", error_name(err))
    }
}

fn error_name(err: u32) -> &'static str {
    match err {
        glow::INVALID_ENUM => "GL_INVALID_ENUM",
        glow::INVALID_VALUE => "GL_INVALID_VALUE",
        glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
        glow::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
        glow::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
        glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        glow::CONTEXT_LOST => "GL_CONTEXT_LOST",
        _ => "Unknown GL error",
    }
}

trait ResultExt<T, E> {
    fn gl_err(self) -> Result<T, GlError>;
}

impl<T, E: Into<GlError>> ResultExt<T, E> for Result<T, E> {
    fn gl_err(self) -> Result<T, GlError> {
        self.map_err(Into::into)
    }
}

struct CallOnDrop<F: FnMut()>(F);

impl<F: FnMut()> Drop for CallOnDrop<F> {
    fn drop(&mut self) {
        (self.0)();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::mem;

    #[test]
    fn error_names() {
        assert_eq!(error_name(glow::INVALID_OPERATION), "GL_INVALID_OPERATION");
        assert_eq!(error_name(glow::OUT_OF_MEMORY), "GL_OUT_OF_MEMORY");
        assert_eq!(error_name(0xdead), "Unknown GL error");
    }

    #[test]
    fn guards_release_partial_objects_on_early_return() {
        use std::cell::RefCell;

        let deleted = RefCell::new(Vec::new());
        let log = &deleted;
        let build = |fail_at: Option<u32>| -> Result<(), GlError> {
            let mut guards = Vec::new();
            for object in 1..=3 {
                if fail_at == Some(object) {
                    return Err(GlError(format!("failed to create object {object}")));
                }
                guards.push(CallOnDrop(move || log.borrow_mut().push(object)));
            }

            guards.into_iter().for_each(mem::forget);
            Ok(())
        };

        assert!(build(Some(3)).is_err());
        assert_eq!(*deleted.borrow(), [1, 2]);

        deleted.borrow_mut().clear();
        assert!(build(None).is_ok());
        assert!(deleted.borrow().is_empty());
    }

    #[test]
    fn driver_strings_become_errors() {
        let result: Result<(), String> = Err("no more names".into());
        let err = result.gl_err().unwrap_err();
        assert_eq!(err.to_string(), "gl error: no more names");
    }
}
