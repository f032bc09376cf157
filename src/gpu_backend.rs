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

//! Defines the GPU backend for cubes-hardware.

use glam::Mat4;

use std::error::Error;
use std::fmt;

/// The backend for shader programs.
///
/// Every method maps onto a single driver primitive. The driver owns a single "current program"
/// slot; [`use_program`] mutates it and [`set_uniform`] writes into whichever program occupies
/// it. Nothing here is synchronized, so the context must be driven from one thread.
///
/// [`use_program`]: GpuContext::use_program
/// [`set_uniform`]: GpuContext::set_uniform
pub trait GpuContext {
    /// A compiled (or failed) shader stage object.
    type Shader;

    /// A program object that stages are linked into.
    type Program;

    /// The location of a uniform within a linked program.
    type UniformLocation: Clone;

    /// The error type associated with this GPU context.
    ///
    /// This is only used for failures to allocate driver objects. Compile and link failures
    /// are reported through the status queries instead.
    type Error: Error + 'static;

    /// Create a new, empty shader stage object.
    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, Self::Error>;

    /// Upload source text to a shader and compile it.
    fn compile_shader(&self, shader: &Self::Shader, source: &str);

    /// Whether the last compilation of this shader succeeded.
    fn shader_compile_status(&self, shader: &Self::Shader) -> bool;

    /// The driver's diagnostic log for this shader.
    fn shader_info_log(&self, shader: &Self::Shader) -> String;

    /// Delete a shader stage object.
    fn delete_shader(&self, shader: &Self::Shader);

    /// Create a new, empty program object.
    fn create_program(&self) -> Result<Self::Program, Self::Error>;

    /// Attach a shader stage to a program.
    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader);

    /// Detach a shader stage from a program.
    fn detach_shader(&self, program: &Self::Program, shader: &Self::Shader);

    /// Link the stages attached to the program.
    fn link_program(&self, program: &Self::Program);

    /// Whether the last link of this program succeeded.
    fn program_link_status(&self, program: &Self::Program) -> bool;

    /// The driver's diagnostic log for this program.
    fn program_info_log(&self, program: &Self::Program) -> String;

    /// Delete a program object.
    fn delete_program(&self, program: &Self::Program);

    /// Make `program` the current program, or clear the slot with `None`.
    fn use_program(&self, program: Option<&Self::Program>);

    /// Resolve a uniform name to its location within a linked program.
    ///
    /// Returns `None` if the name is not an active uniform of the program.
    fn uniform_location(&self, program: &Self::Program, name: &str)
        -> Option<Self::UniformLocation>;

    /// Write a value to a uniform location of the current program.
    fn set_uniform(&self, location: &Self::UniformLocation, value: &UniformValue);

    /// Read the value of a uniform back from the driver.
    ///
    /// Returns `None` if the backend cannot query uniforms. Backends may reinterpret the stored
    /// value as `kind` without checking the declared type.
    fn read_uniform(
        &self,
        program: &Self::Program,
        location: &Self::UniformLocation,
        kind: UniformKind,
    ) -> Option<UniformValue>;
}

/// A pipeline stage a shader is compiled for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShaderStage {
    /// The vertex stage.
    Vertex,

    /// The fragment stage.
    Fragment,
}

impl ShaderStage {
    /// Both stages, in the order they are compiled.
    pub const ALL: [ShaderStage; 2] = [ShaderStage::Vertex, ShaderStage::Fragment];

    /// A lowercase name for the stage.
    pub fn as_str(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed value that can be written to a uniform.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    /// A `bool` uniform.
    Bool(bool),

    /// An `int` (or sampler) uniform.
    Int(i32),

    /// A `float` uniform.
    Float(f32),

    /// A `mat4` uniform, column-major.
    Mat4(Mat4),
}

impl UniformValue {
    /// The kind of this value.
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Bool(_) => UniformKind::Bool,
            UniformValue::Int(_) => UniformKind::Int,
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Mat4(_) => UniformKind::Mat4,
        }
    }
}

impl From<bool> for UniformValue {
    fn from(value: bool) -> Self {
        UniformValue::Bool(value)
    }
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        UniformValue::Int(value)
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self {
        UniformValue::Mat4(value)
    }
}

impl From<&Mat4> for UniformValue {
    fn from(value: &Mat4) -> Self {
        UniformValue::Mat4(*value)
    }
}

/// The type of a uniform, without a value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UniformKind {
    /// A GLSL `bool`.
    Bool,

    /// A GLSL `int` or sampler.
    Int,

    /// A GLSL `float`.
    Float,

    /// A GLSL `mat4`.
    Mat4,
}
