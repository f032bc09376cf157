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

//! Compiled and linked shader programs.

use crate::gpu_backend::{GpuContext, ShaderStage, UniformKind, UniformValue};
use crate::resources::{CallOnDrop, StageObject};

use glam::Mat4;
use hashbrown::HashMap;

use std::cell::RefCell;
use std::error::Error;
use std::fmt;
use std::io;
use std::mem;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::rc::Rc;

type LocationCache<L> = HashMap<Box<str>, Option<L>, ahash::RandomState>;

/// A linked vertex + fragment shader program.
///
/// The program handle is deleted when this is dropped, so the context must still be current at
/// that point.
pub struct ShaderProgram<C: GpuContext + ?Sized> {
    /// The context the program lives in.
    context: Rc<C>,

    /// The linked program.
    program: C::Program,

    /// Resolved uniform locations, including names that do not resolve.
    locations: RefCell<LocationCache<C::UniformLocation>>,
}

impl<C: GpuContext + ?Sized> fmt::Debug for ShaderProgram<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("cached_uniforms", &self.locations.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<C: GpuContext + ?Sized> ShaderProgram<C> {
    /// Read a vertex and a fragment shader from disk and build a program out of them.
    ///
    /// Both files are read before anything is allocated on the GPU.
    pub fn from_paths(
        context: Rc<C>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ProgramError<C::Error>> {
        let vertex = read_source(ShaderStage::Vertex, vertex_path.as_ref())?;
        let fragment = read_source(ShaderStage::Fragment, fragment_path.as_ref())?;

        Self::from_sources(context, &vertex, &fragment)
    }

    /// Build a program from vertex and fragment shader source text.
    ///
    /// Compile failures are logged and linking is still attempted, so that the link log is
    /// reported as well. Any failure deletes every object created along the way.
    pub fn from_sources(
        context: Rc<C>,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, ProgramError<C::Error>> {
        let program = build_program(&*context, vertex_source, fragment_source)?;
        tracing::debug!("linked shader program");

        Ok(Self {
            context,
            program,
            locations: RefCell::new(HashMap::with_hasher(ahash::RandomState::new())),
        })
    }

    /// The driver handle of the program.
    pub fn handle(&self) -> &C::Program {
        &self.program
    }

    /// The context the program was built in.
    pub fn context(&self) -> &Rc<C> {
        &self.context
    }

    /// Make this the current program.
    ///
    /// The program stays current until another program is used; the context is global state
    /// shared by every program built from it.
    pub fn use_program(&self) {
        self.context.use_program(Some(&self.program));
    }

    /// Make this the current program until the returned guard is dropped.
    ///
    /// The guard dereferences to the program, so uniforms can be set through it.
    pub fn bind(&self) -> BoundProgram<'_, C> {
        self.use_program();
        BoundProgram { program: self }
    }

    /// Set a `bool` uniform.
    ///
    /// Like every setter, this writes into whichever program is current; call [`use_program`]
    /// (or hold a [`bind`] guard) first. Names that are not active uniforms are ignored.
    ///
    /// [`use_program`]: ShaderProgram::use_program
    /// [`bind`]: ShaderProgram::bind
    pub fn set_bool(&self, name: &str, value: bool) {
        self.set_uniform(name, value);
    }

    /// Set an `int` or sampler uniform.
    pub fn set_int(&self, name: &str, value: i32) {
        self.set_uniform(name, value);
    }

    /// Set a `float` uniform.
    pub fn set_float(&self, name: &str, value: f32) {
        self.set_uniform(name, value);
    }

    /// Set a `mat4` uniform.
    pub fn set_mat4(&self, name: &str, value: &Mat4) {
        self.set_uniform(name, value);
    }

    /// Set a uniform of any supported type.
    pub fn set_uniform(&self, name: &str, value: impl Into<UniformValue>) {
        if let Some(location) = self.location(name) {
            self.context.set_uniform(&location, &value.into());
        }
    }

    /// Query the driver for the current value of a uniform.
    ///
    /// Returns `None` if the uniform does not exist or the backend cannot read uniforms back.
    /// `kind` is not checked against the declared type; OpenGL reinterprets the stored value.
    pub fn uniform(&self, name: &str, kind: UniformKind) -> Option<UniformValue> {
        let location = self.location(name)?;
        self.context.read_uniform(&self.program, &location, kind)
    }

    fn location(&self, name: &str) -> Option<C::UniformLocation> {
        if let Some(location) = self.locations.borrow().get(name) {
            return location.clone();
        }

        let location = self.context.uniform_location(&self.program, name);
        if location.is_none() {
            tracing::debug!("uniform `{name}` is not active in this program, ignoring writes");
        }

        self.locations
            .borrow_mut()
            .insert(name.into(), location.clone());
        location
    }
}

impl<C: GpuContext + ?Sized> Drop for ShaderProgram<C> {
    fn drop(&mut self) {
        self.context.delete_program(&self.program);
    }
}

/// A [`ShaderProgram`] that is current until this guard is dropped.
pub struct BoundProgram<'a, C: GpuContext + ?Sized> {
    program: &'a ShaderProgram<C>,
}

impl<C: GpuContext + ?Sized> fmt::Debug for BoundProgram<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BoundProgram").field(self.program).finish()
    }
}

impl<C: GpuContext + ?Sized> Deref for BoundProgram<'_, C> {
    type Target = ShaderProgram<C>;

    fn deref(&self) -> &Self::Target {
        self.program
    }
}

impl<C: GpuContext + ?Sized> Drop for BoundProgram<'_, C> {
    fn drop(&mut self) {
        self.program.context.use_program(None);
    }
}

/// An error that occurred while building a [`ShaderProgram`].
#[derive(Debug)]
pub enum ProgramError<E> {
    /// A shader source file could not be read.
    SourceRead {
        /// The stage the file was meant for.
        stage: ShaderStage,

        /// The path that was read.
        path: PathBuf,

        /// The underlying I/O error.
        source: io::Error,
    },

    /// A shader stage failed to compile.
    ///
    /// If both stages failed, this names the vertex stage; both logs have been reported.
    Compile {
        /// The failing stage.
        stage: ShaderStage,

        /// The driver's compile log.
        log: String,
    },

    /// The stages compiled but could not be linked together.
    Link {
        /// The driver's link log.
        log: String,
    },

    /// The driver could not allocate a shader or program object.
    Driver(E),
}

impl<E: fmt::Display> fmt::Display for ProgramError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramError::SourceRead { stage, path, .. } => write!(
                f,
                "failed to read {stage} shader source from {}",
                path.display()
            ),
            ProgramError::Compile { stage, log } => {
                write!(f, "{stage} shader failed to compile: {log}")
            }
            ProgramError::Link { log } => write!(f, "shader program failed to link: {log}"),
            ProgramError::Driver(err) => write!(f, "driver error: {err}"),
        }
    }
}

impl<E: Error + 'static> Error for ProgramError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ProgramError::SourceRead { source, .. } => Some(source),
            ProgramError::Driver(err) => Some(err),
            _ => None,
        }
    }
}

fn read_source<E>(stage: ShaderStage, path: &Path) -> Result<String, ProgramError<E>> {
    std::fs::read_to_string(path).map_err(|source| {
        tracing::error!("failed to read {stage} shader {}: {source}", path.display());
        ProgramError::SourceRead {
            stage,
            path: path.to_path_buf(),
            source,
        }
    })
}

fn build_program<C: GpuContext + ?Sized>(
    context: &C,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<C::Program, ProgramError<C::Error>> {
    let program = context.create_program().map_err(ProgramError::Driver)?;
    let delete_program = CallOnDrop(|| context.delete_program(&program));

    let mut first_failure = None;
    let stages = {
        let vertex = StageObject::compile(context, ShaderStage::Vertex, vertex_source)
            .map_err(ProgramError::Driver)?;
        let fragment = StageObject::compile(context, ShaderStage::Fragment, fragment_source)
            .map_err(ProgramError::Driver)?;
        [vertex, fragment]
    };

    for stage in &stages {
        if let Some(log) = stage.failure_log() {
            tracing::error!("{} shader failed to compile:\n{log}", stage.stage());
            first_failure.get_or_insert((stage.stage(), log));
        }

        stage.attach(&program);
    }

    context.link_program(&program);
    let link_failure = if context.program_link_status(&program) {
        None
    } else {
        let log = context.program_info_log(&program);
        tracing::error!("shader program failed to link:\n{log}");
        Some(log)
    };

    // Detach and delete both stages before the program leaves this function.
    drop(stages);

    if let Some((stage, log)) = first_failure {
        return Err(ProgramError::Compile { stage, log });
    }
    if let Some(log) = link_failure {
        return Err(ProgramError::Link { log });
    }

    mem::forget(delete_program);
    Ok(program)
}
