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

//! Defines useful resource wrappers.

use super::gpu_backend::{GpuContext, ShaderStage};

use std::cell::Cell;
use std::fmt;

/// Runs a closure when dropped.
pub(crate) struct CallOnDrop<F: FnMut()>(pub(crate) F);

impl<F: FnMut()> Drop for CallOnDrop<F> {
    fn drop(&mut self) {
        (self.0)();
    }
}

/// A shader stage that only lives for the duration of a program build.
///
/// The stage is detached from the program it was attached to and deleted when this is dropped.
pub(crate) struct StageObject<'a, C: GpuContext + ?Sized> {
    context: &'a C,
    stage: ShaderStage,
    shader: C::Shader,
    attached_to: Cell<Option<&'a C::Program>>,
}

impl<C: GpuContext + ?Sized> fmt::Debug for StageObject<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageObject")
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}

impl<'a, C: GpuContext + ?Sized> StageObject<'a, C> {
    /// Create the stage object and compile `source` into it.
    pub(crate) fn compile(
        context: &'a C,
        stage: ShaderStage,
        source: &str,
    ) -> Result<Self, C::Error> {
        let shader = context.create_shader(stage)?;
        context.compile_shader(&shader, source);

        Ok(Self {
            context,
            stage,
            shader,
            attached_to: Cell::new(None),
        })
    }

    pub(crate) fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Get the compile log, or `None` if the stage compiled.
    pub(crate) fn failure_log(&self) -> Option<String> {
        if self.context.shader_compile_status(&self.shader) {
            None
        } else {
            Some(self.context.shader_info_log(&self.shader))
        }
    }

    pub(crate) fn attach(&self, program: &'a C::Program) {
        self.context.attach_shader(program, &self.shader);
        self.attached_to.set(Some(program));
    }
}

impl<C: GpuContext + ?Sized> Drop for StageObject<'_, C> {
    fn drop(&mut self) {
        if let Some(program) = self.attached_to.take() {
            self.context.detach_shader(program, &self.shader);
        }

        self.context.delete_shader(&self.shader);
    }
}
