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

//! A software stand-in for a GL driver, used by the unit tests.
//!
//! The "compiler" is a rough line-based approximation of a GLSL front end: it understands
//! `in`/`out`/`uniform` declarations and flags statements that are missing a semicolon.

use crate::gpu_backend::{GpuContext, ShaderStage, UniformKind, UniformValue};

use glam::Mat4;
use hashbrown::HashMap;

use std::cell::{Cell, RefCell};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct MockShader(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct MockProgram(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct MockLocation(usize);

#[derive(Debug)]
pub(crate) struct MockError(&'static str);

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mock driver error: {}", self.0)
    }
}

impl std::error::Error for MockError {}

/// A declared `in`, `out` or `uniform` variable.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Declaration {
    ty: String,
    name: String,
}

#[derive(Debug, Default)]
struct ShaderState {
    stage: Option<ShaderStage>,
    compiled: bool,
    log: String,
    inputs: Vec<Declaration>,
    outputs: Vec<Declaration>,
    uniforms: Vec<Declaration>,
}

#[derive(Debug, Default)]
struct ProgramState {
    attached: Vec<u32>,
    linked: bool,
    log: String,
    uniforms: Vec<(Declaration, UniformValue)>,
}

#[derive(Debug)]
struct State {
    next_id: u32,
    shaders: HashMap<u32, ShaderState, ahash::RandomState>,
    programs: HashMap<u32, ProgramState, ahash::RandomState>,
    current: Option<u32>,
    errors: Vec<String>,
}

/// A fake driver context.
#[derive(Debug)]
pub(crate) struct MockContext {
    state: RefCell<State>,
    fail_shader_creation: Cell<Option<ShaderStage>>,
    location_queries: Cell<usize>,
}

impl MockContext {
    pub(crate) fn new() -> Self {
        let state = State {
            next_id: 0,
            shaders: HashMap::with_hasher(ahash::RandomState::new()),
            programs: HashMap::with_hasher(ahash::RandomState::new()),
            current: None,
            errors: Vec::new(),
        };

        Self {
            state: RefCell::new(state),
            fail_shader_creation: Cell::new(None),
            location_queries: Cell::new(0),
        }
    }

    /// Make the next creation of a `stage` shader fail.
    pub(crate) fn fail_next_shader(&self, stage: ShaderStage) {
        self.fail_shader_creation.set(Some(stage));
    }

    pub(crate) fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub(crate) fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub(crate) fn current_program(&self) -> Option<MockProgram> {
        self.state.borrow().current.map(MockProgram)
    }

    /// Errors the driver would have raised through `glGetError`.
    pub(crate) fn errors(&self) -> Vec<String> {
        self.state.borrow().errors.clone()
    }

    pub(crate) fn location_queries(&self) -> usize {
        self.location_queries.get()
    }

    fn alloc(state: &mut State) -> u32 {
        state.next_id += 1;
        state.next_id
    }
}

impl GpuContext for MockContext {
    type Shader = MockShader;
    type Program = MockProgram;
    type UniformLocation = MockLocation;
    type Error = MockError;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, Self::Error> {
        if self.fail_shader_creation.get() == Some(stage) {
            self.fail_shader_creation.set(None);
            return Err(MockError("out of shader objects"));
        }

        let mut state = self.state.borrow_mut();
        let id = Self::alloc(&mut state);
        state.shaders.insert(
            id,
            ShaderState {
                stage: Some(stage),
                ..Default::default()
            },
        );
        Ok(MockShader(id))
    }

    fn compile_shader(&self, shader: &Self::Shader, source: &str) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let Some(shader) = state.shaders.get_mut(&shader.0) else {
            state.errors.push("INVALID_VALUE: compile of unknown shader".into());
            return;
        };

        let parsed = parse(source);
        shader.compiled = parsed.errors.is_empty();
        shader.log = parsed.errors.join("\n");
        shader.inputs = parsed.inputs;
        shader.outputs = parsed.outputs;
        shader.uniforms = parsed.uniforms;
    }

    fn shader_compile_status(&self, shader: &Self::Shader) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader.0)
            .map_or(false, |s| s.compiled)
    }

    fn shader_info_log(&self, shader: &Self::Shader) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader.0)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: &Self::Shader) {
        let mut state = self.state.borrow_mut();
        if state.shaders.remove(&shader.0).is_none() {
            state.errors.push(format!("INVALID_VALUE: shader {} deleted twice", shader.0));
        }
    }

    fn create_program(&self) -> Result<Self::Program, Self::Error> {
        let mut state = self.state.borrow_mut();
        let id = Self::alloc(&mut state);
        state.programs.insert(id, ProgramState::default());
        Ok(MockProgram(id))
    }

    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        match state.programs.get_mut(&program.0) {
            Some(p) => p.attached.push(shader.0),
            None => state.errors.push("INVALID_VALUE: attach to unknown program".into()),
        }
    }

    fn detach_shader(&self, program: &Self::Program, shader: &Self::Shader) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        match state.programs.get_mut(&program.0) {
            Some(p) => p.attached.retain(|&id| id != shader.0),
            None => state.errors.push("INVALID_VALUE: detach from unknown program".into()),
        }
    }

    fn link_program(&self, program: &Self::Program) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let Some(p) = state.programs.get_mut(&program.0) else {
            state.errors.push("INVALID_VALUE: link of unknown program".into());
            return;
        };

        let stage_of = |stage| {
            p.attached
                .iter()
                .filter_map(|id| state.shaders.get(id))
                .find(|s| s.stage == Some(stage))
        };

        let result = match (stage_of(ShaderStage::Vertex), stage_of(ShaderStage::Fragment)) {
            (Some(vs), Some(fs)) if vs.compiled && fs.compiled => link(vs, fs),
            (Some(_), Some(_)) => Err("error: linking with uncompiled shader".to_string()),
            _ => Err("error: program is missing a stage".to_string()),
        };

        match result {
            Ok(uniforms) => {
                p.linked = true;
                p.log.clear();
                p.uniforms = uniforms;
            }
            Err(log) => {
                p.linked = false;
                p.log = log;
                p.uniforms.clear();
            }
        }
    }

    fn program_link_status(&self, program: &Self::Program) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program.0)
            .map_or(false, |p| p.linked)
    }

    fn program_info_log(&self, program: &Self::Program) -> String {
        self.state
            .borrow()
            .programs
            .get(&program.0)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: &Self::Program) {
        let mut state = self.state.borrow_mut();
        if state.programs.remove(&program.0).is_none() {
            state.errors.push(format!("INVALID_VALUE: program {} deleted twice", program.0));
        }
        if state.current == Some(program.0) {
            state.current = None;
        }
    }

    fn use_program(&self, program: Option<&Self::Program>) {
        let mut state = self.state.borrow_mut();
        match program {
            Some(p) if !state.programs.get(&p.0).map_or(false, |p| p.linked) => {
                state.errors.push("INVALID_OPERATION: use of unlinked program".into());
            }
            Some(p) => state.current = Some(p.0),
            None => state.current = None,
        }
    }

    fn uniform_location(
        &self,
        program: &Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        self.location_queries.set(self.location_queries.get() + 1);
        let state = self.state.borrow();
        let p = state.programs.get(&program.0).filter(|p| p.linked)?;
        p.uniforms
            .iter()
            .position(|(decl, _)| decl.name == name)
            .map(MockLocation)
    }

    fn set_uniform(&self, location: &Self::UniformLocation, value: &UniformValue) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let Some(current) = state.current else {
            state.errors.push("INVALID_OPERATION: no current program".into());
            return;
        };

        let slot = state
            .programs
            .get_mut(&current)
            .and_then(|p| p.uniforms.get_mut(location.0));
        match slot {
            Some((decl, stored)) if kind_of(&decl.ty) == Some(value.kind()) => *stored = *value,
            _ => state.errors.push("INVALID_OPERATION: uniform type mismatch".into()),
        }
    }

    fn read_uniform(
        &self,
        program: &Self::Program,
        location: &Self::UniformLocation,
        kind: UniformKind,
    ) -> Option<UniformValue> {
        let state = self.state.borrow();
        let (_, value) = state.programs.get(&program.0)?.uniforms.get(location.0)?;
        (value.kind() == kind).then_some(*value)
    }
}

fn kind_of(ty: &str) -> Option<UniformKind> {
    match ty {
        "bool" => Some(UniformKind::Bool),
        "int" | "sampler2D" => Some(UniformKind::Int),
        "float" => Some(UniformKind::Float),
        "mat4" => Some(UniformKind::Mat4),
        _ => None,
    }
}

fn default_value(kind: UniformKind) -> UniformValue {
    match kind {
        UniformKind::Bool => UniformValue::Bool(false),
        UniformKind::Int => UniformValue::Int(0),
        UniformKind::Float => UniformValue::Float(0.0),
        UniformKind::Mat4 => UniformValue::Mat4(Mat4::ZERO),
    }
}

fn link(
    vs: &ShaderState,
    fs: &ShaderState,
) -> Result<Vec<(Declaration, UniformValue)>, String> {
    for input in &fs.inputs {
        if !vs.outputs.contains(input) {
            return Err(format!(
                "error: fragment shader input `{}` has no matching vertex shader output",
                input.name
            ));
        }
    }

    let mut uniforms: Vec<(Declaration, UniformValue)> = Vec::new();
    for decl in vs.uniforms.iter().chain(&fs.uniforms) {
        if let Some((existing, _)) = uniforms.iter().find(|(d, _)| d.name == decl.name) {
            if existing.ty != decl.ty {
                return Err(format!(
                    "error: uniform `{}` declared with conflicting types",
                    decl.name
                ));
            }
            continue;
        }

        let kind = kind_of(&decl.ty)
            .ok_or_else(|| format!("error: unsupported uniform type `{}`", decl.ty))?;
        uniforms.push((decl.clone(), default_value(kind)));
    }

    Ok(uniforms)
}

#[derive(Default)]
struct Parsed {
    errors: Vec<String>,
    inputs: Vec<Declaration>,
    outputs: Vec<Declaration>,
    uniforms: Vec<Declaration>,
}

fn parse(source: &str) -> Parsed {
    let mut parsed = Parsed::default();

    for (index, line) in source.lines().enumerate() {
        let line = line.split("//").next().unwrap_or_default().trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Function headers such as `void main()` are the only lines allowed to end in `)`.
        let terminated = line.ends_with(';')
            || line.ends_with('{')
            || line.ends_with('}')
            || (line.ends_with(')') && !line.contains('='));
        if !terminated {
            parsed
                .errors
                .push(format!("0:{}: error: syntax error, missing ';'", index + 1));
            continue;
        }

        // Strip any `layout(...)` qualifier.
        let decl = match line.strip_prefix("layout") {
            Some(rest) => rest.split_once(')').map_or("", |(_, rest)| rest.trim()),
            None => line,
        };

        let mut words = decl.trim_end_matches(';').split_whitespace();
        let target = match words.next() {
            Some("in") => &mut parsed.inputs,
            Some("out") => &mut parsed.outputs,
            Some("uniform") => &mut parsed.uniforms,
            _ => continue,
        };

        if let (Some(ty), Some(name)) = (words.next(), words.next()) {
            target.push(Declaration {
                ty: ty.to_string(),
                name: name.to_string(),
            });
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_declarations() {
        let parsed = parse(
            "#version 330 core\n\
             layout (location = 0) in vec3 aPos;\n\
             out vec2 TexCoord;\n\
             uniform mat4 model;\n\
             void main()\n\
             {\n\
                 gl_Position = model * vec4(aPos, 1.0);\n\
             }\n",
        );

        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.inputs[0].name, "aPos");
        assert_eq!(parsed.outputs[0].ty, "vec2");
        assert_eq!(parsed.uniforms[0].name, "model");
    }

    #[test]
    fn reports_missing_semicolon_with_line() {
        let parsed = parse("void main()\n{\n    x = vec4(1.0)\n}\n");
        assert_eq!(parsed.errors, vec!["0:3: error: syntax error, missing ';'"]);
    }

    #[test]
    fn fresh_context_tracks_objects() {
        let context = MockContext::new();
        assert_eq!(context.live_shaders(), 0);
        assert_eq!(context.live_programs(), 0);
        assert_eq!(context.current_program(), None);

        let shader = context.create_shader(ShaderStage::Vertex).unwrap();
        let program = context.create_program().unwrap();
        assert_eq!(context.live_shaders(), 1);
        assert_eq!(context.live_programs(), 1);

        context.delete_shader(&shader);
        context.delete_program(&program);
        assert_eq!(context.live_shaders(), 0);
        assert_eq!(context.live_programs(), 0);
        assert!(context.errors().is_empty());
    }
}
