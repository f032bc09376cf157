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

//! Six textured cubes spinning in front of an orbiting camera.
//!
//! Textures are read from `examples/textures/`. Missing ones are logged and the cube is drawn
//! with an empty texture instead.

#[path = "util/setup_context.rs"]
mod util;

use cubes_glow::{GlMesh, GlProgram, GlTexture};
use cubes_hardware::mesh::{CUBE_INDICES, CUBE_VERTICES};
use cubes_hardware::scene::{aspect_ratio, SceneConfig};
use cubes_hardware::ShaderProgram;

use std::error::Error;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

use util::Context;

struct Cubes {
    program: GlProgram<glow::Context>,
    mesh: GlMesh<glow::Context>,
    textures: Vec<GlTexture<glow::Context>>,
    started: Instant,
}

fn asset_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("examples")
}

fn load_texture(
    context: &Rc<Context>,
    path: &Path,
) -> Result<GlTexture<glow::Context>, Box<dyn Error>> {
    let texture = GlTexture::new(context)?;

    match image::open(path) {
        Ok(image) => {
            // OpenGL expects the bottom row first.
            let image = image.flipv().into_rgb8();
            texture.write_rgb(image.dimensions(), image.as_raw())?;
        }
        Err(err) => tracing::error!("Failed to load texture {}: {err}", path.display()),
    }

    Ok(texture)
}

fn setup(context: &Rc<Context>, scene: &SceneConfig) -> Result<Cubes, Box<dyn Error>> {
    let root = asset_root();

    let program = ShaderProgram::from_paths(
        context.clone(),
        root.join(&scene.vertex_shader),
        root.join(&scene.fragment_shader),
    )?;
    let mesh = GlMesh::new(context, &program, &CUBE_VERTICES, &CUBE_INDICES)?;
    let textures = scene
        .textures
        .iter()
        .map(|name| load_texture(context, &root.join(name)))
        .collect::<Result<Vec<_>, _>>()?;

    {
        let program = program.bind();
        program.set_int("ourTexture", 0);
    }

    Ok(Cubes {
        program,
        mesh,
        textures,
        started: Instant::now(),
    })
}

fn draw(cubes: &mut Cubes, context: &Context, scene: &SceneConfig, (width, height): (u32, u32)) {
    context.begin_frame((width, height), scene.clear_color);

    let seconds = cubes.started.elapsed().as_secs_f32();
    let program = cubes.program.bind();
    program.set_mat4("projection", &scene.projection(aspect_ratio(width, height)));
    program.set_mat4("view", &scene.view(seconds));

    for (index, texture) in cubes.textures.iter().enumerate() {
        texture.bind(0);
        program.set_mat4("model", &scene.model(index, seconds));
        cubes.mesh.draw();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    util::init();
    util::run(SceneConfig::default(), setup, draw)
}
