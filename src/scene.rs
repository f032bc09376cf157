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

//! The fixed spinning-cubes scene.

use glam::{Mat4, Vec3};

/// Where each cube sits in world space.
pub const CUBE_POSITIONS: [Vec3; 6] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(-5.0, -3.0, -3.0),
    Vec3::new(2.0, 4.0, 5.0),
    Vec3::new(0.5, -3.0, -2.5),
    Vec3::new(3.0, 3.0, -2.0),
    Vec3::new(-3.0, -2.5, 6.0),
];

/// The axis every cube spins around, before normalization.
const SPIN_AXIS: Vec3 = Vec3::new(1.0, 0.3, 0.5);

/// Tunable parameters of the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    /// Initial window size, in pixels.
    pub window_size: (u32, u32),

    /// The window title.
    pub title: String,

    /// Vertex shader path, relative to the asset root.
    pub vertex_shader: String,

    /// Fragment shader path, relative to the asset root.
    pub fragment_shader: String,

    /// One texture per cube, relative to the asset root.
    pub textures: [String; 6],

    /// The color the frame is cleared to.
    pub clear_color: [f32; 4],

    /// Signed distance of the orbiting camera from the origin.
    pub camera_distance: f32,

    /// Degrees per second the first cube spins; cube `i` spins `i + 1` times as fast.
    pub spin_speed: f32,

    /// Vertical field of view, in degrees.
    pub fov_y: f32,

    /// Near clip plane.
    pub z_near: f32,

    /// Far clip plane.
    pub z_far: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let texture = |name: &str| format!("textures/{name}.jpg");

        Self {
            window_size: (800, 600),
            title: "LearnOpenGL".into(),
            vertex_shader: "shaders/basic.vs".into(),
            fragment_shader: "shaders/basic.fs".into(),
            textures: [
                texture("Burlington"),
                texture("Adventures"),
                texture("Memories"),
                texture("Life"),
                texture("Mayhem"),
                texture("Ego"),
            ],
            clear_color: [0.07, 0.07, 0.07, 1.0],
            camera_distance: -15.0,
            spin_speed: 18.0,
            fov_y: 45.0,
            z_near: 0.1,
            z_far: 100.0,
        }
    }
}

impl SceneConfig {
    /// The perspective projection for a framebuffer with the given aspect ratio.
    ///
    /// Produces OpenGL clip space (depth in `-1..=1`).
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y.to_radians(), aspect, self.z_near, self.z_far)
    }

    /// The view matrix at `seconds` since startup.
    ///
    /// The camera orbits the origin on the XZ plane, always looking at it.
    pub fn view(&self, seconds: f32) -> Mat4 {
        let eye = Vec3::new(
            seconds.sin() * self.camera_distance,
            0.0,
            seconds.cos() * self.camera_distance,
        );

        Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y)
    }

    /// The model matrix of cube `index` at `seconds` since startup.
    pub fn model(&self, index: usize, seconds: f32) -> Mat4 {
        let position = CUBE_POSITIONS[index % CUBE_POSITIONS.len()];
        let angle = seconds * self.spin_speed * (index + 1) as f32;

        Mat4::from_translation(position)
            * Mat4::from_axis_angle(SPIN_AXIS.normalize(), angle.to_radians())
    }
}

/// Width over height, guarding against a zero-sized (minimized) framebuffer.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}
