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

// Easy module for setting up a window and a GL context for the examples.
// Uses glutin and winit.

use cubes_glow::GlContext;
use cubes_hardware::scene::SceneConfig;

use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{Display, GetGlDisplay};
use glutin::prelude::*;

use glutin::surface::{Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};

use raw_window_handle::HasRawWindowHandle;

use std::error::Error;
use std::mem;
use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::{Duration, Instant};

use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{EventLoop, EventLoopWindowTarget};
use winit::window::{Window, WindowBuilder};

pub(crate) type Context = GlContext<glow::Context>;

pub(crate) fn init() {
    tracing_subscriber::fmt::init();
}

struct GlutinSetup {
    display: Display,
    config: Config,
    context: ContextType,
    window: Option<Window>,
    window_builder: WindowBuilder,
}

enum ContextType {
    NotCurrent(NotCurrentContext),
    Current {
        context: PossiblyCurrentContext,
        window: Window,
        surface: Surface<WindowSurface>,
    },
    Hole,
}

impl Default for ContextType {
    fn default() -> Self {
        Self::Hole
    }
}

fn make_window_builder(scene: &SceneConfig) -> WindowBuilder {
    let (width, height) = scene.window_size;

    WindowBuilder::new()
        .with_title(&scene.title)
        .with_inner_size(LogicalSize::new(width, height))
}

impl GlutinSetup {
    fn new<T>(
        event_loop: &EventLoopWindowTarget<T>,
        scene: &SceneConfig,
    ) -> Result<Self, Box<dyn Error>> {
        // Start building a window.
        let window = if cfg!(windows) {
            Some(make_window_builder(scene))
        } else {
            None
        };

        // Use the window builder to start building a display.
        let display = DisplayBuilder::new().with_window_builder(window);

        // The cubes need a depth buffer; prefer the config with the most samples.
        let (window, gl_config) = display.build(
            event_loop,
            ConfigTemplateBuilder::new().with_depth_size(24),
            |configs| {
                configs
                    .reduce(|accum, config| {
                        if config.num_samples() > accum.num_samples() {
                            config
                        } else {
                            accum
                        }
                    })
                    .unwrap()
            },
        )?;

        tracing::debug!(
            api = ?gl_config.api(),
            depth_size = gl_config.depth_size(),
            samples = gl_config.num_samples(),
            hardware_accelerated = gl_config.hardware_accelerated(),
            "picked GL config"
        );

        // The shaders are `#version 330 core`, so only a desktop 3.3 core context will do.
        let window_handle = window.as_ref().map(|w| w.raw_window_handle());
        let attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .with_profile(GlProfile::Core)
            .build(window_handle);

        let display = gl_config.display();
        let gl_handler = unsafe { display.create_context(&gl_config, &attributes) }
            .map_err(|err| format!("Could not create an OpenGL 3.3 core context: {err}"))?;

        Ok(Self {
            display,
            config: gl_config,
            context: ContextType::NotCurrent(gl_handler),
            window,
            window_builder: make_window_builder(scene),
        })
    }

    fn make_current<T>(
        &mut self,
        window_target: &EventLoopWindowTarget<T>,
    ) -> impl FnOnce() -> glow::Context {
        let window = self.window.take().unwrap_or_else(|| {
            glutin_winit::finalize_window(window_target, self.window_builder.clone(), &self.config)
                .unwrap()
        });

        let attrs = window.build_surface_attributes(<_>::default());
        let gl_surface = unsafe {
            self.display
                .create_window_surface(&self.config, &attrs)
                .unwrap()
        };

        // Make it current.
        let gl_context = match mem::take(&mut self.context) {
            ContextType::NotCurrent(context) => context.make_current(&gl_surface).unwrap(),
            _ => panic!("Invalid state!"),
        };

        // Try setting vsync.
        if let Err(res) = gl_surface
            .set_swap_interval(&gl_context, SwapInterval::Wait(NonZeroU32::new(1).unwrap()))
        {
            tracing::warn!("Error setting vsync: {res:?}");
        }

        self.context = ContextType::Current {
            context: gl_context,
            window,
            surface: gl_surface,
        };

        // Set up the Glow context.
        let display = self.display.clone();
        move || {
            #[allow(unused_mut)]
            let mut glow_context = unsafe {
                glow::Context::from_loader_function_cstr(|s| {
                    display.get_proc_address(s) as *const _
                })
            };

            #[cfg(not(target_vendor = "apple"))]
            unsafe {
                use glow::HasContext;

                glow_context.enable(glow::DEBUG_OUTPUT);
                glow_context.debug_message_callback(debug_message_callback);
            }

            glow_context
        }
    }
}

/// Open a window and drive `draw` once per frame.
///
/// `setup` runs once, as soon as the context is current. Whatever it returns is dropped before the
/// context goes away.
pub(crate) fn run<S: 'static>(
    scene: SceneConfig,
    setup: impl FnOnce(&Rc<Context>, &SceneConfig) -> Result<S, Box<dyn Error>> + 'static,
    mut draw: impl FnMut(&mut S, &Context, &SceneConfig, (u32, u32)) + 'static,
) -> Result<(), Box<dyn Error>> {
    let event_loop = EventLoop::new();
    let mut glutin = GlutinSetup::new(&event_loop, &scene)?;

    let mut setup = Some(setup);
    let mut state: Option<(Rc<Context>, S)> = None;
    let mut current_size = None;
    let mut next_render = Instant::now() + Duration::from_millis(16);

    event_loop.run(move |event, window_target, control_flow| {
        control_flow.set_wait_until(next_render);
        match event {
            Event::Resumed => {
                let generator = glutin.make_current(window_target);

                if let Some(setup) = setup.take() {
                    // SAFETY: We are current.
                    let context = match unsafe { GlContext::new(generator()) } {
                        Ok(context) => Rc::new(context),
                        Err(err) => {
                            tracing::error!("{err}");
                            control_flow.set_exit();
                            return;
                        }
                    };

                    match setup(&context, &scene) {
                        Ok(user) => state = Some((context, user)),
                        Err(err) => {
                            tracing::error!("failed to set up the scene: {err}");
                            control_flow.set_exit();
                        }
                    }
                }
            }
            Event::Suspended => {
                // Only raised on Android, where the window can disappear at any moment.
                let gl_context = match mem::take(&mut glutin.context) {
                    ContextType::Current { context, .. } => context,
                    _ => panic!("Invalid state!"),
                };
                glutin.context = ContextType::NotCurrent(gl_context.make_not_current().unwrap());
            }
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::Resized(size) => {
                    if size.width != 0 && size.height != 0 {
                        // EGL on Wayland and macOS need the surface resized by hand.
                        if let ContextType::Current {
                            context, surface, ..
                        } = &glutin.context
                        {
                            surface.resize(
                                context,
                                NonZeroU32::new(size.width).unwrap(),
                                NonZeroU32::new(size.height).unwrap(),
                            );
                            current_size = Some(size);
                        }
                    }
                }
                WindowEvent::CloseRequested => {
                    control_flow.set_exit();
                }
                _ => (),
            },
            Event::RedrawEventsCleared => {
                if let (
                    ContextType::Current {
                        context: gl_context,
                        window,
                        surface: gl_surface,
                    },
                    Some((context, user)),
                ) = (&glutin.context, state.as_mut())
                {
                    let size = current_size.unwrap_or_else(|| window.inner_size());
                    draw(user, context, &scene, (size.width, size.height));

                    window.request_redraw();

                    gl_surface.swap_buffers(gl_context).unwrap();
                    next_render += Duration::from_millis(17);
                }
            }
            Event::LoopDestroyed => {
                // GPU objects must go while the context is still current.
                state = None;
            }
            _ => (),
        }
    })
}

#[cfg(not(target_vendor = "apple"))]
fn debug_message_callback(source: u32, ty: u32, id: u32, severity: u32, message: &str) {
    let source = match source {
        glow::DEBUG_SOURCE_API => "API",
        glow::DEBUG_SOURCE_WINDOW_SYSTEM => "Window System",
        glow::DEBUG_SOURCE_SHADER_COMPILER => "Shader Compiler",
        glow::DEBUG_SOURCE_THIRD_PARTY => "Third Party",
        glow::DEBUG_SOURCE_APPLICATION => "Application",
        glow::DEBUG_SOURCE_OTHER => "Other",
        _ => "Unknown",
    };

    let ty = match ty {
        glow::DEBUG_TYPE_ERROR => "Error",
        glow::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "Deprecated Behavior",
        glow::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "Undefined Behavior",
        glow::DEBUG_TYPE_PORTABILITY => "Portability",
        glow::DEBUG_TYPE_PERFORMANCE => "Performance",
        glow::DEBUG_TYPE_MARKER => "Marker",
        glow::DEBUG_TYPE_OTHER => "Other",
        _ => "Unknown",
    };

    match severity {
        glow::DEBUG_SEVERITY_HIGH => {
            tracing::error!("{ty}-{id} ({source}): {message}");
        }
        glow::DEBUG_SEVERITY_MEDIUM => {
            tracing::warn!("{ty}-{id} ({source}): {message}");
        }
        glow::DEBUG_SEVERITY_LOW => {
            tracing::info!("{ty}-{id} ({source}): {message}");
        }
        glow::DEBUG_SEVERITY_NOTIFICATION => {
            tracing::debug!("{ty}-{id} ({source}): {message}");
        }
        _ => (),
    };
}
