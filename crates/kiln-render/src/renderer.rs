// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::context::RenderContext;
use crate::material::Material;
use crate::mesh::Mesh;
use crate::render_pass::RenderPass;
use crate::resources::{bind_framebuffer_now, Framebuffer, Pipeline, Shader, Texture2D};
use kiln_core::math::Mat4;
use kiln_core::renderer::{
    FrameStats, GraphicsBackend, LoadOp, RenderError, RenderSettings, ResourceError, Viewport,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

const FULLSCREEN_SHADER: &str = r#"
#type vertex
layout(location = 0) in vec3 a_Position;
layout(location = 1) in vec2 a_TexCoord;
out vec2 v_TexCoord;
void main() {
    v_TexCoord = a_TexCoord;
    gl_Position = vec4(a_Position, 1.0);
}

#type fragment
in vec2 v_TexCoord;
uniform sampler2D u_Texture;
out vec4 o_Color;
void main() {
    o_Color = texture(u_Texture, v_TexCoord);
}
"#;

/// Resources shared by every fullscreen quad draw.
#[derive(Debug)]
struct FullscreenQuad {
    mesh: Mesh,
    shader: Shader,
}

/// The image a fullscreen quad samples.
#[derive(Debug, Clone, Copy)]
pub enum QuadSource<'a> {
    /// A texture.
    Texture(&'a Texture2D),
    /// A color attachment of a framebuffer, usually the target of an earlier pass.
    ColorAttachment {
        /// The framebuffer to sample.
        framebuffer: &'a Framebuffer,
        /// Index among its color attachments.
        attachment: u32,
    },
}

impl<'a> From<&'a Texture2D> for QuadSource<'a> {
    fn from(texture: &'a Texture2D) -> Self {
        Self::Texture(texture)
    }
}

impl<'a> From<&'a Framebuffer> for QuadSource<'a> {
    /// Samples the first color attachment.
    fn from(framebuffer: &'a Framebuffer) -> Self {
        Self::ColorAttachment {
            framebuffer,
            attachment: 0,
        }
    }
}

/// The frame and render pass lifecycle on top of the command queue.
///
/// Everything the renderer does is recorded into the queue; the backend only
/// sees it when [`wait_and_render`](Self::wait_and_render) drains the queue.
/// At most one render pass is active at a time, and pass-scoped calls outside a
/// pass are rejected.
#[derive(Debug)]
pub struct Renderer {
    ctx: RenderContext,
    settings: RenderSettings,
    active_pass: Option<Arc<RenderPass>>,
    viewport: Viewport,
    frame_number: u64,
    draw_calls: Arc<AtomicU32>,
    fullscreen_quad: Option<FullscreenQuad>,
}

impl Renderer {
    /// Creates a renderer with its own command queue.
    ///
    /// Nothing is recorded until [`init`](Self::init).
    pub fn new(
        backend: Arc<dyn GraphicsBackend>,
        settings: RenderSettings,
    ) -> Result<Self, RenderError> {
        settings.validate()?;
        let ctx = RenderContext::with_settings(backend, &settings)?;
        log::info!(
            "Renderer: using '{}' backend with a {} byte command queue",
            ctx.backend().name(),
            settings.queue_capacity
        );
        Ok(Self {
            ctx,
            viewport: Viewport::from_size(settings.viewport_width, settings.viewport_height),
            settings,
            active_pass: None,
            frame_number: 0,
            draw_calls: Arc::new(AtomicU32::new(0)),
            fullscreen_quad: None,
        })
    }

    /// Records the initial viewport and creates the renderer's own resources.
    pub fn init(&mut self) -> Result<(), RenderError> {
        if self.fullscreen_quad.is_some() {
            log::warn!("Renderer::init called more than once");
            return Ok(());
        }
        let viewport = self.viewport;
        self.ctx.submit(move |backend| backend.set_viewport(viewport));

        let shader = Shader::new(&self.ctx, "Fullscreen", FULLSCREEN_SHADER)
            .map_err(ResourceError::from)?;
        self.fullscreen_quad = Some(FullscreenQuad {
            mesh: Mesh::fullscreen_quad(&self.ctx),
            shader,
        });
        log::debug!("Renderer initialized");
        Ok(())
    }

    /// The context that rendering objects record through.
    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }

    /// The settings the renderer was created with.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// The active render pass, if any.
    pub fn active_pass(&self) -> Option<&Arc<RenderPass>> {
        self.active_pass.as_ref()
    }

    /// The viewport used outside render passes.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The number of frames rendered so far.
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Records a command that runs against the backend on the next
    /// [`wait_and_render`](Self::wait_and_render).
    ///
    /// # Panics
    ///
    /// Panics if the command queue is out of capacity.
    pub fn submit<F>(&self, command: F)
    where
        F: FnOnce(&dyn GraphicsBackend) + Send + 'static,
    {
        self.ctx.submit(command);
    }

    /// Makes `pass` the active pass and records binding and clearing its target.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::PassAlreadyActive`] if another pass has not ended.
    pub fn begin_render_pass(&mut self, pass: &Arc<RenderPass>) -> Result<(), RenderError> {
        if let Some(active) = &self.active_pass {
            let err = RenderError::PassAlreadyActive {
                active: active.label().to_owned(),
                requested: pass.label().to_owned(),
            };
            log::error!("{err}");
            return Err(err);
        }

        let target = pass.target().slot().clone();
        let (width, height) = pass.target().size();
        self.ctx.submit(move |backend| {
            bind_framebuffer_now(backend, &target);
            backend.set_viewport(Viewport::from_size(width, height));
        });
        if let LoadOp::Clear(color) = pass.load_op() {
            self.ctx.submit(move |backend| backend.clear(color));
        }

        log::trace!("Renderer: begin render pass '{}'", pass.label());
        self.active_pass = Some(Arc::clone(pass));
        Ok(())
    }

    /// Ends the active pass and records restoring the default target.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NoActivePass`] if no pass is active.
    pub fn end_render_pass(&mut self) -> Result<(), RenderError> {
        let Some(pass) = self.active_pass.take() else {
            let err = RenderError::NoActivePass;
            log::error!("end_render_pass: {err}");
            return Err(err);
        };
        pass.target().unbind();
        log::trace!("Renderer: end render pass '{}'", pass.label());
        Ok(())
    }

    fn require_pass(&self, operation: &str) -> Result<(), RenderError> {
        if self.active_pass.is_none() {
            let err = RenderError::NoActivePass;
            log::error!("{operation}: {err}");
            return Err(err);
        }
        Ok(())
    }

    fn submit_draw(&self, index_count: u32) {
        let draw_calls = Arc::clone(&self.draw_calls);
        self.ctx.submit(move |backend| match backend.draw_indexed(index_count) {
            Ok(()) => {
                draw_calls.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => log::error!("Draw of {index_count} indices failed: {e}"),
        });
    }

    /// Records drawing `mesh` with `transform`.
    ///
    /// Uses `material_override` if given, otherwise the mesh's own material.
    /// A mesh with neither is skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NoActivePass`] if no pass is active.
    pub fn submit_mesh(
        &mut self,
        mesh: &Mesh,
        transform: Mat4,
        pipeline: &Pipeline,
        material_override: Option<&Material>,
    ) -> Result<(), RenderError> {
        self.require_pass("submit_mesh")?;
        let default_material = mesh.material().map(|material| &**material);
        let Some(material) = material_override.or(default_material) else {
            log::warn!("Mesh '{}' has no material, skipping draw", mesh.name());
            return Ok(());
        };

        pipeline.bind();
        mesh.vertex_buffer().bind();
        mesh.index_buffer().bind();
        material.bind();
        material.shader().upload_uniform("u_Transform", transform);
        self.submit_draw(mesh.index_buffer().count());
        Ok(())
    }

    /// Records drawing `source` over the whole target of the active pass.
    ///
    /// Accepts a [`Texture2D`], or a [`Framebuffer`] whose first color attachment
    /// is sampled; see [`QuadSource`] for other attachments.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NoActivePass`] if no pass is active.
    pub fn submit_fullscreen_quad<'a>(
        &mut self,
        source: impl Into<QuadSource<'a>>,
    ) -> Result<(), RenderError> {
        self.require_pass("submit_fullscreen_quad")?;
        let Some(quad) = &self.fullscreen_quad else {
            log::warn!("submit_fullscreen_quad before Renderer::init, skipping draw");
            return Ok(());
        };

        quad.shader.bind();
        quad.shader.upload_uniform("u_Texture", 0_i32);
        match source.into() {
            QuadSource::Texture(texture) => texture.bind(0),
            QuadSource::ColorAttachment {
                framebuffer,
                attachment,
            } => framebuffer.bind_color_attachment(attachment, 0),
        }
        quad.mesh.vertex_buffer().bind();
        quad.mesh.index_buffer().bind();
        self.submit_draw(quad.mesh.index_buffer().count());
        Ok(())
    }

    /// Records a viewport change.
    pub fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        let viewport = Viewport {
            x,
            y,
            width,
            height,
        };
        self.viewport = viewport;
        self.ctx.submit(move |backend| backend.set_viewport(viewport));
    }

    /// Resizes the viewport to the new window size. A zero size (a minimized
    /// window) is ignored.
    pub fn on_window_resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("Renderer: ignoring resize to {width}x{height}");
            return;
        }
        self.set_viewport(0, 0, width, height);
    }

    /// Executes every recorded command in order and starts a new frame.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Queue`] if the queue is already being drained.
    pub fn wait_and_render(&mut self) -> Result<FrameStats, RenderError> {
        let drain = self.ctx.sink().drain()?;
        self.frame_number += 1;
        let stats = FrameStats::from_drain(
            self.frame_number,
            drain,
            self.ctx.sink().peak_bytes_used(),
            self.draw_calls.swap(0, Ordering::Relaxed),
        );
        log::debug!(
            "Frame {}: {} commands, {} bytes, {} draw calls",
            stats.frame_number,
            stats.commands_executed,
            stats.bytes_used,
            stats.draw_calls
        );
        Ok(stats)
    }

    /// Abandons a frame that could not be recorded to the end.
    ///
    /// Any open render pass is closed and the commands recorded so far are
    /// executed, so resources created or released during the frame still take
    /// effect. The frame number does not advance and the frame's draw calls are
    /// not reported.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Queue`] if the queue is already being drained.
    pub fn abort_frame(&mut self) -> Result<(), RenderError> {
        self.close_active_pass("frame abort");
        let drain = self.ctx.sink().drain()?;
        self.draw_calls.store(0, Ordering::Relaxed);
        log::debug!(
            "Frame {} aborted after {} commands",
            self.frame_number + 1,
            drain.commands_executed
        );
        Ok(())
    }

    fn close_active_pass(&mut self, reason: &str) {
        if let Some(pass) = self.active_pass.take() {
            log::warn!("Render pass '{}' still active at {reason}", pass.label());
            pass.target().unbind();
        }
    }

    /// Releases the renderer's own resources and drains the queue one last time.
    pub fn shutdown(mut self) -> Result<FrameStats, RenderError> {
        self.close_active_pass("shutdown");
        self.fullscreen_quad = None;
        let stats = self.wait_and_render()?;
        log::info!(
            "Renderer shut down after {} frames (peak queue usage {} bytes)",
            stats.frame_number,
            stats.peak_bytes_used
        );
        Ok(stats)
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.fullscreen_quad = None;
        let sink = self.ctx.sink();
        if sink.pending() > 0 && !sink.is_draining() {
            if let Err(e) = sink.drain() {
                log::error!("Failed to drain render commands on drop: {e}");
            }
        }
    }
}
