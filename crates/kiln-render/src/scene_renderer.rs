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
use crate::renderer::{QuadSource, Renderer};
use crate::resources::{Framebuffer, Pipeline};
use kiln_core::math::{LinearRgba, Mat4};
use kiln_core::renderer::{FramebufferSpecification, LoadOp, RenderError, TextureFormat};
use std::sync::Arc;

/// The camera a scene is rendered from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SceneCamera {
    /// The projection matrix.
    pub projection: Mat4,
    /// The world-to-view matrix.
    pub view: Mat4,
}

impl SceneCamera {
    /// The combined world-to-clip matrix.
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

#[derive(Debug)]
struct DrawCommand {
    mesh: Arc<Mesh>,
    transform: Mat4,
    material_override: Option<Arc<Material>>,
}

/// Collects a scene's meshes between [`begin_scene`](Self::begin_scene) and
/// [`end_scene`](Self::end_scene), then records them into a geometry pass.
///
/// The geometry pass renders into a floating-point target. A composite pass
/// then copies its color attachment onto the final framebuffer with a
/// fullscreen quad.
#[derive(Debug)]
pub struct SceneRenderer {
    pipeline: Arc<Pipeline>,
    geometry_pass: Arc<RenderPass>,
    composite_pass: Arc<RenderPass>,
    draw_list: Vec<DrawCommand>,
    camera: Option<SceneCamera>,
}

impl SceneRenderer {
    /// Creates the geometry and composite framebuffers and their passes.
    pub fn new(
        ctx: &RenderContext,
        pipeline: Arc<Pipeline>,
        width: u32,
        height: u32,
        clear_color: LinearRgba,
    ) -> Self {
        let framebuffer = Framebuffer::new(
            ctx,
            FramebufferSpecification {
                label: Some("Geometry".to_owned()),
                width,
                height,
                attachments: vec![TextureFormat::Rgba16Float, TextureFormat::Depth24PlusStencil8],
                ..FramebufferSpecification::default()
            },
        );
        let geometry_pass = RenderPass::new(
            "Geometry",
            Arc::new(framebuffer),
            LoadOp::Clear(clear_color),
        );
        let composite = Framebuffer::new(
            ctx,
            FramebufferSpecification {
                label: Some("Composite".to_owned()),
                width,
                height,
                attachments: vec![TextureFormat::Rgba16Float],
                ..FramebufferSpecification::default()
            },
        );
        let composite_pass = RenderPass::new(
            "Composite",
            Arc::new(composite),
            LoadOp::Clear(clear_color),
        );
        Self {
            pipeline,
            geometry_pass: Arc::new(geometry_pass),
            composite_pass: Arc::new(composite_pass),
            draw_list: Vec::new(),
            camera: None,
        }
    }

    /// Starts collecting draws for a scene seen from `camera`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::SceneAlreadyActive`] if a scene has not ended.
    pub fn begin_scene(&mut self, camera: SceneCamera) -> Result<(), RenderError> {
        if self.camera.is_some() {
            log::error!("begin_scene: {}", RenderError::SceneAlreadyActive);
            return Err(RenderError::SceneAlreadyActive);
        }
        self.camera = Some(camera);
        Ok(())
    }

    /// Adds a mesh to the draw list.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NoActiveScene`] outside `begin_scene`/`end_scene`.
    pub fn submit_mesh(
        &mut self,
        mesh: Arc<Mesh>,
        transform: Mat4,
        material_override: Option<Arc<Material>>,
    ) -> Result<(), RenderError> {
        if self.camera.is_none() {
            log::error!("submit_mesh: {}", RenderError::NoActiveScene);
            return Err(RenderError::NoActiveScene);
        }
        self.draw_list.push(DrawCommand {
            mesh,
            transform,
            material_override,
        });
        Ok(())
    }

    /// Ends the scene and records the geometry pass followed by the composite pass.
    ///
    /// The draw list is empty afterwards, including when recording fails.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NoActiveScene`] if no scene is active, or the
    /// renderer's error if either pass cannot be recorded.
    pub fn end_scene(&mut self, renderer: &mut Renderer) -> Result<(), RenderError> {
        let Some(camera) = self.camera.take() else {
            log::error!("end_scene: {}", RenderError::NoActiveScene);
            return Err(RenderError::NoActiveScene);
        };
        let draw_list = std::mem::take(&mut self.draw_list);
        self.flush_draw_list(renderer, camera, draw_list)?;
        self.composite(renderer)
    }

    fn composite(&self, renderer: &mut Renderer) -> Result<(), RenderError> {
        renderer.begin_render_pass(&self.composite_pass)?;
        renderer.submit_fullscreen_quad(QuadSource::ColorAttachment {
            framebuffer: self.geometry_pass.target(),
            attachment: 0,
        })?;
        renderer.end_render_pass()
    }

    fn flush_draw_list(
        &self,
        renderer: &mut Renderer,
        camera: SceneCamera,
        draw_list: Vec<DrawCommand>,
    ) -> Result<(), RenderError> {
        let view_projection = camera.view_projection();
        renderer.begin_render_pass(&self.geometry_pass)?;
        for draw in &draw_list {
            let material = draw.material_override.as_ref().or(draw.mesh.material());
            if let Some(material) = material {
                material.set("u_ViewProjection", view_projection);
            }
            renderer.submit_mesh(
                &draw.mesh,
                draw.transform,
                &self.pipeline,
                draw.material_override.as_deref(),
            )?;
        }
        renderer.end_render_pass()?;
        log::trace!("SceneRenderer: flushed {} draws", draw_list.len());
        Ok(())
    }

    /// Resizes both framebuffers.
    pub fn set_viewport_size(&self, width: u32, height: u32) {
        self.geometry_pass.target().resize(width, height);
        self.composite_pass.target().resize(width, height);
    }

    /// The framebuffer holding the finished frame, the composite pass target.
    pub fn final_framebuffer(&self) -> &Arc<Framebuffer> {
        self.composite_pass.target()
    }

    /// The geometry pass.
    pub fn geometry_pass(&self) -> &Arc<RenderPass> {
        &self.geometry_pass
    }

    /// The composite pass.
    pub fn composite_pass(&self) -> &Arc<RenderPass> {
        &self.composite_pass
    }

    /// The number of draws collected for the current scene.
    pub fn draw_count(&self) -> usize {
        self.draw_list.len()
    }

    /// Returns `true` between `begin_scene` and `end_scene`.
    pub fn is_scene_active(&self) -> bool {
        self.camera.is_some()
    }
}
