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

// Kiln Sandbox
// Renders a small scene through the headless backend and reports frame stats.
//
// Usage: sandbox [settings.ron] [frames]

use anyhow::{Context, Result};
use kiln_sdk::prelude::*;
use std::sync::Arc;

const CALL_LOG_LIMIT: usize = 4096;

const FLAT_SHADER: &str = r#"
#type vertex
layout(location = 0) in vec3 a_Position;
layout(location = 1) in vec2 a_TexCoord;
uniform mat4 u_ViewProjection;
uniform mat4 u_Transform;
out vec2 v_TexCoord;
void main() {
    v_TexCoord = a_TexCoord;
    gl_Position = u_ViewProjection * u_Transform * vec4(a_Position, 1.0);
}

#type fragment
in vec2 v_TexCoord;
uniform vec4 u_Color;
uniform sampler2D u_Texture;
out vec4 o_Color;
void main() {
    o_Color = texture(u_Texture, v_TexCoord) * u_Color;
}
"#;

const QUAD_VERTICES: [Vertex; 4] = [
    Vertex {
        position: [-0.5, -0.5, 0.0],
        tex_coord: [0.0, 0.0],
    },
    Vertex {
        position: [0.5, -0.5, 0.0],
        tex_coord: [1.0, 0.0],
    },
    Vertex {
        position: [0.5, 0.5, 0.0],
        tex_coord: [1.0, 1.0],
    },
    Vertex {
        position: [-0.5, 0.5, 0.0],
        tex_coord: [0.0, 1.0],
    },
];

const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

fn checkerboard(size: u32) -> Vec<u8> {
    let texels: Vec<[u8; 4]> = (0..size * size)
        .map(|i| {
            if (i % size + i / size) % 2 == 0 {
                [255, 255, 255, 255]
            } else {
                [40, 40, 40, 255]
            }
        })
        .collect();
    bytemuck::cast_slice(&texels).to_vec()
}

struct SceneLayer {
    scene: Option<SceneRenderer>,
    quads: Vec<Arc<Mesh>>,
    tinted: Option<Arc<Material>>,
    camera: SceneCamera,
    elapsed: f32,
}

impl SceneLayer {
    fn new(aspect: f32) -> Self {
        Self {
            scene: None,
            quads: Vec::new(),
            tinted: None,
            camera: SceneCamera {
                projection: Mat4::orthographic_rh_zo(-aspect, aspect, -1.0, 1.0, -1.0, 1.0),
                view: Mat4::IDENTITY,
            },
            elapsed: 0.0,
        }
    }
}

impl Layer for SceneLayer {
    fn name(&self) -> &str {
        "Scene"
    }

    fn on_attach(&mut self, renderer: &mut Renderer) -> Result<()> {
        let ctx = renderer.context().clone();
        let shader = Arc::new(Shader::new(&ctx, "Flat", FLAT_SHADER)?);
        let pipeline = Arc::new(Pipeline::new(
            &ctx,
            PipelineDescriptor::new("Flat", Vertex::layout()),
            Arc::clone(&shader),
        ));

        let checker = Arc::new(Texture2D::from_pixels(
            &ctx,
            8,
            8,
            TextureFormat::Rgba8Unorm,
            &checkerboard(8),
        ));
        let material = Arc::new(Material::new("Checker", Arc::clone(&shader)));
        material.set("u_Color", LinearRgba::WHITE.to_vec4());
        material.set("u_Texture", 0_i32);
        material.set_texture(0, checker);

        let tinted = Arc::new(Material::new("Tinted", shader));
        tinted.set("u_Color", LinearRgba::rgb(0.9, 0.4, 0.1).to_vec4());

        self.quads = (0..4)
            .map(|i| {
                let mesh = Mesh::new(&ctx, format!("Quad{i}"), &QUAD_VERTICES, &QUAD_INDICES);
                Arc::new(mesh.with_material(Arc::clone(&material)))
            })
            .collect();

        let settings = renderer.settings();
        self.scene = Some(SceneRenderer::new(
            &ctx,
            pipeline,
            settings.viewport_width,
            settings.viewport_height,
            settings.clear_color,
        ));
        self.tinted = Some(tinted);
        log::info!("SandboxApp: scene resources queued");
        Ok(())
    }

    fn on_update(&mut self, frame: &mut FrameContext<'_>) -> Result<()> {
        self.elapsed += frame.timestep.seconds();
        let Some(scene) = self.scene.as_mut() else {
            return Ok(());
        };

        scene.begin_scene(self.camera)?;
        for (i, quad) in self.quads.iter().enumerate() {
            let offset = i as f32 - 1.5;
            let bob = (self.elapsed * 2.0 + i as f32).sin() * 0.1;
            let transform = Mat4::from_translation(Vec3::new(offset * 0.6, bob, 0.0))
                * Mat4::from_scale(Vec3::new(0.5, 0.5, 1.0));
            let material = (i % 2 == 1).then(|| self.tinted.clone()).flatten();
            scene.submit_mesh(Arc::clone(quad), transform, material)?;
        }
        scene.end_scene(frame.renderer)?;

        if frame.frame_number % 60 == 0 {
            log::info!(
                "Frame {}: {:.1} ms timestep",
                frame.frame_number,
                frame.timestep.milliseconds()
            );
        }
        Ok(())
    }

    fn on_window_resize(&mut self, width: u32, height: u32) {
        if let Some(scene) = &self.scene {
            scene.set_viewport_size(width, height);
        }
        let aspect = width as f32 / height as f32;
        self.camera.projection = Mat4::orthographic_rh_zo(-aspect, aspect, -1.0, 1.0, -1.0, 1.0);
    }

    fn on_detach(&mut self) {
        self.quads.clear();
        self.tinted = None;
        self.scene = None;
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => RenderSettings::load(&path)
            .with_context(|| format!("Failed to load render settings from '{path}'"))?,
        None => RenderSettings::default(),
    };
    let frames: u64 = match args.next() {
        Some(count) => count
            .parse()
            .with_context(|| format!("Invalid frame count '{count}'"))?,
        None => 120,
    };

    let aspect = settings.viewport_width as f32 / settings.viewport_height as f32;
    // Nothing reads the call log here; keep only the tail for debugging.
    let backend = Arc::new(HeadlessBackend::with_call_log_limit(CALL_LOG_LIMIT));
    let mut engine = Engine::new(backend.clone(), settings)?;
    engine.push_layer(Box::new(SceneLayer::new(aspect)))?;

    let timestep = Timestep::from_seconds(1.0 / 60.0);
    engine.run(frames / 2, timestep)?;
    engine.on_window_resize(1920, 1080);
    let stats = engine.run(frames - frames / 2, timestep)?;
    log::info!(
        "Last frame: {} commands, {} draw calls, {} bytes (peak {} bytes)",
        stats.commands_executed,
        stats.draw_calls,
        stats.bytes_used,
        stats.peak_bytes_used
    );

    engine.shutdown()?;
    let leaked = backend.live_resources();
    if leaked.total() > 0 {
        log::warn!("Resources still alive after shutdown: {leaked:?}");
    } else {
        log::info!("All GPU resources released");
    }
    Ok(())
}
