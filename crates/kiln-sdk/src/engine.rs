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

use crate::layer::{Layer, LayerStack};
use anyhow::{Context, Result};
use kiln_core::renderer::{FrameStats, GraphicsBackend, RenderSettings};
use kiln_render::Renderer;
use std::sync::Arc;

/// The time elapsed since the previous frame.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Timestep(f32);

impl Timestep {
    /// A timestep of `seconds`.
    pub const fn from_seconds(seconds: f32) -> Self {
        Self(seconds)
    }

    /// The timestep in seconds.
    pub fn seconds(self) -> f32 {
        self.0
    }

    /// The timestep in milliseconds.
    pub fn milliseconds(self) -> f32 {
        self.0 * 1000.0
    }
}

/// What a layer gets to work with during [`Layer::on_update`].
pub struct FrameContext<'a> {
    /// The renderer commands are recorded into.
    pub renderer: &'a mut Renderer,
    /// The time since the previous frame.
    pub timestep: Timestep,
    /// The number of the frame being recorded. [`Engine::new`] renders frame 1
    /// at start-up, so the first [`Engine::run_frame`] records frame 2.
    pub frame_number: u64,
}

/// Drives a [`LayerStack`] and the [`Renderer`] one frame at a time.
///
/// Dropping an engine without calling [`shutdown`](Self::shutdown) drops the
/// layers without detaching them; the renderer still drains whatever they queued.
pub struct Engine {
    // Layers are dropped before the renderer, so their release commands are
    // queued before the renderer's final drain.
    layers: LayerStack,
    renderer: Renderer,
    last_frame: FrameStats,
}

impl Engine {
    /// Creates and initializes the renderer, then renders a start-up frame so
    /// that resources created during initialization exist before the first update.
    pub fn new(backend: Arc<dyn GraphicsBackend>, settings: RenderSettings) -> Result<Self> {
        let mut renderer =
            Renderer::new(backend, settings).context("Failed to create the renderer")?;
        renderer.init().context("Failed to initialize the renderer")?;
        let last_frame = renderer
            .wait_and_render()
            .context("Failed to render the start-up frame")?;
        log::info!("Engine started ({} start-up commands)", last_frame.commands_executed);

        Ok(Self {
            layers: LayerStack::new(),
            renderer,
            last_frame,
        })
    }

    /// Attaches `layer` and pushes it above the other layers.
    pub fn push_layer(&mut self, mut layer: Box<dyn Layer>) -> Result<()> {
        layer
            .on_attach(&mut self.renderer)
            .with_context(|| format!("Failed to attach layer '{}'", layer.name()))?;
        log::debug!("Attached layer '{}'", layer.name());
        self.layers.push_layer(layer);
        Ok(())
    }

    /// Attaches `overlay` and pushes it on top of the stack.
    pub fn push_overlay(&mut self, mut overlay: Box<dyn Layer>) -> Result<()> {
        overlay
            .on_attach(&mut self.renderer)
            .with_context(|| format!("Failed to attach overlay '{}'", overlay.name()))?;
        log::debug!("Attached overlay '{}'", overlay.name());
        self.layers.push_overlay(overlay);
        Ok(())
    }

    /// Detaches and removes the topmost regular layer called `name`.
    pub fn pop_layer(&mut self, name: &str) -> Option<Box<dyn Layer>> {
        let mut layer = self.layers.pop_layer(name)?;
        layer.on_detach();
        Some(layer)
    }

    /// Updates every layer bottom-up, then executes the frame's commands.
    ///
    /// The first failing layer stops the frame and its error is returned. The
    /// frame is aborted: an open render pass is closed and whatever was recorded
    /// is executed without counting as a rendered frame.
    pub fn run_frame(&mut self, timestep: Timestep) -> Result<FrameStats> {
        let frame_number = self.renderer.frame_number() + 1;
        for layer in self.layers.iter_mut() {
            let mut frame = FrameContext {
                renderer: &mut self.renderer,
                timestep,
                frame_number,
            };
            if let Err(e) = layer.on_update(&mut frame) {
                let name = layer.name().to_owned();
                if let Err(abort) = self.renderer.abort_frame() {
                    log::error!("Failed to abort frame {frame_number}: {abort}");
                }
                return Err(e.context(format!("Layer '{name}' failed to update")));
            }
        }
        self.last_frame = self.renderer.wait_and_render()?;
        Ok(self.last_frame)
    }

    /// Runs `frames` frames with a fixed timestep and returns the last frame's stats.
    pub fn run(&mut self, frames: u64, timestep: Timestep) -> Result<FrameStats> {
        for _ in 0..frames {
            self.run_frame(timestep)?;
        }
        Ok(self.last_frame)
    }

    /// Resizes the viewport and notifies every layer. A zero size is ignored.
    pub fn on_window_resize(&mut self, width: u32, height: u32) {
        self.renderer.on_window_resize(width, height);
        if width == 0 || height == 0 {
            return;
        }
        for layer in self.layers.iter_mut() {
            layer.on_window_resize(width, height);
        }
    }

    /// The renderer.
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// The renderer, mutably.
    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    /// The layer stack.
    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    /// Statistics of the most recent frame.
    pub fn last_frame(&self) -> FrameStats {
        self.last_frame
    }

    /// Detaches every layer top-down, then shuts the renderer down, which
    /// executes the release commands the layers queued.
    pub fn shutdown(self) -> Result<FrameStats> {
        let Self {
            mut layers,
            renderer,
            ..
        } = self;
        for mut layer in layers.drain_top_down() {
            layer.on_detach();
            log::debug!("Detached layer '{}'", layer.name());
        }
        let stats = renderer.shutdown()?;
        log::info!("Engine shut down after {} frames", stats.frame_number);
        Ok(stats)
    }
}
