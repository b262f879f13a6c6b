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

use crate::engine::FrameContext;
use anyhow::Result;
use kiln_render::Renderer;

/// A slice of application logic updated once per frame.
pub trait Layer {
    /// A name identifying the layer in logs.
    fn name(&self) -> &str;

    /// Called when the layer is pushed onto the engine. Resources created here are
    /// queued and exist once the next frame is drained.
    fn on_attach(&mut self, _renderer: &mut Renderer) -> Result<()> {
        Ok(())
    }

    /// Called once per frame, before the frame's commands are executed.
    fn on_update(&mut self, frame: &mut FrameContext<'_>) -> Result<()>;

    /// Called when the window is resized to a non-zero size.
    fn on_window_resize(&mut self, _width: u32, _height: u32) {}

    /// Called when the layer is removed or the engine shuts down.
    fn on_detach(&mut self) {}
}

/// An ordered stack of layers, with overlays always above regular layers.
#[derive(Default)]
pub struct LayerStack {
    layers: Vec<Box<dyn Layer>>,
    overlay_start: usize,
}

impl LayerStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `layer` above the other layers and below every overlay.
    pub fn push_layer(&mut self, layer: Box<dyn Layer>) {
        self.layers.insert(self.overlay_start, layer);
        self.overlay_start += 1;
    }

    /// Pushes `overlay` on top of the stack.
    pub fn push_overlay(&mut self, overlay: Box<dyn Layer>) {
        self.layers.push(overlay);
    }

    /// Removes the topmost regular layer called `name`.
    pub fn pop_layer(&mut self, name: &str) -> Option<Box<dyn Layer>> {
        let index = self.layers[..self.overlay_start]
            .iter()
            .rposition(|layer| layer.name() == name)?;
        self.overlay_start -= 1;
        Some(self.layers.remove(index))
    }

    /// Removes the topmost overlay called `name`.
    pub fn pop_overlay(&mut self, name: &str) -> Option<Box<dyn Layer>> {
        let index = self.layers[self.overlay_start..]
            .iter()
            .rposition(|layer| layer.name() == name)?;
        Some(self.layers.remove(self.overlay_start + index))
    }

    /// Iterates from the bottom of the stack to the top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &dyn Layer> {
        self.layers.iter().map(|layer| &**layer)
    }

    /// Mutably iterates from the bottom of the stack to the top.
    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut Box<dyn Layer>> {
        self.layers.iter_mut()
    }

    /// Removes every layer, top first.
    pub fn drain_top_down(&mut self) -> impl Iterator<Item = Box<dyn Layer>> + '_ {
        self.overlay_start = 0;
        self.layers.drain(..).rev()
    }

    /// The number of layers and overlays.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if the stack holds no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
