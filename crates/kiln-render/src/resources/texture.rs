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

use super::{release, HandleSlot};
use crate::context::RenderContext;
use kiln_core::renderer::{GraphicsBackend, TextureDescriptor, TextureFormat, TextureId};

/// A two-dimensional GPU texture.
#[derive(Debug)]
pub struct Texture2D {
    ctx: RenderContext,
    slot: HandleSlot<TextureId>,
    descriptor: TextureDescriptor,
}

impl Texture2D {
    /// Queues the creation of an uninitialized texture.
    pub fn new(ctx: &RenderContext, width: u32, height: u32, format: TextureFormat) -> Self {
        Self::create(ctx, width, height, format, None)
    }

    /// Queues the creation of a texture initialized with a copy of `pixels`.
    pub fn from_pixels(
        ctx: &RenderContext,
        width: u32,
        height: u32,
        format: TextureFormat,
        pixels: &[u8],
    ) -> Self {
        Self::create(ctx, width, height, format, Some(pixels.to_vec()))
    }

    fn create(
        ctx: &RenderContext,
        width: u32,
        height: u32,
        format: TextureFormat,
        pixels: Option<Vec<u8>>,
    ) -> Self {
        let slot = HandleSlot::new();
        let descriptor = TextureDescriptor {
            label: Some("Texture2D".to_owned()),
            width,
            height,
            format,
        };

        let target = slot.clone();
        let create_descriptor = descriptor.clone();
        ctx.submit(move |backend| {
            match backend.create_texture(&create_descriptor, pixels.as_deref()) {
                Ok(id) => {
                    target.set(id);
                    log::trace!("RenderCommand: Created texture {id:?} ({width}x{height})");
                }
                Err(e) => log::error!("Failed to create {width}x{height} texture: {e}"),
            }
        });

        Self {
            ctx: ctx.clone(),
            slot,
            descriptor,
        }
    }

    /// Queues a replacement of the full texture contents.
    pub fn set_data(&self, pixels: &[u8]) {
        let pixels = pixels.to_vec();
        let slot = self.slot.clone();
        self.ctx.submit(move |backend| {
            let Some(id) = slot.get() else {
                log::warn!("Texture2D::set_data on a texture that does not exist");
                return;
            };
            if let Err(e) = backend.write_texture(id, &pixels) {
                log::error!("Failed to write texture {id:?}: {e}");
            }
        });
    }

    /// Queues binding the texture to sampler `slot`.
    pub fn bind(&self, slot: u32) {
        let texture = self.slot.clone();
        self.ctx
            .submit(move |backend| bind_texture_now(backend, &texture, slot));
    }

    /// Width in texels.
    pub fn width(&self) -> u32 {
        self.descriptor.width
    }

    /// Height in texels.
    pub fn height(&self) -> u32 {
        self.descriptor.height
    }

    /// The texel format.
    pub fn format(&self) -> TextureFormat {
        self.descriptor.format
    }

    /// The backend handle, once the creation command has run.
    pub fn handle(&self) -> Option<TextureId> {
        self.slot.get()
    }

    pub(crate) fn slot(&self) -> &HandleSlot<TextureId> {
        &self.slot
    }
}

/// Binds a texture from inside a command that is already running.
pub(crate) fn bind_texture_now(
    backend: &dyn GraphicsBackend,
    texture: &HandleSlot<TextureId>,
    slot: u32,
) {
    let Some(id) = texture.get() else {
        log::warn!("Binding a texture that does not exist to slot {slot}");
        return;
    };
    if let Err(e) = backend.bind_texture(id, slot) {
        log::error!("Failed to bind texture {id:?} to slot {slot}: {e}");
    }
}

impl Drop for Texture2D {
    fn drop(&mut self) {
        release(&self.ctx, &self.slot, "texture", |backend, id| {
            backend.destroy_texture(id)
        });
    }
}
