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
use kiln_core::renderer::{
    is_valid_framebuffer_size, FramebufferId, FramebufferSpecification, GraphicsBackend,
};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// An offscreen render target.
#[derive(Debug)]
pub struct Framebuffer {
    ctx: RenderContext,
    slot: HandleSlot<FramebufferId>,
    spec: Mutex<FramebufferSpecification>,
}

impl Framebuffer {
    /// Queues the creation of a framebuffer and its attachments.
    pub fn new(ctx: &RenderContext, spec: FramebufferSpecification) -> Self {
        let framebuffer = Self {
            ctx: ctx.clone(),
            slot: HandleSlot::new(),
            spec: Mutex::new(spec.clone()),
        };
        framebuffer.queue_recreate(spec);
        framebuffer
    }

    fn spec_lock(&self) -> MutexGuard<'_, FramebufferSpecification> {
        self.spec.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Releases the current attachments, if any, and creates them for `spec`.
    fn queue_recreate(&self, spec: FramebufferSpecification) {
        let slot = self.slot.clone();
        self.ctx.submit(move |backend| {
            if let Some(old) = slot.take() {
                if let Err(e) = backend.destroy_framebuffer(old) {
                    log::warn!("Failed to release framebuffer {old:?}: {e}");
                }
            }
            match backend.create_framebuffer(&spec) {
                Ok(id) => {
                    slot.set(id);
                    log::trace!(
                        "RenderCommand: Created framebuffer {id:?} ({}x{})",
                        spec.width,
                        spec.height
                    );
                }
                Err(e) => log::error!(
                    "Failed to create {}x{} framebuffer: {e}",
                    spec.width,
                    spec.height
                ),
            }
        });
    }

    /// Queues a recreation of the attachments at `width` x `height`.
    ///
    /// Sizes of zero or above the context's maximum framebuffer size are ignored
    /// with a warning. Returns `true` if a resize was queued.
    pub fn resize(&self, width: u32, height: u32) -> bool {
        if !is_valid_framebuffer_size(width, height, self.ctx.max_framebuffer_size()) {
            log::warn!("Invalid framebuffer size: ({width}, {height})");
            return false;
        }
        let spec = {
            let mut spec = self.spec_lock();
            spec.width = width;
            spec.height = height;
            spec.clone()
        };
        self.queue_recreate(spec);
        true
    }

    /// Queues binding the framebuffer as the render target.
    pub fn bind(&self) {
        let slot = self.slot.clone();
        self.ctx
            .submit(move |backend| bind_framebuffer_now(backend, &slot));
    }

    /// Queues restoring the default render target.
    pub fn unbind(&self) {
        self.ctx.submit(|backend| {
            if let Err(e) = backend.bind_framebuffer(None) {
                log::error!("Failed to restore the default render target: {e}");
            }
        });
    }

    /// Queues binding color attachment `attachment` to sampler `slot`.
    ///
    /// The attachment is looked up when the command runs, so a resize queued
    /// earlier in the frame is sampled at its new size.
    pub fn bind_color_attachment(&self, attachment: u32, slot: u32) {
        let handle = self.slot.clone();
        self.ctx.submit(move |backend| {
            bind_color_attachment_now(backend, &handle, attachment, slot);
        });
    }

    /// A copy of the current specification, including any queued resize.
    pub fn specification(&self) -> FramebufferSpecification {
        self.spec_lock().clone()
    }

    /// The current width and height.
    pub fn size(&self) -> (u32, u32) {
        let spec = self.spec_lock();
        (spec.width, spec.height)
    }

    /// The backend handle, once the creation command has run.
    pub fn handle(&self) -> Option<FramebufferId> {
        self.slot.get()
    }

    pub(crate) fn slot(&self) -> &HandleSlot<FramebufferId> {
        &self.slot
    }
}

/// Binds a framebuffer from inside a command that is already running.
pub(crate) fn bind_framebuffer_now(backend: &dyn GraphicsBackend, slot: &HandleSlot<FramebufferId>) {
    let Some(id) = slot.get() else {
        log::warn!("Binding a framebuffer that does not exist");
        return;
    };
    if let Err(e) = backend.bind_framebuffer(Some(id)) {
        log::error!("Failed to bind framebuffer {id:?}: {e}");
    }
}

fn bind_color_attachment_now(
    backend: &dyn GraphicsBackend,
    framebuffer: &HandleSlot<FramebufferId>,
    attachment: u32,
    slot: u32,
) {
    let Some(id) = framebuffer.get() else {
        log::warn!("Sampling color attachment {attachment} of a framebuffer that does not exist");
        return;
    };
    if let Err(e) = backend.bind_color_attachment(id, attachment, slot) {
        log::error!("Failed to bind color attachment {attachment} of {id:?} to slot {slot}: {e}");
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        release(&self.ctx, &self.slot, "framebuffer", |backend, id| {
            backend.destroy_framebuffer(id)
        });
    }
}
