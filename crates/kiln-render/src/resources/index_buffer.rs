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
use kiln_core::renderer::{BufferDescriptor, BufferId, BufferKind, BufferUsage};

/// A GPU buffer of 32-bit indices.
#[derive(Debug)]
pub struct IndexBuffer {
    ctx: RenderContext,
    slot: HandleSlot<BufferId>,
    count: u32,
}

impl IndexBuffer {
    /// Queues the creation of an index buffer holding a copy of `indices`.
    pub fn new(ctx: &RenderContext, indices: &[u32]) -> Self {
        let slot = HandleSlot::new();
        let data: Vec<u8> = bytemuck::cast_slice(indices).to_vec();
        let descriptor = BufferDescriptor {
            label: Some("IndexBuffer".to_owned()),
            kind: BufferKind::Index,
            usage: BufferUsage::Static,
            size: data.len() as u64,
        };

        let target = slot.clone();
        ctx.submit(move |backend| match backend.create_buffer(&descriptor, &data) {
            Ok(id) => {
                target.set(id);
                log::trace!("RenderCommand: Created index buffer {id:?}");
            }
            Err(e) => log::error!("Failed to create index buffer: {e}"),
        });

        Self {
            ctx: ctx.clone(),
            slot,
            count: indices.len() as u32,
        }
    }

    /// Queues binding the buffer for the next indexed draw.
    pub fn bind(&self) {
        let slot = self.slot.clone();
        self.ctx.submit(move |backend| {
            let Some(id) = slot.get() else {
                log::warn!("IndexBuffer::bind on a buffer that does not exist");
                return;
            };
            if let Err(e) = backend.bind_index_buffer(id) {
                log::error!("Failed to bind index buffer {id:?}: {e}");
            }
        });
    }

    /// The number of indices.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// The backend handle, once the creation command has run.
    pub fn handle(&self) -> Option<BufferId> {
        self.slot.get()
    }
}

impl Drop for IndexBuffer {
    fn drop(&mut self) {
        release(&self.ctx, &self.slot, "index buffer", |backend, id| {
            backend.destroy_buffer(id)
        });
    }
}
