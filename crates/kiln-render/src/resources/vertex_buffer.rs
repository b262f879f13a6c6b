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
use kiln_core::renderer::{BufferDescriptor, BufferId, BufferKind, BufferUsage, VertexBufferLayout};

/// A GPU buffer of vertex data, with the layout its vertices follow.
#[derive(Debug)]
pub struct VertexBuffer {
    ctx: RenderContext,
    slot: HandleSlot<BufferId>,
    layout: VertexBufferLayout,
    size: u64,
    usage: BufferUsage,
}

impl VertexBuffer {
    /// Queues the creation of a static vertex buffer holding a copy of `data`.
    pub fn new(ctx: &RenderContext, data: &[u8], layout: VertexBufferLayout) -> Self {
        Self::create(ctx, data.to_vec(), data.len() as u64, layout, BufferUsage::Static)
    }

    /// Queues the creation of a static vertex buffer from typed vertices.
    pub fn from_vertices<V: bytemuck::Pod>(
        ctx: &RenderContext,
        vertices: &[V],
        layout: VertexBufferLayout,
    ) -> Self {
        Self::new(ctx, bytemuck::cast_slice(vertices), layout)
    }

    /// Queues the creation of a zero-filled dynamic vertex buffer of `size` bytes,
    /// to be filled with [`set_data`](Self::set_data).
    pub fn with_size(ctx: &RenderContext, size: u64, layout: VertexBufferLayout) -> Self {
        Self::create(ctx, Vec::new(), size, layout, BufferUsage::Dynamic)
    }

    fn create(
        ctx: &RenderContext,
        data: Vec<u8>,
        size: u64,
        layout: VertexBufferLayout,
        usage: BufferUsage,
    ) -> Self {
        let slot = HandleSlot::new();
        let descriptor = BufferDescriptor {
            label: Some("VertexBuffer".to_owned()),
            kind: BufferKind::Vertex,
            usage,
            size,
        };

        let target = slot.clone();
        ctx.submit(move |backend| match backend.create_buffer(&descriptor, &data) {
            Ok(id) => {
                target.set(id);
                log::trace!("RenderCommand: Created vertex buffer {id:?} ({size} bytes)");
            }
            Err(e) => log::error!("Failed to create vertex buffer: {e}"),
        });

        Self {
            ctx: ctx.clone(),
            slot,
            layout,
            size,
            usage,
        }
    }

    /// Queues an overwrite of the buffer contents starting at `offset`.
    pub fn set_data(&self, data: &[u8], offset: u64) {
        let data = data.to_vec();
        let slot = self.slot.clone();
        self.ctx.submit(move |backend| {
            let Some(id) = slot.get() else {
                log::warn!("VertexBuffer::set_data on a buffer that does not exist");
                return;
            };
            if let Err(e) = backend.write_buffer(id, offset, &data) {
                log::error!("Failed to write vertex buffer {id:?}: {e}");
            }
        });
    }

    /// Queues binding the buffer and its layout for the next draw.
    pub fn bind(&self) {
        let slot = self.slot.clone();
        let layout = self.layout.clone();
        self.ctx.submit(move |backend| {
            let Some(id) = slot.get() else {
                log::warn!("VertexBuffer::bind on a buffer that does not exist");
                return;
            };
            if let Err(e) = backend.bind_vertex_buffer(id, &layout) {
                log::error!("Failed to bind vertex buffer {id:?}: {e}");
            }
        });
    }

    /// The vertex layout.
    pub fn layout(&self) -> &VertexBufferLayout {
        &self.layout
    }

    /// The buffer size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The usage the buffer was created with.
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// The backend handle, once the creation command has run.
    pub fn handle(&self) -> Option<BufferId> {
        self.slot.get()
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        release(&self.ctx, &self.slot, "vertex buffer", |backend, id| {
            backend.destroy_buffer(id)
        });
    }
}
