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
use crate::resources::{IndexBuffer, VertexBuffer};
use kiln_core::renderer::{ShaderDataType, VertexBufferLayout};
use std::sync::Arc;

/// The vertex format used by [`Mesh`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Texture coordinate.
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// The layout matching this struct.
    pub fn layout() -> VertexBufferLayout {
        VertexBufferLayout::new([
            ("a_Position", ShaderDataType::Float3),
            ("a_TexCoord", ShaderDataType::Float2),
        ])
    }
}

/// Indexed geometry on the GPU, with an optional default material.
#[derive(Debug)]
pub struct Mesh {
    name: String,
    vertex_buffer: VertexBuffer,
    index_buffer: IndexBuffer,
    material: Option<Arc<Material>>,
}

impl Mesh {
    /// Queues uploading `vertices` and `indices`.
    pub fn new(
        ctx: &RenderContext,
        name: impl Into<String>,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Self {
        Self {
            name: name.into(),
            vertex_buffer: VertexBuffer::from_vertices(ctx, vertices, Vertex::layout()),
            index_buffer: IndexBuffer::new(ctx, indices),
            material: None,
        }
    }

    /// A quad covering the whole viewport in clip space.
    pub fn fullscreen_quad(ctx: &RenderContext) -> Self {
        const VERTICES: [Vertex; 4] = [
            Vertex {
                position: [-1.0, -1.0, 0.0],
                tex_coord: [0.0, 0.0],
            },
            Vertex {
                position: [1.0, -1.0, 0.0],
                tex_coord: [1.0, 0.0],
            },
            Vertex {
                position: [1.0, 1.0, 0.0],
                tex_coord: [1.0, 1.0],
            },
            Vertex {
                position: [-1.0, 1.0, 0.0],
                tex_coord: [0.0, 1.0],
            },
        ];
        Self::new(ctx, "FullscreenQuad", &VERTICES, &[0, 1, 2, 2, 3, 0])
    }

    /// Sets the material used when a draw does not override it.
    pub fn with_material(mut self, material: Arc<Material>) -> Self {
        self.material = Some(material);
        self
    }

    /// The mesh name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The vertex buffer.
    pub fn vertex_buffer(&self) -> &VertexBuffer {
        &self.vertex_buffer
    }

    /// The index buffer.
    pub fn index_buffer(&self) -> &IndexBuffer {
        &self.index_buffer
    }

    /// The default material, if any.
    pub fn material(&self) -> Option<&Arc<Material>> {
        self.material.as_ref()
    }
}
