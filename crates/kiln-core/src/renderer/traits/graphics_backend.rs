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

use crate::math::LinearRgba;
use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use std::fmt::Debug;

/// The abstract graphics backend that render commands execute against.
///
/// Every method is only ever called from inside a render command, while the
/// command queue is being drained, so implementations see calls in exactly the
/// order the commands were submitted. Methods take `&self`; backends use interior
/// mutability for their resource tables.
pub trait GraphicsBackend: Send + Sync + Debug + 'static {
    /// A short name identifying the backend in logs.
    fn name(&self) -> &str;

    // --- Buffers ---

    /// Creates a buffer and fills it with `data`.
    ///
    /// ## Errors
    /// * `ResourceError::OutOfBounds` - If `data` is larger than `descriptor.size`.
    fn create_buffer(
        &self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError>;

    /// Overwrites part of a buffer starting at `offset`.
    fn write_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError>;

    /// Releases a buffer.
    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError>;

    /// Binds a vertex buffer with the layout its vertices follow.
    fn bind_vertex_buffer(
        &self,
        id: BufferId,
        layout: &VertexBufferLayout,
    ) -> Result<(), ResourceError>;

    /// Binds an index buffer for subsequent indexed draws.
    fn bind_index_buffer(&self, id: BufferId) -> Result<(), ResourceError>;

    // --- Textures ---

    /// Creates a texture, optionally uploading its initial contents.
    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
        data: Option<&[u8]>,
    ) -> Result<TextureId, ResourceError>;

    /// Replaces the full contents of a texture.
    fn write_texture(&self, id: TextureId, data: &[u8]) -> Result<(), ResourceError>;

    /// Releases a texture.
    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError>;

    /// Binds a texture to a sampler slot.
    fn bind_texture(&self, id: TextureId, slot: u32) -> Result<(), ResourceError>;

    // --- Shaders ---

    /// Compiles and links a shader program.
    ///
    /// ## Errors
    /// * `ResourceError::Shader` - If a stage fails to compile or the program fails to link.
    fn create_shader(&self, source: &ShaderSource) -> Result<ShaderId, ResourceError>;

    /// Releases a shader program.
    fn destroy_shader(&self, id: ShaderId) -> Result<(), ResourceError>;

    /// Makes a shader program current.
    fn bind_shader(&self, id: ShaderId) -> Result<(), ResourceError>;

    /// Sets a named uniform of a shader program.
    fn upload_uniform(
        &self,
        shader: ShaderId,
        name: &str,
        value: &UniformValue,
    ) -> Result<(), ResourceError>;

    // --- Framebuffers ---

    /// Creates a framebuffer with all of its attachments.
    fn create_framebuffer(
        &self,
        spec: &FramebufferSpecification,
    ) -> Result<FramebufferId, ResourceError>;

    /// Releases a framebuffer and its attachments.
    fn destroy_framebuffer(&self, id: FramebufferId) -> Result<(), ResourceError>;

    /// Binds a framebuffer as the render target, or the default target for `None`.
    fn bind_framebuffer(&self, id: Option<FramebufferId>) -> Result<(), ResourceError>;

    /// Binds color attachment `attachment` of a framebuffer to a sampler slot,
    /// so a later draw can read what an earlier pass rendered.
    ///
    /// ## Errors
    /// * `ResourceError::InvalidHandle` - If the framebuffer is unknown or has
    ///   no such color attachment.
    fn bind_color_attachment(
        &self,
        id: FramebufferId,
        attachment: u32,
        slot: u32,
    ) -> Result<(), ResourceError>;

    // --- Pipelines ---

    /// Creates a pipeline state object.
    fn create_pipeline(&self, descriptor: &PipelineDescriptor)
        -> Result<PipelineId, ResourceError>;

    /// Releases a pipeline state object.
    fn destroy_pipeline(&self, id: PipelineId) -> Result<(), ResourceError>;

    /// Makes a pipeline current.
    fn bind_pipeline(&self, id: PipelineId) -> Result<(), ResourceError>;

    // --- Drawing ---

    /// Sets the viewport of the bound render target.
    fn set_viewport(&self, viewport: Viewport);

    /// Clears the bound render target.
    fn clear(&self, color: LinearRgba);

    /// Draws `index_count` indices from the bound index buffer.
    ///
    /// ## Errors
    /// * `ResourceError::InvalidHandle` - If a required binding is missing.
    fn draw_indexed(&self, index_count: u32) -> Result<(), ResourceError>;
}
