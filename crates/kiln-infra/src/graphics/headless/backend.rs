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

use kiln_core::math::LinearRgba;
use kiln_core::renderer::{
    BufferDescriptor, BufferId, BufferKind, FramebufferId, FramebufferSpecification,
    GraphicsBackend, PipelineDescriptor, PipelineId, ResourceError, ShaderError, ShaderId,
    ShaderSource, ShaderStage, TextureDescriptor, TextureId, UniformValue, VertexBufferLayout,
    Viewport,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The entry point every shader stage must define to compile.
const ENTRY_POINT: &str = "main";

/// A backend call, as recorded in the [`HeadlessBackend`] call log.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    /// `create_buffer`
    CreateBuffer(BufferId),
    /// `write_buffer`
    WriteBuffer {
        /// Target buffer.
        id: BufferId,
        /// Byte offset of the write.
        offset: u64,
        /// Number of bytes written.
        len: usize,
    },
    /// `destroy_buffer`
    DestroyBuffer(BufferId),
    /// `bind_vertex_buffer`
    BindVertexBuffer(BufferId),
    /// `bind_index_buffer`
    BindIndexBuffer(BufferId),
    /// `create_texture`
    CreateTexture(TextureId),
    /// `write_texture`
    WriteTexture(TextureId),
    /// `destroy_texture`
    DestroyTexture(TextureId),
    /// `bind_texture`
    BindTexture {
        /// Bound texture.
        id: TextureId,
        /// Sampler slot.
        slot: u32,
    },
    /// `create_shader`
    CreateShader(ShaderId),
    /// `destroy_shader`
    DestroyShader(ShaderId),
    /// `bind_shader`
    BindShader(ShaderId),
    /// `upload_uniform`
    UploadUniform {
        /// Target shader.
        shader: ShaderId,
        /// Uniform name.
        name: String,
    },
    /// `create_framebuffer`
    CreateFramebuffer(FramebufferId),
    /// `destroy_framebuffer`
    DestroyFramebuffer(FramebufferId),
    /// `bind_framebuffer`
    BindFramebuffer(Option<FramebufferId>),
    /// `bind_color_attachment`
    BindColorAttachment {
        /// Framebuffer the attachment belongs to.
        framebuffer: FramebufferId,
        /// Index among the framebuffer's color attachments.
        attachment: u32,
        /// Sampler slot.
        slot: u32,
    },
    /// `create_pipeline`
    CreatePipeline(PipelineId),
    /// `destroy_pipeline`
    DestroyPipeline(PipelineId),
    /// `bind_pipeline`
    BindPipeline(PipelineId),
    /// `set_viewport`
    SetViewport(Viewport),
    /// `clear`
    Clear(LinearRgba),
    /// `draw_indexed`
    DrawIndexed {
        /// Number of indices drawn.
        index_count: u32,
    },
}

/// The number of live resources of each kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceCounts {
    /// Live buffers.
    pub buffers: usize,
    /// Live textures.
    pub textures: usize,
    /// Live shader programs.
    pub shaders: usize,
    /// Live framebuffers.
    pub framebuffers: usize,
    /// Live pipelines.
    pub pipelines: usize,
}

impl ResourceCounts {
    /// The number of live resources of any kind.
    pub fn total(&self) -> usize {
        self.buffers + self.textures + self.shaders + self.framebuffers + self.pipelines
    }
}

#[derive(Debug)]
struct BufferEntry {
    kind: BufferKind,
    data: Vec<u8>,
}

#[derive(Debug, Default)]
struct Bindings {
    pipeline: Option<PipelineId>,
    shader: Option<ShaderId>,
    vertex_buffer: Option<BufferId>,
    index_buffer: Option<BufferId>,
    framebuffer: Option<FramebufferId>,
    textures: HashMap<u32, TextureId>,
    color_attachments: HashMap<u32, (FramebufferId, u32)>,
}

#[derive(Debug, Default)]
struct HeadlessState {
    buffers: HashMap<BufferId, BufferEntry>,
    textures: HashMap<TextureId, TextureDescriptor>,
    shaders: HashMap<ShaderId, String>,
    framebuffers: HashMap<FramebufferId, FramebufferSpecification>,
    pipelines: HashMap<PipelineId, PipelineDescriptor>,
    uniforms: HashMap<(ShaderId, String), UniformValue>,
    bindings: Bindings,
    viewport: Viewport,
    draw_calls: u64,
    calls: VecDeque<BackendCall>,
    call_log_limit: Option<usize>,
}

impl HeadlessState {
    fn record(&mut self, call: BackendCall) {
        if let Some(limit) = self.call_log_limit {
            if limit == 0 {
                return;
            }
            while self.calls.len() >= limit {
                self.calls.pop_front();
            }
        }
        self.calls.push_back(call);
    }
}

/// An in-memory graphics backend.
///
/// Every resource the renderer creates is tracked until it is destroyed, so the
/// backend can report leaks through [`live_resources`](Self::live_resources).
/// Shader compilation is simulated: a stage compiles if it defines `main`.
///
/// Every call is appended to a call log. The log is unbounded unless the
/// backend is created with [`with_call_log_limit`](Self::with_call_log_limit).
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    state: Mutex<HeadlessState>,
    next_id: AtomicUsize,
}

impl HeadlessBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty backend whose call log keeps only the most recent
    /// `limit` calls. A limit of zero disables the log.
    pub fn with_call_log_limit(limit: usize) -> Self {
        let backend = Self::default();
        backend.state().call_log_limit = Some(limit);
        backend
    }

    fn state(&self) -> MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn generate_id(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// The number of live resources of each kind.
    pub fn live_resources(&self) -> ResourceCounts {
        let state = self.state();
        ResourceCounts {
            buffers: state.buffers.len(),
            textures: state.textures.len(),
            shaders: state.shaders.len(),
            framebuffers: state.framebuffers.len(),
            pipelines: state.pipelines.len(),
        }
    }

    /// A copy of the call log, oldest call first.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.state().calls.iter().cloned().collect()
    }

    /// Returns the call log and clears it.
    pub fn take_calls(&self) -> Vec<BackendCall> {
        std::mem::take(&mut self.state().calls).into()
    }

    /// The number of successful draws since creation.
    pub fn draw_calls(&self) -> u64 {
        self.state().draw_calls
    }

    /// The current viewport.
    pub fn viewport(&self) -> Viewport {
        self.state().viewport
    }

    /// The currently bound render target, `None` for the default target.
    pub fn bound_framebuffer(&self) -> Option<FramebufferId> {
        self.state().bindings.framebuffer
    }

    /// The framebuffer color attachment bound to a sampler slot, if any.
    pub fn bound_color_attachment(&self, slot: u32) -> Option<(FramebufferId, u32)> {
        self.state().bindings.color_attachments.get(&slot).copied()
    }

    /// The last value uploaded to a shader uniform.
    pub fn uniform(&self, shader: ShaderId, name: &str) -> Option<UniformValue> {
        self.state().uniforms.get(&(shader, name.to_owned())).copied()
    }

    /// The current contents of a buffer.
    pub fn buffer_data(&self, id: BufferId) -> Option<Vec<u8>> {
        self.state().buffers.get(&id).map(|entry| entry.data.clone())
    }

    /// The specification a live framebuffer was created with.
    pub fn framebuffer_spec(&self, id: FramebufferId) -> Option<FramebufferSpecification> {
        self.state().framebuffers.get(&id).cloned()
    }

    /// The name of a live shader program.
    pub fn shader_name(&self, id: ShaderId) -> Option<String> {
        self.state().shaders.get(&id).cloned()
    }
}

fn invalid_handle(what: impl std::fmt::Debug) -> ResourceError {
    ResourceError::InvalidHandle(format!("{what:?}"))
}

fn compile_stage(name: &str, stage: ShaderStage, source: &str) -> Result<(), ShaderError> {
    if source.contains(ENTRY_POINT) {
        Ok(())
    } else {
        Err(ShaderError::CompilationError {
            label: name.to_owned(),
            details: format!("{stage} stage does not define '{ENTRY_POINT}'"),
        })
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn name(&self) -> &str {
        "headless"
    }

    fn create_buffer(
        &self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError> {
        if data.len() as u64 > descriptor.size {
            return Err(ResourceError::OutOfBounds {
                offset: 0,
                len: data.len() as u64,
                size: descriptor.size,
            });
        }
        let size = usize::try_from(descriptor.size)
            .map_err(|_| ResourceError::BackendError("buffer too large".to_owned()))?;
        let mut contents = vec![0; size];
        contents[..data.len()].copy_from_slice(data);

        let id = BufferId(self.generate_id());
        let mut state = self.state();
        state.buffers.insert(
            id,
            BufferEntry {
                kind: descriptor.kind,
                data: contents,
            },
        );
        state.record(BackendCall::CreateBuffer(id));
        log::debug!(
            "HeadlessBackend: Created {:?} buffer '{}' with ID: {id:?}, size: {} bytes",
            descriptor.kind,
            descriptor.label.as_deref().unwrap_or("unlabeled"),
            descriptor.size
        );
        Ok(id)
    }

    fn write_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError> {
        let mut state = self.state();
        let entry = state.buffers.get_mut(&id).ok_or_else(|| invalid_handle(id))?;
        let size = entry.data.len() as u64;
        let end = offset.checked_add(data.len() as u64).filter(|end| *end <= size);
        let Some(end) = end else {
            return Err(ResourceError::OutOfBounds {
                offset,
                len: data.len() as u64,
                size,
            });
        };
        entry.data[offset as usize..end as usize].copy_from_slice(data);
        state.record(BackendCall::WriteBuffer {
            id,
            offset,
            len: data.len(),
        });
        Ok(())
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        let mut state = self.state();
        state.buffers.remove(&id).ok_or_else(|| invalid_handle(id))?;
        let bindings = &mut state.bindings;
        for bound in [&mut bindings.vertex_buffer, &mut bindings.index_buffer] {
            if *bound == Some(id) {
                *bound = None;
            }
        }
        state.record(BackendCall::DestroyBuffer(id));
        log::debug!("HeadlessBackend: Destroyed buffer with ID: {id:?}");
        Ok(())
    }

    fn bind_vertex_buffer(
        &self,
        id: BufferId,
        layout: &VertexBufferLayout,
    ) -> Result<(), ResourceError> {
        let mut state = self.state();
        match state.buffers.get(&id) {
            Some(entry) if entry.kind == BufferKind::Vertex => {}
            _ => return Err(invalid_handle(id)),
        }
        log::trace!(
            "HeadlessBackend: Bound vertex buffer {id:?} (stride {})",
            layout.stride()
        );
        state.bindings.vertex_buffer = Some(id);
        state.record(BackendCall::BindVertexBuffer(id));
        Ok(())
    }

    fn bind_index_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        let mut state = self.state();
        match state.buffers.get(&id) {
            Some(entry) if entry.kind == BufferKind::Index => {}
            _ => return Err(invalid_handle(id)),
        }
        state.bindings.index_buffer = Some(id);
        state.record(BackendCall::BindIndexBuffer(id));
        Ok(())
    }

    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
        data: Option<&[u8]>,
    ) -> Result<TextureId, ResourceError> {
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(ResourceError::InvalidDimensions {
                width: descriptor.width,
                height: descriptor.height,
            });
        }
        if let Some(data) = data {
            if data.len() as u64 != descriptor.byte_size() {
                return Err(ResourceError::OutOfBounds {
                    offset: 0,
                    len: data.len() as u64,
                    size: descriptor.byte_size(),
                });
            }
        }

        let id = TextureId(self.generate_id());
        let mut state = self.state();
        state.textures.insert(id, descriptor.clone());
        state.record(BackendCall::CreateTexture(id));
        log::debug!(
            "HeadlessBackend: Created {}x{} texture with ID: {id:?}",
            descriptor.width,
            descriptor.height
        );
        Ok(id)
    }

    fn write_texture(&self, id: TextureId, data: &[u8]) -> Result<(), ResourceError> {
        let mut state = self.state();
        let descriptor = state.textures.get(&id).ok_or_else(|| invalid_handle(id))?;
        if data.len() as u64 != descriptor.byte_size() {
            return Err(ResourceError::OutOfBounds {
                offset: 0,
                len: data.len() as u64,
                size: descriptor.byte_size(),
            });
        }
        state.record(BackendCall::WriteTexture(id));
        Ok(())
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        let mut state = self.state();
        state.textures.remove(&id).ok_or_else(|| invalid_handle(id))?;
        state.bindings.textures.retain(|_, bound| *bound != id);
        state.record(BackendCall::DestroyTexture(id));
        log::debug!("HeadlessBackend: Destroyed texture with ID: {id:?}");
        Ok(())
    }

    fn bind_texture(&self, id: TextureId, slot: u32) -> Result<(), ResourceError> {
        let mut state = self.state();
        if !state.textures.contains_key(&id) {
            return Err(invalid_handle(id));
        }
        state.bindings.textures.insert(slot, id);
        state.bindings.color_attachments.remove(&slot);
        state.record(BackendCall::BindTexture { id, slot });
        Ok(())
    }

    fn create_shader(&self, source: &ShaderSource) -> Result<ShaderId, ResourceError> {
        compile_stage(&source.name, ShaderStage::Vertex, &source.vertex)?;
        compile_stage(&source.name, ShaderStage::Fragment, &source.fragment)?;

        let id = ShaderId(self.generate_id());
        let mut state = self.state();
        state.shaders.insert(id, source.name.clone());
        state.record(BackendCall::CreateShader(id));
        log::debug!(
            "HeadlessBackend: Linked shader '{}' with ID: {id:?}",
            source.name
        );
        Ok(id)
    }

    fn destroy_shader(&self, id: ShaderId) -> Result<(), ResourceError> {
        let mut state = self.state();
        state.shaders.remove(&id).ok_or_else(|| invalid_handle(id))?;
        state.uniforms.retain(|(shader, _), _| *shader != id);
        if state.bindings.shader == Some(id) {
            state.bindings.shader = None;
        }
        state.record(BackendCall::DestroyShader(id));
        log::debug!("HeadlessBackend: Destroyed shader with ID: {id:?}");
        Ok(())
    }

    fn bind_shader(&self, id: ShaderId) -> Result<(), ResourceError> {
        let mut state = self.state();
        if !state.shaders.contains_key(&id) {
            return Err(invalid_handle(id));
        }
        state.bindings.shader = Some(id);
        state.record(BackendCall::BindShader(id));
        Ok(())
    }

    fn upload_uniform(
        &self,
        shader: ShaderId,
        name: &str,
        value: &UniformValue,
    ) -> Result<(), ResourceError> {
        let mut state = self.state();
        if !state.shaders.contains_key(&shader) {
            return Err(invalid_handle(shader));
        }
        state.uniforms.insert((shader, name.to_owned()), *value);
        state.record(BackendCall::UploadUniform {
            shader,
            name: name.to_owned(),
        });
        Ok(())
    }

    fn create_framebuffer(
        &self,
        spec: &FramebufferSpecification,
    ) -> Result<FramebufferId, ResourceError> {
        if spec.width == 0 || spec.height == 0 {
            return Err(ResourceError::InvalidDimensions {
                width: spec.width,
                height: spec.height,
            });
        }
        let id = FramebufferId(self.generate_id());
        let mut state = self.state();
        state.framebuffers.insert(id, spec.clone());
        state.record(BackendCall::CreateFramebuffer(id));
        log::debug!(
            "HeadlessBackend: Created {}x{} framebuffer with ID: {id:?}",
            spec.width,
            spec.height
        );
        Ok(id)
    }

    fn destroy_framebuffer(&self, id: FramebufferId) -> Result<(), ResourceError> {
        let mut state = self.state();
        state.framebuffers.remove(&id).ok_or_else(|| invalid_handle(id))?;
        if state.bindings.framebuffer == Some(id) {
            state.bindings.framebuffer = None;
        }
        state
            .bindings
            .color_attachments
            .retain(|_, (framebuffer, _)| *framebuffer != id);
        state.record(BackendCall::DestroyFramebuffer(id));
        log::debug!("HeadlessBackend: Destroyed framebuffer with ID: {id:?}");
        Ok(())
    }

    fn bind_framebuffer(&self, id: Option<FramebufferId>) -> Result<(), ResourceError> {
        let mut state = self.state();
        if let Some(id) = id {
            if !state.framebuffers.contains_key(&id) {
                return Err(invalid_handle(id));
            }
        }
        state.bindings.framebuffer = id;
        state.record(BackendCall::BindFramebuffer(id));
        Ok(())
    }

    fn bind_color_attachment(
        &self,
        id: FramebufferId,
        attachment: u32,
        slot: u32,
    ) -> Result<(), ResourceError> {
        let mut state = self.state();
        let spec = state.framebuffers.get(&id).ok_or_else(|| invalid_handle(id))?;
        if attachment as usize >= spec.color_attachment_count() {
            return Err(ResourceError::InvalidHandle(format!(
                "{id:?} has no color attachment {attachment}"
            )));
        }
        state.bindings.textures.remove(&slot);
        state.bindings.color_attachments.insert(slot, (id, attachment));
        state.record(BackendCall::BindColorAttachment {
            framebuffer: id,
            attachment,
            slot,
        });
        Ok(())
    }

    fn create_pipeline(
        &self,
        descriptor: &PipelineDescriptor,
    ) -> Result<PipelineId, ResourceError> {
        let id = PipelineId(self.generate_id());
        let mut state = self.state();
        state.pipelines.insert(id, descriptor.clone());
        state.record(BackendCall::CreatePipeline(id));
        log::debug!(
            "HeadlessBackend: Created pipeline '{}' with ID: {id:?}",
            descriptor.label.as_deref().unwrap_or("unlabeled")
        );
        Ok(id)
    }

    fn destroy_pipeline(&self, id: PipelineId) -> Result<(), ResourceError> {
        let mut state = self.state();
        state.pipelines.remove(&id).ok_or_else(|| invalid_handle(id))?;
        if state.bindings.pipeline == Some(id) {
            state.bindings.pipeline = None;
        }
        state.record(BackendCall::DestroyPipeline(id));
        log::debug!("HeadlessBackend: Destroyed pipeline with ID: {id:?}");
        Ok(())
    }

    fn bind_pipeline(&self, id: PipelineId) -> Result<(), ResourceError> {
        let mut state = self.state();
        if !state.pipelines.contains_key(&id) {
            return Err(invalid_handle(id));
        }
        state.bindings.pipeline = Some(id);
        state.record(BackendCall::BindPipeline(id));
        Ok(())
    }

    fn set_viewport(&self, viewport: Viewport) {
        let mut state = self.state();
        state.viewport = viewport;
        state.record(BackendCall::SetViewport(viewport));
    }

    fn clear(&self, color: LinearRgba) {
        self.state().record(BackendCall::Clear(color));
    }

    fn draw_indexed(&self, index_count: u32) -> Result<(), ResourceError> {
        let mut state = self.state();
        if state.bindings.shader.is_none() || state.bindings.vertex_buffer.is_none() {
            return Err(ResourceError::InvalidHandle(
                "draw_indexed without a bound shader and vertex buffer".to_owned(),
            ));
        }
        let index_buffer = state
            .bindings
            .index_buffer
            .and_then(|id| state.buffers.get(&id))
            .ok_or_else(|| {
                ResourceError::InvalidHandle("draw_indexed without a bound index buffer".to_owned())
            })?;

        let available = index_buffer.data.len() as u64 / 4;
        if u64::from(index_count) > available {
            return Err(ResourceError::OutOfBounds {
                offset: 0,
                len: u64::from(index_count) * 4,
                size: index_buffer.data.len() as u64,
            });
        }

        state.draw_calls += 1;
        state.record(BackendCall::DrawIndexed { index_count });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::renderer::{BufferUsage, ShaderDataType, TextureFormat};

    fn vertex_descriptor(size: u64) -> BufferDescriptor {
        BufferDescriptor {
            label: Some("test_vb".to_owned()),
            kind: BufferKind::Vertex,
            usage: BufferUsage::Static,
            size,
        }
    }

    fn index_descriptor(count: u64) -> BufferDescriptor {
        BufferDescriptor {
            label: None,
            kind: BufferKind::Index,
            usage: BufferUsage::Static,
            size: count * 4,
        }
    }

    fn shader_source(fragment: &str) -> ShaderSource {
        ShaderSource {
            name: "Test".to_owned(),
            vertex: "void main() {}".to_owned(),
            fragment: fragment.to_owned(),
        }
    }

    #[test]
    fn create_and_destroy_tracks_live_resources() {
        let backend = HeadlessBackend::new();
        let buffer = backend.create_buffer(&vertex_descriptor(16), &[1; 16]).unwrap();
        let texture = backend
            .create_texture(
                &TextureDescriptor {
                    label: None,
                    width: 1,
                    height: 1,
                    format: TextureFormat::Rgba8Unorm,
                },
                Some(&[255; 4]),
            )
            .unwrap();
        assert_eq!(backend.live_resources().total(), 2);
        assert_ne!(buffer.0, texture.0);

        backend.destroy_buffer(buffer).unwrap();
        backend.destroy_texture(texture).unwrap();
        assert_eq!(backend.live_resources(), ResourceCounts::default());

        assert!(matches!(
            backend.destroy_buffer(buffer),
            Err(ResourceError::InvalidHandle(_))
        ));
    }

    #[test]
    fn write_buffer_is_bounds_checked() {
        let backend = HeadlessBackend::new();
        let buffer = backend.create_buffer(&vertex_descriptor(8), &[]).unwrap();

        backend.write_buffer(buffer, 4, &[9, 9, 9, 9]).unwrap();
        assert_eq!(backend.buffer_data(buffer).unwrap(), vec![0, 0, 0, 0, 9, 9, 9, 9]);

        assert_eq!(
            backend.write_buffer(buffer, 6, &[1, 2, 3]),
            Err(ResourceError::OutOfBounds {
                offset: 6,
                len: 3,
                size: 8
            })
        );
    }

    #[test]
    fn shader_without_entry_point_fails_to_compile() {
        let backend = HeadlessBackend::new();
        let err = backend.create_shader(&shader_source("void frag() {}")).unwrap_err();
        assert!(matches!(
            err,
            ResourceError::Shader(ShaderError::CompilationError { .. })
        ));
        assert_eq!(backend.live_resources().shaders, 0);

        let id = backend.create_shader(&shader_source("void main() {}")).unwrap();
        assert_eq!(backend.shader_name(id).as_deref(), Some("Test"));
    }

    #[test]
    fn draw_requires_bindings_and_enough_indices() {
        let backend = HeadlessBackend::new();
        assert!(backend.draw_indexed(3).is_err());

        let layout = VertexBufferLayout::new([("a_Position", ShaderDataType::Float3)]);
        let shader = backend.create_shader(&shader_source("void main() {}")).unwrap();
        let vertices = backend.create_buffer(&vertex_descriptor(36), &[0; 36]).unwrap();
        let indices = backend.create_buffer(&index_descriptor(3), &[0; 12]).unwrap();

        backend.bind_shader(shader).unwrap();
        backend.bind_vertex_buffer(vertices, &layout).unwrap();
        assert!(backend.bind_index_buffer(vertices).is_err());
        backend.bind_index_buffer(indices).unwrap();

        backend.draw_indexed(3).unwrap();
        assert!(matches!(
            backend.draw_indexed(6),
            Err(ResourceError::OutOfBounds { .. })
        ));
        assert_eq!(backend.draw_calls(), 1);
    }

    #[test]
    fn call_log_preserves_order() {
        let backend = HeadlessBackend::new();
        let target = backend
            .create_framebuffer(&FramebufferSpecification::default())
            .unwrap();
        backend.bind_framebuffer(Some(target)).unwrap();
        backend.set_viewport(Viewport::from_size(1280, 720));
        backend.clear(LinearRgba::BLACK);
        backend.bind_framebuffer(None).unwrap();

        assert_eq!(
            backend.take_calls(),
            vec![
                BackendCall::CreateFramebuffer(target),
                BackendCall::BindFramebuffer(Some(target)),
                BackendCall::SetViewport(Viewport::from_size(1280, 720)),
                BackendCall::Clear(LinearRgba::BLACK),
                BackendCall::BindFramebuffer(None),
            ]
        );
        assert!(backend.calls().is_empty());
        assert_eq!(backend.bound_framebuffer(), None);
    }

    #[test]
    fn call_log_limit_keeps_the_most_recent_calls() {
        let backend = HeadlessBackend::with_call_log_limit(3);
        for width in 1..=10 {
            backend.set_viewport(Viewport::from_size(width, 1));
        }
        assert_eq!(
            backend.calls(),
            vec![
                BackendCall::SetViewport(Viewport::from_size(8, 1)),
                BackendCall::SetViewport(Viewport::from_size(9, 1)),
                BackendCall::SetViewport(Viewport::from_size(10, 1)),
            ]
        );
        assert_eq!(backend.viewport(), Viewport::from_size(10, 1));

        let silent = HeadlessBackend::with_call_log_limit(0);
        silent.clear(LinearRgba::BLACK);
        assert!(silent.take_calls().is_empty());
    }

    #[test]
    fn color_attachments_are_sampled_by_index() {
        let backend = HeadlessBackend::new();
        let target = backend
            .create_framebuffer(&FramebufferSpecification::default())
            .unwrap();

        backend.bind_color_attachment(target, 0, 0).unwrap();
        assert_eq!(backend.bound_color_attachment(0), Some((target, 0)));
        // The default specification has one color attachment plus depth.
        assert!(matches!(
            backend.bind_color_attachment(target, 1, 0),
            Err(ResourceError::InvalidHandle(_))
        ));

        backend.destroy_framebuffer(target).unwrap();
        assert_eq!(backend.bound_color_attachment(0), None);
        assert!(backend.bind_color_attachment(target, 0, 0).is_err());
    }
}
