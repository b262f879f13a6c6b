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

use kiln_core::renderer::{
    FramebufferSpecification, PipelineDescriptor, RenderSettings, ShaderError, TextureFormat,
};
use kiln_infra::{BackendCall, HeadlessBackend, ResourceCounts};
use kiln_render::{
    Framebuffer, IndexBuffer, Pipeline, Renderer, Shader, Texture2D, Vertex, VertexBuffer,
};
use std::sync::Arc;

const FLAT_SHADER: &str = "#type vertex\nvoid main() {}\n#type fragment\nvoid main() {}\n";

fn setup() -> (Arc<HeadlessBackend>, Renderer) {
    let backend = Arc::new(HeadlessBackend::new());
    let settings = RenderSettings {
        queue_capacity: 64 * 1024,
        ..RenderSettings::default()
    };
    let renderer = Renderer::new(backend.clone(), settings).unwrap();
    (backend, renderer)
}

#[test]
fn test_create_then_drop_before_drain_is_net_zero() {
    let (backend, mut renderer) = setup();
    let ctx = renderer.context().clone();

    // --- 1. Create and drop every kind of resource within one frame ---
    {
        let shader = Arc::new(Shader::new(&ctx, "Flat", FLAT_SHADER).unwrap());
        let _pipeline = Pipeline::new(
            &ctx,
            PipelineDescriptor::new("Flat", Vertex::layout()),
            Arc::clone(&shader),
        );
        let _vertices = VertexBuffer::new(&ctx, &[0; 60], Vertex::layout());
        let _indices = IndexBuffer::new(&ctx, &[0, 1, 2]);
        let _texture = Texture2D::new(&ctx, 4, 4, TextureFormat::Rgba8Unorm);
        let _framebuffer = Framebuffer::new(&ctx, FramebufferSpecification::default());
    }
    assert_eq!(backend.live_resources(), ResourceCounts::default());

    // --- 2. The drain creates and then releases them, in that order ---
    renderer.wait_and_render().unwrap();
    assert_eq!(backend.live_resources(), ResourceCounts::default());

    let calls = backend.calls();
    let created = calls
        .iter()
        .position(|call| matches!(call, BackendCall::CreateBuffer(_)))
        .unwrap();
    let destroyed = calls
        .iter()
        .position(|call| matches!(call, BackendCall::DestroyBuffer(_)))
        .unwrap();
    assert!(created < destroyed);
}

#[test]
fn test_resources_live_between_drains_until_dropped() {
    let (backend, mut renderer) = setup();
    let ctx = renderer.context().clone();

    let texture = Texture2D::from_pixels(&ctx, 1, 1, TextureFormat::Rgba8Unorm, &[255; 4]);
    assert_eq!(texture.handle(), None);

    renderer.wait_and_render().unwrap();
    let id = texture.handle().unwrap();
    assert_eq!(backend.live_resources().textures, 1);

    drop(texture);
    assert_eq!(backend.live_resources().textures, 1);

    renderer.wait_and_render().unwrap();
    assert_eq!(backend.live_resources().textures, 0);
    assert_eq!(backend.calls().last(), Some(&BackendCall::DestroyTexture(id)));
}

#[test]
fn test_resource_dropped_after_shutdown_is_still_released() {
    let (backend, mut renderer) = setup();
    let ctx = renderer.context().clone();
    let buffer = VertexBuffer::new(&ctx, &[1; 20], Vertex::layout());
    renderer.wait_and_render().unwrap();
    assert_eq!(backend.live_resources().buffers, 1);

    renderer.shutdown().unwrap();
    assert_eq!(backend.live_resources().buffers, 1);

    // The last handle on the queue goes away with these, which drains it.
    drop(buffer);
    drop(ctx);
    assert_eq!(backend.live_resources(), ResourceCounts::default());
}

#[test]
fn test_shader_compile_failure_is_contained() {
    let (backend, mut renderer) = setup();
    let ctx = renderer.context().clone();

    let source = "#type vertex\nvoid main() {}\n#type pixel\nvoid frag() {}\n";
    let broken = Shader::new(&ctx, "Broken", source).unwrap();
    broken.bind();
    broken.upload_uniform("u_Color", 1.0_f32);
    let buffer = VertexBuffer::new(&ctx, &[0; 20], Vertex::layout());

    let stats = renderer.wait_and_render().unwrap();
    assert_eq!(stats.commands_executed, 4);
    assert_eq!(broken.handle(), None);
    assert!(buffer.handle().is_some());
    assert_eq!(backend.live_resources().shaders, 0);
    assert!(!backend
        .calls()
        .iter()
        .any(|call| matches!(call, BackendCall::BindShader(_))));
}

#[test]
fn test_malformed_shader_source_is_rejected_up_front() {
    let (_backend, renderer) = setup();
    let ctx = renderer.context().clone();
    let err = Shader::new(&ctx, "Geo", "#type geometry\nvoid main() {}\n").unwrap_err();
    assert!(matches!(err, ShaderError::UnknownStage { .. }));
    assert_eq!(ctx.sink().pending(), 0);
}

#[test]
fn test_shader_reload_replaces_program_only_on_success() {
    let (backend, mut renderer) = setup();
    let ctx = renderer.context().clone();
    let shader = Shader::new(&ctx, "Flat", FLAT_SHADER).unwrap();
    renderer.wait_and_render().unwrap();
    let first = shader.handle().unwrap();

    shader
        .reload("#type vertex\nvoid main() {}\n#type fragment\nvoid broken() {}\n")
        .unwrap();
    renderer.wait_and_render().unwrap();
    assert_eq!(shader.handle(), Some(first));

    shader.reload(FLAT_SHADER).unwrap();
    renderer.wait_and_render().unwrap();
    let second = shader.handle().unwrap();
    assert_ne!(first, second);
    assert_eq!(backend.live_resources().shaders, 1);
    assert!(backend.calls().contains(&BackendCall::DestroyShader(first)));
}

#[test]
fn test_framebuffer_resize_validates_and_recreates() {
    let (backend, mut renderer) = setup();
    let ctx = renderer.context().clone();
    let framebuffer = Framebuffer::new(&ctx, FramebufferSpecification::default());
    renderer.wait_and_render().unwrap();
    let first = framebuffer.handle().unwrap();

    assert!(!framebuffer.resize(0, 720));
    assert!(!framebuffer.resize(1280, 8193));
    assert_eq!(framebuffer.size(), (1280, 720));
    assert_eq!(ctx.sink().pending(), 0);

    assert!(framebuffer.resize(640, 480));
    renderer.wait_and_render().unwrap();
    let second = framebuffer.handle().unwrap();
    assert_ne!(first, second);
    assert_eq!(backend.live_resources().framebuffers, 1);
    let spec = backend.framebuffer_spec(second).unwrap();
    assert_eq!((spec.width, spec.height), (640, 480));
}

#[test]
fn test_vertex_buffer_set_data() {
    let (backend, mut renderer) = setup();
    let ctx = renderer.context().clone();
    let buffer = VertexBuffer::with_size(&ctx, 8, Vertex::layout());
    buffer.set_data(&[1, 2, 3, 4], 4);
    renderer.wait_and_render().unwrap();

    let id = buffer.handle().unwrap();
    assert_eq!(backend.buffer_data(id).unwrap(), vec![0, 0, 0, 0, 1, 2, 3, 4]);
}
