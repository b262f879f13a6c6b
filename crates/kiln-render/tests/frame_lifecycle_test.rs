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

use kiln_core::math::{LinearRgba, Mat4, Vec3};
use kiln_core::renderer::{
    FramebufferSpecification, LoadOp, PipelineDescriptor, QueueError, RenderError,
    RenderSettings, TextureFormat, UniformValue, Viewport,
};
use kiln_infra::{BackendCall, HeadlessBackend};
use kiln_render::{
    Framebuffer, Material, Mesh, Pipeline, RenderPass, Renderer, SceneCamera, SceneRenderer,
    Shader, Texture2D, Vertex,
};
use std::sync::{Arc, Mutex};

const FLAT_SHADER: &str = "#type vertex\nvoid main() {}\n#type fragment\nuniform vec4 u_Color;\nvoid main() {}\n";

const TRIANGLE: [Vertex; 3] = [
    Vertex {
        position: [0.0, 0.5, 0.0],
        tex_coord: [0.5, 1.0],
    },
    Vertex {
        position: [-0.5, -0.5, 0.0],
        tex_coord: [0.0, 0.0],
    },
    Vertex {
        position: [0.5, -0.5, 0.0],
        tex_coord: [1.0, 0.0],
    },
];

struct Scene {
    backend: Arc<HeadlessBackend>,
    renderer: Renderer,
    shader: Arc<Shader>,
    pipeline: Arc<Pipeline>,
    material: Arc<Material>,
    mesh: Arc<Mesh>,
    pass: Arc<RenderPass>,
}

fn setup() -> Scene {
    let backend = Arc::new(HeadlessBackend::new());
    let settings = RenderSettings {
        queue_capacity: 64 * 1024,
        ..RenderSettings::default()
    };
    let mut renderer = Renderer::new(backend.clone(), settings).unwrap();
    renderer.init().unwrap();
    let ctx = renderer.context().clone();

    let shader = Arc::new(Shader::new(&ctx, "Flat", FLAT_SHADER).unwrap());
    let pipeline = Arc::new(Pipeline::new(
        &ctx,
        PipelineDescriptor::new("Flat", Vertex::layout()),
        Arc::clone(&shader),
    ));
    let material = Arc::new(Material::new("Red", Arc::clone(&shader)));
    material.set("u_Color", LinearRgba::rgb(1.0, 0.0, 0.0).to_vec4());
    let mesh = Arc::new(
        Mesh::new(&ctx, "Triangle", &TRIANGLE, &[0, 1, 2]).with_material(Arc::clone(&material)),
    );
    let target = Arc::new(Framebuffer::new(
        &ctx,
        FramebufferSpecification {
            width: 320,
            height: 240,
            ..FramebufferSpecification::default()
        },
    ));
    let pass = Arc::new(RenderPass::new("Main", target, LoadOp::Clear(LinearRgba::BLACK)));

    // Start-up frame: every resource above exists afterwards.
    renderer.wait_and_render().unwrap();
    backend.take_calls();

    Scene {
        backend,
        renderer,
        shader,
        pipeline,
        material,
        mesh,
        pass,
    }
}

#[test]
fn test_submit_mesh_records_commands_in_order() {
    let mut scene = setup();
    let transform = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));

    scene.renderer.begin_render_pass(&scene.pass).unwrap();
    scene
        .renderer
        .submit_mesh(&scene.mesh, transform, &scene.pipeline, None)
        .unwrap();
    scene.renderer.end_render_pass().unwrap();

    // Nothing reaches the backend before the drain.
    assert!(scene.backend.calls().is_empty());

    let stats = scene.renderer.wait_and_render().unwrap();
    assert_eq!(stats.draw_calls, 1);

    let shader = scene.shader.handle().unwrap();
    assert_eq!(
        scene.backend.take_calls(),
        vec![
            BackendCall::BindFramebuffer(scene.pass.target().handle()),
            BackendCall::SetViewport(Viewport::from_size(320, 240)),
            BackendCall::Clear(LinearRgba::BLACK),
            BackendCall::BindPipeline(scene.pipeline.handle().unwrap()),
            BackendCall::BindVertexBuffer(scene.mesh.vertex_buffer().handle().unwrap()),
            BackendCall::BindIndexBuffer(scene.mesh.index_buffer().handle().unwrap()),
            BackendCall::BindShader(shader),
            BackendCall::UploadUniform {
                shader,
                name: "u_Color".to_owned()
            },
            BackendCall::UploadUniform {
                shader,
                name: "u_Transform".to_owned()
            },
            BackendCall::DrawIndexed { index_count: 3 },
            BackendCall::BindFramebuffer(None),
        ]
    );
    assert_eq!(
        scene.backend.uniform(shader, "u_Transform"),
        Some(UniformValue::Mat4(transform))
    );
}

#[test]
fn test_pass_protocol_violations_are_errors() {
    let mut scene = setup();
    let other = Arc::new(RenderPass::new(
        "Other",
        Arc::clone(scene.pass.target()),
        LoadOp::Load,
    ));

    assert!(matches!(
        scene.renderer.end_render_pass(),
        Err(RenderError::NoActivePass)
    ));
    assert!(matches!(
        scene
            .renderer
            .submit_mesh(&scene.mesh, Mat4::IDENTITY, &scene.pipeline, None),
        Err(RenderError::NoActivePass)
    ));

    scene.renderer.begin_render_pass(&scene.pass).unwrap();
    match scene.renderer.begin_render_pass(&other) {
        Err(RenderError::PassAlreadyActive { active, requested }) => {
            assert_eq!(active, "Main");
            assert_eq!(requested, "Other");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(scene.renderer.active_pass().unwrap().label(), "Main");
    scene.renderer.end_render_pass().unwrap();
    assert!(scene.renderer.active_pass().is_none());
}

#[test]
fn test_wait_and_render_counts_frames_in_any_pass_state() {
    let mut scene = setup();
    assert_eq!(scene.renderer.frame_number(), 1);

    let stats = scene.renderer.wait_and_render().unwrap();
    assert_eq!(stats.frame_number, 2);
    assert_eq!(stats.commands_executed, 0);
    assert_eq!(stats.bytes_used, 0);

    scene.renderer.begin_render_pass(&scene.pass).unwrap();
    let stats = scene.renderer.wait_and_render().unwrap();
    assert_eq!(stats.frame_number, 3);
    assert_eq!(stats.commands_executed, 2);
    assert!(stats.peak_bytes_used >= stats.bytes_used);
    assert!(scene.renderer.active_pass().is_some());
}

#[test]
fn test_commands_run_in_submission_order_across_sources() {
    let mut scene = setup();
    let order = Arc::new(Mutex::new(Vec::new()));
    let sink = scene.renderer.context().sink().clone();

    for marker in 0..5 {
        let order = Arc::clone(&order);
        sink.submit(move || order.lock().unwrap().push(marker));
    }
    let tail = Arc::clone(&order);
    scene
        .renderer
        .submit(move |_backend| tail.lock().unwrap().push(5));

    scene.renderer.wait_and_render().unwrap();
    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn test_fullscreen_quad_binds_texture_to_slot_zero() {
    let mut scene = setup();
    let ctx = scene.renderer.context().clone();
    let texture = Texture2D::new(&ctx, 2, 2, TextureFormat::Rgba8Unorm);
    scene.renderer.wait_and_render().unwrap();
    scene.backend.take_calls();

    assert!(matches!(
        scene.renderer.submit_fullscreen_quad(&texture),
        Err(RenderError::NoActivePass)
    ));
    scene.renderer.begin_render_pass(&scene.pass).unwrap();
    scene.renderer.submit_fullscreen_quad(&texture).unwrap();
    scene.renderer.end_render_pass().unwrap();
    let stats = scene.renderer.wait_and_render().unwrap();

    assert_eq!(stats.draw_calls, 1);
    let calls = scene.backend.calls();
    assert!(calls.contains(&BackendCall::BindTexture {
        id: texture.handle().unwrap(),
        slot: 0
    }));
    assert!(calls.contains(&BackendCall::DrawIndexed { index_count: 6 }));
}

#[test]
fn test_window_resize_updates_viewport() {
    let mut scene = setup();
    scene.renderer.on_window_resize(0, 0);
    scene.renderer.on_window_resize(800, 600);
    scene.renderer.wait_and_render().unwrap();

    assert_eq!(scene.renderer.viewport(), Viewport::from_size(800, 600));
    assert_eq!(scene.backend.viewport(), Viewport::from_size(800, 600));
    assert_eq!(
        scene.backend.calls(),
        vec![BackendCall::SetViewport(Viewport::from_size(800, 600))]
    );
}

#[test]
fn test_draining_from_inside_a_command_is_rejected() {
    let mut scene = setup();
    let sink = scene.renderer.context().sink().clone();
    let result = Arc::new(Mutex::new(None));

    let observed = Arc::clone(&result);
    let inner = sink.clone();
    sink.submit(move || *observed.lock().unwrap() = Some(inner.drain()));
    scene.renderer.wait_and_render().unwrap();

    assert_eq!(
        *result.lock().unwrap(),
        Some(Err(QueueError::ReentrantExecute))
    );
}

#[test]
fn test_scene_renderer_flushes_draw_list_through_geometry_pass() {
    let mut scene = setup();
    let ctx = scene.renderer.context().clone();
    let mut scene_renderer =
        SceneRenderer::new(&ctx, Arc::clone(&scene.pipeline), 640, 360, LinearRgba::BLACK);
    scene.renderer.wait_and_render().unwrap();
    scene.backend.take_calls();

    let override_material = Arc::new(Material::new("Blue", Arc::clone(&scene.shader)));
    let camera = SceneCamera {
        projection: Mat4::from_scale(Vec3::new(2.0, 2.0, 1.0)),
        view: Mat4::IDENTITY,
    };

    assert!(matches!(
        scene_renderer.submit_mesh(Arc::clone(&scene.mesh), Mat4::IDENTITY, None),
        Err(RenderError::NoActiveScene)
    ));

    scene_renderer.begin_scene(camera).unwrap();
    assert!(matches!(
        scene_renderer.begin_scene(camera),
        Err(RenderError::SceneAlreadyActive)
    ));
    scene_renderer
        .submit_mesh(Arc::clone(&scene.mesh), Mat4::IDENTITY, None)
        .unwrap();
    scene_renderer
        .submit_mesh(
            Arc::clone(&scene.mesh),
            Mat4::IDENTITY,
            Some(Arc::clone(&override_material)),
        )
        .unwrap();
    assert_eq!(scene_renderer.draw_count(), 2);

    scene_renderer.end_scene(&mut scene.renderer).unwrap();
    assert_eq!(scene_renderer.draw_count(), 0);
    assert!(!scene_renderer.is_scene_active());
    assert!(scene.renderer.active_pass().is_none());

    let stats = scene.renderer.wait_and_render().unwrap();
    // Two meshes plus the composite quad.
    assert_eq!(stats.draw_calls, 3);
    assert_eq!(
        scene.material.get("u_ViewProjection"),
        Some(UniformValue::Mat4(camera.view_projection()))
    );
    assert_eq!(
        override_material.get("u_ViewProjection"),
        Some(UniformValue::Mat4(camera.view_projection()))
    );
    assert_eq!(
        scene.backend.calls().first(),
        Some(&BackendCall::BindFramebuffer(
            scene_renderer.geometry_pass().target().handle()
        ))
    );

    assert!(matches!(
        scene_renderer.end_scene(&mut scene.renderer),
        Err(RenderError::NoActiveScene)
    ));
}

#[test]
fn test_scene_composites_geometry_into_final_framebuffer() {
    let mut scene = setup();
    let ctx = scene.renderer.context().clone();
    let mut scene_renderer =
        SceneRenderer::new(&ctx, Arc::clone(&scene.pipeline), 640, 360, LinearRgba::BLACK);
    scene.renderer.wait_and_render().unwrap();
    scene.backend.take_calls();

    let geometry = scene_renderer.geometry_pass().target().handle().unwrap();
    let composite = scene_renderer.final_framebuffer().handle().unwrap();
    assert_ne!(geometry, composite);
    assert!(Arc::ptr_eq(
        scene_renderer.final_framebuffer(),
        scene_renderer.composite_pass().target()
    ));

    scene_renderer.begin_scene(SceneCamera::default()).unwrap();
    scene_renderer
        .submit_mesh(Arc::clone(&scene.mesh), Mat4::IDENTITY, None)
        .unwrap();
    scene_renderer.end_scene(&mut scene.renderer).unwrap();
    scene.renderer.wait_and_render().unwrap();

    let passes: Vec<BackendCall> = scene
        .backend
        .calls()
        .into_iter()
        .filter(|call| {
            matches!(
                call,
                BackendCall::BindFramebuffer(_)
                    | BackendCall::BindColorAttachment { .. }
                    | BackendCall::DrawIndexed { .. }
            )
        })
        .collect();
    assert_eq!(
        passes,
        vec![
            BackendCall::BindFramebuffer(Some(geometry)),
            BackendCall::DrawIndexed { index_count: 3 },
            BackendCall::BindFramebuffer(None),
            BackendCall::BindFramebuffer(Some(composite)),
            BackendCall::BindColorAttachment {
                framebuffer: geometry,
                attachment: 0,
                slot: 0
            },
            BackendCall::DrawIndexed { index_count: 6 },
            BackendCall::BindFramebuffer(None),
        ]
    );
}

#[test]
fn test_scene_viewport_resize_recreates_both_targets() {
    let mut scene = setup();
    let ctx = scene.renderer.context().clone();
    let scene_renderer =
        SceneRenderer::new(&ctx, Arc::clone(&scene.pipeline), 640, 360, LinearRgba::BLACK);
    scene.renderer.wait_and_render().unwrap();

    scene_renderer.set_viewport_size(800, 600);
    scene.renderer.wait_and_render().unwrap();

    for target in [
        scene_renderer.geometry_pass().target(),
        scene_renderer.final_framebuffer(),
    ] {
        let spec = scene.backend.framebuffer_spec(target.handle().unwrap()).unwrap();
        assert_eq!((spec.width, spec.height), (800, 600));
    }
}

#[test]
fn test_shutdown_drains_pending_destroys() {
    let scene = setup();
    let Scene {
        backend,
        renderer,
        shader,
        pipeline,
        material,
        mesh,
        pass,
    } = scene;
    assert!(backend.live_resources().total() > 0);

    drop((pipeline, material, mesh, pass, shader));
    let stats = renderer.shutdown().unwrap();
    assert!(stats.commands_executed > 0);
    assert_eq!(backend.live_resources().total(), 0);
}
