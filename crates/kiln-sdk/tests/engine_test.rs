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

use anyhow::{bail, Result};
use kiln_sdk::prelude::*;
use std::sync::{Arc, Mutex};

const FLAT_SHADER: &str = "#type vertex\nvoid main() {}\n#type fragment\nvoid main() {}\n";

type Journal = Arc<Mutex<Vec<String>>>;

/// Records every hook call and draws one triangle per frame.
struct TriangleLayer {
    name: &'static str,
    journal: Journal,
    resources: Option<(Arc<Pipeline>, Mesh, Arc<RenderPass>)>,
}

impl TriangleLayer {
    fn new(name: &'static str, journal: &Journal) -> Box<Self> {
        Box::new(Self {
            name,
            journal: Arc::clone(journal),
            resources: None,
        })
    }

    fn log(&self, event: &str) {
        self.journal
            .lock()
            .unwrap()
            .push(format!("{}:{event}", self.name));
    }
}

impl Layer for TriangleLayer {
    fn name(&self) -> &str {
        self.name
    }

    fn on_attach(&mut self, renderer: &mut Renderer) -> Result<()> {
        self.log("attach");
        let ctx = renderer.context().clone();
        let shader = Arc::new(Shader::new(&ctx, self.name, FLAT_SHADER)?);
        let pipeline = Arc::new(Pipeline::new(
            &ctx,
            PipelineDescriptor::new(self.name, Vertex::layout()),
            Arc::clone(&shader),
        ));
        let material = Arc::new(Material::new(self.name, shader));
        let vertices = [Vertex {
            position: [0.0; 3],
            tex_coord: [0.0; 2],
        }; 3];
        let mesh = Mesh::new(&ctx, self.name, &vertices, &[0, 1, 2]).with_material(material);
        let target = Arc::new(Framebuffer::new(&ctx, FramebufferSpecification::default()));
        let pass = Arc::new(RenderPass::new(self.name, target, LoadOp::Load));
        self.resources = Some((pipeline, mesh, pass));
        Ok(())
    }

    fn on_update(&mut self, frame: &mut FrameContext<'_>) -> Result<()> {
        self.log("update");
        if let Some((pipeline, mesh, pass)) = &self.resources {
            frame.renderer.begin_render_pass(pass)?;
            frame
                .renderer
                .submit_mesh(mesh, Mat4::IDENTITY, pipeline, None)?;
            frame.renderer.end_render_pass()?;
        }
        Ok(())
    }

    fn on_detach(&mut self) {
        self.log("detach");
        self.resources = None;
    }
}

struct FailingLayer;

impl Layer for FailingLayer {
    fn name(&self) -> &str {
        "Failing"
    }

    fn on_update(&mut self, _frame: &mut FrameContext<'_>) -> Result<()> {
        bail!("simulation diverged")
    }
}

/// Opens a render pass every frame and fails mid-pass while `failures` is non-zero.
struct MidPassLayer {
    failures: u32,
    seen: Arc<Mutex<Vec<u64>>>,
    pass: Option<Arc<RenderPass>>,
}

impl MidPassLayer {
    fn new(failures: u32, seen: &Arc<Mutex<Vec<u64>>>) -> Box<Self> {
        Box::new(Self {
            failures,
            seen: Arc::clone(seen),
            pass: None,
        })
    }
}

impl Layer for MidPassLayer {
    fn name(&self) -> &str {
        "MidPass"
    }

    fn on_attach(&mut self, renderer: &mut Renderer) -> Result<()> {
        let ctx = renderer.context();
        let target = Arc::new(Framebuffer::new(ctx, FramebufferSpecification::default()));
        self.pass = Some(Arc::new(RenderPass::new(
            "Mid",
            target,
            LoadOp::Clear(LinearRgba::BLACK),
        )));
        Ok(())
    }

    fn on_update(&mut self, frame: &mut FrameContext<'_>) -> Result<()> {
        self.seen.lock().unwrap().push(frame.frame_number);
        let Some(pass) = &self.pass else {
            return Ok(());
        };
        frame.renderer.begin_render_pass(pass)?;
        if self.failures > 0 {
            self.failures -= 1;
            bail!("transient failure mid-pass");
        }
        frame.renderer.end_render_pass()?;
        Ok(())
    }
}

fn engine() -> (Arc<HeadlessBackend>, Engine) {
    let backend = Arc::new(HeadlessBackend::new());
    let settings = RenderSettings {
        queue_capacity: 256 * 1024,
        ..RenderSettings::default()
    };
    let engine = Engine::new(backend.clone(), settings).unwrap();
    (backend, engine)
}

#[test]
fn test_start_up_frame_is_rendered_by_new() {
    let (backend, engine) = engine();
    assert_eq!(engine.renderer().frame_number(), 1);
    assert!(engine.last_frame().commands_executed > 0);
    // The renderer's own fullscreen quad resources exist.
    assert!(backend.live_resources().total() > 0);
}

#[test]
fn test_layers_update_bottom_up_with_one_drain_per_frame() {
    let (backend, mut engine) = engine();
    let journal = Journal::default();

    engine.push_overlay(TriangleLayer::new("Hud", &journal)).unwrap();
    engine.push_layer(TriangleLayer::new("World", &journal)).unwrap();

    let stats = engine.run_frame(Timestep::from_seconds(0.016)).unwrap();
    assert_eq!(stats.frame_number, 2);
    assert_eq!(stats.draw_calls, 2);
    assert_eq!(backend.draw_calls(), 2);

    let stats = engine.run(3, Timestep::from_seconds(0.016)).unwrap();
    assert_eq!(stats.frame_number, 5);
    assert_eq!(stats.draw_calls, 2);

    let updates: Vec<String> = journal
        .lock()
        .unwrap()
        .iter()
        .filter(|entry| entry.ends_with(":update"))
        .take(2)
        .cloned()
        .collect();
    assert_eq!(updates, vec!["World:update", "Hud:update"]);
}

#[test]
fn test_failing_layer_stops_the_frame() {
    let (_backend, mut engine) = engine();
    engine.push_layer(Box::new(FailingLayer)).unwrap();

    let err = engine
        .run_frame(Timestep::from_seconds(0.016))
        .unwrap_err();
    assert!(format!("{err:#}").contains("simulation diverged"));
    assert_eq!(engine.renderer().frame_number(), 1);
}

#[test]
fn test_failure_mid_pass_aborts_the_frame() {
    let (backend, mut engine) = engine();
    let seen = Arc::new(Mutex::new(Vec::new()));
    engine.push_layer(MidPassLayer::new(1, &seen)).unwrap();

    let err = engine
        .run_frame(Timestep::from_seconds(0.016))
        .unwrap_err();
    assert!(format!("{err:#}").contains("transient failure mid-pass"));
    assert!(engine.renderer().active_pass().is_none());
    assert_eq!(engine.renderer().context().sink().pending(), 0);
    assert_eq!(backend.bound_framebuffer(), None);
    assert_eq!(engine.renderer().frame_number(), 1);

    // The aborted frame is recorded again from scratch.
    for expected in 2..=4 {
        let stats = engine.run_frame(Timestep::from_seconds(0.016)).unwrap();
        assert_eq!(stats.frame_number, expected);
    }
    assert_eq!(*seen.lock().unwrap(), vec![2, 2, 3, 4]);
}

#[test]
fn test_first_update_sees_frame_two() {
    let (_backend, mut engine) = engine();
    let seen = Arc::new(Mutex::new(Vec::new()));
    engine.push_layer(MidPassLayer::new(0, &seen)).unwrap();

    let stats = engine.run_frame(Timestep::from_seconds(0.016)).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![stats.frame_number]);
    assert_eq!(stats.frame_number, 2);
}

#[test]
fn test_shutdown_detaches_top_down_and_releases_everything() {
    let (backend, mut engine) = engine();
    let journal = Journal::default();
    engine.push_layer(TriangleLayer::new("World", &journal)).unwrap();
    engine.push_overlay(TriangleLayer::new("Hud", &journal)).unwrap();
    engine.run(2, Timestep::from_seconds(0.016)).unwrap();
    assert!(backend.live_resources().total() > 0);

    let stats = engine.shutdown().unwrap();
    assert_eq!(stats.frame_number, 4);
    assert_eq!(backend.live_resources().total(), 0);

    let detaches: Vec<String> = journal
        .lock()
        .unwrap()
        .iter()
        .filter(|entry| entry.ends_with(":detach"))
        .cloned()
        .collect();
    assert_eq!(detaches, vec!["Hud:detach", "World:detach"]);
}

#[test]
fn test_pop_layer_detaches_it() {
    let (_backend, mut engine) = engine();
    let journal = Journal::default();
    engine.push_layer(TriangleLayer::new("World", &journal)).unwrap();

    let layer = engine.pop_layer("World").unwrap();
    assert_eq!(layer.name(), "World");
    assert!(engine.layers().is_empty());
    assert_eq!(
        journal.lock().unwrap().last().map(String::as_str),
        Some("World:detach")
    );
}
