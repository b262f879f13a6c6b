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

//! The rendering layer of Kiln.
//!
//! Everything here records work into the deferred command queue from
//! `kiln-core`; nothing touches the [`GraphicsBackend`] directly. The frame
//! driver calls [`Renderer::wait_and_render`] once per frame to execute the
//! recorded commands in order.
//!
//! - [`RenderContext`] pairs the shared command sink with the backend commands run against.
//! - [`resources`] wraps backend objects so that creating and dropping them is itself queued.
//! - [`Renderer`] owns the frame and render pass lifecycle.
//! - [`SceneRenderer`] batches mesh submissions into a draw list and flushes it through the renderer.
//!
//! [`GraphicsBackend`]: kiln_core::renderer::GraphicsBackend

#![warn(missing_docs)]

mod context;
mod material;
mod mesh;
mod render_pass;
mod renderer;
pub mod resources;
mod scene_renderer;

pub use self::context::RenderContext;
pub use self::material::Material;
pub use self::mesh::{Mesh, Vertex};
pub use self::render_pass::RenderPass;
pub use self::renderer::{QuadSource, Renderer};
pub use self::resources::{Framebuffer, IndexBuffer, Pipeline, Shader, Texture2D, VertexBuffer};
pub use self::scene_renderer::{SceneCamera, SceneRenderer};
