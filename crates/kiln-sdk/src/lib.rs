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

//! The public-facing Software Development Kit (SDK) for Kiln.
//!
//! An application is a stack of [`Layer`]s driven by an [`Engine`]. Each frame
//! the engine updates every layer, bottom to top, then executes all the render
//! commands the layers recorded with a single drain of the command queue.

mod engine;
mod layer;

pub use self::engine::{Engine, FrameContext, Timestep};
pub use self::layer::{Layer, LayerStack};

/// The types most applications need.
pub mod prelude {
    pub use crate::{Engine, FrameContext, Layer, LayerStack, Timestep};
    pub use kiln_core::math::{LinearRgba, Mat4, Vec3, Vec4};
    pub use kiln_core::renderer::{
        FrameStats, FramebufferSpecification, LoadOp, PipelineDescriptor, RenderSettings,
        TextureFormat, UniformValue,
    };
    pub use kiln_infra::HeadlessBackend;
    pub use kiln_render::{
        Framebuffer, Material, Mesh, Pipeline, QuadSource, RenderContext, RenderPass, Renderer,
        SceneCamera, SceneRenderer, Shader, Texture2D, Vertex,
    };
}
