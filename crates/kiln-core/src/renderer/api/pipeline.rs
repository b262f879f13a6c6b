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

//! Fixed-function pipeline state.

use super::buffer::VertexBufferLayout;

/// Describes the fixed-function state a draw is performed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineDescriptor {
    /// An optional debug label.
    pub label: Option<String>,
    /// The vertex layout the pipeline consumes.
    pub layout: VertexBufferLayout,
    /// Whether depth testing is enabled.
    pub depth_test: bool,
    /// Whether back faces are culled.
    pub backface_culling: bool,
    /// Whether polygons are rasterized as lines.
    pub wireframe: bool,
}

impl PipelineDescriptor {
    /// A depth-tested, back-face-culled pipeline for `layout`.
    pub fn new(label: impl Into<String>, layout: VertexBufferLayout) -> Self {
        Self {
            label: Some(label.into()),
            layout,
            depth_test: true,
            backface_culling: true,
            wireframe: false,
        }
    }
}

/// An opaque handle to a pipeline state object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PipelineId(pub usize);
