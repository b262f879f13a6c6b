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

use crate::resources::Framebuffer;
use kiln_core::renderer::LoadOp;
use std::sync::Arc;

/// A named unit of rendering into one target framebuffer.
#[derive(Debug)]
pub struct RenderPass {
    label: String,
    target: Arc<Framebuffer>,
    load_op: LoadOp,
}

impl RenderPass {
    /// Creates a pass rendering into `target`.
    pub fn new(label: impl Into<String>, target: Arc<Framebuffer>, load_op: LoadOp) -> Self {
        Self {
            label: label.into(),
            target,
            load_op,
        }
    }

    /// The pass label, used in logs and errors.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The framebuffer the pass renders into.
    pub fn target(&self) -> &Arc<Framebuffer> {
        &self.target
    }

    /// What happens to the target when the pass begins.
    pub fn load_op(&self) -> LoadOp {
        self.load_op
    }
}
