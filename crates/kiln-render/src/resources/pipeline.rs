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

use super::{release, HandleSlot, Shader};
use crate::context::RenderContext;
use kiln_core::renderer::{PipelineDescriptor, PipelineId};
use std::sync::Arc;

/// Fixed-function state together with the shader it is used with.
#[derive(Debug)]
pub struct Pipeline {
    ctx: RenderContext,
    slot: HandleSlot<PipelineId>,
    descriptor: PipelineDescriptor,
    shader: Arc<Shader>,
}

impl Pipeline {
    /// Queues the creation of a pipeline state object.
    pub fn new(ctx: &RenderContext, descriptor: PipelineDescriptor, shader: Arc<Shader>) -> Self {
        let slot = HandleSlot::new();
        let target = slot.clone();
        let create_descriptor = descriptor.clone();
        ctx.submit(move |backend| match backend.create_pipeline(&create_descriptor) {
            Ok(id) => {
                target.set(id);
                log::trace!("RenderCommand: Created pipeline {id:?}");
            }
            Err(e) => log::error!("Failed to create pipeline: {e}"),
        });

        Self {
            ctx: ctx.clone(),
            slot,
            descriptor,
            shader,
        }
    }

    /// Queues making the pipeline current.
    pub fn bind(&self) {
        let slot = self.slot.clone();
        self.ctx.submit(move |backend| {
            let Some(id) = slot.get() else {
                log::warn!("Binding a pipeline that does not exist");
                return;
            };
            if let Err(e) = backend.bind_pipeline(id) {
                log::error!("Failed to bind pipeline {id:?}: {e}");
            }
        });
    }

    /// The shader the pipeline was built for.
    pub fn shader(&self) -> &Arc<Shader> {
        &self.shader
    }

    /// The fixed-function state.
    pub fn descriptor(&self) -> &PipelineDescriptor {
        &self.descriptor
    }

    /// The backend handle, once the creation command has run.
    pub fn handle(&self) -> Option<PipelineId> {
        self.slot.get()
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        release(&self.ctx, &self.slot, "pipeline", |backend, id| {
            backend.destroy_pipeline(id)
        });
    }
}
