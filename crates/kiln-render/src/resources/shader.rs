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

use super::{release, HandleSlot};
use crate::context::RenderContext;
use kiln_core::renderer::{GraphicsBackend, ShaderError, ShaderId, ShaderSource, UniformValue};

/// A linked shader program.
///
/// Source preprocessing happens immediately, so malformed `#type` sections are
/// reported by the constructor. Compilation happens when the queued creation
/// command runs; a failure there is logged and leaves the shader empty, and
/// commands that use an empty shader are skipped with a warning.
#[derive(Debug)]
pub struct Shader {
    ctx: RenderContext,
    slot: HandleSlot<ShaderId>,
    name: String,
}

impl Shader {
    /// Preprocesses `source` and queues compiling it.
    ///
    /// # Errors
    ///
    /// Returns a [`ShaderError`] if the `#type` sections are malformed.
    pub fn new(ctx: &RenderContext, name: &str, source: &str) -> Result<Self, ShaderError> {
        let source = ShaderSource::parse(name, source)?;
        Ok(Self::from_source(ctx, source))
    }

    /// Queues compiling already split stage sources.
    pub fn from_source(ctx: &RenderContext, source: ShaderSource) -> Self {
        let shader = Self {
            ctx: ctx.clone(),
            slot: HandleSlot::new(),
            name: source.name.clone(),
        };
        shader.queue_compile(source);
        shader
    }

    fn queue_compile(&self, source: ShaderSource) {
        let slot = self.slot.clone();
        self.ctx.submit(move |backend| match backend.create_shader(&source) {
            Ok(id) => {
                if let Some(old) = slot.set(id) {
                    if let Err(e) = backend.destroy_shader(old) {
                        log::warn!("Failed to release replaced shader {old:?}: {e}");
                    }
                }
                log::trace!("RenderCommand: Compiled shader '{}' as {id:?}", source.name);
            }
            Err(e) => log::error!("Failed to compile shader '{}': {e}", source.name),
        });
    }

    /// Preprocesses new source and queues recompiling the shader.
    ///
    /// The previous program stays in use if the new one fails to compile.
    pub fn reload(&self, source: &str) -> Result<(), ShaderError> {
        let source = ShaderSource::parse(&self.name, source)?;
        log::info!("Reloading shader '{}'", self.name);
        self.queue_compile(source);
        Ok(())
    }

    /// Queues making the shader current.
    pub fn bind(&self) {
        let slot = self.slot.clone();
        let name = self.name.clone();
        self.ctx.submit(move |backend| bind_shader_now(backend, &slot, &name));
    }

    /// Queues setting a uniform of the shader.
    pub fn upload_uniform(&self, name: &str, value: impl Into<UniformValue>) {
        let slot = self.slot.clone();
        let name = name.to_owned();
        let value = value.into();
        self.ctx
            .submit(move |backend| upload_uniform_now(backend, &slot, &name, &value));
    }

    /// The shader name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The backend handle, once compilation has succeeded.
    pub fn handle(&self) -> Option<ShaderId> {
        self.slot.get()
    }

    pub(crate) fn slot(&self) -> &HandleSlot<ShaderId> {
        &self.slot
    }

    pub(crate) fn context(&self) -> &RenderContext {
        &self.ctx
    }
}

/// Makes a shader current from inside a command that is already running.
pub(crate) fn bind_shader_now(backend: &dyn GraphicsBackend, slot: &HandleSlot<ShaderId>, name: &str) {
    let Some(id) = slot.get() else {
        log::warn!("Binding shader '{name}', which is not compiled");
        return;
    };
    if let Err(e) = backend.bind_shader(id) {
        log::error!("Failed to bind shader '{name}': {e}");
    }
}

/// Sets a uniform from inside a command that is already running.
pub(crate) fn upload_uniform_now(
    backend: &dyn GraphicsBackend,
    slot: &HandleSlot<ShaderId>,
    name: &str,
    value: &UniformValue,
) {
    let Some(id) = slot.get() else {
        log::warn!("Uploading uniform '{name}' to a shader that is not compiled");
        return;
    };
    if let Err(e) = backend.upload_uniform(id, name, value) {
        log::error!("Failed to upload uniform '{name}' to shader {id:?}: {e}");
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        release(&self.ctx, &self.slot, "shader", |backend, id| {
            backend.destroy_shader(id)
        });
    }
}
