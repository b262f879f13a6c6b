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

use crate::resources::{bind_shader_now, bind_texture_now, upload_uniform_now, Shader, Texture2D};
use kiln_core::renderer::UniformValue;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Default)]
struct MaterialState {
    uniforms: BTreeMap<String, UniformValue>,
    textures: BTreeMap<u32, Arc<Texture2D>>,
}

/// A shader together with the uniform values and textures it is drawn with.
///
/// Values are set on the CPU and captured into the bind command when the
/// material is bound, so later changes do not affect draws already recorded.
#[derive(Debug)]
pub struct Material {
    name: String,
    shader: Arc<Shader>,
    state: RwLock<MaterialState>,
}

impl Material {
    /// Creates a material with no uniform values or textures.
    pub fn new(name: impl Into<String>, shader: Arc<Shader>) -> Self {
        Self {
            name: name.into(),
            shader,
            state: RwLock::default(),
        }
    }

    /// Sets a uniform value.
    pub fn set(&self, name: &str, value: impl Into<UniformValue>) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .uniforms
            .insert(name.to_owned(), value.into());
    }

    /// The current value of a uniform.
    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .uniforms
            .get(name)
            .copied()
    }

    /// Binds `texture` to sampler `slot` whenever the material is bound.
    pub fn set_texture(&self, slot: u32, texture: Arc<Texture2D>) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .textures
            .insert(slot, texture);
    }

    /// The material name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shader.
    pub fn shader(&self) -> &Arc<Shader> {
        &self.shader
    }

    /// Queues binding the shader, uploading a snapshot of the uniforms and
    /// binding the textures.
    pub fn bind(&self) {
        let (uniforms, textures): (Vec<_>, Vec<_>) = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            (
                state
                    .uniforms
                    .iter()
                    .map(|(name, value)| (name.clone(), *value))
                    .collect(),
                state
                    .textures
                    .iter()
                    .map(|(slot, texture)| (*slot, texture.slot().clone()))
                    .collect(),
            )
        };
        let shader = self.shader.slot().clone();
        let shader_name = self.shader.name().to_owned();

        self.shader.context().submit(move |backend| {
            bind_shader_now(backend, &shader, &shader_name);
            for (name, value) in &uniforms {
                upload_uniform_now(backend, &shader, name, value);
            }
            for (slot, texture) in &textures {
                bind_texture_now(backend, texture, *slot);
            }
        });
    }
}
