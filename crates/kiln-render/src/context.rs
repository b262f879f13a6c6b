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
    CommandSink, GraphicsBackend, QueueError, RenderSettings, MAX_FRAMEBUFFER_SIZE,
};
use std::fmt;
use std::sync::Arc;

/// The handle every rendering object records its commands through.
///
/// Cloning is cheap: all clones share one command queue and one backend.
#[derive(Clone)]
pub struct RenderContext {
    sink: CommandSink,
    backend: Arc<dyn GraphicsBackend>,
    max_framebuffer_size: u32,
}

impl RenderContext {
    /// Creates a context with its own command queue of `queue_capacity` bytes.
    pub fn new(
        backend: Arc<dyn GraphicsBackend>,
        queue_capacity: usize,
    ) -> Result<Self, QueueError> {
        Ok(Self {
            sink: CommandSink::new(queue_capacity)?,
            backend,
            max_framebuffer_size: MAX_FRAMEBUFFER_SIZE,
        })
    }

    /// Creates a context configured from `settings`.
    pub fn with_settings(
        backend: Arc<dyn GraphicsBackend>,
        settings: &RenderSettings,
    ) -> Result<Self, QueueError> {
        let mut ctx = Self::new(backend, settings.queue_capacity)?;
        ctx.max_framebuffer_size = settings.max_framebuffer_size;
        Ok(ctx)
    }

    /// The shared command sink.
    pub fn sink(&self) -> &CommandSink {
        &self.sink
    }

    /// The backend commands execute against.
    pub fn backend(&self) -> &Arc<dyn GraphicsBackend> {
        &self.backend
    }

    /// The largest framebuffer dimension resizes may request.
    pub fn max_framebuffer_size(&self) -> u32 {
        self.max_framebuffer_size
    }

    /// Records a command that runs against the backend on the next drain.
    ///
    /// # Panics
    ///
    /// Panics if the command queue is out of capacity, see [`CommandSink::submit`].
    pub fn submit<F>(&self, command: F)
    where
        F: FnOnce(&dyn GraphicsBackend) + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        self.sink.submit(move || command(backend.as_ref()));
    }

    /// Like [`submit`](Self::submit), but reports a full queue instead of panicking.
    pub fn try_submit<F>(&self, command: F) -> Result<(), QueueError>
    where
        F: FnOnce(&dyn GraphicsBackend) + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        self.sink.try_submit(move || command(backend.as_ref()))
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("sink", &self.sink)
            .field("backend", &self.backend.name())
            .finish()
    }
}
