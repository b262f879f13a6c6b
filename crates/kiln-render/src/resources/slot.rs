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

use crate::context::RenderContext;
use kiln_core::renderer::{GraphicsBackend, ResourceError};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A shared cell holding a backend handle once its creation command has run.
///
/// The slot is empty until then, and again after the release command has run or
/// if creation failed.
pub struct HandleSlot<T> {
    handle: Arc<Mutex<Option<T>>>,
}

impl<T: Copy> HandleSlot<T> {
    pub(crate) fn new() -> Self {
        Self {
            handle: Arc::new(Mutex::new(None)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The current handle, if the backend object exists.
    pub fn get(&self) -> Option<T> {
        *self.lock()
    }

    /// Returns `true` if the backend object exists.
    pub fn is_set(&self) -> bool {
        self.lock().is_some()
    }

    pub(crate) fn set(&self, handle: T) -> Option<T> {
        self.lock().replace(handle)
    }

    pub(crate) fn take(&self) -> Option<T> {
        self.lock().take()
    }
}

impl<T> Clone for HandleSlot<T> {
    fn clone(&self) -> Self {
        Self {
            handle: Arc::clone(&self.handle),
        }
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for HandleSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandleSlot").field(&self.get()).finish()
    }
}

/// Queues the release of whatever handle `slot` holds when the command runs.
///
/// Called from `Drop`, so a full queue is logged rather than raised; the backend
/// object is leaked in that case.
pub(crate) fn release<T>(
    ctx: &RenderContext,
    slot: &HandleSlot<T>,
    kind: &'static str,
    destroy: fn(&dyn GraphicsBackend, T) -> Result<(), ResourceError>,
) where
    T: Copy + fmt::Debug + Send + 'static,
{
    let slot = slot.clone();
    let queued = ctx.try_submit(move |backend| match slot.take() {
        Some(id) => match destroy(backend, id) {
            Ok(()) => log::trace!("RenderCommand: Released {kind} {id:?}"),
            Err(e) => log::warn!("Failed to release {kind} {id:?}: {e}"),
        },
        None => log::trace!("RenderCommand: {kind} was never created, nothing to release"),
    });
    if let Err(e) = queued {
        log::error!("Could not queue the release of a {kind}, leaking it: {e}");
    }
}
