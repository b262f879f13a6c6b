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

//! Provides the public, backend-agnostic rendering contracts for Kiln.
//!
//! This module defines the deferred command queue that every rendering operation
//! flows through, the abstract [`GraphicsBackend`] trait that queued commands
//! ultimately call into, the resource descriptors those commands carry, and the
//! error types shared by the whole rendering stack.
//!
//! The 'how' of talking to a GPU lives in a concrete backend (see `kiln-infra`),
//! and the frame and pass lifecycle that drives the queue lives in `kiln-render`.

pub mod api;
pub mod error;
pub mod queue;
pub mod settings;
pub mod stats;
pub mod traits;

pub use self::api::*;
pub use self::error::{ConfigError, QueueError, RenderError, ResourceError, ShaderError};
pub use self::queue::{CommandSink, DrainStats, RenderCommandQueue, QUEUE_CAPACITY};
pub use self::settings::RenderSettings;
pub use self::stats::FrameStats;
pub use self::traits::GraphicsBackend;
