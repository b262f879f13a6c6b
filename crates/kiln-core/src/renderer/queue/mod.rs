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

//! The deferred render command queue.
//!
//! Rendering operations are not executed where they are issued. Instead, each one
//! is captured as a closure, type-erased into a fixed-capacity byte arena, and run
//! later, in exactly the order it was submitted, when the frame driver drains the
//! queue.
//!
//! ```text
//!  arena (fixed capacity, RECORD_ALIGN-aligned)
//!  ┌──────────────┬──────────────┬──────────────┬──────────────┬─────────────
//!  │ header       │ payload (F1) │ header       │ payload (F2) │ ...  free
//!  │ trampoline   │ closure      │ trampoline   │ closure      │
//!  │ payload_size │ bytes + pad  │ payload_size │ bytes + pad  │
//!  └──────────────┴──────────────┴──────────────┴──────────────┴─────────────
//!  ^ offset 0                                                 ^ write cursor
//! ```
//!
//! - [`record`] defines the binary record layout and the per-type trampolines.
//! - [`RenderCommandQueue`] owns the arena, allocates records and executes them.
//! - [`CommandSink`] is the shared submission handle handed to every subsystem.

pub mod record;

mod command_queue;
mod sink;

pub use self::command_queue::{RenderCommandQueue, QUEUE_CAPACITY};
pub use self::record::{record_size, Trampoline, RECORD_ALIGN, RECORD_HEADER_SIZE};
pub use self::sink::{CommandSink, DrainStats};
