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

//! Concrete implementations of the contracts defined in `kiln-core`.
//!
//! This crate is the layer that knows how to talk to a graphics API. It currently
//! provides the [`HeadlessBackend`], a complete in-memory implementation of
//! [`GraphicsBackend`](kiln_core::renderer::GraphicsBackend) that validates every
//! call and records it, used for tooling, tests and windowless runs.

#![warn(missing_docs)]

#[cfg(feature = "graphics")]
pub mod graphics;

#[cfg(feature = "graphics")]
pub use graphics::headless::{BackendCall, HeadlessBackend, ResourceCounts};
