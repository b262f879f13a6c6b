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

//! Defines the hierarchy of error types for the rendering subsystem.
//!
//! Two families of errors exist. [`QueueError`] and the protocol variants of
//! [`RenderError`] describe violations of the command queue and frame lifecycle
//! contract; they indicate a logic bug in a calling layer and are not meant to be
//! recovered from. [`ResourceError`] and [`ShaderError`] describe failures of an
//! individual backend call; they are logged by the command that hit them and never
//! abort the drain of the remaining commands.

use std::path::PathBuf;
use thiserror::Error;

/// An error raised by the command queue itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The requested arena capacity is zero or cannot be allocated.
    #[error("Invalid command queue capacity: {capacity} bytes")]
    InvalidCapacity {
        /// The rejected capacity in bytes.
        capacity: usize,
    },
    /// Allocating the record would write past the end of the arena.
    #[error(
        "Command queue capacity exceeded: record of {requested} bytes does not fit ({used}/{capacity} bytes used)"
    )]
    CapacityExceeded {
        /// The full record size (header and padded payload) that was requested.
        requested: usize,
        /// The number of bytes already in use.
        used: usize,
        /// The total arena capacity.
        capacity: usize,
    },
    /// The captured command state is larger than a record header can describe.
    #[error("Command payload of {size} bytes is too large to be recorded")]
    PayloadTooLarge {
        /// The payload size in bytes.
        size: usize,
    },
    /// The captured command state requires a stricter alignment than the arena provides.
    #[error("Command payload alignment {align} exceeds the supported maximum of {max}")]
    UnsupportedAlignment {
        /// The alignment required by the command.
        align: usize,
        /// The maximum alignment the arena guarantees.
        max: usize,
    },
    /// A drain was started while another drain of the same queue was running.
    #[error("The command queue is already being executed")]
    ReentrantExecute,
}

/// An error related to the preprocessing or compilation of a shader.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShaderError {
    /// The shader source contained no `#type` section.
    #[error("Shader '{name}' has no '#type' sections")]
    EmptySource {
        /// The name of the shader.
        name: String,
    },
    /// A `#type` directive named a stage that is not supported.
    #[error("Unknown shader stage '{stage}' in shader '{name}'")]
    UnknownStage {
        /// The name of the shader.
        name: String,
        /// The stage name found after `#type`.
        stage: String,
    },
    /// A required stage is missing from the shader source.
    #[error("Shader '{name}' is missing a {stage} stage")]
    MissingStage {
        /// The name of the shader.
        name: String,
        /// The missing stage.
        stage: &'static str,
    },
    /// The backend failed to compile or link the shader program.
    #[error("Shader compilation failed for '{label}': {details}")]
    CompilationError {
        /// A descriptive label for the shader.
        label: String,
        /// Detailed error messages from the shader compiler.
        details: String,
    },
}

/// An error related to the creation or use of a GPU resource.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// A shader-specific error occurred.
    #[error("Shader resource error: {0}")]
    Shader(#[from] ShaderError),
    /// The handle used to reference a resource is unknown to the backend.
    #[error("Invalid resource handle: {0}")]
    InvalidHandle(String),
    /// An attempt was made to access a resource out of its bounds.
    #[error("Resource access out of bounds: offset {offset} + {len} bytes exceeds {size} bytes")]
    OutOfBounds {
        /// The byte offset of the access.
        offset: u64,
        /// The number of bytes accessed.
        len: u64,
        /// The size of the resource.
        size: u64,
    },
    /// The requested dimensions are not valid for the resource.
    #[error("Invalid resource dimensions: {width}x{height}")]
    InvalidDimensions {
        /// The requested width.
        width: u32,
        /// The requested height.
        height: u32,
    },
    /// An error originating from the specific graphics backend implementation.
    #[error("Backend-specific resource error: {0}")]
    BackendError(String),
}

/// An error raised while loading render settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("Failed to read settings file '{path}': {source}")]
    Io {
        /// The path of the settings file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The settings text is not valid RON for [`RenderSettings`](super::RenderSettings).
    #[error("Failed to parse render settings: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// The settings parsed but describe an unusable configuration.
    #[error("Invalid render settings: {0}")]
    Invalid(String),
}

/// A high-level error raised by the renderer and its frame lifecycle.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The command queue rejected an operation.
    #[error("Command queue error: {0}")]
    Queue(#[from] QueueError),
    /// An error occurred while managing a GPU resource.
    #[error("Graphics resource operation failed: {0}")]
    Resource(#[from] ResourceError),
    /// The render settings could not be loaded.
    #[error("Render configuration error: {0}")]
    Config(#[from] ConfigError),
    /// `begin_render_pass` was called while another pass was active.
    #[error("Cannot begin render pass '{requested}': pass '{active}' is still active")]
    PassAlreadyActive {
        /// The label of the pass that is currently active.
        active: String,
        /// The label of the pass that was requested.
        requested: String,
    },
    /// A pass-scoped operation was called with no active render pass.
    #[error("No render pass is active")]
    NoActivePass,
    /// `begin_scene` was called while a scene was already being recorded.
    #[error("A scene is already active")]
    SceneAlreadyActive,
    /// A scene-scoped operation was called outside of `begin_scene`/`end_scene`.
    #[error("No scene is active")]
    NoActiveScene,
}
