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

//! GPU resource wrappers whose lifetime is bridged onto the command queue.
//!
//! Each wrapper is a CPU-side owner of a backend object. Constructing one queues
//! a command that creates the backend object; dropping one queues a command that
//! releases it. The backend handle itself lives in a [`HandleSlot`] that both
//! commands share, so a wrapper created and dropped within the same frame creates
//! and releases its object in that order during the next drain.
//!
//! The wrapper's methods return as soon as their command is queued; handles are
//! only observable after the queue has been drained.

mod framebuffer;
mod index_buffer;
mod pipeline;
mod shader;
mod slot;
mod texture;
mod vertex_buffer;

pub use self::framebuffer::Framebuffer;
pub use self::index_buffer::IndexBuffer;
pub use self::pipeline::Pipeline;
pub use self::shader::Shader;
pub use self::slot::HandleSlot;
pub use self::texture::Texture2D;
pub use self::vertex_buffer::VertexBuffer;

pub(crate) use self::framebuffer::bind_framebuffer_now;
pub(crate) use self::shader::{bind_shader_now, upload_uniform_now};
pub(crate) use self::slot::release;
pub(crate) use self::texture::bind_texture_now;
