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

//! Backend-agnostic rendering API.
//!
//! Plain data types that render commands carry into the [`GraphicsBackend`]:
//!
//! - **[`buffer`]**: vertex/index buffer descriptors and vertex layouts.
//! - **[`texture`]**: texture formats and descriptors.
//! - **[`framebuffer`]**: render target specifications.
//! - **[`shader`]**: shader sources and `#type` preprocessing.
//! - **[`pipeline`]**: fixed-function pipeline state.
//! - **[`pass`]**: load operations and viewports.
//! - **[`uniform`]**: uniform values uploaded to shaders.
//!
//! [`GraphicsBackend`]: super::GraphicsBackend

pub mod buffer;
pub mod framebuffer;
pub mod pass;
pub mod pipeline;
pub mod shader;
pub mod texture;
pub mod uniform;

pub use self::buffer::*;
pub use self::framebuffer::*;
pub use self::pass::*;
pub use self::pipeline::*;
pub use self::shader::*;
pub use self::texture::*;
pub use self::uniform::*;
