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

//! Defines render target specifications.

use super::texture::TextureFormat;

/// The largest width or height a framebuffer may be created or resized to.
pub const MAX_FRAMEBUFFER_SIZE: u32 = 8192;

/// Describes a render target and its attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramebufferSpecification {
    /// An optional debug label.
    pub label: Option<String>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Formats of the attachments, color attachments first.
    pub attachments: Vec<TextureFormat>,
    /// Multisample count.
    pub samples: u32,
    /// If `true`, the framebuffer stands for the window surface rather than an
    /// offscreen target.
    pub swap_chain_target: bool,
}

impl Default for FramebufferSpecification {
    fn default() -> Self {
        Self {
            label: None,
            width: 1280,
            height: 720,
            attachments: vec![TextureFormat::Rgba8Unorm, TextureFormat::Depth24PlusStencil8],
            samples: 1,
            swap_chain_target: false,
        }
    }
}

impl FramebufferSpecification {
    /// The number of color attachments.
    pub fn color_attachment_count(&self) -> usize {
        self.attachments.iter().filter(|f| !f.is_depth()).count()
    }

    /// Returns `true` if the specification has a depth attachment.
    pub fn has_depth(&self) -> bool {
        self.attachments.iter().any(|f| f.is_depth())
    }
}

/// Returns `true` if `width` x `height` is a valid framebuffer size, given `max`.
pub fn is_valid_framebuffer_size(width: u32, height: u32, max: u32) -> bool {
    width > 0 && height > 0 && width <= max && height <= max
}

/// An opaque handle to a GPU framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FramebufferId(pub usize);
