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

//! Defines data structures related to texture resources.

/// The pixel format of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    /// 8-bit RGBA, unsigned normalized.
    #[default]
    Rgba8Unorm,
    /// 8-bit RGB, unsigned normalized.
    Rgb8Unorm,
    /// 16-bit floating point RGBA.
    Rgba16Float,
    /// 32-bit signed integer, single channel.
    R32Sint,
    /// 24-bit depth with 8-bit stencil.
    Depth24PlusStencil8,
}

impl TextureFormat {
    /// The size of one texel in bytes.
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::Rgb8Unorm => 3,
            Self::Rgba8Unorm | Self::R32Sint | Self::Depth24PlusStencil8 => 4,
            Self::Rgba16Float => 8,
        }
    }

    /// Returns `true` for depth or depth/stencil formats.
    pub const fn is_depth(self) -> bool {
        matches!(self, Self::Depth24PlusStencil8)
    }
}

/// A descriptor used to create a [`TextureId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDescriptor {
    /// An optional debug label for the texture.
    pub label: Option<String>,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// The texel format.
    pub format: TextureFormat,
}

impl TextureDescriptor {
    /// The number of bytes a full upload of the texture must contain.
    pub fn byte_size(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height) * u64::from(self.format.bytes_per_pixel())
    }
}

/// An opaque handle to a GPU texture resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub usize);
