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

//! Defines data structures related to vertex and index buffers.

/// What a buffer is bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Per-vertex attribute data.
    Vertex,
    /// 32-bit indices into a vertex buffer.
    Index,
}

/// How often the contents of a buffer are expected to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    /// Written once at creation.
    #[default]
    Static,
    /// Rewritten through `write_buffer`, typically every frame.
    Dynamic,
}

/// A descriptor used to create a [`BufferId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferDescriptor {
    /// An optional debug label for the buffer.
    pub label: Option<String>,
    /// What the buffer is bound as.
    pub kind: BufferKind,
    /// The expected update frequency.
    pub usage: BufferUsage,
    /// The total size of the buffer in bytes.
    pub size: u64,
}

/// An opaque handle to a GPU buffer resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub usize);

/// The data type of a single vertex attribute or shader uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderDataType {
    /// A single `f32`.
    Float,
    /// Two `f32` components.
    Float2,
    /// Three `f32` components.
    Float3,
    /// Four `f32` components.
    Float4,
    /// A 3x3 `f32` matrix.
    Mat3,
    /// A 4x4 `f32` matrix.
    Mat4,
    /// A single `i32`.
    Int,
    /// Two `i32` components.
    Int2,
    /// Three `i32` components.
    Int3,
    /// Four `i32` components.
    Int4,
    /// A boolean, stored as one byte.
    Bool,
}

impl ShaderDataType {
    /// The size of the type in bytes.
    pub const fn size(self) -> u32 {
        match self {
            Self::Float | Self::Int => 4,
            Self::Float2 | Self::Int2 => 8,
            Self::Float3 | Self::Int3 => 12,
            Self::Float4 | Self::Int4 => 16,
            Self::Mat3 => 36,
            Self::Mat4 => 64,
            Self::Bool => 1,
        }
    }

    /// The number of scalar components.
    pub const fn component_count(self) -> u32 {
        match self {
            Self::Float | Self::Int | Self::Bool => 1,
            Self::Float2 | Self::Int2 => 2,
            Self::Float3 | Self::Int3 => 3,
            Self::Float4 | Self::Int4 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }
}

/// A single named attribute within a [`VertexBufferLayout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexAttribute {
    /// The attribute name as used by the shader.
    pub name: String,
    /// The attribute data type.
    pub data_type: ShaderDataType,
    /// The byte offset of the attribute within a vertex.
    pub offset: u32,
    /// Whether integer data is normalized to `[0, 1]` when read.
    pub normalized: bool,
}

/// Describes how the bytes of a vertex buffer map to shader attributes.
///
/// Attributes are tightly packed in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VertexBufferLayout {
    attributes: Vec<VertexAttribute>,
    stride: u32,
}

impl VertexBufferLayout {
    /// Builds a layout from `(name, type)` pairs, computing offsets and stride.
    pub fn new<'a>(attributes: impl IntoIterator<Item = (&'a str, ShaderDataType)>) -> Self {
        let mut stride = 0;
        let attributes = attributes
            .into_iter()
            .map(|(name, data_type)| {
                let attribute = VertexAttribute {
                    name: name.to_owned(),
                    data_type,
                    offset: stride,
                    normalized: false,
                };
                stride += data_type.size();
                attribute
            })
            .collect();
        Self { attributes, stride }
    }

    /// The attributes in declaration order.
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// The size of one vertex in bytes.
    pub fn stride(&self) -> u32 {
        self.stride
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_computes_offsets_and_stride() {
        let layout = VertexBufferLayout::new([
            ("a_Position", ShaderDataType::Float3),
            ("a_TexCoord", ShaderDataType::Float2),
            ("a_Color", ShaderDataType::Float4),
        ]);

        let offsets: Vec<u32> = layout.attributes().iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 20]);
        assert_eq!(layout.stride(), 36);
        assert_eq!(layout.attributes()[1].name, "a_TexCoord");
    }

    #[test]
    fn empty_layout_has_zero_stride() {
        let layout = VertexBufferLayout::default();
        assert!(layout.attributes().is_empty());
        assert_eq!(layout.stride(), 0);
    }
}
