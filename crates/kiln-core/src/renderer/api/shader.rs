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

//! Shader sources and `#type` section preprocessing.
//!
//! A shader is authored as a single text containing one section per stage, each
//! introduced by a `#type <stage>` line:
//!
//! ```text
//! #type vertex
//! void main() { ... }
//!
//! #type fragment
//! void main() { ... }
//! ```

use crate::renderer::error::ShaderError;
use std::fmt;

const TYPE_TOKEN: &str = "#type";

/// A programmable stage of the graphics pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// The vertex stage.
    Vertex,
    /// The fragment stage, also accepted as `pixel`.
    Fragment,
}

impl ShaderStage {
    /// Parses the stage name that follows a `#type` directive.
    pub fn from_directive(name: &str) -> Option<Self> {
        match name {
            "vertex" => Some(Self::Vertex),
            "fragment" | "pixel" => Some(Self::Fragment),
            _ => None,
        }
    }

    /// The canonical lowercase name of the stage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A shader program split into its per-stage sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    /// The shader name, used in logs and errors.
    pub name: String,
    /// Source of the vertex stage.
    pub vertex: String,
    /// Source of the fragment stage.
    pub fragment: String,
}

impl ShaderSource {
    /// Splits a combined shader text into its stages.
    ///
    /// When a stage appears more than once, the last section wins.
    ///
    /// # Errors
    ///
    /// - [`ShaderError::EmptySource`] if the text has no `#type` directive.
    /// - [`ShaderError::UnknownStage`] if a directive names an unsupported stage.
    /// - [`ShaderError::MissingStage`] if the vertex or fragment stage is absent.
    pub fn parse(name: &str, source: &str) -> Result<Self, ShaderError> {
        let mut vertex = None;
        let mut fragment = None;

        let mut rest = match source.find(TYPE_TOKEN) {
            Some(start) => &source[start..],
            None => {
                return Err(ShaderError::EmptySource {
                    name: name.to_owned(),
                })
            }
        };

        while let Some(directive) = rest.strip_prefix(TYPE_TOKEN) {
            let (stage_name, body) = directive.split_once('\n').unwrap_or((directive, ""));
            let stage_name = stage_name.trim();
            let stage =
                ShaderStage::from_directive(stage_name).ok_or_else(|| ShaderError::UnknownStage {
                    name: name.to_owned(),
                    stage: stage_name.to_owned(),
                })?;

            let end = body.find(TYPE_TOKEN).unwrap_or(body.len());
            let text = body[..end].to_owned();
            match stage {
                ShaderStage::Vertex => vertex = Some(text),
                ShaderStage::Fragment => fragment = Some(text),
            }
            rest = &body[end..];
        }

        let missing = |stage: ShaderStage| ShaderError::MissingStage {
            name: name.to_owned(),
            stage: stage.as_str(),
        };
        Ok(Self {
            name: name.to_owned(),
            vertex: vertex.ok_or_else(|| missing(ShaderStage::Vertex))?,
            fragment: fragment.ok_or_else(|| missing(ShaderStage::Fragment))?,
        })
    }

    /// The source of a single stage.
    pub fn stage(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }
}

/// An opaque handle to a linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderId(pub usize);
