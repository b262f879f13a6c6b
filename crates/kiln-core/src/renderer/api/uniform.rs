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

//! Uniform values uploaded to shaders.

use crate::math::{Mat4, Vec3, Vec4};

/// A value uploaded to a named shader uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// A single integer, also used for sampler slots.
    Int(i32),
    /// A single float.
    Float(f32),
    /// A three-component vector.
    Float3(Vec3),
    /// A four-component vector.
    Float4(Vec4),
    /// A 4x4 matrix.
    Mat4(Mat4),
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self {
        Self::Float3(value)
    }
}

impl From<Vec4> for UniformValue {
    fn from(value: Vec4) -> Self {
        Self::Float4(value)
    }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self {
        Self::Mat4(value)
    }
}
