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

//! Defines the `Mat4` type used for object transforms and camera matrices.

use super::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// A 4x4 column-major matrix, used for 3D affine transformations.
///
/// The memory layout is column-major, which is what the shader uniform upload
/// path expects. `#[repr(C)]` together with the `Pod` derive allows the matrix
/// to be uploaded with `bytemuck::bytes_of`.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct Mat4 {
    /// The columns of the matrix. `cols[0]` is the first column, and so on.
    pub cols: [Vec4; 4],
}

impl Mat4 {
    /// The 4x4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [Vec4::X, Vec4::Y, Vec4::Z, Vec4::W],
    };

    /// Creates a new matrix from four column vectors.
    #[inline]
    pub fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self {
            cols: [c0, c1, c2, c3],
        }
    }

    /// Returns a row of the matrix as a `Vec4`.
    #[inline]
    pub fn get_row(&self, index: usize) -> Vec4 {
        Vec4 {
            x: self.cols[0].get(index),
            y: self.cols[1].get(index),
            z: self.cols[2].get(index),
            w: self.cols[3].get(index),
        }
    }

    /// Creates a translation matrix.
    #[inline]
    pub fn from_translation(v: Vec3) -> Self {
        Self {
            cols: [Vec4::X, Vec4::Y, Vec4::Z, Vec4::new(v.x, v.y, v.z, 1.0)],
        }
    }

    /// Creates a non-uniform scaling matrix.
    #[inline]
    pub fn from_scale(scale: Vec3) -> Self {
        Self {
            cols: [
                Vec4::new(scale.x, 0.0, 0.0, 0.0),
                Vec4::new(0.0, scale.y, 0.0, 0.0),
                Vec4::new(0.0, 0.0, scale.z, 0.0),
                Vec4::W,
            ],
        }
    }

    /// Creates a right-handed orthographic projection with a `[0, 1]` depth range.
    pub fn orthographic_rh_zo(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        z_near: f32,
        z_far: f32,
    ) -> Self {
        let rml = right - left;
        let tmb = top - bottom;
        let fmn = z_far - z_near;
        Self {
            cols: [
                Vec4::new(2.0 / rml, 0.0, 0.0, 0.0),
                Vec4::new(0.0, 2.0 / tmb, 0.0, 0.0),
                Vec4::new(0.0, 0.0, -1.0 / fmn, 0.0),
                Vec4::new(-(right + left) / rml, -(top + bottom) / tmb, -z_near / fmn, 1.0),
            ],
        }
    }

    /// Transforms a point (`w` = 1.0) by this matrix.
    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        (*self * Vec4::from_vec3(point, 1.0)).truncate()
    }
}

impl Default for Mat4 {
    /// Returns the 4x4 identity matrix.
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Mat4> for Mat4 {
    type Output = Self;
    /// Multiplies this matrix by another `Mat4`. Matrix multiplication is not commutative.
    #[inline]
    fn mul(self, rhs: Mat4) -> Self::Output {
        let mut cols = [Vec4::ZERO; 4];
        for (c_idx, col) in cols.iter_mut().enumerate() {
            let rhs_col = rhs.cols[c_idx];
            *col = Vec4 {
                x: self.get_row(0).dot(rhs_col),
                y: self.get_row(1).dot(rhs_col),
                z: self.get_row(2).dot(rhs_col),
                w: self.get_row(3).dot(rhs_col),
            };
        }
        Mat4 { cols }
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    /// Transforms a `Vec4` by this matrix.
    #[inline]
    fn mul(self, rhs: Vec4) -> Self::Output {
        self.cols[0] * rhs.x + self.cols[1] * rhs.y + self.cols[2] * rhs.z + self.cols[3] * rhs.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;

    fn vec3_approx_eq(a: Vec3, b: Vec3) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
    }

    #[test]
    fn test_identity_is_neutral() {
        let t = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t * Mat4::IDENTITY, t);
        assert_eq!(Mat4::IDENTITY * t, t);
    }

    #[test]
    fn test_translation_then_scale() {
        let m = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0))
            * Mat4::from_scale(Vec3::new(2.0, 2.0, 2.0));
        let p = m.transform_point(Vec3::new(1.0, 1.0, 1.0));
        assert!(vec3_approx_eq(p, Vec3::new(3.0, 2.0, 2.0)));
    }

    #[test]
    fn test_orthographic_maps_corners() {
        let ortho = Mat4::orthographic_rh_zo(-2.0, 2.0, -1.0, 1.0, 0.0, 10.0);
        let p = ortho.transform_point(Vec3::new(2.0, 1.0, 0.0));
        assert!(vec3_approx_eq(p, Vec3::new(1.0, 1.0, 0.0)));
        let far = ortho.transform_point(Vec3::new(-2.0, -1.0, -10.0));
        assert!(vec3_approx_eq(far, Vec3::new(-1.0, -1.0, 1.0)));
    }
}
