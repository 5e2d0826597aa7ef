// Transform utilities for Mat4
//
// LDraw placement matrices and the host coordinate fix-up, plus a few
// extensions on glam::Mat4 used while flattening sub-file geometry.

use glam::{Mat4, Vec3, Vec4};
use crate::Aabb;

/// Build the affine matrix of an LDraw type-1 line.
///
/// `linear` holds the nine coefficients `a b c d e f g h i` in line order.
/// A local point `(u, v, w)` maps to
/// `(a*u + b*v + c*w + x, d*u + e*v + f*w + y, g*u + h*v + i*w + z)`.
pub fn ldraw_matrix(translation: Vec3, linear: [f32; 9]) -> Mat4 {
    let [a, b, c, d, e, f, g, h, i] = linear;
    Mat4::from_cols(
        Vec4::new(a, d, g, 0.0),
        Vec4::new(b, e, h, 0.0),
        Vec4::new(c, f, i, 0.0),
        translation.extend(1.0),
    )
}

/// LDraw is -Y up in LDU; hosts are usually +Z up in meters.
///
/// Scales uniformly, then rotates -90 degrees about X.
pub fn z_up_fixup(scale: f32) -> Mat4 {
    Mat4::from_rotation_x(-std::f32::consts::FRAC_PI_2) * Mat4::from_scale(Vec3::splat(scale))
}

/// Extension trait for Mat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Exact comparison against the identity matrix.
    fn is_identity(&self) -> bool;

    /// `transform_point3`, skipping the multiply for the identity.
    fn place_point(&self, point: Vec3) -> Vec3;

    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;
}

impl Mat4Ext for Mat4 {
    fn is_identity(&self) -> bool {
        *self == Mat4::IDENTITY
    }

    fn place_point(&self, point: Vec3) -> Vec3 {
        if self.is_identity() {
            point
        } else {
            self.transform_point3(point)
        }
    }

    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        if aabb.is_empty() {
            return *aabb;
        }

        let (lo, hi) = (aabb.min(), aabb.max());
        let corners = [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ];

        corners
            .iter()
            .fold(Aabb::empty(), |acc, &corner| acc.include_point(self.transform_point3(corner)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCALE_2: [f32; 9] = [2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.0];

    #[test]
    fn test_ldraw_matrix_identity() {
        let mat = ldraw_matrix(Vec3::ZERO, [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        assert!(mat.is_identity());
    }

    #[test]
    fn test_ldraw_matrix_row_convention() {
        // a..i are the rows of the linear part: x' = a*u + b*v + c*w + x
        let mat = ldraw_matrix(
            Vec3::new(10.0, 20.0, 30.0),
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
        );
        let p = mat.transform_point3(Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(p, Vec3::new(16.0, 35.0, 54.0));

        let p = mat.transform_point3(Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(p, Vec3::new(12.0, 25.0, 38.0));
    }

    #[test]
    fn test_ldraw_matrix_scaled_translation() {
        let mat = ldraw_matrix(Vec3::new(1.0, 0.0, 0.0), SCALE_2);
        assert_eq!(mat.place_point(Vec3::ZERO), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(mat.place_point(Vec3::new(1.0, 0.0, 0.0)), Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(mat.place_point(Vec3::new(0.0, 1.0, 0.0)), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_composition_applies_inner_first() {
        let inner = ldraw_matrix(Vec3::new(1.0, 0.0, 0.0), SCALE_2);
        let outer = ldraw_matrix(Vec3::new(0.0, 5.0, 0.0), [0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        let raw = Vec3::new(1.0, 1.0, 0.0);

        let stepwise = outer.place_point(inner.place_point(raw));
        let composed = (outer * inner).place_point(raw);

        assert!((stepwise - composed).length() < 0.001);
        assert!((composed - Vec3::new(-2.0, 8.0, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_place_point_identity() {
        let point = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Mat4::IDENTITY.place_point(point), point);
    }

    #[test]
    fn test_z_up_fixup() {
        let mat = z_up_fixup(0.5);
        // LDraw "up" is -Y
        let up = mat.transform_point3(Vec3::new(0.0, -2.0, 0.0));
        assert!((up - Vec3::new(0.0, 0.0, 1.0)).length() < 0.001);

        let right = mat.transform_point3(Vec3::new(4.0, 0.0, 0.0));
        assert!((right - Vec3::new(2.0, 0.0, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_transform_aabb_translation() {
        let mat = Mat4::from_translation(Vec3::new(5.0, 5.0, 5.0));
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        let transformed = mat.transform_aabb(&aabb);

        assert!((transformed.min() - Vec3::new(5.0, 5.0, 5.0)).length() < 0.001);
        assert!((transformed.max() - Vec3::new(6.0, 6.0, 6.0)).length() < 0.001);
    }
}
