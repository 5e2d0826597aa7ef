// Re-export glam for convenience
pub use glam::*;

// LDR math types
mod aabb;
mod interval;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use transform::{ldraw_matrix, z_up_fixup, Mat4Ext};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_creation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_reexports_compose() {
        let m = ldraw_matrix(Vec3::new(1.0, 0.0, 0.0), [2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.0]);
        let bounds = m.transform_aabb(&Aabb::from_points(Vec3::ZERO, Vec3::ONE));
        assert_eq!(bounds.x, Interval::new(1.0, 3.0));
    }
}
