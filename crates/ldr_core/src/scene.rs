//! Minimal scene registry for imported parts.
//!
//! Stands in for the host application's scene: named objects placed at a
//! location, plus the 3D cursor new objects are dropped at.

use std::sync::Arc;

use ldr_math::{Aabb, Vec3};

use crate::mesh::Mesh;

/// One imported part placed in the scene.
#[derive(Clone, Debug)]
pub struct SceneObject {
    /// Display name, `"<part name> [<id>]"`
    pub name: String,

    /// Part identifier the object was loaded from
    pub part_id: String,

    /// Shared mesh geometry
    pub mesh: Arc<Mesh>,

    /// Object origin in scene space
    pub location: Vec3,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, part_id: impl Into<String>, mesh: Arc<Mesh>, location: Vec3) -> Self {
        Self {
            name: name.into(),
            part_id: part_id.into(),
            mesh,
            location,
        }
    }

    /// Mesh bounds moved to the object's location.
    pub fn world_bounds(&self) -> Aabb {
        let bounds = self.mesh.bounds;
        if bounds.is_empty() {
            return bounds;
        }
        Aabb::from_points(bounds.min() + self.location, bounds.max() + self.location)
    }
}

/// Objects keyed by unique display name, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    /// Scene name
    pub name: String,

    /// Placed objects
    pub objects: Vec<SceneObject>,

    /// Where the next imported object is placed
    pub cursor: Vec3,
}

impl Scene {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn get(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Add an object. Returns `false` and leaves the scene untouched if the
    /// name is already taken.
    pub fn add(&mut self, object: SceneObject) -> bool {
        if self.contains(&object.name) {
            return false;
        }
        self.objects.push(object);
        true
    }

    /// Remove and return the object called `name`.
    pub fn remove(&mut self, name: &str) -> Option<SceneObject> {
        let index = self.objects.iter().position(|object| object.name == name)?;
        Some(self.objects.remove(index))
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Total face count across all objects.
    pub fn total_face_count(&self) -> usize {
        self.objects.iter().map(|object| object.mesh.face_count()).sum()
    }

    /// Compute the bounding box of every object.
    pub fn world_bounds(&self) -> Aabb {
        self.objects
            .iter()
            .map(SceneObject::world_bounds)
            .fold(Aabb::empty(), |acc, bounds| Aabb::surrounding(&acc, &bounds))
    }
}
