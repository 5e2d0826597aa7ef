//! Loading parts by identifier into a [`Scene`].
//!
//! A load resolves `<id>.dat`, flattens it, names the result
//! `"<part name> [<id>]"`, cleans up the mesh and places it at the scene
//! cursor. Every "nothing to do" case is an [`LoadOutcome`] variant; only a
//! root file that exists but cannot be read is an error.

use std::sync::Arc;

use ldr_math::Mat4;
use thiserror::Error;

use crate::config::ImportConfig;
use crate::ldraw::{GeometryParser, ParseError, ParseSession};
use crate::mesh::Mesh;
use crate::resolver::{derive_id, id_to_filename, LibraryResolver};
use crate::scene::{Scene, SceneObject};

/// Errors that abort a load or replace.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Root part file unreadable: {0}")]
    RootUnreadable(#[from] ParseError),
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// What a load or replace did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A new object with this name was added.
    Created(String),

    /// An object with this name already exists; nothing was imported.
    AlreadyExists(String),

    /// The file is not in the library (external or unavailable model).
    Unresolved(String),

    /// The file resolved but is a primitive or sub-part, not a part.
    NotAPart(String),

    /// `replace` named no object, or an object without an `[id]` suffix.
    NotFound(String),
}

impl LoadOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, LoadOutcome::Created(_))
    }
}

/// Build the display name of a loaded part.
///
/// Falls back to the bare identifier when the file had no leading comment.
pub fn display_name(part_name: Option<&str>, part_id: &str) -> String {
    match part_name {
        Some(name) if !name.is_empty() => format!("{} [{}]", name, part_id),
        _ => format!("{} [{}]", part_id, part_id),
    }
}

/// Parse the `[id]` suffix out of an object name.
///
/// `"Brick  2 x  2 [3003]"` -> `Some("3003")`. The identifier must be ASCII
/// alphanumeric and close the name.
pub fn extract_part_id(object_name: &str) -> Option<&str> {
    let inner = object_name.strip_suffix(']')?;
    let open = inner.rfind('[')?;
    let id = &inner[open + 1..];
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(id)
    } else {
        None
    }
}

/// Loads LDraw parts from one library into scenes.
#[derive(Clone, Debug)]
pub struct PartImporter {
    config: ImportConfig,
    resolver: LibraryResolver,
}

impl PartImporter {
    pub fn new(config: ImportConfig) -> Self {
        let resolver = LibraryResolver::from_config(&config);
        Self { config, resolver }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn resolver(&self) -> &LibraryResolver {
        &self.resolver
    }

    /// Flatten the part `part_id` without touching any scene.
    ///
    /// `Ok(None)` when the identifier does not resolve or is not a part.
    pub fn flatten(&self, part_id: &str) -> LoadResult<Option<ParseSession>> {
        let filename = id_to_filename(part_id);
        let Some(path) = self.resolver.resolve(&filename) else {
            return Ok(None);
        };
        if !self.resolver.is_instantiable_part(&filename) {
            return Ok(None);
        }

        let mut session = ParseSession::new();
        GeometryParser::from_config(&self.resolver, &self.config).parse(
            &path,
            Mat4::IDENTITY,
            &mut session,
        )?;
        Ok(Some(session))
    }

    /// Import `part_id` into `scene` at the scene cursor.
    pub fn load(&self, scene: &mut Scene, part_id: &str) -> LoadResult<LoadOutcome> {
        log::info!("load: {}", part_id);
        let filename = id_to_filename(part_id);

        let Some(path) = self.resolver.resolve(&filename) else {
            log::info!("'{}' is not in the library, skipping", filename);
            return Ok(LoadOutcome::Unresolved(filename));
        };
        if !self.resolver.is_instantiable_part(&filename) {
            log::info!("'{}' is not a part, skipping", filename);
            return Ok(LoadOutcome::NotAPart(filename));
        }

        let mut session = ParseSession::new();
        GeometryParser::from_config(&self.resolver, &self.config).parse(
            &path,
            Mat4::IDENTITY,
            &mut session,
        )?;

        let id = derive_id(&filename);
        let name = display_name(session.part_name(), &id);
        if scene.contains(&name) {
            log::info!("'{}' already exists, nothing imported", name);
            return Ok(LoadOutcome::AlreadyExists(name));
        }

        let mut mesh = Mesh::from_session(&session);
        mesh.cleanup(&self.config.cleanup);
        log::info!(
            "Loaded '{}': {} files, {} vertices, {} faces, {} skipped",
            name,
            session.files_parsed(),
            mesh.vertex_count(),
            mesh.face_count(),
            session.diagnostics.len()
        );

        let location = scene.cursor;
        scene.add(SceneObject::new(name.clone(), id, Arc::new(mesh), location));
        Ok(LoadOutcome::Created(name))
    }

    /// Replace the object `object_name` with a fresh load of its part.
    ///
    /// The new object lands where the old one was; the scene cursor is
    /// restored afterwards.
    pub fn replace(&self, scene: &mut Scene, object_name: &str) -> LoadResult<LoadOutcome> {
        log::info!("replace: {}", object_name);
        let (Some(object), Some(part_id)) = (scene.get(object_name), extract_part_id(object_name)) else {
            return Ok(LoadOutcome::NotFound(object_name.to_string()));
        };
        let location = object.location;
        let part_id = part_id.to_string();

        let saved_cursor = scene.cursor;
        scene.cursor = location;
        scene.remove(object_name);

        let outcome = self.load(scene, &part_id);
        scene.cursor = saved_cursor;
        outcome
    }
}
