// Import LDraw parts into a scene and report or export the result.
// Run with: cargo run --bin ldr_import -- --library /opt/ldraw 3003 3001

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use ldr_core::{ImportConfig, LoadOutcome, PartImporter, Scene, SceneObject};
use serde::Serialize;

const USAGE: &str = "Usage: ldr_import [--config FILE] [--library DIR] [--json OUT] [--raw OUT] <part_id>...";

/// Environment fallback for the library root.
const LIBRARY_ENV: &str = "LDRAW_LIBRARY";

/// Command-line options
#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    library: Option<PathBuf>,
    json: Option<PathBuf>,
    raw: Option<PathBuf>,
    part_ids: Vec<String>,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut parsed = Args::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .map(PathBuf::from)
                    .with_context(|| format!("{} needs a value", flag))
            };
            match arg.as_str() {
                "--config" => parsed.config = Some(value("--config")?),
                "--library" => parsed.library = Some(value("--library")?),
                "--json" => parsed.json = Some(value("--json")?),
                "--raw" => parsed.raw = Some(value("--raw")?),
                flag if flag.starts_with("--") => bail!("unknown option {}\n{}", flag, USAGE),
                part_id => parsed.part_ids.push(part_id.to_string()),
            }
        }

        if parsed.part_ids.is_empty() {
            bail!("no part ids given\n{}", USAGE);
        }
        Ok(parsed)
    }

    fn import_config(&self) -> Result<ImportConfig> {
        let mut config = match &self.config {
            Some(path) => ImportConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ImportConfig::default(),
        };

        if let Some(library) = &self.library {
            config.library_root = library.clone();
        } else if config.library_root.as_os_str().is_empty() {
            match std::env::var_os(LIBRARY_ENV) {
                Some(root) => config.library_root = PathBuf::from(root),
                None => bail!("no library root: pass --library or set {}", LIBRARY_ENV),
            }
        }

        if !config.library_root.is_dir() {
            bail!("library root {} is not a directory", config.library_root.display());
        }
        Ok(config)
    }
}

/// One object in the JSON export.
#[derive(Serialize)]
struct ObjectDocument<'a> {
    name: &'a str,
    part_id: &'a str,
    location: [f32; 3],
    positions: Vec<[f32; 3]>,
    faces: Vec<&'a [u32]>,
}

impl<'a> From<&'a SceneObject> for ObjectDocument<'a> {
    fn from(object: &'a SceneObject) -> Self {
        Self {
            name: &object.name,
            part_id: &object.part_id,
            location: object.location.to_array(),
            positions: object.mesh.positions.iter().map(|p| p.to_array()).collect(),
            faces: object.mesh.faces.iter().map(|face| face.indices()).collect(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse(std::env::args().skip(1))?;
    let config = args.import_config()?;
    log::info!("Library root: {}", config.library_root.display());

    let importer = PartImporter::new(config);
    let mut scene = Scene::new("ldr_import");

    for part_id in &args.part_ids {
        let outcome = importer
            .load(&mut scene, part_id)
            .with_context(|| format!("loading part {}", part_id))?;
        match outcome {
            LoadOutcome::Created(name) => println!("Imported {}", name),
            LoadOutcome::AlreadyExists(name) => println!("Skipped {} (already in scene)", name),
            LoadOutcome::Unresolved(file) => println!("Skipped {} (not in library)", file),
            LoadOutcome::NotAPart(file) => println!("Skipped {} (not a part)", file),
            LoadOutcome::NotFound(name) => println!("Skipped {}", name),
        }
    }

    println!("\n=== Scene: {} ===", scene.name);
    for object in &scene.objects {
        let bounds = object.world_bounds();
        println!(
            "  {} - {} vertices, {} faces ({} triangles)",
            object.name,
            object.mesh.vertex_count(),
            object.mesh.face_count(),
            object.mesh.triangle_count()
        );
        println!(
            "       Bounds: ({:.4}, {:.4}, {:.4}) to ({:.4}, {:.4}, {:.4})",
            bounds.x.min, bounds.y.min, bounds.z.min, bounds.x.max, bounds.y.max, bounds.z.max
        );
    }
    println!("Total faces: {}", scene.total_face_count());

    if let Some(path) = &args.json {
        let documents: Vec<ObjectDocument> = scene.objects.iter().map(ObjectDocument::from).collect();
        let json = serde_json::to_string_pretty(&documents)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    if let Some(path) = &args.raw {
        let bytes: Vec<u8> = scene
            .objects
            .iter()
            .flat_map(|object| object.mesh.vertex_bytes())
            .collect();
        std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        Args::parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&["--library", "/opt/ldraw", "3003", "--json", "out.json", "3001"]).unwrap();
        assert_eq!(parsed.library, Some(PathBuf::from("/opt/ldraw")));
        assert_eq!(parsed.json, Some(PathBuf::from("out.json")));
        assert_eq!(parsed.part_ids, vec!["3003", "3001"]);
        assert!(parsed.raw.is_none());
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(args(&[]).is_err());
        assert!(args(&["--library"]).is_err());
        assert!(args(&["--verbose", "3003"]).is_err());
    }
}
