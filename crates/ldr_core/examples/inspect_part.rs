//! Example: Flatten an LDraw part and inspect the raw result.
//!
//! Run with: cargo run --example inspect_part -- /opt/ldraw 3003

use std::env;

use ldr_core::{ImportConfig, PartImporter};
use ldr_math::Aabb;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        println!("Usage: inspect_part <ldraw-library> <part-id>");
        println!("\nExamples:");
        println!("  cargo run --example inspect_part -- /opt/ldraw 3003");
        println!("  RUST_LOG=debug cargo run --example inspect_part -- /opt/ldraw 3001");
        return;
    }

    let importer = PartImporter::new(ImportConfig::with_library(&args[1]));
    let part_id = &args[2];
    println!("Flattening part: {}", part_id);

    match importer.flatten(part_id) {
        Ok(Some(session)) => {
            println!("\n=== {} ===", session.part_name().unwrap_or("(unnamed)"));
            println!("Files parsed: {}", session.files_parsed());
            println!("Vertices: {}", session.vertex_count());
            println!("Faces: {}", session.face_count());

            let bounds = Aabb::from_iter_points(&session.vertices);
            println!(
                "Bounds: ({:.2}, {:.2}, {:.2}) to ({:.2}, {:.2}, {:.2})",
                bounds.x.min, bounds.y.min, bounds.z.min, bounds.x.max, bounds.y.max, bounds.z.max
            );

            println!("\n--- Files with a leading comment ---");
            for name in &session.part_names {
                println!("  {}", name);
            }

            if !session.diagnostics.is_empty() {
                println!("\n--- Skipped ---");
                for diagnostic in &session.diagnostics {
                    println!("  {:?}", diagnostic);
                }
            }
        }
        Ok(None) => {
            println!("'{}' is not a part in this library", part_id);
        }
        Err(e) => {
            eprintln!("Error flattening part: {}", e);
        }
    }
}
