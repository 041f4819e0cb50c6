//! Binary to generate/update .expected.go and .expected.err fixture files
//!
//! Usage:
//!   cargo run --bin accept_expected            # Update all
//!   cargo run --bin accept_expected -- basic   # Update only fixtures matching "basic"

use std::fs;
use std::path::Path;
use struct_mapper::{Pipeline, import_config};
use walkdir::WalkDir;

fn main() {
    let filter: Option<String> = std::env::args().nth(1);
    let fixture_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");

    let mut updated = 0;
    let mut skipped = 0;

    for entry in WalkDir::new(&fixture_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|s| s == "json"))
    {
        let path = entry.path();

        if let Some(ref f) = filter {
            if !path.to_string_lossy().contains(f) {
                skipped += 1;
                continue;
            }
        }

        process_file(path);
        updated += 1;
    }

    println!("Updated {} files, skipped {}", updated, skipped);
}

fn process_file(path: &Path) {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {:?}: {}", path, e);
            return;
        }
    };

    let config = match import_config(&source) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {:?} is not a valid project: {}", path, e);
            return;
        }
    };

    let result = Pipeline::standard().compile(&config);

    let (written, stale, contents) = match &result.file {
        Some(file) => (path.with_extension("expected.go"), path.with_extension("expected.err"), file.clone()),
        None => (
            path.with_extension("expected.err"),
            path.with_extension("expected.go"),
            format!("{}\n", result.unit.errors.join("\n")),
        ),
    };

    if let Err(e) = fs::write(&written, contents) {
        eprintln!("Failed to write {:?}: {}", written, e);
        return;
    }
    println!("  wrote {}", written.display());

    // Outcome flipped since the last run
    if stale.exists() {
        let _ = fs::remove_file(&stale);
    }
}
