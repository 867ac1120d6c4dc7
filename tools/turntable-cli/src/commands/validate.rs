//! Validate a Turntable document.

use std::path::PathBuf;

use turntable_render_engine::keyframes::collect_keyframes;

use super::{load_document, recording_host};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating document at: {}", path.display());

    let loaded = load_document(&path)?;
    let d = &loaded.document;

    println!("  Name: {}", d.name);
    println!("  Version: {}", d.version);
    println!("  Objects: {}", d.scene.len());

    let mut errors = loaded.validate();

    // Not fatal to the document, but a render would stop here.
    if let Err(e) = collect_keyframes(&recording_host(&loaded)) {
        errors.push(e.to_string());
    }

    if errors.is_empty() {
        println!("\nDocument is valid.");
    } else {
        println!("\nValidation issues:");
        for error in &errors {
            println!("  - {error}");
        }
        println!(
            "\n{} issue(s) found. A render would not complete.",
            errors.len()
        );
    }

    Ok(())
}
