//! Update a document's render settings.

use std::path::PathBuf;

use super::{load_document, save_document};

/// Fields to overwrite; `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct Changes {
    pub base_name: Option<String>,
    pub step_angle: Option<u32>,
    pub output: Option<String>,
    pub post_output: Option<String>,
    pub compositing: Option<bool>,
    pub pixel_size: Option<u32>,
    pub restore: Option<bool>,
    pub compensate_reparent: Option<bool>,
}

pub fn run(path: PathBuf, changes: Changes) -> anyhow::Result<()> {
    let mut loaded = load_document(&path)?;
    let config = &mut loaded.document.render_config;

    if let Some(v) = changes.base_name {
        config.base_name = v;
    }
    if let Some(v) = changes.step_angle {
        config.step_angle = v;
    }
    if let Some(v) = changes.output {
        config.output_path = v;
    }
    if let Some(v) = changes.post_output {
        config.post_output_path = v;
    }
    if let Some(v) = changes.compositing {
        config.compositing = v;
    }
    if let Some(v) = changes.pixel_size {
        config.pixel_size = v;
    }
    if let Some(v) = changes.restore {
        config.restore_scene_state = v;
    }
    if let Some(v) = changes.compensate_reparent {
        config.compensate_reparent = v;
    }

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid render settings: {e}"))?;

    let summary = format!("{config:#?}");
    save_document(&mut loaded)?;
    tracing::info!(path = %loaded.path.display(), "Updated render settings");

    println!("Render settings saved to {}", loaded.path.display());
    println!("{summary}");
    Ok(())
}
