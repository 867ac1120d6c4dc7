pub mod configure;
pub mod info;
pub mod init;
pub mod plan;
pub mod render;
pub mod scene;
pub mod validate;

use std::path::Path;

use turntable_host_core::{MemoryHost, RecordingRenderer};
use turntable_project_model::LoadedDocument;

pub(crate) fn load_document(path: &Path) -> anyhow::Result<LoadedDocument> {
    LoadedDocument::load(path).map_err(|e| anyhow::anyhow!("Failed to load document: {e}"))
}

pub(crate) fn save_document(document: &mut LoadedDocument) -> anyhow::Result<()> {
    document
        .save()
        .map_err(|e| anyhow::anyhow!("Failed to save document: {e}"))
}

/// Host over the document's scene that renders nothing.
pub(crate) fn recording_host(document: &LoadedDocument) -> MemoryHost<RecordingRenderer> {
    MemoryHost::new(document.document.scene.clone(), RecordingRenderer::new())
        .with_document(&document.path)
}
