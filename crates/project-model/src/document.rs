//! Document metadata and persistence.
//!
//! A document is the top-level container that ties the scene snapshot to
//! the render configuration persisted alongside it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::scene::Scene;
use crate::settings::RenderConfig;

/// Current document schema version.
pub const DOCUMENT_VERSION: &str = "1.0";

/// Conventional file suffix for documents.
pub const DOCUMENT_SUFFIX: &str = ".turntable.json";

/// Top-level document file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Schema version.
    pub version: String,

    /// Human-readable document name.
    pub name: String,

    /// Creation timestamp (RFC 3339).
    pub created_at: String,

    /// Last modified timestamp (RFC 3339).
    pub modified_at: String,

    /// Render settings persisted with the scene.
    #[serde(default)]
    pub render_config: RenderConfig,

    /// Scene snapshot.
    #[serde(default)]
    pub scene: Scene,
}

impl Document {
    /// Create a new document with an empty scene and default settings.
    pub fn new(name: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            version: DOCUMENT_VERSION.to_string(),
            name: name.into(),
            created_at: now.clone(),
            modified_at: now,
            render_config: RenderConfig::default(),
            scene: Scene::new(),
        }
    }
}

/// A document together with the file it was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// Path of the document file.
    pub path: PathBuf,

    pub document: Document,
}

impl LoadedDocument {
    /// Load a document from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref().to_path_buf();

        let json = std::fs::read_to_string(&path).map_err(|e| DocumentError::IoError {
            path: path.clone(),
            source: e,
        })?;

        let document: Document =
            serde_json::from_str(&json).map_err(|e| DocumentError::ParseError {
                path: path.clone(),
                source: e,
            })?;

        Ok(Self { path, document })
    }

    /// Save the document, stamping the modification time.
    pub fn save(&mut self) -> Result<(), DocumentError> {
        self.document.modified_at = chrono::Utc::now().to_rfc3339();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| DocumentError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(&self.document).map_err(|e| {
            DocumentError::ParseError {
                path: self.path.clone(),
                source: e,
            }
        })?;
        std::fs::write(&self.path, json).map_err(|e| DocumentError::IoError {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(())
    }

    /// Create a new document on disk.
    pub fn create(path: impl AsRef<Path>, document: Document) -> Result<Self, DocumentError> {
        let mut loaded = Self {
            path: path.as_ref().to_path_buf(),
            document,
        };
        loaded.save()?;
        Ok(loaded)
    }

    /// Directory `//` references resolve against.
    pub fn base_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Check the document for problems that would stop a run.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = vec![];
        let scene = &self.document.scene;

        if let Err(e) = self.document.render_config.validate() {
            errors.push(e.to_string());
        }

        if let Some(active) = scene.active_object {
            if scene.object(active).is_none() {
                errors.push(format!("Active object {active} does not exist"));
            }
        }

        for object in &scene.objects {
            if let Some(parent) = object.parent {
                if scene.object(parent).is_none() {
                    errors.push(format!(
                        "Object '{}' has missing parent {parent}",
                        object.name
                    ));
                }
            }
        }

        let mut ids: Vec<_> = scene.objects.iter().map(|o| o.id).collect();
        ids.sort();
        if ids.windows(2).any(|w| w[0] == w[1]) {
            errors.push("Duplicate object ids".to_string());
        }

        for link in &scene.compositor.links {
            if scene.compositor.node(link.from).is_none() || scene.compositor.node(link.to).is_none()
            {
                errors.push("Compositor link references a missing node".to_string());
            }
        }

        errors
    }
}

/// Errors that can occur when working with documents.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid document: {message}")]
    ValidationError { message: String },
}
