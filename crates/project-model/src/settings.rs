//! Per-document render configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::document::DocumentError;

/// Prefix marking a directory reference relative to the document.
pub const DOCUMENT_RELATIVE_PREFIX: &str = "//";

/// Pixelation block size used when none is configured.
pub const DEFAULT_PIXEL_SIZE: u32 = 5;

/// User-editable render settings persisted with the document.
///
/// A run reads this once, by value, before planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Base filename for rendered images.
    pub base_name: String,

    /// Rotation step in degrees, 1..=360.
    pub step_angle: u32,

    /// Directory for raw renders (`//` = document location).
    pub output_path: String,

    /// Directory for composited renders.
    pub post_output_path: String,

    /// Whether each job also renders through the pixelation compositor.
    pub compositing: bool,

    /// Pixelation block size applied to both axes.
    pub pixel_size: u32,

    /// Restore yaw, frame, and render path after a run.
    pub restore_scene_state: bool,

    /// Keep world transforms when parenting under a new root.
    pub compensate_reparent: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            base_name: "my_render".to_string(),
            step_angle: 45,
            output_path: DOCUMENT_RELATIVE_PREFIX.to_string(),
            post_output_path: "//pixel/".to_string(),
            compositing: false,
            pixel_size: DEFAULT_PIXEL_SIZE,
            restore_scene_state: false,
            compensate_reparent: false,
        }
    }
}

impl RenderConfig {
    pub const MIN_STEP_ANGLE: u32 = 1;
    pub const MAX_STEP_ANGLE: u32 = 360;

    /// Check field ranges.
    pub fn validate(&self) -> Result<(), DocumentError> {
        if self.base_name.trim().is_empty() {
            return Err(DocumentError::ValidationError {
                message: "base_name must not be empty".to_string(),
            });
        }
        if self.base_name.contains(['/', '\\']) {
            return Err(DocumentError::ValidationError {
                message: format!(
                    "base_name must not contain path separators: {}",
                    self.base_name
                ),
            });
        }
        if !(Self::MIN_STEP_ANGLE..=Self::MAX_STEP_ANGLE).contains(&self.step_angle) {
            return Err(DocumentError::ValidationError {
                message: format!(
                    "step_angle must be in {}..={}, got {}",
                    Self::MIN_STEP_ANGLE,
                    Self::MAX_STEP_ANGLE,
                    self.step_angle
                ),
            });
        }
        if self.compositing && self.pixel_size == 0 {
            return Err(DocumentError::ValidationError {
                message: "pixel_size must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Resolved raw output directory.
    pub fn output_dir(&self, document_dir: Option<&Path>) -> PathBuf {
        resolve_dir(&self.output_path, document_dir)
    }

    /// Resolved post output directory.
    pub fn post_output_dir(&self, document_dir: Option<&Path>) -> PathBuf {
        resolve_dir(&self.post_output_path, document_dir)
    }
}

/// Resolve a directory reference. A leading `//` is relative to
/// `document_dir`, or the working directory for an unsaved document.
pub fn resolve_dir(reference: &str, document_dir: Option<&Path>) -> PathBuf {
    match reference.strip_prefix(DOCUMENT_RELATIVE_PREFIX) {
        Some(rest) => {
            let base = document_dir
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            if rest.is_empty() {
                base
            } else {
                base.join(rest)
            }
        }
        None => PathBuf::from(reference),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = RenderConfig::default();
        config.validate().unwrap();
        assert_eq!(config.pixel_size, DEFAULT_PIXEL_SIZE);
        assert!(!config.compositing);
    }

    #[test]
    fn test_validate_rejects_out_of_range_step() {
        for step in [0, 361] {
            let config = RenderConfig {
                step_angle: step,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "step {step} accepted");
        }
        let config = RenderConfig {
            step_angle: 360,
            ..Default::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_empty_base_name() {
        let config = RenderConfig {
            base_name: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_document_relative() {
        let doc = Path::new("/projects/robot");
        assert_eq!(resolve_dir("//", Some(doc)), PathBuf::from("/projects/robot"));
        assert_eq!(
            resolve_dir("//renders/", Some(doc)),
            PathBuf::from("/projects/robot/renders/")
        );
        assert_eq!(resolve_dir("/abs/out", Some(doc)), PathBuf::from("/abs/out"));
        assert_eq!(resolve_dir("//out", None), PathBuf::from("./out"));
    }

    proptest::proptest! {
        #[test]
        fn prop_step_range_matches_validation(step in 0u32..1000) {
            let config = RenderConfig {
                step_angle: step,
                ..Default::default()
            };
            let in_range = (RenderConfig::MIN_STEP_ANGLE..=RenderConfig::MAX_STEP_ANGLE)
                .contains(&step);
            proptest::prop_assert_eq!(config.validate().is_ok(), in_range);
        }

        #[test]
        fn prop_relative_dirs_stay_under_document(name in "[a-z]{1,12}") {
            let doc = Path::new("/projects/robot");
            let dir = resolve_dir(&format!("//{name}"), Some(doc));
            proptest::prop_assert!(dir.starts_with(doc));
        }
    }
}
