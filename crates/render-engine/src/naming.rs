//! Output file naming.
//!
//! `{dir}/{base}_{n}.png` for raw renders and `{post_dir}/{base}_{n}_pixel.png`
//! for composited ones. Indices are not zero-padded.

use std::path::{Path, PathBuf};

/// Output image extension.
pub const OUTPUT_EXTENSION: &str = "png";

/// Suffix added to post-processed renders.
pub const POST_SUFFIX: &str = "_pixel";

/// Pipeline stage an output belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputStage {
    /// Plain render.
    Raw,
    /// Render through the compositor graph.
    Post,
}

/// Maps sequence indices to output paths. Performs no filesystem access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNamer {
    base_name: String,
    raw_dir: PathBuf,
    post_dir: Option<PathBuf>,
}

impl OutputNamer {
    pub fn new(base_name: impl Into<String>, raw_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_name: base_name.into(),
            raw_dir: raw_dir.into(),
            post_dir: None,
        }
    }

    /// Set the directory for post-stage outputs.
    pub fn with_post_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.post_dir = Some(dir.into());
        self
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Directory for a stage. Post outputs fall back to the raw directory
    /// when no post directory is configured.
    pub fn dir(&self, stage: OutputStage) -> &Path {
        match stage {
            OutputStage::Raw => &self.raw_dir,
            OutputStage::Post => self.post_dir.as_deref().unwrap_or(&self.raw_dir),
        }
    }

    pub fn file_name(&self, sequence_index: u32, stage: OutputStage) -> String {
        let suffix = match stage {
            OutputStage::Raw => "",
            OutputStage::Post => POST_SUFFIX,
        };
        format!(
            "{}_{sequence_index}{suffix}.{OUTPUT_EXTENSION}",
            self.base_name
        )
    }

    pub fn path(&self, sequence_index: u32, stage: OutputStage) -> PathBuf {
        self.dir(stage).join(self.file_name(sequence_index, stage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_raw_and_post_names() {
        let namer = OutputNamer::new("my_render", "/out").with_post_dir("/out/pixel");
        assert_eq!(
            namer.path(1, OutputStage::Raw),
            PathBuf::from("/out/my_render_1.png")
        );
        assert_eq!(
            namer.path(12, OutputStage::Post),
            PathBuf::from("/out/pixel/my_render_12_pixel.png")
        );
    }

    #[test]
    fn test_indices_are_not_padded() {
        let namer = OutputNamer::new("shot", ".");
        assert_eq!(namer.file_name(7, OutputStage::Raw), "shot_7.png");
        assert_eq!(namer.file_name(100, OutputStage::Raw), "shot_100.png");
    }

    #[test]
    fn test_post_falls_back_to_raw_dir() {
        let namer = OutputNamer::new("shot", "/renders");
        assert_eq!(namer.dir(OutputStage::Post), Path::new("/renders"));
        assert_ne!(
            namer.path(1, OutputStage::Raw),
            namer.path(1, OutputStage::Post)
        );
    }

    proptest! {
        #[test]
        fn prop_names_are_injective(count in 1u32..2000) {
            let namer = OutputNamer::new("r", "/o").with_post_dir("/p");
            for stage in [OutputStage::Raw, OutputStage::Post] {
                let paths: HashSet<_> = (1..=count).map(|i| namer.path(i, stage)).collect();
                prop_assert_eq!(paths.len() as u32, count);
            }
        }
    }
}
