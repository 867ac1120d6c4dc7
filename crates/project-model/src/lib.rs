//! Turntable Project Model
//!
//! Defines the persisted data contracts for Turntable documents:
//! - **Scene:** Objects, transforms, animation curves, selection, render settings
//! - **Compositor:** The node graph applied to renders in the post stage
//! - **Settings:** The per-document render configuration
//! - **Document:** Top-level file that ties the scene and settings together
//! - **Checkpoint:** Progress record used to resume an aborted run
//!
//! Directory references that begin with `//` are relative to the document.

pub mod checkpoint;
pub mod compositor;
pub mod document;
pub mod scene;
pub mod settings;

pub use checkpoint::*;
pub use compositor::*;
pub use document::*;
pub use scene::*;
pub use settings::*;
