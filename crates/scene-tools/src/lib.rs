//! Turntable Scene Tools
//!
//! One-shot scene preparation helpers run before a turntable render:
//! - **Cleanup:** Delete every empty and merge the selected meshes
//! - **Root:** Create a `ROOT` empty at the origin and parent the selection to it
//!
//! Both operate through [`turntable_host_core::SceneHost`] and never render.

pub mod cleanup;
pub mod root;

pub use cleanup::{remove_empties_and_merge, CleanupReport};
pub use root::{create_root_and_reparent, RootReport, ROOT_NAME};

use turntable_common::error::TurntableError;
use turntable_host_core::HostError;

pub(crate) fn host_error(e: HostError) -> TurntableError {
    TurntableError::host(e.to_string())
}
