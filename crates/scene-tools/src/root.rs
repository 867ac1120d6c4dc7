//! Root empty creation and reparenting.

use glam::Vec3;
use serde::Serialize;
use turntable_common::error::TurntableResult;
use turntable_host_core::SceneHost;
use turntable_project_model::ObjectId;

use crate::host_error;

/// Name requested for the root empty. The host may suffix it when taken.
pub const ROOT_NAME: &str = "ROOT";

/// Outcome of [`create_root_and_reparent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootReport {
    pub root: ObjectId,
    pub root_name: String,
    /// Objects now parented to the root, in selection order.
    pub reparented: Vec<ObjectId>,
}

/// Create an empty named `ROOT` at the world origin and parent every
/// previously selected object to it.
///
/// When `keep_world_transform` is false children keep their local transform
/// and therefore move with the root's frame. The root ends up active and
/// selected.
pub fn create_root_and_reparent<H: SceneHost + ?Sized>(
    host: &mut H,
    keep_world_transform: bool,
) -> TurntableResult<RootReport> {
    let snapshot = host.selected_objects();

    let root = host.create_empty(ROOT_NAME, Vec3::ZERO).map_err(host_error)?;
    let root_name = host.object_name(root).map_err(host_error)?;

    let mut reparented = Vec::with_capacity(snapshot.len());
    for child in snapshot.into_iter().filter(|id| *id != root) {
        host.set_parent(child, root, keep_world_transform)
            .map_err(host_error)?;
        reparented.push(child);
    }

    tracing::info!(
        root = %root_name,
        children = reparented.len(),
        keep_world_transform,
        "Created root and reparented selection"
    );

    Ok(RootReport {
        root,
        root_name,
        reparented,
    })
}
