//! Keyframe collection for the active object.

use std::collections::BTreeSet;

use turntable_common::error::{TurntableError, TurntableResult};
use turntable_host_core::SceneHost;
use turntable_project_model::ObjectId;

/// Distinct integer keyframes of the active object, ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveKeyframes {
    pub object: ObjectId,
    pub object_name: String,
    pub frames: Vec<i64>,
}

/// Collapse raw keyframe positions into distinct integer frames.
///
/// Fractional positions are truncated toward zero, so 3.2 and 3.9 both
/// become frame 3. Non-finite positions are ignored.
pub fn distinct_frames(positions: impl IntoIterator<Item = f64>) -> Vec<i64> {
    positions
        .into_iter()
        .filter(|p| p.is_finite())
        .map(|p| p.trunc() as i64)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Collect the keyframes of the host's active object.
///
/// Fails with `NoActiveObject` when nothing is active and `NoKeyframes`
/// when the object carries no keyframes.
pub fn collect_keyframes<H: SceneHost + ?Sized>(host: &H) -> TurntableResult<ActiveKeyframes> {
    let object = host.active_object().ok_or(TurntableError::NoActiveObject)?;
    let object_name = host
        .object_name(object)
        .map_err(|e| TurntableError::host(e.to_string()))?;
    let positions = host
        .keyframe_positions(object)
        .map_err(|e| TurntableError::host(e.to_string()))?;

    let frames = distinct_frames(positions);
    if frames.is_empty() {
        return Err(TurntableError::no_keyframes(object_name));
    }

    tracing::debug!(
        object = %object_name,
        keyframes = frames.len(),
        first = frames[0],
        last = frames[frames.len() - 1],
        "Collected keyframes"
    );

    Ok(ActiveKeyframes {
        object,
        object_name,
        frames,
    })
}
