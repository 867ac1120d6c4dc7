//! Pixelation compositor setup.
//!
//! The post stage runs every render through a fixed three-node graph:
//!
//! ```text
//! Render Layers ──► Pixelate (size x size) ──► Composite
//! ```
//!
//! The graph is rebuilt from scratch on every call; existing nodes and
//! links are discarded, never patched.

use turntable_common::error::{TurntableError, TurntableResult};
use turntable_host_core::CompositorHost;
use turntable_project_model::{NodeId, NodeKind};

/// Node ids of a freshly built pixelation graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelateGraph {
    pub source: NodeId,
    pub pixelate: NodeId,
    pub sink: NodeId,
}

/// Enable compositing and replace the node tree with
/// source → pixelate → sink.
pub fn configure_pixelate_graph<H: CompositorHost + ?Sized>(
    host: &mut H,
    pixel_size: u32,
) -> TurntableResult<PixelateGraph> {
    if pixel_size == 0 {
        return Err(TurntableError::invalid_config(
            "pixel size must be at least 1",
        ));
    }

    let host_err = |e: turntable_host_core::HostError| TurntableError::host(e.to_string());

    host.enable_compositing().map_err(host_err)?;
    host.clear_compositor().map_err(host_err)?;

    let source = host
        .add_compositor_node(NodeKind::RenderLayers)
        .map_err(host_err)?;
    let pixelate = host
        .add_compositor_node(NodeKind::Pixelate {
            size_x: pixel_size,
            size_y: pixel_size,
        })
        .map_err(host_err)?;
    let sink = host
        .add_compositor_node(NodeKind::Composite)
        .map_err(host_err)?;

    host.link_compositor_nodes(source, pixelate)
        .map_err(host_err)?;
    host.link_compositor_nodes(pixelate, sink).map_err(host_err)?;

    tracing::debug!(pixel_size, "Configured pixelation compositor");

    Ok(PixelateGraph {
        source,
        pixelate,
        sink,
    })
}
