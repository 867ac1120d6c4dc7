//! Compositor node graph stored with the scene.

use serde::{Deserialize, Serialize};

/// Identifier of a node within a node tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

/// Node types the post stage uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// Image source fed by the current render.
    RenderLayers,
    /// Block-averaging pixelation with a per-axis block size.
    Pixelate { size_x: u32, size_y: u32 },
    /// Output sink written by the render.
    Composite,
}

impl NodeKind {
    /// Display name used for new nodes.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::RenderLayers => "Render Layers",
            NodeKind::Pixelate { .. } => "Pixelate",
            NodeKind::Composite => "Composite",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositorNode {
    pub id: NodeId,
    pub name: String,
    #[serde(flatten)]
    pub kind: NodeKind,
}

/// Directed link from one node's output to another node's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLink {
    pub from: NodeId,
    pub to: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NodeTreeError {
    #[error("Unknown compositor node {0:?}")]
    UnknownNode(NodeId),

    #[error("Cannot link node {0:?} to itself")]
    SelfLink(NodeId),
}

/// Compositor node tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeTree {
    #[serde(default)]
    pub nodes: Vec<CompositorNode>,
    #[serde(default)]
    pub links: Vec<NodeLink>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every node and link.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.links.clear();
    }

    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.iter().map(|n| n.id.0 + 1).max().unwrap_or(0));
        self.nodes.push(CompositorNode {
            id,
            name: kind.label().to_string(),
            kind,
        });
        id
    }

    pub fn link(&mut self, from: NodeId, to: NodeId) -> Result<(), NodeTreeError> {
        if from == to {
            return Err(NodeTreeError::SelfLink(from));
        }
        for id in [from, to] {
            if self.node(id).is_none() {
                return Err(NodeTreeError::UnknownNode(id));
            }
        }
        self.links.push(NodeLink { from, to });
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&CompositorNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Node kinds along the linked chain starting at the first node with no
    /// incoming link. Stops at a branch, a dead end, or a revisit.
    pub fn chain(&self) -> Vec<NodeKind> {
        let Some(start) = self
            .nodes
            .iter()
            .find(|n| !self.links.iter().any(|l| l.to == n.id))
        else {
            return Vec::new();
        };

        let mut chain = vec![start.kind];
        let mut current = start.id;
        while chain.len() <= self.nodes.len() {
            let mut outgoing = self.links.iter().filter(|l| l.from == current);
            let (Some(link), None) = (outgoing.next(), outgoing.next()) else {
                break;
            };
            match self.node(link.to) {
                Some(next) => {
                    chain.push(next.kind);
                    current = next.id;
                }
                None => break,
            }
        }
        chain
    }
}
