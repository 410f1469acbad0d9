//! The unit graph.
//!
//! An arena of nodes (the processor root and the render units) with ordered
//! child-to-parent edges. The graph does not walk itself: the external
//! driver calls [`UnitGraph::prepare`] in dependency order once per frame,
//! and any unit flagged dirty redoes its full locate/allocate/attach
//! sequence before it is next evaluated. Dirtying a unit does not cascade;
//! dependents observe a changed output identity on their next locate pass.

pub mod processor;
pub mod slots;

use std::collections::HashMap;

use crate::context::traits::RenderContext;
use crate::graph::processor::{BufferComponent, Processor};
use crate::graph::slots::SlotTable;
use crate::resources::texture::TextureRef;
use crate::unit::{RenderUnit, UnitKind, Viewport, ViewportReference};

/// Handle to a node in the graph. Only valid within the graph that
/// created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn new(index: u32) -> Self {
        Self(index)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node of the graph.
#[derive(Debug)]
pub enum Node {
    Processor(Processor),
    Unit(RenderUnit),
}

impl Node {
    pub fn is_processor(&self) -> bool {
        matches!(self, Node::Processor(_))
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Node::Unit(_))
    }

    pub fn as_unit(&self) -> Option<&RenderUnit> {
        match self {
            Node::Unit(unit) => Some(unit),
            Node::Processor(_) => None,
        }
    }
}

/// Snapshot of one parent a unit sees during its locate phase.
///
/// Views hold cheap `Arc` clones, which keeps lifecycle runs free of
/// aliasing between the mutated unit and its parents.
pub(crate) enum ParentView {
    Processor {
        viewport: Option<Viewport>,
        attachments: HashMap<BufferComponent, TextureRef>,
    },
    Unit {
        outputs: SlotTable,
    },
}

/// A post-processing graph: processor root plus render units.
#[derive(Debug, Default)]
pub struct UnitGraph {
    nodes: Vec<Node>,
    /// Edges stored as (child, parent) pairs, in connection order.
    edges: Vec<(NodeId, NodeId)>,
}

impl UnitGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the graph root.
    pub fn add_processor(&mut self, processor: Processor) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(Node::Processor(processor));
        id
    }

    /// Add a render unit.
    pub fn add_unit(&mut self, unit: RenderUnit) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(Node::Unit(unit));
        id
    }

    /// Connect `child` below `parent`. Parent order is connection order and
    /// determines input slot assignment. Rewiring dirties the child.
    pub fn connect(&mut self, child: NodeId, parent: NodeId) {
        assert!(child.index() < self.nodes.len(), "invalid child handle");
        assert!(parent.index() < self.nodes.len(), "invalid parent handle");
        assert!(child != parent, "node cannot be its own parent");
        assert!(
            self.nodes[child.index()].is_unit(),
            "only units can have parents"
        );

        let exists = self
            .edges
            .iter()
            .any(|&(c, p)| c == child && p == parent);
        if !exists {
            self.edges.push((child, parent));
            if let Node::Unit(unit) = &mut self.nodes[child.index()] {
                unit.mark_dirty();
            }
        }
    }

    /// Remove the edge between `child` and `parent`, dirtying the child.
    pub fn disconnect(&mut self, child: NodeId, parent: NodeId) {
        let before = self.edges.len();
        self.edges.retain(|&(c, p)| !(c == child && p == parent));
        if self.edges.len() != before {
            if let Node::Unit(unit) = &mut self.nodes[child.index()] {
                unit.mark_dirty();
            }
        }
    }

    /// Ordered parents of a node.
    pub fn parents(&self, child: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.edges
            .iter()
            .filter(move |&&(c, _)| c == child)
            .map(|&(_, p)| p)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn unit(&self, id: NodeId) -> Option<&RenderUnit> {
        self.nodes.get(id.index()).and_then(Node::as_unit)
    }

    pub fn unit_mut(&mut self, id: NodeId) -> Option<&mut RenderUnit> {
        match self.nodes.get_mut(id.index()) {
            Some(Node::Unit(unit)) => Some(unit),
            _ => None,
        }
    }

    pub fn processor(&self, id: NodeId) -> Option<&Processor> {
        match self.nodes.get(id.index()) {
            Some(Node::Processor(processor)) => Some(processor),
            _ => None,
        }
    }

    pub fn processor_mut(&mut self, id: NodeId) -> Option<&mut Processor> {
        match self.nodes.get_mut(id.index()) {
            Some(Node::Processor(processor)) => Some(processor),
            _ => None,
        }
    }

    /// Run the lifecycle of one unit if it is flagged dirty. The caller
    /// supplies dependency order; this call never recurses into parents.
    pub fn prepare(&mut self, id: NodeId, ctx: &mut dyn RenderContext) {
        let needs_init = matches!(
            self.nodes.get(id.index()),
            Some(Node::Unit(unit)) if unit.is_dirty()
        );
        if !needs_init {
            return;
        }
        let views = self.parent_views(id);
        if let Some(Node::Unit(unit)) = self.nodes.get_mut(id.index()) {
            unit.initialize(&views, ctx);
        }
    }

    /// Prepare every unit in insertion order. Correct when units were added
    /// in dependency order, which graph construction naturally produces.
    pub fn prepare_all(&mut self, ctx: &mut dyn RenderContext) {
        for index in 0..self.nodes.len() {
            self.prepare(NodeId::new(index as u32), ctx);
        }
    }

    /// Change the active viewport: updates the processor and resizes every
    /// non-explicitly-sized unit's owned outputs in place, preserving
    /// texture identity for all dependents.
    pub fn set_viewport(&mut self, processor: NodeId, viewport: Viewport) {
        match self.nodes.get_mut(processor.index()) {
            Some(Node::Processor(root)) => root.set_viewport(viewport),
            _ => {
                log::warn!("set_viewport called with a non-processor handle");
                return;
            }
        }
        for node in &mut self.nodes {
            if let Node::Unit(unit) = node {
                // a surfaced target attachment keeps its native size; its
                // unit's viewport stays bound to that attachment
                if matches!(unit.kind(), UnitKind::TargetBypass(_)) {
                    continue;
                }
                if !matches!(unit.viewport_reference(), ViewportReference::Explicit(_)) {
                    unit.apply_viewport(viewport);
                }
            }
        }
    }

    fn parent_views(&self, child: NodeId) -> Vec<ParentView> {
        self.parents(child)
            .filter_map(|parent| match self.nodes.get(parent.index()) {
                Some(Node::Processor(processor)) => Some(ParentView::Processor {
                    viewport: processor.viewport(),
                    attachments: processor.attachments_map().clone(),
                }),
                Some(Node::Unit(unit)) => Some(ParentView::Unit {
                    outputs: unit.outputs().clone(),
                }),
                None => None,
            })
            .collect()
    }
}
