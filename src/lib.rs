//! postfx-graph - A render-unit graph for GPU image post-processing pipelines
//!
//! Post-processing effects (bloom, depth-of-field, tone mapping) are built as
//! a directed graph of render units. Each unit consumes the textures produced
//! by its graph parents and produces one or more output textures through an
//! off-screen framebuffer; the graph re-wires and resizes itself as the host
//! viewport, output format, or topology changes.
//!
//! # Features
//! - Four-phase unit lifecycle: locate inputs, allocate outputs, attach, ready
//! - Texture factory with format/filter inference and deterministic
//!   zero-filled allocations
//! - Multiple render targets: output slot *i* binds color attachment *i*
//! - Bypass units that forward upstream or processor-owned resources without
//!   a render pass
//! - Deferred re-initialization via per-unit dirty flags
//! - Degraded-not-broken error handling: failures are logged and contained
//!   to the affected unit and slot
//!
//! # Example
//!
//! ```
//! use postfx_graph::{
//!     HeadlessContext, Processor, RenderUnit, UnitGraph, Viewport,
//! };
//!
//! let mut ctx = HeadlessContext::new();
//! let mut graph = UnitGraph::new();
//!
//! let root = graph.add_processor(Processor::new(Viewport::new(1280, 720)));
//! let bloom = graph.add_unit(RenderUnit::new("bloom"));
//! let compose = graph.add_unit(RenderUnit::new("compose"));
//! graph.connect(bloom, root);
//! graph.connect(compose, bloom);
//!
//! graph.prepare_all(&mut ctx);
//! let output = graph
//!     .unit_mut(compose)
//!     .unwrap()
//!     .get_or_create_output_texture(0, &mut ctx)
//!     .unwrap();
//! assert_eq!(output.size(), (1280, 720));
//! ```

pub mod context;
pub mod error;
pub mod graph;
pub mod resources;
pub mod unit;

pub use context::{
    AddressMode, ContextError, ContextResult, CubemapFace, FilterMode, HeadlessContext,
    InternalFormat, RenderContext, SourceFormat, TextureDescriptor, TextureType, TextureUsage,
};
pub use error::{Diagnostic, Diagnostics, Severity, UnitError};
pub use graph::processor::{BufferComponent, Processor};
pub use graph::slots::{SlotTable, MAX_SLOTS};
pub use graph::{Node, NodeId, UnitGraph};
pub use resources::{Attachment, Framebuffer, Texture, TextureId, TextureRef};
pub use unit::{LifecycleState, RenderUnit, UnitKind, Viewport, ViewportReference};
