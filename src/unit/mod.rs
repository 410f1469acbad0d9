//! Render units.
//!
//! A render unit is one node of the post-processing graph: it consumes the
//! textures produced by its graph parents and produces one or more output
//! textures through an off-screen framebuffer. The unit's resource lifecycle
//! runs in four phases (locate inputs, allocate outputs, attach, ready) and
//! is re-run whenever a configuration change marks the unit dirty.

mod attach;
mod bypass;
mod factory;

use crate::context::traits::RenderContext;
use crate::context::types::{CubemapFace, InternalFormat, TextureType};
use crate::error::{Diagnostic, Diagnostics, UnitError};
use crate::graph::processor::BufferComponent;
use crate::graph::slots::SlotTable;
use crate::graph::ParentView;
use crate::resources::framebuffer::Framebuffer;
use crate::resources::texture::TextureRef;

/// A viewport rectangle output textures are sized against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Where a unit's viewport comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportReference {
    /// Inherit the native size of the texture bound at this input slot.
    Input(usize),
    /// Explicit override.
    Explicit(Viewport),
}

impl Default for ViewportReference {
    fn default() -> Self {
        ViewportReference::Input(0)
    }
}

/// Lifecycle state of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    LocatingInputs,
    AllocatingOutputs,
    Attaching,
    /// Fully initialized.
    Ready,
    /// Initialized but missing an optional resource (e.g. no depth
    /// attachment present). Still usable.
    Degraded,
}

/// What a unit does with its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// Renders its inputs into its own output textures.
    InOut,
    /// Forwards all inputs as outputs unchanged; no render pass.
    Bypass,
    /// Surfaces a named attachment of the processor's render target.
    TargetBypass(BufferComponent),
}

/// One render pass in the post-processing graph.
#[derive(Debug)]
pub struct RenderUnit {
    name: String,
    kind: UnitKind,
    inputs: SlotTable,
    outputs: SlotTable,
    viewport_ref: ViewportReference,
    viewport: Option<Viewport>,
    output_type: TextureType,
    output_format: InternalFormat,
    output_face: CubemapFace,
    framebuffer: Framebuffer,
    input_bypass: Option<usize>,
    dirty: bool,
    state: LifecycleState,
    diagnostics: Diagnostics,
}

impl RenderUnit {
    /// Create an in/out unit. Output slot 0 is declared from the start; a
    /// unit with zero outputs is invalid.
    pub fn new(name: impl Into<String>) -> Self {
        let mut outputs = SlotTable::new();
        outputs.declare(0);
        Self {
            name: name.into(),
            kind: UnitKind::InOut,
            inputs: SlotTable::new(),
            outputs,
            viewport_ref: ViewportReference::default(),
            viewport: None,
            output_type: TextureType::D2,
            output_format: InternalFormat::Rgba16Float,
            output_face: CubemapFace::default(),
            framebuffer: Framebuffer::new(),
            input_bypass: None,
            dirty: true,
            state: LifecycleState::Uninitialized,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Create a unit that forwards its inputs unchanged.
    pub fn bypass(name: impl Into<String>) -> Self {
        Self {
            kind: UnitKind::Bypass,
            ..Self::new(name)
        }
    }

    /// Create a unit that surfaces a named attachment of the processor's
    /// render target.
    pub fn target_bypass(name: impl Into<String>, component: BufferComponent) -> Self {
        Self {
            kind: UnitKind::TargetBypass(component),
            ..Self::new(name)
        }
    }

    /// Create a depth-buffer bypass unit.
    pub fn depth_bypass(name: impl Into<String>) -> Self {
        Self::target_bypass(name, BufferComponent::Depth)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Force re-initialization before the unit is next evaluated.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.state = LifecycleState::Uninitialized;
    }

    pub fn inputs(&self) -> &SlotTable {
        &self.inputs
    }

    pub fn outputs(&self) -> &SlotTable {
        &self.outputs
    }

    pub fn input_texture(&self, slot: usize) -> Option<&TextureRef> {
        self.inputs.get(slot)
    }

    /// The framebuffer this unit renders into. Read-only state for overlay
    /// units that issue their own draw calls against it.
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Resolved viewport, if any.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn viewport_reference(&self) -> ViewportReference {
        self.viewport_ref
    }

    /// Override the viewport explicitly and resize every owned output in
    /// place. Texture identity is preserved, so dependents holding a
    /// reference keep pointing at the correct resource.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport_ref = ViewportReference::Explicit(viewport);
        self.apply_viewport(viewport);
    }

    /// Inherit the viewport from the texture bound at input `slot`.
    pub fn set_viewport_reference_input(&mut self, slot: usize) {
        self.viewport_ref = ViewportReference::Input(slot);
        self.mark_dirty();
    }

    /// Resize owned outputs to a new viewport without changing the
    /// reference. Called by the graph when the active viewport changes.
    pub(crate) fn apply_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        for (slot, texture) in self.outputs.populated() {
            if self.slot_is_bypassed(slot) {
                continue;
            }
            texture.set_size(viewport.width, viewport.height);
        }
    }

    pub fn output_texture_type(&self) -> TextureType {
        self.output_type
    }

    /// Set the type newly created output textures will have.
    pub fn set_output_texture_type(&mut self, ty: TextureType) {
        self.output_type = ty;
        self.mark_dirty();
    }

    pub fn output_internal_format(&self) -> InternalFormat {
        self.output_format
    }

    /// Change the output internal format. Every currently allocated output
    /// texture is updated in place (internal and inferred source format);
    /// nothing is reallocated or resized.
    pub fn set_output_internal_format(&mut self, format: InternalFormat) {
        self.output_format = format;
        for (slot, texture) in self.outputs.populated() {
            if self.slot_is_bypassed(slot) {
                continue;
            }
            texture.set_internal_format(format);
        }
        self.mark_dirty();
    }

    pub fn output_face(&self) -> CubemapFace {
        self.output_face
    }

    /// Select which cubemap face output textures attach with.
    pub fn set_output_face(&mut self, face: CubemapFace) {
        self.output_face = face;
        self.mark_dirty();
    }

    /// Bind (or clear) an output texture slot directly.
    pub fn set_output_texture(&mut self, texture: Option<TextureRef>, slot: usize) {
        self.outputs.set(slot, texture);
        self.mark_dirty();
    }

    /// Route input slot `index` straight to output slot 0, skipping
    /// allocation and attachment for that slot. `None` drops the bypass and
    /// forces a fresh output texture on the next request.
    pub fn set_input_bypass(&mut self, index: Option<usize>) {
        if index == self.input_bypass {
            return;
        }
        self.input_bypass = index;
        match index {
            None => self.outputs.set(0, None),
            Some(slot) => {
                let source = self.inputs.get(slot).cloned();
                self.outputs.set(0, source);
            }
        }
        self.mark_dirty();
    }

    pub fn input_bypass(&self) -> Option<usize> {
        self.input_bypass
    }

    /// Mirror the input slot table onto the outputs. Used by overlay units
    /// that draw on top of an upstream unit's targets.
    pub fn mirror_inputs_to_outputs(&mut self) {
        self.outputs = self.inputs.clone();
        self.mark_dirty();
    }

    /// Diagnostics recorded since the last lifecycle pass.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.entries()
    }

    /// The sanctioned read path for downstream units: returns the texture at
    /// `slot`, materializing it through the texture factory if the slot is
    /// still empty. Idempotent; two calls return the identical texture.
    ///
    /// Returns `None` (with a recorded diagnostic) when the viewport is
    /// invalid or the configured output type has no allocation strategy.
    pub fn get_or_create_output_texture(
        &mut self,
        slot: usize,
        ctx: &mut dyn RenderContext,
    ) -> Option<TextureRef> {
        self.outputs.declare(slot);
        if let Some(texture) = self.outputs.get(slot) {
            return Some(texture.clone());
        }
        let texture = factory::create_output_texture(
            &self.name,
            slot,
            self.output_type,
            self.output_format,
            &self.inputs,
            self.viewport,
            ctx,
            &mut self.diagnostics,
        )?;
        self.outputs.set(slot, Some(texture.clone()));
        // the fresh texture still needs a framebuffer attachment
        self.dirty = true;
        Some(texture)
    }

    /// Whether an output slot forwards a resource this unit does not own.
    fn slot_is_bypassed(&self, slot: usize) -> bool {
        match self.kind {
            UnitKind::InOut => slot == 0 && self.input_bypass.is_some(),
            UnitKind::Bypass | UnitKind::TargetBypass(_) => true,
        }
    }

    /// Run the full lifecycle: locate inputs, allocate outputs, attach.
    /// Failures degrade the affected slot and are recorded; the unit always
    /// reaches `Ready` or `Degraded`.
    pub(crate) fn initialize(&mut self, parents: &[ParentView], ctx: &mut dyn RenderContext) {
        self.diagnostics.clear();
        self.state = LifecycleState::LocatingInputs;

        match self.kind {
            UnitKind::InOut | UnitKind::Bypass => self.locate_inputs(parents),
            UnitKind::TargetBypass(component) => self.locate_target_attachment(parents, component),
        }
        self.resolve_viewport(parents);

        if self.kind == UnitKind::InOut {
            self.state = LifecycleState::AllocatingOutputs;
            self.assign_outputs(ctx);
        }

        // any recorded condition means a slot is missing or unattached
        self.state = if self.diagnostics.is_empty() {
            LifecycleState::Ready
        } else {
            LifecycleState::Degraded
        };
        self.dirty = false;
    }

    /// Populate the input slot table from the ordered graph parents.
    fn locate_inputs(&mut self, parents: &[ParentView]) {
        self.inputs.clear();
        for parent in parents {
            if let ParentView::Unit { outputs } = parent {
                for (_, texture) in outputs.populated() {
                    self.inputs.push(texture.clone());
                }
            }
        }
        self.on_inputs_changed();
    }

    /// Hook run whenever the input table was rebuilt.
    fn on_inputs_changed(&mut self) {
        bypass::route_input_bypass(self);
        if self.kind == UnitKind::Bypass {
            self.outputs = self.inputs.clone();
            // a forwarding unit with nothing to forward cannot populate slot 0
            if self.outputs.populated_count() == 0 {
                self.outputs.declare(0);
                let name = self.name.clone();
                self.diagnostics.warn(UnitError::MissingAttachment {
                    unit: name,
                    what: "bypass source".to_string(),
                });
            }
        }
    }

    fn locate_target_attachment(&mut self, parents: &[ParentView], component: BufferComponent) {
        bypass::route_target_attachment(self, parents, component);
    }

    /// Derive the viewport: explicit override first, then the designated
    /// input texture's native size, then a processor parent's viewport.
    fn resolve_viewport(&mut self, parents: &[ParentView]) {
        self.viewport = match self.viewport_ref {
            ViewportReference::Explicit(viewport) => Some(viewport),
            ViewportReference::Input(slot) => self
                .inputs
                .get(slot)
                .map(|texture| {
                    let (width, height) = texture.size();
                    Viewport::new(width, height)
                })
                .or_else(|| {
                    parents.iter().find_map(|parent| match parent {
                        ParentView::Processor { viewport, .. } => *viewport,
                        ParentView::Unit { .. } => None,
                    })
                })
                .or(self.viewport),
        };
    }

    /// Allocate missing output textures, then rebuild the framebuffer
    /// attachment set from the slot table.
    fn assign_outputs(&mut self, ctx: &mut dyn RenderContext) {
        factory::allocate_missing_outputs(self, ctx);
        self.state = LifecycleState::Attaching;
        attach::rebuild_attachments(self);
    }

    // Split field access for the sibling lifecycle modules.

    pub(crate) fn factory_parts(
        &mut self,
    ) -> (&str, &mut SlotTable, &SlotTable, &mut Diagnostics) {
        (
            &self.name,
            &mut self.outputs,
            &self.inputs,
            &mut self.diagnostics,
        )
    }

    pub(crate) fn attach_parts(&mut self) -> (&str, &SlotTable, &mut Framebuffer, &mut Diagnostics) {
        (
            &self.name,
            &self.outputs,
            &mut self.framebuffer,
            &mut self.diagnostics,
        )
    }

    pub(crate) fn inputs_mut(&mut self) -> &mut SlotTable {
        &mut self.inputs
    }

    pub(crate) fn outputs_mut(&mut self) -> &mut SlotTable {
        &mut self.outputs
    }

    pub(crate) fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub(crate) fn set_viewport_ref_internal(&mut self, reference: ViewportReference) {
        self.viewport_ref = reference;
    }

    pub(crate) fn slot_is_bypassed_internal(&self, slot: usize) -> bool {
        self.slot_is_bypassed(slot)
    }
}
