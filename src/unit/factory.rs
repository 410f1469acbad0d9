//! Texture factory.
//!
//! Materializes missing output textures: render-target descriptors with
//! clamp-to-edge wrapping, zero border color, NPOT resizing disabled, the
//! source format inferred from the configured internal format, and the
//! filter mode inherited from input texture 0 (nearest stays nearest,
//! otherwise linear). The context guarantees a zero-filled payload.

use crate::context::traits::{ContextError, RenderContext};
use crate::context::types::{FilterMode, InternalFormat, TextureDescriptor, TextureType};
use crate::error::{Diagnostics, UnitError};
use crate::graph::slots::SlotTable;
use crate::resources::texture::TextureRef;
use crate::unit::{RenderUnit, Viewport};

/// Allocate a texture for one output slot.
///
/// Returns `None` with a recorded fatal diagnostic when the viewport is
/// invalid or the requested type has no allocation strategy; the caller
/// treats this as "output unavailable".
#[allow(clippy::too_many_arguments)]
pub(crate) fn create_output_texture(
    unit_name: &str,
    slot: usize,
    ty: TextureType,
    format: InternalFormat,
    inputs: &SlotTable,
    viewport: Option<Viewport>,
    ctx: &mut dyn RenderContext,
    diagnostics: &mut Diagnostics,
) -> Option<TextureRef> {
    if ty == TextureType::Volume {
        diagnostics.fatal(UnitError::UnsupportedTextureType {
            unit: unit_name.to_string(),
            slot,
            ty,
        });
        return None;
    }

    // a newly created texture may only be sized against a valid viewport
    let Some(viewport) = viewport else {
        diagnostics.fatal(UnitError::InvalidViewport {
            unit: unit_name.to_string(),
            slot,
        });
        return None;
    };

    let (min_filter, mag_filter) = inherit_filters(inputs);
    let desc = TextureDescriptor {
        label: Some(format!("{unit_name}:out{slot}")),
        min_filter,
        mag_filter,
        ..TextureDescriptor::render_target(ty, viewport.width, viewport.height, format)
    };

    match ctx.create_texture(&desc) {
        Ok(texture) => Some(texture),
        Err(ContextError::UnsupportedTextureType(ty)) => {
            diagnostics.fatal(UnitError::UnsupportedTextureType {
                unit: unit_name.to_string(),
                slot,
                ty,
            });
            None
        }
        Err(err) => {
            log::error!("unit '{unit_name}' output slot {slot}: {err}");
            None
        }
    }
}

/// Filter mode for a fresh output: nearest inputs propagate nearest,
/// everything else defaults to linear.
fn inherit_filters(inputs: &SlotTable) -> (FilterMode, FilterMode) {
    match inputs.get(0) {
        Some(input) => {
            let min = if input.min_filter() == FilterMode::Nearest {
                FilterMode::Nearest
            } else {
                FilterMode::Linear
            };
            let mag = if input.mag_filter() == FilterMode::Nearest {
                FilterMode::Nearest
            } else {
                FilterMode::Linear
            };
            (min, mag)
        }
        None => (FilterMode::Linear, FilterMode::Linear),
    }
}

/// Materialize every declared-but-empty output slot of `unit`, and bring
/// textures whose size drifted from the resolved viewport back in line
/// (in place, identity preserved).
pub(crate) fn allocate_missing_outputs(unit: &mut RenderUnit, ctx: &mut dyn RenderContext) {
    let ty = unit.output_texture_type();
    let format = unit.output_internal_format();
    let viewport = unit.viewport();
    let slot_count = unit.outputs().len();
    let bypassed: Vec<bool> = (0..slot_count)
        .map(|slot| unit.slot_is_bypassed_internal(slot))
        .collect();

    let (name, outputs, inputs, diagnostics) = unit.factory_parts();
    for slot in 0..slot_count {
        if bypassed[slot] {
            continue;
        }
        match outputs.get(slot).cloned() {
            Some(texture) => {
                if let Some(vp) = viewport {
                    if texture.size() != (vp.width, vp.height) {
                        texture.set_size(vp.width, vp.height);
                    }
                }
            }
            None => {
                if let Some(texture) = create_output_texture(
                    name,
                    slot,
                    ty,
                    format,
                    inputs,
                    viewport,
                    ctx,
                    diagnostics,
                ) {
                    outputs.set(slot, Some(texture));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::headless::HeadlessContext;
    use crate::context::types::AddressMode;
    use std::sync::Arc;

    use crate::resources::texture::Texture;

    fn nearest_input() -> SlotTable {
        let desc = TextureDescriptor {
            min_filter: FilterMode::Nearest,
            mag_filter: FilterMode::Nearest,
            ..TextureDescriptor::render_target(
                TextureType::D2,
                64,
                64,
                InternalFormat::Rgba8Unorm,
            )
        };
        let mut inputs = SlotTable::new();
        inputs.set(0, Some(Arc::new(Texture::new(1, desc))));
        inputs
    }

    #[test]
    fn fresh_texture_matches_unit_configuration() {
        let mut ctx = HeadlessContext::new();
        let mut diags = Diagnostics::new();
        let tex = create_output_texture(
            "bloom",
            0,
            TextureType::D2,
            InternalFormat::Rgba16Float,
            &SlotTable::new(),
            Some(Viewport::new(800, 600)),
            &mut ctx,
            &mut diags,
        )
        .unwrap();

        assert_eq!(tex.size(), (800, 600));
        assert_eq!(tex.internal_format(), InternalFormat::Rgba16Float);
        assert_eq!(tex.wrap_modes(), (AddressMode::ClampToEdge, AddressMode::ClampToEdge));
        assert_eq!(tex.border_color(), [0.0; 4]);
        assert!(!tex.resize_npot());
        assert_eq!(tex.min_filter(), FilterMode::Linear);
        assert!(tex.payload_is_zeroed());
        assert!(diags.is_empty());
    }

    #[test]
    fn nearest_input_propagates_nearest_filtering() {
        let mut ctx = HeadlessContext::new();
        let mut diags = Diagnostics::new();
        let tex = create_output_texture(
            "downsample",
            0,
            TextureType::D2,
            InternalFormat::Rgba8Unorm,
            &nearest_input(),
            Some(Viewport::new(32, 32)),
            &mut ctx,
            &mut diags,
        )
        .unwrap();
        assert_eq!(tex.min_filter(), FilterMode::Nearest);
        assert_eq!(tex.mag_filter(), FilterMode::Nearest);
    }

    #[test]
    fn invalid_viewport_records_fatal_and_yields_nothing() {
        let mut ctx = HeadlessContext::new();
        let mut diags = Diagnostics::new();
        let tex = create_output_texture(
            "blur",
            0,
            TextureType::D2,
            InternalFormat::Rgba8Unorm,
            &SlotTable::new(),
            None,
            &mut ctx,
            &mut diags,
        );
        assert!(tex.is_none());
        assert_eq!(ctx.textures_created(), 0);
        assert!(matches!(
            diags.entries()[0].error,
            UnitError::InvalidViewport { slot: 0, .. }
        ));
    }

    #[test]
    fn volume_type_is_rejected_before_allocation() {
        let mut ctx = HeadlessContext::new();
        let mut diags = Diagnostics::new();
        let tex = create_output_texture(
            "bad",
            2,
            TextureType::Volume,
            InternalFormat::Rgba8Unorm,
            &SlotTable::new(),
            Some(Viewport::new(8, 8)),
            &mut ctx,
            &mut diags,
        );
        assert!(tex.is_none());
        assert!(matches!(
            diags.entries()[0].error,
            UnitError::UnsupportedTextureType {
                slot: 2,
                ty: TextureType::Volume,
                ..
            }
        ));
    }
}
