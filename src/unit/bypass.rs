//! Bypass routing.
//!
//! Two bypass kinds exist: an input bypass forwards a designated input slot
//! as output slot 0 by reference, and a target-attachment bypass surfaces a
//! named attachment of the processor's render target. Neither owns an
//! allocation; the forwarded resource's lifetime is governed by its source.

use crate::error::UnitError;
use crate::graph::processor::BufferComponent;
use crate::graph::ParentView;
use crate::unit::{RenderUnit, ViewportReference};

/// Re-apply the input bypass after the input table was rebuilt.
pub(crate) fn route_input_bypass(unit: &mut RenderUnit) {
    let Some(index) = unit.input_bypass() else {
        return;
    };
    match unit.input_texture(index).cloned() {
        Some(texture) => {
            unit.outputs_mut().set(0, Some(texture));
        }
        None => {
            let name = unit.name().to_string();
            unit.diagnostics_mut().warn(UnitError::MissingAttachment {
                unit: name,
                what: format!("bypassed input {index}"),
            });
            unit.outputs_mut().set(0, None);
        }
    }
}

/// Locate the processor among the unit's parents and surface the named
/// attachment of its render target as this unit's input and output.
pub(crate) fn route_target_attachment(
    unit: &mut RenderUnit,
    parents: &[ParentView],
    component: BufferComponent,
) {
    let processor = parents.iter().find_map(|parent| match parent {
        ParentView::Processor { attachments, .. } => Some(attachments),
        ParentView::Unit { .. } => None,
    });

    let Some(attachments) = processor else {
        let name = unit.name().to_string();
        unit.diagnostics_mut().warn(UnitError::MissingAncestor {
            unit: name,
            wanted: "processor",
        });
        unit.inputs_mut().clear();
        return;
    };

    match attachments.get(&component).cloned() {
        Some(texture) => {
            unit.inputs_mut().clear();
            unit.inputs_mut().set(0, Some(texture));
            // the viewport follows the surfaced attachment's native size
            unit.set_viewport_ref_internal(ViewportReference::Input(0));
            let mirrored = unit.inputs().clone();
            *unit.outputs_mut() = mirrored;
        }
        None => {
            let name = unit.name().to_string();
            unit.diagnostics_mut().warn(UnitError::MissingAttachment {
                unit: name,
                what: component.to_string(),
            });
            unit.outputs_mut().set(0, None);
        }
    }
}
