//! Framebuffer attacher.
//!
//! Rebuilds a unit's framebuffer so that output slot *i* is bound to color
//! attachment *i*. The rebuild is a full replace: attachment points without
//! a counterpart in the slot table are dropped. Calling it again with
//! unchanged slots produces no observable difference.

use crate::error::UnitError;
use crate::resources::framebuffer::Attachment;
use crate::unit::RenderUnit;

use crate::context::types::TextureType;

pub(crate) fn rebuild_attachments(unit: &mut RenderUnit) {
    let face = unit.output_face();
    let slot_count = unit.outputs().len();
    let bypassed: Vec<bool> = (0..slot_count)
        .map(|slot| unit.slot_is_bypassed_internal(slot))
        .collect();

    let (name, outputs, framebuffer, diagnostics) = unit.attach_parts();
    let mut attachments: Vec<Option<Attachment>> = vec![None; slot_count];
    for slot in 0..slot_count {
        // a bypassed slot forwards an upstream resource; it is never attached
        if bypassed[slot] {
            continue;
        }
        let Some(texture) = outputs.get(slot) else {
            continue;
        };
        match texture.ty() {
            TextureType::D2 => {
                attachments[slot] = Some(Attachment::texture_2d(texture.clone()));
            }
            TextureType::Cubemap => {
                attachments[slot] = Some(Attachment::cubemap_face(texture.clone(), face));
            }
            ty => {
                diagnostics.fatal(UnitError::UnsupportedTextureType {
                    unit: name.to_string(),
                    slot,
                    ty,
                });
            }
        }
    }
    framebuffer.replace_attachments(attachments);
}
