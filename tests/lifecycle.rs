//! Integration tests for the render-unit graph's resource lifecycle.
//!
//! Everything runs against the headless context: allocation counts and
//! texture identities are observable without a GPU.

use rstest::rstest;

use postfx_graph::{
    BufferComponent, HeadlessContext, InternalFormat, LifecycleState, Processor, RenderContext,
    RenderUnit, Severity, SourceFormat, TextureDescriptor, TextureType, UnitError, UnitGraph,
    Viewport,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Output allocation
// ============================================================================

#[test]
fn get_or_create_is_idempotent_and_viewport_sized() {
    init_logging();
    let mut ctx = HeadlessContext::new();
    let mut graph = UnitGraph::new();
    let root = graph.add_processor(Processor::new(Viewport::new(1024, 512)));
    let unit = graph.add_unit(RenderUnit::new("blur"));
    graph.connect(unit, root);
    graph.prepare_all(&mut ctx);

    let unit = graph.unit_mut(unit).unwrap();
    let first = unit.get_or_create_output_texture(0, &mut ctx).unwrap();
    let second = unit.get_or_create_output_texture(0, &mut ctx).unwrap();

    assert_eq!(first.id(), second.id());
    assert_eq!(first.size(), (1024, 512));
    assert_eq!(ctx.textures_created(), 1);
}

#[test]
fn invalid_viewport_is_contained_and_recoverable() {
    init_logging();
    let mut ctx = HeadlessContext::new();
    let mut graph = UnitGraph::new();
    // no parents, no explicit viewport: nothing to size against
    let id = graph.add_unit(RenderUnit::new("orphan"));
    graph.prepare_all(&mut ctx);

    let unit = graph.unit_mut(id).unwrap();
    assert_eq!(unit.state(), LifecycleState::Degraded);
    assert!(unit.get_or_create_output_texture(0, &mut ctx).is_none());
    assert_eq!(ctx.textures_created(), 0);
    assert!(unit
        .diagnostics()
        .iter()
        .any(|d| matches!(d.error, UnitError::InvalidViewport { slot: 0, .. })
            && d.severity == Severity::Fatal));

    // once a viewport is known the same call succeeds
    unit.set_viewport(Viewport::new(256, 256));
    let out = unit.get_or_create_output_texture(0, &mut ctx).unwrap();
    assert_eq!(out.size(), (256, 256));
    assert_eq!(ctx.textures_created(), 1);
}

#[test]
fn format_change_scenario_updates_textures_in_place() {
    init_logging();
    let mut ctx = HeadlessContext::new();
    let mut graph = UnitGraph::new();
    let id = graph.add_unit(RenderUnit::new("a"));
    graph
        .unit_mut(id)
        .unwrap()
        .set_viewport(Viewport::new(800, 600));
    graph.prepare_all(&mut ctx);

    let unit = graph.unit_mut(id).unwrap();
    let out = unit.get_or_create_output_texture(0, &mut ctx).unwrap();
    assert_eq!(out.ty(), TextureType::D2);
    assert_eq!(out.size(), (800, 600));
    assert_eq!(out.internal_format(), InternalFormat::Rgba16Float);
    assert_eq!(out.source_format(), SourceFormat::Rgba);
    // no input present: linear/linear
    assert_eq!(
        (out.min_filter(), out.mag_filter()),
        (
            postfx_graph::FilterMode::Linear,
            postfx_graph::FilterMode::Linear
        )
    );

    unit.set_output_internal_format(InternalFormat::Rgba8Unorm);
    let after = unit.get_or_create_output_texture(0, &mut ctx).unwrap();
    assert_eq!(after.id(), out.id());
    assert_eq!(after.internal_format(), InternalFormat::Rgba8Unorm);
    assert_eq!(after.source_format(), SourceFormat::Rgba);
    assert_eq!(after.size(), (800, 600));
    assert_eq!(ctx.textures_created(), 1);
}

// ============================================================================
// Bypass routing
// ============================================================================

#[test]
fn input_bypass_forwards_by_reference_without_allocating() {
    init_logging();
    let mut ctx = HeadlessContext::new();
    let mut graph = UnitGraph::new();
    let root = graph.add_processor(Processor::new(Viewport::new(640, 480)));
    let src = graph.add_unit(RenderUnit::new("src"));
    let fwd = graph.add_unit(RenderUnit::new("fwd"));
    graph.connect(src, root);
    graph.connect(fwd, src);
    graph.unit_mut(fwd).unwrap().set_input_bypass(Some(0));

    graph.prepare_all(&mut ctx);

    let src_out = graph.unit(src).unwrap().outputs().get(0).unwrap().clone();
    let fwd_out = graph.unit(fwd).unwrap().outputs().get(0).unwrap().clone();
    assert_eq!(fwd_out.id(), src_out.id());
    // only the source allocated; the forwarded slot is not attached
    assert_eq!(ctx.textures_created(), 1);
    assert!(graph.unit(fwd).unwrap().framebuffer().is_empty());
}

#[test]
fn dropping_the_bypass_forces_a_fresh_output() {
    init_logging();
    let mut ctx = HeadlessContext::new();
    let mut graph = UnitGraph::new();
    let root = graph.add_processor(Processor::new(Viewport::new(640, 480)));
    let src = graph.add_unit(RenderUnit::new("src"));
    let fwd = graph.add_unit(RenderUnit::new("fwd"));
    graph.connect(src, root);
    graph.connect(fwd, src);
    graph.unit_mut(fwd).unwrap().set_input_bypass(Some(0));
    graph.prepare_all(&mut ctx);

    let src_out = graph.unit(src).unwrap().outputs().get(0).unwrap().clone();

    graph.unit_mut(fwd).unwrap().set_input_bypass(None);
    graph.prepare_all(&mut ctx);

    let fwd_out = graph.unit(fwd).unwrap().outputs().get(0).unwrap().clone();
    assert_ne!(fwd_out.id(), src_out.id());
    assert_eq!(fwd_out.size(), (640, 480));
    assert_eq!(ctx.textures_created(), 2);
}

#[test]
fn bypass_unit_with_no_upstream_textures_degrades() {
    init_logging();
    let mut ctx = HeadlessContext::new();
    let mut graph = UnitGraph::new();
    // directly under the processor there is nothing to forward
    let root = graph.add_processor(Processor::new(Viewport::new(640, 480)));
    let fwd = graph.add_unit(RenderUnit::bypass("fwd"));
    graph.connect(fwd, root);
    graph.prepare_all(&mut ctx);

    let unit = graph.unit(fwd).unwrap();
    assert_eq!(unit.state(), LifecycleState::Degraded);
    assert_eq!(unit.outputs().populated_count(), 0);
    assert_eq!(ctx.textures_created(), 0);
    assert!(unit
        .diagnostics()
        .iter()
        .any(|d| matches!(d.error, UnitError::MissingAttachment { .. })
            && d.severity == Severity::Warning));
}

#[test]
fn bypass_unit_forwards_upstream_outputs_unchanged() {
    init_logging();
    let mut ctx = HeadlessContext::new();
    let mut graph = UnitGraph::new();
    let root = graph.add_processor(Processor::new(Viewport::new(640, 480)));
    let src = graph.add_unit(RenderUnit::new("src"));
    let fwd = graph.add_unit(RenderUnit::bypass("fwd"));
    graph.connect(src, root);
    graph.connect(fwd, src);
    graph.prepare_all(&mut ctx);

    let src_out = graph.unit(src).unwrap().outputs().get(0).unwrap().clone();
    let unit = graph.unit(fwd).unwrap();
    assert_eq!(unit.state(), LifecycleState::Ready);
    assert_eq!(unit.outputs().get(0).unwrap().id(), src_out.id());
    assert_eq!(ctx.textures_created(), 1);
}

#[test]
fn depth_bypass_surfaces_the_processor_attachment() {
    init_logging();
    let mut ctx = HeadlessContext::new();
    let depth = ctx
        .create_texture(&TextureDescriptor::render_target(
            TextureType::D2,
            640,
            480,
            InternalFormat::Depth32Float,
        ))
        .unwrap();

    let mut graph = UnitGraph::new();
    let mut processor = Processor::new(Viewport::new(640, 480));
    processor.set_attachment(BufferComponent::Depth, depth.clone());
    let root = graph.add_processor(processor);
    let unit = graph.add_unit(RenderUnit::depth_bypass("depth"));
    graph.connect(unit, root);
    graph.prepare_all(&mut ctx);

    let unit = graph.unit(unit).unwrap();
    assert_eq!(unit.state(), LifecycleState::Ready);
    assert_eq!(unit.outputs().get(0).unwrap().id(), depth.id());
    // viewport inherited from the surfaced attachment's native size
    assert_eq!(unit.viewport(), Some(Viewport::new(640, 480)));
    // no allocation beyond the manually created depth texture
    assert_eq!(ctx.textures_created(), 1);
}

#[test]
fn depth_bypass_without_processor_parent_degrades() {
    init_logging();
    let mut ctx = HeadlessContext::new();
    let mut graph = UnitGraph::new();
    let root = graph.add_processor(Processor::new(Viewport::new(640, 480)));
    let mid = graph.add_unit(RenderUnit::new("mid"));
    let unit = graph.add_unit(RenderUnit::depth_bypass("depth"));
    graph.connect(mid, root);
    // not a direct child of the processor
    graph.connect(unit, mid);
    graph.prepare_all(&mut ctx);

    let unit = graph.unit(unit).unwrap();
    assert_eq!(unit.state(), LifecycleState::Degraded);
    assert_eq!(unit.inputs().populated_count(), 0);
    assert_eq!(unit.outputs().populated_count(), 0);
    assert!(unit.diagnostics().iter().any(|d| matches!(
        d.error,
        UnitError::MissingAncestor {
            wanted: "processor",
            ..
        }
    )));
}

#[test]
fn depth_bypass_with_missing_attachment_leaves_output_unset() {
    init_logging();
    let mut ctx = HeadlessContext::new();
    let mut graph = UnitGraph::new();
    let root = graph.add_processor(Processor::new(Viewport::new(640, 480)));
    let unit = graph.add_unit(RenderUnit::depth_bypass("depth"));
    graph.connect(unit, root);
    graph.prepare_all(&mut ctx);

    let unit = graph.unit(unit).unwrap();
    assert_eq!(unit.state(), LifecycleState::Degraded);
    assert!(unit.outputs().get(0).is_none());
    assert!(unit
        .diagnostics()
        .iter()
        .any(|d| matches!(d.error, UnitError::MissingAttachment { .. })));
    assert_eq!(ctx.textures_created(), 0);
}

// ============================================================================
// Viewport propagation
// ============================================================================

#[rstest]
#[case((640, 480), (1280, 720))]
#[case((1280, 720), (320, 200))]
fn viewport_change_resizes_in_place_across_the_chain(
    #[case] from: (u32, u32),
    #[case] to: (u32, u32),
) {
    init_logging();
    let mut ctx = HeadlessContext::new();
    let mut graph = UnitGraph::new();
    let root = graph.add_processor(Processor::new(Viewport::new(from.0, from.1)));
    let src = graph.add_unit(RenderUnit::new("src"));
    let blur = graph.add_unit(RenderUnit::new("blur"));
    graph.connect(src, root);
    graph.connect(blur, src);
    graph.prepare_all(&mut ctx);

    let src_out = graph.unit(src).unwrap().outputs().get(0).unwrap().clone();
    let blur_out = graph.unit(blur).unwrap().outputs().get(0).unwrap().clone();
    assert_eq!(src_out.size(), from);

    graph.set_viewport(root, Viewport::new(to.0, to.1));

    // same handles, new size, for every unit in the chain
    assert_eq!(graph.unit(src).unwrap().outputs().get(0).unwrap().id(), src_out.id());
    assert_eq!(src_out.size(), to);
    assert_eq!(blur_out.size(), to);
    // the dependent's input reference is the same resized resource
    assert_eq!(
        graph.unit(blur).unwrap().input_texture(0).unwrap().id(),
        src_out.id()
    );
    assert_eq!(ctx.textures_created(), 2);
}

#[test]
fn viewport_change_leaves_surfaced_attachments_alone() {
    init_logging();
    let mut ctx = HeadlessContext::new();
    let depth = ctx
        .create_texture(&TextureDescriptor::render_target(
            TextureType::D2,
            640,
            480,
            InternalFormat::Depth32Float,
        ))
        .unwrap();

    let mut graph = UnitGraph::new();
    let mut processor = Processor::new(Viewport::new(640, 480));
    processor.set_attachment(BufferComponent::Depth, depth.clone());
    let root = graph.add_processor(processor);
    let unit = graph.add_unit(RenderUnit::depth_bypass("depth"));
    graph.connect(unit, root);
    graph.prepare_all(&mut ctx);

    graph.set_viewport(root, Viewport::new(1280, 720));

    // the surfaced attachment keeps its native size and the unit's
    // viewport keeps agreeing with it
    let unit = graph.unit(unit).unwrap();
    assert_eq!(unit.outputs().get(0).unwrap().size(), (640, 480));
    assert_eq!(unit.viewport(), Some(Viewport::new(640, 480)));
}

// ============================================================================
// Rewiring
// ============================================================================

#[test]
fn dependents_observe_new_identity_after_rewire() {
    init_logging();
    let mut ctx = HeadlessContext::new();
    let mut graph = UnitGraph::new();
    let root = graph.add_processor(Processor::new(Viewport::new(64, 64)));
    let a = graph.add_unit(RenderUnit::new("a"));
    let b = graph.add_unit(RenderUnit::new("b"));
    let sink = graph.add_unit(RenderUnit::new("sink"));
    graph.connect(a, root);
    graph.connect(b, root);
    graph.connect(sink, a);
    graph.prepare_all(&mut ctx);

    let a_out = graph.unit(a).unwrap().outputs().get(0).unwrap().clone();
    assert_eq!(
        graph.unit(sink).unwrap().input_texture(0).unwrap().id(),
        a_out.id()
    );

    graph.disconnect(sink, a);
    graph.connect(sink, b);
    graph.prepare_all(&mut ctx);

    let b_out = graph.unit(b).unwrap().outputs().get(0).unwrap().clone();
    assert_eq!(
        graph.unit(sink).unwrap().input_texture(0).unwrap().id(),
        b_out.id()
    );
}
