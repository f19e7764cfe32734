use limpet_core::{
    Binding, DeterministicTextMeasurer, NodeKind, NodeMetadata, RenderConfig, Scene, StaticModel,
};
use limpet_geom::int_rect;
use limpet_render::{SvgRenderOptions, render_svg, route_edge, scene_extent};

#[test]
fn debug_svg_contains_nodes_edges_and_heads() {
    let mut scene = Scene::new();
    let meta = NodeMetadata::default();
    for (name, x) in [("A<1>", 0), ("B", 300)] {
        let id = scene.add_node(name, NodeKind::Part, &meta).expect("add");
        scene
            .node_mut(id)
            .expect("node")
            .set_bounds_raw(int_rect(x, 0, 100, 50));
    }
    let mut model = StaticModel::new();
    model.push("A<1>", Binding::new("b", Some("B")));
    model.push("A<1>", Binding::new("lost", Some("Nowhere")));
    scene.rebuild_edges(&model);

    let cfg = RenderConfig::default();
    let shapes = scene
        .edges()
        .map(|e| route_edge(e, &scene, &cfg, &DeterministicTextMeasurer))
        .collect::<Vec<_>>();
    let svg = render_svg(
        &scene,
        &shapes,
        &cfg,
        &DeterministicTextMeasurer,
        &SvgRenderOptions::default(),
    );

    assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert_eq!(svg.matches(r#"<path class="edge""#).count(), 2);
    assert!(svg.contains("A&lt;1&gt;"));
    assert!(svg.contains(">Nowhere</text>"));
    assert!(svg.contains(r#"<polyline class="head""#));

    let extent = scene_extent(&scene, &shapes);
    assert!(extent.min_y() < 0, "external label rises above the nodes");
    assert_eq!(extent.max_x(), 400);
}
