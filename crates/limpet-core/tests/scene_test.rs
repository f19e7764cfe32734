use limpet_core::{
    Binding, EdgeTarget, Error, NodeKind, NodeMetadata, PinKey, PinMetadata, PinsMetadata,
    Scene, StaticModel, metadata::MAX_PIN_ORDER,
};

fn binary_scene() -> (Scene, StaticModel) {
    let mut scene = Scene::new();
    let meta = NodeMetadata::default();
    scene.add_node("A", NodeKind::Part, &meta).expect("A");
    scene.add_node("B", NodeKind::Part, &meta).expect("B");
    scene.add_node("syn", NodeKind::Connection, &meta).expect("syn");

    let mut model = StaticModel::new();
    model
        .push("syn", Binding::new("pre", Some("A")))
        .push("syn", Binding::new("post", Some("B")));
    scene.rebuild_edges(&model);
    (scene, model)
}

#[test]
fn binary_connection_edges_are_partnered() {
    let (scene, _) = binary_scene();
    let edges = scene.edges().collect::<Vec<_>>();
    assert_eq!(edges.len(), 2);
    assert_eq!(edges[0].partner, Some(edges[1].id));
    assert_eq!(edges[1].partner, Some(edges[0].id));
    assert!(scene.partners_symmetric());
}

#[test]
fn partners_are_rederived_when_the_outgoing_set_changes() {
    let (mut scene, _) = binary_scene();
    let syn = scene.node_id("syn").expect("syn");

    scene
        .set_binding(syn, &Binding::new("third", Some("A")))
        .expect("add");
    assert!(scene.edges().all(|e| e.partner.is_none()));
    assert!(scene.partners_symmetric());

    scene.remove_binding(syn, "third").expect("remove");
    assert_eq!(scene.edges().filter(|e| e.partner.is_some()).count(), 2);
    assert!(scene.partners_symmetric());

    scene.remove_binding(syn, "post").expect("remove");
    assert!(scene.edges().all(|e| e.partner.is_none()));
}

#[test]
fn replacing_a_binding_keeps_its_handle() {
    let (mut scene, _) = binary_scene();
    let syn = scene.node_id("syn").expect("syn");
    let before = scene
        .outgoing(syn)
        .find(|e| e.alias == "post")
        .map(|e| e.id)
        .expect("post");
    scene
        .set_binding(syn, &Binding::new("post", Some("A")).straight())
        .expect("replace");
    let after = scene.outgoing(syn).find(|e| e.alias == "post").expect("post");
    assert_eq!(after.id, before);
    assert!(after.straight);
    assert!(after.partner.is_some());
}

#[test]
fn pin_links_do_not_count_towards_partnering() {
    let (mut scene, _) = binary_scene();
    let syn = scene.node_id("syn").expect("syn");
    scene
        .set_binding(
            syn,
            &Binding::new("wire", Some("A")).pins(Some(PinKey::output("y")), None),
        )
        .expect("pin");
    assert_eq!(scene.edges().filter(|e| e.partner.is_some()).count(), 2);
}

#[test]
fn removing_a_node_drops_its_edges_and_partners() {
    let (mut scene, mut model) = binary_scene();
    let a = scene.node_id("A").expect("A");
    let (_, removed) = scene.remove_node(a).expect("remove");
    assert_eq!(removed.len(), 1);
    assert_eq!(scene.edge_count(), 1);
    assert!(scene.edges().all(|e| e.partner.is_none()));

    // On the next rebuild the binding to the removed part becomes an external reference.
    model.set("syn", Binding::new("pre", Some("A")));
    scene.rebuild_edges(&model);
    let pre = scene.edges().find(|e| e.alias == "pre").expect("pre");
    assert_eq!(
        pre.target,
        EdgeTarget::External {
            name: "A".into(),
            pin: None,
        }
    );
    assert!(scene.partners_symmetric());
}

#[test]
fn unconnected_slots_wrap_at_the_cap() {
    let mut scene = Scene::new();
    scene
        .add_node("c", NodeKind::Connection, &NodeMetadata::default())
        .expect("c");
    let mut model = StaticModel::new();
    for i in 0..10 {
        model.push("c", Binding::new(format!("u{i}"), None));
    }
    scene.rebuild_edges(&model);
    let ids = scene.edges().map(|e| e.id).collect::<Vec<_>>();
    assert_eq!(scene.unconnected_slot(ids[0], 8), Some((0, 8)));
    assert_eq!(scene.unconnected_slot(ids[9], 8), Some((1, 8)));
    assert!(scene.edges().all(|e| e.partner.is_none()));
}

#[test]
fn bound_flags_follow_pin_links() {
    let mut pins = PinsMetadata::default();
    pins.outputs.insert("y".into(), PinMetadata::default());
    let meta = NodeMetadata {
        pins: pins.clone(),
        ..Default::default()
    };
    let mut in_pins = PinsMetadata::default();
    in_pins.inputs.insert("x".into(), PinMetadata::default());
    let in_meta = NodeMetadata {
        pins: in_pins,
        ..Default::default()
    };

    let mut scene = Scene::new();
    let src = scene.add_node("src", NodeKind::Part, &meta).expect("src");
    let dst = scene.add_node("dst", NodeKind::Part, &in_meta).expect("dst");
    let mut model = StaticModel::new();
    model.push(
        "src",
        Binding::new("w", Some("dst")).pins(Some(PinKey::output("y")), Some(PinKey::input("x"))),
    );
    scene.rebuild_edges(&model);

    let bound = |scene: &Scene, node, key: &PinKey| {
        scene
            .node(node)
            .and_then(|n| n.pins.get(key))
            .is_some_and(|p| p.bound)
    };
    assert!(bound(&scene, src, &PinKey::output("y")));
    assert!(bound(&scene, dst, &PinKey::input("x")));

    scene.remove_binding(src, "w").expect("remove");
    assert!(!bound(&scene, src, &PinKey::output("y")));
    assert!(!bound(&scene, dst, &PinKey::input("x")));
}

#[test]
fn invalid_metadata_is_rejected() {
    let mut scene = Scene::new();
    let meta = NodeMetadata {
        width: Some(-1.0),
        ..Default::default()
    };
    assert!(matches!(
        scene.add_node("bad", NodeKind::Part, &meta),
        Err(Error::InvalidMetadata { .. })
    ));
    assert_eq!(scene.node_count(), 0);
}

#[test]
fn pin_orders_past_the_limit_are_rejected_on_add() {
    let mut pins = PinsMetadata::default();
    pins.inputs.insert(
        "x".into(),
        PinMetadata {
            order: MAX_PIN_ORDER + 1,
            ..Default::default()
        },
    );
    let meta = NodeMetadata {
        pins,
        ..Default::default()
    };
    let mut scene = Scene::new();
    assert!(matches!(
        scene.add_node("wide", NodeKind::Part, &meta),
        Err(Error::InvalidMetadata { .. })
    ));
    assert_eq!(scene.node_count(), 0);
}

#[test]
fn names_resolve_to_handles_or_a_named_error() {
    let (scene, _) = binary_scene();
    assert_eq!(scene.try_node_id("syn").ok(), scene.node_id("syn"));
    let err = scene.try_node_id("Nope").expect_err("missing");
    assert!(matches!(&err, Error::UnknownNodeName { name } if name == "Nope"));
    assert_eq!(err.to_string(), "no node named \"Nope\" in the scene");
}

#[test]
fn adding_a_referenced_node_adopts_its_external_edges() {
    let mut out_pins = PinsMetadata::default();
    out_pins.outputs.insert("y".into(), PinMetadata::default());
    let mut in_pins = PinsMetadata::default();
    in_pins.inputs.insert("x".into(), PinMetadata::default());

    let mut scene = Scene::new();
    let meta = NodeMetadata::default();
    scene.add_node("A", NodeKind::Part, &meta).expect("A");
    let syn = scene.add_node("syn", NodeKind::Connection, &meta).expect("syn");
    let src = scene
        .add_node(
            "src",
            NodeKind::Part,
            &NodeMetadata {
                pins: out_pins,
                ..Default::default()
            },
        )
        .expect("src");
    let mut model = StaticModel::new();
    model
        .push("syn", Binding::new("pre", Some("A")))
        .push("syn", Binding::new("post", Some("C")))
        .push(
            "src",
            Binding::new("w", Some("dst"))
                .pins(Some(PinKey::output("y")), Some(PinKey::input("x"))),
        );
    scene.rebuild_edges(&model);

    let target = |scene: &Scene, alias: &str| {
        scene
            .edges()
            .find(|e| e.alias == alias)
            .map(|e| e.target.clone())
            .expect("edge")
    };
    assert_eq!(
        target(&scene, "w"),
        EdgeTarget::External {
            name: "dst".into(),
            pin: Some(PinKey::input("x")),
        }
    );

    let c = scene.add_node("C", NodeKind::Part, &meta).expect("C");
    assert_eq!(target(&scene, "post"), EdgeTarget::Node { node: c, pin: None });
    assert_eq!(scene.dependents(c).len(), 2);
    assert_eq!(
        scene.outgoing(syn).filter(|e| e.partner.is_some()).count(),
        2
    );
    assert!(scene.partners_symmetric());

    let dst = scene
        .add_node(
            "dst",
            NodeKind::Part,
            &NodeMetadata {
                pins: in_pins,
                ..Default::default()
            },
        )
        .expect("dst");
    assert_eq!(
        target(&scene, "w"),
        EdgeTarget::Node {
            node: dst,
            pin: Some(PinKey::input("x")),
        }
    );
    let bound = |node, key: &PinKey| {
        scene
            .node(node)
            .and_then(|n| n.pins.get(key))
            .is_some_and(|p| p.bound)
    };
    assert!(bound(dst, &PinKey::input("x")));
    assert!(bound(src, &PinKey::output("y")));
    assert!(scene.edges().all(|e| !matches!(e.target, EdgeTarget::External { .. })));
}
