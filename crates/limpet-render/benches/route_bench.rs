use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use limpet_core::{
    Binding, DeterministicTextMeasurer, NodeKind, NodeMetadata, RenderConfig, Scene, StaticModel,
};
use limpet_geom::int_rect;
use limpet_render::route_edge;
use std::hint::black_box;
use std::time::Duration;

/// A grid of parts with one binary connection between each horizontal neighbour pair. Every
/// part also carries a dangling binding and an external reference.
fn build_scene(columns: usize, rows: usize) -> Scene {
    let mut scene = Scene::new();
    let mut model = StaticModel::new();
    let meta = NodeMetadata::default();
    let part = |c: usize, r: usize| format!("p{c}_{r}");

    for r in 0..rows {
        for c in 0..columns {
            let name = part(c, r);
            model
                .push(name.clone(), Binding::new("free", None))
                .push(name.clone(), Binding::new("ext", Some("Offstage")));
            if let Ok(id) = scene.add_node(name, NodeKind::Part, &meta) {
                if let Some(node) = scene.node_mut(id) {
                    node.set_bounds_raw(int_rect(c as i32 * 240, r as i32 * 160, 120, 60));
                }
            }
        }
    }
    for r in 0..rows {
        for c in 0..columns.saturating_sub(1) {
            let name = format!("syn{c}_{r}");
            if let Ok(id) = scene.add_node(name.clone(), NodeKind::Connection, &meta) {
                if let Some(node) = scene.node_mut(id) {
                    node.set_bounds_raw(int_rect(c as i32 * 240 + 170, r as i32 * 160 + 100, 26, 26));
                }
            }
            model
                .push(name.clone(), Binding::new("A", Some(part(c, r).as_str())))
                .push(name.clone(), Binding::new("B", Some(part(c + 1, r).as_str())));
        }
    }
    scene.rebuild_edges(&model);
    scene
}

fn bench_route_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("route_edge");
    group.measurement_time(Duration::from_secs(5));
    let cfg = RenderConfig::default();

    for (name, columns, rows) in [("grid_8x8", 8usize, 8usize), ("grid_20x20", 20, 20)] {
        let scene = build_scene(columns, rows);
        group.bench_with_input(BenchmarkId::new("all_edges", name), &scene, |b, scene| {
            b.iter(|| {
                for edge in scene.edges() {
                    let shape = route_edge(edge, scene, &cfg, &DeterministicTextMeasurer);
                    black_box(shape.bounds);
                }
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_route_all);
criterion_main!(benches);
