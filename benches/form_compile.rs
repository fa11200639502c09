//! Compilation throughput benchmark.
//!
//! Measures a full compile pass (sorting, conditions, option resolution,
//! validation) over a mid-sized schema, and the option-resolution path in
//! isolation against a larger entity collection.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use schema_forms::{
    EntityCollections, EntitySnapshot, EntityType, FormCompiler, SchemaRegistry, relationship,
};
use serde_json::json;

fn schema_json(attribute_count: usize) -> String {
    let mut attributes = vec![
        json!({
            "name": "server_name",
            "type": "string",
            "required": true,
            "validation_regex": "^[a-z0-9-]+$",
            "validation_regex_msg": "lowercase only",
            "group_order": "1"
        }),
        json!({
            "name": "wave_id",
            "type": "relationship",
            "rel_entity": "wave",
            "rel_key": "wave_id",
            "rel_display_attribute": "wave_name"
        }),
    ];
    for i in 0..attribute_count {
        attributes.push(json!({
            "name": format!("attr_{i}"),
            "type": "string",
            "description": format!("Attribute {i}"),
            "validation_regex": "^.{0,64}$"
        }));
    }
    json!({"schema_name": "server", "attributes": attributes}).to_string()
}

fn entities(wave_count: usize) -> EntityCollections {
    let waves = (0..wave_count)
        .map(|i| json!({"wave_id": format!("w-{i}"), "wave_name": format!("Wave {i}")}))
        .collect();
    let mut entities = EntityCollections::new();
    entities.insert(EntityType::Wave, EntitySnapshot::ready(waves));
    entities
}

fn bench_compile(c: &mut Criterion) {
    let mut registry = SchemaRegistry::new();
    registry
        .load_schema_from_str(&schema_json(40))
        .expect("bench schema");
    let schema = registry.get_schema("server").expect("server");
    let entities = entities(200);
    let compiler = FormCompiler::new(schema, &entities);
    let record = json!({"server_name": "web-01", "wave_id": "w-7", "attr_3": "x"});

    c.bench_function("compile_40_attributes", |b| {
        b.iter(|| black_box(compiler.compile(black_box(&record))))
    });
}

fn bench_resolve_options(c: &mut Criterion) {
    let mut registry = SchemaRegistry::new();
    registry
        .load_schema_from_str(&schema_json(0))
        .expect("bench schema");
    let schema = registry.get_schema("server").expect("server");
    let attribute = schema.attribute("wave_id").expect("wave_id");
    let entities = entities(1000);
    let record = json!({});

    c.bench_function("resolve_options_1000_records", |b| {
        b.iter(|| {
            black_box(relationship::resolve_options(
                black_box(attribute),
                &record,
                &entities,
            ))
        })
    });
}

criterion_group!(benches, bench_compile, bench_resolve_options);
criterion_main!(benches);
