//! Integration tests for schema adaptation and normalization.
//!
//! The same course content is written in each of the three document shapes;
//! every shape must normalize to the same outline.

mod support;

use coursedl_core::syllabus::{ItemIndex, NormalizeOptions, Outline};
use coursedl_core::{SchemaVariant, SyllabusError, adapt, normalize};
use serde_json::{Value, json};
use support::{ModuleShape, linked_syllabus, material_syllabus, weeks_syllabus};

fn course() -> Vec<ModuleShape<'static>> {
    vec![
        (
            "week-1",
            vec![
                ("intro", vec![("welcome", "lecture"), ("reading", "supplement")]),
                ("practice", vec![("check", "quiz")]),
            ],
        ),
        ("week-2", vec![("deeper", vec![("lab", "notebook")])]),
        ("week-3", vec![("wrap-up", vec![("peer", "phasedPeer")])]),
    ]
}

fn outline_of(document: &Value, variant: SchemaVariant, reverse: bool) -> Outline {
    let syllabus = adapt(document, variant, "C1").expect("document should adapt");
    let options = NormalizeOptions {
        reverse,
        unrestricted_filenames: false,
    };
    normalize(syllabus, options, &ItemIndex::new()).outline()
}

#[test]
fn test_all_variants_normalize_to_same_outline() {
    let modules = course();
    let linked = outline_of(&linked_syllabus(&modules), SchemaVariant::LinkedCollections, false);
    let weeks = outline_of(&weeks_syllabus(&modules), SchemaVariant::FlatWeeks, false);
    let material = outline_of(&material_syllabus(&modules), SchemaVariant::CourseMaterial, false);

    assert_eq!(linked, weeks);
    assert_eq!(linked, material);
    assert_eq!(linked.len(), 3);
    assert_eq!(linked[0].1[0].1, ["welcome", "reading"]);
}

#[test]
fn test_reverse_is_applied_identically_across_variants() {
    let modules = course();
    let forward = outline_of(&linked_syllabus(&modules), SchemaVariant::LinkedCollections, false);

    for (document, variant) in [
        (linked_syllabus(&modules), SchemaVariant::LinkedCollections),
        (weeks_syllabus(&modules), SchemaVariant::FlatWeeks),
        (material_syllabus(&modules), SchemaVariant::CourseMaterial),
    ] {
        let reversed = outline_of(&document, variant, true);
        let slugs: Vec<&str> = reversed.iter().map(|(slug, _)| slug.as_str()).collect();
        assert_eq!(slugs, ["week-3", "week-2", "week-1"], "{variant}");

        // Lessons and items keep their order inside each module.
        let mut expected = forward.clone();
        expected.reverse();
        assert_eq!(reversed, expected, "{variant}");
    }
}

#[test]
fn test_fallback_item_fills_degenerate_lesson_in_every_variant() {
    let modules: Vec<ModuleShape<'static>> = vec![(
        "week-1",
        vec![("intro", vec![("welcome", "lecture")]), ("assignments", vec![])],
    )];
    let index = ItemIndex::from_document(&json!({
        "linked": {"onDemandCourseMaterialItems.v1": [{
            "id": "pa1", "lessonId": "assignments", "name": "Programming Assignment", "slug": "pa-1",
            "content": {"typeName": "gradedProgramming", "definition": {}}
        }]}
    }));

    for (document, variant) in [
        (linked_syllabus(&modules), SchemaVariant::LinkedCollections),
        (weeks_syllabus(&modules), SchemaVariant::FlatWeeks),
        (material_syllabus(&modules), SchemaVariant::CourseMaterial),
    ] {
        let syllabus = adapt(&document, variant, "C1").expect("document should adapt");
        let tree = normalize(syllabus, NormalizeOptions::default(), &index);
        let outline = tree.outline();

        assert_eq!(outline[0].1.len(), 2, "{variant}");
        assert_eq!(outline[0].1[1].0, "assignments", "{variant}");
        assert_eq!(outline[0].1[1].1, ["pa-1"], "{variant}");
        assert_eq!(tree.modules[0].lessons[1].items[0].type_name, "gradedProgramming");
    }
}

#[test]
fn test_degenerate_lesson_without_fallback_is_dropped() {
    let modules: Vec<ModuleShape<'static>> = vec![
        ("week-1", vec![("intro", vec![("welcome", "lecture")]), ("empty", vec![])]),
        ("week-2", vec![("nothing", vec![])]),
    ];
    let outline = outline_of(&linked_syllabus(&modules), SchemaVariant::LinkedCollections, false);

    assert_eq!(outline.len(), 1, "module with no surviving lesson is dropped");
    assert_eq!(outline[0].1.len(), 1);
    assert_eq!(outline[0].1[0].0, "intro");
}

#[test]
fn test_variant_specific_keys_are_required() {
    let modules = course();
    let err = adapt(&weeks_syllabus(&modules), SchemaVariant::LinkedCollections, "C1").unwrap_err();
    assert!(matches!(err, SyllabusError::MalformedDocument { .. }));

    let err = adapt(&linked_syllabus(&modules), SchemaVariant::CourseMaterial, "C1").unwrap_err();
    assert!(matches!(err, SyllabusError::MalformedDocument { .. }));
}
