//! Canonical tree assembly: fallback lookup, pruning, slug cleaning, ordering.

use tracing::debug;

use crate::filename::clean_filename;

use super::{ItemIndex, ItemRecord, LessonRecord, ModuleRecord, Syllabus};

/// Options that shape the canonical tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Reverse the top-level module order after assembly.
    pub reverse: bool,
    /// Keep slugs close to the upstream text (spaces, parentheses).
    pub unrestricted_filenames: bool,
}

/// Ordered Module → Lesson → Item hierarchy used for extraction and display.
///
/// Every module has at least one lesson and every lesson at least one item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalTree {
    pub modules: Vec<ModuleRecord>,
}

/// Slug-only view of a canonical tree: `(module, [(lesson, [item])])`.
pub type Outline = Vec<(String, Vec<(String, Vec<String>)>)>;

impl CanonicalTree {
    /// Returns the slug skeleton of the tree.
    #[must_use]
    pub fn outline(&self) -> Outline {
        self.modules
            .iter()
            .map(|module| {
                let lessons = module
                    .lessons
                    .iter()
                    .map(|lesson| {
                        let items = lesson.items.iter().map(|item| item.slug.clone()).collect();
                        (lesson.slug.clone(), items)
                    })
                    .collect();
                (module.slug.clone(), lessons)
            })
            .collect()
    }

    /// Total number of items across all modules.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.modules
            .iter()
            .flat_map(|module| &module.lessons)
            .map(|lesson| lesson.items.len())
            .sum()
    }

    /// Returns true if no module survived normalization.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Walks the adapted syllabus in document order and produces the canonical tree.
///
/// A lesson with no items takes the single item indexed under its id in
/// `index`, if any. Lessons left without items are dropped, then modules left
/// without lessons. With `options.reverse` only the module order is reversed.
#[must_use]
pub fn normalize(syllabus: Syllabus, options: NormalizeOptions, index: &ItemIndex) -> CanonicalTree {
    let clean = |value: &str| clean_filename(value, options.unrestricted_filenames);

    let mut modules: Vec<ModuleRecord> = syllabus
        .modules
        .into_iter()
        .filter_map(|module| {
            let lessons: Vec<LessonRecord> = module
                .lessons
                .into_iter()
                .filter_map(|lesson| {
                    let mut items = lesson.items;
                    if items.is_empty() {
                        match index.get(&lesson.id) {
                            Some(fallback) => {
                                debug!(lesson = %lesson.slug, item = %fallback.slug, "Using flat index item for empty lesson");
                                items.push(fallback.clone());
                            }
                            None => {
                                debug!(lesson = %lesson.slug, "Dropping lesson without items");
                                return None;
                            }
                        }
                    }

                    let items = items
                        .into_iter()
                        .map(|item| ItemRecord {
                            slug: clean(&item.slug),
                            ..item
                        })
                        .collect();
                    Some(LessonRecord {
                        slug: clean(&lesson.slug),
                        items,
                        ..lesson
                    })
                })
                .collect();

            if lessons.is_empty() {
                debug!(module = %module.slug, "Dropping module without lessons");
                return None;
            }
            Some(ModuleRecord {
                slug: clean(&module.slug),
                lessons,
                ..module
            })
        })
        .collect();

    if options.reverse {
        modules.reverse();
    }

    CanonicalTree { modules }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: &str, slug: &str) -> ItemRecord {
        ItemRecord {
            id: id.to_string(),
            name: slug.to_string(),
            slug: slug.to_string(),
            type_name: "lecture".to_string(),
            video_id: None,
            asset_ids: Vec::new(),
        }
    }

    fn lesson(id: &str, items: Vec<ItemRecord>) -> LessonRecord {
        LessonRecord {
            id: id.to_string(),
            name: id.to_string(),
            slug: id.to_string(),
            items,
        }
    }

    fn module(id: &str, lessons: Vec<LessonRecord>) -> ModuleRecord {
        ModuleRecord {
            id: id.to_string(),
            name: id.to_string(),
            slug: id.to_string(),
            description: String::new(),
            lessons,
        }
    }

    fn three_modules() -> Syllabus {
        Syllabus {
            modules: vec![
                module("A", vec![lesson("a1", vec![item("1", "x"), item("2", "y")])]),
                module("B", vec![lesson("b1", vec![item("3", "z")])]),
                module("C", vec![lesson("c1", vec![item("4", "w")]), lesson("c2", vec![item("5", "v")])]),
            ],
        }
    }

    #[test]
    fn test_normalize_fallback_supplies_single_item() {
        let syllabus = Syllabus {
            modules: vec![module("m", vec![lesson("assignment", Vec::new())])],
        };
        let mut index = ItemIndex::new();
        index.insert("assignment", item("pa", "programming-assignment"));

        let tree = normalize(syllabus, NormalizeOptions::default(), &index);

        assert_eq!(tree.item_count(), 1);
        assert_eq!(tree.modules[0].lessons[0].items[0].id, "pa");
    }

    #[test]
    fn test_normalize_drops_empty_lesson_and_module() {
        let syllabus = Syllabus {
            modules: vec![
                module("m1", vec![lesson("empty", Vec::new())]),
                module("m2", vec![lesson("full", vec![item("1", "x")]), lesson("empty-2", Vec::new())]),
            ],
        };

        let tree = normalize(syllabus, NormalizeOptions::default(), &ItemIndex::new());

        assert_eq!(
            tree.outline(),
            vec![(
                "m2".to_string(),
                vec![("full".to_string(), vec!["x".to_string()])]
            )]
        );
    }

    #[test]
    fn test_normalize_reverse_only_touches_module_order() {
        let forward = normalize(three_modules(), NormalizeOptions::default(), &ItemIndex::new());
        let reversed = normalize(
            three_modules(),
            NormalizeOptions {
                reverse: true,
                ..NormalizeOptions::default()
            },
            &ItemIndex::new(),
        );

        let order: Vec<_> = reversed.modules.iter().map(|m| m.slug.as_str()).collect();
        assert_eq!(order, ["C", "B", "A"]);
        assert_eq!(reversed.modules[0], forward.modules[2]);
        assert_eq!(reversed.modules[2], forward.modules[0]);
    }

    #[test]
    fn test_normalize_cleans_slugs_per_policy() {
        let syllabus = Syllabus {
            modules: vec![module(
                "Week 1: Basics",
                vec![lesson("Intro (video)", vec![item("1", "What is ML?")])],
            )],
        };

        let strict = normalize(syllabus.clone(), NormalizeOptions::default(), &ItemIndex::new());
        let loose = normalize(
            syllabus,
            NormalizeOptions {
                unrestricted_filenames: true,
                ..NormalizeOptions::default()
            },
            &ItemIndex::new(),
        );

        assert_eq!(
            strict.outline(),
            vec![(
                "Week_1-_Basics".to_string(),
                vec![("Intro_video".to_string(), vec!["What_is_ML-".to_string()])]
            )]
        );
        assert_eq!(loose.modules[0].lessons[0].slug, "Intro (video)");
    }

    #[test]
    fn test_normalize_keeps_ids_and_names() {
        let tree = normalize(three_modules(), NormalizeOptions::default(), &ItemIndex::new());
        assert_eq!(tree.modules[2].lessons[1].items[0].id, "5");
        assert_eq!(tree.item_count(), 5);
        assert!(!tree.is_empty());
    }
}
