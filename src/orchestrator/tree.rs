//! Final per-course output tree.

use serde::Serialize;

use crate::extract::LinkMap;

/// Name of the synthesized trailing module holding course-level references.
pub const RESOURCES_MODULE: &str = "Resources";

/// One item that produced links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemLinks {
    /// Item slug; empty for reference entries.
    pub slug: String,
    pub links: LinkMap,
}

/// A lesson with at least one item that produced links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonSection {
    pub slug: String,
    pub items: Vec<ItemLinks>,
}

/// A module with at least one non-empty lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleSection {
    pub slug: String,
    pub lessons: Vec<LessonSection>,
}

/// Ordered modules of one course, with `Resources` last when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CourseTree {
    pub modules: Vec<ModuleSection>,
}

impl CourseTree {
    /// Module slugs in output order.
    #[must_use]
    pub fn module_slugs(&self) -> Vec<&str> {
        self.modules.iter().map(|module| module.slug.as_str()).collect()
    }

    /// Finds an item by its slug anywhere in the tree.
    #[must_use]
    pub fn find_item(&self, slug: &str) -> Option<&ItemLinks> {
        self.modules
            .iter()
            .flat_map(|module| &module.lessons)
            .flat_map(|lesson| &lesson.items)
            .find(|item| item.slug == slug)
    }

    /// Number of items with links, `Resources` included.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.modules
            .iter()
            .flat_map(|module| &module.lessons)
            .map(|lesson| lesson.items.len())
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
