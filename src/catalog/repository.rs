//! Repository seam for catalog persistence.
//!
//! The orchestrator depends on this trait rather than on [`CatalogStore`]
//! directly so a run can be driven against any get-or-create backend.

use async_trait::async_trait;

use super::{
    CatalogStore, CourseAssetRow, CourseRow, ItemRow, LessonRow, ModuleRow, NewCourse,
    NewCourseAsset, NewItem, NewLesson, NewModule, NewReference, NewVideoAsset, ReferenceRow,
    Result, VideoAssetRow,
};

/// Data-access contract for catalog upserts.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Returns the existing course or inserts a new one.
    async fn get_or_create_course(&self, course: &NewCourse<'_>) -> Result<CourseRow>;

    /// Returns the existing module or inserts a new one.
    async fn get_or_create_module(&self, module: &NewModule<'_>) -> Result<ModuleRow>;

    /// Returns the existing lesson or inserts a new one.
    async fn get_or_create_lesson(&self, lesson: &NewLesson<'_>) -> Result<LessonRow>;

    /// Returns the existing item or inserts a new one.
    async fn get_or_create_item(&self, item: &NewItem<'_>) -> Result<ItemRow>;

    /// Returns the existing reference or inserts a new one.
    async fn get_or_create_reference(&self, reference: &NewReference<'_>) -> Result<ReferenceRow>;

    /// Returns the existing lecture asset or inserts a new one.
    async fn get_or_create_course_asset(&self, asset: &NewCourseAsset<'_>)
    -> Result<CourseAssetRow>;

    /// Links an item to a lecture asset.
    async fn link_item_asset(&self, item: i64, asset: i64) -> Result<()>;

    /// Returns the existing lecture video record or inserts a new one.
    async fn get_or_create_video_asset(&self, video: &NewVideoAsset<'_>) -> Result<VideoAssetRow>;
}

#[async_trait]
impl CatalogRepository for CatalogStore {
    async fn get_or_create_course(&self, course: &NewCourse<'_>) -> Result<CourseRow> {
        CatalogStore::get_or_create_course(self, course).await
    }

    async fn get_or_create_module(&self, module: &NewModule<'_>) -> Result<ModuleRow> {
        CatalogStore::get_or_create_module(self, module).await
    }

    async fn get_or_create_lesson(&self, lesson: &NewLesson<'_>) -> Result<LessonRow> {
        CatalogStore::get_or_create_lesson(self, lesson).await
    }

    async fn get_or_create_item(&self, item: &NewItem<'_>) -> Result<ItemRow> {
        CatalogStore::get_or_create_item(self, item).await
    }

    async fn get_or_create_reference(&self, reference: &NewReference<'_>) -> Result<ReferenceRow> {
        CatalogStore::get_or_create_reference(self, reference).await
    }

    async fn get_or_create_course_asset(
        &self,
        asset: &NewCourseAsset<'_>,
    ) -> Result<CourseAssetRow> {
        CatalogStore::get_or_create_course_asset(self, asset).await
    }

    async fn link_item_asset(&self, item: i64, asset: i64) -> Result<()> {
        CatalogStore::link_item_asset(self, item, asset).await
    }

    async fn get_or_create_video_asset(&self, video: &NewVideoAsset<'_>) -> Result<VideoAssetRow> {
        CatalogStore::get_or_create_video_asset(self, video).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Database;
    use crate::catalog::EntityKind;

    async fn create_twice(repo: &dyn CatalogRepository) -> (CourseRow, CourseRow) {
        let course = NewCourse {
            course_id: "c1",
            name: "Algorithms",
            slug: "algorithms",
        };
        let first = repo.get_or_create_course(&course).await.unwrap();
        let second = repo.get_or_create_course(&course).await.unwrap();
        (first, second)
    }

    #[tokio::test]
    async fn test_catalog_repository_trait_delegates_to_store() {
        let store = CatalogStore::new(Database::new_in_memory().await.unwrap());

        let (first, second) = create_twice(&store).await;

        assert_eq!(first, second);
        assert_eq!(store.count(EntityKind::Course).await.unwrap(), 1);
    }
}
