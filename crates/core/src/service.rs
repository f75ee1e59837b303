use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::store::{CategoryStore, StoreError};
use crate::types::{Category, CategoryId, CategoryPayload};

/// Errors returned by [`CategoryService`].
#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("Category with categoryId: {0} not found")]
    NotFound(CategoryId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Orchestrates category CRUD against a [`CategoryStore`].
///
/// Updates and deletions look the record up first and fail with
/// [`CategoryError::NotFound`] when it is absent. Mutations are serialized so
/// a lookup and the write that follows it observe the same record.
pub struct CategoryService {
    store: Arc<dyn CategoryStore>,
    write_lock: Mutex<()>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn CategoryStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn get_all_categories(&self) -> Result<Vec<Category>, CategoryError> {
        Ok(self.store.find_all().await?)
    }

    /// Persists a category and returns it with its identifier populated.
    ///
    /// No duplicate checks are made: a payload naming an existing identifier
    /// overwrites that record.
    pub async fn create_category(
        &self,
        category: CategoryPayload,
    ) -> Result<Category, CategoryError> {
        let _guard = self.write_lock.lock().await;
        Ok(self.store.save(category).await?)
    }

    /// Deletes the category with `category_id`, returning a confirmation message.
    pub async fn delete_category(&self, category_id: CategoryId) -> Result<String, CategoryError> {
        let _guard = self.write_lock.lock().await;
        let existing = self
            .store
            .find_by_id(category_id)
            .await?
            .ok_or(CategoryError::NotFound(category_id))?;

        self.store.delete(&existing).await?;
        Ok(format!(
            "Category with categoryId: {category_id} deleted successfully"
        ))
    }

    /// Renames the category with `category_id`.
    ///
    /// Only the name is taken from `category`; its `category_id` is ignored and
    /// the record keeps the identifier it was looked up by.
    pub async fn update_category(
        &self,
        category: CategoryPayload,
        category_id: CategoryId,
    ) -> Result<Category, CategoryError> {
        let _guard = self.write_lock.lock().await;
        let mut existing = self
            .store
            .find_by_id(category_id)
            .await?
            .ok_or(CategoryError::NotFound(category_id))?;

        existing.category_name = category.category_name;
        Ok(self.store.save(existing.into()).await?)
    }
}
