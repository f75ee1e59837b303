use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Category, CategoryId, CategoryPayload};

/// Storage capability the category service depends on.
///
/// Absence is reported as `Ok(None)` from [`CategoryStore::find_by_id`]; the
/// error channel is reserved for backend failures.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Returns every stored category in a backend-stable order.
    async fn find_all(&self) -> Result<Vec<Category>, StoreError>;

    /// Looks up a single category.
    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, StoreError>;

    /// Overwrites the record named by `payload.assigned_id()` when it exists,
    /// otherwise inserts under a newly allocated identifier.
    async fn save(&self, payload: CategoryPayload) -> Result<Category, StoreError>;

    /// Removes the record with the same identifier. Removing a missing record is a no-op.
    async fn delete(&self, category: &Category) -> Result<(), StoreError>;
}

/// Errors surfaced by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("category store backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

/// Process-local store keeping categories in insertion order.
///
/// Identifiers come from a counter starting at 1 that only ever moves forward,
/// so a deleted identifier is never handed out again.
#[derive(Debug)]
pub struct InMemoryCategoryStore {
    inner: Mutex<InMemoryState>,
}

#[derive(Debug)]
struct InMemoryState {
    categories: Vec<Category>,
    next_id: CategoryId,
}

impl InMemoryCategoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(InMemoryState {
                categories: Vec::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for InMemoryCategoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryState {
    fn position(&self, id: CategoryId) -> Option<usize> {
        self.categories
            .iter()
            .position(|category| category.category_id == id)
    }

    fn allocate_id(&mut self) -> CategoryId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[async_trait]
impl CategoryStore for InMemoryCategoryStore {
    async fn find_all(&self) -> Result<Vec<Category>, StoreError> {
        let state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(state.categories.clone())
    }

    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        let state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(state.position(id).map(|index| state.categories[index].clone()))
    }

    async fn save(&self, payload: CategoryPayload) -> Result<Category, StoreError> {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(index) = payload.assigned_id().and_then(|id| state.position(id)) {
            let existing = &mut state.categories[index];
            existing.category_name = payload.category_name;
            return Ok(existing.clone());
        }

        let category = Category {
            category_id: state.allocate_id(),
            category_name: payload.category_name,
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn delete(&self, category: &Category) -> Result<(), StoreError> {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(index) = state.position(category.category_id) {
            state.categories.remove(index);
        }
        Ok(())
    }
}
