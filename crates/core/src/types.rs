use serde::{Deserialize, Serialize};

/// Identifier assigned to a category by its store.
pub type CategoryId = i64;

/// A persisted category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category_id: CategoryId,
    pub category_name: String,
}

/// Category data as received from a client, before the store has settled its identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub category_name: String,
}

impl CategoryPayload {
    /// Builds a payload without an identifier, i.e. one that will be inserted.
    pub fn named<S: Into<String>>(name: S) -> Self {
        Self {
            category_id: None,
            category_name: name.into(),
        }
    }

    /// Returns the identifier when it refers to a record the store could hold.
    ///
    /// Identifiers start at 1, so zero and negative values are treated the same
    /// as a missing one.
    pub fn assigned_id(&self) -> Option<CategoryId> {
        self.category_id.filter(|id| *id > 0)
    }
}

impl From<Category> for CategoryPayload {
    fn from(category: Category) -> Self {
        Self {
            category_id: Some(category.category_id),
            category_name: category.category_name,
        }
    }
}
