// src/models/option_list.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A named, sluggable category of dropdown values.
/// `organisation_id = None` means the list is global (or a template).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct OptionList {
    pub id: Uuid,
    #[schema(example = "Gender identity")]
    pub name: String,
    #[schema(example = "gender-identity")]
    pub slug: String,
    pub description: Option<String>,
    pub organisation_id: Option<Uuid>,
    pub is_template: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct OptionListItem {
    pub id: Uuid,
    pub option_list_id: Uuid,
    #[schema(example = "prefer_not_to_say")]
    pub name: String,
    #[schema(example = "Prefer not to say")]
    pub label: String,
    #[schema(example = "prefer-not-to-say")]
    pub slug: String,
    pub sort_order: i32,
    pub is_active: bool,
    // Free-form JSON object (JSONB in the database)
    #[schema(value_type = Object)]
    pub metadata: Value,
    pub parent_id: Option<Uuid>,
    pub region: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OptionListItem {
    /// Label shown to users; blank labels fall back to the item name.
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.name
        } else {
            &self.label
        }
    }

    /// Case-insensitive ordering key, so "alpha" sorts before "Zulu".
    pub fn label_sort_key(&self) -> String {
        self.display_label().to_lowercase()
    }
}

#[derive(Debug, Clone)]
pub struct NewOptionList {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub organisation_id: Option<Uuid>,
    pub is_template: bool,
}

#[derive(Debug, Clone)]
pub struct NewOptionListItem {
    pub option_list_id: Uuid,
    pub name: String,
    pub label: String,
    pub slug: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub metadata: Value,
    pub parent_id: Option<Uuid>,
    pub region: Option<String>,
}

/// One entry of an aggregated dropdown.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DropdownOption {
    pub id: Uuid,
    #[schema(example = "Prefer not to say")]
    pub label: String,
    #[schema(example = "prefer-not-to-say")]
    pub slug: String,
}

impl From<&OptionListItem> for DropdownOption {
    fn from(item: &OptionListItem) -> Self {
        Self {
            id: item.id,
            label: item.display_label().to_string(),
            slug: item.slug.clone(),
        }
    }
}

/// Aggregated dropdowns: logical name -> ordered options.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(transparent)]
pub struct Dropdowns(pub BTreeMap<String, Vec<DropdownOption>>);
