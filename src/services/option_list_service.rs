// src/services/option_list_service.rs

use std::{collections::BTreeMap, sync::Arc};

use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    db::{OptionListStore, OrganisationStore, SoftDeleteRepository},
    models::option_list::{
        DropdownOption, NewOptionList, NewOptionListItem, OptionList, OptionListItem,
    },
};

/// Parses `gender:gender-identity,lang:languages` into logical name -> slug.
/// An entry without `:` uses the slug as its logical name; blank entries are skipped.
pub fn parse_field_spec(raw: &str) -> BTreeMap<String, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((name, slug)) => (name.trim().to_string(), slug.trim().to_string()),
            None => (entry.to_string(), entry.to_string()),
        })
        .collect()
}

#[derive(Clone)]
pub struct OptionListService {
    store: Arc<dyn OptionListStore>,
    organisations: Arc<dyn OrganisationStore>,
}

impl OptionListService {
    pub fn new(store: Arc<dyn OptionListStore>, organisations: Arc<dyn OrganisationStore>) -> Self {
        Self { store, organisations }
    }

    /// Resolves each logical dropdown name to the active items of the list with that slug.
    ///
    /// Organisation-scoped lists win over global ones. A slug that resolves to no list
    /// yields an empty sequence and a warning; it never fails the call.
    pub async fn aggregate(
        &self,
        requests: &BTreeMap<String, String>,
        organisation_id: Option<Uuid>,
    ) -> Result<BTreeMap<String, Vec<DropdownOption>>, AppError> {
        let mut dropdowns = BTreeMap::new();

        for (name, slug) in requests {
            let options = match self.resolve_list(slug, organisation_id).await? {
                Some(list) => {
                    let mut items: Vec<OptionListItem> = self
                        .store
                        .list_items(list.id)
                        .await?
                        .into_iter()
                        .filter(|item| item.is_active)
                        .collect();
                    // Blank labels sort under the name they are displayed with
                    items.sort_by(|a, b| {
                        a.sort_order
                            .cmp(&b.sort_order)
                            .then_with(|| a.label_sort_key().cmp(&b.label_sort_key()))
                            .then_with(|| a.display_label().cmp(b.display_label()))
                    });
                    items.iter().map(DropdownOption::from).collect()
                }
                None => {
                    tracing::warn!(dropdown = %name, %slug, ?organisation_id, "option list not found");
                    Vec::new()
                }
            };
            dropdowns.insert(name.clone(), options);
        }

        Ok(dropdowns)
    }

    async fn resolve_list(
        &self,
        slug: &str,
        organisation_id: Option<Uuid>,
    ) -> Result<Option<OptionList>, AppError> {
        if let Some(org) = organisation_id {
            if let Some(list) = self.store.find_list_by_slug(slug, Some(org)).await? {
                return Ok(Some(list));
            }
        }
        self.store.find_list_by_slug(slug, None).await
    }

    // =========================================================================
    //  LISTS / ITEMS
    // =========================================================================

    pub async fn create_list(&self, new: NewOptionList) -> Result<OptionList, AppError> {
        // Scoped lists need a live organisation
        if let Some(org) = new.organisation_id {
            self.organisations.get_active(org).await?;
        }

        let list = self.store.create_list(new).await?;
        tracing::info!(option_list_id = %list.id, slug = %list.slug, "option list created");
        Ok(list)
    }

    pub async fn list_lists(&self, organisation_id: Option<Uuid>) -> Result<Vec<OptionList>, AppError> {
        self.store.list_lists(organisation_id).await
    }

    pub async fn create_item(&self, new: NewOptionListItem) -> Result<OptionListItem, AppError> {
        // 1. The list must exist
        self.store
            .get_list(new.option_list_id)
            .await?
            .ok_or(AppError::NotFound("Option list"))?;

        // 2. A parent has to live in the same list
        if let Some(parent_id) = new.parent_id {
            let parent = self.store.get_item(parent_id).await?;
            if parent.is_none_or(|p| p.option_list_id != new.option_list_id) {
                let mut err = ValidationError::new("parent_list");
                err.message = Some("Parent item must belong to the same option list".into());

                let mut errors = ValidationErrors::new();
                errors.add("parent_id", err);
                return Err(AppError::Validation(errors));
            }
        }

        self.store.create_item(new).await
    }

    pub async fn list_items(&self, option_list_id: Uuid) -> Result<Vec<OptionListItem>, AppError> {
        self.store
            .get_list(option_list_id)
            .await?
            .ok_or(AppError::NotFound("Option list"))?;
        self.store.list_items(option_list_id).await
    }
}
