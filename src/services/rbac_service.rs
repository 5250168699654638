// src/services/rbac_service.rs

use std::sync::Arc;

use serde_json::Value;

use crate::{
    common::error::AppError,
    db::{rbac_repo::Upserted, RoleStore},
    models::rbac::{Role, RoleMappingEntry, SyncEntryResult, SyncReport, SyncStatus},
};

/// Environment variable holding the JSON array of group-to-role mappings.
pub const GROUP_ROLE_MAPPINGS_ENV: &str = "GROUP_ROLE_MAPPINGS";

#[derive(Clone)]
pub struct RbacService {
    store: Arc<dyn RoleStore>,
}

impl RbacService {
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self { store }
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>, AppError> {
        self.store.list_roles().await
    }

    pub async fn resolve(&self, group_id: &str) -> Result<Option<Role>, AppError> {
        self.store.find_role_for_group(group_id).await
    }

    /// Most privileged role (lowest level) mapped from any of the groups.
    pub async fn resolve_highest(&self, group_ids: &[String]) -> Result<Option<Role>, AppError> {
        let roles = self.store.roles_for_groups(group_ids).await?;
        Ok(roles
            .into_iter()
            .min_by(|a, b| a.level.cmp(&b.level).then_with(|| a.name.cmp(&b.name))))
    }

    /// Upserts every entry independently; one bad entry never aborts the batch.
    pub async fn sync(&self, entries: Vec<RoleMappingEntry>) -> SyncReport {
        let mut report = SyncReport::default();
        for entry in entries {
            report.results.push(self.sync_entry(entry).await);
        }
        report
    }

    async fn sync_entry(&self, entry: RoleMappingEntry) -> SyncEntryResult {
        let outcome = async {
            let role = self
                .store
                .find_role_by_name(&entry.role_name)
                .await?
                .ok_or(AppError::NotFound("Role"))?;

            let (_, upserted) = self
                .store
                .upsert_mapping(&entry.group_id, &entry.group_name, role.id)
                .await?;
            Ok::<_, AppError>(upserted)
        }
        .await;

        match outcome {
            Ok(upserted) => {
                tracing::info!(group_id = %entry.group_id, role = %entry.role_name, ?upserted, "group role mapping synced");
                SyncEntryResult {
                    group_id: Some(entry.group_id),
                    status: match upserted {
                        Upserted::Created => SyncStatus::Created,
                        Upserted::Updated => SyncStatus::Updated,
                    },
                    error: None,
                }
            }
            Err(e) => {
                let reason = match e {
                    AppError::NotFound(_) => format!("Role '{}' does not exist.", entry.role_name),
                    other => other.to_string(),
                };
                tracing::warn!(group_id = %entry.group_id, %reason, "group role mapping failed");
                SyncEntryResult {
                    group_id: Some(entry.group_id),
                    status: SyncStatus::Failed,
                    error: Some(reason),
                }
            }
        }
    }

    /// Parses a JSON array of mappings and syncs it.
    ///
    /// Anything that is not a JSON array aborts before the store is touched. An element
    /// with the wrong shape only fails that element.
    pub async fn sync_from_json(&self, raw: &str) -> Result<SyncReport, AppError> {
        let elements: Vec<Value> =
            serde_json::from_str(raw).map_err(|e| AppError::MalformedBody {
                kind: "json_invalid",
                message: format!("Role mappings must be a JSON array: {e}"),
            })?;

        let mut report = SyncReport::default();
        for element in elements {
            let group_id = element
                .get("group_id")
                .and_then(Value::as_str)
                .map(str::to_string);

            let result = match serde_json::from_value::<RoleMappingEntry>(element) {
                Ok(entry) => self.sync_entry(entry).await,
                Err(e) => {
                    tracing::warn!(?group_id, error = %e, "skipping malformed role mapping");
                    SyncEntryResult {
                        group_id,
                        status: SyncStatus::Failed,
                        error: Some(format!("Malformed mapping: {e}")),
                    }
                }
            };
            report.results.push(result);
        }

        Ok(report)
    }

    /// Startup sync from the `GROUP_ROLE_MAPPINGS` value; `None` means the variable is unset.
    pub async fn sync_from_env(&self, raw: Option<&str>) -> Result<Option<SyncReport>, AppError> {
        let Some(raw) = raw else {
            tracing::info!("{GROUP_ROLE_MAPPINGS_ENV} not set, skipping role mapping sync");
            return Ok(None);
        };

        let report = self.sync_from_json(raw).await?;
        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "role mapping sync finished"
        );
        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryRoleStore;

    fn service() -> RbacService {
        RbacService::new(Arc::new(MemoryRoleStore::with_default_roles()))
    }

    fn entry(group_id: &str, role_name: &str) -> RoleMappingEntry {
        RoleMappingEntry {
            group_id: group_id.into(),
            group_name: format!("{group_id} group"),
            role_name: role_name.into(),
        }
    }

    #[tokio::test]
    async fn unknown_role_fails_only_its_entry() {
        let svc = service();
        let report = svc
            .sync(vec![entry("g-1", "Practitioner"), entry("g-2", "Wizard"), entry("g-3", "Viewer")])
            .await;

        let statuses: Vec<SyncStatus> = report.results.iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![SyncStatus::Created, SyncStatus::Failed, SyncStatus::Created]);
        assert!(report.results[1].error.as_deref().unwrap().contains("Wizard"));
        assert_eq!(svc.resolve("g-1").await.unwrap().unwrap().name, "Practitioner");
        assert_eq!(svc.resolve("g-2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn syncing_twice_updates_in_place() {
        let svc = service();
        svc.sync(vec![entry("g-1", "Viewer")]).await;
        let report = svc.sync(vec![entry("g-1", "Manager")]).await;

        assert_eq!(report.results[0].status, SyncStatus::Updated);
        assert_eq!(svc.resolve("g-1").await.unwrap().unwrap().name, "Manager");
    }

    #[tokio::test]
    async fn highest_role_has_the_lowest_level() {
        let svc = service();
        svc.sync(vec![entry("staff", "Viewer"), entry("admins", "Administrator")]).await;

        let groups = vec!["staff".to_string(), "admins".to_string(), "unknown".to_string()];
        let role = svc.resolve_highest(&groups).await.unwrap().unwrap();
        assert_eq!(role.name, "Administrator");
        assert_eq!(svc.resolve_highest(&[]).await.unwrap(), None);
    }

    #[tokio::test]
    async fn malformed_json_aborts_before_any_entry() {
        let svc = service();
        let err = svc.sync_from_json(r#"{"group_id": "g-1"}"#).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedBody { .. }));

        assert!(svc.sync_from_json("[not json").await.is_err());
        assert_eq!(svc.resolve("g-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn badly_shaped_element_fails_alone() {
        let svc = service();
        let raw = r#"[
            {"group_id": "g-1", "group_name": "Case workers", "role_name": "Practitioner"},
            {"group_id": "g-2"}
        ]"#;
        let report = svc.sync_from_json(raw).await.unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.results[1].group_id.as_deref(), Some("g-2"));
    }

    #[tokio::test]
    async fn unset_variable_is_skipped() {
        assert!(service().sync_from_env(None).await.unwrap().is_none());
    }
}
