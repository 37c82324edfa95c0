//! Runtime notification settings and their persistence.
//!
//! Settings are loaded once at startup, held by the notifier, and written
//! back through a [`SettingsStore`] whenever the admin API patches them.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub log_notifications: bool,
    pub email_enabled: bool,
    pub sms_enabled: bool,
    /// Off by default: free-tier transports only cover the admin.
    pub notify_passengers_directly: bool,
    pub admin_email: String,
    pub admin_phone: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            log_notifications: true,
            email_enabled: true,
            sms_enabled: false,
            notify_passengers_directly: false,
            admin_email: String::new(),
            admin_phone: String::new(),
        }
    }
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub log_notifications: Option<bool>,
    pub email_enabled: Option<bool>,
    pub sms_enabled: Option<bool>,
    pub notify_passengers_directly: Option<bool>,
    pub admin_email: Option<String>,
    pub admin_phone: Option<String>,
}

impl NotificationSettings {
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.log_notifications {
            self.log_notifications = v;
        }
        if let Some(v) = patch.email_enabled {
            self.email_enabled = v;
        }
        if let Some(v) = patch.sms_enabled {
            self.sms_enabled = v;
        }
        if let Some(v) = patch.notify_passengers_directly {
            self.notify_passengers_directly = v;
        }
        if let Some(v) = patch.admin_email {
            self.admin_email = v.trim().to_string();
        }
        if let Some(v) = patch.admin_phone {
            self.admin_phone = v.trim().to_string();
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Returns `None` when nothing has been persisted yet.
    async fn load(&self) -> Result<Option<NotificationSettings>, SettingsError>;

    async fn save(&self, settings: &NotificationSettings) -> Result<(), SettingsError>;
}

/// Pretty-printed JSON file on local disk.
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load(&self) -> Result<Option<NotificationSettings>, SettingsError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, settings: &NotificationSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        // Write-then-rename so a crash never leaves a half-written file behind.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Loads persisted settings, writing the defaults out on first run.
pub async fn load_or_init(
    store: &dyn SettingsStore,
) -> Result<NotificationSettings, SettingsError> {
    if let Some(settings) = store.load().await? {
        return Ok(settings);
    }
    let settings = NotificationSettings::default();
    store.save(&settings).await?;
    info!("Initialised default notification settings");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut settings = NotificationSettings::default();
        settings.apply(SettingsPatch {
            sms_enabled: Some(true),
            admin_phone: Some(" +15550100 ".to_string()),
            ..Default::default()
        });
        assert!(settings.sms_enabled);
        assert_eq!(settings.admin_phone, "+15550100");
        assert!(settings.email_enabled);
        assert!(settings.log_notifications);
        assert!(!settings.notify_passengers_directly);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: NotificationSettings =
            serde_json::from_str(r#"{ "smsEnabled": true }"#).unwrap();
        assert!(settings.sms_enabled);
        assert!(settings.email_enabled);
        assert_eq!(settings.admin_email, "");
    }

    #[tokio::test]
    async fn test_load_or_init_writes_defaults_then_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path().join("data/settings.json"));

        assert!(store.load().await.unwrap().is_none());
        let initial = load_or_init(&store).await.unwrap();
        assert_eq!(initial, NotificationSettings::default());

        let mut changed = initial.clone();
        changed.admin_email = "ops@example.com".to_string();
        store.save(&changed).await.unwrap();

        assert_eq!(load_or_init(&store).await.unwrap(), changed);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let err = FileSettingsStore::new(path).load().await.unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }
}
