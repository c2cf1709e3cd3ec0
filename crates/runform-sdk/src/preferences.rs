//! Scoped preference store
//!
//! Small per-user settings (last picked input sets, collapsed panels, ...)
//! saved under a key built from the scope they belong to:
//!
//! | scope   | key                              |
//! |---------|----------------------------------|
//! | User    | `<user>/<entity>`                |
//! | Account | `<account>/<entity>`             |
//! | Org     | `<account>/<org>/<entity>`       |
//! | Project | `<account>/<org>/<project>/<entity>` |
//! | Machine | `<entity>`                       |
//!
//! All values live in one JSON object stored under the top-level key
//! `preferences` by a [`PreferenceBackend`]. Writing requires every key part
//! of the scope to be known; reading and clearing do not.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;
use tokio::sync::{Mutex, RwLock};

use runform_core::ProjectScope;

use crate::error::{Result, SdkError};

/// Top-level key the preference object is stored under
pub const PREFERENCES_TOP_LEVEL_KEY: &str = "preferences";

/// Scope a preference is saved in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreferenceScope {
    User,
    Account,
    Org,
    Project,
    /// Workstation-wide; the default scope
    Machine,
}

impl fmt::Display for PreferenceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PreferenceScope::User => "USER",
            PreferenceScope::Account => "ACCOUNT",
            PreferenceScope::Org => "ORG",
            PreferenceScope::Project => "PROJECT",
            PreferenceScope::Machine => "MACHINE",
        };
        f.write_str(name)
    }
}

/// Identifiers known in the current context
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceContext {
    pub account_id: Option<String>,
    pub org_identifier: Option<String>,
    pub project_identifier: Option<String>,
    pub user_id: Option<String>,
}

impl PreferenceContext {
    /// Context of a project scope; empty identifiers count as unknown
    pub fn from_scope(scope: &ProjectScope) -> Self {
        let known = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Self {
            account_id: known(&scope.account_id),
            org_identifier: known(&scope.org_identifier),
            project_identifier: known(&scope.project_identifier),
            user_id: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    fn key_parts(&self, scope: PreferenceScope) -> Vec<Option<&str>> {
        let account = self.account_id.as_deref();
        let org = self.org_identifier.as_deref();
        let project = self.project_identifier.as_deref();
        match scope {
            PreferenceScope::User => vec![self.user_id.as_deref()],
            PreferenceScope::Account => vec![account],
            PreferenceScope::Org => vec![account, org],
            PreferenceScope::Project => vec![account, org, project],
            PreferenceScope::Machine => Vec::new(),
        }
    }

    /// Storage key of `entity`; unknown parts render empty
    pub fn key(&self, scope: PreferenceScope, entity: &str) -> String {
        self.key_parts(scope)
            .into_iter()
            .map(|part| part.unwrap_or(""))
            .chain(std::iter::once(entity))
            .collect::<Vec<_>>()
            .join("/")
    }

    fn check_access(&self, scope: PreferenceScope) -> Result<()> {
        if self.key_parts(scope).iter().any(Option::is_none) {
            return Err(SdkError::ScopeUnavailable {
                scope: scope.to_string(),
            });
        }
        Ok(())
    }
}

/// Persistence of the preference object
#[async_trait]
pub trait PreferenceBackend: Send + Sync {
    /// Stored preferences; empty when nothing was saved yet
    async fn load(&self) -> Result<Map<String, Value>>;

    /// Replace the stored preferences
    async fn save(&self, preferences: &Map<String, Value>) -> Result<()>;
}

/// Process-local backend
#[derive(Debug, Default)]
pub struct MemoryBackend {
    document: Mutex<Map<String, Value>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceBackend for MemoryBackend {
    async fn load(&self) -> Result<Map<String, Value>> {
        let document = self.document.lock().await;
        Ok(preferences_of(&document))
    }

    async fn save(&self, preferences: &Map<String, Value>) -> Result<()> {
        let mut document = self.document.lock().await;
        document.insert(
            PREFERENCES_TOP_LEVEL_KEY.to_string(),
            Value::Object(preferences.clone()),
        );
        Ok(())
    }
}

/// JSON file backend; other top-level keys in the file are preserved
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_document(&self) -> Result<Map<String, Value>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Map::new()),
            Ok(content) => match serde_json::from_str(&content)? {
                Value::Object(map) => Ok(map),
                _ => Err(SdkError::ConfigError(format!(
                    "{} does not hold a JSON object",
                    self.path.display()
                ))),
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl PreferenceBackend for JsonFileBackend {
    async fn load(&self) -> Result<Map<String, Value>> {
        Ok(preferences_of(&self.read_document().await?))
    }

    async fn save(&self, preferences: &Map<String, Value>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        document.insert(
            PREFERENCES_TOP_LEVEL_KEY.to_string(),
            Value::Object(preferences.clone()),
        );
        let content = serde_json::to_string_pretty(&Value::Object(document))?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

fn preferences_of(document: &Map<String, Value>) -> Map<String, Value> {
    match document.get(PREFERENCES_TOP_LEVEL_KEY) {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    }
}

/// Scoped key-value store over a [`PreferenceBackend`]
///
/// Writes load, modify and save the whole object, so `set` and `clear` hold
/// `write_lock` across the round trip.
pub struct PreferenceStore {
    backend: Box<dyn PreferenceBackend>,
    context: RwLock<PreferenceContext>,
    write_lock: Mutex<()>,
}

impl PreferenceStore {
    pub fn new(backend: impl PreferenceBackend + 'static, context: PreferenceContext) -> Self {
        Self {
            backend: Box::new(backend),
            context: RwLock::new(context),
            write_lock: Mutex::new(()),
        }
    }

    /// In-memory store
    pub fn in_memory(context: PreferenceContext) -> Self {
        Self::new(MemoryBackend::new(), context)
    }

    pub async fn context(&self) -> PreferenceContext {
        self.context.read().await.clone()
    }

    /// Replace the context, e.g. once the current user is known
    pub async fn update_context(&self, context: PreferenceContext) {
        *self.context.write().await = context;
    }

    /// Set the current user, keeping the rest of the context
    pub async fn set_user(&self, user_id: Option<String>) {
        let mut context = self.context.write().await;
        if user_id.is_some() {
            context.user_id = user_id;
        }
    }

    /// Save `value` for `entity`; fails when the scope is not fully known
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        scope: PreferenceScope,
        entity: &str,
        value: &T,
    ) -> Result<()> {
        let key = {
            let context = self.context.read().await;
            context.check_access(scope)?;
            context.key(scope, entity)
        };

        let value = serde_json::to_value(value)?;
        let _guard = self.write_lock.lock().await;
        let mut preferences = self.backend.load().await?;
        preferences.insert(key.clone(), value);
        self.backend.save(&preferences).await?;

        tracing::debug!(key = %key, "preference saved");
        Ok(())
    }

    /// Raw stored value of `entity`
    pub async fn get_value(&self, scope: PreferenceScope, entity: &str) -> Result<Option<Value>> {
        let key = self.context.read().await.key(scope, entity);
        Ok(self.backend.load().await?.remove(&key))
    }

    /// Stored value of `entity`, deserialized
    pub async fn get<T: DeserializeOwned>(
        &self,
        scope: PreferenceScope,
        entity: &str,
    ) -> Result<Option<T>> {
        match self.get_value(scope, entity).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Remove `entity`
    pub async fn clear(&self, scope: PreferenceScope, entity: &str) -> Result<()> {
        let key = self.context.read().await.key(scope, entity);
        let _guard = self.write_lock.lock().await;
        let mut preferences = self.backend.load().await?;
        if preferences.remove(&key).is_some() {
            self.backend.save(&preferences).await?;
        }
        Ok(())
    }
}
