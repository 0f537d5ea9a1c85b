#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use prefstore::application::defaults::DefaultsService;
use prefstore::application::identity::{IdentityError, IdentityResolver};
use prefstore::application::overrides::OverrideStore;
use prefstore::application::preferences::PreferenceService;
use prefstore::application::repos::{
    DefaultsRepo, OverridesRepo, RepoError, SitesRepo, UpsertDefaultParams, UpsertOverrideParams,
};
use prefstore::application::sites::SiteService;
use prefstore::cache::{MemoryCache, PreferenceCache};
use prefstore::domain::entities::{DefaultRecord, OverrideRecord, SiteRecord};
use prefstore::domain::kinds::Kind;
use prefstore::infra::http::api::state::ApiState;

pub const SITE: &str = "example.com";
pub const AUTH_URL: &str = "identity.foo.com";
pub const TOKEN: &str = "valid-token";
pub const USER: &str = "user-1";
pub const ADMIN_TOKEN: &str = "admin-secret";

/// Shared in-memory persistence used in place of Postgres.
#[derive(Default)]
pub struct InMemoryStore {
    sites: Mutex<HashMap<String, SiteRecord>>,
    defaults: Mutex<HashMap<(String, String), DefaultRecord>>,
    overrides: Mutex<HashMap<(String, String, String), OverrideRecord>>,
    pub default_list_calls: AtomicUsize,
    pub override_list_calls: AtomicUsize,
}

impl InMemoryStore {
    pub async fn insert_site(&self, url: &str, auth_url: &str) {
        self.sites.lock().await.insert(
            url.to_string(),
            SiteRecord {
                url: url.to_string(),
                auth_url: auth_url.to_string(),
            },
        );
    }

    pub async fn insert_default(&self, site_url: &str, key: &str, kind: Kind, value: &str) {
        self.defaults.lock().await.insert(
            (site_url.to_string(), key.to_string()),
            DefaultRecord {
                site_url: site_url.to_string(),
                key: key.to_string(),
                kind,
                value: value.to_string(),
                deprecated: false,
            },
        );
    }

    pub async fn override_count(&self) -> usize {
        self.overrides.lock().await.len()
    }

    pub async fn find_override(
        &self,
        site_url: &str,
        user_id: &str,
        key: &str,
    ) -> Option<OverrideRecord> {
        self.overrides
            .lock()
            .await
            .get(&(site_url.to_string(), user_id.to_string(), key.to_string()))
            .cloned()
    }
}

#[async_trait]
impl SitesRepo for InMemoryStore {
    async fn find_site(&self, site_url: &str) -> Result<Option<SiteRecord>, RepoError> {
        Ok(self.sites.lock().await.get(site_url).cloned())
    }

    async fn upsert_site(&self, site: SiteRecord) -> Result<SiteRecord, RepoError> {
        self.sites
            .lock()
            .await
            .insert(site.url.clone(), site.clone());
        Ok(site)
    }
}

#[async_trait]
impl DefaultsRepo for InMemoryStore {
    async fn list_defaults(&self, site_url: &str) -> Result<Vec<DefaultRecord>, RepoError> {
        self.default_list_calls.fetch_add(1, Ordering::SeqCst);
        let mut defaults: Vec<DefaultRecord> = self
            .defaults
            .lock()
            .await
            .values()
            .filter(|record| record.site_url == site_url)
            .cloned()
            .collect();
        defaults.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(defaults)
    }

    async fn find_default(
        &self,
        site_url: &str,
        key: &str,
    ) -> Result<Option<DefaultRecord>, RepoError> {
        Ok(self
            .defaults
            .lock()
            .await
            .get(&(site_url.to_string(), key.to_string()))
            .cloned())
    }

    async fn upsert_default(
        &self,
        params: UpsertDefaultParams,
    ) -> Result<DefaultRecord, RepoError> {
        let record = DefaultRecord {
            site_url: params.site_url.clone(),
            key: params.key.clone(),
            kind: params.kind,
            value: params.value,
            deprecated: params.deprecated,
        };
        self.defaults
            .lock()
            .await
            .insert((params.site_url, params.key), record.clone());
        Ok(record)
    }

    async fn delete_default(&self, site_url: &str, key: &str) -> Result<bool, RepoError> {
        Ok(self
            .defaults
            .lock()
            .await
            .remove(&(site_url.to_string(), key.to_string()))
            .is_some())
    }
}

#[async_trait]
impl OverridesRepo for InMemoryStore {
    async fn list_overrides(
        &self,
        site_url: &str,
        user_id: &str,
    ) -> Result<Vec<OverrideRecord>, RepoError> {
        self.override_list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .overrides
            .lock()
            .await
            .values()
            .filter(|record| record.site_url == site_url && record.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn upsert_override(
        &self,
        params: UpsertOverrideParams,
    ) -> Result<OverrideRecord, RepoError> {
        let mut overrides = self.overrides.lock().await;
        let slot = (
            params.site_url.clone(),
            params.user_id.clone(),
            params.key.clone(),
        );
        let id = overrides
            .get(&slot)
            .map(|existing| existing.id)
            .unwrap_or_else(Uuid::new_v4);
        let record = OverrideRecord {
            id,
            site_url: params.site_url,
            user_id: params.user_id,
            key: params.key,
            kind: params.kind,
            value: params.value,
        };
        overrides.insert(slot, record.clone());
        Ok(record)
    }

    async fn delete_override(
        &self,
        site_url: &str,
        user_id: &str,
        key: &str,
    ) -> Result<bool, RepoError> {
        Ok(self
            .overrides
            .lock()
            .await
            .remove(&(site_url.to_string(), user_id.to_string(), key.to_string()))
            .is_some())
    }
}

/// Identity resolver with a fixed token-to-user table.
pub struct StaticIdentityResolver {
    tokens: HashMap<String, String>,
}

impl StaticIdentityResolver {
    pub fn new(tokens: &[(&str, &str)]) -> Self {
        Self {
            tokens: tokens
                .iter()
                .map(|(token, user)| (token.to_string(), user.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl IdentityResolver for StaticIdentityResolver {
    async fn resolve_user_id(
        &self,
        _auth_url: &str,
        token: &str,
    ) -> Result<String, IdentityError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(IdentityError::Unauthorized)
    }
}

pub struct TestApp {
    pub store: Arc<InMemoryStore>,
    pub cache: Arc<MemoryCache>,
    pub sites: Arc<SiteService>,
    pub defaults: Arc<DefaultsService>,
    pub overrides: Arc<OverrideStore>,
    pub preferences: Arc<PreferenceService>,
    pub state: ApiState,
}

pub fn build_app() -> TestApp {
    build_app_with_tokens(&[(TOKEN, USER)])
}

pub fn build_app_with_tokens(tokens: &[(&str, &str)]) -> TestApp {
    let store = Arc::new(InMemoryStore::default());
    let cache = Arc::new(MemoryCache::default());
    let shared_cache: Arc<dyn PreferenceCache> = cache.clone();

    let sites_repo: Arc<dyn SitesRepo> = store.clone();
    let defaults_repo: Arc<dyn DefaultsRepo> = store.clone();
    let overrides_repo: Arc<dyn OverridesRepo> = store.clone();
    let identity: Arc<dyn IdentityResolver> = Arc::new(StaticIdentityResolver::new(tokens));

    let sites = Arc::new(SiteService::new(sites_repo, shared_cache.clone()));
    let defaults = Arc::new(DefaultsService::new(
        sites.clone(),
        defaults_repo,
        shared_cache.clone(),
    ));
    let overrides = Arc::new(OverrideStore::new(overrides_repo, shared_cache.clone()));
    let preferences = Arc::new(PreferenceService::new(
        sites.clone(),
        defaults.clone(),
        overrides.clone(),
        identity,
        shared_cache,
    ));

    let state = ApiState {
        preferences: preferences.clone(),
        sites: sites.clone(),
        defaults: defaults.clone(),
        admin_token: Some(Arc::from(ADMIN_TOKEN)),
    };

    TestApp {
        store,
        cache,
        sites,
        defaults,
        overrides,
        preferences,
        state,
    }
}

/// One site with a string, an integer, and a boolean default.
pub async fn seed_standard_site(app: &TestApp) {
    app.store.insert_site(SITE, AUTH_URL).await;
    app.store
        .insert_default(SITE, "test-key", Kind::String, "test-default")
        .await;
    app.store
        .insert_default(SITE, "retry-count", Kind::Integer, "1")
        .await;
    app.store
        .insert_default(SITE, "beta-opt-in", Kind::Boolean, "false")
        .await;
}
