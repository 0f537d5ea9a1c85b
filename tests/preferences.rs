//! Resolver behavior: merge semantics, override lifecycle, cache reuse.

mod common;

use std::sync::atomic::Ordering;

use serde_json::json;

use prefstore::application::error::AppError;
use prefstore::application::identity::IdentityError;
use prefstore::domain::kinds::Kind;

use common::{SITE, TOKEN, USER, build_app, seed_standard_site};

#[tokio::test]
async fn defaults_resolve_for_a_user_with_no_overrides() {
    let app = build_app();
    seed_standard_site(&app).await;

    let preferences = app.preferences.get(TOKEN, SITE).await.expect("resolve");

    let keys: Vec<&str> = preferences.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, ["beta-opt-in", "retry-count", "test-key"]);
    assert!(preferences.iter().all(|p| p.user_id == USER));
    assert_eq!(preferences[0].value, json!(false));
    assert_eq!(preferences[1].value, json!(1));
    assert_eq!(preferences[2].value, json!("test-default"));
}

#[tokio::test]
async fn update_persists_exactly_one_override() {
    let app = build_app();
    seed_standard_site(&app).await;

    let preference = app
        .preferences
        .update(TOKEN, SITE, "test-key", &json!("custom_value"))
        .await
        .expect("update");
    assert_eq!(preference.value, json!("custom_value"));
    assert_eq!(app.store.override_count().await, 1);

    // A second deviation for the same key replaces the row in place.
    let first = app
        .store
        .find_override(SITE, USER, "test-key")
        .await
        .expect("override exists");
    app.preferences
        .update(TOKEN, SITE, "test-key", &json!("another_value"))
        .await
        .expect("second update");
    let second = app
        .store
        .find_override(SITE, USER, "test-key")
        .await
        .expect("override exists");

    assert_eq!(app.store.override_count().await, 1);
    assert_eq!(first.id, second.id);
    assert_eq!(second.value, "another_value");
}

#[tokio::test]
async fn resolved_set_reflects_the_override_after_update() {
    let app = build_app();
    seed_standard_site(&app).await;

    // Warm the merged-result cache, then mutate.
    app.preferences.get(TOKEN, SITE).await.expect("warm");
    app.preferences
        .update(TOKEN, SITE, "retry-count", &json!(42))
        .await
        .expect("update");

    let preferences = app.preferences.get(TOKEN, SITE).await.expect("resolve");
    let retry = preferences
        .iter()
        .find(|p| p.key == "retry-count")
        .expect("retry-count present");
    assert_eq!(retry.value, json!(42));
    assert_eq!(retry.kind, Kind::Integer);
}

#[tokio::test]
async fn writing_the_default_value_back_resets_the_override() {
    let app = build_app();
    seed_standard_site(&app).await;

    app.preferences
        .update(TOKEN, SITE, "retry-count", &json!(42))
        .await
        .expect("deviate");
    assert_eq!(app.store.override_count().await, 1);

    let preference = app
        .preferences
        .update(TOKEN, SITE, "retry-count", &json!(1))
        .await
        .expect("reset");

    assert_eq!(app.store.override_count().await, 0);
    assert_eq!(preference.value, json!(1));

    let preferences = app.preferences.get(TOKEN, SITE).await.expect("resolve");
    let retry = preferences
        .iter()
        .find(|p| p.key == "retry-count")
        .expect("retry-count present");
    assert_eq!(retry.value, json!(1));
}

#[tokio::test]
async fn update_for_an_undeclared_key_is_rejected() {
    let app = build_app();
    seed_standard_site(&app).await;

    let err = app
        .preferences
        .update(TOKEN, SITE, "missing", &json!("x"))
        .await
        .expect_err("no default for key");

    assert!(matches!(err, AppError::InvalidKey { .. }));
    assert_eq!(err.to_string(), "unknown preference key `missing`");
    assert_eq!(app.store.override_count().await, 0);
}

#[tokio::test]
async fn update_with_the_wrong_type_is_rejected() {
    let app = build_app();
    seed_standard_site(&app).await;

    let err = app
        .preferences
        .update(TOKEN, SITE, "retry-count", &json!("abc"))
        .await
        .expect_err("string is not an integer");

    assert_eq!(err.to_string(), "Expected INTEGER for key retry-count");
    assert_eq!(app.store.override_count().await, 0);
}

#[tokio::test]
async fn orphaned_overrides_drop_out_of_the_merge() {
    let app = build_app();
    seed_standard_site(&app).await;

    app.preferences
        .update(TOKEN, SITE, "test-key", &json!("custom_value"))
        .await
        .expect("deviate");
    app.defaults
        .delete(SITE, "test-key")
        .await
        .expect("delete default");

    // The override row survives, but it no longer surfaces.
    assert_eq!(app.store.override_count().await, 1);
    let preferences = app.preferences.get(TOKEN, SITE).await.expect("resolve");
    assert!(preferences.iter().all(|p| p.key != "test-key"));
}

#[tokio::test]
async fn repeated_reads_serve_from_the_cache() {
    let app = build_app();
    seed_standard_site(&app).await;

    app.preferences.get(TOKEN, SITE).await.expect("first read");
    app.preferences.get(TOKEN, SITE).await.expect("second read");

    assert_eq!(app.store.default_list_calls.load(Ordering::SeqCst), 1);
    assert_eq!(app.store.override_list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn admin_default_upsert_invalidates_the_default_set() {
    let app = build_app();
    seed_standard_site(&app).await;

    app.defaults.list(SITE).await.expect("warm defaults cache");
    app.defaults
        .upsert(prefstore::application::defaults::UpsertDefaultCommand {
            site_url: SITE.to_string(),
            key: "test-key".to_string(),
            kind: Kind::String,
            value: json!("revised-default"),
            deprecated: false,
        })
        .await
        .expect("upsert default");

    let defaults = app.defaults.list(SITE).await.expect("reload");
    let revised = defaults
        .iter()
        .find(|d| d.key == "test-key")
        .expect("test-key present");
    assert_eq!(revised.value, "revised-default");
    // First list, then the post-invalidation reload.
    assert_eq!(app.store.default_list_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unknown_sites_are_reported_as_such() {
    let app = build_app();
    seed_standard_site(&app).await;

    let err = app
        .preferences
        .get(TOKEN, "nowhere.test")
        .await
        .expect_err("unknown site");
    assert!(matches!(err, AppError::UnknownSite { .. }));
}

#[tokio::test]
async fn rejected_tokens_surface_as_auth_errors() {
    let app = build_app();
    seed_standard_site(&app).await;

    let err = app
        .preferences
        .get("forged-token", SITE)
        .await
        .expect_err("unknown token");
    assert!(matches!(err, AppError::Auth(IdentityError::Unauthorized)));
}
