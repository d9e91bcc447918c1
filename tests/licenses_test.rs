#![recursion_limit = "256"]

mod common;

use opsconsole::api_models::ValidateLicenseRequest;
use opsconsole::error::ConsoleError;
use opsconsole::handlers::licenses::LicensesPage;
use opsconsole::models::{LicenseStatus, LicenseType};

use common::{signed_in, spawn, ScriptedInteraction, VALID_KEY};

#[tokio::test]
async fn test_create_uses_tier_caps_and_toggled_modules() {
    let server = spawn().await;
    let customer = server.backend.seed_customer("C1", "Acme", "offline");
    let page = LicensesPage::new(signed_in(&server, ScriptedInteraction::new()).await);

    let mut form = page.open_create().unwrap();
    form.set_customer(customer);
    form.select_type(LicenseType::Professional);
    form.toggle_module("stock");
    form.toggle_module("web");
    let saved = page.submit(&mut form).await.unwrap();

    assert_eq!(saved.license_type, LicenseType::Professional);
    assert_eq!((saved.max_users, saved.max_companies, saved.max_storage_gb), (200, 10, 200));
    let modules: Vec<&str> = saved.modules_enabled.iter().map(String::as_str).collect();
    assert_eq!(modules, vec!["base", "stock"]);
    assert_eq!(page.licenses().len(), 1);
}

#[tokio::test]
async fn test_overridden_caps_are_kept() {
    let server = spawn().await;
    let customer = server.backend.seed_customer("C1", "Acme", "offline");
    let page = LicensesPage::new(signed_in(&server, ScriptedInteraction::new()).await);

    let mut form = page.open_create().unwrap();
    form.set_customer(customer);
    form.select_type(LicenseType::Standard);
    form.set_max_users(75);
    page.submit(&mut form).await.unwrap();

    let stored = server.backend.last_license().unwrap();
    assert_eq!(stored["max_users"], 75);
    assert_eq!(stored["max_companies"], 3);
}

#[tokio::test]
async fn test_unknown_key_reports_invalid() {
    let server = spawn().await;
    let page = LicensesPage::new(signed_in(&server, ScriptedInteraction::new()).await);

    let unknown = page
        .validate(&ValidateLicenseRequest {
            license_key: "LIC-NOPE".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(!unknown.valid);
    assert_eq!(unknown.error.as_deref(), Some("License not found"));

    let known = page
        .validate(&ValidateLicenseRequest {
            license_key: VALID_KEY.to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(known.valid);
    assert_eq!(known.days_remaining, Some(365));
}

#[tokio::test]
async fn test_empty_key_is_not_sent() {
    let server = spawn().await;
    let page = LicensesPage::new(signed_in(&server, ScriptedInteraction::new()).await);

    let err = page.validate(&ValidateLicenseRequest::default()).await.unwrap_err();

    assert!(matches!(err, ConsoleError::InvalidInput(_)));
    assert_eq!(server.backend.count("POST", "/api/licenses/validate_license/"), 0);
}

#[tokio::test]
async fn test_revoke_after_confirmation() {
    let server = spawn().await;
    let customer = server.backend.seed_customer("C1", "Acme", "offline");
    let operator = ScriptedInteraction::new();
    let page = LicensesPage::new(signed_in(&server, operator.clone()).await);
    let mut form = page.open_create().unwrap();
    form.set_customer(customer);
    let license = page.submit(&mut form).await.unwrap();

    operator.answer_confirm(false);
    assert!(matches!(page.revoke(license.id).await, Err(ConsoleError::Cancelled)));

    operator.answer_confirm(true);
    let response = page.revoke(license.id).await.unwrap();

    assert_eq!(response.message, "License revoked");
    assert_eq!(page.licenses()[0].status, LicenseStatus::Revoked);
    assert_eq!(server.backend.count("POST", &format!("/api/licenses/{}/revoke/", license.id)), 1);
}
