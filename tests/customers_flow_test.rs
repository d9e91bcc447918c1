#![recursion_limit = "256"]

mod common;

use chrono::NaiveDate;

use opsconsole::error::ConsoleError;
use opsconsole::handlers::customers::CustomersPage;
use opsconsole::models::{CustomerStatus, DeploymentType, LicenseType};
use opsconsole::view::ViewMode;

use common::{signed_in, spawn, ScriptedInteraction};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_create_then_delete_customer() {
    let server = spawn().await;
    let operator = ScriptedInteraction::new();
    let state = signed_in(&server, operator.clone()).await;
    let page = CustomersPage::new(state);
    page.load().await.unwrap();
    assert!(page.customers().is_empty());

    let mut form = page.open_create().unwrap();
    form.set_customer_id("C1");
    form.set_name("Acme");
    form.set_contact_email("a@acme.com");
    form.set_deployment_type(DeploymentType::Online);
    form.set_status(CustomerStatus::Trial);
    let created = page.submit(&mut form).await.unwrap();

    assert_eq!(page.view(), ViewMode::List);
    let rows = page.customers();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].customer_id, "C1");

    operator.answer_confirm(true);
    page.delete(&created).await.unwrap();

    let asked = operator.asked();
    assert_eq!(asked.len(), 1);
    assert!(asked[0].contains("\"Acme\""));
    assert!(page.customers().is_empty());
    assert_eq!(server.backend.count("DELETE", "/api/customers/"), 1);
}

#[tokio::test]
async fn test_declined_delete_sends_nothing() {
    let server = spawn().await;
    server.backend.seed_customer("C9", "Globex", "online");
    let operator = ScriptedInteraction::new();
    let page = CustomersPage::new(signed_in(&server, operator.clone()).await);
    page.load().await.unwrap();
    let customer = page.customers().remove(0);

    operator.answer_confirm(false);
    let err = page.delete(&customer).await.unwrap_err();

    assert!(matches!(err, ConsoleError::Cancelled));
    assert_eq!(server.backend.count("DELETE", "/api/customers/"), 0);
    assert_eq!(page.customers().len(), 1);
}

#[tokio::test]
async fn test_invalid_form_never_reaches_network() {
    let server = spawn().await;
    let page = CustomersPage::new(signed_in(&server, ScriptedInteraction::new()).await);

    let mut form = page.open_create().unwrap();
    form.set_customer_id("C2");
    form.set_name("Initech");
    form.set_contact_email("not-an-email");
    form.set_contract_start_date(Some(date(2025, 6, 1)));
    form.set_contract_end_date(Some(date(2025, 6, 1)));

    let err = page.submit(&mut form).await.unwrap_err();
    let ConsoleError::Validation(errors) = err else {
        panic!("expected validation failure");
    };
    assert_eq!(errors.get("contact_email"), Some("Email format is invalid"));
    assert!(errors.contains("contract_end_date"));
    assert_eq!(server.backend.count("POST", "/api/customers/"), 0);
    assert_eq!(page.view(), ViewMode::Create);

    // Editing a field drops only that field's message.
    form.set_contact_email("i@initech.com");
    assert!(!form.errors().contains("contact_email"));
    assert!(form.errors().contains("contract_end_date"));
}

#[tokio::test]
async fn test_rejected_create_keeps_form_open() {
    let server = spawn().await;
    server.backend.seed_customer("C1", "Acme", "online");
    let operator = ScriptedInteraction::new();
    let page = CustomersPage::new(signed_in(&server, operator.clone()).await);

    let mut form = page.open_create().unwrap();
    form.set_customer_id("C1");
    form.set_name("Acme again");
    form.set_contact_email("b@acme.com");
    let err = page.submit(&mut form).await.unwrap_err();

    assert!(matches!(err, ConsoleError::Api(_)));
    assert_eq!(operator.alerts(), vec!["Failed to create customer".to_string()]);
    assert_eq!(page.view(), ViewMode::Create);
}

#[tokio::test]
async fn test_edit_from_detail_updates_customer() {
    let server = spawn().await;
    let id = server.backend.seed_customer("C3", "Umbrella", "offline");
    let page = CustomersPage::new(signed_in(&server, ScriptedInteraction::new()).await);

    page.open_detail(id).await.unwrap();
    let mut form = page.edit_selected().unwrap();
    assert!(form.is_editing());
    form.set_name("Umbrella Corp");
    let saved = page.submit(&mut form).await.unwrap();

    assert_eq!(saved.name, "Umbrella Corp");
    assert_eq!(server.backend.count("PUT", &format!("/api/customers/{}/", id)), 1);
    assert_eq!(page.view(), ViewMode::List);
}

#[tokio::test]
async fn test_filters_are_sent_as_query() {
    let server = spawn().await;
    server.backend.seed_customer("C1", "Acme", "online");
    server.backend.seed_customer("C2", "Globex", "offline");
    let page = CustomersPage::new(signed_in(&server, ScriptedInteraction::new()).await);

    page.filter_deployment_type(Some(DeploymentType::Offline)).await.unwrap();
    assert_eq!(page.customers().len(), 1);
    assert_eq!(page.customers()[0].name, "Globex");

    let last = server.backend.requests().pop().unwrap();
    assert_eq!(last.query.as_deref(), Some("deployment_type=offline"));

    // Same filter again does not re-fetch.
    let before = server.backend.count("GET", "/api/customers/");
    page.filter_deployment_type(Some(DeploymentType::Offline)).await.unwrap();
    assert_eq!(server.backend.count("GET", "/api/customers/"), before);
}

#[tokio::test]
async fn test_quick_license_rejects_bad_day_count() {
    let server = spawn().await;
    let id = server.backend.seed_customer("C4", "Hooli", "offline");
    let operator = ScriptedInteraction::new();
    let page = CustomersPage::new(signed_in(&server, operator.clone()).await);
    page.open_detail(id).await.unwrap();

    for input in ["abc", "0", "-5", "100000000"] {
        operator.answer_prompt(Some(input));
        let err = page.generate_license().await.unwrap_err();
        assert!(matches!(err, ConsoleError::InvalidInput(_)), "{input}");
    }
    assert_eq!(server.backend.count("POST", "/api/licenses/"), 0);
    assert_eq!(server.backend.license_count(), 0);
}

#[tokio::test]
async fn test_quick_license_for_offline_customer() {
    let server = spawn().await;
    let id = server.backend.seed_customer("C5", "Pied Piper", "offline");
    let operator = ScriptedInteraction::new();
    let page = CustomersPage::new(signed_in(&server, operator.clone()).await);
    page.open_detail(id).await.unwrap();

    operator.answer_prompt(Some("30"));
    let license = page.generate_license().await.unwrap();

    assert_eq!(license.license_type, LicenseType::Standard);
    assert_eq!((license.max_users, license.max_companies, license.max_storage_gb), (50, 3, 100));
    assert_eq!(
        (license.valid_until - license.valid_from).num_days(),
        30
    );
    assert!(license.modules_enabled.contains("inventory"));
    assert_eq!(operator.alerts(), vec!["License generated".to_string()]);
}

#[tokio::test]
async fn test_quick_license_refused_for_online_customer() {
    let server = spawn().await;
    let id = server.backend.seed_customer("C6", "Acme", "online");
    let operator = ScriptedInteraction::new();
    let page = CustomersPage::new(signed_in(&server, operator.clone()).await);
    page.open_detail(id).await.unwrap();

    let err = page.generate_license().await.unwrap_err();

    assert!(matches!(err, ConsoleError::InvalidInput(_)));
    assert!(operator.asked().is_empty());
    assert_eq!(server.backend.count("POST", "/api/licenses/"), 0);
}

#[tokio::test]
async fn test_unmounted_page_ignores_late_list() {
    let server = spawn().await;
    server.backend.seed_customer("C7", "Soylent", "online");
    let page = CustomersPage::new(signed_in(&server, ScriptedInteraction::new()).await);

    page.unmount();
    page.load().await.unwrap();

    assert!(page.customers().is_empty());
}
