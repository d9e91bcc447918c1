// License endpoints

use crate::api_models::{
    ActivateLicenseRequest, LicensePayload, LicenseQuery, LicenseRecordQuery, LicenseValidation,
    MessageResponse, Paginated, ValidateLicenseRequest,
};
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::{License, LicenseLog, LicenseUsage, Stats};

pub async fn list(client: &ApiClient, query: &LicenseQuery) -> Result<Paginated<License>, ApiError> {
    client.get("/licenses/", query).await
}

pub async fn get(client: &ApiClient, id: i64) -> Result<License, ApiError> {
    client.get_one(&format!("/licenses/{}/", id)).await
}

pub async fn create(client: &ApiClient, payload: &LicensePayload) -> Result<License, ApiError> {
    client.post("/licenses/", payload).await
}

pub async fn update(client: &ApiClient, id: i64, payload: &LicensePayload) -> Result<License, ApiError> {
    client.put(&format!("/licenses/{}/", id), payload).await
}

pub async fn delete(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    client.delete(&format!("/licenses/{}/", id)).await
}

pub async fn activate(
    client: &ApiClient,
    id: i64,
    request: &ActivateLicenseRequest,
) -> Result<MessageResponse, ApiError> {
    client.post(&format!("/licenses/{}/activate/", id), request).await
}

pub async fn revoke(client: &ApiClient, id: i64) -> Result<MessageResponse, ApiError> {
    client.post_empty(&format!("/licenses/{}/revoke/", id)).await
}

/// Check a key against the server. An unknown key comes back as a
/// rejection whose body still says `valid: false`; it is reported as such.
pub async fn validate(
    client: &ApiClient,
    request: &ValidateLicenseRequest,
) -> Result<LicenseValidation, ApiError> {
    match client.post("/licenses/validate_license/", request).await {
        Err(ApiError::Rejected { status: 404, message }) => Ok(LicenseValidation {
            valid: false,
            license_type: None,
            max_users: None,
            max_companies: None,
            max_storage_gb: None,
            modules_enabled: Default::default(),
            valid_until: None,
            days_remaining: None,
            error: message,
        }),
        other => other,
    }
}

pub async fn stats(client: &ApiClient) -> Result<Stats, ApiError> {
    client.get_one("/licenses/stats/").await
}

pub async fn usage(
    client: &ApiClient,
    query: &LicenseRecordQuery,
) -> Result<Paginated<LicenseUsage>, ApiError> {
    client.get("/license-usage/", query).await
}

pub async fn logs(
    client: &ApiClient,
    query: &LicenseRecordQuery,
) -> Result<Paginated<LicenseLog>, ApiError> {
    client.get("/license-logs/", query).await
}
