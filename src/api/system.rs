// System endpoints: settings, maintenance and health

use serde_json::json;

use crate::api_models::{CleanLogsResponse, MessageResponse, SystemInfo, SystemSettingsPayload};
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::{Stats, SystemSettings};

pub async fn settings(client: &ApiClient) -> Result<SystemSettings, ApiError> {
    client.get_one("/system/settings/").await
}

pub async fn update_settings(
    client: &ApiClient,
    payload: &SystemSettingsPayload,
) -> Result<SystemSettings, ApiError> {
    client.put("/system/settings/update/", payload).await
}

pub async fn info(client: &ApiClient) -> Result<SystemInfo, ApiError> {
    client.get_one("/system/info/").await
}

pub async fn backup(client: &ApiClient) -> Result<MessageResponse, ApiError> {
    client.post_empty("/system/backup/").await
}

pub async fn clean_logs(client: &ApiClient, days: u32) -> Result<CleanLogsResponse, ApiError> {
    client.post("/system/clean-logs/", &json!({ "days": days })).await
}

pub async fn health(client: &ApiClient) -> Result<serde_json::Value, ApiError> {
    client.get_one("/health/").await
}

/// Customer, environment and license counters fetched concurrently.
pub async fn overall_stats(client: &ApiClient) -> Result<Stats, ApiError> {
    let (customers, environments, licenses) = futures::try_join!(
        crate::api::customers::stats(client),
        crate::api::environments::stats(client),
        crate::api::licenses::stats(client),
    )?;
    Ok(customers.merge(environments).merge(licenses))
}
