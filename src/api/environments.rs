// Environment endpoints

use crate::api_models::{EnvironmentPayload, EnvironmentQuery, HealthCheckResult, Paginated};
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::{Environment, Stats};

pub async fn list(
    client: &ApiClient,
    query: &EnvironmentQuery,
) -> Result<Paginated<Environment>, ApiError> {
    client.get("/environments/", query).await
}

pub async fn get(client: &ApiClient, id: i64) -> Result<Environment, ApiError> {
    client.get_one(&format!("/environments/{}/", id)).await
}

pub async fn create(client: &ApiClient, payload: &EnvironmentPayload) -> Result<Environment, ApiError> {
    client.post("/environments/", payload).await
}

pub async fn update(
    client: &ApiClient,
    id: i64,
    payload: &EnvironmentPayload,
) -> Result<Environment, ApiError> {
    client.put(&format!("/environments/{}/", id), payload).await
}

pub async fn delete(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    client.delete(&format!("/environments/{}/", id)).await
}

pub async fn start(client: &ApiClient, id: i64) -> Result<Environment, ApiError> {
    client.post_empty(&format!("/environments/{}/start/", id)).await
}

pub async fn stop(client: &ApiClient, id: i64) -> Result<Environment, ApiError> {
    client.post_empty(&format!("/environments/{}/stop/", id)).await
}

pub async fn health_check(client: &ApiClient, id: i64) -> Result<HealthCheckResult, ApiError> {
    client.post_empty(&format!("/environments/{}/health_check/", id)).await
}

pub async fn stats(client: &ApiClient) -> Result<Stats, ApiError> {
    client.get_one("/environments/stats/").await
}
