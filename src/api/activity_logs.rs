// Activity log endpoints (read-only)

use crate::api_models::{ActivityLogQuery, Paginated};
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::ActivityLog;

pub async fn list(
    client: &ApiClient,
    query: &ActivityLogQuery,
) -> Result<Paginated<ActivityLog>, ApiError> {
    client.get("/user-activity-logs/", query).await
}

pub async fn get(client: &ApiClient, id: i64) -> Result<ActivityLog, ApiError> {
    client.get_one(&format!("/user-activity-logs/{}/", id)).await
}
