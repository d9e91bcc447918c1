// User endpoints

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use crate::api_models::{Paginated, ProfilePayload, UserPayload, UserQuery};
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::User;

pub async fn me(client: &ApiClient) -> Result<User, ApiError> {
    client.get_one("/users/me/").await
}

pub async fn list(client: &ApiClient, query: &UserQuery) -> Result<Paginated<User>, ApiError> {
    client.get("/users/", query).await
}

pub async fn get(client: &ApiClient, id: i64) -> Result<User, ApiError> {
    client.get_one(&format!("/users/{}/", id)).await
}

pub async fn create(client: &ApiClient, payload: &UserPayload) -> Result<User, ApiError> {
    client.post("/users/", payload).await
}

pub async fn update(client: &ApiClient, id: i64, payload: &UserPayload) -> Result<User, ApiError> {
    client.put(&format!("/users/{}/", id), payload).await
}

pub async fn delete(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    client.delete(&format!("/users/{}/", id)).await
}

pub async fn reset_password(client: &ApiClient, id: i64, password: &SecretString) -> Result<(), ApiError> {
    let body = json!({ "password": password.expose_secret() });
    client
        .post::<serde_json::Value, _>(&format!("/users/{}/reset_password/", id), &body)
        .await?;
    Ok(())
}

pub async fn update_profile(
    client: &ApiClient,
    id: i64,
    profile: &ProfilePayload,
) -> Result<serde_json::Value, ApiError> {
    client.post(&format!("/users/{}/update_profile/", id), profile).await
}
