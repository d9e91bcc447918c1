// Customer endpoints

use crate::api_models::{CustomerPayload, CustomerQuery, Paginated};
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::{Customer, Stats};

pub async fn list(client: &ApiClient, query: &CustomerQuery) -> Result<Paginated<Customer>, ApiError> {
    client.get("/customers/", query).await
}

pub async fn get(client: &ApiClient, id: i64) -> Result<Customer, ApiError> {
    client.get_one(&format!("/customers/{}/", id)).await
}

pub async fn create(client: &ApiClient, payload: &CustomerPayload) -> Result<Customer, ApiError> {
    client.post("/customers/", payload).await
}

pub async fn update(client: &ApiClient, id: i64, payload: &CustomerPayload) -> Result<Customer, ApiError> {
    client.put(&format!("/customers/{}/", id), payload).await
}

pub async fn delete(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    client.delete(&format!("/customers/{}/", id)).await
}

pub async fn stats(client: &ApiClient) -> Result<Stats, ApiError> {
    client.get_one("/customers/stats/").await
}
