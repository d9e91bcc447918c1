// Authentication endpoints

use secrecy::{ExposeSecret, SecretString};

use crate::api_models::{LoginRequest, LoginResponse};
use crate::client::ApiClient;
use crate::error::ApiError;

pub async fn login(
    client: &ApiClient,
    username: &str,
    password: &SecretString,
) -> Result<LoginResponse, ApiError> {
    let body = LoginRequest {
        username,
        password: password.expose_secret(),
    };
    client.post("/login/", &body).await
}

pub async fn logout(client: &ApiClient) -> Result<(), ApiError> {
    client.post_empty::<serde_json::Value>("/logout/").await?;
    Ok(())
}
