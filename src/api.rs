use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::models::{ContentBag, ContentType, ImageResult, ImageStyle, Product, SocialPlatforms, StyleConfig};

/// `NetworkFailure` is a transport-level failure; `RequestFailed` is a non-2xx answer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    #[error("Network failure: {0}")]
    NetworkFailure(String),
    #[error("{message}")]
    RequestFailed { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::RequestFailed { status: 404, .. })
    }
}

/// The content backend: catalog lookups plus the three generation endpoints.
#[async_trait]
pub trait ContentApi: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError>;

    async fn get_product(&self, id: &str) -> Result<Product, ApiError>;

    /// Generates every requested content type in one round trip.
    async fn generate_content(
        &self,
        product: &Product,
        content_types: &[ContentType],
        style: &StyleConfig,
        social: Option<&SocialPlatforms>,
    ) -> Result<ContentBag, ApiError>;

    async fn complete_product(&self, product: &Product) -> Result<Product, ApiError>;

    async fn generate_image(&self, product: &Product, style: &ImageStyle) -> Result<ImageResult, ApiError>;
}

// --- Wire envelopes ---

#[derive(Serialize)]
struct GenerateContentBody<'a> {
    product_data: &'a Product,
    content_types: &'a [ContentType],
    style: &'a StyleConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    social_media: Option<&'a SocialPlatforms>,
}

#[derive(Serialize)]
struct ProductBody<'a> { product_data: &'a Product }

#[derive(Serialize)]
struct GenerateImageBody<'a> { product_data: &'a Product, style: &'a ImageStyle }

#[derive(Deserialize)]
struct GeneratedEnvelope { generated_content: ContentBag }

#[derive(Deserialize)]
struct CompletedEnvelope { completed_product: Product }

#[derive(Deserialize)]
struct ImageEnvelope { image_result: ImageResult }

/// Pulls the `detail` string out of an error body, if there is one.
pub fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("detail")?.as_str().map(str::to_string)
}

/// reqwest-backed client for the content backend REST API.
pub struct HttpContentApi {
    client: Client,
    base_url: String,
}

impl HttpContentApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client: Client::new(), base_url }
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, endpoint: &str) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::NetworkFailure(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::NetworkFailure(e.to_string()))?;
        info!("📥 {} responded with {}", endpoint, status);

        if !status.is_success() {
            let message = error_detail(&body).unwrap_or_else(|| format!("HTTP error {}", status.as_u16()));
            error!("❌ {} failed: {}", endpoint, message);
            return Err(ApiError::RequestFailed { status: status.as_u16(), message });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse(format!("{endpoint}: {e}")))
    }
}

#[async_trait]
impl ContentApi for HttpContentApi {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let url = format!("{}/products", self.base_url);
        self.send(self.client.get(&url), "GET /products").await
    }

    async fn get_product(&self, id: &str) -> Result<Product, ApiError> {
        let url = format!("{}/products/{}", self.base_url, id);
        self.send(self.client.get(&url), "GET /products/{id}").await
    }

    async fn generate_content(
        &self,
        product: &Product,
        content_types: &[ContentType],
        style: &StyleConfig,
        social: Option<&SocialPlatforms>,
    ) -> Result<ContentBag, ApiError> {
        let url = format!("{}/generate-content", self.base_url);
        let body = GenerateContentBody { product_data: product, content_types, style, social_media: social };
        let envelope: GeneratedEnvelope = self.send(self.client.post(&url).json(&body), "POST /generate-content").await?;
        Ok(envelope.generated_content)
    }

    async fn complete_product(&self, product: &Product) -> Result<Product, ApiError> {
        let url = format!("{}/complete-product", self.base_url);
        let body = ProductBody { product_data: product };
        let envelope: CompletedEnvelope = self.send(self.client.post(&url).json(&body), "POST /complete-product").await?;
        Ok(envelope.completed_product)
    }

    async fn generate_image(&self, product: &Product, style: &ImageStyle) -> Result<ImageResult, ApiError> {
        let url = format!("{}/generate-image", self.base_url);
        let body = GenerateImageBody { product_data: product, style };
        let envelope: ImageEnvelope = self.send(self.client.post(&url).json(&body), "POST /generate-image").await?;
        Ok(envelope.image_result)
    }
}
