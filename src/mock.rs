//! Scripted in-memory [`ContentApi`] for tests and local demos.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::api::{ApiError, ContentApi};
use crate::models::{ContentBag, ContentType, ImageResult, ImageStyle, Product, SocialPlatforms, StyleConfig};

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    ListProducts,
    GetProduct(String),
    GenerateContent { content_types: Vec<ContentType>, social: Option<SocialPlatforms> },
    /// Name of the product sent for completion.
    CompleteProduct(String),
    GenerateImage(ImageStyle),
}

/// Answers each endpoint from a queue of scripted results and records every call.
#[derive(Default)]
pub struct ScriptedApi {
    catalog: Mutex<Vec<Product>>,
    catalog_error: Mutex<Option<ApiError>>,
    content: Mutex<VecDeque<Result<ContentBag, ApiError>>>,
    images: Mutex<VecDeque<Result<ImageResult, ApiError>>>,
    completions: Mutex<VecDeque<Result<Product, ApiError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

fn unscripted(endpoint: &str) -> ApiError {
    ApiError::RequestFailed { status: 500, message: format!("no scripted response for {endpoint}") }
}

impl ScriptedApi {
    pub fn new() -> Self { Self::with_catalog(Vec::new()) }

    pub fn with_catalog(products: Vec<Product>) -> Self {
        Self { catalog: Mutex::new(products), ..Self::default() }
    }

    pub fn fail_catalog(&self, error: ApiError) { *self.catalog_error.lock() = Some(error); }

    pub fn push_content(&self, result: Result<ContentBag, ApiError>) { self.content.lock().push_back(result); }

    pub fn push_image(&self, result: Result<ImageResult, ApiError>) { self.images.lock().push_back(result); }

    pub fn push_completion(&self, result: Result<Product, ApiError>) { self.completions.lock().push_back(result); }

    pub fn calls(&self) -> Vec<RecordedCall> { self.calls.lock().clone() }

    fn record(&self, call: RecordedCall) { self.calls.lock().push(call); }
}

#[async_trait]
impl ContentApi for ScriptedApi {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.record(RecordedCall::ListProducts);
        match self.catalog_error.lock().clone() {
            Some(e) => Err(e),
            None => Ok(self.catalog.lock().clone()),
        }
    }

    async fn get_product(&self, id: &str) -> Result<Product, ApiError> {
        self.record(RecordedCall::GetProduct(id.to_string()));
        self.catalog
            .lock()
            .iter()
            .find(|p| p.id.as_deref() == Some(id))
            .cloned()
            .ok_or_else(|| ApiError::RequestFailed { status: 404, message: "Product not found".into() })
    }

    async fn generate_content(
        &self,
        _product: &Product,
        content_types: &[ContentType],
        _style: &StyleConfig,
        social: Option<&SocialPlatforms>,
    ) -> Result<ContentBag, ApiError> {
        self.record(RecordedCall::GenerateContent { content_types: content_types.to_vec(), social: social.copied() });
        self.content.lock().pop_front().unwrap_or_else(|| Err(unscripted("generate-content")))
    }

    async fn complete_product(&self, product: &Product) -> Result<Product, ApiError> {
        self.record(RecordedCall::CompleteProduct(product.name.clone()));
        self.completions.lock().pop_front().unwrap_or_else(|| Err(unscripted("complete-product")))
    }

    async fn generate_image(&self, _product: &Product, style: &ImageStyle) -> Result<ImageResult, ApiError> {
        self.record(RecordedCall::GenerateImage(*style));
        self.images.lock().pop_front().unwrap_or_else(|| Err(unscripted("generate-image")))
    }
}
