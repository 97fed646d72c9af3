use std::sync::Arc;
use tracing::{error, info};

use crate::api::{ApiError, ContentApi};
use crate::models::{ContentBag, ContentPayload, ContentType, ImageStyle, Product, SocialPlatforms, StyleConfig};
use crate::state::Session;

/// Inputs of one generation action, detached from the session so no lock is held while calls run.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub product: Product,
    pub content_types: Vec<ContentType>,
    pub style: StyleConfig,
    pub social: SocialPlatforms,
    pub image_style: ImageStyle,
}

impl GenerationRequest {
    pub fn from_session(session: &Session) -> Self {
        Self {
            product: session.product.product().clone(),
            content_types: session.content_types.clone(),
            style: session.style.clone(),
            social: session.social_platforms,
            image_style: session.image_style,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlannedCall {
    Image { style: ImageStyle },
    /// All text content types batched into one request.
    TextBatch { content_types: Vec<ContentType>, social: Option<SocialPlatforms> },
}

/// Ordered backend calls needed for a content-type selection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerationPlan {
    calls: Vec<PlannedCall>,
}

impl GenerationPlan {
    pub fn from_selection(content_types: &[ContentType], social: SocialPlatforms, image_style: ImageStyle) -> Self {
        let mut calls = Vec::new();
        if content_types.contains(&ContentType::ProductImage) {
            calls.push(PlannedCall::Image { style: image_style });
        }

        let mut text_types: Vec<ContentType> = Vec::new();
        for t in content_types {
            if *t != ContentType::ProductImage && !text_types.contains(t) {
                text_types.push(*t);
            }
        }
        if !text_types.is_empty() {
            let social = text_types.contains(&ContentType::SocialMedia).then_some(social);
            calls.push(PlannedCall::TextBatch { content_types: text_types, social });
        }
        Self { calls }
    }

    pub fn calls(&self) -> &[PlannedCall] { &self.calls }

    pub fn is_empty(&self) -> bool { self.calls.is_empty() }
}

/// What a generation action produced. `bag` holds every result merged before
/// the first failure, so a failed text batch still leaves the image in place.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub bag: ContentBag,
    pub error: Option<ApiError>,
    pub calls_made: usize,
}

pub struct Orchestrator {
    api: Arc<dyn ContentApi>,
}

impl Orchestrator {
    pub fn new(api: Arc<dyn ContentApi>) -> Self { Self { api } }

    pub fn api(&self) -> &Arc<dyn ContentApi> { &self.api }

    /// Runs the plan for `request` in order, image first, merging each result into a fresh bag.
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        let plan = GenerationPlan::from_selection(&request.content_types, request.social, request.image_style);
        info!("🚀 Generating {:?} for '{}' in {} call(s)", request.content_types, request.product.display_name(), plan.calls().len());

        let mut bag = ContentBag::new();
        let mut calls_made = 0;
        for call in plan.calls() {
            calls_made += 1;
            let partial = match self.execute(call, request).await {
                Ok(partial) => partial,
                Err(e) => {
                    error!("❌ Generation call {:?} failed: {}", call, e);
                    return GenerationOutcome { bag, error: Some(e), calls_made };
                }
            };
            bag.merge(partial);
        }

        info!("✅ Generation finished with {} content type(s)", bag.len());
        GenerationOutcome { bag, error: None, calls_made }
    }

    async fn execute(&self, call: &PlannedCall, request: &GenerationRequest) -> Result<ContentBag, ApiError> {
        match call {
            PlannedCall::Image { style } => {
                let image = self.api.generate_image(&request.product, style).await?;
                info!("🖼️ Image ready: {}", image.image_url);
                let mut partial = ContentBag::new();
                partial.insert(ContentType::ProductImage, ContentPayload::ProductImage(image));
                Ok(partial)
            }
            PlannedCall::TextBatch { content_types, social } => {
                self.api
                    .generate_content(&request.product, content_types, &request.style, social.as_ref())
                    .await
            }
        }
    }

    /// Asks the backend to fill in the product's missing fields.
    pub async fn complete(&self, product: &Product) -> Result<Product, ApiError> {
        info!("🧩 Completing product '{}'", product.display_name());
        let completed = self.api.complete_product(product).await;
        if let Err(e) = &completed {
            error!("❌ Product completion failed: {}", e);
        }
        completed
    }
}
