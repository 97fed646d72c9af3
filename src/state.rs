//! Per-session selection and style state.
//!
//! A [`Session`] is an immutable snapshot; every user interaction and every
//! finished backend action is a [`SessionEvent`] folded in by [`reduce`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::models::{parse_list, ContentBag, ContentType, ImageStyle, ListField, Platform, Product, SocialPlatforms, StyleConfig};
use crate::presentation::Rating;

/// The product the next action will be run against.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", content = "product", rename_all = "snake_case")]
pub enum ProductSource {
    Catalog(Product),
    Custom(Product),
}

impl Default for ProductSource {
    fn default() -> Self { ProductSource::Custom(Product::default()) }
}

impl ProductSource {
    pub fn product(&self) -> &Product {
        match self {
            ProductSource::Catalog(p) | ProductSource::Custom(p) => p,
        }
    }

    pub fn is_custom(&self) -> bool { matches!(self, ProductSource::Custom(_)) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind { LoadCatalog, Generate, Complete }

/// A failed action, kept on the session until the next action starts or it is dismissed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionError {
    pub action: ActionKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub catalog: Vec<Product>,
    pub product: ProductSource,
    pub content_types: Vec<ContentType>,
    pub style: StyleConfig,
    pub social_platforms: SocialPlatforms,
    pub image_style: ImageStyle,
    pub content: ContentBag,
    pub is_generating: bool,
    pub active_tab: ContentType,
    pub ratings: BTreeMap<ContentType, Rating>,
    pub last_error: Option<ActionError>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            catalog: Vec::new(),
            product: ProductSource::default(),
            content_types: vec![ContentType::ProductDescription],
            style: StyleConfig::default(),
            social_platforms: SocialPlatforms::default(),
            image_style: ImageStyle::default(),
            content: ContentBag::new(),
            is_generating: false,
            active_tab: ContentType::ProductDescription,
            ratings: BTreeMap::new(),
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when a catalog product is chosen or the custom product has a name.
    pub fn can_submit(&self) -> bool {
        match &self.product {
            ProductSource::Catalog(_) => true,
            ProductSource::Custom(p) => !p.name.trim().is_empty(),
        }
    }

    pub fn find_catalog_product(&self, id: &str) -> Option<&Product> {
        self.catalog.iter().find(|p| p.id.as_deref() == Some(id))
    }

    fn ensure_tab_selected(&mut self) {
        if !self.content_types.contains(&self.active_tab) {
            self.active_tab = self.content_types.first().copied().unwrap_or(ContentType::ProductDescription);
        }
    }

    fn fail(&mut self, action: ActionKind, message: String) {
        self.last_error = Some(ActionError { action, message, at: Utc::now() });
    }
}

impl Default for Session {
    fn default() -> Self { Self::new() }
}

/// Everything that can change a session. Variants marked `skip_deserializing`
/// are produced by the service itself and cannot be posted by clients.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    #[serde(skip_deserializing)]
    CatalogLoaded { products: Vec<Product> },
    #[serde(skip_deserializing)]
    CatalogLoadFailed { message: String },
    #[serde(skip_deserializing)]
    SelectCatalogProduct { product: Product },
    StartCustomProduct,
    EditCustomProduct { product: Product },
    SetCustomListField { field: ListField, value: String },
    SetContentTypes { content_types: Vec<ContentType> },
    ToggleContentType { content_type: ContentType, selected: bool },
    SetStyle { style: StyleConfig },
    SetKeywords { keywords: String },
    SetSocialPlatform { platform: Platform, include: bool },
    SetImageStyle { image_style: ImageStyle },
    SelectTab { tab: ContentType },
    Rate { tab: ContentType, rating: Rating },
    #[serde(skip_deserializing)]
    ActionStarted { action: ActionKind },
    #[serde(skip_deserializing)]
    GenerationFinished { bag: ContentBag, error: Option<String> },
    #[serde(skip_deserializing)]
    /// `started_on_custom` records which source the completion was requested for.
    CompletionFinished { result: Result<Product, String>, started_on_custom: bool },
    DismissError,
}

/// Produces the next snapshot from `session` and `event`.
pub fn reduce(mut session: Session, event: SessionEvent) -> Session {
    match event {
        SessionEvent::CatalogLoaded { products } => {
            session.catalog = products;
        }
        SessionEvent::CatalogLoadFailed { message } => {
            session.fail(ActionKind::LoadCatalog, message);
        }
        SessionEvent::SelectCatalogProduct { product } => {
            session.product = ProductSource::Catalog(product);
        }
        SessionEvent::StartCustomProduct => {
            session.product = ProductSource::Custom(Product::default());
        }
        SessionEvent::EditCustomProduct { product } => {
            session.product = ProductSource::Custom(product);
        }
        SessionEvent::SetCustomListField { field, value } => {
            // Editing a field starts from the current custom draft, or a blank one.
            let mut draft = match session.product {
                ProductSource::Custom(p) => p,
                ProductSource::Catalog(_) => Product::default(),
            };
            *field.slot(&mut draft) = parse_list(&value);
            session.product = ProductSource::Custom(draft);
        }
        SessionEvent::SetContentTypes { content_types } => {
            let mut deduped = Vec::with_capacity(content_types.len());
            for t in content_types {
                if !deduped.contains(&t) {
                    deduped.push(t);
                }
            }
            session.content_types = deduped;
            session.ensure_tab_selected();
        }
        SessionEvent::ToggleContentType { content_type, selected } => {
            if selected {
                if !session.content_types.contains(&content_type) {
                    session.content_types.push(content_type);
                }
            } else {
                session.content_types.retain(|t| *t != content_type);
            }
            session.ensure_tab_selected();
        }
        SessionEvent::SetStyle { style } => {
            session.style = style;
        }
        SessionEvent::SetKeywords { keywords } => {
            session.style.keywords = parse_list(&keywords);
        }
        SessionEvent::SetSocialPlatform { platform, include } => {
            session.social_platforms.set(platform, include);
        }
        SessionEvent::SetImageStyle { image_style } => {
            session.image_style = image_style;
        }
        SessionEvent::SelectTab { tab } => {
            session.active_tab = tab;
        }
        SessionEvent::Rate { tab, rating } => {
            session.ratings.insert(tab, rating);
        }
        SessionEvent::ActionStarted { action } => {
            if action != ActionKind::LoadCatalog {
                session.is_generating = true;
            }
            session.last_error = None;
        }
        SessionEvent::GenerationFinished { bag, error } => {
            session.is_generating = false;
            // A failed action with nothing to show leaves the previous results in place.
            if error.is_none() || !bag.is_empty() {
                session.content = bag;
            }
            if let Some(message) = error {
                session.fail(ActionKind::Generate, message);
            }
        }
        SessionEvent::CompletionFinished { result, started_on_custom } => {
            session.is_generating = false;
            match result {
                Ok(completed) => {
                    session.content = ContentBag::completed(&completed);
                    // A catalog completion never lands in a custom draft picked up meanwhile.
                    if started_on_custom && session.product.is_custom() {
                        session.product = ProductSource::Custom(completed);
                    }
                }
                Err(message) => session.fail(ActionKind::Complete, message),
            }
        }
        SessionEvent::DismissError => {
            session.last_error = None;
        }
    }
    session.updated_at = Utc::now();
    session
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentPayload, DescriptionContent, ImageResult};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn catalog_product() -> Product {
        Product { id: Some("prod001".into()), name: "Trail Shoe".into(), brand: "SportsFlex".into(), ..Product::default() }
    }

    fn image_bag() -> ContentBag {
        let mut bag = ContentBag::new();
        bag.insert(
            ContentType::ProductImage,
            ContentPayload::ProductImage(ImageResult { image_url: "http://x/1.png".into(), prompt: "p".into() }),
        );
        bag
    }

    #[test]
    fn selecting_catalog_product_discards_custom_edits() {
        let mut session = Session::new();
        session = reduce(session, SessionEvent::EditCustomProduct {
            product: Product { name: "Draft".into(), ..Product::default() },
        });
        session = reduce(session, SessionEvent::SelectCatalogProduct { product: catalog_product() });
        assert_eq!(session.product, ProductSource::Catalog(catalog_product()));

        session = reduce(session, SessionEvent::StartCustomProduct);
        assert_eq!(session.product, ProductSource::Custom(Product::default()));
    }

    #[test]
    fn editing_custom_product_deselects_catalog() {
        let mut session = reduce(Session::new(), SessionEvent::SelectCatalogProduct { product: catalog_product() });
        session = reduce(session, SessionEvent::SetCustomListField { field: ListField::Colors, value: "Black/Red, Blue".into() });
        match &session.product {
            ProductSource::Custom(p) => {
                assert_eq!(p.colors, vec!["Black/Red", "Blue"]);
                assert!(p.name.is_empty());
            }
            other => panic!("expected custom product, got {other:?}"),
        }
    }

    #[test]
    fn submit_requires_catalog_or_named_custom_product() {
        let session = Session::new();
        assert!(!session.can_submit());
        let named = reduce(session, SessionEvent::EditCustomProduct {
            product: Product { name: "Lamp".into(), ..Product::default() },
        });
        assert!(named.can_submit());
        let catalog = reduce(named, SessionEvent::SelectCatalogProduct { product: catalog_product() });
        assert!(catalog.can_submit());
    }

    #[test]
    fn content_type_selection_keeps_order_and_valid_tab() {
        let mut session = Session::new();
        session = reduce(session, SessionEvent::ToggleContentType { content_type: ContentType::Seo, selected: true });
        session = reduce(session, SessionEvent::ToggleContentType { content_type: ContentType::Seo, selected: true });
        assert_eq!(session.content_types, vec![ContentType::ProductDescription, ContentType::Seo]);

        session = reduce(session, SessionEvent::ToggleContentType {
            content_type: ContentType::ProductDescription,
            selected: false,
        });
        assert_eq!(session.active_tab, ContentType::Seo);

        session = reduce(session, SessionEvent::SetContentTypes {
            content_types: vec![ContentType::ProductImage, ContentType::Seo, ContentType::ProductImage],
        });
        assert_eq!(session.content_types, vec![ContentType::ProductImage, ContentType::Seo]);
        assert_eq!(session.active_tab, ContentType::Seo);
    }

    #[test]
    fn keywords_and_platforms_update_style() {
        let mut session = reduce(Session::new(), SessionEvent::SetKeywords { keywords: "quality, affordable".into() });
        session = reduce(session, SessionEvent::SetSocialPlatform { platform: Platform::Linkedin, include: true });
        assert_eq!(session.style.keywords, vec!["quality", "affordable"]);
        assert!(session.social_platforms.linkedin);
    }

    #[test]
    fn failed_generation_keeps_partial_results_and_records_error() {
        let mut session = reduce(Session::new(), SessionEvent::ActionStarted { action: ActionKind::Generate });
        assert!(session.is_generating);
        session = reduce(session, SessionEvent::GenerationFinished { bag: image_bag(), error: Some("HTTP error 500".into()) });
        assert!(!session.is_generating);
        assert_eq!(session.content, image_bag());
        assert_eq!(session.last_error.as_ref().map(|e| e.action), Some(ActionKind::Generate));

        let empty_failure = reduce(session, SessionEvent::GenerationFinished { bag: ContentBag::new(), error: Some("down".into()) });
        assert_eq!(empty_failure.content, image_bag());
    }

    #[test]
    fn completion_replaces_bag_and_custom_product() {
        let mut session = reduce(Session::new(), SessionEvent::EditCustomProduct {
            product: Product { name: "Desk".into(), ..Product::default() },
        });
        let mut prior = image_bag();
        prior.insert(
            ContentType::ProductDescription,
            ContentPayload::Description(DescriptionContent { detailed_description: "d".into() }),
        );
        session = reduce(session, SessionEvent::GenerationFinished { bag: prior, error: None });

        let completed = Product { name: "Desk".into(), category: "Furniture".into(), ..Product::default() };
        session = reduce(session, SessionEvent::CompletionFinished { result: Ok(completed.clone()), started_on_custom: true });
        assert_eq!(session.product, ProductSource::Custom(completed.clone()));
        assert_eq!(session.content, ContentBag::completed(&completed));
    }

    #[test]
    fn completion_leaves_catalog_selection_untouched() {
        let mut session = reduce(Session::new(), SessionEvent::SelectCatalogProduct { product: catalog_product() });
        let completed = Product { tags: vec!["running".into()], ..catalog_product() };
        session = reduce(session, SessionEvent::CompletionFinished { result: Ok(completed), started_on_custom: false });
        assert_eq!(session.product, ProductSource::Catalog(catalog_product()));
        assert_eq!(session.content.keys().collect::<Vec<_>>(), vec![ContentType::MissingFields]);
    }

    #[test]
    fn catalog_completion_does_not_overwrite_later_custom_draft() {
        let mut session = reduce(Session::new(), SessionEvent::SelectCatalogProduct { product: catalog_product() });
        session = reduce(session, SessionEvent::ActionStarted { action: ActionKind::Complete });
        let draft = Product { name: "My Lamp".into(), ..Product::default() };
        session = reduce(session, SessionEvent::EditCustomProduct { product: draft.clone() });

        let completed = Product { category: "Footwear".into(), ..catalog_product() };
        session = reduce(session, SessionEvent::CompletionFinished { result: Ok(completed.clone()), started_on_custom: false });
        assert_eq!(session.product, ProductSource::Custom(draft));
        assert_eq!(session.content, ContentBag::completed(&completed));
        assert!(!session.is_generating);
    }

    #[test]
    fn client_events_deserialize_but_internal_ones_do_not() {
        let event: SessionEvent = serde_json::from_value(json!({"type": "toggle_content_type", "content_type": "seo", "selected": true})).unwrap();
        assert!(matches!(event, SessionEvent::ToggleContentType { content_type: ContentType::Seo, selected: true }));
        let forged = serde_json::from_value::<SessionEvent>(json!({"type": "generation_finished", "bag": {}, "error": null}));
        assert!(forged.is_err());
    }
}
