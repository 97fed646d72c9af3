use serde::{Serialize, Deserialize, Deserializer};
use serde_json::{Map, Value};
use serde_with::{serde_as, NoneAsEmptyString, PickFirst};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// A catalog or custom product record.
///
/// Catalog records arrive from the content backend; custom records are typed
/// in by the user and may carry a price as a string. Unknown fields (for
/// example the ones a completion adds) are preserved in `extra`.
#[serde_as]
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde_as(as = "PickFirst<(_, NoneAsEmptyString)>")]
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub basic_description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() { "Untitled product" } else { &self.name }
    }
}

/// List-valued product fields that the custom form edits as comma-separated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListField { Features, Materials, Colors, Tags }

impl ListField {
    pub fn slot<'a>(&self, product: &'a mut Product) -> &'a mut Vec<String> {
        match self {
            ListField::Features => &mut product.features,
            ListField::Materials => &mut product.materials,
            ListField::Colors => &mut product.colors,
            ListField::Tags => &mut product.tags,
        }
    }
}

/// Splits comma-separated user input into trimmed entries. Empty input yields no entries.
pub fn parse_list(input: &str) -> Vec<String> {
    if input.is_empty() {
        return Vec::new();
    }
    input.split(',').map(|s| s.trim().to_string()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    ProductDescription,
    Seo,
    MarketingEmail,
    SocialMedia,
    MissingFields,
    ProductImage,
}

impl ContentType {
    pub const ALL: [ContentType; 6] = [
        ContentType::ProductDescription,
        ContentType::Seo,
        ContentType::MarketingEmail,
        ContentType::SocialMedia,
        ContentType::MissingFields,
        ContentType::ProductImage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::ProductDescription => "product_description",
            ContentType::Seo => "seo",
            ContentType::MarketingEmail => "marketing_email",
            ContentType::SocialMedia => "social_media",
            ContentType::MissingFields => "missing_fields",
            ContentType::ProductImage => "product_image",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContentType::ProductDescription => "Product Description",
            ContentType::Seo => "SEO Content",
            ContentType::MarketingEmail => "Marketing Email",
            ContentType::SocialMedia => "Social Media",
            ContentType::MissingFields => "Missing Fields",
            ContentType::ProductImage => "Product Image",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown content type: {s}"))
    }
}

// --- Style configuration ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone { #[default] Professional, Casual, Enthusiastic, Technical, Friendly, Luxury }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Length { Short, #[default] Medium, Long }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience { #[default] General, Technical, Beginners, Experts, Business, Youth }

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub length: Length,
    #[serde(default)]
    pub audience: Audience,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform { Instagram, Facebook, Twitter, Linkedin }

/// Which social networks a `social_media` request should produce posts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialPlatforms {
    pub instagram: bool,
    pub facebook: bool,
    pub twitter: bool,
    pub linkedin: bool,
}

impl Default for SocialPlatforms {
    fn default() -> Self { Self { instagram: true, facebook: true, twitter: true, linkedin: false } }
}

impl SocialPlatforms {
    pub fn set(&mut self, platform: Platform, include: bool) {
        match platform {
            Platform::Instagram => self.instagram = include,
            Platform::Facebook => self.facebook = include,
            Platform::Twitter => self.twitter = include,
            Platform::Linkedin => self.linkedin = include,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background { #[default] White, Studio, Gradient, Contextual, Outdoor, Minimalist }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lighting { #[default] Studio, Natural, Dramatic, Soft, Bright }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Angle {
    #[default]
    Front,
    Side,
    TopDown,
    ThreeQuarter,
    #[serde(rename = "45-degree")]
    FortyFiveDegree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageStyle {
    #[serde(default)]
    pub background: Background,
    #[serde(default)]
    pub lighting: Lighting,
    #[serde(default)]
    pub angle: Angle,
}

// --- Generated content ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptionContent { pub detailed_description: String }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoContent { pub title: String, pub description: String }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailContent { pub subject: String, pub body: String }

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SocialPosts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageResult { pub image_url: String, pub prompt: String }

/// The result payload of one content type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContentPayload {
    Description(DescriptionContent),
    Seo(SeoContent),
    MarketingEmail(EmailContent),
    SocialMedia(SocialPosts),
    MissingFields(Map<String, Value>),
    ProductImage(ImageResult),
    /// Backend payload whose shape did not match its content type; kept verbatim.
    Unrecognized(Value),
}

impl ContentPayload {
    pub fn from_json(kind: ContentType, value: Value) -> Self {
        let parsed = match kind {
            ContentType::ProductDescription => serde_json::from_value(value.clone()).map(Self::Description),
            ContentType::Seo => serde_json::from_value(value.clone()).map(Self::Seo),
            ContentType::MarketingEmail => serde_json::from_value(value.clone()).map(Self::MarketingEmail),
            ContentType::SocialMedia => serde_json::from_value(value.clone()).map(Self::SocialMedia),
            ContentType::MissingFields => serde_json::from_value(value.clone()).map(Self::MissingFields),
            ContentType::ProductImage => serde_json::from_value(value.clone()).map(Self::ProductImage),
        };
        parsed.unwrap_or_else(|e| {
            warn!("⚠️ Payload for '{}' has an unexpected shape: {}", kind, e);
            Self::Unrecognized(value)
        })
    }
}

/// Content generated during one action, keyed by content type.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ContentBag(BTreeMap<ContentType, ContentPayload>);

impl ContentBag {
    pub fn new() -> Self { Self::default() }

    /// Bag holding a completed product as its only `missing_fields` entry.
    pub fn completed(product: &Product) -> Self {
        let fields = match serde_json::to_value(product) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        let mut bag = Self::new();
        bag.insert(ContentType::MissingFields, ContentPayload::MissingFields(fields));
        bag
    }

    pub fn insert(&mut self, kind: ContentType, payload: ContentPayload) -> Option<ContentPayload> {
        self.0.insert(kind, payload)
    }

    /// Key-wise union with `partial`; on collision the value from `partial` wins.
    pub fn merge(&mut self, partial: ContentBag) {
        self.0.extend(partial.0);
    }

    pub fn get(&self, kind: ContentType) -> Option<&ContentPayload> { self.0.get(&kind) }

    pub fn contains(&self, kind: ContentType) -> bool { self.0.contains_key(&kind) }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn keys(&self) -> impl Iterator<Item = ContentType> + '_ { self.0.keys().copied() }

    pub fn iter(&self) -> impl Iterator<Item = (ContentType, &ContentPayload)> { self.0.iter().map(|(k, v)| (*k, v)) }
}

impl<'de> Deserialize<'de> for ContentBag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        let mut bag = ContentBag::new();
        for (key, value) in raw {
            match key.parse::<ContentType>() {
                Ok(kind) => { bag.insert(kind, ContentPayload::from_json(kind, value)); }
                Err(e) => warn!("⚠️ Skipping generated content entry: {}", e),
            }
        }
        Ok(bag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn price_accepts_numbers_strings_and_blanks() {
        let catalog: Product = serde_json::from_value(json!({"id": "prod001", "name": "Shoe", "price": 89.99})).unwrap();
        assert_eq!(catalog.price, Some(89.99));

        let typed: Product = serde_json::from_value(json!({"name": "Shoe", "price": "12.50"})).unwrap();
        assert_eq!(typed.price, Some(12.5));

        let blank: Product = serde_json::from_value(json!({"name": "Shoe", "price": ""})).unwrap();
        assert_eq!(blank.price, None);

        let missing: Product = serde_json::from_value(json!({"name": "Shoe"})).unwrap();
        assert_eq!(missing.price, None);
        assert_eq!(serde_json::to_value(&typed).unwrap()["price"], json!(12.5));
    }

    #[test]
    fn product_keeps_unknown_fields() {
        let value = json!({
            "name": "Lamp",
            "seo_title": "Best Lamp",
            "marketing_copy": {"email": {"subject": "s", "body": "b"}}
        });
        let product: Product = serde_json::from_value(value).unwrap();
        assert_eq!(product.extra["seo_title"], json!("Best Lamp"));
        let back = serde_json::to_value(&product).unwrap();
        assert_eq!(back["marketing_copy"]["email"]["subject"], json!("s"));
        assert!(back.get("id").is_none());
    }

    #[test]
    fn parse_list_trims_entries() {
        assert_eq!(parse_list("quality, innovative ,affordable"), vec!["quality", "innovative", "affordable"]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn enumerations_use_wire_names() {
        assert_eq!(serde_json::to_value(ContentType::MarketingEmail).unwrap(), json!("marketing_email"));
        assert_eq!(serde_json::to_value(Angle::TopDown).unwrap(), json!("top-down"));
        assert_eq!(serde_json::to_value(Angle::FortyFiveDegree).unwrap(), json!("45-degree"));
        assert_eq!("product_image".parse::<ContentType>().unwrap(), ContentType::ProductImage);
        assert!("banner".parse::<ContentType>().is_err());
        let style = serde_json::to_value(StyleConfig::default()).unwrap();
        assert_eq!(style, json!({"tone": "professional", "length": "medium", "audience": "general", "keywords": []}));
    }

    #[test]
    fn bag_decodes_typed_payloads_and_skips_unknown_keys() {
        let bag: ContentBag = serde_json::from_value(json!({
            "product_description": {"detailed_description": "d"},
            "seo": {"title": "t"},
            "banner": {"text": "x"}
        }))
        .unwrap();
        assert_eq!(bag.len(), 2);
        assert_eq!(
            bag.get(ContentType::ProductDescription),
            Some(&ContentPayload::Description(DescriptionContent { detailed_description: "d".into() }))
        );
        assert_eq!(bag.get(ContentType::Seo), Some(&ContentPayload::Unrecognized(json!({"title": "t"}))));
    }

    #[test]
    fn merge_is_union_with_newest_value_winning() {
        let image = ContentPayload::ProductImage(ImageResult { image_url: "http://x/1.png".into(), prompt: "p".into() });
        let old = ContentPayload::Description(DescriptionContent { detailed_description: "old".into() });
        let new = ContentPayload::Description(DescriptionContent { detailed_description: "new".into() });

        let mut bag = ContentBag::new();
        bag.insert(ContentType::ProductImage, image.clone());
        bag.insert(ContentType::ProductDescription, old);

        let mut partial = ContentBag::new();
        partial.insert(ContentType::ProductDescription, new.clone());
        bag.merge(partial);

        assert_eq!(bag.len(), 2);
        assert_eq!(bag.get(ContentType::ProductImage), Some(&image));
        assert_eq!(bag.get(ContentType::ProductDescription), Some(&new));
    }

    #[test]
    fn completed_bag_has_single_missing_fields_entry() {
        let product = Product { name: "Desk".into(), category: "Furniture".into(), ..Product::default() };
        let bag = ContentBag::completed(&product);
        assert_eq!(bag.keys().collect::<Vec<_>>(), vec![ContentType::MissingFields]);
        match bag.get(ContentType::MissingFields) {
            Some(ContentPayload::MissingFields(fields)) => assert_eq!(fields["category"], json!("Furniture")),
            other => panic!("unexpected payload: {other:?}"),
        }
    }
}
