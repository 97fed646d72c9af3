//! View models for the generated-content panel.
//!
//! Nothing here is painted; a page renders [`View`] however it likes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{ContentPayload, ContentType, Platform};
use crate::state::Session;

/// Per-tab thumbs signal. Lives on the session only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating { Up, Down }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthHint { NearLimit, TooLong }

/// `None` while `len <= near`; past `max` the text is too long.
/// Lengths are counted in Unicode scalar values, so emoji-heavy text may differ from UTF-16 counts.
pub fn length_hint(len: usize, near: usize, max: usize) -> Option<LengthHint> {
    if len > max {
        Some(LengthHint::TooLong)
    } else if len > near {
        Some(LengthHint::NearLimit)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SectionBody {
    Text(String),
    Paragraphs(Vec<String>),
    Items(Vec<String>),
    Json(String),
    Image(String),
    Link { label: String, url: String },
}

impl SectionBody {
    pub fn to_plain_text(&self) -> String {
        match self {
            SectionBody::Text(t) | SectionBody::Json(t) | SectionBody::Image(t) => t.clone(),
            SectionBody::Paragraphs(ps) => ps.join("\n"),
            SectionBody::Items(items) => items.iter().map(|i| format!("- {i}")).collect::<Vec<_>>().join("\n"),
            SectionBody::Link { label, url } => format!("{label}: {url}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub heading: String,
    pub body: SectionBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub char_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<LengthHint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_text: Option<String>,
}

impl Section {
    fn text(heading: impl Into<String>, text: &str) -> Self {
        Self {
            heading: heading.into(),
            body: SectionBody::Text(text.to_string()),
            char_count: None,
            hint: None,
            copy_text: Some(text.to_string()),
        }
    }

    fn counted(mut self, near: usize, max: usize) -> Self {
        let len = match &self.body {
            SectionBody::Text(t) => t.chars().count(),
            _ => 0,
        };
        self.char_count = Some(len);
        self.hint = length_hint(len, near, max);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub title: String,
    pub sections: Vec<Section>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_all: Option<String>,
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn platform_label(platform: Platform) -> &'static str {
    match platform {
        Platform::Instagram => "Instagram",
        Platform::Facebook => "Facebook",
        Platform::Twitter => "Twitter",
        Platform::Linkedin => "LinkedIn",
    }
}

/// Builds the panel for one payload.
pub fn panel_for(kind: ContentType, payload: &ContentPayload) -> Panel {
    match payload {
        ContentPayload::Description(d) => Panel {
            title: "Product Description".into(),
            sections: vec![Section::text("Description", &d.detailed_description)],
            copy_all: None,
        },
        ContentPayload::Seo(seo) => Panel {
            title: "SEO Content".into(),
            sections: vec![
                Section::text("Title Tag", &seo.title).counted(60, 70),
                Section::text("Meta Description", &seo.description).counted(150, 160),
            ],
            copy_all: None,
        },
        ContentPayload::MarketingEmail(email) => Panel {
            title: "Marketing Email".into(),
            sections: vec![
                Section::text("Subject Line", &email.subject),
                Section {
                    heading: "Email Body".into(),
                    body: SectionBody::Paragraphs(email.body.split('\n').map(str::to_string).collect()),
                    char_count: None,
                    hint: None,
                    copy_text: Some(email.body.clone()),
                },
            ],
            copy_all: Some(format!("Subject: {}\n\n{}", email.subject, email.body)),
        },
        ContentPayload::SocialMedia(posts) => {
            let platforms = [
                (Platform::Instagram, &posts.instagram),
                (Platform::Facebook, &posts.facebook),
                (Platform::Twitter, &posts.twitter),
                (Platform::Linkedin, &posts.linkedin),
            ];
            let sections = platforms
                .into_iter()
                .filter_map(|(platform, post)| {
                    let post = post.as_deref().filter(|p| !p.is_empty())?;
                    let section = Section::text(platform_label(platform), post);
                    Some(if platform == Platform::Twitter { section.counted(260, 280) } else { section })
                })
                .collect();
            Panel { title: "Social Media Content".into(), sections, copy_all: None }
        }
        ContentPayload::MissingFields(fields) => {
            let sections = fields
                .iter()
                .map(|(field, value)| {
                    let body = match value {
                        Value::Array(items) => SectionBody::Items(items.iter().map(scalar_text).collect()),
                        Value::Object(_) => SectionBody::Json(serde_json::to_string_pretty(value).unwrap_or_default()),
                        other => SectionBody::Text(scalar_text(other)),
                    };
                    Section { heading: capitalize(field), body, char_count: None, hint: None, copy_text: None }
                })
                .collect();
            Panel { title: "Generated Missing Fields".into(), sections, copy_all: None }
        }
        ContentPayload::ProductImage(image) => Panel {
            title: "Generated Product Image".into(),
            sections: vec![
                Section {
                    heading: "Image".into(),
                    body: SectionBody::Image(image.image_url.clone()),
                    char_count: None,
                    hint: None,
                    copy_text: None,
                },
                Section::text("Prompt Used", &image.prompt),
                Section {
                    heading: "Full Size".into(),
                    body: SectionBody::Link { label: "Open Full Size Image".into(), url: image.image_url.clone() },
                    char_count: None,
                    hint: None,
                    copy_text: None,
                },
            ],
            copy_all: None,
        },
        ContentPayload::Unrecognized(value) => Panel {
            title: kind.label().into(),
            sections: vec![Section {
                heading: "Raw Response".into(),
                body: SectionBody::Json(serde_json::to_string_pretty(value).unwrap_or_default()),
                char_count: None,
                hint: None,
                copy_text: None,
            }],
            copy_all: None,
        },
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status { Generating, Empty, Ready }

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tab {
    pub content_type: ContentType,
    pub label: &'static str,
    pub has_content: bool,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub status: Status,
    pub tabs: Vec<Tab>,
    pub active_tab: ContentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel: Option<Panel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn build_view(session: &Session) -> View {
    let content = &session.content;
    let tabs = session
        .content_types
        .iter()
        .map(|t| Tab { content_type: *t, label: t.label(), has_content: content.contains(*t), active: *t == session.active_tab })
        .collect();
    let error = session.last_error.as_ref().map(|e| e.message.clone());

    if session.is_generating {
        return View {
            status: Status::Generating,
            tabs,
            active_tab: session.active_tab,
            panel: None,
            rating: None,
            message: Some("Generating content...".into()),
            error,
        };
    }
    if content.is_empty() {
        return View {
            status: Status::Empty,
            tabs,
            active_tab: session.active_tab,
            panel: None,
            rating: None,
            message: Some("Select a product or create a custom one, then click \"Generate Content\" to get started.".into()),
            error,
        };
    }

    let panel = content.get(session.active_tab).map(|p| panel_for(session.active_tab, p));
    let (rating, message) = match panel {
        Some(_) => (session.ratings.get(&session.active_tab).copied(), None),
        None => (None, Some("No content generated for this type yet. Click \"Generate Content\" to create content.".to_string())),
    };
    View { status: Status::Ready, tabs, active_tab: session.active_tab, panel, rating, message, error }
}

/// Content types in display order: the selected tabs first, then anything else in the bag.
pub fn display_order(session: &Session) -> Vec<ContentType> {
    let mut order: Vec<ContentType> = session.content_types.iter().copied().filter(|t| session.content.contains(*t)).collect();
    for t in session.content.keys() {
        if !order.contains(&t) {
            order.push(t);
        }
    }
    order
}
