use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    MissingField {
        entity: &'static str,
        field: &'static str,
    },
    NotFound {
        collection: &'static str,
        id: String,
    },
}

impl DomainError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "invalid_request",
            Self::NotFound { .. } => "not_found",
        }
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { entity, field } => {
                write!(f, "{entity} is missing required field: {field}")
            }
            Self::NotFound { collection, id } => write!(f, "{collection} not found: {id}"),
        }
    }
}

impl std::error::Error for DomainError {}

/// A record that lives in one of the list collections and is addressed by `id`.
pub trait Record: Clone + Serialize + serde::de::DeserializeOwned {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PropertyStatus {
    #[default]
    Available,
    #[serde(rename = "Sold Out")]
    SoldOut,
    #[serde(rename = "Selling Fast")]
    SellingFast,
}

impl PropertyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::SoldOut => "Sold Out",
            Self::SellingFast => "Selling Fast",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub title: String,
    pub location: String,
    /// Display string such as "KES 350,000"; never parsed as a number.
    pub price: String,
    #[serde(default)]
    pub deposit: String,
    #[serde(default)]
    pub payment_plan: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub status: PropertyStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    pub quote: String,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    #[serde(default)]
    pub image: String,
    /// Display date; list order follows insertion, not this field.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub author: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum MessageStatus {
    #[default]
    New,
    Read,
    Replied,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
    /// ISO-8601 submission time.
    pub date: String,
    #[serde(default)]
    pub status: MessageStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub logo_url: String,
    /// Single hero image from before the slider existed; still written for older readers.
    pub hero_image_url: String,
    pub hero_images: Vec<String>,
    pub about_image_url: String,
    pub why_us_image_url: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub testimonial_video_url: String,
    pub social_facebook: String,
    pub social_instagram: String,
    pub social_x: String,
    pub social_youtube: String,
    pub social_tiktok: String,
}

macro_rules! impl_record {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Record for $ty {
                fn id(&self) -> &str {
                    &self.id
                }

                fn set_id(&mut self, id: String) {
                    self.id = id;
                }
            }
        )+
    };
}

impl_record!(Property, Testimonial, BlogPost, ContactMessage);

fn require(entity: &'static str, field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::MissingField { entity, field });
    }
    Ok(())
}

pub fn validate_property(property: &Property) -> Result<(), DomainError> {
    require("property", "title", &property.title)?;
    require("property", "location", &property.location)?;
    require("property", "price", &property.price)
}

pub fn validate_testimonial(testimonial: &Testimonial) -> Result<(), DomainError> {
    require("testimonial", "name", &testimonial.name)?;
    require("testimonial", "quote", &testimonial.quote)
}

pub fn validate_blog_post(post: &BlogPost) -> Result<(), DomainError> {
    require("blog post", "title", &post.title)?;
    require("blog post", "excerpt", &post.excerpt)?;
    require("blog post", "content", &post.content)
}

pub fn validate_contact_message(message: &ContactMessage) -> Result<(), DomainError> {
    require("message", "firstName", &message.first_name)?;
    require("message", "email", &message.email)?;
    require("message", "message", &message.message)
}
