use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    defaults::default_settings_map,
    domain::{BlogPost, ContactMessage, Property, SiteSettings, Testimonial},
    merge::MergeTable,
    storage::StoreError,
};

/// Full snapshot of the site content as written by `export`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportDocument {
    pub properties: Vec<Property>,
    pub settings: SiteSettings,
    pub testimonials: Vec<Testimonial>,
    pub blog: Vec<BlogPost>,
    pub messages: Vec<ContactMessage>,
    pub timestamp: String,
}

pub fn export_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("modelland-data-{}.json", now.format("%Y-%m-%d"))
}

/// Which optional collections an import overwrote.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ImportSummary {
    pub testimonials: bool,
    pub blog: bool,
    pub messages: bool,
}

/// A validated backup document. Values are kept as parsed so they can be
/// written back verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportPlan {
    pub properties: Value,
    pub settings: Value,
    pub testimonials: Option<Value>,
    pub blog: Option<Value>,
    pub messages: Option<Value>,
}

impl ImportPlan {
    pub fn summary(&self) -> ImportSummary {
        ImportSummary {
            testimonials: self.testimonials.is_some(),
            blog: self.blog.is_some(),
            messages: self.messages.is_some(),
        }
    }
}

/// Parses and validates a backup document without touching storage.
///
/// `properties` and `settings` are mandatory. The other collections are
/// optional; a `null` counts as absent. Every present collection must have
/// the shape the store reads back.
pub fn parse_import(text: &str) -> Result<ImportPlan, StoreError> {
    let doc: Value = serde_json::from_str(text)
        .map_err(|e| StoreError::invalid_import(format!("not valid json: {e}")))?;
    let Value::Object(mut doc) = doc else {
        return Err(StoreError::invalid_import("document is not a json object"));
    };

    let mut take = |field: &str| doc.remove(field).filter(|v| !v.is_null());

    let properties = take("properties")
        .ok_or_else(|| StoreError::invalid_import("missing required field: properties"))?;
    let settings = take("settings")
        .ok_or_else(|| StoreError::invalid_import("missing required field: settings"))?;
    let testimonials = take("testimonials");
    let blog = take("blog");
    let messages = take("messages");

    check_list::<Property>("properties", &properties)?;
    check_settings(&settings)?;
    if let Some(value) = &testimonials {
        check_list::<Testimonial>("testimonials", value)?;
    }
    if let Some(value) = &blog {
        check_list::<BlogPost>("blog", value)?;
    }
    if let Some(value) = &messages {
        check_list::<ContactMessage>("messages", value)?;
    }

    Ok(ImportPlan {
        properties,
        settings,
        testimonials,
        blog,
        messages,
    })
}

/// Stored settings are read back merged over the defaults, so the merged
/// object must still deserialize.
fn check_settings(value: &Value) -> Result<(), StoreError> {
    let Value::Object(stored) = value else {
        return Err(StoreError::invalid_import("settings is not a json object"));
    };
    let merged = MergeTable::site_settings().merge(&default_settings_map()?, stored);
    SiteSettings::deserialize(&Value::Object(merged))
        .map(|_| ())
        .map_err(|e| StoreError::invalid_import(format!("settings: {e}")))
}

fn check_list<T: DeserializeOwned>(field: &str, value: &Value) -> Result<(), StoreError> {
    Vec::<T>::deserialize(value)
        .map(|_| ())
        .map_err(|e| StoreError::invalid_import(format!("{field}: {e}")))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;
    use serde_json::json;

    use super::*;

    #[test]
    fn filename_uses_utc_date() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 1).unwrap();
        assert_eq!(export_filename(now), "modelland-data-2024-03-09.json");
        assert_eq!(export_timestamp(now), "2024-03-09T23:59:01.000Z");
    }

    #[test]
    fn rejects_non_json_and_missing_settings() {
        assert!(matches!(
            parse_import("not json"),
            Err(StoreError::InvalidImport { .. })
        ));
        let err = parse_import(r#"{"properties":[]}"#).unwrap_err();
        assert!(err.to_string().contains("settings"));
        assert!(parse_import("[]").is_err());
    }

    #[test]
    fn null_optional_collections_count_as_absent() {
        let plan = parse_import(
            &json!({
                "properties": [],
                "settings": {"contactPhone": "+1"},
                "testimonials": null,
                "blog": []
            })
            .to_string(),
        )
        .unwrap();
        assert_eq!(
            plan.summary(),
            ImportSummary {
                testimonials: false,
                blog: true,
                messages: false
            }
        );
    }

    #[test]
    fn rejects_settings_with_mistyped_fields() {
        let err = parse_import(
            &json!({
                "properties": [],
                "settings": {"heroImages": "not-a-list", "contactPhone": 42}
            })
            .to_string(),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("invalid backup document: settings"));
        assert!(parse_import(r#"{"properties":[],"settings":[]}"#).is_err());
    }

    #[test]
    fn rejects_malformed_collection() {
        let err = parse_import(
            &json!({
                "properties": [{"id": "1"}],
                "settings": {}
            })
            .to_string(),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("invalid backup document: properties"));
    }
}
