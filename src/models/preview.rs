use serde::Serialize;
use strum::EnumString;

/// Content classification of a previewed URL. Drives which card the UI renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PreviewType {
    Website,
    Image,
    Video,
    Article,
    Unknown,
}

impl PreviewType {
    /// Map an `og:type` value onto the closed set of preview types.
    ///
    /// Empty means the page declared nothing and is a plain website. Open Graph
    /// sub-types such as `video.movie` collapse onto their top-level kind, and
    /// anything else unrecognised (`profile`, `book`, `music.song`) is still an
    /// HTML page, so it is treated as a website.
    pub fn from_og_type(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() {
            return PreviewType::Website;
        }
        let top_level = value.split('.').next().unwrap_or(value);
        match top_level.parse::<PreviewType>() {
            Ok(PreviewType::Unknown) | Err(_) => PreviewType::Website,
            Ok(kind) => kind,
        }
    }
}

/// Normalized preview metadata returned by `GET /api/preview`.
///
/// Only `url` and `type` are always present; everything else is best effort.
/// Error records carry `isError: true` and an `errorMessage`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRecord {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: PreviewType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl PreviewRecord {
    /// A record with only `url` and `type` set.
    pub fn new(url: impl Into<String>, kind: PreviewType) -> Self {
        PreviewRecord {
            url: url.into(),
            title: None,
            description: None,
            image: None,
            favicon: None,
            site_name: None,
            kind,
            content_type: None,
            is_error: None,
            error_message: None,
        }
    }

    /// A failed preview: `type` is `unknown` and the message is surfaced to the UI.
    pub fn failure(url: impl Into<String>, message: impl Into<String>) -> Self {
        PreviewRecord {
            is_error: Some(true),
            error_message: Some(message.into()),
            ..PreviewRecord::new(url, PreviewType::Unknown)
        }
    }

    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn og_type_maps_known_kinds() {
        assert_eq!(PreviewType::from_og_type("article"), PreviewType::Article);
        assert_eq!(PreviewType::from_og_type("Website"), PreviewType::Website);
        assert_eq!(PreviewType::from_og_type("video.movie"), PreviewType::Video);
        assert_eq!(PreviewType::from_og_type(" image "), PreviewType::Image);
    }

    #[test]
    fn og_type_defaults_to_website() {
        assert_eq!(PreviewType::from_og_type(""), PreviewType::Website);
        assert_eq!(PreviewType::from_og_type("profile"), PreviewType::Website);
        assert_eq!(PreviewType::from_og_type("unknown"), PreviewType::Website);
    }

    #[test]
    fn serializes_camel_case_and_omits_absent_fields() {
        let mut record = PreviewRecord::new("https://ex.com", PreviewType::Website);
        record.site_name = Some("Ex".into());
        record.content_type = Some("text/html".into());
        record.description = Some(String::new());

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "url": "https://ex.com",
                "description": "",
                "siteName": "Ex",
                "type": "website",
                "contentType": "text/html",
            })
        );
    }

    #[test]
    fn failure_record_is_unknown_with_error_fields() {
        let record = PreviewRecord::failure("https://ex.com", "Failed to fetch URL: boom");
        assert!(record.is_error());
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "unknown");
        assert_eq!(value["isError"], true);
        assert_eq!(value["errorMessage"], "Failed to fetch URL: boom");
    }

    #[test]
    fn success_record_is_not_error() {
        assert!(!PreviewRecord::new("https://ex.com", PreviewType::Image).is_error());
    }
}
