use url::Url;

pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg", ".bmp"];
pub const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".webm", ".ogg", ".mov", ".avi"];

/// What a declared `Content-Type` header tells us about the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentClass {
    Image,
    Video,
    Markup,
    Other,
}

impl ContentClass {
    /// Classify a raw header value. Matching is substring based so parameters
    /// like `; charset=utf-8` do not matter.
    pub fn from_content_type(content_type: &str) -> Self {
        let content_type = content_type.to_ascii_lowercase();
        if content_type.contains("image/") {
            ContentClass::Image
        } else if content_type.contains("video/") {
            ContentClass::Video
        } else if content_type.contains("text/html")
            || content_type.contains("application/xhtml+xml")
        {
            ContentClass::Markup
        } else {
            ContentClass::Other
        }
    }
}

/// The part of `url` the extension heuristics look at: the path when the URL
/// parses, the raw string otherwise.
fn heuristic_target(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().to_ascii_lowercase(),
        Err(_) => url.to_ascii_lowercase(),
    }
}

fn has_extension(url: &str, extensions: &[&str]) -> bool {
    let target = heuristic_target(url);
    extensions.iter().any(|ext| target.ends_with(ext))
}

pub fn is_image_url(url: &str) -> bool {
    has_extension(url, IMAGE_EXTENSIONS)
}

pub fn is_video_url(url: &str) -> bool {
    has_extension(url, VIDEO_EXTENSIONS)
}

/// Image or video by extension, i.e. answerable without a request.
pub fn is_media_url(url: &str) -> bool {
    is_image_url(url) || is_video_url(url)
}

/// Title used when there is no document to read one from: the last non-empty
/// path segment, else the hostname, else the input verbatim.
pub fn file_name_from_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_string();
    };

    let segment = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last());

    match segment {
        Some(name) => name.to_string(),
        None => parsed.host_str().unwrap_or(url).to_string(),
    }
}
