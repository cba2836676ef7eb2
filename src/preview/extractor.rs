use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

use crate::models::{PreviewRecord, PreviewType};

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("valid selector"));
static ICON: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"link[rel="icon"]"#).expect("valid selector"));
static SHORTCUT_ICON: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"link[rel="shortcut icon"]"#).expect("valid selector"));

/// Build a preview record from an HTML document.
///
/// Never fails: missing tags and unresolvable references degrade to empty
/// strings, and a missing title falls back to the page's hostname.
pub fn extract(url: &str, html: &str) -> PreviewRecord {
    let document = Html::parse_document(html);

    let title = get_title_tag(&document)
        .or_else(|| get_meta_content(&document, "title", "og:title"))
        .unwrap_or_else(|| hostname_or_input(url));

    let description = get_meta_content(&document, "description", "og:description");
    let image = get_meta_content(&document, "image", "og:image");
    let site_name = get_meta_content(&document, "site_name", "og:site_name");
    let og_type = get_meta_content(&document, "type", "og:type");

    let favicon = get_href(&document, &ICON)
        .or_else(|| get_href(&document, &SHORTCUT_ICON))
        .unwrap_or_default();

    // Favicons that cannot be resolved are dropped; images keep their raw value.
    let favicon = absolutize(url, &favicon).unwrap_or_default();
    let image = image.map(|raw| absolutize(url, &raw).unwrap_or(raw));

    PreviewRecord {
        title: Some(title),
        description: Some(description.unwrap_or_default()),
        image: Some(image.unwrap_or_default()),
        favicon: Some(favicon),
        site_name: Some(site_name.unwrap_or_default()),
        content_type: Some("text/html".to_string()),
        ..PreviewRecord::new(url, PreviewType::from_og_type(og_type.as_deref().unwrap_or("")))
    }
}

/// Look up `meta[name=..]`, falling back to `meta[property=..]` when the name
/// lookup is absent or blank.
fn get_meta_content(doc: &Html, name: &str, property: &str) -> Option<String> {
    get_meta_attr(doc, "name", name).or_else(|| get_meta_attr(doc, "property", property))
}

fn get_meta_attr(doc: &Html, attr: &str, value: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"meta[{attr}="{value}"]"#)).ok()?;
    doc.select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn get_title_tag(doc: &Html) -> Option<String> {
    doc.select(&TITLE)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn get_href(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn hostname_or_input(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

/// Resolve `reference` against the origin of `page_url`. The page's own path is
/// discarded, so `img/a.png` on `https://ex.com/blog/post` becomes
/// `https://ex.com/img/a.png`.
///
/// Empty and already-absolute (`http...`) references are returned unchanged;
/// `None` means resolution failed.
fn absolutize(page_url: &str, reference: &str) -> Option<String> {
    if reference.is_empty() || reference.starts_with("http") {
        return Some(reference.to_string());
    }

    let page = Url::parse(page_url).ok()?;
    let host = page.host_str()?;
    let origin = match page.port() {
        Some(port) => format!("{}://{}:{}", page.scheme(), host, port),
        None => format!("{}://{}", page.scheme(), host),
    };

    Url::parse(&origin)
        .and_then(|base| base.join(reference))
        .map(|resolved| resolved.to_string())
        .ok()
}
