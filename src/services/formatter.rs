//! Markdown formatting for links, images and pages.
//!
//! Every function here is total: a missing input is rendered as an empty
//! string, so the output never contains a placeholder like "undefined".

use url::Url;

use crate::models::{ImageAltTarget, ImageContext, ImageLinkTarget, PageContext};

/// `[text](url)`
pub fn format_link(text: &str, url: &str) -> String {
    format!("[{}]({})", text, url)
}

/// `[title](url)`, with an empty title when the page has none.
pub fn format_page(title: Option<&str>, url: &str) -> String {
    format_link(title.unwrap_or(""), url)
}

/// Image markdown, optionally wrapped in a link to the page or the image itself.
pub fn format_image(
    image: &ImageContext,
    alt_target: ImageAltTarget,
    link_target: ImageLinkTarget,
    page: &PageContext,
) -> String {
    let alt = resolve_alt(image, alt_target, page);
    let markdown = format!("![{}]({})", alt, image.src_url);

    match link_target {
        ImageLinkTarget::NoLink => markdown,
        ImageLinkTarget::LinkToPage => format_link(&markdown, &page.url),
        ImageLinkTarget::LinkToImage => format_link(&markdown, &image.src_url),
    }
}

/// Pick the alt text for an image.
///
/// The image's own description wins for every target: explicit alt text
/// first, then the host-reported media type. Only when neither is present
/// does the target's fallback apply.
pub fn resolve_alt(image: &ImageContext, target: ImageAltTarget, page: &PageContext) -> String {
    let own = non_empty(image.alt.as_deref()).or_else(|| non_empty(image.media_type.as_deref()));
    if let Some(alt) = own {
        return alt.to_string();
    }

    match target {
        ImageAltTarget::Alt => String::new(),
        ImageAltTarget::AltFallbackTitle => page.title.clone().unwrap_or_default(),
        ImageAltTarget::AltFallbackFilename => file_name_from_url(&image.src_url).unwrap_or_default(),
    }
}

/// Last non-empty path segment of `url`, percent-decoded, ignoring query
/// and fragment.
pub fn file_name_from_url(url: &str) -> Option<String> {
    let segment = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()?
            .filter(|s| !s.is_empty())
            .last()
            .map(|s| s.to_string()),
        // Relative or otherwise unparsable: split by hand
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or("")
            .rsplit('/')
            .find(|s| !s.is_empty())
            .map(|s| s.to_string()),
    }?;

    match urlencoding::decode(&segment) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(_) => Some(segment),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
