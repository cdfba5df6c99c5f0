//! Tracking parameter removal for copied URLs.

use url::{form_urlencoded, Url};

/// Query parameters stripped when no configuration overrides them.
/// A trailing `*` matches by prefix.
pub const DEFAULT_TRACKING_PARAMS: &[&str] = &[
    "utm_*", "fbclid", "gclid", "dclid", "msclkid", "mc_cid", "mc_eid", "igshid", "yclid",
    "_hsenc", "_hsmi",
];

/// Remove tracking query parameters from `url`.
///
/// The input is returned untouched when it does not parse or when no
/// parameter matched, so already-clean URLs keep their exact spelling.
/// Kept parameters are copied through byte for byte.
pub fn remove_tracking(url: &str, params: &[String]) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };

    let cleaned = {
        let Some(query) = parsed.query() else {
            return url.to_string();
        };
        let segments: Vec<&str> = query.split('&').collect();
        let kept: Vec<&str> = segments
            .iter()
            .copied()
            .filter(|segment| !is_tracking_segment(segment, params))
            .collect();

        if kept.len() == segments.len() {
            return url.to_string();
        }
        kept.join("&")
    };

    if cleaned.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.set_query(Some(&cleaned));
    }

    parsed.to_string()
}

/// Match on the decoded name of one raw `name=value` query segment.
fn is_tracking_segment(segment: &str, params: &[String]) -> bool {
    form_urlencoded::parse(segment.as_bytes())
        .next()
        .is_some_and(|(name, _)| is_tracking_param(&name, params))
}

fn is_tracking_param(name: &str, params: &[String]) -> bool {
    params.iter().any(|p| match p.strip_suffix('*') {
        Some(prefix) => name.starts_with(prefix),
        None => name == p,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Vec<String> {
        DEFAULT_TRACKING_PARAMS.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_strips_tracking_params() {
        assert_eq!(
            remove_tracking("https://ex.com/a?utm_source=x&id=7&fbclid=abc", &defaults()),
            "https://ex.com/a?id=7"
        );
    }

    #[test]
    fn test_drops_empty_query_and_keeps_fragment() {
        assert_eq!(
            remove_tracking("https://ex.com/a?utm_medium=mail&utm_campaign=c#intro", &defaults()),
            "https://ex.com/a#intro"
        );
    }

    #[test]
    fn test_clean_urls_are_untouched() {
        for url in ["https://x/", "https://ex.com/search?q=a+b", "not a url ?utm_source=1"] {
            assert_eq!(remove_tracking(url, &defaults()), url);
        }
    }

    #[test]
    fn test_kept_params_keep_their_spelling() {
        let cases = [
            ("https://ex.com/?flag&utm_source=x", "https://ex.com/?flag"),
            ("https://ex.com/?q=a%20b&utm_source=x", "https://ex.com/?q=a%20b"),
            ("https://ex.com/?/docs/page&utm_source=x", "https://ex.com/?/docs/page"),
        ];
        for (input, expected) in cases {
            assert_eq!(remove_tracking(input, &defaults()), expected);
        }
    }

    #[test]
    fn test_encoded_tracking_names_match() {
        assert_eq!(
            remove_tracking("https://ex.com/?utm%5Fsource=x&id=1", &defaults()),
            "https://ex.com/?id=1"
        );
    }

    #[test]
    fn test_custom_params() {
        let params = vec!["ref".to_string()];
        assert_eq!(
            remove_tracking("https://ex.com/?ref=home&utm_source=x", &params),
            "https://ex.com/?utm_source=x"
        );
    }
}
