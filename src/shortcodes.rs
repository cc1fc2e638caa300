//! Shortcodes usable inside post bodies, written as `{% name "arg" %}`.
//!
//! They are expanded before the Markdown is rendered, so a broken `postUrl`
//! stops the build instead of publishing a dead link.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::collection::{Collections, DeriveError};

/// Url of another live post, like Jekyll's `post_url`.
pub fn post_url<'a>(collections: &Collections<'a>, slug: &str) -> Result<&'a str, DeriveError> {
    collections.post_url(slug)
}

/// Embeds an asciinema recording.
pub fn ascii(id: &str) -> String {
    format!(r#"<div class="tc"><script id="{id}" src="https://asciinema.org/a/{id}.js" async></script></div>"#)
}

pub fn expand_shortcodes(body: &str, collections: &Collections) -> Result<String, DeriveError> {
    lazy_static! {
        static ref SHORTCODE_REGEX: Regex = Regex::new(
            r#"\{%-?\s*(?P<name>postUrl|ascii)\s+["'](?P<arg>[^"']+)["']\s*-?%\}"#
        ).unwrap();
    }

    let mut failure = None;
    let expanded = SHORTCODE_REGEX.replace_all(body, |caps: &Captures| {
        let arg = &caps["arg"];
        match &caps["name"] {
            "postUrl" => match post_url(collections, arg) {
                Ok(url) => url.to_string(),
                Err(e) => {
                    failure.get_or_insert(e);
                    String::new()
                }
            },
            _ => ascii(arg),
        }
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(expanded.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::collection::BuildMode;
    use crate::content::ContentRecord;
    use crate::test_data::record;

    use super::*;

    #[test]
    fn test_expand_post_url() {
        let records = vec![record("first-post", "2024-01-01", &[])];
        let collections = Collections::build(&records, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(), BuildMode::Production);
        let body = r#"See [the first one]({% postUrl "first-post" %}) and {%- postUrl 'first-post' -%}."#;
        let expanded = expand_shortcodes(body, &collections).unwrap();
        assert_eq!(expanded, "See [the first one](/posts/first-post/) and /posts/first-post/.");
    }

    #[test]
    fn test_unknown_slug_fails() {
        let records = vec![record("future-post", "2030-01-01", &[])];
        let collections = Collections::build(&records, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(), BuildMode::Production);
        let err = expand_shortcodes(r#"{% postUrl "future-post" %}"#, &collections).unwrap_err();
        assert_eq!(err, DeriveError::UnknownSlug("future-post".to_string()));
    }

    #[test]
    fn test_ascii() {
        let records: Vec<ContentRecord> = vec![];
        let collections = Collections::build(&records, Utc::now(), BuildMode::Production);
        let expanded = expand_shortcodes(r#"{% ascii "12345" %} {% image "x.png" %}"#, &collections).unwrap();
        assert_eq!(expanded, r#"<div class="tc"><script id="12345" src="https://asciinema.org/a/12345.js" async></script></div> {% image "x.png" %}"#);
    }
}
