use std::io;
use std::io::ErrorKind;

use chrono::Utc;
use ramhorns::Template;

use crate::content::ContentRecord;
use crate::filters::format_date;
use crate::text_utils::slugify;

pub mod list_renderer;
pub mod post_renderer;
pub mod rss_renderer;

#[derive(ramhorns::Content)]
pub(crate) struct ViewTag<'a> {
    tag: &'a str,
    url: String,
}

impl<'a> ViewTag<'a> {
    pub(crate) fn from(tag: &'a str) -> Self {
        ViewTag {
            tag,
            url: tag_url(tag),
        }
    }
}

/// A link to another post, for similar and featured lists.
#[derive(ramhorns::Content)]
pub(crate) struct ViewLink<'a> {
    title: &'a str,
    url: &'a str,
    date: String,
}

impl<'a> ViewLink<'a> {
    pub(crate) fn from(record: &'a ContentRecord, date_format: &str) -> Self {
        ViewLink {
            title: record.title.as_str(),
            url: record.url.as_str(),
            date: record.publish_date.format(date_format).to_string(),
        }
    }
}

pub fn tag_url(tag: &str) -> String {
    format!("/tags/{}/", slugify(tag))
}

pub(crate) fn parse_template<'a>(name: &str, src: &'a str) -> io::Result<Template<'a>> {
    Template::new(src).map_err(|e| io::Error::new(
        ErrorKind::InvalidInput,
        format!("Error parsing {} template: {}", name, e),
    ))
}

/// Rejects formats that would make rendering fail later on.
pub(crate) fn check_date_format(date_format: &str) -> io::Result<()> {
    format_date(&Utc::now(), date_format)
        .map(|_| ())
        .map_err(|e| io::Error::new(ErrorKind::InvalidInput, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_url() {
        assert_eq!(tag_url("Python"), "/tags/python/");
        assert_eq!(tag_url("command line"), "/tags/command-line/");
    }

    #[test]
    fn test_check_date_format() {
        assert!(check_date_format("%Y").is_ok());
        assert!(check_date_format("%Q").is_err());
    }
}
