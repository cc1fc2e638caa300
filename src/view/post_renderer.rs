use std::io;

use ramhorns::Template;

use crate::content::{Bucket, ContentRecord};
use crate::filters::reading_time;
use crate::text_utils::format_date_time;
use crate::view::{check_date_format, parse_template, ViewLink, ViewTag};

#[derive(ramhorns::Content)]
struct ViewItem<'a> {
    title: &'a str,
    url: &'a str,
    description: &'a str,
    tags: Vec<ViewTag<'a>>,
    date: &'a str,
    time: &'a str,
    display_date: &'a str,
    reading_time: String,
    duration: &'a str,
    is_draft: bool,
    post_content: &'a str,
    similar: Vec<ViewLink<'a>>,
    has_similar: bool,
}

pub struct PostRenderer<'a> {
    template: Template<'a>,
    date_format: String,
}

impl<'a> PostRenderer<'a> {
    pub fn new(view_tpl_src: &'a str, date_format: &str) -> io::Result<Self> {
        check_date_format(date_format)?;
        Ok(PostRenderer {
            template: parse_template("post", view_tpl_src)?,
            date_format: date_format.to_string(),
        })
    }

    pub fn render(&self, record: &ContentRecord, rendered: &str, similar: &[&ContentRecord]) -> String {
        let tags = record.tags.iter().map(|t| ViewTag::from(t.as_str())).collect();
        let similar: Vec<ViewLink> = similar.iter().map(|r| ViewLink::from(r, &self.date_format)).collect();
        let (date, time) = format_date_time(&record.publish_date);
        let display_date = record.publish_date.format(&self.date_format).to_string();

        self.template.render(&ViewItem {
            title: record.title.as_str(),
            url: record.url.as_str(),
            description: record.description.as_deref().unwrap_or(""),
            tags,
            date: date.as_str(),
            time: time.as_str(),
            display_date: display_date.as_str(),
            reading_time: reading_time(rendered),
            duration: record.duration.as_deref().unwrap_or(""),
            is_draft: record.bucket == Bucket::Drafts,
            post_content: rendered,
            has_similar: !similar.is_empty(),
            similar,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::test_data::record;

    use super::*;

    const TEMPLATE_SRC: &str = r##"
TITLE=[{{title}}]
DATE=[{{date}} {{time}}|{{display_date}}|{{reading_time}}{{#duration}}|{{duration}}{{/duration}}]
TAGS=[{{#tags}}({{tag}} {{url}}){{/tags}}]
DRAFT=[{{#is_draft}}yes{{/is_draft}}]
SIMILAR=[{{#has_similar}}{{#similar}}<{{title}} {{url}}>{{/similar}}{{/has_similar}}]
POST_CONTENT=[{{{post_content}}}]"##;

    #[test]
    fn render_view() {
        let renderer = PostRenderer::new(TEMPLATE_SRC, "%B %-d, %Y").unwrap();
        let mut post = record("post", "2024-01-02 03:04:05", &["<rust>", "Python"]);
        post.title = "<post-title>".to_string();
        post.duration = Some("45 minutes".to_string());
        let other = record("other", "2023-05-06", &["Python"]);

        let res = renderer.render(&post, "<p>post-content</p>", &[&other]);
        assert_eq!(res, r##"
TITLE=[&lt;post-title&gt;]
DATE=[2024-01-02 03:04:05|January 2, 2024|1 minute|45 minutes]
TAGS=[(&lt;rust&gt; /tags/rust/)(Python /tags/python/)]
DRAFT=[]
SIMILAR=[<Title of other /posts/other/>]
POST_CONTENT=[<p>post-content</p>]"##);
    }

    #[test]
    fn render_draft_without_similar() {
        let renderer = PostRenderer::new("{{#is_draft}}draft{{/is_draft}}{{^has_similar}} alone{{/has_similar}}", "%Y").unwrap();
        let mut post = record("draft", "2024-01-02", &[]);
        post.bucket = Bucket::Drafts;
        assert_eq!(renderer.render(&post, "", &[]), "draft alone");
    }

    #[test]
    fn invalid_date_format() {
        assert!(PostRenderer::new("{{title}}", "%Q").is_err());
    }
}
