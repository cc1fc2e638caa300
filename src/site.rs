//! Turns the content tree into the output site: post pages, paginated index,
//! one page per tag and the RSS feed.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{fs, io};

use chrono::{DateTime, Utc};
use spdlog::{debug, info};

use crate::collection::{BuildMode, Collections};
use crate::config::Config;
use crate::content::content_file::scan_bucket;
use crate::content::markdown_renderer::{render_markdown, BreakTag, RenderOptions};
use crate::content::{load_records, Bucket, ContentRecord};
use crate::filters::limit;
use crate::paginator::{page_url, Paginator};
use crate::shortcodes::expand_shortcodes;
use crate::view::list_renderer::{ListEntry, ListRenderer, PageInfo};
use crate::view::post_renderer::PostRenderer;
use crate::view::rss_renderer::RssChannel;
use crate::view::tag_url;

const POST_TEMPLATE: &str = "post.tpl";
const LIST_TEMPLATE: &str = "list.tpl";
const FEED_FILE: &str = "feed.xml";

#[derive(Debug, Default, PartialEq)]
pub struct BuildReport {
    pub posts: usize,
    pub drafts: usize,
    pub tags: usize,
    pub pages_written: usize,
}

/// Reads every post and draft below the content dir.
pub fn load_content(config: &Config) -> io::Result<Vec<ContentRecord>> {
    let mut files = scan_bucket(&config.paths.posts_root(), Bucket::Posts)?;
    files.extend(scan_bucket(&config.paths.drafts_root(), Bucket::Drafts)?);
    debug!("Found {} content files", files.len());
    load_records(&files)
}

pub fn build_site(config: &Config, records: &[ContentRecord], now: DateTime<Utc>, mode: BuildMode) -> io::Result<BuildReport> {
    let collections = Collections::build(records, now, mode);
    info!("Building {:?} site at {}: {} live posts, {} drafts, {} tags",
        mode, now, collections.posts.len(), collections.drafts.len(), collections.tags.len());

    let template_dir = &config.paths.template_dir;
    let post_tpl_src = read_template(template_dir, POST_TEMPLATE)?;
    let list_tpl_src = read_template(template_dir, LIST_TEMPLATE)?;
    let date_format = config.defaults.date_format.as_str();
    let post_renderer = PostRenderer::new(&post_tpl_src, date_format)?;
    let list_renderer = ListRenderer::new(&list_tpl_src, date_format)?;

    let output_dir = &config.paths.output_dir;
    let mut report = BuildReport {
        posts: collections.posts.len(),
        drafts: 0,
        tags: collections.tags.len(),
        pages_written: 0,
    };

    // Drafts are only previewed locally
    let drafts = collections.rendered_drafts();
    for record in collections.posts.iter().chain(drafts.iter()) {
        let html = render_body(record, &collections, &RenderOptions::FullContent)?;
        let similar = collections.similar_to(record);
        let similar = limit(&similar, config.defaults.similar_count);
        let page = post_renderer.render(record, &html, similar);
        write_page(output_dir, &record.url, &page)?;
        report.pages_written += 1;
        debug!("Rendered {}", record.url);
    }
    report.drafts = drafts.len();

    let summary_options = RenderOptions::PreviewOnly(BreakTag(config.defaults.summary_tag.clone()));
    let mut entries = Vec::with_capacity(collections.posts.len());
    for record in collections.posts.iter().copied().rev() {
        entries.push(ListEntry {
            record,
            summary: render_body(record, &collections, &summary_options)?,
        });
    }

    let mut draft_entries = Vec::with_capacity(drafts.len());
    for record in drafts.iter().copied() {
        draft_entries.push(ListEntry {
            record,
            summary: render_body(record, &collections, &summary_options)?,
        });
    }

    let paginator = Paginator::from(&entries, config.defaults.page_size as usize);
    let pages = paginator.pages();
    for (idx, page_entries) in pages.iter().enumerate() {
        let page = PageInfo { current: idx + 1, count: pages.len() };
        let html = list_renderer.render("Posts", page_entries, &collections.tags, &collections.featured, page);
        write_page(output_dir, &page_url(page.current), &html)?;
        report.pages_written += 1;
    }

    let mut tag_pages: HashMap<String, &str> = HashMap::new();
    for tag in collections.tags.iter() {
        let url = tag_url(tag);
        if url == "/tags//" {
            return Err(io::Error::new(ErrorKind::InvalidData, format!("Tag {:?} has no usable characters for a url", tag)));
        }
        if let Some(other) = tag_pages.insert(url.clone(), tag) {
            return Err(io::Error::new(ErrorKind::InvalidData, format!("Tags {:?} and {:?} share the url {}", other, tag, url)));
        }

        let tagged: Vec<ListEntry> = entries.iter()
            .chain(draft_entries.iter())
            .filter(|e| e.record.tags.contains(tag))
            .cloned()
            .collect();
        let title = format!("Tagged \u{201c}{}\u{201d}", tag);
        let html = list_renderer.render(&title, &tagged, &collections.tags, &collections.featured, PageInfo::single());
        write_page(output_dir, &url, &html)?;
        report.pages_written += 1;
    }

    if let Some(ref feed) = config.rss_feed {
        let rss = RssChannel {
            ch_title: feed.title.as_str(),
            ch_link: feed.site_url.as_str(),
            ch_desc: feed.description.as_str(),
        };
        let xml = rss.render(limit(&entries, feed.page_size as usize))
            .map_err(|e| io::Error::new(ErrorKind::Other, format!("Error writing feed: {}", e)))?;
        fs::create_dir_all(output_dir)?;
        fs::write(output_dir.join(FEED_FILE), xml)?;
        info!("Feed written with {} items", entries.len().min(feed.page_size as usize));
    }

    info!("Done: {} pages written to {}", report.pages_written, output_dir.display());
    Ok(report)
}

fn read_template(template_dir: &Path, name: &str) -> io::Result<String> {
    let path = template_dir.join(name);
    fs::read_to_string(&path)
        .map_err(|e| io::Error::new(e.kind(), format!("Error reading template {}: {}", path.display(), e)))
}

/// Shortcodes first, a broken `postUrl` fails the whole build.
fn render_body(record: &ContentRecord, collections: &Collections, options: &RenderOptions) -> io::Result<String> {
    let body = expand_shortcodes(&record.body, collections)
        .map_err(|e| io::Error::new(ErrorKind::InvalidData, format!("{} - file={}", e, record.input_path.display())))?;
    render_markdown(&body, options)
        .map_err(|e| io::Error::new(e.kind(), format!("{} - file={}", e, record.input_path.display())))
}

fn output_path(output_dir: &Path, url: &str) -> PathBuf {
    output_dir.join(url.trim_matches('/')).join("index.html")
}

fn write_page(output_dir: &Path, url: &str, html: &str) -> io::Result<()> {
    let path = output_path(output_dir, url);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, html)
}
