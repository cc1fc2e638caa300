use std::collections::HashSet;
use std::io;
use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

pub mod content_file;
pub mod front_matter;
pub mod markdown_renderer;

use crate::content::content_file::ContentFile;
use crate::content::front_matter::split_front_matter;
use crate::content::markdown_renderer::parse_title_markdown;
use crate::filters::humanize_duration;
use crate::text_utils::parse_date_time;

/// Logical bucket a document was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Posts,
    Drafts,
}

impl Bucket {
    pub fn url_prefix(self) -> &'static str {
        match self {
            Bucket::Posts => "posts",
            Bucket::Drafts => "drafts",
        }
    }
}

/// Metadata of one source document, as used for listing and derivation.
///
/// Records are built once per build and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRecord {
    pub input_path: PathBuf,
    pub slug: String,
    pub url: String,
    pub bucket: Bucket,
    pub title: String,
    pub publish_date: DateTime<Utc>,
    pub tags: Vec<String>,
    pub featured: bool,
    /// Author-curated related posts, front-matter key `similar`.
    pub related_slugs: Vec<String>,
    pub description: Option<String>,
    /// Human readable, from the ISO 8601 `duration` key
    pub duration: Option<String>,
    pub body: String,
}

impl ContentRecord {
    pub fn from_file(content_file: &ContentFile) -> io::Result<ContentRecord> {
        let file_name = &content_file.file_path;
        let (front_matter, body) = split_front_matter(file_name, &content_file.raw_content)?;

        let publish_date = match front_matter.date {
            Some(ref date) => parse_date_time(date)
                .map_err(|e| io::Error::new(ErrorKind::InvalidData, format!("{} - file={}", e, file_name.display())))?,
            None => content_file.modified,
        };

        let duration = match front_matter.duration {
            Some(ref iso) => Some(humanize_duration(iso)
                .map_err(|e| io::Error::new(ErrorKind::InvalidData, format!("{} - file={}", e, file_name.display())))?),
            None => None,
        };

        // Front matter wins, then the first level one heading, then the slug
        let title = match front_matter.title {
            Some(title) => title,
            None => {
                let mut lines = body.lines();
                let first = lines.next();
                let (title, _, _) = parse_title_markdown(lines, first);
                if title.is_empty() { content_file.slug.clone() } else { title }
            }
        };

        Ok(ContentRecord {
            input_path: file_name.clone(),
            slug: content_file.slug.clone(),
            url: content_file.url(),
            bucket: content_file.bucket,
            title,
            publish_date,
            tags: front_matter.tags,
            featured: front_matter.featured,
            related_slugs: front_matter.similar,
            description: front_matter.description,
            duration,
            body: body.to_string(),
        })
    }
}

/// Builds the records of every file, rejecting duplicated slugs.
pub fn load_records(content_files: &[ContentFile]) -> io::Result<Vec<ContentRecord>> {
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(content_files.len());
    for content_file in content_files {
        let record = ContentRecord::from_file(content_file)?;
        if !seen.insert(record.slug.clone()) {
            return Err(io::Error::new(
                ErrorKind::InvalidData,
                format!("Duplicated slug {} - file={}", record.slug, record.input_path.display()),
            ));
        }
        records.push(record);
    }
    Ok(records)
}
