use std::{fs, io};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use spdlog::debug;
use walkdir::WalkDir;

use crate::content::Bucket;

const INDEX_FILE_NAME: &str = "index.md";

pub struct ContentFile {
    pub file_path: PathBuf,
    pub slug: String,
    pub bucket: Bucket,
    pub raw_content: String,
    pub modified: DateTime<Utc>,
}

impl ContentFile {
    pub fn from_file(file_path: PathBuf, bucket: Bucket) -> io::Result<ContentFile> {
        let slug = Self::slug_from_path(&file_path)?;
        let raw_content = fs::read_to_string(&file_path)?;
        let modified: DateTime<Utc> = fs::metadata(&file_path)?.modified()?.into();

        Ok(ContentFile {
            file_path,
            slug,
            bucket,
            raw_content,
            modified,
        })
    }

    /// `posts/name.md` and `posts/name/index.md` both give `name`
    pub fn slug_from_path(path: &Path) -> io::Result<String> {
        let file_name = path.file_name()
            .and_then(|f| f.to_str())
            .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, format!("Invalid content path {}", path.display())))?;

        let slug = match file_name {
            INDEX_FILE_NAME => path.parent()
                .and_then(|p| p.file_name())
                .and_then(|p| p.to_str()),
            x if x.ends_with(".md") => path.file_stem().and_then(|s| s.to_str()),
            _ => return Err(io::Error::new(ErrorKind::InvalidInput, format!("Invalid content file {}", path.display()))),
        };

        match slug {
            Some(slug) if !slug.is_empty() => Ok(slug.to_string()),
            _ => Err(io::Error::new(ErrorKind::InvalidInput, format!("Could not find slug for {}", path.display()))),
        }
    }

    pub fn url(&self) -> String {
        format!("/{}/{}/", self.bucket.url_prefix(), self.slug)
    }
}

/// Lists every Markdown document under `root_dir`, sorted by path.
///
/// A missing directory is not an error, blogs without drafts are common.
pub fn scan_bucket(root_dir: &Path, bucket: Bucket) -> io::Result<Vec<ContentFile>> {
    if !root_dir.is_dir() {
        debug!("Skipping {:?}: {} does not exist", bucket, root_dir.display());
        return Ok(vec![]);
    }

    let mut files = vec![];
    for entry in WalkDir::new(root_dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_markdown = entry.path().extension().is_some_and(|ext| ext == "md");
        if is_markdown {
            files.push(ContentFile::from_file(entry.into_path(), bucket)?);
        }
    }
    Ok(files)
}
