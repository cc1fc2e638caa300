//! Derived views over the content records of a build.
//!
//! Every query here is a pure function of its inputs: the reference instant and the
//! build mode are passed in, never read from the clock or the environment. Missing
//! optional metadata (tags, related slugs, featured flag) behaves as empty/false,
//! so the only failing operation is slug resolution.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::content::{Bucket, ContentRecord};

/// Development builds show everything, including future-dated posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Development,
    Production,
}

impl BuildMode {
    /// Maps a `NODE_ENV` style value; anything but `development` is production.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some("development") => BuildMode::Development,
            _ => BuildMode::Production,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum DeriveError {
    #[error("Unknown page slug: \"{0}\"")]
    UnknownSlug(String),
}

/// True when the record may be shown. Equal instants are live.
pub fn is_live(record: &ContentRecord, now: DateTime<Utc>, mode: BuildMode) -> bool {
    match mode {
        BuildMode::Development => true,
        BuildMode::Production => record.publish_date <= now,
    }
}

pub fn live_subset<'a, I>(records: I, now: DateTime<Utc>, mode: BuildMode) -> Vec<&'a ContentRecord>
    where
        I: IntoIterator<Item=&'a ContentRecord>,
{
    records.into_iter()
        .filter(|r| is_live(r, now, mode))
        .collect()
}

/// Sorted, deduplicated tags of the live records.
pub fn tag_universe<'a, I>(records: I, now: DateTime<Utc>, mode: BuildMode) -> Vec<String>
    where
        I: IntoIterator<Item=&'a ContentRecord>,
{
    let tags: BTreeSet<&str> = live_subset(records, now, mode)
        .into_iter()
        .flat_map(|r| r.tags.iter().map(String::as_str))
        .collect();
    tags.into_iter().map(str::to_string).collect()
}

pub fn featured_subset<'a, I>(records: I) -> Vec<&'a ContentRecord>
    where
        I: IntoIterator<Item=&'a ContentRecord>,
{
    records.into_iter().filter(|r| r.featured).collect()
}

/// Number of distinct tags shared with `reference`.
fn overlap(record: &ContentRecord, reference: &HashSet<&str>) -> usize {
    let own: HashSet<&str> = record.tags.iter().map(String::as_str).collect();
    own.intersection(reference).count()
}

/// Candidates sharing at least one tag with `reference_tags`, most shared first.
///
/// Ties keep the order of `candidates`, the sort being stable.
pub fn similarity_ranked<'a, I>(candidates: I, exclude_path: &Path, reference_tags: &[String]) -> Vec<&'a ContentRecord>
    where
        I: IntoIterator<Item=&'a ContentRecord>,
{
    let reference: HashSet<&str> = reference_tags.iter().map(String::as_str).collect();

    let mut ranked: Vec<(usize, &'a ContentRecord)> = candidates.into_iter()
        .filter(|r| r.input_path != exclude_path)
        .map(|r| (overlap(r, &reference), r))
        .filter(|(count, _)| *count >= 1)
        .collect();

    ranked.sort_by(|(a, _), (b, _)| b.cmp(a));
    ranked.into_iter().map(|(_, r)| r).collect()
}

/// Candidates named in `related_slugs`, in the order the author listed them.
/// Slugs without a candidate are skipped.
pub fn explicit_related<'a, I>(candidates: I, related_slugs: &[String]) -> Vec<&'a ContentRecord>
    where
        I: IntoIterator<Item=&'a ContentRecord>,
{
    let position = |slug: &str| related_slugs.iter().position(|s| s == slug);

    let mut related: Vec<(usize, &'a ContentRecord)> = candidates.into_iter()
        .filter_map(|r| position(&r.slug).map(|pos| (pos, r)))
        .collect();

    related.sort_by_key(|(pos, _)| *pos);
    related.into_iter().map(|(_, r)| r).collect()
}

/// Url of the live post called `slug`.
pub fn resolve_post_url<'a, I>(posts: I, slug: &str) -> Result<&'a str, DeriveError>
    where
        I: IntoIterator<Item=&'a ContentRecord>,
{
    posts.into_iter()
        .find(|r| r.slug == slug)
        .map(|r| r.url.as_str())
        .ok_or_else(|| DeriveError::UnknownSlug(slug.to_string()))
}

/// The named collections the templates see.
pub struct Collections<'a> {
    /// Live posts, oldest first
    pub posts: Vec<&'a ContentRecord>,
    pub drafts: Vec<&'a ContentRecord>,
    pub tags: Vec<String>,
    pub featured: Vec<&'a ContentRecord>,
    pub mode: BuildMode,
}

impl<'a> Collections<'a> {
    pub fn build(records: &'a [ContentRecord], now: DateTime<Utc>, mode: BuildMode) -> Self {
        let all_posts: Vec<&ContentRecord> = records.iter()
            .filter(|r| r.bucket == Bucket::Posts)
            .collect();

        let mut posts = live_subset(all_posts.iter().copied(), now, mode);
        posts.sort_by_key(|r| r.publish_date);

        let drafts: Vec<&ContentRecord> = records.iter()
            .filter(|r| r.bucket == Bucket::Drafts)
            .collect();

        // Drafts get pages in development, so their tags need pages too
        let tag_sources: Vec<&ContentRecord> = match mode {
            BuildMode::Development => records.iter().collect(),
            BuildMode::Production => all_posts,
        };
        let tags = tag_universe(tag_sources, now, mode);
        let featured = featured_subset(posts.iter().copied());

        Collections {
            posts,
            drafts,
            tags,
            featured,
            mode,
        }
    }

    /// Drafts that get a page of their own, none in production.
    pub fn rendered_drafts(&self) -> &[&'a ContentRecord] {
        match self.mode {
            BuildMode::Development => &self.drafts,
            BuildMode::Production => &[],
        }
    }

    pub fn drafts_with_tag(&self, tag: &str) -> Vec<&'a ContentRecord> {
        self.rendered_drafts()
            .iter()
            .copied()
            .filter(|r| r.tags.iter().any(|t| t == tag))
            .collect()
    }

    pub fn posts_with_tag(&self, tag: &str) -> Vec<&'a ContentRecord> {
        self.posts.iter()
            .copied()
            .filter(|r| r.tags.iter().any(|t| t == tag))
            .collect()
    }

    /// Curated `similar` posts when the record lists any, tag overlap otherwise.
    pub fn similar_to(&self, record: &ContentRecord) -> Vec<&'a ContentRecord> {
        if record.related_slugs.is_empty() {
            similarity_ranked(self.posts.iter().copied(), &record.input_path, &record.tags)
        } else {
            explicit_related(self.posts.iter().copied(), &record.related_slugs)
        }
    }

    pub fn post_url(&self, slug: &str) -> Result<&'a str, DeriveError> {
        resolve_post_url(self.posts.iter().copied(), slug)
    }
}
