use std::io::ErrorKind;
use std::path::PathBuf;
use std::{env, fs, io};

use serde::Deserialize;

use crate::util::toml_date::TomlDate;

#[derive(Deserialize, Debug)]
pub struct Paths {
    /// Root of the sources, posts and drafts live below it
    pub content_dir: PathBuf,
    #[serde(default = "default_posts_dir")]
    pub posts_dir: PathBuf,
    #[serde(default = "default_drafts_dir")]
    pub drafts_dir: PathBuf,
    pub template_dir: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Deserialize, Debug)]
pub struct Defaults {
    pub page_size: u32,
    #[serde(default = "default_similar_count")]
    pub similar_count: usize,
    #[serde(default = "default_summary_tag")]
    pub summary_tag: String,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

#[derive(Deserialize, Default, Debug)]
pub struct Build {
    /// Pins "now" for reproducible builds
    pub now: Option<TomlDate>,
}

#[derive(Deserialize, Debug)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone, Debug, PartialEq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Debug)]
pub struct RssFeed {
    pub title: String,
    pub site_url: String,
    pub description: String,
    pub page_size: u32,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub paths: Paths,
    pub defaults: Defaults,
    #[serde(default)]
    pub build: Build,
    pub log: Option<Log>,
    pub rss_feed: Option<RssFeed>,
}

impl Paths {
    pub fn posts_root(&self) -> PathBuf {
        self.content_dir.join(&self.posts_dir)
    }

    pub fn drafts_root(&self) -> PathBuf {
        self.content_dir.join(&self.drafts_dir)
    }
}

fn default_posts_dir() -> PathBuf {
    PathBuf::from("posts")
}

fn default_drafts_dir() -> PathBuf {
    PathBuf::from("drafts")
}

fn default_similar_count() -> usize {
    3
}

fn default_summary_tag() -> String {
    "<!-- more -->".to_string()
}

fn default_date_format() -> String {
    "%B %-d, %Y".to_string()
}

fn parse_path(path: PathBuf) -> io::Result<PathBuf> {
    if path.starts_with("${exe_dir}") {
        let cur_exe = env::current_exe()?;
        let exe_dir = cur_exe.parent()
            .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "Executable has no parent directory"))?;
        let rest = path.strip_prefix("${exe_dir}")
            .map_err(|e| io::Error::new(ErrorKind::InvalidInput, e.to_string()))?;
        Ok(exe_dir.join(rest))
    } else {
        Ok(path)
    }
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    if cfg.defaults.page_size == 0 {
        return Err(io::Error::new(ErrorKind::InvalidData, "defaults.page_size has to be greater than 0"));
    }

    cfg.paths = Paths {
        content_dir: parse_path(cfg.paths.content_dir)?,
        posts_dir: cfg.paths.posts_dir,
        drafts_dir: cfg.paths.drafts_dir,
        template_dir: parse_path(cfg.paths.template_dir)?,
        output_dir: parse_path(cfg.paths.output_dir)?,
    };

    Ok(cfg)
}

pub fn read_config(cfg_path: &PathBuf) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    const FULL_CONFIG: &str = r#"
[paths]
content_dir = "src"
drafts_dir = "wip"
template_dir = "res/template"
output_dir = "dist"

[defaults]
page_size = 10
similar_count = 5

[build]
now = 2024-01-01

[log]
level = "Debug"
log_to_console = true

[rss_feed]
title = "My blog"
site_url = "https://example.com"
description = "Posts about Python"
page_size = 20
"#;

    #[test]
    fn test_full_config() {
        let cfg = parse_config(FULL_CONFIG).unwrap();
        assert_eq!(cfg.paths.posts_root(), PathBuf::from("src/posts"));
        assert_eq!(cfg.paths.drafts_root(), PathBuf::from("src/wip"));
        assert_eq!(cfg.defaults.similar_count, 5);
        assert_eq!(cfg.defaults.summary_tag, "<!-- more -->");
        assert_eq!(cfg.build.now, Some(TomlDate(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())));
        assert_eq!(cfg.log.unwrap().level, LogLevel::Debug);
        assert_eq!(cfg.rss_feed.unwrap().page_size, 20);
    }

    #[test]
    fn test_minimal_config() {
        let cfg = parse_config(r#"
[paths]
content_dir = "src"
template_dir = "template"
output_dir = "dist"

[defaults]
page_size = 3
"#).unwrap();
        assert_eq!(cfg.defaults.similar_count, 3);
        assert!(cfg.build.now.is_none());
        assert!(cfg.log.is_none());
        assert!(cfg.rss_feed.is_none());
    }

    #[test]
    fn test_exe_dir_expansion() {
        let path = parse_path(PathBuf::from("${exe_dir}/template")).unwrap();
        let exe_dir = env::current_exe().unwrap().parent().unwrap().to_path_buf();
        assert_eq!(path, exe_dir.join("template"));
    }

    #[test]
    fn test_invalid_config() {
        let err = parse_config("[paths]\ncontent_dir = 1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert!(err.to_string().starts_with("Error parsing configuration file"));

        let err = parse_config(r#"
[paths]
content_dir = "src"
template_dir = "template"
output_dir = "dist"

[defaults]
page_size = 0
"#).unwrap_err();
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn test_missing_config_file() {
        let err = read_config(&PathBuf::from("does/not/exist.toml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
