use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use spdlog::{info, warn};

use blogkit::collection::{BuildMode, Collections};
use blogkit::logger::configure_logger;
use blogkit::site::{build_site, load_content};
use blogkit::filters::date_from_iso;

use crate::config::open_config;

mod config;

const CFG_FILE_NAME: &str = "blogkit.toml";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
enum Args {
    /// Renders the whole site into the output dir
    Build(BuildArgs),
    /// Lists the tags of the live posts
    Tags(BuildArgs),
}

#[derive(Parser, Debug)]
struct BuildArgs {
    /// Config path
    #[arg(short, long)]
    config_path: Option<String>,

    /// Build mode. Defaults to NODE_ENV, production unless it is `development`
    #[arg(short, long)]
    mode: Option<Mode>,

    /// Reference instant for publication, e.g. 2024-05-01T00:00:00Z
    #[arg(short, long)]
    now: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Dev,
    Prod,
}

impl From<Mode> for BuildMode {
    fn from(value: Mode) -> Self {
        match value {
            Mode::Dev => BuildMode::Development,
            Mode::Prod => BuildMode::Production,
        }
    }
}

struct BuildContext {
    config: blogkit::config::Config,
    mode: BuildMode,
    now: DateTime<Utc>,
}

/// Command line wins over the config file, which wins over the clock.
fn build_context(args: BuildArgs) -> Result<BuildContext> {
    let config = open_config(args.config_path.map(PathBuf::from))
        .map_err(|e| anyhow!("{}\nPlease run blogkit --help", e))?;

    if let Err(err) = configure_logger(&config) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    let mode = match args.mode {
        Some(mode) => mode.into(),
        None => BuildMode::from_env_value(env::var("NODE_ENV").ok().as_deref()),
    };

    let now = match args.now {
        Some(ref now) => date_from_iso(now)
            .ok_or_else(|| anyhow!("Invalid --now value {}, expected RFC 3339 or YYYY-MM-DD", now))?,
        None => config.build.now.as_ref().map(|d| d.0).unwrap_or_else(Utc::now),
    };

    Ok(BuildContext { config, mode, now })
}

fn main() -> Result<()> {
    match Args::parse() {
        Args::Build(args) => {
            let ctx = build_context(args)?;
            info!("Starting Blogkit =-=-=-=-=-=-=-=-=-=-=-=-=-=-=-");
            let records = load_content(&ctx.config).context("Error reading content")?;
            let report = build_site(&ctx.config, &records, ctx.now, ctx.mode).context("Error building site")?;
            println!("Built {} posts, {} drafts and {} tags into {} pages",
                report.posts, report.drafts, report.tags, report.pages_written);
        }
        Args::Tags(args) => {
            let ctx = build_context(args)?;
            let records = load_content(&ctx.config).context("Error reading content")?;
            let collections = Collections::build(&records, ctx.now, ctx.mode);
            for tag in collections.tags.iter() {
                let count = collections.posts_with_tag(tag).len() + collections.drafts_with_tag(tag).len();
                println!("{} ({})", tag, count);
            }
        }
    }
    Ok(())
}
