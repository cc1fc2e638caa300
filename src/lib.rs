pub mod config;
pub mod logger;
pub mod collection;
pub mod content;
pub mod filters;
pub mod shortcodes;
pub mod site;
pub mod paginator;
pub mod text_utils;
mod view;
pub mod util;
mod test_data;
