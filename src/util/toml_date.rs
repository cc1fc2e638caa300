use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::text_utils::parse_date_time;

/// A TOML date or datetime, read as UTC. `2024-04-22` is midnight.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct TomlDate(pub DateTime<Utc>);

impl<'de> Deserialize<'de> for TomlDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
    {
        use serde::de::Error;
        let value = toml::value::Datetime::deserialize(deserializer)?;
        let date = TomlDate::from_str(&value.to_string()).map_err(Error::custom)?;
        Ok(date)
    }
}

impl FromStr for TomlDate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(parse_date_time(s)?))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    pub struct Build {
        pub now: TomlDate,
    }

    #[derive(Deserialize)]
    pub struct Config {
        pub build: Build,
    }

    #[test]
    fn test_date() {
        let toml_str = r##"
[build]
now = 2024-04-22
"##;
        let cfg: Config = toml::from_str::<Config>(toml_str).unwrap();
        assert_eq!(cfg.build.now, TomlDate(Utc.with_ymd_and_hms(2024, 4, 22, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_date_time() {
        let toml_str = r##"
[build]
now = 2024-04-22T10:30:00Z
"##;
        let cfg: Config = toml::from_str::<Config>(toml_str).unwrap();
        assert_eq!(cfg.build.now, TomlDate(Utc.with_ymd_and_hms(2024, 4, 22, 10, 30, 0).unwrap()));
    }
}
