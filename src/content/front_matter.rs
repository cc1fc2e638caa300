use std::io;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

const DELIMITER: &str = "---";

/// Front matter keys the build cares about. Everything else is ignored.
#[derive(Deserialize, Default, Debug, PartialEq)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "only_true")]
    pub featured: bool,
    #[serde(deserialize_with = "one_or_many")]
    pub similar: Vec<String>,
    pub description: Option<String>,
    /// ISO 8601, e.g. `PT45M` for a talk recording
    pub duration: Option<String>,
}

/// Splits a document into its front matter and the remaining body.
///
/// Documents not starting with a `---` line have no front matter.
pub fn split_front_matter<'a>(file_name: &Path, raw: &'a str) -> io::Result<(FrontMatter, &'a str)> {
    let (first_line, rest) = match raw.find('\n') {
        Some(pos) => (&raw[..pos], &raw[pos + 1..]),
        None => (raw, ""),
    };
    if first_line.trim_end() != DELIMITER {
        return Ok((FrontMatter::default(), raw));
    }

    let mut pos = 0;
    let mut yaml_end = None;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            yaml_end = Some((pos, pos + line.len()));
            break;
        }
        pos += line.len();
    }

    let Some((end, body_start)) = yaml_end else {
        return Err(io::Error::new(
            ErrorKind::InvalidData,
            format!("End of front matter is missing - file={}", file_name.display()),
        ));
    };

    let yaml = &rest[..end];
    let body = rest[body_start..].trim_start_matches(['\r', '\n']);
    if yaml.trim().is_empty() {
        return Ok((FrontMatter::default(), body));
    }

    let front_matter = serde_yaml::from_str::<FrontMatter>(yaml).map_err(|e| io::Error::new(
        ErrorKind::InvalidData,
        format!("Error parsing front matter: {} - file={}", e, file_name.display()),
    ))?;

    Ok((front_matter, body))
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let items = match value {
        Value::Sequence(seq) => seq.iter().filter_map(scalar_to_string).collect(),
        other => scalar_to_string(&other).into_iter().collect(),
    };
    Ok(items)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// `featured: yes` or `featured: "true"` do not count
fn only_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(matches!(value, Value::Bool(true)))
}
