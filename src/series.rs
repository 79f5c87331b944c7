//! Defines the [`Series`] type and the logic for loading series records from
//! the site's data file. See [`Series::to_value`] for how a series is exposed
//! to the series template.

use crate::markdown;
use crate::value;
use gtmpl_value::Value;
use serde::Deserialize;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};
use url::Url;

/// A named group of posts. Besides `name`, a record may carry any fields; they
/// are handed to the template untouched.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Series {
    /// The display name, also the source of the slug.
    pub name: String,

    /// Every other field of the record.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_yaml::Value>,
}

impl Series {
    /// The series' identity and output file stem. See [`slugify`].
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }

    /// Converts the series into a template [`Value::Object`] holding every
    /// attribute plus `name`, `slug`, `url`, and `description_html`. The last
    /// is the Markdown rendering of a string `description`, or empty when the
    /// record has none, so templates can print it or test it with `{{ if }}`
    /// either way.
    pub fn to_value(&self, url: &Url) -> Value {
        let mut m: HashMap<String, Value> = self
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), value::from_yaml(v)))
            .collect();
        let description_html = match self.attributes.get("description") {
            Some(serde_yaml::Value::String(description)) => {
                Value::String(markdown::to_html(description))
            }
            _ => Value::String(String::new()),
        };
        m.insert("description_html".to_owned(), description_html);
        m.insert("name".to_owned(), Value::String(self.name.clone()));
        m.insert("slug".to_owned(), Value::String(self.slug()));
        m.insert("url".to_owned(), value::from_url(url));
        Value::Object(m)
    }
}

/// Replaces each run of ASCII whitespace in `name` with a single hyphen and
/// lower-cases the result. Nothing is trimmed or stripped, so `C# Tips`
/// becomes `c#-tips` and ` Foo ` becomes `-foo-`. Other whitespace, such as a
/// no-break space, is kept as-is.
pub fn slugify(name: &str) -> String {
    whitespace_regex().replace_all(name, "-").to_lowercase()
}

fn whitespace_regex() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"[ \t\r\n\x0B\x0C]+").unwrap())
}

/// Loads the series list from the YAML file at `path`. The file must hold a
/// sequence of mappings, each with a string `name`:
///
/// ```yaml
/// - name: Rust Basics
///   description: Getting started with *Rust*.
/// - name: Open Learning
/// ```
///
/// A missing file, an empty file, or an empty/null document yields no series.
pub fn load(path: &Path) -> Result<Vec<Series>> {
    if !path.exists() {
        info!(path = %path.display(), "no series data file; no series pages");
        return Ok(Vec::new());
    }

    let contents = std::fs::read_to_string(path).map_err(|err| Error::Read {
        path: path.to_owned(),
        err,
    })?;
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    let series: Option<Vec<Series>> = serde_yaml::from_str(&contents)?;
    let series = series.unwrap_or_default();
    debug!(path = %path.display(), count = series.len(), "loaded series");
    Ok(series)
}

/// Verifies that every series has a usable slug and that no two series share
/// one.
pub fn check_slugs(series: &[Series]) -> Result<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for s in series {
        let slug = s.slug();
        if slug.is_empty() || slug.contains('/') || slug.contains('\\') || slug == "." || slug == ".." {
            return Err(Error::InvalidSlug {
                name: s.name.clone(),
                slug,
            });
        }
        if let Some(first) = seen.insert(slug.clone(), &s.name) {
            return Err(Error::DuplicateSlug {
                slug,
                first: first.to_owned(),
                second: s.name.clone(),
            });
        }
    }
    Ok(())
}

/// The result of a fallible series operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading or validating series.
#[derive(Debug)]
pub enum Error {
    /// Returned when the data file exists but can't be read.
    Read { path: PathBuf, err: std::io::Error },

    /// Returned when the data file isn't a list of series records.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when two series normalize to the same slug.
    DuplicateSlug {
        slug: String,
        first: String,
        second: String,
    },

    /// Returned when a name normalizes to a slug that can't be a file name.
    InvalidSlug { name: String, slug: String },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Read { path, err } => {
                write!(f, "Reading series data file '{}': {}", path.display(), err)
            }
            Error::DeserializeYaml(err) => write!(f, "Parsing series data: {}", err),
            Error::DuplicateSlug {
                slug,
                first,
                second,
            } => write!(
                f,
                "Series `{}` and `{}` both map to the page `{}.html`",
                first, second, slug
            ),
            Error::InvalidSlug { name, slug } => {
                write!(f, "Series `{}` has unusable slug `{}`", name, slug)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read { path: _, err } => Some(err),
            Error::DeserializeYaml(err) => Some(err),
            Error::DuplicateSlug { .. } => None,
            Error::InvalidSlug { .. } => None,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}
