//! Defines the [`Language`] type and the path conventions for bilingual
//! pages (e.g., `/aboutme-en.html` is the English sibling of
//! `/aboutme-vi.html`).

use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// One of the two languages the site is written in. There is no third state:
/// anything that isn't a known code is rejected by [`Language::from_str`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Language {
    Vi,
    En,
}

impl Language {
    /// The language assumed for untagged posts and when no preference has
    /// been recorded.
    pub const DEFAULT: Language = Language::Vi;

    /// The lower-case code used in attributes, storage, and paths.
    pub fn code(self) -> &'static str {
        match self {
            Language::Vi => "vi",
            Language::En => "en",
        }
    }

    /// The upper-case label shown by the language switcher.
    pub fn label(self) -> &'static str {
        match self {
            Language::Vi => "VI",
            Language::En => "EN",
        }
    }

    /// The other language.
    pub fn other(self) -> Language {
        match self {
            Language::Vi => Language::En,
            Language::En => Language::Vi,
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::DEFAULT
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vi" => Ok(Language::Vi),
            "en" => Ok(Language::En),
            _ => Err(UnknownLanguage(s.to_owned())),
        }
    }
}

impl std::convert::TryFrom<String> for Language {
    type Error = UnknownLanguage;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Returned when a string isn't one of the known language codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLanguage(pub String);

impl fmt::Display for UnknownLanguage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown language code `{}`", self.0)
    }
}

impl std::error::Error for UnknownLanguage {}

fn suffix_regex() -> &'static Regex {
    static SUFFIX: OnceLock<Regex> = OnceLock::new();
    // literal pattern; should never fail
    SUFFIX.get_or_init(|| Regex::new(r"-([A-Za-z]{2})\.html$").unwrap())
}

/// Parses the language suffix from a page path, e.g. `/aboutme-en.html`
/// yields [`Language::En`]. Paths without a recognized suffix yield `None`.
pub fn from_path(path: &str) -> Option<Language> {
    suffix_regex()
        .captures(path)
        .and_then(|caps| caps.get(1))
        .and_then(|code| code.as_str().parse().ok())
}

/// Returns the path of the `lang` version of a bilingual single page, or
/// `None` if `path` isn't one of `pages`.
///
/// Both the suffixed form (`/aboutme-vi.html`) and the bare form
/// (`/aboutme.html`, `/aboutme/`) are recognized.
pub fn sibling_path<S: AsRef<str>>(path: &str, pages: &[S], lang: Language) -> Option<String> {
    let (dir, file) = match path.trim_end_matches('/').rfind('/') {
        Some(i) => (&path[..=i], path[i + 1..].trim_end_matches('/')),
        None => ("", path.trim_end_matches('/')),
    };
    let stem = file.trim_end_matches(".html");
    let base = match from_path(file) {
        Some(current) => {
            let suffix = format!("-{}", current.code());
            stem.strip_suffix(suffix.as_str()).unwrap_or(stem)
        }
        None => stem,
    };

    if pages.iter().any(|page| page.as_ref() == base) {
        Some(format!("{}{}-{}.html", dir, base, lang.code()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGES: &[&str] = &["aboutme", "openlearning"];

    #[test]
    fn test_parse_codes() {
        assert_eq!(Ok(Language::En), "en".parse());
        assert_eq!(Ok(Language::Vi), "VI".parse());
        assert_eq!(
            Err(UnknownLanguage("fr".to_owned())),
            "fr".parse::<Language>()
        );
    }

    #[test]
    fn test_from_path() {
        assert_eq!(Some(Language::En), from_path("/aboutme-en.html"));
        assert_eq!(Some(Language::Vi), from_path("/posts/2021/hello-vi.html"));
        assert_eq!(None, from_path("/aboutme-fr.html"));
        assert_eq!(None, from_path("/aboutme.html"));
        assert_eq!(None, from_path("/page2/"));
    }

    #[test]
    fn test_sibling_path_suffixed() {
        assert_eq!(
            Some("/aboutme-en.html".to_owned()),
            sibling_path("/aboutme-vi.html", PAGES, Language::En)
        );
        assert_eq!(
            Some("/blog/openlearning-vi.html".to_owned()),
            sibling_path("/blog/openlearning-en.html", PAGES, Language::Vi)
        );
    }

    #[test]
    fn test_sibling_path_bare() {
        assert_eq!(
            Some("/aboutme-en.html".to_owned()),
            sibling_path("/aboutme.html", PAGES, Language::En)
        );
        assert_eq!(
            Some("/aboutme-vi.html".to_owned()),
            sibling_path("/aboutme/", PAGES, Language::Vi)
        );
    }

    #[test]
    fn test_sibling_path_other_pages() {
        assert_eq!(None, sibling_path("/index.html", PAGES, Language::En));
        assert_eq!(None, sibling_path("/posts/hello-en.html", PAGES, Language::Vi));
    }
}
