//! Resolves pagination hrefs into absolute, same-origin URLs suitable for
//! probing.

use std::fmt;
use url::{ParseError, Url};

/// Resolves `href` relative to the page at `base`. Absolute hrefs are
/// normalized (e.g., `https://example.org/a/../b/` becomes
/// `https://example.org/b/`); either way, the result must share `base`'s
/// origin.
pub fn resolve(base: &Url, href: &str) -> Result<Url> {
    let href = href.trim();
    if href.is_empty() {
        return Err(Error::Empty);
    }

    let absolute = match Url::parse(href) {
        Ok(absolute) => absolute,
        Err(ParseError::RelativeUrlWithoutBase) => base.join(href)?,
        Err(e) => return Err(Error::Parse(e)),
    };

    if absolute.origin() == base.origin() {
        Ok(absolute)
    } else {
        Err(Error::CrossOrigin(absolute))
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents an href that can't be probed.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// Returned for blank hrefs.
    Empty,

    /// Returned when the href isn't a valid URL.
    Parse(ParseError),

    /// Returned when the href points at another origin.
    CrossOrigin(Url),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Empty => write!(f, "empty href"),
            Error::Parse(err) => err.fmt(f),
            Error::CrossOrigin(url) => write!(f, "cross-origin href `{}`", url),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseError> for Error {
    /// Converts a [`ParseError`] into an [`Error`] so `?` works on
    /// [`Url::join`].
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_resolve_root_relative() {
        fixture("https://example.org/index.html", "/index.html");
    }

    #[test]
    fn test_resolve_relative() {
        fixture("https://example.org/page3/", "../page3/");
    }

    #[test]
    fn test_resolve_relative_leading_dotslash() {
        fixture("https://example.org/page2/page3/", "./page3/");
    }

    #[test]
    fn test_resolve_absolute_redundancies() {
        fixture(
            "https://example.org/page3/",
            "https://example.org/page2/../page3/",
        );
    }

    #[test]
    fn test_resolve_cross_origin() {
        assert!(matches!(
            resolve(&base(), "https://elsewhere.org/page3/"),
            Err(Error::CrossOrigin(_))
        ));
    }

    #[test]
    fn test_resolve_other_scheme() {
        assert!(matches!(
            resolve(&base(), "http://example.org/page3/"),
            Err(Error::CrossOrigin(_))
        ));
    }

    #[test]
    fn test_resolve_empty() {
        assert_eq!(Err(Error::Empty), resolve(&base(), "  "));
    }

    #[test]
    fn test_resolve_malformed() {
        assert!(matches!(
            resolve(&base(), "https://exa mple.org/"),
            Err(Error::Parse(_))
        ));
    }

    fn base() -> Url {
        Url::parse("https://example.org/page2/").unwrap()
    }

    fn fixture(wanted: &str, href: &str) {
        assert_eq!(wanted, resolve(&base(), href).unwrap().as_str());
    }
}
