use crate::series::Series;
use crate::value;
use gtmpl::{Template, Value};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// Responsible for templating and writing series pages to disk.
pub struct Writer<'a> {
    /// The template for series pages.
    pub series_template: &'a Template,

    /// The base URL for series pages. The page for a series is located at
    /// `{series_base_url}/{slug}.html`.
    pub series_base_url: &'a Url,

    /// The directory in which the series HTML files will be written, as
    /// `{series_output_directory}/{slug}.html`.
    pub series_output_directory: &'a Path,

    /// The site's title, made available to the template.
    pub site_title: &'a str,

    /// The URL for the site's home page. This is made available to the
    /// template, typically as the destination for the site-header link.
    pub home_page: &'a Url,

    /// The URL for the static assets. This is made available to the template,
    /// typically for the theme's stylesheet and client script.
    pub static_url: &'a Url,
}

impl Writer<'_> {
    /// Takes a single [`Page`] and templates it in memory.
    fn render_page(&self, page: &Page) -> Result<Rendered> {
        let mut value = page.to_value();
        if let Value::Object(obj) = &mut value {
            obj.insert(
                "site_title".to_owned(),
                Value::String(self.site_title.to_owned()),
            );
            obj.insert("home_page".to_owned(), value::from_url(self.home_page));
            obj.insert("static_url".to_owned(), value::from_url(self.static_url));
        }
        let mut contents = Vec::new();
        page.template
            .execute(&mut contents, &gtmpl::Context::from(value)?)?;
        Ok(Rendered {
            file_path: page.file_path.clone(),
            contents,
        })
    }

    /// Templates one page per series without touching the disk. Any template
    /// error surfaces here, before old output is removed.
    pub fn render_series(&self, series: &[Series]) -> Result<Vec<Rendered>> {
        pages(
            series,
            self.series_base_url,
            self.series_output_directory,
            self.series_template,
        )?
        .iter()
        .map(|page| self.render_page(page))
        .collect()
    }

    /// Writes rendered pages and returns how many were written. The output
    /// directory is created even when there are none.
    pub fn write_rendered(&self, rendered: &[Rendered]) -> Result<usize> {
        std::fs::create_dir_all(self.series_output_directory)?;
        for page in rendered {
            std::fs::write(&page.file_path, &page.contents)?;
            debug!(path = %page.file_path.display(), "wrote series page");
        }
        Ok(rendered.len())
    }

    /// Renders and writes one page per series and returns the number of pages
    /// written.
    pub fn write_series(&self, series: &[Series]) -> Result<usize> {
        let rendered = self.render_series(series)?;
        self.write_rendered(&rendered)
    }
}

/// A templated series page waiting to be written.
#[derive(Debug)]
pub struct Rendered {
    file_path: PathBuf,
    contents: Vec<u8>,
}

/// An object representing an output HTML file. A [`Page`] can be converted to a
/// [`Value`] and thus rendered in a template via [`Page::to_value`].
struct Page<'a> {
    /// The series data for the page.
    item: Value,

    /// The page title; the series name.
    title: String,

    /// The target location on disk for the output file.
    file_path: PathBuf,

    /// The URL for the previous series' page, if any.
    prev: Option<Url>,

    /// The URL for the next series' page, if any.
    next: Option<Url>,

    /// The template with which the page will be rendered.
    template: &'a Template,
}

impl Page<'_> {
    /// Converts a [`Page`] into a [`Value`]. The result is a [`Value::Object`]
    /// with fields `series`, `title`, `prev`, and `next` (see [`Page`] for
    /// descriptions).
    fn to_value(&self) -> Value {
        use std::collections::HashMap;

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("series".to_owned(), self.item.clone());
        m.insert("title".to_owned(), Value::String(self.title.clone()));
        m.insert("prev".to_owned(), value::from_optional_url(self.prev.as_ref()));
        m.insert("next".to_owned(), value::from_optional_url(self.next.as_ref()));
        Value::Object(m)
    }
}

/// Creates the [`Page`]s for a list of [`Series`], in data-file order. `prev`
/// and `next` link neighbouring series.
fn pages<'a>(
    series: &[Series],
    base_url: &Url,
    output_directory: &Path,
    template: &'a Template,
) -> Result<Vec<Page<'a>>> {
    let urls = series
        .iter()
        .map(|s| page_url(base_url, &s.slug()))
        .collect::<Result<Vec<Url>>>()?;

    Ok(series
        .iter()
        .enumerate()
        .map(|(i, s)| Page {
            item: s.to_value(&urls[i]),
            title: s.name.clone(),
            file_path: output_directory.join(format!("{}.html", s.slug())),
            prev: match i {
                0 => None,
                _ => Some(urls[i - 1].clone()),
            },
            next: urls.get(i + 1).cloned(),
            template,
        })
        .collect())
}

/// Builds `{base_url}/{slug}.html`, percent-encoding the slug as a single
/// path segment (slugs keep characters like `#` and `?`).
fn page_url(base_url: &Url, slug: &str) -> Result<Url> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|_| Error::CannotBeABase(base_url.clone()))?
        .pop_if_empty()
        .push(&format!("{}.html", slug));
    Ok(url)
}

/// The result of a fallible page-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(String),

    /// Returned when the series base URL can't have paths appended.
    CannotBeABase(Url),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::CannotBeABase(url) => write!(f, "'{}' can't be a base URL", url),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::CannotBeABase(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}
