//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the series pages: loading the series data
//! ([`crate::series`]), rendering one page per series ([`crate::write`]), and
//! copying the theme's static assets (stylesheets and the client script) into
//! the output directory.

use crate::config::Config;
use crate::series::{self, Error as SeriesError};
use crate::write::{Error as WriteError, Writer};
use gtmpl::Template;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// Builds the series pages from a [`Config`] object and returns the number of
/// pages written. This calls into [`series::load`],
/// [`Writer::render_series`] and [`Writer::write_rendered`], which do the
/// heavy-lifting. Pages are rendered before the old output is removed.
pub fn build_site(config: &Config) -> Result<usize> {
    let all = series::load(&config.series_data_file)?;
    series::check_slugs(&all)?;

    // Parse the template files.
    let series_template = parse_template(config.series_template.iter())?;

    let writer = Writer {
        series_template: &series_template,
        series_base_url: &config.series_url,
        series_output_directory: &config.series_output_directory,
        site_title: &config.title,
        home_page: &config.home_page,
        static_url: &config.static_url,
    };
    // Render everything first so a template error leaves the old output alone.
    let rendered = writer.render_series(&all)?;

    // Blow away the old output directories so we don't have any collisions.
    // Only the directories we own are removed, never the root output
    // directory.
    rmdir(&config.series_output_directory)?;
    rmdir(&config.static_output_directory)?;

    let written = writer.write_rendered(&rendered)?;
    info!(
        pages = written,
        directory = %config.series_output_directory.display(),
        "wrote series pages"
    );

    if config.static_source_directory.is_dir() {
        let copied = copy_dir(
            &config.static_source_directory,
            &config.static_output_directory,
        )?;
        info!(files = copied, "copied static assets");
    }

    Ok(written)
}

// Copies every file under `src` into the same relative location under `dst`
// and returns the number of files copied.
fn copy_dir(src: &Path, dst: &Path) -> Result<usize> {
    use walkdir::WalkDir;

    let mut copied = 0;
    for result in WalkDir::new(src) {
        let entry = result?;
        // `src` is an ancestor of every entry
        let relative = match entry.path().strip_prefix(src) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

// Loads the template file contents, concatenates them in order, and parses
// the result into a template.
fn parse_template<P: AsRef<Path>>(template_files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        use std::io::Read;
        let template_file = template_file.as_ref();
        File::open(&template_file)
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?
            .read_to_string(&mut contents)?;
        contents.push(' ');
    }

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during loading series,
/// writing, cleaning output directories, parsing template files, and other
/// I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading or validating series.
    Series(SeriesError),

    /// Returned for errors writing series pages to disk as HTML files.
    Write(WriteError),

    /// Returned for I/O problems while cleaning output directories.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for errors walking the static directory.
    WalkDir(walkdir::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Series(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Series(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::WalkDir(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<SeriesError> for Error {
    /// Converts [`SeriesError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: SeriesError) -> Error {
        Error::Series(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Settings;
    use url::Url;

    fn config(root: &Path) -> Config {
        let site_root = Url::parse("https://example.org/").unwrap();
        let out = root.join("_site");
        Config {
            title: "Blog".to_owned(),
            home_page: site_root.clone(),
            series_data_file: root.join("_data").join("series.yaml"),
            series_url: site_root.join("series/").unwrap(),
            series_template: vec![root.join("theme").join("series.html")],
            series_output_directory: out.join("series"),
            static_url: site_root.join("static/").unwrap(),
            static_source_directory: root.join("theme").join("static"),
            static_output_directory: out.join("static"),
            language: Settings::default(),
        }
    }

    fn write(path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_build_site() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        write(
            &config.series_data_file,
            "- name: Rust Basics\n  description: A *short* intro.\n- name: Open Learning\n",
        );
        write(
            &config.series_template[0],
            "<h1>{{ .title }}</h1>{{ .series.description_html }}",
        );
        write(
            &config.static_source_directory.join("js").join("main.js"),
            "// client script",
        );
        write(&config.series_output_directory.join("stale.html"), "old");

        assert_eq!(2, build_site(&config).unwrap());

        let page =
            std::fs::read_to_string(config.series_output_directory.join("rust-basics.html"))
                .unwrap();
        assert!(page.starts_with("<h1>Rust Basics</h1><p>A <em>short</em> intro.</p>"));
        assert_eq!(
            "<h1>Open Learning</h1>",
            std::fs::read_to_string(config.series_output_directory.join("open-learning.html"))
                .unwrap()
        );
        assert!(!config.series_output_directory.join("stale.html").exists());
        assert!(config.static_output_directory.join("js").join("main.js").is_file());
    }

    #[test]
    fn test_build_site_without_data() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        write(&config.series_template[0], "{{ .title }}");

        assert_eq!(0, build_site(&config).unwrap());
        assert!(config.series_output_directory.is_dir());
    }

    #[test]
    fn test_build_site_duplicate_slug() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        write(&config.series_data_file, "- name: Rust\n- name: rust\n");
        write(&config.series_template[0], "{{ .title }}");

        assert!(matches!(
            build_site(&config),
            Err(Error::Series(SeriesError::DuplicateSlug { .. }))
        ));
        assert!(!config.series_output_directory.exists());
    }

    #[test]
    fn test_build_site_template_error_keeps_old_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        write(&config.series_data_file, "- name: Rust Basics\n");
        write(&config.series_template[0], "{{ .series.no_such_field }}");
        write(&config.series_output_directory.join("rust-basics.html"), "old");
        write(&config.static_output_directory.join("site.css"), "body {}");

        assert!(matches!(build_site(&config), Err(Error::Write(_))));
        assert_eq!(
            "old",
            std::fs::read_to_string(config.series_output_directory.join("rust-basics.html"))
                .unwrap()
        );
        assert!(config.static_output_directory.join("site.css").is_file());
    }

    #[test]
    fn test_build_site_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());

        assert!(matches!(
            build_site(&config),
            Err(Error::OpenTemplateFile { .. })
        ));
    }
}
