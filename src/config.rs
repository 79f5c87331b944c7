use crate::controller::Settings;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "bilingo.yaml";

fn default_data_file() -> PathBuf {
    PathBuf::from("_data/series.yaml")
}

fn default_home_page() -> String {
    String::from("index.html")
}

#[derive(Deserialize)]
struct Project {
    pub site_root: Url,

    #[serde(default = "default_home_page")]
    pub home_page: String,

    #[serde(default)]
    pub title: String,

    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    #[serde(default)]
    pub language: Settings,
}

#[derive(Deserialize)]
struct Theme {
    series_template: Vec<PathBuf>,
}

pub struct Config {
    pub title: String,
    pub home_page: Url,
    pub series_data_file: PathBuf,
    pub series_url: Url,
    pub series_template: Vec<PathBuf>,
    pub series_output_directory: PathBuf,
    pub static_url: Url,
    pub static_source_directory: PathBuf,
    pub static_output_directory: PathBuf,
    pub language: Settings,
}

impl Config {
    /// Searches `dir` and then each of its ancestors for a project file and
    /// loads the first one found.
    pub fn from_directory(dir: &Path, output_directory: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            match Config::from_project_file(&path, output_directory) {
                Ok(config) => Ok(config),
                Err(e) => Err(anyhow!("Loading configuration: {:?}", e)),
            }
        } else {
            match dir.parent() {
                Some(dir) => Config::from_directory(dir, output_directory),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(path: &Path, output_directory: &Path) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => {
                let theme_dir = project_root.join("theme");
                let theme_file = open(&theme_dir.join("theme.yaml"), "theme")?;
                let theme: Theme = serde_yaml::from_reader(theme_file)?;
                let site_root = with_trailing_slash(project.site_root);
                Ok(Config {
                    title: project.title,
                    home_page: site_root.join(&project.home_page)?,
                    series_data_file: project_root.join(&project.data_file),
                    series_url: site_root.join("series/")?,
                    series_template: theme
                        .series_template
                        .iter()
                        .map(|relpath| theme_dir.join(relpath))
                        .collect(),
                    series_output_directory: output_directory.join("series"),
                    static_url: site_root.join("static/")?,
                    static_source_directory: theme_dir.join("static"),
                    static_output_directory: output_directory.join("static"),
                    language: project.language,
                })
            }
        }
    }
}

fn open(path: &Path, kind: &str) -> Result<File> {
    File::open(path).with_context(|| format!("Opening {} file `{}`", kind, path.display()))
}

// `Url::join` treats the last segment of a base without a trailing slash as a
// file name and drops it, so `https://example.org/blog` must become
// `https://example.org/blog/` before joining.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
