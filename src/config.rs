//! Project configuration. A blog is a directory tree with an
//! `orgblog.yaml` project file at its root, a `posts/` directory holding
//! the content files and `posts-index.json`, and a `theme/` directory
//! holding `theme.yaml` plus the template files it names. [`Config`] is the
//! resolved form: absolute paths and joined URLs, ready for the build.

use crate::util::{self, OpenError};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

pub const PROJECT_FILE: &str = "orgblog.yaml";

#[derive(Deserialize)]
struct PageSize(usize);
impl Default for PageSize {
    fn default() -> Self {
        PageSize(10)
    }
}

/// The raw project file.
#[derive(Deserialize)]
struct Project {
    title: String,
    site_root: Url,

    #[serde(default)]
    home_page: String,

    #[serde(default)]
    index_page_size: PageSize,
}

/// The raw theme manifest. Each template is a chain of files concatenated
/// in order before parsing, so themes can share a base layout.
#[derive(Deserialize)]
struct Theme {
    index_template: Vec<PathBuf>,
    posts_template: Vec<PathBuf>,
}

pub struct Config {
    /// The site title, appended to post titles for document-title metadata.
    pub title: String,
    pub home_page: Url,
    pub posts_source_directory: PathBuf,
    pub index_file: PathBuf,
    pub index_url: Url,
    pub index_template: Vec<PathBuf>,
    pub index_output_directory: PathBuf,
    pub index_page_size: usize,
    pub posts_url: Url,
    pub posts_template: Vec<PathBuf>,
    pub posts_output_directory: PathBuf,
    pub root_output_directory: PathBuf,
}

impl Config {
    /// Finds `orgblog.yaml` in `dir` or the nearest ancestor directory and
    /// loads the configuration from it.
    pub fn from_directory(dir: &Path, output_directory: &Path) -> Result<Config, Error> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path, output_directory)
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, output_directory),
                None => Err(Error::ProjectFileNotFound),
            }
        }
    }

    pub fn from_project_file(path: &Path, output_directory: &Path) -> Result<Config, Error> {
        let project: Project = serde_yaml::from_reader(util::open(path, "project")?)
            .map_err(|err| Error::ParseYaml {
                path: path.to_owned(),
                err,
            })?;
        let project_root = path.parent().ok_or_else(|| Error::NoParent(path.to_owned()))?;

        let theme_dir = project_root.join("theme");
        let theme_path = theme_dir.join("theme.yaml");
        let theme: Theme = serde_yaml::from_reader(util::open(&theme_path, "theme")?)
            .map_err(|err| Error::ParseYaml {
                path: theme_path,
                err,
            })?;

        let site_root = with_trailing_slash(&project.site_root)?;
        let posts_source_directory = project_root.join("posts");
        Ok(Config {
            title: project.title,
            home_page: site_root.join(&project.home_page)?,
            index_file: posts_source_directory.join("posts-index.json"),
            posts_source_directory,
            index_url: site_root.join("pages/")?,
            posts_url: site_root.join("posts/")?,
            index_template: theme
                .index_template
                .iter()
                .map(|relpath| theme_dir.join(relpath))
                .collect(),
            posts_template: theme
                .posts_template
                .iter()
                .map(|relpath| theme_dir.join(relpath))
                .collect(),
            index_output_directory: output_directory.join("pages"),
            posts_output_directory: output_directory.join("posts"),
            root_output_directory: output_directory.to_owned(),
            index_page_size: project.index_page_size.0,
        })
    }
}

/// URL joins treat a base without a trailing slash as a file, so the slash
/// has to be there before joining `pages/` and `posts/` onto the root.
fn with_trailing_slash(url: &Url) -> Result<Url, url::ParseError> {
    if url.path().ends_with('/') {
        return Ok(url.clone());
    }
    Url::parse(&format!("{}/", url))
}

/// Represents a problem locating or parsing the project configuration.
#[derive(Debug)]
pub enum Error {
    /// No `orgblog.yaml` in the starting directory or any ancestor.
    ProjectFileNotFound,

    /// The project file path has no parent directory.
    NoParent(PathBuf),

    /// Returned for I/O problems opening the project or theme file.
    Open(OpenError),

    /// Returned for YAML problems in the project or theme file.
    ParseYaml {
        path: PathBuf,
        err: serde_yaml::Error,
    },

    /// Returned when the configured URLs can't be joined.
    Url(url::ParseError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ProjectFileNotFound => write!(
                f,
                "Could not find `{}` in the current directory or any parent directory",
                PROJECT_FILE
            ),
            Error::NoParent(path) => write!(
                f,
                "Can't get parent directory for provided project file path `{}`",
                path.display()
            ),
            Error::Open(err) => err.fmt(f),
            Error::ParseYaml { path, err } => {
                write!(f, "Parsing `{}`: {}", path.display(), err)
            }
            Error::Url(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ProjectFileNotFound => None,
            Error::NoParent(_) => None,
            Error::Open(err) => Some(err),
            Error::ParseYaml { path: _, err } => Some(err),
            Error::Url(err) => Some(err),
        }
    }
}

impl From<OpenError> for Error {
    fn from(err: OpenError) -> Error {
        Error::Open(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        Error::Url(err)
    }
}
