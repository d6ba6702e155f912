//! Loads the post index (`posts-index.json`), the offline-generated JSON
//! array describing each post. The index is the source of truth for which
//! posts exist; per-post metadata in it fills gaps the content files leave.

use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// One record of the post index. Everything except `filename` is optional:
/// the extractor falls back to the content file itself (and further
/// defaults) for missing fields. Unknown fields are ignored.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PostInfo {
    pub filename: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub slug: String,

    #[serde(default)]
    pub date: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub description: String,

    /// Pre-calculated reading time, e.g. "4 min read". Rendered as
    /// "~ min read" when absent.
    #[serde(default, rename = "readingTime")]
    pub reading_time: Option<String>,
}

/// Reads and deserializes the post index. A missing index file and a
/// malformed one are distinct errors so the user-facing message can say
/// whether to generate or to fix the index.
pub fn load_index(path: &Path) -> Result<Vec<PostInfo>, Error> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(Error::Missing(path.to_owned()));
        }
        Err(err) => {
            return Err(Error::Io {
                path: path.to_owned(),
                err,
            });
        }
    };
    serde_json::from_reader(file).map_err(|err| Error::Invalid {
        path: path.to_owned(),
        err,
    })
}

/// Represents a problem loading the post index.
#[derive(Debug)]
pub enum Error {
    /// The index file does not exist.
    Missing(PathBuf),

    /// The index file exists but is not a valid JSON post index.
    Invalid {
        path: PathBuf,
        err: serde_json::Error,
    },

    /// Returned for other I/O errors reading the index.
    Io { path: PathBuf, err: io::Error },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Missing(path) => write!(
                f,
                "Failed to load blog posts: the posts index `{}` was not \
                 found. Please ensure it is generated.",
                path.display()
            ),
            Error::Invalid { path, err } => write!(
                f,
                "The posts index `{}` is not a valid post index: {}",
                path.display(),
                err
            ),
            Error::Io { path, err } => {
                write!(f, "Reading posts index `{}`: {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Missing(_) => None,
            Error::Invalid { path: _, err } => Some(err),
            Error::Io { path: _, err } => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_index(contents: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let mut file = File::create(dir.path().join("posts-index.json")).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        dir
    }

    #[test]
    fn test_load_index() {
        let dir = write_index(
            r#"[
                {
                    "filename": "2023-05-01-hello.html",
                    "title": "Hello",
                    "slug": "hello",
                    "date": "2023-05-01",
                    "tags": ["org-mode", "emacs"],
                    "description": "A greeting.",
                    "readingTime": "3 min read"
                },
                {"filename": "bare.html"}
            ]"#,
        );
        let index = load_index(&dir.path().join("posts-index.json")).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index[0].title, "Hello");
        assert_eq!(index[0].tags, vec!["org-mode", "emacs"]);
        assert_eq!(index[0].reading_time.as_deref(), Some("3 min read"));
        assert_eq!(index[1].filename, "bare.html");
        assert!(index[1].date.is_empty());
        assert!(index[1].reading_time.is_none());
    }

    #[test]
    fn test_unknown_fields_tolerated() {
        let dir = write_index(r#"[{"filename": "a.html", "wordCount": 1200}]"#);
        let index = load_index(&dir.path().join("posts-index.json")).unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_missing_index() {
        let dir = tempfile::tempdir().unwrap();
        match load_index(&dir.path().join("posts-index.json")) {
            Err(Error::Missing(_)) => (),
            other => panic!("wanted Error::Missing, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_index() {
        let dir = write_index("{not json");
        match load_index(&dir.path().join("posts-index.json")) {
            Err(Error::Invalid { .. }) => (),
            other => panic!("wanted Error::Invalid, got {:?}", other),
        }
    }
}
