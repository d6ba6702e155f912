//! Defines the [`Post`] and [`Loader`] types. Also defines the logic for
//! loading posts from the file system into memory: each record of the post
//! index names a content file, the content file is read and run through
//! [`crate::extract`], and the result is merged into a [`Post`]. See
//! [`Post::to_value`] and [`Post::summarize`] for how posts are converted
//! into template values.

use crate::extract::{Extractor, Metadata};
use crate::index::{self, PostInfo};
use crate::tag::Tag;
use chrono::NaiveDate;
use gtmpl::Value;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// A fully loaded post: index record merged with content-file metadata.
pub struct Post {
    /// URL-friendly identifier; also the stem of the output file name.
    pub slug: String,

    /// The content file's name within the posts source directory.
    pub filename: String,

    pub title: String,

    /// ISO `YYYY-MM-DD`. ISO dates sort lexicographically, so ordering
    /// posts is a plain string comparison.
    pub date: String,

    pub tags: Vec<Tag>,
    pub excerpt: String,

    /// The article HTML with the title heading stripped.
    pub body: String,

    /// Pre-calculated reading time from the index, if any.
    pub reading_time: Option<String>,

    /// The post page's URL.
    pub url: Url,

    /// The target location on disk for the post's output file.
    pub file_path: PathBuf,
}

impl Post {
    /// The post's date in en-US long form ("January 2, 2006"). Falls back
    /// to the raw string if it somehow isn't ISO.
    pub fn formatted_date(&self) -> String {
        match NaiveDate::parse_from_str(&self.date, "%Y-%m-%d") {
            Ok(date) => date.format("%B %-d, %Y").to_string(),
            Err(_) => self.date.clone(),
        }
    }

    pub fn reading_time(&self) -> &str {
        self.reading_time.as_deref().unwrap_or("~ min read")
    }

    /// The card-sized template value used on index pages.
    pub fn summarize(&self) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        self.insert_common(&mut m);
        m.insert("excerpt".to_owned(), Value::String(self.excerpt.clone()));
        Value::Object(m)
    }

    /// The full template value used on the post's own page.
    pub fn to_value(&self) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        self.insert_common(&mut m);
        m.insert("excerpt".to_owned(), Value::String(self.excerpt.clone()));
        m.insert("body".to_owned(), Value::String(self.body.clone()));
        Value::Object(m)
    }

    fn insert_common(&self, m: &mut HashMap<String, Value>) {
        m.insert("title".to_owned(), Value::String(self.title.clone()));
        m.insert("url".to_owned(), Value::String(self.url.to_string()));
        m.insert("date".to_owned(), Value::String(self.formatted_date()));
        m.insert(
            "reading_time".to_owned(),
            Value::String(self.reading_time().to_owned()),
        );
        m.insert(
            "tags".to_owned(),
            Value::Array(self.tags.iter().map(Value::from).collect()),
        );
    }
}

/// Loads [`Post`] objects from the index and content files.
pub struct Loader<'a> {
    /// `index_url` is the base URL for index pages. It's used to prefix tag
    /// page URLs (i.e., the URL for the first page of a tag is
    /// `{index_url}/{tag_name}/index.html`).
    index_url: &'a Url,

    /// `posts_url` is the base URL for post pages. It's used to prefix post
    /// page URLs (i.e., the URL for a post is `{posts_url}/{slug}.html`).
    posts_url: &'a Url,

    /// `posts_directory` is the directory in which post pages will be
    /// rendered.
    posts_directory: &'a Path,
}

impl<'a> Loader<'a> {
    /// Constructs a new loader. See fields on [`Loader`] for argument
    /// descriptions.
    pub fn new(index_url: &'a Url, posts_url: &'a Url, posts_directory: &'a Path) -> Loader<'a> {
        Loader {
            index_url,
            posts_url,
            posts_directory,
        }
    }

    /// Loads every post the index names from `source_directory`, ordered by
    /// date with the newest first. A post whose content file is missing or
    /// unparseable is skipped with a warning; a missing or invalid index is
    /// fatal.
    pub fn load_posts(
        &self,
        source_directory: &Path,
        index_file: &Path,
    ) -> Result<Vec<Post>, Error> {
        let records = index::load_index(index_file)?;
        debug!("post index names {} posts", records.len());

        let extractor = Extractor::new();
        let mut posts: Vec<Post> = Vec::with_capacity(records.len());
        for record in &records {
            match self.load_post(&extractor, source_directory, record) {
                Ok(post) => posts.push(post),
                Err(err) => warn!("Could not load post `{}`: {}", record.filename, err),
            }
        }

        posts.sort_by(|a, b| b.date.cmp(&a.date));
        info!("loaded {} of {} posts", posts.len(), records.len());
        Ok(posts)
    }

    fn load_post(
        &self,
        extractor: &Extractor,
        source_directory: &Path,
        record: &PostInfo,
    ) -> Result<Post, Error> {
        let path = source_directory.join(&record.filename);
        let html = std::fs::read_to_string(&path).map_err(|err| Error::ReadPost {
            path: path.clone(),
            err,
        })?;

        let Metadata {
            title,
            slug,
            date,
            tags,
            excerpt,
            body,
        } = extractor.extract(&html, record);

        // Raw tags that differ only in case or punctuation collapse to the
        // same slug; keep the first.
        let mut seen = std::collections::HashSet::new();
        let mut converted: Vec<Tag> = Vec::with_capacity(tags.len());
        for raw in &tags {
            let tag = Tag::new(raw, self.index_url)?;
            if seen.insert(tag.name.clone()) {
                converted.push(tag);
            }
        }

        Ok(Post {
            url: self.posts_url.join(&format!("{}.html", slug))?,
            file_path: self.posts_directory.join(format!("{}.html", slug)),
            filename: record.filename.clone(),
            reading_time: record.reading_time.clone(),
            slug,
            title,
            date,
            tags: converted,
            excerpt,
            body,
        })
    }
}

/// Represents an error loading posts.
#[derive(Debug)]
pub enum Error {
    /// Returned for problems with the post index itself.
    Index(index::Error),

    /// Returned when a content file can't be read.
    ReadPost { path: PathBuf, err: std::io::Error },

    /// Returned when a post or tag URL can't be formed.
    Url(url::ParseError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Index(err) => err.fmt(f),
            Error::ReadPost { path, err } => {
                write!(f, "Reading post file `{}`: {}", path.display(), err)
            }
            Error::Url(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Index(err) => Some(err),
            Error::ReadPost { path: _, err } => Some(err),
            Error::Url(err) => Some(err),
        }
    }
}

impl From<index::Error> for Error {
    fn from(err: index::Error) -> Error {
        Error::Index(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        Error::Url(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn urls() -> (Url, Url) {
        (
            Url::parse("https://example.org/pages/").unwrap(),
            Url::parse("https://example.org/posts/").unwrap(),
        )
    }

    fn write_post(dir: &Path, filename: &str, title: &str, date: &str) {
        fs::write(
            dir.join(filename),
            format!(
                r#"<html><body><div id="content">
                     <h1 class="title">{}</h1>
                     <span class="timestamp">{}</span>
                     <p>Body of {}.</p>
                   </div></body></html>"#,
                title, date, title
            ),
        )
        .unwrap();
    }

    #[test]
    fn test_load_posts_sorted_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        write_post(dir.path(), "older.html", "Older", "2021-01-01");
        write_post(dir.path(), "newer.html", "Newer", "2023-06-15");
        fs::write(
            dir.path().join("posts-index.json"),
            r#"[{"filename": "older.html"}, {"filename": "newer.html"}]"#,
        )
        .unwrap();

        let (index_url, posts_url) = urls();
        let out = PathBuf::from("/tmp/out/posts");
        let loader = Loader::new(&index_url, &posts_url, &out);
        let posts = loader
            .load_posts(dir.path(), &dir.path().join("posts-index.json"))
            .unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "Newer");
        assert_eq!(posts[1].title, "Older");
        assert_eq!(posts[0].url.as_str(), "https://example.org/posts/newer.html");
        assert_eq!(posts[0].file_path, out.join("newer.html"));
    }

    #[test]
    fn test_missing_content_file_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_post(dir.path(), "real.html", "Real", "2022-02-02");
        fs::write(
            dir.path().join("posts-index.json"),
            r#"[{"filename": "real.html"}, {"filename": "ghost.html"}]"#,
        )
        .unwrap();

        let (index_url, posts_url) = urls();
        let out = PathBuf::from("/tmp/out/posts");
        let loader = Loader::new(&index_url, &posts_url, &out);
        let posts = loader
            .load_posts(dir.path(), &dir.path().join("posts-index.json"))
            .unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Real");
    }

    #[test]
    fn test_missing_index_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (index_url, posts_url) = urls();
        let out = PathBuf::from("/tmp/out/posts");
        let loader = Loader::new(&index_url, &posts_url, &out);
        match loader.load_posts(dir.path(), &dir.path().join("posts-index.json")) {
            Err(Error::Index(index::Error::Missing(_))) => (),
            other => panic!("wanted a missing-index error, got {:?}", other.map(|p| p.len())),
        }
    }

    #[test]
    fn test_tags_collapse_on_slug() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.html"),
            r#"<html><body><div id="content">
                 <h1 class="title">A</h1><p>text</p>
               </div></body></html>"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("posts-index.json"),
            r#"[{"filename": "a.html", "date": "2022-01-01",
                 "tags": ["Machine Learning", "machine-learning", "R"]}]"#,
        )
        .unwrap();

        let (index_url, posts_url) = urls();
        let out = PathBuf::from("/tmp/out/posts");
        let loader = Loader::new(&index_url, &posts_url, &out);
        let posts = loader
            .load_posts(dir.path(), &dir.path().join("posts-index.json"))
            .unwrap();
        let names: Vec<&str> = posts[0].tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["machine-learning", "r"]);
    }

    #[test]
    fn test_formatted_date() {
        let (_, posts_url) = urls();
        let post = Post {
            slug: "a".to_owned(),
            filename: "a.html".to_owned(),
            title: "A".to_owned(),
            date: "2023-05-01".to_owned(),
            tags: Vec::new(),
            excerpt: String::new(),
            body: String::new(),
            reading_time: None,
            url: posts_url,
            file_path: PathBuf::from("a.html"),
        };
        assert_eq!(post.formatted_date(), "May 1, 2023");
        assert_eq!(post.reading_time(), "~ min read");
    }
}
