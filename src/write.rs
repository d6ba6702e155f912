//! Responsible for indexing, templating, and writing HTML pages to disk
//! from loaded [`Post`]s. Index pages exist for the full post list and for
//! every tag (the static rendition of the category filter); both are
//! paginated.

use crate::post::Post;
use crate::query::{self, PageLink};
use crate::tag::Tag;
use gtmpl::{Template, Value};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

pub struct Writer<'a> {
    /// The template for post pages.
    pub posts_template: &'a Template,

    /// The template for index pages.
    pub index_template: &'a Template,

    /// The base URL for index pages. The main index pages will be located
    /// at `{index_base_url}/index.html`, `{index_base_url}/1.html`, etc.
    /// The tag index pages will be located at
    /// `{index_base_url}/{tag_name}/index.html`, etc.
    pub index_base_url: &'a Url,

    /// The directory in which the index HTML files will be written,
    /// mirroring the URL layout.
    pub index_output_directory: &'a Path,

    /// The number of posts per index page.
    pub index_page_size: usize,

    /// The URL for the site's home page, available to every template.
    pub home_page: &'a Url,

    /// The site title; post pages derive their document title from it.
    pub site_title: &'a str,
}

impl Writer<'_> {
    /// Takes a slice of [`Post`]s sorted newest-first, indexes it by tag,
    /// and writes post and index pages to disk.
    pub fn write_posts(&self, posts: &[Post]) -> Result<()> {
        use std::collections::HashSet;
        let categories = categories_value(posts);
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        for page in self.pages(posts, &categories)? {
            // there should always be a dir
            if let Some(dir) = page.file_path.parent() {
                if seen_dirs.insert(dir.to_owned()) {
                    std::fs::create_dir_all(dir)?;
                }
            }
            self.write_page(&page)?;
        }
        Ok(())
    }

    /// Takes a single [`Page`], templates it, and writes it to disk.
    fn write_page(&self, page: &Page) -> Result<()> {
        let mut value = page.to_value();
        if let Value::Object(obj) = &mut value {
            obj.insert(
                "home_page".to_owned(),
                Value::String(self.home_page.to_string()),
            );
            obj.insert(
                "site_title".to_owned(),
                Value::String(self.site_title.to_owned()),
            );
        }
        let context = gtmpl::Context::from(value)?;
        page.template
            .execute(&mut std::fs::File::create(&page.file_path)?, &context)?;
        Ok(())
    }

    /// Creates all of the index and post [`Page`]s for a set of [`Post`]s.
    /// Pages own their template values; they only borrow the templates.
    fn pages<'s>(&'s self, posts: &[Post], categories: &Value) -> Result<Vec<Page<'s>>> {
        let mut pages = self.index_pages(posts, categories)?;
        pages.extend(self.post_pages(posts));
        Ok(pages)
    }

    /// Creates the post [`Page`]s. Prev/next run through the date-sorted
    /// post list (prev is the newer neighbor).
    fn post_pages<'s>(&'s self, posts: &[Post]) -> Vec<Page<'s>> {
        posts
            .iter()
            .enumerate()
            .map(|(i, post)| {
                let mut item = post.to_value();
                if let Value::Object(obj) = &mut item {
                    obj.insert(
                        "page_title".to_owned(),
                        Value::String(format!("{} - {}", post.title, self.site_title)),
                    );
                    obj.insert(
                        "meta_description".to_owned(),
                        Value::String(post.excerpt.clone()),
                    );
                    obj.insert(
                        "canonical_url".to_owned(),
                        Value::String(post.url.to_string()),
                    );
                }
                Page {
                    item,
                    file_path: post.file_path.clone(),
                    prev: match i < 1 {
                        true => None,
                        false => Some(posts[i - 1].url.clone()),
                    },
                    next: match i >= posts.len() - 1 {
                        true => None,
                        false => Some(posts[i + 1].url.clone()),
                    },
                    template: self.posts_template,
                }
            })
            .collect()
    }

    /// Creates all of the index [`Page`]s: the main index plus one index
    /// per tag, each paginated.
    fn index_pages<'s>(&'s self, posts: &[Post], categories: &Value) -> Result<Vec<Page<'s>>> {
        let mut pages = Vec::new();
        for index in self.index_posts(posts)? {
            pages.extend(index.to_pages(
                self.index_page_size,
                self.index_template,
                categories,
            )?);
        }
        Ok(pages)
    }

    /// Indexes posts: one [`Index`] holding every post, plus one per tag
    /// holding that tag's posts.
    fn index_posts<'p>(&self, posts: &'p [Post]) -> Result<Vec<Index<'p>>> {
        let mut indices: HashMap<String, Index> = HashMap::new();
        indices.insert(
            String::default(),
            Index {
                url: self.index_base_url.clone(),
                output_directory: self.index_output_directory.to_owned(),
                posts: posts.iter().collect(),
            },
        );

        for post in posts {
            for tag in post.tags.iter() {
                match indices.get_mut(&tag.name) {
                    None => {
                        indices.insert(
                            tag.name.clone(),
                            Index {
                                url: self.index_base_url.join(&format!("{}/", tag.name))?,
                                output_directory: self.index_output_directory.join(&tag.name),
                                posts: vec![post],
                            },
                        );
                    }
                    Some(index) => {
                        index.posts.push(post);
                    }
                }
            }
        }

        Ok(indices.into_iter().map(|(_, index)| index).collect())
    }
}

/// An object representing an output HTML file. A [`Page`] can be converted
/// to a [`Value`] and thus rendered in a template via [`Page::to_value`].
struct Page<'a> {
    /// The main item for the page: a post object for post pages, an object
    /// with `posts`, `pager`, and `categories` for index pages.
    item: Value,

    /// The target location on disk for the output file.
    file_path: PathBuf,

    /// The URL for the previous page, if any.
    prev: Option<Url>,

    /// The URL for the next page, if any.
    next: Option<Url>,

    /// The template with which the page will be rendered.
    template: &'a Template,
}

impl Page<'_> {
    /// Converts a [`Page`] into a [`Value`]. The result is a
    /// [`Value::Object`] with fields `item`, `prev`, and `next`.
    fn to_value(&self) -> Value {
        let option_to_value = |opt: &Option<Url>| match opt {
            Some(url) => Value::String(url.to_string()),
            None => Value::Nil,
        };

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("item".to_owned(), self.item.clone());
        m.insert("prev".to_owned(), option_to_value(&self.prev));
        m.insert("next".to_owned(), option_to_value(&self.next));
        Value::Object(m)
    }
}

/// `Index` represents a collection of [`Post`]s associated with a tag
/// (including the empty tag, which is the main index containing all
/// posts).
struct Index<'a> {
    /// The base URL for the index's pages.
    url: Url,

    /// The output directory for the index's pages.
    output_directory: PathBuf,

    /// The posts associated with the index.
    posts: Vec<&'a Post>,
}

impl<'a> Index<'a> {
    /// Converts the index to a list of paginated index pages. An index with
    /// no posts still yields its first page so the template's no-results
    /// block has somewhere to render.
    fn to_pages<'t>(
        &self,
        page_size: usize,
        template: &'t Template,
        categories: &Value,
    ) -> Result<Vec<Page<'t>>> {
        let total = query::total_pages(self.posts.len(), page_size);

        let mut chunks: Vec<&[&Post]> = self.posts.chunks(page_size).collect();
        if chunks.is_empty() {
            chunks.push(&[]);
        }

        let mut pages = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.into_iter().enumerate() {
            let number = i + 1;
            let mut item: HashMap<String, Value> = HashMap::new();
            item.insert(
                "posts".to_owned(),
                Value::Array(chunk.iter().map(|p| p.summarize()).collect()),
            );
            item.insert(
                "pager".to_owned(),
                pager_value(&query::page_links(number, total), &self.url)?,
            );
            item.insert("categories".to_owned(), categories.clone());
            item.insert("empty".to_owned(), Value::from(chunk.is_empty()));

            pages.push(Page {
                item: Value::Object(item),
                file_path: self.output_directory.join(page_file_name(number)),
                prev: match number > 1 {
                    true => Some(self.url.join(&page_file_name(number - 1))?),
                    false => None,
                },
                next: match number < total {
                    true => Some(self.url.join(&page_file_name(number + 1))?),
                    false => None,
                },
                template,
            });
        }
        Ok(pages)
    }
}

/// The file name for 1-indexed index page `number`; the first page is the
/// directory's `index.html`.
fn page_file_name(number: usize) -> String {
    match number {
        1 => String::from("index.html"),
        _ => format!("{}.html", number - 1),
    }
}

/// Converts the pager layout into template values: objects with `label`,
/// `url` (nil when disabled), `active`, and `disabled` fields.
fn pager_value(links: &[PageLink], base: &Url) -> Result<Value> {
    let mut values = Vec::with_capacity(links.len());
    for link in links {
        let (label, target, active) = match link {
            PageLink::Prev(target) => ("\u{ab}".to_owned(), *target, false),
            PageLink::Next(target) => ("\u{bb}".to_owned(), *target, false),
            PageLink::Ellipsis => ("\u{2026}".to_owned(), None, false),
            PageLink::Page { number, current } => (number.to_string(), Some(*number), *current),
        };
        let disabled = target.is_none() && !active;
        let url = match (target, active) {
            (Some(number), false) => Value::String(base.join(&page_file_name(number))?.to_string()),
            _ => Value::Nil,
        };
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("label".to_owned(), Value::String(label));
        m.insert("disabled".to_owned(), Value::from(disabled));
        m.insert("url".to_owned(), url);
        m.insert("active".to_owned(), Value::from(active));
        values.push(Value::Object(m));
    }
    Ok(Value::Array(values))
}

/// The sorted set of all tags across `posts`, as a template value for the
/// category dropdown.
fn categories_value(posts: &[Post]) -> Value {
    let mut tags: Vec<&Tag> = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for post in posts {
        for tag in &post.tags {
            if seen.insert(tag.name.as_str()) {
                tags.push(tag);
            }
        }
    }
    tags.sort_by(|a, b| a.name.cmp(&b.name));
    Value::Array(tags.into_iter().map(Value::from).collect())
}

/// The result of a fallible page-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(String),

    /// An error forming a page URL.
    Url(url::ParseError),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`].
    /// This allows us to use the `?` operator for fallible template
    /// operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        Error::Url(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Url(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::Url(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::PostInfo;
    use crate::post::Loader;
    use std::fs;

    fn template(text: &str) -> Template {
        let mut template = Template::default();
        template.parse(text).unwrap();
        template
    }

    fn sample_posts(count: usize, dir: &Path) -> Vec<Post> {
        let mut index = Vec::new();
        for i in 0..count {
            let filename = format!("post-{:02}.html", i);
            fs::write(
                dir.join(&filename),
                format!(
                    r#"<html><body><div id="content">
                         <h1 class="title">Post {:02}</h1>
                         <p>Body {:02}.</p>
                       </div></body></html>"#,
                    i, i
                ),
            )
            .unwrap();
            index.push(format!(
                r#"{{"filename": "{}", "date": "2023-01-{:02}", "tags": ["emacs"]}}"#,
                filename,
                i + 1
            ));
        }
        fs::write(
            dir.join("posts-index.json"),
            format!("[{}]", index.join(",")),
        )
        .unwrap();

        let index_url = Url::parse("https://example.org/pages/").unwrap();
        let posts_url = Url::parse("https://example.org/posts/").unwrap();
        let out = dir.join("out").join("posts");
        Loader::new(&index_url, &posts_url, &out)
            .load_posts(dir, &dir.join("posts-index.json"))
            .unwrap()
    }

    fn writer<'a>(
        posts_template: &'a Template,
        index_template: &'a Template,
        index_base_url: &'a Url,
        index_output_directory: &'a Path,
        home_page: &'a Url,
    ) -> Writer<'a> {
        Writer {
            posts_template,
            index_template,
            index_base_url,
            index_output_directory,
            index_page_size: 5,
            home_page,
            site_title: "Example Blog",
        }
    }

    #[test]
    fn test_write_posts_layout() {
        let dir = tempfile::tempdir().unwrap();
        let posts = sample_posts(12, dir.path());

        let posts_template = template("post:{{.item.page_title}}");
        let index_template = template("index:{{len .item.posts}}");
        let index_base_url = Url::parse("https://example.org/pages/").unwrap();
        let home_page = Url::parse("https://example.org/").unwrap();
        let index_out = dir.path().join("out").join("pages");
        let w = writer(
            &posts_template,
            &index_template,
            &index_base_url,
            &index_out,
            &home_page,
        );
        w.write_posts(&posts).unwrap();

        // 12 posts at 5 per page: index.html, 1.html, 2.html
        assert!(index_out.join("index.html").exists());
        assert!(index_out.join("1.html").exists());
        assert!(index_out.join("2.html").exists());
        assert!(!index_out.join("3.html").exists());

        // every post tagged emacs, so the tag index mirrors the main one
        assert!(index_out.join("emacs").join("index.html").exists());
        assert!(index_out.join("emacs").join("2.html").exists());

        // post pages land under out/posts with slug names
        let post_out = dir.path().join("out").join("posts");
        assert!(post_out.join("post-00.html").exists());
        assert!(post_out.join("post-11.html").exists());

        let rendered = fs::read_to_string(post_out.join("post-03.html")).unwrap();
        assert_eq!(rendered, "post:Post 03 - Example Blog");

        let first = fs::read_to_string(index_out.join("index.html")).unwrap();
        assert_eq!(first, "index:5");
        let last = fs::read_to_string(index_out.join("2.html")).unwrap();
        assert_eq!(last, "index:2");
    }

    #[test]
    fn test_empty_post_list_still_writes_index() {
        let dir = tempfile::tempdir().unwrap();
        let posts_template = template("post");
        let index_template = template("empty:{{.item.empty}}");
        let index_base_url = Url::parse("https://example.org/pages/").unwrap();
        let home_page = Url::parse("https://example.org/").unwrap();
        let index_out = dir.path().join("pages");
        let w = writer(
            &posts_template,
            &index_template,
            &index_base_url,
            &index_out,
            &home_page,
        );
        w.write_posts(&[]).unwrap();

        let rendered = fs::read_to_string(index_out.join("index.html")).unwrap();
        assert_eq!(rendered, "empty:true");
    }

    #[test]
    fn test_pager_value_labels() {
        let base = Url::parse("https://example.org/pages/").unwrap();
        let links = query::page_links(2, 3);
        let value = pager_value(&links, &base).unwrap();
        match value {
            Value::Array(items) => {
                assert_eq!(items.len(), 5);
                match &items[0] {
                    Value::Object(m) => {
                        assert_eq!(m["label"], Value::String("\u{ab}".to_owned()));
                        assert_eq!(
                            m["url"],
                            Value::String("https://example.org/pages/index.html".to_owned())
                        );
                    }
                    other => panic!("wanted object, got {:?}", other),
                }
                match &items[2] {
                    Value::Object(m) => {
                        assert_eq!(m["active"], Value::from(true));
                        assert_eq!(m["url"], Value::Nil);
                    }
                    other => panic!("wanted object, got {:?}", other),
                }
            }
            other => panic!("wanted array, got {:?}", other),
        }
    }

    #[test]
    fn test_categories_sorted_unique() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.html"),
            r#"<html><body><p>x</p></body></html>"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("b.html"),
            r#"<html><body><p>y</p></body></html>"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("posts-index.json"),
            r#"[{"filename": "a.html", "date": "2023-01-01", "tags": ["r", "emacs"]},
                {"filename": "b.html", "date": "2023-01-02", "tags": ["emacs", "python"]}]"#,
        )
        .unwrap();
        let index_url = Url::parse("https://example.org/pages/").unwrap();
        let posts_url = Url::parse("https://example.org/posts/").unwrap();
        let out = dir.path().join("out");
        let posts = Loader::new(&index_url, &posts_url, &out)
            .load_posts(dir.path(), &dir.path().join("posts-index.json"))
            .unwrap();

        match categories_value(&posts) {
            Value::Array(items) => {
                let names: Vec<String> = items
                    .iter()
                    .map(|item| match item {
                        Value::Object(m) => match &m["tag"] {
                            Value::String(s) => s.clone(),
                            other => panic!("wanted string, got {:?}", other),
                        },
                        other => panic!("wanted object, got {:?}", other),
                    })
                    .collect();
                assert_eq!(names, vec!["emacs", "python", "r"]);
            }
            other => panic!("wanted array, got {:?}", other),
        }
    }
}
