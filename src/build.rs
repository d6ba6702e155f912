//! Exports the [`build_site`] function which stitches together the
//! high-level steps of building the output site: loading the post index and
//! content files ([`crate::post`]), parsing the theme's templates, and
//! rendering index and post pages ([`crate::write`]).

use crate::config::Config;
use crate::post::{Error as LoadError, Loader};
use crate::util::{self, OpenError};
use crate::write::{Error as WriteError, Writer};
use gtmpl::Template;
use log::info;
use std::fmt;
use std::path::{Path, PathBuf};

/// Builds the site from a [`Config`] object. This calls into
/// [`Loader::load_posts`] and [`Writer::write_posts`] which do the
/// heavy-lifting.
pub fn build_site(config: &Config) -> Result<()> {
    let loader = Loader::new(
        &config.index_url,
        &config.posts_url,
        &config.posts_output_directory,
    );
    let posts = loader.load_posts(&config.posts_source_directory, &config.index_file)?;

    // Parse the template files.
    let index_template = parse_template(config.index_template.iter())?;
    let posts_template = parse_template(config.posts_template.iter())?;

    // Blow away the old output directories so we don't have any collisions.
    // The root output directory itself is left alone in case the user
    // pointed the build somewhere that holds other files.
    rmdir(&config.posts_output_directory)?;
    rmdir(&config.index_output_directory)?;

    let writer = Writer {
        posts_template: &posts_template,
        index_template: &index_template,
        index_base_url: &config.index_url,
        index_output_directory: &config.index_output_directory,
        index_page_size: config.index_page_size,
        home_page: &config.home_page,
        site_title: &config.title,
    };
    writer.write_posts(&posts)?;

    // copy /pages/index.html to /index.html
    std::fs::create_dir_all(&config.root_output_directory)?;
    std::fs::copy(
        config.index_output_directory.join("index.html"),
        config.root_output_directory.join("index.html"),
    )?;

    info!(
        "built site into `{}`",
        config.root_output_directory.display()
    );
    Ok(())
}

// Loads the template file contents, appends them to each other, and parses
// the result into a template.
fn parse_template<P: AsRef<Path>>(template_files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        use std::io::Read;
        util::open(template_file.as_ref(), "template")?.read_to_string(&mut contents)?;
        contents.push(' ');
    }

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
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

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during post loading,
/// writing, cleaning output directories, parsing template files, and other
/// I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading the post index or content files.
    Load(LoadError),

    /// Returned for errors writing [`crate::post::Post`]s to disk as HTML
    /// files.
    Write(WriteError),

    /// Returned for I/O problems while cleaning output directories.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile(OpenError),

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Load(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory `{}`: {}", path.display(), err)
            }
            Error::OpenTemplateFile(err) => err.fmt(f),
            Error::ParseTemplate(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Load(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::OpenTemplateFile(err) => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<LoadError> for Error {
    /// Converts [`LoadError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: LoadError) -> Error {
        Error::Load(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<OpenError> for Error {
    /// Converts [`OpenError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: OpenError) -> Error {
        Error::OpenTemplateFile(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, PROJECT_FILE};
    use std::fs;

    fn scaffold(root: &Path) {
        fs::write(
            root.join(PROJECT_FILE),
            "title: Example Blog\nsite_root: https://example.org/\nhome_page: index.html\n",
        )
        .unwrap();

        fs::create_dir_all(root.join("theme")).unwrap();
        fs::write(
            root.join("theme/theme.yaml"),
            "index_template: [index.html]\nposts_template: [post.html]\n",
        )
        .unwrap();
        fs::write(
            root.join("theme/index.html"),
            "{{range .item.posts}}<card>{{.title}}</card>{{end}}",
        )
        .unwrap();
        fs::write(root.join("theme/post.html"), "<article>{{.item.body}}</article>").unwrap();

        fs::create_dir_all(root.join("posts")).unwrap();
        fs::write(
            root.join("posts/2023-04-01-first.html"),
            r#"<html><body><div id="content">
                 <h1 class="title">First Post</h1>
                 <p>Opening paragraph.</p>
               </div></body></html>"#,
        )
        .unwrap();
        fs::write(
            root.join("posts/posts-index.json"),
            r#"[{"filename": "2023-04-01-first.html", "tags": ["emacs"]}]"#,
        )
        .unwrap();
    }

    #[test]
    fn test_build_site() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());
        let out = dir.path().join("out");
        let config = Config::from_directory(dir.path(), &out).unwrap();
        build_site(&config).unwrap();

        let index = fs::read_to_string(out.join("pages/index.html")).unwrap();
        // parse_template joins template files with a space
        assert_eq!(index.trim(), "<card>First Post</card>");
        // the first index page doubles as the site root
        assert_eq!(fs::read_to_string(out.join("index.html")).unwrap(), index);

        let tag_index = fs::read_to_string(out.join("pages/emacs/index.html")).unwrap();
        assert_eq!(tag_index, index);

        let post = fs::read_to_string(out.join("posts/first-post.html")).unwrap();
        assert!(post.starts_with("<article>"));
        assert!(post.contains("Opening paragraph."));
        assert!(!post.contains("First Post</h1>"));
    }

    #[test]
    fn test_build_site_without_index_fails() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());
        fs::remove_file(dir.path().join("posts/posts-index.json")).unwrap();
        let out = dir.path().join("out");
        let config = Config::from_directory(dir.path(), &out).unwrap();
        match build_site(&config) {
            Err(Error::Load(_)) => (),
            other => panic!("wanted a load error, got {:?}", other.is_ok()),
        }
    }
}
