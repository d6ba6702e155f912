use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Opens a file, annotating any failure with the file's role (e.g.
/// "project", "theme", "template") so the message names the file the user
/// needs to fix.
pub fn open(path: &Path, kind: &'static str) -> Result<File, OpenError> {
    match File::open(path) {
        Ok(file) => Ok(file),
        Err(err) => Err(OpenError {
            kind,
            path: path.to_owned(),
            err,
        }),
    }
}

/// An I/O error annotated with the path and role of the file involved.
#[derive(Debug)]
pub struct OpenError {
    pub kind: &'static str,
    pub path: PathBuf,
    pub err: std::io::Error,
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Opening {} file `{}`: {}",
            self.kind,
            self.path.display(),
            self.err
        )
    }
}

impl std::error::Error for OpenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.err)
    }
}
