//! Package descriptor for the gerrit-view tools.
//!
//! A [`PackageManifest`] is assembled from fixed metadata plus two files that
//! live next to the descriptor: `requirements.txt` (one dependency specifier
//! per line) and `README.rst` (the long description).  Assembly is
//! all-or-nothing: if either file cannot be read no manifest is produced.

use serde::{Serialize, Serializer, ser::Error as _};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Requirements file name, relative to the descriptor root.
pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Long description file name, relative to the descriptor root.
pub const DESCRIPTION_FILE: &str = "README.rst";

/// Directory holding the installable entry-point scripts.
pub const SCRIPTS_DIR: &str = "scripts";

/// Entry-point scripts registered for installation.
pub const SCRIPTS: [&str; 2] = ["cgerrit", "qgerrit"];

const NAME: &str = "gerrit-view";
const VERSION: &str = "0.1";
const DESCRIPTION: &str = "Gerrit viewer tools";
const AUTHOR: &str = "Joshua Harlow";
const AUTHOR_EMAIL: &str = "harlowja@yahoo-inc.com";
const URL: &str = "http://github.com/harlowja/gerrit_view/";
const LICENSE: &str = "ASL 2.0";
const KEYWORDS: &str = "gerrit curses urwid console";
const CLASSIFIERS: [&str; 5] = [
    "Development Status :: 4 - Beta",
    "Topic :: Utilities",
    "License :: OSI Approved :: Apache Software License",
    "Operating System :: POSIX :: Linux",
    "Programming Language :: Python",
];

/// Errors that can occur while assembling a manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// A descriptor input could not be opened or read.
    #[error("failed to read {}: {source}", path.display())]
    FileAccess {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl ManifestError {
    fn file_access(path: &Path, source: io::Error) -> Self {
        Self::FileAccess {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Read a requirements file into a list of dependency specifiers.
///
/// Each line is trimmed; empty lines and lines starting with `#` are
/// skipped. A `#` later in the line is kept verbatim. File order is
/// preserved and nothing is deduplicated.
///
/// # Errors
///
/// Returns [`ManifestError::FileAccess`] if the file cannot be opened or a
/// line cannot be read.
pub fn read_requirements(path: &Path) -> Result<Vec<String>, ManifestError> {
    let file = File::open(path).map_err(|e| ManifestError::file_access(path, e))?;
    parse_requirements(BufReader::new(file)).map_err(|e| ManifestError::file_access(path, e))
}

fn parse_requirements(reader: impl BufRead) -> io::Result<Vec<String>> {
    let mut reqs = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        reqs.push(line.to_string());
    }
    Ok(reqs)
}

/// Load a long description file verbatim.
///
/// # Errors
///
/// Returns [`ManifestError::FileAccess`] if the file cannot be read. An
/// empty file is not an error.
pub fn load_description(path: &Path) -> Result<Vec<u8>, ManifestError> {
    std::fs::read(path).map_err(|e| ManifestError::file_access(path, e))
}

/// The assembled, immutable package metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageManifest {
    name: String,
    version: String,
    description: String,
    author: String,
    author_email: String,
    url: String,
    license: String,
    scripts: Vec<PathBuf>,
    classifiers: Vec<String>,
    keywords: String,
    install_requires: Vec<String>,
    #[serde(serialize_with = "serialize_text")]
    long_description: Vec<u8>,
}

/// Text formats cannot carry arbitrary bytes, so a description that is not
/// UTF-8 fails to serialize instead of being altered.
fn serialize_text<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| S::Error::custom(format!("long_description is not valid UTF-8: {e}")))?;
    serializer.serialize_str(text)
}

impl PackageManifest {
    /// Package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// One-line summary.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Author name.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Author contact address.
    pub fn author_email(&self) -> &str {
        &self.author_email
    }

    /// Project home page.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// License identifier.
    pub fn license(&self) -> &str {
        &self.license
    }

    /// Paths of the installable entry-point scripts.
    pub fn scripts(&self) -> &[PathBuf] {
        &self.scripts
    }

    /// Trove classifiers.
    pub fn classifiers(&self) -> &[String] {
        &self.classifiers
    }

    /// Space separated keyword tags.
    pub fn keywords(&self) -> &str {
        &self.keywords
    }

    /// Dependency specifiers in file order.
    pub fn install_requires(&self) -> &[String] {
        &self.install_requires
    }

    /// Raw long description bytes.
    pub fn long_description(&self) -> &[u8] {
        &self.long_description
    }
}

/// Assembles a [`PackageManifest`] from files under a root directory.
#[derive(Debug, Clone)]
pub struct PackageDescriptor {
    root: PathBuf,
}

impl PackageDescriptor {
    /// Create a descriptor rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a file name against the descriptor root.
    pub fn path(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.root.join(file_name)
    }

    /// Build the manifest.
    ///
    /// # Errors
    ///
    /// Fails with [`ManifestError::FileAccess`] if either the requirements
    /// or description file cannot be read; no partial manifest is returned.
    pub fn assemble(&self) -> Result<PackageManifest, ManifestError> {
        let install_requires = read_requirements(&self.path(REQUIREMENTS_FILE))?;
        let long_description = load_description(&self.path(DESCRIPTION_FILE))?;

        tracing::debug!(
            root = %self.root.display(),
            requirements = install_requires.len(),
            description_bytes = long_description.len(),
            "assembled package manifest"
        );

        Ok(PackageManifest {
            name: NAME.to_string(),
            version: VERSION.to_string(),
            description: DESCRIPTION.to_string(),
            author: AUTHOR.to_string(),
            author_email: AUTHOR_EMAIL.to_string(),
            url: URL.to_string(),
            license: LICENSE.to_string(),
            scripts: SCRIPTS
                .iter()
                .map(|s| self.path(Path::new(SCRIPTS_DIR).join(s)))
                .collect(),
            classifiers: CLASSIFIERS.iter().map(ToString::to_string).collect(),
            keywords: KEYWORDS.to_string(),
            install_requires,
            long_description,
        })
    }
}
