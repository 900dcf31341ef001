//! Access to the artifacts order recovery reads: source files and classfiles.
//!
//! Absence (`Ok(None)`) is a normal outcome. Errors are reserved for artifacts
//! that exist but could not be read.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::type_name::TypeName;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceEncoding {
    #[default]
    Utf8,
    /// ISO-8859-1; also used for US-ASCII, which it is a superset of.
    Latin1,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported source encoding `{0}`")]
pub struct UnsupportedEncoding(pub String);

impl FromStr for SourceEncoding {
    type Err = UnsupportedEncoding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "utf8" => Ok(SourceEncoding::Utf8),
            "iso88591" | "latin1" | "usascii" | "ascii" => Ok(SourceEncoding::Latin1),
            _ => Err(UnsupportedEncoding(s.to_string())),
        }
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceEncoding::Utf8 => f.write_str("UTF-8"),
            SourceEncoding::Latin1 => f.write_str("ISO-8859-1"),
        }
    }
}

impl SourceEncoding {
    /// Decodes source bytes. Invalid UTF-8 is reported as `InvalidData`.
    pub fn decode(self, bytes: Vec<u8>) -> io::Result<String> {
        match self {
            SourceEncoding::Utf8 => {
                let mut text = String::from_utf8(bytes)
                    .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
                if text.starts_with('\u{FEFF}') {
                    text.drain(..'\u{FEFF}'.len_utf8());
                }
                Ok(text)
            }
            SourceEncoding::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
        }
    }
}

/// A readable source file plus the encoding it should be decoded with.
pub struct SourceArtifact {
    pub reader: Box<dyn Read>,
    pub encoding: SourceEncoding,
}

impl SourceArtifact {
    pub fn new(reader: Box<dyn Read>, encoding: SourceEncoding) -> Self {
        Self { reader, encoding }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(
            Box::new(Cursor::new(text.into().into_bytes())),
            SourceEncoding::Utf8,
        )
    }

    pub fn read_to_string(mut self) -> io::Result<String> {
        let mut bytes = Vec::new();
        self.reader.read_to_end(&mut bytes)?;
        self.encoding.decode(bytes)
    }
}

impl fmt::Debug for SourceArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceArtifact")
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

/// Supplies the source file of a type's *top-level* enclosing type.
pub trait SourceProvider {
    fn open_source(&self, ty: &TypeName) -> io::Result<Option<SourceArtifact>>;
}

/// Supplies the classfile of exactly the requested type (nested types have
/// their own classfiles).
pub trait BinaryProvider {
    fn open_class(&self, ty: &TypeName) -> io::Result<Option<Box<dyn Read>>>;
}

impl<T: SourceProvider + ?Sized> SourceProvider for &T {
    fn open_source(&self, ty: &TypeName) -> io::Result<Option<SourceArtifact>> {
        (**self).open_source(ty)
    }
}

impl<T: BinaryProvider + ?Sized> BinaryProvider for &T {
    fn open_class(&self, ty: &TypeName) -> io::Result<Option<Box<dyn Read>>> {
        (**self).open_class(ty)
    }
}

/// Never has a source file.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSource;

impl SourceProvider for NoSource {
    fn open_source(&self, _ty: &TypeName) -> io::Result<Option<SourceArtifact>> {
        Ok(None)
    }
}

/// Never has a classfile.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBinary;

impl BinaryProvider for NoBinary {
    fn open_class(&self, _ty: &TypeName) -> io::Result<Option<Box<dyn Read>>> {
        Ok(None)
    }
}

/// Looks up `<root>/<package path>/<TopLevel>.java` in each root, in order.
#[derive(Debug, Clone, Default)]
pub struct SourceRoots {
    roots: Vec<PathBuf>,
    encoding: SourceEncoding,
}

impl SourceRoots {
    pub fn new(roots: impl IntoIterator<Item = PathBuf>, encoding: SourceEncoding) -> Self {
        Self {
            roots: roots.into_iter().collect(),
            encoding,
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl SourceProvider for SourceRoots {
    fn open_source(&self, ty: &TypeName) -> io::Result<Option<SourceArtifact>> {
        let rel = ty.source_path();
        Ok(open_first(&self.roots, &rel)?
            .map(|file| SourceArtifact::new(Box::new(file), self.encoding)))
    }
}

/// Looks up `<root>/<package path>/<Outer$Inner>.class` in each root, in order.
#[derive(Debug, Clone, Default)]
pub struct ClassRoots {
    roots: Vec<PathBuf>,
}

impl ClassRoots {
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl BinaryProvider for ClassRoots {
    fn open_class(&self, ty: &TypeName) -> io::Result<Option<Box<dyn Read>>> {
        let rel = ty.class_path();
        Ok(open_first(&self.roots, &rel)?.map(|file| Box::new(file) as Box<dyn Read>))
    }
}

fn open_first(roots: &[PathBuf], rel: &Path) -> io::Result<Option<File>> {
    for root in roots {
        let path = root.join(rel);
        match File::open(&path) {
            Ok(file) => return Ok(Some(file)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => {
                tracing::debug!(
                    target = "nova.property_order",
                    path = %path.display(),
                    error = %err,
                    "failed to open artifact"
                );
                return Err(err);
            }
        }
    }
    Ok(None)
}

/// Sources held in memory, keyed by top-level qualified name.
#[derive(Debug, Clone, Default)]
pub struct MemorySources {
    files: HashMap<String, String>,
}

impl MemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the source of the top-level type `ty` (nested parts are ignored).
    pub fn insert(&mut self, ty: &TypeName, text: impl Into<String>) {
        self.files
            .insert(ty.top_level_type().qualified_name(), text.into());
    }

    pub fn with(mut self, ty: &TypeName, text: impl Into<String>) -> Self {
        self.insert(ty, text);
        self
    }
}

impl SourceProvider for MemorySources {
    fn open_source(&self, ty: &TypeName) -> io::Result<Option<SourceArtifact>> {
        Ok(self
            .files
            .get(&ty.top_level_type().qualified_name())
            .map(|text| SourceArtifact::from_text(text.clone())))
    }
}

/// Classfiles held in memory, keyed by binary name (`pkg.Outer$Inner`).
#[derive(Debug, Clone, Default)]
pub struct MemoryClasses {
    classes: HashMap<String, Vec<u8>>,
}

impl MemoryClasses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ty: &TypeName, bytes: Vec<u8>) {
        self.classes.insert(ty.binary_name(), bytes);
    }

    pub fn with(mut self, ty: &TypeName, bytes: Vec<u8>) -> Self {
        self.insert(ty, bytes);
        self
    }
}

impl BinaryProvider for MemoryClasses {
    fn open_class(&self, ty: &TypeName) -> io::Result<Option<Box<dyn Read>>> {
        Ok(self
            .classes
            .get(&ty.binary_name())
            .map(|bytes| Box::new(Cursor::new(bytes.clone())) as Box<dyn Read>))
    }
}
