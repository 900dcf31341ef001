use std::fmt;
use std::path::PathBuf;

/// Identity of a (possibly nested) Java type: its package plus the chain of
/// simple names from the top-level type down.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName {
    package: String,
    nesting: Vec<String>,
}

impl TypeName {
    /// A top-level type. `package` is empty for the default package.
    pub fn top_level(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            nesting: vec![name.into()],
        }
    }

    /// A type nested directly inside `self`.
    pub fn nested(&self, name: impl Into<String>) -> Self {
        let mut nesting = self.nesting.clone();
        nesting.push(name.into());
        Self {
            package: self.package.clone(),
            nesting,
        }
    }

    /// Builds a name from a package and a dotted nesting path such as
    /// `Outer.Inner`. Returns `None` if the path has an empty segment.
    pub fn parse_qualified(package: &str, nesting: &str) -> Option<Self> {
        let nesting: Vec<String> = nesting.split('.').map(str::to_string).collect();
        if nesting.iter().any(String::is_empty) {
            return None;
        }
        Some(Self {
            package: package.to_string(),
            nesting,
        })
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn nesting(&self) -> &[String] {
        &self.nesting
    }

    pub fn simple_name(&self) -> &str {
        self.nesting.last().map(String::as_str).unwrap_or_default()
    }

    pub fn is_nested(&self) -> bool {
        self.nesting.len() > 1
    }

    /// The outermost enclosing type; the one that owns the source file.
    pub fn top_level_type(&self) -> Self {
        Self {
            package: self.package.clone(),
            nesting: self.nesting[..1.min(self.nesting.len())].to_vec(),
        }
    }

    /// `com.example.Outer.Inner`
    pub fn qualified_name(&self) -> String {
        self.join('.', '.')
    }

    /// `com.example.Outer$Inner`
    pub fn binary_name(&self) -> String {
        self.join('.', '$')
    }

    /// `com/example/Outer$Inner`, as stored in classfiles.
    pub fn internal_name(&self) -> String {
        self.join('/', '$')
    }

    /// `com/example/Outer.java`
    pub fn source_path(&self) -> PathBuf {
        self.package_dir().join(format!("{}.java", self.nesting[0]))
    }

    /// `com/example/Outer$Inner.class`
    pub fn class_path(&self) -> PathBuf {
        self.package_dir()
            .join(format!("{}.class", self.nesting.join("$")))
    }

    fn package_dir(&self) -> PathBuf {
        self.package
            .split('.')
            .filter(|segment| !segment.is_empty())
            .collect()
    }

    fn join(&self, package_sep: char, nesting_sep: char) -> String {
        let mut out = String::new();
        for segment in self.package.split('.').filter(|s| !s.is_empty()) {
            out.push_str(segment);
            out.push(package_sep);
        }
        for (idx, name) in self.nesting.iter().enumerate() {
            if idx > 0 {
                out.push(nesting_sep);
            }
            out.push_str(name);
        }
        out
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}
