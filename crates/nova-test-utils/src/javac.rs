use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Sources compiled by a real `javac`, kept alive for the duration of a test.
///
/// Sources live under `src/` and classfiles under `out/`, both laid out by
/// package, so they can be used directly as source/class roots.
#[derive(Debug)]
pub struct JavacOutput {
    dir: TempDir,
    pub status: std::process::ExitStatus,
    pub stderr: String,
}

impl JavacOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn source_root(&self) -> PathBuf {
        self.dir.path().join("src")
    }

    pub fn class_root(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    pub fn read_class(&self, binary_path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.class_root().join(binary_path))
    }
}

/// Compiles `(relative path, source)` pairs with `javac -g:none`.
///
/// Paths are relative to the source root, e.g. `com/example/Person.java`.
pub fn compile_java(files: &[(&str, &str)]) -> io::Result<JavacOutput> {
    let dir = TempDir::new()?;
    let src = dir.path().join("src");
    for (name, text) in files {
        let path = src.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, text)?;
    }

    let out_dir = dir.path().join("out");
    std::fs::create_dir_all(&out_dir)?;

    let mut cmd = Command::new("javac");
    cmd.current_dir(&src);
    cmd.args(["-encoding", "UTF-8", "-g:none", "-proc:none"]);
    // Never inherit CLASSPATH from the environment.
    cmd.args(["-classpath", "."]);
    cmd.arg("-d");
    cmd.arg(&out_dir);
    cmd.args(files.iter().map(|(name, _)| Path::new(name)));

    let out = cmd.output()?;
    Ok(JavacOutput {
        dir,
        status: out.status,
        stderr: String::from_utf8_lossy(&out.stderr).to_string(),
    })
}

/// Whether a usable `javac` is on `PATH`.
pub fn javac_available() -> bool {
    match Command::new("javac").arg("-version").output() {
        Ok(out) => out.status.success(),
        Err(err) => {
            tracing::debug!(
                target = "nova.test_utils",
                error = %err,
                "failed to run `javac -version`"
            );
            false
        }
    }
}
