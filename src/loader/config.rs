//! Settings for a package load.

use std::path::PathBuf;

/// Where and how the loader runs.
///
/// The defaults mirror a plain `go list` in the current directory, with
/// `GOFLAGS=-mod=mod` so that vendored modules do not hide packages the
/// vendor folder lacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadConfig {
    /// Working directory for the load.
    pub dir: PathBuf,
    /// The `go` executable.
    pub go_binary: PathBuf,
    /// Extra environment variables, applied on top of the inherited ones.
    pub env: Vec<(String, String)>,
    /// Build tags passed through `-tags`.
    pub tags: Vec<String>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            go_binary: PathBuf::from("go"),
            env: vec![("GOFLAGS".to_string(), "-mod=mod".to_string())],
            tags: Vec::new(),
        }
    }
}

impl LoadConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the working directory.
    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Sets the `go` executable.
    pub fn go_binary(mut self, go_binary: impl Into<PathBuf>) -> Self {
        self.go_binary = go_binary.into();
        self
    }

    /// Sets an environment variable, replacing an earlier value for the same key.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.env.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.env.push((key, value)),
        }
        self
    }

    /// Sets the build tags.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}
