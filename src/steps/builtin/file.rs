//! Create and delete files.

use std::fs;
use std::io::ErrorKind;

use anyhow::{ensure, Context as _};
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::steps::{Step, StepOutput};

/// Writes text to a file, creating parent directories.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWriteStep {
    /// Target path; wildcards and `takeFromCtx:` are resolved at run time.
    pub path: String,
    /// Content; resolved like `path`.
    pub content: String,
    /// Context key that receives the resolved path.
    pub path_context_key: Option<String>,
}

impl FileWriteStep {
    /// Write `content` to `path`.
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            path_context_key: None,
        }
    }
}

impl Step for FileWriteStep {
    fn type_name(&self) -> &str {
        "file_write"
    }

    fn execute(&self, ctx: &Context) -> anyhow::Result<StepOutput> {
        let path = ctx.read_argument(&self.path)?;
        let content = ctx.read_argument(&self.content)?;

        if let Some(parent) = std::path::Path::new(&path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating directory {}", parent.display()))?;
            }
        }
        fs::write(&path, &content).with_context(|| format!("writing {}", path))?;
        ctx.log_info(&format!("Wrote {} bytes to {}", content.len(), path));

        if let Some(key) = &self.path_context_key {
            ctx.add_or_update(key, path.clone());
        }
        Ok(StepOutput::none())
    }

    fn validate(&self, _ctx: &Context) -> anyhow::Result<()> {
        ensure!(!self.path.trim().is_empty(), "path must not be empty");
        Ok(())
    }
}

/// Deletes a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDeleteStep {
    /// Path to delete; wildcards and `takeFromCtx:` are resolved at run time.
    pub path: String,
    /// Succeed when the file does not exist.
    pub ignore_missing: bool,
}

impl FileDeleteStep {
    /// Delete `path`, failing if it is missing.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ignore_missing: false,
        }
    }
}

impl Step for FileDeleteStep {
    fn type_name(&self) -> &str {
        "file_delete"
    }

    fn execute(&self, ctx: &Context) -> anyhow::Result<StepOutput> {
        let path = ctx.read_argument(&self.path)?;
        match fs::remove_file(&path) {
            Ok(()) => ctx.log_info(&format!("Deleted {}", path)),
            Err(e) if e.kind() == ErrorKind::NotFound && self.ignore_missing => {
                ctx.log_warning(&format!("{} did not exist", path));
            }
            Err(e) => return Err(e).with_context(|| format!("deleting {}", path)),
        }
        Ok(StepOutput::none())
    }

    fn validate(&self, _ctx: &Context) -> anyhow::Result<()> {
        ensure!(!self.path.trim().is_empty(), "path must not be empty");
        Ok(())
    }
}
