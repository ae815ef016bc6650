//! Component C: the Ignore Matcher. Gitignore-style patterns read from a
//! project's `.memignore` file.
//!
//! `git-internal` has no precedent for this; the approach is grounded on
//! the `ignore` crate as used for single-path matching (rather than its
//! `WalkBuilder`, which is built for a parallel recursive directory walk
//! the Workspace Scanner doesn't need).

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::MemovError;

/// Compiled `.memignore` patterns for a project root.
pub struct IgnoreMatcher {
    gitignore: Gitignore,
}

impl IgnoreMatcher {
    /// Builds a matcher from `<project_root>/.memignore`. A missing file
    /// yields a matcher that ignores nothing.
    pub fn load(project_root: &Path) -> Result<IgnoreMatcher, MemovError> {
        let memignore = project_root.join(".memignore");
        let mut builder = GitignoreBuilder::new(project_root);
        if memignore.is_file() {
            if let Some(err) = builder.add(&memignore) {
                return Err(MemovError::Unknown(format!(
                    "invalid .memignore: {err}"
                )));
            }
        }
        let gitignore = builder
            .build()
            .map_err(|e| MemovError::Unknown(format!("invalid .memignore: {e}")))?;
        Ok(IgnoreMatcher { gitignore })
    }

    /// Returns true if `path` (relative to the project root, or absolute
    /// under it) should be excluded from scanning and snapshots.
    ///
    /// `.memignore` itself is never ignorable, regardless of what patterns
    /// it contains, otherwise a careless `*` pattern could hide the file
    /// that defines the project's ignore rules from the store entirely.
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        if path.file_name().is_some_and(|n| n == ".memignore") {
            return false;
        }
        // The control directory, and a coexisting real Git checkout's own
        // directory: store.rs's loose-object format is deliberately
        // Git-compatible, which invites running memov alongside `.git`, and
        // `.git`'s contents are never something memov should track.
        if path
            .components()
            .any(|c| c.as_os_str() == ".mem" || c.as_os_str() == ".git")
        {
            return true;
        }
        self.gitignore.matched(path, is_dir).is_ignore()
    }
}
