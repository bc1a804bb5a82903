//! Conditional recursive deletion of a directory tree.
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::operations::FileSystemOps;

/// What [`delete_tree`] is allowed to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteFlags {
    /// Remove non-directory entries.
    pub files: bool,
    /// Remove a directory once nothing is left in it.
    pub folder: bool,
    /// Descend into sub-directories (with the same flags).
    pub sub_folders: bool,
}

/// Delete the contents of `root` according to `flags`.
///
/// Every directory visited, `root` included, is removed only when
/// `flags.folder` is set and all of its entries were actually deleted.
/// A sub-directory that is not descended into counts as a remaining entry.
///
/// Returns the number of entries left directly under `root` (zero when
/// `root` itself was removed).
///
/// # Errors
///
/// Returns the first listing or removal error; entries processed before
/// it stay deleted.
pub fn delete_tree(fs: &dyn FileSystemOps, root: &Path, flags: DeleteFlags) -> Result<usize> {
    // Pre-order list of directories to process; reversed it visits every
    // child directory before its parent.
    let mut order: Vec<PathBuf> = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        if flags.sub_folders {
            pending.extend(fs.read_dir(&dir)?.into_iter().filter(|p| fs.is_dir(p)));
        }
        order.push(dir);
    }

    // `root` is first in `order`, so it is visited last.
    let mut root_left = 0usize;
    for dir in order.iter().rev() {
        let mut left = 0usize;
        for entry in fs.read_dir(dir)? {
            if fs.is_dir(&entry) {
                // Already processed if descending; gone iff it was emptied.
                if !flags.sub_folders || fs.exists(&entry) {
                    left += 1;
                }
            } else if flags.files {
                fs.remove(&entry)?;
            } else {
                left += 1;
            }
        }

        if flags.folder && left == 0 {
            fs.remove(dir)?;
        }
        root_left = left;
    }

    Ok(root_left)
}
