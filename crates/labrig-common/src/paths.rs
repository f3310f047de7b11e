//! Standard filesystem paths for labs.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;

/// Default base directory under which lab directories are created.
pub static LABRIG_LAB_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    std::env::var("LABRIG_LAB_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
});

/// Prefix of every lab directory.
pub const LAB_DIR_PREFIX: &str = "labrig";

/// Name of the rendered first-boot configuration inside a node directory.
pub const FIRST_BOOT_CONFIG: &str = "first-boot.cfg";

/// Name of the persistent storage directory inside a node directory.
pub const XR_STORAGE_DIR: &str = "xr-storage";

/// Directory layout of a single lab.
#[derive(Debug, Clone)]
pub struct LabPaths {
    /// Lab root directory (`<base>/labrig-<lab>`).
    pub root: PathBuf,
}

impl LabPaths {
    /// Layout for the named lab under the default base directory.
    #[must_use]
    pub fn new(lab: &str) -> Self {
        Self::with_base(LABRIG_LAB_ROOT.as_path(), lab)
    }

    /// Layout for the named lab under a custom base directory.
    #[must_use]
    pub fn with_base(base: impl AsRef<Path>, lab: &str) -> Self {
        Self {
            root: base.as_ref().join(format!("{LAB_DIR_PREFIX}-{lab}")),
        }
    }

    /// Working directory of one node.
    #[must_use]
    pub fn node_dir(&self, node: &str) -> PathBuf {
        self.root.join(node)
    }

    /// Long (host-unique) name of a node in this lab.
    #[must_use]
    pub fn long_name(&self, node: &str) -> String {
        let lab = self
            .root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{lab}-{node}")
    }

    /// First-boot configuration of a node directory.
    #[must_use]
    pub fn first_boot_config(node_dir: &Path) -> PathBuf {
        node_dir.join(FIRST_BOOT_CONFIG)
    }

    /// Persistent storage directory of a node directory.
    #[must_use]
    pub fn xr_storage(node_dir: &Path) -> PathBuf {
        node_dir.join(XR_STORAGE_DIR)
    }
}

/// Create a directory and its parents with the given mode.
///
/// Succeeds if the directory already exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn create_directory(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(mode)
        .create(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_base() {
        let paths = LabPaths::with_base("/tmp", "lab1");
        assert_eq!(paths.root, PathBuf::from("/tmp/labrig-lab1"));
        assert_eq!(
            paths.node_dir("xr1"),
            PathBuf::from("/tmp/labrig-lab1/xr1")
        );
        assert_eq!(paths.long_name("xr1"), "labrig-lab1-xr1");
    }

    #[test]
    fn node_files() {
        let dir = Path::new("/tmp/lab1");
        assert_eq!(
            LabPaths::first_boot_config(dir),
            PathBuf::from("/tmp/lab1/first-boot.cfg")
        );
        assert_eq!(
            LabPaths::xr_storage(dir),
            PathBuf::from("/tmp/lab1/xr-storage")
        );
    }

    #[test]
    fn create_directory_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("a/b");
        create_directory(&dir, 0o777).unwrap();
        std::fs::write(dir.join("keep"), "data").unwrap();

        create_directory(&dir, 0o777).unwrap();
        assert_eq!(std::fs::read_to_string(dir.join("keep")).unwrap(), "data");
    }
}
