// Filesystem-backed object store for uploaded assets (player photos).

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Buckets are top-level directories under the store root; object
/// paths are relative paths inside a bucket. Nothing here escapes the
/// root: paths with `..` or absolute components are rejected.
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    /// Open the store at the configured root, or fall back to the
    /// platform data directory.
    pub fn open(configured_root: Option<&str>) -> Result<Self> {
        let root = match configured_root {
            Some(path) => PathBuf::from(path),
            None => ProjectDirs::from("", "", "auction-console")
                .context("could not determine a platform data directory")?
                .data_dir()
                .join("storage"),
        };
        std::fs::create_dir_all(&root)
            .with_context(|| format!("failed to create storage root {}", root.display()))?;
        Ok(ObjectStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: &str, path: &str) -> Result<PathBuf> {
        validate_component(bucket)?;
        for part in Path::new(path).components() {
            match part {
                std::path::Component::Normal(_) => {}
                _ => bail!("invalid object path '{path}'"),
            }
        }
        Ok(self.root.join(bucket).join(path))
    }

    /// Write an object, creating parent directories as needed.
    /// Overwrites an existing object at the same path (photo
    /// re-uploads replace the old file).
    pub fn upload(&self, bucket: &str, path: &str, bytes: &[u8]) -> Result<PathBuf> {
        let target = self.object_path(bucket, path)?;
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(&target, bytes)
            .with_context(|| format!("failed to write object {}", target.display()))?;
        Ok(target)
    }

    /// A stable URL for serving the object from the local store.
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("/storage/{bucket}/{path}")
    }

    /// Remove an object. Deleting something that is already gone is
    /// not an error.
    pub fn delete(&self, bucket: &str, path: &str) -> Result<()> {
        let target = self.object_path(bucket, path)?;
        match std::fs::remove_file(&target) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("failed to delete object {}", target.display()))
            }
        }
    }
}

fn validate_component(bucket: &str) -> Result<()> {
    if bucket.is_empty()
        || bucket.contains('/')
        || bucket.contains('\\')
        || bucket == "."
        || bucket == ".."
    {
        bail!("invalid bucket name '{bucket}'");
    }
    Ok(())
}
