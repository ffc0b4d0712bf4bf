use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, anyhow};

const MAX_SYMLINK_HOPS: usize = 16;

/// Directory the local file tools are confined to.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Canonicalize `root`; it must exist.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let root = std::fs::canonicalize(root)
            .with_context(|| format!("Workspace root '{}' is not accessible", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a user-supplied path against the workspace, rejecting
    /// anything that lands outside it, including through symlinks. The
    /// target does not have to exist.
    pub async fn resolve(&self, path: &str) -> Result<PathBuf> {
        let candidate = Path::new(path);
        let absolute = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        };

        let normalized = normalize_path(&absolute);
        if !normalized.starts_with(&self.root) {
            return Err(outside_workspace(path));
        }

        let canonical = self.canonicalize_allow_missing(&normalized, path).await?;
        if !canonical.starts_with(&self.root) {
            return Err(outside_workspace(path));
        }

        Ok(canonical)
    }

    /// Canonicalize a path whose tail may not exist yet.
    ///
    /// The deepest present ancestor is inspected without following links.
    /// A symlink there, dangling or not, is resolved by hand and must stay
    /// inside the root before the remainder is re-appended.
    async fn canonicalize_allow_missing(&self, normalized: &Path, display: &str) -> Result<PathBuf> {
        let mut target = normalized.to_path_buf();

        for _ in 0..MAX_SYMLINK_HOPS {
            if tokio::fs::try_exists(&target).await? {
                return tokio::fs::canonicalize(&target)
                    .await
                    .with_context(|| format!("Failed to resolve '{}'", target.display()));
            }

            let (present, remainder) = deepest_present(&target).await?;
            let metadata = tokio::fs::symlink_metadata(&present).await?;
            if !metadata.file_type().is_symlink() {
                let canonical = tokio::fs::canonicalize(&present)
                    .await
                    .with_context(|| format!("Failed to resolve '{}'", present.display()))?;
                return Ok(join_remainder(canonical, &remainder));
            }

            let link = tokio::fs::read_link(&present)
                .await
                .with_context(|| format!("Failed to read link '{}'", present.display()))?;
            let parent = present.parent().unwrap_or(Path::new("/"));
            let parent = tokio::fs::canonicalize(parent)
                .await
                .with_context(|| format!("Failed to resolve '{}'", parent.display()))?;
            let resolved = normalize_path(&parent.join(link));
            if !resolved.starts_with(&self.root) {
                return Err(outside_workspace(display));
            }
            target = join_remainder(resolved, &remainder);
        }

        Err(anyhow!("Path '{display}' has too many levels of symbolic links"))
    }

    /// Path relative to the workspace root, for display in tool output.
    pub fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }
}

fn outside_workspace(path: &str) -> anyhow::Error {
    anyhow!("Path '{path}' resolves outside the workspace")
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                normalized.pop();
            }
            Component::CurDir => {}
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}

/// Deepest ancestor of `path` (itself included) that exists as a directory
/// entry, links not followed, plus the missing remainder.
async fn deepest_present(path: &Path) -> Result<(PathBuf, PathBuf)> {
    for ancestor in path.ancestors() {
        if tokio::fs::symlink_metadata(ancestor).await.is_ok() {
            let remainder = path.strip_prefix(ancestor).unwrap_or(Path::new(""));
            return Ok((ancestor.to_path_buf(), remainder.to_path_buf()));
        }
    }
    Err(anyhow!("No existing ancestor for '{}'", path.display()))
}

fn join_remainder(base: PathBuf, remainder: &Path) -> PathBuf {
    if remainder.as_os_str().is_empty() {
        base
    } else {
        base.join(remainder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, Workspace) {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path()).unwrap();
        (dir, workspace)
    }

    #[tokio::test]
    async fn resolves_missing_files_inside_root() {
        let (_dir, workspace) = workspace();
        let resolved = workspace.resolve("src/new/file.rs").await.unwrap();
        assert_eq!(resolved, workspace.root().join("src/new/file.rs"));
        assert_eq!(workspace.relative(&resolved), "src/new/file.rs");
    }

    #[tokio::test]
    async fn rejects_parent_traversal() {
        let (_dir, workspace) = workspace();
        let err = workspace.resolve("../outside.txt").await.unwrap_err();
        assert!(err.to_string().contains("outside the workspace"));

        assert!(workspace.resolve("a/../../b").await.is_err());
        assert!(workspace.resolve("a/../b").await.is_ok());
    }

    #[tokio::test]
    async fn rejects_absolute_paths_elsewhere() {
        let (_dir, workspace) = workspace();
        assert!(workspace.resolve("/etc/passwd").await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn rejects_symlink_escape() {
        let (dir, workspace) = workspace();
        let outside = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        let err = workspace.resolve("link/secret.txt").await.unwrap_err();
        assert!(err.to_string().contains("outside the workspace"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn rejects_dangling_symlink_escape() {
        let (dir, workspace) = workspace();
        let outside = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path().join("escaped.txt"), dir.path().join("link"))
            .unwrap();
        std::os::unix::fs::symlink(outside.path().join("gone"), dir.path().join("dir_link"))
            .unwrap();

        let err = workspace.resolve("link").await.unwrap_err();
        assert!(err.to_string().contains("outside the workspace"));
        assert!(workspace.resolve("dir_link/nested/file.txt").await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn dangling_symlink_inside_root_resolves_to_target() {
        let (dir, workspace) = workspace();
        std::os::unix::fs::symlink("drafts/plan.md", dir.path().join("plan")).unwrap();

        let resolved = workspace.resolve("plan").await.unwrap();
        assert_eq!(resolved, workspace.root().join("drafts/plan.md"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlink_loop_is_rejected() {
        let (dir, workspace) = workspace();
        std::os::unix::fs::symlink("b", dir.path().join("a")).unwrap();
        std::os::unix::fs::symlink("a", dir.path().join("b")).unwrap();

        assert!(workspace.resolve("a/file.txt").await.is_err());
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(Workspace::new(dir.path().join("nope")).is_err());
    }
}
