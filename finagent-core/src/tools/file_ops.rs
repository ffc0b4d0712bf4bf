use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use walkdir::WalkDir;

use super::{Tool, Workspace};

pub const MAX_WRITE_BYTES: usize = 64_000;
const MAX_SEARCH_RESULTS: usize = 200;
const MAX_SEARCH_DEPTH: usize = 12;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ReadMode {
    #[default]
    View,
    List,
    Search,
}

#[derive(Debug, Deserialize)]
struct ReadArgs {
    #[serde(default = "current_dir")]
    path: String,
    #[serde(default)]
    mode: ReadMode,
    start_line: Option<usize>,
    end_line: Option<usize>,
    pattern: Option<String>,
}

fn current_dir() -> String {
    ".".to_string()
}

pub(crate) fn parse_args<T: for<'de> Deserialize<'de>>(tool: &str, args: Value) -> Result<T> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args).with_context(|| format!("Invalid arguments for {tool}"))
}

/// `file_read`: view a file, list a directory or search for file names.
#[derive(Debug, Clone)]
pub struct FileReadTool {
    workspace: Workspace,
}

impl FileReadTool {
    pub const NAME: &'static str = "file_read";

    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    async fn view(&self, path: &Path, args: &ReadArgs) -> Result<Value> {
        if path.is_dir() {
            bail!(
                "'{}' is a directory; use mode \"list\" instead",
                self.workspace.relative(path)
            );
        }
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read '{}'", self.workspace.relative(path)))?;

        let lines: Vec<&str> = content.lines().collect();
        let total = lines.len();
        let start = args.start_line.unwrap_or(1).max(1);
        let end = args.end_line.unwrap_or(total).min(total);
        if start > end && total > 0 {
            bail!("Invalid line range {start}..{end} for a file with {total} lines");
        }

        let content = if args.start_line.is_none() && args.end_line.is_none() {
            content
        } else {
            lines
                .get(start - 1..end)
                .unwrap_or_default()
                .join("\n")
        };

        Ok(json!({
            "path": self.workspace.relative(path),
            "content": content,
            "start_line": start,
            "end_line": end,
            "total_lines": total,
        }))
    }

    async fn list(&self, path: &Path) -> Result<Value> {
        let mut dir = tokio::fs::read_dir(path)
            .await
            .with_context(|| format!("Failed to list '{}'", self.workspace.relative(path)))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let metadata = entry.metadata().await?;
            entries.push(json!({
                "name": entry.file_name().to_string_lossy(),
                "kind": if metadata.is_dir() { "directory" } else { "file" },
                "size": metadata.len(),
            }));
        }
        entries.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));

        Ok(json!({
            "path": self.workspace.relative(path),
            "entries": entries,
        }))
    }

    async fn search(&self, path: PathBuf, pattern: String) -> Result<Value> {
        let root = self.workspace.root().to_path_buf();
        let needle = pattern.to_lowercase();

        let (matches, truncated) = tokio::task::spawn_blocking(move || {
            let mut matches = Vec::new();
            let walker = WalkDir::new(&path)
                .max_depth(MAX_SEARCH_DEPTH)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));

            for entry in walker.filter_map(|entry| entry.ok()) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().to_lowercase();
                if !name.contains(&needle) {
                    continue;
                }
                if matches.len() == MAX_SEARCH_RESULTS {
                    return (matches, true);
                }
                let relative = entry
                    .path()
                    .strip_prefix(&root)
                    .unwrap_or(entry.path())
                    .to_string_lossy()
                    .into_owned();
                matches.push(relative);
            }
            (matches, false)
        })
        .await
        .context("File search task failed")?;

        Ok(json!({
            "pattern": pattern,
            "matches": matches,
            "truncated": truncated,
        }))
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str()
        .is_some_and(|name| name.len() > 1 && name.starts_with('.'))
}

#[async_trait]
impl Tool for FileReadTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Read files, list directories, search for files by name"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "Path relative to the workspace root"},
                "mode": {"type": "string", "enum": ["view", "list", "search"], "default": "view"},
                "start_line": {"type": "integer", "minimum": 1},
                "end_line": {"type": "integer", "minimum": 1},
                "pattern": {"type": "string", "description": "File name fragment for search mode"}
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let args: ReadArgs = parse_args(Self::NAME, args)?;
        let path = self.workspace.resolve(&args.path).await?;

        match args.mode {
            ReadMode::View => self.view(&path, &args).await,
            ReadMode::List => self.list(&path).await,
            ReadMode::Search => {
                let pattern = args
                    .pattern
                    .clone()
                    .filter(|pattern| !pattern.is_empty())
                    .ok_or_else(|| anyhow!("search mode requires a non-empty 'pattern'"))?;
                self.search(path, pattern).await
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct WriteArgs {
    path: String,
    content: String,
}

/// `file_write`: create or overwrite a file inside the workspace.
#[derive(Debug, Clone)]
pub struct FileWriteTool {
    workspace: Workspace,
}

impl FileWriteTool {
    pub const NAME: &'static str = "file_write";

    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for FileWriteTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Create new files or overwrite existing files"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "Path relative to the workspace root"},
                "content": {"type": "string", "description": "Full file contents"}
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let args: WriteArgs = parse_args(Self::NAME, args)?;
        if args.content.len() > MAX_WRITE_BYTES {
            bail!(
                "Content is {} bytes; file_write accepts at most {MAX_WRITE_BYTES}",
                args.content.len()
            );
        }

        let path = self.workspace.resolve(&args.path).await?;
        if path.is_dir() {
            bail!("'{}' is a directory", args.path);
        }
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directories for '{}'", args.path))?;
        }
        let existed = tokio::fs::try_exists(&path).await.unwrap_or(false);
        tokio::fs::write(&path, args.content.as_bytes())
            .await
            .with_context(|| format!("Failed to write '{}'", args.path))?;

        Ok(json!({
            "path": self.workspace.relative(&path),
            "bytes_written": args.content.len(),
            "created": !existed,
        }))
    }
}
