use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use super::file_ops::{MAX_WRITE_BYTES, parse_args};
use super::{Tool, Workspace};

#[derive(Debug, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
enum EditorCommand {
    View {
        path: String,
    },
    Create {
        path: String,
        file_text: String,
    },
    StrReplace {
        path: String,
        old_str: String,
        #[serde(default)]
        new_str: String,
    },
    Insert {
        path: String,
        insert_line: usize,
        new_str: String,
    },
}

/// `editor`: view, create and edit files in place.
#[derive(Debug, Clone)]
pub struct EditorTool {
    workspace: Workspace,
}

impl EditorTool {
    pub const NAME: &'static str = "editor";

    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    async fn read(&self, path: &str) -> Result<(std::path::PathBuf, String)> {
        let resolved = self.workspace.resolve(path).await?;
        let content = tokio::fs::read_to_string(&resolved)
            .await
            .with_context(|| format!("Failed to read '{path}'"))?;
        Ok((resolved, content))
    }

    async fn write(&self, path: &std::path::Path, display: &str, content: &str) -> Result<()> {
        if content.len() > MAX_WRITE_BYTES {
            bail!(
                "Edited file would be {} bytes; the limit is {MAX_WRITE_BYTES}",
                content.len()
            );
        }
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write '{display}'"))
    }

    async fn view(&self, path: &str) -> Result<Value> {
        let (_, content) = self.read(path).await?;
        let numbered = content
            .lines()
            .enumerate()
            .map(|(idx, line)| format!("{:>6}\t{line}", idx + 1))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(json!({ "path": path, "content": numbered }))
    }

    async fn create(&self, path: &str, file_text: &str) -> Result<Value> {
        let resolved = self.workspace.resolve(path).await?;
        if tokio::fs::try_exists(&resolved).await? {
            bail!("'{path}' already exists; use str_replace or insert to modify it");
        }
        if let Some(parent) = resolved.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        self.write(&resolved, path, file_text).await?;
        Ok(json!({ "path": path, "created": true }))
    }

    async fn str_replace(&self, path: &str, old_str: &str, new_str: &str) -> Result<Value> {
        if old_str.is_empty() {
            bail!("old_str must not be empty");
        }
        let (resolved, content) = self.read(path).await?;
        match content.matches(old_str).count() {
            0 => bail!("old_str was not found in '{path}'"),
            1 => {}
            n => bail!("old_str occurs {n} times in '{path}'; include more context to make it unique"),
        }

        let updated = content.replacen(old_str, new_str, 1);
        self.write(&resolved, path, &updated).await?;
        Ok(json!({ "path": path, "replaced": 1 }))
    }

    async fn insert(&self, path: &str, insert_line: usize, new_str: &str) -> Result<Value> {
        let (resolved, content) = self.read(path).await?;
        let mut lines: Vec<&str> = content.lines().collect();
        if insert_line > lines.len() {
            return Err(anyhow!(
                "insert_line {insert_line} is past the end of '{path}' ({} lines)",
                lines.len()
            ));
        }

        let inserted = new_str.split('\n').count();
        for (offset, line) in new_str.split('\n').enumerate() {
            lines.insert(insert_line + offset, line);
        }

        let mut updated = lines.join("\n");
        if content.ends_with('\n') || content.is_empty() {
            updated.push('\n');
        }
        self.write(&resolved, path, &updated).await?;
        Ok(json!({ "path": path, "inserted_lines": inserted, "after_line": insert_line }))
    }
}

#[async_trait]
impl Tool for EditorTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Edit existing files using search and replace, insert lines, create or view files"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {"type": "string", "enum": ["view", "create", "str_replace", "insert"]},
                "path": {"type": "string", "description": "Path relative to the workspace root"},
                "file_text": {"type": "string", "description": "Contents for create"},
                "old_str": {"type": "string", "description": "Exact text to replace; must occur once"},
                "new_str": {"type": "string", "description": "Replacement or inserted text"},
                "insert_line": {"type": "integer", "minimum": 0, "description": "Insert after this line; 0 inserts at the top"}
            },
            "required": ["command", "path"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let command: EditorCommand = parse_args(Self::NAME, args)?;
        match command {
            EditorCommand::View { path } => self.view(&path).await,
            EditorCommand::Create { path, file_text } => self.create(&path, &file_text).await,
            EditorCommand::StrReplace {
                path,
                old_str,
                new_str,
            } => self.str_replace(&path, &old_str, &new_str).await,
            EditorCommand::Insert {
                path,
                insert_line,
                new_str,
            } => self.insert(&path, insert_line, &new_str).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn setup(content: &str) -> (TempDir, EditorTool) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("lib.rs"), content).unwrap();
        let tool = EditorTool::new(Workspace::new(dir.path()).unwrap());
        (dir, tool)
    }

    fn read(dir: &TempDir) -> String {
        std::fs::read_to_string(dir.path().join("lib.rs")).unwrap()
    }

    #[tokio::test]
    async fn str_replace_edits_single_occurrence() {
        let (dir, tool) = setup("let rate = 0.05;\nlet years = 10;\n");
        tool.execute(json!({
            "command": "str_replace",
            "path": "lib.rs",
            "old_str": "0.05",
            "new_str": "0.07"
        }))
        .await
        .unwrap();
        assert_eq!(read(&dir), "let rate = 0.07;\nlet years = 10;\n");
    }

    #[tokio::test]
    async fn str_replace_rejects_ambiguous_match() {
        let (dir, tool) = setup("x = 1;\nx = 1;\n");
        let err = tool
            .execute(json!({
                "command": "str_replace",
                "path": "lib.rs",
                "old_str": "x = 1;",
                "new_str": "x = 2;"
            }))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("occurs 2 times"));
        assert_eq!(read(&dir), "x = 1;\nx = 1;\n");
    }

    #[tokio::test]
    async fn str_replace_reports_missing_text() {
        let (_dir, tool) = setup("fn main() {}\n");
        let err = tool
            .execute(json!({
                "command": "str_replace",
                "path": "lib.rs",
                "old_str": "fn helper",
                "new_str": ""
            }))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn insert_places_text_after_line() {
        let (dir, tool) = setup("a\nc\n");
        tool.execute(json!({
            "command": "insert",
            "path": "lib.rs",
            "insert_line": 1,
            "new_str": "b"
        }))
        .await
        .unwrap();
        assert_eq!(read(&dir), "a\nb\nc\n");

        tool.execute(json!({
            "command": "insert",
            "path": "lib.rs",
            "insert_line": 0,
            "new_str": "// header"
        }))
        .await
        .unwrap();
        assert_eq!(read(&dir), "// header\na\nb\nc\n");
    }

    #[tokio::test]
    async fn insert_past_end_is_rejected() {
        let (_dir, tool) = setup("a\n");
        let err = tool
            .execute(json!({
                "command": "insert",
                "path": "lib.rs",
                "insert_line": 5,
                "new_str": "b"
            }))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("past the end"));
    }

    #[tokio::test]
    async fn create_refuses_to_overwrite() {
        let (dir, tool) = setup("original\n");
        let err = tool
            .execute(json!({"command": "create", "path": "lib.rs", "file_text": "new"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));

        tool.execute(json!({"command": "create", "path": "src/new.rs", "file_text": "new"}))
            .await
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("src/new.rs")).unwrap(),
            "new"
        );
    }

    #[tokio::test]
    async fn view_numbers_lines() {
        let (_dir, tool) = setup("first\nsecond\n");
        let out = tool
            .execute(json!({"command": "view", "path": "lib.rs"}))
            .await
            .unwrap();
        assert_eq!(out["content"], "     1\tfirst\n     2\tsecond");
    }

    #[tokio::test]
    async fn unknown_command_is_an_argument_error() {
        let (_dir, tool) = setup("");
        let err = tool
            .execute(json!({"command": "delete", "path": "lib.rs"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid arguments for editor"));
    }
}
