use async_trait::async_trait;
use serde_json::json;
use tokio::fs;

use super::{Tool, ToolError, ToolOutput, ToolResult};

/// Reads the contents of an arbitrary file
pub struct FileReadTool;

impl FileReadTool {
    pub fn new() -> Self {
        Self
    }

    /// Slice `content` to `line_count` lines starting at 1-based `start_line`
    pub fn select_lines(content: &str, start_line: usize, line_count: Option<usize>) -> String {
        let lines = content.lines().skip(start_line.saturating_sub(1));
        match line_count {
            Some(count) => lines.take(count).collect::<Vec<_>>().join("\n"),
            None => lines.collect::<Vec<_>>().join("\n"),
        }
    }
}

impl Default for FileReadTool {
    fn default() -> Self {
        Self::new()
    }
}

fn optional_usize(args: &serde_json::Value, key: &str) -> ToolResult<Option<usize>> {
    match args.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| {
                ToolError::InvalidArguments(format!("'{}' must be a positive integer", key))
            }),
    }
}

#[async_trait]
impl Tool for FileReadTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the content of a file. Optionally pass start_line (1-based) and line_count \
         to read only part of it."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path of the file to read"
                },
                "start_line": {
                    "type": "integer",
                    "description": "First line to return, starting at 1"
                },
                "line_count": {
                    "type": "integer",
                    "description": "Number of lines to return"
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> ToolResult<ToolOutput> {
        let path = args["file_path"].as_str().ok_or_else(|| {
            ToolError::InvalidArguments("Missing 'file_path' parameter".to_string())
        })?;
        let start_line = optional_usize(&args, "start_line")?.unwrap_or(1);
        let line_count = optional_usize(&args, "line_count")?;

        match fs::read_to_string(path).await {
            Ok(content) if start_line <= 1 && line_count.is_none() => Ok(ToolOutput::ok(content)),
            Ok(content) => Ok(ToolOutput::ok(Self::select_lines(
                &content, start_line, line_count,
            ))),
            Err(e) => Ok(ToolOutput::err(format!(
                "Failed to read file '{}': {}",
                path, e
            ))),
        }
    }
}
