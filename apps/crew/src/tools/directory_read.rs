use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::json;
use walkdir::WalkDir;

use super::{Tool, ToolError, ToolOutput, ToolResult};

/// Recursively lists the files under a directory
///
/// The tool is bound to a default directory when constructed; the model
/// may pass `directory` to list somewhere else.
pub struct DirectoryReadTool {
    directory: PathBuf,
    description: String,
}

impl DirectoryReadTool {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        let directory = directory.as_ref().to_path_buf();
        let description = format!(
            "Recursively list the files in a directory. Defaults to the project source \
             directory '{}' when no directory is given.",
            directory.display()
        );
        Self {
            directory,
            description,
        }
    }

    /// Collect every file path below `directory`, sorted
    pub fn list_files(directory: &Path) -> Result<Vec<String>, String> {
        if !directory.is_dir() {
            return Err(format!(
                "Directory '{}' does not exist or is not a directory",
                directory.display()
            ));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(directory).follow_links(false) {
            let entry = entry.map_err(|e| format!("Failed to read directory entry: {}", e))?;
            if entry.file_type().is_file() {
                files.push(entry.path().display().to_string());
            }
        }
        files.sort();

        Ok(files)
    }
}

#[async_trait]
impl Tool for DirectoryReadTool {
    fn name(&self) -> &str {
        "list_directory"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "directory": {
                    "type": "string",
                    "description": "Directory to list; omit to list the project sources"
                }
            }
        })
    }

    async fn execute(&self, args: serde_json::Value) -> ToolResult<ToolOutput> {
        let directory = match args.get("directory") {
            None | Some(serde_json::Value::Null) => self.directory.clone(),
            Some(serde_json::Value::String(d)) if d.trim().is_empty() => self.directory.clone(),
            Some(serde_json::Value::String(d)) => PathBuf::from(d),
            Some(other) => {
                return Err(ToolError::InvalidArguments(format!(
                    "'directory' must be a string, got {}",
                    other
                )))
            }
        };

        let listing = tokio::task::spawn_blocking(move || Self::list_files(&directory))
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;

        match listing {
            Ok(files) if files.is_empty() => Ok(ToolOutput::ok("File paths:\n(no files)")),
            Ok(files) => Ok(ToolOutput::ok(format!("File paths:\n- {}", files.join("\n- ")))),
            Err(e) => Ok(ToolOutput::err(e)),
        }
    }
}
