//! Research-output persistence tool.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::io::AsyncWriteExt;

use crate::error::{RagError, Result};
use crate::tool::Tool;

const DEFAULT_OUTPUT_FILE: &str = "research_output.txt";

/// Appends timestamped research output to a local text file.
pub struct SaveTool {
    path: PathBuf,
}

impl Default for SaveTool {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_FILE)
    }
}

impl SaveTool {
    /// Create a save tool writing to the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append `data` as a timestamped research-output block.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Io`] if the file cannot be opened or written.
    pub async fn save(&self, data: &str) -> Result<String> {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let block = format!("--- Research Output ---\nTimestamp: {timestamp}\n\n{data}\n\n");

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(block.as_bytes()).await?;
        file.flush().await?;

        Ok(format!("Data successfully saved to {}", self.path.display()))
    }
}

#[async_trait]
impl Tool for SaveTool {
    fn name(&self) -> &str {
        "save_structured_text_file"
    }

    fn description(&self) -> &str {
        "Save research summaries, structured data, or results into a local text file \
         for later reference. Pass the content as a plain text string."
    }

    fn parameters_schema(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "The text content to store"
                }
            },
            "required": ["content"]
        }))
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let content = args
            .get("content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| RagError::Tool("missing required 'content' parameter".into()))?;
        Ok(Value::String(self.save(content).await?))
    }
}
