//! Product Requirements Document
//!
//! The model's PRD markdown followed by an appendix holding every analysis
//! section the PRD was synthesized from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use super::{render_section, section_title};
use crate::agents::AgentResult;
use crate::constants::report::{PRD_FILE_NAME, PRD_TITLE};
use crate::pipeline::{PipelineState, Stage};
use crate::types::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Result of the PRD stage
    pub prd: AgentResult,
    pub generated_at: DateTime<Utc>,
    content: String,
}

impl Document {
    pub fn new(state: &PipelineState, prd: AgentResult) -> Self {
        let body = prd.text("prd_document");
        let mut content = if body.trim_start().starts_with('#') {
            body.trim().to_string()
        } else {
            format!("# {}\n\n{}", PRD_TITLE, body.trim())
        };

        content.push_str("\n\n---\n\n# Analysis Appendix\n");
        for result in Stage::ANALYSIS.iter().filter_map(|s| state.get(*s)) {
            content.push_str(&format!(
                "\n## {}\n\n{}\n",
                section_title(result.stage),
                render_section(result)
            ));
        }

        Self {
            prd,
            generated_at: Utc::now(),
            content,
        }
    }

    pub fn markdown(&self) -> &str {
        &self.content
    }

    pub fn file_name() -> &'static str {
        PRD_FILE_NAME
    }

    /// Write to `path`; a directory receives the default file name
    pub fn write_to(&self, path: &Path) -> Result<PathBuf> {
        let target = if path.is_dir() {
            path.join(PRD_FILE_NAME)
        } else {
            path.to_path_buf()
        };
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, &self.content)?;
        info!("Wrote PRD to {} ({} bytes)", target.display(), self.content.len());
        Ok(target)
    }
}
