use pagekit_core::{FileRecord, Result, StageContext, StageKind, Transform};

use crate::command;

/// Passes scripts through, or through the configured transpiler.
pub struct ScriptStage {
    command: Option<String>,
}

impl ScriptStage {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }
}

impl Transform for ScriptStage {
    fn kind(&self) -> StageKind {
        StageKind::Script
    }

    fn transform(&self, file: FileRecord, ctx: &StageContext<'_>) -> Result<Vec<FileRecord>> {
        match self.command.as_deref() {
            Some(cmd) if !cmd.trim().is_empty() => {
                let output = command::pipe("script", cmd, &file, ctx)?;
                Ok(vec![file.with_contents(output)])
            }
            _ => Ok(vec![file]),
        }
    }
}
