use pagekit_core::{FileRecord, Result, StageContext, StageKind, Transform};

pub struct CopyStage;

impl Transform for CopyStage {
    fn kind(&self) -> StageKind {
        StageKind::Copy
    }

    fn transform(&self, file: FileRecord, _ctx: &StageContext<'_>) -> Result<Vec<FileRecord>> {
        Ok(vec![file])
    }
}
