//! Built-in content transforms for every [`StageKind`].

pub mod command;
pub mod copy;
pub mod minify;
pub mod optimize;
pub mod page;
pub mod script;
pub mod style;
pub mod useref;

pub use copy::CopyStage;
pub use minify::MinifyStage;
pub use optimize::OptimizeStage;
pub use page::PageStage;
pub use script::ScriptStage;
pub use style::StyleStage;
pub use useref::UserefStage;

use pagekit_core::{Config, StageFactory, StageKind, Transform};

pub fn get_stage(kind: StageKind, config: &Config) -> Box<dyn Transform> {
    match kind {
        StageKind::Style => Box::new(StyleStage),
        StageKind::Script => Box::new(ScriptStage::new(config.stages.script.clone())),
        StageKind::Page => Box::new(PageStage),
        StageKind::Optimize => Box::new(OptimizeStage::new(config.stages.image.clone())),
        StageKind::Useref => Box::new(UserefStage),
        StageKind::Minify => Box::new(MinifyStage),
        StageKind::Copy => Box::new(CopyStage),
    }
}

/// [`StageFactory`] backed by [`get_stage`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultStages;

impl StageFactory for DefaultStages {
    fn stage(&self, kind: StageKind, config: &Config) -> Box<dyn Transform> {
        get_stage(kind, config)
    }
}
