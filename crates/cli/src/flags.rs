use clap::ValueEnum;
use headerdoc_transformer::TransformMode;

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum TransformModeFlag {
    Chat,
    Stub,
}

impl TransformModeFlag {
    pub(crate) const fn as_domain(self) -> TransformMode {
        match self {
            TransformModeFlag::Chat => TransformMode::Chat,
            TransformModeFlag::Stub => TransformMode::Stub,
        }
    }
}
