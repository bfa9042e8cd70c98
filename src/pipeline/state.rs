/// Where a pipeline run is. Every failure is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Extracting,
    Extracted,
    NoData,
    Transforming,
    Transformed,
    Loading,
    Loaded,
    Failed,
}

impl Phase {
    pub fn as_str(&self) -> &str {
        match self {
            Phase::Idle => "idle",
            Phase::Extracting => "extracting",
            Phase::Extracted => "extracted",
            Phase::NoData => "no_data",
            Phase::Transforming => "transforming",
            Phase::Transformed => "transformed",
            Phase::Loading => "loading",
            Phase::Loaded => "loaded",
            Phase::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::NoData | Phase::Loaded | Phase::Failed)
    }

    /// Legal forward step. Any non-terminal phase may fail.
    pub fn can_advance_to(&self, next: Phase) -> bool {
        use Phase::*;
        match (self, next) {
            (s, Failed) => !s.is_terminal(),
            (Idle, Extracting)
            | (Extracting, Extracted)
            | (Extracting, NoData)
            | (Extracted, Transforming)
            | (Transforming, Transformed)
            | (Transformed, Loading)
            | (Loading, Loaded) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
