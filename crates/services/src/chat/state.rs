use std::fmt;
use uuid::Uuid;

/// Stages of one chat pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    DerivingQuery,
    Searching,
    Composing,
    Completing,
    Streaming,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether `next` is a legal successor of `self`
    pub fn allows(self, next: PipelineState) -> bool {
        use PipelineState::*;

        if next == Failed {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (Idle, DerivingQuery)
                | (Idle, Completing)
                | (DerivingQuery, Searching)
                | (Searching, Composing)
                | (Composing, Completing)
                | (Completing, Streaming)
                | (Streaming, Done)
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::DerivingQuery => "deriving_query",
            Self::Searching => "searching",
            Self::Composing => "composing",
            Self::Completing => "completing",
            Self::Streaming => "streaming",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Tracks the state of a single request through the pipeline
#[derive(Debug)]
pub struct PipelineRun {
    id: Uuid,
    state: PipelineState,
}

impl PipelineRun {
    pub fn new() -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(run_id = %id, "Chat pipeline run started");
        Self {
            id,
            state: PipelineState::Idle,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn advance(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.allows(next),
            "illegal pipeline transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(run_id = %self.id, from = %self.state, to = %next, "Pipeline state transition");
        self.state = next;
    }

    /// Move to `Failed`, logging the error with the state it happened in
    pub fn fail<E: fmt::Display>(&mut self, error: E) -> E {
        if self.state.is_terminal() {
            return error;
        }
        tracing::warn!(run_id = %self.id, state = %self.state, error = %error, "Pipeline run failed");
        self.state = PipelineState::Failed;
        error
    }
}

impl Default for PipelineRun {
    fn default() -> Self {
        Self::new()
    }
}
