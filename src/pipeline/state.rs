use crate::foundation::error::{ReelError, ReelResult};

/// Stage of one generation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Validating input and preparing directories.
    Initializing,
    /// Drawing the frame sequence.
    RenderingFrames,
    /// Producing the narration track.
    SynthesizingAudio,
    /// Muxing frames and audio.
    Encoding,
    /// Finished successfully. Terminal.
    Ready,
    /// Finished with an error. Terminal.
    Failed,
}

impl PipelineState {
    /// Whether no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Ready | PipelineState::Failed)
    }

    fn successor(self) -> Option<PipelineState> {
        match self {
            PipelineState::Initializing => Some(PipelineState::RenderingFrames),
            PipelineState::RenderingFrames => Some(PipelineState::SynthesizingAudio),
            PipelineState::SynthesizingAudio => Some(PipelineState::Encoding),
            PipelineState::Encoding => Some(PipelineState::Ready),
            PipelineState::Ready | PipelineState::Failed => None,
        }
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PipelineState::Initializing => "initializing",
            PipelineState::RenderingFrames => "rendering_frames",
            PipelineState::SynthesizingAudio => "synthesizing_audio",
            PipelineState::Encoding => "encoding",
            PipelineState::Ready => "ready",
            PipelineState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Evidence required to enter [`PipelineState::Ready`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadyChecks {
    /// Frames handed to the encoder.
    pub frames: u64,
    /// An audio track exists.
    pub audio: bool,
    /// The encoder reported success.
    pub encoded: bool,
}

/// Linear run lifecycle: each stage advances to the next, any non-terminal stage may fail.
#[derive(Debug)]
pub struct RunStateMachine {
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl Default for RunStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStateMachine {
    /// Machine in [`PipelineState::Initializing`].
    pub fn new() -> Self {
        Self {
            state: PipelineState::Initializing,
            history: vec![PipelineState::Initializing],
        }
    }

    /// Current state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Every state visited, in order.
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    /// Move to `next`, which must directly follow the current non-terminal state and must not be
    /// `Ready` (use [`RunStateMachine::finish`]).
    pub fn advance(&mut self, next: PipelineState) -> ReelResult<()> {
        if next == PipelineState::Ready || self.state.successor() != Some(next) {
            return Err(ReelError::render(format!(
                "illegal pipeline transition {} -> {next}",
                self.state
            )));
        }
        self.enter(next);
        Ok(())
    }

    /// Enter `Ready` from `Encoding` when all completion checks hold.
    pub fn finish(&mut self, checks: ReadyChecks) -> ReelResult<()> {
        if self.state != PipelineState::Encoding {
            return Err(ReelError::render(format!(
                "illegal pipeline transition {} -> ready",
                self.state
            )));
        }
        if checks.frames == 0 || !checks.audio || !checks.encoded {
            return Err(ReelError::render(format!(
                "run cannot be ready: {checks:?}"
            )));
        }
        self.enter(PipelineState::Ready);
        Ok(())
    }

    /// Enter `Failed`. No-op once terminal.
    pub fn fail(&mut self) {
        if !self.state.is_terminal() {
            self.enter(PipelineState::Failed);
        }
    }

    fn enter(&mut self, next: PipelineState) {
        tracing::debug!(from = %self.state, to = %next, "pipeline transition");
        self.state = next;
        self.history.push(next);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/state.rs"]
mod tests;
