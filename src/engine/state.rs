/// Where one request is in the bounded retry loop.
///
/// ```text
/// Compile → Attempt(1) → … → Attempt(k) → Success
///                                      ↘ Attempt(k+1)   (k < max)
///                                      ↘ Exhausted       (k = max)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Compile,
    Attempt { number: u32 },
    Success { attempts: u32 },
    Exhausted { attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineEvent {
    Compiled,
    Verified { passed: bool },
}

impl PipelineState {
    /// Pure transition. Events that do not apply leave the state unchanged.
    pub fn advance(self, event: PipelineEvent, max_attempts: u32) -> PipelineState {
        match (self, event) {
            (PipelineState::Compile, PipelineEvent::Compiled) => {
                PipelineState::Attempt { number: 1 }
            }
            (PipelineState::Attempt { number }, PipelineEvent::Verified { passed: true }) => {
                PipelineState::Success { attempts: number }
            }
            (PipelineState::Attempt { number }, PipelineEvent::Verified { passed: false })
                if number < max_attempts =>
            {
                PipelineState::Attempt { number: number + 1 }
            }
            (PipelineState::Attempt { number }, PipelineEvent::Verified { passed: false }) => {
                PipelineState::Exhausted { attempts: number }
            }
            (state, _) => state,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::Success { .. } | PipelineState::Exhausted { .. }
        )
    }
}
