use super::{ApplicationState, PipeName, PipeState};

impl ApplicationState {
    /// Structural copy with one pipe replaced.
    pub fn with_pipe(&self, name: PipeName, pipe: PipeState) -> Self {
        let mut next = self.clone();
        match name {
            PipeName::Bath => next.bath = pipe,
            PipeName::Shower => next.shower = pipe,
        }
        next
    }

    pub fn with_current_volume(&self, volume: f64) -> Self {
        Self {
            current_volume: volume,
            ..self.clone()
        }
    }

    pub fn with_bad_water_quality(&self, bad: bool) -> Self {
        Self {
            bad_water_quality: bad,
            ..self.clone()
        }
    }
}
