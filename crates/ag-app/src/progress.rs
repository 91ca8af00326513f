#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Compiling,
    CheckingCache,
    LoadingCachedResult,
    BuildingGeometry,
    Synthesizing,
    SavingResults,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyProgress {
    /// Position in the processing order
    pub index: usize,
    pub count: usize,
    pub frequency_hz: f64,
}

impl FrequencyProgress {
    pub fn fraction_complete(&self) -> f64 {
        if self.count == 0 {
            1.0
        } else {
            (self.index + 1) as f64 / self.count as f64
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub frequency: Option<FrequencyProgress>,
}

impl RunProgressEvent {
    pub fn stage(stage: RunStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
            frequency: None,
        }
    }
}
