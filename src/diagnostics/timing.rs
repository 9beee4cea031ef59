use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Wall time spent in one stage of a tool run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

impl StageTiming {
    pub fn new(label: impl Into<String>, elapsed_ms: f64) -> Self {
        Self {
            label: label.into(),
            elapsed_ms,
        }
    }
}

/// Per-stage timings plus the total of a run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    pub fn with_total(total_ms: f64) -> Self {
        Self {
            total_ms,
            stages: Vec::new(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, elapsed_ms: f64) {
        self.stages.push(StageTiming::new(label, elapsed_ms));
    }

    /// Run `f`, recording its wall time under `label`.
    pub fn measure<T>(&mut self, label: impl Into<String>, f: impl FnOnce() -> T) -> T {
        let t0 = Instant::now();
        let out = f();
        self.push(label, t0.elapsed().as_secs_f64() * 1000.0);
        out
    }

    pub fn stage(&self, label: &str) -> Option<&StageTiming> {
        self.stages.iter().find(|s| s.label == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_records_stage_and_returns_value() {
        let mut timings = TimingBreakdown::default();
        let v = timings.measure("answer", || 42);
        assert_eq!(v, 42);
        assert_eq!(timings.stages.len(), 1);
        assert!(timings.stage("answer").unwrap().elapsed_ms >= 0.0);
        assert!(timings.stage("missing").is_none());
    }

    #[test]
    fn serializes_camel_case() {
        let mut timings = TimingBreakdown::with_total(3.5);
        timings.push("describe", 1.25);
        let json = serde_json::to_value(&timings).unwrap();
        assert_eq!(json["totalMs"], 3.5);
        assert_eq!(json["stages"][0]["elapsedMs"], 1.25);
    }
}
