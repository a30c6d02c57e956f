/// Receives `(completed, total)` probe counts while a discovery run advances.
///
/// The sink is called once per scanned address. Any `FnMut(u64, u64)` closure
/// is a sink.
pub trait ProgressSink {
    fn report(&mut self, completed: u64, total: u64);
}

impl<F: FnMut(u64, u64)> ProgressSink for F {
    fn report(&mut self, completed: u64, total: u64) {
        self(completed, total)
    }
}

/// Discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _completed: u64, _total: u64) {}
}

/// Logs progress at info level every `step` percent.
#[derive(Debug, Clone)]
pub struct LogProgress {
    step: u64,
    last_bucket: Option<u64>,
}

impl LogProgress {
    pub fn every_percent(step: u64) -> Self {
        Self {
            step: step.clamp(1, 100),
            last_bucket: None,
        }
    }

    fn bucket(&self, completed: u64, total: u64) -> u64 {
        if total == 0 {
            return 100 / self.step;
        }
        (completed.saturating_mul(100) / total) / self.step
    }
}

impl ProgressSink for LogProgress {
    fn report(&mut self, completed: u64, total: u64) {
        let bucket = self.bucket(completed, total);
        if self.last_bucket != Some(bucket) {
            self.last_bucket = Some(bucket);
            log::info!("discovery progress: {completed}/{total} probes");
        }
    }
}
