use burn::{lr_scheduler::LrScheduler, tensor::backend::Backend, LearningRate};

/// Configuration for a linear warmup / linear decay learning rate schedule
#[derive(burn::config::Config)]
pub struct LinearWarmupConfig {
    /// The peak learning rate, reached at the end of warmup
    pub learning_rate: LearningRate,

    /// Total number of optimizer steps in the run
    pub total_steps: usize,

    /// Steps over which the rate ramps up from zero
    #[config(default = 0)]
    pub warmup_steps: usize,
}

impl LinearWarmupConfig {
    /// Initialize the schedule at step zero
    pub fn init(&self) -> LinearWarmup {
        LinearWarmup {
            learning_rate: self.learning_rate,
            total_steps: self.total_steps,
            warmup_steps: self.warmup_steps,
            step: 0,
        }
    }
}

/// Ramps the learning rate linearly from 0 over the warmup steps, then decays it linearly
/// to 0 at the last step
#[derive(Clone, Debug)]
pub struct LinearWarmup {
    learning_rate: LearningRate,
    total_steps: usize,
    warmup_steps: usize,
    step: usize,
}

impl LinearWarmup {
    /// The rate for the current step
    pub fn lr(&self) -> LearningRate {
        let step = self.step as f64;

        let factor = if self.step < self.warmup_steps {
            step / self.warmup_steps.max(1) as f64
        } else {
            let remaining = self.total_steps.saturating_sub(self.step) as f64;
            let decay_steps = self.total_steps.saturating_sub(self.warmup_steps).max(1) as f64;

            (remaining / decay_steps).max(0.0)
        };

        self.learning_rate * factor
    }

    /// Number of steps taken so far
    pub fn current_step(&self) -> usize {
        self.step
    }
}

impl<B: Backend> LrScheduler<B> for LinearWarmup {
    type Record = usize;

    /// The rate for the current optimizer step, then advance
    fn step(&mut self) -> LearningRate {
        let lr = self.lr();
        self.step += 1;

        lr
    }

    fn to_record(&self) -> Self::Record {
        self.step
    }

    fn load_record(mut self, record: Self::Record) -> Self {
        self.step = record;
        self
    }
}
