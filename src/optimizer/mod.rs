use crate::model::ParamOps;
use serde::{Deserialize, Serialize};

/// Trait for gradient-based optimizers.
///
/// Training logic ([`crate::trainer::Trainer`]) is decoupled from the update rule, so any
/// trainable model can be paired with any optimizer without dynamic dispatch.
pub trait Optimizer<P> {
    /// Performs one update and returns the new parameters.
    ///
    /// `t` is the 1-based count of updates performed so far, including this one; schedules
    /// that decay over time read it.
    fn step(&self, params: &P, gradients: &P, t: usize) -> P;
}

/// Learning-rate schedule for [`SGD`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LearningRate {
    /// `η_t = η_0`
    Constant,
    /// `η_t = η_0 / t^power_t`
    InvScaling { power_t: f64 },
}

/// Stochastic Gradient Descent (SGD) optimizer.
///
/// ```text
/// θ ← θ - η_t · ∇L(θ)
/// ```
#[derive(Clone, Debug)]
pub struct SGD {
    lr: f64,
    schedule: LearningRate,
}

impl SGD {
    /// Creates an SGD optimizer with a constant learning rate.
    pub fn new(lr: f64) -> Self {
        Self {
            lr,
            schedule: LearningRate::Constant,
        }
    }

    pub fn with_schedule(mut self, schedule: LearningRate) -> Self {
        self.schedule = schedule;
        self
    }

    /// Learning rate in effect at update `t`.
    pub fn learning_rate_at(&self, t: usize) -> f64 {
        match self.schedule {
            LearningRate::Constant => self.lr,
            LearningRate::InvScaling { power_t } => self.lr / (t.max(1) as f64).powf(power_t),
        }
    }
}

impl<P: ParamOps> Optimizer<P> for SGD {
    fn step(&self, params: &P, grads: &P, t: usize) -> P {
        params.add(&grads.scale(-self.learning_rate_at(t)))
    }
}
