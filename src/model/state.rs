/// A marker type indicating that a model is **not yet trained**.
///
/// Training methods (like `Trainer::fit`) require an `Unfitted` model, and `predict`
/// is not available until the model is converted to `Fitted`.
#[derive(Clone, Copy, Debug)]
pub struct Unfitted;

/// A marker type indicating that a model has been **fully trained**.
///
/// A `Fitted` model contains only inference parameters: no optimizer state, loss
/// function, or training hyperparameters.
#[derive(Clone, Copy, Debug)]
pub struct Fitted;
