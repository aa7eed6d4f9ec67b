//! Data preprocessing transformers.
//!
//! Transformers follow the same fitted/unfitted split as models:
//!
//! - [`Transformer`]: unfitted, carries only configuration, learns from data via `fit`.
//! - [`FittedTransformer`]: carries learned parameters, transforms new data, serializes.
//!
//! # Available Transformers
//!
//! - [`OneHotEncoder`]: string categories to binary indicator columns
//! - [`StandardScaler`]: z-score normalization per feature
//!
//! # Example
//!
//! ```ignore
//! use gridguardian::preprocessing::{FittedTransformer, StandardScaler, Transformer};
//!
//! let fitted = StandardScaler::new().fit(&x_train)?;
//! let x_train = fitted.transform(&x_train)?;
//! let x_test = fitted.transform(&x_test)?;
//! ```

pub mod encoding;
pub mod error;
pub mod scaling;
pub mod traits;

pub use encoding::{FittedOneHotEncoder, OneHotEncoder, OneHotEncoderParams};
pub use error::PreprocessingError;
pub use scaling::{FittedStandardScaler, StandardScaler, StandardScalerParams};
pub use traits::{FittedTransformer, Transformer};
