//! Categorical feature encoding.
//!
//! Categories are plain strings as read from the dataset. The encoder learns the
//! sorted set of observed values per column and emits one binary indicator column per
//! value, named `"<column>_<category>"`.

mod one_hot;

pub use one_hot::{FittedOneHotEncoder, OneHotEncoder, OneHotEncoderParams};
