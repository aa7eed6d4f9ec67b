//! One-hot encoding for string categorical features.

use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One-hot encoder for categorical features.
///
/// Each input column is a categorical feature. Fitting learns the unique values present
/// in each column (sorted), and every value becomes its own output column. No reference
/// category is dropped.
///
/// # Example
/// ```ignore
/// use gridguardian::preprocessing::{OneHotEncoder, Transformer, FittedTransformer};
///
/// let rows = vec![
///     vec!["Fridge".to_string(), "Winter".to_string()],
///     vec!["Oven".to_string(), "Summer".to_string()],
/// ];
/// let fitted = OneHotEncoder::new(["Appliance Type", "Season"]).fit(&rows)?;
/// assert_eq!(
///     fitted.feature_names_out(),
///     ["Appliance Type_Fridge", "Appliance Type_Oven", "Season_Summer", "Season_Winter"]
/// );
/// // [[1, 0, 0, 1],
/// //  [0, 1, 1, 0]]
/// let encoded = fitted.transform(&rows)?;
/// ```
#[derive(Clone, Debug)]
pub struct OneHotEncoder {
    columns: Vec<String>,
}

impl OneHotEncoder {
    /// Create an encoder for the named input columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// Serializable parameters for a fitted OneHotEncoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoderParams {
    /// Input column names.
    pub columns: Vec<String>,
    /// Sorted categories for each input column.
    pub categories: Vec<Vec<String>>,
}

/// Fitted OneHotEncoder ready for inference.
#[derive(Clone, Debug)]
pub struct FittedOneHotEncoder {
    columns: Vec<String>,
    categories: Vec<Vec<String>>,
}

impl FittedOneHotEncoder {
    /// Get the sorted categories learned for each input column.
    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }

    /// Get the number of output features.
    pub fn n_features_out(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    /// Output column names in output order: `"<column>_<category>"`.
    pub fn feature_names_out(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(&self.categories)
            .flat_map(|(col, cats)| cats.iter().map(move |cat| format!("{col}_{cat}")))
            .collect()
    }

    fn check_width(&self, row: &[String], index: usize) -> Result<(), PreprocessingError> {
        if row.len() != self.columns.len() {
            return Err(PreprocessingError::InvalidShape {
                expected: format!("{} categorical values", self.columns.len()),
                got: format!("{} in row {}", row.len(), index),
            });
        }
        Ok(())
    }
}

impl Transformer for OneHotEncoder {
    type Input = [Vec<String>];
    type Output = Array2<f64>;
    type Params = OneHotEncoderParams;
    type Fitted = FittedOneHotEncoder;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        if data.is_empty() {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit OneHotEncoder on empty data".to_string(),
            ));
        }

        let mut seen: Vec<BTreeSet<&str>> = vec![BTreeSet::new(); self.columns.len()];
        for (i, row) in data.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(PreprocessingError::InvalidShape {
                    expected: format!("{} categorical values", self.columns.len()),
                    got: format!("{} in row {}", row.len(), i),
                });
            }
            for (col, value) in row.iter().enumerate() {
                if value.is_empty() {
                    return Err(PreprocessingError::InvalidValue(format!(
                        "empty category in column {:?}, row {}",
                        self.columns[col], i
                    )));
                }
                seen[col].insert(value.as_str());
            }
        }

        let categories = seen
            .into_iter()
            .map(|set| set.into_iter().map(str::to_string).collect())
            .collect();

        Ok(FittedOneHotEncoder {
            columns: self.columns.clone(),
            categories,
        })
    }
}

impl FittedTransformer for FittedOneHotEncoder {
    type Input = [Vec<String>];
    type Output = Array2<f64>;
    type Params = OneHotEncoderParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        let mut result = Array2::zeros((data.len(), self.n_features_out()));

        for (i, row) in data.iter().enumerate() {
            self.check_width(row, i)?;
            let mut offset = 0;
            for (col, value) in row.iter().enumerate() {
                let cats = &self.categories[col];
                match cats.binary_search(value) {
                    Ok(idx) => result[[i, offset + idx]] = 1.0,
                    Err(_) => {
                        return Err(PreprocessingError::UnknownCategory {
                            column: self.columns[col].clone(),
                            value: value.clone(),
                        })
                    }
                }
                offset += cats.len();
            }
        }

        Ok(result)
    }

    fn extract_params(&self) -> Self::Params {
        OneHotEncoderParams {
            columns: self.columns.clone(),
            categories: self.categories.clone(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        if params.columns.len() != params.categories.len() {
            return Err(PreprocessingError::InvalidShape {
                expected: format!("{} category lists", params.columns.len()),
                got: params.categories.len().to_string(),
            });
        }
        // binary_search in transform relies on this
        if params
            .categories
            .iter()
            .any(|cats| cats.windows(2).any(|w| w[0] >= w[1]))
        {
            return Err(PreprocessingError::InvalidParameter(
                "categories must be sorted and unique".to_string(),
            ));
        }
        Ok(Self {
            columns: params.columns,
            categories: params.categories,
        })
    }

    fn n_features_in(&self) -> usize {
        self.columns.len()
    }
}
