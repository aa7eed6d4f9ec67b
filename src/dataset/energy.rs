//! Household energy consumption dataset.
//!
//! The CSV is read by header name; only the four columns below are used and any other
//! columns are ignored. Encoding produces the feature layout
//! `[Household Size, Appliance Type_*..., Season_*...]` with every observed category kept
//! and categories in sorted order.

use crate::dataset::{DatasetError, InMemoryDataset};
use crate::preprocessing::{FittedTransformer, OneHotEncoder, Transformer};
use csv::ReaderBuilder;
use ndarray::{concatenate, Array1, Array2, Axis};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub const APPLIANCE_TYPE: &str = "Appliance Type";
pub const ENERGY_CONSUMPTION: &str = "Energy Consumption (kWh)";
pub const SEASON: &str = "Season";
pub const HOUSEHOLD_SIZE: &str = "Household Size";

/// One row of the energy dataset.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EnergyRecord {
    #[serde(rename = "Appliance Type")]
    pub appliance_type: String,
    #[serde(rename = "Energy Consumption (kWh)")]
    pub energy_consumption_kwh: f64,
    #[serde(rename = "Season")]
    pub season: String,
    #[serde(rename = "Household Size")]
    pub household_size: f64,
}

impl EnergyRecord {
    fn check(&self, row: u64) -> Result<(), DatasetError> {
        let invalid = |message: String| DatasetError::InvalidRecord { row, message };
        if self.appliance_type.trim().is_empty() {
            return Err(invalid(format!("empty '{APPLIANCE_TYPE}'")));
        }
        if self.season.trim().is_empty() {
            return Err(invalid(format!("empty '{SEASON}'")));
        }
        if !self.energy_consumption_kwh.is_finite() {
            return Err(invalid(format!(
                "'{ENERGY_CONSUMPTION}' is not finite: {}",
                self.energy_consumption_kwh
            )));
        }
        if !self.household_size.is_finite() {
            return Err(invalid(format!(
                "'{HOUSEHOLD_SIZE}' is not finite: {}",
                self.household_size
            )));
        }
        Ok(())
    }
}

/// Loads every record of the energy CSV at `path`.
///
/// # Errors
/// Fails on the first malformed row, naming its line number, and on an empty file.
pub fn load_energy_csv<P: AsRef<Path>>(path: P) -> Result<Vec<EnergyRecord>, DatasetError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = read_energy_records(BufReader::new(file))?;
    log::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Reads energy records from any CSV source with a header row.
pub fn read_energy_records<R: Read>(reader: R) -> Result<Vec<EnergyRecord>, DatasetError> {
    let mut rdr = ReaderBuilder::new().from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut records = Vec::new();
    for result in rdr.records() {
        let raw = result?;
        let row = raw.position().map_or(0, |p| p.line());
        let record: EnergyRecord =
            raw.deserialize(Some(&headers))
                .map_err(|e| DatasetError::InvalidRecord {
                    row,
                    message: e.to_string(),
                })?;
        record.check(row)?;
        records.push(record);
    }

    if records.is_empty() {
        return Err(DatasetError::Empty);
    }
    Ok(records)
}

/// Encoded design matrix, targets and the names of the encoded columns.
#[derive(Clone, Debug)]
pub struct EncodedEnergyData {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
    pub feature_names: Vec<String>,
}

impl EncodedEnergyData {
    pub fn into_dataset(self) -> Result<InMemoryDataset, DatasetError> {
        InMemoryDataset::new(self.x, self.y)
    }
}

/// One-hot encodes the categorical columns and prepends the household size.
pub fn encode_records(records: &[EnergyRecord]) -> Result<EncodedEnergyData, DatasetError> {
    if records.is_empty() {
        return Err(DatasetError::Empty);
    }

    let categorical: Vec<Vec<String>> = records
        .iter()
        .map(|r| vec![r.appliance_type.clone(), r.season.clone()])
        .collect();
    let encoder = OneHotEncoder::new([APPLIANCE_TYPE, SEASON]).fit(&categorical)?;
    let one_hot = encoder.transform(&categorical)?;

    let household: Array1<f64> = records.iter().map(|r| r.household_size).collect();
    let x = concatenate(Axis(1), &[household.insert_axis(Axis(1)).view(), one_hot.view()])
        .map_err(|e| DatasetError::Shape(e.to_string()))?;
    let y: Array1<f64> = records.iter().map(|r| r.energy_consumption_kwh).collect();

    let mut feature_names = vec![HOUSEHOLD_SIZE.to_string()];
    feature_names.extend(encoder.feature_names_out());
    log::info!(
        "Encoded {} samples into {} features",
        x.nrows(),
        feature_names.len()
    );
    log::debug!("Feature layout: {feature_names:?}");

    Ok(EncodedEnergyData {
        x,
        y,
        feature_names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Date,Appliance Type,Energy Consumption (kWh),Time,Season,Outdoor Temperature (°C),Household Size
2023-01-01,Fridge,0.5,10:00,Winter,-2.0,3
2023-01-01,Heater,2.25,11:00,Winter,-1.0,4
2023-06-01,Air Conditioning,3.0,15:00,Summer,30.0,2
";

    #[test]
    fn test_read_selects_columns_by_header() {
        let records = read_energy_records(CSV.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[2],
            EnergyRecord {
                appliance_type: "Air Conditioning".to_string(),
                energy_consumption_kwh: 3.0,
                season: "Summer".to_string(),
                household_size: 2.0,
            }
        );
    }

    #[test]
    fn test_read_reports_malformed_row() {
        let csv = "Appliance Type,Energy Consumption (kWh),Season,Household Size\n\
                   Fridge,0.5,Winter,3\n\
                   TV,lots,Summer,2\n";
        match read_energy_records(csv.as_bytes()) {
            Err(DatasetError::InvalidRecord { row, .. }) => assert_eq!(row, 3),
            other => panic!("expected InvalidRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_read_rejects_missing_column() {
        let csv = "Appliance Type,Season,Household Size\nFridge,Winter,3\n";
        assert!(matches!(
            read_energy_records(csv.as_bytes()),
            Err(DatasetError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_read_rejects_empty_category() {
        let csv = "Appliance Type,Energy Consumption (kWh),Season,Household Size\n,0.5,Winter,3\n";
        assert!(matches!(
            read_energy_records(csv.as_bytes()),
            Err(DatasetError::InvalidRecord { row: 2, .. })
        ));
    }

    #[test]
    fn test_read_rejects_non_finite() {
        let csv = "Appliance Type,Energy Consumption (kWh),Season,Household Size\nTV,NaN,Winter,3\n";
        assert!(read_energy_records(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_read_empty_file_is_error() {
        let csv = "Appliance Type,Energy Consumption (kWh),Season,Household Size\n";
        assert!(matches!(
            read_energy_records(csv.as_bytes()),
            Err(DatasetError::Empty)
        ));
    }

    #[test]
    fn test_encode_layout() {
        let records = read_energy_records(CSV.as_bytes()).unwrap();
        let encoded = encode_records(&records).unwrap();

        assert_eq!(
            encoded.feature_names,
            vec![
                "Household Size",
                "Appliance Type_Air Conditioning",
                "Appliance Type_Fridge",
                "Appliance Type_Heater",
                "Season_Summer",
                "Season_Winter",
            ]
        );
        assert_eq!(encoded.x.row(0).to_vec(), vec![3.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        assert_eq!(encoded.x.row(2).to_vec(), vec![2.0, 1.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(encoded.y.to_vec(), vec![0.5, 2.25, 3.0]);
    }

    #[test]
    fn test_encode_full_category_set_has_fifteen_features() {
        let appliances = [
            "Fridge", "Oven", "Heater", "Lights", "TV", "Microwave", "Computer",
            "Washing Machine", "Dishwasher", "Air Conditioning",
        ];
        let seasons = ["Winter", "Spring", "Summer", "Fall"];
        let records: Vec<EnergyRecord> = appliances
            .iter()
            .zip(seasons.iter().cycle())
            .enumerate()
            .map(|(i, (a, s))| EnergyRecord {
                appliance_type: a.to_string(),
                energy_consumption_kwh: i as f64,
                season: s.to_string(),
                household_size: 1.0 + i as f64,
            })
            .collect();

        let encoded = encode_records(&records).unwrap();
        assert_eq!(encoded.feature_names.len(), 15);
        assert_eq!(encoded.feature_names[0], "Household Size");
        assert_eq!(encoded.feature_names[1], "Appliance Type_Air Conditioning");
        assert_eq!(encoded.feature_names[10], "Appliance Type_Washing Machine");
        assert_eq!(
            &encoded.feature_names[11..],
            &["Season_Fall", "Season_Spring", "Season_Summer", "Season_Winter"]
        );
        for row in encoded.x.rows() {
            assert_eq!(row.slice(ndarray::s![1..11]).sum(), 1.0);
            assert_eq!(row.slice(ndarray::s![11..]).sum(), 1.0);
        }
    }
}
