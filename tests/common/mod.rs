#![allow(dead_code)]

use distdash::Table;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Intervention rows shaped like the dashboard export.
pub fn intervention_frame() -> DataFrame {
    df!(
        "district_name" => &["Raipur", "Raipur", "Raipur", "Bastar", "Bastar", "Durg"],
        "block_name" => &["Abhanpur", "Arang", "Arang", "Jagdalpur", "Bakawand", "Patan"],
        "broad_category" => &["Equipment", "Inputs", "Inputs", "Equipment", "Training", "Inputs"],
        "categoryofsupport" => &["Farm Mechanisation", "Seeds", "Seeds", "Farm Mechanisation", "Skilling", "Fertiliser"],
        "typeofsupport" => &["Tractor", "Paddy Seed", "Maize Seed", "Tractor", "Tailoring", "Urea"],
        "input_category" => &["Machinery", "Seed", "Seed", "Machinery", "Livelihood", "Nutrient"],
        "pillar" => &["Agriculture", "Agriculture", "Agriculture", "Agriculture", "Livelihood", "Agriculture"],
        "Beneficiary_Count" => &[120i64, 45, 30, 80, 25, 60]
    )
    .unwrap()
}

pub fn intervention_table() -> Table {
    Table::new(intervention_frame())
}

pub fn write_csv(dir: &Path, name: &str, df: &mut DataFrame) -> PathBuf {
    let path = dir.join(name);
    let mut file = File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();
    path
}

/// Temp dir holding `dashboard_data.csv` with the intervention rows.
pub fn intervention_csv() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_csv(dir.path(), "dashboard_data.csv", &mut intervention_frame());
    (dir, path)
}
