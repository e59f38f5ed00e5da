use chrono::{Datelike, Local, NaiveDate};
use std::path::PathBuf;

/// Default output path: `output/climate-qc-{YYMMDD}.{extension}`
pub fn generate_default_output_filename(extension: &str) -> PathBuf {
    output_filename_for(Local::now().date_naive(), "climate-qc", extension)
}

/// Default path for a station/grid merge: `output/station-grid-merge-{YYMMDD}.csv`
pub fn generate_default_merge_filename() -> PathBuf {
    output_filename_for(Local::now().date_naive(), "station-grid-merge", "csv")
}

fn output_filename_for(date: NaiveDate, stem: &str, extension: &str) -> PathBuf {
    let filename = format!(
        "{}-{:02}{:02}{:02}.{}",
        stem,
        date.year() % 100,
        date.month(),
        date.day(),
        extension.trim_start_matches('.')
    );
    PathBuf::from("output").join(filename)
}
