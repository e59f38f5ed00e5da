use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::{parse_latitude, parse_longitude};

#[derive(Parser)]
#[command(name = "climate-qc")]
#[command(about = "Quality control for daily station climate series")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Flag, score and gap-fill a station series
    Run {
        #[arg(short, long, help = "Input CSV with a date column and one column per variable")]
        input: PathBuf,

        #[arg(
            short,
            long,
            help = "Output file, .csv or .parquet [default: output/climate-qc-{YYMMDD}.csv]"
        )]
        output_file: Option<PathBuf>,

        #[arg(long, help = "QC configuration file (TOML, JSON or YAML)")]
        config: Option<PathBuf>,

        #[arg(short, long, help = "Override the z-score threshold")]
        z_threshold: Option<f64>,

        #[arg(short, long, default_value = "snappy", help = "Parquet compression")]
        compression: String,

        #[arg(long, default_value = "false")]
        validate_only: bool,

        #[arg(long, help = "Also write the QC report as JSON")]
        report_json: Option<PathBuf>,
    },

    /// Write a small dirty sample series to experiment with
    Generate {
        #[arg(short, long, default_value = "output/sample_dirty_data.csv")]
        output_file: PathBuf,
    },

    /// Pair a station series with the nearest cell of a gridded model field
    Merge {
        #[arg(long, help = "Station CSV with a date column")]
        station: PathBuf,

        #[arg(long, help = "Long-form grid CSV (time, lat, lon, value)")]
        grid: PathBuf,

        #[arg(long, allow_hyphen_values = true, value_parser = latitude_arg)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true, value_parser = longitude_arg)]
        lon: f64,

        #[arg(long, default_value = "0.5", help = "Maximum per-axis distance in degrees")]
        tolerance: f64,

        #[arg(long, default_value = "STATION")]
        station_id: String,

        #[arg(long, default_value = "observed_temp", help = "Station column to compare")]
        variable: String,

        #[arg(long, default_value = "model_temp", help = "Grid value column")]
        grid_variable: String,

        #[arg(
            short,
            long,
            help = "Output CSV [default: output/station-grid-merge-{YYMMDD}.csv]"
        )]
        output_file: Option<PathBuf>,
    },

    /// Display information about a Parquet output file
    Info {
        #[arg(short, long)]
        file: PathBuf,
    },
}

fn latitude_arg(value: &str) -> Result<f64, String> {
    parse_latitude(value).map_err(|e| e.to_string())
}

fn longitude_arg(value: &str) -> Result<f64, String> {
    parse_longitude(value).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::try_parse_from([
            "climate-qc",
            "run",
            "--input",
            "data.csv",
            "--z-threshold",
            "2.5",
            "--verbose",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Run {
                input,
                z_threshold,
                compression,
                output_file,
                ..
            } => {
                assert_eq!(input, PathBuf::from("data.csv"));
                assert_eq!(z_threshold, Some(2.5));
                assert_eq!(compression, "snappy");
                assert!(output_file.is_none());
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_parse_merge_with_negative_and_dms_coordinates() {
        let cli = Cli::try_parse_from([
            "climate-qc",
            "merge",
            "--station",
            "obs.csv",
            "--grid",
            "grid.csv",
            "--lat",
            "-13.83",
            "--lon",
            "171:45:00",
        ])
        .unwrap();

        match cli.command {
            Commands::Merge {
                lat, lon, tolerance, ..
            } => {
                assert!((lat + 13.83).abs() < 1e-9);
                assert!((lon - 171.75).abs() < 1e-9);
                assert_eq!(tolerance, 0.5);
            }
            _ => panic!("expected merge command"),
        }
    }

    #[test]
    fn test_reject_out_of_range_latitude() {
        let result = Cli::try_parse_from([
            "climate-qc", "merge", "--station", "a.csv", "--grid", "b.csv", "--lat", "95",
            "--lon", "0",
        ]);
        assert!(result.is_err());
    }
}
