use std::fs;
use std::path::Path;

use tracing::info;

use crate::cli::args::{Cli, Commands};
use crate::cli::logging::init_logging;
use crate::error::Result;
use crate::models::StationMetadata;
use crate::processors::{QcPipeline, StationGridMerger};
use crate::readers::{GridReader, SeriesReader};
use crate::settings::QcConfig;
use crate::utils::progress::ProgressReporter;
use crate::utils::{
    dirty_sample_series, generate_default_merge_filename, generate_default_output_filename,
};
use crate::writers::{write_annotated, CsvWriter, OutputFormat, ParquetWriter};

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Run {
            input,
            output_file,
            config,
            z_threshold,
            compression,
            validate_only,
            report_json,
        } => {
            let output_file =
                output_file.unwrap_or_else(|| generate_default_output_filename("csv"));

            println!("Running quality control...");
            println!("Input file: {}", input.display());

            let mut qc_config = match config {
                Some(ref path) => QcConfig::from_file(path)?,
                None => QcConfig::default(),
            };
            if let Some(threshold) = z_threshold {
                qc_config = qc_config.with_z_threshold(threshold);
            }
            let pipeline = QcPipeline::new(qc_config)?;

            let progress = ProgressReporter::new_spinner("Reading series...", false);
            let series = SeriesReader::from_config(pipeline.config()).read_series(&input)?;

            progress.set_message(&format!("Checking {} records...", series.len()));
            let (annotated, report) = pipeline.run_with_report(&series)?;
            progress.finish_with_message(&format!(
                "Checked {} records, rejected {} values",
                report.total_records,
                report.total_rejections()
            ));

            println!("\n{}", report.summary());

            if let Some(path) = report_json {
                ensure_parent_dir(&path)?;
                fs::write(&path, serde_json::to_string_pretty(&report)?)?;
                println!("Report written to {}", path.display());
            }

            if validate_only {
                println!("Validation complete - no output file written");
                return Ok(());
            }

            ensure_parent_dir(&output_file)?;
            let format = write_annotated(
                &annotated,
                &output_file,
                &compression,
                &pipeline.config().date_column,
            )?;
            if format == OutputFormat::Parquet {
                let file_info = ParquetWriter::new().get_file_info(&output_file)?;
                println!("\n{}", file_info.summary());
            }

            println!("Processing complete! Output: {}", output_file.display());
        }

        Commands::Generate { output_file } => {
            let series = dirty_sample_series()?;

            ensure_parent_dir(&output_file)?;
            CsvWriter::new().write_observations(&series, &output_file)?;

            info!(records = series.len(), path = %output_file.display(), "Sample series written");
            println!(
                "Wrote {} sample records to {}",
                series.len(),
                output_file.display()
            );
        }

        Commands::Merge {
            station,
            grid,
            lat,
            lon,
            tolerance,
            station_id,
            variable,
            grid_variable,
            output_file,
        } => {
            let output_file = output_file.unwrap_or_else(generate_default_merge_filename);

            println!("Merging station {} with grid {}", station.display(), grid.display());

            let progress = ProgressReporter::new_spinner("Loading grid...", false);
            let grid = GridReader::new(&grid_variable).read_grid(&grid)?;

            progress.set_message("Loading station series...");
            let series = SeriesReader::new()
                .with_variables(vec![variable.clone()])
                .read_series(&station)?;

            progress.set_message("Matching nearest grid cell...");
            let metadata = StationMetadata::new(&station_id, lat, lon);
            let result = StationGridMerger::with_tolerance(tolerance).merge(
                &metadata,
                &series,
                &variable,
                &grid,
            )?;
            progress.finish_with_message(&format!("Matched {} days", result.records.len()));

            println!(
                "Station {} ({:.2}, {:.2}) -> grid cell ({:.2}, {:.2})",
                station_id, lat, lon, result.cell_lat, result.cell_lon
            );
            match result.mean_bias() {
                Some(bias) => println!("Mean bias (observed - model): {:+.3}", bias),
                None => println!("Mean bias: no overlapping valid values"),
            }

            ensure_parent_dir(&output_file)?;
            CsvWriter::new().write_merged(&result.records, &output_file)?;
            println!("Merged data written to {}", output_file.display());
        }

        Commands::Info { file } => {
            println!("Analyzing Parquet file: {}", file.display());

            let file_info = ParquetWriter::new().get_file_info(&file)?;
            println!("\n{}", file_info.summary());
        }
    }

    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
