//! Command line entry point
//!
//! Run with: cargo run --release -- --producers 10 --writes 100000 --output output.txt

use clap::Parser;
use log_pipeline::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;

const EXIT_CONFIG: u8 = 1;
const EXIT_FATAL_OPEN: u8 = 2;
const EXIT_VERIFY: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "log-pipeline")]
#[command(about = "Many producer threads enqueue timestamped lines; one writer appends them to a file")]
#[command(version)]
struct Cli {
    /// JSON configuration file; flags given here override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file (deleted at startup)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of producer threads
    #[arg(short = 'n', long)]
    producers: Option<usize>,

    /// Lines written by each producer
    #[arg(short, long)]
    writes: Option<u64>,

    /// Writer idle interval in milliseconds
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// How the writer idles on an empty queue (poll, wait)
    #[arg(long)]
    drain_mode: Option<DrainMode>,

    /// Timestamp format (general, iso8601, rfc3339, unix-millis, or a strftime pattern)
    #[arg(short, long)]
    timestamp_format: Option<TimestampFormat>,

    /// Probability in [0, 1] that an append is made to fail
    #[arg(long)]
    failure_rate: Option<f64>,

    /// Seed for reproducible simulated failures
    #[arg(long)]
    failure_seed: Option<u64>,

    /// Minimum diagnostics level (trace, debug, info, warn, error, fatal)
    #[arg(short, long)]
    log_level: Option<LogLevel>,

    /// Disable colored diagnostics
    #[arg(long)]
    no_color: bool,

    /// Check the output file after the run
    #[arg(long)]
    verify: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json_summary: bool,
}

impl Cli {
    fn into_config(self) -> Result<(PipelineConfig, bool, bool)> {
        let mut config = match self.config {
            Some(ref path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(output) = self.output {
            config.output_path = output;
        }
        if let Some(producers) = self.producers {
            config.producers = producers;
        }
        if let Some(writes) = self.writes {
            config.writes_per_producer = writes;
        }
        if let Some(interval) = self.poll_interval_ms {
            config.poll_interval_ms = interval;
        }
        if let Some(mode) = self.drain_mode {
            config.drain_mode = mode;
        }
        if let Some(format) = self.timestamp_format {
            config.timestamp_format = format;
        }
        if let Some(rate) = self.failure_rate {
            config.failure_rate = rate;
        }
        if self.failure_seed.is_some() {
            config.failure_seed = self.failure_seed;
        }
        if let Some(level) = self.log_level {
            config.diagnostics_level = level;
        }
        if self.no_color {
            config.colors = false;
        }

        Ok((config, self.verify, self.json_summary))
    }
}

fn main() -> ExitCode {
    // Usage errors share the configuration exit code rather than clap's 2
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_CONFIG)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let (config, verify, json_summary) = match cli.into_config() {
        Ok(parsed) => parsed,
        Err(e) => {
            Diagnostics::new().fatal(e.to_string());
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let diagnostics = config.diagnostics();
    let pipeline = match Pipeline::with_diagnostics(config, diagnostics.clone()) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            diagnostics.fatal(e.to_string());
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let summary = match pipeline.run() {
        Ok(summary) => summary,
        Err(e) if e.is_fatal_open() => return ExitCode::from(EXIT_FATAL_OPEN),
        Err(e) => {
            diagnostics.fatal(e.to_string());
            return ExitCode::FAILURE;
        }
    };

    if summary.write_failures > 0 {
        diagnostics.warn(format!(
            "{} of {} lines were dropped by failed writes.",
            summary.write_failures,
            summary.expected_lines()
        ));
    }

    if json_summary {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => diagnostics.error(format!("Cannot render summary: {}", e)),
        }
    }

    if verify {
        match verify_output(
            &summary.output_path,
            summary.producers,
            summary.writes_per_producer,
        ) {
            Ok(report) => {
                let complete =
                    report.is_complete(summary.producers, summary.writes_per_producer);
                if !complete && summary.write_failures == 0 {
                    diagnostics.fatal(format!(
                        "Verification failed: expected {} lines, found {}.",
                        summary.expected_lines(),
                        report.total_lines
                    ));
                    return ExitCode::from(EXIT_VERIFY);
                }
                diagnostics.info(format!(
                    "Verified {} lines from {} producers.",
                    report.total_lines,
                    report.per_producer.len()
                ));
            }
            Err(e) => {
                diagnostics.fatal(e.to_string());
                return ExitCode::from(EXIT_VERIFY);
            }
        }
    }

    ExitCode::SUCCESS
}
