//! svg2ass: convert SVG drawings into ASS vector drawings.
//!
//! ## Usage
//!
//! ```bash
//! # Convert one file to stdout
//! svg2ass logo.svg
//!
//! # Keep each shape's colors, three fractional digits
//! svg2ass -a colors -f 3 logo.svg -o logo.ass
//!
//! # Read stdin, dump recorded shapes and the conversion report
//! cat logo.svg | svg2ass --format json
//! ```

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use svgass_ass::AssWriter;
use svgass_common::{init_logging, BatchMode, ConvertConfig, LogConfig, LogFormat, MAX_PRECISION};
use svgass_draw::{convert, ConvertReport, RecordingEmitter, Shape};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// ASS drawing commands
    Ass,
    /// Recorded shapes and conversion report
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "svg2ass", version)]
#[command(about = "Convert SVG drawings into ASS subtitle vector drawings")]
struct Cli {
    /// Input files; none or `-` reads stdin
    files: Vec<PathBuf>,

    /// Shape batching: layout (0) keeps positions, colors (1) keeps paints
    #[arg(short = 'a', long = "batch", value_name = "MODE")]
    batch: Option<BatchMode>,

    /// Fractional digits in emitted numbers (0-5)
    #[arg(short = 'f', long, value_parser = clap::value_parser!(u8).range(0..=MAX_PRECISION as i64))]
    precision: Option<u8>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Uniform output coordinate scale
    #[arg(long)]
    scale: Option<f64>,

    /// Degenerate-geometry threshold in local units
    #[arg(long)]
    epsilon: Option<f64>,

    /// Arc length per flattened arc segment
    #[arg(long)]
    arc_step: Option<f64>,

    /// JSON configuration file; flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Ass)]
    format: OutputFormat,

    /// More log output (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Log output format: pretty, compact or json
    #[arg(long, default_value = "pretty")]
    log_format: LogFormat,
}

impl Cli {
    /// Configuration file (or defaults) with command-line overrides applied.
    fn convert_config(&self) -> Result<ConvertConfig> {
        let mut config = match &self.config {
            Some(path) => ConvertConfig::from_json_file(path)
                .with_context(|| format!("Failed to load configuration '{}'", path.display()))?,
            None => ConvertConfig::default(),
        };

        if let Some(batch) = self.batch {
            config.batch_mode = batch;
        }
        if let Some(precision) = self.precision {
            config.precision = precision;
        }
        if let Some(scale) = self.scale {
            config.scale = scale;
        }
        if let Some(epsilon) = self.epsilon {
            config.epsilon = epsilon;
        }
        if let Some(arc_step) = self.arc_step {
            config.arc_step = arc_step;
        }
        config.validate().context("Invalid options")?;
        Ok(config)
    }

    /// Input names, with stdin standing in for an empty list.
    fn inputs(&self) -> Vec<PathBuf> {
        if self.files.is_empty() {
            vec![PathBuf::from("-")]
        } else {
            self.files.clone()
        }
    }
}

/// One converted document in `--format json` output.
#[derive(Debug, Serialize)]
struct DocumentOutput {
    file: String,
    report: ConvertReport,
    shapes: Vec<Shape>,
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn display_name(path: &Path) -> String {
    if is_stdin(path) {
        "<stdin>".to_string()
    } else {
        path.display().to_string()
    }
}

fn read_input(path: &Path) -> Result<String> {
    let mut bytes = Vec::new();
    if is_stdin(path) {
        io::stdin().lock().read_to_end(&mut bytes)?;
    } else {
        File::open(path)?.read_to_end(&mut bytes)?;
    }
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            warn!(file = %path.display(), "input is not valid UTF-8, replacing bad sequences");
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    })
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create '{}'", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn log_report(name: &str, report: &ConvertReport) {
    info!(
        file = name,
        shapes = report.shapes,
        primitives = report.primitives,
        "converted"
    );
    let problems = report.path_errors + report.structural_warnings + report.scan_anomalies;
    if problems > 0 {
        warn!(
            file = name,
            path_errors = report.path_errors,
            structural_warnings = report.structural_warnings,
            scan_anomalies = report.scan_anomalies,
            "document had recoverable problems"
        );
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.convert_config()?;
    debug!(?config, "configuration");
    let out = open_output(cli.output.as_deref())?;

    match cli.format {
        OutputFormat::Ass => {
            let mut writer = AssWriter::from_config(out, &config);
            for path in cli.inputs() {
                let name = display_name(&path);
                let report = read_input(&path)
                    .and_then(|text| Ok(convert(&text, &config, &mut writer)?))
                    .with_context(|| format!("Error processing file '{}'", name))?;
                log_report(&name, &report);
            }
            writer.into_inner().flush()?;
        }
        OutputFormat::Json => {
            let mut documents = Vec::new();
            for path in cli.inputs() {
                let name = display_name(&path);
                let mut recorder = RecordingEmitter::new();
                let report = read_input(&path)
                    .and_then(|text| Ok(convert(&text, &config, &mut recorder)?))
                    .with_context(|| format!("Error processing file '{}'", name))?;
                log_report(&name, &report);
                documents.push(DocumentOutput {
                    file: name,
                    report,
                    shapes: recorder.shapes,
                });
            }
            let mut out = out;
            serde_json::to_writer_pretty(&mut out, &documents)?;
            writeln!(out)?;
            out.flush()?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_config = LogConfig::from_verbosity(cli.verbose).with_format(cli.log_format);
    if let Err(err) = init_logging(&log_config) {
        eprintln!("Warning: failed to initialize logging: {}", err);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:?}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("svg2ass").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_batch_aliases() {
        assert_eq!(parse(&["-a", "1"]).batch, Some(BatchMode::Colors));
        assert_eq!(parse(&["--batch", "layout"]).batch, Some(BatchMode::Layout));
        assert!(Cli::try_parse_from(["svg2ass", "-a", "2"]).is_err());
    }

    #[test]
    fn test_precision_range() {
        assert_eq!(parse(&["-f", "5"]).precision, Some(5));
        assert!(Cli::try_parse_from(["svg2ass", "-f", "6"]).is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("svg2ass.json");
        fs::write(&config_path, r#"{ "precision": 3, "scale": 2.0, "batch_mode": "colors" }"#).unwrap();

        let cli = parse(&["--config", config_path.to_str().unwrap(), "--scale", "4", "-a", "0"]);
        let config = cli.convert_config().unwrap();
        assert_eq!(config.precision, 3);
        assert_eq!(config.scale, 4.0);
        assert_eq!(config.batch_mode, BatchMode::Layout);
        assert_eq!(config.epsilon, ConvertConfig::default().epsilon);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let cli = parse(&["--scale", "0"]);
        assert!(cli.convert_config().is_err());
    }

    #[test]
    fn test_converts_files_in_order() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("a.svg");
        let second = dir.path().join("b.svg");
        let output = dir.path().join("out.ass");
        fs::write(&first, r#"<svg><line x2="1"/></svg>"#).unwrap();
        fs::write(&second, r#"<svg><line x2="2"/></svg>"#).unwrap();

        let cli = parse(&[
            first.to_str().unwrap(),
            second.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ]);
        run(&cli).unwrap();

        let text = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(r"m 0 0 l 1 0{\p0}"));
        assert!(lines[1].ends_with(r"m 0 0 l 2 0{\p0}"));
    }

    #[test]
    fn test_json_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.svg");
        let output = dir.path().join("out.json");
        fs::write(&input, r#"<svg><rect width="2" height="2"/><path d="M0 0 L1 1 %"/></svg>"#).unwrap();

        let cli = parse(&[input.to_str().unwrap(), "--format", "json", "-o", output.to_str().unwrap()]);
        run(&cli).unwrap();

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        let doc = &json[0];
        assert_eq!(doc["report"]["shapes"], 2);
        assert_eq!(doc["report"]["path_errors"], 1);
        assert_eq!(doc["shapes"][0]["primitives"][0]["op"], "move_to");
        assert_eq!(doc["shapes"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_input_names_the_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.svg");
        let output = dir.path().join("out.ass");
        let cli = parse(&[missing.to_str().unwrap(), "-o", output.to_str().unwrap()]);

        let err = run(&cli).unwrap_err();
        assert!(err.to_string().starts_with("Error processing file"));
        assert!(err.to_string().contains("missing.svg"));
    }
}
