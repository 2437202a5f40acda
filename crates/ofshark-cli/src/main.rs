use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use glob::glob;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

use ofshark_core::{AnalysisConfig, Decoder, DecoderConfig, Message, Report, split_messages};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("OFSHARK_BUILD_COMMIT"),
    " ",
    env!("OFSHARK_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "ofshark")]
#[command(version = VERSION)]
#[command(
    about = "Offline OpenFlow 1.3 decoder and control-channel capture analyzer.",
    long_about = None,
    after_help = "Examples:\n  ofshark pcap analyse capture.pcapng -o report.json\n  ofshark pcap analyze capture.pcap --stdout --pretty\n  ofshark decode flow_mod.bin --pretty"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on PCAP/PCAPNG inputs (offline-first).
    Pcap {
        #[command(subcommand)]
        command: PcapCommands,
    },
    /// Decode a file of back-to-back raw OpenFlow messages.
    #[command(
        after_help = "Examples:\n  ofshark decode messages.bin\n  ofshark decode messages.bin -o decoded.json --pretty"
    )]
    Decode {
        /// Binary file holding one or more concatenated messages
        input: PathBuf,

        /// Output path (JSON); stdout when omitted
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Exit with a non-zero code if any message has anomalies
        #[arg(long)]
        strict: bool,

        /// Largest declared message length accepted
        #[arg(long, value_name = "BYTES")]
        max_message_len: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
enum PcapCommands {
    /// Analyse a capture file and generate a versioned JSON report of OpenFlow traffic.
    #[command(alias = "analyze")]
    #[command(
        after_help = "Examples:\n  ofshark pcap analyse capture.pcapng -o report.json\n  ofshark pcap analyze capture.pcap --stdout --port 6653\n  ofshark pcap analyse capture.pcapng --report report.json --strict"
    )]
    Analyse {
        /// Path to a .pcap or .pcapng file
        input: PathBuf,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Exit with a non-zero code if anomalies are present
        #[arg(long)]
        strict: bool,

        /// List anomaly summaries after analysis
        #[arg(long)]
        list_anomalies: bool,

        /// OpenFlow TCP port (repeatable; default 6653 and 6633)
        #[arg(long = "port", value_name = "PORT")]
        ports: Vec<u16>,

        /// Largest declared message length accepted
        #[arg(long, value_name = "BYTES")]
        max_message_len: Option<usize>,

        /// Omit per-message records, keep summaries only
        #[arg(long)]
        summary_only: bool,
    },
}

struct AnalyseArgs {
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    quiet: bool,
    strict: bool,
    list_anomalies: bool,
    config: AnalysisConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    debug!(?cli, "arguments");

    let quiet = cli.quiet;
    let result = match cli.command {
        Commands::Pcap { command } => match command {
            PcapCommands::Analyse {
                input,
                report,
                stdout,
                pretty,
                compact,
                strict,
                list_anomalies,
                ports,
                max_message_len,
                summary_only,
            } => cmd_pcap_analyse(AnalyseArgs {
                input,
                report,
                stdout,
                pretty,
                compact,
                quiet,
                strict,
                list_anomalies,
                config: analysis_config(ports, max_message_len, summary_only),
            }),
        },
        Commands::Decode {
            input,
            output,
            pretty,
            strict,
            max_message_len,
        } => cmd_decode(input, output, pretty, quiet, strict, decoder_config(max_message_len)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let log_level = if quiet {
        tracing::Level::ERROR
    } else {
        match verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .with_filter(tracing_subscriber::filter::LevelFilter::from_level(log_level)),
        )
        .init();
}

fn decoder_config(max_message_len: Option<usize>) -> DecoderConfig {
    let mut config = DecoderConfig::default();
    if let Some(max) = max_message_len {
        config.max_message_len = max;
    }
    config
}

fn analysis_config(
    ports: Vec<u16>,
    max_message_len: Option<usize>,
    summary_only: bool,
) -> AnalysisConfig {
    let mut config = AnalysisConfig {
        decoder: decoder_config(max_message_len),
        include_messages: !summary_only,
        ..AnalysisConfig::default()
    };
    if !ports.is_empty() {
        config.ports = ports;
    }
    config
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn cmd_pcap_analyse(args: AnalyseArgs) -> Result<(), CliError> {
    let AnalyseArgs {
        input,
        report,
        stdout,
        pretty,
        compact,
        quiet,
        strict,
        list_anomalies,
        config,
    } = args;

    let resolved_input = resolve_input_path(&input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;
    let report = if stdout {
        None
    } else {
        Some(report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };

    if let Some(report_path) = report.as_ref() {
        ensure_distinct_output(report_path, &input_abs)?;
    }

    let meta = fs::metadata(&resolved_input)
        .with_context(|| format!("Failed to read input file: {}", resolved_input.display()))?;

    if !meta.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }

    let rep = ofshark_core::analyze_pcap_file(&resolved_input, &config)
        .context("PCAP/PCAPNG analysis failed")?;
    let json = serialize_json(&rep, pretty, compact)?;

    match report {
        None => print!("{}", json),
        Some(report) => {
            write_output(&report, &json)?;
            if !quiet {
                eprintln!("OK: report written -> {}", report.display());
            }
        }
    }

    if list_anomalies && !quiet {
        print_anomalies(&rep);
    }
    if strict && rep.anomaly_count() > 0 {
        return Err(CliError::new(
            format!("{} anomalies detected", rep.anomaly_count()),
            Some("use --list-anomalies to inspect".to_string()),
        ));
    }
    Ok(())
}

/// One entry of the `decode` output.
#[derive(Debug, Serialize)]
struct DecodedEntry {
    offset: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn cmd_decode(
    input: PathBuf,
    output: Option<PathBuf>,
    pretty: bool,
    quiet: bool,
    strict: bool,
    config: DecoderConfig,
) -> Result<(), CliError> {
    if !input.is_file() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a binary file of raw OpenFlow messages".to_string()),
        ));
    }
    let bytes = fs::read(&input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    if let Some(output) = output.as_ref() {
        let input_abs = fs::canonicalize(&input)
            .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
        ensure_distinct_output(output, &input_abs)?;
    }

    let decoder = Decoder::with_config(config);
    let entries: Vec<DecodedEntry> = split_messages(&bytes)
        .into_iter()
        .map(|slice| match decoder.decode(slice.bytes) {
            Ok(message) => DecodedEntry {
                offset: slice.offset,
                message: Some(message),
                error: None,
            },
            Err(err) => DecodedEntry {
                offset: slice.offset,
                message: None,
                error: Some(err.to_string()),
            },
        })
        .collect();
    let flagged = entries
        .iter()
        .filter(|entry| {
            entry
                .message
                .as_ref()
                .is_none_or(|message| !message.is_clean())
        })
        .count();
    info!(messages = entries.len(), flagged, "decoded input");

    let json = serialize_json(&entries, pretty, false)?;
    match output {
        None => println!("{}", json),
        Some(output) => {
            write_output(&output, &json)?;
            if !quiet {
                eprintln!("OK: {} messages written -> {}", entries.len(), output.display());
            }
        }
    }

    if strict && flagged > 0 {
        return Err(CliError::new(
            format!("{flagged} of {} messages have anomalies or errors", entries.len()),
            Some("inspect the \"anomalies\" and \"error\" fields of the output".to_string()),
        ));
    }
    Ok(())
}

fn ensure_distinct_output(output: &Path, input_abs: &Path) -> Result<(), CliError> {
    let output_abs = output
        .parent()
        .map(|parent| {
            if parent.as_os_str().is_empty() {
                fs::canonicalize(".")
            } else {
                fs::canonicalize(parent)
            }
        })
        .transpose()
        .with_context(|| format!("Failed to resolve output path: {}", output.display()))?;
    if let Some(output_dir) = output_abs {
        let output_target = output_dir.join(
            output
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("Invalid output path"))?,
        );
        if output_target == input_abs {
            return Err(CliError::new(
                format!("output path must differ from input: {}", output.display()),
                Some("choose a different output path".to_string()),
            ));
        }
    }
    Ok(())
}

fn write_output(path: &Path, contents: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(path, contents)
        .with_context(|| format!("Failed to write output: {}", path.display()))?;
    Ok(())
}

fn serialize_json<T: Serialize>(value: &T, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn print_anomalies(rep: &Report) {
    if rep.anomalies.is_empty() {
        eprintln!("Anomalies: none");
        return;
    }
    eprintln!("Anomalies:");
    for summary in &rep.anomalies {
        eprintln!("  {} {} ({})", summary.severity, summary.id, summary.count);
        for example in &summary.examples {
            eprintln!("    {}", example);
        }
    }
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "pcap" && ext != "pcapng" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .pcap or .pcapng file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .pcap or .pcapng".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let mut message = format!("multiple files match pattern '{}' ({} matches)", pattern, count);
            let listed: Vec<String> = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect();
            message.push_str("; matches: ");
            message.push_str(&listed.join(", "));
            if count > 3 {
                message.push_str(", ...");
            }
            Err(CliError::new(
                message,
                Some("pass a single capture file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
