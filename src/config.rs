use crate::model::{CopyMethod, NoDataPolicy, SplitParams};
use crate::validation::{
    DEFAULT_CHUNK_SIZE, DEFAULT_EVENT_CAPACITY, DEFAULT_HEADER_ROWS, DEFAULT_POLL_INTERVAL_MS,
    validate_chunk_size, validate_header_rows, validate_input_workbook, validate_numeric_range,
    validate_output_dir,
};
use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SplitConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub chunk_size: u32,
    pub header_rows: u32,
    pub preserve_formulas: bool,
    pub copy_method: CopyMethod,
    pub no_data_policy: NoDataPolicy,
    pub poll_interval_ms: u64,
    pub event_capacity: usize,
    pub dry_run: bool,
    pub json: bool,
}

impl SplitConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            input: cli_input,
            config,
            output_dir: cli_output_dir,
            chunk_size: cli_chunk_size,
            header_rows: cli_header_rows,
            preserve_formulas: cli_preserve_formulas,
            copy_method: cli_copy_method,
            no_data_policy: cli_no_data_policy,
            poll_interval_ms: cli_poll_interval_ms,
            event_capacity: cli_event_capacity,
            dry_run,
            json,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            input: file_input,
            output_dir: file_output_dir,
            chunk_size: file_chunk_size,
            header_rows: file_header_rows,
            preserve_formulas: file_preserve_formulas,
            copy_method: file_copy_method,
            no_data_policy: file_no_data_policy,
            poll_interval_ms: file_poll_interval_ms,
            event_capacity: file_event_capacity,
        } = file_config;

        let input = cli_input
            .or(file_input)
            .context("no input workbook given; pass INPUT or set `input` in the config file")?;

        let output_dir = cli_output_dir
            .or(file_output_dir)
            .or_else(|| {
                input
                    .parent()
                    .filter(|parent| !parent.as_os_str().is_empty())
                    .map(Path::to_path_buf)
            })
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            input,
            output_dir,
            chunk_size: cli_chunk_size
                .or(file_chunk_size)
                .unwrap_or(DEFAULT_CHUNK_SIZE),
            header_rows: cli_header_rows
                .or(file_header_rows)
                .unwrap_or(DEFAULT_HEADER_ROWS),
            preserve_formulas: cli_preserve_formulas || file_preserve_formulas.unwrap_or(false),
            copy_method: cli_copy_method.or(file_copy_method).unwrap_or_default(),
            no_data_policy: cli_no_data_policy
                .or(file_no_data_policy)
                .unwrap_or_default(),
            poll_interval_ms: cli_poll_interval_ms
                .or(file_poll_interval_ms)
                .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            event_capacity: cli_event_capacity
                .or(file_event_capacity)
                .unwrap_or(DEFAULT_EVENT_CAPACITY),
            dry_run,
            json,
        })
    }

    /// Fails fast on anything that would make the run pointless.
    pub fn validate(&self) -> Result<()> {
        validate_input_workbook(&self.input)?;
        validate_output_dir(&self.output_dir)?;
        validate_chunk_size(self.chunk_size)?;
        validate_header_rows(self.header_rows)?;
        let poll_interval_ms = u32::try_from(self.poll_interval_ms).unwrap_or(u32::MAX);
        validate_numeric_range("poll_interval_ms", poll_interval_ms, 1, 60_000)?;
        let event_capacity = u32::try_from(self.event_capacity).unwrap_or(u32::MAX);
        validate_numeric_range("event_capacity", event_capacity, 1, 65_536)?;
        Ok(())
    }

    pub fn split_params(&self) -> SplitParams {
        SplitParams {
            input: self.input.clone(),
            output_dir: self.output_dir.clone(),
            chunk_size: self.chunk_size,
            header_rows: self.header_rows,
            preserve_formulas: self.preserve_formulas,
            copy_method: self.copy_method,
            no_data_policy: self.no_data_policy,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(
    name = "sheet-splitter",
    about = "Split a large xlsx workbook into fixed-size chunks with repeated headers",
    version
)]
pub struct CliArgs {
    #[arg(
        env = "SHEET_SPLITTER_INPUT",
        value_name = "INPUT",
        help = "Workbook to split (.xlsx)"
    )]
    pub input: Option<PathBuf>,

    #[arg(
        long,
        env = "SHEET_SPLITTER_CONFIG",
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "SHEET_SPLITTER_OUTPUT_DIR",
        value_name = "DIR",
        help = "Directory for the chunk files (defaults to the input's directory)"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(
        long,
        env = "SHEET_SPLITTER_CHUNK_SIZE",
        value_name = "N",
        help = "Data rows per output workbook",
        value_parser = clap::value_parser!(u32)
    )]
    pub chunk_size: Option<u32>,

    #[arg(
        long,
        env = "SHEET_SPLITTER_HEADER_ROWS",
        value_name = "N",
        help = "Leading rows repeated at the top of every chunk",
        value_parser = clap::value_parser!(u32)
    )]
    pub header_rows: Option<u32>,

    #[arg(
        long,
        env = "SHEET_SPLITTER_PRESERVE_FORMULAS",
        help = "Keep formulas instead of writing their last computed values"
    )]
    pub preserve_formulas: bool,

    #[arg(
        long,
        env = "SHEET_SPLITTER_COPY_METHOD",
        value_enum,
        value_name = "METHOD",
        help = "Style copy strategy (optimized or standard)"
    )]
    pub copy_method: Option<CopyMethod>,

    #[arg(
        long,
        env = "SHEET_SPLITTER_NO_DATA_POLICY",
        value_enum,
        value_name = "POLICY",
        help = "Behavior when every row is a header row (header-only or error)"
    )]
    pub no_data_policy: Option<NoDataPolicy>,

    #[arg(
        long,
        env = "SHEET_SPLITTER_POLL_INTERVAL_MS",
        value_name = "MS",
        help = "How often the progress loop drains worker events",
        value_parser = clap::value_parser!(u64)
    )]
    pub poll_interval_ms: Option<u64>,

    #[arg(
        long,
        env = "SHEET_SPLITTER_EVENT_CAPACITY",
        value_name = "N",
        help = "Capacity of the worker event channel",
        value_parser = clap::value_parser!(usize)
    )]
    pub event_capacity: Option<usize>,

    #[arg(
        long,
        env = "SHEET_SPLITTER_DRY_RUN",
        help = "Scan and print the chunk plan without writing files"
    )]
    pub dry_run: bool,

    #[arg(
        long,
        env = "SHEET_SPLITTER_JSON",
        help = "Print the final summary as JSON"
    )]
    pub json: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    input: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    chunk_size: Option<u32>,
    header_rows: Option<u32>,
    preserve_formulas: Option<bool>,
    copy_method: Option<CopyMethod>,
    no_data_policy: Option<NoDataPolicy>,
    poll_interval_ms: Option<u64>,
    event_capacity: Option<usize>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
