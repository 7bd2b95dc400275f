use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Selects how cell styles are materialized in an output chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyMethod {
    /// Reuse styles already materialized in the current chunk
    #[default]
    Optimized,
    /// Snapshot every styled cell independently
    Standard,
}

impl fmt::Display for CopyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyMethod::Optimized => write!(f, "optimized"),
            CopyMethod::Standard => write!(f, "standard"),
        }
    }
}

/// What to do when every row of the sheet is a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoDataPolicy {
    /// Write a single workbook holding only the header rows
    #[default]
    #[value(alias = "header_only")]
    #[serde(alias = "header_only")]
    HeaderOnly,
    /// Fail the run without writing anything
    Error,
}

impl fmt::Display for NoDataPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoDataPolicy::HeaderOnly => write!(f, "header-only"),
            NoDataPolicy::Error => write!(f, "error"),
        }
    }
}

/// Plain parameters handed to the engine by the control surface.
#[derive(Debug, Clone)]
pub struct SplitParams {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub chunk_size: u32,
    pub header_rows: u32,
    pub preserve_formulas: bool,
    pub copy_method: CopyMethod,
    pub no_data_policy: NoDataPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitStatus {
    Success,
    Error,
    Cancelled,
}

impl SplitStatus {
    /// Process exit code reported by the CLI.
    pub fn exit_code(self) -> u8 {
        match self {
            SplitStatus::Success => 0,
            SplitStatus::Error => 1,
            SplitStatus::Cancelled => 2,
        }
    }
}

impl fmt::Display for SplitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitStatus::Success => write!(f, "Success"),
            SplitStatus::Error => write!(f, "Error"),
            SplitStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub step: u32,
    pub total: u32,
    pub status: String,
}

/// Terminal outcome of one run; emitted exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitResult {
    pub status: SplitStatus,
    pub message: String,
    pub files_created: u32,
    pub output_files: Vec<PathBuf>,
}

impl SplitResult {
    pub fn success(message: impl Into<String>, output_files: Vec<PathBuf>) -> Self {
        Self::with_status(SplitStatus::Success, message, output_files)
    }

    pub fn error(message: impl Into<String>, output_files: Vec<PathBuf>) -> Self {
        Self::with_status(SplitStatus::Error, message, output_files)
    }

    pub fn cancelled(message: impl Into<String>, output_files: Vec<PathBuf>) -> Self {
        Self::with_status(SplitStatus::Cancelled, message, output_files)
    }

    fn with_status(
        status: SplitStatus,
        message: impl Into<String>,
        output_files: Vec<PathBuf>,
    ) -> Self {
        Self {
            status,
            message: message.into(),
            files_created: output_files.len() as u32,
            output_files,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SplitEvent {
    Progress(ProgressUpdate),
    Finished(SplitResult),
}

/// End-of-run report printed by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitSummary {
    pub status: SplitStatus,
    pub message: String,
    pub files_created: u32,
    pub output_dir: String,
    pub output_files: Vec<String>,
    pub started_at: String,
    pub finished_at: String,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StyleDescriptor {
    pub font: Option<FontDescriptor>,
    pub fill: Option<FillDescriptor>,
    pub borders: Option<BordersDescriptor>,
    pub alignment: Option<AlignmentDescriptor>,
    pub protection: Option<ProtectionDescriptor>,
    pub number_format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FontDescriptor {
    pub name: Option<String>,
    pub size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<String>,
    pub strikethrough: Option<bool>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FillDescriptor {
    Pattern(PatternFillDescriptor),
    Gradient(GradientFillDescriptor),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PatternFillDescriptor {
    pub pattern_type: Option<String>,
    pub foreground_color: Option<String>,
    pub background_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GradientFillDescriptor {
    pub degree: Option<f64>,
    pub stops: Vec<GradientStopDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStopDescriptor {
    pub position: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BordersDescriptor {
    pub left: Option<BorderSideDescriptor>,
    pub right: Option<BorderSideDescriptor>,
    pub top: Option<BorderSideDescriptor>,
    pub bottom: Option<BorderSideDescriptor>,
    pub diagonal: Option<BorderSideDescriptor>,
    pub vertical: Option<BorderSideDescriptor>,
    pub horizontal: Option<BorderSideDescriptor>,
    pub diagonal_up: Option<bool>,
    pub diagonal_down: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BorderSideDescriptor {
    pub style: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AlignmentDescriptor {
    pub horizontal: Option<String>,
    pub vertical: Option<String>,
    pub wrap_text: Option<bool>,
    pub text_rotation: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProtectionDescriptor {
    pub locked: Option<bool>,
    pub hidden: Option<bool>,
}
