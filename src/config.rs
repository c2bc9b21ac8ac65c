//! Configuration types for result-sheet processing.
//!
//! All behaviour is controlled through [`ProcessingConfig`], built via its
//! [`ProcessingConfigBuilder`]. The grading rules (pass threshold and
//! sentinel tokens) default to the conventional values of 40, `AB`/`ABSENT`
//! and `F`/`FAIL`; institutions with other conventions override them here.

use crate::error::MarksheetError;
use crate::progress::{BatchProgressCallback, ProgressCallback};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Registration numbers recognised in PDF text by default: a university
/// seat number such as `1RV20CS001`, or a 10–12 digit numeric roll number.
pub const DEFAULT_REG_NO_PATTERN: &str = r"^(?:\d[A-Z]{2}\d{2}[A-Z]{2,3}\d{3}|\d{10,12})$";

static DEFAULT_REG_NO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(DEFAULT_REG_NO_PATTERN).expect("default registration pattern is valid")
});

/// Advisory input size limit (10 MiB). Larger files are processed with a warning.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Configuration for parsing, grading and report rendering.
///
/// # Example
/// ```rust
/// use marksheet_report::ProcessingConfig;
///
/// let config = ProcessingConfig::builder()
///     .pass_threshold(35.0)
///     .report_title("Semester 5 Results")
///     .build()
///     .unwrap();
/// assert_eq!(config.grading.pass_threshold, 35.0);
/// ```
#[derive(Clone)]
pub struct ProcessingConfig {
    /// Pass threshold and sentinel tokens.
    pub grading: GradingRules,

    /// Which subject marks add up into `total_marks`. Default: [`TotalPolicy::PassedOnly`].
    pub total_policy: TotalPolicy,

    /// What to do when a registration number repeats within one upload.
    /// Default: [`DuplicatePolicy::Keep`].
    pub duplicate_policy: DuplicatePolicy,

    /// Pattern a whole whitespace-separated token must match to be read as a
    /// registration number in PDF text. It is tried on the uppercased word
    /// first, then on the word as written.
    pub reg_no_pattern: Regex,

    /// Extra column headers (case-insensitive) that are neither identity
    /// fields nor subjects, e.g. `Total` or `SGPA` columns in the source sheet.
    pub skip_columns: Vec<String>,

    /// Maximum number of lines after a registration number that still belong
    /// to that student's block in PDF text. Default: 12.
    pub max_block_lines: usize,

    /// Advisory size limit in bytes. Default: 10 MiB.
    pub max_file_size_bytes: u64,

    /// PDF user password for encrypted result documents.
    pub password: Option<String>,

    /// Title printed at the top of every student report.
    pub report_title: String,

    /// Explicit path to the pdfium shared library. Falls back to
    /// `PDFIUM_LIB_PATH`, then to the system library.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Receives per-student events during batch rendering.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            grading: GradingRules::default(),
            total_policy: TotalPolicy::default(),
            duplicate_policy: DuplicatePolicy::default(),
            reg_no_pattern: DEFAULT_REG_NO_RE.clone(),
            skip_columns: Vec::new(),
            max_block_lines: 12,
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE,
            password: None,
            report_title: "Student Result Report".to_string(),
            pdfium_lib_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ProcessingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessingConfig")
            .field("grading", &self.grading)
            .field("total_policy", &self.total_policy)
            .field("duplicate_policy", &self.duplicate_policy)
            .field("reg_no_pattern", &self.reg_no_pattern.as_str())
            .field("skip_columns", &self.skip_columns)
            .field("max_block_lines", &self.max_block_lines)
            .field("max_file_size_bytes", &self.max_file_size_bytes)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("report_title", &self.report_title)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl ProcessingConfig {
    /// Create a new builder for `ProcessingConfig`.
    pub fn builder() -> ProcessingConfigBuilder {
        ProcessingConfigBuilder {
            config: Self::default(),
            reg_no_pattern: None,
        }
    }

    /// True when `header` was listed in `skip_columns`.
    pub fn is_skipped_column(&self, header: &str) -> bool {
        let header = header.trim();
        self.skip_columns
            .iter()
            .any(|c| c.trim().eq_ignore_ascii_case(header))
    }
}

/// Builder for [`ProcessingConfig`].
#[derive(Debug)]
pub struct ProcessingConfigBuilder {
    config: ProcessingConfig,
    reg_no_pattern: Option<String>,
}

impl ProcessingConfigBuilder {
    pub fn pass_threshold(mut self, threshold: f64) -> Self {
        self.config.grading.pass_threshold = threshold;
        self
    }

    pub fn absent_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.grading.absent_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    pub fn fail_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.grading.fail_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    pub fn total_policy(mut self, policy: TotalPolicy) -> Self {
        self.config.total_policy = policy;
        self
    }

    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.config.duplicate_policy = policy;
        self
    }

    /// Registration-number pattern for PDF text. Compiled in [`Self::build`].
    pub fn reg_no_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.reg_no_pattern = Some(pattern.into());
        self
    }

    pub fn skip_column(mut self, header: impl Into<String>) -> Self {
        self.config.skip_columns.push(header.into());
        self
    }

    pub fn max_block_lines(mut self, n: usize) -> Self {
        self.config.max_block_lines = n.max(1);
        self
    }

    pub fn max_file_size_bytes(mut self, bytes: u64) -> Self {
        self.config.max_file_size_bytes = bytes;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn report_title(mut self, title: impl Into<String>) -> Self {
        self.config.report_title = title.into();
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn BatchProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<ProcessingConfig, MarksheetError> {
        if let Some(pattern) = self.reg_no_pattern.take() {
            self.config.reg_no_pattern = Regex::new(&pattern).map_err(|e| {
                MarksheetError::InvalidConfig(format!(
                    "registration pattern '{}' does not compile: {}",
                    pattern, e
                ))
            })?;
        }
        self.config.grading.validate()?;
        Ok(self.config)
    }
}

/// Pass threshold and sentinel tokens used to grade a mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingRules {
    /// Scores at or above this value pass. Default: 40.
    pub pass_threshold: f64,
    /// Tokens meaning "absent" (case-insensitive). Default: `AB`, `ABSENT`.
    pub absent_tokens: Vec<String>,
    /// Tokens meaning "failed" (case-insensitive). Default: `F`, `FAIL`.
    pub fail_tokens: Vec<String>,
}

impl Default for GradingRules {
    fn default() -> Self {
        Self {
            pass_threshold: 40.0,
            absent_tokens: vec!["AB".into(), "ABSENT".into()],
            fail_tokens: vec!["F".into(), "FAIL".into()],
        }
    }
}

impl GradingRules {
    pub fn is_absent_token(&self, token: &str) -> bool {
        let token = token.trim();
        self.absent_tokens.iter().any(|t| t.eq_ignore_ascii_case(token))
    }

    pub fn is_fail_token(&self, token: &str) -> bool {
        let token = token.trim();
        self.fail_tokens.iter().any(|t| t.eq_ignore_ascii_case(token))
    }

    /// True for any configured sentinel.
    pub fn is_sentinel(&self, token: &str) -> bool {
        self.is_absent_token(token) || self.is_fail_token(token)
    }

    fn validate(&self) -> Result<(), MarksheetError> {
        if !self.pass_threshold.is_finite() || self.pass_threshold < 0.0 {
            return Err(MarksheetError::InvalidConfig(format!(
                "pass threshold must be a non-negative number, got {}",
                self.pass_threshold
            )));
        }
        if self.absent_tokens.iter().all(|t| t.trim().is_empty()) {
            return Err(MarksheetError::InvalidConfig(
                "at least one absent token is required".into(),
            ));
        }
        if self.fail_tokens.iter().all(|t| t.trim().is_empty()) {
            return Err(MarksheetError::InvalidConfig(
                "at least one fail token is required".into(),
            ));
        }
        if let Some(t) = self.absent_tokens.iter().find(|t| self.is_fail_token(t)) {
            return Err(MarksheetError::InvalidConfig(format!(
                "token '{}' is both an absent and a fail token",
                t
            )));
        }
        Ok(())
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Which subjects contribute their score to a student's total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TotalPolicy {
    /// Only PASS subjects count; FAIL and ABSENT contribute 0. (default)
    #[default]
    PassedOnly,
    /// Every numeric score counts, including below-threshold ones.
    /// Sentinel marks still contribute 0.
    AllScores,
}

impl TotalPolicy {
    /// Whether a subject with `status` may contribute its score.
    pub fn counts(&self, status: crate::model::SubjectStatus) -> bool {
        use crate::model::SubjectStatus;
        match self {
            TotalPolicy::PassedOnly => status == SubjectStatus::Pass,
            TotalPolicy::AllScores => status != SubjectStatus::Absent,
        }
    }
}

/// Handling of a registration number seen twice in one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DuplicatePolicy {
    /// Keep every record and log a warning. (default)
    #[default]
    Keep,
    /// Fail the upload with [`crate::error::ParseError::DuplicateRegistration`].
    Reject,
}
