//! In-process session: the loaded records, their stats and a loading flag.
//!
//! A [`Session`] is what a presentation layer talks to. Every upload
//! replaces the records wholesale; a failed upload leaves the session empty
//! rather than showing stale results next to an error.

use crate::config::ProcessingConfig;
use crate::error::MarksheetError;
use crate::load::{self, LoadOutput};
use crate::model::{ParsingStats, StudentData};
use crate::report::{self, BatchSummary};
use crate::sample;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Owner of the loaded student list.
#[derive(Debug, Default)]
pub struct Session {
    config: ProcessingConfig,
    students: Vec<StudentData>,
    stats: ParsingStats,
    source: Option<String>,
    loading: bool,
}

impl Session {
    pub fn new(config: ProcessingConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Load a result file, replacing the current records.
    ///
    /// On error the previous records are cleared and the error is returned.
    pub async fn upload(&mut self, path: impl AsRef<Path>) -> Result<ParsingStats, MarksheetError> {
        self.loading = true;
        let result = load::load_students(path, &self.config).await;
        self.finish_upload(result)
    }

    /// Like [`Session::upload`] for bytes already in memory.
    pub async fn upload_bytes(&mut self, file_name: &str, bytes: Vec<u8>) -> Result<ParsingStats, MarksheetError> {
        self.loading = true;
        let result = load::load_students_from_bytes(file_name, bytes, &self.config).await;
        self.finish_upload(result)
    }

    fn finish_upload(&mut self, result: Result<LoadOutput, MarksheetError>) -> Result<ParsingStats, MarksheetError> {
        self.loading = false;
        match result {
            Ok(output) => {
                self.students = output.students;
                self.stats = output.stats;
                self.source = Some(output.source);
                Ok(self.stats.clone())
            }
            Err(e) => {
                warn!("Upload failed, clearing previous results: {}", e);
                self.clear();
                Err(e)
            }
        }
    }

    /// Install the built-in sample batch.
    pub fn load_sample(&mut self) -> ParsingStats {
        self.students = sample::sample_students(&self.config);
        self.stats = ParsingStats::from_students(&self.students);
        self.source = Some("sample".to_string());
        info!("Sample data loaded: {} students", self.students.len());
        self.stats.clone()
    }

    /// Drop all records.
    pub fn clear(&mut self) {
        self.students.clear();
        self.stats = ParsingStats::default();
        self.source = None;
    }

    /// Records whose registration number, name or department contains
    /// `query` (case-insensitive). A blank query matches everything.
    pub fn search(&self, query: &str) -> Vec<&StudentData> {
        let needle = query.trim().to_lowercase();
        self.students
            .iter()
            .filter(|s| {
                needle.is_empty()
                    || s.reg_no.to_lowercase().contains(&needle)
                    || s.name.to_lowercase().contains(&needle)
                    || s.department.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// The first record with exactly this registration number (case-insensitive).
    pub fn find(&self, reg_no: &str) -> Option<&StudentData> {
        let reg_no = reg_no.trim();
        self.students
            .iter()
            .find(|s| s.reg_no.eq_ignore_ascii_case(reg_no))
    }

    pub fn students(&self) -> &[StudentData] {
        &self.students
    }

    pub fn stats(&self) -> &ParsingStats {
        &self.stats
    }

    /// Where the current records came from, if any are loaded.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Render one student's report into `out_dir` and return its path.
    pub async fn download_report(&self, reg_no: &str, out_dir: impl AsRef<Path>) -> Result<PathBuf, MarksheetError> {
        let student = self
            .find(reg_no)
            .ok_or_else(|| MarksheetError::StudentNotFound {
                reg_no: reg_no.to_string(),
            })?;
        let bytes = load::render_student_report(student, &self.config).await?;
        let path = out_dir.as_ref().join(report::report_file_name(student));
        report::export::write_atomic(&path, &bytes)?;
        info!("Report for {} written to {}", student.reg_no, path.display());
        Ok(path)
    }

    /// Render every loaded student's report into `out_dir`.
    pub async fn download_all(&self, out_dir: impl AsRef<Path>) -> Result<BatchSummary, MarksheetError> {
        load::render_reports_to_dir(&self.students, out_dir, &self.config).await
    }

    /// Write the master JSON export of every loaded record.
    pub fn export_master(&self, path: impl AsRef<Path>) -> Result<(), MarksheetError> {
        load::write_master_export(&self.students, path)
    }
}
