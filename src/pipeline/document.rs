//! Document parser: extracted PDF text → [`RawRow`]s.
//!
//! Result PDFs have no table structure at the text level, so records are
//! recovered in two passes over the lines of every page:
//!
//! 1. **Tokenize.** Each line is split at field labels (`Name:`,
//!    `Department:`, `Total:` …) and the remaining words are classified as
//!    [`Token::RegNo`], [`Token::SubjectCode`], [`Token::Score`],
//!    [`Token::Sentinel`] or [`Token::Word`].
//!
//! 2. **Match by proximity.** A line holding a registration number opens a
//!    block that collects the next `max_block_lines` lines. Within a block:
//!    * `CODE MARK` pairs assign a mark to a subject directly;
//!    * the trailing run of marks on a line is zipped, in order, with the
//!      most recent subject header (a line of subject codes without marks);
//!      marks beyond the header become `Subject N`;
//!    * words before that run are the name, unless a `Name:` label gave one.
//!
//!    `Department:` labels seen outside any block, or after a record whose
//!    marks are already collected, close that record and become the
//!    default department for the following records. A continuation line
//!    only contributes marks to header columns that are still open, so
//!    footers ending in a number are not read as subjects.
//!
//! Extraction is best-effort: missing fields are left blank, and text
//! without a registration number never produces a record.

use crate::config::{GradingRules, ProcessingConfig};
use crate::error::ParseError;
use crate::pipeline::evaluate::parse_score;
use crate::pipeline::normalize::{DEPARTMENT_COLUMN, NAME_COLUMN, REG_NO_COLUMN};
use crate::pipeline::row::{CellValue, RawRow};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

static SUBJECT_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d{2})?[A-Z]{2,5}\d{2,4}[A-Z]?$").unwrap());

static LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(student\s+name|candidate\s+name|name|department|dept|branch|reg(?:istration|ister)?\.?\s*(?:no|number)\.?|roll\s*no\.?|usn|total(?:\s+marks)?|result|sgpa|cgpa|percentage)\s*[:\-]",
    )
    .unwrap()
});

static PAGE_FOOTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^page\s+\d+(?:\s*(?:of|/)\s*\d+)?$").unwrap());

/// A classified word of a line.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    RegNo(String),
    SubjectCode(String),
    Score(f64),
    Sentinel(String),
    Word(String),
}

impl Token {
    fn is_mark(&self) -> bool {
        matches!(self, Token::Score(_) | Token::Sentinel(_))
    }

    fn text(&self) -> String {
        match self {
            Token::RegNo(s) | Token::SubjectCode(s) | Token::Sentinel(s) | Token::Word(s) => s.clone(),
            Token::Score(n) => crate::model::format_number(*n),
        }
    }

    fn cell(&self) -> CellValue {
        match self {
            Token::Score(n) => CellValue::Number(*n),
            other => CellValue::Text(other.text()),
        }
    }
}

/// Field named by a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelField {
    Name,
    Department,
    RegNo,
    /// Summary fields (`Total:`, `Result:` …) whose values are discarded.
    Summary,
}

fn label_field(label: &str) -> LabelField {
    let key: String = label
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect();
    if key.ends_with("name") {
        LabelField::Name
    } else if key == "department" || key == "dept" || key == "branch" {
        LabelField::Department
    } else if key.starts_with("reg") || key.starts_with("roll") || key == "usn" {
        LabelField::RegNo
    } else {
        LabelField::Summary
    }
}

/// One tokenized line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineTokens {
    /// Labelled values in line order (text up to the first mark or code).
    pub labels: Vec<(LabelField, String)>,
    /// All unlabelled tokens in line order.
    pub tokens: Vec<Token>,
}

impl LineTokens {
    fn reg_no(&self) -> Option<&str> {
        self.tokens.iter().find_map(|t| match t {
            Token::RegNo(r) => Some(r.as_str()),
            _ => None,
        })
    }

    fn label(&self, field: LabelField) -> Option<&str> {
        self.labels
            .iter()
            .find(|(f, v)| *f == field && !v.is_empty())
            .map(|(_, v)| v.as_str())
    }

    /// A subject header: at least one code and no marks or registration numbers.
    fn header_codes(&self) -> Option<Vec<String>> {
        let mut codes = Vec::new();
        for t in &self.tokens {
            match t {
                Token::SubjectCode(c) => codes.push(c.clone()),
                Token::Score(_) | Token::Sentinel(_) | Token::RegNo(_) => return None,
                Token::Word(_) => {}
            }
        }
        if codes.is_empty() {
            None
        } else {
            Some(codes)
        }
    }
}

/// Classify one whitespace-separated word.
pub fn classify_word(word: &str, rules: &GradingRules, reg_no_re: &Regex) -> Option<Token> {
    let w = word.trim_matches(|c: char| matches!(c, ',' | ';' | '|' | '(' | ')' | '[' | ']' | ':'));
    if w.is_empty() {
        return None;
    }
    let upper = w.to_uppercase();
    let token = if reg_no_re.is_match(&upper) {
        Token::RegNo(upper)
    } else if reg_no_re.is_match(w) {
        Token::RegNo(w.to_string())
    } else if SUBJECT_CODE_RE.is_match(&upper) {
        Token::SubjectCode(upper)
    } else if let Some(n) = parse_score(w) {
        Token::Score(n)
    } else if rules.is_sentinel(w) {
        Token::Sentinel(w.to_string())
    } else {
        Token::Word(w.to_string())
    };
    Some(token)
}

fn classify_all(text: &str, rules: &GradingRules, reg_no_re: &Regex) -> Vec<Token> {
    text.split_whitespace()
        .filter_map(|w| classify_word(w, rules, reg_no_re))
        .collect()
}

/// Tokenize a line, splitting off labelled segments first.
pub fn tokenize_line(line: &str, rules: &GradingRules, reg_no_re: &Regex) -> LineTokens {
    let mut out = LineTokens::default();
    let matches: Vec<_> = LABEL_RE.captures_iter(line).collect();

    let first_start = matches
        .first()
        .and_then(|m| m.get(0))
        .map(|m| m.start())
        .unwrap_or(line.len());
    out.tokens.extend(classify_all(&line[..first_start], rules, reg_no_re));

    for (i, caps) in matches.iter().enumerate() {
        let (Some(whole), Some(label)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let end = matches
            .get(i + 1)
            .and_then(|m| m.get(0))
            .map(|m| m.start())
            .unwrap_or(line.len());
        let field = label_field(label.as_str());
        let segment = classify_all(&line[whole.end()..end], rules, reg_no_re);

        match field {
            LabelField::Summary => {}
            LabelField::RegNo => out.tokens.extend(segment),
            LabelField::Name | LabelField::Department => {
                // The value runs until the first score, code or registration number.
                let split = segment
                    .iter()
                    .position(|t| !matches!(t, Token::Word(_) | Token::Sentinel(_)))
                    .unwrap_or(segment.len());
                let value = segment[..split]
                    .iter()
                    .map(Token::text)
                    .collect::<Vec<_>>()
                    .join(" ");
                out.labels.push((field, value));
                out.tokens.extend(segment[split..].iter().cloned());
            }
        }
    }
    out
}

/// A record being assembled from its registration line and the lines after it.
#[derive(Debug)]
struct Block {
    reg_no: String,
    name: Option<String>,
    department: Option<String>,
    marks: Vec<(String, CellValue)>,
    positional: usize,
    lines: usize,
}

impl Block {
    fn new(reg_no: &str) -> Self {
        Self {
            reg_no: reg_no.to_string(),
            name: None,
            department: None,
            marks: Vec::new(),
            positional: 0,
            lines: 0,
        }
    }

    fn add_mark(&mut self, subject: String, value: CellValue) {
        if !self.marks.iter().any(|(s, _)| *s == subject) {
            self.marks.push((subject, value));
        }
    }

    /// Fold one line's tokens into the block.
    ///
    /// `tokens` must not contain the registration number itself. `opening`
    /// is true for the registration line, whose trailing marks are always
    /// taken; a continuation line only fills header columns still open.
    fn absorb(&mut self, line: &LineTokens, tokens: &[Token], header: &[String], opening: bool) {
        if self.name.is_none() {
            self.name = line.label(LabelField::Name).map(str::to_string);
        }
        if self.department.is_none() {
            self.department = line.label(LabelField::Department).map(str::to_string);
        }

        // Explicit CODE MARK pairs.
        let mut rest: Vec<&Token> = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            if let (Token::SubjectCode(code), Some(next)) = (&tokens[i], tokens.get(i + 1)) {
                if next.is_mark() {
                    self.add_mark(code.clone(), next.cell());
                    i += 2;
                    continue;
                }
            }
            rest.push(&tokens[i]);
            i += 1;
        }

        // Trailing run of marks, zipped with the subject header.
        let run_start = rest
            .iter()
            .rposition(|t| !t.is_mark())
            .map(|p| p + 1)
            .unwrap_or(0);
        let (lead, marks) = rest.split_at(run_start);

        let words: Vec<String> = lead
            .iter()
            .filter(|t| matches!(t, Token::Word(_) | Token::Sentinel(_)))
            .map(|t| t.text())
            .collect();
        let names_student = self.name.is_none() && line.labels.is_empty() && !words.is_empty();

        let marks = if opening {
            marks
        } else if !words.is_empty() && !names_student {
            // prose such as a footer or signature line
            &marks[..0]
        } else {
            let open = header.len().saturating_sub(self.positional);
            &marks[..marks.len().min(open)]
        };
        if names_student {
            self.name = Some(words.join(" "));
        }

        for mark in marks {
            let subject = header
                .get(self.positional)
                .cloned()
                .unwrap_or_else(|| format!("Subject {}", self.positional + 1));
            self.add_mark(subject, mark.cell());
            self.positional += 1;
        }
    }

    fn into_row(self, default_department: Option<&str>) -> RawRow {
        let mut row = RawRow::new();
        row.push(REG_NO_COLUMN, CellValue::Text(self.reg_no));
        row.push(NAME_COLUMN, CellValue::text(self.name.unwrap_or_default()));
        let department = self
            .department
            .or_else(|| default_department.map(str::to_string))
            .unwrap_or_default();
        row.push(DEPARTMENT_COLUMN, CellValue::text(department));
        for (subject, value) in self.marks {
            row.push(subject, value);
        }
        row
    }
}

/// Parse the extracted text of every page into rows.
pub fn parse_document_text(pages: &[String], config: &ProcessingConfig) -> Result<Vec<RawRow>, ParseError> {
    let rules = &config.grading;
    let reg_no_re = &config.reg_no_pattern;

    let mut rows = Vec::new();
    let mut header: Vec<String> = Vec::new();
    let mut default_department: Option<String> = None;
    let mut current: Option<Block> = None;

    let lines = pages
        .iter()
        .flat_map(|p| p.lines())
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty() && !PAGE_FOOTER_RE.is_match(l));

    for line in lines {
        let tokens = tokenize_line(&line, rules, reg_no_re);

        if let Some(reg_no) = tokens.reg_no() {
            if let Some(block) = current.take() {
                rows.push(block.into_row(default_department.as_deref()));
            }
            let mut block = Block::new(reg_no);
            // Everything after the first registration number belongs to the record.
            let after: Vec<Token> = tokens
                .tokens
                .iter()
                .skip_while(|t| !matches!(t, Token::RegNo(_)))
                .skip(1)
                .cloned()
                .collect();
            block.absorb(&tokens, &after, &header, true);
            debug!("Record block opened for {}", reg_no);
            current = Some(block);
            continue;
        }

        if let Some(codes) = tokens.header_codes() {
            debug!("Subject header: {:?}", codes);
            header = codes;
            if let Some(block) = current.as_mut() {
                block.positional = 0;
            }
            continue;
        }

        // A department label after a record that already has marks starts a
        // new section rather than describing that record.
        let section_break = tokens.label(LabelField::Department).is_some()
            && current.as_ref().is_some_and(|b| !b.marks.is_empty());
        let in_block = !section_break
            && current
                .as_ref()
                .is_some_and(|b| b.lines < config.max_block_lines);
        if in_block {
            if let Some(block) = current.as_mut() {
                block.lines += 1;
                block.absorb(&tokens, &tokens.tokens, &header, false);
            }
        } else {
            if let Some(block) = current.take() {
                rows.push(block.into_row(default_department.as_deref()));
            }
            if let Some(dept) = tokens.label(LabelField::Department) {
                default_department = Some(dept.to_string());
            }
        }
    }

    if let Some(block) = current.take() {
        rows.push(block.into_row(default_department.as_deref()));
    }

    if rows.is_empty() {
        return Err(ParseError::NoRecordsFound { pages: pages.len() });
    }
    info!("Document parsed: {} records from {} page(s)", rows.len(), pages.len());
    Ok(rows)
}
