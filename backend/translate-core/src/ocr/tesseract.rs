//! OCR engine backed by the `tesseract` command-line tool.

use crate::error::OcrError;
use crate::ocr::{OcrEngine, Recognition, validate_language};

use common::ErrorLocation;

use std::io::ErrorKind;
use std::panic::Location;
use std::path::PathBuf;
use std::process::Stdio;

use futures_util::future::BoxFuture;
use log::{debug, warn};
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;

pub const TESSERACT_BINARY: &str = "tesseract";

const STDIN_ARG: &str = "stdin";
const STDOUT_ARG: &str = "stdout";
const LANGUAGE_FLAG: &str = "-l";
const TSV_CONFIG: &str = "tsv";
const STDERR_EXCERPT_CHARS: usize = 200;

// Columns of tesseract's TSV output.
const TSV_COLUMNS: usize = 12;
const COL_LEVEL: usize = 0;
const COL_PAGE: usize = 1;
const COL_BLOCK: usize = 2;
const COL_PARAGRAPH: usize = 3;
const COL_LINE: usize = 4;
const COL_CONFIDENCE: usize = 10;
const COL_TEXT: usize = 11;
const WORD_LEVEL: &str = "5";

#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: PathBuf,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new(TESSERACT_BINARY)
    }
}

impl TesseractCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn build_command(&self, language: &str) -> TokioCommand {
        let mut cmd = TokioCommand::new(&self.binary);
        cmd.arg(STDIN_ARG)
            .arg(STDOUT_ARG)
            .arg(LANGUAGE_FLAG)
            .arg(language)
            .arg(TSV_CONFIG)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, image: &[u8], language: &str) -> Result<Recognition, OcrError> {
        validate_language(language)?;

        debug!(
            "Spawning {} for {} byte image (language: {language})",
            self.binary.display(),
            image.len()
        );

        let mut child = self
            .build_command(language)
            .spawn()
            .map_err(|e| OcrError::Spawn {
                message: match e.kind() {
                    ErrorKind::NotFound => format!(
                        "OCR engine not found: {} is not installed",
                        self.binary.display()
                    ),
                    _ => format!("Failed to start OCR engine: {e}"),
                },
                location: ErrorLocation::from(Location::caller()),
                source: Box::new(e),
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| OcrError::engine("OCR engine has no stdin"))?;

        let feed = async move {
            stdin.write_all(image).await?;
            stdin.shutdown().await
        };

        let (feed_result, output) = tokio::join!(feed, child.wait_with_output());

        let output = output.map_err(|e| OcrError::engine(format!("OCR engine failed: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::engine(format!(
                "OCR processing failed ({}): {}",
                output.status,
                stderr.trim().chars().take(STDERR_EXCERPT_CHARS).collect::<String>()
            )));
        }

        if let Err(e) = feed_result {
            // The engine succeeded, so it read what it needed.
            warn!("Writing image to OCR engine ended early: {e}");
        }

        let tsv = String::from_utf8_lossy(&output.stdout);
        let recognition = parse_tsv(&tsv);

        debug!(
            "OCR finished: {} chars, confidence {}",
            recognition.text.chars().count(),
            recognition.confidence
        );

        Ok(recognition)
    }
}

impl OcrEngine for TesseractCli {
    fn recognize<'a>(
        &'a self,
        image: &'a [u8],
        language: &'a str,
    ) -> BoxFuture<'a, Result<Recognition, OcrError>> {
        Box::pin(self.run(image, language))
    }
}

/// Rebuild text and mean confidence from tesseract TSV output.
///
/// Words (level 5) with a non-negative confidence are joined with spaces
/// within a line; lines are separated by newlines.
pub fn parse_tsv(tsv: &str) -> Recognition {
    let mut text = String::new();
    let mut confidence_sum = 0.0_f64;
    let mut word_count = 0_u32;
    let mut current_line: Option<(&str, &str, &str, &str)> = None;

    // First row is the header.
    for row in tsv.lines().skip(1) {
        let columns: Vec<&str> = row.split('\t').collect();
        if columns.len() < TSV_COLUMNS || columns[COL_LEVEL] != WORD_LEVEL {
            continue;
        }

        let Ok(confidence) = columns[COL_CONFIDENCE].trim().parse::<f64>() else {
            continue;
        };
        let word = columns[COL_TEXT].trim();
        if confidence < 0.0 || word.is_empty() {
            continue;
        }

        let line_key = (
            columns[COL_PAGE],
            columns[COL_BLOCK],
            columns[COL_PARAGRAPH],
            columns[COL_LINE],
        );

        match current_line {
            Some(key) if key == line_key => text.push(' '),
            Some(_) => text.push('\n'),
            None => {}
        }
        current_line = Some(line_key);

        text.push_str(word);
        confidence_sum += confidence;
        word_count += 1;
    }

    let confidence = if word_count == 0 {
        0
    } else {
        (confidence_sum / f64::from(word_count)).round().clamp(0.0, 100.0) as u8
    };

    Recognition {
        text: text.trim().to_string(),
        confidence,
    }
}
