//! File-level conversion of a paper's section sources.

use std::path::{Path, PathBuf};

use crate::label::sanitize_label_commands;
use crate::rules::RuleSet;

/// Extension of authoring sources.
const SOURCE_EXTENSION: &str = "tex";
/// Extension of converted sections.
const OUTPUT_EXTENSION: &str = "rst";

/// Error during section conversion.
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    /// Reading or writing a file failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The sections glob could not be built from the directory path.
    #[error("invalid sections pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl MarkupError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// One converted section file.
#[derive(Debug, PartialEq, Eq)]
pub struct ConvertedFile {
    /// Source `.tex` file.
    pub source: PathBuf,
    /// Written `.rst` file.
    pub output: PathBuf,
    /// Number of footnotes moved to the end of the file.
    pub footnotes: usize,
}

/// Convert every `*.tex` file in `sections_dir` into `output_dir`.
///
/// Files are processed in name order and each gets a fresh footnote
/// accumulator. `output_dir` is created if missing; existing files in it are
/// overwritten.
pub fn convert_sections(
    rules: &RuleSet,
    sections_dir: &Path,
    output_dir: &Path,
) -> Result<Vec<ConvertedFile>, MarkupError> {
    let pattern = Path::new(&glob::Pattern::escape(&sections_dir.to_string_lossy()))
        .join(format!("*.{SOURCE_EXTENSION}"));

    let mut sources = Vec::new();
    for entry in glob::glob(&pattern.to_string_lossy())? {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            MarkupError::io(&path, std::io::Error::from(e))
        })?;
        if path.is_file() {
            sources.push(path);
        }
    }
    sources.sort();

    if sources.is_empty() {
        tracing::warn!(dir = %sections_dir.display(), "No section sources found");
        return Ok(Vec::new());
    }

    std::fs::create_dir_all(output_dir).map_err(|e| MarkupError::io(output_dir, e))?;

    let mut converted = Vec::with_capacity(sources.len());
    for source in sources {
        let text = std::fs::read_to_string(&source).map_err(|e| MarkupError::io(&source, e))?;
        let conversion = rules.convert(&text);

        let output = output_path(&source, output_dir);
        std::fs::write(&output, &conversion.text).map_err(|e| MarkupError::io(&output, e))?;

        tracing::info!(
            source = %source.display(),
            output = %output.display(),
            footnotes = conversion.footnotes.len(),
            "Converted section"
        );
        converted.push(ConvertedFile {
            source,
            output,
            footnotes: conversion.footnotes.len(),
        });
    }

    Ok(converted)
}

/// Write a copy of `figures_file` with sanitized `\label` arguments.
///
/// The copy is named `sanitized_name` and placed next to the original, which
/// is left untouched. Returns the path of the copy.
pub fn sanitize_figures(figures_file: &Path, sanitized_name: &str) -> Result<PathBuf, MarkupError> {
    let text = std::fs::read_to_string(figures_file).map_err(|e| MarkupError::io(figures_file, e))?;
    let target = figures_file.with_file_name(sanitized_name);
    std::fs::write(&target, sanitize_label_commands(&text)).map_err(|e| MarkupError::io(&target, e))?;
    tracing::info!(
        source = %figures_file.display(),
        output = %target.display(),
        "Sanitized figure labels"
    );
    Ok(target)
}

fn output_path(source: &Path, output_dir: &Path) -> PathBuf {
    let stem = source.file_stem().unwrap_or_default().to_string_lossy();
    output_dir.join(format!("{stem}.{OUTPUT_EXTENSION}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_convert_sections_writes_rst_files() {
        let temp = tempfile::tempdir().unwrap();
        let sections = temp.path().join("sections");
        let output = temp.path().join("sections_rst");
        fs::create_dir_all(&sections).unwrap();
        fs::write(sections.join("01_intro.tex"), "\\section{Intro}\nText\\footnote{a}.").unwrap();
        fs::write(sections.join("02_method.tex"), "\\subsection{How}\nMore\\footnote{b}.").unwrap();
        fs::write(sections.join("notes.txt"), "ignored").unwrap();

        let converted = convert_sections(RuleSet::standard(), &sections, &output).unwrap();

        assert_eq!(converted.len(), 2);
        assert_eq!(converted[0].output, output.join("01_intro.rst"));
        assert_eq!(converted[1].output, output.join("02_method.rst"));
        assert_eq!(converted[0].footnotes, 1);
        assert_eq!(
            fs::read_to_string(output.join("01_intro.rst")).unwrap(),
            "Intro\n=====\nText [#]_.\n\n.. [#] a"
        );
        // Footnote numbering restarts for every file
        assert_eq!(
            fs::read_to_string(output.join("02_method.rst")).unwrap(),
            "How\n---\nMore [#]_.\n\n.. [#] b"
        );
        assert!(!output.join("notes.rst").exists());
    }

    #[test]
    fn test_convert_sections_overwrites_previous_output() {
        let temp = tempfile::tempdir().unwrap();
        let sections = temp.path().join("sections");
        let output = temp.path().join("out");
        fs::create_dir_all(&sections).unwrap();
        fs::create_dir_all(&output).unwrap();
        fs::write(output.join("a.rst"), "stale").unwrap();
        fs::write(sections.join("a.tex"), "\\emph{fresh}").unwrap();

        convert_sections(RuleSet::standard(), &sections, &output).unwrap();
        let first = fs::read_to_string(output.join("a.rst")).unwrap();
        convert_sections(RuleSet::standard(), &sections, &output).unwrap();
        let second = fs::read_to_string(output.join("a.rst")).unwrap();

        assert_eq!(first, "*fresh*");
        assert_eq!(first, second);
    }

    #[test]
    fn test_convert_sections_missing_dir_is_empty() {
        let temp = tempfile::tempdir().unwrap();
        let converted = convert_sections(
            RuleSet::standard(),
            &temp.path().join("missing"),
            &temp.path().join("out"),
        )
        .unwrap();
        assert!(converted.is_empty());
        assert!(!temp.path().join("out").exists());
    }

    #[test]
    fn test_sanitize_figures_writes_sibling() {
        let temp = tempfile::tempdir().unwrap();
        let figures = temp.path().join("figures");
        fs::create_dir_all(&figures).unwrap();
        let source = figures.join("makefigs.tex");
        let original = "\\newcommand{\\makeFlowFig}{\\label{fig:data_flow}}\n";
        fs::write(&source, original).unwrap();

        let target = sanitize_figures(&source, "makefigssanitized.tex").unwrap();

        assert_eq!(target, figures.join("makefigssanitized.tex"));
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "\\newcommand{\\makeFlowFig}{\\label{figdataflow}}\n"
        );
        assert_eq!(fs::read_to_string(&source).unwrap(), original);
    }

    #[test]
    fn test_sanitize_figures_missing_file() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("makefigs.tex");
        let err = sanitize_figures(&missing, "out.tex").unwrap_err();
        assert!(matches!(err, MarkupError::Io { .. }));
        assert!(err.to_string().contains("makefigs.tex"));
    }
}
