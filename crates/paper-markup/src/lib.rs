//! LaTeX to reStructuredText conversion for paper sections.
//!
//! Section sources are written in a small LaTeX subset; the publishing
//! pipeline consumes reStructuredText. Conversion is a fixed, ordered list
//! of regex rules (see [`RuleSet::standard`]) applied to the whole file, with
//! footnotes collected per file and appended as endnotes.
//!
//! # Example
//!
//! ```
//! use paper_markup::RuleSet;
//!
//! let converted = RuleSet::standard().convert("\\section{Results}");
//! assert_eq!(converted.text, "Results\n=======");
//! ```

mod convert;
mod label;
mod rules;

pub use convert::{ConvertedFile, MarkupError, convert_sections, sanitize_figures};
pub use label::{sanitize_label, sanitize_label_commands};
pub use rules::{Conversion, ConversionState, Rule, RuleAction, RuleSet, TransformFn};
