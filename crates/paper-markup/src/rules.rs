//! Ordered rewrite rules turning LaTeX section sources into reStructuredText.
//!
//! A [`RuleSet`] is applied rule by rule over the whole document text. Later
//! rules see the output of earlier ones, so the order of the standard table
//! is part of its behavior:
//!
//! - labels are hoisted before headings are converted, so a label attached to
//!   a heading ends up above the heading and its underline
//! - footnotes are extracted after every inline rule ran, so endnote bodies
//!   are already converted
//! - the quote rule scans each pair of opening backticks left to right and
//!   looks at what closes it first: a `"` makes it a quotation, another pair
//!   of backticks makes it a code span from the `\texttt` rule, which is
//!   skipped whole
//! - the tilde rule leaves `\url` and `\href` arguments alone since those are
//!   converted after it

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::label::sanitize_label;

/// Word prepended to `\autoref` targets.
const AUTOREF_PREFIX: &str = "Figure";

static STANDARD_RULES: LazyLock<RuleSet> = LazyLock::new(|| RuleSet::new(standard_rules()));

/// Mutable state threaded through the transform rules of one conversion pass.
#[derive(Debug, Default)]
pub struct ConversionState {
    footnotes: Vec<String>,
}

impl ConversionState {
    /// Create an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a footnote body.
    fn push_footnote(&mut self, body: &str) {
        self.footnotes.push(body.to_owned());
    }

    /// Auto-numbered endnote definitions, one per line in marker order.
    ///
    /// docutils pairs `[#]_` markers with `.. [#]` bodies by position, so
    /// sections combined into one document never collide on a number.
    fn endnotes(&self) -> String {
        self.footnotes
            .iter()
            .map(|body| format!(".. [#] {body}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Callback producing the replacement for one match.
pub type TransformFn = fn(&Captures<'_>, &mut ConversionState) -> String;

/// What a rule does with each match.
pub enum RuleAction {
    /// Replacement template; `${1}` style references expand to capture groups.
    Template(&'static str),
    /// Replacement computed from the captures and the per-file state.
    Transform(TransformFn),
}

impl fmt::Debug for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(template) => f.debug_tuple("Template").field(template).finish(),
            Self::Transform(_) => f.write_str("Transform"),
        }
    }
}

/// A single pattern and the action applied to each of its matches.
#[derive(Debug)]
pub struct Rule {
    name: &'static str,
    pattern: Regex,
    action: RuleAction,
}

impl Rule {
    /// Create a rule from a regex pattern.
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error if `pattern` is invalid.
    pub fn new(name: &'static str, pattern: &str, action: RuleAction) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern)?,
            action,
        })
    }

    /// Short identifier used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Replace every match of the rule in `text`.
    pub fn apply(&self, text: &str, state: &mut ConversionState) -> String {
        match &self.action {
            RuleAction::Template(template) => self.pattern.replace_all(text, *template).into_owned(),
            RuleAction::Transform(transform) => self
                .pattern
                .replace_all(text, |caps: &Captures<'_>| transform(caps, state))
                .into_owned(),
        }
    }
}

/// Result of converting one document.
#[derive(Debug)]
pub struct Conversion {
    /// Converted text, endnotes included.
    pub text: String,
    /// Footnote bodies in order of appearance.
    pub footnotes: Vec<String>,
}

/// Ordered list of rules applied to a document.
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Create a rule set applying `rules` in the given order.
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The LaTeX to reStructuredText table used for paper sections.
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD_RULES
    }

    /// Rules in application order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Convert one document.
    ///
    /// Footnotes collected by the rules are appended as endnote definitions
    /// after every rule ran. State is never shared between calls.
    #[must_use]
    pub fn convert(&self, source: &str) -> Conversion {
        let mut state = ConversionState::new();
        let mut text = source.to_owned();
        for rule in &self.rules {
            text = rule.apply(&text, &mut state);
        }
        if !state.footnotes.is_empty() {
            text.push_str("\n\n");
            text.push_str(&state.endnotes());
        }
        Conversion {
            text,
            footnotes: state.footnotes,
        }
    }
}

fn rule(name: &'static str, pattern: &str, action: RuleAction) -> Rule {
    Rule::new(name, pattern, action).unwrap()
}

fn standard_rules() -> Vec<Rule> {
    use RuleAction::{Template, Transform};

    vec![
        rule("cite", r"\\cite\{(.*?)\}", Template(":cite:`${1}`")),
        // Captures the content before the label so the anchor lands above it
        rule("label", r"(.*)\\label\{(.*?)\}", Transform(hoist_label)),
        rule("section", r"\\(sub)?section\{(.*?)\}", Transform(underline_heading)),
        rule("ref", r"\\(auto)?ref\{(.*?)\}", Transform(reference)),
        rule("emph", r"\\emph\{(.*?)\}", Template("*${1}*")),
        rule("texttt", r"\\texttt\{(.*?)\}", Template("``${1}``")),
        // Figures come from \make...Fig macros defined in the figures file
        rule("figure", r"(\\make.*Fig)", Template(".. raw:: latex\n\n    ${1}")),
        rule("quote", r#"``([^`"\n]*)(``|")"#, Transform(normalize_quote)),
        rule("nbsp", r"\\(?:href|url)\{[^}]*\}|~", Transform(plain_space)),
        rule("comment", r"(?m)^(%.*)", Template("\n..\n    ${1}\n")),
        rule("href", r"\\href\{(.*?)\}\{(.*?)\}", Template("`${2} <${1}>`_")),
        rule("url", r"\\url\{(.*?)\}", Template("`${1} <${1}>`_")),
        rule("footnote", r"\\footnote\{(.*?)\}", Transform(footnote_marker)),
        // List structure comes from the bullet characters alone
        rule("itemize", r"\\(begin|end)\{itemize\}\n", Template("")),
        rule("item", r"\\item", Template("*")),
        rule("listing-begin", r"\\begin\{lstlisting\}", Template("```python")),
        rule("listing-end", r"\\end\{lstlisting\}", Template("```")),
    ]
}

fn hoist_label(caps: &Captures<'_>, _state: &mut ConversionState) -> String {
    format!(".. _{}:\n\n{}", sanitize_label(&caps[2]), &caps[1])
}

fn underline_heading(caps: &Captures<'_>, _state: &mut ConversionState) -> String {
    let title = &caps[2];
    let underline = if caps.get(1).is_some() { "-" } else { "=" };
    format!("{title}\n{}", underline.repeat(title.chars().count()))
}

fn reference(caps: &Captures<'_>, _state: &mut ConversionState) -> String {
    let target = sanitize_label(&caps[2]);
    if caps.get(1).is_some() {
        format!("{AUTOREF_PREFIX} :ref:`{target}`")
    } else {
        format!(":ref:`{target}`")
    }
}

fn normalize_quote(caps: &Captures<'_>, _state: &mut ConversionState) -> String {
    let text = &caps[1];
    if &caps[2] == "\"" && !text.is_empty() {
        format!("\"{text}\"")
    } else {
        caps[0].to_owned()
    }
}

fn plain_space(caps: &Captures<'_>, _state: &mut ConversionState) -> String {
    let matched = &caps[0];
    if matched == "~" {
        " ".to_owned()
    } else {
        matched.to_owned()
    }
}

fn footnote_marker(caps: &Captures<'_>, state: &mut ConversionState) -> String {
    state.push_footnote(&caps[1]);
    " [#]_".to_owned()
}
