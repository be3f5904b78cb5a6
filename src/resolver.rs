//! Resolve a capture file's stem to the catalog document it belongs to.
//!
//! The site's [`MappingStore`] is consulted first. When the stem is unmapped,
//! or mapped to a URL the catalog no longer has, a [`DecisionProvider`] is
//! asked to pick a candidate. A pick is saved to the mapping before the
//! resolver returns, so later runs resolve the same stem without asking.

use anyhow::{bail, Result};
use std::collections::VecDeque;
use std::io::{BufRead, Write};

use crate::mapping::MappingStore;
use crate::models::Document;
use crate::progress::{SyncProgressEvent, SyncProgressReporter};

/// An answer from a [`DecisionProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Index into the candidate list as presented.
    Select(usize),
    Skip,
    /// The answer was neither a skip nor a usable index.
    Invalid(String),
}

/// Something that can choose a document for an unmapped file.
pub trait DecisionProvider {
    fn present(&mut self, stem: &str, candidates: &[Document]) -> Result<Decision>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Found through an existing mapping entry.
    Mapped { document_id: String },
    /// Chosen by the decision provider and saved to the mapping.
    Assigned { document_id: String, url: String },
    Skipped,
    InvalidInput { input: String },
}

impl Resolution {
    pub fn document_id(&self) -> Option<&str> {
        match self {
            Resolution::Mapped { document_id } | Resolution::Assigned { document_id, .. } => {
                Some(document_id)
            }
            Resolution::Skipped | Resolution::InvalidInput { .. } => None,
        }
    }
}

pub fn resolve(
    stem: &str,
    candidates: &[Document],
    mapping: &mut MappingStore,
    decisions: &mut dyn DecisionProvider,
    reporter: &dyn SyncProgressReporter,
) -> Result<Resolution> {
    if let Some(url) = mapping.get(stem) {
        if let Some(doc) = candidates.iter().find(|d| d.url == url) {
            return Ok(Resolution::Mapped {
                document_id: doc.document_id.clone(),
            });
        }
        tracing::debug!(stem, url, "mapped url not in catalog");
        reporter.report(SyncProgressEvent::StaleMapping {
            stem: stem.to_string(),
            url: url.to_string(),
        });
    }

    match decisions.present(stem, candidates)? {
        Decision::Select(idx) => match candidates.get(idx) {
            Some(doc) => {
                mapping.assign(stem, &doc.url)?;
                reporter.report(SyncProgressEvent::Mapped {
                    stem: stem.to_string(),
                    url: doc.url.clone(),
                });
                Ok(Resolution::Assigned {
                    document_id: doc.document_id.clone(),
                    url: doc.url.clone(),
                })
            }
            None => Ok(Resolution::InvalidInput {
                input: idx.to_string(),
            }),
        },
        Decision::Skip => Ok(Resolution::Skipped),
        Decision::Invalid(input) => Ok(Resolution::InvalidInput { input }),
    }
}

/// Interpret a typed answer against a list of `count` candidates.
pub fn parse_choice(raw: &str, count: usize) -> Decision {
    let answer = raw.trim().to_lowercase();
    if answer == "s" {
        return Decision::Skip;
    }
    match answer.parse::<usize>() {
        Ok(idx) if idx < count => Decision::Select(idx),
        _ => Decision::Invalid(answer),
    }
}

/// The numbered candidate menu shown to the user.
pub fn render_candidates(stem: &str, candidates: &[Document]) -> String {
    let mut out = format!(
        "\n  Unrecognised file: {}\n  Available documents for this site:\n",
        stem
    );
    for (i, doc) in candidates.iter().enumerate() {
        let category = doc
            .category
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(|c| format!("  [{}]", c))
            .unwrap_or_default();
        out.push_str(&format!("    [{}] {}{}\n", i, doc.label(), category));
    }
    out.push_str("    [s] Skip this file\n");
    out
}

/// Asks on a terminal (or any reader/writer pair).
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> DecisionProvider for ConsolePrompt<R, W> {
    fn present(&mut self, stem: &str, candidates: &[Document]) -> Result<Decision> {
        self.output
            .write_all(render_candidates(stem, candidates).as_bytes())?;
        write!(self.output, "  Assign to document number (or s to skip): ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            // End of input: nobody is there to answer.
            writeln!(self.output)?;
            return Ok(Decision::Skip);
        }
        Ok(parse_choice(&line, candidates.len()))
    }
}

/// Replays a fixed list of decisions. Used in tests and unattended runs.
#[derive(Debug, Default)]
pub struct ScriptedDecisions {
    queue: VecDeque<Decision>,
    asked: Vec<String>,
}

impl ScriptedDecisions {
    pub fn new(decisions: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            queue: decisions.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    /// Stems the provider was asked about, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl DecisionProvider for ScriptedDecisions {
    fn present(&mut self, stem: &str, _candidates: &[Document]) -> Result<Decision> {
        self.asked.push(stem.to_string());
        match self.queue.pop_front() {
            Some(d) => Ok(d),
            None => bail!("no scripted decision left for '{}'", stem),
        }
    }
}
