//! Turning per-position glyph selections into overstruck text.
//!
//! A text row is printed as one or more *strikes*: passes of the print head
//! over the same line, separated by a bare carriage return. Single-glyph
//! renders produce one strike per layer; pair renders produce two per layer
//! (the first and second character of each pre-scanned pair).

use crate::params::Layout;
use crate::selector::Selections;
use serde::{Deserialize, Serialize};

/// Returns the carriage to column 0 without feeding paper.
pub const OVERSTRIKE: &str = "\r";
/// Ends a printed row.
pub const LINE_END: &str = "\r\n";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeOptions {
    /// Spaces in front of every strike.
    pub indent: usize,
}

/// Composed text: rows of strikes, trailing blanks already removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComposedText {
    rows: Vec<Vec<String>>,
    indent: usize,
}

impl ComposedText {
    #[cfg(test)]
    pub(crate) fn from_rows(rows: Vec<Vec<String>>, indent: usize) -> Self {
        Self { rows, indent }
    }

    /// Indent every strike was composed with.
    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Every strike of every row, in print order.
    pub fn strike_lines(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(String::as_str)
    }

    /// One line per row with its strikes joined by [`OVERSTRIKE`].
    pub fn lines(&self) -> Vec<String> {
        self.rows.iter().map(|strikes| strikes.join(OVERSTRIKE)).collect()
    }

    /// Rows joined by [`LINE_END`], without a trailing terminator.
    pub fn to_text(&self) -> String {
        self.lines().join(LINE_END)
    }
}

/// Compose `selections` into overstruck rows.
pub fn compose(selections: &Selections, opts: &ComposeOptions) -> ComposedText {
    let indent = " ".repeat(opts.indent);
    let strike = |chars: &mut dyn Iterator<Item = char>| -> String {
        let mut line = indent.clone();
        line.extend(chars);
        line.truncate(line.trim_end_matches(' ').len());
        line
    };

    let rows = (0..selections.rows())
        .map(|row| {
            let mut strikes = Vec::new();
            for layer in 0..selections.layers() {
                let keys = || {
                    (0..selections.cols()).map(move |col| selections.at(row, col)[layer].key)
                };
                strikes.push(strike(&mut keys().map(|k| k.first())));
                if selections.layout() == Layout::Pair {
                    strikes.push(strike(&mut keys().map(|k| k.second().unwrap_or(' '))));
                }
            }
            strikes
        })
        .collect();

    ComposedText {
        rows,
        indent: opts.indent,
    }
}
