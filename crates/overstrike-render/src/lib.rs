//! Overstrike text rendering.
//!
//! Current focus:
//! - greedy per-layer glyph selection against a residual descriptor block,
//! - composition of the chosen glyphs into carriage-return overstrike rows,
//! - print-job framing and JSON configuration.
//!
//! Descriptor extraction lives in `overstrike-core`, glyph tables in
//! `overstrike-glyphs`.

mod compose;
mod error;
mod io;
mod job;
mod params;
mod pipeline;
mod selector;

pub use compose::{compose, ComposeOptions, ComposedText, LINE_END, OVERSTRIKE};
pub use error::RenderError;
pub use io::{ConfigIoError, OverstrikeConfig};
pub use job::{JobOptions, PrintJob};
pub use params::{CandidatePolicy, Layout, RenderParams, TELETYPE_FIRST_LAYER};
pub use pipeline::{render_job, render_text, select_glyphs};
pub use selector::{LayerChoice, LayerSelector, RenderBlock, Selections};
