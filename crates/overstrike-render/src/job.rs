//! Byte framing for a teletype print job.

use crate::compose::{ComposedText, LINE_END};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobOptions {
    /// Empty lines fed before the picture.
    pub lead_feeds: usize,
    /// Line ends after the caption line. The first one terminates the
    /// title when there is one.
    pub trail_feeds: usize,
    /// Caption printed under the picture.
    pub title: Option<String>,
    /// Picture width in characters, used to centre the title.
    pub width: usize,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            lead_feeds: 7,
            trail_feeds: 5,
            title: None,
            width: 66,
        }
    }
}

impl JobOptions {
    /// Title line centred over a picture indented by `indent`, if any.
    pub fn centred_title(&self, indent: usize) -> Option<String> {
        let title = self.title.as_deref()?;
        let pad = indent + self.width.saturating_sub(title.chars().count()) / 2;
        Some(format!("{}{title}", " ".repeat(pad)))
    }
}

/// A fully composed picture plus its framing.
#[derive(Clone, Debug)]
pub struct PrintJob {
    pub text: ComposedText,
    pub options: JobOptions,
}

impl PrintJob {
    pub fn new(text: ComposedText, options: JobOptions) -> Self {
        Self { text, options }
    }

    /// The whole job as printer bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let feed = LINE_END.as_bytes();
        let mut buf = feed.repeat(self.options.lead_feeds);
        for line in self.text.lines() {
            buf.extend_from_slice(line.as_bytes());
            buf.extend_from_slice(feed);
        }
        match self.options.centred_title(self.text.indent()) {
            Some(title) => buf.extend_from_slice(title.as_bytes()),
            // An untitled job still feeds the empty caption line.
            None => buf.extend_from_slice(feed),
        }
        buf.extend_from_slice(&feed.repeat(self.options.trail_feeds));
        buf
    }

    pub fn write_to<W: Write>(&self, mut out: W) -> io::Result<()> {
        out.write_all(&self.to_bytes())?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_centred_with_indent() {
        let opts = JobOptions {
            title: Some("CAT".into()),
            width: 9,
            ..JobOptions::default()
        };
        assert_eq!(opts.centred_title(2).as_deref(), Some("     CAT"));

        let long = JobOptions {
            title: Some("A VERY LONG TITLE".into()),
            width: 4,
            ..JobOptions::default()
        };
        assert_eq!(long.centred_title(0).as_deref(), Some("A VERY LONG TITLE"));
    }

    fn job(title: Option<&str>) -> PrintJob {
        let text = ComposedText::from_rows(vec![vec!["#".to_string()]], 0);
        let options = JobOptions {
            lead_feeds: 1,
            trail_feeds: 2,
            title: title.map(String::from),
            width: 1,
        };
        PrintJob::new(text, options)
    }

    #[test]
    fn title_terminator_is_the_first_trailing_feed() {
        assert_eq!(job(Some("T")).to_bytes(), b"\r\n#\r\nT\r\n\r\n");
    }

    #[test]
    fn untitled_job_feeds_an_empty_caption_line() {
        assert_eq!(job(None).to_bytes(), b"\r\n#\r\n\r\n\r\n\r\n");
    }

    #[test]
    fn write_to_matches_to_bytes() {
        let job = job(Some("T"));
        let mut out = Vec::new();
        job.write_to(&mut out).expect("write");
        assert_eq!(out, job.to_bytes());
    }
}
