//! Host-side seams: showing a tip and forwarding its command
//!
//! The engine never runs commands itself. A presenter renders the tip and,
//! when the user asks for it, hands the script to a [`CommandSink`].

use std::io::Write;

use anyhow::{Context, Result};
use tracing::info;

use crate::tips::TipEntry;

/// Renders a selected tip
pub trait Presenter {
    fn present(&mut self, index: usize, tip: &TipEntry) -> Result<()>;
}

/// Receives a tip's command script verbatim
pub trait CommandSink {
    fn execute(&mut self, script: &str) -> Result<()>;
}

/// Forward the tip's command if it has one; returns whether anything was sent
pub fn run_action(tip: &TipEntry, sink: &mut dyn CommandSink) -> Result<bool> {
    let Some(script) = tip.command.as_deref().filter(|_| tip.has_action()) else {
        return Ok(false);
    };
    info!(lines = script.lines().count(), "Forwarding tip command");
    sink.execute(script)?;
    Ok(true)
}

/// Plain-text presenter for terminals and logs
pub struct ConsolePresenter<W: Write> {
    out: W,
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for ConsolePresenter<W> {
    fn present(&mut self, index: usize, tip: &TipEntry) -> Result<()> {
        let out = &mut self.out;
        writeln!(out, "Tip #{}", index + 1).context("Failed to write tip")?;
        writeln!(out, "{}", tip.display_text()).context("Failed to write tip")?;
        if let Some(url) = &tip.image_url {
            writeln!(out, "Image: {url}").context("Failed to write tip")?;
        }
        if tip.has_action() {
            writeln!(out, "(this tip has an action, run with --run to try it)")
                .context("Failed to write tip")?;
        }
        out.flush().context("Failed to flush tip output")
    }
}

/// Writes the script so it can be piped into an interpreter
pub struct WriterSink<W: Write> {
    out: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CommandSink for WriterSink<W> {
    fn execute(&mut self, script: &str) -> Result<()> {
        writeln!(self.out, "{script}").context("Failed to write command script")?;
        self.out.flush().context("Failed to flush command script")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        scripts: Vec<String>,
    }

    impl CommandSink for RecordingSink {
        fn execute(&mut self, script: &str) -> Result<()> {
            self.scripts.push(script.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_console_presenter_renders_line_breaks() {
        let tip = TipEntry::new("Top\\nBottom").with_image_url("https://example.org/x.png");
        let mut presenter = ConsolePresenter::new(Vec::new());
        presenter.present(2, &tip).unwrap();

        let output = String::from_utf8(presenter.into_inner()).unwrap();
        assert_eq!(output, "Tip #3\nTop\nBottom\nImage: https://example.org/x.png\n");
    }

    #[test]
    fn test_console_presenter_mentions_action() {
        let tip = TipEntry::new("Try it").with_command("home");
        let mut presenter = ConsolePresenter::new(Vec::new());
        presenter.present(0, &tip).unwrap();

        let output = String::from_utf8(presenter.into_inner()).unwrap();
        assert!(output.contains("--run"));
    }

    #[test]
    fn test_run_action_forwards_verbatim() {
        let tip = TipEntry::new("Multi").with_command("echo a\n  echo b");
        let mut sink = RecordingSink::default();
        assert!(run_action(&tip, &mut sink).unwrap());
        assert_eq!(sink.scripts, vec!["echo a\n  echo b".to_string()]);
    }

    #[test]
    fn test_run_action_without_command() {
        let mut sink = RecordingSink::default();
        assert!(!run_action(&TipEntry::new("No action"), &mut sink).unwrap());
        assert!(!run_action(&TipEntry::new("Blank").with_command(" "), &mut sink).unwrap());
        assert!(sink.scripts.is_empty());
    }

    #[test]
    fn test_writer_sink() {
        let mut sink = WriterSink::new(Vec::new());
        sink.execute("one\ntwo").unwrap();
        assert_eq!(sink.into_inner(), b"one\ntwo\n");
    }
}
