use std::io::{self, Write};

use session_chat::{ChannelManager, ConnectionPhase, EventLog, SessionAddress, SessionId};

/// Printed before a redraw when the transcript was cleared.
pub const RULE: &str = "----------------------------------------";

/// Line-oriented rendering of the chat surfaces onto a terminal.
///
/// Only the part of the transcript not yet printed is written. When the
/// transcript no longer extends what was printed, it was cleared: a rule is
/// printed and the transcript is redrawn in full.
pub struct TerminalView<W: Write> {
    out: W,
    printed: String,
    status: Option<ConnectionPhase>,
    at_line_start: bool,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: String::new(),
            status: None,
            at_line_start: true,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn print_session(&mut self, session_id: &SessionId, address: &SessionAddress) -> io::Result<()> {
        self.line(&format!("[session] {session_id} {}", address.resumable()))?;
        self.out.flush()
    }

    pub fn print_notice(&mut self, notice: &str) -> io::Result<()> {
        for line in notice.lines() {
            self.line(line)?;
        }
        self.out.flush()
    }

    /// Prints what changed since the last refresh.
    ///
    /// Consumes the transcript's scroll-to-end request. On a terminal the end
    /// is wherever output stops, so honoring it means flushing: transcript text
    /// written without a pending request stays buffered in `W`.
    pub fn refresh(&mut self, manager: &mut ChannelManager) -> io::Result<()> {
        let scroll_to_end = manager.transcript_mut().take_scroll_request();
        self.refresh_transcript(manager.transcript().text())?;
        let status_changed = self.refresh_status(manager.status().phase())?;
        if scroll_to_end || status_changed {
            self.out.flush()?;
        }
        Ok(())
    }

    fn refresh_transcript(&mut self, text: &str) -> io::Result<()> {
        if let Some(delta) = text.strip_prefix(self.printed.as_str()) {
            self.write_raw(delta)?;
            self.printed.push_str(delta);
            return Ok(());
        }

        self.line(RULE)?;
        self.write_raw(text)?;
        self.printed.clear();
        self.printed.push_str(text);
        Ok(())
    }

    /// Returns whether a status line was printed.
    fn refresh_status(&mut self, phase: Option<ConnectionPhase>) -> io::Result<bool> {
        if phase == self.status {
            return Ok(false);
        }

        self.status = phase;
        match phase {
            Some(phase) => {
                self.line(&format!("[status] {}", phase.label()))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        if !self.at_line_start {
            self.out.write_all(b"\n")?;
        }
        writeln!(self.out, "{text}")?;
        self.at_line_start = true;
        Ok(())
    }

    fn write_raw(&mut self, text: &str) -> io::Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.out.write_all(text.as_bytes())?;
        self.at_line_start = text.ends_with('\n');
        Ok(())
    }
}

/// Mirrors the event log into a file: each raw frame followed by a blank line.
pub struct LogFileWriter<W: Write> {
    out: W,
    next_seq: u64,
}

impl<W: Write> LogFileWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, next_seq: 0 }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Writes entries appended since the previous call. Entries evicted from
    /// the log in between are skipped.
    pub fn write_new(&mut self, log: &EventLog) -> io::Result<()> {
        if log.next_seq() == self.next_seq {
            return Ok(());
        }

        for entry in log.entries_since(self.next_seq) {
            write!(self.out, "{}\n\n", entry.line)?;
        }
        self.next_seq = log.next_seq();
        self.out.flush()
    }
}
