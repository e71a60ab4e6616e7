use std::fs::File;
use std::io::{self, BufRead, Write};
use std::thread;

use chat_api::WebSocketHost;
use session_chat::{ChannelEvent, ChannelManager, SendOutcome, SessionAddress};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::commands::{parse_slash_command, SlashCommand, HELP_TEXT};
use crate::view::{LogFileWriter, TerminalView};

pub const BUSY_NOTICE: &str = "[busy] wait for the current reply before sending";
pub const SEND_FAILED_NOTICE: &str = "[not sent] the channel closed before the message went out";

/// Lines typed on stdin, read on a dedicated thread.
///
/// The thread blocks in `read` and is never joined, so it cannot hold the
/// process open once the event loop returns. End of input closes the queue.
pub fn stdin_lines() -> io::Result<UnboundedReceiver<io::Result<String>>> {
    let (sender, receiver) = mpsc::unbounded_channel();
    thread::Builder::new()
        .name("session-chat-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let failed = line.is_err();
                if sender.send(line).is_err() || failed {
                    break;
                }
            }
        })?;
    Ok(receiver)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Continue,
    Quit,
}

/// Single-threaded event loop joining stdin, channel events and the view.
///
/// All state lives in the [`ChannelManager`]; this loop only routes input to
/// it and redraws after every event.
pub struct ChatRuntime<W: Write> {
    manager: ChannelManager,
    host: WebSocketHost,
    events: UnboundedReceiver<ChannelEvent>,
    address: SessionAddress,
    view: TerminalView<W>,
    log_file: Option<LogFileWriter<File>>,
}

impl<W: Write> ChatRuntime<W> {
    pub fn new(
        manager: ChannelManager,
        (host, events): (WebSocketHost, UnboundedReceiver<ChannelEvent>),
        address: SessionAddress,
        view: TerminalView<W>,
    ) -> Self {
        Self {
            manager,
            host,
            events,
            address,
            view,
            log_file: None,
        }
    }

    pub fn with_log_file(mut self, file: File) -> Self {
        self.log_file = Some(LogFileWriter::new(file));
        self
    }

    pub fn manager(&self) -> &ChannelManager {
        &self.manager
    }

    /// Opens the channel and runs until `/quit`, end of input or Ctrl-C.
    pub async fn run(mut self, mut input: UnboundedReceiver<io::Result<String>>) -> anyhow::Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        self.view
            .print_session(self.manager.session_id(), &self.address)?;
        self.manager.open(&mut self.host)?;
        self.refresh()?;

        loop {
            tokio::select! {
                event = self.events.recv() => {
                    let Some(event) = event else {
                        break;
                    };
                    self.manager.handle_event(event, &mut self.host);
                }
                line = input.recv() => {
                    let Some(line) = line.transpose()? else {
                        tracing::debug!("input closed");
                        break;
                    };
                    if self.handle_line(&line)? == LineOutcome::Quit {
                        break;
                    }
                }
                _ = &mut ctrl_c => {
                    tracing::debug!("interrupted");
                    break;
                }
            }
            self.refresh()?;
        }

        Ok(())
    }

    /// Handles one line of user input: a local slash command, or a message
    /// placed in the input field and submitted with Enter.
    pub fn handle_line(&mut self, line: &str) -> io::Result<LineOutcome> {
        match parse_slash_command(line) {
            Some(SlashCommand::Help) => self.view.print_notice(HELP_TEXT)?,
            Some(SlashCommand::Session) => self
                .view
                .print_session(self.manager.session_id(), &self.address)?,
            Some(SlashCommand::Quit) => return Ok(LineOutcome::Quit),
            Some(SlashCommand::Unknown(command)) => {
                self.view.print_notice(&format!("Unknown command: {command}"))?
            }
            None => {
                self.manager.input_mut().set_text(line);
                match self.manager.press_enter(&mut self.host) {
                    SendOutcome::Sent => {}
                    SendOutcome::NotReady => self.view.print_notice(BUSY_NOTICE)?,
                    SendOutcome::Failed => self.view.print_notice(SEND_FAILED_NOTICE)?,
                }
            }
        }

        self.refresh()?;
        Ok(LineOutcome::Continue)
    }

    fn refresh(&mut self) -> io::Result<()> {
        self.view.refresh(&mut self.manager)?;
        if let Some(log_file) = self.log_file.as_mut() {
            log_file.write_new(self.manager.log())?;
        }
        Ok(())
    }
}
