use super::Verbosity;
use crate::channel::ChannelSnapshot;
use std::fmt::Write;

/// Everything captured about one send
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceRecord {
    /// Identity of the message type
    pub message_identity: &'static str,
    /// Rendered message: plain text when pretty, full dump when verbose
    pub message: String,
    /// The channel as it was when the send started
    pub channel: ChannelSnapshot,
    /// Source file of the send call
    pub file: &'static str,
    /// Source line of the send call
    pub line: u32,
}

impl TraceRecord {
    /// Formats the record
    pub fn render(&self, verbosity: Verbosity) -> String {
        match verbosity {
            Verbosity::Pretty => self.render_pretty(),
            Verbosity::Verbose => self.render_verbose(),
        }
    }

    fn render_pretty(&self) -> String {
        let snapshot = &self.channel;
        let mut out = format!(
            "[messagechannel] {} {} -> channel {}",
            self.message_identity, self.message, snapshot.id
        );
        if let Some(label) = &snapshot.label {
            let _ = write!(out, " {:?}", label);
        }
        let _ = write!(
            out,
            " ({}, {} entries) at {}:{}",
            snapshot.mode,
            snapshot.entries.len(),
            self.file,
            self.line
        );
        out
    }

    fn render_verbose(&self) -> String {
        format!(
            "[messagechannel]\n{}\n[message] {}\n{}\n[file]\n    {}\n[line] {}\n",
            indent(&self.channel.to_string()),
            self.message_identity,
            indent(&self.message),
            self.file,
            self.line
        )
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("    {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}
