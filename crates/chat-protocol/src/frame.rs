//! Line framing: `COMMAND:JSON\n`.
//!
//! `COMMAND` is an uppercase identifier, `JSON` is a single-line UTF-8 JSON
//! object. The codec only concerns itself with splitting the command from
//! the payload; JSON parsing of the payload is the caller's job.

use std::fmt;

/// A single decoded frame: command name plus raw (still-JSON-text) payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: String,
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameError;

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing ':' separator between command and payload")
    }
}

impl std::error::Error for FrameError {}

/// Encodes a command and a JSON payload into a wire-ready line.
///
/// `payload` must already be single-line JSON (produced by `serde_json::to_string`,
/// never `to_string_pretty`).
pub fn encode(command: &str, payload: &str) -> String {
    let mut line = String::with_capacity(command.len() + payload.len() + 2);
    line.push_str(command);
    line.push(':');
    line.push_str(payload);
    line.push('\n');
    line
}

/// Decodes a single already-trimmed line (no trailing `\n`) into a [`Frame`].
///
/// Trailing `\r` is trimmed before splitting. Returns `None` for a blank
/// line (callers should skip it, not treat it as an error). Returns
/// `Err(FrameError)` when no `:` separator is present.
pub fn decode_line(line: &str) -> Result<Option<Frame>, FrameError> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.is_empty() {
        return Ok(None);
    }
    match line.split_once(':') {
        Some((command, payload)) if !command.is_empty() => Ok(Some(Frame {
            command: command.to_owned(),
            payload: payload.to_owned(),
        })),
        _ => Err(FrameError),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_command_and_payload_with_trailing_newline() {
        assert_eq!(encode("PONG", "{}"), "PONG:{}\n");
    }

    #[test]
    fn decodes_basic_frame() {
        let frame = decode_line("LOGIN:{\"account\":\"a\"}").unwrap().unwrap();
        assert_eq!(frame.command, "LOGIN");
        assert_eq!(frame.payload, "{\"account\":\"a\"}");
    }

    #[test]
    fn trims_trailing_carriage_return() {
        let frame = decode_line("PING:{}\r").unwrap().unwrap();
        assert_eq!(frame.payload, "{}");
    }

    #[test]
    fn blank_line_is_skipped_not_errored() {
        assert_eq!(decode_line(""), Ok(None));
    }

    #[test]
    fn missing_colon_is_a_protocol_error() {
        assert_eq!(decode_line("GARBAGE"), Err(FrameError));
    }

    #[test]
    fn payload_may_itself_contain_colons() {
        let frame = decode_line("SEND_MSG:{\"content\":\"a:b\"}").unwrap().unwrap();
        assert_eq!(frame.payload, "{\"content\":\"a:b\"}");
    }

    #[test]
    fn empty_command_before_colon_is_a_protocol_error() {
        assert_eq!(decode_line(":{}"), Err(FrameError));
    }
}
