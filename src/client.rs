//! HTTP client for the answering backend: opens the `/api/ask` event stream
//! and delivers parsed events over an mpsc channel.

use futures::StreamExt;
use tokio::sync::mpsc;

/// Events delivered while a question is being answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskEvent {
    /// One fragment of answer text.
    Fragment(String),
    /// The named `end` event: normal completion.
    End,
    /// The stream ended abnormally.
    Failed(StreamFailure),
}

/// Why a stream ended abnormally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFailure {
    /// Connection refused, non-2xx status, mid-stream drop, or EOF before
    /// the `end` event.
    Connect,
    /// A received payload could not be decoded.
    Decode,
}

/// Client for the streaming ask endpoint.
pub struct AskClient {
    http: reqwest::Client,
    api_base: String,
}

impl AskClient {
    /// No request timeout is set: the answer streams for as long as the
    /// backend keeps talking, and a stalled connection stays pending until
    /// the transport errors.
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Open the stream for `question`. Events arrive on the returned channel;
    /// the last one is always `End` or `Failed`. Dropping the receiver closes
    /// the connection.
    pub fn ask(&self, question: &str) -> mpsc::Receiver<AskEvent> {
        let (tx, rx) = mpsc::channel(256);
        let request = self
            .http
            .get(format!("{}/api/ask", self.api_base))
            .query(&[("question", question)]);

        tokio::spawn(async move {
            if let Err(failure) = run_stream(request, &tx).await {
                let _ = tx.send(AskEvent::Failed(failure)).await;
            }
        });

        rx
    }
}

/// Consume the response body, emitting a `Fragment` for every default event
/// and `End` for the named `end` event.
async fn run_stream(
    request: reqwest::RequestBuilder,
    tx: &mpsc::Sender<AskEvent>,
) -> Result<(), StreamFailure> {
    let response = request
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|_| StreamFailure::Connect)?;

    let mut stream = response.bytes_stream();
    let mut parser = SseParser::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|_| StreamFailure::Connect)?;
        let frames = parser.push(&chunk).map_err(|_| StreamFailure::Decode)?;
        for frame in frames {
            match frame.event.as_deref() {
                Some("end") => {
                    let _ = tx.send(AskEvent::End).await;
                    return Ok(());
                }
                None | Some("message") => {
                    if tx.send(AskEvent::Fragment(frame.data)).await.is_err() {
                        // Receiver gone: the request was abandoned.
                        return Ok(());
                    }
                }
                // Unknown named events carry nothing we display.
                Some(_) => {}
            }
        }
    }

    // EOF without an end event is a transport failure, not completion.
    Err(StreamFailure::Connect)
}

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Event name from an `event:` field; `None` for default events.
    pub event: Option<String>,
    /// Payload: `data:` lines joined with newlines.
    pub data: String,
}

/// Incremental `text/event-stream` parser. Feed it raw body chunks in any
/// split; it buffers partial lines and partial UTF-8 sequences across pushes
/// and dispatches an event per blank line.
pub struct SseParser {
    tail: Vec<u8>,
    line_buf: String,
    event_name: Option<String>,
    data_lines: Vec<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self {
            tail: Vec::new(),
            line_buf: String::new(),
            event_name: None,
            data_lines: Vec::new(),
        }
    }

    /// Feed one body chunk, returning any events it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<SseFrame>, std::str::Utf8Error> {
        self.tail.extend_from_slice(chunk);
        let text = match std::str::from_utf8(&self.tail) {
            Ok(text) => {
                let text = text.to_string();
                self.tail.clear();
                text
            }
            // An incomplete multi-byte sequence at the end of the chunk is
            // held back until the next push; anything else is a real error.
            Err(e) if e.error_len().is_none() => {
                let valid = e.valid_up_to();
                let text = String::from_utf8_lossy(&self.tail[..valid]).into_owned();
                self.tail.drain(..valid);
                text
            }
            Err(e) => return Err(e),
        };
        self.line_buf.push_str(&text);

        let mut frames = Vec::new();
        while let Some(newline_pos) = self.line_buf.find('\n') {
            let mut line: String = self.line_buf.drain(..=newline_pos).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            if let Some(frame) = self.take_line(&line) {
                frames.push(frame);
            }
        }
        Ok(frames)
    }

    fn take_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            if self.event_name.is_none() && self.data_lines.is_empty() {
                return None;
            }
            let frame = SseFrame {
                event: self.event_name.take(),
                data: self.data_lines.join("\n"),
            };
            self.data_lines.clear();
            return Some(frame);
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "data" => self.data_lines.push(value.to_string()),
            "event" => self.event_name = Some(value.to_string()),
            // id/retry are not part of this protocol
            _ => {}
        }
        None
    }
}

impl Default for SseParser {
    fn default() -> Self {
        Self::new()
    }
}
