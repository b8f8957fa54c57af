// Server-sent events framing for the summary stream
use crate::domain::summary::SummaryEvent;
use bytes::{Buf, Bytes, BytesMut};
use futures::{Stream, StreamExt};
use serde::Deserialize;

/// Incremental decoder: feed raw body chunks, pull `data` payloads of
/// completed events. Carriage returns are dropped so `\r\n` framing decodes
/// the same as `\n`.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: BytesMut,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.reserve(chunk.len());
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));
    }

    /// Next complete event carrying data, if any
    pub fn next_event(&mut self) -> Option<String> {
        loop {
            let end = self.buffer.windows(2).position(|w| w == b"\n\n")?;
            let raw = self.buffer.split_to(end);
            self.buffer.advance(2);

            if let Some(data) = event_data(&raw) {
                return Some(data);
            }
        }
    }

    /// Flush a trailing event the server did not terminate
    pub fn finish(&mut self) -> Option<String> {
        let raw = self.buffer.split();
        event_data(&raw)
    }
}

fn event_data(raw: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(raw);
    let mut data: Option<String> = None;

    for line in text.lines() {
        // Comments start with ':'; other fields (event, id, retry) are unused
        if let Some(value) = line.strip_prefix("data:") {
            let value = value.strip_prefix(' ').unwrap_or(value);
            match data.as_mut() {
                Some(existing) => {
                    existing.push('\n');
                    existing.push_str(value);
                }
                None => data = Some(value.to_string()),
            }
        }
    }

    data
}

/// Adapts a byte stream into a stream of event payloads
pub fn sse_data<S, E>(body: S) -> impl Stream<Item = Result<String, E>>
where
    S: Stream<Item = Result<Bytes, E>>,
{
    async_stream::try_stream! {
        let mut body = Box::pin(body);
        let mut decoder = SseDecoder::new();

        while let Some(chunk) = body.next().await {
            decoder.push(&chunk?);
            while let Some(data) = decoder.next_event() {
                yield data;
            }
        }

        if let Some(data) = decoder.finish() {
            yield data;
        }
    }
}

#[derive(Debug, Deserialize)]
struct SummaryFrame {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

/// `{"text": ..}`, `{"done": true}` or `{"error": ..}`; empty text frames
/// yield nothing
pub fn parse_summary_frame(data: &str) -> Result<Option<SummaryEvent>, serde_json::Error> {
    let frame: SummaryFrame = serde_json::from_str(data)?;

    if let Some(error) = frame.error {
        return Ok(Some(SummaryEvent::Error(error)));
    }
    if frame.done {
        return Ok(Some(SummaryEvent::Done));
    }
    Ok(frame
        .text
        .filter(|t| !t.is_empty())
        .map(SummaryEvent::Chunk))
}
