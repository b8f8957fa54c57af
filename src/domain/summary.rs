// AI summary stream - incremental text chunks terminated by done or error
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

#[derive(Debug, Clone, PartialEq)]
pub enum SummaryEvent {
    Chunk(String),
    Done,
    Error(String),
}

/// Consumer side of a summary producer. Dropping it closes the channel, which
/// stops the producer on its next send.
pub struct SummaryStream {
    inner: ReceiverStream<SummaryEvent>,
}

impl SummaryStream {
    pub fn channel(buffer: usize) -> (mpsc::Sender<SummaryEvent>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (
            tx,
            Self {
                inner: ReceiverStream::new(rx),
            },
        )
    }
}

impl Stream for SummaryStream {
    type Item = SummaryEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryStatus {
    Streaming,
    Done,
    Failed(String),
}

/// Appends chunks as they arrive; ignores anything after a terminal event.
#[derive(Debug, Clone)]
pub struct SummaryAccumulator {
    text: String,
    status: SummaryStatus,
}

impl Default for SummaryAccumulator {
    fn default() -> Self {
        Self {
            text: String::new(),
            status: SummaryStatus::Streaming,
        }
    }
}

impl SummaryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false once the stream has terminated
    pub fn apply(&mut self, event: SummaryEvent) -> bool {
        if self.status != SummaryStatus::Streaming {
            return false;
        }

        match event {
            SummaryEvent::Chunk(chunk) => self.text.push_str(&chunk),
            SummaryEvent::Done => self.status = SummaryStatus::Done,
            SummaryEvent::Error(msg) => self.status = SummaryStatus::Failed(msg),
        }
        self.status == SummaryStatus::Streaming
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn status(&self) -> &SummaryStatus {
        &self.status
    }
}
