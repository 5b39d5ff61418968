// ABOUTME: Collects a text stream into a single string, stopping early when
// ABOUTME: the caller cancels and keeping whatever text already arrived.

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use super::TextStream;
use crate::error::LlmError;

/// Text gathered from a stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamedText {
    pub text: String,

    /// True when the stream was cut short by cancellation.
    pub aborted: bool,
}

/// Drain `stream`, calling `on_delta` for each piece of text.
///
/// Cancellation is not an error: the partial text is returned with
/// `aborted` set.
pub async fn collect_stream(
    mut stream: TextStream,
    cancel: &CancellationToken,
    mut on_delta: impl FnMut(&str),
) -> Result<StreamedText, LlmError> {
    let mut text = String::new();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Ok(StreamedText { text, aborted: true });
            }
            next = stream.next() => match next {
                Some(Ok(delta)) => {
                    on_delta(&delta);
                    text.push_str(&delta);
                }
                Some(Err(e)) => return Err(e),
                None => return Ok(StreamedText { text, aborted: false }),
            },
        }
    }
}
