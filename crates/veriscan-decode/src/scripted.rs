use std::collections::VecDeque;

use async_trait::async_trait;
use veriscan_foundation::{DecodeError, FrameBuffer};

use crate::decoder::BarcodeDecoder;

/// What a [`ScriptedDecoder`] does on one `decode` call.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Frame contains no readable code.
    Miss,
    /// A code was read.
    Hit(String),
    /// A retryable failure, e.g. a frame-geometry race.
    Transient(String),
    /// A non-retryable failure.
    Fatal(String),
    /// Never resolves; exercises the caller's decode timeout.
    Hang,
}

/// Deterministic decoder for tests and demos. Plays back a scripted sequence
/// of outcomes, one per frame, and reports misses once the script runs out.
pub struct ScriptedDecoder {
    script: VecDeque<ScriptedOutcome>,
    repeat_last: bool,
    calls: u64,
}

impl ScriptedDecoder {
    pub fn new(script: impl IntoIterator<Item = ScriptedOutcome>) -> Self {
        Self {
            script: script.into_iter().collect(),
            repeat_last: false,
            calls: 0,
        }
    }

    /// Misses `misses` frames, then reads `code` on every following frame.
    pub fn hit_after(misses: usize, code: &str) -> Self {
        let mut script: Vec<ScriptedOutcome> =
            std::iter::repeat(ScriptedOutcome::Miss).take(misses).collect();
        script.push(ScriptedOutcome::Hit(code.to_string()));
        let mut decoder = Self::new(script);
        decoder.repeat_last = true;
        decoder
    }

    pub fn calls(&self) -> u64 {
        self.calls
    }
}

impl ScriptedDecoder {
    fn next_outcome(&mut self) -> ScriptedOutcome {
        if self.repeat_last && self.script.len() == 1 {
            return self.script[0].clone();
        }
        self.script.pop_front().unwrap_or(ScriptedOutcome::Miss)
    }
}

#[async_trait]
impl BarcodeDecoder for ScriptedDecoder {
    async fn decode(&mut self, _frame: &FrameBuffer) -> Result<Option<String>, DecodeError> {
        self.calls += 1;
        match self.next_outcome() {
            ScriptedOutcome::Miss => Ok(None),
            ScriptedOutcome::Hit(code) => Ok(Some(code)),
            ScriptedOutcome::Transient(msg) => Err(DecodeError::Transient(msg)),
            ScriptedOutcome::Fatal(msg) => Err(DecodeError::Fatal(msg)),
            ScriptedOutcome::Hang => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veriscan_foundation::FrameBuffer;

    fn frame() -> FrameBuffer {
        let mut f = FrameBuffer::new();
        f.resize_to(4, 4);
        f
    }

    #[tokio::test]
    async fn plays_script_in_order() {
        let mut decoder = ScriptedDecoder::new([
            ScriptedOutcome::Miss,
            ScriptedOutcome::Hit("QR-123".into()),
            ScriptedOutcome::Fatal("corrupt frame".into()),
        ]);
        let f = frame();

        assert_eq!(decoder.decode(&f).await.unwrap(), None);
        assert_eq!(decoder.decode(&f).await.unwrap(), Some("QR-123".into()));
        assert!(matches!(
            decoder.decode(&f).await,
            Err(DecodeError::Fatal(_))
        ));
        // Exhausted script keeps missing.
        assert_eq!(decoder.decode(&f).await.unwrap(), None);
        assert_eq!(decoder.calls(), 4);
    }

    #[tokio::test]
    async fn hit_after_keeps_hitting() {
        let mut decoder = ScriptedDecoder::hit_after(2, "QR-9");
        let f = frame();
        assert_eq!(decoder.decode(&f).await.unwrap(), None);
        assert_eq!(decoder.decode(&f).await.unwrap(), None);
        assert_eq!(decoder.decode(&f).await.unwrap(), Some("QR-9".into()));
        assert_eq!(decoder.decode(&f).await.unwrap(), Some("QR-9".into()));
    }
}
