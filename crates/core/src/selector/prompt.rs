//! Source of the operator's free-text track selection.

use async_trait::async_trait;

use crate::tracks::Track;

/// Asks the operator which audio tracks to process.
#[async_trait]
pub trait SelectionPrompt: Send + Sync {
    /// Presents the audio tracks and returns the raw answer.
    ///
    /// `default_ids` is what a blank answer resolves to.
    async fn ask(&self, audio_tracks: &[Track], default_ids: &[u32]) -> std::io::Result<String>;
}

/// Prompt that always answers with the same text.
#[derive(Debug, Clone, Default)]
pub struct FixedAnswer(pub String);

impl FixedAnswer {
    pub fn new(answer: impl Into<String>) -> Self {
        Self(answer.into())
    }
}

#[async_trait]
impl SelectionPrompt for FixedAnswer {
    async fn ask(&self, _audio_tracks: &[Track], _default_ids: &[u32]) -> std::io::Result<String> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_answer() {
        let prompt = FixedAnswer::new("1, 3");
        assert_eq!(prompt.ask(&[], &[1]).await.unwrap(), "1, 3");
        assert_eq!(FixedAnswer::default().ask(&[], &[]).await.unwrap(), "");
    }
}
