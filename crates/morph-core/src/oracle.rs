// Word validity oracle: the engine's only suspending dependency.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::word::Word;

/// Infrastructure failure talking to the oracle.
///
/// Never means "the word is invalid"; an invalid word is `Ok(false)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("word oracle unavailable: {0}")]
    Unavailable(String),

    #[error("word oracle timed out after {0:?}")]
    Timeout(Duration),
}

/// Dictionary lookups consumed by the duel engine.
#[async_trait]
pub trait WordOracle: Send + Sync {
    /// Whether `word` is a dictionary entry. Unknown words are `Ok(false)`,
    /// never an error.
    async fn is_valid_word(&self, word: &str) -> Result<bool, OracleError>;

    /// A uniformly random word with at least `min_degree` one-letter
    /// neighbors. `Ok(None)` when the oracle has no words at all.
    async fn random_word(&self, min_degree: usize) -> Result<Option<Word>, OracleError>;
}

/// Run an oracle call under a deadline, folding expiry into
/// [`OracleError::Timeout`].
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, OracleError>
where
    F: std::future::Future<Output = Result<T, OracleError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(OracleError::Timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn slow_call_times_out() {
        let result: Result<bool, OracleError> = with_timeout(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(true)
        })
        .await;
        assert_eq!(result, Err(OracleError::Timeout(Duration::from_millis(50))));
    }

    #[tokio::test]
    async fn fast_call_passes_through() {
        let ok: Result<bool, OracleError> =
            with_timeout(Duration::from_secs(1), async { Ok(false) }).await;
        assert_eq!(ok, Ok(false));

        let err: Result<bool, OracleError> = with_timeout(Duration::from_secs(1), async {
            Err(OracleError::Unavailable("connection refused".into()))
        })
        .await;
        assert!(matches!(err, Err(OracleError::Unavailable(_))));
    }
}
