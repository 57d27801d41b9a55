use async_trait::async_trait;

use crate::core::config::SessionConfig;
use crate::core::errors::GenerationError;
use crate::core::message::Turn;

mod http;

pub use http::HttpGenerator;

/// Pluggable reply producer.
///
/// `turns` is a read-only snapshot of the transcript; implementations return
/// a value and never touch session state. Transport failures and timeouts
/// surface as [`GenerationError`], never as panics.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(
        &self,
        turns: &[Turn],
        config: &SessionConfig,
    ) -> Result<String, GenerationError>;
}
