//! Reply resolution for panel turns.
//!
//! A turn's reply comes from one of two strategies: delegation to an
//! external assistant process, or a simulated reply after an artificial
//! "thinking" delay. The production [`PanelResponder`] composes the two
//! so that a turn always completes with some reply.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::config::DelegateConfig;

/// Canned replies used when delegation yields no result.
pub const CANNED_REPLIES: [&str; 5] = [
    "Xin chào! Tôi là AI assistant. Tôi có thể giúp gì cho bạn?",
    "Tôi hiểu câu hỏi của bạn. Bạn có thể cung cấp thêm thông tin không?",
    "Đây là một câu hỏi thú vị. Tôi sẽ cố gắng hỗ trợ bạn tốt nhất có thể.",
    "Cảm ơn bạn đã chia sẻ. Tôi đang xử lý thông tin này...",
    "Tôi có thể giúp bạn với nhiều chủ đề khác nhau. Hãy cho tôi biết bạn cần hỗ trợ gì!",
];

/// Simulated thinking delay bounds, in milliseconds (half-open range).
const SIMULATED_DELAY_MS: std::ops::Range<u64> = 500..1500;

/// Error from reply resolution.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider could not produce a reply at all.
    #[error("reply resolution failed: {0}")]
    Failed(String),
}

/// Resolves a trimmed, non-empty user input to exactly one reply string.
#[async_trait]
pub trait ResponseProvider: Send + Sync {
    /// Produce a reply for the given input.
    async fn reply(&self, input: &str) -> Result<String, ProviderError>;
}

/// Request sent over the delegation channel, one JSON line on stdin.
#[derive(Debug, Serialize)]
struct DelegateRequest<'a> {
    action: &'static str,
    input: &'a str,
}

/// Response expected back from the delegation channel.
#[derive(Debug, Deserialize)]
struct DelegateResponse {
    success: bool,
    #[serde(default)]
    reply: Option<String>,
}

/// Delegates a turn to an external assistant process.
///
/// One request/response exchange per turn: the request line
/// `{"action": "send-turn", "input": ...}` is written to the child's
/// stdin, and the first non-empty stdout line is parsed as
/// `{"success": bool, "reply"?: string}`. Every failure mode (spawn
/// error, timeout, non-zero exit, unparsable output, `success: false`)
/// yields "no result" rather than an error, so the caller can fall back.
#[derive(Debug, Clone)]
pub struct DelegatedResponder {
    command_argv: Vec<String>,
    timeout: Duration,
}

impl DelegatedResponder {
    /// Create a responder invoking the given command with a bounded wait.
    pub fn new(command_argv: Vec<String>, timeout: Duration) -> Self {
        Self {
            command_argv,
            timeout,
        }
    }

    /// Create a responder from a delegate configuration.
    pub fn from_config(config: &DelegateConfig) -> Self {
        Self::new(
            config.command_argv.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// Send one turn over the channel; `None` means "no result".
    pub async fn request_reply(&self, input: &str) -> Option<String> {
        let Some(program) = self.command_argv.first() else {
            return None;
        };

        let request = DelegateRequest {
            action: "send-turn",
            input,
        };
        let request_line = match serde_json::to_string(&request) {
            Ok(mut line) => {
                line.push('\n');
                line
            }
            Err(e) => {
                debug!(error = %e, "failed to encode delegate request");
                return None;
            }
        };

        let mut cmd = Command::new(program);
        for arg in &self.command_argv[1..] {
            cmd.arg(arg);
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                debug!(command = %program, error = %e, "delegate unavailable");
                return None;
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(request_line.as_bytes()).await {
                debug!(error = %e, "failed to write delegate request");
                return None;
            }
            // Drop stdin to close it and signal EOF.
            drop(stdin);
        }

        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                debug!(error = %e, "delegate I/O error");
                return None;
            }
            Err(_) => {
                // Timed out; the child is killed by kill_on_drop.
                debug!(timeout = ?self.timeout, "delegate timed out");
                return None;
            }
        };

        if !output.status.success() {
            debug!(status = %output.status, "delegate exited with failure");
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout.lines().find(|l| !l.trim().is_empty())?;
        match serde_json::from_str::<DelegateResponse>(line) {
            Ok(DelegateResponse {
                success: true,
                reply: Some(reply),
            }) => Some(reply),
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "unparsable delegate response");
                None
            }
        }
    }
}

/// Produces a canned reply after a randomized thinking delay.
///
/// This is the guaranteed-success path: it never fails, so a turn that
/// reaches it always completes with a reply.
#[derive(Debug, Clone)]
pub struct SimulatedResponder {
    replies: Vec<String>,
}

impl SimulatedResponder {
    /// Create a responder over the fixed canned reply set.
    pub fn new() -> Self {
        Self {
            replies: CANNED_REPLIES.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Create a responder over a custom reply set.
    ///
    /// An empty set falls back to the canned replies.
    pub fn with_replies(replies: Vec<String>) -> Self {
        if replies.is_empty() {
            return Self::new();
        }
        Self { replies }
    }

    async fn think_and_pick(&self) -> String {
        // The rng is not Send; pick the delay before suspending.
        let delay_ms = rand::thread_rng().gen_range(SIMULATED_DELAY_MS);
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;

        self.replies
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for SimulatedResponder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResponseProvider for SimulatedResponder {
    async fn reply(&self, _input: &str) -> Result<String, ProviderError> {
        Ok(self.think_and_pick().await)
    }
}

/// Production reply strategy: delegate first, simulate on "no result".
pub struct PanelResponder {
    delegate: Option<DelegatedResponder>,
    simulated: SimulatedResponder,
}

impl PanelResponder {
    /// Create a responder with an optional delegation channel.
    pub fn new(delegate: Option<DelegatedResponder>) -> Self {
        Self {
            delegate,
            simulated: SimulatedResponder::new(),
        }
    }
}

#[async_trait]
impl ResponseProvider for PanelResponder {
    async fn reply(&self, input: &str) -> Result<String, ProviderError> {
        if let Some(delegate) = &self.delegate {
            if let Some(reply) = delegate.request_reply(input).await {
                return Ok(reply);
            }
            debug!("delegation yielded no result, falling back to simulated reply");
        }
        self.simulated.reply(input).await
    }
}
