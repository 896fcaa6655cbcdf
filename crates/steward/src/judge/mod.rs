//! Optional judge arbitration over candidate actions.
//!
//! A judge is an untrusted oracle (usually a language model) that reads a
//! column's profile facts and candidates and replies with a plan accepting
//! exactly one action. Replies are validated strictly; anything unusable
//! degrades that column to [`JudgeVerdict::NoPlan`].
//!
//! # Providers
//!
//! - **OpenAI** - any OpenAI-compatible chat completions endpoint
//!   (requires `OPENAI_API_KEY`)
//! - **Ollama** - local models, no API key needed
//! - **Mock** - predictable replies for tests and offline runs
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use steward::{JudgeConfig, OllamaJudge, Steward};
//!
//! let judge = OllamaJudge::new(JudgeConfig::default()).unwrap();
//! let steward = Steward::new().with_judge(Arc::new(judge));
//! ```

mod adapter;
mod mock;
mod ollama;
mod openai;
mod plan;
mod prompts;
mod provider;

pub use adapter::JudgeAdapter;
pub use mock::MockJudge;
pub use ollama::OllamaJudge;
pub use openai::OpenAiJudge;
pub use plan::{JudgePlan, JudgeVerdict, parse_batched_reply, parse_reply};
pub use prompts::{request_prompt, system_prompt};
pub use provider::{ColumnBrief, Judge, JudgeConfig, JudgeRequest};
