//! LLM-driven browser agent.
//!
//! Two layers: [`ActionRunner`] executes a scripted list of initial actions
//! (log in, navigate, settle) with no model involved; [`Agent`] then takes
//! a natural-language task and iterates observe → plan → act against an
//! OpenAI-compatible chat endpoint until the model reports it is done.

pub mod actions;
pub mod agent;
pub mod client;
pub mod error;

pub use actions::{ActionRunner, InitialAction};
pub use agent::{Agent, AgentAction, AgentOutcome, StepPlan};
pub use client::{AgentClient, ChatMessage};
pub use error::AgentError;
