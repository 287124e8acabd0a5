//! Configuration for the takeoff automation.
//!
//! TOML files with `${VAR}` environment expansion; secrets stay in the
//! environment (or a `.env` file loaded by the binary) and never in the
//! config file itself.

pub mod error;
pub mod loader;
pub mod schema;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{
    AspireConfig, BrowserConfig, Config, EstimationFlowConfig, FlowConfig, LlmConfig,
    LoginConfig, NavigationClick, PropertyFlowConfig, SlackConfig,
};
