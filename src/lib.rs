#![deny(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::perf, clippy::suspicious)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

//! Core library for the `actiontree` nested-subcommand dispatcher.
//!
//! A command tree is declared once from [`Method`] descriptors, then every
//! invocation walks one root-to-leaf path, binding positional arguments and
//! options along the way and recording each node's produced value in a
//! [`RunContext`] so deeper handlers can read what their ancestors computed.
//! Dispatch never fails with an error value: every outcome, including parse
//! failures rendered as help text, is reported through a [`RunResult`].

pub mod cli;
pub mod error;
pub mod logging;

pub use cli::context::{Frame, RunContext};
pub use cli::method::Method;
pub use cli::params::{Bindings, ParamSpec, Record, TypeTag, Value};
pub use cli::schema::Schema;
pub use cli::tree::ActionTree;
pub use cli::{DispatchError, RegistryError, RunResult};
pub use error::{Error, Result};
