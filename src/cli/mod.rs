//! Command-dispatch engine: descriptors, tree registration, recursive token
//! consumption, contextual frames, and help rendering.

pub mod context;
pub mod method;
pub mod params;
pub mod schema;
pub mod tree;

mod dispatch;
mod help;
#[cfg(test)]
mod tests;

use std::error::Error as StdError;
use std::fmt;
use std::process::ExitCode;

use serde::Serialize;

/// Failure detected while consuming one token stream against the tree.
///
/// Never escapes the dispatcher: every variant is converted to its message and
/// folded into the help output of the returned [`RunResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// A positional was still unfilled but an option-shaped token arrived.
    UnexpectedOption { parameter: String, token: String },
    /// The option was already bound; `first` is the first-bound value.
    DuplicateOption { option: String, first: String },
    /// The option name is not declared on the current node.
    UnknownOption {
        option: String,
        expected: Vec<String>,
    },
    /// A non-toggle option had neither an inline nor a following value.
    MissingOptionValue { option: String },
    /// The token is neither a positional, an option, nor a child name.
    UnknownToken { token: String },
    /// The token stream ended with required positionals unfilled.
    MissingRequiredArguments { parameters: Vec<String> },
    /// The token stream ended at a node with children but none was selected.
    AmbiguousAction { expected: Vec<String> },
    /// Pass-through message from type construction or schema validation.
    ValueCoercion { message: String },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::UnexpectedOption { parameter, token } => {
                write!(f, "argument {parameter} is required but received option {token}")
            }
            DispatchError::DuplicateOption { option, first } => {
                write!(f, "--{option} is already set to {first}")
            }
            DispatchError::UnknownOption { option, expected } => {
                if expected.is_empty() {
                    write!(f, "--{option} is not a valid option")
                } else {
                    write!(
                        f,
                        "--{option} is not a valid option, expected one of {}",
                        expected.join(", ")
                    )
                }
            }
            DispatchError::MissingOptionValue { option } => {
                write!(f, "value is not provided for --{option}")
            }
            DispatchError::UnknownToken { token } => {
                write!(f, "argument '{token}' is not valid")
            }
            DispatchError::MissingRequiredArguments { parameters } => {
                write!(
                    f,
                    "required arguments are missing: {}",
                    parameters.join(", ")
                )
            }
            DispatchError::AmbiguousAction { expected } => {
                write!(
                    f,
                    "an action must be specified, expected one of {}",
                    expected.join(", ")
                )
            }
            DispatchError::ValueCoercion { message } => f.write_str(message),
        }
    }
}

impl StdError for DispatchError {}

/// Violation of a registration-time invariant while building the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    DuplicateAction { name: String },
    DuplicateParameter { method: String, parameter: String },
    UnknownHelpOption { name: String },
    NonToggleHelpOption { name: String },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateAction { name } => {
                write!(f, "action '{name}' is already registered")
            }
            RegistryError::DuplicateParameter { method, parameter } => {
                write!(f, "parameter '{parameter}' is declared twice for {method}")
            }
            RegistryError::UnknownHelpOption { name } => {
                write!(f, "help option '{name}' is not declared")
            }
            RegistryError::NonToggleHelpOption { name } => {
                write!(
                    f,
                    "help option '{name}' must be a boolean toggle defaulting to false"
                )
            }
        }
    }
}

impl StdError for RegistryError {}

/// Uniform outcome envelope returned by every dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// True iff a terminal node was reached, every required positional was
    /// bound, its handler succeeded, and no help was requested.
    pub success: bool,
    /// Every line produced by the run, in emission order: handler output, or
    /// the error/usage/help block on failure.
    pub messages: Vec<String>,
}

impl RunResult {
    /// Map the outcome to a process exit status: success is zero, anything
    /// else is nonzero.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}
