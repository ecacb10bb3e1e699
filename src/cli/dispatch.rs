//! Recursive-descent token consumption over the command tree.
//!
//! Each invocation walks exactly one path from the root to one terminal
//! node. Binding happens before descent so a parent's constructed value is
//! visible to descendants through the context chain before they run.

use std::time::Instant;

use super::context::RunContext;
use super::help;
use super::params::{Bindings, Value};
use super::tree::ActionTree;
use super::{DispatchError, RunResult};

const OPTION_PREFIX: &str = "--";

/// Where one walk ended: the deepest node reached, the path of child names
/// leading to it, the values bound at that node, and the failure, if any.
struct Walk<'t> {
    node: &'t ActionTree,
    path: Vec<String>,
    bindings: Bindings,
    error: Option<DispatchError>,
}

impl ActionTree {
    /// Dispatch a full argument vector, streaming every message to stdout as
    /// it is produced. `argv[0]` is the invoking program's name, used only
    /// for the usage header.
    pub fn run_args<I, S>(&self, argv: I) -> RunResult
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(argv.into_iter().map(Into::into).collect(), true)
    }

    /// Dispatch without streaming; messages are only buffered in the result.
    pub fn run_captured<I, S>(&self, argv: I) -> RunResult
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(argv.into_iter().map(Into::into).collect(), false)
    }

    fn run(&self, argv: Vec<String>, echo: bool) -> RunResult {
        let start = Instant::now();
        let (program, tokens) = match argv.split_first() {
            Some((first, rest)) => (first.as_str(), rest),
            None => ("", &[][..]),
        };
        tracing::info!(
            target: "dispatch",
            stage = "run.start",
            program,
            token_count = tokens.len()
        );

        let mut ctx = RunContext::new(echo);
        let mut outcome = self.walk(tokens, &mut ctx, Vec::new());

        let mut success = false;
        if outcome.error.is_none() && !ctx.help_requested() {
            match outcome.node.method().invoke(&mut ctx, &outcome.bindings) {
                Ok(value) => {
                    let name = outcome.path.last().map_or("", String::as_str);
                    ctx.push_frame(name, value);
                    success = true;
                }
                Err(err) => {
                    outcome.error = Some(DispatchError::ValueCoercion {
                        message: err.to_string(),
                    });
                }
            }
        }

        if !success {
            if let Some(err) = &outcome.error {
                ctx.print(format!("Error: {err}"));
            }
            ctx.print("Usage:");
            let header = format!("  {program} {}", outcome.path.join(" "));
            ctx.print(header.trim_end().to_string());
            let mut lines = Vec::new();
            help::render(outcome.node, 2, &mut lines);
            for line in lines {
                ctx.print(line);
            }
        }

        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let path = outcome.path.join("/");
        if success {
            tracing::info!(
                target: "dispatch",
                stage = "run.complete",
                program,
                path = %path,
                status = "ok",
                elapsed_ms
            );
        } else {
            let error = outcome
                .error
                .as_ref()
                .map_or_else(String::new, ToString::to_string);
            tracing::warn!(
                target: "dispatch",
                stage = "run.complete",
                program,
                path = %path,
                status = "error",
                error = %error,
                elapsed_ms
            );
        }

        RunResult {
            success,
            messages: ctx.into_messages(),
        }
    }

    /// Consume tokens against this node, left to right, no backtracking.
    fn walk<'t>(
        &'t self,
        tokens: &[String],
        ctx: &mut RunContext,
        path: Vec<String>,
    ) -> Walk<'t> {
        let (positionals, options) = self.method().split_args_opts();
        let mut bindings = Bindings::new();
        let mut next_required = 0;
        let mut index = 0;

        while index < tokens.len() {
            let token = &tokens[index];

            if next_required < positionals.len() {
                let param = positionals[next_required];
                if token.starts_with(OPTION_PREFIX) {
                    return Walk {
                        node: self,
                        path,
                        bindings,
                        error: Some(DispatchError::UnexpectedOption {
                            parameter: param.name().to_string(),
                            token: token.clone(),
                        }),
                    };
                }
                match param.coerce(token) {
                    Ok(value) => bindings.bind(param.name(), value),
                    Err(err) => {
                        return Walk {
                            node: self,
                            path,
                            bindings,
                            error: Some(err),
                        };
                    }
                }
                next_required += 1;
                index += 1;
                continue;
            }

            if let Some(body) = token.strip_prefix(OPTION_PREFIX) {
                let (key, inline) = match body.split_once('=') {
                    Some((key, value)) => (key, Some(value)),
                    None => (body, None),
                };
                if let Some(first) = bindings.get(key).map(ToString::to_string) {
                    return Walk {
                        node: self,
                        path,
                        bindings,
                        error: Some(DispatchError::DuplicateOption {
                            option: key.to_string(),
                            first,
                        }),
                    };
                }
                let Some(param) = options.iter().find(|option| option.name() == key) else {
                    return Walk {
                        node: self,
                        path,
                        bindings,
                        error: Some(DispatchError::UnknownOption {
                            option: key.to_string(),
                            expected: options
                                .iter()
                                .map(|option| option.name().to_string())
                                .collect(),
                        }),
                    };
                };
                let coerced = if let Some(raw) = inline {
                    param.coerce(raw)
                } else if param.is_toggle() {
                    Ok(Value::Bool(true))
                } else {
                    index += 1;
                    match tokens.get(index) {
                        Some(raw) => param.coerce(raw),
                        None => Err(DispatchError::MissingOptionValue {
                            option: key.to_string(),
                        }),
                    }
                };
                let value = match coerced {
                    Ok(value) => value,
                    Err(err) => {
                        return Walk {
                            node: self,
                            path,
                            bindings,
                            error: Some(err),
                        };
                    }
                };
                if path.is_empty()
                    && self.help_option() == Some(key)
                    && value == Value::Bool(true)
                {
                    ctx.request_help();
                }
                bindings.bind(key, value);
                index += 1;
                continue;
            }

            if let Some(child) = self.child(token) {
                // Bind before descending: the parent's value must be readable
                // by descendants through the context.
                match self.method().invoke(ctx, &bindings) {
                    Ok(value) => {
                        let name = path.last().map_or("", String::as_str);
                        ctx.push_frame(name, value);
                    }
                    Err(err) => {
                        return Walk {
                            node: self,
                            path,
                            bindings,
                            error: Some(DispatchError::ValueCoercion {
                                message: err.to_string(),
                            }),
                        };
                    }
                }
                let mut child_path = path;
                child_path.push(token.clone());
                return child.walk(&tokens[index + 1..], ctx, child_path);
            }

            return Walk {
                node: self,
                path,
                bindings,
                error: Some(DispatchError::UnknownToken {
                    token: token.clone(),
                }),
            };
        }

        if next_required < positionals.len() {
            let parameters = positionals[next_required..]
                .iter()
                .map(|param| format!("<{}>", param.name()))
                .collect();
            return Walk {
                node: self,
                path,
                bindings,
                error: Some(DispatchError::MissingRequiredArguments { parameters }),
            };
        }
        if self.has_children() {
            return Walk {
                node: self,
                path,
                bindings,
                error: Some(DispatchError::AmbiguousAction {
                    expected: self.child_names(),
                }),
            };
        }
        Walk {
            node: self,
            path,
            bindings,
            error: None,
        }
    }
}
