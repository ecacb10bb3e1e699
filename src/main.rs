#![deny(unsafe_code)]
#![deny(clippy::all, clippy::pedantic)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use actiontree::error::Result;
use actiontree::logging::{LogOptions, init_logging};
use actiontree::{ActionTree, Method, ParamSpec, Schema, TypeTag, Value};

fn main() -> ExitCode {
    init_logging(&LogOptions::from_env());
    let argv = std::env::args()
        .enumerate()
        .map(|(index, arg)| if index == 0 { program_name(&arg) } else { arg });
    run_with_args(argv)
}

/// The usage header shows the bare program name, not the full invocation path.
fn program_name(raw: &str) -> String {
    Path::new(raw)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map_or_else(|| raw.to_string(), ToString::to_string)
}

fn run_with_args<I, S>(args: I) -> ExitCode
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    match build_tree() {
        Ok(tree) => tree.run_args(args).exit_code(),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Register the server-management command tree: a root help toggle, a
/// `server` node carrying the data directory shared with its actions, and
/// the configuration subcommands below it.
fn build_tree() -> Result<ActionTree> {
    let main_schema = Schema::new("Main", "").with_field(ParamSpec::toggle("help", "Show help"));
    let mut root = ActionTree::new(Method::from_schema(main_schema)?);
    root.designate_help("help")?;

    let server_schema = Schema::new("Server", "Managing the server").with_field(
        ParamSpec::optional(
            "data",
            TypeTag::Path,
            Value::Path(PathBuf::from("./data")),
            "directory to store all server data",
        ),
    );
    let server = root.add(Method::from_schema(server_schema)?)?;

    server.add(Method::from_fn(
        "start",
        "Starts the server in the foreground",
        Vec::new(),
        |ctx, _args| {
            let data = ctx
                .get("/server")
                .and_then(|value| value.field("data"))
                .cloned();
            let data = data.map_or_else(String::new, |value| value.to_string());
            ctx.print(format!("Starting server with data directory: {data}"));
            Ok(Value::Unit)
        },
    )?)?;

    server.add(Method::from_fn(
        "stop",
        "Stops the server",
        Vec::new(),
        |ctx, _args| {
            ctx.print("stopping server");
            Ok(Value::Unit)
        },
    )?)?;

    let config = server.add(Method::from_fn(
        "config",
        "Manage the server configuration",
        Vec::new(),
        |_ctx, _args| Ok(Value::Unit),
    )?)?;

    let config_schema = Schema::new("Config", "").with_field(ParamSpec::required(
        "name",
        TypeTag::Str,
        "The name of the server",
    ));
    config.add(Method::from_fn(
        "set",
        "Set the server configuration",
        vec![ParamSpec::required(
            "config",
            TypeTag::schema(config_schema),
            "",
        )],
        |ctx, args| {
            if let Some(value) = args.get("config") {
                let rendered = value.to_string();
                ctx.print(rendered);
            }
            Ok(Value::Unit)
        },
    )?)?;

    config.add(Method::from_fn(
        "get",
        "Get the server configuration",
        Vec::new(),
        |ctx, _args| {
            ctx.print("config get");
            Ok(Value::Unit)
        },
    )?)?;

    Ok(root)
}
