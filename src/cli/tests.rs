use std::path::PathBuf;
use std::process::ExitCode;

use once_cell::sync::Lazy;

use super::help;
use super::super::{ActionTree, Method, ParamSpec, Schema, TypeTag, Value};

/// The server-management tree exercised end to end: a root help toggle, a
/// `server` node with a defaulted path option, and the `start`/`stop`/
/// `config set|get` actions below it.
static TREE: Lazy<ActionTree> = Lazy::new(demo_tree);

fn demo_tree() -> ActionTree {
    let main_schema = Schema::new("Main", "").with_field(ParamSpec::toggle("help", "Show help"));
    let mut root = ActionTree::new(Method::from_schema(main_schema).expect("main schema"));
    root.designate_help("help").expect("designate help");

    let server_schema = Schema::new("Server", "Managing the server").with_field(
        ParamSpec::optional(
            "data",
            TypeTag::Path,
            Value::Path(PathBuf::from("./data")),
            "directory to store all server data",
        ),
    );
    let server = root
        .add(Method::from_schema(server_schema).expect("server schema"))
        .expect("register server");

    server
        .add(
            Method::from_fn(
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
            )
            .expect("start method"),
        )
        .expect("register start");

    server
        .add(
            Method::from_fn("stop", "Stops the server", Vec::new(), |ctx, _args| {
                ctx.print("stopping server");
                Ok(Value::Unit)
            })
            .expect("stop method"),
        )
        .expect("register stop");

    let config = server
        .add(
            Method::from_fn(
                "config",
                "Manage the server configuration",
                Vec::new(),
                |_ctx, _args| Ok(Value::Unit),
            )
            .expect("config method"),
        )
        .expect("register config");

    let config_schema = Schema::new("Config", "").with_field(ParamSpec::required(
        "name",
        TypeTag::Str,
        "The name of the server",
    ));
    config
        .add(
            Method::from_fn(
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
            )
            .expect("set method"),
        )
        .expect("register set");

    config
        .add(
            Method::from_fn(
                "get",
                "Get the server configuration",
                Vec::new(),
                |ctx, _args| {
                    ctx.print("config get");
                    Ok(Value::Unit)
                },
            )
            .expect("get method"),
        )
        .expect("register get");

    root
}

/// Run one whitespace-separated command line against the shared tree and
/// compare the outcome, ignoring indentation.
fn run(cmd: &str, expect_success: bool, expected: &[&str]) {
    let result = TREE.run_captured(cmd.split_whitespace());
    assert_eq!(
        result.success, expect_success,
        "success flag for `{cmd}`, messages: {:?}",
        result.messages
    );
    let actual: Vec<&str> = result.messages.iter().map(|line| line.trim()).collect();
    let trimmed: Vec<&str> = expected.iter().map(|line| line.trim()).collect();
    assert_eq!(actual, trimmed, "messages for `{cmd}`");
}

const FULL_HELP: [&str; 14] = [
    "Usage:",
    "  wgl",
    "    [--help] - bool: Show help. Default: false",
    "    Actions:",
    "      server - Managing the server",
    "          [--data=value] - Path: directory to store all server data. Default: Path(\"./data\")",
    "          Actions:",
    "            start - Starts the server in the foreground",
    "            stop - Stops the server",
    "            config - Manage the server configuration",
    "                Actions:",
    "                  set - Set the server configuration",
    "                      <config> - Config: ",
    "                  get - Get the server configuration",
];

fn with_header(
    error: &'static str,
    usage: &'static str,
    body: &[&'static str],
) -> Vec<&'static str> {
    let mut lines = vec![error, "Usage:", usage];
    lines.extend_from_slice(body);
    lines
}

#[test]
fn invalid_tokens_render_the_error_and_full_help() {
    run(
        "wgl -help",
        false,
        &with_header("Error: argument '-help' is not valid", "  wgl", &FULL_HELP[2..]),
    );
}

#[test]
fn bare_help_flag_reports_the_unselected_action_and_renders_help() {
    let expected = with_header(
        "Error: an action must be specified, expected one of server",
        "  wgl",
        &FULL_HELP[2..],
    );
    run("wgl --help", false, &expected);
    run("wgl --help=y", false, &expected);
}

#[test]
fn duplicate_help_binding_names_the_first_bound_value() {
    run(
        "wgl --help=y --help",
        false,
        &with_header("Error: --help is already set to true", "  wgl", &FULL_HELP[2..]),
    );
}

#[test]
fn intermediate_nodes_cannot_terminate_a_run() {
    run(
        "wgl server",
        false,
        &with_header(
            "Error: an action must be specified, expected one of start, stop, config",
            "  wgl server",
            &FULL_HELP[5..],
        ),
    );
    run(
        "wgl server config",
        false,
        &with_header(
            "Error: an action must be specified, expected one of set, get",
            "  wgl server config",
            &FULL_HELP[10..],
        ),
    );
}

#[test]
fn server_actions_execute_with_the_parent_options_in_context() {
    run(
        "wgl server start",
        true,
        &["Starting server with data directory: ./data"],
    );
    run(
        "wgl server --data=/srv/blobs start",
        true,
        &["Starting server with data directory: /srv/blobs"],
    );
    run("wgl server stop", true, &["stopping server"]);
    run("wgl server config get", true, &["config get"]);
}

#[test]
fn missing_required_positional_lists_the_missing_names() {
    run(
        "wgl server config set",
        false,
        &with_header(
            "Error: required arguments are missing: <config>",
            "  wgl server config set",
            &["    <config> - Config: "],
        ),
    );
}

#[test]
fn structured_config_validation_messages_pass_through() {
    run(
        "wgl server config set {}",
        false,
        &with_header(
            "Error: 1 validation error for Config: name: field required",
            "  wgl server config set",
            &["    <config> - Config: "],
        ),
    );
    run(
        "wgl server config set {\"name\":\"test\"}",
        true,
        &["Config { name: \"test\" }"],
    );
}

#[test]
fn unknown_options_list_every_declared_option_for_the_node() {
    run(
        "wgl server --bogus=1 start",
        false,
        &with_header(
            "Error: --bogus is not a valid option, expected one of data",
            "  wgl server",
            &FULL_HELP[5..],
        ),
    );
    run(
        "wgl server stop --help",
        false,
        &["Error: --help is not a valid option", "Usage:", "  wgl server stop"],
    );
}

#[test]
fn missing_option_value_is_reported() {
    run(
        "wgl server --data",
        false,
        &with_header(
            "Error: value is not provided for --data",
            "  wgl server",
            &FULL_HELP[5..],
        ),
    );
}

#[test]
fn root_help_flag_suppresses_the_terminal_handler() {
    // Parse succeeds all the way to `start`, but the root frame's help flag
    // forces help for the terminal node instead of executing it.
    run("wgl --help server start", false, &["Usage:", "  wgl server start"]);
}

#[test]
fn help_rendering_is_exact_and_deterministic() {
    let mut first = Vec::new();
    help::render(&TREE, 2, &mut first);
    assert_eq!(first, &FULL_HELP[2..], "indentation is part of the contract");

    let mut second = Vec::new();
    help::render(&TREE, 2, &mut second);
    assert_eq!(first, second, "re-rendering must be byte-identical");
}

fn options_pair_tree() -> ActionTree {
    ActionTree::new(
        Method::from_fn(
            "demo",
            "",
            vec![
                ParamSpec::optional("alpha", TypeTag::Str, Value::Str("a".into()), ""),
                ParamSpec::optional("beta", TypeTag::Str, Value::Str("b".into()), ""),
            ],
            |ctx, args| {
                let alpha = args.get("alpha").cloned().unwrap_or(Value::Unit);
                let beta = args.get("beta").cloned().unwrap_or(Value::Unit);
                ctx.print(format!("alpha={alpha} beta={beta}"));
                Ok(Value::Unit)
            },
        )
        .expect("demo method"),
    )
}

#[test]
fn option_binding_is_commutative_among_options() {
    let tree = options_pair_tree();
    let one = tree.run_captured(["demo", "--alpha=1", "--beta", "2"]);
    let two = tree.run_captured(["demo", "--beta=2", "--alpha", "1"]);
    assert!(one.success && two.success);
    assert_eq!(one.messages, two.messages);
    assert_eq!(one.messages, ["alpha=1 beta=2"]);
}

#[test]
fn duplicate_options_fail_even_when_the_values_are_equal() {
    let tree = options_pair_tree();
    let result = tree.run_captured(["demo", "--alpha=1", "--alpha=1"]);
    assert!(!result.success);
    assert_eq!(result.messages[0], "Error: --alpha is already set to 1");
}

#[test]
fn missing_value_for_a_trailing_non_toggle_option() {
    let tree = options_pair_tree();
    let result = tree.run_captured(["demo", "--alpha"]);
    assert!(!result.success);
    assert_eq!(result.messages[0], "Error: value is not provided for --alpha");
}

fn positional_pair_tree() -> ActionTree {
    ActionTree::new(
        Method::from_fn(
            "copy",
            "",
            vec![
                ParamSpec::required("source", TypeTag::Str, ""),
                ParamSpec::required("target", TypeTag::Str, ""),
            ],
            |ctx, args| {
                let source = args.get("source").cloned().unwrap_or(Value::Unit);
                let target = args.get("target").cloned().unwrap_or(Value::Unit);
                ctx.print(format!("source={source} target={target}"));
                Ok(Value::Unit)
            },
        )
        .expect("copy method"),
    )
}

#[test]
fn positional_binding_is_strictly_order_dependent() {
    let tree = positional_pair_tree();
    let forward = tree.run_captured(["cp", "one", "two"]);
    let reversed = tree.run_captured(["cp", "two", "one"]);
    assert_eq!(forward.messages, ["source=one target=two"]);
    assert_eq!(reversed.messages, ["source=two target=one"]);
}

#[test]
fn options_are_rejected_while_positionals_remain_unfilled() {
    let tree = positional_pair_tree();
    let result = tree.run_captured(["cp", "--alpha=1"]);
    assert!(!result.success);
    assert_eq!(
        result.messages[0],
        "Error: argument source is required but received option --alpha=1"
    );
}

fn toggle_tree() -> ActionTree {
    ActionTree::new(
        Method::from_fn(
            "tool",
            "",
            vec![ParamSpec::toggle("verbose", "Print more")],
            |ctx, args| {
                let verbose = args.get("verbose").cloned().unwrap_or(Value::Bool(false));
                ctx.print(format!("verbose={verbose}"));
                Ok(Value::Unit)
            },
        )
        .expect("tool method"),
    )
}

#[test]
fn toggle_presence_and_truthy_literals_bind_identically() {
    let tree = toggle_tree();
    for argv in [
        vec!["tool", "--verbose"],
        vec!["tool", "--verbose=y"],
        vec!["tool", "--verbose=TRUE"],
        vec!["tool", "--verbose=1"],
    ] {
        let result = tree.run_captured(argv.clone());
        assert!(result.success);
        assert_eq!(result.messages, ["verbose=true"], "argv: {argv:?}");
    }
    let off = tree.run_captured(["tool"]);
    assert_eq!(off.messages, ["verbose=false"]);
    let falsy = tree.run_captured(["tool", "--verbose=whatever"]);
    assert_eq!(
        falsy.messages,
        ["verbose=false"],
        "unrecognised literals coerce to false, not an error"
    );
}

#[test]
fn designated_help_forces_help_on_an_otherwise_clean_parse() {
    let mut tree = ActionTree::new(
        Method::from_fn(
            "app",
            "",
            vec![ParamSpec::toggle("help", "Show help")],
            |ctx, _args| {
                ctx.print("ran");
                Ok(Value::Unit)
            },
        )
        .expect("app method"),
    );
    tree.designate_help("help").expect("designate help");

    let plain = tree.run_captured(["app"]);
    assert!(plain.success);
    assert_eq!(plain.messages, ["ran"]);

    let helped = tree.run_captured(["app", "--help"]);
    assert!(!helped.success, "help requests are never successful runs");
    assert_eq!(
        helped.messages,
        ["Usage:", "  app", "    [--help] - bool: Show help. Default: false"],
        "the handler must not run when help is requested"
    );
}

#[test]
fn dispatch_is_total_over_arbitrary_token_lists() {
    let inputs: &[&[&str]] = &[
        &[],
        &["wgl"],
        &["wgl", "--"],
        &["wgl", "--="],
        &["wgl", "="],
        &["wgl", "server", "server"],
        &["wgl", "--help=--help"],
        &["wgl", "server", "--data"],
        &["wgl", "server", "config", "set", "{", "}"],
    ];
    for argv in inputs {
        let result = TREE.run_captured(argv.iter().copied());
        assert!(
            result.success || result.messages.iter().any(|line| line == "Usage:"),
            "every failure must carry a usage block, argv: {argv:?}"
        );
    }
}

#[test]
fn concurrent_dispatches_share_one_tree() {
    let handles: Vec<_> = (0..8)
        .map(|_| std::thread::spawn(|| TREE.run_captured(["wgl", "server", "start"])))
        .collect();
    for handle in handles {
        let result = handle.join().expect("dispatch thread");
        assert!(result.success);
        assert_eq!(
            result.messages,
            ["Starting server with data directory: ./data"]
        );
    }
}

#[test]
fn run_results_serialise_and_map_to_exit_codes() {
    let ok = TREE.run_captured(["wgl", "server", "stop"]);
    let rendered = serde_json::to_string(&ok).expect("serialise run result");
    assert!(rendered.contains("\"success\":true"));
    assert_eq!(
        format!("{:?}", ok.exit_code()),
        format!("{:?}", ExitCode::SUCCESS)
    );

    let failed = TREE.run_captured(["wgl", "bogus"]);
    assert_eq!(
        format!("{:?}", failed.exit_code()),
        format!("{:?}", ExitCode::FAILURE)
    );
}
