//! Recursive help rendering: a pure, deterministic function of a node and an
//! incoming indentation.

use super::tree::ActionTree;

/// Render a node's arguments, options, and child actions at
/// `incoming_indent + 2`, recursing into each child two levels deeper than
/// its entry line.
pub(crate) fn render(node: &ActionTree, incoming_indent: usize, out: &mut Vec<String>) {
    let local = incoming_indent + 2;
    let (positionals, options) = node.method().split_args_opts();
    for param in positionals {
        out.push(param.arg_help(local));
    }
    for param in options {
        out.push(param.opt_help(local));
    }
    if node.has_children() {
        out.push(format!("{:local$}Actions:", ""));
        let entry = local + 2;
        for (name, child) in node.children() {
            out.push(format!("{:entry$}{name} - {}", "", child.method().doc()));
            render(child, entry + 2, out);
        }
    }
}
