//! Language runtime and remote shell sub-policies.

use super::Ruling;

/// python/node/deno/bun/ruby/swift: running a script file or a REPL is
/// routine; inline code strings are opaque and escalate.
pub(super) fn evaluate_runtime(cmd: &str, args: &[String]) -> Ruling {
    if args.is_empty() {
        return Ruling::allow(format!("{cmd} (REPL)"));
    }

    for arg in args {
        match arg.as_str() {
            "-c" | "-e" | "--eval" => {
                return Ruling::uncertain(format!("{cmd} with inline code"));
            }
            _ => {}
        }
    }

    Ruling::allow(format!("{cmd} (script)"))
}

/// ssh flags that consume the following argument.
const SSH_VALUE_FLAGS: &[&str] = &[
    "-b", "-c", "-D", "-E", "-e", "-F", "-I", "-i", "-J", "-L", "-l", "-m", "-O", "-o",
    "-p", "-Q", "-R", "-S", "-W", "-w",
];

/// ssh to a host is just access; a second positional is a remote command.
pub(super) fn evaluate_ssh(args: &[String]) -> Ruling {
    let mut positionals = 0;
    let mut skip_next = false;

    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if SSH_VALUE_FLAGS.contains(&arg.as_str()) {
            skip_next = true;
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        positionals += 1;
        if positionals > 1 {
            return Ruling::uncertain("ssh with remote command");
        }
    }

    Ruling::allow("ssh (interactive)")
}
