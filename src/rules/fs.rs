//! Filesystem command sub-policies: rm, chmod, chown, cp/mv/mkdir/touch,
//! tee, sed, find.

use super::Ruling;
use crate::path;

/// Paths whose removal is never auto-approved.
const DANGEROUS_RM_TARGETS: &[&str] = &["/", "/etc", "/usr", "/var", "/home", "/Users"];

pub(super) fn evaluate_rm(args: &[String], working_dir: &str) -> Ruling {
    let mut recursive = false;
    let mut targets: Vec<&str> = Vec::new();

    for arg in args {
        if arg.starts_with('-') {
            if arg.contains('r') || arg.contains('R') {
                recursive = true;
            }
            continue;
        }
        targets.push(arg);
    }

    if targets.is_empty() {
        return Ruling::allow("rm with no targets");
    }

    for target in targets {
        let resolved = path::resolve(target, working_dir);

        if DANGEROUS_RM_TARGETS.contains(&resolved.as_str()) {
            return Ruling::ask(format!("rm targeting dangerous path: {target}"));
        }
        if let Some(home) = path::home_dir() {
            if resolved == home {
                return Ruling::ask(format!("rm targeting dangerous path: {target}"));
            }
        }

        if recursive && target.contains("..") {
            return Ruling::ask(format!("rm -r with parent traversal: {target}"));
        }

        if recursive && !working_dir.is_empty() && !path::is_within_dir(&resolved, working_dir) {
            return Ruling::ask(format!("rm -r outside project: {target}"));
        }
    }

    Ruling::allow("rm within project")
}

pub(super) fn evaluate_chmod(args: &[String]) -> Ruling {
    let mut recursive = false;
    for arg in args {
        if arg == "-R" || arg == "--recursive" {
            recursive = true;
        }
        if arg == "777" || arg == "a+rwx" {
            if recursive {
                return Ruling::ask("chmod -R 777");
            }
            return Ruling::uncertain("chmod 777");
        }
    }
    Ruling::allow("chmod")
}

pub(super) fn evaluate_chown(args: &[String]) -> Ruling {
    for arg in args {
        if arg == "-R" || arg == "--recursive" {
            return Ruling::uncertain("chown -R");
        }
    }
    Ruling::allow("chown")
}

/// cp/mv/mkdir/touch: fine unless a target resolves into a system path.
pub(super) fn evaluate_file_cmd(cmd: &str, args: &[String], working_dir: &str) -> Ruling {
    for arg in args {
        if arg.starts_with('-') {
            continue;
        }
        let resolved = path::resolve(arg, working_dir);
        if path::is_system_path(&resolved) {
            return Ruling::ask(format!("{cmd} targeting system path: {arg}"));
        }
    }
    Ruling::allow(format!("{cmd} (safe)"))
}

/// tee writes its arguments: system paths ask, paths outside the project
/// escalate.
pub(super) fn evaluate_tee(args: &[String], working_dir: &str) -> Ruling {
    for arg in args {
        if arg.starts_with('-') {
            continue;
        }
        let resolved = path::resolve(arg, working_dir);

        if path::is_system_path(&resolved) {
            return Ruling::ask(format!("tee to system path: {arg}"));
        }
        if !working_dir.is_empty() && !path::is_within_dir(&resolved, working_dir) {
            return Ruling::uncertain(format!("tee outside project: {arg}"));
        }
    }
    Ruling::allow("tee within project")
}

/// sed is read-only unless editing in place.
pub(super) fn evaluate_sed(args: &[String]) -> Ruling {
    for arg in args {
        let short_bundle_with_i =
            arg.starts_with('-') && arg.contains('i') && !arg.starts_with("--");
        if arg == "-i" || arg == "--in-place" || short_bundle_with_i {
            return Ruling::uncertain("sed with in-place edit");
        }
    }
    Ruling::allow("sed (read-only)")
}

/// find is read-only unless it executes or deletes.
pub(super) fn evaluate_find(args: &[String]) -> Ruling {
    for arg in args {
        match arg.as_str() {
            "-exec" | "-execdir" | "-delete" | "-ok" | "-okdir" => {
                return Ruling::uncertain(format!("find with {arg}"));
            }
            _ => {}
        }
    }
    Ruling::allow("find (read-only)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Verdict;

    const CWD: &str = "/home/user/project";

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    macro_rules! rm_test {
        ($name:ident, args: [$($a:expr),*], expect: $verdict:expr) => {
            #[test]
            fn $name() {
                assert_eq!(evaluate_rm(&args(&[$($a),*]), CWD).verdict, $verdict);
            }
        };
    }

    // ---- rm ----

    rm_test!(rm_relative_dir, args: ["-rf", "dist/"], expect: Verdict::Allow);
    rm_test!(rm_single_file, args: ["out.txt"], expect: Verdict::Allow);
    rm_test!(rm_no_targets, args: ["-f"], expect: Verdict::Allow);
    rm_test!(rm_root, args: ["-rf", "/"], expect: Verdict::Ask);
    rm_test!(rm_etc, args: ["-rf", "/etc"], expect: Verdict::Ask);
    rm_test!(rm_usr_even_without_recursion, args: ["/usr"], expect: Verdict::Ask);
    rm_test!(rm_recursive_parent_traversal, args: ["-rf", "../other"], expect: Verdict::Ask);
    rm_test!(rm_recursive_outside_project, args: ["-rf", "/tmp/stuff"], expect: Verdict::Ask);
    rm_test!(rm_nonrecursive_outside_project, args: ["/tmp/stuff.txt"],
        expect: Verdict::Allow);
    rm_test!(rm_capital_r_counts_as_recursive, args: ["-R", "/tmp/x"], expect: Verdict::Ask);
    rm_test!(rm_abs_path_inside_project, args: ["-rf", "/home/user/project/build"],
        expect: Verdict::Allow);

    #[test]
    fn rm_home_is_dangerous() {
        let home = std::env::var("HOME").expect("HOME set in test env");
        let ruling = evaluate_rm(&args(&["-rf", home.as_str()]), CWD);
        assert_eq!(ruling.verdict, Verdict::Ask);
    }

    #[test]
    fn rm_recursive_without_working_dir_is_allowed() {
        // No project boundary to compare against.
        let ruling = evaluate_rm(&args(&["-rf", "/tmp/scratch"]), "");
        assert_eq!(ruling.verdict, Verdict::Allow);
    }

    #[test]
    fn rm_traversal_that_resolves_to_dangerous_path() {
        let ruling = evaluate_rm(&args(&["-rf", "/tmp/../etc"]), CWD);
        assert_eq!(ruling.verdict, Verdict::Ask);
        assert_eq!(ruling.reason, "rm targeting dangerous path: /tmp/../etc");
    }

    // ---- chmod / chown ----

    #[test]
    fn chmod_plain_is_allowed() {
        assert_eq!(evaluate_chmod(&args(&["+x", "run.sh"])).verdict, Verdict::Allow);
    }

    #[test]
    fn chmod_777_is_uncertain() {
        assert_eq!(evaluate_chmod(&args(&["777", "f"])).verdict, Verdict::Uncertain);
    }

    #[test]
    fn chmod_recursive_777_asks() {
        assert_eq!(
            evaluate_chmod(&args(&["-R", "777", "/srv"])).verdict,
            Verdict::Ask
        );
    }

    #[test]
    fn chmod_a_rwx_is_uncertain() {
        assert_eq!(evaluate_chmod(&args(&["a+rwx", "f"])).verdict, Verdict::Uncertain);
    }

    #[test]
    fn chmod_recursion_flag_after_mode_is_not_seen() {
        // Sequential scan: the flag only counts if it precedes the mode.
        assert_eq!(
            evaluate_chmod(&args(&["777", "-R", "f"])).verdict,
            Verdict::Uncertain
        );
    }

    #[test]
    fn chown_plain_is_allowed() {
        assert_eq!(evaluate_chown(&args(&["user:group", "f"])).verdict, Verdict::Allow);
    }

    #[test]
    fn chown_recursive_is_uncertain() {
        assert_eq!(
            evaluate_chown(&args(&["-R", "user:group", "."])).verdict,
            Verdict::Uncertain
        );
    }

    // ---- cp / mv / mkdir / touch ----

    #[test]
    fn cp_within_project_is_allowed() {
        let ruling = evaluate_file_cmd("cp", &args(&["a.txt", "b.txt"]), CWD);
        assert_eq!(ruling.verdict, Verdict::Allow);
    }

    #[test]
    fn cp_to_etc_asks() {
        let ruling = evaluate_file_cmd("cp", &args(&["hosts", "/etc/hosts"]), CWD);
        assert_eq!(ruling.verdict, Verdict::Ask);
        assert_eq!(ruling.reason, "cp targeting system path: /etc/hosts");
    }

    #[test]
    fn mkdir_outside_project_is_still_allowed() {
        // Only system paths are gated, not arbitrary outside paths.
        let ruling = evaluate_file_cmd("mkdir", &args(&["/tmp/newdir"]), CWD);
        assert_eq!(ruling.verdict, Verdict::Allow);
    }

    #[test]
    fn touch_ssh_config_asks() {
        let home = std::env::var("HOME").expect("HOME set in test env");
        let target = format!("{home}/.ssh/config");
        let ruling = evaluate_file_cmd("touch", &args(&[target.as_str()]), CWD);
        assert_eq!(ruling.verdict, Verdict::Ask);
    }

    // ---- tee ----

    #[test]
    fn tee_within_project_is_allowed() {
        assert_eq!(evaluate_tee(&args(&["out.log"]), CWD).verdict, Verdict::Allow);
    }

    #[test]
    fn tee_to_system_path_asks() {
        assert_eq!(
            evaluate_tee(&args(&["/etc/hosts"]), CWD).verdict,
            Verdict::Ask
        );
    }

    #[test]
    fn tee_outside_project_is_uncertain() {
        assert_eq!(
            evaluate_tee(&args(&["/tmp/out.txt"]), CWD).verdict,
            Verdict::Uncertain
        );
    }

    #[test]
    fn tee_append_flag_skipped() {
        assert_eq!(evaluate_tee(&args(&["-a", "log.txt"]), CWD).verdict, Verdict::Allow);
    }

    // ---- sed ----

    #[test]
    fn sed_read_only_is_allowed() {
        assert_eq!(
            evaluate_sed(&args(&["s/a/b/", "file.txt"])).verdict,
            Verdict::Allow
        );
    }

    #[test]
    fn sed_in_place_is_uncertain() {
        assert_eq!(evaluate_sed(&args(&["-i", "s/a/b/", "f"])).verdict, Verdict::Uncertain);
        assert_eq!(
            evaluate_sed(&args(&["--in-place", "s/a/b/", "f"])).verdict,
            Verdict::Uncertain
        );
    }

    #[test]
    fn sed_short_bundle_with_i_is_uncertain() {
        assert_eq!(
            evaluate_sed(&args(&["-ni", "s/a/b/p", "f"])).verdict,
            Verdict::Uncertain
        );
    }

    #[test]
    fn sed_long_flag_containing_i_is_allowed() {
        assert_eq!(
            evaluate_sed(&args(&["--quiet", "s/a/b/", "f"])).verdict,
            Verdict::Allow
        );
    }

    // ---- find ----

    #[test]
    fn find_by_name_is_allowed() {
        assert_eq!(
            evaluate_find(&args(&[".", "-name", "*.rs"])).verdict,
            Verdict::Allow
        );
    }

    #[test]
    fn find_exec_is_uncertain() {
        let ruling = evaluate_find(&args(&[".", "-exec", "rm", "{}", ";"]));
        assert_eq!(ruling.verdict, Verdict::Uncertain);
        assert_eq!(ruling.reason, "find with -exec");
    }

    #[test]
    fn find_delete_is_uncertain() {
        assert_eq!(
            evaluate_find(&args(&[".", "-name", "*.tmp", "-delete"])).verdict,
            Verdict::Uncertain
        );
    }
}
