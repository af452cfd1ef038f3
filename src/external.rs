use crate::command::ExitCode;
use crate::env::SearchPath;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Locate `name` in the search path.
///
/// Each directory is tried in order and the candidate is built as
/// `directory + "/" + name`; a name containing separators is still joined
/// under each search directory rather than being treated as a path of its
/// own. The check is existence-only in the `lstat` sense: any entry type
/// counts, dangling symlinks included, and the executable bit is not
/// consulted, so a non-executable match is returned here and fails at launch
/// time instead. First match wins; later identically-named entries are never
/// considered.
pub fn find_executable(name: &str, search_path: &SearchPath) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    for dir in search_path.iter() {
        let mut candidate = OsString::from(dir.as_os_str());
        candidate.push("/");
        candidate.push(name);
        let candidate = PathBuf::from(candidate);
        if candidate.symlink_metadata().is_ok() {
            return Some(candidate);
        }
    }
    None
}

/// Prepare a command for a resolved executable.
///
/// The child execs `executable` but sees the name the user typed as argv[0],
/// with `args` following it. Standard streams are left inherited; callers
/// override them for pipeline stages.
pub fn build_command(executable: &Path, program: &str, args: &[String]) -> Command {
    let mut command = Command::new(executable);
    command.args(args);
    set_argv0(&mut command, program);
    command
}

#[cfg(unix)]
fn set_argv0(command: &mut Command, program: &str) {
    use std::os::unix::process::CommandExt;
    command.arg0(program);
}

#[cfg(not(unix))]
fn set_argv0(_command: &mut Command, _program: &str) {}

/// Exit code of a terminated child, following shell conventions.
pub fn exit_code(exit_status: ExitStatus) -> ExitCode {
    match exit_status.code() {
        Some(code) => code,
        None => terminated_by_signal(exit_status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}
