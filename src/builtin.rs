use crate::command::ExitCode;
use crate::env::Environment;
use anyhow::{Context, Result, bail};
use argh::{EarlyExit, FromArgs};
use std::env as stdenv;
use std::fs;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed
/// directly in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd".
    fn name() -> &'static str;

    /// Executes the command against the interpreter's environment.
    ///
    /// Return value follows shell conventions: 0 for success, non-zero for error.
    fn run(self, env: &mut Environment) -> Result<ExitCode>;
}

/// Try a name against the known builtins.
///
/// Returns `None` when `name` is not a builtin, so the caller can fall
/// through to external-command launching.
pub(crate) fn dispatch(
    name: &str,
    args: &[String],
    env: &mut Environment,
) -> Option<Result<ExitCode>> {
    if name == Cd::name() {
        return Some(invoke::<Cd>(name, args, env));
    }
    if name == Exit::name() {
        return Some(invoke::<Exit>(name, args, env));
    }
    None
}

fn invoke<T: BuiltinCommand>(name: &str, args: &[String], env: &mut Environment) -> Result<ExitCode> {
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    match T::from_args(&[name], &arg_refs) {
        Ok(command) => command.run(env),
        Err(EarlyExit { output, status }) => {
            // --help lands here too; argh pre-formats both cases.
            println!("{output}");
            Ok(if status.is_err() { 1 } else { 0 })
        }
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// A bare `~` or no target selects $HOME; `~rest` resolves relative to $HOME.
pub struct Cd {
    #[argh(positional, greedy)]
    /// target directory; only the first value is used, extras are ignored.
    pub targets: Vec<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn run(self, env: &mut Environment) -> Result<ExitCode> {
        let target = match self.targets.first().map(String::as_str) {
            None | Some("~") => match &env.home {
                Some(home) => home.clone(),
                None => PathBuf::from("."),
            },
            Some(tilde) if tilde.starts_with('~') => {
                let Some(home) = &env.home else {
                    bail!("cd: HOME is not set");
                };
                let mut dir = home.clone();
                dir.push(tilde[1..].trim_start_matches('/'));
                dir
            }
            Some(literal) => PathBuf::from(literal),
        };

        let resolved = if target.is_absolute() {
            target
        } else {
            env.current_dir.join(target)
        };

        let canonical = fs::canonicalize(&resolved)
            .with_context(|| format!("cd: no such directory: {}", resolved.display()))?;
        stdenv::set_current_dir(&canonical)
            .with_context(|| format!("cd: can't change to {}", canonical.display()))?;
        env.current_dir = canonical;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Leave the shell.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored; present so stray arguments don't fail parsing.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn run(self, env: &mut Environment) -> Result<ExitCode> {
        println!("bye");
        env.should_exit = true;
        Ok(0)
    }
}
