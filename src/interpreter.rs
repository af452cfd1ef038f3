use crate::builtin;
use crate::command::CommandRequest;
use crate::env::Environment;
use crate::external;
use crate::jobs::JobTable;
use crate::parser;
use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::process::{Child, Stdio};

/// The dispatch loop: builtins, external commands, two-stage pipelines and
/// background jobs.
///
/// One interpreter owns the [`Environment`] captured at startup and the
/// [`JobTable`] of outstanding background processes. Everything runs on the
/// calling thread; the only concurrency is the child processes themselves.
///
/// Example
/// ```
/// use minish::{Interpreter, parser};
/// let mut sh = Interpreter::from_process().unwrap();
/// sh.dispatch(&parser::parse("exit"));
/// ```
pub struct Interpreter {
    env: Environment,
    jobs: JobTable,
}

impl Interpreter {
    /// Build an interpreter from the current process environment.
    ///
    /// Fails only when the search-path variable is present but unusable,
    /// the one fatal startup condition.
    pub fn from_process() -> Result<Self> {
        Ok(Self {
            env: Environment::from_process()?,
            jobs: JobTable::new(),
        })
    }

    /// The interactive read-eval-print loop.
    ///
    /// Each cycle reaps finished background jobs, prompts with the current
    /// working directory, then parses and dispatches one line. Ctrl-C
    /// re-prompts; end-of-input ends the loop like `exit` does.
    pub fn repl(&mut self) -> rustyline::Result<()> {
        let mut rl = DefaultEditor::new()?;
        while !self.env.should_exit {
            self.report_finished_jobs();
            let prompt = format!("{}$ ", self.env.current_dir.display());
            match rl.readline(&prompt) {
                Ok(line) => {
                    rl.add_history_entry(line.as_str())?;
                    let request = parser::parse(&line);
                    self.dispatch(&request);
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Run one parsed request to completion.
    ///
    /// Every recoverable failure (marker-count validation, resolution, spawn
    /// or wait errors, builtin errors) is reported right here and never
    /// escapes; the caller can always go on to the next line.
    pub fn dispatch(&mut self, request: &CommandRequest) {
        if request.is_blank() {
            return;
        }
        if let Some(result) = builtin::dispatch(&request.program, &request.arguments, &mut self.env)
        {
            if let Err(err) = result {
                eprintln!("ERROR: {err:#}");
            }
            return;
        }
        if request.ampersand_count > 1 {
            eprintln!("ERROR: <there can only be one &>");
            return;
        }
        if request.pipe_count > 1 {
            eprintln!("ERROR: <this program supports at most 1 pipe>");
            return;
        }
        if request.pipe_count == 1 {
            self.run_pipeline(request);
        } else {
            self.run_single(request);
        }
    }

    fn run_single(&mut self, request: &CommandRequest) {
        let Some(path) = external::find_executable(&request.program, &self.env.search_path) else {
            eprintln!("ERROR: command \"{}\" not found", request.program);
            return;
        };
        let mut command = external::build_command(&path, &request.program, &request.arguments);
        match command.spawn() {
            Ok(child) => self.launch(child, &request.program, request.is_background()),
            Err(err) => {
                eprintln!("ERROR: <failed to start \"{}\": {}>", request.program, err)
            }
        }
    }

    /// Two-stage pipeline: stage one's stdout feeds stage two's stdin.
    ///
    /// Both stages are resolved up front; either one missing aborts the whole
    /// pipeline with no partial launch. In the foreground case stage one is
    /// waited on before stage two is spawned, so a stage one that overfills
    /// the pipe buffer blocks the prompt until someone drains it.
    fn run_pipeline(&mut self, request: &CommandRequest) {
        let Some(stages) = request.pipeline() else {
            eprintln!("ERROR: <missing command after |>");
            return;
        };
        let Some(first_path) =
            external::find_executable(stages.first_program, &self.env.search_path)
        else {
            eprintln!("ERROR: command \"{}\" not found", stages.first_program);
            return;
        };
        let Some(second_path) =
            external::find_executable(stages.second_program, &self.env.search_path)
        else {
            eprintln!("ERROR: command \"{}\" not found", stages.second_program);
            return;
        };

        let mut first_command =
            external::build_command(&first_path, stages.first_program, stages.first_args);
        first_command.stdout(Stdio::piped());
        let mut first = match first_command.spawn() {
            Ok(child) => child,
            Err(err) => {
                eprintln!(
                    "ERROR: <failed to start \"{}\": {}>",
                    stages.first_program, err
                );
                return;
            }
        };
        // The parent's only pipe handle; the write end lives in stage one, so
        // end-of-stream reaches stage two as soon as stage one exits.
        let pipe_read = first.stdout.take();

        let background = request.is_background();
        self.launch(first, stages.first_program, background);

        let mut second_command =
            external::build_command(&second_path, stages.second_program, stages.second_args);
        second_command.stdin(match pipe_read {
            Some(read_end) => Stdio::from(read_end),
            None => Stdio::null(),
        });
        match second_command.spawn() {
            Ok(second) => self.launch(second, stages.second_program, background),
            Err(err) => {
                eprintln!(
                    "ERROR: <failed to start \"{}\": {}>",
                    stages.second_program, err
                );
            }
        }
    }

    /// Hand a spawned child to the job table or block until it terminates.
    fn launch(&mut self, child: Child, label: &str, background: bool) {
        if background {
            println!("[running background process \"{label}\"]");
            if let Err(untracked) = self.jobs.register(child, label) {
                eprintln!(
                    "ERROR: <job table full, process {} left untracked>",
                    untracked.id()
                );
            }
        } else {
            self.wait_foreground(child, label);
        }
    }

    fn wait_foreground(&mut self, mut child: Child, label: &str) {
        if let Err(err) = child.wait() {
            eprintln!("ERROR: <failed waiting for \"{label}\": {err}>");
        }
    }

    fn report_finished_jobs(&mut self) {
        for job in self.jobs.poll_finished() {
            println!(
                "[process {} terminated with exit status {}]",
                job.pid, job.exit_code
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::SearchPath;
    use crate::jobs::FinishedJob;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

    fn test_interpreter() -> Interpreter {
        Interpreter {
            env: Environment {
                search_path: SearchPath::parse("/bin:/usr/bin").unwrap(),
                home: None,
                current_dir: std::env::current_dir().unwrap(),
                should_exit: false,
            },
            jobs: JobTable::new(),
        }
    }

    fn scratch_file(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "interpreter_tests_{}_{}_{}",
            std::process::id(),
            tag,
            nanos
        ))
    }

    fn drain_jobs(sh: &mut Interpreter, expected: usize) -> Vec<FinishedJob> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut finished = Vec::new();
        while finished.len() < expected {
            finished.extend(sh.jobs.poll_finished());
            assert!(Instant::now() < deadline, "background jobs never terminated");
            std::thread::sleep(Duration::from_millis(10));
        }
        finished
    }

    #[test]
    fn blank_line_is_a_no_op() {
        let mut sh = test_interpreter();
        sh.dispatch(&parser::parse("   \t "));
        assert_eq!(sh.jobs.active(), 0);
        assert!(!sh.env.should_exit);
    }

    #[test]
    fn exit_requests_loop_termination() {
        let mut sh = test_interpreter();
        sh.dispatch(&parser::parse("exit"));
        assert!(sh.env.should_exit);
    }

    #[test]
    #[cfg(unix)]
    fn foreground_pipeline_delivers_stage_one_bytes_to_stage_two() {
        let mut sh = test_interpreter();
        let out = scratch_file("pipe");
        sh.dispatch(&parser::parse(&format!(
            "echo hello pipe | tee {}",
            out.display()
        )));

        let written = fs::read_to_string(&out).expect("tee wrote its file");
        assert_eq!(written, "hello pipe\n");
        assert_eq!(sh.jobs.active(), 0);
        let _ = fs::remove_file(out);
    }

    #[test]
    #[cfg(unix)]
    fn background_single_command_is_tracked_and_reaped_once() {
        let mut sh = test_interpreter();
        sh.dispatch(&parser::parse("sleep 0 &"));
        assert_eq!(sh.jobs.active(), 1);

        let finished = drain_jobs(&mut sh, 1);
        assert_eq!(finished[0].label, "sleep");
        assert_eq!(finished[0].exit_code, 0);
        assert!(sh.jobs.poll_finished().is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn background_pipeline_registers_both_stages() {
        let mut sh = test_interpreter();
        let out = scratch_file("bgpipe");
        sh.dispatch(&parser::parse(&format!("echo data | tee {} &", out.display())));
        assert_eq!(sh.jobs.active(), 2);

        let finished = drain_jobs(&mut sh, 2);
        let mut labels: Vec<&str> = finished.iter().map(|j| j.label.as_str()).collect();
        labels.sort();
        assert_eq!(labels, vec!["echo", "tee"]);

        assert_eq!(fs::read_to_string(&out).unwrap(), "data\n");
        let _ = fs::remove_file(out);
    }

    #[test]
    #[cfg(unix)]
    fn double_ampersand_is_rejected_without_launch() {
        let mut sh = test_interpreter();
        sh.dispatch(&parser::parse("sleep 5 & &"));
        assert_eq!(sh.jobs.active(), 0);
    }

    #[test]
    #[cfg(unix)]
    fn double_pipe_is_rejected_without_launch() {
        let mut sh = test_interpreter();
        let one = scratch_file("reject1");
        let two = scratch_file("reject2");
        sh.dispatch(&parser::parse(&format!(
            "echo x | tee {} | tee {} &",
            one.display(),
            two.display()
        )));
        assert_eq!(sh.jobs.active(), 0);
        assert!(!one.exists());
        assert!(!two.exists());
    }

    #[test]
    #[cfg(unix)]
    fn unresolved_command_is_skipped() {
        let mut sh = test_interpreter();
        sh.dispatch(&parser::parse("definitely_not_a_real_command_zzz &"));
        assert_eq!(sh.jobs.active(), 0);
    }

    #[test]
    #[cfg(unix)]
    fn pipeline_with_one_unresolved_stage_launches_nothing() {
        let mut sh = test_interpreter();
        let out = scratch_file("halfpipe");
        sh.dispatch(&parser::parse(&format!(
            "definitely_not_a_real_command_zzz | tee {} &",
            out.display()
        )));
        assert_eq!(sh.jobs.active(), 0);
        assert!(!out.exists());
    }

    #[test]
    fn trailing_bare_pipe_is_rejected() {
        let mut sh = test_interpreter();
        sh.dispatch(&parser::parse("sort |"));
        assert_eq!(sh.jobs.active(), 0);
    }
}
