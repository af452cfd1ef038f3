/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Parsed representation of one input line.
///
/// Produced by [`crate::parser::parse`] and consumed by the interpreter.
/// Marker tokens (`&`, `|`) are counted here but never validated: a request
/// with more than one of either is well-formed data, and rejecting it is the
/// interpreter's job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandRequest {
    /// Name of the primary executable. Empty when the input line was blank.
    pub program: String,
    /// Argument tokens in input order. Excludes the program name and every
    /// `&`/`|` marker, regardless of where they appeared.
    pub arguments: Vec<String>,
    /// Number of `&` tokens seen after the program name.
    pub ampersand_count: usize,
    /// Number of `|` tokens seen after the program name.
    pub pipe_count: usize,
    /// Argument count captured when the first `|` was seen; the position in
    /// `arguments` where the second pipeline stage's program name lands.
    pub pipe_split_index: Option<usize>,
}

/// Borrowed view of a request split into its two pipeline stages.
///
/// The argument slices are disjoint: the stage-two program name is taken from
/// the split position and appears in neither slice.
#[derive(Debug, PartialEq, Eq)]
pub struct PipelineStages<'a> {
    pub first_program: &'a str,
    pub first_args: &'a [String],
    pub second_program: &'a str,
    pub second_args: &'a [String],
}

impl CommandRequest {
    /// True for a blank input line; callers treat this as a no-op.
    pub fn is_blank(&self) -> bool {
        self.program.is_empty()
    }

    /// True when the request asks to run detached from the prompt.
    pub fn is_background(&self) -> bool {
        self.ampersand_count == 1
    }

    /// Split the request at the recorded pipe position.
    ///
    /// Returns `None` when no `|` was seen, or when nothing followed it
    /// (input like `sort |`), which the interpreter reports as a missing
    /// second command.
    pub fn pipeline(&self) -> Option<PipelineStages<'_>> {
        let split = self.pipe_split_index?;
        let second_program = self.arguments.get(split)?;
        Some(PipelineStages {
            first_program: &self.program,
            first_args: &self.arguments[..split],
            second_program,
            second_args: &self.arguments[split + 1..],
        })
    }
}
