//! Turns a raw input line into a [`CommandRequest`].

use crate::command::CommandRequest;

/// Parse one input line.
///
/// The grammar is whitespace-delimited tokens: the first token is always the
/// program name (even a literal `&` or `|` in first position), and every
/// later token is either a background marker (`&`), a pipe marker (`|`), or a
/// plain argument. Runs of whitespace are collapsed and never produce empty
/// tokens. A blank line yields a request with an empty program.
///
/// This function never fails; invalid marker counts are recorded for the
/// interpreter to reject.
///
/// ```
/// use minish::parser::parse;
///
/// let request = parse("sort | uniq &");
/// assert_eq!(request.program, "sort");
/// assert_eq!(request.arguments, vec!["uniq".to_string()]);
/// assert_eq!(request.pipe_count, 1);
/// assert_eq!(request.ampersand_count, 1);
/// assert_eq!(request.pipe_split_index, Some(0));
/// ```
pub fn parse(raw: &str) -> CommandRequest {
    let mut tokens = raw.split_whitespace();
    let Some(program) = tokens.next() else {
        return CommandRequest::default();
    };

    let mut request = CommandRequest {
        program: program.to_string(),
        ..Default::default()
    };

    for token in tokens {
        match token {
            "&" => request.ampersand_count += 1,
            "|" => {
                if request.pipe_count == 0 {
                    request.pipe_split_index = Some(request.arguments.len());
                }
                request.pipe_count += 1;
            }
            word => request.arguments.push(word.to_string()),
        }
    }
    request
}
