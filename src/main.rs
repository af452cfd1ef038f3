use minish::Interpreter;

fn main() {
    let mut shell = match Interpreter::from_process() {
        Ok(shell) => shell,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            std::process::exit(1);
        }
    };
    if let Err(err) = shell.repl() {
        eprintln!("ERROR: <readline: {err}>");
    }
}
