//! Interactive shell for the NetClock line protocol.

use std::io::{self, BufRead};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use super::args::CliArgs;
use super::client::LineClient;

/// Get history file path
fn history_path() -> Option<std::path::PathBuf> {
    dirs::data_dir().map(|p| p.join("netclock").join("cli_history"))
}

/// Run the interactive REPL.
pub fn run_interactive(mut client: LineClient, banner: &str, args: &CliArgs) -> io::Result<()> {
    if !banner.is_empty() {
        println!("{banner}");
    }

    let mut rl = DefaultEditor::new().map_err(to_io)?;

    // Load history
    if let Some(path) = history_path() {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = rl.load_history(&path);
    }

    let prompt = format!("{} > ", args.address());

    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                if matches!(input.to_lowercase().as_str(), "quit" | "exit") {
                    break;
                }

                let _ = rl.add_history_entry(input);
                match client.send(input) {
                    Ok(reply) => println!("{reply}"),
                    Err(e) => {
                        eprintln!("Connection lost: {e}");
                        break;
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        }
    }

    // Save history
    if let Some(path) = history_path() {
        let _ = rl.save_history(&path);
    }

    Ok(())
}

/// Execute one command and print its reply.
pub fn run_command(mut client: LineClient, command: &str) -> io::Result<()> {
    let reply = client.send(command)?;
    println!("{reply}");
    Ok(())
}

/// Forward every stdin line to the server (pipe mode).
pub fn run_pipe(mut client: LineClient) -> io::Result<()> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let reply = client.send(input)?;
        println!("{reply}");
    }
    Ok(())
}

fn to_io(e: ReadlineError) -> io::Error {
    io::Error::other(e.to_string())
}
