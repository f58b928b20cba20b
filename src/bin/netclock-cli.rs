//! NetClock CLI - Main Entry Point

use clap::Parser;
use netclock::cli::{
    args::CliArgs,
    client::LineClient,
    repl::{run_command, run_interactive, run_pipe},
};

fn main() {
    let args = CliArgs::parse();

    let (client, banner) = match LineClient::connect(&args.host, args.port, args.timeout) {
        Ok(connected) => connected,
        Err(e) => {
            eprintln!(
                "Could not connect to NetClock at {}:{}: {}",
                args.host, args.port, e
            );
            std::process::exit(1);
        }
    };

    let result = if args.pipe {
        run_pipe(client)
    } else if let Some(ref command) = args.command {
        run_command(client, command)
    } else {
        run_interactive(client, &banner, &args)
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
