//! cmdlog CLI Client
//!
//! Command-line interface for interacting with a cmdlog server.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};

use clap::{Parser, Subcommand};
use cmdlog::log::SeekCommand;
use cmdlog::protocol::{write_request, Request};
use cmdlog::Result;

/// cmdlog CLI
#[derive(Parser, Debug)]
#[command(name = "cmdlog-cli")]
#[command(about = "CLI for the cmdlog command log")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:9000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append a command and print the whole log
    Send {
        /// Text to append (a newline is added if missing)
        text: String,
    },

    /// Print the log from a byte inside a retained command
    Seek {
        /// Retained command index, oldest = 0
        index: u32,

        /// Byte offset inside that command
        offset: u32,
    },
}

fn main() {
    let args = Args::parse();

    let request = match args.command {
        Commands::Send { text } => Request::Append(text.into_bytes()),
        Commands::Seek { index, offset } => Request::SeekTo(SeekCommand::new(index, offset)),
    };

    match exchange(&args.server, &request) {
        Ok(response) => {
            let mut stdout = std::io::stdout();
            if let Err(e) = stdout.write_all(&response).and_then(|_| stdout.flush()) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Send one request, half-close, and collect everything the server sends back
fn exchange(server: &str, request: &Request) -> Result<Vec<u8>> {
    let mut stream = TcpStream::connect(server)?;
    write_request(&mut stream, request, b'\n')?;
    stream.shutdown(Shutdown::Write)?;

    let mut response = Vec::new();
    stream.read_to_end(&mut response)?;
    Ok(response)
}
