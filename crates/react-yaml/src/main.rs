//! Replay a model turn through the streaming parser.
//!
//! Reads a turn from a file or stdin, feeds it to the parser in small chunks
//! the way a streaming API would deliver it, prints reasoning as it is
//! released, then prints the action document as JSON.
//!
//! # Examples
//!
//! ```sh
//! # Replay a saved turn, 8 bytes at a time
//! react-yaml turn.yaml --chunk-size 8
//!
//! # Check whether stdin looks like a well-formed turn
//! cat turn.yaml | react-yaml --check
//!
//! # Print the prompt instructions for custom key names
//! react-yaml --instructions --reasoning-key analysis --type-key kind
//!
//! # Show parser transitions on stderr
//! react-yaml turn.yaml -vv
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use futures::Stream;
use react_yaml::config::FormatConfig;
use react_yaml::format::YamlFormat;
use react_yaml::observer::{CompositeObserver, LoggingObserver, ParseEvent, ParseObserver};
use react_yaml::turn::{TurnOutput, run_io_stream};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

/// Replay a ReAct YAML model turn through the streaming parser.
#[derive(Parser)]
#[command(name = "react-yaml")]
struct Cli {
    /// File containing the model turn (reads stdin when omitted)
    file: Option<PathBuf>,

    /// Bytes per chunk fed to the parser
    #[arg(long, default_value_t = 16, value_parser = parse_chunk_size)]
    chunk_size: usize,

    /// Name of the reasoning key
    #[arg(long, default_value = react_yaml::config::DEFAULT_REASONING_KEY)]
    reasoning_key: String,

    /// Name of the action discriminator key
    #[arg(long, default_value = react_yaml::config::DEFAULT_TYPE_KEY)]
    type_key: String,

    /// Print the prompt instructions and exit
    #[arg(long)]
    instructions: bool,

    /// Only report whether the input looks like a well-formed turn
    #[arg(long)]
    check: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_chunk_size(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("chunk size must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("invalid chunk size '{value}': {e}")),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(level);
    tracing_subscriber::registry().with(layer).init();
}

/// Prints reasoning to stdout as soon as it is released.
struct LiveReasoning;

impl ParseObserver for LiveReasoning {
    fn on_event(&self, event: &ParseEvent<'_>) {
        match event {
            ParseEvent::ReasoningDelta(text) => {
                let mut stdout = io::stdout().lock();
                let _ = stdout.write_all(text.as_bytes());
                let _ = stdout.flush();
            }
            ParseEvent::ReasoningComplete { reasoning } if !reasoning.ends_with('\n') => {
                println!();
            }
            _ => {}
        }
    }
}

async fn open_input(file: Option<&Path>) -> Result<Box<dyn AsyncRead + Unpin + Send>, String> {
    match file {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .map_err(|e| format!("failed to open {}: {e}", path.display()))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(tokio::io::stdin())),
    }
}

/// Reads fixed-size byte chunks and releases them as whole UTF-8 text,
/// carrying an incomplete trailing sequence into the next chunk.
struct ChunkReader {
    reader: Box<dyn AsyncRead + Unpin + Send>,
    carry: Vec<u8>,
    chunk_size: usize,
    eof: bool,
}

impl ChunkReader {
    async fn next_chunk(&mut self) -> io::Result<Option<String>> {
        loop {
            if self.eof {
                if self.carry.is_empty() {
                    return Ok(None);
                }
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "input ends inside a UTF-8 sequence",
                ));
            }

            let mut buf = vec![0u8; self.chunk_size];
            let n = self.reader.read(&mut buf).await?;
            if n == 0 {
                self.eof = true;
                continue;
            }
            buf.truncate(n);
            self.carry.append(&mut buf);

            let valid = match std::str::from_utf8(&self.carry) {
                Ok(_) => self.carry.len(),
                Err(e) if e.error_len().is_none() => e.valid_up_to(),
                Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e)),
            };
            if valid == 0 {
                continue;
            }
            let rest = self.carry.split_off(valid);
            let bytes = std::mem::replace(&mut self.carry, rest);
            let text = String::from_utf8(bytes)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            return Ok(Some(text));
        }
    }
}

fn chunk_stream(
    reader: Box<dyn AsyncRead + Unpin + Send>,
    chunk_size: usize,
) -> impl Stream<Item = io::Result<String>> {
    let reader = ChunkReader {
        reader,
        carry: Vec::new(),
        chunk_size,
        eof: false,
    };
    futures::stream::unfold(Some(reader), |state| async move {
        let mut reader = state?;
        match reader.next_chunk().await {
            Ok(Some(chunk)) => Some((Ok(chunk), Some(reader))),
            Ok(None) => None,
            Err(e) => Some((Err(e), None)),
        }
    })
}

fn print_turn(output: &TurnOutput) -> Result<(), String> {
    println!("---");
    match &output.document {
        Some(document) => {
            let json = serde_json::to_string_pretty(document)
                .map_err(|e| format!("failed to render document: {e}"))?;
            println!("{json}");
            if output.recovered {
                eprintln!("  [recovered from fenced block]");
            }
        }
        None => println!("(no action document)"),
    }
    println!("---");
    println!("{}: {}", output.action.kind(), output.action.summary());
    Ok(())
}

async fn run(cli: &Cli) -> Result<(), String> {
    let config = FormatConfig::default()
        .with_reasoning_key(cli.reasoning_key.as_str())
        .with_type_key(cli.type_key.as_str());
    let format = YamlFormat::new(config).map_err(|e| e.to_string())?;

    if cli.instructions {
        println!("{}", format.render_instructions());
        return Ok(());
    }

    let mut input = open_input(cli.file.as_deref()).await?;

    if cli.check {
        let mut text = String::new();
        input
            .read_to_string(&mut text)
            .await
            .map_err(|e| format!("failed to read input: {e}"))?;
        println!("validate_structure: {}", format.validate_structure(&text));
        println!("looks_like_yaml: {}", format.looks_like_yaml(&text));
        return Ok(());
    }

    let observer = CompositeObserver::new()
        .with(LiveReasoning)
        .with_if(cli.verbose > 0, LoggingObserver);
    let output = run_io_stream(chunk_stream(input, cli.chunk_size), &format, &observer)
        .await
        .map_err(|e| e.to_string())?;
    print_turn(&output)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
