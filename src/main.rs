use beamconf::{source_dir, ConfError, LatticeParser, Printer};

use std::cell::RefCell;
use std::io::{self, Read};
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "beamconf")]
#[command(about = "Parse a beamline lattice file and print it as JSON")]
struct Cli {
    /// Lattice file to parse; reads stdin when omitted
    file: Option<PathBuf>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beamconf=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let mut parser = LatticeParser::new();
    let printer: Printer = Rc::new(RefCell::new(io::stderr()));
    parser.set_printer(Some(printer));

    let (input, dir) = match &cli.file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(input) => (input, Some(source_dir(path))),
            Err(e) => {
                eprintln!("Failed to read {}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => {
            let mut input = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut input) {
                eprintln!("Failed to read stdin: {}", e);
                std::process::exit(2);
            }
            (input, None)
        }
    };
    let result = parser.parse_str(&input, dir);

    match result {
        Ok(conf) => {
            if cli.compact {
                println!("{}", conf.to_json());
            } else {
                println!("{}", conf.to_json_pretty());
            }
        }
        Err(err) => {
            report(&input, &err);
            std::process::exit(1);
        }
    }
}

fn report(input: &str, err: &ConfError) {
    match err.line {
        Some(line) if line > 0 => {
            let line_text = input.lines().nth(line - 1).unwrap_or("");
            eprintln!("ERROR AT LINE {}:", line);
            eprintln!("{}", line_text);
        }
        _ => eprintln!("ERROR:"),
    }
    eprintln!("{} ({})", err.message, err.code());
    eprintln!();
}
