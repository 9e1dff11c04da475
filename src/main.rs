//! Tunedeck CLI - Command-line interface for tune preprocessing and section control

use clap::{Parser, Subcommand};
use std::io::{BufRead, Read};
use std::path::PathBuf;
use tunedeck::config::DeckConfig;
use tunedeck::error::DeckError;
use tunedeck::mute::SectionToggler;
use tunedeck::preprocess::{PreprocessContext, Preprocessor};
use tunedeck::tempo;
use tunedeck::tunes::DEFAULT_TUNE;

#[derive(Parser)]
#[command(name = "tunedeck")]
#[command(about = "Section muting and tag preprocessing for live-coded tunes", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/tunedeck/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve tags and print the evaluator-ready script
    Preprocess {
        /// Tune file, or - for stdin
        input: String,

        /// Section ids whose tags resolve to enabled
        #[arg(long = "enable", value_name = "ID")]
        enable: Vec<String>,

        /// Section ids whose tags resolve to the mute marker
        #[arg(long = "disable", value_name = "ID")]
        disable: Vec<String>,

        /// Tag bindings as KEY=VALUE
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Drop muted blocks from the output
        #[arg(long)]
        strip_muted: bool,
    },

    /// Mute or unmute one section
    Toggle {
        /// Tune file, or - for stdin
        input: String,

        /// Section id
        section: String,

        /// Unmute the section
        #[arg(long, conflicts_with = "disable", required_unless_present = "disable")]
        enable: bool,

        /// Mute the section
        #[arg(long)]
        disable: bool,

        /// Rewrite the input file instead of printing
        #[arg(short, long)]
        write: bool,
    },

    /// List section labels
    Sections {
        /// Tune file, or - for stdin
        input: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set the tune's tempo in cycles per minute
    Tempo {
        /// Tune file, or - for stdin
        input: String,

        /// Cycles per minute (positive)
        cpm: f64,

        /// Rewrite the input file instead of printing
        #[arg(short, long)]
        write: bool,
    },

    /// Extract gain values from log lines (stdin when none given)
    Gain {
        samples: Vec<String>,
    },

    /// Print the bundled default tune
    Tune,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DeckConfig::load(path)?,
        None => DeckConfig::load_default()?,
    };
    let syntax = config.section_syntax()?;

    match cli.command {
        Commands::Preprocess {
            input,
            enable,
            disable,
            set,
            strip_muted,
        } => {
            let text = read_input(&input)?;
            let mut ctx = PreprocessContext::new().strip_muted(strip_muted);
            for id in &enable {
                ctx = ctx.with_section(id, true);
            }
            for id in &disable {
                ctx = ctx.with_section(id, false);
            }
            for binding in &set {
                let (key, value) = parse_binding(binding)?;
                ctx = ctx.bind(key, value);
            }
            print!("{}", Preprocessor::new(syntax).process(&text, &ctx));
        }

        Commands::Toggle {
            input,
            section,
            enable,
            disable,
            write,
        } => {
            let enabled = enable && !disable;
            let text = read_input(&input)?;
            let toggled = SectionToggler::new(syntax).toggle(&text, &section, enabled);
            write_output(&input, &toggled, write)?;
        }

        Commands::Sections { input, json } => {
            let text = read_input(&input)?;
            let sections = SectionToggler::new(syntax).sections(&text);
            if json {
                println!("{}", serde_json::to_string_pretty(&sections)?);
            } else {
                for section in &sections {
                    let state = if section.muted { "muted" } else { "on" };
                    println!("{:>4}  {:<16} {}", section.line, section.id, state);
                }
            }
        }

        Commands::Tempo { input, cpm, write } => {
            let text = read_input(&input)?;
            let updated = tempo::set_cpm(&text, cpm)?;
            write_output(&input, &updated, write)?;
        }

        Commands::Gain { samples } => {
            let extractor = config.gain_extractor();
            if samples.is_empty() {
                for line in std::io::stdin().lock().lines() {
                    let line = line?;
                    println!("{}", extractor.extract(Some(line.as_str())));
                }
            } else {
                for value in extractor.extract_all(samples.as_slice()) {
                    println!("{}", value);
                }
            }
        }

        Commands::Tune => {
            print!("{}", DEFAULT_TUNE);
        }
    }

    Ok(())
}

/// Read a tune file, or stdin for `-`
fn read_input(input: &str) -> Result<String, DeckError> {
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}

fn write_output(input: &str, text: &str, in_place: bool) -> Result<(), DeckError> {
    if in_place {
        if input == "-" {
            return Err(DeckError::Parse("--write needs a file, not stdin".to_string()));
        }
        std::fs::write(input, text)?;
        eprintln!("✅ Updated {}", input);
    } else {
        print!("{}", text);
    }
    Ok(())
}

fn parse_binding(binding: &str) -> Result<(&str, &str), DeckError> {
    binding
        .split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| DeckError::Parse(format!("expected KEY=VALUE, got '{}'", binding)))
}
