use subsync::parser::{parse_timestamp, Parser};
use subsync::replay::{self, ReplayOptions};
use subsync::{find_active, serialiser, SubsyncError, SyncConfig};

use std::io::{self, Read};
use std::process;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser as ClapParser, Subcommand};
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    match run() {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            process::exit(1);
        }
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("subsync=info")),
        )
        .with_writer(io::stderr)
        .init();
}

#[derive(ClapParser)]
#[command(about = "Synchronise SRT subtitles with audio playback")]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The file to read from. If not supplied, the subtitles will be read from standard input.",
        default_value = "-",
        global = true
    )]
    input: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the parsed cues as normalised SRT.
    Cues {
        #[arg(
            short,
            long,
            value_name = "FILE",
            help = "The file to write to. If not supplied, the subtitles will be written to standard output.",
            default_value = "-"
        )]
        output: String,
    },
    /// Print the text shown at the given playback position.
    At {
        #[arg(
            value_name = "TIME",
            value_parser = parse_time_arg,
            help = "Seconds (12.5) or an SRT timestamp (00:00:12,500)."
        )]
        time: Duration,
    },
    /// Simulate playing the whole file and print every display update.
    Play(PlayArgs),
}

#[derive(Args)]
struct PlayArgs {
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=1000))]
    fps: u32,
    #[arg(long, value_name = "MS", default_value_t = 150)]
    fade_out_ms: u64,
    #[arg(long, value_name = "MS", default_value_t = 150)]
    fade_in_ms: u64,
    #[arg(long, value_name = "TEXT")]
    placeholder: Option<String>,
    #[arg(long, value_name = "TEXT")]
    ended_message: Option<String>,
}

impl PlayArgs {
    fn config(&self) -> SyncConfig {
        let mut config = SyncConfig::default().with_fades(
            Duration::from_millis(self.fade_out_ms),
            Duration::from_millis(self.fade_in_ms),
        );
        if let Some(placeholder) = &self.placeholder {
            config.placeholder = placeholder.clone();
        }
        if let Some(ended) = &self.ended_message {
            config.ended_message = ended.clone();
        }
        config
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Cues { output } => {
            let subs = Parser::new().parse(&read_input(&cli.input)?);
            if subs.is_empty() {
                return Err(anyhow!("No subtitles found in '{}'.", cli.input));
            }
            if output == "-" {
                serialiser::serialise(&subs, io::stdout())?;
            } else {
                let dst = std::fs::File::create(&output)
                    .context(format!("Failed to create output file: '{}'", output))?;
                serialiser::serialise(&subs, dst)?;
            }
        }
        Command::At { time } => {
            let subs = Parser::new().parse(&read_input(&cli.input)?);
            println!("{}", find_active(&subs, time).unwrap_or("(none)"));
        }
        Command::Play(args) => {
            let opts = ReplayOptions {
                fps: args.fps,
                ..ReplayOptions::default()
            };
            replay::replay(read_input(&cli.input), args.config(), opts, io::stdout())?;
        }
    }

    Ok(())
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(input).context(format!("Failed to open input file: '{}'", input))
    }
}

fn parse_time_arg(arg: &str) -> Result<Duration, SubsyncError> {
    if let Ok(secs) = arg.parse::<f64>() {
        return Duration::try_from_secs_f64(secs).map_err(|err| {
            SubsyncError::ParseError(format!(
                "'{}' is not a valid playback position: {}",
                arg, err
            ))
        });
    }
    parse_timestamp(arg)
}
