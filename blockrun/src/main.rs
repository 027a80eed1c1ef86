use blockrun_interpreter::RunConfig;
use clap::{Args, Parser, Subcommand};
use miette::MietteHandlerOpts;
use std::num::NonZeroUsize;
use std::process;
use std::sync::Once;

mod repl;

use repl::{ReplConfig, ReplSession};

#[derive(Parser)]
#[command(
    name = "blockrun",
    version,
    about = "Build and run block programs from the terminal",
    long_about = "Blockrun assembles programs from blocks placed on a canvas, runs them top to bottom and left to right, and keeps a trace of every assignment.",
    before_help = format!("▦ BLOCKRUN v{} ▦\n", env!("CARGO_PKG_VERSION"))
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    options: ReplOptions,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive block editor (the default)
    Repl {
        #[command(flatten)]
        options: ReplOptions,
    },
}

#[derive(Args, Clone, Debug, Default)]
struct ReplOptions {
    /// Width run output is wrapped to
    #[arg(long, value_name = "N")]
    line_width: Option<NonZeroUsize>,

    /// Deepest nesting a run may reach before it gives up
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Execute runs on a worker thread
    #[arg(long)]
    worker: bool,

    /// Do not read or write the history file
    #[arg(long)]
    no_history: bool,
}

impl ReplOptions {
    fn into_config(self) -> ReplConfig {
        let defaults = RunConfig::default();
        let run = RunConfig {
            line_length: self.line_width.unwrap_or(defaults.line_length),
            max_depth: self.max_depth.unwrap_or(defaults.max_depth),
        };

        let mut config = ReplConfig {
            run,
            worker: self.worker,
            ..Default::default()
        };
        if self.no_history {
            config.persist_history = false;
            config.history_file = None;
        }
        config
    }
}

fn main() {
    setup_miette_handler();
    init_tracing();

    let cli = Cli::parse();
    let options = match cli.command {
        Some(Commands::Repl { options }) => options,
        None => cli.options,
    };

    handle_repl_command(options.into_config());
}

/// Configure miette report rendering
fn setup_miette_handler() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .color(true)
                .tab_width(4)
                .with_cause_chain()
                .build(),
        )
    }))
    .ok();
}

static TRACING_INIT: Once = Once::new();

/// Install a tracing subscriber when `RUST_LOG` is set
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

fn handle_repl_command(config: ReplConfig) {
    let mut session = match ReplSession::with_config(config) {
        Ok(session) => session,
        Err(error) => {
            eprintln!("{:?}", miette::Report::new(error));
            process::exit(1);
        }
    };

    if let Err(error) = session.run() {
        eprintln!("{:?}", miette::Report::new(error));
        process::exit(1);
    }
}
