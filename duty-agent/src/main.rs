use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use duty_agent::config::Config;
use duty_agent::{Error, Mode};
use error_stack::ResultExt;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Build and sign one heartbeat, print it to stdout and exit without relaying or broadcasting
    #[arg(long)]
    pub dry_run: bool,

    /// Set the output style of the logs
    #[arg(short, long, value_enum, default_value_t = Output::Text)]
    pub output: Output,
}

#[derive(Debug, Clone, Parser, ValueEnum)]
enum Output {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Args = Args::parse();
    set_up_logger(&args.output);

    info!(args = ?args, "starting duty agent");

    let mode = if args.dry_run {
        Mode::DryRun
    } else {
        Mode::Daemon
    };

    let result = match Config::from_env().change_context(Error::LoadConfig) {
        Ok(cfg) => duty_agent::run(cfg, mode).await,
        Err(report) => Err(report),
    };

    match result {
        Ok(Some(tx)) => match serde_json::to_string_pretty(&tx) {
            Ok(tx) => {
                println!("{tx}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                error!(err = %err, "failed to print the dry run tx");
                ExitCode::FAILURE
            }
        },
        Ok(None) => {
            info!("shutting down");
            ExitCode::SUCCESS
        }
        Err(report) => {
            error!("{report:#}");

            // print detailed error report as the last output if in text mode
            if matches!(args.output, Output::Text) {
                eprintln!("{report:?}");
            }

            ExitCode::FAILURE
        }
    }
}

fn set_up_logger(output: &Output) {
    // logs go to stderr so the dry run tx is the only output on stdout
    match output {
        Output::Json => {
            tracing_subscriber::fmt()
                .json()
                .flatten_event(true)
                .with_writer(std::io::stderr)
                .init();
        }
        Output::Text => {
            tracing_subscriber::fmt()
                .compact()
                .with_writer(std::io::stderr)
                .init();
        }
    };
}
