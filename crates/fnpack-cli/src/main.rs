mod commands;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "fnpack",
    about = "Package a serverless function as a container and deploy it",
    override_usage = "fnpack <ENTRY> [--FLAG]...",
    disable_help_flag = true,
    disable_version_flag = true
)]
#[command(version)]
struct Cli {
    /// Function entry-point file, followed or preceded by flags forwarded to
    /// the deploy command (tokens starting with `--`)
    #[arg(
        value_name = "ENTRY",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    tokens: Vec<String>,
}

/// Print a usage error and exit with code 1.
fn usage_error(err: clap::Error) -> ! {
    eprint!("{err}");
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::try_parse().unwrap_or_else(|err| usage_error(err));
    let invocation = commands::split_invocation(&cli.tokens);

    if invocation.asks_for("--help") {
        println!("{}", Cli::command().render_long_help());
        return Ok(());
    }
    if invocation.asks_for("--version") {
        print!("{}", Cli::command().render_version());
        return Ok(());
    }

    let Some(entry) = invocation.entry else {
        usage_error(Cli::command().error(
            ErrorKind::MissingRequiredArgument,
            "the following required arguments were not provided:\n  <ENTRY>",
        ));
    };

    commands::package(PathBuf::from(entry), &invocation.flags, &invocation.ignored).await
}
