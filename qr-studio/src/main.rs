//! # QR Studio
//!
//! Command-line host: one-shot `generate` or an interactive `shell`.

use clap::Parser;
use qr_studio::{generate, CliArgs, Command, Shell, StudioConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,qr_studio=debug,qr_renderer=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
/// Logs go to stderr so shell replies on stdout stay clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,qr_studio=debug,qr_renderer=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let command = args.command.clone();
    let config = StudioConfig::from(args);

    tracing::info!(
        "Output directory: {}, logo decode timeout: {:?}",
        config.out_dir.display(),
        config.decode_timeout
    );

    match command {
        Command::Generate(generate_args) => {
            let path = generate(&generate_args, &config).await?;
            println!("{}", path.display());
        }
        Command::Shell => {
            tracing::debug!("Starting interactive shell");
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut shell = Shell::new(&config);
            shell.run(stdin, tokio::io::stdout()).await?;
            tracing::info!("Shell exited");
        }
    }

    Ok(())
}
