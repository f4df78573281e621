use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tdesk::cli::{Cli, Commands, GlobalOpts};
use tdesk::core::Config;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_tracing(&cli.global)?;

    match cli.command {
        Commands::Ping => tdesk::cli::commands::ping::run(&cli.global),
        Commands::Org(cmd) => tdesk::cli::commands::org::run(cmd, &cli.global),
        Commands::Employee(cmd) => tdesk::cli::commands::employee::run(cmd, &cli.global),
        Commands::Tender(cmd) => tdesk::cli::commands::tender::run(cmd, &cli.global),
        Commands::Bid(cmd) => tdesk::cli::commands::bid::run(cmd, &cli.global),
    }
}

/// Log to stderr; `-v` / `-vv` win over TDESK_LOG and the config file
fn init_tracing(global: &GlobalOpts) -> Result<()> {
    let filter = match global.verbose {
        0 => {
            let config = Config::try_load(global.config.as_deref()).into_diagnostic()?;
            EnvFilter::try_new(&config.log.filter).into_diagnostic()?
        }
        1 => EnvFilter::new("tdesk=info"),
        _ => EnvFilter::new("tdesk=debug"),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    Ok(())
}
