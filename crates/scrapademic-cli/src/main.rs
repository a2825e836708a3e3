//! Scrapademic — entry point.

use clap::{CommandFactory, Parser};

use scrapademic_cli::Cli;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too and are not failures
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "scrapademic", &mut std::io::stdout());
        return;
    }

    scrapademic_cli::init_logging(&cli.log_level);

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = scrapademic_cli::run(&cli).await {
        eprintln!("Error scraping: {e:#}");
        std::process::exit(1);
    }
}
