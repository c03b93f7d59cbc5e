use clap::Parser;
use leadtrail_cli::error::CliError;
use leadtrail_cli::logging::init_logging;
use leadtrail_cli::output::print_error;
use leadtrail_cli::router::{Cli, CommandRouter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let message = match e.downcast_ref::<CliError>() {
            Some(cli_error) => cli_error.user_message(),
            None => format!("{:#}", e),
        };
        print_error(&message);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    CommandRouter::execute(&cli).await?;
    Ok(())
}
