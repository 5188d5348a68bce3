use anyhow::Result;
use atesti::cli::{actions::Action, start};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse args, initialize telemetry, and get the action to run
    let action = start()?;

    match action {
        Action::Server(args) => atesti::cli::actions::server::execute(args).await?,
    }

    Ok(())
}
