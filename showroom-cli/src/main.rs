//! showroom entry point.

use std::sync::Arc;

use showroom_cli::args::{CliArgs, USAGE};
use showroom_cli::config::CliConfig;
use showroom_cli::error::CliError;
use showroom_cli::{run, telemetry, ConsoleSink};
use showroom_resolver::ReqwestTransport;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    let args = match CliArgs::from_env() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}\n{}", e, USAGE);
            return Err(e);
        }
    };
    let config = CliConfig::load(args.config.as_deref())?;
    telemetry::init_tracing(config.log_format)?;

    let transport = Arc::new(ReqwestTransport::new()?);
    let entity = run(&args, &config, transport, &ConsoleSink).await?;

    println!("{}", serde_json::to_string_pretty(&entity)?);
    Ok(())
}
