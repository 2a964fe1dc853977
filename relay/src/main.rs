use args::Args;
use clap::Parser;
use server::ServeConfig;

mod args;
mod logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = args.config()?;

    logger::init(&args)?;

    let listen_address = config.server.listen_address_or_default();

    if let Err(e) = server::serve(ServeConfig { listen_address, config }).await {
        log::error!("Server failed to start: {e}");
        std::process::exit(1);
    }

    Ok(())
}
