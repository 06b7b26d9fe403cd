use clap::Parser;
use dotenv::dotenv;
use std::error::Error;
use wanderlust::cli::Args;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    let args = Args::parse();
    env_logger::Builder
        ::from_env(env_logger::Env::default().default_filter_or(args.default_log_filter()))
        .init();

    wanderlust::run(args).await
}
