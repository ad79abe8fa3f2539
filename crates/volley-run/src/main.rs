use clap::Parser;

#[tokio::main]
async fn main() -> miette::Result<()> {
    volley_run::Cli::parse().run().await
}
