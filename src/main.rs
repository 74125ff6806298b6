#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = profmatch::run().await {
        eprintln!("profmatch fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
