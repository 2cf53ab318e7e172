#[tokio::main]
async fn main() {
    if let Err(e) = tm1_cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
