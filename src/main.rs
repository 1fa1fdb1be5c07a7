#[tokio::main]
async fn main() {
    if let Err(e) = surgiflow_lib::run().await {
        tracing::error!("Fatal: {e}");
        eprintln!("surgiflow: {e}");
        std::process::exit(1);
    }
}
