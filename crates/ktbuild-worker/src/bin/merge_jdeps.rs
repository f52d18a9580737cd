//! Jdeps merge worker.

use std::sync::Arc;

use tracing::error;

use ktbuild_worker::tasks::MergeJdeps;
use ktbuild_worker::{init_tracing, run_worker, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing()?;

    let config = Config::from_env();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let status = match run_worker("MergeJdeps", &config, Arc::new(MergeJdeps::new()), args).await {
        Ok(status) => status,
        Err(e) => {
            error!(error = %e, "Worker failed");
            1
        }
    };
    std::process::exit(status)
}
