//! Kotlin builder worker.

use std::sync::Arc;

use tracing::{error, info};

use ktbuild_worker::tasks::KotlinBuilder;
use ktbuild_worker::{init_tracing, run_worker, Compiler, Config, SubprocessCompiler};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing()?;

    let config = Config::from_env();
    info!(kotlinc = %config.kotlinc.display(), verbose = config.verbose, "Starting Kotlin builder");

    let compiler: Arc<dyn Compiler> = Arc::new(SubprocessCompiler::new(&config.kotlinc));
    let builder = Arc::new(KotlinBuilder::new(compiler));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let status = match run_worker("KotlinBuilder", &config, builder, args).await {
        Ok(status) => status,
        Err(e) => {
            error!(error = %e, "Worker failed");
            1
        }
    };
    std::process::exit(status)
}
