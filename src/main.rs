//! Quiz Rush entry point
//!
//! Native builds run the question-generation service. The browser build is a
//! library (`quiz_rush::web`), so the wasm binary has nothing to do here.

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() {
    use env_logger::Env;
    use quiz_rush::server::{self, ServerConfig};

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    log::info!("Quiz Rush service starting...");

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = server::run(config).await {
        log::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is quiz_rush::web::wasm_start, this is just to satisfy the compiler
}
