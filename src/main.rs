use resume_forge::config::Config;
use resume_forge::http::{build_router, new_app_state};
use resume_forge::logging::{init_logging, log_info, setup_panic_hook};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    init_logging();
    setup_panic_hook();

    let config = Config::load();
    let addr = format!("{}:{}", config.host, config.port);

    log_info("main", &format!("starting resume-forge on {}", addr));

    let state = match new_app_state(config) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            log::error!("[main] failed to initialize application state: {}", e);
            std::process::exit(1);
        }
    };

    let router = build_router(state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("[main] failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        log::error!("[main] server error: {}", e);
        std::process::exit(1);
    }
}
