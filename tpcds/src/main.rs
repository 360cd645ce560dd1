use common::config::Settings;
use common::logging::init_tracing;
use std::process;
use tpcds::cli;

#[tokio::main]
async fn main() {
    let config = match cli::parse_arguments(std::env::args_os()) {
        Ok(config) => config,
        Err(e) => {
            let _ = e.print();
            process::exit(cli::exit_code(&e));
        }
    };

    let settings = match Settings::new() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load settings: {}", e);
            process::exit(1);
        }
    };

    init_tracing(&settings.log_format);

    if let Err(e) = tpcds::run(&config, &settings).await {
        tracing::error!(error = %e, "TPC-DS generation failed");
        eprintln!("TPC-DS generation error: {}", e);
        process::exit(1);
    }
}
