//! Cheemera explore proxy
//!
//! Forwards front-end explore requests to the reasoning service.

use cheemera::proxy::{self, ProxyConfig};
use tracing_subscriber::EnvFilter;

fn parse_args() -> ProxyConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = ProxyConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" | "-p" => {
                if i + 1 < args.len() {
                    let port: u16 = args[i + 1].parse().unwrap_or_else(|_| {
                        eprintln!("error: invalid port number: {}", args[i + 1]);
                        std::process::exit(1);
                    });
                    config.bind.set_port(port);
                    i += 2;
                } else {
                    eprintln!("error: --port requires a value");
                    std::process::exit(1);
                }
            }
            "--upstream" | "-u" => {
                if i + 1 < args.len() {
                    config.upstream = args[i + 1].clone();
                    i += 2;
                } else {
                    eprintln!("error: --upstream requires a value");
                    std::process::exit(1);
                }
            }
            "--timeout-ms" => {
                if i + 1 < args.len() {
                    config.timeout_ms = args[i + 1].parse().unwrap_or_else(|_| {
                        eprintln!("error: invalid timeout: {}", args[i + 1]);
                        std::process::exit(1);
                    });
                    i += 2;
                } else {
                    eprintln!("error: --timeout-ms requires a value");
                    std::process::exit(1);
                }
            }
            "--help" | "-h" => {
                println!("cheemera-proxy - Cheemera explore proxy");
                println!();
                println!("USAGE:");
                println!("    cheemera-proxy [OPTIONS]");
                println!();
                println!("OPTIONS:");
                println!("    -p, --port <PORT>         Port to listen on [default: 3000]");
                println!("    -u, --upstream <URL>      Reasoning service url [default: http://localhost:3001]");
                println!("        --timeout-ms <MS>     Upstream request timeout [default: 30000]");
                println!("    -h, --help                Print help information");
                std::process::exit(0);
            }
            arg => {
                eprintln!("error: unknown argument: {arg}");
                std::process::exit(1);
            }
        }
    }

    config
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = parse_args();
    proxy::serve(config, async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutting down");
    })
    .await?;

    Ok(())
}
