use crate::config::Config;
use crate::context::AppContext;
use crate::error::Result;
use crate::server;
use colored::Colorize;

fn print_banner(name: &str) {
    println!();
    println!("{}", format!("  {}", name.to_uppercase()).bold().cyan());
    println!("{}", "  Personal assistant backend".dimmed());
    println!();
}

/// Start all services and serve the HTTP API until shutdown
///
/// # Errors
///
/// Returns error if startup fails (invalid config, no LLM credential,
/// index build failure) or the listener cannot be bound
pub async fn run_serve(config: Config) -> Result<()> {
    print_banner(&config.assistant.name);
    let ctx = AppContext::startup(config).await?;
    println!(
        "{} API: {}",
        "->".green(),
        format!(
            "http://{}:{}",
            ctx.config.server.host, ctx.config.server.port
        )
        .cyan()
    );
    server::serve(ctx).await
}
