use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use astro_bridge::chart::{ChartProvider, HttpChartProvider};
use astro_bridge::config::{UpstreamConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use astro_bridge::models::ChartSubject;
use astro_bridge::render::{self, StyleTheme, ThemeName};
use astro_bridge::{api, mcp};

#[derive(Parser)]
#[command(name = "astro-bridge")]
#[command(about = "Natal + transit chart tools for AI assistants")]
struct Cli {
    #[command(flatten)]
    upstream: UpstreamArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Where the chart calculation API lives.
#[derive(Args)]
struct UpstreamArgs {
    /// Base URL of the calculation API
    #[arg(long, global = true, env = "ASTRO_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// API key sent as X-API-Key
    #[arg(long, global = true, env = "ASTRO_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Request timeout for the calculation API, in seconds
    #[arg(long, global = true, env = "ASTRO_API_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
}

impl UpstreamArgs {
    fn to_config(&self) -> UpstreamConfig {
        UpstreamConfig::new(self.api_url.clone(), self.api_key.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (REST endpoints plus MCP at /mcp)
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for HTTP API
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },
    /// Start MCP server via stdio
    Mcp,
    /// Render a combined chart from two resolved chart JSON files
    Render {
        /// Natal chart subject (JSON)
        #[arg(long)]
        natal: PathBuf,

        /// Transit chart subject (JSON)
        #[arg(long)]
        transit: PathBuf,

        /// Visual theme: classic or dark
        #[arg(long, default_value = "classic")]
        theme: String,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write {svg_base64, data_uri} JSON instead of SVG
        #[arg(long)]
        base64: bool,
    },
}

/// Initialize tracing with output to stderr (for MCP mode) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "astro_bridge=debug,tower_http=debug".into()),
    );

    if use_stderr {
        // MCP mode: log to stderr so stdout is clean for protocol
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn build_provider(upstream: &UpstreamArgs) -> anyhow::Result<Arc<dyn ChartProvider>> {
    let provider = HttpChartProvider::new(upstream.to_config())?;
    tracing::info!("Calculation API: {}", provider.config().base_url);
    Ok(Arc::new(provider))
}

async fn serve(upstream: &UpstreamArgs, host: &str, port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting astro-bridge server on port {}", port);

    let app = api::create_router(api::AppState::new(build_provider(upstream)?));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("astro-bridge listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}

fn read_subject(path: &Path) -> anyhow::Result<ChartSubject> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid chart JSON in {}", path.display()))
}

fn render_files(
    natal: &Path,
    transit: &Path,
    theme: &str,
    output: Option<&Path>,
    base64: bool,
) -> anyhow::Result<()> {
    let theme = ThemeName::from_str(theme)
        .with_context(|| format!("Unknown theme '{}'. Must be: classic or dark", theme))?;
    let theme = StyleTheme::named(theme);
    let natal = read_subject(natal)?;
    let transit = read_subject(transit)?;

    let document = if base64 {
        serde_json::to_string_pretty(&render::render_base64(&natal, &transit, &theme)?)?
    } else {
        render::render(&natal, &transit, &theme)?
    };

    match output {
        Some(path) => {
            std::fs::write(path, document)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Combined chart written to {}", path.display());
        }
        None => print!("{}", document),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // MCP and render modes keep stdout for their own output
    let use_stderr = matches!(
        cli.command,
        Some(Commands::Mcp) | Some(Commands::Render { .. })
    );
    init_tracing(use_stderr);

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            serve(&cli.upstream, &host, port).await?;
        }
        Some(Commands::Mcp) => {
            mcp::run_stdio_server(build_provider(&cli.upstream)?).await?;
        }
        Some(Commands::Render {
            natal,
            transit,
            theme,
            output,
            base64,
        }) => {
            render_files(&natal, &transit, &theme, output.as_deref(), base64)?;
        }
        None => {
            serve(&cli.upstream, "127.0.0.1", 8000).await?;
        }
    }

    Ok(())
}
