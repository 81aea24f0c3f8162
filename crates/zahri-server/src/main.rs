use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;
use zahri_corpus::Corpus;
use zahri_text::CORPUS_CONTEXT_PADDING;

use zahri_server::{AppState, Persistence, router};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_ARTICLES_PATH: &str = "articles.json";
const MAX_LIMIT: usize = 500;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config();
    info!("binding to {}:{}", config.host, config.port);
    info!("using corpus at {}", config.articles_path.display());
    if config.persist {
        info!("edits are written back to the corpus file");
    }

    let start = Instant::now();
    let corpus = Arc::new(Corpus::load(&config.articles_path)?);
    info!("corpus loaded in {} ms", start.elapsed().as_millis());

    let state = AppState {
        corpus,
        max_limit: MAX_LIMIT,
        context_padding: config.context_padding,
        persistence: config
            .persist
            .then(|| Arc::new(Persistence::new(config.articles_path.clone()))),
    };

    let app = router(state).layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("invalid listen address");
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Clone)]
struct Config {
    host: String,
    port: u16,
    articles_path: PathBuf,
    persist: bool,
    context_padding: usize,
}

fn load_config() -> Config {
    let mut persist = false;
    let mut cli_articles: Option<PathBuf> = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--persist" => persist = true,
            "--articles" => {
                if let Some(path) = args.next() {
                    cli_articles = Some(PathBuf::from(path));
                }
            }
            _ => {
                if let Some(path) = arg.strip_prefix("--articles=") {
                    cli_articles = Some(PathBuf::from(path));
                }
            }
        }
    }

    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let articles_path = cli_articles
        .or_else(|| env::var("ARTICLES_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTICLES_PATH));
    let context_padding = env::var("CONTEXT_PADDING")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(CORPUS_CONTEXT_PADDING);

    Config {
        host,
        port,
        articles_path,
        persist,
        context_padding,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
