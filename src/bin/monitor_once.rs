//! Run the monitor pipeline once and print the result as a plain table.

use brand_news_monitor::{
    init_tracing, ArticleFilter, FetchQuery, Monitor, MonitorConfig, MonitorOutcome,
    MonitorRequest,
};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "monitor-once", about = "Fetch, classify and list brand mentions once")]
struct Args {
    /// Config file (TOML or JSON); defaults to $MONITOR_CONFIG_PATH or config/monitor.toml
    #[arg(long, env = "MONITOR_CONFIG_PATH")]
    config: Option<std::path::PathBuf>,
    /// Search query (defaults to the configured one)
    #[arg(long)]
    query: Option<String>,
    /// Articles per source
    #[arg(long)]
    limit: Option<usize>,
    /// Language code, or "all"
    #[arg(long)]
    language: Option<String>,
    /// Country code, or "all"
    #[arg(long)]
    country: Option<String>,
    /// Keep only this model, or "all"
    #[arg(long)]
    model: Option<String>,
    /// Keep only this tone, or "all"
    #[arg(long)]
    tone: Option<String>,
    /// Send one webhook message per article
    #[arg(long)]
    notify: bool,
}

fn truncate(s: &str, n: usize) -> String {
    if s.chars().count() <= n {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(n.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();
    let args = Args::parse();

    let cfg = match &args.config {
        Some(p) => MonitorConfig::load_from_file(p)?,
        None => MonitorConfig::load_default()?,
    };

    let query = args.query.clone().unwrap_or_else(|| cfg.query.clone());
    let language = args.language.clone().or_else(|| cfg.language.clone());
    let country = args.country.clone().or_else(|| cfg.country.clone());
    let req = MonitorRequest {
        fetch: FetchQuery::new(query, args.limit.unwrap_or(cfg.max_results).max(1))
            .with_language(language.as_deref())
            .with_country(country.as_deref()),
        filter: ArticleFilter::new(args.model.as_deref(), args.tone.as_deref()),
        notify: args.notify,
    };

    let monitor = Monitor::from_config(&cfg);
    match monitor.run(&req).await {
        MonitorOutcome::NoResults => println!("No articles found."),
        MonitorOutcome::Articles { total, articles } => {
            println!(
                "{:<26} {:<12} {:<9} {:<60} {}",
                "date", "model", "tone", "title", "source"
            );
            for a in &articles {
                println!(
                    "{:<26} {:<12} {:<9} {:<60} {}",
                    truncate(&a.article.published_at, 26),
                    truncate(&a.model, 12),
                    truncate(&a.sentiment, 9),
                    truncate(&a.article.title, 60),
                    a.article.source_label
                );
            }
            println!("{} shown / {} fetched", articles.len(), total);
        }
    }
    Ok(())
}
