//! Command-line front door over the indexing service.

use std::process::ExitCode;
use std::sync::Arc;

use helicon::config::{AppConfig, DEFAULT_CONFIG_PATH};
use helicon::context::AppContext;
use helicon::error::Result;
use helicon::lifecycle;
use helicon::service::IndexingService;

const USAGE: &str = "usage: helicon <command>

commands:
  index                               full reindex of every configured site
  page <url>                          index a single page within the configured scope
  search <query> [site] [offset] [limit]
                                      ranked search; offset/limit 0 means unset
  stats                               per-site and total index statistics

configuration is read from helicon.json (HELICON_CONFIG overrides the path).";

#[tokio::main]
async fn main() -> ExitCode {
    lifecycle::init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{}", USAGE);
        return ExitCode::FAILURE;
    }

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &[String]) -> Result<()> {
    let config_path =
        std::env::var("HELICON_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load(&config_path)?;
    let context = Arc::new(AppContext::build(config).await?);
    let service = IndexingService::new(context);

    match args[0].as_str() {
        "index" => {
            service.start_crawl().await?;
            service.wait_until_idle().await;
            print_statistics(&service).await
        }
        "page" => {
            let url = args.get(1).map(String::as_str).unwrap_or_default();
            service.index_page(url).await?;
            println!("indexed {}", url);
            Ok(())
        }
        "search" => {
            let query = args.get(1).map(String::as_str).unwrap_or_default();
            let site = args.get(2).filter(|s| !s.is_empty()).map(String::as_str);
            let offset = parse_count(args.get(3))?;
            let limit = parse_count(args.get(4))?;

            let results = service.search(query, site, offset, limit).await?;
            if results.is_empty() {
                println!("no results");
                return Ok(());
            }
            for result in &results {
                println!(
                    "{:.3}  {}\n       {}",
                    result.relative, result.page.path, result.snippet
                );
            }
            Ok(())
        }
        "stats" => print_statistics(&service).await,
        other => {
            eprintln!("unknown command: {}\n\n{}", other, USAGE);
            Err(helicon::error::AppError::config(format!(
                "unknown command: {}",
                other
            )))
        }
    }
}

fn parse_count(arg: Option<&String>) -> Result<usize> {
    match arg {
        None => Ok(0),
        Some(raw) => raw
            .parse()
            .map_err(|_| helicon::error::AppError::config(format!("not a number: {}", raw))),
    }
}

async fn print_statistics(service: &IndexingService) -> Result<()> {
    let report = service.statistics().await?;
    println!(
        "sites: {}  pages: {}  lemmas: {}  indexing: {}",
        report.total.sites, report.total.pages, report.total.lemmas, report.total.is_indexing
    );
    for site in &report.detailed {
        println!(
            "  {} ({}) pages: {} lemmas: {}{}",
            site.url,
            site.status.as_str(),
            site.pages,
            site.lemmas,
            if site.error.is_empty() {
                String::new()
            } else {
                format!("  error: {}", site.error)
            }
        );
    }
    Ok(())
}
