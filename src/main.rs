use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use fanzone_search::{SearchConfig, SearchCoordinator, SearchResult, SearchSnapshot};

const HELP: &str = "Type to search. Commands: :more :next :prev :open :clear-cache :quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with results
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = SearchConfig::from_env();
    info!("Starting fanzone search");
    info!("API URL: {}", config.api_url);
    info!("Cache file: {}", config.cache_path.display());

    let coordinator = SearchCoordinator::from_config(&config)?;

    let mut updates = coordinator.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snap = updates.borrow_and_update().clone();
            if !snap.loading {
                render(&snap);
            }
        }
    });

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            ":quit" | ":q" => break,
            ":help" => println!("{}", HELP),
            ":more" => {
                let coordinator = coordinator.clone();
                tokio::spawn(async move { coordinator.load_more().await });
            }
            ":next" => coordinator.select_next(),
            ":prev" => coordinator.select_previous(),
            ":open" => match coordinator.selected_result() {
                Some(result) => print_detail(&result),
                None => println!("Nothing selected"),
            },
            ":clear-cache" => {
                coordinator.cache().clear();
                println!("Search cache cleared");
            }
            _ => coordinator.handle_search(&line),
        }
    }

    Ok(())
}

fn render(snap: &SearchSnapshot) {
    if snap.search.trim().is_empty() {
        return;
    }
    if let Some(error) = &snap.error {
        println!("! {}", error);
    }
    println!(
        "'{}' page {}{}",
        snap.search.trim(),
        snap.current_page,
        if snap.has_more { " (:more for next page)" } else { "" }
    );
    for (i, result) in snap.results.iter().enumerate() {
        let marker = if snap.selected_index == Some(i) { '>' } else { ' ' };
        println!(
            "{} {:>3}. {} [{}] ♥{} 💬{}",
            marker,
            i + 1,
            result.title,
            result.author_name.as_deref().unwrap_or("unknown"),
            result.like_count,
            result.comment_count
        );
    }
}

fn print_detail(result: &SearchResult) {
    println!("**{}**", result.title);
    println!(
        "by {} · {} · views {}",
        result.author_name.as_deref().unwrap_or("unknown"),
        result.created_at,
        result.view_count
    );
    println!("{}", result.content.chars().take(500).collect::<String>());
}
