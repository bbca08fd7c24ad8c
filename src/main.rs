mod app;
mod catalog;
mod config;
mod debounce;
mod error;
mod logging;
mod messages;
mod trending;
mod ui;

use app::{App, InputMode};
use catalog::{Catalog, TmdbClient};
use clap::{Parser, Subcommand};
use config::Settings;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::Arc;
use std::time::{Duration, Instant};
use trending::{AppwriteStore, TrendingStore};

/// Search movies and see what everyone else is searching for
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    settings: Settings,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive search (default)
    Run,
    /// Search once and print the results
    Search {
        /// Search terms; leave empty to list popular movies
        query: Vec<String>,
    },
    /// Print the most searched terms
    Trending,
}

// Upper bound on how long the loop waits for input; keeps the spinner moving.
const TICK_RATE: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = cli.settings;
    settings.validate()?;
    logging::init_logging(settings.log_path().as_deref(), &settings.log_level);

    let catalog: Arc<dyn Catalog> = Arc::new(TmdbClient::new(
        &settings.api_base_url,
        &settings.api_key,
    ));
    let store: Arc<dyn TrendingStore> = Arc::new(AppwriteStore::new(settings.appwrite()));
    let mut app = App::new(catalog, store, settings.debounce());

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            tracing::info!("starting interactive session");
            let mut terminal = ratatui::init();

            app.mount();
            let result = run_app(&mut terminal, &mut app);
            app.shutdown();

            // Restore terminal
            ratatui::restore();

            if let Err(e) = result {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Search { query } => {
            run_search(&mut app, query.join(" ")).await;
        }
        Commands::Trending => {
            print_trending(&mut app).await;
        }
    }

    Ok(())
}

fn run_app(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| ui::render(app, frame))?;

        if app.should_quit {
            return Ok(());
        }

        // Wake up early if a typed query is about to settle
        let timeout = app
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .map_or(TICK_RATE, |until| until.min(TICK_RATE));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key(app, key, Instant::now());
                }
                _ => {}
            }
        }

        app.tick(Instant::now());
        app.drain_messages();
    }
}

fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // If help is showing, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match app.input_mode {
        InputMode::Editing => handle_search_input(app, key, now),
        InputMode::Normal => handle_normal_key(app, key, now),
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.input_backspace(now);
        }
        KeyCode::Down => {
            app.select_next();
        }
        KeyCode::Up => {
            app.select_prev();
        }
        KeyCode::Char(c) => {
            app.input_char(c, now);
        }
        _ => {}
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Char('?') => {
            app.show_help = true;
        }
        KeyCode::Char('/') | KeyCode::Char('i') => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.select_next();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.select_prev();
        }
        KeyCode::Char('r') => {
            app.reload_trending();
        }
        KeyCode::Esc => {
            app.clear_query(now);
        }
        _ => {}
    }
}

/// One-shot search for scripting: prints one movie per line.
async fn run_search(app: &mut App, query: String) {
    app.set_debounced_query(query.clone());
    while app.snapshot().is_loading {
        match app.next_message().await {
            Some(message) => app.handle_message(message),
            None => break,
        }
    }

    let state = app.snapshot();
    if !state.error_message.is_empty() {
        eprintln!("Error: {}", state.error_message);
        std::process::exit(1);
    }
    if state.movies.is_empty() {
        eprintln!("No movies found");
        return;
    }
    for movie in &state.movies {
        let year = movie
            .release_year()
            .map(|y| y.to_string())
            .unwrap_or_else(|| "----".to_string());
        println!("{:>8}  {}  {}", movie.id, year, movie.title);
    }

    // Let the search-count update finish before the runtime goes away
    if !query.is_empty() {
        if let Some(message) = app.next_message().await {
            app.handle_message(message);
        }
    }
}

async fn print_trending(app: &mut App) {
    if let Err(e) = app.refresh_trending().await {
        eprintln!("Error: could not load trending searches: {e}");
        std::process::exit(1);
    }

    let trending = &app.snapshot().trending;
    if trending.is_empty() {
        eprintln!("No trending searches");
        return;
    }
    for (rank, entry) in trending.iter().enumerate() {
        println!("{:>2}. {} ({})", rank + 1, entry.search_term, entry.count);
    }
}
