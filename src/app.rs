use crate::catalog::{Catalog, Movie, MovieQuery};
use crate::debounce::Debouncer;
use crate::error::TrendingError;
use crate::messages::{Message, MessageChannel};
use crate::trending::{TRENDING_LIMIT, TrendingEntry, TrendingStore};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Input mode for the search bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Where the current query cycle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPhase {
    Idle,
    Loading,
    Loaded,
    Empty,
    Failed,
}

impl QueryPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Empty => "no results",
            Self::Failed => "failed",
        }
    }
}

/// Everything the search screen renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub raw_query: String,
    pub debounced_query: String,
    pub is_loading: bool,
    pub error_message: String,
    pub movies: Vec<Movie>,
    pub trending: Vec<TrendingEntry>,
}

pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Main application state and the handlers that mutate it.
pub struct App {
    catalog: Arc<dyn Catalog>,
    trending_store: Arc<dyn TrendingStore>,

    state: SearchState,
    phase: QueryPhase,
    debouncer: Debouncer<String>,
    // Bumped on every query cycle; older results are dropped
    generation: u64,
    trending_generation: u64,
    mounted: bool,
    torn_down: bool,

    tx: UnboundedSender<Message>,
    rx: UnboundedReceiver<Message>,

    // UI state
    pub should_quit: bool,
    pub show_help: bool,
    pub input_mode: InputMode,
    pub selected: usize,
    pub spinner_frame: usize,
}

impl App {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        trending_store: Arc<dyn TrendingStore>,
        quiet_period: Duration,
    ) -> Self {
        let MessageChannel { tx, rx } = MessageChannel::new();
        Self {
            catalog,
            trending_store,
            state: SearchState::default(),
            phase: QueryPhase::Idle,
            debouncer: Debouncer::new(quiet_period),
            generation: 0,
            trending_generation: 0,
            mounted: false,
            torn_down: false,
            tx,
            rx,
            should_quit: false,
            show_help: false,
            input_mode: InputMode::Editing,
            selected: 0,
            spinner_frame: 0,
        }
    }

    /// Read-only view of the state for rendering.
    pub fn snapshot(&self) -> &SearchState {
        &self.state
    }

    pub fn phase(&self) -> QueryPhase {
        self.phase
    }

    /// First activation: load the initial listing and the trending list.
    pub fn mount(&mut self) {
        if self.mounted || self.torn_down {
            return;
        }
        self.mounted = true;
        let initial = self.state.debounced_query.clone();
        self.start_query_cycle(initial);
        self.reload_trending();
    }

    /// Tear down: pending input is dropped and late results are ignored.
    pub fn shutdown(&mut self) {
        self.debouncer.cancel();
        self.rx.close();
        self.torn_down = true;
    }

    // ── Input ──

    pub fn input_char(&mut self, c: char, now: Instant) {
        self.state.raw_query.push(c);
        self.debouncer.push(self.state.raw_query.clone(), now);
    }

    pub fn input_backspace(&mut self, now: Instant) {
        if self.state.raw_query.pop().is_some() {
            self.debouncer.push(self.state.raw_query.clone(), now);
        }
    }

    pub fn clear_query(&mut self, now: Instant) {
        if !self.state.raw_query.is_empty() {
            self.state.raw_query.clear();
            self.debouncer.push(String::new(), now);
        }
    }

    /// Advance timers: emit a settled query and spin the loading indicator.
    pub fn tick(&mut self, now: Instant) {
        if let Some(query) = self.debouncer.poll(now) {
            self.set_debounced_query(query);
        }
        if self.state.is_loading {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        }
    }

    /// When the event loop must wake up next for the debouncer.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Apply a settled query. Starts a new cycle only if it changed.
    pub fn set_debounced_query(&mut self, query: String) {
        if self.torn_down {
            return;
        }
        if query == self.state.debounced_query && self.generation > 0 {
            return;
        }
        self.start_query_cycle(query);
    }

    fn start_query_cycle(&mut self, query: String) {
        self.generation += 1;
        self.state.debounced_query = query.clone();
        self.state.is_loading = true;
        self.state.error_message.clear();
        self.phase = QueryPhase::Loading;

        let generation = self.generation;
        let catalog = Arc::clone(&self.catalog);
        let tx = self.tx.clone();
        tracing::debug!(generation, query = %query, "starting query cycle");
        tokio::spawn(async move {
            let outcome = catalog.fetch_movies(&MovieQuery::from_term(&query)).await;
            let _ = tx.send(Message::MoviesLoaded {
                generation,
                query,
                outcome,
            });
        });
    }

    /// Request the trending list. Failures never reach the screen, and only
    /// the answer to the latest request is applied.
    pub fn reload_trending(&mut self) {
        self.trending_generation += 1;
        let generation = self.trending_generation;
        let store = Arc::clone(&self.trending_store);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = store.top_searches(TRENDING_LIMIT).await;
            let _ = tx.send(Message::TrendingLoaded {
                generation,
                outcome,
            });
        });
    }

    /// Reload the trending list and wait for the answer, handing the
    /// failure back instead of only logging it.
    pub async fn refresh_trending(&mut self) -> Result<(), TrendingError> {
        self.reload_trending();
        let latest = self.trending_generation;
        while let Some(message) = self.next_message().await {
            match message {
                Message::TrendingLoaded {
                    generation,
                    outcome: Err(e),
                } if generation == latest => {
                    tracing::warn!(error = %e, "error fetching trending movies");
                    return Err(e);
                }
                other => {
                    let answered = matches!(
                        &other,
                        Message::TrendingLoaded { generation, .. } if *generation == latest
                    );
                    self.handle_message(other);
                    if answered {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn record_search(&self, term: String, movie: Movie) {
        let store = Arc::clone(&self.trending_store);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = store.record_search(&term, &movie).await;
            let _ = tx.send(Message::SearchRecorded { term, outcome });
        });
    }

    // ── Messages ──

    /// Apply every result that has arrived so far. Returns true if any did.
    pub fn drain_messages(&mut self) -> bool {
        let mut any = false;
        while let Ok(message) = self.rx.try_recv() {
            self.handle_message(message);
            any = true;
        }
        any
    }

    /// Wait for the next result. `None` once the app has shut down.
    pub async fn next_message(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    pub fn handle_message(&mut self, message: Message) {
        tracing::trace!(message = message.name(), "handling message");
        match message {
            Message::MoviesLoaded {
                generation,
                query,
                outcome,
            } => {
                if generation != self.generation {
                    tracing::debug!(generation, latest = self.generation, query = %query, "discarding stale result");
                    return;
                }
                self.state.is_loading = false;
                match outcome {
                    Ok(movies) => {
                        tracing::debug!(query = %query, count = movies.len(), "movies loaded");
                        self.state.error_message.clear();
                        self.phase = if movies.is_empty() {
                            QueryPhase::Empty
                        } else {
                            QueryPhase::Loaded
                        };
                        if !query.is_empty() {
                            if let Some(first) = movies.first() {
                                self.record_search(query, first.clone());
                            }
                        }
                        self.state.movies = movies;
                        self.selected = 0;
                    }
                    Err(e) => {
                        tracing::warn!(query = %query, transport = e.is_transport(), error = %e, "error fetching movies");
                        self.state.error_message = e.user_message();
                        self.state.movies.clear();
                        self.selected = 0;
                        self.phase = QueryPhase::Failed;
                    }
                }
            }
            Message::TrendingLoaded { generation, .. } if generation != self.trending_generation => {
                tracing::debug!(generation, latest = self.trending_generation, "discarding stale trending list");
            }
            Message::TrendingLoaded {
                outcome: Ok(entries),
                ..
            } => {
                tracing::info!(count = entries.len(), "trending searches loaded");
                self.state.trending = entries;
            }
            Message::TrendingLoaded { outcome: Err(e), .. } => {
                tracing::warn!(error = %e, "error fetching trending movies");
            }
            Message::SearchRecorded { term, outcome } => match outcome {
                Ok(entry) => {
                    tracing::debug!(term = %term, count = entry.count, "search count updated");
                }
                Err(e) => {
                    tracing::warn!(term = %term, error = %e, "error updating search count");
                }
            },
        }
    }

    // ── Selection ──

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.state.movies.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_movie(&self) -> Option<&Movie> {
        self.state.movies.get(self.selected)
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }
}
