use crate::catalog::Movie;
use crate::error::{CatalogError, TrendingError};
use crate::trending::TrendingEntry;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Results sent from request tasks back to the event loop.
#[derive(Debug)]
pub enum Message {
    /// A catalog request finished. `generation` is the query cycle it was started in.
    MoviesLoaded {
        generation: u64,
        query: String,
        outcome: Result<Vec<Movie>, CatalogError>,
    },

    /// The trending list read finished. `generation` is the reload it answers.
    TrendingLoaded {
        generation: u64,
        outcome: Result<Vec<TrendingEntry>, TrendingError>,
    },

    /// A search-count increment finished
    SearchRecorded {
        term: String,
        outcome: Result<TrendingEntry, TrendingError>,
    },
}

impl Message {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MoviesLoaded { .. } => "MoviesLoaded",
            Self::TrendingLoaded { .. } => "TrendingLoaded",
            Self::SearchRecorded { .. } => "SearchRecorded",
        }
    }
}

/// Both ends of the event-loop channel.
pub struct MessageChannel {
    pub tx: UnboundedSender<Message>,
    pub rx: UnboundedReceiver<Message>,
}

impl MessageChannel {
    pub fn new() -> Self {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for MessageChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_delivers_in_order() {
        let mut channel = MessageChannel::new();
        channel
            .tx
            .send(Message::TrendingLoaded {
                generation: 1,
                outcome: Ok(Vec::new()),
            })
            .unwrap();
        channel
            .tx
            .send(Message::MoviesLoaded {
                generation: 1,
                query: String::new(),
                outcome: Ok(Vec::new()),
            })
            .unwrap();

        assert_eq!(channel.rx.try_recv().unwrap().name(), "TrendingLoaded");
        assert_eq!(channel.rx.try_recv().unwrap().name(), "MoviesLoaded");
        assert!(channel.rx.try_recv().is_err());
    }
}
