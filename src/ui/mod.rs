mod help;
mod search;

use crate::app::App;
use ratatui::Frame;

/// Top-level render. Reads the app state, never changes it.
pub fn render(app: &App, frame: &mut Frame) {
    search::render(app, frame);

    // Render help overlay on top if active
    if app.show_help {
        help::render(frame);
    }
}
