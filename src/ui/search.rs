use crate::app::{App, InputMode};
use crate::catalog::Movie;
use crate::trending::TrendingEntry;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();
    let state = app.snapshot();

    // Layout: header(3) + search(3) + trending(3) + results(min) + status(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    // ── Header ──
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " Find Movies",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            " You'll Enjoy Without the Hassle",
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .alignment(Alignment::Left)
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(header, chunks[0]);

    // ── Search bar ──
    let search_style = match app.input_mode {
        InputMode::Editing => Style::default().fg(Color::Yellow),
        InputMode::Normal => Style::default().fg(Color::DarkGray),
    };
    let search_label = " 🔍 ";
    let search_text = if state.raw_query.is_empty() && app.input_mode == InputMode::Normal {
        format!("{}Search through thousands of movies (/)", search_label)
    } else {
        format!("{}{}", search_label, state.raw_query)
    };
    let search_bar = Paragraph::new(search_text).style(search_style).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(search_style)
            .title(" Search "),
    );
    frame.render_widget(search_bar, chunks[1]);

    if app.input_mode == InputMode::Editing {
        let cursor_x = cursor_column(chunks[1], search_label, &state.raw_query);
        frame.set_cursor_position((cursor_x, chunks[1].y + 1));
    }

    // ── Trending ──
    render_trending(&state.trending, frame, chunks[2]);

    // ── Results ──
    let results = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[3]);

    let title = if state.debounced_query.is_empty() {
        " All Movies ".to_string()
    } else {
        format!(" Results for \"{}\" ", state.debounced_query)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title);

    if state.is_loading {
        let spinner = Paragraph::new(format!("{} Loading...", app.spinner()))
            .style(Style::default().fg(Color::Cyan))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(spinner, chunks[3]);
    } else if !state.error_message.is_empty() {
        let error = Paragraph::new(state.error_message.as_str())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(error, chunks[3]);
    } else {
        render_movies(app, frame, results[0], block);
        render_detail(app.selected_movie(), frame, results[1]);
    }

    // ── Status bar ──
    let key = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let status_line = Line::from(vec![
        Span::styled(" /", key),
        Span::raw(" Search  "),
        Span::styled("↑↓", key),
        Span::raw(" Navigate  "),
        Span::styled("r", key),
        Span::raw(" Refresh trending  "),
        Span::styled("?", key),
        Span::raw(" Help  "),
        Span::styled("q", key),
        Span::raw(" Quit  "),
        Span::styled(
            format!("{} movies ({})", state.movies.len(), app.phase().label()),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(status_line), chunks[4]);
}

fn render_trending(trending: &[TrendingEntry], frame: &mut Frame, area: Rect) {
    let mut spans = Vec::new();
    if trending.is_empty() {
        spans.push(Span::styled(
            "No trending searches yet",
            Style::default().fg(Color::DarkGray),
        ));
    }
    for (rank, entry) in trending.iter().enumerate() {
        spans.push(Span::styled(
            format!(" {} ", rank + 1),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!("{} ", entry.search_term)));
        spans.push(Span::styled(
            format!("({})  ", entry.count),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let widget = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Trending Movies "),
    );
    frame.render_widget(widget, area);
}

fn render_movies(app: &App, frame: &mut Frame, area: Rect, block: Block) {
    let state = app.snapshot();
    if state.movies.is_empty() {
        let empty = Paragraph::new("No movies found")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let title_width = (area.width as usize).saturating_sub(24);
    let items: Vec<ListItem> = state
        .movies
        .iter()
        .map(|movie| ListItem::new(movie_line(movie, title_width)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    let mut list_state = ListState::default();
    list_state.select(Some(app.selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn movie_line(movie: &Movie, title_width: usize) -> Line<'static> {
    let rating = movie
        .vote_average
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| "N/A".to_string());
    let year = movie
        .release_year()
        .map(|y| y.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let lang = movie.original_language.clone().unwrap_or_default();

    Line::from(vec![
        Span::raw(truncate_str(&movie.title, title_width)),
        Span::styled(format!("  ★ {}", rating), Style::default().fg(Color::Yellow)),
        Span::styled(
            format!(" • {} • {}", lang, year),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn render_detail(movie: Option<&Movie>, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Selected ");
    let Some(movie) = movie else {
        frame.render_widget(block, area);
        return;
    };

    let label = Style::default().fg(Color::DarkGray);
    let lines = vec![
        Line::from(Span::styled(
            movie.title.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("ID: ", label),
            Span::raw(movie.id.to_string()),
            Span::styled("  Popularity: ", label),
            Span::raw(format!("{:.1}", movie.popularity)),
        ]),
        Line::from(vec![
            Span::styled("Released: ", label),
            Span::raw(movie.release_date.clone().unwrap_or_default()),
        ]),
        Line::from(vec![
            Span::styled("Poster: ", label),
            Span::styled(
                crate::trending::poster_url(movie),
                Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
            ),
        ]),
        Line::from(""),
        Line::from(movie.overview.clone().unwrap_or_default()),
    ];

    let detail = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
    frame.render_widget(detail, area);
}

/// Column for the input cursor, kept inside the bordered search box.
fn cursor_column(area: Rect, label: &str, query: &str) -> u16 {
    let typed = label.width().saturating_add(query.width());
    let typed = u16::try_from(typed).unwrap_or(u16::MAX);
    let last = area.right().saturating_sub(2).max(area.x);
    area.x.saturating_add(1).saturating_add(typed).min(last)
}

/// Truncate a string to `max_width` display columns, adding "…" if truncated.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let budget = max_width.saturating_sub(1);
    let mut used = 0;
    let mut result = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        result.push(c);
    }
    result.push('…');
    result
}
