use crate::core::{HomeEntry, MeloraCore, Screen};
use crate::format;
use crate::links;
use crate::palette::HexColor;
use crate::stats::StatsSummary;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

const APP_TITLE_WITH_VERSION: &str = concat!("Melora v", env!("CARGO_PKG_VERSION"), "  ");
const SPLASH_TEXT: &str = "Let's discover with Melora";
const CHART_BAR_WIDTH: usize = 24;

#[derive(Clone, Copy)]
struct ThemePalette {
    bg: Color,
    panel_bg: Color,
    panel_alt_bg: Color,
    border: Color,
    text: Color,
    muted: Color,
    accent: Color,
    alert: Color,
    item_bg: Color,
    selected_bg: Color,
}

const PALETTE: ThemePalette = ThemePalette {
    bg: Color::Rgb(18, 18, 18),
    panel_bg: Color::Rgb(28, 28, 28),
    panel_alt_bg: Color::Rgb(36, 24, 66),
    border: Color::Rgb(94, 22, 236),
    text: Color::Rgb(255, 255, 255),
    muted: Color::Rgb(136, 136, 136),
    accent: Color::Rgb(52, 232, 158),
    alert: Color::Rgb(255, 68, 68),
    item_bg: Color::Rgb(87, 93, 157),
    selected_bg: Color::Rgb(60, 30, 140),
};

pub fn draw(frame: &mut Frame, core: &MeloraCore, command_buffer: &str, command_mode: bool) {
    let colors = PALETTE;
    frame.render_widget(
        Block::default().style(Style::default().bg(colors.bg)),
        frame.area(),
    );

    if core.screen == Screen::Splash {
        draw_splash(frame, &colors);
        return;
    }

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            APP_TITLE_WITH_VERSION,
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(core.screen.label(), Style::default().fg(colors.text)),
        Span::styled("  |  ", Style::default().fg(colors.muted)),
        Span::styled(
            format!("Device {}", core.device),
            Style::default().fg(colors.muted),
        ),
    ]))
    .block(panel_block(
        "Status",
        colors.panel_bg,
        colors.text,
        colors.border,
    ));
    frame.render_widget(header, vertical[0]);

    match core.screen {
        Screen::Splash => {}
        Screen::Home => draw_home(frame, core, vertical[1], &colors),
        Screen::History => draw_history(frame, core, vertical[1], &colors),
        Screen::Detail => draw_detail(frame, core, vertical[1], &colors),
        Screen::NotFound => draw_not_found(frame, vertical[1], &colors),
        Screen::Stats => draw_stats(frame, core, vertical[1], &colors),
    }

    let footer_text = if command_mode {
        Line::from(vec![
            Span::styled(":", Style::default().fg(colors.accent)),
            Span::styled(command_buffer, Style::default().fg(colors.text)),
        ])
    } else {
        Line::from(vec![
            Span::styled(key_hints(core.screen), Style::default().fg(colors.muted)),
            Span::styled("  |  ", Style::default().fg(colors.muted)),
            Span::styled(core.status.as_str(), Style::default().fg(colors.text)),
        ])
    };
    let footer = Paragraph::new(footer_text).block(panel_block(
        "Message",
        colors.panel_bg,
        colors.text,
        colors.border,
    ));
    frame.render_widget(footer, vertical[2]);
}

fn key_hints(screen: Screen) -> &'static str {
    match screen {
        Screen::Splash => "Any key to continue",
        Screen::Home => "Keys: Enter open, s stats, h history, : command, q quit",
        Screen::History => "Keys: Enter open, x clear history, Backspace back, q quit",
        Screen::Detail => "Keys: 1-4 open link, c copy info, Backspace back, q quit",
        Screen::NotFound => "Keys: Enter home, q quit",
        Screen::Stats => "Keys: r refresh, p chart colors, Backspace back, q quit",
    }
}

fn draw_splash(frame: &mut Frame, colors: &ThemePalette) {
    let area = centered_rect(frame.area(), 60, 20);
    let splash = Paragraph::new(Line::from(Span::styled(
        SPLASH_TEXT,
        Style::default()
            .fg(colors.text)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.border))
            .style(Style::default().bg(colors.panel_alt_bg)),
    );
    frame.render_widget(splash, area);
}

fn draw_home(frame: &mut Frame, core: &MeloraCore, area: Rect, colors: &ThemePalette) {
    let items: Vec<ListItem> = HomeEntry::ALL
        .iter()
        .map(|entry| {
            ListItem::new(Span::styled(
                entry.label(),
                Style::default().fg(colors.text),
            ))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(core.selected_home));

    let list = List::new(items)
        .block(panel_block(
            "Home",
            colors.panel_bg,
            colors.text,
            colors.border,
        ))
        .highlight_style(selected_style(colors))
        .highlight_symbol("-> ");
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_history(frame: &mut Frame, core: &MeloraCore, area: Rect, colors: &ThemePalette) {
    if core.history.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "You have no history",
            Style::default()
                .fg(colors.text)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .block(panel_block(
            "History",
            colors.panel_bg,
            colors.text,
            colors.border,
        ));
        frame.render_widget(empty, area);
        return;
    }

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    let items: Vec<ListItem> = core
        .history
        .iter()
        .map(|record| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    record.title.as_str(),
                    Style::default()
                        .fg(colors.text)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    record.artist.as_str(),
                    Style::default().fg(colors.text),
                )),
                Line::from(Span::styled(
                    format::history_timestamp(record.created_at, core.offset),
                    Style::default().fg(colors.muted),
                )),
            ])
            .style(Style::default().bg(colors.item_bg))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(core.selected_history));

    let list = List::new(items)
        .block(panel_block(
            &format!("History ({})", core.history.len()),
            colors.panel_bg,
            colors.text,
            colors.border,
        ))
        .highlight_style(selected_style(colors))
        .highlight_symbol("-> ");
    frame.render_stateful_widget(list, body[0], &mut state);

    let preview = core
        .selected_record()
        .map(|record| {
            vec![
                field_line("Album", record.album.as_deref(), colors),
                field_line("Genre", record.genre.as_deref(), colors),
                field_line("Released", record.release_date.as_deref(), colors),
                field_line("Art", record.album_art_url.as_deref(), colors),
            ]
        })
        .unwrap_or_default();
    let preview_block = Paragraph::new(preview)
        .block(panel_block(
            "Selected",
            colors.panel_alt_bg,
            colors.text,
            colors.border,
        ))
        .wrap(Wrap { trim: true });
    frame.render_widget(preview_block, body[1]);
}

fn draw_detail(frame: &mut Frame, core: &MeloraCore, area: Rect, colors: &ThemePalette) {
    let Some(record) = core.detail.as_ref() else {
        draw_not_found(frame, area, colors);
        return;
    };

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let album_art = links::album_art_source(record);
    let mut info = vec![
        Line::from(Span::styled(
            record.title.as_str(),
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        )),
        field_line("Artist", Some(record.artist.as_str()), colors),
        field_line("Album", record.album.as_deref(), colors),
        field_line("Release Date", record.release_date.as_deref(), colors),
        field_line("Genre", record.genre.as_deref(), colors),
        field_line(
            "Searched",
            Some(format::history_timestamp(record.created_at, core.offset).as_str()),
            colors,
        ),
        Line::from(Span::styled(
            album_art.unwrap_or_else(|| String::from("No Image Available")),
            Style::default().fg(colors.muted),
        )),
        Line::from(""),
    ];
    if record.preview_url.is_some() {
        info.push(Line::from(Span::styled(
            "Preview available",
            Style::default().fg(colors.accent),
        )));
    }
    for (idx, link) in core.detail_links().iter().enumerate() {
        info.push(Line::from(vec![
            Span::styled(
                format!("{} ", idx + 1),
                Style::default()
                    .fg(colors.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(link.label, Style::default().fg(colors.text)),
        ]));
    }

    let info_block = Paragraph::new(info)
        .block(panel_block(
            "Song",
            colors.panel_bg,
            colors.text,
            colors.border,
        ))
        .wrap(Wrap { trim: true });
    frame.render_widget(info_block, body[0]);

    let mut lyrics_text = Text::from(links::lyrics_or_placeholder(record));
    if let Some(url) = links::lyrics_lookup_hint(record) {
        lyrics_text.push_line(Line::from(""));
        lyrics_text.push_line(Line::from(Span::styled(
            format!("Try {url}"),
            Style::default().fg(colors.muted),
        )));
    }
    let lyrics = Paragraph::new(lyrics_text)
        .style(Style::default().fg(colors.text))
        .block(panel_block(
            "Lyrics",
            colors.panel_alt_bg,
            colors.text,
            colors.border,
        ))
        .wrap(Wrap { trim: false });
    frame.render_widget(lyrics, body[1]);
}

fn draw_not_found(frame: &mut Frame, area: Rect, colors: &ThemePalette) {
    frame.render_widget(Clear, area);
    let text = vec![
        Line::from(Span::styled(
            "Song not found",
            Style::default()
                .fg(colors.alert)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to go home and try again",
            Style::default().fg(colors.muted),
        )),
    ];
    let block = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(panel_block(
            "Not Found",
            colors.panel_bg,
            colors.text,
            colors.border,
        ));
    frame.render_widget(block, area);
}

fn draw_stats(frame: &mut Frame, core: &MeloraCore, area: Rect, colors: &ThemePalette) {
    let empty = StatsSummary::empty();
    let summary = core.summary.as_ref().unwrap_or(&empty);

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(4)])
        .split(area);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Most Searched Song  ", Style::default().fg(colors.muted)),
            Span::styled(
                summary.most_searched_title.as_str(),
                Style::default()
                    .fg(colors.text)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Number of Searches  ", Style::default().fg(colors.muted)),
            Span::styled(
                summary.search_count.to_string(),
                Style::default().fg(colors.text),
            ),
        ]),
    ];
    if let Some(date) = summary.last_searched_date.as_deref() {
        lines.push(Line::from(vec![
            Span::styled("Last Searched       ", Style::default().fg(colors.muted)),
            Span::styled(date, Style::default().fg(colors.text)),
        ]));
    }
    if let Some(recent) = summary.most_recent.as_ref() {
        lines.push(Line::from(vec![
            Span::styled("Recently Searched   ", Style::default().fg(colors.muted)),
            Span::styled(
                format!("{} by {}", recent.title, recent.artist),
                Style::default().fg(colors.text),
            ),
        ]));
    }
    let overview = Paragraph::new(lines)
        .block(panel_block(
            "Your Music Stats",
            colors.panel_bg,
            colors.text,
            colors.border,
        ))
        .wrap(Wrap { trim: true });
    frame.render_widget(overview, body[0]);

    let chart = Paragraph::new(genre_chart_lines(summary, colors)).block(panel_block(
        &format!("Most Searched Genres ({})", core.color_strategy.label()),
        colors.panel_alt_bg,
        colors.text,
        colors.border,
    ));
    frame.render_widget(chart, body[1]);
}

fn genre_chart_lines(summary: &StatsSummary, colors: &ThemePalette) -> Vec<Line<'static>> {
    if summary.genre_distribution.is_empty() {
        return vec![Line::from(Span::styled(
            "No searches yet",
            Style::default().fg(colors.muted),
        ))];
    }

    let total = summary.genre_total();
    summary
        .genre_distribution
        .iter()
        .map(|slice| {
            let share = slice.share_percent(total);
            Line::from(vec![
                Span::styled(
                    share_bar(share, CHART_BAR_WIDTH),
                    Style::default().fg(chart_color(slice.color)),
                ),
                Span::styled(
                    format!(" {:>3} {:>5.1}%  ", slice.count, share),
                    Style::default().fg(colors.muted),
                ),
                Span::styled(slice.genre.clone(), Style::default().fg(colors.text)),
            ])
        })
        .collect()
}

fn chart_color(color: HexColor) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

fn share_bar(percent: f64, width: usize) -> String {
    let filled = ((percent / 100.0).clamp(0.0, 1.0) * width as f64).round() as usize;
    let mut bar = String::with_capacity(width * 3);
    bar.push_str(&"█".repeat(filled));
    bar.push_str(&"·".repeat(width.saturating_sub(filled)));
    bar
}

fn field_line(label: &str, value: Option<&str>, colors: &ThemePalette) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(colors.muted)),
        Span::styled(
            value
                .filter(|value| !value.is_empty())
                .unwrap_or("-")
                .to_string(),
            Style::default().fg(colors.text),
        ),
    ])
}

fn selected_style(colors: &ThemePalette) -> Style {
    Style::default()
        .bg(colors.selected_bg)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

fn panel_block(title: &str, bg: Color, text: Color, border: Color) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(text).add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(bg))
}

fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
