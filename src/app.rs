use crate::config;
use crate::core::{MeloraCore, SPLASH_DURATION, Screen};
use crate::history::HistoryStore;
use crate::links;
use crate::model::Settings;
use crate::palette::ColorStrategyKind;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::stdout;
use std::time::{Duration, Instant};

pub fn run(
    mut core: MeloraCore,
    store: &mut dyn HistoryStore,
    settings: &Settings,
) -> Result<()> {
    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let started = Instant::now();
    let mut command_mode = false;
    let mut command_buffer = String::new();
    let mut last_tick = Instant::now();

    let result: Result<()> = loop {
        if core.screen == Screen::Splash && started.elapsed() >= SPLASH_DURATION {
            core.finish_splash();
        }

        if core.dirty || last_tick.elapsed() > Duration::from_millis(250) {
            terminal.draw(|frame| crate::ui::draw(frame, &core, &command_buffer, command_mode))?;
            core.dirty = false;
            last_tick = Instant::now();
        }

        if !event::poll(Duration::from_millis(33))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };

        if key.kind != KeyEventKind::Press {
            continue;
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            break Ok(());
        }

        if core.screen == Screen::Splash {
            core.finish_splash();
            continue;
        }

        if command_mode {
            match key.code {
                KeyCode::Esc => {
                    command_mode = false;
                    command_buffer.clear();
                    core.dirty = true;
                }
                KeyCode::Enter => {
                    run_command(&mut core, store, settings, &command_buffer);
                    command_mode = false;
                    command_buffer.clear();
                }
                KeyCode::Backspace => {
                    command_buffer.pop();
                    core.dirty = true;
                }
                KeyCode::Char(ch) => {
                    command_buffer.push(ch);
                    core.dirty = true;
                }
                _ => {}
            }
            continue;
        }

        match key.code {
            KeyCode::Char('q') => break Ok(()),
            KeyCode::Down => core.select_next(),
            KeyCode::Up => core.select_prev(),
            KeyCode::Enter => core.activate_selected(store),
            KeyCode::Left | KeyCode::Backspace | KeyCode::Esc => core.navigate_back(),
            KeyCode::Char(':') => {
                command_mode = true;
                core.dirty = true;
            }
            KeyCode::Char(ch) => handle_screen_key(&mut core, store, ch),
            _ => {}
        }
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    let save_result = config::save_settings(&core.settings(settings));
    result?;
    save_result?;
    Ok(())
}

fn handle_screen_key(core: &mut MeloraCore, store: &mut dyn HistoryStore, ch: char) {
    match (core.screen, ch) {
        (Screen::Home, 's') => core.open_stats(store),
        (Screen::Home, 'h') => core.open_history(store),
        (Screen::History, 'x') => core.clear_history(store),
        (Screen::History, 'r') => core.refresh_history(store),
        (Screen::Stats, 'r') => core.refresh_stats(store),
        (Screen::Stats, 'p') => core.cycle_color_strategy(store),
        (Screen::Detail, 'c') => copy_share_text(core),
        (Screen::Detail, digit) if digit.is_ascii_digit() => {
            let index = digit.to_digit(10).unwrap_or(0) as usize;
            open_detail_link(core, index);
        }
        _ => {}
    }
}

fn copy_share_text(core: &mut MeloraCore) {
    let Some(text) = core.share_text() else {
        return;
    };
    match links::copy_to_clipboard(&text) {
        Ok(()) => core.set_status("Song info copied to clipboard!"),
        Err(err) => {
            log::warn!("clipboard copy failed: {err:#}");
            core.set_status(&format!("copy error: {err:#}"));
        }
    }
}

fn open_detail_link(core: &mut MeloraCore, index: usize) {
    let Some(link) = index
        .checked_sub(1)
        .and_then(|idx| core.detail_links().into_iter().nth(idx))
    else {
        core.set_status("No link with that number");
        return;
    };
    match links::open_link(&link) {
        Ok(()) => core.set_status(&format!("Opened {}", link.label)),
        Err(err) => core.set_status(&format!("open error: {err:#}")),
    }
}

fn run_command(
    core: &mut MeloraCore,
    store: &mut dyn HistoryStore,
    settings: &Settings,
    raw: &str,
) {
    let input = raw.trim();
    if input.is_empty() {
        core.set_status("No command");
        return;
    }

    let mut command_split = input.splitn(2, char::is_whitespace);
    let command = command_split.next().unwrap_or_default();
    let rest = command_split.next().unwrap_or("").trim();

    match command {
        "help" => core.set_status(
            "Commands: home | stats | history | clear | colors <hashed|palette|random> | save",
        ),
        "home" => core.go_home(),
        "stats" => core.open_stats(store),
        "history" => core.open_history(store),
        "clear" => core.clear_history(store),
        "colors" => {
            if rest.is_empty() {
                core.set_status("Usage: colors <hashed|palette|random>");
                return;
            }
            match ColorStrategyKind::parse(rest) {
                Some(kind) => core.set_color_strategy(kind, store),
                None => core.set_status("Unknown color strategy"),
            }
        }
        "save" => match config::save_settings(&core.settings(settings)) {
            Ok(()) => core.set_status("Settings saved"),
            Err(err) => core.set_status(&format!("save error: {err:#}")),
        },
        _ => core.set_status("Unknown command. Use :help"),
    }
}
