use crate::history::{self, HistoryStore};
use crate::links::{self, ExternalLink};
use crate::model::{DeviceId, HistoryRecord, Settings};
use crate::palette::ColorStrategyKind;
use crate::stats::{self, StatsSummary};
use std::time::Duration;
use time::UtcOffset;

pub const SPLASH_DURATION: Duration = Duration::from_millis(3_500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Splash,
    Home,
    History,
    Detail,
    NotFound,
    Stats,
}

impl Screen {
    pub fn label(self) -> &'static str {
        match self {
            Self::Splash => "Melora",
            Self::Home => "Home",
            Self::History => "History",
            Self::Detail => "Song",
            Self::NotFound => "Not Found",
            Self::Stats => "Stats",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeEntry {
    Stats,
    History,
}

impl HomeEntry {
    pub const ALL: [HomeEntry; 2] = [HomeEntry::Stats, HomeEntry::History];

    pub fn label(self) -> &'static str {
        match self {
            Self::Stats => "Your Music Stats",
            Self::History => "Search History",
        }
    }
}

#[derive(Debug)]
pub struct MeloraCore {
    pub device: DeviceId,
    pub offset: UtcOffset,
    pub color_strategy: ColorStrategyKind,
    pub screen: Screen,
    pub selected_home: usize,
    pub history: Vec<HistoryRecord>,
    pub selected_history: usize,
    pub detail: Option<HistoryRecord>,
    pub summary: Option<StatsSummary>,
    pub dirty: bool,
    pub status: String,
}

impl MeloraCore {
    pub fn new(device: DeviceId, settings: &Settings, offset: UtcOffset) -> Self {
        Self {
            device,
            offset,
            color_strategy: settings.color_strategy,
            screen: Screen::Splash,
            selected_home: 0,
            history: Vec::new(),
            selected_history: 0,
            detail: None,
            summary: None,
            dirty: true,
            status: String::from("Ready"),
        }
    }

    pub fn settings(&self, base: &Settings) -> Settings {
        Settings {
            color_strategy: self.color_strategy,
            ..base.clone()
        }
    }

    pub fn finish_splash(&mut self) {
        if self.screen == Screen::Splash {
            self.screen = Screen::Home;
            self.dirty = true;
        }
    }

    pub fn go_home(&mut self) {
        self.screen = Screen::Home;
        self.detail = None;
        self.dirty = true;
    }

    pub fn select_next(&mut self) {
        match self.screen {
            Screen::Home => {
                self.selected_home = (self.selected_home + 1).min(HomeEntry::ALL.len() - 1);
            }
            Screen::History if !self.history.is_empty() => {
                self.selected_history = (self.selected_history + 1).min(self.history.len() - 1);
            }
            _ => return,
        }
        self.dirty = true;
    }

    pub fn select_prev(&mut self) {
        match self.screen {
            Screen::Home => self.selected_home = self.selected_home.saturating_sub(1),
            Screen::History => self.selected_history = self.selected_history.saturating_sub(1),
            _ => return,
        }
        self.dirty = true;
    }

    pub fn activate_selected(&mut self, store: &dyn HistoryStore) {
        match self.screen {
            Screen::Splash => self.finish_splash(),
            Screen::Home => match HomeEntry::ALL.get(self.selected_home) {
                Some(HomeEntry::Stats) => self.open_stats(store),
                Some(HomeEntry::History) => self.open_history(store),
                None => {}
            },
            Screen::History => self.open_selected_record(store),
            Screen::NotFound => self.go_home(),
            Screen::Detail | Screen::Stats => {}
        }
    }

    pub fn navigate_back(&mut self) {
        match self.screen {
            Screen::Detail => {
                self.detail = None;
                self.screen = Screen::History;
            }
            Screen::Splash | Screen::Home => return,
            Screen::History | Screen::Stats | Screen::NotFound => self.screen = Screen::Home,
        }
        self.dirty = true;
    }

    /// Refetches on every visit so the list reflects the store.
    pub fn open_history(&mut self, store: &dyn HistoryStore) {
        self.refresh_history(store);
        self.screen = Screen::History;
        self.dirty = true;
    }

    pub fn refresh_history(&mut self, store: &dyn HistoryStore) {
        let mut records = history::fetch_or_empty(store, &self.device);
        history::sort_newest_first(&mut records);
        self.history = records;
        self.selected_history = self
            .selected_history
            .min(self.history.len().saturating_sub(1));
        self.set_status(&format!("{} searches in history", self.history.len()));
    }

    pub fn open_stats(&mut self, store: &dyn HistoryStore) {
        self.refresh_stats(store);
        self.screen = Screen::Stats;
        self.dirty = true;
    }

    pub fn refresh_stats(&mut self, store: &dyn HistoryStore) {
        let records = history::fetch_or_empty(store, &self.device);
        let mut colors = self.color_strategy.build();
        let summary = stats::summarize(&records, colors.as_mut(), self.offset);
        log::debug!(
            "stats for {}: {} searches, {} genres",
            self.device,
            summary.search_count,
            summary.genre_distribution.len()
        );
        self.summary = Some(summary);
        self.set_status("Stats refreshed");
    }

    /// Looks the record up again by id; a row deleted in the meantime lands on
    /// the not-found screen.
    pub fn open_selected_record(&mut self, store: &dyn HistoryStore) {
        let Some(id) = self
            .history
            .get(self.selected_history)
            .map(|record| record.id.clone())
        else {
            self.set_status("Nothing selected");
            return;
        };

        match store.fetch_record(&self.device, &id) {
            Ok(Some(record)) => {
                self.detail = Some(record);
                self.screen = Screen::Detail;
                self.set_status("Opened song");
            }
            Ok(None) => {
                self.detail = None;
                self.screen = Screen::NotFound;
                self.set_status("Song not found");
            }
            Err(err) => {
                log::warn!("failed to fetch record {id}: {err:#}");
                self.detail = None;
                self.screen = Screen::NotFound;
                self.set_status(&format!("lookup error: {err:#}"));
            }
        }
    }

    pub fn clear_history(&mut self, store: &mut dyn HistoryStore) {
        match store.clear_history(&self.device) {
            Ok(removed) => {
                self.history.clear();
                self.selected_history = 0;
                self.summary = None;
                self.set_status(&format!("Cleared {removed} searches"));
            }
            Err(err) => {
                log::warn!("failed to clear history for {}: {err:#}", self.device);
                self.set_status(&format!("clear error: {err:#}"));
            }
        }
    }

    pub fn cycle_color_strategy(&mut self, store: &dyn HistoryStore) {
        self.set_color_strategy(self.color_strategy.next(), store);
    }

    pub fn set_color_strategy(&mut self, kind: ColorStrategyKind, store: &dyn HistoryStore) {
        self.color_strategy = kind;
        if self.screen == Screen::Stats {
            self.refresh_stats(store);
        }
        self.set_status(&format!("Chart colors: {}", kind.label()));
    }

    pub fn detail_links(&self) -> Vec<ExternalLink> {
        self.detail
            .as_ref()
            .map(links::record_links)
            .unwrap_or_default()
    }

    pub fn share_text(&self) -> Option<String> {
        self.detail.as_ref().map(links::share_text)
    }

    pub fn selected_record(&self) -> Option<&HistoryRecord> {
        self.history.get(self.selected_history)
    }

    pub fn set_status(&mut self, message: &str) {
        self.status = message.to_string();
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistoryStore;
    use time::OffsetDateTime;
    use time::macros::datetime;

    fn record(id: &str, title: &str, created_at: OffsetDateTime) -> HistoryRecord {
        HistoryRecord {
            id: id.to_string(),
            device_id: DeviceId::new("phone"),
            title: title.to_string(),
            artist: String::from("Artist"),
            album: None,
            release_date: None,
            genre: Some(String::from("Pop")),
            album_art_url: None,
            lyrics: None,
            preview_url: None,
            song_url: None,
            created_at,
        }
    }

    fn fresh_core() -> MeloraCore {
        MeloraCore::new(DeviceId::new("phone"), &Settings::default(), UtcOffset::UTC)
    }

    fn store() -> MemoryHistoryStore {
        MemoryHistoryStore::with_records(vec![
            record("1", "Old", datetime!(2023-01-01 00:00 UTC)),
            record("2", "New", datetime!(2024-06-15 00:00 UTC)),
        ])
    }

    #[test]
    fn splash_leads_home() {
        let mut core = fresh_core();
        assert_eq!(core.screen, Screen::Splash);
        core.finish_splash();
        assert_eq!(core.screen, Screen::Home);
        core.finish_splash();
        assert_eq!(core.screen, Screen::Home);
    }

    #[test]
    fn history_lists_newest_first() {
        let mut core = fresh_core();
        core.open_history(&store());
        assert_eq!(core.screen, Screen::History);
        let titles: Vec<&str> = core.history.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Old"]);
    }

    #[test]
    fn deleted_record_shows_not_found() {
        let mut store = store();
        let mut core = fresh_core();
        core.open_history(&store);
        store.records.retain(|record| record.id != "2");

        core.open_selected_record(&store);
        assert_eq!(core.screen, Screen::NotFound);

        core.activate_selected(&store);
        assert_eq!(core.screen, Screen::Home);
    }

    #[test]
    fn detail_opens_the_row_of_this_device() {
        let mut phone_row = record("1", "Phone Song", datetime!(2024-01-01 00:00 UTC));
        phone_row.device_id = DeviceId::new("phone");
        let mut tablet_row = record("1", "Tablet Song", datetime!(2024-01-02 00:00 UTC));
        tablet_row.device_id = DeviceId::new("tablet");
        let store = MemoryHistoryStore::with_records(vec![phone_row, tablet_row]);

        let mut core =
            MeloraCore::new(DeviceId::new("tablet"), &Settings::default(), UtcOffset::UTC);
        core.open_history(&store);
        core.open_selected_record(&store);

        assert_eq!(core.screen, Screen::Detail);
        let detail = core.detail.as_ref().expect("detail");
        assert_eq!(detail.title, "Tablet Song");
        assert_eq!(detail.device_id, DeviceId::new("tablet"));
    }

    #[test]
    fn detail_back_returns_to_history() {
        let store = store();
        let mut core = fresh_core();
        core.open_history(&store);
        core.select_next();
        core.open_selected_record(&store);
        assert_eq!(core.screen, Screen::Detail);
        assert_eq!(core.detail.as_ref().map(|r| r.title.as_str()), Some("Old"));
        assert_eq!(core.share_text().as_deref(), Some("Old\n Artist"));
        assert_eq!(core.detail_links().len(), 3);

        core.navigate_back();
        assert_eq!(core.screen, Screen::History);
        assert!(core.detail.is_none());
    }

    #[test]
    fn clear_empties_history_and_stats() {
        let mut store = store();
        let mut core = fresh_core();
        core.open_stats(&store);
        assert_eq!(core.summary.as_ref().map(|s| s.search_count), Some(2));

        core.clear_history(&mut store);
        assert!(core.history.is_empty());
        assert!(core.summary.is_none());
        assert_eq!(core.status, "Cleared 2 searches");

        core.refresh_stats(&store);
        let summary = core.summary.as_ref().expect("summary");
        assert_eq!(summary.search_count, 0);
        assert_eq!(summary.most_searched_title, "N/A");
    }

    #[test]
    fn home_menu_opens_stats_then_history() {
        let store = store();
        let mut core = fresh_core();
        core.finish_splash();
        core.activate_selected(&store);
        assert_eq!(core.screen, Screen::Stats);
        core.navigate_back();
        core.select_next();
        core.select_next();
        assert_eq!(core.selected_home, 1);
        core.activate_selected(&store);
        assert_eq!(core.screen, Screen::History);
    }

    #[test]
    fn color_strategy_change_recomputes_visible_stats() {
        let store = store();
        let mut core = fresh_core();
        core.open_stats(&store);
        core.cycle_color_strategy(&store);
        assert_eq!(core.color_strategy, ColorStrategyKind::Palette);
        assert_eq!(core.status, "Chart colors: palette");
        assert!(core.summary.is_some());
    }

    proptest::proptest! {
        #[test]
        fn selection_stays_in_bounds(ops in proptest::collection::vec(0u8..6, 1..200)) {
            let mut store = store();
            let mut core = fresh_core();
            core.finish_splash();

            for op in ops {
                match op {
                    0 => core.select_next(),
                    1 => core.select_prev(),
                    2 => core.activate_selected(&store),
                    3 => core.navigate_back(),
                    4 => core.open_history(&store),
                    _ => core.clear_history(&mut store),
                }

                proptest::prop_assert!(core.selected_home < HomeEntry::ALL.len());
                if !core.history.is_empty() {
                    proptest::prop_assert!(core.selected_history < core.history.len());
                }
                if core.screen == Screen::Detail {
                    proptest::prop_assert!(core.detail.is_some());
                }
            }
        }
    }
}
