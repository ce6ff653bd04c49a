use super::config::AppConfig;
use super::models::{Screen, SettingsField, ViewState};
use crate::usgs::{FeedEvent, LoadRequest, LoadStatus};
use ratatui::widgets::TableState;
use tokio::sync::mpsc::UnboundedSender;

/// Working copy of the settings while the settings view is open.
/// Applied as a whole on Enter, thrown away on Esc.
pub struct SettingsDraft {
    pub field: SettingsField,
    pub min_magnitude: String,
    pub order_by: super::models::OrderBy,
    pub entry_count: String,
}

impl SettingsDraft {
    fn from_config(config: &AppConfig) -> Self {
        Self {
            field: SettingsField::MinMagnitude,
            min_magnitude: config.min_magnitude.clone(),
            order_by: config.order_by,
            entry_count: config.entry_count.clone(),
        }
    }
}

pub struct App {
    pub config: AppConfig,
    pub url: String,
    pub status: Option<LoadStatus>,
    pub view: ViewState,
    pub screen: Screen,
    pub draft: Option<SettingsDraft>,
    pub current_index: usize,
    pub table_state: TableState,
    requests: UnboundedSender<LoadRequest>,
    /// Sequence number of the most recent load request. Fetches can
    /// finish out of order; answers to older requests are dropped.
    seq: u64,
}

impl App {
    pub fn new(config: AppConfig, requests: UnboundedSender<LoadRequest>) -> Self {
        let url = config.build_url();

        let mut table_state = TableState::default();
        table_state.select(Some(0));

        Self {
            config,
            url,
            status: None,
            view: ViewState::project(None),
            screen: Screen::Quakes,
            draft: None,
            current_index: 0,
            table_state,
            requests,
            seq: 0,
        }
    }

    /// Asks the fetch worker for a load of the current URL. A forced
    /// reload keeps the shown list on screen while refetching; any
    /// other load resets the screen to its uninitialized state.
    pub fn request_load(&mut self, force: bool) {
        match &mut self.status {
            Some(LoadStatus::Fine { reloading, .. }) if force => *reloading = true,
            _ => self.status = None,
        }
        self.refresh_view();

        self.seq += 1;
        let _ = self.requests.send(LoadRequest {
            seq: self.seq,
            url: self.url.clone(),
        });
    }

    pub fn observe(&mut self, event: FeedEvent) {
        // Answer to a request that has since been superseded.
        if event.seq() < self.seq {
            return;
        }

        self.status = Some(match event {
            FeedEvent::Loaded { quakes, .. } => LoadStatus::Fine {
                reloading: false,
                quakes,
            },
            FeedEvent::Failed { .. } => LoadStatus::Failed,
        });
        self.refresh_view();
    }

    pub fn selected_url(&self) -> Option<&str> {
        self.view.quakes.get(self.current_index)?.url.as_deref()
    }

    fn refresh_view(&mut self) {
        self.view = ViewState::project(self.status.as_ref());
        if self.view.quakes.is_empty() {
            self.current_index = 0;
        } else {
            self.current_index = self.current_index.min(self.view.quakes.len() - 1);
        }
        self.table_state.select(Some(self.current_index));
    }

    pub fn next(&mut self) {
        if !self.view.quakes.is_empty() {
            self.current_index = (self.current_index + 1) % self.view.quakes.len();
            self.table_state.select(Some(self.current_index));
        }
    }

    pub fn previous(&mut self) {
        if !self.view.quakes.is_empty() {
            if self.current_index > 0 {
                self.current_index -= 1;
            } else {
                self.current_index = self.view.quakes.len() - 1;
            }
            self.table_state.select(Some(self.current_index));
        }
    }

    pub fn jump_to_top(&mut self) {
        if !self.view.quakes.is_empty() {
            self.current_index = 0;
            self.table_state.select(Some(self.current_index));
        }
    }

    pub fn jump_to_bottom(&mut self) {
        if !self.view.quakes.is_empty() {
            self.current_index = self.view.quakes.len() - 1;
            self.table_state.select(Some(self.current_index));
        }
    }

    pub fn page_up(&mut self) {
        if !self.view.quakes.is_empty() {
            let page_size = 10;
            if self.current_index >= page_size {
                self.current_index -= page_size;
            } else {
                self.current_index = 0;
            }
            self.table_state.select(Some(self.current_index));
        }
    }

    pub fn page_down(&mut self) {
        if !self.view.quakes.is_empty() {
            let page_size = 10;
            let max_index = self.view.quakes.len() - 1;
            if self.current_index + page_size <= max_index {
                self.current_index += page_size;
            } else {
                self.current_index = max_index;
            }
            self.table_state.select(Some(self.current_index));
        }
    }

    pub fn open_settings(&mut self) {
        self.draft = Some(SettingsDraft::from_config(&self.config));
        self.screen = Screen::Settings;
    }

    pub fn settings_next_field(&mut self) {
        if let Some(draft) = &mut self.draft {
            draft.field = draft.field.next();
        }
    }

    pub fn settings_previous_field(&mut self) {
        if let Some(draft) = &mut self.draft {
            draft.field = draft.field.previous();
        }
    }

    /// Character input on the free-text fields. Only digits make sense
    /// in either, plus a single dot for the magnitude.
    pub fn settings_input(&mut self, c: char) {
        if let Some(draft) = &mut self.draft {
            match draft.field {
                SettingsField::MinMagnitude => {
                    if c.is_ascii_digit() || (c == '.' && !draft.min_magnitude.contains('.')) {
                        draft.min_magnitude.push(c);
                    }
                }
                SettingsField::EntryCount => {
                    if c.is_ascii_digit() {
                        draft.entry_count.push(c);
                    }
                }
                SettingsField::OrderBy => {}
            }
        }
    }

    pub fn settings_backspace(&mut self) {
        if let Some(draft) = &mut self.draft {
            match draft.field {
                SettingsField::MinMagnitude => {
                    draft.min_magnitude.pop();
                }
                SettingsField::EntryCount => {
                    draft.entry_count.pop();
                }
                SettingsField::OrderBy => {}
            }
        }
    }

    pub fn settings_cycle(&mut self, forward: bool) {
        if let Some(draft) = &mut self.draft
            && draft.field == SettingsField::OrderBy
        {
            draft.order_by = if forward {
                draft.order_by.cycle()
            } else {
                draft.order_by.cycle_back()
            };
        }
    }

    /// Commits the draft: persists the settings, rebuilds the URL from
    /// the fresh snapshot, and requests exactly one reload.
    pub fn apply_settings(&mut self) {
        let Some(draft) = self.draft.take() else {
            return;
        };

        self.config.min_magnitude = draft.min_magnitude;
        self.config.order_by = draft.order_by;
        self.config.entry_count = draft.entry_count;
        self.config.save();

        self.url = self.config.build_url();
        self.screen = Screen::Quakes;
        self.request_load(false);
    }

    pub fn cancel_settings(&mut self) {
        self.draft = None;
        self.screen = Screen::Quakes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usgs::Earthquake;
    use tokio::sync::mpsc;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn test_app() -> (App, UnboundedReceiver<LoadRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(AppConfig::default(), tx), rx)
    }

    fn quake(place: &str) -> Earthquake {
        Earthquake {
            magnitude: Some(4.7),
            place: place.to_string(),
            time: Some(1469077773620),
            url: None,
        }
    }

    fn loaded(seq: u64, quakes: Vec<Earthquake>) -> FeedEvent {
        FeedEvent::Loaded { seq, quakes }
    }

    #[test]
    fn initial_load_uses_the_stored_settings() {
        let (mut app, mut rx) = test_app();
        app.request_load(false);

        let request = rx.try_recv().unwrap();
        assert_eq!(request.url, AppConfig::default().build_url());
        assert!(rx.try_recv().is_err());
        assert!(app.view.refreshing);
    }

    #[test]
    fn applying_settings_rebuilds_the_url_and_reloads_once() {
        let (mut app, mut rx) = test_app();

        app.open_settings();
        let draft = app.draft.as_mut().unwrap();
        draft.min_magnitude = "6".to_string();
        draft.entry_count = "10".to_string();
        app.settings_next_field();
        app.settings_cycle(true);
        app.apply_settings();

        assert_eq!(app.screen, Screen::Quakes);
        assert!(app.url.contains("minmag=6"));
        assert!(app.url.contains("limit=10"));
        assert!(app.url.contains("orderby=time-asc"));

        let request = rx.try_recv().unwrap();
        assert_eq!(request.url, app.url);
        assert!(rx.try_recv().is_err(), "exactly one reload per apply");
    }

    #[test]
    fn cancelling_settings_requests_nothing() {
        let (mut app, mut rx) = test_app();
        let url_before = app.url.clone();

        app.open_settings();
        app.settings_input('9');
        app.cancel_settings();

        assert_eq!(app.url, url_before);
        assert!(app.draft.is_none());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn forced_reload_keeps_the_list_visible() {
        let (mut app, mut rx) = test_app();
        app.observe(loaded(0, vec![quake("Alaska"), quake("Chile")]));

        app.request_load(true);

        assert!(app.view.refreshing);
        assert_eq!(app.view.quakes.len(), 2);
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn failed_load_clears_the_list_and_selection() {
        let (mut app, _rx) = test_app();
        app.observe(loaded(0, vec![quake("Alaska"), quake("Chile")]));
        app.next();
        assert_eq!(app.current_index, 1);

        app.observe(FeedEvent::Failed { seq: 0 });

        assert_eq!(app.current_index, 0);
        assert!(app.view.quakes.is_empty());
        assert!(!app.view.refreshing);
    }

    #[test]
    fn navigation_wraps_around() {
        let (mut app, _rx) = test_app();
        app.observe(loaded(0, vec![
            quake("Alaska"),
            quake("Chile"),
            quake("Nevada"),
        ]));

        app.previous();
        assert_eq!(app.current_index, 2);
        app.next();
        assert_eq!(app.current_index, 0);
        app.jump_to_bottom();
        assert_eq!(app.current_index, 2);
        app.jump_to_top();
        assert_eq!(app.current_index, 0);
    }

    #[test]
    fn late_answer_to_a_superseded_load_is_ignored() {
        let (mut app, mut rx) = test_app();
        app.request_load(false);
        let first = rx.try_recv().unwrap();

        app.open_settings();
        app.draft.as_mut().unwrap().min_magnitude = "6".to_string();
        app.apply_settings();
        let second = rx.try_recv().unwrap();
        assert!(second.seq > first.seq);

        app.observe(loaded(second.seq, vec![quake("Chile")]));
        app.observe(loaded(first.seq, vec![quake("Alaska"), quake("Nevada")]));

        assert_eq!(app.view.quakes.len(), 1);
        assert_eq!(app.view.quakes[0].place, "Chile");

        app.observe(FeedEvent::Failed { seq: first.seq });
        assert_eq!(app.view.quakes.len(), 1);
        assert!(!app.view.refreshing);
    }

    #[test]
    fn selection_exposes_the_event_page_url() {
        let (mut app, _rx) = test_app();
        let mut first = quake("Alaska");
        first.url =
            Some("https://earthquake.usgs.gov/earthquakes/eventpage/us10006544".to_string());
        app.observe(loaded(0, vec![first, quake("Chile")]));

        assert_eq!(
            app.selected_url(),
            Some("https://earthquake.usgs.gov/earthquakes/eventpage/us10006544")
        );
        app.next();
        assert_eq!(app.selected_url(), None);
    }

    #[test]
    fn magnitude_input_allows_a_single_dot() {
        let (mut app, _rx) = test_app();
        app.open_settings();
        app.draft.as_mut().unwrap().min_magnitude.clear();

        for c in ['3', '.', '5', '.', 'x'] {
            app.settings_input(c);
        }

        assert_eq!(app.draft.as_ref().unwrap().min_magnitude, "3.5");
    }
}
