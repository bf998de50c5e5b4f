use std::collections::HashMap;

use ratatui::widgets::ListState;

use crate::view::{FormField, Region};

/// Tabs in display order.
pub const TABS: [Region; 3] = [Region::AllStories, Region::Favorites, Region::OwnStories];

pub fn tab_title(region: Region) -> &'static str {
    match region {
        Region::AllStories => "All stories",
        Region::Favorites => "Favorites",
        Region::OwnStories => "My stories",
        Region::SubmitForm => "Submit",
    }
}

/// A story waiting for y/n before it is deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub story_id: String,
    pub title: String,
}

pub struct TuiApp {
    pub tab: Region,
    pub list_state: ListState,
    cursors: HashMap<Region, usize>,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub is_refreshing: bool,
    /// Favorite requests sent but not yet answered.
    pub in_flight: usize,
    /// Focused input while the submit form is open.
    pub form: Option<FormField>,
    pub pending_delete: Option<PendingDelete>,
}

impl TuiApp {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            tab: Region::AllStories,
            list_state,
            cursors: HashMap::new(),
            should_quit: false,
            status_message: None,
            is_refreshing: false,
            in_flight: 0,
            form: None,
            pending_delete: None,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursors.get(&self.tab).copied().unwrap_or(0)
    }

    fn set_cursor(&mut self, index: usize) {
        self.cursors.insert(self.tab, index);
        self.list_state.select(Some(index));
    }

    pub fn move_up(&mut self) {
        let cursor = self.cursor();
        if cursor > 0 {
            self.set_cursor(cursor - 1);
        }
    }

    pub fn move_down(&mut self, len: usize) {
        let cursor = self.cursor();
        if cursor + 1 < len {
            self.set_cursor(cursor + 1);
        }
    }

    pub fn select_first(&mut self) {
        self.set_cursor(0);
    }

    /// Keep the cursor on an entry after the list shrank.
    pub fn clamp_cursor(&mut self, len: usize) {
        let cursor = self.cursor().min(len.saturating_sub(1));
        self.set_cursor(cursor);
    }

    pub fn next_tab(&self) -> Region {
        let index = TABS.iter().position(|t| *t == self.tab).unwrap_or(0);
        TABS[(index + 1) % TABS.len()]
    }

    pub fn prev_tab(&self) -> Region {
        let index = TABS.iter().position(|t| *t == self.tab).unwrap_or(0);
        TABS[(index + TABS.len() - 1) % TABS.len()]
    }

    /// Switch tabs, restoring the cursor last used there.
    pub fn select_tab(&mut self, tab: Region) {
        self.tab = tab;
        self.list_state.select(Some(self.cursor()));
    }

    pub fn open_form(&mut self) {
        self.form = Some(FormField::Author);
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    pub fn focus_next_field(&mut self) {
        self.form = self.form.map(FormField::next);
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

impl Default for TuiApp {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tabs_cycle_both_ways() {
        let mut app = TuiApp::new();
        assert_eq!(app.next_tab(), Region::Favorites);
        assert_eq!(app.prev_tab(), Region::OwnStories);

        app.select_tab(Region::OwnStories);
        assert_eq!(app.next_tab(), Region::AllStories);
    }

    #[test]
    fn test_cursor_is_kept_per_tab() {
        let mut app = TuiApp::new();
        app.move_down(5);
        app.move_down(5);
        assert_eq!(app.cursor(), 2);

        app.select_tab(Region::Favorites);
        assert_eq!(app.cursor(), 0);
        assert_eq!(app.list_state.selected(), Some(0));

        app.select_tab(Region::AllStories);
        assert_eq!(app.list_state.selected(), Some(2));
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut app = TuiApp::new();
        app.move_up();
        assert_eq!(app.cursor(), 0);

        app.move_down(2);
        app.move_down(2);
        assert_eq!(app.cursor(), 1);

        app.clamp_cursor(1);
        assert_eq!(app.cursor(), 0);
        app.clamp_cursor(0);
        assert_eq!(app.cursor(), 0);
    }

    #[test]
    fn test_form_focus_cycles_fields() {
        let mut app = TuiApp::new();
        app.focus_next_field();
        assert_eq!(app.form, None);

        app.open_form();
        app.focus_next_field();
        assert_eq!(app.form, Some(FormField::Title));
        app.focus_next_field();
        app.focus_next_field();
        assert_eq!(app.form, Some(FormField::Author));

        app.close_form();
        assert_eq!(app.form, None);
    }
}
