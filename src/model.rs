use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::domain::{HELP_TEXT, Message, Navigation, RosterConfig, RosterError, StartScreen};
use crate::inputter::{InputResult, Inputter};
use crate::pipeline::{SortKey, View, ViewParameters, compute_view, page_window};
use crate::roster::{Record, Section, Status};
use crate::slideshow::Slideshow;

#[derive(Debug, PartialEq)]
pub enum AppStatus {
    READY,
    QUITTING,
}

/// The page shown underneath popups and the search line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Landing,
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    LANDING,
    TABLE,
    SEARCH,
    POPUP,
}

/// Snapshot of everything the ui needs for one frame.
pub struct UIData {
    pub screen: Screen,
    pub rows: Vec<Record>,
    pub selected_row: usize,
    pub params: ViewParameters,
    pub total_filtered: usize,
    pub total_pages: usize,
    pub display_range: (usize, usize),
    pub page_window: Vec<usize>,
    pub show_filters: bool,
    pub active_filter_count: usize,
    pub slideshow: Slideshow,
    pub show_popup: bool,
    pub popup_message: String,
    pub cmdinput: InputResult,
    pub active_cmdinput: bool,
    pub status_message: String,
    pub last_status_message_update: Instant,
    pub last_update: Instant,
}

pub struct Model {
    pub status: AppStatus,
    modus: Modus,
    previous_modus: Modus,
    records: Vec<Record>,
    params: ViewParameters,
    view: View,
    selected_row: usize,
    show_filters: bool,
    slideshow: Slideshow,
    clipboard: Option<Clipboard>,
    input: Inputter,
    last_input: InputResult,
    query_before_input: String,
    navigation: Option<Navigation>,
    popup_message: String,
    status_message: String,
    last_status_message_update: Instant,
    uidata: UIData,
}

impl Model {
    pub fn init(config: &RosterConfig, records: Vec<Record>) -> Result<Self, RosterError> {
        let modus = match config.start_screen {
            StartScreen::Landing => Modus::LANDING,
            StartScreen::Table => Modus::TABLE,
        };
        let params = ViewParameters::default().with_page_size(config.page_size);
        let view = compute_view(&records, &params);
        let status_message = format!("Loaded {} students", records.len());

        let mut model = Self {
            status: AppStatus::READY,
            modus,
            previous_modus: modus,
            records,
            params,
            view,
            selected_row: 0,
            show_filters: false,
            slideshow: Slideshow::default(),
            clipboard: None,
            input: Inputter::default(),
            last_input: InputResult::default(),
            query_before_input: String::new(),
            navigation: None,
            popup_message: String::new(),
            status_message: String::new(),
            last_status_message_update: Instant::now(),
            uidata: UIData {
                screen: Screen::Landing,
                rows: Vec::new(),
                selected_row: 0,
                params: ViewParameters::default(),
                total_filtered: 0,
                total_pages: 0,
                display_range: (0, 0),
                page_window: Vec::new(),
                show_filters: false,
                active_filter_count: 0,
                slideshow: Slideshow::default(),
                show_popup: false,
                popup_message: String::new(),
                cmdinput: InputResult::default(),
                active_cmdinput: false,
                status_message: String::new(),
                last_status_message_update: Instant::now(),
                last_update: Instant::now(),
            },
        };
        model.set_status_message(status_message);
        Ok(model)
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    /// Hand the last edit/add request over to whoever does the routing.
    pub fn take_navigation(&mut self) -> Option<Navigation> {
        self.navigation.take()
    }

    pub fn screen(&self) -> Screen {
        self.screen_for(self.modus)
    }

    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::SEARCH
    }

    pub fn quit(&mut self) {
        self.status = AppStatus::QUITTING;
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), RosterError> {
        let Some(msg) = message else {
            return Ok(());
        };
        trace!("Update: Modus {:?}, Message {:?}", self.modus, msg);

        match self.modus {
            Modus::TABLE => match msg {
                Message::Quit => self.quit(),
                Message::Help => self.show_help(),
                Message::SwitchScreen => self.switch_screen(),
                Message::MoveUp => self.move_selection_up(),
                Message::MoveDown => self.move_selection_down(),
                Message::MoveLeft => self.change_params(|p, _| p.previous_page()),
                Message::MoveRight => self.change_params(|p, total| p.next_page(total)),
                Message::MoveBeginning => self.change_params(|p, _| p.first_page()),
                Message::MoveEnd => self.change_params(|p, total| p.last_page(total)),
                Message::Number(n) => {
                    if let Some(key) = SortKey::from_column(n) {
                        self.change_params(|p, _| p.request_sort(key));
                    }
                }
                Message::Search => self.enter_search_mode(),
                Message::NextTab => self.change_params(|p, _| p.set_tab(p.tab.next())),
                Message::PreviousTab => self.change_params(|p, _| p.set_tab(p.tab.previous())),
                Message::ToggleFilters => self.toggle_filters(),
                Message::CycleStatusFilter => self.change_params(|p, _| {
                    p.set_status_filter(p.status_filter.cycle(&Status::ALL))
                }),
                Message::CycleSectionFilter => self.change_params(|p, _| {
                    p.set_section_filter(p.section_filter.cycle(&Section::ALL))
                }),
                Message::ResetFilters => self.reset_filters(),
                Message::CyclePageSize => {
                    self.change_params(|p, _| p.set_page_size(p.page_size.next()))
                }
                Message::Enter | Message::Edit => self.edit_selected(),
                Message::Add => self.navigate(Navigation::AddStudent),
                Message::Delete => self.delete_selected(),
                Message::CopyRow => self.copy_selected_row(),
                Message::Exit => self.exit(),
                _ => (),
            },
            Modus::LANDING => match msg {
                Message::Quit => self.quit(),
                Message::Help => self.show_help(),
                Message::SwitchScreen => self.switch_screen(),
                Message::MoveLeft | Message::MoveUp => self.slideshow.previous(),
                Message::MoveRight | Message::MoveDown => self.slideshow.next(),
                Message::MoveBeginning => self.slideshow.jump(0),
                Message::MoveEnd => {
                    let last = self.slideshow.slides().len().saturating_sub(1);
                    self.slideshow.jump(last)
                }
                Message::Number(n) => self.slideshow.jump((n as usize).saturating_sub(1)),
                Message::Enter | Message::ToggleFullscreen => self.slideshow.toggle_fullscreen(),
                Message::Exit => self.exit(),
                _ => (),
            },
            Modus::POPUP => match msg {
                Message::Quit => self.quit(),
                Message::Exit | Message::Enter | Message::Help => self.exit(),
                _ => (),
            },
            Modus::SEARCH => match msg {
                Message::Quit => self.quit(),
                Message::RawKey(key) => self.raw_input(key),
                _ => (),
            },
        }

        self.update_uidata();
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn screen_for(&self, modus: Modus) -> Screen {
        match modus {
            Modus::LANDING => Screen::Landing,
            Modus::TABLE | Modus::SEARCH => Screen::Table,
            Modus::POPUP => self.screen_for_previous(),
        }
    }

    fn screen_for_previous(&self) -> Screen {
        match self.previous_modus {
            Modus::LANDING => Screen::Landing,
            _ => Screen::Table,
        }
    }

    /// Apply a parameter change and recompute the visible page. The closure
    /// gets the page count of the view before the change.
    fn change_params(&mut self, change: impl FnOnce(&mut ViewParameters, usize)) {
        let before = self.params.clone();
        change(&mut self.params, self.view.total_pages);
        if self.params != before {
            debug!("View parameters changed: {:?}", self.params);
            self.recompute_view();
        }
    }

    fn recompute_view(&mut self) {
        let start_time = Instant::now();
        self.view = compute_view(&self.records, &self.params);
        self.selected_row = std::cmp::min(
            self.selected_row,
            self.view.rows.len().saturating_sub(1),
        );
        trace!(
            "Computed view: {} rows on page {}/{}, {} matches in {}us",
            self.view.rows.len(),
            self.params.page,
            self.view.total_pages,
            self.view.total_filtered,
            start_time.elapsed().as_micros()
        );
    }

    fn update_uidata(&mut self) {
        let (start, end) = self.view.display_range(&self.params);
        self.uidata = UIData {
            screen: self.screen(),
            rows: self.view.rows.clone(),
            selected_row: self.selected_row,
            params: self.params.clone(),
            total_filtered: self.view.total_filtered,
            total_pages: self.view.total_pages,
            display_range: (start, end),
            page_window: page_window(self.params.page, self.view.total_pages),
            show_filters: self.show_filters,
            active_filter_count: self.params.active_filter_count(),
            slideshow: self.slideshow.clone(),
            show_popup: self.modus == Modus::POPUP,
            popup_message: self.popup_message.clone(),
            cmdinput: self.last_input.clone(),
            active_cmdinput: self.modus == Modus::SEARCH,
            status_message: self.status_message.clone(),
            last_status_message_update: self.last_status_message_update,
            last_update: Instant::now(),
        };
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
        self.update_uidata();
    }

    fn switch_screen(&mut self) {
        self.previous_modus = self.modus;
        self.modus = match self.modus {
            Modus::LANDING => Modus::TABLE,
            _ => Modus::LANDING,
        };
        self.slideshow.exit_fullscreen();
    }

    fn exit(&mut self) {
        match self.modus {
            Modus::TABLE => {
                if !self.params.query.is_empty() {
                    self.change_params(|p, _| p.set_query(""));
                    self.set_status_message("Search cleared");
                } else if self.show_filters {
                    self.show_filters = false;
                }
            }
            Modus::LANDING => self.slideshow.exit_fullscreen(),
            Modus::POPUP => {
                trace!("Close popup ...");
                self.modus = self.previous_modus;
                self.previous_modus = Modus::POPUP;
            }
            Modus::SEARCH => {}
        }
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.popup_message = HELP_TEXT.to_string();
    }

    fn toggle_filters(&mut self) {
        self.show_filters = !self.show_filters;
    }

    fn reset_filters(&mut self) {
        self.change_params(|p, _| p.reset_filters());
        self.set_status_message("Filters reset");
    }

    fn move_selection_up(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    fn move_selection_down(&mut self) {
        if self.selected_row + 1 < self.view.rows.len() {
            self.selected_row += 1;
        }
    }

    fn selected_record(&self) -> Option<&Record> {
        self.view.rows.get(self.selected_row)
    }

    fn navigate(&mut self, target: Navigation) {
        info!("Navigation requested: {}", target.route());
        self.set_status_message(format!("Open {}", target.route()));
        self.navigation = Some(target);
    }

    fn edit_selected(&mut self) {
        if let Some(id) = self.selected_record().map(|r| r.id) {
            self.navigate(Navigation::EditStudent { id });
        }
    }

    fn delete_selected(&mut self) {
        if let Some(record) = self.selected_record() {
            let message = format!("Deleting {} is not available", record.display_id());
            warn!("{message}");
            self.set_status_message(message);
        }
    }

    fn copy_selected_row(&mut self) {
        let Some(row) = self.selected_record().map(Record::to_csv_row) else {
            return;
        };
        trace!("Row content: {}", row);
        match self.copy_to_clipboard(row) {
            Ok(_) => self.set_status_message("Copied row to clipboard"),
            Err(e) => {
                warn!("Error copying to clipboard: {e}");
                self.set_status_message(e.to_string());
            }
        }
    }

    fn copy_to_clipboard(&mut self, text: String) -> Result<(), RosterError> {
        if self.clipboard.is_none() {
            self.clipboard = Some(Clipboard::new()?);
        }
        if let Some(clipboard) = self.clipboard.as_mut() {
            clipboard.set_text(text)?;
        }
        Ok(())
    }

    fn enter_search_mode(&mut self) {
        trace!("Entering search mode ...");
        self.previous_modus = self.modus;
        self.modus = Modus::SEARCH;
        self.query_before_input = self.params.query.clone();

        self.input.clear();
        self.input.set(&self.params.query);
        self.last_input = self.input.get();
    }

    fn raw_input(&mut self, key: KeyEvent) {
        self.last_input = self.input.read(key);

        // The table follows every keystroke, escape restores the old query.
        let query = if self.last_input.canceled {
            self.query_before_input.clone()
        } else {
            self.last_input.input.clone()
        };
        self.change_params(|p, _| p.set_query(&query));

        if self.last_input.finished {
            self.modus = Modus::TABLE;
            self.previous_modus = Modus::SEARCH;
            self.set_status_message(format!("Found {} students", self.view.total_filtered));
        }
    }
}
