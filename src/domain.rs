use std::fmt;
use std::io::Error;
use std::path::PathBuf;

use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;

use crate::pipeline::PageSize;

pub const HELP_TEXT: &str = "\
Global
  q         quit
  <Tab>     switch between landing page and student table
  ?         show this help
  <Esc>     close popup / leave fullscreen / clear search

Landing page
  <Left> <Right> <Space>   previous / next slide
  1-9       jump to slide
  F         toggle fullscreen

Student table
  <Up> <Down>      select row
  <Left> <Right>   previous / next page
  <Home> <End>     first / last page
  /         search by name or email
  t / T     next / previous tab
  f         show or hide filter panel
  s         cycle status filter
  c         cycle section filter
  r         reset filters
  p         cycle rows per page
  1-5       sort by id, name, email, section, status
  e         edit selected student
  a         add student
  d         delete selected student
  y         copy selected row as csv";

#[derive(Debug)]
pub enum RosterError {
    IoError(Error),
    PolarsError(PolarsError),
    LoadingFailed(String),
    InvalidRecord(String),
    Clipboard(String),
    FileNotFound,
    PermissionDenied,
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterError::IoError(e) => write!(f, "io error: {e}"),
            RosterError::PolarsError(e) => write!(f, "failed to read table: {e}"),
            RosterError::LoadingFailed(msg) => write!(f, "loading failed: {msg}"),
            RosterError::InvalidRecord(msg) => write!(f, "invalid record: {msg}"),
            RosterError::Clipboard(msg) => write!(f, "clipboard unavailable: {msg}"),
            RosterError::FileNotFound => write!(f, "file not found"),
            RosterError::PermissionDenied => write!(f, "permission denied"),
        }
    }
}

impl std::error::Error for RosterError {}

impl From<Error> for RosterError {
    fn from(err: Error) -> Self {
        RosterError::IoError(err)
    }
}

impl From<PolarsError> for RosterError {
    fn from(err: PolarsError) -> Self {
        RosterError::PolarsError(err)
    }
}

impl From<arboard::Error> for RosterError {
    fn from(err: arboard::Error) -> Self {
        RosterError::Clipboard(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StartScreen {
    #[default]
    Landing,
    Table,
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct RosterConfig {
    pub event_poll_time: u64,
    pub page_size: PageSize,
    pub start_screen: StartScreen,
    #[setters(strip_option)]
    pub roster_file: Option<PathBuf>,
    pub status_message_timeout: u64,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            page_size: PageSize::default(),
            start_screen: StartScreen::default(),
            roster_file: None,
            status_message_timeout: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    Help,
    Exit,
    Enter,
    SwitchScreen,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MoveBeginning,
    MoveEnd,
    Number(u8),
    Search,
    NextTab,
    PreviousTab,
    ToggleFilters,
    CycleStatusFilter,
    CycleSectionFilter,
    ResetFilters,
    CyclePageSize,
    Edit,
    Add,
    Delete,
    CopyRow,
    ToggleFullscreen,
    RawKey(KeyEvent),
}

/// Target handed to the router when the user asks to edit or add a student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    EditStudent { id: u32 },
    AddStudent,
}

impl Navigation {
    pub fn route(&self) -> String {
        match self {
            Navigation::EditStudent { id } => format!("/students/edit-student?id={id}"),
            Navigation::AddStudent => "/students/add-student".to_string(),
        }
    }
}
