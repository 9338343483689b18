use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
};

use crate::domain::RosterConfig;
use crate::landing::{HERO_TAGLINE, HERO_TITLE, TEAM, TEAM_HEADING};
use crate::model::{Model, Screen, UIData};
use crate::pipeline::{SortDirection, SortKey, Tab};
use crate::roster::{Record, Section, Status};
use crate::slideshow::Slideshow;

pub const STATUSLINE_HEIGHT: u16 = 1;
pub const HEADER_HEIGHT: u16 = 3;
pub const TOOLBAR_HEIGHT: u16 = 3;
pub const FILTER_PANEL_HEIGHT: u16 = 3;
pub const PAGINATION_HEIGHT: u16 = 3;
pub const HERO_HEIGHT: u16 = 9;

const ACCENT: Color = Color::Cyan;

pub struct TableUI {
    status_message_timeout: Duration,
    table_state: TableState,
}

impl TableUI {
    pub fn new(cfg: &RosterConfig) -> Self {
        Self {
            status_message_timeout: Duration::from_secs(cfg.status_message_timeout),
            table_state: TableState::default(),
        }
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let [main_area, status_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(STATUSLINE_HEIGHT)])
                .areas(frame.area());

        match uidata.screen {
            Screen::Landing => draw_landing(uidata, frame, main_area),
            Screen::Table => self.draw_table_screen(uidata, frame, main_area),
        }
        self.draw_statusline(uidata, frame, status_area);

        if uidata.show_popup {
            draw_popup(&uidata.popup_message, frame);
        }
    }

    fn draw_table_screen(&mut self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let filter_height = if uidata.show_filters {
            FILTER_PANEL_HEIGHT
        } else {
            0
        };
        let [header, toolbar, filters, table, pagination] = Layout::vertical([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(TOOLBAR_HEIGHT),
            Constraint::Length(filter_height),
            Constraint::Min(3),
            Constraint::Length(PAGINATION_HEIGHT),
        ])
        .areas(area);

        let title = Text::from(vec![
            Line::from("User Management".bold()),
            Line::from("Manage and monitor user accounts".dark_gray()),
        ]);
        frame.render_widget(Paragraph::new(title).block(Block::new()), header);

        draw_toolbar(uidata, frame, toolbar);
        if uidata.show_filters {
            draw_filter_panel(uidata, frame, filters);
        }
        self.draw_records(uidata, frame, table);
        draw_pagination(uidata, frame, pagination);
    }

    fn draw_records(&mut self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let block = Block::bordered().border_set(border::ROUNDED);

        if uidata.rows.is_empty() {
            let empty = Text::from(vec![
                Line::from(""),
                Line::from("No results found".bold()),
                Line::from("Try adjusting your search or filters".dark_gray()),
                Line::from(vec!["Press ".into(), "r".blue().bold(), " to reset all filters".into()]),
            ]);
            frame.render_widget(Paragraph::new(empty).centered().block(block), area);
            return;
        }

        let header = Row::new(
            SortKey::ALL
                .iter()
                .map(|key| Cell::from(header_label(uidata, *key)))
                .chain(std::iter::once(Cell::from("Actions"))),
        )
        .style(Style::new().add_modifier(Modifier::BOLD))
        .bottom_margin(1);

        let rows = uidata.rows.iter().map(record_row);
        let widths = [
            Constraint::Length(6),
            Constraint::Fill(2),
            Constraint::Fill(2),
            Constraint::Length(9),
            Constraint::Length(12),
            Constraint::Length(10),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .column_spacing(2)
            .row_highlight_style(Style::new().bg(Color::DarkGray))
            .highlight_symbol("▌");

        self.table_state.select(Some(uidata.selected_row));
        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn draw_statusline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let line = if uidata.active_cmdinput {
            let input = &uidata.cmdinput;
            frame.set_cursor_position((area.x + 8 + input.curser_pos as u16, area.y));
            Line::from(vec!["Search: ".fg(ACCENT).bold(), input.input.clone().into()])
        } else if uidata.last_status_message_update.elapsed() < self.status_message_timeout {
            Line::from(uidata.status_message.clone().italic())
        } else {
            Line::from(vec![
                " Help ".into(),
                "<?>".blue().bold(),
                " Switch page ".into(),
                "<Tab>".blue().bold(),
                " Quit ".into(),
                "<Q> ".blue().bold(),
            ])
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

fn header_label(uidata: &UIData, key: SortKey) -> String {
    let sort = uidata.params.sort;
    let icon = if sort.key != key {
        "↕"
    } else if sort.direction == SortDirection::Ascending {
        "↑"
    } else {
        "↓"
    };
    format!("{} {}", key.label(), icon)
}

fn record_row(record: &Record) -> Row<'_> {
    Row::new(vec![
        Cell::from(record.display_id().dark_gray()),
        Cell::from(Line::from(vec![
            format!("{:<3}", record.initials()).fg(ACCENT).bold(),
            " ".into(),
            record.name.clone().into(),
        ])),
        Cell::from(record.email.clone().gray()),
        Cell::from(Span::styled(
            format!(" {} ", record.section),
            section_style(record.section),
        )),
        Cell::from(status_span(record.status)),
        Cell::from("e edit d del".dark_gray()),
    ])
}

fn section_style(section: Section) -> Style {
    let color = match section {
        Section::S3A | Section::S3B => Color::Magenta,
        Section::S3C | Section::S3D => Color::Yellow,
        _ => Color::Gray,
    };
    Style::new().fg(color).add_modifier(Modifier::REVERSED)
}

fn status_span(status: Status) -> Line<'static> {
    let color = match status {
        Status::Active => Color::Green,
        Status::Inactive => Color::Red,
    };
    Line::from(vec![
        Span::styled("● ", Style::new().fg(color)),
        Span::styled(status.to_string(), Style::new().fg(color)),
    ])
}

fn draw_toolbar(uidata: &UIData, frame: &mut Frame, area: Rect) {
    let [tabs_area, search_area] =
        Layout::horizontal([Constraint::Length(36), Constraint::Min(20)]).areas(area);

    let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.label()))
        .select(uidata.params.tab.index())
        .highlight_style(Style::new().fg(ACCENT).bold())
        .block(Block::bordered().border_set(border::ROUNDED));
    frame.render_widget(tabs, tabs_area);

    let query = if uidata.active_cmdinput {
        uidata.cmdinput.input.clone()
    } else {
        uidata.params.query.clone()
    };
    let search = if query.is_empty() {
        Line::from("Search users...".dark_gray())
    } else {
        Line::from(vec![query.into(), "  <Esc> clear".dark_gray()])
    };
    let mut search_block = Block::bordered()
        .border_set(border::ROUNDED)
        .title(" / ");
    if uidata.active_filter_count > 0 {
        search_block = search_block
            .title_top(
                Line::from(format!(" filters: {} ", uidata.active_filter_count).fg(ACCENT))
                    .right_aligned(),
            );
    }
    if uidata.active_cmdinput {
        search_block = search_block.border_style(Style::new().fg(ACCENT));
    }
    frame.render_widget(Paragraph::new(search).block(search_block), search_area);
}

fn draw_filter_panel(uidata: &UIData, frame: &mut Frame, area: Rect) {
    let params = &uidata.params;
    let line = Line::from(vec![
        " Status ".bold(),
        "<s>".blue(),
        format!(" {}    ", params.status_filter.label("All Status")).into(),
        "Section ".bold(),
        "<c>".blue(),
        format!(" {}    ", params.section_filter.label("All Sections")).into(),
        "Reset filters ".bold(),
        "<r>".blue(),
    ]);
    let block = Block::bordered()
        .border_set(border::ROUNDED)
        .title(" Filters ");
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_pagination(uidata: &UIData, frame: &mut Frame, area: Rect) {
    let params = &uidata.params;
    let (start, end) = uidata.display_range;
    let info = Line::from(vec![
        "Rows per page: ".dark_gray(),
        params.page_size.to_string().bold(),
        "    ".into(),
        format!("Showing {}-{} of {}", start, end, uidata.total_filtered).dark_gray(),
    ]);

    let enabled = |on: bool, s: &'static str| {
        if on {
            Span::from(s).bold()
        } else {
            Span::from(s).dark_gray()
        }
    };
    let has_previous = params.has_previous_page();
    let has_next = params.has_next_page(uidata.total_pages);

    let mut buttons = vec![enabled(has_previous, "« "), enabled(has_previous, "‹ ")];
    for page in &uidata.page_window {
        let label = format!(" {page} ");
        if *page == params.page {
            buttons.push(Span::styled(label, Style::new().fg(Color::Black).bg(ACCENT)));
        } else {
            buttons.push(Span::from(label));
        }
    }
    buttons.push(enabled(has_next, " ›"));
    buttons.push(enabled(has_next, " »"));

    let [info_area, buttons_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(24)]).areas(area);
    let block = Block::new().borders(ratatui::widgets::Borders::TOP);
    frame.render_widget(Paragraph::new(info).block(block.clone()), info_area);
    frame.render_widget(
        Paragraph::new(Line::from(buttons).right_aligned()).block(block),
        buttons_area,
    );
}

fn draw_landing(uidata: &UIData, frame: &mut Frame, area: Rect) {
    let slideshow = &uidata.slideshow;
    if slideshow.is_fullscreen() {
        draw_slide(slideshow, frame, area);
        return;
    }

    let [hero, slide] =
        Layout::vertical([Constraint::Length(HERO_HEIGHT), Constraint::Min(5)]).areas(area);

    let mut lines = vec![
        Line::from(HERO_TITLE.bold().fg(ACCENT)).centered(),
        Line::from(HERO_TAGLINE.dark_gray()).centered(),
        Line::from(""),
        Line::from(TEAM_HEADING.bold()).centered(),
    ];
    let team: Vec<Span> = TEAM
        .iter()
        .flat_map(|m| {
            vec![
                format!("({}) ", m.initials()).fg(ACCENT).bold(),
                m.name.into(),
                format!(" · {}    ", m.role).dark_gray(),
            ]
        })
        .collect();
    lines.push(Line::from(team).centered());
    frame.render_widget(
        Paragraph::new(lines).block(Block::bordered().border_set(border::ROUNDED)),
        hero,
    );

    draw_slide(slideshow, frame, slide);
}

fn draw_slide(slideshow: &Slideshow, frame: &mut Frame, area: Rect) {
    let [body, thumbs] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).areas(area);

    let mut nav = Vec::new();
    if slideshow.has_previous() {
        nav.push("‹ ".bold());
    }
    nav.push(slideshow.counter().into());
    if slideshow.has_next() {
        nav.push(" ›".bold());
    }

    let label = slideshow.current_slide().unwrap_or("/placeholder.svg");
    let text = Text::from(vec![
        Line::from(""),
        Line::from(format!("Slide {}", slideshow.current_index() + 1).bold()),
        Line::from(label.to_string().dark_gray()),
    ]);
    let block = Block::bordered()
        .border_set(border::THICK)
        .title_bottom(Line::from(nav).centered());
    frame.render_widget(Paragraph::new(text).centered().block(block), body);

    if !slideshow.is_fullscreen() {
        let thumbnails: Vec<Span> = (0..slideshow.slides().len())
            .map(|i| {
                let label = format!(" {} ", i + 1);
                if i == slideshow.current_index() {
                    Span::styled(label, Style::new().fg(Color::Black).bg(ACCENT))
                } else {
                    Span::from(label)
                }
            })
            .collect();
        frame.render_widget(
            Paragraph::new(Line::from(thumbnails).centered()).block(Block::bordered()),
            thumbs,
        );
    }
}

fn draw_popup(message: &str, frame: &mut Frame) {
    let [area] = Layout::vertical([Constraint::Percentage(80)])
        .flex(Flex::Center)
        .areas(frame.area());
    let [area] = Layout::horizontal([Constraint::Percentage(60)])
        .flex(Flex::Center)
        .areas(area);

    let block = Block::bordered()
        .title(Line::from(" Help ".bold()).centered())
        .title_bottom(Line::from(vec![" Close ".into(), "<Esc> ".blue().bold()]).centered())
        .border_set(border::THICK);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(message.to_string())
            .wrap(Wrap { trim: false })
            .block(block),
        area,
    );
}
