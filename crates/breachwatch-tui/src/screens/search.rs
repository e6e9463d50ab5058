//! Search screen: query box, facet and exclusion chips, result table with
//! status badges, and a detail pane for the selected record.
//!
//! The screen never touches the session directly. Every edit becomes an
//! [`Action`] that the app applies, and the screen redraws from the
//! [`SearchSnapshot`] the bridge sends back.

use std::fmt::Write;
use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use tui_input::{Input, InputRequest};

use breachwatch_core::display::{first_seen, locator, tag_token_value};
use breachwatch_core::{
    ExclusionRangeSet, FilterToken, RangeError, ResultRecord, SearchSnapshot,
    SearchStatus, StatusIndicator, parse_facet,
};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

/// Which text field, if any, owns the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum InputMode {
    #[default]
    Normal,
    Query,
    Facet,
    Exclusion,
}

/// One removable entry in the filter bar. Tokens come first, then
/// exclusions, matching the order they are drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Chip {
    Token(FilterToken),
    Exclusion(String),
}

pub struct SearchScreen {
    focused: bool,
    snapshot: Arc<SearchSnapshot>,
    mode: InputMode,
    query: Input,
    prompt: Input,
    prompt_error: Option<String>,
    table_state: TableState,
    chip_cursor: Option<usize>,
    tag_cursor: usize,
    throbber_state: throbber_widgets_tui::ThrobberState,
}

impl SearchScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            snapshot: Arc::new(SearchSnapshot::default()),
            mode: InputMode::Normal,
            query: Input::default(),
            prompt: Input::default(),
            prompt_error: None,
            table_state: TableState::default(),
            chip_cursor: None,
            tag_cursor: 0,
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
        }
    }

    // ── Derived state ────────────────────────────────────────────────

    fn results(&self) -> &[ResultRecord] {
        &self.snapshot.results
    }

    fn chips(&self) -> Vec<Chip> {
        self.snapshot
            .tokens
            .iter()
            .cloned()
            .map(Chip::Token)
            .chain(self.snapshot.exclusions.iter().cloned().map(Chip::Exclusion))
            .collect()
    }

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    fn selected_record(&self) -> Option<&ResultRecord> {
        self.table_state
            .selected()
            .and_then(|i| self.results().get(i))
    }

    // ── Selection ────────────────────────────────────────────────────

    fn select(&mut self, idx: usize) {
        let len = self.results().len();
        if len == 0 {
            self.table_state.select(None);
        } else {
            let clamped = idx.min(len - 1);
            if self.table_state.selected() != Some(clamped) {
                self.tag_cursor = 0;
            }
            self.table_state.select(Some(clamped));
        }
    }

    fn select_next(&mut self) {
        self.select(self.selected_index().saturating_add(1));
    }

    fn select_prev(&mut self) {
        self.select(self.selected_index().saturating_sub(1));
    }

    fn move_chip(&mut self, forward: bool) {
        let count = self.chips().len();
        if count == 0 {
            self.chip_cursor = None;
            return;
        }
        self.chip_cursor = Some(match (self.chip_cursor, forward) {
            (None, true) => 0,
            (None, false) => count - 1,
            (Some(i), true) => (i + 1) % count,
            (Some(i), false) => (i + count - 1) % count,
        });
    }

    fn remove_selected_chip(&mut self) -> Option<Action> {
        let chips = self.chips();
        let chip = chips.get(self.chip_cursor?)?;
        Some(match chip {
            Chip::Token(token) => Action::RemoveToken(token.id),
            Chip::Exclusion(range) => Action::RemoveExclusion(range.clone()),
        })
    }

    fn cycle_tag(&mut self) {
        let count = self.selected_record().map_or(0, |r| r.tags.len());
        self.tag_cursor = if count == 0 {
            0
        } else {
            (self.tag_cursor + 1) % count
        };
    }

    fn selected_tag_token(&self) -> Option<Action> {
        let tag = self.selected_record()?.tags.iter().nth(self.tag_cursor)?;
        let (kind, value) = tag_token_value(tag);
        Some(Action::AddToken(kind, value))
    }

    fn next_page(&self) -> Option<Action> {
        let pages = self.snapshot.pages.unwrap_or(1);
        (u64::from(self.snapshot.page) < pages).then(|| Action::SetPage(self.snapshot.page + 1))
    }

    fn prev_page(&self) -> Option<Action> {
        (self.snapshot.page > 1).then(|| Action::SetPage(self.snapshot.page - 1))
    }

    // ── Snapshot sync ────────────────────────────────────────────────

    fn apply_snapshot(&mut self, snapshot: &Arc<SearchSnapshot>) {
        self.snapshot = Arc::clone(snapshot);

        // Keep the query box in step when the text changed elsewhere.
        if self.mode != InputMode::Query && self.query.value() != snapshot.query {
            self.query = Input::new(snapshot.query.clone());
        }

        match (self.table_state.selected(), self.results().len()) {
            (_, 0) => self.table_state.select(None),
            (None, _) => self.select(0),
            (Some(i), len) if i >= len => self.select(len - 1),
            _ => {}
        }

        let chip_count = self.chips().len();
        self.chip_cursor = match self.chip_cursor {
            _ if chip_count == 0 => None,
            Some(i) => Some(i.min(chip_count - 1)),
            None => None,
        };

        let tag_count = self.selected_record().map_or(0, |r| r.tags.len());
        if self.tag_cursor >= tag_count {
            self.tag_cursor = 0;
        }
    }

    // ── Text entry ───────────────────────────────────────────────────

    fn open_prompt(&mut self, mode: InputMode) {
        self.mode = mode;
        self.prompt.reset();
        self.prompt_error = None;
    }

    fn close_prompt(&mut self) {
        self.mode = InputMode::Normal;
        self.prompt.reset();
        self.prompt_error = None;
    }

    fn handle_query_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Down | KeyCode::Tab => {
                self.mode = InputMode::Normal;
                None
            }
            _ => {
                let changed = self.query.handle(input_request(key)?)?;
                changed
                    .value
                    .then(|| Action::SetQuery(self.query.value().to_owned()))
            }
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => {
                self.close_prompt();
                None
            }
            KeyCode::Enter => self.submit_prompt(),
            _ => {
                if let Some(changed) = input_request(key).and_then(|r| self.prompt.handle(r)) {
                    if changed.value {
                        self.prompt_error = None;
                    }
                }
                None
            }
        }
    }

    fn submit_prompt(&mut self) -> Option<Action> {
        let text = self.prompt.value().trim().to_owned();
        let outcome = match self.mode {
            InputMode::Facet => parse_facet(&text)
                .map(|(kind, value)| Action::AddToken(kind, value))
                .map_err(|e| e.to_string()),
            InputMode::Exclusion => self
                .validate_exclusion(&text)
                .map(|()| Action::AddExclusion(text))
                .map_err(|e| e.to_string()),
            InputMode::Normal | InputMode::Query => return None,
        };
        match outcome {
            Ok(action) => {
                self.close_prompt();
                Some(action)
            }
            Err(message) => {
                tracing::debug!(input = %self.prompt.value(), %message, "prompt input rejected");
                self.prompt_error = Some(message);
                None
            }
        }
    }

    /// Same checks the session applies, so the message shows inline
    /// before anything is sent.
    fn validate_exclusion(&self, text: &str) -> Result<(), RangeError> {
        let mut current = ExclusionRangeSet::parse_all(&self.snapshot.exclusions)
            .unwrap_or_else(|_| ExclusionRangeSet::new());
        current.add(text).map(|_| ())
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_query(&self, frame: &mut Frame, area: Rect) {
        let editing = self.mode == InputMode::Query;
        let block = Block::default()
            .title(Span::styled(" Search ", theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if editing {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.query.value().is_empty() && !editing {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "press / to search domains, IPs, titles, tags…",
                    theme::key_hint(),
                )),
                inner,
            );
            return;
        }

        let width = usize::from(inner.width.saturating_sub(1).max(1));
        let scroll = self.query.visual_scroll(width);
        frame.render_widget(
            Paragraph::new(Span::styled(
                self.query.value(),
                Style::default().fg(theme::NEON_CYAN),
            ))
            .scroll((0, to_u16(scroll))),
            inner,
        );
        if editing {
            let offset = to_u16(self.query.visual_cursor().saturating_sub(scroll));
            frame.set_cursor_position((inner.x.saturating_add(offset), inner.y));
        }
    }

    fn render_chips(&self, frame: &mut Frame, area: Rect) {
        let chips = self.chips();
        let mut spans = vec![Span::styled(" Filters ", theme::key_hint())];
        if chips.is_empty() {
            spans.push(Span::styled("none", theme::key_hint()));
        }
        for (i, chip) in chips.iter().enumerate() {
            let (text, style) = match chip {
                Chip::Token(token) => (format!(" {} ", token.chip_label()), theme::token_chip()),
                Chip::Exclusion(range) => (format!(" ⊘ {range} "), theme::exclusion_chip()),
            };
            let style = if self.chip_cursor == Some(i) {
                theme::chip_selected()
            } else {
                style
            };
            spans.push(Span::styled(text, style));
            spans.push(Span::raw(" "));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_status_line(&self, frame: &mut Frame, area: Rect) {
        let snap = &self.snapshot;
        let [spinner_area, text_area] = if snap.is_loading() {
            Layout::horizontal([Constraint::Length(14), Constraint::Min(0)]).areas(area)
        } else {
            Layout::horizontal([Constraint::Length(0), Constraint::Min(0)]).areas(area)
        };

        if snap.is_loading() {
            let throbber = throbber_widgets_tui::Throbber::default()
                .label("Searching…")
                .style(Style::default().fg(theme::NEON_CYAN))
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(throbber, spinner_area, &mut self.throbber_state.clone());
        }

        let line = if snap.using_fallback() {
            let mut spans = vec![Span::styled(
                " ⚠ Backend unavailable: showing bundled sample data",
                theme::fallback_banner(),
            )];
            if let Some(ref reason) = snap.error {
                spans.push(Span::styled(format!("  ({reason})"), theme::key_hint()));
            }
            Line::from(spans)
        } else if snap.status == SearchStatus::Idle {
            Line::from(Span::styled(" Ready", theme::key_hint()))
        } else {
            Line::from(Span::styled(
                format!(" {}", summary(snap)),
                Style::default().fg(theme::DIM_WHITE),
            ))
        };
        frame.render_widget(Paragraph::new(line), text_area);
    }

    fn render_results(&self, frame: &mut Frame, area: Rect) {
        let title = match self.snapshot.total {
            Some(total) => format!(" Results ({total}) "),
            None => " Results ".to_owned(),
        };
        let block = Block::default()
            .title(Span::styled(title, theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused && self.mode == InputMode::Normal {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        if self.results().is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let text = if self.snapshot.is_loading() {
                "Loading…"
            } else {
                "No results"
            };
            frame.render_widget(
                Paragraph::new(Span::styled(format!("  {text}"), theme::key_hint())),
                inner,
            );
            return;
        }

        let header = Row::new(["Target", "IP", "Status", "Tags"]).style(theme::table_header());
        let rows: Vec<Row> = self
            .results()
            .iter()
            .map(|r| {
                Row::new([
                    Cell::from(locator(r)),
                    Cell::from(r.ip_address.clone().unwrap_or_else(|| "─".into())),
                    Cell::from(badge_line(r)),
                    Cell::from(Span::styled(
                        r.tags.chips().join(" "),
                        Style::default().fg(theme::LIGHT_BLUE),
                    )),
                ])
                .style(theme::table_row())
            })
            .collect();

        let widths = [
            Constraint::Fill(3),
            Constraint::Length(15),
            Constraint::Fill(4),
            Constraint::Fill(2),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(theme::table_selected())
            .highlight_symbol("▸ ");

        let mut state = self.table_state;
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Span::styled(" Detail ", theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(record) = self.selected_record() else {
            return;
        };

        let dim = Style::default().fg(theme::DIM_WHITE);
        let title = record
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("(no title)");

        let mut facts = vec![Span::styled(format!(" #{}", record.id), theme::key_hint())];
        if let Some(ref user) = record.username {
            facts.push(Span::styled("  user ", theme::key_hint()));
            facts.push(Span::styled(user.clone(), dim));
        }
        if !record.created_at.is_empty() {
            facts.push(Span::styled("  first seen ", theme::key_hint()));
            facts.push(Span::styled(first_seen(record), dim));
        }

        let mut tags = vec![Span::styled(" tags ", theme::key_hint())];
        if record.tags.is_empty() {
            tags.push(Span::styled("none", theme::key_hint()));
        }
        for (i, chip) in record.tags.chips().into_iter().enumerate() {
            let style = if i == self.tag_cursor {
                theme::chip_selected()
            } else {
                theme::token_chip()
            };
            tags.push(Span::styled(format!(" {chip} "), style));
            tags.push(Span::raw(" "));
        }

        let lines = vec![
            Line::from(Span::styled(
                format!(" {title}"),
                Style::default()
                    .fg(theme::ELECTRIC_PURPLE)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(format!(" {}", record.uri), dim)),
            Line::from(facts),
            Line::from(tags),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let label = match self.mode {
            InputMode::Facet => " facet kind:value › ",
            InputMode::Exclusion => " exclude IP range › ",
            InputMode::Normal | InputMode::Query => {
                frame.render_widget(Paragraph::new(self.key_hints()), area);
                return;
            }
        };

        let mut spans = vec![
            Span::styled(label, theme::key_hint_key()),
            Span::styled(self.prompt.value(), Style::default().fg(theme::NEON_CYAN)),
        ];
        if let Some(ref err) = self.prompt_error {
            spans.push(Span::styled(
                format!("   {err}"),
                Style::default().fg(theme::ERROR_RED),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);

        let offset = to_u16(label.chars().count() + self.prompt.visual_cursor());
        frame.set_cursor_position((area.x.saturating_add(offset), area.y));
    }

    fn key_hints(&self) -> Line<'static> {
        let pairs: &[(&str, &str)] = if self.mode == InputMode::Query {
            &[("Enter/Esc ", "done  "), ("Ctrl+u ", "clear")]
        } else {
            &[
                ("/ ", "search  "),
                ("f ", "facet  "),
                ("e ", "exclude  "),
                ("[ ] ", "chips  "),
                ("d ", "remove  "),
                ("t ", "tag  "),
                ("Enter ", "filter by tag  "),
                ("n/p ", "page  "),
                ("r ", "refresh"),
            ]
        };
        let mut spans = vec![Span::raw(" ")];
        for (key, label) in pairs {
            spans.push(Span::styled(*key, theme::key_hint_key()));
            spans.push(Span::styled(*label, theme::key_hint()));
        }
        Line::from(spans)
    }
}

impl Default for SearchScreen {
    fn default() -> Self {
        Self::new()
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Map an editing key onto a text-field request.
fn input_request(key: KeyEvent) -> Option<InputRequest> {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => Some(InputRequest::DeleteLine),
        (KeyModifiers::CONTROL, KeyCode::Char('w') | KeyCode::Backspace) => {
            Some(InputRequest::DeletePrevWord)
        }
        (KeyModifiers::CONTROL, KeyCode::Char('a')) | (_, KeyCode::Home) => {
            Some(InputRequest::GoToStart)
        }
        (KeyModifiers::CONTROL, KeyCode::Char('e')) | (_, KeyCode::End) => {
            Some(InputRequest::GoToEnd)
        }
        (_, KeyCode::Backspace) => Some(InputRequest::DeletePrevChar),
        (_, KeyCode::Delete) => Some(InputRequest::DeleteNextChar),
        (_, KeyCode::Left) => Some(InputRequest::GoToPrevChar),
        (_, KeyCode::Right) => Some(InputRequest::GoToNextChar),
        (m, KeyCode::Char(c)) if !m.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            Some(InputRequest::InsertChar(c))
        }
        _ => None,
    }
}

/// Status badges for a row, coloured by tone. Titles live in the detail
/// pane instead.
fn badge_line(record: &ResultRecord) -> Line<'static> {
    let mut spans = Vec::new();
    for badge in StatusIndicator::for_record(record)
        .into_iter()
        .filter(|b| !matches!(b, StatusIndicator::Title(_)))
    {
        if !spans.is_empty() {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            badge.label(),
            Style::default().fg(theme::tone_color(badge.tone())),
        ));
    }
    Line::from(spans)
}

fn summary(snap: &SearchSnapshot) -> String {
    let shown = snap.results.len();
    let mut out = match snap.total {
        Some(total) => format!("{shown} of {total} results"),
        None => format!("{shown} results"),
    };
    if let Some(pages) = snap.pages {
        let _ = write!(out, " · page {}/{pages}", snap.page);
    }
    out
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

// ── Component ───────────────────────────────────────────────────────

impl Component for SearchScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match self.mode {
            InputMode::Query => return Ok(self.handle_query_key(key)),
            InputMode::Facet | InputMode::Exclusion => return Ok(self.handle_prompt_key(key)),
            InputMode::Normal => {}
        }

        let action = match key.code {
            KeyCode::Char('/' | 'i') => {
                self.mode = InputMode::Query;
                None
            }
            KeyCode::Char('f') => {
                self.open_prompt(InputMode::Facet);
                None
            }
            KeyCode::Char('e') => {
                self.open_prompt(InputMode::Exclusion);
                None
            }
            KeyCode::Char(']') => {
                self.move_chip(true);
                None
            }
            KeyCode::Char('[') => {
                self.move_chip(false);
                None
            }
            KeyCode::Char('d') | KeyCode::Backspace | KeyCode::Delete => {
                self.remove_selected_chip()
            }
            KeyCode::Char('c') => Some(Action::ClearTokens),
            KeyCode::Char('j') | KeyCode::Down => {
                self.select_next();
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.select_prev();
                None
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.select(0);
                None
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.select(usize::MAX);
                None
            }
            KeyCode::Char('t') => {
                self.cycle_tag();
                None
            }
            KeyCode::Enter => self.selected_tag_token(),
            KeyCode::Char('n') | KeyCode::PageDown => self.next_page(),
            KeyCode::Char('p') | KeyCode::PageUp => self.prev_page(),
            KeyCode::Char('r') => Some(Action::Refresh),
            KeyCode::Esc => {
                self.chip_cursor = None;
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::SnapshotUpdated(snapshot) => self.apply_snapshot(snapshot),
            Action::Tick if self.snapshot.is_loading() => self.throbber_state.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [query, chips, status, results, detail, footer] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .areas(area);

        self.render_query(frame, query);
        self.render_chips(frame, chips);
        self.render_status_line(frame, status);
        self.render_results(frame, results);
        self.render_detail(frame, detail);
        self.render_footer(frame, footer);
    }

    fn captures_input(&self) -> bool {
        self.mode != InputMode::Normal
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "Search"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use breachwatch_core::{FacetError, FilterKind, TokenSet, fallback_records};
    use pretty_assertions::assert_eq;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(screen: &mut SearchScreen, text: &str) -> Vec<Action> {
        text.chars()
            .filter_map(|c| screen.handle_key_event(key(KeyCode::Char(c))).unwrap())
            .collect()
    }

    fn with_snapshot(snapshot: SearchSnapshot) -> SearchScreen {
        let mut screen = SearchScreen::new();
        screen
            .update(&Action::SnapshotUpdated(Arc::new(snapshot)))
            .unwrap();
        screen
    }

    #[test]
    fn query_edits_emit_set_query() {
        let mut screen = SearchScreen::new();
        screen.handle_key_event(key(KeyCode::Char('/'))).unwrap();
        assert!(screen.captures_input());

        let actions = type_text(&mut screen, "ad");
        let queries: Vec<String> = actions
            .into_iter()
            .map(|a| match a {
                Action::SetQuery(q) => q,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(queries, vec!["a", "ad"]);

        let back = screen.handle_key_event(key(KeyCode::Backspace)).unwrap();
        assert!(matches!(back, Some(Action::SetQuery(ref q)) if q == "a"));

        screen.handle_key_event(key(KeyCode::Esc)).unwrap();
        assert!(!screen.captures_input());
    }

    #[test]
    fn facet_prompt_adds_token() {
        let mut screen = SearchScreen::new();
        screen.handle_key_event(key(KeyCode::Char('f'))).unwrap();
        assert!(type_text(&mut screen, "login_type:otp").is_empty());

        let action = screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(matches!(
            action,
            Some(Action::AddToken(FilterKind::LoginType, ref v)) if v == "otp"
        ));
        assert!(!screen.captures_input());
    }

    #[test]
    fn facet_prompt_rejects_unknown_kind_inline() {
        let mut screen = SearchScreen::new();
        screen.handle_key_event(key(KeyCode::Char('f'))).unwrap();
        type_text(&mut screen, "colour:red");

        assert!(screen.handle_key_event(key(KeyCode::Enter)).unwrap().is_none());
        assert!(screen.captures_input());
        assert_eq!(
            screen.prompt_error.as_deref(),
            Some(FacetError::UnknownKind("colour".into()).to_string().as_str())
        );

        // Editing clears the message.
        screen.handle_key_event(key(KeyCode::Backspace)).unwrap();
        assert!(screen.prompt_error.is_none());
    }

    #[test]
    fn exclusion_prompt_shows_range_errors() {
        let mut screen = with_snapshot(SearchSnapshot {
            exclusions: vec!["10.0.0.0/8".into()],
            ..SearchSnapshot::default()
        });

        screen.handle_key_event(key(KeyCode::Char('e'))).unwrap();
        type_text(&mut screen, "10.0.0.0/8");
        assert!(screen.handle_key_event(key(KeyCode::Enter)).unwrap().is_none());
        assert_eq!(
            screen.prompt_error,
            Some(RangeError::Duplicate("10.0.0.0/8".into()).to_string())
        );

        screen.handle_key_event(key(KeyCode::Esc)).unwrap();
        screen.handle_key_event(key(KeyCode::Char('e'))).unwrap();
        type_text(&mut screen, "300.1.1.1");
        assert!(screen.handle_key_event(key(KeyCode::Enter)).unwrap().is_none());
        assert_eq!(
            screen.prompt_error,
            Some(RangeError::Malformed("300.1.1.1".into()).to_string())
        );

        screen.handle_key_event(key(KeyCode::Esc)).unwrap();
        screen.handle_key_event(key(KeyCode::Char('e'))).unwrap();
        type_text(&mut screen, "203.0.113.0/24");
        let action = screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(matches!(action, Some(Action::AddExclusion(ref r)) if r == "203.0.113.0/24"));
    }

    #[test]
    fn chip_cursor_removes_tokens_then_exclusions() {
        let mut tokens = TokenSet::new();
        let status = tokens.add(FilterKind::Status, "breached");
        let mut screen = with_snapshot(SearchSnapshot {
            tokens: tokens.as_slice().to_vec(),
            exclusions: vec!["10.0.0.0/8".into()],
            ..SearchSnapshot::default()
        });

        assert!(screen.handle_key_event(key(KeyCode::Char('d'))).unwrap().is_none());

        screen.handle_key_event(key(KeyCode::Char(']'))).unwrap();
        let action = screen.handle_key_event(key(KeyCode::Char('d'))).unwrap();
        assert!(matches!(action, Some(Action::RemoveToken(id)) if id == status.id));

        screen.handle_key_event(key(KeyCode::Char(']'))).unwrap();
        let action = screen.handle_key_event(key(KeyCode::Backspace)).unwrap();
        assert!(matches!(action, Some(Action::RemoveExclusion(ref r)) if r == "10.0.0.0/8"));

        // Wraps back to the first chip.
        screen.handle_key_event(key(KeyCode::Char(']'))).unwrap();
        assert_eq!(screen.chip_cursor, Some(0));
    }

    #[test]
    fn enter_filters_by_selected_tag() {
        let records = fallback_records();
        let first_tagged = records.iter().position(|r| r.tags.len() > 1).unwrap();
        let expected = tag_token_value(records[first_tagged].tags.iter().nth(1).unwrap());

        let mut screen = with_snapshot(SearchSnapshot {
            results: Arc::new(records),
            ..SearchSnapshot::default()
        });
        assert_eq!(screen.table_state.selected(), Some(0));

        for _ in 0..first_tagged {
            screen.handle_key_event(key(KeyCode::Char('j'))).unwrap();
        }
        screen.handle_key_event(key(KeyCode::Char('t'))).unwrap();
        let action = screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        match action {
            Some(Action::AddToken(kind, value)) => assert_eq!((kind, value), expected),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn paging_respects_bounds() {
        let mut screen = with_snapshot(SearchSnapshot {
            page: 1,
            pages: Some(2),
            ..SearchSnapshot::default()
        });
        assert!(screen.handle_key_event(key(KeyCode::Char('p'))).unwrap().is_none());
        assert!(matches!(
            screen.handle_key_event(key(KeyCode::Char('n'))).unwrap(),
            Some(Action::SetPage(2))
        ));

        let mut screen = with_snapshot(SearchSnapshot {
            page: 2,
            pages: Some(2),
            ..SearchSnapshot::default()
        });
        assert!(screen.handle_key_event(key(KeyCode::Char('n'))).unwrap().is_none());
        assert!(matches!(
            screen.handle_key_event(key(KeyCode::Char('p'))).unwrap(),
            Some(Action::SetPage(1))
        ));
    }

    #[test]
    fn selection_is_clamped_when_results_shrink() {
        let mut screen = with_snapshot(SearchSnapshot {
            results: Arc::new(fallback_records()),
            ..SearchSnapshot::default()
        });
        screen.handle_key_event(key(KeyCode::Char('G'))).unwrap();
        assert_eq!(screen.table_state.selected(), Some(5));

        let one = fallback_records().into_iter().take(1).collect();
        screen
            .update(&Action::SnapshotUpdated(Arc::new(SearchSnapshot {
                results: Arc::new(one),
                ..SearchSnapshot::default()
            })))
            .unwrap();
        assert_eq!(screen.table_state.selected(), Some(0));

        screen
            .update(&Action::SnapshotUpdated(Arc::new(SearchSnapshot::default())))
            .unwrap();
        assert_eq!(screen.table_state.selected(), None);
    }

    #[test]
    fn badges_skip_title() {
        let record = fallback_records().into_iter().next().unwrap();
        let text: String = badge_line(&record)
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(text.starts_with("Accessible") || text.starts_with("Inaccessible"));
        if let Some(title) = record.title.as_deref() {
            assert!(!text.contains(title));
        }
    }
}
