//! Application core: event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use breachwatch_core::{SearchBackend, SearchSession, SearchStatus};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;

/// How long a toast stays up.
const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Backend state as the status bar shows it, derived from snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum BackendState {
    #[default]
    Idle,
    Searching,
    Live,
    Fallback,
}

/// Top-level application state and event loop.
pub struct App<B: SearchBackend> {
    active_screen: ScreenId,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    help_visible: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    session: SearchSession<B>,
    /// Profile name and backend URL for the status bar.
    origin: String,
    data_cancel: CancellationToken,
    metrics_refresh_tx: mpsc::UnboundedSender<()>,
    /// Handed to the bridge on start.
    metrics_refresh_rx: Option<mpsc::UnboundedReceiver<()>>,
    notification: Option<(Notification, Instant)>,
    backend_state: BackendState,
    /// Last fallback reason already announced, so a failing backend
    /// produces one toast rather than one per keystroke.
    announced_error: Option<String>,
}

impl<B: SearchBackend> App<B> {
    pub fn new(session: SearchSession<B>, origin: impl Into<String>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (metrics_refresh_tx, metrics_refresh_rx) = mpsc::unbounded_channel();

        Self {
            active_screen: ScreenId::default(),
            screens: create_screens().into_iter().collect(),
            running: true,
            help_visible: false,
            action_tx,
            action_rx,
            session,
            origin: origin.into(),
            data_cancel: CancellationToken::new(),
            metrics_refresh_tx,
            metrics_refresh_rx: Some(metrics_refresh_rx),
            notification: None,
            backend_state: BackendState::default(),
            announced_error: None,
        }
    }

    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        Ok(())
    }

    /// Spawn the data bridge and fire the opening search.
    fn start_data(&mut self) {
        if let Some(refresh_rx) = self.metrics_refresh_rx.take() {
            crate::data_bridge::spawn_data_bridge(
                self.session.clone(),
                self.action_tx.clone(),
                refresh_rx,
                self.data_cancel.clone(),
            );
        }
        self.session.refresh();
    }

    /// Run the main event loop until quit.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.init_screens()?;
        self.start_data();

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!(origin = %self.origin, "TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize | Event::Render => self.action_tx.send(Action::Render)?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        self.session.cancel_pending();
        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Text entry on the active screen sees
    /// every key but Ctrl+C; otherwise global keys win and the rest are
    /// delegated.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?' | 'q') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        let capturing = self
            .screens
            .get(&self.active_screen)
            .is_some_and(|s| s.captures_input());

        if !capturing {
            match (key.modifiers, key.code) {
                (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
                (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('?')) => {
                    return Ok(Some(Action::ToggleHelp));
                }
                (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='9')) => {
                    let n = u8::try_from(c).map_or(0, |b| b - b'0');
                    if let Some(screen) = ScreenId::from_number(n) {
                        return Ok(Some(Action::SwitchScreen(screen)));
                    }
                }
                (KeyModifiers::NONE, KeyCode::Tab) => {
                    return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
                }
                (KeyModifiers::SHIFT, KeyCode::BackTab) => {
                    return Ok(Some(Action::SwitchScreen(self.active_screen.prev())));
                }
                _ => {}
            }
        }

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }
        Ok(None)
    }

    /// Apply one action to app state, the session, and the screens.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Render => {}

            Action::SwitchScreen(target) => {
                if *target != self.active_screen {
                    debug!("switching screen: {} → {}", self.active_screen, target);
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(false);
                    }
                    self.active_screen = *target;
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(true);
                    }
                }
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            // ── Session mutations ──────────────────────────────────
            Action::SetQuery(query) => self.session.set_query(query.as_str()),
            Action::AddToken(kind, value) => {
                let token = self.session.add_token(*kind, value.as_str());
                debug!(kind = %token.kind, value = %token.value, "token added");
            }
            Action::RemoveToken(id) => {
                self.session.remove_token(*id);
            }
            Action::ClearTokens => self.session.clear_tokens(),
            Action::AddExclusion(range) => match self.session.add_exclusion(range) {
                Ok(added) => {
                    self.action_tx.send(Action::Notify(Notification::success(format!(
                        "Excluding {}",
                        added.as_str()
                    ))))?;
                }
                Err(e) => {
                    self.action_tx
                        .send(Action::Notify(Notification::error(e.to_string())))?;
                }
            },
            Action::RemoveExclusion(range) => {
                self.session.remove_exclusion(range);
            }
            Action::SetPage(page) => self.session.set_page(*page),
            Action::Refresh => self.session.refresh(),
            Action::RefreshMetrics => {
                let _ = self.metrics_refresh_tx.send(());
                self.action_tx
                    .send(Action::Notify(Notification::info("Reloading statistics…")))?;
            }

            // ── Data ───────────────────────────────────────────────
            Action::SnapshotUpdated(snapshot) => {
                self.backend_state = if snapshot.is_loading() {
                    BackendState::Searching
                } else if snapshot.using_fallback() {
                    BackendState::Fallback
                } else if snapshot.status == SearchStatus::Success {
                    BackendState::Live
                } else {
                    BackendState::Idle
                };

                match snapshot.status {
                    SearchStatus::ErrorWithFallback if snapshot.error != self.announced_error => {
                        self.announced_error.clone_from(&snapshot.error);
                        self.action_tx.send(Action::Notify(Notification::warning(
                            "Backend unavailable, showing sample data",
                        )))?;
                    }
                    SearchStatus::Success => self.announced_error = None,
                    _ => {}
                }

                self.broadcast(action)?;
            }

            Action::MetricsUpdated(_) => self.broadcast(action)?,

            Action::Tick => {
                if let Some((_, created)) = &self.notification {
                    if created.elapsed() > NOTIFICATION_TTL {
                        self.notification = None;
                    }
                }
                self.broadcast(action)?;
            }

            Action::Notify(n) => {
                self.notification = Some((n.clone(), Instant::now()));
            }
        }

        Ok(())
    }

    /// Send an action to every screen so background ones stay current.
    fn broadcast(&mut self, action: &Action) -> Result<()> {
        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let [content_area, tab_area, status_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, content_area);
        }

        self.render_tab_bar(frame, tab_area);
        self.render_status_bar(frame, status_area);

        if let Some((ref notif, _)) = self.notification {
            render_notification(frame, area, notif);
        }

        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(
                    format!(" {} {} ", id.number(), id.label()),
                    style,
                ))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );

        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let indicator = match self.backend_state {
            BackendState::Live => Span::styled("● live", Style::default().fg(theme::SUCCESS_GREEN)),
            BackendState::Searching => Span::styled(
                "◐ searching",
                Style::default().fg(theme::ELECTRIC_YELLOW),
            ),
            BackendState::Fallback => Span::styled(
                "⚠ sample data",
                Style::default().fg(theme::ELECTRIC_YELLOW),
            ),
            BackendState::Idle => Span::styled("○ idle", theme::key_hint()),
        };

        let line = Line::from(vec![
            Span::raw(" "),
            indicator,
            Span::styled(format!("  {}", self.origin), theme::key_hint()),
            Span::styled(" │ ? help  Tab screens  q quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Centered keyboard reference.
fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_width = 58u16.min(area.width.saturating_sub(4));
    let help_height = 24u16.min(area.height.saturating_sub(2));

    let x = (area.width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_DARK)),
        help_area,
    );

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused());

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(
            format!("  {title}"),
            Style::default().fg(theme::NEON_CYAN),
        ))
    };
    let entry = |key: &'static str, text: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key:<12}"), theme::key_hint_key()),
            Span::styled(text, theme::key_hint()),
        ])
    };

    let help_text = vec![
        Line::from(""),
        section("Search"),
        entry("/", "Edit query (Enter/Esc to finish)"),
        entry("f", "Add facet, e.g. status:breached"),
        entry("e", "Exclude an IP range, e.g. 10.0.0.0/8"),
        entry("[ ]", "Move between filter chips"),
        entry("d", "Remove selected chip"),
        entry("c", "Clear all facets"),
        entry("j/k ↑/↓", "Move through results"),
        entry("t / Enter", "Pick a tag / filter by it"),
        entry("n/p", "Next / previous page"),
        entry("r", "Search again"),
        Line::from(""),
        section("Dashboard"),
        entry("r", "Reload statistics"),
        Line::from(""),
        section("Global"),
        entry("1-2 Tab", "Switch screen"),
        entry("?", "This help"),
        entry("q Ctrl+c", "Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "                   Esc or ? to close",
            theme::key_hint(),
        )),
    ];

    frame.render_widget(Paragraph::new(help_text), inner);
}

/// Toast in the bottom-right corner, above the status bar.
fn render_notification(frame: &mut Frame, area: Rect, notif: &Notification) {
    let msg_len = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
    let width = msg_len
        .saturating_add(6)
        .clamp(20, 70)
        .min(area.width.saturating_sub(2));
    let height = 3u16;

    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 2);
    let toast_area = Rect::new(area.x + x, area.y + y, width, height);

    let (border_color, icon) = match notif.level {
        NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
        NotificationLevel::Error => (theme::ERROR_RED, "✗"),
        NotificationLevel::Warning => (theme::ELECTRIC_YELLOW, "!"),
        NotificationLevel::Info => (theme::NEON_CYAN, "·"),
    };

    frame.render_widget(Clear, toast_area);
    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_DARK)),
        toast_area,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color));

    let inner = block.inner(toast_area);
    frame.render_widget(block, toast_area);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
        Span::styled(notif.message.as_str(), Style::default().fg(theme::DIM_WHITE)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use breachwatch_core::{
        CoreError, FilterKind, SearchConfig, SearchPage, SearchParams, SearchSnapshot,
        SecurityMetrics,
    };

    use super::*;

    struct Unreachable;

    impl SearchBackend for Unreachable {
        async fn search(&self, _params: &SearchParams) -> Result<SearchPage, CoreError> {
            Err(CoreError::Timeout)
        }

        async fn statistics(&self) -> Result<SecurityMetrics, CoreError> {
            Err(CoreError::Timeout)
        }
    }

    fn app() -> App<Unreachable> {
        let config = SearchConfig::new("http://localhost:5000".parse().unwrap());
        let session = SearchSession::new(Unreachable, &config).unwrap();
        App::new(session, "default @ http://localhost:5000")
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn global_keys_yield_to_text_entry() {
        let mut app = app();
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Char('q'))).unwrap(),
            Some(Action::Quit)
        ));

        // Open the query box, then 'q' and '2' are just text.
        app.handle_key_event(key(KeyCode::Char('/'))).unwrap();
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Char('q'))).unwrap(),
            Some(Action::SetQuery(ref q)) if q == "q"
        ));
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Char('2'))).unwrap(),
            Some(Action::SetQuery(ref q)) if q == "q2"
        ));

        // Ctrl+C always quits.
        assert!(matches!(
            app.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
                .unwrap(),
            Some(Action::Quit)
        ));
    }

    #[tokio::test]
    async fn number_keys_and_tab_switch_screens() {
        let mut app = app();
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Char('2'))).unwrap(),
            Some(Action::SwitchScreen(ScreenId::Dashboard))
        ));
        app.process_action(&Action::SwitchScreen(ScreenId::Dashboard))
            .unwrap();
        assert_eq!(app.active_screen, ScreenId::Dashboard);
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Tab)).unwrap(),
            Some(Action::SwitchScreen(ScreenId::Search))
        ));
    }

    #[tokio::test]
    async fn help_overlay_swallows_keys() {
        let mut app = app();
        app.process_action(&Action::ToggleHelp).unwrap();
        assert!(app.handle_key_event(key(KeyCode::Char('2'))).unwrap().is_none());
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Esc)).unwrap(),
            Some(Action::ToggleHelp)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn actions_drive_the_session() {
        let mut app = app();
        app.process_action(&Action::SetQuery("admin".into()))
            .unwrap();
        app.process_action(&Action::AddToken(FilterKind::Status, "breached".into()))
            .unwrap();
        app.process_action(&Action::AddExclusion("203.0.113.0/24".into()))
            .unwrap();

        let snap = app.session.snapshot();
        assert_eq!(snap.query, "admin");
        assert_eq!(snap.tokens.len(), 1);
        assert!(snap.exclusions.iter().any(|r| r == "203.0.113.0/24"));

        let Ok(Action::Notify(n)) = app.action_rx.try_recv() else {
            panic!("expected a notification");
        };
        assert_eq!(n.level, NotificationLevel::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_exclusion_notifies_error() {
        let mut app = app();
        app.process_action(&Action::AddExclusion("10.0.0.0/8".into()))
            .unwrap();
        let Ok(Action::Notify(n)) = app.action_rx.try_recv() else {
            panic!("expected a notification");
        };
        assert_eq!(n.level, NotificationLevel::Error);
        assert!(n.message.contains("already excluded"));
    }

    #[tokio::test]
    async fn fallback_is_announced_once() {
        let mut app = app();
        let failed = Arc::new(SearchSnapshot {
            status: SearchStatus::ErrorWithFallback,
            source: breachwatch_core::ResultSource::Fallback,
            error: Some("timed out".into()),
            ..SearchSnapshot::default()
        });

        app.process_action(&Action::SnapshotUpdated(Arc::clone(&failed)))
            .unwrap();
        app.process_action(&Action::SnapshotUpdated(failed)).unwrap();

        let notes: Vec<Action> = std::iter::from_fn(|| app.action_rx.try_recv().ok()).collect();
        assert_eq!(notes.len(), 1);
        assert!(matches!(
            notes[0],
            Action::Notify(Notification { level: NotificationLevel::Warning, .. })
        ));
        assert_eq!(app.backend_state, BackendState::Fallback);
    }
}
