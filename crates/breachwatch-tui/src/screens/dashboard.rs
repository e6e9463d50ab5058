//! Dashboard screen: headline counters and the login-form distribution.

use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, BorderType, Borders, Paragraph};

use breachwatch_core::{MetricsReport, ResultSource, SecurityMetrics};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

pub struct DashboardScreen {
    focused: bool,
    report: Option<Arc<MetricsReport>>,
    updated_at: Option<Instant>,
    throbber_state: throbber_widgets_tui::ThrobberState,
}

impl DashboardScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            report: None,
            updated_at: None,
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
        }
    }

    fn render_source(&self, frame: &mut Frame, area: Rect, report: &MetricsReport) {
        let age = self
            .updated_at
            .map(|t| freshness(t.elapsed()))
            .unwrap_or_default();

        let line = if report.using_fallback() {
            let mut spans = vec![Span::styled(
                " ⚠ Statistics unavailable: figures derived from bundled sample data",
                theme::fallback_banner(),
            )];
            if let Some(ref reason) = report.error {
                spans.push(Span::styled(format!("  ({reason})"), theme::key_hint()));
            }
            Line::from(spans)
        } else {
            Line::from(vec![
                Span::styled(" ● ", Style::default().fg(theme::SUCCESS_GREEN)),
                Span::styled("live statistics", Style::default().fg(theme::DIM_WHITE)),
                Span::styled(format!("  {age}"), theme::key_hint()),
            ])
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_cards(frame: &mut Frame, area: Rect, m: &SecurityMetrics) {
        let cards = [
            (
                "Records",
                m.total,
                format!("{} unique domains", m.unique_domains),
                theme::NEON_CYAN,
            ),
            (
                "Unresolved",
                m.unresolved,
                format!("{} resolved", m.resolved),
                theme::ERROR_RED,
            ),
            (
                "Inaccessible",
                m.inaccessible,
                format!("{} accessible", m.accessible),
                theme::ELECTRIC_YELLOW,
            ),
            (
                "Login Forms",
                m.login_forms,
                format!("{} parked", m.parked),
                theme::CORAL,
            ),
            (
                "Breached",
                m.previously_breached,
                "previously breached".to_owned(),
                theme::ELECTRIC_PURPLE,
            ),
        ];

        let areas = Layout::horizontal([Constraint::Fill(1); 5]).split(area);
        for ((label, value, detail, color), card_area) in cards.into_iter().zip(areas.iter()) {
            render_card(frame, *card_area, label, value, &detail, color);
        }
    }

    fn render_distribution(frame: &mut Frame, area: Rect, m: &SecurityMetrics) {
        let block = Block::default()
            .title(Span::styled(" Login Form Types ", theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());

        let bars: Vec<Bar> = m
            .login_form_distribution
            .entries()
            .iter()
            .zip(theme::CHART_SERIES.iter().cycle())
            .map(|(&(kind, count), &color)| {
                Bar::default()
                    .value(count)
                    .label(Line::from(kind.label()))
                    .style(Style::default().fg(color))
                    .value_style(Style::default().fg(theme::BG_DARK).bg(color))
            })
            .collect();

        let inner_width = block.inner(area).width;
        let bar_width = (inner_width.saturating_sub(8) / 4).clamp(3, 16);

        let chart = BarChart::default()
            .block(block)
            .data(BarGroup::default().bars(&bars))
            .bar_width(bar_width)
            .bar_gap(2);
        frame.render_widget(chart, area);
    }
}

impl Default for DashboardScreen {
    fn default() -> Self {
        Self::new()
    }
}

fn render_card(frame: &mut Frame, area: Rect, label: &str, value: u64, detail: &str, color: Color) {
    let block = Block::default()
        .title(Span::styled(format!(" {label} "), theme::title_style()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_default());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(Span::styled(
            format!(" {value}"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(format!(" {detail}"), theme::key_hint())),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

/// "updated 12s ago", to the second.
fn freshness(elapsed: Duration) -> String {
    format!(
        "updated {} ago",
        humantime::format_duration(Duration::from_secs(elapsed.as_secs()))
    )
}

impl Component for DashboardScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match key.code {
            KeyCode::Char('r') => Some(Action::RefreshMetrics),
            _ => None,
        })
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::MetricsUpdated(report) => {
                tracing::debug!(
                    source = %report.source,
                    total = report.metrics.total,
                    "dashboard metrics updated"
                );
                self.report = Some(Arc::clone(report));
                self.updated_at = Some(Instant::now());
            }
            Action::Tick if self.report.is_none() => self.throbber_state.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(ref report) = self.report else {
            let throbber = throbber_widgets_tui::Throbber::default()
                .label("  Loading statistics…")
                .style(Style::default().fg(theme::NEON_CYAN))
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            let [row] = Layout::vertical([Constraint::Length(1)]).areas(area);
            frame.render_stateful_widget(throbber, row, &mut self.throbber_state.clone());
            return;
        };

        let [source, cards, chart, hints] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(4),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .areas(area);

        self.render_source(frame, source, report);
        Self::render_cards(frame, cards, &report.metrics);
        Self::render_distribution(frame, chart, &report.metrics);

        let hint = Line::from(vec![
            Span::styled("  r ", theme::key_hint_key()),
            Span::styled("refresh  ", theme::key_hint()),
            Span::styled(
                match report.source {
                    ResultSource::Backend => "source: backend",
                    ResultSource::Fallback => "source: sample data",
                    ResultSource::None => "",
                },
                theme::key_hint(),
            ),
        ]);
        frame.render_widget(Paragraph::new(hint), hints);
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "Dashboard"
    }
}
