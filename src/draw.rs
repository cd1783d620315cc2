use chrono::Utc;
use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::match_list::{MatchList, kickoff_label};
use crate::components::standings::StandingsTable;
use crate::state::app_settings::DataSource;
use crate::state::app_state::StandingsSource;
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use interligues_api::{Card, CardColor, Category, Match, MatchDetail, Scorer, Sides};

static TABS: &[&str; 4] = &["Girls", "Boys", "Standings", "Match Detail"];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let drawn = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
            draw_status_line(f, layout.status, app);
        }

        match app.state.active_tab {
            MenuItem::Girls => draw_category(f, layout.main, app, Category::Girls),
            MenuItem::Boys => draw_category(f, layout.main, app, Category::Boys),
            MenuItem::Standings => draw_standings(f, layout.main, app),
            MenuItem::MatchDetail => draw_match_detail(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main, app),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });

    if drawn.is_err() {
        log::error!("failed to draw frame");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn tab_index(tab: MenuItem) -> Option<usize> {
    match tab {
        MenuItem::Girls => Some(0),
        MenuItem::Boys => Some(1),
        MenuItem::Standings => Some(2),
        MenuItem::MatchDetail => Some(3),
        MenuItem::Help => None,
    }
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    // The help page keeps the tab it was opened from underlined.
    let selected = tab_index(app.state.active_tab)
        .or_else(|| tab_index(app.state.previous_tab))
        .unwrap_or(0);

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(selected)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

// ---------------------------------------------------------------------------
// Match lists
// ---------------------------------------------------------------------------

fn draw_category(f: &mut Frame, area: Rect, app: &App, category: Category) {
    let block = default_border(Color::White).title(format!(" {} ", category.label()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let state = app.state.category(category);
    let Some(feed) = state.feed.as_ref() else {
        draw_waiting(f, inner, app, &format!("Loading {} matches...", category.label().to_lowercase()));
        return;
    };

    let [header, key_legend, search, phase_tabs, content] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Fill(1),
    ])
    .areas(inner);

    let phase_label = state.phase().map(|p| p.label.as_str()).unwrap_or("-");
    let header_text = format!(
        "Interligues U14 {} | Phase {}/{}: {} | {}",
        category.label(),
        state.selected_phase + 1,
        state.phase_count(),
        phase_label,
        app.settings.api.window,
    );
    f.render_widget(Paragraph::new(header_text), header);
    f.render_widget(
        Paragraph::new("Keys: h/l=phase  j/k=move  Enter=details  /=search  r=reload  s=sync  ?=help  q=quit")
            .style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );
    f.render_widget(search_line(app), search);

    let titles: Vec<Line> = feed.phases.iter().map(|p| Line::from(p.label.clone())).collect();
    f.render_widget(
        Tabs::new(titles)
            .select(state.selected_phase)
            .style(Style::default().fg(Color::Gray))
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        phase_tabs,
    );

    let matches = app.visible_matches(category);
    if matches.is_empty() {
        let msg = match app.state.search.term() {
            Some(term) => format!("No match for team \"{term}\" in this phase"),
            None => "No matches scheduled in this phase".to_string(),
        };
        f.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            content,
        );
        return;
    }

    f.render_widget(
        MatchList {
            matches: &matches,
            selected: state.selected_match,
            now: Utc::now(),
        },
        content,
    );
}

fn search_line(app: &App) -> Paragraph<'static> {
    let search = &app.state.search;
    if search.editing {
        return Paragraph::new(format!("Search team: {}_", search.input)).style(Style::default().fg(Color::Yellow));
    }
    match search.term() {
        Some(term) => Paragraph::new(format!("Team: {term}  (Esc clears)")).style(Style::default().fg(Color::Cyan)),
        None => Paragraph::new("/ to search a team").style(Style::default().fg(Color::DarkGray)),
    }
}

// ---------------------------------------------------------------------------
// Standings
// ---------------------------------------------------------------------------

fn draw_standings(f: &mut Frame, area: Rect, app: &App) {
    let standings = &app.state.standings;
    let block = default_border(Color::White).title(format!(" Standings: {} ", standings.category.label()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [header, key_legend, content] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(2), Constraint::Fill(1)]).areas(inner);

    let source = match standings.source {
        StandingsSource::Official => "Official classement".to_string(),
        StandingsSource::Computed => {
            let phase = app
                .state
                .category(standings.category)
                .phase()
                .map(|p| p.label.as_str())
                .unwrap_or("-");
            format!("Computed from {phase}")
        }
    };
    f.render_widget(Paragraph::new(format!("{} | {source}", standings.category.label())), header);

    let legend = if standings.official_available() {
        "Keys: c=category  o=official/computed  h/l=phase"
    } else {
        "Keys: c=category  h/l=phase"
    };
    f.render_widget(Paragraph::new(legend).style(Style::default().fg(Color::DarkGray)), key_legend);

    let rows = app.state.standings_rows();
    if rows.is_empty() {
        let msg = match standings.source {
            StandingsSource::Official if !standings.official.contains_key(&standings.category) => {
                "Loading official standings..."
            }
            _ => "No finished matches yet",
        };
        draw_waiting(f, content, app, msg);
        return;
    }

    f.render_widget(StandingsTable { rows: &rows }, content);
}

// ---------------------------------------------------------------------------
// Match detail
// ---------------------------------------------------------------------------

fn draw_match_detail(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Match Detail ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let state = &app.state.match_detail;
    let Some(summary) = state.summary.as_ref() else {
        f.render_widget(
            Paragraph::new("Select a match in Girls or Boys and press Enter")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    };

    let mut lines = summary_lines(summary);
    lines.push(Line::from(Span::styled(
        "Keys: j/k=scroll  a=all officials  Esc=back",
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));

    match state.detail.as_ref().filter(|d| d.match_id == summary.id) {
        Some(detail) => lines.extend(detail_lines(detail, summary, state.show_all_officials)),
        None => {
            let msg = match app.state.last_error.as_deref() {
                Some(err) => format!("Match sheet load failed: {err}"),
                None => "Loading match sheet...".to_string(),
            };
            lines.push(Line::from(Span::styled(msg, Style::default().fg(Color::DarkGray))));
        }
    }

    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((state.scroll_offset, 0)),
        inner,
    );
}

fn summary_lines(m: &Match) -> Vec<Line<'static>> {
    let score = m.score().map(|(h, a)| format!("{h} - {a}")).unwrap_or_else(|| "vs".to_string());
    let mut context = vec![kickoff_label(m.date)];
    if let Some(pool) = m.pool.as_deref() {
        context.push(pool.to_string());
    }
    context.push(m.status.label().to_string());

    vec![
        Line::from(Span::styled(
            format!("{}  {score}  {}", m.home_team, m.away_team),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(context.join(" | "), Style::default().fg(Color::Gray))),
    ]
}

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))
}

fn detail_lines(detail: &MatchDetail, summary: &Match, show_all_officials: bool) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let sheet = &detail.sheet;

    if sheet.home_team.is_some() || sheet.away_team.is_some() {
        lines.push(section("Match sheet"));
        lines.push(Line::from(detail.title()));
        let fields = [("Date", &sheet.date), ("Time", &sheet.time), ("Ground", &sheet.ground)];
        for (label, value) in fields {
            if let Some(value) = value {
                lines.push(Line::from(format!("  {label}: {value}")));
            }
        }
        lines.push(Line::from(""));
    }

    lines.push(section("Officials"));
    let officials: Vec<_> = if show_all_officials {
        detail.officials.iter().collect()
    } else {
        detail.headline_officials()
    };
    if officials.is_empty() {
        lines.push(Line::from("  none listed"));
    }
    for official in officials {
        lines.push(Line::from(format!("  {}: {}", official.role, official.name)));
    }
    if detail.has_more_officials() && !show_all_officials {
        lines.push(Line::from(Span::styled(
            format!("  a: show all {} officials", detail.officials.len()),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(""));

    let names = Sides {
        home: summary.home_team.clone(),
        away: summary.away_team.clone(),
    };

    if detail.has_scorers() {
        lines.push(section("Scorers"));
        lines.extend(side_lines(&names, &detail.scorers, scorer_label));
        lines.push(Line::from(""));
    }

    if detail.has_cards() {
        lines.push(section("Cards"));
        for color in CardColor::ALL {
            let pick = |cards: &[Card]| -> Vec<Card> { cards.iter().filter(|c| c.color == color).cloned().collect() };
            let by_color = Sides {
                home: pick(&detail.cards.home),
                away: pick(&detail.cards.away),
            };
            if by_color.home.is_empty() && by_color.away.is_empty() {
                continue;
            }
            lines.push(Line::from(Span::styled(
                format!(" {}", color.label()),
                Style::default().fg(card_color(color)),
            )));
            lines.extend(side_lines(&names, &by_color, |c: &Card| c.player.clone()));
        }
        lines.push(Line::from(""));
    }

    if !detail.sheet_text.is_empty() {
        lines.push(section("Full sheet"));
        lines.extend(detail.sheet_text.lines().map(|l| Line::from(l.to_string())));
    }

    lines
}

fn side_lines<T>(names: &Sides<String>, sides: &Sides<Vec<T>>, label: impl Fn(&T) -> String) -> Vec<Line<'static>> {
    [(&names.home, &sides.home), (&names.away, &sides.away)]
        .into_iter()
        .filter(|(_, items)| !items.is_empty())
        .map(|(team, items)| {
            let entries: Vec<String> = items.iter().map(&label).collect();
            Line::from(format!("  {team}: {}", entries.join(", ")))
        })
        .collect()
}

fn scorer_label(scorer: &Scorer) -> String {
    if scorer.goals > 1 {
        format!("#{} ({})", scorer.shirt_number, scorer.goals)
    } else {
        format!("#{}", scorer.shirt_number)
    }
}

fn card_color(color: CardColor) -> Color {
    match color {
        CardColor::Green => Color::Green,
        CardColor::Yellow => Color::Yellow,
        CardColor::Red => Color::Red,
    }
}

// ---------------------------------------------------------------------------
// Help, status line, logs
// ---------------------------------------------------------------------------

fn draw_help(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let keys = [
        ("1 / 2", "girls / boys matches"),
        ("3", "standings"),
        ("4", "match detail"),
        ("h / l", "previous / next phase"),
        ("j / k", "move down / up, scroll the match sheet"),
        ("Enter", "open the selected match"),
        ("/", "search a team, Esc clears"),
        ("c", "standings: switch category"),
        ("o", "standings: official or computed"),
        ("a", "match detail: all officials"),
        ("r", "reload both categories"),
        ("s", "sync the store mirror"),
        ("\"", "show logs"),
        ("f", "full screen"),
        ("Esc", "back"),
        ("q", "quit"),
    ];

    let mut lines: Vec<Line> = keys
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!("{key:>8}  "), Style::default().fg(Color::Yellow)),
                Span::raw(*action),
            ])
        })
        .collect();

    lines.push(Line::from(""));
    let source = match app.settings.source {
        DataSource::Api => format!("Source: API at {}", app.settings.api.base_url),
        DataSource::Store => "Source: local store".to_string(),
    };
    lines.push(Line::from(Span::styled(source, Style::default().fg(Color::DarkGray))));
    if let Some(path) = app.settings.store_path.as_ref() {
        lines.push(Line::from(Span::styled(
            format!("Store: {}", path.display()),
            Style::default().fg(Color::DarkGray),
        )));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    if area.height == 0 {
        return;
    }

    if let Some(err) = app.state.last_error.as_deref() {
        f.render_widget(
            Paragraph::new(format!(" {ERROR_CHAR} {err}")).style(Style::default().fg(Color::Red)),
            area,
        );
        return;
    }

    let mut parts = Vec::new();
    if let Some(category) = app.state.active_tab.category()
        && let Some(loaded) = app.state.category(category).last_loaded
    {
        parts.push(format!("updated {}", loaded.format("%H:%M:%S")));
    }
    if let Some((at, report)) = app.state.last_sync.as_ref() {
        parts.push(format!("last sync {} ({report})", at.format("%H:%M")));
    }

    f.render_widget(
        Paragraph::new(format!(" {}", parts.join("  |  "))).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan));
    f.render_widget(logs, area);
}

fn draw_waiting(f: &mut Frame, area: Rect, app: &App, msg: &str) {
    let msg = match app.state.last_error.as_deref() {
        Some(err) => format!("{msg}\n{err}"),
        None => msg.to_string(),
    };
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
