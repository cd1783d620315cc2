use chrono::{DateTime, Local, Utc};
use interligues_api::{Match, MatchStatus};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::Widget;

const KICKOFF_WIDTH: usize = 12;
const POOL_WIDTH: usize = 9;
const SCORE_WIDTH: usize = 7;

/// One line per match: kickoff, pool, teams and score, then status.
pub struct MatchList<'a> {
    pub matches: &'a [Match],
    pub selected: usize,
    pub now: DateTime<Utc>,
}

impl Widget for MatchList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height == 0 {
            return;
        }

        let rows = area.height as usize;
        let offset = self.selected.saturating_sub(rows.saturating_sub(1));
        let team_width = (area.width as usize)
            .saturating_sub(2 + KICKOFF_WIDTH + POOL_WIDTH + SCORE_WIDTH + 10)
            / 2;

        for (row, (idx, m)) in self.matches.iter().enumerate().skip(offset).take(rows).enumerate() {
            let is_selected = idx == self.selected;
            let line = match_line(m, is_selected, team_width.max(4), self.now);
            buf.set_line(area.x, area.y + row as u16, &line, area.width);
        }
    }
}

fn match_line(m: &Match, selected: bool, team_width: usize, now: DateTime<Utc>) -> Line<'static> {
    let (status, status_style) = status_badge(m, now);
    let base = if selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let dim = Style::default().fg(Color::DarkGray);

    let score = match m.score() {
        Some((h, a)) => format!("{h} - {a}"),
        None => "vs".to_string(),
    };

    Line::from(vec![
        Span::styled(if selected { "> " } else { "  " }, base),
        Span::styled(pad(&kickoff_label(m.date), KICKOFF_WIDTH), dim),
        Span::styled(pad(m.pool.as_deref().unwrap_or(""), POOL_WIDTH), dim),
        Span::styled(format!("{:>team_width$}", truncate(&m.home_team, team_width)), base),
        Span::styled(format!(" {score:^width$} ", width = SCORE_WIDTH), base),
        Span::styled(pad(&truncate(&m.away_team, team_width), team_width), base),
        Span::raw(" "),
        Span::styled(status, status_style),
    ])
}

/// Local `dd/mm HH:MM`, or `TBD` for unscheduled matches.
pub fn kickoff_label(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.with_timezone(&Local).format("%d/%m %H:%M").to_string())
        .unwrap_or_else(|| "TBD".to_string())
}

/// A scheduled match whose kickoff has passed is shown as in play until
/// regulation time is over.
fn status_badge(m: &Match, now: DateTime<Utc>) -> (String, Style) {
    match m.status {
        MatchStatus::Finished => (MatchStatus::Finished.label().to_uppercase(), Style::default().fg(Color::Gray)),
        MatchStatus::Live => (MatchStatus::Live.label().to_uppercase(), Style::default().fg(Color::Red)),
        MatchStatus::Scheduled if m.is_ongoing(now) => ("IN PLAY".to_string(), Style::default().fg(Color::Red)),
        MatchStatus::Scheduled => (String::new(), Style::default()),
    }
}

fn pad(s: &str, width: usize) -> String {
    format!("{:<width$}", truncate(s, width.saturating_sub(1)))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
