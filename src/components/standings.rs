use interligues_api::TeamStanding;
use tui::buffer::Buffer;
use tui::layout::{Constraint, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::Line;
use tui::widgets::{Cell, Row, Table, Widget};

const HEADERS: [&str; 10] = ["#", "Team", "J", "G", "N", "P", "PF", "PC", "Diff", "Pts"];

/// Ranked table with the podium highlighted.
pub struct StandingsTable<'a> {
    pub rows: &'a [TeamStanding],
}

impl Widget for StandingsTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let header = Row::new(HEADERS.iter().map(|h| Cell::from(*h)))
            .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD))
            .bottom_margin(1);

        let rows = self.rows.iter().enumerate().map(|(idx, team)| {
            let stat = |v: u32| Cell::from(Line::from(v.to_string()).right_aligned());
            Row::new(vec![
                Cell::from(rank_label(idx + 1)),
                Cell::from(team.team_name.clone()),
                stat(team.played),
                stat(team.won),
                stat(team.drawn),
                stat(team.lost),
                stat(team.points_for),
                stat(team.points_against),
                Cell::from(Line::from(signed(team.goal_difference())).right_aligned()),
                Cell::from(Line::from(team.ranking_points().to_string()).right_aligned())
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            ])
            .style(Style::default().fg(podium_color(idx + 1)))
        });

        let widths = [
            Constraint::Length(4),
            Constraint::Fill(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Length(4),
        ];

        Widget::render(Table::new(rows, widths).header(header).column_spacing(1), area, buf);
    }
}

pub fn rank_label(rank: usize) -> String {
    match rank {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => n.to_string(),
    }
}

fn podium_color(rank: usize) -> Color {
    match rank {
        1 => Color::Yellow,
        2 => Color::White,
        3 => Color::LightRed,
        _ => Color::Gray,
    }
}

fn signed(v: i64) -> String {
    if v > 0 { format!("+{v}") } else { v.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_podium_gets_medals() {
        assert_eq!(rank_label(1), "🥇");
        assert_eq!(rank_label(3), "🥉");
        assert_eq!(rank_label(4), "4");
    }

    #[test]
    fn test_goal_difference_is_signed() {
        assert_eq!(signed(3), "+3");
        assert_eq!(signed(0), "0");
        assert_eq!(signed(-2), "-2");
    }

    #[test]
    fn test_table_renders_team_names() {
        let rows = vec![TeamStanding { won: 1, played: 1, points_for: 2, ..TeamStanding::new("Bretagne") }];
        let area = Rect::new(0, 0, 60, 4);
        let mut buf = Buffer::empty(area);
        StandingsTable { rows: &rows }.render(area, &mut buf);
        let body: String = (0..area.width).map(|x| buf[(x, 2)].symbol().to_string()).collect();
        assert!(body.contains("Bretagne"));
        assert!(body.contains("+2"));
    }
}
