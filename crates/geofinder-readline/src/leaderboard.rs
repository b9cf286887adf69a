//! Leaderboard screen.

use chrono::DateTime;
use colored::Colorize;
use geofinder_application::LeaderboardService;
use geofinder_core::leaderboard::LeaderboardRow;

pub async fn show(service: &LeaderboardService, limit: u32) {
    println!("{}", "=== Leaderboard ===".bright_magenta().bold());
    let rows = service.top(limit).await;
    if rows.is_empty() {
        println!("{}", "No scores to show right now.".bright_black());
        return;
    }
    for row in &rows {
        render_row(row);
    }
}

fn render_row(row: &LeaderboardRow) {
    let line = format!(
        "{:>3}. {:>6}   {}",
        row.entry.rank,
        row.entry.score,
        played_on(&row.entry.created_at)
    );
    if row.is_mine {
        println!("{}", format!("{}   (you)", line).bright_yellow().bold());
    } else {
        println!("{}", line);
    }
}

fn played_on(created_at: &str) -> String {
    DateTime::parse_from_rfc3339(created_at)
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| created_at.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_played_on() {
        assert_eq!(played_on("2024-05-01T12:30:00Z"), "2024-05-01");
        assert_eq!(played_on("yesterday"), "yesterday");
    }
}
