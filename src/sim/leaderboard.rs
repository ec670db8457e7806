use serde::Serialize;

use crate::participants::{ParticipantKind, Player};

/// Name shown for the player slot before a player is initialized.
pub const DEFAULT_PLAYER_NAME: &str = "Demo User";

/// Fixed demo traders: (name, archetype, profit, trades).
pub const DEMO_TRADERS: [(&str, ParticipantKind, f64, usize); 5] = [
    ("EcoTrader_42", ParticipantKind::Commercial, 1250.0, 45),
    ("SolarMom", ParticipantKind::Residential, 890.0, 32),
    ("GreenFactory", ParticipantKind::Industrial, 2100.0, 67),
    ("CommunityGrid", ParticipantKind::Community, 1560.0, 54),
    ("PowerSaver", ParticipantKind::Residential, 720.0, 28),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based position.
    pub rank: usize,
    pub name: String,
    pub participant: ParticipantKind,
    pub profit: f64,
    pub trades: usize,
}

/// Ranks the player against the demo traders by profit, highest first.
/// Ties keep the player ahead of demo traders.
pub fn rank(player: Option<&Player>) -> Vec<LeaderboardEntry> {
    let me = LeaderboardEntry {
        rank: 0,
        name: player.map_or(DEFAULT_PLAYER_NAME.to_string(), |p| p.name.clone()),
        participant: player
            .and_then(|p| p.participant)
            .unwrap_or(ParticipantKind::Residential),
        profit: player.map_or(0.0, |p| p.total_profit),
        trades: player.map_or(0, |p| p.trade_count),
    };

    let mut board: Vec<LeaderboardEntry> = std::iter::once(me)
        .chain(
            DEMO_TRADERS
                .iter()
                .map(|&(name, participant, profit, trades)| LeaderboardEntry {
                    rank: 0,
                    name: name.to_string(),
                    participant,
                    profit,
                    trades,
                }),
        )
        .collect();

    board.sort_by(|a, b| b.profit.total_cmp(&a.profit));
    for (i, entry) in board.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    board
}

/// 1-based rank of the first entry named `name`.
pub fn position_of(board: &[LeaderboardEntry], name: &str) -> Option<usize> {
    board.iter().position(|e| e.name == name).map(|i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_player_ranks_last() {
        let player = Player::new("p1", "Newbie");
        let board = rank(Some(&player));
        assert_eq!(board.len(), 6);
        assert_eq!(board[0].name, "GreenFactory");
        assert_eq!(position_of(&board, "Newbie"), Some(6));
    }

    #[test]
    fn ranks_are_sequential_and_sorted() {
        let board = rank(None);
        for (i, e) in board.iter().enumerate() {
            assert_eq!(e.rank, i + 1);
        }
        assert!(board.windows(2).all(|w| w[0].profit >= w[1].profit));
        assert_eq!(position_of(&board, DEFAULT_PLAYER_NAME), Some(6));
    }

    #[test]
    fn profitable_player_climbs() {
        let mut player = Player::new("p1", "Whale");
        player.total_profit = 1500.0;
        player.trade_count = 3;
        let board = rank(Some(&player));
        assert_eq!(position_of(&board, "Whale"), Some(3));
        assert_eq!(board[2].trades, 3);
    }

    #[test]
    fn unknown_name_has_no_position() {
        assert_eq!(position_of(&rank(None), "Nobody"), None);
    }
}
