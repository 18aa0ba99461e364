use super::SimStore;
use crate::{
    error::SimResult,
    score::{ScoreRecord, ScoreSubmission},
};
use rusqlite::params;

impl SimStore {
    // ── Leaderboard ────────────────────────────────────────────

    /// Store a score and return it with its assigned id.
    pub fn insert_score(&self, score: &ScoreSubmission) -> SimResult<ScoreRecord> {
        self.conn.execute(
            "INSERT INTO game_score (
                player_name, final_net_worth, months_survived,
                debt_free, score, achieved_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                score.player_name,
                score.final_net_worth,
                score.months_survived,
                score.debt_free,
                score.score,
                score.achieved_at,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        log::debug!("Score {} stored for {} (id={id})", score.score, score.player_name);
        Ok(ScoreRecord {
            id,
            player_name:     score.player_name.clone(),
            final_net_worth: score.final_net_worth,
            months_survived: score.months_survived,
            debt_free:       score.debt_free,
            score:           score.score,
            achieved_at:     score.achieved_at.clone(),
        })
    }

    /// The best `limit` scores, highest first. Ties go to the earlier entry.
    pub fn top_scores(&self, limit: usize) -> SimResult<Vec<ScoreRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, player_name, final_net_worth, months_survived,
                    debt_free, score, achieved_at
             FROM game_score
             ORDER BY score DESC, id ASC
             LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(ScoreRecord {
                    id:              row.get(0)?,
                    player_name:     row.get(1)?,
                    final_net_worth: row.get(2)?,
                    months_survived: row.get(3)?,
                    debt_free:       row.get(4)?,
                    score:           row.get(5)?,
                    achieved_at:     row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn score_count(&self) -> SimResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM game_score", [], |row| row.get(0))?;
        Ok(count)
    }
}
