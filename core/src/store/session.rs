use super::SimStore;
use crate::{
    config::RuleConfig,
    error::{SimError, SimResult},
    snapshot::SessionSnapshot,
    state::GameState,
};
use rusqlite::{params, OptionalExtension};

impl SimStore {
    // ── Saved sessions ─────────────────────────────────────────

    /// Save `state` under `slot`, replacing whatever was there.
    pub fn save_session(&self, slot: &str, state: &GameState) -> SimResult<()> {
        let snapshot = SessionSnapshot::new(state.clone(), chrono::Utc::now());
        self.conn.execute(
            "INSERT INTO session (slot, snapshot, saved_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(slot) DO UPDATE SET
                snapshot = excluded.snapshot,
                saved_at = excluded.saved_at",
            params![slot, snapshot.to_json()?, snapshot.saved_at],
        )?;
        log::debug!("Session saved to slot '{slot}'");
        Ok(())
    }

    /// Load and validate the state saved under `slot`.
    pub fn load_session(&self, slot: &str, rules: &RuleConfig) -> SimResult<GameState> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT snapshot FROM session WHERE slot = ?1",
                params![slot],
                |row| row.get(0),
            )
            .optional()?;
        let json = json.ok_or_else(|| SimError::SessionNotFound { slot: slot.to_string() })?;
        Ok(SessionSnapshot::from_json(&json, rules)?.state)
    }

    /// Remove a saved session. Returns whether one existed.
    pub fn delete_session(&self, slot: &str) -> SimResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM session WHERE slot = ?1", params![slot])?;
        Ok(removed > 0)
    }
}
