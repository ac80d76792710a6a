//! SQLite-backed [`Store`] on a `sqlx` pool.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, Transaction};

use crate::adjudicator::Dislodgement;
use crate::game::{Game, GameId, GameStatus, PhaseRecord, PowerSlot, UserId};
use crate::geo::standard_map;
use crate::order::AnyOrder;
use crate::power::Power;
use crate::time::Phase;
use crate::unit::{Deployment, Unit, UnitPosition};

use super::{Store, StoreError};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `url` and apply the
    /// schema.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(StoreError::Database)?
            .create_if_missing(true);

        // One connection is plenty for this workload and keeps in-memory
        // databases coherent (every pooled connection of a `:memory:` URL
        // would otherwise be its own empty database). Recycling is
        // disabled for the same reason: dropping the sole connection of an
        // in-memory database discards it.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        sqlx::raw_sql(include_str!("schema.sql"))
            .execute(&pool)
            .await?;

        Ok(SqliteStore { pool })
    }

    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::connect("sqlite::memory:").await
    }

    /// Rewrite the child rows (powers, units, ownerships) of a game.
    async fn replace_children(
        tx: &mut Transaction<'_, Sqlite>,
        game: &Game,
        id: GameId,
    ) -> Result<(), StoreError> {
        for table in ["powers", "units", "ownerships"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE game_id = ?"))
                .bind(id)
                .execute(&mut **tx)
                .await?;
        }

        for slot in &game.slots {
            sqlx::query(
                "INSERT INTO powers (game_id, power, user_id, active) VALUES (?, ?, ?, ?)",
            )
            .bind(id)
            .bind(slot.power.as_str())
            .bind(slot.user)
            .bind(slot.active)
            .execute(&mut **tx)
            .await?;
        }

        for unit in game.deployment.iter() {
            sqlx::query("INSERT INTO units (game_id, power, kind, location) VALUES (?, ?, ?, ?)")
                .bind(id)
                .bind(unit.power().as_str())
                .bind(unit.kind().letter().to_string())
                .bind(unit.location.to_string())
                .execute(&mut **tx)
                .await?;
        }

        for (province, power) in &game.ownerships {
            sqlx::query("INSERT INTO ownerships (game_id, province, power) VALUES (?, ?, ?)")
                .bind(id)
                .bind(province.as_str())
                .bind(power.as_str())
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    async fn write_snapshot(
        tx: &mut Transaction<'_, Sqlite>,
        game: &Game,
    ) -> Result<(), StoreError> {
        let updated = sqlx::query(
            "UPDATE games SET map_name = ?, status = ?, phase = ?, turn = ?, deadline = ?, \
             reminder_sent = ?, turn_length_secs = ?, winner = ?, pending_retreats = ? \
             WHERE id = ?",
        )
        .bind(&game.map_name)
        .bind(game.status.as_str())
        .bind(game.phase.to_string())
        .bind(game.turn as i64)
        .bind(game.deadline)
        .bind(game.reminder_sent)
        .bind(game.turn_length_secs)
        .bind(game.winner.as_ref().map(Power::as_str))
        .bind(serde_json::to_string(&game.pending_retreats)?)
        .bind(game.id)
        .execute(&mut **tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(StoreError::GameNotFound(game.id));
        }

        Self::replace_children(tx, game, game.id).await
    }

    async fn load_game(&self, id: GameId) -> Result<Game, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT map_name, status, phase, turn, deadline, reminder_sent, \
             turn_length_secs, winner, pending_retreats FROM games WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::GameNotFound(id))?;

        let mut game = game_from_row(id, &row)?;

        let slots = sqlx::query("SELECT power, user_id, active FROM powers WHERE game_id = ? ORDER BY power")
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
        if !slots.is_empty() {
            game.slots = slots
                .iter()
                .map(|row| {
                    Ok(PowerSlot {
                        power: Power::from(row.try_get::<String, _>("power")?),
                        user: row.try_get::<Option<UserId>, _>("user_id")?,
                        active: row.try_get::<bool, _>("active")?,
                    })
                })
                .collect::<Result<_, StoreError>>()?;
        }

        let units = sqlx::query(
            "SELECT power, kind, location FROM units WHERE game_id = ? ORDER BY location",
        )
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
        game.deployment = Deployment::new(
            units
                .iter()
                .map(|row| unit_from_row(row))
                .collect::<Result<_, _>>()?,
        );

        let ownerships = sqlx::query("SELECT province, power FROM ownerships WHERE game_id = ?")
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
        game.ownerships = ownerships
            .iter()
            .map(|row| {
                Ok((
                    row.try_get::<String, _>("province")?.into(),
                    Power::from(row.try_get::<String, _>("power")?),
                ))
            })
            .collect::<Result<_, StoreError>>()?;

        tx.commit().await?;
        Ok(game)
    }
}

fn corrupt(what: impl Into<String>) -> StoreError {
    StoreError::Corrupt(what.into())
}

fn game_from_row(id: GameId, row: &SqliteRow) -> Result<Game, StoreError> {
    let map_name: String = row.try_get("map_name")?;
    let status = GameStatus::parse(&row.try_get::<String, _>("status")?)
        .ok_or_else(|| corrupt(format!("bad status for game {id}")))?;
    let phase = Phase::from_str(&row.try_get::<String, _>("phase")?)
        .map_err(|_| corrupt(format!("bad phase for game {id}")))?;
    let pending_retreats: Vec<Dislodgement> =
        serde_json::from_str(&row.try_get::<String, _>("pending_retreats")?)?;

    // Slots default from the map and are overwritten by the power rows.
    let mut game = Game::forming(id, map_name, standard_map());
    game.status = status;
    game.phase = phase;
    game.turn = row.try_get::<i64, _>("turn")? as u32;
    game.deadline = row.try_get::<Option<DateTime<Utc>>, _>("deadline")?;
    game.reminder_sent = row.try_get::<bool, _>("reminder_sent")?;
    game.turn_length_secs = row.try_get::<Option<i64>, _>("turn_length_secs")?;
    game.winner = row
        .try_get::<Option<String>, _>("winner")?
        .map(Power::from);
    game.pending_retreats = pending_retreats;
    Ok(game)
}

fn unit_from_row(row: &SqliteRow) -> Result<UnitPosition, StoreError> {
    let power = Power::from(row.try_get::<String, _>("power")?);
    let kind = row
        .try_get::<String, _>("kind")?
        .parse()
        .map_err(|_| corrupt("bad unit kind"))?;
    let location = row
        .try_get::<String, _>("location")?
        .parse()
        .map_err(|_| corrupt("bad unit location"))?;
    Ok(UnitPosition::new(Unit::new(power, kind), location))
}

#[async_trait]
impl Store for SqliteStore {
    async fn create_game(&self, game: &Game) -> Result<GameId, StoreError> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            "INSERT INTO games (map_name, status, phase, turn, deadline, reminder_sent, \
             turn_length_secs, winner, pending_retreats) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&game.map_name)
        .bind(game.status.as_str())
        .bind(game.phase.to_string())
        .bind(game.turn as i64)
        .bind(game.deadline)
        .bind(game.reminder_sent)
        .bind(game.turn_length_secs)
        .bind(game.winner.as_ref().map(Power::as_str))
        .bind(serde_json::to_string(&game.pending_retreats)?)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        Self::replace_children(&mut tx, game, id).await?;
        tx.commit().await?;
        Ok(id)
    }

    async fn get_game(&self, id: GameId) -> Result<Game, StoreError> {
        self.load_game(id).await
    }

    async fn save_game(&self, game: &Game) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        Self::write_snapshot(&mut tx, game).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn apply_phase(&self, game: &Game, records: &[PhaseRecord]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        Self::write_snapshot(&mut tx, game).await?;

        for record in records {
            sqlx::query(
                "INSERT INTO phase_history (game_id, turn, phase, record) VALUES (?, ?, ?, ?)",
            )
            .bind(game.id)
            .bind(record.turn as i64)
            .bind(record.phase.to_string())
            .bind(serde_json::to_string(record)?)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn due_games(&self, now: DateTime<Utc>) -> Result<Vec<GameId>, StoreError> {
        let rows = sqlx::query(
            "SELECT id FROM games WHERE status = 'active' AND deadline IS NOT NULL \
             AND deadline <= ? ORDER BY deadline ASC",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Ok(row.try_get::<GameId, _>("id")?))
            .collect()
    }

    async fn reminder_games(
        &self,
        now: DateTime<Utc>,
        threshold: Duration,
    ) -> Result<Vec<GameId>, StoreError> {
        let rows = sqlx::query(
            "SELECT id FROM games WHERE status = 'active' AND reminder_sent = 0 \
             AND deadline IS NOT NULL AND deadline > ? AND deadline <= ? \
             ORDER BY deadline ASC",
        )
        .bind(now)
        .bind(now + threshold)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Ok(row.try_get::<GameId, _>("id")?))
            .collect()
    }

    async fn submit_order(
        &self,
        game: GameId,
        turn: u32,
        phase: Phase,
        order: &AnyOrder,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO orders (game_id, turn, phase, power, location, body) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT (game_id, turn, phase, power, location) \
             DO UPDATE SET body = excluded.body, submitted_at = datetime('now')",
        )
        .bind(game)
        .bind(turn as i64)
        .bind(phase.to_string())
        .bind(order.power().as_str())
        .bind(order.location().to_string())
        .bind(serde_json::to_string(order)?)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn clear_orders(
        &self,
        game: GameId,
        turn: u32,
        phase: Phase,
        power: &Power,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "DELETE FROM orders WHERE game_id = ? AND turn = ? AND phase = ? AND power = ?",
        )
        .bind(game)
        .bind(turn as i64)
        .bind(phase.to_string())
        .bind(power.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_orders(
        &self,
        game: GameId,
        turn: u32,
        phase: Phase,
        power: Option<&Power>,
    ) -> Result<Vec<AnyOrder>, StoreError> {
        let rows = sqlx::query(
            "SELECT body FROM orders WHERE game_id = ? AND turn = ? AND phase = ? \
             AND power = COALESCE(?, power) ORDER BY rowid",
        )
        .bind(game)
        .bind(turn as i64)
        .bind(phase.to_string())
        .bind(power.map(Power::as_str))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Ok(serde_json::from_str(&row.try_get::<String, _>("body")?)?))
            .collect()
    }

    async fn get_history(
        &self,
        game: GameId,
        from: Option<u32>,
        to: Option<u32>,
    ) -> Result<Vec<PhaseRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT record FROM phase_history WHERE game_id = ? \
             AND turn >= COALESCE(?, turn) AND turn <= COALESCE(?, turn) ORDER BY turn",
        )
        .bind(game)
        .bind(from.map(|t| t as i64))
        .bind(to.map(|t| t as i64))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Ok(serde_json::from_str(&row.try_get::<String, _>("record")?)?))
            .collect()
    }

    async fn upsert_user(&self, user: UserId, name: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, name) VALUES (?, ?) \
             ON CONFLICT (id) DO UPDATE SET name = excluded.name",
        )
        .bind(user)
        .bind(name)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn bind_channel(&self, channel: &str, game: GameId) -> Result<(), StoreError> {
        sqlx::query("INSERT OR IGNORE INTO channels (channel, game_id) VALUES (?, ?)")
            .bind(channel)
            .bind(game)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn channel_games(&self, channel: &str) -> Result<Vec<GameId>, StoreError> {
        let rows = sqlx::query("SELECT game_id FROM channels WHERE channel = ? ORDER BY game_id")
            .bind(channel)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| Ok(row.try_get::<GameId, _>("game_id")?))
            .collect()
    }
}
