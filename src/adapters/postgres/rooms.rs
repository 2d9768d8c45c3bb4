//! PostgreSQL implementation of RoomRepository.
//!
//! `rooms.current_players` is the authoritative seat counter. Joins claim a
//! seat with a conditional increment and insert the player row in the same
//! transaction, so a failed insert hands the seat back on rollback. Starting
//! a game is a conditional status change on the same row; it waits for any
//! join holding the row lock, so the players it reads are final.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, QuizSessionId, RoomId, ShareCode, Timestamp, UserId};
use crate::domain::room::{Room, RoomPlayer, RoomStatus, JOIN_CODE_LEN, MIN_PLAYERS};
use crate::ports::RoomRepository;

use super::{corrupt, db_error, label, user_id, violates};

const SELECT_ROOM: &str = r#"
    SELECT id, code, host_id, name, topic, max_players, status, is_private,
           quiz_session_id, created_at, updated_at
    FROM rooms
"#;

pub struct PostgresRoomRepository {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct RoomRow {
    id: Uuid,
    code: String,
    host_id: String,
    name: String,
    topic: Option<String>,
    max_players: i32,
    status: String,
    is_private: bool,
    quiz_session_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct PlayerRow {
    room_id: Uuid,
    user_id: String,
    display_name: String,
    is_ready: bool,
    joined_at: DateTime<Utc>,
}

impl PlayerRow {
    fn into_player(self) -> Result<RoomPlayer, DomainError> {
        Ok(RoomPlayer {
            user_id: user_id(self.user_id)?,
            display_name: self.display_name,
            is_ready: self.is_ready,
            joined_at: Timestamp::from_datetime(self.joined_at),
        })
    }
}

fn into_room(row: RoomRow, players: Vec<RoomPlayer>) -> Result<Room, DomainError> {
    Ok(Room::reconstitute(
        RoomId::from_uuid(row.id),
        ShareCode::parse(&row.code, JOIN_CODE_LEN).map_err(|e| corrupt("room code", e))?,
        user_id(row.host_id)?,
        row.name,
        row.topic,
        u32::try_from(row.max_players).map_err(|_| corrupt("max_players", row.max_players))?,
        label("room status", &row.status, RoomStatus::parse)?,
        row.is_private,
        players,
        row.quiz_session_id.map(QuizSessionId::from_uuid),
        Timestamp::from_datetime(row.created_at),
        Timestamp::from_datetime(row.updated_at),
    ))
}

fn not_found() -> DomainError {
    DomainError::new(ErrorCode::RoomNotFound, "Room not found")
}

impl PostgresRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads player rows for many rooms at once, in join order.
    async fn players_for(&self, room_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<RoomPlayer>>, DomainError> {
        let rows: Vec<PlayerRow> = sqlx::query_as(
            r#"
            SELECT room_id, user_id, display_name, is_ready, joined_at
            FROM room_players
            WHERE room_id = ANY($1)
            ORDER BY joined_at, user_id
            "#,
        )
        .bind(room_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("load room players"))?;

        let mut by_room: HashMap<Uuid, Vec<RoomPlayer>> = HashMap::new();
        for row in rows {
            by_room.entry(row.room_id).or_default().push(row.into_player()?);
        }
        Ok(by_room)
    }

    async fn hydrate(&self, rows: Vec<RoomRow>) -> Result<Vec<Room>, DomainError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut players = self.players_for(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let seated = players.remove(&row.id).unwrap_or_default();
                into_room(row, seated)
            })
            .collect()
    }

    async fn find_one(&self, clause: &str, bind: RoomKey<'_>) -> Result<Option<Room>, DomainError> {
        let sql = format!("{} WHERE {} = $1", SELECT_ROOM, clause);
        let query = sqlx::query_as::<_, RoomRow>(&sql);
        let query = match bind {
            RoomKey::Id(id) => query.bind(*id),
            RoomKey::Code(code) => query.bind(code),
        };
        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find room"))?;
        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Explains why a conditional seat claim matched no row.
    async fn seat_refusal(&self, room_id: &RoomId) -> Result<DomainError, DomainError> {
        let row: Option<(String, i32, i32)> =
            sqlx::query_as("SELECT status, current_players, max_players FROM rooms WHERE id = $1")
                .bind(room_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("inspect room"))?;

        Ok(match row {
            None => not_found(),
            Some((status, _, _)) if status != RoomStatus::Waiting.as_str() => {
                DomainError::new(ErrorCode::RoomNotJoinable, "Room is no longer accepting players")
            }
            Some(_) => DomainError::new(ErrorCode::RoomFull, "Room is full"),
        })
    }

    /// Explains why a conditional start matched no row, using the same
    /// checks the domain applies.
    async fn start_refusal(
        &self,
        room_id: &RoomId,
        host_id: &UserId,
        session_id: &QuizSessionId,
    ) -> Result<DomainError, DomainError> {
        let mut room = self.find_by_id(room_id).await?.ok_or_else(not_found)?;
        Ok(match room.start(host_id, *session_id) {
            Err(e) => e,
            Ok(()) => DomainError::new(ErrorCode::Conflict, "Room changed while starting, try again"),
        })
    }

    async fn release_seat(&self, room_id: &RoomId) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE rooms SET current_players = current_players - 1, updated_at = now()
            WHERE id = $1 AND current_players > 0
            "#,
        )
        .bind(room_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(db_error("release room seat"))?;
        Ok(())
    }
}

enum RoomKey<'a> {
    Id(&'a Uuid),
    Code(&'a str),
}

#[async_trait]
impl RoomRepository for PostgresRoomRepository {
    async fn save(&self, room: &Room) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        sqlx::query(
            r#"
            INSERT INTO rooms (
                id, code, host_id, name, topic, max_players, current_players, status,
                is_private, quiz_session_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(room.id().as_uuid())
        .bind(room.code().as_str())
        .bind(room.host_id().as_str())
        .bind(room.name())
        .bind(room.topic())
        .bind(room.max_players() as i32)
        .bind(room.current_players() as i32)
        .bind(room.status().as_str())
        .bind(room.is_private())
        .bind(room.quiz_session_id().map(|id| *id.as_uuid()))
        .bind(room.created_at().as_datetime())
        .bind(room.updated_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if violates(&e, "rooms_code_key") {
                DomainError::new(ErrorCode::Conflict, "Room code collision")
            } else {
                db_error("insert room")(e)
            }
        })?;

        for player in room.players() {
            sqlx::query(
                r#"
                INSERT INTO room_players (room_id, user_id, display_name, is_ready, joined_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(room.id().as_uuid())
            .bind(player.user_id.as_str())
            .bind(&player.display_name)
            .bind(player.is_ready)
            .bind(player.joined_at.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(db_error("insert room player"))?;
        }

        tx.commit().await.map_err(db_error("commit room"))?;
        Ok(())
    }

    async fn update(&self, room: &Room) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE rooms SET host_id = $2, status = $3, quiz_session_id = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(room.id().as_uuid())
        .bind(room.host_id().as_str())
        .bind(room.status().as_str())
        .bind(room.quiz_session_id().map(|id| *id.as_uuid()))
        .bind(room.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("update room"))?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &RoomId) -> Result<Option<Room>, DomainError> {
        self.find_one("id", RoomKey::Id(id.as_uuid())).await
    }

    async fn find_by_code(&self, code: &ShareCode) -> Result<Option<Room>, DomainError> {
        self.find_one("code", RoomKey::Code(code.as_str())).await
    }

    async fn list_joinable(&self, limit: u32) -> Result<Vec<Room>, DomainError> {
        let sql = format!(
            "{} WHERE status = 'waiting' AND NOT is_private AND current_players < max_players \
             ORDER BY created_at DESC LIMIT $1",
            SELECT_ROOM
        );
        let rows: Vec<RoomRow> = sqlx::query_as(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("list rooms"))?;
        self.hydrate(rows).await
    }

    async fn add_player(&self, room_id: &RoomId, player: &RoomPlayer) -> Result<(), DomainError> {
        let (seated,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM room_players WHERE room_id = $1 AND user_id = $2)",
        )
        .bind(room_id.as_uuid())
        .bind(player.user_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("check room seat"))?;
        if seated {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;
        let claimed = sqlx::query(
            r#"
            UPDATE rooms SET current_players = current_players + 1, updated_at = now()
            WHERE id = $1 AND status = 'waiting' AND current_players < max_players
            "#,
        )
        .bind(room_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(db_error("claim room seat"))?;

        if claimed.rows_affected() == 0 {
            drop(tx);
            return Err(self.seat_refusal(room_id).await?);
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO room_players (room_id, user_id, display_name, is_ready, joined_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(room_id.as_uuid())
        .bind(player.user_id.as_str())
        .bind(&player.display_name)
        .bind(player.is_ready)
        .bind(player.joined_at.as_datetime())
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {
                tx.commit().await.map_err(db_error("commit room seat"))?;
                Ok(())
            }
            // A concurrent request seated the same player first.
            Err(e) if violates(&e, "room_players_pkey") => Ok(()),
            Err(e) => {
                tracing::warn!(room_id = %room_id, error = %e, "Player insert failed, seat rolled back");
                Err(db_error("insert room player")(e))
            }
        }
    }

    async fn start(&self, room_id: &RoomId, host_id: &UserId, session_id: &QuizSessionId) -> Result<Room, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;
        let row: Option<RoomRow> = sqlx::query_as(
            r#"
            UPDATE rooms SET status = $4, quiz_session_id = $3, updated_at = now()
            WHERE id = $1 AND host_id = $2 AND status = 'waiting' AND current_players >= $5
            RETURNING id, code, host_id, name, topic, max_players, status, is_private,
                      quiz_session_id, created_at, updated_at
            "#,
        )
        .bind(room_id.as_uuid())
        .bind(host_id.as_str())
        .bind(session_id.as_uuid())
        .bind(RoomStatus::InProgress.as_str())
        .bind(MIN_PLAYERS as i32)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("start room"))?;

        let Some(row) = row else {
            drop(tx);
            return Err(self.start_refusal(room_id, host_id, session_id).await?);
        };

        let players: Vec<PlayerRow> = sqlx::query_as(
            r#"
            SELECT room_id, user_id, display_name, is_ready, joined_at
            FROM room_players
            WHERE room_id = $1
            ORDER BY joined_at, user_id
            "#,
        )
        .bind(room_id.as_uuid())
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("load room players"))?;
        tx.commit().await.map_err(db_error("commit room start"))?;

        let players = players
            .into_iter()
            .map(PlayerRow::into_player)
            .collect::<Result<Vec<_>, _>>()?;
        into_room(row, players)
    }

    async fn remove_player(&self, room_id: &RoomId, user_id: &UserId) -> Result<(), DomainError> {
        let removed = sqlx::query("DELETE FROM room_players WHERE room_id = $1 AND user_id = $2")
            .bind(room_id.as_uuid())
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_error("remove room player"))?;

        if removed.rows_affected() > 0 {
            self.release_seat(room_id).await?;
        }
        Ok(())
    }

    async fn set_ready(&self, room_id: &RoomId, user_id: &UserId, ready: bool) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE room_players SET is_ready = $3 WHERE room_id = $1 AND user_id = $2")
            .bind(room_id.as_uuid())
            .bind(user_id.as_str())
            .bind(ready)
            .execute(&self.pool)
            .await
            .map_err(db_error("set ready"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::forbidden("Not a player in this room"));
        }
        Ok(())
    }
}
