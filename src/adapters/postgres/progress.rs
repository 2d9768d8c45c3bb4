//! PostgreSQL implementations for player stats, achievements and game history.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, QuizSessionId, Timestamp, UserId};
use crate::domain::progression::{AchievementId, PlayerStats, UnlockedAchievement};
use crate::domain::quiz::QuizMode;
use crate::ports::{AchievementRepository, GameResult, GameResultRepository, PlayerStatsRepository, SaveResult};

use super::{corrupt, db_error, label, user_id};

// ─────────────────────────────────────────────────────────────────────────────
// Player stats
// ─────────────────────────────────────────────────────────────────────────────

const SELECT_STATS: &str = r#"
    SELECT user_id, display_name, total_xp, games_played, games_won, questions_answered,
           correct_answers, best_score, current_streak, longest_streak, last_played_on, updated_at
    FROM player_stats
"#;

pub struct PostgresPlayerStatsRepository {
    pool: PgPool,
}

impl PostgresPlayerStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    user_id: String,
    display_name: String,
    total_xp: i64,
    games_played: i32,
    games_won: i32,
    questions_answered: i32,
    correct_answers: i32,
    best_score: i32,
    current_streak: i32,
    longest_streak: i32,
    last_played_on: Option<NaiveDate>,
    updated_at: DateTime<Utc>,
}

fn count(what: &str, value: i32) -> Result<u32, DomainError> {
    u32::try_from(value).map_err(|_| corrupt(what, value))
}

impl TryFrom<StatsRow> for PlayerStats {
    type Error = DomainError;

    fn try_from(row: StatsRow) -> Result<Self, Self::Error> {
        Ok(PlayerStats {
            user_id: user_id(row.user_id)?,
            display_name: row.display_name,
            total_xp: u64::try_from(row.total_xp).map_err(|_| corrupt("total_xp", row.total_xp))?,
            games_played: count("games_played", row.games_played)?,
            games_won: count("games_won", row.games_won)?,
            questions_answered: count("questions_answered", row.questions_answered)?,
            correct_answers: count("correct_answers", row.correct_answers)?,
            best_score: count("best_score", row.best_score)?,
            current_streak: count("current_streak", row.current_streak)?,
            longest_streak: count("longest_streak", row.longest_streak)?,
            last_played_on: row.last_played_on,
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl PlayerStatsRepository for PostgresPlayerStatsRepository {
    async fn find(&self, user_id: &UserId) -> Result<Option<PlayerStats>, DomainError> {
        let sql = format!("{} WHERE user_id = $1", SELECT_STATS);
        let row: Option<StatsRow> = sqlx::query_as(&sql)
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find player stats"))?;
        row.map(PlayerStats::try_from).transpose()
    }

    async fn upsert(&self, stats: &PlayerStats) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO player_stats (
                user_id, display_name, total_xp, games_played, games_won, questions_answered,
                correct_answers, best_score, current_streak, longest_streak, last_played_on, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (user_id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                total_xp = GREATEST(player_stats.total_xp, EXCLUDED.total_xp),
                games_played = EXCLUDED.games_played,
                games_won = EXCLUDED.games_won,
                questions_answered = EXCLUDED.questions_answered,
                correct_answers = EXCLUDED.correct_answers,
                best_score = EXCLUDED.best_score,
                current_streak = EXCLUDED.current_streak,
                longest_streak = EXCLUDED.longest_streak,
                last_played_on = EXCLUDED.last_played_on,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(stats.user_id.as_str())
        .bind(&stats.display_name)
        .bind(i64::try_from(stats.total_xp).unwrap_or(i64::MAX))
        .bind(stats.games_played as i32)
        .bind(stats.games_won as i32)
        .bind(stats.questions_answered as i32)
        .bind(stats.correct_answers as i32)
        .bind(stats.best_score as i32)
        .bind(stats.current_streak as i32)
        .bind(stats.longest_streak as i32)
        .bind(stats.last_played_on)
        .bind(stats.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("upsert player stats"))?;
        Ok(())
    }

    async fn top_by_xp(&self, limit: u32) -> Result<Vec<PlayerStats>, DomainError> {
        let sql = format!("{} ORDER BY total_xp DESC, user_id LIMIT $1", SELECT_STATS);
        let rows: Vec<StatsRow> = sqlx::query_as(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("load leaderboard"))?;
        rows.into_iter().map(PlayerStats::try_from).collect()
    }

    async fn find_by_users(&self, user_ids: &[UserId]) -> Result<Vec<PlayerStats>, DomainError> {
        let ids: Vec<&str> = user_ids.iter().map(UserId::as_str).collect();
        let sql = format!("{} WHERE user_id = ANY($1)", SELECT_STATS);
        let rows: Vec<StatsRow> = sqlx::query_as(&sql)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("load player stats"))?;
        rows.into_iter().map(PlayerStats::try_from).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Achievements
// ─────────────────────────────────────────────────────────────────────────────

pub struct PostgresAchievementRepository {
    pool: PgPool,
}

impl PostgresAchievementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AchievementRepository for PostgresAchievementRepository {
    async fn unlocked_for(&self, user_id: &UserId) -> Result<Vec<UnlockedAchievement>, DomainError> {
        let rows: Vec<(String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT achievement_id, unlocked_at FROM user_achievements WHERE user_id = $1 ORDER BY unlocked_at",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("load achievements"))?;

        rows.into_iter()
            .map(|(id, at)| {
                Ok(UnlockedAchievement {
                    id: label("achievement", &id, AchievementId::parse)?,
                    unlocked_at: Timestamp::from_datetime(at),
                })
            })
            .collect()
    }

    async fn record(
        &self,
        user_id: &UserId,
        ids: &[AchievementId],
        unlocked_at: Timestamp,
    ) -> Result<(), DomainError> {
        let labels: Vec<&str> = ids.iter().map(AchievementId::as_str).collect();
        sqlx::query(
            r#"
            INSERT INTO user_achievements (user_id, achievement_id, unlocked_at)
            SELECT $1, a, $3 FROM UNNEST($2::text[]) AS a
            ON CONFLICT (user_id, achievement_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_str())
        .bind(&labels)
        .bind(unlocked_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("record achievements"))?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Game results
// ─────────────────────────────────────────────────────────────────────────────

pub struct PostgresGameResultRepository {
    pool: PgPool,
}

impl PostgresGameResultRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct GameResultRow {
    session_id: Uuid,
    user_id: String,
    mode: String,
    rank: i32,
    player_count: i32,
    score: i32,
    correct_answers: i32,
    questions_answered: i32,
    total_time_ms: i64,
    xp_earned: i64,
    finished_at: DateTime<Utc>,
}

impl TryFrom<GameResultRow> for GameResult {
    type Error = DomainError;

    fn try_from(row: GameResultRow) -> Result<Self, Self::Error> {
        Ok(GameResult {
            session_id: QuizSessionId::from_uuid(row.session_id),
            user_id: user_id(row.user_id)?,
            mode: label("quiz mode", &row.mode, QuizMode::parse)?,
            rank: count("rank", row.rank)?,
            player_count: count("player_count", row.player_count)?,
            score: count("score", row.score)?,
            correct_answers: count("correct_answers", row.correct_answers)?,
            questions_answered: count("questions_answered", row.questions_answered)?,
            total_time_ms: u64::try_from(row.total_time_ms).map_err(|_| corrupt("total_time_ms", row.total_time_ms))?,
            xp_earned: u64::try_from(row.xp_earned).map_err(|_| corrupt("xp_earned", row.xp_earned))?,
            finished_at: Timestamp::from_datetime(row.finished_at),
        })
    }
}

#[async_trait]
impl GameResultRepository for PostgresGameResultRepository {
    async fn claim(&self, result: &GameResult) -> Result<SaveResult, DomainError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO game_results (
                session_id, user_id, mode, rank, player_count, score, correct_answers,
                questions_answered, total_time_ms, xp_earned, finished_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (session_id, user_id) DO NOTHING
            "#,
        )
        .bind(result.session_id.as_uuid())
        .bind(result.user_id.as_str())
        .bind(result.mode.as_str())
        .bind(result.rank as i32)
        .bind(result.player_count as i32)
        .bind(result.score as i32)
        .bind(result.correct_answers as i32)
        .bind(result.questions_answered as i32)
        .bind(result.total_time_ms as i64)
        .bind(result.xp_earned as i64)
        .bind(result.finished_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("insert game result"))?
        .rows_affected();

        Ok(if inserted == 0 {
            SaveResult::AlreadyExists
        } else {
            SaveResult::Inserted
        })
    }

    async fn release(&self, session_id: &QuizSessionId, user_id: &UserId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM game_results WHERE session_id = $1 AND user_id = $2")
            .bind(session_id.as_uuid())
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_error("release game result"))?;
        Ok(())
    }

    async fn for_session(&self, session_id: &QuizSessionId) -> Result<Vec<GameResult>, DomainError> {
        let rows: Vec<GameResultRow> = sqlx::query_as(
            r#"
            SELECT session_id, user_id, mode, rank, player_count, score, correct_answers,
                   questions_answered, total_time_ms, xp_earned, finished_at
            FROM game_results WHERE session_id = $1
            ORDER BY rank, user_id
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("load game results"))?;
        rows.into_iter().map(GameResult::try_from).collect()
    }

    async fn recent_for_user(&self, user_id: &UserId, limit: u32) -> Result<Vec<GameResult>, DomainError> {
        let rows: Vec<GameResultRow> = sqlx::query_as(
            r#"
            SELECT session_id, user_id, mode, rank, player_count, score, correct_answers,
                   questions_answered, total_time_ms, xp_earned, finished_at
            FROM game_results WHERE user_id = $1
            ORDER BY finished_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("load game history"))?;
        rows.into_iter().map(GameResult::try_from).collect()
    }
}
