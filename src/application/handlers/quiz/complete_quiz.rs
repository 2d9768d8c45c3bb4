//! CompleteQuizHandler - ends a session and pays out XP.
//!
//! Completion is the one place where a game touches every player's record:
//! the session is closed, each participant's stats and achievements are
//! updated, per-player results are stored, and a room game finishes its room.
//!
//! Closing the session is a conditional transition, so concurrent calls
//! cannot both pay. Each payout is claimed in the game result ledger before
//! stats move, which lets the host retry a completion that failed partway:
//! the retry pays only the players missing from the ledger.

use std::sync::Arc;

use crate::application::handlers::progress::ProgressRecorder;
use crate::application::handlers::rooms::load_room;
use crate::domain::foundation::{DomainError, ErrorCode, QuizSessionId, Timestamp, UserId};
use crate::domain::progression::{AchievementId, GameOutcome};
use crate::domain::quiz::{QuizMode, QuizSession, RankedPlayer};
use crate::ports::{GameResult, GameResultRepository, QuizSessionRepository, RoomRepository, SaveResult};

use super::load_session;

#[derive(Debug, Clone)]
pub struct PlayerResult {
    pub ranked: RankedPlayer,
    pub xp_earned: u64,
    pub new_achievements: Vec<AchievementId>,
}

#[derive(Debug, Clone)]
pub struct CompletedQuiz {
    pub session: QuizSession,
    pub results: Vec<PlayerResult>,
}

pub struct CompleteQuizHandler {
    sessions: Arc<dyn QuizSessionRepository>,
    rooms: Arc<dyn RoomRepository>,
    games: Arc<dyn GameResultRepository>,
    progress: Arc<ProgressRecorder>,
}

impl CompleteQuizHandler {
    pub fn new(
        sessions: Arc<dyn QuizSessionRepository>,
        rooms: Arc<dyn RoomRepository>,
        games: Arc<dyn GameResultRepository>,
        progress: Arc<ProgressRecorder>,
    ) -> Self {
        Self {
            sessions,
            rooms,
            games,
            progress,
        }
    }

    /// Host only. Completing a fully paid session fails with
    /// `INVALID_STATE_TRANSITION`; so does losing a concurrent completion.
    pub async fn handle(&self, id: &QuizSessionId, by: &UserId) -> Result<CompletedQuiz, DomainError> {
        let mut session = load_session(self.sessions.as_ref(), id).await?;
        session.authorize_host(by)?;

        if session.is_completed() {
            let paid = self.games.for_session(id).await?;
            let unpaid = session
                .participants()
                .iter()
                .filter(|p| !paid.iter().any(|g| g.user_id == p.user_id))
                .count();
            if unpaid == 0 {
                return Err(DomainError::new(
                    ErrorCode::InvalidStateTransition,
                    "Quiz session is already completed",
                ));
            }
            tracing::warn!(session_id = %id, unpaid, "Resuming interrupted quiz payout");
        } else {
            session.complete(by)?;
            self.sessions.mark_completed(&session).await?;
            // Answers are frozen now; reload so late ones are ranked.
            session = load_session(self.sessions.as_ref(), id).await?;
        }

        let ranked = session.results();
        let player_count = ranked.len() as u32;
        let total_questions = session.question_ids().len() as u32;
        let in_clan = session.mode() == QuizMode::Clan;
        let finished_at = session.completed_at().copied().unwrap_or_else(Timestamp::now);

        let mut results = Vec::with_capacity(ranked.len());
        for player in ranked {
            let outcome = GameOutcome {
                score: player.player.score,
                correct_answers: player.player.correct_answers,
                questions_answered: player.player.questions_answered,
                total_questions,
                total_time_ms: player.player.total_time_ms,
                placement: (player_count >= 2).then_some(player.rank),
            };
            let user_id = &player.player.user_id;
            let update = self
                .progress
                .preview_game(user_id, &player.player.display_name, &outcome, in_clan)
                .await?;
            let record = GameResult {
                session_id: *session.id(),
                user_id: user_id.clone(),
                mode: session.mode(),
                rank: player.rank,
                player_count,
                score: outcome.score,
                correct_answers: outcome.correct_answers,
                questions_answered: outcome.questions_answered,
                total_time_ms: outcome.total_time_ms,
                xp_earned: update.xp_earned,
                finished_at,
            };

            let (xp_earned, new_achievements) = match self.games.claim(&record).await? {
                SaveResult::Inserted => {
                    if let Err(e) = self.progress.apply(&update).await {
                        tracing::error!(session_id = %id, user_id = %user_id, error = %e, "Payout failed, releasing result");
                        self.games.release(id, user_id).await?;
                        return Err(e);
                    }
                    (update.xp_earned, update.unlocked_ids())
                }
                SaveResult::AlreadyExists => {
                    let paid = self.games.for_session(id).await?;
                    let xp = paid
                        .iter()
                        .find(|g| &g.user_id == user_id)
                        .map_or(0, |g| g.xp_earned);
                    (xp, Vec::new())
                }
            };
            results.push(PlayerResult {
                ranked: player,
                xp_earned,
                new_achievements,
            });
        }

        if let Some(room_id) = session.room_id() {
            let mut room = load_room(self.rooms.as_ref(), room_id).await?;
            room.finish();
            self.rooms.update(&room).await?;
        }

        tracing::info!(
            session_id = %session.id(),
            mode = %session.mode(),
            players = player_count,
            flagged_answers = session.flags().len(),
            "Quiz completed"
        );

        Ok(CompletedQuiz { session, results })
    }
}
