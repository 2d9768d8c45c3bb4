//! Quiz session aggregate.
//!
//! A session is one played quiz: an ordered list of questions, the people
//! answering them, and every answer given. Solo, room and clan games share
//! this type; they differ only in who may take part and who may end it.
//!
//! # Invariants
//!
//! - at least one question, at most [`MAX_QUESTIONS`]
//! - a participant answers each question index at most once
//! - answers are only accepted while the session is active
//! - only the host completes a session

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{
    ClanId, DomainError, ErrorCode, QuestionId, QuizSessionId, RoomId, Timestamp, UserId,
};

use super::ranking::{rank_players, PlayerScore, RankedPlayer};
use super::scoring::{is_suspiciously_fast, points_for_answer};
use super::Question;

pub const MAX_QUESTIONS: usize = 50;
pub const MIN_TIME_LIMIT_SECS: u32 = 5;
pub const MAX_TIME_LIMIT_SECS: u32 = 120;
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    Solo,
    Multiplayer,
    Clan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizStatus {
    Active,
    Completed,
}

str_enum!(QuizMode { Solo => "solo", Multiplayer => "multiplayer", Clan => "clan" });
str_enum!(QuizStatus { Active => "active", Completed => "completed" });

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: UserId,
    pub display_name: String,
    pub joined_at: Timestamp,
}

impl Participant {
    pub fn new(user_id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            joined_at: Timestamp::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAnswer {
    pub user_id: UserId,
    pub question_index: usize,
    pub question_id: QuestionId,
    pub selected_option: usize,
    pub correct: bool,
    pub points: u32,
    pub time_taken_ms: u64,
    pub answered_at: Timestamp,
}

/// An answer that looked implausible. Recorded, never rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedAnswer {
    pub user_id: UserId,
    pub question_index: usize,
    pub time_taken_ms: u64,
    pub reason: String,
    pub flagged_at: Timestamp,
}

/// What the caller learns right after answering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub points: u32,
    pub correct_option: usize,
    pub flagged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    id: QuizSessionId,
    mode: QuizMode,
    room_id: Option<RoomId>,
    clan_id: Option<ClanId>,
    host_id: UserId,
    question_ids: Vec<QuestionId>,
    time_limit_secs: u32,
    participants: Vec<Participant>,
    answers: Vec<QuizAnswer>,
    flags: Vec<FlaggedAnswer>,
    status: QuizStatus,
    created_at: Timestamp,
    completed_at: Option<Timestamp>,
}

impl QuizSession {
    /// Solo practice: the host is the only participant.
    pub fn solo(
        host: Participant,
        question_ids: Vec<QuestionId>,
        time_limit_secs: u32,
    ) -> Result<Self, DomainError> {
        let host_id = host.user_id.clone();
        Self::build(
            QuizSessionId::new(),
            QuizMode::Solo,
            None,
            None,
            host_id,
            vec![host],
            question_ids,
            time_limit_secs,
        )
    }

    /// Room game: everyone in the lobby at start time takes part.
    ///
    /// The id is chosen by the caller because the room points at the session
    /// before the session is stored.
    pub fn for_room(
        id: QuizSessionId,
        room_id: RoomId,
        host_id: UserId,
        players: Vec<Participant>,
        question_ids: Vec<QuestionId>,
        time_limit_secs: u32,
    ) -> Result<Self, DomainError> {
        if !players.iter().any(|p| p.user_id == host_id) {
            return Err(DomainError::validation("players", "Host must be among the players"));
        }
        Self::build(
            id,
            QuizMode::Multiplayer,
            Some(room_id),
            None,
            host_id,
            players,
            question_ids,
            time_limit_secs,
        )
    }

    /// Clan game: members join while it runs.
    pub fn for_clan(
        clan_id: ClanId,
        host: Participant,
        question_ids: Vec<QuestionId>,
        time_limit_secs: u32,
    ) -> Result<Self, DomainError> {
        let host_id = host.user_id.clone();
        Self::build(
            QuizSessionId::new(),
            QuizMode::Clan,
            None,
            Some(clan_id),
            host_id,
            vec![host],
            question_ids,
            time_limit_secs,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        id: QuizSessionId,
        mode: QuizMode,
        room_id: Option<RoomId>,
        clan_id: Option<ClanId>,
        host_id: UserId,
        participants: Vec<Participant>,
        question_ids: Vec<QuestionId>,
        time_limit_secs: u32,
    ) -> Result<Self, DomainError> {
        if question_ids.is_empty() {
            return Err(DomainError::validation("question_ids", "A quiz needs at least one question"));
        }
        if question_ids.len() > MAX_QUESTIONS {
            return Err(DomainError::validation(
                "question_ids",
                format!("A quiz has at most {} questions", MAX_QUESTIONS),
            ));
        }
        if !(MIN_TIME_LIMIT_SECS..=MAX_TIME_LIMIT_SECS).contains(&time_limit_secs) {
            return Err(DomainError::validation(
                "time_limit_secs",
                format!(
                    "Time limit must be between {} and {} seconds",
                    MIN_TIME_LIMIT_SECS, MAX_TIME_LIMIT_SECS
                ),
            ));
        }

        Ok(Self {
            id,
            mode,
            room_id,
            clan_id,
            host_id,
            question_ids,
            time_limit_secs,
            participants,
            answers: Vec::new(),
            flags: Vec::new(),
            status: QuizStatus::Active,
            created_at: Timestamp::now(),
            completed_at: None,
        })
    }

    /// Reconstitute from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: QuizSessionId,
        mode: QuizMode,
        room_id: Option<RoomId>,
        clan_id: Option<ClanId>,
        host_id: UserId,
        question_ids: Vec<QuestionId>,
        time_limit_secs: u32,
        participants: Vec<Participant>,
        answers: Vec<QuizAnswer>,
        flags: Vec<FlaggedAnswer>,
        status: QuizStatus,
        created_at: Timestamp,
        completed_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            mode,
            room_id,
            clan_id,
            host_id,
            question_ids,
            time_limit_secs,
            participants,
            answers,
            flags,
            status,
            created_at,
            completed_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &QuizSessionId {
        &self.id
    }

    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        self.room_id.as_ref()
    }

    pub fn clan_id(&self) -> Option<&ClanId> {
        self.clan_id.as_ref()
    }

    pub fn host_id(&self) -> &UserId {
        &self.host_id
    }

    pub fn question_ids(&self) -> &[QuestionId] {
        &self.question_ids
    }

    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn answers(&self) -> &[QuizAnswer] {
        &self.answers
    }

    pub fn flags(&self) -> &[FlaggedAnswer] {
        &self.flags
    }

    pub fn status(&self) -> QuizStatus {
        self.status
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn completed_at(&self) -> Option<&Timestamp> {
        self.completed_at.as_ref()
    }

    pub fn is_participant(&self, user_id: &UserId) -> bool {
        self.participants.iter().any(|p| &p.user_id == user_id)
    }

    pub fn is_completed(&self) -> bool {
        self.status == QuizStatus::Completed
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Behavior
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds a late participant. Only clan games take joiners; joining twice is a no-op.
    pub fn join(&mut self, participant: Participant) -> Result<(), DomainError> {
        self.ensure_active()?;
        if self.is_participant(&participant.user_id) {
            return Ok(());
        }
        if self.mode != QuizMode::Clan {
            return Err(DomainError::forbidden("Only clan quizzes accept new participants"));
        }
        self.participants.push(participant);
        Ok(())
    }

    /// Scores and records one answer.
    ///
    /// `question` must be the question stored at `question_index`.
    pub fn submit_answer(
        &mut self,
        user_id: &UserId,
        question_index: usize,
        question: &Question,
        selected_option: usize,
        time_taken_ms: u64,
    ) -> Result<AnswerOutcome, DomainError> {
        self.ensure_active()?;

        if !self.is_participant(user_id) {
            return Err(DomainError::forbidden("Not a participant in this quiz"));
        }

        let expected = self.question_ids.get(question_index).ok_or_else(|| {
            DomainError::validation(
                "question_index",
                format!("Question index {} is out of range", question_index),
            )
        })?;
        if *expected != question.id {
            return Err(DomainError::validation(
                "question_index",
                "Question does not match the quiz position",
            ));
        }
        if selected_option >= question.options.len() {
            return Err(DomainError::validation("selected_option", "Option does not exist"));
        }
        if self
            .answers
            .iter()
            .any(|a| &a.user_id == user_id && a.question_index == question_index)
        {
            return Err(DomainError::new(
                ErrorCode::AlreadyAnswered,
                "Question already answered",
            ));
        }

        let limit_ms = u64::from(self.time_limit_secs) * 1000;
        let time_taken_ms = time_taken_ms.min(limit_ms);
        let correct = question.is_correct(selected_option);
        let points = points_for_answer(correct, question.difficulty, time_taken_ms, limit_ms);

        let flagged = is_suspiciously_fast(time_taken_ms);
        if flagged {
            self.flags.push(FlaggedAnswer {
                user_id: user_id.clone(),
                question_index,
                time_taken_ms,
                reason: "answer faster than humanly plausible".to_string(),
                flagged_at: Timestamp::now(),
            });
        }

        self.answers.push(QuizAnswer {
            user_id: user_id.clone(),
            question_index,
            question_id: question.id,
            selected_option,
            correct,
            points,
            time_taken_ms,
            answered_at: Timestamp::now(),
        });

        Ok(AnswerOutcome {
            correct,
            points,
            correct_option: question.correct_option,
            flagged,
        })
    }

    /// Ends the session and returns ranked results.
    pub fn complete(&mut self, by: &UserId) -> Result<Vec<RankedPlayer>, DomainError> {
        self.authorize_host(by)?;
        self.ensure_active()?;
        self.status = QuizStatus::Completed;
        self.completed_at = Some(Timestamp::now());
        Ok(self.results())
    }

    /// Current standings; final once the session is completed.
    pub fn results(&self) -> Vec<RankedPlayer> {
        let mut tallies: HashMap<&UserId, PlayerScore> = self
            .participants
            .iter()
            .map(|p| {
                (
                    &p.user_id,
                    PlayerScore {
                        user_id: p.user_id.clone(),
                        display_name: p.display_name.clone(),
                        score: 0,
                        correct_answers: 0,
                        questions_answered: 0,
                        total_time_ms: 0,
                    },
                )
            })
            .collect();

        for answer in &self.answers {
            if let Some(tally) = tallies.get_mut(&answer.user_id) {
                tally.score += answer.points;
                tally.questions_answered += 1;
                tally.total_time_ms += answer.time_taken_ms;
                if answer.correct {
                    tally.correct_answers += 1;
                }
            }
        }

        rank_players(tallies.into_values().collect())
    }

    pub fn authorize_host(&self, user_id: &UserId) -> Result<(), DomainError> {
        if user_id != &self.host_id {
            return Err(DomainError::forbidden("Only the host can complete this quiz"));
        }
        Ok(())
    }

    /// Viewing is open to the host and participants.
    pub fn authorize_view(&self, user_id: &UserId) -> Result<(), DomainError> {
        if &self.host_id == user_id || self.is_participant(user_id) {
            Ok(())
        } else {
            Err(DomainError::forbidden("Not a participant in this quiz"))
        }
    }

    fn ensure_active(&self) -> Result<(), DomainError> {
        if self.status != QuizStatus::Active {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "Quiz session is already completed",
            ));
        }
        Ok(())
    }
}
