//! Request and response bodies for `/api/quiz`.
//!
//! Questions are sent without their answer key while the session is active.

use serde::{Deserialize, Serialize};

use crate::application::handlers::quiz::{
    AnsweredQuestion, CompletedQuiz, PlayerResult, QuizResults, SessionWithQuestions,
};
use crate::domain::foundation::{ClanId, QuestionId, QuizSessionId, RoomId, Timestamp, UserId};
use crate::domain::progression::AchievementId;
use crate::domain::quiz::{
    Difficulty, Participant, Question, QuizAnswer, QuizMode, QuizSession, QuizStatus, RankedPlayer,
};

/// Question source for a new session; everything is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartQuizRequest {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub question_ids: Option<Vec<QuestionId>>,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub time_limit_secs: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAnswerRequest {
    pub question_index: usize,
    pub selected_option: usize,
    pub time_taken_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub id: QuizSessionId,
    pub mode: QuizMode,
    pub status: QuizStatus,
    pub room_id: Option<RoomId>,
    pub clan_id: Option<ClanId>,
    pub host_id: UserId,
    pub question_ids: Vec<QuestionId>,
    pub time_limit_secs: u32,
    pub participants: Vec<Participant>,
    pub answers: Vec<QuizAnswer>,
    pub flagged_answers: usize,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl From<&QuizSession> for SessionResponse {
    fn from(session: &QuizSession) -> Self {
        Self {
            id: *session.id(),
            mode: session.mode(),
            status: session.status(),
            room_id: session.room_id().copied(),
            clan_id: session.clan_id().copied(),
            host_id: session.host_id().clone(),
            question_ids: session.question_ids().to_vec(),
            time_limit_secs: session.time_limit_secs(),
            participants: session.participants().to_vec(),
            answers: session.answers().to_vec(),
            flagged_answers: session.flags().len(),
            created_at: *session.created_at(),
            completed_at: session.completed_at().copied(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub id: QuestionId,
    pub topic: String,
    pub text: String,
    pub options: Vec<String>,
    pub difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_option: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl QuestionResponse {
    /// `reveal` decides whether the answer key and explanation are included.
    pub fn from_question(question: &Question, reveal: bool) -> Self {
        Self {
            id: question.id,
            topic: question.topic.clone(),
            text: question.text.clone(),
            options: question.options.clone(),
            difficulty: question.difficulty,
            correct_option: reveal.then_some(question.correct_option),
            explanation: if reveal { question.explanation.clone() } else { None },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionWithQuestionsResponse {
    pub session: SessionResponse,
    pub questions: Vec<QuestionResponse>,
}

impl From<&SessionWithQuestions> for SessionWithQuestionsResponse {
    fn from(view: &SessionWithQuestions) -> Self {
        let reveal = view.session.is_completed();
        Self {
            session: SessionResponse::from(&view.session),
            questions: view
                .questions
                .iter()
                .map(|q| QuestionResponse::from_question(q, reveal))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    pub correct: bool,
    pub points: u32,
    pub correct_option: usize,
    pub flagged: bool,
    pub explanation: Option<String>,
}

impl From<AnsweredQuestion> for SubmitAnswerResponse {
    fn from(answered: AnsweredQuestion) -> Self {
        Self {
            correct: answered.outcome.correct,
            points: answered.outcome.points,
            correct_option: answered.outcome.correct_option,
            flagged: answered.outcome.flagged,
            explanation: answered.explanation,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerResultResponse {
    #[serde(flatten)]
    pub ranked: RankedPlayer,
    pub xp_earned: u64,
    pub new_achievements: Vec<AchievementId>,
}

impl From<&PlayerResult> for PlayerResultResponse {
    fn from(result: &PlayerResult) -> Self {
        Self {
            ranked: result.ranked.clone(),
            xp_earned: result.xp_earned,
            new_achievements: result.new_achievements.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedQuizResponse {
    pub session: SessionResponse,
    pub results: Vec<PlayerResultResponse>,
}

impl From<&CompletedQuiz> for CompletedQuizResponse {
    fn from(completed: &CompletedQuiz) -> Self {
        Self {
            session: SessionResponse::from(&completed.session),
            results: completed.results.iter().map(PlayerResultResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResultsResponse {
    pub session_id: QuizSessionId,
    pub is_final: bool,
    pub players: Vec<RankedPlayer>,
}

impl From<QuizResults> for QuizResultsResponse {
    fn from(results: QuizResults) -> Self {
        Self {
            session_id: results.session_id,
            is_final: results.is_final,
            players: results.players,
        }
    }
}
