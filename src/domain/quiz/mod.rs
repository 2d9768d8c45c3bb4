//! Quiz module - questions, played sessions, scoring and results.

pub mod dedup;
mod question;
pub mod ranking;
pub mod scoring;
mod session;

pub use question::{Difficulty, Question, QuestionDraft, MAX_OPTIONS, MIN_OPTIONS};
pub use ranking::{rank_players, winners, PlayerScore, RankedPlayer};
pub use session::{
    AnswerOutcome, FlaggedAnswer, Participant, QuizAnswer, QuizMode, QuizSession, QuizStatus,
    DEFAULT_TIME_LIMIT_SECS, MAX_QUESTIONS,
};
