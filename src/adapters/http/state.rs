//! Shared application state for the HTTP layer.
//!
//! Cloned per request; every field is an `Arc`. Handlers are built on demand
//! from the ports they need.

use std::sync::Arc;

use secrecy::SecretString;

use crate::adapters::rate_limiter::RateLimitConfig;
use crate::application::handlers::auth::{
    GetAccountHandler, LoginHandler, RegisterHandler, SyncAccountHandler,
};
use crate::application::handlers::billing::{HandleStripeWebhookHandler, StartCheckoutHandler};
use crate::application::handlers::clans::{
    ClanLeaderboardHandler, CreateClanHandler, GetClanHandler, GetMyClanHandler, JoinClanHandler,
    KickMemberHandler, LeaveClanHandler, SetMemberRoleHandler, StartClanQuizHandler,
};
use crate::application::handlers::progress::{
    GetPlayerProfileHandler, LeaderboardHandler, ListAchievementsHandler, ProgressRecorder,
};
use crate::application::handlers::quiz::{
    CompleteQuizHandler, GetQuizResultsHandler, GetQuizSessionHandler, StartSoloQuizHandler,
    SubmitAnswerHandler,
};
use crate::application::handlers::rooms::{
    CreateRoomHandler, GetRoomHandler, JoinRoomHandler, LeaveRoomHandler, ListRoomsHandler,
    SetReadyHandler, StartGameHandler,
};
use crate::application::handlers::study::{
    ExtractDocumentHandler, GenerateNotesHandler, GenerateQuizHandler, GenerationQuota,
};
use crate::domain::billing::StripeWebhookVerifier;
use crate::ports::{
    AIProvider, AccountRepository, AchievementRepository, ClanRepository, GameResultRepository,
    PasswordHasher, PaymentProvider, PlayerStatsRepository, QuestionRepository,
    QuizSessionRepository, RateLimiter, RoomRepository, SessionValidator, TokenIssuer,
    WebhookEventRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountRepository>,
    pub rooms: Arc<dyn RoomRepository>,
    pub clans: Arc<dyn ClanRepository>,
    pub sessions: Arc<dyn QuizSessionRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub stats: Arc<dyn PlayerStatsRepository>,
    pub achievements: Arc<dyn AchievementRepository>,
    pub games: Arc<dyn GameResultRepository>,
    pub webhook_events: Arc<dyn WebhookEventRepository>,

    pub session_validator: Arc<dyn SessionValidator>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub token_issuer: Arc<dyn TokenIssuer>,

    pub ai_provider: Arc<dyn AIProvider>,
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub rate_limits: RateLimitConfig,

    /// Absent when Stripe is not configured; the webhook route then answers 503.
    pub stripe_webhook_secret: Option<SecretString>,
    /// Character budget for extracted documents and pasted source text.
    pub max_source_chars: usize,
}

impl AppState {
    // ─────────────────────────────────────────────────────────────────────
    // Accounts
    // ─────────────────────────────────────────────────────────────────────

    pub fn register_handler(&self) -> RegisterHandler {
        RegisterHandler::new(self.accounts.clone(), self.password_hasher.clone(), self.token_issuer.clone())
    }

    pub fn login_handler(&self) -> LoginHandler {
        LoginHandler::new(self.accounts.clone(), self.password_hasher.clone(), self.token_issuer.clone())
    }

    pub fn sync_account_handler(&self) -> SyncAccountHandler {
        SyncAccountHandler::new(self.accounts.clone())
    }

    pub fn get_account_handler(&self) -> GetAccountHandler {
        GetAccountHandler::new(self.accounts.clone())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Rooms
    // ─────────────────────────────────────────────────────────────────────

    pub fn create_room_handler(&self) -> CreateRoomHandler {
        CreateRoomHandler::new(self.rooms.clone())
    }

    pub fn list_rooms_handler(&self) -> ListRoomsHandler {
        ListRoomsHandler::new(self.rooms.clone())
    }

    pub fn get_room_handler(&self) -> GetRoomHandler {
        GetRoomHandler::new(self.rooms.clone())
    }

    pub fn join_room_handler(&self) -> JoinRoomHandler {
        JoinRoomHandler::new(self.rooms.clone())
    }

    pub fn leave_room_handler(&self) -> LeaveRoomHandler {
        LeaveRoomHandler::new(self.rooms.clone())
    }

    pub fn set_ready_handler(&self) -> SetReadyHandler {
        SetReadyHandler::new(self.rooms.clone())
    }

    pub fn start_game_handler(&self) -> StartGameHandler {
        StartGameHandler::new(self.rooms.clone(), self.sessions.clone(), self.questions.clone())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Quiz
    // ─────────────────────────────────────────────────────────────────────

    pub fn start_solo_handler(&self) -> StartSoloQuizHandler {
        StartSoloQuizHandler::new(self.sessions.clone(), self.questions.clone())
    }

    pub fn get_session_handler(&self) -> GetQuizSessionHandler {
        GetQuizSessionHandler::new(self.sessions.clone(), self.questions.clone(), self.clans.clone())
    }

    pub fn submit_answer_handler(&self) -> SubmitAnswerHandler {
        SubmitAnswerHandler::new(self.sessions.clone(), self.questions.clone(), self.clans.clone())
    }

    pub fn complete_quiz_handler(&self) -> CompleteQuizHandler {
        CompleteQuizHandler::new(
            self.sessions.clone(),
            self.rooms.clone(),
            self.games.clone(),
            self.progress(),
        )
    }

    pub fn quiz_results_handler(&self) -> GetQuizResultsHandler {
        GetQuizResultsHandler::new(self.sessions.clone(), self.clans.clone())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Clans
    // ─────────────────────────────────────────────────────────────────────

    pub fn create_clan_handler(&self) -> CreateClanHandler {
        CreateClanHandler::new(self.clans.clone(), self.progress())
    }

    pub fn join_clan_handler(&self) -> JoinClanHandler {
        JoinClanHandler::new(self.clans.clone(), self.progress())
    }

    pub fn get_clan_handler(&self) -> GetClanHandler {
        GetClanHandler::new(self.clans.clone())
    }

    pub fn my_clan_handler(&self) -> GetMyClanHandler {
        GetMyClanHandler::new(self.clans.clone())
    }

    pub fn leave_clan_handler(&self) -> LeaveClanHandler {
        LeaveClanHandler::new(self.clans.clone())
    }

    pub fn set_member_role_handler(&self) -> SetMemberRoleHandler {
        SetMemberRoleHandler::new(self.clans.clone())
    }

    pub fn kick_member_handler(&self) -> KickMemberHandler {
        KickMemberHandler::new(self.clans.clone())
    }

    pub fn start_clan_quiz_handler(&self) -> StartClanQuizHandler {
        StartClanQuizHandler::new(self.clans.clone(), self.sessions.clone(), self.questions.clone())
    }

    pub fn clan_leaderboard_handler(&self) -> ClanLeaderboardHandler {
        ClanLeaderboardHandler::new(self.clans.clone(), self.stats.clone())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Progress
    // ─────────────────────────────────────────────────────────────────────

    pub fn progress(&self) -> Arc<ProgressRecorder> {
        Arc::new(ProgressRecorder::new(self.stats.clone(), self.achievements.clone()))
    }

    pub fn profile_handler(&self) -> GetPlayerProfileHandler {
        GetPlayerProfileHandler::new(self.stats.clone(), self.achievements.clone(), self.games.clone())
    }

    pub fn leaderboard_handler(&self) -> LeaderboardHandler {
        LeaderboardHandler::new(self.stats.clone())
    }

    pub fn achievements_handler(&self) -> ListAchievementsHandler {
        ListAchievementsHandler::new(self.achievements.clone())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Study
    // ─────────────────────────────────────────────────────────────────────

    fn generation_quota(&self) -> Arc<GenerationQuota> {
        Arc::new(GenerationQuota::new(
            self.accounts.clone(),
            self.rate_limiter.clone(),
            self.rate_limits.clone(),
        ))
    }

    pub fn generate_notes_handler(&self) -> GenerateNotesHandler {
        GenerateNotesHandler::new(
            self.ai_provider.clone(),
            self.generation_quota(),
            self.progress(),
            self.max_source_chars,
        )
    }

    pub fn generate_quiz_handler(&self) -> GenerateQuizHandler {
        GenerateQuizHandler::new(
            self.ai_provider.clone(),
            self.questions.clone(),
            self.generation_quota(),
            self.progress(),
            self.max_source_chars,
        )
    }

    pub fn extract_document_handler(&self) -> ExtractDocumentHandler {
        ExtractDocumentHandler::new(self.max_source_chars)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Billing
    // ─────────────────────────────────────────────────────────────────────

    pub fn checkout_handler(&self) -> StartCheckoutHandler {
        StartCheckoutHandler::new(self.accounts.clone(), self.payment_provider.clone())
    }

    pub fn webhook_handler(&self) -> Option<HandleStripeWebhookHandler> {
        let secret = self.stripe_webhook_secret.clone()?;
        Some(HandleStripeWebhookHandler::new(
            StripeWebhookVerifier::new(secret),
            self.accounts.clone(),
            self.webhook_events.clone(),
        ))
    }
}
