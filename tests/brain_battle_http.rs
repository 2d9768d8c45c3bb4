//! End-to-end tests through the full axum router.
//!
//! Every port is backed by the in-memory adapters; tokens are real HS256
//! tokens issued by `LocalJwtService`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;

use brain_battle::adapters::ai::{MockAIProvider, MockResponse};
use brain_battle::adapters::auth::LocalJwtService;
use brain_battle::adapters::http::{build_router, AppState};
use brain_battle::adapters::memory::{
    InMemoryAccountRepository, InMemoryAchievementRepository, InMemoryClanRepository,
    InMemoryGameResultRepository, InMemoryPlayerStatsRepository, InMemoryQuestionRepository,
    InMemoryQuizSessionRepository, InMemoryRoomRepository, InMemoryWebhookEventRepository,
};
use brain_battle::adapters::rate_limiter::{InMemoryRateLimiter, RateLimitConfig};
use brain_battle::adapters::stripe::MockPaymentProvider;
use brain_battle::config::ServerConfig;
use brain_battle::domain::billing::StripeWebhookVerifier;
use brain_battle::domain::foundation::{DomainError, ErrorCode};
use brain_battle::domain::quiz::{Difficulty, Question, QuestionDraft};
use brain_battle::ports::{PasswordHasher, QuestionRepository, TokenUsage};

// =============================================================================
// Test Infrastructure
// =============================================================================

const WEBHOOK_SECRET: &str = "whsec_integration_secret";
const TOPIC: &str = "Biology";

/// Keeps the suite fast; argon2 is covered by its own unit tests.
struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        Ok(format!("plain${}", password))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError> {
        hash.strip_prefix("plain$")
            .map(|stored| stored == password)
            .ok_or_else(|| DomainError::new(ErrorCode::InternalError, "unknown hash format"))
    }
}

struct TestApp {
    router: Router,
    ai: MockAIProvider,
    /// Correct option per seeded question id.
    answer_key: Vec<(String, usize)>,
}

async fn seed_questions(questions: &InMemoryQuestionRepository) -> Vec<(String, usize)> {
    let drafts = [
        ("Which organelle produces ATP?", vec!["Nucleus", "Mitochondria", "Ribosome"], 1),
        ("What carries genetic information?", vec!["DNA", "Lipids", "Glucose"], 0),
        ("Where does photosynthesis happen?", vec!["Vacuole", "Golgi body", "Chloroplast"], 2),
    ];
    let bank: Vec<Question> = drafts
        .into_iter()
        .map(|(text, options, correct)| {
            Question::create(
                QuestionDraft {
                    topic: TOPIC.to_string(),
                    text: text.to_string(),
                    options: options.into_iter().map(str::to_string).collect(),
                    correct_option: correct,
                    difficulty: Difficulty::Easy,
                    explanation: None,
                },
                None,
            )
            .unwrap()
        })
        .collect();
    questions.save_all(&bank).await.unwrap();
    bank.iter().map(|q| (q.id.to_string(), q.correct_option)).collect()
}

async fn test_app() -> TestApp {
    let questions = Arc::new(InMemoryQuestionRepository::new());
    let answer_key = seed_questions(&questions).await;
    let jwt = Arc::new(LocalJwtService::new(
        &SecretString::new("integration-test-secret".to_string()),
        "brain-battle",
        3600,
    ));
    let ai = MockAIProvider::new();

    let state = AppState {
        accounts: Arc::new(InMemoryAccountRepository::new()),
        rooms: Arc::new(InMemoryRoomRepository::new()),
        clans: Arc::new(InMemoryClanRepository::new()),
        sessions: Arc::new(InMemoryQuizSessionRepository::new()),
        questions,
        stats: Arc::new(InMemoryPlayerStatsRepository::new()),
        achievements: Arc::new(InMemoryAchievementRepository::new()),
        games: Arc::new(InMemoryGameResultRepository::new()),
        webhook_events: Arc::new(InMemoryWebhookEventRepository::new()),
        session_validator: jwt.clone(),
        password_hasher: Arc::new(PlainHasher),
        token_issuer: jwt,
        ai_provider: Arc::new(ai.clone()),
        payment_provider: Arc::new(MockPaymentProvider::new()),
        rate_limiter: Arc::new(InMemoryRateLimiter::new()),
        rate_limits: RateLimitConfig::default(),
        stripe_webhook_secret: Some(SecretString::new(WEBHOOK_SECRET.to_string())),
        max_source_chars: 10_000,
    };

    TestApp {
        router: build_router(state, &ServerConfig::default()),
        ai,
        answer_key,
    }
}

impl TestApp {
    async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };
        let response = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        read(response).await
    }

    async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    /// Registers a player and returns their bearer token.
    async fn register(&self, name: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({
                    "email": format!("{}@example.com", name.to_lowercase()),
                    "password": "correct horse battery",
                    "display_name": name,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        body["access_token"].as_str().unwrap().to_string()
    }

    fn correct_option(&self, question_id: &str) -> usize {
        self.answer_key
            .iter()
            .find(|(id, _)| id == question_id)
            .map(|(_, correct)| *correct)
            .unwrap()
    }

    async fn send_webhook(&self, payload: &[u8], signature: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/webhooks/stripe")
            .header("Stripe-Signature", signature)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_vec()))
            .unwrap();
        read(self.router.clone().oneshot(request).await.unwrap()).await
    }
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn register_login_and_me() {
    let app = test_app().await;
    let token = app.register("Ada").await;

    let (status, me) = app.get("/api/auth/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "ada@example.com");
    assert_eq!(me["display_name"], "Ada");
    assert_eq!(me["tier"], "free");
    assert!(me.get("password_hash").is_none());

    let (status, login) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "ADA@example.com", "password": "correct horse battery"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["token_type"], "Bearer");
    assert_eq!(login["account"]["id"], me["id"]);
}

#[tokio::test]
async fn bad_credentials_and_duplicates_are_rejected() {
    let app = test_app().await;
    app.register("Ada").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "wrong password"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"email": "ada@example.com", "password": "another password", "display_name": "Ada 2"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "EMAIL_TAKEN");
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let app = test_app().await;

    let (status, body) = app.request(Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app.get("/api/auth/me", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, health) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
}

// =============================================================================
// Rooms and multiplayer games
// =============================================================================

#[tokio::test]
async fn multiplayer_game_from_lobby_to_ranked_results() {
    let app = test_app().await;
    let alice = app.register("Alice").await;
    let bob = app.register("Bob").await;
    let carol = app.register("Carol").await;

    let (status, room) = app
        .post("/api/rooms", &alice, json!({"name": "Cell night", "topic": TOPIC, "max_players": 2}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(room["current_players"], 1);
    let room_id = room["id"].as_str().unwrap().to_string();
    let code = room["code"].as_str().unwrap().to_string();

    let (status, joined) = app.post("/api/rooms/join", &bob, json!({"code": code.to_lowercase()})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(joined["current_players"], 2);

    let (status, body) = app.post("/api/rooms/join", &carol, json!({"code": code})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ROOM_FULL");

    let (status, body) = app
        .post(&format!("/api/rooms/{}/start", room_id), &bob, json!({"count": 2}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);

    let (status, started) = app
        .post(&format!("/api/rooms/{}/start", room_id), &alice, json!({"count": 2}))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", started);
    assert_eq!(started["room"]["status"], "in_progress");
    assert_eq!(started["session"]["mode"], "multiplayer");
    let session_id = started["session"]["id"].as_str().unwrap().to_string();
    let first_question = started["session"]["question_ids"][0].as_str().unwrap().to_string();

    // Answer keys stay hidden while the game runs.
    let (status, view) = app.get(&format!("/api/quiz/sessions/{}", session_id), &bob).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["questions"].as_array().unwrap().len(), 2);
    assert!(view["questions"][0].get("correct_option").is_none());

    let correct = app.correct_option(&first_question);
    let answers_uri = format!("/api/quiz/sessions/{}/answers", session_id);
    let (status, outcome) = app
        .post(&answers_uri, &alice, json!({"question_index": 0, "selected_option": correct, "time_taken_ms": 2_000}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["correct"], true);
    assert!(outcome["points"].as_u64().unwrap() > 100);

    let wrong = (correct + 1) % 3;
    let (_, outcome) = app
        .post(&answers_uri, &bob, json!({"question_index": 0, "selected_option": wrong, "time_taken_ms": 3_000}))
        .await;
    assert_eq!(outcome["correct"], false);
    assert_eq!(outcome["points"], 0);

    let (status, body) = app
        .post(&answers_uri, &bob, json!({"question_index": 0, "selected_option": correct, "time_taken_ms": 3_000}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALREADY_ANSWERED");

    let complete_uri = format!("/api/quiz/sessions/{}/complete", session_id);
    let (status, completed) = app.post(&complete_uri, &alice, json!({})).await;
    assert_eq!(status, StatusCode::OK, "{}", completed);
    let results = completed["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["display_name"], "Alice");
    assert_eq!(results[0]["rank"], 1);
    assert_eq!(results[1]["display_name"], "Bob");
    assert_eq!(results[1]["rank"], 2);
    assert!(results[0]["xp_earned"].as_u64().unwrap() > results[1]["xp_earned"].as_u64().unwrap());

    let (status, _) = app.post(&complete_uri, &alice, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, room) = app.get(&format!("/api/rooms/{}", room_id), &alice).await;
    assert_eq!(room["status"], "finished");

    let (status, standings) = app
        .get(&format!("/api/quiz/sessions/{}/results", session_id), &bob)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(standings["is_final"], true);
    assert_eq!(standings["players"][0]["display_name"], "Alice");

    let (_, leaderboard) = app.get("/api/leaderboard", &carol).await;
    assert_eq!(leaderboard[0]["display_name"], "Alice");
    assert_eq!(leaderboard[0]["rank"], 1);

    let (status, stats) = app.get("/api/stats/me", &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["stats"]["games_played"], 1);
    assert_eq!(stats["stats"]["games_won"], 1);
    assert_eq!(stats["recent_games"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn solo_quiz_reveals_answers_after_completion() {
    let app = test_app().await;
    let ada = app.register("Ada").await;

    let (status, session) = app.post("/api/quiz/sessions", &ada, json!({"topic": TOPIC, "count": 3})).await;
    assert_eq!(status, StatusCode::CREATED, "{}", session);
    assert_eq!(session["mode"], "solo");
    let session_id = session["id"].as_str().unwrap().to_string();

    let (status, _) = app.post(&format!("/api/quiz/sessions/{}/complete", session_id), &ada, json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (_, view) = app.get(&format!("/api/quiz/sessions/{}", session_id), &ada).await;
    assert_eq!(view["session"]["status"], "completed");
    assert!(view["questions"][0]["correct_option"].is_u64());

    let (status, body) = app.post("/api/quiz/sessions", &ada, json!({"topic": "Astrophysics"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
}

// =============================================================================
// Clans
// =============================================================================

#[tokio::test]
async fn clan_session_lets_members_join_by_answering() {
    let app = test_app().await;
    let owner = app.register("Owner").await;
    let member = app.register("Member").await;

    let (status, clan) = app
        .post("/api/clans", &owner, json!({"name": "Night Owls", "description": "Late study"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let clan_id = clan["id"].as_str().unwrap().to_string();
    let invite = clan["invite_code"].as_str().unwrap().to_string();

    let (status, joined) = app.post("/api/clans/join", &member, json!({"invite_code": invite})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(joined["member_count"], 2);

    let (_, mine) = app.get("/api/clans/mine", &member).await;
    assert_eq!(mine["id"], clan_id.as_str());

    let sessions_uri = format!("/api/clans/{}/sessions", clan_id);
    let (status, _) = app.post(&sessions_uri, &member, json!({"topic": TOPIC})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, session) = app.post(&sessions_uri, &owner, json!({"topic": TOPIC, "count": 1})).await;
    assert_eq!(status, StatusCode::CREATED, "{}", session);
    assert_eq!(session["mode"], "clan");
    let session_id = session["id"].as_str().unwrap().to_string();
    let question = session["question_ids"][0].as_str().unwrap().to_string();

    let (status, outcome) = app
        .post(
            &format!("/api/quiz/sessions/{}/answers", session_id),
            &member,
            json!({"question_index": 0, "selected_option": app.correct_option(&question), "time_taken_ms": 1_500}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", outcome);
    assert_eq!(outcome["correct"], true);

    let (_, completed) = app
        .post(&format!("/api/quiz/sessions/{}/complete", session_id), &owner, json!({}))
        .await;
    assert_eq!(completed["results"][0]["display_name"], "Member");

    let (status, board) = app.get(&format!("/api/clans/{}/leaderboard", clan_id), &owner).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board.as_array().unwrap().len(), 2);
    assert_eq!(board[0]["display_name"], "Member");
}

// =============================================================================
// Study
// =============================================================================

#[tokio::test]
async fn generated_questions_are_saved_and_playable() {
    let app = test_app().await;
    let ada = app.register("Ada").await;
    app.ai.push(MockResponse::Success {
        content: json!({"questions": [
            {"question": "What is the powerhouse of the cell?", "options": ["Mitochondria", "Nucleus"], "correct_index": 0},
            {"question": "Which molecule stores energy short term?", "options": ["ATP", "DNA", "RNA"], "correct_index": 0}
        ]})
        .to_string(),
        usage: TokenUsage::new(10, 20),
    });

    let (status, generated) = app
        .post("/api/study/quiz", &ada, json!({"topic": "Cells", "count": 2, "difficulty": "medium"}))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", generated);
    let questions = generated["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0]["difficulty"], "medium");
    assert!(questions[0]["correct_option"].is_u64());

    let ids: Vec<Value> = questions.iter().map(|q| q["id"].clone()).collect();
    let (status, _) = app.post("/api/quiz/sessions", &ada, json!({"question_ids": ids})).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn document_extraction_checks_content_type() {
    let app = test_app().await;
    let ada = app.register("Ada").await;

    let upload = |content_type: &str, body: &'static str| {
        Request::builder()
            .method(Method::POST)
            .uri("/api/study/extract")
            .header(header::AUTHORIZATION, format!("Bearer {}", ada))
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    };

    let response = app
        .router
        .clone()
        .oneshot(upload("text/markdown", "# Cells\n\n**Mitochondria** make ATP."))
        .await
        .unwrap();
    let (status, extracted) = read(response).await;
    assert_eq!(status, StatusCode::OK);
    assert!(extracted["text"].as_str().unwrap().contains("Mitochondria make ATP"));

    let response = app
        .router
        .clone()
        .oneshot(upload("application/pdf", "%PDF-1.7"))
        .await
        .unwrap();
    let (status, body) = read(response).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["code"], "UNSUPPORTED_DOCUMENT");
}

// =============================================================================
// Billing
// =============================================================================

#[tokio::test]
async fn signed_checkout_webhook_upgrades_the_account_once() {
    let app = test_app().await;
    let ada = app.register("Ada").await;
    let (_, me) = app.get("/api/auth/me", &ada).await;
    let user_id = me["id"].as_str().unwrap().to_string();

    let (status, checkout) = app.post("/api/billing/checkout", &ada, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(checkout["url"].as_str().is_some());

    let payload = serde_json::to_vec(&json!({
        "id": "evt_checkout_1",
        "type": "checkout.session.completed",
        "created": 1_700_000_000,
        "data": {"object": {
            "customer": "cus_ada",
            "subscription": "sub_ada",
            "metadata": {"user_id": user_id}
        }}
    }))
    .unwrap();
    let verifier = StripeWebhookVerifier::new(SecretString::new(WEBHOOK_SECRET.to_string()));
    let signature = verifier
        .signature_header(chrono::Utc::now().timestamp(), &payload)
        .unwrap();

    let (status, ack) = app.send_webhook(&payload, "t=1,v1=deadbeef").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", ack);

    let (status, ack) = app.send_webhook(&payload, &signature).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["status"], "applied");

    let (status, ack) = app.send_webhook(&payload, &signature).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["status"], "duplicate");

    let (_, me) = app.get("/api/auth/me", &ada).await;
    assert_eq!(me["tier"], "pro");

    let (status, body) = app.post("/api/billing/checkout", &ada, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}
