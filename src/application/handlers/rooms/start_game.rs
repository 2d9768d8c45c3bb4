//! StartGameHandler - turns a waiting lobby into a multiplayer quiz.
//!
//! The room is claimed first with a conditional start that freezes its seats;
//! the session is then built from the players that claim returned.

use std::sync::Arc;

use crate::application::handlers::quiz::{select_questions, QuestionSelection};
use crate::domain::foundation::{DomainError, QuestionId, QuizSessionId, RoomId, UserId};
use crate::domain::quiz::{Participant, QuizSession, DEFAULT_TIME_LIMIT_SECS};
use crate::domain::room::Room;
use crate::ports::{QuestionRepository, QuizSessionRepository, RoomRepository};

use super::load_room;

#[derive(Debug, Clone)]
pub struct StartGameCommand {
    pub room_id: RoomId,
    pub user_id: UserId,
    /// Defaults to the room's topic when no question ids are given.
    pub topic: Option<String>,
    pub question_ids: Option<Vec<QuestionId>>,
    pub count: Option<u32>,
    pub time_limit_secs: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct StartedGame {
    pub room: Room,
    pub session: QuizSession,
}

pub struct StartGameHandler {
    rooms: Arc<dyn RoomRepository>,
    sessions: Arc<dyn QuizSessionRepository>,
    questions: Arc<dyn QuestionRepository>,
}

impl StartGameHandler {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        sessions: Arc<dyn QuizSessionRepository>,
        questions: Arc<dyn QuestionRepository>,
    ) -> Self {
        Self {
            rooms,
            sessions,
            questions,
        }
    }

    pub async fn handle(&self, cmd: StartGameCommand) -> Result<StartedGame, DomainError> {
        let lobby = load_room(self.rooms.as_ref(), &cmd.room_id).await?;
        lobby.authorize_host(&cmd.user_id)?;

        let topic = cmd.topic.or_else(|| lobby.topic().map(str::to_string));
        let selection = QuestionSelection::from_request(cmd.question_ids, topic, cmd.count)?;
        let question_ids = select_questions(self.questions.as_ref(), selection).await?;
        let time_limit = cmd.time_limit_secs.unwrap_or(DEFAULT_TIME_LIMIT_SECS);
        let session_id = QuizSessionId::new();

        // Validates status, player count and quiz settings before anything is written.
        lobby.clone().start(&cmd.user_id, session_id)?;
        session_for(session_id, &lobby, question_ids.clone(), time_limit)?;

        let room = self.rooms.start(lobby.id(), &cmd.user_id, &session_id).await?;
        let session = session_for(session_id, &room, question_ids, time_limit)?;
        if let Err(e) = self.sessions.save(&session).await {
            tracing::error!(room_id = %room.id(), error = %e, "Session save failed, reopening room");
            self.rooms.update(&lobby).await?;
            return Err(e);
        }

        for participant in session.participants() {
            self.questions
                .record_served(&participant.user_id, session.question_ids())
                .await?;
        }

        tracing::info!(
            room_id = %room.id(),
            session_id = %session.id(),
            players = session.participants().len(),
            questions = session.question_ids().len(),
            "Room game started"
        );

        Ok(StartedGame { room, session })
    }
}

fn session_for(
    id: QuizSessionId,
    room: &Room,
    question_ids: Vec<QuestionId>,
    time_limit_secs: u32,
) -> Result<QuizSession, DomainError> {
    let players: Vec<Participant> = room
        .players()
        .iter()
        .map(|p| Participant::new(p.user_id.clone(), p.display_name.clone()))
        .collect();
    QuizSession::for_room(id, *room.id(), room.host_id().clone(), players, question_ids, time_limit_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryQuestionRepository, InMemoryQuizSessionRepository, InMemoryRoomRepository};
    use crate::application::handlers::quiz::test_support::bank;
    use crate::domain::foundation::{ErrorCode, ShareCode};
    use crate::domain::quiz::QuizMode;
    use crate::domain::room::{RoomPlayer, RoomStatus};
    use async_trait::async_trait;

    /// Delegating room store that yields on every load and can seat one more
    /// player just before the start lands, like a join committing late.
    struct RacingRooms {
        inner: Arc<InMemoryRoomRepository>,
        late_joiner: Option<RoomPlayer>,
    }

    #[async_trait]
    impl RoomRepository for RacingRooms {
        async fn save(&self, room: &Room) -> Result<(), DomainError> {
            self.inner.save(room).await
        }

        async fn update(&self, room: &Room) -> Result<(), DomainError> {
            self.inner.update(room).await
        }

        async fn find_by_id(&self, id: &RoomId) -> Result<Option<Room>, DomainError> {
            let found = self.inner.find_by_id(id).await;
            tokio::task::yield_now().await;
            found
        }

        async fn find_by_code(&self, code: &ShareCode) -> Result<Option<Room>, DomainError> {
            self.inner.find_by_code(code).await
        }

        async fn list_joinable(&self, limit: u32) -> Result<Vec<Room>, DomainError> {
            self.inner.list_joinable(limit).await
        }

        async fn add_player(&self, room_id: &RoomId, player: &RoomPlayer) -> Result<(), DomainError> {
            self.inner.add_player(room_id, player).await
        }

        async fn start(&self, room_id: &RoomId, host_id: &UserId, session_id: &QuizSessionId) -> Result<Room, DomainError> {
            if let Some(player) = &self.late_joiner {
                // Ignore the refusal once the room has already started.
                let _ = self.inner.add_player(room_id, player).await;
            }
            self.inner.start(room_id, host_id, session_id).await
        }

        async fn remove_player(&self, room_id: &RoomId, user_id: &UserId) -> Result<(), DomainError> {
            self.inner.remove_player(room_id, user_id).await
        }

        async fn set_ready(&self, room_id: &RoomId, user_id: &UserId, ready: bool) -> Result<(), DomainError> {
            self.inner.set_ready(room_id, user_id, ready).await
        }
    }

    struct Fixture {
        rooms: Arc<InMemoryRoomRepository>,
        sessions: Arc<InMemoryQuizSessionRepository>,
        questions: Arc<InMemoryQuestionRepository>,
        handler: StartGameHandler,
    }

    async fn fixture() -> Fixture {
        let rooms = Arc::new(InMemoryRoomRepository::new());
        let sessions = Arc::new(InMemoryQuizSessionRepository::new());
        let questions = Arc::new(InMemoryQuestionRepository::new());
        questions.save_all(&bank("history", 6)).await.unwrap();
        let handler = StartGameHandler::new(rooms.clone(), sessions.clone(), questions.clone());
        Fixture {
            rooms,
            sessions,
            questions,
            handler,
        }
    }

    impl Fixture {
        fn handler_over(&self, late_joiner: Option<&str>) -> StartGameHandler {
            let rooms = Arc::new(RacingRooms {
                inner: self.rooms.clone(),
                late_joiner: late_joiner.map(|id| RoomPlayer::new(UserId::new(id).unwrap(), id)),
            });
            StartGameHandler::new(rooms, self.sessions.clone(), self.questions.clone())
        }
    }

    async fn lobby(rooms: &InMemoryRoomRepository, players: &[&str]) -> Room {
        let room = Room::create(
            RoomPlayer::new(UserId::new("host").unwrap(), "Host"),
            "Lobby",
            Some("history".to_string()),
            None,
            false,
        )
        .unwrap();
        rooms.save(&room).await.unwrap();
        for p in players {
            rooms
                .add_player(room.id(), &RoomPlayer::new(UserId::new(*p).unwrap(), *p))
                .await
                .unwrap();
        }
        room
    }

    fn start(room: &Room, by: &str) -> StartGameCommand {
        StartGameCommand {
            room_id: *room.id(),
            user_id: UserId::new(by).unwrap(),
            topic: None,
            question_ids: None,
            count: Some(5),
            time_limit_secs: None,
        }
    }

    #[tokio::test]
    async fn host_starts_a_multiplayer_session_from_the_room_topic() {
        let f = fixture().await;
        let room = lobby(&f.rooms, &["p1", "p2"]).await;

        let started = f.handler.handle(start(&room, "host")).await.unwrap();

        assert_eq!(started.session.mode(), QuizMode::Multiplayer);
        assert_eq!(started.session.participants().len(), 3);
        assert_eq!(started.session.question_ids().len(), 5);
        let stored_room = f.rooms.find_by_id(room.id()).await.unwrap().unwrap();
        assert_eq!(stored_room.status(), RoomStatus::InProgress);
        assert_eq!(stored_room.quiz_session_id(), Some(started.session.id()));
        assert!(f.sessions.find_by_id(started.session.id()).await.unwrap().is_some());
        let served = f
            .questions
            .recent_served_texts(&UserId::new("p2").unwrap(), 10)
            .await
            .unwrap();
        assert_eq!(served.len(), 5);
    }

    #[tokio::test]
    async fn non_host_cannot_start() {
        let f = fixture().await;
        let room = lobby(&f.rooms, &["p1"]).await;

        let err = f.handler.handle(start(&room, "p1")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn a_lone_host_cannot_start() {
        let f = fixture().await;
        let room = lobby(&f.rooms, &[]).await;

        let err = f.handler.handle(start(&room, "host")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        let stored = f.rooms.find_by_id(room.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), RoomStatus::Waiting);
    }

    #[tokio::test]
    async fn a_player_seated_after_the_lobby_was_read_still_plays() {
        let f = fixture().await;
        let room = lobby(&f.rooms, &["p1"]).await;
        let handler = f.handler_over(Some("late"));

        let started = handler.handle(start(&room, "host")).await.unwrap();

        assert!(started.session.is_participant(&UserId::new("late").unwrap()));
        assert_eq!(started.session.participants().len(), 3);
        assert_eq!(started.room.current_players(), 3);
    }

    #[tokio::test]
    async fn concurrent_starts_create_one_game() {
        let f = fixture().await;
        let room = lobby(&f.rooms, &["p1"]).await;
        let handler = f.handler_over(None);

        let (first, second) = tokio::join!(
            handler.handle(start(&room, "host")),
            handler.handle(start(&room, "host")),
        );

        let outcomes = [first, second];
        let winner = outcomes.iter().find_map(|r| r.as_ref().ok()).unwrap();
        let loser = outcomes.iter().find_map(|r| r.as_ref().err()).unwrap();
        assert_eq!(loser.code, ErrorCode::InvalidStateTransition);

        let stored_room = f.rooms.find_by_id(room.id()).await.unwrap().unwrap();
        assert_eq!(stored_room.quiz_session_id(), Some(winner.session.id()));
        assert!(f.sessions.find_by_id(winner.session.id()).await.unwrap().is_some());
    }
}
