//! PostgreSQL implementation of ClanRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::clan::{Clan, ClanMember, ClanRole, INVITE_CODE_LEN};
use crate::domain::foundation::{ClanId, DomainError, ErrorCode, ShareCode, Timestamp, UserId};
use crate::ports::ClanRepository;

use super::{corrupt, db_error, label, user_id, violates};

pub struct PostgresClanRepository {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct ClanRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    owner_id: String,
    invite_code: String,
    max_members: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    user_id: String,
    display_name: String,
    role: String,
    joined_at: DateTime<Utc>,
}

impl TryFrom<MemberRow> for ClanMember {
    type Error = DomainError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        Ok(ClanMember {
            user_id: user_id(row.user_id)?,
            display_name: row.display_name,
            role: label("clan role", &row.role, ClanRole::parse)?,
            joined_at: Timestamp::from_datetime(row.joined_at),
        })
    }
}

fn not_found() -> DomainError {
    DomainError::new(ErrorCode::ClanNotFound, "Clan not found")
}

fn already_in_clan() -> DomainError {
    DomainError::new(ErrorCode::AlreadyInClan, "Already a member of a clan")
}

impl PostgresClanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load(&self, row: Option<ClanRow>) -> Result<Option<Clan>, DomainError> {
        let Some(row) = row else {
            return Ok(None);
        };

        let members: Vec<MemberRow> = sqlx::query_as(
            r#"
            SELECT user_id, display_name, role, joined_at
            FROM clan_members WHERE clan_id = $1
            ORDER BY joined_at, user_id
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("load clan members"))?;
        let members = members
            .into_iter()
            .map(ClanMember::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Clan::reconstitute(
            ClanId::from_uuid(row.id),
            row.name,
            row.description,
            user_id(row.owner_id)?,
            ShareCode::parse(&row.invite_code, INVITE_CODE_LEN).map_err(|e| corrupt("invite code", e))?,
            u32::try_from(row.max_members).map_err(|_| corrupt("max_members", row.max_members))?,
            members,
            Timestamp::from_datetime(row.created_at),
            Timestamp::from_datetime(row.updated_at),
        )))
    }

    async fn fetch_row(&self, sql: &str, value: ClanLookup<'_>) -> Result<Option<ClanRow>, DomainError> {
        let query = sqlx::query_as::<_, ClanRow>(sql);
        let query = match value {
            ClanLookup::Uuid(id) => query.bind(id),
            ClanLookup::Text(text) => query.bind(text),
        };
        query
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find clan"))
    }
}

enum ClanLookup<'a> {
    Uuid(Uuid),
    Text(&'a str),
}

const SELECT_CLAN: &str =
    "SELECT c.id, c.name, c.description, c.owner_id, c.invite_code, c.max_members, c.created_at, c.updated_at FROM clans c";

#[async_trait]
impl ClanRepository for PostgresClanRepository {
    async fn save(&self, clan: &Clan) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        sqlx::query(
            r#"
            INSERT INTO clans (id, name, description, owner_id, invite_code, max_members, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(clan.id().as_uuid())
        .bind(clan.name())
        .bind(clan.description())
        .bind(clan.owner_id().as_str())
        .bind(clan.invite_code().as_str())
        .bind(clan.max_members() as i32)
        .bind(clan.created_at().as_datetime())
        .bind(clan.updated_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if violates(&e, "clans_invite_code_key") {
                DomainError::new(ErrorCode::Conflict, "Invite code collision")
            } else {
                db_error("insert clan")(e)
            }
        })?;

        for member in clan.members() {
            sqlx::query(
                r#"
                INSERT INTO clan_members (user_id, clan_id, display_name, role, joined_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(member.user_id.as_str())
            .bind(clan.id().as_uuid())
            .bind(&member.display_name)
            .bind(member.role.as_str())
            .bind(member.joined_at.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if violates(&e, "clan_members_pkey") {
                    already_in_clan()
                } else {
                    db_error("insert clan member")(e)
                }
            })?;
        }

        tx.commit().await.map_err(db_error("commit clan"))?;
        Ok(())
    }

    async fn update(&self, clan: &Clan) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        let result = sqlx::query(
            "UPDATE clans SET name = $2, description = $3, owner_id = $4, updated_at = $5 WHERE id = $1",
        )
        .bind(clan.id().as_uuid())
        .bind(clan.name())
        .bind(clan.description())
        .bind(clan.owner_id().as_str())
        .bind(clan.updated_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_error("update clan"))?;
        if result.rows_affected() == 0 {
            return Err(not_found());
        }

        for member in clan.members() {
            sqlx::query("UPDATE clan_members SET role = $3 WHERE clan_id = $1 AND user_id = $2")
                .bind(clan.id().as_uuid())
                .bind(member.user_id.as_str())
                .bind(member.role.as_str())
                .execute(&mut *tx)
                .await
                .map_err(db_error("update clan role"))?;
        }

        tx.commit().await.map_err(db_error("commit clan"))?;
        Ok(())
    }

    async fn delete(&self, id: &ClanId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM clans WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error("delete clan"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &ClanId) -> Result<Option<Clan>, DomainError> {
        let sql = format!("{} WHERE c.id = $1", SELECT_CLAN);
        let row = self.fetch_row(&sql, ClanLookup::Uuid(*id.as_uuid())).await?;
        self.load(row).await
    }

    async fn find_by_invite_code(&self, code: &ShareCode) -> Result<Option<Clan>, DomainError> {
        let sql = format!("{} WHERE c.invite_code = $1", SELECT_CLAN);
        let row = self.fetch_row(&sql, ClanLookup::Text(code.as_str())).await?;
        self.load(row).await
    }

    async fn find_by_member(&self, user_id: &UserId) -> Result<Option<Clan>, DomainError> {
        let sql = format!(
            "{} JOIN clan_members m ON m.clan_id = c.id WHERE m.user_id = $1",
            SELECT_CLAN
        );
        let row = self.fetch_row(&sql, ClanLookup::Text(user_id.as_str())).await?;
        self.load(row).await
    }

    /// Locks the clan row first so concurrent joins count members one at a time.
    async fn add_member(&self, clan_id: &ClanId, member: &ClanMember) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        let max_members: Option<i32> = sqlx::query_scalar("SELECT max_members FROM clans WHERE id = $1 FOR UPDATE")
            .bind(clan_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("lock clan"))?;
        let Some(max_members) = max_members else {
            return Err(not_found());
        };

        let members: i64 = sqlx::query_scalar("SELECT count(*) FROM clan_members WHERE clan_id = $1")
            .bind(clan_id.as_uuid())
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("count clan members"))?;
        if members >= i64::from(max_members) {
            return Err(DomainError::new(ErrorCode::ClanFull, "Clan is full"));
        }

        sqlx::query(
            r#"
            INSERT INTO clan_members (user_id, clan_id, display_name, role, joined_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(member.user_id.as_str())
        .bind(clan_id.as_uuid())
        .bind(&member.display_name)
        .bind(member.role.as_str())
        .bind(member.joined_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if violates(&e, "clan_members_pkey") {
                already_in_clan()
            } else {
                db_error("add clan member")(e)
            }
        })?;

        tx.commit().await.map_err(db_error("commit clan member"))?;
        Ok(())
    }

    async fn remove_member(&self, clan_id: &ClanId, user_id: &UserId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM clan_members WHERE clan_id = $1 AND user_id = $2")
            .bind(clan_id.as_uuid())
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_error("remove clan member"))?;
        Ok(())
    }
}
