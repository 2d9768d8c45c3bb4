//! PostgreSQL implementation of AccountRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::account::{Email, UserAccount};
use crate::domain::billing::SubscriptionTier;
use crate::domain::foundation::{DomainError, ErrorCode, IdentityProvider, Timestamp, UserId};
use crate::ports::{AccountRepository, SubscriptionUpdate};

use super::{corrupt, db_error, label, user_id, violates};

const SELECT_USER: &str = r#"
    SELECT id, email, display_name, password_hash, provider, tier,
           stripe_customer_id, stripe_subscription_id, created_at, updated_at
    FROM users
"#;

pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_where(&self, clause: &str, value: &str) -> Result<Option<UserAccount>, DomainError> {
        let sql = format!("{} WHERE {} = $1", SELECT_USER, clause);
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find user"))?;
        row.map(UserAccount::try_from).transpose()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    display_name: String,
    password_hash: Option<String>,
    provider: String,
    tier: String,
    stripe_customer_id: Option<String>,
    stripe_subscription_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserAccount {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(UserAccount {
            id: user_id(row.id)?,
            email: Email::parse(&row.email).map_err(|e| corrupt("email", e))?,
            display_name: row.display_name,
            password_hash: row.password_hash,
            provider: label("provider", &row.provider, IdentityProvider::parse)?,
            tier: label("tier", &row.tier, SubscriptionTier::parse)?,
            stripe_customer_id: row.stripe_customer_id,
            stripe_subscription_id: row.stripe_subscription_id,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn create(&self, account: &UserAccount) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, display_name, password_hash, provider, tier,
                stripe_customer_id, stripe_subscription_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(account.id.as_str())
        .bind(account.email.as_str())
        .bind(&account.display_name)
        .bind(&account.password_hash)
        .bind(account.provider.as_str())
        .bind(account.tier.as_str())
        .bind(&account.stripe_customer_id)
        .bind(&account.stripe_subscription_id)
        .bind(account.created_at.as_datetime())
        .bind(account.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "users_email_key") {
                DomainError::new(ErrorCode::EmailTaken, "Email is already registered")
            } else if violates(&e, "users_pkey") {
                DomainError::new(ErrorCode::Conflict, "Account already exists")
            } else {
                db_error("create user")(e)
            }
        })?;
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, DomainError> {
        self.find_where("id", id.as_str()).await
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<UserAccount>, DomainError> {
        self.find_where("email", email.as_str()).await
    }

    async fn find_by_stripe_customer(&self, customer_id: &str) -> Result<Option<UserAccount>, DomainError> {
        self.find_where("stripe_customer_id", customer_id).await
    }

    async fn update_subscription(&self, id: &UserId, update: SubscriptionUpdate) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                tier = $2,
                stripe_customer_id = COALESCE($3, stripe_customer_id),
                stripe_subscription_id = COALESCE($4, stripe_subscription_id),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(update.tier.as_str())
        .bind(&update.stripe_customer_id)
        .bind(&update.stripe_subscription_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("update subscription"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::UserNotFound, "User not found"));
        }
        Ok(())
    }
}
