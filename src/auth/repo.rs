use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database. Immutable after registration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl User {
    /// Find a user by email. Matching is case-sensitive, as stored.
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    /// Insert a new user. Email uniqueness is enforced by the unique index, so
    /// concurrent registrations for the same email cannot both succeed; the
    /// loser surfaces a unique-violation error for the caller to map to 409.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    async fn duplicate_email_fails_with_unique_violation(pool: PgPool) {
        User::create(&pool, "ann", "a@x.com", "hash-a")
            .await
            .expect("first insert");

        let err = User::create(&pool, "bob", "a@x.com", "hash-b")
            .await
            .unwrap_err();
        match err {
            sqlx::Error::Database(db) => assert!(db.is_unique_violation()),
            other => panic!("expected unique violation, got {other}"),
        }

        // The losing insert left nothing behind.
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind("a@x.com")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(count, 1);
    }

    #[sqlx::test]
    async fn find_by_email_is_case_sensitive(pool: PgPool) {
        User::create(&pool, "ann", "Ann@x.com", "hash")
            .await
            .expect("create");

        assert!(User::find_by_email(&pool, "ann@x.com")
            .await
            .expect("query")
            .is_none());
        let found = User::find_by_email(&pool, "Ann@x.com")
            .await
            .expect("query")
            .expect("present");
        assert_eq!(found.username, "ann");
    }
}
