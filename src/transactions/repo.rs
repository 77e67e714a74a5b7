use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Transaction record. Positive amounts are income, negative are expenses,
/// zero is legal. `user_id` and `created_at` never change after insert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub amount: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Aggregates over one user's full transaction set.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TransactionSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub balance: f64,
}

/// All transactions for a user, newest first.
pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> Result<Vec<Transaction>, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(
        r#"
        SELECT id, user_id, text, amount, created_at
        FROM transactions
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

/// Fetch one transaction. Filters on `(id, user_id)` jointly: a record owned
/// by another user looks exactly like one that does not exist.
pub async fn get(db: &PgPool, id: Uuid, user_id: Uuid) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(
        r#"
        SELECT id, user_id, text, amount, created_at
        FROM transactions
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

/// Insert a transaction for `user_id`. The database stamps id and created_at.
pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    text: &str,
    amount: f64,
) -> Result<Transaction, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (user_id, text, amount)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, text, amount, created_at
        "#,
    )
    .bind(user_id)
    .bind(text)
    .bind(amount)
    .fetch_one(db)
    .await
}

/// Update text/amount in a single atomic statement matched on `(id, user_id)`.
/// False when no owned record matched; `created_at` and `user_id` are left
/// untouched.
pub async fn update(
    db: &PgPool,
    id: Uuid,
    user_id: Uuid,
    text: &str,
    amount: f64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE transactions
        SET text = $3, amount = $4
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(text)
    .bind(amount)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete matched on `(id, user_id)`; false when nothing matched.
pub async fn delete(db: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM transactions
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Income, expenses, and balance over the user's full record set, computed in
/// one statement. Zero amounts count toward the balance only.
pub async fn summary(db: &PgPool, user_id: Uuid) -> Result<TransactionSummary, sqlx::Error> {
    sqlx::query_as::<_, TransactionSummary>(
        r#"
        SELECT
            COALESCE(SUM(amount) FILTER (WHERE amount > 0), 0) AS total_income,
            COALESCE(SUM(-amount) FILTER (WHERE amount < 0), 0) AS total_expenses,
            COALESCE(SUM(amount), 0) AS balance
        FROM transactions
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(db)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::User;
    use std::time::Duration;

    async fn make_user(db: &PgPool, email: &str) -> Uuid {
        User::create(db, "ann", email, "$argon2id$not-a-real-hash")
            .await
            .expect("create user")
            .id
    }

    #[sqlx::test]
    async fn records_are_scoped_to_their_owner(pool: PgPool) {
        let a = make_user(&pool, "a@x.com").await;
        let b = make_user(&pool, "b@x.com").await;
        let t = create(&pool, a, "salary", 1000.0).await.expect("create");

        // User B cannot see or touch A's record through any operation.
        assert!(get(&pool, t.id, b).await.expect("get").is_none());
        assert!(!update(&pool, t.id, b, "hijacked", 1.0).await.expect("update"));
        assert!(!delete(&pool, t.id, b).await.expect("delete"));
        assert!(list_by_user(&pool, b).await.expect("list").is_empty());

        // Untouched and still visible to its owner.
        let still = get(&pool, t.id, a).await.expect("get").expect("present");
        assert_eq!(still.text, "salary");
        assert_eq!(still.amount, 1000.0);
    }

    #[sqlx::test]
    async fn owner_update_changes_text_and_amount_only(pool: PgPool) {
        let a = make_user(&pool, "a@x.com").await;
        let t = create(&pool, a, "salary", 1000.0).await.expect("create");

        assert!(update(&pool, t.id, a, "bonus", 1200.0).await.expect("update"));

        let updated = get(&pool, t.id, a).await.expect("get").expect("present");
        assert_eq!(updated.id, t.id);
        assert_eq!(updated.text, "bonus");
        assert_eq!(updated.amount, 1200.0);
        assert_eq!(updated.user_id, a);
        assert_eq!(updated.created_at, t.created_at);
    }

    #[sqlx::test]
    async fn owner_delete_removes_only_the_matched_record(pool: PgPool) {
        let a = make_user(&pool, "a@x.com").await;
        let keep = create(&pool, a, "salary", 1000.0).await.expect("create");
        let gone = create(&pool, a, "coffee", -4.5).await.expect("create");

        assert!(delete(&pool, gone.id, a).await.expect("delete"));
        assert!(get(&pool, gone.id, a).await.expect("get").is_none());

        let listed = list_by_user(&pool, a).await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, keep.id);
    }

    #[sqlx::test]
    async fn list_is_newest_first(pool: PgPool) {
        let a = make_user(&pool, "a@x.com").await;
        let first = create(&pool, a, "salary", 1000.0).await.expect("create");
        // Keep the insertion timestamps apart.
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = create(&pool, a, "coffee", -4.5).await.expect("create");

        let listed = list_by_user(&pool, a).await.expect("list");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[sqlx::test]
    async fn summary_holds_the_balance_identity(pool: PgPool) {
        let a = make_user(&pool, "a@x.com").await;

        let empty = summary(&pool, a).await.expect("summary");
        assert_eq!(empty.total_income, 0.0);
        assert_eq!(empty.total_expenses, 0.0);
        assert_eq!(empty.balance, 0.0);

        create(&pool, a, "salary", 1000.0).await.expect("create");
        create(&pool, a, "coffee", -4.5).await.expect("create");
        create(&pool, a, "noop", 0.0).await.expect("create");

        // Another user's records must not leak into the aggregates.
        let b = make_user(&pool, "b@x.com").await;
        create(&pool, b, "rent", -100.0).await.expect("create");

        let s = summary(&pool, a).await.expect("summary");
        assert_eq!(s.total_income, 1000.0);
        assert_eq!(s.total_expenses, 4.5);
        assert_eq!(s.balance, 995.5);
        assert_eq!(s.balance, s.total_income - s.total_expenses);
    }
}
