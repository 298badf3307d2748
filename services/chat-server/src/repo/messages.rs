use sqlx::PgPool;

pub struct StoredMessage {
    pub id: i64,
    pub seq: i64,
    pub server_time_ms: i64,
}

pub struct MessageRow {
    pub id: i64,
    pub sender_id: i64,
    pub msg_type: String,
    pub content: String,
    pub server_time_ms: i64,
    pub seq: i64,
}

/// Allocates the next `seq` for `conversation_id` and persists the message in
/// the same transaction, so the allocate-then-insert pair linearizes per
/// conversation regardless of how many sessions call this concurrently.
pub async fn allocate_and_insert(
    pool: &PgPool,
    conversation_id: i64,
    sender_id: i64,
    msg_type: &str,
    content: &str,
    server_time_ms: i64,
) -> Result<StoredMessage, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let seq_row = sqlx::query!(
        r#"UPDATE conversation_sequences SET next_seq = next_seq + 1
           WHERE conversation_id = $1
           RETURNING next_seq - 1 AS "seq!""#,
        conversation_id
    )
    .fetch_one(&mut *tx)
    .await?;
    let seq = seq_row.seq;
    let msg_row = sqlx::query!(
        r#"INSERT INTO messages (conversation_id, sender_id, seq, msg_type, content, server_time_ms)
           VALUES ($1, $2, $3, $4, $5, $6)
           RETURNING id"#,
        conversation_id,
        sender_id,
        seq,
        msg_type,
        content,
        server_time_ms
    )
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(StoredMessage {
        id: msg_row.id,
        seq,
        server_time_ms,
    })
}

pub async fn latest(
    pool: &PgPool,
    conversation_id: i64,
    limit: i64,
) -> Result<Vec<MessageRow>, sqlx::Error> {
    let mut rows = sqlx::query_as!(
        MessageRow,
        r#"SELECT id, sender_id, msg_type, content, server_time_ms, seq
           FROM messages WHERE conversation_id = $1
           ORDER BY seq DESC LIMIT $2"#,
        conversation_id,
        limit
    )
    .fetch_all(pool)
    .await?;
    rows.reverse();
    Ok(rows)
}

pub async fn before_seq(
    pool: &PgPool,
    conversation_id: i64,
    before_seq: i64,
    limit: i64,
) -> Result<Vec<MessageRow>, sqlx::Error> {
    let mut rows = sqlx::query_as!(
        MessageRow,
        r#"SELECT id, sender_id, msg_type, content, server_time_ms, seq
           FROM messages WHERE conversation_id = $1 AND seq < $2
           ORDER BY seq DESC LIMIT $3"#,
        conversation_id,
        before_seq,
        limit
    )
    .fetch_all(pool)
    .await?;
    rows.reverse();
    Ok(rows)
}

pub async fn after_seq(
    pool: &PgPool,
    conversation_id: i64,
    after_seq: i64,
    limit: i64,
) -> Result<Vec<MessageRow>, sqlx::Error> {
    sqlx::query_as!(
        MessageRow,
        r#"SELECT id, sender_id, msg_type, content, server_time_ms, seq
           FROM messages WHERE conversation_id = $1 AND seq > $2
           ORDER BY seq ASC LIMIT $3"#,
        conversation_id,
        after_seq,
        limit
    )
    .fetch_all(pool)
    .await
}

/// `true` when more, older messages exist below the lowest `seq` returned.
pub async fn has_earlier(
    pool: &PgPool,
    conversation_id: i64,
    min_seq_returned: i64,
) -> Result<bool, sqlx::Error> {
    if min_seq_returned <= 1 {
        return Ok(false);
    }
    let row = sqlx::query!(
        "SELECT EXISTS(SELECT 1 FROM messages WHERE conversation_id = $1 AND seq < $2) AS \"exists!\"",
        conversation_id,
        min_seq_returned
    )
    .fetch_one(pool)
    .await?;
    Ok(row.exists)
}
