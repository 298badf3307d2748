use sqlx::PgPool;

pub struct MemberRow {
    pub conversation_id: i64,
    pub user_id: i64,
    pub role: String,
    pub muted_until_ms: i64,
}

pub struct ConvSummaryRow {
    pub conversation_id: i64,
    pub conv_type: String,
    pub name: String,
    pub owner_user_id: Option<i64>,
}

pub async fn world_conversation_id(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row = sqlx::query!("SELECT id FROM conversations WHERE is_world")
        .fetch_one(pool)
        .await?;
    Ok(row.id)
}

pub async fn add_member(
    pool: &PgPool,
    conversation_id: i64,
    user_id: i64,
    role: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query!(
        r#"INSERT INTO conversation_members (conversation_id, user_id, role, muted_until_ms)
           VALUES ($1, $2, $3, 0)
           ON CONFLICT (conversation_id, user_id) DO NOTHING"#,
        conversation_id,
        user_id,
        role
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_membership(
    pool: &PgPool,
    conversation_id: i64,
    user_id: i64,
) -> Result<Option<MemberRow>, sqlx::Error> {
    sqlx::query_as!(
        MemberRow,
        r#"SELECT conversation_id, user_id, role, muted_until_ms
           FROM conversation_members WHERE conversation_id = $1 AND user_id = $2"#,
        conversation_id,
        user_id
    )
    .fetch_optional(pool)
    .await
}

pub async fn member_ids(pool: &PgPool, conversation_id: i64) -> Result<Vec<i64>, sqlx::Error> {
    let rows = sqlx::query!(
        "SELECT user_id FROM conversation_members WHERE conversation_id = $1",
        conversation_id
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|r| r.user_id).collect())
}

pub async fn member_count(pool: &PgPool, conversation_id: i64) -> Result<i64, sqlx::Error> {
    let row = sqlx::query!(
        "SELECT COUNT(*) AS count FROM conversation_members WHERE conversation_id = $1",
        conversation_id
    )
    .fetch_one(pool)
    .await?;
    Ok(row.count.unwrap_or(0))
}

pub async fn members(pool: &PgPool, conversation_id: i64) -> Result<Vec<MemberRow>, sqlx::Error> {
    sqlx::query_as!(
        MemberRow,
        r#"SELECT conversation_id, user_id, role, muted_until_ms
           FROM conversation_members WHERE conversation_id = $1"#,
        conversation_id
    )
    .fetch_all(pool)
    .await
}

pub async fn find(pool: &PgPool, conversation_id: i64) -> Result<Option<ConvSummaryRow>, sqlx::Error> {
    sqlx::query_as!(
        ConvSummaryRow,
        r#"SELECT id AS conversation_id, conv_type, name, owner_user_id
           FROM conversations WHERE id = $1"#,
        conversation_id
    )
    .fetch_optional(pool)
    .await
}

pub async fn conversations_for_user(
    pool: &PgPool,
    user_id: i64,
) -> Result<Vec<ConvSummaryRow>, sqlx::Error> {
    sqlx::query_as!(
        ConvSummaryRow,
        r#"SELECT c.id AS conversation_id, c.conv_type, c.name, c.owner_user_id
           FROM conversations c
           JOIN conversation_members m ON m.conversation_id = c.id
           WHERE m.user_id = $1"#,
        user_id
    )
    .fetch_all(pool)
    .await
}

pub async fn last_message_marker(
    pool: &PgPool,
    conversation_id: i64,
) -> Result<(i64, i64), sqlx::Error> {
    let row = sqlx::query!(
        r#"SELECT seq, server_time_ms FROM messages
           WHERE conversation_id = $1 ORDER BY seq DESC LIMIT 1"#,
        conversation_id
    )
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|r| (r.seq, r.server_time_ms)).unwrap_or((0, 0)))
}

pub async fn set_muted_until(
    pool: &PgPool,
    conversation_id: i64,
    user_id: i64,
    muted_until_ms: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query!(
        r#"UPDATE conversation_members SET muted_until_ms = $1
           WHERE conversation_id = $2 AND user_id = $3"#,
        muted_until_ms,
        conversation_id,
        user_id
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn set_role(
    pool: &PgPool,
    conversation_id: i64,
    user_id: i64,
    role: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query!(
        r#"UPDATE conversation_members SET role = $1
           WHERE conversation_id = $2 AND user_id = $3"#,
        role,
        conversation_id,
        user_id
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn remove_member(
    pool: &PgPool,
    conversation_id: i64,
    user_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query!(
        "DELETE FROM conversation_members WHERE conversation_id = $1 AND user_id = $2",
        conversation_id,
        user_id
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Deletes a GROUP conversation and every row that derives from it: messages,
/// memberships, the sequence counter and (if it happened to be a SINGLE, which
/// callers never pass here) the pair index.
pub async fn dissolve(pool: &PgPool, conversation_id: i64) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query!("DELETE FROM messages WHERE conversation_id = $1", conversation_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query!(
        "DELETE FROM conversation_members WHERE conversation_id = $1",
        conversation_id
    )
    .execute(&mut *tx)
    .await?;
    sqlx::query!(
        "DELETE FROM conversation_sequences WHERE conversation_id = $1",
        conversation_id
    )
    .execute(&mut *tx)
    .await?;
    sqlx::query!(
        "DELETE FROM single_conversation_index WHERE conversation_id = $1",
        conversation_id
    )
    .execute(&mut *tx)
    .await?;
    sqlx::query!("DELETE FROM conversations WHERE id = $1", conversation_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await
}

pub async fn find_single_between(
    pool: &PgPool,
    user_a: i64,
    user_b: i64,
) -> Result<Option<i64>, sqlx::Error> {
    let (lo, hi) = if user_a < user_b {
        (user_a, user_b)
    } else {
        (user_b, user_a)
    };
    let row = sqlx::query!(
        "SELECT conversation_id FROM single_conversation_index WHERE user_lo = $1 AND user_hi = $2",
        lo,
        hi
    )
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|r| r.conversation_id))
}

/// Creates a SINGLE conversation between two users and its membership rows,
/// all in one transaction; callers must already have checked
/// `find_single_between` returned `None`.
pub async fn create_single(pool: &PgPool, user_a: i64, user_b: i64) -> Result<i64, sqlx::Error> {
    let (lo, hi) = if user_a < user_b {
        (user_a, user_b)
    } else {
        (user_b, user_a)
    };
    let mut tx = pool.begin().await?;
    let row = sqlx::query!(
        r#"INSERT INTO conversations (conv_type, name, owner_user_id, is_world)
           VALUES ('SINGLE', '', NULL, FALSE) RETURNING id"#
    )
    .fetch_one(&mut *tx)
    .await?;
    let conversation_id = row.id;
    sqlx::query!(
        "INSERT INTO conversation_sequences (conversation_id, next_seq) VALUES ($1, 1)",
        conversation_id
    )
    .execute(&mut *tx)
    .await?;
    sqlx::query!(
        r#"INSERT INTO conversation_members (conversation_id, user_id, role, muted_until_ms)
           VALUES ($1, $2, 'MEMBER', 0), ($1, $3, 'MEMBER', 0)"#,
        conversation_id,
        user_a,
        user_b
    )
    .execute(&mut *tx)
    .await?;
    sqlx::query!(
        r#"INSERT INTO single_conversation_index (user_lo, user_hi, conversation_id)
           VALUES ($1, $2, $3)"#,
        lo,
        hi,
        conversation_id
    )
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(conversation_id)
}

/// Creates a GROUP conversation with the given owner and additional members
/// in one transaction.
pub async fn create_group(
    pool: &PgPool,
    owner_user_id: i64,
    member_user_ids: &[i64],
    name: &str,
) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let row = sqlx::query!(
        r#"INSERT INTO conversations (conv_type, name, owner_user_id, is_world)
           VALUES ('GROUP', $1, $2, FALSE) RETURNING id"#,
        name,
        owner_user_id
    )
    .fetch_one(&mut *tx)
    .await?;
    let conversation_id = row.id;
    sqlx::query!(
        "INSERT INTO conversation_sequences (conversation_id, next_seq) VALUES ($1, 1)",
        conversation_id
    )
    .execute(&mut *tx)
    .await?;
    sqlx::query!(
        r#"INSERT INTO conversation_members (conversation_id, user_id, role, muted_until_ms)
           VALUES ($1, $2, 'OWNER', 0)"#,
        conversation_id,
        owner_user_id
    )
    .execute(&mut *tx)
    .await?;
    for member_id in member_user_ids {
        sqlx::query!(
            r#"INSERT INTO conversation_members (conversation_id, user_id, role, muted_until_ms)
               VALUES ($1, $2, 'MEMBER', 0)
               ON CONFLICT (conversation_id, user_id) DO NOTHING"#,
            conversation_id,
            member_id
        )
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(conversation_id)
}
