use sqlx::PgPool;

pub struct UserRow {
    pub id: i64,
    pub account: String,
    pub password: String,
    pub display_name: String,
    pub avatar_path: String,
}

pub async fn find_by_account(pool: &PgPool, account: &str) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as!(
        UserRow,
        r#"SELECT id, account, password, display_name, avatar_path
           FROM users WHERE account = $1"#,
        account
    )
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, user_id: i64) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as!(
        UserRow,
        r#"SELECT id, account, password, display_name, avatar_path
           FROM users WHERE id = $1"#,
        user_id
    )
    .fetch_optional(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    account: &str,
    password: &str,
    display_name: &str,
) -> Result<UserRow, sqlx::Error> {
    let row = sqlx::query!(
        r#"INSERT INTO users (account, password, display_name, avatar_path)
           VALUES ($1, $2, $3, '')
           RETURNING id"#,
        account,
        password,
        display_name
    )
    .fetch_one(pool)
    .await?;
    Ok(UserRow {
        id: row.id,
        account: account.to_owned(),
        password: password.to_owned(),
        display_name: display_name.to_owned(),
        avatar_path: String::new(),
    })
}

pub async fn update_display_name(
    pool: &PgPool,
    user_id: i64,
    display_name: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query!(
        "UPDATE users SET display_name = $1 WHERE id = $2",
        display_name,
        user_id
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update_avatar_path(
    pool: &PgPool,
    user_id: i64,
    avatar_path: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query!(
        "UPDATE users SET avatar_path = $1 WHERE id = $2",
        avatar_path,
        user_id
    )
    .execute(pool)
    .await?;
    Ok(())
}
