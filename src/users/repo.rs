use sqlx::{Postgres, QueryBuilder};

use crate::db::{Database, DbError};
use crate::users::repo_types::{NewUser, User, UserChanges};

macro_rules! user_columns {
    () => {
        "id, username, name, email, role, is_active, created_at, updated_at"
    };
}

/// Read column list, in the order `User` maps them.
pub const USER_COLUMNS: &str = user_columns!();

const LIST_SQL: &str = concat!("SELECT ", user_columns!(), " FROM users ORDER BY id");

const FIND_SQL: &str = concat!("SELECT ", user_columns!(), " FROM users WHERE id = $1");

const INSERT_SQL: &str = concat!(
    "INSERT INTO users (username, name, email, role, is_active, password_hash) ",
    "VALUES ($1, $2, $3, $4, $5, $6) ",
    "RETURNING ",
    user_columns!()
);

const DELETE_SQL: &str = "DELETE FROM users WHERE id = $1 RETURNING id";

pub async fn list(db: &Database) -> Result<Vec<User>, DbError> {
    db.query_all(sqlx::query_as::<_, User>(LIST_SQL)).await
}

pub async fn find_by_id(db: &Database, id: i64) -> Result<Option<User>, DbError> {
    db.query_one(sqlx::query_as::<_, User>(FIND_SQL).bind(id))
        .await
}

pub async fn insert(db: &Database, user: &NewUser) -> Result<Option<User>, DbError> {
    db.query_one(
        sqlx::query_as::<_, User>(INSERT_SQL)
            .bind(&user.username)
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.role.as_str())
            .bind(user.is_active)
            .bind(&user.password_hash),
    )
    .await
}

/// Returns `None` when no row has the given id.
pub async fn update(
    db: &Database,
    id: i64,
    changes: &UserChanges,
) -> Result<Option<User>, DbError> {
    let mut builder = update_statement(id, changes);
    db.query_one(builder.build_query_as::<User>()).await
}

pub async fn delete(db: &Database, id: i64) -> Result<Option<i64>, DbError> {
    let row = db
        .query_one(sqlx::query_as::<_, (i64,)>(DELETE_SQL).bind(id))
        .await?;
    Ok(row.map(|(id,)| id))
}

/// `UPDATE` touching only the columns present in `changes`, plus `updated_at`.
pub(crate) fn update_statement(id: i64, changes: &UserChanges) -> QueryBuilder<'_, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE users SET ");
    let mut set = builder.separated(", ");

    if let Some(username) = &changes.username {
        set.push("username = ").push_bind_unseparated(username.as_str());
    }
    if let Some(name) = &changes.name {
        set.push("name = ").push_bind_unseparated(name.as_str());
    }
    if let Some(email) = &changes.email {
        set.push("email = ").push_bind_unseparated(email.as_str());
    }
    if let Some(role) = changes.role {
        set.push("role = ").push_bind_unseparated(role.as_str());
    }
    if let Some(is_active) = changes.is_active {
        set.push("is_active = ").push_bind_unseparated(is_active);
    }
    if let Some(hash) = &changes.password_hash {
        set.push("password_hash = ").push_bind_unseparated(hash.as_str());
    }
    set.push("updated_at = now()");

    builder
        .push(" WHERE id = ")
        .push_bind(id)
        .push(" RETURNING ")
        .push(USER_COLUMNS);
    builder
}
