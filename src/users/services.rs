use serde_json::Value;
use tracing::{info, warn};

use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::users::{
    dto::UserFields,
    password::{hash_password, DEFAULT_PASSWORD},
    repo,
    repo_types::{NewUser, Role, User, UserChanges},
};

const ROLE_ERROR: &str = "invalid role (admin/support/user)";

/// Best-effort boolean parsing. Unrecognised input yields `default` rather than an error.
pub fn parse_bool(value: Option<&Value>, default: bool) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(default),
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "y" | "si" | "sí" => true,
            "false" | "0" | "no" | "n" => false,
            _ => default,
        },
        _ => default,
    }
}

/// Reads a text field; `null` reads as empty. Non-string JSON is rejected.
fn text(value: Option<&Value>, field: &str) -> AppResult<String> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(AppError::validation(format!("'{field}' must be a string"))),
    }
}

fn required_text(value: Option<&Value>, field: &str) -> AppResult<String> {
    let v = text(value, field)?.trim().to_string();
    if v.is_empty() {
        return Err(AppError::validation(format!("missing '{field}'")));
    }
    Ok(v)
}

fn non_empty_text(value: &Value, field: &str) -> AppResult<String> {
    let v = text(Some(value), field)?.trim().to_string();
    if v.is_empty() {
        return Err(AppError::validation(format!("'{field}' must not be empty")));
    }
    Ok(v)
}

fn parse_role(raw: &str) -> AppResult<Role> {
    raw.trim()
        .parse::<Role>()
        .map_err(|_| AppError::validation(ROLE_ERROR))
}

/// Validates a creation request, applying defaults for role, activity and password.
pub fn validate_new_user(fields: &UserFields) -> AppResult<NewUser> {
    let username = required_text(fields.username.as_ref(), "username")?;
    let name = required_text(fields.name.as_ref(), "name")?;
    let email = required_text(fields.email.as_ref(), "email")?;

    let role_raw = text(fields.role.as_ref(), "role")?;
    let role = if role_raw.is_empty() {
        Role::default()
    } else {
        parse_role(&role_raw)?
    };

    let is_active = parse_bool(fields.is_active.as_ref(), true);

    let mut password = text(fields.password.as_ref(), "password")?;
    if password.is_empty() {
        password = DEFAULT_PASSWORD.to_string();
    }
    let password_hash = hash_password(password.trim())?;

    Ok(NewUser {
        username,
        name,
        email,
        role,
        is_active,
        password_hash,
    })
}

/// Validates only the fields present in the request. No defaults apply.
pub fn validate_changes(fields: &UserFields) -> AppResult<UserChanges> {
    let mut changes = UserChanges::default();

    if let Some(v) = &fields.username {
        changes.username = Some(non_empty_text(v, "username")?);
    }
    if let Some(v) = &fields.name {
        changes.name = Some(non_empty_text(v, "name")?);
    }
    if let Some(v) = &fields.email {
        changes.email = Some(non_empty_text(v, "email")?);
    }
    if let Some(v) = &fields.role {
        changes.role = Some(parse_role(&text(Some(v), "role")?)?);
    }
    if let Some(v) = &fields.is_active {
        changes.is_active = Some(parse_bool(Some(v), true));
    }
    if let Some(v) = &fields.password {
        let plain = non_empty_text(v, "password")?;
        changes.password_hash = Some(hash_password(&plain)?);
    }

    if changes.is_empty() {
        return Err(AppError::validation("no fields to update"));
    }
    Ok(changes)
}

pub async fn list_users(db: &Database) -> AppResult<Vec<User>> {
    Ok(repo::list(db).await?)
}

pub async fn get_user(db: &Database, id: i64) -> AppResult<User> {
    repo::find_by_id(db, id).await?.ok_or(AppError::NotFound)
}

pub async fn create_user(db: &Database, fields: UserFields) -> AppResult<User> {
    let new_user = validate_new_user(&fields).inspect_err(|e| warn!(error = %e, "create rejected"))?;

    let user = repo::insert(db, &new_user)
        .await?
        .ok_or_else(|| anyhow::anyhow!("insert returned no row"))?;

    info!(user_id = user.id, username = %user.username, role = %user.role, "user created");
    Ok(user)
}

pub async fn update_user(db: &Database, id: i64, fields: UserFields) -> AppResult<User> {
    let changes =
        validate_changes(&fields).inspect_err(|e| warn!(user_id = id, error = %e, "update rejected"))?;

    let user = repo::update(db, id, &changes)
        .await?
        .ok_or(AppError::NotFound)?;

    info!(user_id = user.id, "user updated");
    Ok(user)
}

pub async fn delete_user(db: &Database, id: i64) -> AppResult<i64> {
    let deleted = repo::delete(db, id).await?.ok_or(AppError::NotFound)?;
    info!(user_id = deleted, "user deleted");
    Ok(deleted)
}
