//! User business logic - The owner profile and its monthly income.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::info;

fn validate_income(income: f64) -> Result<()> {
    if !income.is_finite() || income < 0.0 {
        return Err(Error::validation(format!(
            "Income must be a non-negative number, got {income}"
        )));
    }
    Ok(())
}

/// Creates a user with the given monthly income.
pub async fn create_user(
    db: &DatabaseConnection,
    name: String,
    income: f64,
) -> Result<user::Model> {
    if name.trim().is_empty() {
        return Err(Error::validation("User name cannot be empty"));
    }
    validate_income(income)?;

    let user = user::ActiveModel {
        name: Set(name.trim().to_string()),
        income: Set(income),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let user = user.insert(db).await?;
    info!(user_id = user.id, "Created user {}", user.name);
    Ok(user)
}

/// Loads a user by id, failing with [`Error::UserNotFound`] if absent.
pub async fn get_user<C>(db: &C, user_id: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })
}

/// Finds a user by exact name.
pub async fn get_user_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Changes the user's monthly income. Existing reports keep the income they were
/// generated with.
pub async fn set_income(db: &DatabaseConnection, user_id: i64, income: f64) -> Result<user::Model> {
    validate_income(income)?;
    let user = get_user(db, user_id).await?;
    let mut active: user::ActiveModel = user.into();
    active.income = Set(income);
    let user = active.update(db).await?;
    info!(user_id, income, "Updated user income");
    Ok(user)
}
