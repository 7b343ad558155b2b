//! First-run seeding of the owner and their jars from config.toml.

use crate::{
    config::app::Config,
    core::{
        jar::{self, JarFilter, NewJar},
        user,
    },
    entities::user as user_entity,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

/// Finds or creates the configured owner, then seeds jars if the owner has none.
///
/// The jars are created together through [`jar::create_jars`]. A config whose
/// percentages add up past 100 fails with
/// [`crate::errors::Error::AllocationExceeded`] and leaves no jar behind, so a
/// corrected config seeds cleanly on the next start.
pub async fn seed_from_config(
    db: &DatabaseConnection,
    config: &Config,
) -> Result<user_entity::Model> {
    let owner = match user::get_user_by_name(db, config.user.name.trim()).await? {
        Some(existing) => {
            if (existing.income - config.user.income).abs() > f64::EPSILON {
                warn!(
                    "Configured income {} differs from stored income {}; keeping stored value",
                    config.user.income, existing.income
                );
            }
            existing
        }
        None => user::create_user(db, config.user.name.clone(), config.user.income).await?,
    };

    let existing_jars = jar::list_jars(db, owner.id, &JarFilter::default()).await?;
    if !existing_jars.is_empty() {
        info!(
            user_id = owner.id,
            "Owner already has {} jars, skipping seeding",
            existing_jars.len()
        );
        return Ok(owner);
    }

    let new_jars: Vec<NewJar> = config.jars.iter().cloned().map(NewJar::from).collect();
    for created in jar::create_jars(db, owner.id, new_jars).await? {
        info!(jar_id = created.id, "Seeded jar {}", created.name);
    }
    Ok(owner)
}
