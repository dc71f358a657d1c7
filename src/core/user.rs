//! User business logic - accounts, customers and login.
//!
//! Email addresses are normalised (trimmed, lower-cased) before they are stored
//! or compared, and must be unique across all accounts. Passwords are stored as
//! bcrypt hashes.

use crate::{
    core::validation::{self, MIN_PASSWORD_LEN},
    entities::{User, user, user::UserRole},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument, warn};

/// Input for creating an account
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Login password
    pub password: String,
    /// Defaults to customer
    #[serde(default)]
    pub role: UserRole,
    /// Default delivery address
    pub address: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
}

/// Partial update of an account; `None` leaves a field unchanged.
///
/// A blank `address` or `phone` clears the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserChanges {
    /// New display name
    pub name: Option<String>,
    /// New login email
    pub email: Option<String>,
    /// New password
    pub password: Option<String>,
    /// New role
    pub role: Option<UserRole>,
    /// New address
    pub address: Option<String>,
    /// New phone
    pub phone: Option<String>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const HASH_COST: u32 = 4;

/// Hashes a password with bcrypt on the blocking pool.
pub async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, HASH_COST))
        .await
        .map_err(|e| Error::PasswordHash {
            message: e.to_string(),
        })?
        .map_err(Into::into)
}

async fn verify_password(password: String, hash: String) -> Result<bool> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| Error::PasswordHash {
            message: e.to_string(),
        })?;
    match verified {
        Ok(matches) => Ok(matches),
        Err(e) => {
            warn!("Stored password hash is unreadable: {e}");
            Ok(false)
        }
    }
}

fn check_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Retrieves every account ordered by name.
pub async fn get_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_asc(user::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves customer accounts ordered by name.
pub async fn get_customers(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .filter(user::Column::Role.eq(UserRole::Customer))
        .order_by_asc(user::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves an account by id.
pub async fn get_user_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Retrieves an account by id, failing with `Error::NotFound` if it is missing.
pub async fn require_user(db: &DatabaseConnection, id: i64) -> Result<user::Model> {
    get_user_by_id(db, id)
        .await?
        .ok_or(Error::NotFound { entity: "User", id })
}

/// Retrieves an account by email address.
pub async fn get_user_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates an account after validating the input.
///
/// # Errors
/// Returns an error if:
/// - The name is blank, the email malformed or the password too short
/// - Another account already uses the email (`Error::EmailTaken`)
/// - The database insert fails
#[instrument(skip(db, new_user), fields(email = %new_user.email))]
pub async fn create_user(db: &DatabaseConnection, new_user: NewUser) -> Result<user::Model> {
    validation::require("Name", &new_user.name)?;
    validation::validate_email(&new_user.email)?;
    check_password(&new_user.password)?;

    let email = normalize_email(&new_user.email);
    if get_user_by_email(db, &email).await?.is_some() {
        warn!("User with email {email} already exists");
        return Err(Error::EmailTaken { email });
    }

    let user = user::ActiveModel {
        name: Set(new_user.name.trim().to_string()),
        email: Set(email),
        password: Set(hash_password(new_user.password).await?),
        role: Set(new_user.role),
        address: Set(validation::non_blank(new_user.address)),
        phone: Set(validation::non_blank(new_user.phone)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let user = user.insert(db).await?;
    info!("Created {:?} account {} (ID: {})", user.role, user.email, user.id);
    Ok(user)
}

/// Applies `changes` to an existing account.
///
/// # Errors
/// Returns an error if:
/// - The account does not exist
/// - A changed field fails validation
/// - The new email belongs to another account (`Error::EmailTaken`)
/// - The database update fails
#[instrument(skip(db, changes))]
pub async fn update_user(
    db: &DatabaseConnection,
    id: i64,
    changes: UserChanges,
) -> Result<user::Model> {
    let mut user: user::ActiveModel = require_user(db, id).await?.into();

    if let Some(name) = changes.name {
        validation::require("Name", &name)?;
        user.name = Set(name.trim().to_string());
    }

    if let Some(email) = changes.email {
        validation::validate_email(&email)?;
        let email = normalize_email(&email);
        let taken = get_user_by_email(db, &email)
            .await?
            .is_some_and(|existing| existing.id != id);
        if taken {
            warn!("User with email {email} already exists");
            return Err(Error::EmailTaken { email });
        }
        user.email = Set(email);
    }

    if let Some(password) = changes.password {
        check_password(&password)?;
        user.password = Set(hash_password(password).await?);
    }

    if let Some(role) = changes.role {
        user.role = Set(role);
    }
    if changes.address.is_some() {
        user.address = Set(validation::non_blank(changes.address));
    }
    if changes.phone.is_some() {
        user.phone = Set(validation::non_blank(changes.phone));
    }

    user.update(db).await.map_err(Into::into)
}

/// Deletes an account. Orders placed by it keep existing without an owner.
///
/// # Errors
/// Returns `Error::NotFound` if no account has this id.
#[instrument(skip(db))]
pub async fn delete_user(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = User::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound { entity: "User", id });
    }
    info!("Deleted user {id}");
    Ok(())
}

/// Checks an email/password pair and returns the matching account.
///
/// # Errors
/// Returns `Error::InvalidCredentials` if no account matches.
#[instrument(skip(db, password))]
pub async fn authenticate_user(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<user::Model> {
    if let Some(user) = get_user_by_email(db, email).await? {
        if verify_password(password.to_string(), user.password.clone()).await? {
            return Ok(user);
        }
    }
    warn!("Failed login attempt for {email}");
    Err(Error::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_user_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let mut input = new_customer("Sari", "sari@example.com");
        input.name = "  ".to_string();
        assert!(matches!(
            create_user(&db, input).await,
            Err(Error::Validation { .. })
        ));

        let input = new_customer("Sari", "not-an-email");
        assert!(matches!(
            create_user(&db, input).await,
            Err(Error::Validation { .. })
        ));

        let mut input = new_customer("Sari", "sari@example.com");
        input.password = "123".to_string();
        assert!(matches!(
            create_user(&db, input).await,
            Err(Error::Validation { .. })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_user_defaults_and_normalises() -> Result<()> {
        let db = setup_test_db().await?;

        let mut input = new_customer("  Sari  ", "  Sari@Example.COM ");
        input.address = Some("   ".to_string());
        let user = create_user(&db, input).await?;

        assert_eq!(user.name, "Sari");
        assert_eq!(user.email, "sari@example.com");
        assert_eq!(user.role, UserRole::Customer);
        assert_eq!(user.address, None);

        let found = get_user_by_email(&db, "SARI@example.com").await?;
        assert_eq!(found.unwrap().id, user.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        create_user(&db, new_customer("Sari", "sari@example.com")).await?;

        let result = create_user(&db, new_customer("Other Sari", "sari@example.com")).await;
        assert!(matches!(result, Err(Error::EmailTaken { email }) if email == "sari@example.com"));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_user_email_conflicts() -> Result<()> {
        let db = setup_test_db().await?;
        let sari = create_user(&db, new_customer("Sari", "sari@example.com")).await?;
        let budi = create_user(&db, new_customer("Budi", "budi@example.com")).await?;

        let taken = UserChanges {
            email: Some("budi@example.com".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            update_user(&db, sari.id, taken).await,
            Err(Error::EmailTaken { .. })
        ));

        // Keeping your own email is fine
        let same = UserChanges {
            email: Some("BUDI@example.com".to_string()),
            phone: Some("0812".to_string()),
            ..Default::default()
        };
        let updated = update_user(&db, budi.id, same).await?;
        assert_eq!(updated.email, "budi@example.com");
        assert_eq!(updated.phone.as_deref(), Some("0812"));
        assert_eq!(updated.name, "Budi");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_user_clears_blank_fields() -> Result<()> {
        let db = setup_test_db().await?;
        let mut input = new_customer("Sari", "sari@example.com");
        input.address = Some("Jl. Mawar 1".to_string());
        let sari = create_user(&db, input).await?;

        let changes = UserChanges {
            address: Some(String::new()),
            ..Default::default()
        };
        let updated = update_user(&db, sari.id, changes).await?;
        assert_eq!(updated.address, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_user() -> Result<()> {
        let db = setup_test_db().await?;
        let result = update_user(&db, 999, UserChanges::default()).await;
        assert!(matches!(
            result,
            Err(Error::NotFound {
                entity: "User",
                id: 999
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_customers_excludes_admins() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_admin(&db).await?;
        create_user(&db, new_customer("Budi", "budi@example.com")).await?;
        create_user(&db, new_customer("Ani", "ani@example.com")).await?;

        let customers = get_customers(&db).await?;
        let names: Vec<_> = customers.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Ani", "Budi"]);

        assert_eq!(get_users(&db).await?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_authenticate_user() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_user(&db, new_customer("Sari", "sari@example.com")).await?;

        let logged_in = authenticate_user(&db, "Sari@example.com", TEST_PASSWORD).await?;
        assert_eq!(logged_in.id, user.id);

        assert!(matches!(
            authenticate_user(&db, "sari@example.com", "wrong-password").await,
            Err(Error::InvalidCredentials)
        ));
        assert!(matches!(
            authenticate_user(&db, "nobody@example.com", TEST_PASSWORD).await,
            Err(Error::InvalidCredentials)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_passwords_are_stored_hashed() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_user(&db, new_customer("Sari", "sari@example.com")).await?;
        assert_ne!(user.password, TEST_PASSWORD);
        assert!(user.password.starts_with("$2"));

        let changes = UserChanges {
            password: Some("baru-rahasia".to_string()),
            ..Default::default()
        };
        let updated = update_user(&db, user.id, changes).await?;
        assert_ne!(updated.password, "baru-rahasia");
        assert_ne!(updated.password, user.password);

        authenticate_user(&db, "sari@example.com", "baru-rahasia").await?;
        assert!(matches!(
            authenticate_user(&db, "sari@example.com", TEST_PASSWORD).await,
            Err(Error::InvalidCredentials)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_unreadable_hash_never_matches() -> Result<()> {
        assert!(!verify_password("secret".to_string(), "secret".to_string()).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_user() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_user(&db, new_customer("Sari", "sari@example.com")).await?;

        delete_user(&db, user.id).await?;
        assert!(get_user_by_id(&db, user.id).await?.is_none());
        assert!(matches!(
            delete_user(&db, user.id).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }
}
