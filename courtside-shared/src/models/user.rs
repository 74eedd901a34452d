/// User model and collection operations
///
/// Users are either customers (the default) or admins. Passwords are stored
/// as Argon2id hashes, never in plaintext. Email addresses are lowercased
/// before storage and are unique (enforced by the `users.email` index).
///
/// # Example
///
/// ```no_run
/// use courtside_shared::models::user::{CreateUser, User, UserRole};
///
/// # async fn example(db: &mongodb::Database) -> mongodb::error::Result<()> {
/// let user = User::create(
///     db,
///     CreateUser {
///         email: "player@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         name: "Dina Putri".to_string(),
///         phone: None,
///         role: UserRole::Customer,
///     },
/// )
/// .await?;
///
/// let found = User::find_by_email(db, "player@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime},
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Database,
};
use serde::{Deserialize, Serialize};

/// Collection name for users
pub const COLLECTION: &str = "users";

/// Account role
///
/// Admins manage courts, pricing rules, payment methods, and other users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular customer: can book courts and pay for reservations
    Customer,

    /// Administrator: full access to the admin surface
    Admin,
}

impl UserRole {
    /// Converts role to its stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::Admin => "admin",
        }
    }

    /// Parses a role from its stored string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(UserRole::Customer),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

/// User account document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Document id
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Email address, lowercased, unique
    pub email: String,

    /// Argon2id password hash (PHC string format)
    pub password_hash: String,

    /// Display name
    pub name: String,

    /// Optional contact phone number
    pub phone: Option<String>,

    /// Account role
    pub role: UserRole,

    /// Whether the user wants booking emails
    pub notify_email: bool,

    /// When the account was created
    pub created_at: DateTime,

    /// When the account was last updated
    pub updated_at: DateTime,

    /// When the user last logged in (None if never)
    pub last_login_at: Option<DateTime>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Email address (lowercased before storage)
    pub email: String,

    /// Argon2id password hash (NOT a plaintext password)
    pub password_hash: String,

    /// Display name
    pub name: String,

    /// Optional contact phone number
    pub phone: Option<String>,

    /// Account role
    pub role: UserRole,
}

/// Profile patch; only `Some` fields are written
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    /// New display name
    pub name: Option<String>,

    /// New phone number
    pub phone: Option<String>,

    /// New booking-email preference
    pub notify_email: Option<bool>,

    /// New password hash
    pub password_hash: Option<String>,
}

impl User {
    fn collection(db: &Database) -> mongodb::Collection<User> {
        db.collection::<User>(COLLECTION)
    }

    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Surfaces a duplicate-key error if the email is already registered.
    pub async fn create(db: &Database, data: CreateUser) -> mongodb::error::Result<User> {
        let now = DateTime::now();
        let user = User {
            id: ObjectId::new(),
            email: data.email.to_lowercase(),
            password_hash: data.password_hash,
            name: data.name,
            phone: data.phone,
            role: data.role,
            notify_email: true,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };

        Self::collection(db).insert_one(&user, None).await?;
        Ok(user)
    }

    /// Finds a user by id
    pub async fn find_by_id(db: &Database, id: ObjectId) -> mongodb::error::Result<Option<User>> {
        Self::collection(db).find_one(doc! { "_id": id }, None).await
    }

    /// Finds a user by email (case-insensitive via lowercasing)
    pub async fn find_by_email(db: &Database, email: &str) -> mongodb::error::Result<Option<User>> {
        Self::collection(db)
            .find_one(doc! { "email": email.to_lowercase() }, None)
            .await
    }

    /// Counts all users
    pub async fn count(db: &Database) -> mongodb::error::Result<u64> {
        Self::collection(db).count_documents(None, None).await
    }

    /// Lists users, newest first
    pub async fn list(db: &Database, skip: u64, limit: i64) -> mongodb::error::Result<Vec<User>> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .skip(skip)
            .limit(limit)
            .build();

        let mut cursor = Self::collection(db).find(None, options).await?;
        let mut users = Vec::new();
        while let Some(user) = cursor.try_next().await? {
            users.push(user);
        }
        Ok(users)
    }

    /// Records a successful login
    pub async fn update_last_login(db: &Database, id: ObjectId) -> mongodb::error::Result<()> {
        Self::collection(db)
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "last_login_at": DateTime::now() } },
                None,
            )
            .await?;
        Ok(())
    }

    /// Applies a profile patch and returns the updated document
    pub async fn update_profile(
        db: &Database,
        id: ObjectId,
        patch: UpdateProfile,
    ) -> mongodb::error::Result<Option<User>> {
        let mut set = doc! { "updated_at": DateTime::now() };
        if let Some(name) = patch.name {
            set.insert("name", name);
        }
        if let Some(phone) = patch.phone {
            set.insert("phone", phone);
        }
        if let Some(notify_email) = patch.notify_email {
            set.insert("notify_email", notify_email);
        }
        if let Some(password_hash) = patch.password_hash {
            set.insert("password_hash", password_hash);
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        Self::collection(db)
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, options)
            .await
    }

    /// Changes a user's role and returns the updated document
    pub async fn set_role(
        db: &Database,
        id: ObjectId,
        role: UserRole,
    ) -> mongodb::error::Result<Option<User>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        Self::collection(db)
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$set": { "role": role.as_str(), "updated_at": DateTime::now() } },
                options,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!(UserRole::parse("customer"), Some(UserRole::Customer));
        assert_eq!(UserRole::parse("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("owner"), None);
        assert_eq!(UserRole::Admin.as_str(), "admin");
    }

    #[test]
    fn test_role_serde_matches_as_str() {
        let json = serde_json::to_string(&UserRole::Customer).unwrap();
        assert_eq!(json, "\"customer\"");
    }
}
