/// Database connection and index management
///
/// This module produces the `mongodb::Database` handle used by every model
/// and creates the indexes the models rely on. The MongoDB driver connects
/// lazily, so `connect` succeeds without a reachable server; use [`ping`]
/// at startup to fail fast.
///
/// # Example
///
/// ```no_run
/// use courtside_shared::db;
///
/// # async fn example() -> mongodb::error::Result<()> {
/// let database = db::connect("mongodb://localhost:27017", "courtside").await?;
/// db::ping(&database).await?;
/// db::ensure_indexes(&database).await?;
/// # Ok(())
/// # }
/// ```

use mongodb::{
    bson::doc,
    options::{ClientOptions, IndexOptions},
    Client, Database, IndexModel,
};
use tracing::info;

use crate::models;

/// Creates a database handle from a connection URL
///
/// # Errors
///
/// Returns an error if the connection string cannot be parsed. Network
/// errors surface later, on first operation (or via [`ping`]).
pub async fn connect(url: &str, db_name: &str) -> mongodb::error::Result<Database> {
    let mut options = ClientOptions::parse(url).await?;
    options.app_name = Some("courtside".to_string());

    let client = Client::with_options(options)?;
    Ok(client.database(db_name))
}

/// Round-trips a `ping` command to verify the server is reachable
pub async fn ping(db: &Database) -> mongodb::error::Result<()> {
    db.run_command(doc! { "ping": 1 }, None).await?;
    Ok(())
}

/// Creates the indexes the models depend on
///
/// Idempotent; MongoDB treats creating an existing index as a no-op.
///
/// # Indexes
///
/// - `users.email` unique
/// - `courts.name` unique
/// - `pricing_rules.court_id`
/// - `reservations.(court_id, date)` for conflict and availability lookups
/// - `reservations.user_id`
/// - `payments.merchant_ref` unique
/// - `payment_methods.code` unique
pub async fn ensure_indexes(db: &Database) -> mongodb::error::Result<()> {
    let unique = || IndexOptions::builder().unique(true).build();

    db.collection::<models::user::User>(models::user::COLLECTION)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(unique())
                .build(),
            None,
        )
        .await?;

    db.collection::<models::court::Court>(models::court::COLLECTION)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "name": 1 })
                .options(unique())
                .build(),
            None,
        )
        .await?;

    db.collection::<models::pricing_rule::PricingRule>(models::pricing_rule::COLLECTION)
        .create_index(
            IndexModel::builder().keys(doc! { "court_id": 1 }).build(),
            None,
        )
        .await?;

    let reservations = db
        .collection::<models::reservation::Reservation>(models::reservation::COLLECTION);
    reservations
        .create_index(
            IndexModel::builder()
                .keys(doc! { "court_id": 1, "date": 1 })
                .build(),
            None,
        )
        .await?;
    reservations
        .create_index(IndexModel::builder().keys(doc! { "user_id": 1 }).build(), None)
        .await?;

    db.collection::<models::payment::Payment>(models::payment::COLLECTION)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "merchant_ref": 1 })
                .options(unique())
                .build(),
            None,
        )
        .await?;

    db.collection::<models::payment_method::PaymentMethod>(
        models::payment_method::COLLECTION,
    )
    .create_index(
        IndexModel::builder()
            .keys(doc! { "code": 1 })
            .options(unique())
            .build(),
        None,
    )
    .await?;

    info!("database indexes ensured");
    Ok(())
}
