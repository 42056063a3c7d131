use std::time::Duration;

use sea_orm::sea_query::{Index, IndexCreateStatement, PostgresQueryBuilder, SqliteQueryBuilder};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::entity::submission;

pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url.clone());

    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .sqlx_logging(false);
    if let Some(secs) = config.idle_timeout_secs {
        opt.idle_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = config.max_lifetime_secs {
        opt.max_lifetime(Duration::from_secs(secs));
    }

    let db = Database::connect(opt).await?;
    db.get_schema_registry("rush_server::entity::*")
        .sync(&db)
        .await?;
    ensure_indexes(&db).await?;

    Ok(db)
}

/// Create the indexes schema-sync cannot express.
///
/// The unique `(user_id, challenge_id)` index is what serializes concurrent
/// submissions for the same challenge, so failing to create it is fatal.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let unique_entry = Index::create()
        .if_not_exists()
        .unique()
        .name("uq_submission_user_challenge")
        .table(submission::Entity)
        .col(submission::Column::UserId)
        .col(submission::Column::ChallengeId)
        .to_owned();
    db.execute_unprepared(&index_sql(db.get_database_backend(), &unique_entry))
        .await?;
    info!("Ensured index uq_submission_user_challenge exists");

    // Feed scan: WHERE campus_id = ? ORDER BY created_at DESC, id DESC
    let feed_scan = Index::create()
        .if_not_exists()
        .name("idx_submission_campus_created")
        .table(submission::Entity)
        .col(submission::Column::CampusId)
        .col(submission::Column::CreatedAt)
        .col(submission::Column::Id)
        .to_owned();
    match db
        .execute_unprepared(&index_sql(db.get_database_backend(), &feed_scan))
        .await
    {
        Ok(_) => info!("Ensured index idx_submission_campus_created exists"),
        Err(e) => tracing::warn!("Failed to create index idx_submission_campus_created: {}", e),
    }

    Ok(())
}

fn index_sql(backend: DbBackend, stmt: &IndexCreateStatement) -> String {
    match backend {
        DbBackend::Sqlite => stmt.to_string(SqliteQueryBuilder),
        _ => stmt.to_string(PostgresQueryBuilder),
    }
}
