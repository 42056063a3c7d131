use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Set};
use tracing::{debug, instrument};

use crate::entity::buy_in;

pub const DEFAULT_BUY_IN_AMOUNT: i32 = 1;

/// Records which users committed to play on which day.
///
/// `date` must already be UTC midnight; the ledger stores it as given.
pub struct BuyInLedger<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> BuyInLedger<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert a buy-in, or overwrite `amount` if one already exists for the key.
    #[instrument(skip(self, now))]
    pub async fn record_buy_in(
        &self,
        user_id: &str,
        campus_id: &str,
        date: DateTime<Utc>,
        amount: i32,
        now: DateTime<Utc>,
    ) -> Result<buy_in::Model, DbErr> {
        let model = buy_in::ActiveModel {
            user_id: Set(user_id.to_string()),
            campus_id: Set(campus_id.to_string()),
            date: Set(date),
            amount: Set(amount),
            created_at: Set(now),
            updated_at: Set(now),
        };

        buy_in::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    buy_in::Column::UserId,
                    buy_in::Column::CampusId,
                    buy_in::Column::Date,
                ])
                .update_columns([buy_in::Column::Amount, buy_in::Column::UpdatedAt])
                .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await?;

        debug!(amount, "Buy-in recorded");

        self.find(user_id, campus_id, date)
            .await?
            .ok_or_else(|| DbErr::Custom("buy_in missing after upsert".into()))
    }

    pub async fn find(
        &self,
        user_id: &str,
        campus_id: &str,
        date: DateTime<Utc>,
    ) -> Result<Option<buy_in::Model>, DbErr> {
        buy_in::Entity::find_by_id((user_id.to_string(), campus_id.to_string(), date))
            .one(self.conn)
            .await
    }

    pub async fn has_buy_in(
        &self,
        user_id: &str,
        campus_id: &str,
        date: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        Ok(self.find(user_id, campus_id, date).await?.is_some())
    }
}
