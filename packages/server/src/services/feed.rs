use std::collections::{HashMap, HashSet};

use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use tracing::instrument;

use crate::entity::{challenge, submission, user};
use crate::error::AppError;
use crate::models::submission::{SubmissionAuthor, SubmissionChallenge, SubmissionView};

pub const DEFAULT_FEED_LIMIT: u64 = 20;
pub const MAX_FEED_LIMIT: u64 = 50;

/// Parse a raw `limit` query value. Absent or non-numeric input gives the
/// default; anything else is clamped to `[1, MAX_FEED_LIMIT]`.
pub fn clamp_limit(raw: Option<&str>) -> u64 {
    match raw.map(str::trim).and_then(|r| r.parse::<i64>().ok()) {
        Some(n) => n.clamp(1, MAX_FEED_LIMIT as i64) as u64,
        None => DEFAULT_FEED_LIMIT,
    }
}

pub struct FeedPage {
    pub items: Vec<submission::Model>,
    /// Id of the last item, present only when more rows follow.
    pub next_cursor: Option<String>,
}

/// Newest-first pages over one campus's submissions.
///
/// Order is `created_at DESC, id DESC`. Ids are UUIDv7, so equal timestamps
/// still fall back to insertion order.
pub struct FeedPaginator<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> FeedPaginator<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    #[instrument(skip(self))]
    pub async fn page(
        &self,
        campus_id: &str,
        limit: u64,
        cursor: Option<&str>,
    ) -> Result<FeedPage, AppError> {
        let mut query =
            submission::Entity::find().filter(submission::Column::CampusId.eq(campus_id));

        if let Some(cursor) = cursor {
            let anchor = submission::Entity::find_by_id(cursor)
                .one(self.conn)
                .await?
                .filter(|anchor| anchor.campus_id == campus_id)
                .ok_or_else(|| AppError::InvalidRequest("Invalid cursor".into()))?;

            query = query.filter(
                Condition::any()
                    .add(submission::Column::CreatedAt.lt(anchor.created_at))
                    .add(
                        Condition::all()
                            .add(submission::Column::CreatedAt.eq(anchor.created_at))
                            .add(submission::Column::Id.lt(anchor.id)),
                    ),
            );
        }

        let mut items = query
            .order_by_desc(submission::Column::CreatedAt)
            .order_by_desc(submission::Column::Id)
            .limit(limit + 1)
            .all(self.conn)
            .await?;

        let next_cursor = if items.len() as u64 > limit {
            items.pop();
            items.last().map(|last| last.id.clone())
        } else {
            None
        };

        Ok(FeedPage { items, next_cursor })
    }
}

/// Attach author and challenge summaries to submissions, preserving order.
///
/// Two batched lookups regardless of page size.
pub async fn enrich_submissions<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<submission::Model>,
) -> Result<Vec<SubmissionView>, DbErr> {
    let user_ids: HashSet<&str> = rows.iter().map(|s| s.user_id.as_str()).collect();
    let challenge_ids: HashSet<&str> = rows.iter().map(|s| s.challenge_id.as_str()).collect();

    let users: HashMap<String, user::Model> = if user_ids.is_empty() {
        HashMap::new()
    } else {
        user::Entity::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect()
    };

    let challenges: HashMap<String, challenge::Model> = if challenge_ids.is_empty() {
        HashMap::new()
    } else {
        challenge::Entity::find()
            .filter(challenge::Column::Id.is_in(challenge_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect()
    };

    Ok(rows
        .into_iter()
        .map(|s| {
            let author = users.get(&s.user_id).map(SubmissionAuthor::from);
            let challenge = challenges.get(&s.challenge_id).map(SubmissionChallenge::from);
            SubmissionView::new(s, author, challenge)
        })
        .collect())
}
