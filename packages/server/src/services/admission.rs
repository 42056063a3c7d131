use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::storage::{BlobStore, ContentHash};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, Set, SqlErr, TransactionTrait,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::entity::{challenge, media, submission};
use crate::error::AppError;
use crate::models::shared::non_blank;
use crate::services::buy_in::BuyInLedger;
use crate::services::media::{MediaPayload, insert_media_row, spawn_orphan_reap};
use crate::state::AppState;
use crate::utils::calendar::{Clock, previous_utc_day};

/// A submission attempt as received from the transport.
#[derive(Debug, Default)]
pub struct SubmissionRequest {
    /// Authenticated caller. `None` means the request was anonymous.
    pub user_id: Option<String>,
    pub challenge_id: Option<String>,
    pub campus_id: Option<String>,
    pub media: Option<MediaPayload>,
}

/// Everything the admission checks look at, gathered once before anything
/// is written.
///
/// Lookups that need an identifier are skipped when it is missing; the
/// corresponding check rejects the request before the empty field matters.
#[derive(Debug)]
pub struct AdmissionSnapshot<'r> {
    pub user_id: Option<&'r str>,
    pub challenge_id: Option<&'r str>,
    pub campus_id: Option<&'r str>,
    pub media_size: usize,
    pub now: DateTime<Utc>,
    pub challenge: Option<challenge::Model>,
    pub already_submitted: bool,
    pub bought_in: bool,
}

impl<'r> AdmissionSnapshot<'r> {
    async fn gather<C: ConnectionTrait>(
        conn: &C,
        req: &'r SubmissionRequest,
        now: DateTime<Utc>,
    ) -> Result<Self, DbErr> {
        let user_id = non_blank(req.user_id.as_deref());
        let challenge_id = non_blank(req.challenge_id.as_deref());
        let campus_id = non_blank(req.campus_id.as_deref());
        let media_size = req.media.as_ref().map_or(0, |m| m.data.len());

        let challenge = match challenge_id {
            Some(id) => challenge::Entity::find_by_id(id).one(conn).await?,
            None => None,
        };

        let already_submitted = match (user_id, challenge_id) {
            (Some(user_id), Some(challenge_id)) => {
                submission::Entity::find()
                    .filter(submission::Column::UserId.eq(user_id))
                    .filter(submission::Column::ChallengeId.eq(challenge_id))
                    .count(conn)
                    .await?
                    > 0
            }
            _ => false,
        };

        let bought_in = match (user_id, campus_id) {
            (Some(user_id), Some(campus_id)) => {
                BuyInLedger::new(conn)
                    .has_buy_in(user_id, campus_id, previous_utc_day(now))
                    .await?
            }
            _ => false,
        };

        Ok(Self {
            user_id,
            challenge_id,
            campus_id,
            media_size,
            now,
            challenge,
            already_submitted,
            bought_in,
        })
    }
}

type Check = fn(&AdmissionSnapshot<'_>) -> Result<(), AppError>;

/// Admission rules in precedence order. The first failing rule decides the error.
pub const ADMISSION_CHECKS: &[(&str, Check)] = &[
    ("caller", require_caller),
    ("identifiers", require_identifiers),
    ("media", require_media),
    ("challenge", require_challenge),
    ("window", require_open_window),
    ("first_submission", require_first_submission),
    ("buy_in", require_buy_in),
];

fn require_caller(s: &AdmissionSnapshot<'_>) -> Result<(), AppError> {
    s.user_id.map(|_| ()).ok_or(AppError::Unauthenticated)
}

fn require_identifiers(s: &AdmissionSnapshot<'_>) -> Result<(), AppError> {
    if s.challenge_id.is_none() || s.campus_id.is_none() {
        return Err(AppError::InvalidRequest(
            "challengeId and campusId are required".into(),
        ));
    }
    Ok(())
}

fn require_media(s: &AdmissionSnapshot<'_>) -> Result<(), AppError> {
    if s.media_size == 0 {
        return Err(AppError::InvalidRequest("Video file is required".into()));
    }
    Ok(())
}

fn require_challenge(s: &AdmissionSnapshot<'_>) -> Result<(), AppError> {
    s.challenge
        .as_ref()
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound("Challenge not found".into()))
}

/// Only the end of the window is enforced; a challenge may be entered before
/// its scheduled start.
fn require_open_window(s: &AdmissionSnapshot<'_>) -> Result<(), AppError> {
    match &s.challenge {
        Some(c) if s.now > c.expires_at => Err(AppError::Expired),
        _ => Ok(()),
    }
}

fn require_first_submission(s: &AdmissionSnapshot<'_>) -> Result<(), AppError> {
    if s.already_submitted {
        return Err(AppError::DuplicateSubmission);
    }
    Ok(())
}

/// Play today only if you bought in for yesterday.
fn require_buy_in(s: &AdmissionSnapshot<'_>) -> Result<(), AppError> {
    if !s.bought_in {
        return Err(AppError::BuyInRequired);
    }
    Ok(())
}

/// Run every admission check in order, stopping at the first rejection.
pub fn run_checks(snapshot: &AdmissionSnapshot<'_>) -> Result<(), AppError> {
    for (name, check) in ADMISSION_CHECKS {
        if let Err(e) = check(snapshot) {
            debug!(check = name, code = e.code(), "Submission rejected");
            return Err(e);
        }
    }
    Ok(())
}

/// The gate between a submitted proof video and the `submission` table.
pub struct AdmissionService {
    db: DatabaseConnection,
    blob_store: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
}

impl AdmissionService {
    pub fn new(
        db: DatabaseConnection,
        blob_store: Arc<dyn BlobStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            db,
            blob_store,
            clock,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.db.clone(),
            state.blob_store.clone(),
            state.clock.clone(),
        )
    }

    /// Validate and record a submission.
    ///
    /// Lookups and the video write happen outside any transaction. The
    /// `media` and submission rows then go in together in one short write
    /// transaction, where the unique `(user_id, challenge_id)` index settles
    /// races the duplicate lookup cannot see. If the video was stored but the
    /// rows never commit, the blob is reaped in the background.
    #[instrument(
        skip(self, req),
        fields(
            user_id = req.user_id.as_deref(),
            challenge_id = req.challenge_id.as_deref(),
        )
    )]
    pub async fn submit(&self, req: SubmissionRequest) -> Result<submission::Model, AppError> {
        let now = self.clock.now();
        let snapshot = AdmissionSnapshot::gather(&self.db, &req, now).await?;
        run_checks(&snapshot)?;

        let (Some(user_id), Some(challenge_id), Some(campus_id), Some(payload)) = (
            snapshot.user_id,
            snapshot.challenge_id,
            snapshot.campus_id,
            req.media.as_ref(),
        ) else {
            return Err(AppError::InvalidRequest("Incomplete submission".into()));
        };
        let entry = NewEntry {
            user_id,
            challenge_id,
            campus_id,
            payload,
            now,
        };

        let stored = self.blob_store.put(&payload.data).await?;

        match self.record(&stored.hash, &entry).await {
            Ok(model) => {
                info!(submission_id = %model.id, "Submission admitted");
                Ok(model)
            }
            Err(e) => {
                spawn_orphan_reap(
                    self.db.clone(),
                    self.blob_store.clone(),
                    stored,
                    payload.data.clone(),
                );
                Err(e)
            }
        }
    }

    /// Insert the video's `media` row and the submission in one transaction.
    /// The first statement is a write, so the transaction never has to
    /// upgrade a read lock.
    async fn record(
        &self,
        hash: &ContentHash,
        entry: &NewEntry<'_>,
    ) -> Result<submission::Model, AppError> {
        let txn = self.db.begin().await?;
        let persisted = async {
            let media_row = insert_media_row(
                &txn,
                hash,
                entry.payload,
                media::KIND_VIDEO,
                entry.user_id,
                entry.now,
            )
            .await?;
            insert_submission(&txn, entry, &media_row).await
        }
        .await;

        match persisted {
            Ok(model) => {
                txn.commit().await?;
                Ok(model)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(error = %rollback_err, "Failed to roll back admission transaction");
                }
                Err(e)
            }
        }
    }
}

/// The validated fields of an admitted request.
struct NewEntry<'r> {
    user_id: &'r str,
    challenge_id: &'r str,
    campus_id: &'r str,
    payload: &'r MediaPayload,
    now: DateTime<Utc>,
}

async fn insert_submission(
    txn: &DatabaseTransaction,
    entry: &NewEntry<'_>,
    media_row: &media::Model,
) -> Result<submission::Model, AppError> {
    let row = submission::ActiveModel {
        id: Set(Uuid::now_v7().to_string()),
        user_id: Set(entry.user_id.to_string()),
        challenge_id: Set(entry.challenge_id.to_string()),
        campus_id: Set(entry.campus_id.to_string()),
        media_url: Set(media::url_for(&media_row.id)),
        verified: Set(false),
        rank: Set(None),
        points_awarded: Set(None),
        created_at: Set(entry.now),
        verified_at: Set(None),
    };
    row.insert(txn).await.map_err(|e| {
        if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            debug!("Lost submission race on unique index");
            AppError::DuplicateSubmission
        } else {
            AppError::from(e)
        }
    })
}
