use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::entity::{submission, user};
use crate::error::AppError;
use crate::models::leaderboard::RankedUser;

const DISPLAY_NAME_MAX_CHARS: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Overall,
}

impl Period {
    /// Case-insensitive. Absent or blank input means `Weekly`.
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return Ok(Period::Weekly);
        };
        match raw.to_ascii_lowercase().as_str() {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            "overall" => Ok(Period::Overall),
            _ => Err(AppError::InvalidRequest(format!(
                "Unknown period '{raw}', expected daily, weekly, monthly or overall"
            ))),
        }
    }

    /// Earliest instant counted by this period, or `None` for all time.
    pub fn window_start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Period::Daily => Some(now - Duration::hours(24)),
            Period::Weekly => Some(now - Duration::days(7)),
            Period::Monthly => Some(now - Duration::days(30)),
            Period::Overall => None,
        }
    }
}

/// How a verified submission turns into score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringRule {
    /// One point per verified submission ranked first.
    Wins,
    /// Sum of `points_awarded` over verified submissions.
    Points,
}

impl ScoringRule {
    pub fn score(self, s: &submission::Model) -> i64 {
        if !s.verified {
            return 0;
        }
        match self {
            ScoringRule::Wins => i64::from(s.rank == Some(1)),
            ScoringRule::Points => i64::from(s.points_awarded.unwrap_or(0)),
        }
    }
}

pub struct Leaderboard<'a, C: ConnectionTrait> {
    conn: &'a C,
    scoring: ScoringRule,
    avatar_placeholder: &'a str,
}

impl<'a, C: ConnectionTrait> Leaderboard<'a, C> {
    pub fn new(conn: &'a C, scoring: ScoringRule, avatar_placeholder: &'a str) -> Self {
        Self {
            conn,
            scoring,
            avatar_placeholder,
        }
    }

    /// Rank users of `campus_id`, or of every campus when it is absent or empty.
    #[instrument(skip(self, now), fields(scoring = ?self.scoring))]
    pub async fn rank(
        &self,
        campus_id: Option<&str>,
        period: Period,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankedUser>, AppError> {
        let mut candidates = match campus_id {
            Some(campus_id) => {
                user::Entity::find()
                    .filter(user::Column::CampusId.eq(campus_id))
                    .order_by_asc(user::Column::Id)
                    .all(self.conn)
                    .await?
            }
            None => Vec::new(),
        };
        let campus_scoped = !candidates.is_empty();
        if !campus_scoped {
            debug!("No campus users, ranking all users");
            candidates = user::Entity::find()
                .order_by_asc(user::Column::Id)
                .all(self.conn)
                .await?;
        }

        let mut query = submission::Entity::find().filter(submission::Column::Verified.eq(true));
        if self.scoring == ScoringRule::Wins {
            query = query.filter(submission::Column::Rank.eq(1));
        }
        if campus_scoped {
            query = query.filter(
                submission::Column::UserId.is_in(candidates.iter().map(|u| u.id.as_str())),
            );
        }
        if let Some(start) = period.window_start(now) {
            query = query.filter(
                Condition::any()
                    .add(submission::Column::CreatedAt.gte(start))
                    .add(submission::Column::VerifiedAt.gte(start)),
            );
        }
        let submissions = query.all(self.conn).await?;

        Ok(rank_users(
            candidates,
            &submissions,
            self.scoring,
            limit,
            self.avatar_placeholder,
        ))
    }
}

/// Score, order and number the candidates.
///
/// Every candidate appears, scoring 0 without qualifying submissions.
/// Order is score descending then id ascending; ranks are 1-based and never tie.
pub fn rank_users(
    candidates: Vec<user::Model>,
    submissions: &[submission::Model],
    scoring: ScoringRule,
    limit: usize,
    avatar_placeholder: &str,
) -> Vec<RankedUser> {
    let mut scores: HashMap<&str, i64> = HashMap::new();
    for s in submissions {
        *scores.entry(s.user_id.as_str()).or_default() += scoring.score(s);
    }

    let mut scored: Vec<(i64, user::Model)> = candidates
        .into_iter()
        .map(|u| (scores.get(u.id.as_str()).copied().unwrap_or(0), u))
        .collect();
    scored.sort_by(|(a_score, a), (b_score, b)| b_score.cmp(a_score).then_with(|| a.id.cmp(&b.id)));

    scored
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, (score, u))| RankedUser {
            name: display_name(&u),
            avatar: u
                .profile_image
                .clone()
                .filter(|img| !img.trim().is_empty())
                .unwrap_or_else(|| placeholder_avatar(avatar_placeholder, &u.id)),
            id: u.id,
            score,
            rank: i as u64 + 1,
        })
        .collect()
}

pub fn display_name(u: &user::Model) -> String {
    let username = u.username.trim();
    if !username.is_empty() {
        if username.chars().count() > DISPLAY_NAME_MAX_CHARS {
            let head: String = username.chars().take(DISPLAY_NAME_MAX_CHARS).collect();
            return format!("{head}…");
        }
        return username.to_string();
    }
    let name = u.name.trim();
    if !name.is_empty() {
        return name.to_string();
    }
    "User".to_string()
}

pub fn placeholder_avatar(template: &str, user_id: &str) -> String {
    template.replace("{id}", user_id)
}
