//! Decorator Availability Query
//!
//! Decorators in a division and district who can take a booking on a given
//! day. A decorator without a recorded working day is always available;
//! otherwise the recorded day must fall on the booking date. Times of day are
//! not compared.

use std::sync::Arc;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::debug;
use utoipa::IntoParams;

use crate::shared::api_common::non_blank;
use crate::user::entity::{User, WorkingDate};
use crate::user::repository::UserRepository;
use crate::usecase::{ExecutionContext, UseCaseResult};

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FindAvailableDecoratorsQuery {
    pub division: Option<String>,
    pub district: Option<String>,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp
    pub booking_date: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AvailableDecorators {
    pub available: bool,
    pub decorators: Vec<User>,
}

impl AvailableDecorators {
    fn from_decorators(decorators: Vec<User>) -> Self {
        Self {
            available: !decorators.is_empty(),
            decorators,
        }
    }
}

/// Calendar day of a date or timestamp. Timestamps are taken in UTC; ones
/// without an offset are assumed to be UTC already.
pub fn calendar_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc).date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.date())
}

/// Calendar day of a stored working date; BSON dates are taken in UTC
pub fn working_day(date: &WorkingDate) -> Option<NaiveDate> {
    match date {
        WorkingDate::Text(text) => calendar_date(text),
        WorkingDate::Timestamp(at) => Some(at.to_chrono().date_naive()),
    }
}

fn is_available_on(decorator: &User, day: NaiveDate) -> bool {
    let scheduled = decorator.working_date.as_ref().is_some_and(|date| !date.is_blank())
        && [&decorator.start_time, &decorator.end_time]
            .iter()
            .all(|field| non_blank(field.as_deref()).is_some());
    if !scheduled {
        return true;
    }
    decorator
        .working_date
        .as_ref()
        .and_then(working_day)
        .is_some_and(|working_day| working_day == day)
}

pub struct FindAvailableDecoratorsUseCase {
    users: Arc<dyn UserRepository>,
}

impl FindAvailableDecoratorsUseCase {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn execute(
        &self,
        query: FindAvailableDecoratorsQuery,
        ctx: ExecutionContext,
    ) -> UseCaseResult<AvailableDecorators> {
        let (Some(division), Some(district), Some(booking_date)) = (
            non_blank(query.division.as_deref()),
            non_blank(query.district.as_deref()),
            non_blank(query.booking_date.as_deref()),
        ) else {
            return UseCaseResult::success(AvailableDecorators::default());
        };

        let Some(day) = calendar_date(booking_date) else {
            debug!(booking_date, execution_id = %ctx.execution_id, "Unparsable booking date");
            return UseCaseResult::success(AvailableDecorators::default());
        };

        let decorators = match self.users.find_decorators(Some(division), Some(district)).await {
            Ok(decorators) => decorators,
            Err(e) => return UseCaseResult::failure(e.into()),
        };

        let available: Vec<User> = decorators
            .into_iter()
            .filter(|decorator| is_available_on(decorator, day))
            .collect();

        UseCaseResult::success(AvailableDecorators::from_decorators(available))
    }
}
