//! The business operations behind the user menu.
//!
//! Each workflow takes already validated input, talks to the database
//! through an [`Executor`] and hands back what the user should see.
//! Workflows that read before they write run inside one transaction.

mod bookings;
mod hotels;
mod repairs;
mod rooms;

pub use bookings::*;
pub use hotels::*;
pub use repairs::*;
pub use rooms::*;

use chrono::NaiveDate;
use hotel_core::{Executor, Query};
use log::warn;

use crate::{DateRange, DeskError, DeskResult, HotelId, UserId};

/// The only date format accepted from the user
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` date, rejecting anything that is not exactly that
pub fn parse_date(input: &str) -> DeskResult<NaiveDate> {
    let input = input.trim();
    let bytes = input.as_bytes();
    let is_exact = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });

    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .ok()
        .filter(|_| is_exact)
        .ok_or_else(|| DeskError::validation("Invalid date format! Please enter as 'YYYY-MM-DD'."))
}

/// Builds an inclusive date range, rejecting one that ends before it starts
pub fn date_range(start: NaiveDate, end: NaiveDate) -> DeskResult<DateRange> {
    if end < start {
        return Err(DeskError::validation(
            "The end date must not be before the start date.",
        ));
    }

    Ok(DateRange { start, end })
}

/// Whether the user is the manager of the hotel
pub async fn manages_hotel<E>(
    executor: &mut E,
    manager: UserId,
    hotel_id: HotelId,
) -> DeskResult<bool>
where
    E: Executor,
{
    let matches = executor
        .run_count_only(
            &Query::new("SELECT hotelID FROM Hotel WHERE hotelID = $1 AND managerUserID = $2")
                .bind(hotel_id)
                .bind(manager),
        )
        .await?;

    Ok(matches > 0)
}

pub(crate) async fn ensure_manages<E>(
    executor: &mut E,
    manager: UserId,
    hotel_id: HotelId,
) -> DeskResult<()>
where
    E: Executor,
{
    if manages_hotel(executor, manager, hotel_id).await? {
        Ok(())
    } else {
        Err(DeskError::Unauthorized { hotel_id })
    }
}

/// Ends the transaction opened for `outcome`: commits if it succeeded,
/// rolls back otherwise. Every workflow that calls `begin` closes it here
/// and only here.
pub(crate) async fn settle<E, T>(executor: &mut E, outcome: DeskResult<T>) -> DeskResult<T>
where
    E: Executor,
{
    match outcome {
        Ok(value) => {
            executor.commit().await?;
            Ok(value)
        }
        Err(error) => {
            if let Err(rollback_error) = executor.rollback().await {
                warn!("Rollback failed after \"{}\": {}", error, rollback_error);
            }

            Err(error)
        }
    }
}
