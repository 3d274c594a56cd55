use hotel_core::{Executor, ExecutorError, Query, ResultSet};
use log::info;

use super::{ensure_manages, settle};
use crate::{BookingOutcome, DateRange, DeskError, DeskResult, HotelId, RoomSlot, UserId};

/// How many bookings a customer sees in their recent history
pub const RECENT_BOOKINGS: i64 = 5;
/// How many customers make up the regulars of a hotel
pub const REGULAR_CUSTOMERS: i64 = 5;

/// Books a room for the customer, unless it is already taken on that date.
///
/// The check and the insert share a transaction, and a booking that loses
/// a race against another desk is rejected by the unique key on
/// (hotel, room, date), so a slot is never booked twice.
pub async fn book_room<E>(
    executor: &mut E,
    customer: UserId,
    slot: &RoomSlot,
) -> DeskResult<BookingOutcome>
where
    E: Executor,
{
    executor.begin().await?;
    let outcome = reserve(executor, customer, slot).await;

    match settle(executor, outcome).await {
        Err(DeskError::Db(ExecutorError::Conflict { constraint })) => {
            info!("Lost booking race on {}: {:?}", constraint, slot);
            Ok(BookingOutcome::Unavailable)
        }
        other => other,
    }
}

async fn reserve<E>(
    executor: &mut E,
    customer: UserId,
    slot: &RoomSlot,
) -> DeskResult<BookingOutcome>
where
    E: Executor,
{
    let taken = executor
        .run_count_only(
            &Query::new(
                "
                SELECT bookingID FROM RoomBookings
                WHERE hotelID = $1 AND roomNumber = $2 AND bookingDate = $3",
            )
            .bind(slot.hotel_id)
            .bind(slot.room_number)
            .bind(slot.date),
        )
        .await?;

    if taken > 0 {
        return Ok(BookingOutcome::Unavailable);
    }

    let price = executor
        .run_and_collect(
            &Query::new("SELECT price FROM Rooms WHERE hotelID = $1 AND roomNumber = $2")
                .bind(slot.hotel_id)
                .bind(slot.room_number),
        )
        .await?
        .first_cell()
        .map(str::to_string)
        .ok_or_else(|| {
            DeskError::not_found(
                "Room",
                format!("{} of hotel {}", slot.room_number, slot.hotel_id),
            )
        })?;

    executor
        .run_for_effect(
            &Query::new(
                "
                INSERT INTO RoomBookings (customerID, hotelID, roomNumber, bookingDate)
                VALUES ($1, $2, $3, $4)",
            )
            .bind(customer)
            .bind(slot.hotel_id)
            .bind(slot.room_number)
            .bind(slot.date),
        )
        .await?;

    info!(
        "Customer {} booked room {} of hotel {} on {}",
        customer, slot.room_number, slot.hotel_id, slot.date
    );

    Ok(BookingOutcome::Booked { price })
}

/// The customer's latest bookings, by booking date, newest first
pub fn recent_bookings_query(customer: UserId) -> Query {
    Query::new(
        "
        SELECT B.bookingID, B.hotelID, B.roomNumber, B.bookingDate, R.price
        FROM RoomBookings B
            INNER JOIN Rooms R
                ON R.hotelID = B.hotelID AND R.roomNumber = B.roomNumber
        WHERE B.customerID = $1
        ORDER BY B.bookingDate DESC, B.bookingID DESC
        LIMIT $2",
    )
    .bind(customer)
    .bind(RECENT_BOOKINGS)
}

/// Every booking of a hotel the user manages within the date range
pub async fn hotel_booking_history<E>(
    executor: &mut E,
    manager: UserId,
    hotel_id: HotelId,
    range: DateRange,
) -> DeskResult<ResultSet>
where
    E: Executor,
{
    ensure_manages(executor, manager, hotel_id).await?;

    let bookings = executor
        .run_and_collect(
            &Query::new(
                "
                SELECT B.bookingID, B.customerID, U.name, B.roomNumber, B.bookingDate
                FROM RoomBookings B
                    INNER JOIN Users U ON U.userID = B.customerID
                WHERE B.hotelID = $1 AND B.bookingDate BETWEEN $2 AND $3
                ORDER BY B.bookingDate, B.roomNumber",
            )
            .bind(hotel_id)
            .bind(range.start)
            .bind(range.end),
        )
        .await?;

    Ok(bookings)
}

/// The customers who booked a hotel the user manages most often
pub async fn regular_customers<E>(
    executor: &mut E,
    manager: UserId,
    hotel_id: HotelId,
) -> DeskResult<ResultSet>
where
    E: Executor,
{
    ensure_manages(executor, manager, hotel_id).await?;

    let customers = executor
        .run_and_collect(
            &Query::new(
                "
                SELECT U.userID, U.name, COUNT(*) AS bookings
                FROM RoomBookings B
                    INNER JOIN Users U ON U.userID = B.customerID
                WHERE B.hotelID = $1
                GROUP BY U.userID, U.name
                ORDER BY bookings DESC, U.userID
                LIMIT $2",
            )
            .bind(hotel_id)
            .bind(REGULAR_CUSTOMERS),
        )
        .await?;

    Ok(customers)
}
