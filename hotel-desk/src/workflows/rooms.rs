use chrono::NaiveDate;
use hotel_core::{Executor, ExecutorError, Query, NULL_CELL};
use log::info;

use super::{ensure_manages, settle};
use crate::{DeskError, DeskResult, HotelId, RoomChange, UserId};

/// How many audit rows are shown after an update
pub const RECENT_UPDATES: i64 = 5;

/// Every room of the hotel with its price, marked `Available` or
/// `Not Available` for the date. Rooms without any booking are included.
pub fn room_availability_query(hotel_id: HotelId, date: NaiveDate) -> Query {
    Query::new(
        "
        SELECT
            R.roomNumber,
            R.price,
            CASE WHEN B.bookingID IS NULL THEN 'Available' ELSE 'Not Available' END
                AS availability
        FROM Rooms R
            LEFT JOIN RoomBookings B
                ON B.hotelID = R.hotelID
                AND B.roomNumber = R.roomNumber
                AND B.bookingDate = $2
        WHERE R.hotelID = $1
        ORDER BY R.roomNumber",
    )
    .bind(hotel_id)
    .bind(date)
}

/// Changes the price and image of a room the user manages, and records the
/// change in the audit log
pub async fn update_room<E>(
    executor: &mut E,
    manager: UserId,
    change: &RoomChange,
) -> DeskResult<()>
where
    E: Executor,
{
    executor.begin().await?;
    let outcome = apply_room_change(executor, manager, change).await;
    settle(executor, outcome).await?;

    info!(
        "Manager {} updated room {} of hotel {}",
        manager, change.room_number, change.hotel_id
    );

    Ok(())
}

/// The newest audit rows written by the manager, newest first
pub fn recent_updates_query(manager: UserId) -> Query {
    Query::new(
        "
        SELECT
            updateNumber, hotelID, roomNumber,
            oldPrice, newPrice, oldImageURL, newImageURL, updatedOn
        FROM RoomUpdatesLog
        WHERE managerID = $1
        ORDER BY updatedOn DESC, updateNumber DESC
        LIMIT $2",
    )
    .bind(manager)
    .bind(RECENT_UPDATES)
}

async fn apply_room_change<E>(
    executor: &mut E,
    manager: UserId,
    change: &RoomChange,
) -> DeskResult<()>
where
    E: Executor,
{
    ensure_manages(executor, manager, change.hotel_id).await?;

    let current = executor
        .run_and_collect(
            &Query::new(
                "
                SELECT price, imageURL FROM Rooms
                WHERE hotelID = $1 AND roomNumber = $2
                FOR UPDATE",
            )
            .bind(change.hotel_id)
            .bind(change.room_number),
        )
        .await?;

    let Some([old_price, old_image, ..]) = current.rows().first().map(Vec::as_slice) else {
        return Err(DeskError::not_found(
            "Room",
            format!("{} of hotel {}", change.room_number, change.hotel_id),
        ));
    };

    let old_price: i32 = old_price
        .parse()
        .map_err(|e| ExecutorError::Execution(Box::new(e)))?;
    let old_image = (old_image != NULL_CELL).then(|| old_image.clone());

    executor
        .run_for_effect(
            &Query::new(
                "UPDATE Rooms SET price = $1, imageURL = $2 WHERE hotelID = $3 AND roomNumber = $4",
            )
            .bind(change.price)
            .bind(change.image_url.as_str())
            .bind(change.hotel_id)
            .bind(change.room_number),
        )
        .await?;

    executor
        .run_for_effect(
            &Query::new(
                "
                INSERT INTO RoomUpdatesLog
                    (managerID, hotelID, roomNumber, oldPrice, newPrice, oldImageURL, newImageURL, updatedOn)
                VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())",
            )
            .bind(manager)
            .bind(change.hotel_id)
            .bind(change.room_number)
            .bind(old_price)
            .bind(change.price)
            .bind(old_image)
            .bind(change.image_url.as_str()),
        )
        .await?;

    Ok(())
}
