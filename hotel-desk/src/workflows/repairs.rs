use hotel_core::{Executor, Query, NO_ID};
use log::info;

use super::{ensure_manages, settle};
use crate::{DeskError, DeskResult, RepairOrder, UserId};

/// Asks a maintenance company to repair a room of a hotel the user manages.
/// Returns the identifier of the new repair.
pub async fn place_repair_request<E>(
    executor: &mut E,
    manager: UserId,
    order: &RepairOrder,
) -> DeskResult<i64>
where
    E: Executor,
{
    executor.begin().await?;
    let outcome = request_repair(executor, manager, order).await;
    let repair_id = settle(executor, outcome).await?;

    info!(
        "Manager {} requested repair {} of room {} in hotel {}",
        manager, repair_id, order.room_number, order.hotel_id
    );

    Ok(repair_id)
}

/// Every repair request the user placed, newest repair first
pub fn repair_history_query(manager: UserId) -> Query {
    Query::new(
        "
        SELECT
            Q.requestNumber, R.repairID, R.companyID,
            R.hotelID, R.roomNumber, R.repairDate
        FROM RoomRepairRequests Q
            INNER JOIN RoomRepairs R ON R.repairID = Q.repairID
        WHERE Q.managerID = $1
        ORDER BY R.repairDate DESC, Q.requestNumber DESC",
    )
    .bind(manager)
}

async fn request_repair<E>(
    executor: &mut E,
    manager: UserId,
    order: &RepairOrder,
) -> DeskResult<i64>
where
    E: Executor,
{
    ensure_manages(executor, manager, order.hotel_id).await?;

    let rooms = executor
        .run_count_only(
            &Query::new("SELECT roomNumber FROM Rooms WHERE hotelID = $1 AND roomNumber = $2")
                .bind(order.hotel_id)
                .bind(order.room_number),
        )
        .await?;

    if rooms == 0 {
        return Err(DeskError::not_found(
            "Room",
            format!("{} of hotel {}", order.room_number, order.hotel_id),
        ));
    }

    let companies = executor
        .run_count_only(
            &Query::new("SELECT companyID FROM MaintenanceCompany WHERE companyID = $1")
                .bind(order.company_id),
        )
        .await?;

    if companies == 0 {
        return Err(DeskError::not_found("Maintenance company", order.company_id));
    }

    executor
        .run_for_effect(
            &Query::new(
                "
                INSERT INTO RoomRepairs (companyID, hotelID, roomNumber, repairDate)
                VALUES ($1, $2, $3, CURRENT_DATE)",
            )
            .bind(order.company_id)
            .bind(order.hotel_id)
            .bind(order.room_number),
        )
        .await?;

    let repair_id = executor
        .last_generated_id(&Query::new("SELECT currval('roomrepairs_repairid_seq')"))
        .await?;

    if repair_id == NO_ID {
        return Err(DeskError::not_found("Repair", "just placed"));
    }

    executor
        .run_for_effect(
            &Query::new("INSERT INTO RoomRepairRequests (managerID, repairID) VALUES ($1, $2)")
                .bind(manager)
                .bind(repair_id),
        )
        .await?;

    Ok(repair_id)
}
