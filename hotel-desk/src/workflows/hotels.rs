use hotel_core::{Executor, Query, ResultSet};

use crate::{DeskResult, GeoPoint};

/// How far a hotel may be from the searched place, in map units
pub const SEARCH_RADIUS: f64 = 30.0;

/// Every hotel within [`SEARCH_RADIUS`] of `origin`, the boundary included.
///
/// Distances are computed here rather than in the database, so the same
/// rule holds whatever functions the database provides.
pub async fn hotels_near<E>(executor: &mut E, origin: GeoPoint) -> DeskResult<ResultSet>
where
    E: Executor,
{
    let mut hotels = executor
        .run_and_collect(&Query::new(
            "
            SELECT hotelID, hotelName, latitude, longitude, dateEstablished
            FROM Hotel
            ORDER BY hotelID",
        ))
        .await?;

    hotels.retain(|row| {
        location(row)
            .map(|hotel| origin.distance_to(hotel) <= SEARCH_RADIUS)
            .unwrap_or(false)
    });

    Ok(hotels)
}

fn location(row: &[String]) -> Option<GeoPoint> {
    let latitude = row.get(2)?.parse().ok()?;
    let longitude = row.get(3)?.parse().ok()?;

    Some(GeoPoint::new(latitude, longitude))
}
