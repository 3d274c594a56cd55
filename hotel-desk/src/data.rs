use chrono::NaiveDate;

/// The type used for user identifiers in the database.
/// A logged in user is identified by this alone.
pub type UserId = i32;
pub type HotelId = i32;
pub type RoomNumber = i32;
pub type CompanyId = i32;

/// The role given to every account created from the desk
pub const CUSTOMER_ROLE: &str = "Customer";

/// A place on the hotel map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Euclidean distance in map units
    pub fn distance_to(&self, other: GeoPoint) -> f64 {
        let latitude = self.latitude - other.latitude;
        let longitude = self.longitude - other.longitude;

        (latitude * latitude + longitude * longitude).sqrt()
    }
}

/// One room of one hotel on one date
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSlot {
    pub hotel_id: HotelId,
    pub room_number: RoomNumber,
    pub date: NaiveDate,
}

/// New price and image for a room, requested by its manager
#[derive(Debug, Clone, PartialEq)]
pub struct RoomChange {
    pub hotel_id: HotelId,
    pub room_number: RoomNumber,
    pub price: i32,
    pub image_url: String,
}

/// A manager asking a maintenance company to repair a room
#[derive(Debug, Clone, PartialEq)]
pub struct RepairOrder {
    pub hotel_id: HotelId,
    pub room_number: RoomNumber,
    pub company_id: CompanyId,
}

/// An inclusive range of dates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// What came of a booking attempt
#[derive(Debug, Clone, PartialEq)]
pub enum BookingOutcome {
    /// The room is now booked, at this price
    Booked { price: String },
    /// Someone else holds the room on that date
    Unavailable,
}
