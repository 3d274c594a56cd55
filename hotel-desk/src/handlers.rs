use std::str::FromStr;

use chrono::NaiveDate;
use hotel_core::{Executor, Input, Output, Query, NO_ID};
use log::info;

use crate::{
    workflows::{self, SEARCH_RADIUS},
    BookingOutcome, Credentials, Desk, DeskError, DeskResult, GeoPoint, NewAccount, RepairOrder,
    RoomChange, RoomSlot, UserId,
};

impl<E, I, O> Desk<E, I, O>
where
    E: Executor,
    I: Input,
    O: Output + Send,
{
    fn ask(&mut self, prompt: &str) -> DeskResult<String> {
        self.output.prompt(prompt);
        self.input.read_line()?.ok_or(DeskError::InputClosed)
    }

    fn ask_number<T>(&mut self, prompt: &str, field: &str) -> DeskResult<T>
    where
        T: FromStr,
    {
        let answer = self.ask(prompt)?;

        answer
            .trim()
            .parse()
            .map_err(|_| DeskError::validation(format!("{} must be a number.", field)))
    }

    fn ask_date(&mut self, prompt: &str) -> DeskResult<NaiveDate> {
        let answer = self.ask(prompt)?;
        workflows::parse_date(&answer)
    }

    /// Prints the rows of a query, or `nothing` if there are none
    async fn show(&mut self, query: Query, nothing: &str) -> DeskResult<()> {
        let shown = self.executor.run_and_render(&query, &mut self.output).await?;

        if shown == 0 {
            self.output.line(nothing);
        }

        Ok(())
    }

    pub(crate) async fn create_user(&mut self) -> DeskResult<()> {
        let name = self.ask("\tEnter name: ")?;
        let password = self.ask("\tEnter password: ")?;

        let name = name.trim();
        if name.is_empty() || password.is_empty() {
            return Err(DeskError::validation("Name and password must not be empty."));
        }

        let account = NewAccount {
            name: name.to_string(),
            password,
        };

        match self.auth.create_account(&mut self.executor, account).await {
            Some(NO_ID) => self
                .output
                .line("User created, but its userID could not be determined."),
            Some(user_id) => self.output.line(&format!(
                "User successfully created with userID = {}",
                user_id
            )),
            None => self.output.error("User could not be created."),
        }

        Ok(())
    }

    /// Returns the user the entered credentials belong to
    pub(crate) async fn log_in(&mut self) -> DeskResult<Option<UserId>> {
        let user_id = self.ask("\tEnter userID: ")?;
        let password = self.ask("\tEnter password: ")?;

        let credentials = Credentials { user_id, password };
        let user = self
            .auth
            .authenticate(&mut self.executor, &credentials)
            .await?;

        if user.is_none() {
            self.output.line("Invalid userID or password.");
        }

        Ok(user)
    }

    pub(crate) async fn view_hotels(&mut self) -> DeskResult<()> {
        let latitude = self.ask_number("Enter latitude: ", "Latitude")?;
        let longitude = self.ask_number("Enter longitude: ", "Longitude")?;

        let origin = GeoPoint::new(latitude, longitude);
        let hotels = workflows::hotels_near(&mut self.executor, origin).await?;

        if hotels.is_empty() {
            self.output.line(&format!(
                "Sorry, no hotel found within {} units from given place.",
                SEARCH_RADIUS
            ));
        }

        for line in hotels.render_lines() {
            self.output.line(&line);
        }

        Ok(())
    }

    pub(crate) async fn view_rooms(&mut self) -> DeskResult<()> {
        let hotel_id = self.ask_number("Enter hotel ID: ", "Hotel ID")?;
        let date = self.ask_date("Enter date (YYYY-MM-DD): ")?;

        self.show(
            workflows::room_availability_query(hotel_id, date),
            "No room found for the given hotel ID and date.",
        )
        .await
    }

    pub(crate) async fn book_room(&mut self, customer: UserId) -> DeskResult<()> {
        let hotel_id = self.ask_number("Enter hotelID: ", "Hotel ID")?;
        let room_number = self.ask_number("Enter room number: ", "Room number")?;
        let date = self.ask_date("Enter booking date (YYYY-MM-DD): ")?;

        let slot = RoomSlot {
            hotel_id,
            room_number,
            date,
        };

        match workflows::book_room(&mut self.executor, customer, &slot).await? {
            BookingOutcome::Booked { price } => self
                .output
                .line(&format!("Booking successfully! Room price: ${}", price)),
            BookingOutcome::Unavailable => self
                .output
                .line("The room is not available on the selected date."),
        }

        Ok(())
    }

    pub(crate) async fn view_recent_bookings(&mut self, customer: UserId) -> DeskResult<()> {
        self.show(
            workflows::recent_bookings_query(customer),
            "You have no bookings yet.",
        )
        .await
    }

    pub(crate) async fn update_room_info(&mut self, manager: UserId) -> DeskResult<()> {
        let hotel_id = self.ask_number("\tEnter hotelID: ", "Hotel ID")?;
        let room_number = self.ask_number("\tEnter room number: ", "Room number")?;

        // Ownership is checked again inside the update transaction
        if !workflows::manages_hotel(&mut self.executor, manager, hotel_id).await? {
            return Err(DeskError::Unauthorized { hotel_id });
        }

        let price: i32 = self.ask_number("\tEnter new price: ", "Price")?;
        if price < 0 {
            return Err(DeskError::validation("Price must not be negative."));
        }

        let image_url = self.ask("\tEnter new image URL: ")?.trim().to_string();
        if image_url.is_empty() {
            return Err(DeskError::validation("Image URL must not be empty."));
        }

        let change = RoomChange {
            hotel_id,
            room_number,
            price,
            image_url,
        };

        workflows::update_room(&mut self.executor, manager, &change).await?;

        self.output.line("Room information updated successfully!");
        self.output.line("");
        self.output.line(&format!(
            "Last {} recent updates:",
            workflows::RECENT_UPDATES
        ));

        self.show(workflows::recent_updates_query(manager), "No updates yet.")
            .await
    }

    pub(crate) async fn view_recent_updates(&mut self, manager: UserId) -> DeskResult<()> {
        self.show(
            workflows::recent_updates_query(manager),
            "You have not updated any room yet.",
        )
        .await
    }

    pub(crate) async fn view_booking_history(&mut self, manager: UserId) -> DeskResult<()> {
        let hotel_id = self.ask_number("Enter hotelID: ", "Hotel ID")?;
        let start = self.ask_date("Enter start date (YYYY-MM-DD): ")?;
        let end = self.ask_date("Enter end date (YYYY-MM-DD): ")?;

        let range = workflows::date_range(start, end)?;
        let bookings =
            workflows::hotel_booking_history(&mut self.executor, manager, hotel_id, range).await?;

        if bookings.is_empty() {
            self.output.line("No bookings found in the given date range.");
        }

        for line in bookings.render_lines() {
            self.output.line(&line);
        }

        Ok(())
    }

    pub(crate) async fn view_regular_customers(&mut self, manager: UserId) -> DeskResult<()> {
        let hotel_id = self.ask_number("Enter hotelID: ", "Hotel ID")?;

        let customers =
            workflows::regular_customers(&mut self.executor, manager, hotel_id).await?;

        if customers.is_empty() {
            self.output.line("This hotel has no customers yet.");
        }

        for line in customers.render_lines() {
            self.output.line(&line);
        }

        Ok(())
    }

    pub(crate) async fn place_repair_request(&mut self, manager: UserId) -> DeskResult<()> {
        let hotel_id = self.ask_number("Enter hotelID: ", "Hotel ID")?;
        let room_number = self.ask_number("Enter room number: ", "Room number")?;
        let company_id = self.ask_number("Enter maintenance company ID: ", "Company ID")?;

        let order = RepairOrder {
            hotel_id,
            room_number,
            company_id,
        };

        let repair_id =
            workflows::place_repair_request(&mut self.executor, manager, &order).await?;

        info!("Repair {} placed from the desk", repair_id);
        self.output.line(&format!(
            "Repair request placed successfully with repairID = {}",
            repair_id
        ));

        Ok(())
    }

    pub(crate) async fn view_repair_history(&mut self, manager: UserId) -> DeskResult<()> {
        self.show(
            workflows::repair_history_query(manager),
            "You have not placed any repair request yet.",
        )
        .await
    }
}
