use hotel_core::{Executor, Input, Output};
use log::{info, warn};

use crate::{Auth, DeskError, DeskResult, UserId};

const MAIN_MENU: &[&str] = &["MAIN MENU", "---------", "1. Create user", "2. Log in", "9. < EXIT"];

const USER_MENU: &[&str] = &[
    "MAIN MENU",
    "---------",
    "1. View Hotels within 30 units",
    "2. View Rooms",
    "3. Book a Room",
    "4. View recent booking history",
    "5. Update Room Information",
    "6. View 5 recent Room Updates Info",
    "7. View booking history of the hotel",
    "8. View 5 regular Customers",
    "9. Place room repair Request to a company",
    "10. View room repair Requests history",
    ".........................",
    "20. Log out",
];

/// Who is sitting at the desk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    Authenticated(UserId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// The interactive front desk. Shows the menu that matches the session,
/// runs the chosen handler and reports whatever went wrong, until the user
/// exits or the input closes.
pub struct Desk<E, I, O> {
    pub(crate) executor: E,
    pub(crate) input: I,
    pub(crate) output: O,
    pub(crate) auth: Auth,
    session: Session,
}

impl<E, I, O> Desk<E, I, O>
where
    E: Executor,
    I: Input,
    O: Output + Send,
{
    pub fn new(executor: E, input: I, output: O) -> Self {
        Self {
            executor,
            input,
            output,
            auth: Auth::new(),
            session: Session::Anonymous,
        }
    }

    pub fn session(&self) -> Session {
        self.session
    }

    /// Gives the executor back, so the caller can close it
    pub fn into_executor(self) -> E {
        self.executor
    }

    pub async fn run(&mut self) {
        loop {
            let flow = match self.session {
                Session::Anonymous => self.main_turn().await,
                Session::Authenticated(user) => self.user_turn(user).await,
            };

            if flow == Flow::Exit {
                break;
            }
        }

        info!("Desk closed");
    }

    async fn main_turn(&mut self) -> Flow {
        self.show_menu(MAIN_MENU);

        let Some(choice) = self.read_choice() else {
            return Flow::Exit;
        };

        match choice {
            1 => {
                let result = self.create_user().await;
                self.conclude(result)
            }
            2 => match self.log_in().await {
                Ok(Some(user)) => {
                    info!("User {} logged in", user);
                    self.session = Session::Authenticated(user);
                    Flow::Continue
                }
                Ok(None) => Flow::Continue,
                Err(e) => self.conclude(Err(e)),
            },
            9 => Flow::Exit,
            _ => {
                self.output.line("Unrecognized choice!");
                Flow::Continue
            }
        }
    }

    async fn user_turn(&mut self, user: UserId) -> Flow {
        self.show_menu(USER_MENU);

        let Some(choice) = self.read_choice() else {
            return Flow::Exit;
        };

        let result = match choice {
            1 => self.view_hotels().await,
            2 => self.view_rooms().await,
            3 => self.book_room(user).await,
            4 => self.view_recent_bookings(user).await,
            5 => self.update_room_info(user).await,
            6 => self.view_recent_updates(user).await,
            7 => self.view_booking_history(user).await,
            8 => self.view_regular_customers(user).await,
            9 => self.place_repair_request(user).await,
            10 => self.view_repair_history(user).await,
            20 => {
                info!("User {} logged out", user);
                self.session = Session::Anonymous;
                return Flow::Continue;
            }
            _ => {
                self.output.line("Unrecognized choice!");
                return Flow::Continue;
            }
        };

        self.conclude(result)
    }

    fn show_menu(&mut self, menu: &[&str]) {
        for line in menu {
            self.output.line(line);
        }
    }

    /// Asks until a number is entered. Returns `None` once the input is gone.
    fn read_choice(&mut self) -> Option<i32> {
        loop {
            self.output.prompt("Please make your choice: ");

            match self.input.read_line() {
                Ok(Some(line)) => match line.trim().parse() {
                    Ok(choice) => return Some(choice),
                    Err(_) => self.output.line("Your input is invalid!"),
                },
                Ok(None) => return None,
                Err(e) => {
                    self.output.error(&format!("Could not read input: {}", e));
                    return None;
                }
            }
        }
    }

    /// Reports a failed handler; only a closed input ends the session
    fn conclude(&mut self, result: DeskResult<()>) -> Flow {
        match result {
            Ok(()) => Flow::Continue,
            Err(DeskError::InputClosed) => Flow::Exit,
            Err(error) => {
                if let DeskError::Db(e) = &error {
                    warn!("Workflow failed: {}", e);
                }

                self.output.error(&error.to_string());
                Flow::Continue
            }
        }
    }
}

#[cfg(test)]
mod test {
    use hotel_core::{ExecutorError, Param};

    use crate::{
        testing::{boxed, CapturedOutput, ScriptedExecutor, ScriptedInput},
        Auth, Desk, Session,
    };

    fn desk(
        executor: ScriptedExecutor,
        lines: &[&str],
    ) -> Desk<ScriptedExecutor, ScriptedInput, CapturedOutput> {
        Desk::new(executor, ScriptedInput::new(lines), CapturedOutput::default())
    }

    fn stored_password(password: &str) -> String {
        Auth::new().hash_password(password).unwrap()
    }

    #[tokio::test]
    async fn exit_ends_the_session() {
        let mut desk = desk(ScriptedExecutor::new(), &["9"]);

        desk.run().await;

        assert_eq!(desk.session(), Session::Anonymous);
        assert!(desk.output.printed("9. < EXIT"));
        assert!(desk.executor.calls.is_empty());
    }

    #[tokio::test]
    async fn malformed_choice_is_asked_again() {
        let mut desk = desk(ScriptedExecutor::new(), &["one", "", "9"]);

        desk.run().await;

        let invalid = desk
            .output
            .lines
            .iter()
            .filter(|l| *l == "Your input is invalid!")
            .count();

        assert_eq!(invalid, 2);
        assert_eq!(desk.output.prompts.len(), 3);
    }

    #[tokio::test]
    async fn unknown_choice_keeps_the_state() {
        let mut desk = desk(ScriptedExecutor::new(), &["5", "9"]);

        desk.run().await;

        assert!(desk.output.printed("Unrecognized choice!"));
        assert_eq!(desk.session(), Session::Anonymous);
    }

    #[tokio::test]
    async fn closed_input_exits() {
        let mut desk = desk(ScriptedExecutor::new(), &[]);

        desk.run().await;

        assert_eq!(desk.output.prompts, vec!["Please make your choice: "]);
    }

    #[tokio::test]
    async fn creating_an_account_does_not_log_in() {
        let executor = ScriptedExecutor::new().affected(1).id(12);
        let mut desk = desk(executor, &["1", "Alice", "pw1"]);

        desk.run().await;

        assert!(desk
            .output
            .printed("User successfully created with userID = 12"));
        assert_eq!(desk.session(), Session::Anonymous);
        assert!(!desk.output.printed("20. Log out"));
    }

    #[tokio::test]
    async fn failed_login_stays_anonymous() {
        let executor = ScriptedExecutor::new().empty();
        let mut desk = desk(executor, &["2", "7", "wrong", "9"]);

        desk.run().await;

        assert!(desk.output.printed("Invalid userID or password."));
        assert_eq!(desk.session(), Session::Anonymous);
    }

    #[tokio::test]
    async fn login_then_logout() {
        let hash = stored_password("pw1");
        let executor = ScriptedExecutor::new().rows(&["password"], &[&[hash.as_str()]]);
        let mut desk = desk(executor, &["2", "7", "pw1", "42", "20", "9"]);

        desk.run().await;

        assert!(desk.output.printed("20. Log out"));
        assert!(desk.output.printed("Unrecognized choice!"));
        assert_eq!(desk.session(), Session::Anonymous);
    }

    #[tokio::test]
    async fn closed_input_ends_a_logged_in_session() {
        let hash = stored_password("pw1");
        let executor = ScriptedExecutor::new().rows(&["password"], &[&[hash.as_str()]]);
        let mut desk = desk(executor, &["2", "7", "pw1"]);

        desk.run().await;

        assert_eq!(desk.session(), Session::Authenticated(7));
    }

    #[tokio::test]
    async fn failures_return_to_the_menu() {
        let hash = stored_password("pw1");
        let executor = ScriptedExecutor::new()
            .rows(&["password"], &[&[hash.as_str()]])
            .fail(ExecutorError::Connection(boxed("connection reset")));
        let mut desk = desk(executor, &["2", "7", "pw1", "2", "1", "2024-06-01", "20", "9"]);

        desk.run().await;

        assert!(desk
            .output
            .reported("Lost connection to the database: connection reset"));
        assert_eq!(desk.session(), Session::Anonymous);
    }

    #[tokio::test]
    async fn refusal_is_reported() {
        let hash = stored_password("pw1");
        let executor = ScriptedExecutor::new()
            .rows(&["password"], &[&[hash.as_str()]])
            .count(0);
        let mut desk = desk(executor, &["2", "3", "pw1", "8", "1", "20", "9"]);

        desk.run().await;

        assert!(desk.output.reported("You do not manage hotel 1."));
        assert!(desk.executor.writes().is_empty());
    }

    #[tokio::test]
    async fn alice_books_a_room_once() {
        let hash = stored_password("pw1");
        let executor = ScriptedExecutor::new()
            .affected(1)
            .id(7)
            .rows(&["password"], &[&[hash.as_str()]])
            .count(0)
            .rows(&["price"], &[&["120"]])
            .affected(1)
            .count(1);
        let mut desk = desk(
            executor,
            &[
                "1", "Alice", "pw1", // create
                "2", "7", "pw1", // log in
                "3", "1", "101", "2024-06-01", // book
                "3", "1", "101", "2024-06-01", // book again
                "20", "9",
            ],
        );

        desk.run().await;

        assert!(desk.output.printed("User successfully created with userID = 7"));
        assert!(desk.output.printed("Booking successfully! Room price: $120"));
        assert!(desk
            .output
            .printed("The room is not available on the selected date."));

        let booking = desk
            .executor
            .queries()
            .into_iter()
            .find(|q| q.sql().contains("INSERT INTO RoomBookings"))
            .cloned()
            .unwrap();

        assert_eq!(booking.params()[0], Param::Int(7));
        assert_eq!(desk.executor.writes().len(), 2);
    }
}
