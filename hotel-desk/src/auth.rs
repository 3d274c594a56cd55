use argon2::{
    password_hash::{Encoding, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use hotel_core::{Executor, ExecutorError, Query, NO_ID};
use log::{error, info, warn};
use rand::rngs::OsRng;
use thiserror::Error;

use crate::{UserId, CUSTOMER_ROLE};

/// Creates accounts and checks credentials against the Users table
pub struct Auth {
    argon: Argon2<'static>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Something went wrong with the database
    #[error(transparent)]
    Db(ExecutorError),
    #[error("HashError: {0}")]
    HashError(String),
}

impl Auth {
    /// Reports the identifier the Users sequence handed out last on this connection
    const NEW_USER_ID: &'static str = "SELECT currval('users_userid_seq')";

    pub fn new() -> Self {
        Self {
            argon: Argon2::default(),
        }
    }

    /// Creates a customer account, returning its identifier.
    ///
    /// The identifier is [`NO_ID`] if the account was created but its
    /// identifier could not be determined. Returns `None` if the account
    /// could not be created, after logging why.
    pub async fn create_account<E>(&self, executor: &mut E, account: NewAccount) -> Option<i64>
    where
        E: Executor,
    {
        match self.try_create_account(executor, &account).await {
            Ok(user_id) => {
                info!("Created account {} for {}", user_id, account.name);
                Some(user_id)
            }
            Err(e) => {
                error!("Could not create account for {}: {}", account.name, e);
                None
            }
        }
    }

    /// Checks a pair of credentials, returning the user they belong to.
    /// A wrong password and an unknown user look the same.
    pub async fn authenticate<E>(
        &self,
        executor: &mut E,
        credentials: &Credentials,
    ) -> Result<Option<UserId>, AuthError>
    where
        E: Executor,
    {
        let Ok(user_id) = credentials.user_id.trim().parse::<UserId>() else {
            return Ok(None);
        };

        let stored = executor
            .run_and_collect(
                &Query::new("SELECT password FROM Users WHERE userID = $1").bind(user_id),
            )
            .await
            .map_err(AuthError::Db)?;

        let matches = stored
            .rows()
            .iter()
            .filter_map(|row| row.first())
            .any(|hash| self.verify(user_id, &credentials.password, hash));

        Ok(matches.then_some(user_id))
    }

    /// Hashes a password with a fresh salt
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::HashError(e.to_string()))
    }

    async fn try_create_account<E>(
        &self,
        executor: &mut E,
        account: &NewAccount,
    ) -> Result<i64, AuthError>
    where
        E: Executor,
    {
        let hashed_password = self.hash_password(&account.password)?;

        executor
            .run_for_effect(
                &Query::new("INSERT INTO Users (name, password, userType) VALUES ($1, $2, $3)")
                    .bind(account.name.as_str())
                    .bind(hashed_password)
                    .bind(CUSTOMER_ROLE),
            )
            .await
            .map_err(AuthError::Db)?;

        let user_id = executor
            .last_generated_id(&Query::new(Self::NEW_USER_ID))
            .await
            .map_err(AuthError::Db)?;

        if user_id == NO_ID {
            warn!("Account for {} was created without a known identifier", account.name);
        }

        Ok(user_id)
    }

    fn verify(&self, user_id: UserId, password: &str, stored: &str) -> bool {
        let Ok(stored_password) = PasswordHash::parse(stored, Encoding::default()) else {
            warn!("Stored password of user {} is not a valid hash", user_id);
            return false;
        };

        self.argon
            .verify_password(password.as_bytes(), &stored_password)
            .is_ok()
    }
}

impl Default for Auth {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct Credentials {
    /// The identifier as typed, it may not be a number
    pub user_id: String,
    pub password: String,
}

#[derive(Debug)]
pub struct NewAccount {
    pub name: String,
    pub password: String,
}

#[cfg(test)]
mod test {
    use hotel_core::{ExecutorError, Param, NO_ID};

    use crate::testing::{boxed, ScriptedExecutor};

    use super::{Auth, Credentials, NewAccount};

    fn credentials(user_id: &str, password: &str) -> Credentials {
        Credentials {
            user_id: user_id.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn exact_match_authenticates() {
        let auth = Auth::new();
        let hash = auth.hash_password("pw1").unwrap();
        let mut executor = ScriptedExecutor::new().rows(&["password"], &[&[hash.as_str()]]);

        let user = auth
            .authenticate(&mut executor, &credentials("7", "pw1"))
            .await
            .unwrap();

        assert_eq!(user, Some(7));
        assert_eq!(executor.queries()[0].params(), &[Param::Int(7)]);
    }

    #[tokio::test]
    async fn wrong_password_is_no_identity() {
        let auth = Auth::new();
        let hash = auth.hash_password("pw1").unwrap();
        let mut executor = ScriptedExecutor::new().rows(&["password"], &[&[hash.as_str()]]);

        let user = auth
            .authenticate(&mut executor, &credentials("7", "pw2"))
            .await
            .unwrap();

        assert_eq!(user, None);
    }

    #[tokio::test]
    async fn unknown_user_is_no_identity() {
        let auth = Auth::new();
        let mut executor = ScriptedExecutor::new().empty();

        let user = auth
            .authenticate(&mut executor, &credentials("404", "pw1"))
            .await
            .unwrap();

        assert_eq!(user, None);
    }

    #[tokio::test]
    async fn non_numeric_identifier_skips_the_lookup() {
        let auth = Auth::new();
        let mut executor = ScriptedExecutor::new();

        let user = auth
            .authenticate(&mut executor, &credentials("alice", "pw1"))
            .await
            .unwrap();

        assert_eq!(user, None);
        assert!(executor.queries().is_empty());
    }

    #[tokio::test]
    async fn plain_text_passwords_never_match() {
        let auth = Auth::new();
        let mut executor = ScriptedExecutor::new().rows(&["password"], &[&["pw1"]]);

        let user = auth
            .authenticate(&mut executor, &credentials("7", "pw1"))
            .await
            .unwrap();

        assert_eq!(user, None);
    }

    #[tokio::test]
    async fn created_accounts_are_hashed_customers() {
        let auth = Auth::new();
        let mut executor = ScriptedExecutor::new().affected(1).id(12);

        let user_id = auth
            .create_account(
                &mut executor,
                NewAccount {
                    name: "Alice".to_string(),
                    password: "pw1".to_string(),
                },
            )
            .await;

        assert_eq!(user_id, Some(12));

        let insert = executor.queries()[0];
        let Param::Text(stored) = &insert.params()[1] else {
            panic!("password is bound as text");
        };

        assert_eq!(insert.params()[0], Param::Text("Alice".to_string()));
        assert_ne!(stored, "pw1");
        assert!(stored.starts_with("$argon2"));
        assert_eq!(insert.params()[2], Param::Text("Customer".to_string()));
    }

    #[tokio::test]
    async fn unknown_new_identifier_is_the_sentinel() {
        let auth = Auth::new();
        let mut executor = ScriptedExecutor::new().affected(1).id(NO_ID);

        let user_id = auth
            .create_account(
                &mut executor,
                NewAccount {
                    name: "Bob".to_string(),
                    password: "pw".to_string(),
                },
            )
            .await;

        assert_eq!(user_id, Some(NO_ID));
    }

    #[tokio::test]
    async fn failed_insert_is_reported_not_raised() {
        let auth = Auth::new();
        let mut executor = ScriptedExecutor::new().fail(ExecutorError::Execution(boxed(
            "value too long for type character(50)",
        )));

        let user_id = auth
            .create_account(
                &mut executor,
                NewAccount {
                    name: "x".repeat(80),
                    password: "pw".to_string(),
                },
            )
            .await;

        assert_eq!(user_id, None);
        assert_eq!(executor.queries().len(), 1);
    }
}
