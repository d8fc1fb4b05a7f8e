use tracing::{debug, info};

use slotswap_core::{Result, Store, SwapError, User, UserId, ValidationError, Validator};

use crate::SwapEngine;

impl<S: Store> SwapEngine<S> {
    /// Register a new user. The credential is stored as given.
    pub fn register_user(&self, name: &str, email: &str, credential: &str) -> Result<User> {
        let name = Validator::validate_name(name)?;
        let email = Validator::validate_email(email)?;
        Validator::validate_credential(credential)?;

        let user = User::new(name, email, credential.to_string());
        let user = self.store.write(|tables| {
            if !tables.insert_user(user.clone()) {
                debug!(email = %user.email, "email already registered");
                return Err(SwapError::from(ValidationError::EmailTaken(user.email)));
            }
            Ok(user)
        })?;

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub fn get_user(&self, user_id: UserId) -> Result<User> {
        self.store
            .read(|tables| tables.user(user_id).cloned())?
            .ok_or_else(|| SwapError::not_found(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotswap_core::ErrorKind;

    #[test]
    fn test_register_and_get() {
        let engine = SwapEngine::in_memory();
        let user = engine.register_user("Ada", "Ada@Example.com", "hash").unwrap();

        assert_eq!(user.email, "ada@example.com");
        assert_eq!(engine.get_user(user.id).unwrap(), user);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let engine = SwapEngine::in_memory();
        engine.register_user("Ada", "ada@example.com", "hash").unwrap();

        let err = engine
            .register_user("Imposter", "ADA@example.com", "hash")
            .unwrap_err();
        assert_eq!(
            err,
            SwapError::Validation(ValidationError::EmailTaken("ada@example.com".to_string()))
        );
    }

    #[test]
    fn test_invalid_registration() {
        let engine = SwapEngine::in_memory();
        assert_eq!(
            engine.register_user("", "a@b.c", "x").unwrap_err().kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            engine.register_user("Ada", "nope", "x").unwrap_err().kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            engine.register_user("Ada", "a@b.c", "").unwrap_err().kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_get_unknown_user() {
        let engine = SwapEngine::in_memory();
        let id = UserId::new();
        assert_eq!(engine.get_user(id).unwrap_err(), SwapError::not_found(id));
    }
}
