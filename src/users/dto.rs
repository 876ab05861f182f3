use serde::Deserialize;
use time::OffsetDateTime;

use crate::validation::{
    is_valid_email, require_max_len, require_present, sanitize, Action, ValidationError,
};

const NAME_MAX: usize = 20;
const EMAIL_MAX: usize = 50;

/// Incoming user body, shared by sign-up, profile updates and login.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password: String,
    #[serde(skip)]
    pub created_at: Option<OffsetDateTime>,
    #[serde(skip)]
    pub updated_at: Option<OffsetDateTime>,
}

impl UserRequest {
    pub fn prepare(&mut self) -> &mut Self {
        self.username = sanitize(&self.username);
        self.email = sanitize(&self.email);
        self.first_name = sanitize(&self.first_name);
        self.last_name = sanitize(&self.last_name);
        self.password = sanitize(&self.password);
        let now = OffsetDateTime::now_utc();
        self.created_at = Some(now);
        self.updated_at = Some(now);
        self
    }

    pub fn validate(&self, action: Action) -> Result<(), ValidationError> {
        match action {
            Action::Login => {
                self.check_email()?;
                require_present("User", "password", &self.password)
            }
            Action::Update => self.check_profile(),
            Action::Create => {
                self.check_profile()?;
                require_present("User", "password", &self.password)
            }
        }
    }

    fn check_profile(&self) -> Result<(), ValidationError> {
        require_present("User", "username", &self.username)?;
        require_max_len("User", "username", &self.username, NAME_MAX)?;
        self.check_email()?;
        require_present("User", "first_name", &self.first_name)?;
        require_max_len("User", "first_name", &self.first_name, NAME_MAX)?;
        require_present("User", "last_name", &self.last_name)?;
        require_max_len("User", "last_name", &self.last_name, NAME_MAX)
    }

    fn check_email(&self) -> Result<(), ValidationError> {
        require_present("User", "email", &self.email)?;
        if !is_valid_email(&self.email) {
            return Err(ValidationError::new("Invalid email"));
        }
        require_max_len("User", "email", &self.email, EMAIL_MAX)
    }
}
