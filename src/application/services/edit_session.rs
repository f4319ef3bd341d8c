use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::domain::{
    errors::{DomainError, UserField, ValidationErrors},
    models::{NewUser, Role, UserForm, UserId, UserRecord},
    repositories::UserStore,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Closed,
    Creating,
    Editing(UserRecord),
}

/// Which record, if any, the add/edit form is working on.
#[derive(Debug, Default)]
pub struct EditSession {
    state: SessionState,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, SessionState::Closed)
    }

    pub fn selected(&self) -> Option<&UserRecord> {
        match &self.state {
            SessionState::Editing(record) => Some(record),
            _ => None,
        }
    }

    pub fn open_create(&mut self) {
        self.state = SessionState::Creating;
    }

    pub fn open_edit(&mut self, record: UserRecord) {
        self.state = SessionState::Editing(record);
    }

    pub fn cancel(&mut self) {
        self.state = SessionState::Closed;
    }

    pub fn prefill(&self) -> Option<UserForm> {
        self.prefill_on(Local::now().date_naive())
    }

    /// Initial form values, with `today` standing in for a missing date.
    pub fn prefill_on(&self, today: NaiveDate) -> Option<UserForm> {
        match &self.state {
            SessionState::Closed => None,
            SessionState::Creating => Some(UserForm {
                name: String::new(),
                username: String::new(),
                email: String::new(),
                birthday: today,
                role: Role::Admin,
            }),
            SessionState::Editing(record) => Some(record.to_form(today)),
        }
    }

    /// Submits the form to the store. The session closes only on success;
    /// the caller still has to refresh the collection afterwards.
    pub async fn submit(
        &mut self,
        form: UserForm,
        collection_len: usize,
        store: &dyn UserStore,
    ) -> Result<UserRecord, DomainError> {
        if !self.is_open() {
            return Err(DomainError::NoOpenForm);
        }
        validate(&form)?;

        let stored = match &self.state {
            SessionState::Closed => return Err(DomainError::NoOpenForm),
            SessionState::Creating => {
                // placeholder only, collides once rows have been deleted
                let proposed = UserId::from(collection_len as u64 + 1);
                debug!(%proposed, "creating user");
                store.create(NewUser::from_form(Some(proposed), form)).await?
            }
            SessionState::Editing(record) => {
                debug!(id = %record.id, "updating user");
                store
                    .update(&UserRecord::from_form(record.id.clone(), form))
                    .await?
            }
        };

        info!(id = %stored.id, "user saved");
        self.state = SessionState::Closed;
        Ok(stored)
    }
}

pub fn validate(form: &UserForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    for (field, value) in [
        (UserField::Name, &form.name),
        (UserField::Username, &form.username),
        (UserField::Email, &form.email),
    ] {
        if value.trim().is_empty() {
            errors.push(field, "This field is required");
        }
    }

    if !form.email.trim().is_empty() && !looks_like_email(form.email.trim()) {
        errors.push(UserField::Email, "Enter a valid email address");
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
