use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Args, Subcommand};

use crate::{
    application::{
        services::{collection::UserCollection, edit_session::EditSession},
        usecases::{
            delete_user::DeleteUserUseCase, export_users::ExportUsersUseCase,
            import_users::ImportUsersUseCase, refresh_users::RefreshUsersUseCase,
            submit_user::SubmitUserUseCase,
        },
    },
    domain::{
        errors::DomainError,
        models::{Role, UserForm, UserId},
        repositories::UserStore,
    },
    infrastructure::events::broadcast::BroadcastCollectionBus,
    presentation::console::view::ConsoleView,
};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reload the users and print them
    List,
    /// Create a user
    Add(UserFields),
    /// Change an existing user; omitted fields keep their current value
    Edit {
        id: String,
        #[command(flatten)]
        fields: UserFields,
    },
    /// Delete a user
    Delete { id: String },
    /// Load a spreadsheet into the list without saving it
    Import { file: PathBuf },
    /// Write the current list to a .csv or .xlsx file
    Export { file: PathBuf },
    /// Import a spreadsheet and export it again in another format
    Convert { input: PathBuf, output: PathBuf },
}

#[derive(Args, Debug, Default)]
pub struct UserFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub birthday: Option<NaiveDate>,
    #[arg(long, value_name = "Admin|User")]
    pub role: Option<Role>,
}

impl UserFields {
    fn apply(self, mut form: UserForm) -> UserForm {
        if let Some(name) = self.name {
            form.name = name;
        }
        if let Some(username) = self.username {
            form.username = username;
        }
        if let Some(email) = self.email {
            form.email = email;
        }
        if let Some(birthday) = self.birthday {
            form.birthday = birthday;
        }
        if let Some(role) = self.role {
            form.role = role;
        }
        form
    }
}

/// Everything a console command needs, wired around one store.
pub struct Console {
    collection: Arc<UserCollection>,
    session: EditSession,
    view: ConsoleView,
    refresh: RefreshUsersUseCase,
    submit: SubmitUserUseCase,
    delete: DeleteUserUseCase,
    import: ImportUsersUseCase,
    export: ExportUsersUseCase,
}

impl Console {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        let bus = Arc::new(BroadcastCollectionBus::new());
        let view_changes = bus.subscribe();
        let collection = Arc::new(UserCollection::new(bus));

        Self {
            view: ConsoleView::new(view_changes, collection.clone()),
            session: EditSession::new(),
            refresh: RefreshUsersUseCase::new(store.clone(), collection.clone()),
            submit: SubmitUserUseCase::new(store.clone(), collection.clone()),
            delete: DeleteUserUseCase::new(store, collection.clone()),
            import: ImportUsersUseCase::new(collection.clone()),
            export: ExportUsersUseCase::new(collection.clone()),
            collection,
        }
    }

    /// Runs one command and returns what should be shown to the user.
    pub async fn run(&mut self, command: Command) -> Result<String, DomainError> {
        let mut out = Vec::new();

        match command {
            Command::List => {
                self.refresh.execute().await?;
            }
            Command::Add(fields) => {
                self.refresh.execute().await?;
                self.session.open_create();
                let form = self.open_form(fields)?;
                let saved = self.submit.execute(&mut self.session, form).await?;
                out.push(format!("Added user {}", saved.id));
            }
            Command::Edit { id, fields } => {
                self.refresh.execute().await?;
                let id = UserId::new(id);
                let record = self
                    .collection
                    .get(&id)
                    .await
                    .ok_or_else(|| DomainError::NotFound(format!("user {id}")))?;
                self.session.open_edit(record);
                let form = self.open_form(fields)?;
                let saved = self.submit.execute(&mut self.session, form).await?;
                out.push(format!("Updated user {}", saved.id));
            }
            Command::Delete { id } => {
                let id = UserId::new(id);
                self.delete.execute(&id).await?;
                out.push(format!("Deleted user {id}"));
            }
            Command::Import { file } => {
                let count = self.import.execute_file(&file).await?;
                out.push(format!(
                    "Imported {count} users from {} (not saved)",
                    file.display()
                ));
            }
            Command::Export { file } => {
                self.refresh.execute().await?;
                let format = self.export.execute_to_file(&file).await?;
                out.push(format!(
                    "Exported {} users to {} as {}",
                    self.collection.len().await,
                    file.display(),
                    format.extension()
                ));
            }
            Command::Convert { input, output } => {
                let count = self.import.execute_file(&input).await?;
                let format = self.export.execute_to_file(&output).await?;
                out.push(format!(
                    "Converted {count} users to {} as {}",
                    output.display(),
                    format.extension()
                ));
            }
        }

        if let Some(grid) = self.view.render_pending().await {
            out.insert(0, grid);
        }
        Ok(out.join("\n"))
    }

    fn open_form(&self, fields: UserFields) -> Result<UserForm, DomainError> {
        let form = self.session.prefill().ok_or(DomainError::NoOpenForm)?;
        Ok(fields.apply(form))
    }
}
