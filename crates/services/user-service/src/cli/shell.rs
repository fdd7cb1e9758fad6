//! Interactive numbered menu.

use std::io::Write;
use std::str::FromStr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use common::AppResult;
use domain::{NewUser, UserChanges};

use super::io_error;
use crate::service::UserService;

const MENU: &str = "\n=== User Service ===\n\
1. Create User\n\
2. Get User by ID\n\
3. Get All Users\n\
4. Update User\n\
5. Delete User\n\
6. Exit";

/// Why a menu action stopped before reaching the service.
enum Abort {
    /// Input ended
    Eof,
    /// A numeric field did not parse; carries the message to show
    Invalid(&'static str),
}

/// Line-oriented prompt over any buffered reader.
struct Prompt<'a, R, W> {
    input: R,
    out: &'a mut W,
}

impl<R, W> Prompt<'_, R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    fn say(&mut self, text: &str) -> AppResult<()> {
        writeln!(self.out, "{}", text).map_err(io_error)
    }

    /// Print `label` and read one line, `None` on end of input.
    async fn ask(&mut self, label: &str) -> AppResult<Option<String>> {
        write!(self.out, "{}", label).map_err(io_error)?;
        self.out.flush().map_err(io_error)?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).await.map_err(io_error)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    async fn text(&mut self, label: &str) -> AppResult<Result<String, Abort>> {
        Ok(self.ask(label).await?.ok_or(Abort::Eof))
    }

    async fn number<T: FromStr>(
        &mut self,
        label: &str,
        invalid: &'static str,
    ) -> AppResult<Result<T, Abort>> {
        Ok(match self.ask(label).await? {
            None => Err(Abort::Eof),
            Some(raw) => raw.trim().parse().map_err(|_| Abort::Invalid(invalid)),
        })
    }
}

/// Run the interactive menu until the user exits or input ends.
pub async fn run_shell<R, W>(service: &dyn UserService, input: R, out: &mut W) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut prompt = Prompt { input, out };

    loop {
        prompt.say(MENU)?;
        let Some(choice) = prompt.ask("\nEnter your choice: ").await? else {
            break;
        };

        let outcome = match choice.trim() {
            "1" => create(service, &mut prompt).await?,
            "2" => get(service, &mut prompt).await?,
            "3" => list(service, &mut prompt).await?,
            "4" => update(service, &mut prompt).await?,
            "5" => delete(service, &mut prompt).await?,
            "6" => break,
            _ => {
                prompt.say("Invalid choice. Please try again.")?;
                Ok(())
            }
        };

        match outcome {
            Ok(()) => {}
            Err(Abort::Invalid(message)) => prompt.say(message)?,
            Err(Abort::Eof) => break,
        }
    }

    prompt.say("Goodbye!")
}

type Step = AppResult<Result<(), Abort>>;

macro_rules! field {
    ($e:expr) => {
        match $e.await? {
            Ok(value) => value,
            Err(abort) => return Ok(Err(abort)),
        }
    };
}

async fn create<R, W>(service: &dyn UserService, prompt: &mut Prompt<'_, R, W>) -> Step
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let name = field!(prompt.text("Enter name: "));
    let email = field!(prompt.text("Enter email: "));
    let age: i32 = field!(prompt.number(
        "Enter age: ",
        "Invalid age format. Please enter a number."
    ));

    let draft = NewUser::new(name, email, age);
    let result = match draft.validate() {
        Ok(()) => service.create_user(draft.name, draft.email, draft.age).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(user) => prompt.say(&format!("User created successfully: {}", user))?,
        Err(e) => {
            tracing::error!("Error creating user: {}", e);
            prompt.say(&format!("Error creating user: {}", e.user_message()))?;
        }
    }
    Ok(Ok(()))
}

async fn get<R, W>(service: &dyn UserService, prompt: &mut Prompt<'_, R, W>) -> Step
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let id: i64 = field!(prompt.number(
        "Enter user ID: ",
        "Invalid ID format. Please enter a number."
    ));

    match service.find_user(id).await {
        Ok(Some(user)) => prompt.say(&format!("User found: {}", user))?,
        Ok(None) => prompt.say(&format!("User not found with ID: {}", id))?,
        Err(e) => {
            tracing::error!("Error retrieving user: {}", e);
            prompt.say(&format!("Error retrieving user: {}", e.user_message()))?;
        }
    }
    Ok(Ok(()))
}

async fn list<R, W>(service: &dyn UserService, prompt: &mut Prompt<'_, R, W>) -> Step
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    match service.list_users().await {
        Ok(users) if users.is_empty() => prompt.say("No users found.")?,
        Ok(users) => {
            prompt.say("Users:")?;
            for user in users {
                prompt.say(&user.to_string())?;
            }
        }
        Err(e) => {
            tracing::error!("Error retrieving users: {}", e);
            prompt.say(&format!("Error retrieving users: {}", e.user_message()))?;
        }
    }
    Ok(Ok(()))
}

async fn update<R, W>(service: &dyn UserService, prompt: &mut Prompt<'_, R, W>) -> Step
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    const INVALID: &str = "Invalid number format. Please check your input.";

    let id: i64 = field!(prompt.number("Enter user ID to update: ", INVALID));
    let name = field!(prompt.text("Enter new name: "));
    let email = field!(prompt.text("Enter new email: "));
    let age: i32 = field!(prompt.number("Enter new age: ", INVALID));

    let changes = UserChanges::new(name, email, age);
    let result = match changes.validate() {
        Ok(()) => service.update_user(id, changes).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(user) => prompt.say(&format!("User updated successfully: {}", user))?,
        Err(e) => {
            tracing::error!("Error updating user: {}", e);
            prompt.say(&format!("Error updating user: {}", e.user_message()))?;
        }
    }
    Ok(Ok(()))
}

async fn delete<R, W>(service: &dyn UserService, prompt: &mut Prompt<'_, R, W>) -> Step
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let id: i64 = field!(prompt.number(
        "Enter user ID to delete: ",
        "Invalid ID format. Please enter a number."
    ));

    match service.delete_user(id).await {
        Ok(()) => prompt.say("User deleted successfully")?,
        Err(e) => {
            tracing::error!("Error deleting user: {}", e);
            prompt.say(&format!("Error deleting user: {}", e.user_message()))?;
        }
    }
    Ok(Ok(()))
}
