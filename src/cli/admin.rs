use std::fs;
use std::path::{Path, PathBuf};

use anyhow::bail;
use chrono::Utc;
use inquire::{Confirm, Text};
use uuid::Uuid;

use crate::auth::issue_token;
use crate::config::ServerConfig;
use crate::error::Error;
use crate::store::{SqliteStore, Store};
use crate::types::{DEFAULT_IMAGE, User};

use super::init_store;

#[cfg(unix)]
fn set_restrictive_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set permissions on {}: {e}", path.display());
    }
}

fn print_token_banner(heading: &str, raw_token: &str) {
    println!();
    println!("========================================");
    println!("{heading}");
    println!();
    println!("  {raw_token}");
    println!();
    println!("========================================");
    println!();
}

pub fn run_init(data_dir: String, non_interactive: bool) -> anyhow::Result<()> {
    let config = ServerConfig {
        data_dir: PathBuf::from(data_dir),
        ..ServerConfig::default()
    };
    fs::create_dir_all(&config.data_dir)?;

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;

    let token_file = config.admin_token_path();

    if store.has_admin_token()? {
        bail!(
            "Server already initialized. Admin token exists at: {}",
            token_file.display()
        );
    }

    let (_, raw_token) = issue_token(&store, true, None, None)?;
    fs::write(&token_file, &raw_token)?;

    #[cfg(unix)]
    set_restrictive_permissions(&token_file);

    print_token_banner("Admin token (save this, it won't be shown again):", &raw_token);
    println!("Token also written to: {}", token_file.display());

    if !non_interactive {
        let create_user = Confirm::new("Would you like to create a default user?")
            .with_default(false)
            .prompt()?;

        if create_user {
            let (email, name) = prompt_identity(None, None)?;
            add_user(&store, &email, &name, true)?;
        }
    }

    Ok(())
}

fn prompt_identity(email: Option<String>, name: Option<String>) -> anyhow::Result<(String, String)> {
    let email = match email {
        Some(email) => email,
        None => Text::new("Email:")
            .with_validator(|input: &str| {
                if input.trim().contains('@') {
                    Ok(inquire::validator::Validation::Valid)
                } else {
                    Ok(inquire::validator::Validation::Invalid(
                        "Enter a valid email address".into(),
                    ))
                }
            })
            .prompt()?,
    };

    let name = match name {
        Some(name) => name,
        None => Text::new("Name:")
            .with_validator(|input: &str| {
                if input.trim().is_empty() {
                    Ok(inquire::validator::Validation::Invalid(
                        "Name cannot be empty".into(),
                    ))
                } else {
                    Ok(inquire::validator::Validation::Valid)
                }
            })
            .prompt()?,
    };

    Ok((email, name))
}

fn add_user(store: &dyn Store, email: &str, name: &str, with_token: bool) -> anyhow::Result<User> {
    let email = email.trim().to_lowercase();
    let name = name.trim();

    if !email.contains('@') {
        bail!("'{email}' is not a valid email address");
    }
    if name.is_empty() {
        bail!("Name cannot be empty");
    }

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        email,
        name: name.to_string(),
        profile_pic: DEFAULT_IMAGE.to_string(),
        created_at: now,
        updated_at: now,
    };

    match store.create_user(&user) {
        Ok(()) => {}
        Err(Error::AlreadyExists) => bail!("A user with email '{}' already exists", user.email),
        Err(e) => return Err(e.into()),
    }

    println!();
    println!("Created user \"{}\" <{}> ({})", user.name, user.email, user.id);

    if with_token {
        let (_, raw_token) = issue_token(store, false, Some(user.id.clone()), None)?;
        print_token_banner("User token (save this, it cannot be retrieved later):", &raw_token);
    }

    Ok(user)
}

pub fn run_user_add(
    data_dir: String,
    email: Option<String>,
    name: Option<String>,
    no_token: bool,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let store = init_store(Path::new(&data_dir))?;

    let (email, name) = if non_interactive {
        match (email, name) {
            (Some(email), Some(name)) => (email, name),
            _ => bail!("--email and --name are required in non-interactive mode"),
        }
    } else {
        prompt_identity(email, name)?
    };

    add_user(&store, &email, &name, !no_token)?;
    Ok(())
}
