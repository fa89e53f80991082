//! Command line definitions and their handlers.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use creators_core::auth::{PersistedToken, Session, SessionData};
use creators_core::models::{
    DevLoginRequest, Entity, EntityInput, EntityUpdate, Identity, ListQuery, Page, SortOrder,
    Status,
};
use creators_core::router::{before_each, page_title, resolve, Navigation};
use creators_core::utils::{format_timestamp, format_until};
use creators_core::{ApiClient, Config, Resource};
use serde::Serialize;
use tracing::debug;

use crate::render::{self, Row};

#[derive(Parser, Debug)]
#[command(name = "creators", version)]
#[command(about = "Command line client for the creators dashboard API")]
pub struct Cli {
    /// API base URL (overrides the config file and CREATORS_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Print raw JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in through the dev-login endpoint and persist the session
    Login {
        /// Subject to log in as (defaults to the configured subject)
        #[arg(long)]
        subject: Option<String>,
        /// Role to request; repeat for several
        #[arg(long = "role")]
        roles: Vec<String>,
    },
    /// Remove the persisted session
    Logout,
    /// Show the current session
    Whoami,
    /// List records of a domain
    List {
        domain: Resource,
        /// Name substring filter
        #[arg(long)]
        name: Option<String>,
        /// Cursor returned by a previous page
        #[arg(long)]
        after: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        sort_by: Option<String>,
        #[arg(long, requires = "sort_by")]
        order: Option<SortOrder>,
        /// Follow cursors until every page is fetched
        #[arg(long, conflicts_with = "after")]
        all: bool,
    },
    /// Show one record
    Get { domain: Resource, id: String },
    /// Create a record
    Create {
        domain: Resource,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<Status>,
    },
    /// Update fields of a record
    Update {
        domain: Resource,
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<Status>,
    },
    /// First page of every domain, fetched concurrently
    Summary,
    /// Check whether the dashboard would allow navigating to a path
    Route { path: String },
    /// Print the server configuration document
    Config,
}

struct App {
    config: Config,
    cache_dir: PathBuf,
    api: ApiClient,
    json: bool,
}

impl App {
    fn new(cli: &Cli) -> Result<Self> {
        let mut config = Config::load()?;
        if let Some(ref url) = cli.api_url {
            config.api_base_url = url.clone();
        }
        let cache_dir = config.cache_dir()?;
        let api = ApiClient::from_config(&config, PersistedToken::new(cache_dir.clone()))
            .context("Failed to create API client")?;
        debug!(base_url = %api.base_url(), cache_dir = %cache_dir.display(), "Client ready");

        Ok(Self {
            config,
            cache_dir,
            api,
            json: cli.json,
        })
    }

    fn session(&self) -> Session {
        Session::new(self.cache_dir.clone())
    }

    fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn print_page<T: Row + Serialize>(&self, page: &Page<T>) -> Result<()> {
        if self.json {
            return self.print_json(page);
        }
        println!("{}", render::table(&page.items));
        if let Some(footer) = render::page_footer(page) {
            println!("\n{}", footer);
        }
        Ok(())
    }

    fn print_rows<T: Row + Serialize>(&self, rows: &[T]) -> Result<()> {
        if self.json {
            return self.print_json(&rows);
        }
        println!("{}", render::table(rows));
        Ok(())
    }

    fn print_record<T: Row + Serialize>(&self, record: &T) -> Result<()> {
        if self.json {
            return self.print_json(record);
        }
        println!("{}", render::details(record));
        Ok(())
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let app = App::new(&cli)?;

    match cli.command {
        Command::Login { subject, roles } => login(&app, subject, roles).await,
        Command::Logout => logout(&app),
        Command::Whoami => whoami(&app),
        Command::List {
            domain,
            name,
            after,
            limit,
            sort_by,
            order,
            all,
        } => {
            let query = ListQuery {
                name,
                after_id: after,
                limit,
                sort_by,
                order,
            };
            list(&app, domain, &query, all).await
        }
        Command::Get { domain, id } => get(&app, domain, &id).await,
        Command::Create {
            domain,
            name,
            description,
            status,
        } => {
            let input = EntityInput {
                name,
                description,
                status,
            };
            create(&app, domain, &input).await
        }
        Command::Update {
            domain,
            id,
            name,
            description,
            status,
        } => {
            let update = EntityUpdate {
                name,
                description,
                status,
            };
            update_record(&app, domain, &id, &update).await
        }
        Command::Summary => summary(&app).await,
        Command::Route { path } => route(&app, &path),
        Command::Config => show_config(&app).await,
    }
}

async fn login(app: &App, subject: Option<String>, roles: Vec<String>) -> Result<()> {
    let request = DevLoginRequest {
        subject: subject.or_else(|| app.config.default_subject.clone()),
        roles: if roles.is_empty() { None } else { Some(roles) },
    };
    let response = app.api.dev_login(&request).await.context("Login failed")?;

    let mut session = app.session();
    session.update(SessionData::from_login(response));
    session.save()?;

    if let Some(ref data) = session.data {
        println!(
            "Logged in as {} (expires {}, {})",
            data.subject,
            format_timestamp(&data.expires_at),
            format_until(data.time_until_expiry())
        );
    }
    Ok(())
}

fn logout(app: &App) -> Result<()> {
    app.session().clear()?;
    println!("Logged out.");
    Ok(())
}

fn whoami(app: &App) -> Result<()> {
    let mut session = app.session();
    if !session.load()? {
        if session.session_path().exists() {
            println!("Session expired. Run `creators login`.");
        } else {
            println!("Not logged in.");
        }
        return Ok(());
    }

    let Some(ref data) = session.data else {
        return Ok(());
    };
    if app.json {
        #[derive(Serialize)]
        struct WhoAmI<'a> {
            subject: &'a str,
            roles: &'a [String],
            expires_at: String,
        }
        return app.print_json(&WhoAmI {
            subject: &data.subject,
            roles: &data.roles,
            expires_at: data.expires_at.to_rfc3339(),
        });
    }

    let roles = if data.roles.is_empty() {
        "none".to_string()
    } else {
        data.roles.join(", ")
    };
    println!("Subject: {}", data.subject);
    println!("Roles:   {}", roles);
    println!(
        "Expires: {} ({})",
        format_timestamp(&data.expires_at),
        format_until(data.time_until_expiry())
    );
    if data.needs_refresh() {
        println!("Session expires soon; run `creators login` to renew it.");
    }
    Ok(())
}

async fn list(app: &App, domain: Resource, query: &ListQuery, all: bool) -> Result<()> {
    match (domain, all) {
        (Resource::Identity, true) => {
            let rows: Vec<Identity> = app.api.list_all(domain, query).await?;
            app.print_rows(&rows)
        }
        (Resource::Identity, false) => {
            let page: Page<Identity> = app.api.list(domain, query).await?;
            app.print_page(&page)
        }
        (_, true) => {
            let rows: Vec<Entity> = app.api.list_all(domain, query).await?;
            app.print_rows(&rows)
        }
        (_, false) => {
            let page: Page<Entity> = app.api.list(domain, query).await?;
            app.print_page(&page)
        }
    }
}

async fn get(app: &App, domain: Resource, id: &str) -> Result<()> {
    if domain == Resource::Identity {
        let identity: Identity = app.api.get(domain, id).await?;
        app.print_record(&identity)
    } else {
        let record: Entity = app.api.get(domain, id).await?;
        app.print_record(&record)
    }
}

async fn create(app: &App, domain: Resource, input: &EntityInput) -> Result<()> {
    if domain.is_read_only() {
        bail!("{} records are read-only and cannot be created", domain);
    }
    let created = app.api.create(domain, input).await?;
    if app.json {
        return app.print_json(&created);
    }
    println!("Created {} {}", domain, created.id);
    Ok(())
}

async fn update_record(app: &App, domain: Resource, id: &str, update: &EntityUpdate) -> Result<()> {
    if domain.is_read_only() {
        bail!("{} records are read-only and cannot be updated", domain);
    }
    if update.is_empty() {
        bail!("Nothing to update: pass --name, --description or --status");
    }
    let record: Entity = app.api.update(domain, id, update).await?;
    app.print_record(&record)
}

async fn summary(app: &App) -> Result<()> {
    let query = ListQuery::default();
    let (profiles, platforms, users, identities) = futures::try_join!(
        app.api.get_profiles(&query),
        app.api.get_platforms(&query),
        app.api.get_users(&query),
        app.api.get_identities(&query),
    )?;

    let counts = [
        (Resource::Profile, profiles.items.len(), profiles.has_more),
        (Resource::Platform, platforms.items.len(), platforms.has_more),
        (Resource::User, users.items.len(), users.has_more),
        (Resource::Identity, identities.items.len(), identities.has_more),
    ];

    if app.json {
        let value: serde_json::Map<String, serde_json::Value> = counts
            .iter()
            .map(|(resource, count, more)| {
                (
                    resource.path().to_string(),
                    serde_json::json!({ "count": count, "has_more": more }),
                )
            })
            .collect();
        return app.print_json(&value);
    }

    for (resource, count, more) in counts {
        let suffix = if more { "+" } else { "" };
        println!("{:<12}{}{}", resource.plural(), count, suffix);
    }
    Ok(())
}

fn route(app: &App, path: &str) -> Result<()> {
    let mut session = app.session();
    // An unreadable session counts as logged out
    if let Err(e) = session.load() {
        debug!(error = %e, "Treating unreadable session as logged out");
    }

    let resolved = resolve(path);
    let route_name = resolved
        .route
        .map(|r| r.name.to_string())
        .unwrap_or_else(|| "(no route)".to_string());

    match before_each(path, &session) {
        Navigation::Allow => println!(
            "{} -> {}: allowed, title \"{}\"",
            resolved.full_path,
            route_name,
            page_title(&resolved.full_path)
        ),
        Navigation::Login { redirect } => {
            println!("{} -> Login (redirect back to {})", path, redirect)
        }
        Navigation::Redirect(target) => println!(
            "{} -> {}: missing role, redirected to {}",
            path,
            route_name,
            target.pattern()
        ),
    }
    Ok(())
}

async fn show_config(app: &App) -> Result<()> {
    let config = app.api.get_config().await?;
    app.print_json(&config)
}
