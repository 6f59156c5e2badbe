use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use configuration::{ConfigArgs, Settings};
use database::DbRepository;

/// The main entry point for the Bookshelf record service.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let mut settings = configuration::load_config(cli.command.config_args().config.as_deref())?;
    let _log_guard = configuration::init_tracing(&settings.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(args) => {
            if let Some(host) = args.host {
                settings.server.host = host;
            }
            if let Some(port) = args.port {
                settings.server.port = port;
            }
            settings.validate()?;
            web_server::run_server(&settings).await?;
        }
        Commands::InitDb(_) => {
            let repo = open_repository(&settings).await?;
            database::disconnect(repo.pool()).await;
            println!("Database schema is ready at {}", settings.database.url);
        }
        Commands::Users(_) => {
            let repo = open_repository(&settings).await?;
            print_users(&repo).await?;
            database::disconnect(repo.pool()).await;
        }
        Commands::Books(_) => {
            let repo = open_repository(&settings).await?;
            print_books(&repo).await?;
            database::disconnect(repo.pool()).await;
        }
    }

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A small library-management record service: users, books, authorship and borrows.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service.
    Serve(ServeArgs),
    /// Create the schema and seed the fixed roles, then exit.
    InitDb(ConfigArgs),
    /// Print every user as a table.
    Users(ConfigArgs),
    /// Print every book as a table.
    Books(ConfigArgs),
}

#[derive(Parser)]
struct ServeArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Overrides `server.host`.
    #[arg(long)]
    host: Option<String>,

    /// Overrides `server.port`.
    #[arg(long)]
    port: Option<u16>,
}

impl Commands {
    fn config_args(&self) -> &ConfigArgs {
        match self {
            Commands::Serve(args) => &args.config,
            Commands::InitDb(args) | Commands::Users(args) | Commands::Books(args) => args,
        }
    }
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn open_repository(settings: &Settings) -> anyhow::Result<DbRepository> {
    let pool = database::connect(&settings.database).await?;
    database::init_schema(&pool).await?;
    Ok(DbRepository::new(pool))
}

async fn print_users(repo: &DbRepository) -> anyhow::Result<()> {
    let users = repo.list_users().await?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["ID", "Username", "Email", "Role", "Created"]);
    for user in &users {
        let role = core_types::RoleKind::from_id(user.role_id)
            .map(|role| role.name().to_string())
            .unwrap_or_else(|| user.role_id.to_string());
        table.add_row(vec![
            user.id.to_string(),
            user.username.clone(),
            user.email.clone(),
            role,
            user.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }

    println!("{table}");
    println!("{} user(s)", users.len());
    Ok(())
}

async fn print_books(repo: &DbRepository) -> anyhow::Result<()> {
    let books = repo.list_books().await?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["ID", "Title", "Year", "Description"]);
    for book in &books {
        table.add_row(vec![
            book.id.to_string(),
            book.title.clone(),
            book.year.to_string(),
            book.description.clone(),
        ]);
    }

    println!("{table}");
    println!("{} book(s)", books.len());
    Ok(())
}
