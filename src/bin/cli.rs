use clap::{Args, Parser, Subcommand};
use genesis_erp::{
    cli::{
        auth,
        db::{db_generate, db_list, db_migrate, db_revert, db_seed},
    },
    core::db::init_pool,
    settings::get_config,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database related command
    Db(DbArgs),
    /// Authentication related command
    Auth(AuthArgs),
}

#[derive(Debug, Args)]
struct AuthArgs {
    #[command(subcommand)]
    command: AuthCommands,
}

#[derive(Debug, Subcommand)]
enum AuthCommands {
    /// Create new approved admin user
    CreateAdmin {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
    },
    /// Overwrite the password of an existing user
    ResetPassword {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Debug, Args)]
struct DbArgs {
    #[command(subcommand)]
    command: DbCommands,
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Generate new migration file
    Generate { migration_name: String },
    /// List all migration
    List,
    /// Run all pending migration
    Migrate,
    /// Revert latest migration
    Revert,
    /// Insert default admin, departments and designations into empty tables
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Commands::Db(DbArgs {
        command: DbCommands::Generate { migration_name },
    }) = &cli.command
    {
        println!("generate migration: {migration_name:?}");
        return db_generate(migration_name).await;
    }

    let config = get_config()?;
    let pool = init_pool(&config).await?;
    match &cli.command {
        Commands::Db(db_args) => match &db_args.command {
            DbCommands::Generate { .. } => {}
            DbCommands::List => {
                println!("list migration on {}", config.database_url);
                for migration in db_list(&pool).await? {
                    let status = if migration.applied {
                        "installed"
                    } else {
                        "pending"
                    };
                    println!(
                        "{}/{} {}",
                        migration.version, status, migration.description
                    );
                }
            }
            DbCommands::Migrate => {
                println!("run migration on {}", config.database_url);
                db_migrate(&pool).await?;
            }
            DbCommands::Revert => match db_revert(&pool).await? {
                Some(version) => println!("reverted migration {}", version),
                None => println!("no migration to revert"),
            },
            DbCommands::Seed => {
                let report = db_seed(&pool).await?;
                println!(
                    "seeded admin: {}, departments: {}, designations: {}",
                    report.admin_created, report.departments_created, report.designations_created
                );
            }
        },
        Commands::Auth(auth_args) => match &auth_args.command {
            AuthCommands::CreateAdmin {
                username,
                password,
                name,
                email,
            } => {
                println!("create admin: {username:?}");
                let user = auth::create_admin(&pool, username, password, name, email).await?;
                println!("created {}", user.id);
            }
            AuthCommands::ResetPassword { username, password } => {
                println!("reset password: {username:?}");
                auth::reset_password(&pool, username, password).await?;
            }
        },
    }
    Ok(())
}
