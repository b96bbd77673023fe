use std::sync::Arc;

use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use warden_cli::seeder::{self, BootstrapConfig};
use warden_config::{DatabaseConfig, PasswordConfig};
use warden_db::RbacStore;

#[derive(Parser)]
#[command(name = "warden-cli")]
#[command(about = "Warden CLI - Administrative tools for the Warden RBAC API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the default permissions, roles and the first super admin
    Bootstrap {
        /// Display name of the super admin
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed fake users holding the admin role
    SeedUsers {
        /// Number of users to create
        #[arg(short = 'c', long, default_value = "10")]
        count: usize,

        /// Password shared by every seeded user
        #[arg(short = 'p', long, default_value = "password")]
        password: String,
    },
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    warden_observability::init_tracing();

    let cli = Cli::parse();
    let db_config = DatabaseConfig::from_env();

    match cli.command {
        Commands::Bootstrap {
            name,
            email,
            password,
        } => {
            let store = connect(&db_config).await;
            handle_bootstrap(store.as_ref(), name, email, password).await
        }
        Commands::SeedUsers { count, password } => {
            let store = connect(&db_config).await;
            handle_seed_users(store.as_ref(), count, &password).await
        }
        Commands::Migrate => handle_migrate(&db_config).await,
    }
}

async fn connect(config: &DatabaseConfig) -> Arc<dyn RbacStore> {
    match warden_db::connect_store(config).await {
        Ok(store) => store,
        Err(e) => fail("connecting to the store", e),
    }
}

async fn handle_bootstrap(
    store: &dyn RbacStore,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) {
    let defaults = BootstrapConfig::from_env();

    let name = name.unwrap_or_else(|| {
        prompt(
            Input::new()
                .with_prompt("Name")
                .default(defaults.name.clone())
                .interact_text(),
        )
    });

    let email = email.unwrap_or_else(|| {
        prompt(
            Input::new()
                .with_prompt("Email address")
                .default(defaults.email.clone())
                .interact_text(),
        )
    });

    let password = password.unwrap_or_else(|| {
        prompt(
            Password::new()
                .with_prompt("Password")
                .with_confirmation("Confirm password", "Passwords don't match")
                .interact(),
        )
    });

    let config = BootstrapConfig {
        name,
        email,
        password,
        bcrypt_cost: defaults.bcrypt_cost,
    };

    match seeder::bootstrap(store, &config).await {
        Ok(report) => {
            println!("\n✅ Bootstrap complete ({} backend)", store.backend_name());
            println!("   Permissions created: {}", report.permissions_created);
            println!("   Roles created: {}", report.roles_created);
            if report.super_admin_created {
                println!("   Super admin created: {}", config.email);
            } else {
                println!("   Super admin already present: {}", config.email);
            }
        }
        Err(e) => fail("bootstrapping", e),
    }
}

async fn handle_seed_users(store: &dyn RbacStore, count: usize, password: &str) {
    let cost = PasswordConfig::from_env().bcrypt_cost;
    match seeder::seed_users(store, count, password, cost).await {
        Ok(users) => {
            println!("\n✅ Seeded {} users", users.len());
            for user in users.iter().take(5) {
                println!("   {} <{}>", user.name, user.email);
            }
        }
        Err(e) => fail("seeding users", e),
    }
}

async fn handle_migrate(config: &DatabaseConfig) {
    let pool = match warden_db::init_db_pool(config).await {
        Ok(pool) => pool,
        Err(e) => fail("connecting to the database", e),
    };
    match warden_db::run_migrations(&pool).await {
        Ok(()) => println!("\n✅ Migrations applied"),
        Err(e) => fail("running migrations", e),
    }
}

fn prompt<T>(result: dialoguer::Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => fail("reading input", e),
    }
}

fn fail(action: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("\n❌ Error {}: {}", action, err);
    std::process::exit(1);
}
