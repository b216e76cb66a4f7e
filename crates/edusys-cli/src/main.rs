use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

use edusys_cli::admin;
use edusys_config::DatabaseConfig;
use edusys_db::init_db_pool;
use edusys_models::CreateUserDto;

#[derive(Parser)]
#[command(name = "edusys-cli")]
#[command(about = "edusys CLI - administrative tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user with full access to every module
    CreateAdmin {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        surname: Option<String>,

        #[arg(long)]
        nickname: Option<String>,

        #[arg(long)]
        age: Option<i32>,

        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Grant a permission record to an existing user
    Grant {
        #[arg(short = 'e', long)]
        email: String,

        /// Module names, comma separated
        #[arg(short = 'm', long, value_delimiter = ',', required = true)]
        modules: Vec<String>,

        /// Action names, comma separated
        #[arg(short = 'a', long, value_delimiter = ',', required = true)]
        actions: Vec<String>,

        #[arg(short = 'l', long, default_value = "staff")]
        level: String,

        #[arg(short = 'd', long, default_value = "Granted from CLI")]
        description: String,
    },
}

fn prompt(label: &str) -> String {
    Input::new()
        .with_prompt(label)
        .interact_text()
        .unwrap_or_else(|e| fail(&format!("Failed to read {}: {}", label, e)))
}

fn fail(message: &str) -> ! {
    eprintln!("\n❌ {}", message);
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let pool = init_db_pool(&DatabaseConfig::from_env())
        .await
        .unwrap_or_else(|e| fail(&format!("Failed to connect to database: {}", e)));

    match cli.command {
        Commands::CreateAdmin {
            name,
            surname,
            nickname,
            age,
            email,
            password,
        } => {
            let dto = CreateUserDto {
                name: name.unwrap_or_else(|| prompt("Name")),
                surname: surname.unwrap_or_else(|| prompt("Surname")),
                nickname: nickname.unwrap_or_else(|| prompt("Nickname")),
                age: age.unwrap_or_else(|| {
                    Input::new()
                        .with_prompt("Age")
                        .interact_text()
                        .unwrap_or_else(|e| fail(&format!("Failed to read age: {}", e)))
                }),
                email: email.unwrap_or_else(|| prompt("Email address")),
                password: password.unwrap_or_else(|| {
                    Password::new()
                        .with_prompt("Password")
                        .with_confirmation("Confirm password", "Passwords don't match")
                        .interact()
                        .unwrap_or_else(|e| fail(&format!("Failed to read password: {}", e)))
                }),
            };
            let email = dto.email.clone();

            match admin::create_admin(&pool, dto).await {
                Ok(created) => {
                    println!("\n✅ Administrator created successfully!");
                    println!("   Email: {}", email);
                    println!("   User ID: {}", created.user_id);
                    println!("   Permission ID: {}", created.permission_id);
                }
                Err(e) => fail(&format!("Error creating administrator: {:#}", e)),
            }
        }
        Commands::Grant {
            email,
            modules,
            actions,
            level,
            description,
        } => match admin::grant(&pool, &email, modules, actions, level, description).await {
            Ok(permission) => {
                println!("\n✅ Permission granted to {}", email);
                println!("   Permission ID: {}", permission.id);
                println!("   Modules: {}", permission.modules.join(", "));
                println!("   Actions: {}", permission.actions.join(", "));
            }
            Err(e) => fail(&format!("Error granting permission: {:#}", e)),
        },
    }
}
