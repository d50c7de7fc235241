//! Seed the database with sample meals and demo accounts.
//!
//! Inserts a small catalog of meals for the current month and, unless
//! disabled, a demo user and an admin user, each with a printed API token
//! for manual testing.
//!
//! # Environment Variables
//!
//! - `MEALBRIDGE_DATABASE_URL` - `PostgreSQL` connection string

use chrono::{Datelike, NaiveDate, Utc};
use rand::{Rng, distr::Alphanumeric};
use rust_decimal::Decimal;
use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};

use mealbridge_core::{Email, EmailError};
use mealbridge_server::db::{MealRepository, RepositoryError, UserRepository, meals::CreateMeal};

const TOKEN_LENGTH: usize = 40;
const ADMIN_EMAIL: &str = "admin@mealbridge.test";

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository operation error.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// The demo email flag is not a valid email address.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// Seed sample meals and optionally demo accounts with API tokens.
pub async fn run(create_demo_user: bool, email: &str) -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("MEALBRIDGE_DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| SeedError::MissingEnvVar("MEALBRIDGE_DATABASE_URL"))?;

    info!("Connecting to database...");
    let pool = mealbridge_server::db::create_pool(&database_url).await?;

    seed_meals(&pool).await?;

    if create_demo_user {
        seed_account(&pool, email, false).await?;
        seed_account(&pool, ADMIN_EMAIL, true).await?;
    }

    info!("Seeding complete!");
    Ok(())
}

async fn seed_meals(pool: &PgPool) -> Result<(), SeedError> {
    let meals = MealRepository::new(pool);
    let month = current_month_start();

    for params in sample_meals(month) {
        let name = params.name.clone();
        let meal = meals.create(params).await?;
        info!(id = %meal.id, price = %meal.price, "Created meal: {name}");
    }

    Ok(())
}

async fn seed_account(pool: &PgPool, email: &str, is_admin: bool) -> Result<(), SeedError> {
    let email = Email::parse(email)?;
    let users = UserRepository::new(pool);
    let label = if is_admin { "admin" } else { "demo" };

    let user = match users.create(&email, is_admin).await {
        Ok(user) => user,
        Err(RepositoryError::Conflict(_)) => {
            warn!("{label} user {email} already exists, skipping");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let token: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect();

    sqlx::query("INSERT INTO api_tokens (token, user_id) VALUES ($1, $2)")
        .bind(&token)
        .bind(user.id)
        .execute(pool)
        .await?;

    info!(id = %user.id, "Created {label} user: {email}");
    info!("API token (send as 'Authorization: Bearer <token>'): {token}");

    Ok(())
}

fn current_month_start() -> NaiveDate {
    let today = Utc::now().date_naive();
    NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today)
}

fn sample_meals(month: NaiveDate) -> Vec<CreateMeal> {
    vec![
        CreateMeal {
            name: "Chicken Tikka Masala".to_owned(),
            description: Some(
                "Tender chicken in a spiced tomato cream sauce with basmati rice".to_owned(),
            ),
            price: Decimal::new(1299, 2),
            image_url: None,
            available_month: month,
            category: Some("indian".to_owned()),
        },
        CreateMeal {
            name: "Margherita Pizza".to_owned(),
            description: Some("Wood-fired pizza with fresh mozzarella and basil".to_owned()),
            price: Decimal::new(1099, 2),
            image_url: None,
            available_month: month,
            category: Some("italian".to_owned()),
        },
        CreateMeal {
            name: "Beef Pho".to_owned(),
            description: Some("Rice noodles in slow-simmered beef broth with herbs".to_owned()),
            price: Decimal::new(1349, 2),
            image_url: None,
            available_month: month,
            category: Some("vietnamese".to_owned()),
        },
        CreateMeal {
            name: "Garden Salad Bowl".to_owned(),
            description: Some("Mixed greens, roasted vegetables, and lemon vinaigrette".to_owned()),
            price: Decimal::new(899, 2),
            image_url: None,
            available_month: month,
            category: Some("vegetarian".to_owned()),
        },
        CreateMeal {
            name: "Pulled Pork Sandwich".to_owned(),
            description: Some("Smoked pork shoulder with slaw on a brioche bun".to_owned()),
            price: Decimal::new(1149, 2),
            image_url: None,
            available_month: month,
            category: Some("american".to_owned()),
        },
    ]
}
