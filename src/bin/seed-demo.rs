//! Demo data seed script
//!
//! Wipes the database and seeds:
//! - 4 users sharing one password
//! - a follow graph where `ada` and every other user follow each other
//! - a few top-level posts per user plus replies
//! - likes and reposts so `/api/posts/hot` has a ranking
//!
//! Usage:
//!   DATABASE_URL=sqlite://social.db ./seed-demo --password Demo2024!

use anyhow::{Context, Result};
use clap::Parser;

use social_api::{
    db,
    models::post::Interaction,
    services::{password::hash_password_blocking, posts::PostService, users::UserService},
};

#[derive(Parser)]
#[command(name = "seed-demo", about = "Seed the social-api database with demo data")]
struct Args {
    /// Password for every demo account
    #[arg(long, default_value = "Demo2024!")]
    password: String,

    /// Top-level posts per demo user
    #[arg(long, default_value_t = 3)]
    posts_per_user: usize,
}

const DEMO_USERS: &[(&str, &str, &str)] = &[
    ("ada", "ada@demo.local", "Ada Lovelace"),
    ("grace", "grace@demo.local", "Grace Hopper"),
    ("linus", "linus@demo.local", "Linus Torvalds"),
    ("margaret", "margaret@demo.local", "Margaret Hamilton"),
];

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL required")?;

    let pool = db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    db::run_migrations(&pool).await?;

    tracing::info!("Cleaning existing data...");
    for table in ["follows", "reposts", "saves", "likes", "posts", "users"] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&pool)
            .await
            .with_context(|| format!("Failed to clear {table}"))?;
    }

    tracing::info!("Creating {} users...", DEMO_USERS.len());
    let password_hash = hash_password_blocking(args.password.clone()).await?;
    let mut user_ids = Vec::with_capacity(DEMO_USERS.len());
    for (username, email, name) in DEMO_USERS {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (username, email, name, password_hash, bio)
             VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id",
        )
        .bind(username)
        .bind(email)
        .bind(name)
        .bind(&password_hash)
        .bind(format!("Demo account for {name}"))
        .fetch_one(&pool)
        .await
        .with_context(|| format!("Failed to insert {username}"))?;
        user_ids.push(id);
    }

    let hub = user_ids[0];
    for &follower in &user_ids[1..] {
        UserService::toggle_follow(&pool, follower, hub).await?;
        UserService::toggle_follow(&pool, hub, follower).await?;
    }

    tracing::info!("Creating posts...");
    let mut post_ids = Vec::new();
    for (&author, (username, _, _)) in user_ids.iter().zip(DEMO_USERS) {
        for n in 1..=args.posts_per_user {
            let post = PostService::create(&pool, author, None, &format!("Post #{n} from {username}"))
                .await?;
            post_ids.push(post.id);
        }
    }

    // Everyone replies to the first post, and likes posts in a staggered
    // pattern so hot ranking is not flat.
    let Some(&first_post) = post_ids.first() else {
        tracing::info!("No posts requested; done");
        return Ok(());
    };
    for (&user, (username, _, _)) in user_ids.iter().zip(DEMO_USERS).skip(1) {
        PostService::create(&pool, user, Some(first_post), &format!("Reply from {username}")).await?;
    }
    for (i, &user) in user_ids.iter().enumerate() {
        for &post in post_ids.iter().step_by(i + 1) {
            PostService::toggle(&pool, Interaction::Like, user, post).await?;
        }
    }
    if let Some(&last_post) = post_ids.last() {
        PostService::toggle(&pool, Interaction::Repost, hub, last_post).await?;
    }

    tracing::info!(
        users = user_ids.len(),
        posts = post_ids.len(),
        "Demo data seeded; log in as ada@demo.local"
    );
    Ok(())
}
