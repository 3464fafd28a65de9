#![allow(dead_code)]

use actix_web::{get, web, App, HttpRequest, HttpResponse, HttpServer, Responder};
use pharmalink::configuration::{get_configuration, DatabaseSettings, Settings};
use pharmalink::forms;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::net::TcpListener;

pub const ALICE_TOKEN: &str = "alice-token";
pub const BOB_TOKEN: &str = "bob-token";
pub const CAROL_TOKEN: &str = "carol-token";

pub const ALICE_ID: i32 = 1;
pub const BOB_ID: i32 = 2;
pub const CAROL_ID: i32 = 3;

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
}

fn account_for_token(token: &str) -> Option<forms::AccountForm> {
    let account = match token {
        ALICE_TOKEN => forms::AccountForm {
            user_id: ALICE_ID,
            first_name: "Alice".into(),
            last_name: "Reyes".into(),
            role: "Staff".into(),
            branch_id: 1,
        },
        BOB_TOKEN => forms::AccountForm {
            user_id: BOB_ID,
            first_name: "Bob".into(),
            last_name: "Tan".into(),
            role: "Staff".into(),
            branch_id: 2,
        },
        CAROL_TOKEN => forms::AccountForm {
            user_id: CAROL_ID,
            first_name: "Carol".into(),
            last_name: "Lim".into(),
            role: "Admin".into(),
            branch_id: 1,
        },
        _ => return None,
    };
    Some(account)
}

#[get("")]
async fn mock_auth(req: HttpRequest) -> actix_web::Result<impl Responder> {
    let token = req
        .headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .unwrap_or("");

    match account_for_token(token) {
        Some(account) => Ok(HttpResponse::Ok().json(account)),
        None => Ok(HttpResponse::Unauthorized().finish()),
    }
}

async fn mock_auth_server(listener: TcpListener) -> actix_web::dev::Server {
    HttpServer::new(|| App::new().service(web::scope("/me").service(mock_auth)))
        .listen(listener)
        .unwrap()
        .run()
}

async fn start_mock_auth(configuration: &mut Settings) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind port for mock auth");
    configuration.auth_url = format!("http://127.0.0.1:{}/me", listener.local_addr().unwrap().port());

    let server = mock_auth_server(listener).await;
    let _ = tokio::spawn(server);
}

pub async fn configure_database(config: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    let mut connection = PgConnection::connect(&config.connection_string_without_db()).await?;

    connection
        .execute(format!(r#"CREATE DATABASE "{}""#, config.database_name).as_str())
        .await?;

    let connection_pool = PgPool::connect(&config.connection_string()).await?;

    sqlx::migrate!("./migrations").run(&connection_pool).await?;

    seed_reference_data(&connection_pool).await?;

    Ok(connection_pool)
}

async fn seed_reference_data(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO branch (id, name) VALUES
            (1, 'Main Branch'),
            (2, 'North Branch')
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO account (id, first_name, last_name, role, branch_id) VALUES
            (1, 'Alice', 'Reyes', 'Staff', 1),
            (2, 'Bob', 'Tan', 'Staff', 2),
            (3, 'Carol', 'Lim', 'Admin', 1)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Spawns the service against a fresh, migrated, seeded database. Returns
/// None (skipping the test) when postgres is not reachable.
pub async fn spawn_app() -> Option<TestApp> {
    spawn_app_with(|_| {}).await
}

/// Like `spawn_app`, with a hook to override settings before startup.
pub async fn spawn_app_with(customize: impl FnOnce(&mut Settings)) -> Option<TestApp> {
    let mut configuration = get_configuration().expect("Failed to get configuration");
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();
    customize(&mut configuration);

    start_mock_auth(&mut configuration).await;

    let connection_pool = match configure_database(&configuration.database).await {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("Skipping test: failed to connect to postgres: {}", err);
            return None;
        }
    };

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let server = pharmalink::startup::run(listener, connection_pool.clone(), configuration)
        .await
        .expect("Failed to bind address.");
    let _ = tokio::spawn(server);

    Some(TestApp {
        address,
        db_pool: connection_pool,
    })
}

/// Spawns the service with a lazy pool so tests that never touch storage
/// (health check, authentication rejections) run without postgres.
pub async fn spawn_app_without_db() -> TestApp {
    let mut configuration = get_configuration().expect("Failed to get configuration");

    start_mock_auth(&mut configuration).await;

    let connect_options = PgConnectOptions::new()
        .host(&configuration.database.host)
        .port(configuration.database.port)
        .username(&configuration.database.username)
        .password(&configuration.database.password)
        .database(&configuration.database.database_name)
        .ssl_mode(PgSslMode::Disable);
    let connection_pool = PgPoolOptions::new().connect_lazy_with(connect_options);

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let server = pharmalink::startup::run(listener, connection_pool.clone(), configuration)
        .await
        .expect("Failed to bind address.");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        db_pool: connection_pool,
    }
}
