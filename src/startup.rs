use crate::configuration::Settings;
use crate::helpers::JsonResponse;
use crate::middleware;
use crate::routes;
use actix_cors::Cors;
use actix_web::{dev::Server, web, App, HttpServer};
use sqlx::{Pool, Postgres};
use std::net::TcpListener;
use std::time::Duration;
use tracing_actix_web::TracingLogger;

pub async fn run(
    listener: TcpListener,
    pg_pool: Pool<Postgres>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let settings = web::Data::new(settings);
    let pg_pool = web::Data::new(pg_pool);

    let auth_http_client = reqwest::Client::builder()
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
    let auth_http_client = web::Data::new(auth_http_client);

    let account_cache = web::Data::new(middleware::authentication::AccountCache::new(
        Duration::from_secs(60),
    ));

    // malformed bodies, query strings and path ids all come back as the
    // same {success:false, error} envelope
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| JsonResponse::<()>::build().bad_request(&err.to_string()));
    let query_config = web::QueryConfig::default()
        .error_handler(|err, _req| JsonResponse::<()>::build().bad_request(&err.to_string()));
    let path_config = web::PathConfig::default()
        .error_handler(|err, _req| JsonResponse::<()>::build().bad_request(&err.to_string()));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .service(web::scope("/health_check").service(routes::health_check))
            .service(
                web::scope("/chat")
                    .wrap(middleware::authentication::Manager::new())
                    .service(routes::chat::conversations::list)
                    .service(routes::chat::conversations::create)
                    .service(routes::chat::messages::list)
                    .service(routes::chat::messages::send)
                    .service(routes::chat::messages::delete)
                    .service(routes::chat::users::list),
            )
            .service(
                web::scope("/notifications")
                    .wrap(middleware::authentication::Manager::new())
                    .service(routes::notifications::get::summary)
                    // read_all before {id}/read so the literal segment wins
                    .service(routes::notifications::mark::read_all)
                    .service(routes::notifications::mark::read_one)
                    .service(routes::notifications::get::list),
            )
            .app_data(json_config.clone())
            .app_data(query_config.clone())
            .app_data(path_config.clone())
            .app_data(pg_pool.clone())
            .app_data(auth_http_client.clone())
            .app_data(account_cache.clone())
            .app_data(settings.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
