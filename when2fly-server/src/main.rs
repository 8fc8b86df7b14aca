use when2fly_common::db::create_db_thread_pool;
use when2fly_common::store::{MemoryStore, StorageBackend, Store};

use actix_web::web::Data;
use actix_web::{App, HttpServer};
use flexi_logger::{Age, Cleanup, Criterion, Duplicate, FileSpec, Logger, Naming, WriteMode};
use std::sync::Arc;

mod env;
mod handlers;
mod middleware;
mod services;

use middleware::CorsMiddleware;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let mut port = 3000u16;

    let mut args = std::env::args();

    // Eat the first argument, which is the relative path to the executable
    args.next();

    while let Some(arg) = args.next() {
        match arg.to_lowercase().as_str() {
            "--port" => {
                let port_str = {
                    let next_arg = args.next();

                    match next_arg {
                        Some(s) => s,
                        None => {
                            eprintln!("ERROR: --port option specified but no port was given");
                            std::process::exit(1);
                        }
                    }
                };

                port = match port_str.parse::<u16>() {
                    Ok(p) => p,
                    Err(_) => {
                        eprintln!("ERROR: Incorrect format for port. Integer expected");
                        std::process::exit(1);
                    }
                };

                continue;
            }
            a => {
                eprintln!("ERROR: Invalid argument: {}", &a);
                std::process::exit(1);
            }
        }
    }

    let base_addr = format!("{}:{}", env::CONF.bind_host, port);

    let _logger = Logger::try_with_str(&env::CONF.log_level)
        .expect("Invalid log level")
        .log_to_file(FileSpec::default().directory("./logs"))
        .rotate(
            Criterion::Age(Age::Day),
            Naming::Timestamps,
            Cleanup::KeepLogAndCompressedFiles(60, 365),
        )
        .cleanup_in_background_thread(true)
        .duplicate_to_stdout(Duplicate::All)
        .write_mode(WriteMode::Async)
        .format(|writer, now, record| {
            write!(
                writer,
                "{:5} | {} | {}:{} | {}",
                record.level(),
                now.format("%Y-%m-%dT%H:%M:%S%.6fZ"),
                record.module_path().unwrap_or("<unknown>"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .use_utc()
        .start()
        .expect("Failed to start logger");

    let actix_workers = env::CONF.actix_worker_count;

    let (store, db_thread_pool) = match env::CONF.storage {
        StorageBackend::Postgres => {
            let Some(db_conf) = env::CONF.db.as_ref() else {
                eprintln!("ERROR: Database configuration is missing");
                std::process::exit(1);
            };

            log::info!("Connecting to database...");

            // Each actix worker may hold a connection while a request is in flight
            let db_max_connections = env::CONF.db_max_connections.max(actix_workers as u32);

            let db_thread_pool = match create_db_thread_pool(
                &db_conf.database_uri(),
                db_max_connections,
                env::CONF.db_idle_timeout,
            ) {
                Ok(p) => p,
                Err(e) => {
                    log::error!("Failed to connect to database: {e}");
                    eprintln!("ERROR: Failed to connect to database");
                    std::process::exit(1);
                }
            };

            log::info!("Successfully connected to database");

            (Store::postgres(&db_thread_pool), Some(db_thread_pool))
        }
        StorageBackend::Memory => {
            log::warn!("Using in-memory storage. Data will be lost when the server stops.");
            (Store::in_memory(Arc::new(MemoryStore::new())), None)
        }
    };

    log::info!(
        "Starting server on {} with {} workers ({} storage)",
        base_addr,
        actix_workers,
        store.backend.name(),
    );

    HttpServer::new(move || {
        let mut app = App::new().app_data(Data::new(store.clone()));

        if let Some(pool) = &db_thread_pool {
            app = app.app_data(Data::new(pool.clone()));
        }

        app.configure(services::api::configure)
            .wrap(CorsMiddleware::default())
            .wrap(actix_web::middleware::Logger::default())
    })
    .workers(actix_workers)
    .bind(base_addr)?
    .run()
    .await?;

    Ok(())
}
