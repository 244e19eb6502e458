use actix_web::{App, HttpServer};

use server::handlers;
use server::liveness::{spawn_liveness_monitor, LIVENESS_INTERVAL};
use server::server::spawn_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let bind = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:8080".to_owned());

    let srv_tx = spawn_server();
    spawn_liveness_monitor(srv_tx.clone(), LIVENESS_INTERVAL);

    log::info!("whiteboard server listening on {}", bind);
    HttpServer::new(move || App::new().data(srv_tx.clone()).configure(handlers::root))
        .bind(&bind)?
        .run()
        .await
}
