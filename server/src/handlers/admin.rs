use actix_web::error;
use actix_web::web;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::Result;
use askama_actix::Template;
use system::serde::Deserialize;
use system::serde_json;

use crate::admin::{AdminCommand, BoardStatus};
use crate::server::{ServerCommand, ServerTx};

#[derive(Template)]
#[template(path = "admin-status.html")]
pub struct AdminStatusTemplate {
    accepting: bool,
    participants: Vec<String>,
    shape_count: usize,
    snapshot_json: String,
}

pub fn configure_admin_handlers(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(web::resource("").route(web::get().to(status)))
            .service(
                web::resource("/participants/{name}/kick")
                    .route(web::post().to(kick_participant)),
            )
            .service(web::resource("/shutdown").route(web::post().to(shutdown))),
    );
}

pub async fn status(srv_tx: web::Data<ServerTx>) -> Result<impl Responder> {
    let (tx, rx) = tokio::sync::oneshot::channel::<BoardStatus>();

    srv_tx
        .get_ref()
        .clone()
        .send(ServerCommand::Admin(AdminCommand::GetStatus { reply: tx }))
        .await
        .map_err(|_| error::ErrorInternalServerError("Internal Server Error"))?;

    let status = rx
        .await
        .map_err(|_| error::ErrorInternalServerError("Receiver await error"))?;

    let snapshot_json =
        serde_json::to_string_pretty(&status.shapes).unwrap_or_else(|_| "[]".into());

    Ok(AdminStatusTemplate {
        accepting: status.accepting,
        participants: status.participants,
        shape_count: status.shapes.len(),
        snapshot_json,
    })
}

#[derive(Deserialize)]
pub struct KickParam {
    name: String,
}

pub async fn kick_participant(
    path: web::Path<KickParam>,
    srv_tx: web::Data<ServerTx>,
) -> Result<impl Responder> {
    let (tx, rx) = tokio::sync::oneshot::channel::<bool>();

    srv_tx
        .get_ref()
        .clone()
        .send(ServerCommand::Admin(AdminCommand::RemoveParticipant {
            name: path.name.clone(),
            reason: "removed by the host".to_owned(),
            reply: tx,
        }))
        .await
        .map_err(|_| error::ErrorInternalServerError("Internal Server Error"))?;

    let removed = rx
        .await
        .map_err(|_| error::ErrorInternalServerError("Receiver await error"))?;

    if removed {
        Ok(HttpResponse::Found().header("Location", "/admin").finish())
    } else {
        Err(error::ErrorNotFound("no such participant"))
    }
}

pub async fn shutdown(srv_tx: web::Data<ServerTx>) -> Result<impl Responder> {
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    srv_tx
        .get_ref()
        .clone()
        .send(ServerCommand::Admin(AdminCommand::Shutdown { reply: tx }))
        .await
        .map_err(|_| error::ErrorInternalServerError("Internal Server Error"))?;

    rx.await
        .map_err(|_| error::ErrorInternalServerError("Receiver await error"))?;

    Ok(HttpResponse::Found().header("Location", "/admin").finish())
}
