use std::time::{Duration, Instant};

use actix::{Actor, ActorContext, Addr, AsyncContext, Handler, Message, Running, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use actix_web_actors::ws::{CloseCode, CloseReason};
use tokio::sync::mpsc;

use system::{
    bincode, BoardCommand, BoardError, BoardEvent, BoardReply, BoardSnapshot, CommandId,
    IdentifiableCommand, IdentifiableEvent,
};

use crate::participant::{self, ParticipantHandle};
use crate::server::ServerTx;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
const INGRESS_BUFFER: usize = 32;

#[derive(Message)]
#[rtype(result = "()")]
struct Egress(IdentifiableEvent);

#[derive(Message)]
#[rtype(result = "()")]
struct CloseConnection;

struct ConnectionActor {
    srv_tx: ServerTx,
    driver_tx: Option<mpsc::Sender<IdentifiableCommand>>,
    hb: Instant,
}

impl ConnectionActor {
    fn new(srv_tx: ServerTx) -> Self {
        Self {
            srv_tx,
            driver_tx: None,
            hb: Instant::now(),
        }
    }

    /// Transport-level liveness: a silent peer is dropped after
    /// `CLIENT_TIMEOUT`, which in turn closes the driver and leaves the
    /// board cleanly.
    fn heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                log::info!("websocket client timed out, dropping connection");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for ConnectionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.heartbeat(ctx);

        let (driver_tx, driver_rx) = mpsc::channel(INGRESS_BUFFER);
        self.driver_tx = Some(driver_tx);
        tokio::spawn(run_session(self.srv_tx.clone(), driver_rx, ctx.address()));
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        // closing the ingress channel makes the driver leave the board
        self.driver_tx = None;
        Running::Stop
    }
}

/// Ingress
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Binary(bin)) => {
                self.hb = Instant::now();
                match bincode::deserialize::<IdentifiableCommand>(&bin) {
                    Ok(command) => {
                        log::debug!("ingress {:?}", command);
                        let accepted = match self.driver_tx.as_mut() {
                            Some(tx) => tx.try_send(command).is_ok(),
                            None => false,
                        };
                        if !accepted {
                            log::warn!("ingress buffer overrun, closing connection");
                            ctx.close(Some(CloseReason {
                                code: CloseCode::Again,
                                description: None,
                            }));
                            ctx.stop();
                        }
                    }
                    Err(_) => {
                        ctx.close(Some(CloseReason {
                            code: CloseCode::Invalid,
                            description: None,
                        }));
                        ctx.stop();
                    }
                }
            }
            Ok(ws::Message::Close(_)) => ctx.stop(),
            Err(_) => ctx.stop(),
            _ => (),
        }
    }
}

/// Egress
impl Handler<Egress> for ConnectionActor {
    type Result = ();

    fn handle(&mut self, msg: Egress, ctx: &mut ws::WebsocketContext<Self>) -> Self::Result {
        log::debug!("egress {:?}", msg.0);
        match bincode::serialize(&msg.0) {
            Ok(bin) => ctx.binary(bin),
            Err(err) => log::error!("failed to encode egress frame: {}", err),
        }
    }
}

impl Handler<CloseConnection> for ConnectionActor {
    type Result = ();

    fn handle(&mut self, _: CloseConnection, ctx: &mut ws::WebsocketContext<Self>) -> Self::Result {
        ctx.close(None);
        ctx.stop();
    }
}

/// Per-connection driver. It owns the participant capability on behalf of
/// the remote client: wire commands are executed through the capability,
/// and pushed events flow back as frames. The websocket layer never
/// touches the coordinator directly.
async fn run_session(
    srv_tx: ServerTx,
    mut ingress: mpsc::Receiver<IdentifiableCommand>,
    addr: Addr<ConnectionActor>,
) {
    // a connection must introduce itself before anything else
    let (mut handle, mut events) = loop {
        let frame = match ingress.recv().await {
            Some(frame) => frame,
            None => return,
        };
        match frame.command {
            BoardCommand::Join { name } => match participant::join(&srv_tx, &name).await {
                Ok(joined) => {
                    reply(
                        &addr,
                        frame.command_id,
                        Ok(BoardReply::Joined(BoardSnapshot {
                            shapes: joined.shapes,
                            participants: joined.participants,
                        })),
                    );
                    break (joined.handle, joined.events);
                }
                // a refused join keeps the connection open for another attempt
                Err(err) => reply(&addr, frame.command_id, Err(err)),
            },
            _ => reply(&addr, frame.command_id, Err(BoardError::NotJoined)),
        }
    };

    loop {
        tokio::select! {
            frame = ingress.recv() => match frame {
                Some(frame) => {
                    let leaving = matches!(frame.command, BoardCommand::Leave);
                    let result = dispatch(&mut handle, frame.command).await;
                    reply(&addr, frame.command_id, result);
                    if leaving {
                        handle.leave().await;
                        addr.do_send(CloseConnection);
                        return;
                    }
                }
                None => {
                    // socket went away without a farewell
                    handle.leave().await;
                    return;
                }
            },
            event = events.recv() => match event {
                Some(event) => {
                    let kicked = matches!(event, BoardEvent::Kicked { .. });
                    addr.do_send(Egress(IdentifiableEvent::BySystem { event }));
                    if kicked {
                        addr.do_send(CloseConnection);
                        return;
                    }
                }
                None => {
                    // evicted, or the coordinator went down
                    addr.do_send(CloseConnection);
                    return;
                }
            },
        }
    }
}

async fn dispatch(
    handle: &mut ParticipantHandle,
    command: BoardCommand,
) -> Result<BoardReply, BoardError> {
    match command {
        // a live connection re-introducing itself is refused like any
        // other duplicate
        BoardCommand::Join { .. } => Err(BoardError::DuplicateName),
        BoardCommand::AppendShape(shape) => handle
            .append_shape(shape)
            .await
            .map(|()| BoardReply::ShapeAppended),
        BoardCommand::ClearCanvas => handle
            .clear_canvas()
            .await
            .map(|()| BoardReply::CanvasCleared),
        BoardCommand::GetSnapshot => handle.snapshot().await.map(BoardReply::Snapshot),
        BoardCommand::GetParticipants => handle
            .participant_names()
            .await
            .map(BoardReply::Participants),
        BoardCommand::RemoveParticipant { name, reason } => handle
            .remove_participant(&name, &reason)
            .await
            .map(|removed| BoardReply::ParticipantRemoved { removed }),
        BoardCommand::Leave => Ok(BoardReply::Left),
    }
}

fn reply(
    addr: &Addr<ConnectionActor>,
    command_id: CommandId,
    result: Result<BoardReply, BoardError>,
) {
    addr.do_send(Egress(IdentifiableEvent::ByMyself {
        command_id,
        result: result.into(),
    }));
}

pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    srv_tx: web::Data<ServerTx>,
) -> Result<HttpResponse, Error> {
    ws::start(ConnectionActor::new(srv_tx.get_ref().clone()), &req, stream)
}
