use system::Shape;
use tokio::sync::oneshot::Sender;

#[derive(Debug)]
pub enum AdminCommand {
    GetStatus {
        reply: Sender<BoardStatus>,
    },
    RemoveParticipant {
        name: String,
        reason: String,
        reply: Sender<bool>,
    },
    Shutdown {
        reply: Sender<()>,
    },
}

#[derive(Debug)]
pub struct BoardStatus {
    pub accepting: bool,
    pub participants: Vec<String>,
    pub shapes: Vec<Shape>,
}
