use tokio::sync::oneshot::Sender;

use super::data::{NetError, Request, Response};

/// Messages that can be sent to the networking actor.
#[derive(Debug)]
pub enum Message {
    /// Performs an HTTP request
    Send {
        req: Request,
        tx: Sender<Result<Response, NetError>>,
    },
}
