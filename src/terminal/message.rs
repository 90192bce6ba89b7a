use tokio::sync::oneshot::Sender;

#[derive(Debug)]
pub enum Message {
    TakeOver {
        tx: Sender<anyhow::Result<()>>,
    },
    Release {
        tx: Sender<anyhow::Result<()>>,
    },
    Draw {
        frame: String,
        tx: Sender<anyhow::Result<()>>,
    },
    Size {
        tx: Sender<anyhow::Result<(u16, u16)>>,
    },
}
