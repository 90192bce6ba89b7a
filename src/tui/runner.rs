use std::{any::Any, collections::HashMap, time::Duration};

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use super::{
    command::{Operation, Slot},
    message::{Message, OpId, Outcome, Payload, Stage},
};
use crate::{
    api::LinkApi,
    error::{ErrorKind, OpError},
    log::Log,
    scraper::Scraper,
};

#[cfg(test)]
mod tests;

const SCOPE: &str = "runner";

/// Bookkeeping for a live background operation
#[derive(Debug, Clone)]
pub struct AsyncOperation {
    pub id: OpId,
    pub slot: Slot,
    pub cancel: CancellationToken,
    pub stage: Stage,
    pub text: String,
}

/// Executes `RunAsync` commands on tokio tasks.
///
/// Every started operation reports back through `tx`: zero or more
/// [`Message::AsyncProgress`] followed by exactly one
/// [`Message::AsyncResult`]. The runner owns the API and scraper clients;
/// flows only ever describe the work.
#[derive(Debug)]
pub struct Runner {
    api: LinkApi,
    scraper: Scraper,
    log: Log,
    tx: UnboundedSender<Message>,
    live: HashMap<OpId, AsyncOperation>,
    slots: HashMap<Slot, OpId>,
}

impl Runner {
    pub fn new(api: LinkApi, scraper: Scraper, log: Log, tx: UnboundedSender<Message>) -> Self {
        Self {
            api,
            scraper,
            log,
            tx,
            live: HashMap::new(),
            slots: HashMap::new(),
        }
    }

    /// Starts `operation`, cancelling whatever was live in the same slot.
    pub fn start(&mut self, id: OpId, slot: Slot, operation: Operation, timeout: Duration) {
        if let Some(prev) = self.slots.insert(slot, id) {
            if prev != id {
                self.log
                    .info(SCOPE, format!("operation {id} supersedes {prev} in {slot:?}"));
                self.cancel(prev);
            }
        }
        let token = CancellationToken::new();
        self.live.insert(
            id,
            AsyncOperation {
                id,
                slot,
                cancel: token.clone(),
                stage: Stage::Idle,
                text: String::new(),
            },
        );
        self.log.info(
            SCOPE,
            format!("starting {} ({id}, timeout {}s)", operation.name(), timeout.as_secs()),
        );
        let ctx = OpContext {
            api: self.api.clone(),
            scraper: self.scraper.clone(),
            log: self.log.clone(),
            tx: self.tx.clone(),
        };
        tokio::spawn(supervise(ctx, id, operation, timeout, token));
    }

    /// Cancels a live operation. Unknown, finished or already cancelled ids
    /// are ignored. Returns whether anything was cancelled.
    pub fn cancel(&mut self, id: OpId) -> bool {
        let Some(op) = self.live.remove(&id) else {
            return false;
        };
        op.cancel.cancel();
        if self.slots.get(&op.slot) == Some(&id) {
            self.slots.remove(&op.slot);
        }
        self.log.info(SCOPE, format!("cancelled operation {id}"));
        true
    }

    pub fn cancel_all(&mut self) {
        let ids: Vec<_> = self.live.keys().copied().collect();
        for id in ids {
            self.cancel(id);
        }
    }

    /// Records progress of a live operation. Returns `false` when the
    /// operation is no longer live.
    pub fn record_progress(&mut self, id: OpId, stage: Stage, text: &str) -> bool {
        match self.live.get_mut(&id) {
            Some(op) => {
                op.stage = stage;
                op.text = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Retires an operation once its result arrived.
    pub fn finish(&mut self, id: OpId, outcome: &Outcome) -> Option<AsyncOperation> {
        let mut op = self.live.remove(&id)?;
        if self.slots.get(&op.slot) == Some(&id) {
            self.slots.remove(&op.slot);
        }
        op.stage = match outcome {
            Outcome::Ok(_) => Stage::Done,
            Outcome::Err(_) => Stage::Failed,
            Outcome::Cancelled => Stage::Cancelled,
        };
        Some(op)
    }

    pub fn get(&self, id: OpId) -> Option<&AsyncOperation> {
        self.live.get(&id)
    }

    pub fn is_live(&self, id: OpId) -> bool {
        self.live.contains_key(&id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// The live operation holding `slot`
    pub fn in_slot(&self, slot: Slot) -> Option<OpId> {
        self.slots.get(&slot).copied()
    }
}

/// What a running operation needs, detached from the runner
#[derive(Debug, Clone)]
struct OpContext {
    api: LinkApi,
    scraper: Scraper,
    log: Log,
    tx: UnboundedSender<Message>,
}

/// Runs the work on an inner task and turns every way it can end into a
/// single `AsyncResult`.
async fn supervise(
    ctx: OpContext,
    id: OpId,
    operation: Operation,
    timeout: Duration,
    token: CancellationToken,
) {
    let work = tokio::spawn(run(ctx.clone(), id, operation, timeout, token.clone()));
    let abort = work.abort_handle();

    let outcome = tokio::select! {
        biased;
        _ = token.cancelled() => {
            abort.abort();
            Outcome::Cancelled
        }
        res = tokio::time::timeout(timeout, work) => match res {
            Err(_) => {
                token.cancel();
                abort.abort();
                Outcome::Err(OpError::timeout(format!(
                    "operation timed out after {}s",
                    timeout.as_secs()
                )))
            }
            Ok(Err(join)) if join.is_panic() => Outcome::Err(
                OpError::invalid_response("operation crashed")
                    .with_cause(panic_message(join.into_panic())),
            ),
            Ok(Err(_)) => Outcome::Cancelled,
            Ok(Ok(Err(e))) if e.kind == ErrorKind::Cancelled => Outcome::Cancelled,
            Ok(Ok(Err(e))) => Outcome::Err(e),
            Ok(Ok(Ok(payload))) => Outcome::Ok(payload),
        },
    };

    match &outcome {
        Outcome::Ok(_) => ctx.log.info(SCOPE, format!("operation {id} completed")),
        Outcome::Err(e) => ctx.log.warn(
            SCOPE,
            format!(
                "operation {id} failed: {e}{}",
                e.cause
                    .as_ref()
                    .map(|c| format!(" ({c})"))
                    .unwrap_or_default()
            ),
        ),
        Outcome::Cancelled => ctx.log.info(SCOPE, format!("operation {id} cancelled")),
    }
    let _ = ctx.tx.send(Message::AsyncResult { op: id, outcome });
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Sends progress unless the operation was cancelled in the meantime.
fn progress(ctx: &OpContext, token: &CancellationToken, id: OpId, stage: Stage, text: &str) {
    if !token.is_cancelled() {
        let _ = ctx.tx.send(Message::AsyncProgress {
            op: id,
            stage,
            text: text.to_string(),
        });
    }
}

async fn run(
    ctx: OpContext,
    id: OpId,
    operation: Operation,
    timeout: Duration,
    token: CancellationToken,
) -> Result<Payload, OpError> {
    match operation {
        Operation::ListLinks => Ok(Payload::Links(ctx.api.list_links().await?)),
        Operation::CreateLink(link) => Ok(Payload::Link(ctx.api.create_link(&link).await?)),
        Operation::Scrape { url } => {
            let started = tokio::time::Instant::now();
            let result = ctx
                .scraper
                .scrape_with_progress(&url, timeout.as_secs(), &token, |stage, text| {
                    progress(&ctx, &token, id, stage.into(), text)
                })
                .await?;
            Ok(Payload::Scraped {
                result,
                elapsed: started.elapsed(),
            })
        }
        Operation::EnrichLink { id: link, options } => {
            progress(&ctx, &token, id, Stage::Fetching, "Scraping and updating link...");
            let enriched = ctx.api.enrich_link(link, &options).await?;
            progress(&ctx, &token, id, Stage::Done, "Link enriched");
            Ok(Payload::Link(enriched))
        }
        Operation::DeleteLink(link) => {
            ctx.api.delete_link(link).await?;
            Ok(Payload::Deleted(link))
        }
    }
}
