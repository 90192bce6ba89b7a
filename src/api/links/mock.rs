use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::data::{ApiError, Link, LinkCreate, LinkId, LinkUpdate, ScrapeOptions};

/// Operations of the link API, used to inject failures and inspect calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    List,
    Get,
    Create,
    CreateWithScraping,
    Update,
    Enrich,
    Delete,
}

#[derive(Debug, Default)]
struct State {
    links: Vec<Link>,
    failures: HashMap<MockOp, ApiError>,
    calls: Vec<MockOp>,
    delay: Option<Duration>,
}

/// In-memory link store standing in for the HTTP API.
///
/// Injected failures stay in place until cleared. Enrichment fills empty
/// titles and texts with values derived from the URL.
#[derive(Debug, Clone, Default)]
pub struct Mock {
    state: Arc<Mutex<State>>,
}

fn not_found(id: LinkId) -> ApiError {
    ApiError::Status {
        status: 404,
        message: format!("link {id} not found"),
    }
}

impl Mock {
    pub fn new(links: Vec<Link>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                links,
                ..State::default()
            })),
        }
    }

    pub async fn fail(&self, op: MockOp, err: ApiError) {
        self.state.lock().await.failures.insert(op, err);
    }

    pub async fn clear_failure(&self, op: MockOp) {
        self.state.lock().await.failures.remove(&op);
    }

    pub async fn set_delay(&self, delay: Option<Duration>) {
        self.state.lock().await.delay = delay;
    }

    pub async fn calls(&self) -> Vec<MockOp> {
        self.state.lock().await.calls.clone()
    }

    pub async fn links(&self) -> Vec<Link> {
        self.state.lock().await.links.clone()
    }

    /// Records the call, waits for the configured delay and reports an
    /// injected failure if there is one.
    async fn enter(&self, op: MockOp) -> Result<(), ApiError> {
        let delay = {
            let mut state = self.state.lock().await;
            state.calls.push(op);
            state.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.state.lock().await.failures.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    pub async fn list_links(&self) -> Result<Vec<Link>, ApiError> {
        self.enter(MockOp::List).await?;
        Ok(self.state.lock().await.links.clone())
    }

    pub async fn get_link(&self, id: LinkId) -> Result<Link, ApiError> {
        self.enter(MockOp::Get).await?;
        let state = self.state.lock().await;
        state
            .links
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn insert(&self, link: &LinkCreate, scrape: bool) -> Link {
        let now = Utc::now();
        let mut stored = Link {
            id: Uuid::new_v4(),
            user_id: None,
            url: link.url.clone(),
            title: link.title.clone(),
            description: link.description.clone(),
            text: link.text.clone(),
            created_at: now,
            updated_at: now,
        };
        if scrape {
            fill_empty(&mut stored);
        }
        self.state.lock().await.links.push(stored.clone());
        stored
    }

    pub async fn create_link(&self, link: &LinkCreate) -> Result<Link, ApiError> {
        self.enter(MockOp::Create).await?;
        Ok(self.insert(link, false).await)
    }

    pub async fn create_link_with_scraping(
        &self,
        link: &LinkCreate,
        options: &ScrapeOptions,
    ) -> Result<Link, ApiError> {
        self.enter(MockOp::CreateWithScraping).await?;
        Ok(self.insert(link, options.enabled).await)
    }

    pub async fn update_link(&self, id: LinkId, update: &LinkUpdate) -> Result<Link, ApiError> {
        self.enter(MockOp::Update).await?;
        let mut state = self.state.lock().await;
        let link = state
            .links
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| not_found(id))?;
        if let Some(url) = &update.url {
            link.url = url.clone();
        }
        if update.title.is_some() {
            link.title = update.title.clone();
        }
        if update.description.is_some() {
            link.description = update.description.clone();
        }
        if update.text.is_some() {
            link.text = update.text.clone();
        }
        link.updated_at = Utc::now();
        Ok(link.clone())
    }

    pub async fn enrich_link(&self, id: LinkId, options: &ScrapeOptions) -> Result<Link, ApiError> {
        self.enter(MockOp::Enrich).await?;
        let mut state = self.state.lock().await;
        let link = state
            .links
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| not_found(id))?;
        if options.enabled {
            if !options.only_fill_empty {
                link.title = None;
                link.text = None;
            }
            fill_empty(link);
            link.updated_at = Utc::now();
        }
        Ok(link.clone())
    }

    pub async fn delete_link(&self, id: LinkId) -> Result<(), ApiError> {
        self.enter(MockOp::Delete).await?;
        let mut state = self.state.lock().await;
        let before = state.links.len();
        state.links.retain(|l| l.id != id);
        if state.links.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn fill_empty(link: &mut Link) {
    let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
    if blank(&link.title) {
        link.title = Some(format!("Title of {}", link.url));
    }
    if blank(&link.text) {
        link.text = Some(format!("Content of {}", link.url));
    }
}
