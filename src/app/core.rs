use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use tokio::{
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
    time::MissedTickBehavior,
};
use tokio_util::sync::CancellationToken;

use crate::{
    ArcPath, ArcStr,
    api::{
        LinkApi,
        links::{LinkCreate, ScrapeOptions},
    },
    config::{Config, Key, PathOpt, StrOpt, USizeOpt},
    error::OpError,
    fs::Fs,
    home_dir,
    log::Log,
    net::Net,
    scraper::Scraper,
    terminal::{InputReader, Terminal},
    tui::{Message, Runner, Runtime, Settings, render},
};

const SCOPE: &str = "app";
const TICK_INTERVAL: Duration = Duration::from_millis(250);
/// Time the one-shot scrape waits beyond the deadline handed to the service
const SCRAPE_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub struct Core {
    config: Config,
    config_path: ArcPath,
    log: Log,
    api: LinkApi,
    scraper: Scraper,
    settings: Settings,
}

fn default_config_path() -> Result<ArcPath> {
    let path = home_dir()?
        .join(".config")
        .join("linkmgmt")
        .join("config.toml");
    Ok(ArcPath::from(path.as_path()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Core {
    pub async fn build(config_path: Option<ArcPath>) -> Result<Self> {
        let fs = Fs::spawn();
        let config_path = match config_path {
            Some(path) => path,
            None => default_config_path()?,
        };

        let config = Config::spawn(fs.clone(), config_path.clone());
        let loaded = config.load().await;
        if loaded.is_err() {
            config.save().await.with_context(|| {
                format!(
                    "Writing the default configuration to {}",
                    config_path.display()
                )
            })?;
        }
        let data = config.snapshot().await?;

        let log = Log::spawn(
            fs,
            data.log_level(),
            data.usize(USizeOpt::MaxAge),
            data.path(PathOpt::LogDir),
        )
        .await?;
        log.collect_garbage().await;
        if let Err(e) = loaded {
            log.warn(
                SCOPE,
                format!(
                    "could not load {}, wrote the defaults instead: {e:#}",
                    config_path.display()
                ),
            );
        }

        let request_timeout = data.seconds(USizeOpt::RequestTimeout);
        let net = Net::spawn(log.clone(), request_timeout)?;
        let api = LinkApi::new(
            net.clone(),
            &data.str(StrOpt::ApiBaseUrl),
            &data.str(StrOpt::ApiKey),
        );
        let scraper = Scraper::new(net, &data.str(StrOpt::ScraperBaseUrl));
        let settings = Settings {
            scrape_timeout: data.seconds(USizeOpt::ScrapeTimeout),
            request_timeout,
        };

        log.info(SCOPE, format!("initialized from {}", config_path.display()));
        Ok(Self::new(config, config_path, log, api, scraper, settings))
    }

    pub fn new(
        config: Config,
        config_path: ArcPath,
        log: Log,
        api: LinkApi,
        scraper: Scraper,
        settings: Settings,
    ) -> Self {
        Self {
            config,
            config_path,
            log,
            api,
            scraper,
            settings,
        }
    }

    pub fn log(&self) -> Log {
        self.log.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fails unless the values needed to talk to the link API are set.
    async fn require_api(&self) -> Result<()> {
        self.config
            .validate()
            .await
            .with_context(|| format!("Invalid configuration in {}", self.config_path.display()))
    }

    /// Logs the technical details of `err` and keeps the user-facing message.
    fn fail(&self, what: &str, err: OpError) -> anyhow::Error {
        let cause = err
            .cause
            .as_deref()
            .map(|c| format!(" ({c})"))
            .unwrap_or_default();
        self.log.error(SCOPE, format!("{what} failed: {err}{cause}"));
        anyhow::anyhow!("{}", err.user_message())
    }

    pub async fn links(&self) -> Result<String> {
        self.require_api().await?;
        let links = self
            .api
            .list_links()
            .await
            .map_err(|e| self.fail("listing links", e.into()))?;
        if links.is_empty() {
            return Ok("No links yet.".to_string());
        }

        let mut lines = vec![format!("Links ({}):", links.len())];
        for (i, link) in links.iter().enumerate() {
            lines.push(String::new());
            let title = link.title.as_deref().unwrap_or(link.url.as_str());
            lines.push(format!("{}. {title}", i + 1));
            lines.push(format!("   URL: {}", link.url));
            lines.push(format!("   ID: {}", link.id));
            lines.push(format!(
                "   Created: {}",
                link.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
            if let Some(description) = &link.description {
                lines.push(format!("   Description: {description}"));
            }
        }
        Ok(lines.join("\n"))
    }

    pub async fn health(&self) -> Result<String> {
        let base = self.config.str(StrOpt::ScraperBaseUrl).await?;
        self.scraper
            .check_health(&CancellationToken::new())
            .await
            .map_err(|e| self.fail("health check", e))?;
        Ok(format!("Scraper service at {base} is healthy"))
    }

    pub async fn scrape(&self, url: &str) -> Result<String> {
        let token = CancellationToken::new();
        let deadline = self.settings.scrape_timeout;
        let scrape = self.scraper.scrape_with_progress(
            url.trim(),
            deadline.as_secs(),
            &token,
            |stage, text| {
                self.log.info(SCOPE, format!("scrape {}: {text}", stage.as_str()));
                eprintln!("{text}");
            },
        );
        let result = match tokio::time::timeout(deadline + SCRAPE_GRACE, scrape).await {
            Ok(result) => result,
            Err(_) => {
                token.cancel();
                Err(OpError::timeout(format!(
                    "scrape timed out after {}s",
                    deadline.as_secs()
                )))
            }
        }
        .map_err(|e| self.fail("scraping", e))?;

        let mut lines = vec![
            render::field("Title", Some(result.title.as_str()).filter(|t| !t.is_empty())),
            render::field("URL", Some(result.url.as_str())),
        ];
        if let Some(at) = &result.extracted_at {
            lines.push(render::field("Extracted at", Some(at.as_str())));
        }
        lines.push(String::new());
        lines.push(result.text);
        Ok(lines.join("\n"))
    }

    pub async fn add(
        &self,
        url: String,
        title: Option<String>,
        description: Option<String>,
        server_scrape: bool,
    ) -> Result<String> {
        self.require_api().await?;
        let url = url.trim().to_string();
        reqwest::Url::parse(&url).with_context(|| format!("Invalid URL {url:?}"))?;

        let link = LinkCreate {
            url,
            title: non_empty(title),
            description: non_empty(description),
            text: None,
        };
        let created = if server_scrape {
            let options = ScrapeOptions {
                timeout_seconds: self.settings.scrape_timeout.as_secs(),
                ..ScrapeOptions::default()
            };
            self.api.create_link_with_scraping(&link, &options).await
        } else {
            self.api.create_link(&link).await
        }
        .map_err(|e| self.fail("creating link", e.into()))?;

        let lines = [
            "Link saved".to_string(),
            render::field("ID", Some(created.id.to_string().as_str())),
            render::field("URL", Some(created.url.as_str())),
            render::field("Title", created.title.as_deref()),
            render::field("Description", created.description.as_deref()),
        ];
        Ok(lines.join("\n"))
    }

    /// The configuration as TOML, with the API key masked.
    pub async fn show_config(&self) -> Result<String> {
        let mut data = self.config.snapshot().await?;
        if !data.str(StrOpt::ApiKey).is_empty() {
            data.set_str(StrOpt::ApiKey, "********");
        }
        let body = toml::to_string_pretty(&data).context("Serializing the configuration")?;
        Ok(format!("# {}\n{body}", self.config_path.display()))
    }

    /// Changes one configuration value, writes the file and reports the
    /// resulting configuration.
    pub async fn set_config(&self, key: &str, value: &str) -> Result<String> {
        let key: Key = key.parse()?;
        let value = value.trim();
        match key {
            Key::Str(opt) => {
                if opt != StrOpt::ApiKey && !value.is_empty() {
                    reqwest::Url::parse(value)
                        .with_context(|| format!("{key} must be a URL, got {value:?}"))?;
                }
                self.config.set_str(opt, ArcStr::from(value)).await?;
            }
            Key::USize(opt) => {
                let number = value
                    .parse::<usize>()
                    .with_context(|| format!("{key} must be a whole number, got {value:?}"))?;
                self.config.set_usize(opt, number).await?;
            }
            Key::Path(opt) => {
                self.config
                    .set_path(opt, ArcPath::from(Path::new(value)))
                    .await?;
            }
            Key::LogLevel => self.config.set_log_level(value.parse()?).await?,
        }
        self.config
            .save()
            .await
            .with_context(|| format!("Writing {}", self.config_path.display()))?;
        self.log.info(
            SCOPE,
            format!("set {key} in {}", self.config_path.display()),
        );
        self.show_config().await
    }

    pub async fn run_tui(&self, terminal: Terminal) -> Result<()> {
        self.require_api().await?;
        let (tx, rx) = unbounded_channel();

        terminal.take_over().await?;
        let input = InputReader::spawn(tx.clone(), self.log.clone());
        let result = self.drive(&terminal, tx, rx).await;
        input.stop();
        let released = terminal.release().await;

        if let Err(e) = &result {
            self.log.error(SCOPE, format!("interface stopped: {e:#}"));
        }
        result.and(released)
    }

    /// The event loop: one message at a time, one frame after each.
    pub async fn drive(
        &self,
        terminal: &Terminal,
        tx: UnboundedSender<Message>,
        mut rx: UnboundedReceiver<Message>,
    ) -> Result<()> {
        let runner = Runner::new(
            self.api.clone(),
            self.scraper.clone(),
            self.log.clone(),
            tx,
        );
        let mut runtime = Runtime::new(runner, self.settings, self.log.clone());

        let (width, height) = terminal.size().await?;
        runtime.update(Message::Resize { width, height });
        let init = runtime.init();
        runtime.execute(init);

        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while !runtime.should_quit() {
            terminal.draw(runtime.render()).await?;
            let msg = tokio::select! {
                msg = rx.recv() => match msg {
                    Some(msg) => msg,
                    None => break,
                },
                _ = ticker.tick() => Message::Tick,
            };
            runtime.update(msg);
        }

        self.log.info(SCOPE, "interface closed");
        Ok(())
    }
}
