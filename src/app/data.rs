/// One-shot commands of the command line client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print every stored link
    Links,
    /// Check that the scraping service is up
    Health,
    /// Scrape a page and print what was extracted
    Scrape { url: String },
    /// Store a new link
    Add {
        url: String,
        title: Option<String>,
        description: Option<String>,
        /// Let the API scrape the page and fill the missing fields
        server_scrape: bool,
    },
    /// Print the effective configuration
    Config,
    /// Change one configuration value and save the file
    SetConfig { key: String, value: String },
}
