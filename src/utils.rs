use std::{path::Path, sync::Arc};

/// Cheaply clonable immutable string shared between actors
pub type ArcStr = Arc<str>;

/// Cheaply clonable immutable path shared between actors
pub type ArcPath = Arc<Path>;

/// Wraps the current panic hook with one that restores the terminal before
/// the panic message is printed, so a crash inside the TUI does not leave the
/// user's shell in raw mode on the alternate screen.
pub fn install_panic_hook() -> anyhow::Result<()> {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));
    Ok(())
}

/// Resolves the user's home directory from `$HOME`
pub fn home_dir() -> anyhow::Result<ArcPath> {
    let home = std::env::var_os("HOME").ok_or_else(|| anyhow::anyhow!("$HOME is not set"))?;
    Ok(ArcPath::from(Path::new(&home)))
}
