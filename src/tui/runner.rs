use super::config::AppConfig;
use super::terminal::TerminalGuard;
use anyhow::Result;

pub async fn run(config: AppConfig) -> Result<()> {
    let mut terminal = TerminalGuard::new()?;
    super::ui::run(terminal.inner_mut(), config).await
}
