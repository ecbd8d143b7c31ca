use crate::cli::actions::Action;
use crate::registro;
use anyhow::Result;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server { port, dsn } => registro::new(port, dsn).await,
    }
}
