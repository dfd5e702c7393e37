use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// One entry of the remote commands catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCommand {
    #[serde(alias = "name")]
    pub command: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Hexagonal port for the external commands catalog (HTTP API in production).
#[async_trait]
pub trait CommandsCatalog: Send + Sync {
    async fn list_commands(&self) -> Result<Vec<RemoteCommand>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_name_alias_and_missing_description() {
        let cmds: Vec<RemoteCommand> = serde_json::from_str(
            r#"[{"command":"price","description":"Цены"},{"name":"schedule"}]"#,
        )
        .unwrap();
        assert_eq!(cmds[0].description.as_deref(), Some("Цены"));
        assert_eq!(cmds[1].command, "schedule");
        assert_eq!(cmds[1].description, None);
    }
}
