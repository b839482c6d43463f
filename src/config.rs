use serde::{Deserialize, Serialize};

/// Page sizes requested per level.
///
/// The controller always requests page 0 and treats the result as "the first
/// N items"; these sizes are the N. Defaults match the service's web client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub project_page_size: u32,
    pub task_page_size: u32,
    pub comment_page_size: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            project_page_size: 100,
            task_page_size: 200,
            comment_page_size: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.project_page_size, 100);
        assert_eq!(config.task_page_size, 200);
        assert_eq!(config.comment_page_size, 100);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ControllerConfig =
            serde_json::from_str(r#"{"task_page_size": 50}"#).unwrap();
        assert_eq!(config.task_page_size, 50);
        assert_eq!(config.project_page_size, 100);
        assert_eq!(config.comment_page_size, 100);
    }
}
