use std::sync::Arc;

use anyhow::{Result, bail};
use indexmap::IndexMap;

use super::Tool;
use crate::llm::ToolDefinition;

/// Ordered set of tools keyed by name. Registration order is the order the
/// model sees them in.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. A name that is already registered is rejected and the
    /// existing tool is kept.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            bail!("Tool '{name}' is already registered");
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct Named(&'static str, &'static str);

    #[async_trait]
    impl Tool for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            self.1
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }

        async fn execute(&self, _args: Value) -> Result<Value> {
            Ok(json!(self.1))
        }
    }

    #[test]
    fn keeps_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Named("b", "first"))).unwrap();
        registry.register(Arc::new(Named("a", "second"))).unwrap();
        assert_eq!(registry.names(), vec!["b", "a"]);
        assert_eq!(registry.definitions()[1].description, "second");
    }

    #[tokio::test]
    async fn duplicate_names_keep_the_first_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Named("quote", "remote"))).unwrap();
        let err = registry
            .register(Arc::new(Named("quote", "local")))
            .unwrap_err();
        assert!(err.to_string().contains("already registered"));

        let tool = registry.get("quote").unwrap();
        assert_eq!(tool.execute(Value::Null).await.unwrap(), json!("remote"));
        assert_eq!(registry.len(), 1);
    }
}
