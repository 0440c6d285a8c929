/*
 * variables.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Built-in provider behind `var.` references.
 */

use async_trait::async_trait;
use csl_config::{Value, ValueMap};
use csl_resolve::{Provider, ResolveContext};
use indexmap::IndexMap;

/// Serves the compilation's variables to `var.` references.
#[derive(Debug, Clone)]
pub struct VariablesProvider {
    variables: Value,
}

impl VariablesProvider {
    pub fn new(variables: ValueMap) -> Self {
        Self {
            variables: Value::map(variables),
        }
    }

    pub fn from_json(variables: &IndexMap<String, serde_json::Value>) -> Self {
        Self::new(
            variables
                .iter()
                .map(|(name, value)| (name.clone(), Value::from(value.clone())))
                .collect(),
        )
    }
}

#[async_trait]
impl Provider for VariablesProvider {
    async fn fetch(&self, _ctx: &ResolveContext, path: &[String]) -> anyhow::Result<Value> {
        self.variables
            .get_path(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("variable `{}` is not defined", path.join(".")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> VariablesProvider {
        let mut variables = IndexMap::new();
        variables.insert("region".to_string(), serde_json::json!("eu-west-1"));
        variables.insert("aws".to_string(), serde_json::json!({"zones": ["a", "b"]}));
        VariablesProvider::from_json(&variables)
    }

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_fetch_variable() {
        let ctx = ResolveContext::new();
        let value = provider().fetch(&ctx, &path(&["region"])).await.unwrap();
        assert_eq!(value, Value::from("eu-west-1"));

        let zone = provider().fetch(&ctx, &path(&["aws", "zones", "1"])).await.unwrap();
        assert_eq!(zone, Value::from("b"));
    }

    #[tokio::test]
    async fn test_undefined_variable() {
        let err = provider()
            .fetch(&ResolveContext::new(), &path(&["aws", "account"]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "variable `aws.account` is not defined");
    }
}
