//! The built-in transform catalog.
//!
//! Every transform consumes one JSON value and produces one. String
//! transforms require a string input and reject anything else with a typed
//! error rather than coercing.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use weft_executor::TransformError;

use crate::registry::Transform;

/// Failure modes shared by the built-in transforms.
#[derive(Debug, Error)]
pub enum ApplyError {
  #[error("transform '{tool}' expects a string input, got {kind}")]
  ExpectsString { tool: &'static str, kind: &'static str },

  #[error("transform '{tool}' is missing required config key '{key}'")]
  MissingConfig { tool: &'static str, key: &'static str },

  #[error("no value at path '{path}'")]
  PathNotFound { path: String },

  #[error("template error: {0}")]
  Template(#[from] minijinja::Error),
}

fn value_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

fn expect_string(tool: &'static str, input: &Value) -> Result<String, ApplyError> {
  match input.as_str() {
    Some(s) => Ok(s.to_string()),
    None => Err(ApplyError::ExpectsString { tool, kind: value_kind(input) }),
  }
}

fn config_str<'a>(
  tool: &'static str,
  config: &'a Map<String, Value>,
  key: &'static str,
) -> Result<&'a str, ApplyError> {
  config
    .get(key)
    .and_then(Value::as_str)
    .ok_or(ApplyError::MissingConfig { tool, key })
}

/// Uppercases a string input.
pub struct Uppercase;

#[async_trait]
impl Transform for Uppercase {
  fn id(&self) -> &'static str {
    "uppercase"
  }

  async fn apply(
    &self,
    _config: &Map<String, Value>,
    input: Value,
  ) -> Result<Value, TransformError> {
    let s = expect_string(self.id(), &input)?;
    Ok(Value::String(s.to_uppercase()))
  }
}

/// Lowercases a string input.
pub struct Lowercase;

#[async_trait]
impl Transform for Lowercase {
  fn id(&self) -> &'static str {
    "lowercase"
  }

  async fn apply(
    &self,
    _config: &Map<String, Value>,
    input: Value,
  ) -> Result<Value, TransformError> {
    let s = expect_string(self.id(), &input)?;
    Ok(Value::String(s.to_lowercase()))
  }
}

/// Trims surrounding whitespace from a string input.
pub struct Trim;

#[async_trait]
impl Transform for Trim {
  fn id(&self) -> &'static str {
    "trim"
  }

  async fn apply(
    &self,
    _config: &Map<String, Value>,
    input: Value,
  ) -> Result<Value, TransformError> {
    let s = expect_string(self.id(), &input)?;
    Ok(Value::String(s.trim().to_string()))
  }
}

/// Appends the config `suffix` to a string input.
pub struct Append;

#[async_trait]
impl Transform for Append {
  fn id(&self) -> &'static str {
    "append"
  }

  async fn apply(
    &self,
    config: &Map<String, Value>,
    input: Value,
  ) -> Result<Value, TransformError> {
    let s = expect_string(self.id(), &input)?;
    let suffix = config_str(self.id(), config, "suffix")?;
    Ok(Value::String(format!("{s}{suffix}")))
  }
}

/// Replaces every occurrence of config `from` with config `to`.
pub struct Replace;

#[async_trait]
impl Transform for Replace {
  fn id(&self) -> &'static str {
    "replace"
  }

  async fn apply(
    &self,
    config: &Map<String, Value>,
    input: Value,
  ) -> Result<Value, TransformError> {
    let s = expect_string(self.id(), &input)?;
    let from = config_str(self.id(), config, "from")?;
    let to = config_str(self.id(), config, "to")?;
    Ok(Value::String(s.replace(from, to)))
  }
}

/// Extracts a nested value by the dot-separated config `path`.
///
/// Path segments index objects by key and arrays by number, e.g.
/// `items.0.name`.
pub struct Pick;

#[async_trait]
impl Transform for Pick {
  fn id(&self) -> &'static str {
    "pick"
  }

  async fn apply(
    &self,
    config: &Map<String, Value>,
    input: Value,
  ) -> Result<Value, TransformError> {
    let path = config_str(self.id(), config, "path")?;
    let mut current = &input;
    for segment in path.split('.') {
      let next = match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
      };
      match next {
        Some(value) => current = value,
        None => {
          return Err(
            ApplyError::PathNotFound { path: path.to_string() }.into(),
          );
        }
      }
    }
    Ok(current.clone())
  }
}

/// Renders the config `template` with minijinja, binding the input as
/// `input`. Always produces a string.
pub struct Template;

#[async_trait]
impl Transform for Template {
  fn id(&self) -> &'static str {
    "template"
  }

  async fn apply(
    &self,
    config: &Map<String, Value>,
    input: Value,
  ) -> Result<Value, TransformError> {
    let source = config_str(self.id(), config, "template")?;
    let env = minijinja::Environment::new();
    let template = env.template_from_str(source).map_err(ApplyError::Template)?;
    let rendered = template
      .render(minijinja::context! { input => input })
      .map_err(ApplyError::Template)?;
    Ok(Value::String(rendered))
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn config(entries: &[(&str, &str)]) -> Map<String, Value> {
    entries
      .iter()
      .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
      .collect()
  }

  #[tokio::test]
  async fn uppercase_and_lowercase() {
    let up = Uppercase.apply(&Map::new(), json!("Weft")).await.unwrap();
    assert_eq!(up, json!("WEFT"));
    let down = Lowercase.apply(&Map::new(), json!("Weft")).await.unwrap();
    assert_eq!(down, json!("weft"));
  }

  #[tokio::test]
  async fn string_transforms_reject_non_strings() {
    let err = Uppercase.apply(&Map::new(), json!(42)).await.unwrap_err();
    assert!(err.to_string().contains("expects a string"));
  }

  #[tokio::test]
  async fn trim_strips_whitespace() {
    let out = Trim.apply(&Map::new(), json!("  hi  ")).await.unwrap();
    assert_eq!(out, json!("hi"));
  }

  #[tokio::test]
  async fn append_requires_a_suffix() {
    let out = Append
      .apply(&config(&[("suffix", "!")]), json!("go"))
      .await
      .unwrap();
    assert_eq!(out, json!("go!"));

    let err = Append.apply(&Map::new(), json!("go")).await.unwrap_err();
    assert!(err.to_string().contains("missing required config key 'suffix'"));
  }

  #[tokio::test]
  async fn replace_rewrites_all_occurrences() {
    let out = Replace
      .apply(&config(&[("from", "a"), ("to", "o")]), json!("banana"))
      .await
      .unwrap();
    assert_eq!(out, json!("bonono"));
  }

  #[tokio::test]
  async fn pick_walks_objects_and_arrays() {
    let input = json!({ "items": [{ "name": "first" }, { "name": "second" }] });
    let out = Pick
      .apply(&config(&[("path", "items.1.name")]), input)
      .await
      .unwrap();
    assert_eq!(out, json!("second"));
  }

  #[tokio::test]
  async fn pick_reports_missing_paths() {
    let err = Pick
      .apply(&config(&[("path", "missing.key")]), json!({}))
      .await
      .unwrap_err();
    assert!(err.to_string().contains("no value at path"));
  }

  #[tokio::test]
  async fn template_renders_against_the_input() {
    let input = json!({ "name": "weft" });
    let out = Template
      .apply(
        &config(&[("template", "hello {{ input.name }}")]),
        input,
      )
      .await
      .unwrap();
    assert_eq!(out, json!("hello weft"));
  }

  #[tokio::test]
  async fn template_surfaces_syntax_errors() {
    let err = Template
      .apply(&config(&[("template", "{{ broken")]), json!(null))
      .await
      .unwrap_err();
    assert!(err.to_string().contains("template error"));
  }
}
