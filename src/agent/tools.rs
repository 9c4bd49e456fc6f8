//! Built-in tools

use crate::agent::definition::Tool;
use crate::error::{ChatError, Result};
use async_trait::async_trait;
use serde_json::{json, Map, Value};

/// Squares an integer
#[derive(Debug, Clone, Copy, Default)]
pub struct CalculateSquare;

#[async_trait]
impl Tool for CalculateSquare {
    fn name(&self) -> &str {
        "calculate_square"
    }

    fn description(&self) -> &str {
        "Calculate the square of a number."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "number": { "type": "integer" }
            },
            "required": ["number"]
        })
    }

    async fn call(&self, arguments: &Map<String, Value>) -> Result<Value> {
        let number = arguments
            .get("number")
            .and_then(Value::as_i64)
            .ok_or_else(|| ChatError::Tool {
                name: self.name().to_string(),
                reason: "argument 'number' must be an integer".to_string(),
            })?;

        let square = number.checked_mul(number).ok_or_else(|| ChatError::Tool {
            name: self.name().to_string(),
            reason: format!("{} squared overflows", number),
        })?;

        Ok(json!(square))
    }

    fn match_message(&self, message: &str) -> Option<Map<String, Value>> {
        if !message.to_lowercase().contains("square") {
            return None;
        }
        let number = first_integer(message)?;
        let mut args = Map::new();
        args.insert("number".to_string(), json!(number));
        Some(args)
    }
}

/// First signed integer literal appearing in `text`
fn first_integer(text: &str) -> Option<i64> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(u8::is_ascii_digit)?;
    let end = bytes[start..]
        .iter()
        .position(|b| !b.is_ascii_digit())
        .map_or(bytes.len(), |n| start + n);
    let negative = start > 0 && bytes[start - 1] == b'-';
    let from = if negative { start - 1 } else { start };
    text[from..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(number: Value) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("number".to_string(), number);
        map
    }

    #[tokio::test]
    async fn test_square() {
        let result = CalculateSquare.call(&args(json!(12))).await.unwrap();
        assert_eq!(result, json!(144));

        let result = CalculateSquare.call(&args(json!(-3))).await.unwrap();
        assert_eq!(result, json!(9));
    }

    #[tokio::test]
    async fn test_missing_argument() {
        let err = CalculateSquare.call(&Map::new()).await.unwrap_err();
        assert!(matches!(err, ChatError::Tool { .. }));
    }

    #[tokio::test]
    async fn test_non_integer_argument() {
        let err = CalculateSquare.call(&args(json!("twelve"))).await.unwrap_err();
        assert!(err.to_string().contains("must be an integer"));
    }

    #[tokio::test]
    async fn test_overflow() {
        let err = CalculateSquare
            .call(&args(json!(i64::MAX)))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn test_match_message() {
        let matched = CalculateSquare
            .match_message("What is the square of 12?")
            .unwrap();
        assert_eq!(matched["number"], 12);

        let matched = CalculateSquare.match_message("Square -7 please").unwrap();
        assert_eq!(matched["number"], -7);

        assert!(CalculateSquare.match_message("hi").is_none());
        assert!(CalculateSquare.match_message("square it").is_none());
        assert!(CalculateSquare.match_message("what is 12 times 12").is_none());
    }

    #[test]
    fn test_first_integer() {
        assert_eq!(first_integer("abc 42 def 7"), Some(42));
        assert_eq!(first_integer("x-5"), Some(-5));
        assert_eq!(first_integer("none"), None);
        assert_eq!(first_integer("99999999999999999999"), None);
    }
}
