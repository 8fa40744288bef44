//! Turns raw model output into the response payload
//!
//! JSON-mode output is recovered best-effort: models like to wrap the
//! object in prose or markdown fences. Anything that does not yield a JSON
//! object comes back as `{ "result": raw }`; this module never fails.

use log::{debug, warn};
use crate::request::GenerationResult;

/// Shape the raw completion text according to the mode's JSON flag
pub fn post_process(raw: &str, json_mode: bool) -> GenerationResult
{   if !json_mode
    {   return GenerationResult::text(raw);
    }
    match recover_json_object(raw)
    {   Some(object) => {
          debug!("Parsed JSON object with {} keys", object.len());
          GenerationResult::Structured(object)
        }
      , None => {
          warn!("Model output was not a JSON object, returning raw text");
          GenerationResult::text(raw)
        }
    }
}

/// Strip fences, slice the outermost braces, parse as a JSON object
pub fn recover_json_object(raw: &str)
  -> Option<serde_json::Map<String, serde_json::Value>>
{   let candidate = json_candidate(raw);
    match serde_json::from_str::<serde_json::Value>(&candidate)
    {   Ok(serde_json::Value::Object(object)) => Some(object)
      , Ok(other) => {
          debug!("JSON parsed but is not an object: {}", type_name(&other));
          None
        }
      , Err(e) => {
          debug!("JSON recovery failed: {}", e);
          None
        }
    }
}

/// The substring most likely to be the intended JSON object
pub fn json_candidate(raw: &str) -> String
{   let unfenced = strip_fences(raw);
    match (unfenced.find('{'), unfenced.rfind('}'))
    {   (Some(start), Some(end)) if start < end => {
          unfenced[start..=end].to_string()
        }
      , _ => unfenced.trim().to_string()
    }
}

/// Drop every ```` ``` ```` fence along with a `json` tag in any case
fn strip_fences(raw: &str) -> String
{   let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(at) = rest.find("```")
    {   out.push_str(&rest[..at]);
        rest = &rest[at + 3..];
        let tagged = rest.get(..4)
          .map_or(false, |tag| tag.eq_ignore_ascii_case("json"));
        if tagged
        {   rest = &rest[4..];
        }
    }
    out.push_str(rest);
    out
}

fn type_name(value: &serde_json::Value) -> &'static str
{   match value
    {   serde_json::Value::Null => "null"
      , serde_json::Value::Bool(_) => "bool"
      , serde_json::Value::Number(_) => "number"
      , serde_json::Value::String(_) => "string"
      , serde_json::Value::Array(_) => "array"
      , serde_json::Value::Object(_) => "object"
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use serde_json::json;

    #[test]
    fn plain_mode_returns_text_verbatim()
    {   let raw = "```json\n{\"a\":1}\n```";
        assert_eq!(post_process(raw, false), GenerationResult::text(raw));
    }

    #[test]
    fn fenced_object_inside_prose_is_recovered()
    {   let raw = "Here you go:\n```json\n{\"score\": 85, \"feedback\": \"ok\", \
                   \"correct_answer\": \"x\"}\n```\nHope that helps!";
        let result = post_process(raw, true);
        let object = result.as_object().expect("structured");
        assert_eq!(
          serde_json::Value::Object(object.clone())
        , json!({ "score": 85, "feedback": "ok", "correct_answer": "x" })
        );
    }

    #[test]
    fn bare_fence_without_language_tag()
    {   let raw = "```\n{\"flashcards\": []}\n```";
        assert!(post_process(raw, true).as_object().is_some());
    }

    #[test]
    fn fence_tag_is_matched_in_any_case()
    {   assert_eq!(
          json_candidate("```JSON\n{\"a\": 1}\n```")
        , "{\"a\": 1}"
        );
        assert_eq!(strip_fences("```Json\n[1]\n```"), "\n[1]\n");
        assert_eq!(strip_fences("```jsonl```"), "l");
        let raw = "```JSON\n{\"flashcards\": [{\"front\": \"a\", \"back\": \"b\"}]}\n```";
        assert_eq!(
          serde_json::to_value(post_process(raw, true)).unwrap()
        , json!({ "flashcards": [{ "front": "a", "back": "b" }] })
        );
    }

    #[test]
    fn garbage_falls_back_to_raw_text()
    {   let raw = "I am not JSON at all";
        assert_eq!(post_process(raw, true), GenerationResult::text(raw));
    }

    #[test]
    fn broken_object_falls_back_to_raw_text()
    {   let raw = "{\"score\": 85, \"feedback\": }";
        assert_eq!(post_process(raw, true), GenerationResult::text(raw));
    }

    #[test]
    fn reversed_braces_do_not_panic()
    {   let raw = "} oops {";
        assert_eq!(post_process(raw, true), GenerationResult::text(raw));
    }

    #[test]
    fn top_level_array_is_not_an_object()
    {   let raw = "[1, 2, 3]";
        assert_eq!(post_process(raw, true), GenerationResult::text(raw));
    }

    #[test]
    fn nested_braces_keep_outermost_object()
    {   assert_eq!(
          json_candidate("note: {\"a\": {\"b\": 1}} end")
        , "{\"a\": {\"b\": 1}}"
        );
    }
}
