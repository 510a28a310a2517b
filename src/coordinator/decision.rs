//! Parsing of the coordinator model's structured turns.
//!
//! The model is asked for one of two JSON objects:
//!
//! ```json
//! {"action": "ask_questions", "reasoning": "...",
//!  "questions": [{"lecture_number": 3, "question": "..."}]}
//! {"action": "final_answer", "answer": "..."}
//! ```
//!
//! Every field is checked for presence and type. Anything that is not one of
//! the two shapes is a [`DecisionError`] (or [`Decision::Unrecognized`] for an
//! unknown action) and is answered with a corrective message instead of being
//! trusted.

use crate::types::Query;
use crate::utils::json::strip_code_fence;
use serde_json::{Map, Value};

/// One parsed coordinator turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Ask specialists for more information.
    AskQuestions {
        reasoning: String,
        questions: Vec<Query>,
    },
    /// Stop and answer the student.
    FinalAnswer { answer: String },
    /// Well-formed object with an action we do not know.
    Unrecognized { action: String },
}

/// Why a turn could not be parsed into a [`Decision`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecisionError {
    #[error("not valid JSON: {0}")]
    InvalidJson(String),

    #[error("unexpected response shape: {0}")]
    InvalidShape(String),
}

impl DecisionError {
    /// The user message that asks the model to fix its previous turn.
    pub fn corrective_message(&self) -> String {
        match self {
            DecisionError::InvalidJson(e) => format!(
                "The previous response was not valid JSON: {}. Please make sure the response is in JSON format.",
                e
            ),
            DecisionError::InvalidShape(e) => format!(
                "The previous response did not follow the required format: {}. Please respond with a JSON object whose \"action\" is either \"ask_questions\" (with \"reasoning\" and \"questions\") or \"final_answer\" (with \"answer\").",
                e
            ),
        }
    }
}

impl Decision {
    /// Parse one raw model response.
    pub fn parse(text: &str) -> Result<Self, DecisionError> {
        let value: Value = serde_json::from_str(strip_code_fence(text))
            .map_err(|e| DecisionError::InvalidJson(e.to_string()))?;
        let object = value
            .as_object()
            .ok_or_else(|| shape("the response must be a JSON object"))?;

        match object.get("action") {
            Some(Value::String(action)) => match action.as_str() {
                "ask_questions" => parse_ask_questions(object),
                "final_answer" => Ok(Decision::FinalAnswer {
                    answer: string_field(object, "answer")?,
                }),
                _ => Ok(Decision::Unrecognized {
                    action: action.clone(),
                }),
            },
            Some(_) => Err(shape("\"action\" must be a string")),
            None => Err(shape("missing \"action\"")),
        }
    }

    /// Corrective message for an unknown action.
    pub fn unknown_action_message(action: &str) -> String {
        format!(
            "Unknown action '{}'. Please respond with either 'ask_questions' or 'final_answer'.",
            action
        )
    }
}

/// Extract the answer from a response to the forced-answer prompt.
///
/// At that point anything carrying a string `answer` is accepted, whether or
/// not the model also remembered to set the action.
pub fn forced_answer(text: &str) -> Option<String> {
    if let Ok(Decision::FinalAnswer { answer }) = Decision::parse(text) {
        return Some(answer);
    }
    let value: Value = serde_json::from_str(strip_code_fence(text)).ok()?;
    value.get("answer")?.as_str().map(str::to_string)
}

fn shape(message: impl Into<String>) -> DecisionError {
    DecisionError::InvalidShape(message.into())
}

fn string_field(object: &Map<String, Value>, key: &str) -> Result<String, DecisionError> {
    match object.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(shape(format!("\"{}\" must be a string", key))),
        None => Err(shape(format!("missing \"{}\"", key))),
    }
}

fn parse_ask_questions(object: &Map<String, Value>) -> Result<Decision, DecisionError> {
    let reasoning = string_field(object, "reasoning")?;
    let items = match object.get("questions") {
        Some(Value::Array(items)) => items,
        Some(_) => return Err(shape("\"questions\" must be an array")),
        None => return Err(shape("missing \"questions\"")),
    };

    let questions = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let item = item
                .as_object()
                .ok_or_else(|| shape(format!("questions[{}] must be an object", i)))?;
            let resource_id = item
                .get("lecture_number")
                .and_then(Value::as_i64)
                .ok_or_else(|| {
                    shape(format!("questions[{}].lecture_number must be an integer", i))
                })?;
            let question = item
                .get("question")
                .and_then(Value::as_str)
                .ok_or_else(|| shape(format!("questions[{}].question must be a string", i)))?;
            Ok(Query::new(resource_id, question))
        })
        .collect::<Result<Vec<_>, DecisionError>>()?;

    Ok(Decision::AskQuestions {
        reasoning,
        questions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_ask_questions() {
        let text = r#"{
            "action": "ask_questions",
            "reasoning": "Pointers are in lecture 4",
            "questions": [
                {"lecture_number": 4, "question": "What is a null pointer?"},
                {"lecture_number": 999, "question": "Anything?"}
            ]
        }"#;
        assert_eq!(
            Decision::parse(text).unwrap(),
            Decision::AskQuestions {
                reasoning: "Pointers are in lecture 4".to_string(),
                questions: vec![
                    Query::new(4, "What is a null pointer?"),
                    Query::new(999, "Anything?"),
                ],
            }
        );
    }

    #[test]
    fn test_parse_final_answer_and_unknown_action() {
        assert_eq!(
            Decision::parse(r#"{"action": "final_answer", "answer": "42"}"#).unwrap(),
            Decision::FinalAnswer {
                answer: "42".to_string()
            }
        );
        assert_eq!(
            Decision::parse(r#"{"action": "search_web"}"#).unwrap(),
            Decision::Unrecognized {
                action: "search_web".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let err = Decision::parse("Sure! Here you go:").unwrap_err();
        assert!(matches!(err, DecisionError::InvalidJson(_)));
        assert!(err
            .corrective_message()
            .starts_with("The previous response was not valid JSON"));
    }

    #[rstest]
    #[case(r#"[1, 2]"#, "JSON object")]
    #[case(r#"{"answer": "x"}"#, "missing \"action\"")]
    #[case(r#"{"action": 3}"#, "\"action\" must be a string")]
    #[case(r#"{"action": "final_answer"}"#, "missing \"answer\"")]
    #[case(r#"{"action": "final_answer", "answer": ["x"]}"#, "\"answer\" must be a string")]
    #[case(r#"{"action": "ask_questions", "questions": []}"#, "missing \"reasoning\"")]
    #[case(r#"{"action": "ask_questions", "reasoning": "r"}"#, "missing \"questions\"")]
    #[case(
        r#"{"action": "ask_questions", "reasoning": "r", "questions": {"lecture_number": 1}}"#,
        "must be an array"
    )]
    #[case(
        r#"{"action": "ask_questions", "reasoning": "r", "questions": [{"lecture_number": "3", "question": "q"}]}"#,
        "questions[0].lecture_number"
    )]
    #[case(
        r#"{"action": "ask_questions", "reasoning": "r", "questions": [{"lecture_number": 3}]}"#,
        "questions[0].question"
    )]
    fn test_shape_violations(#[case] text: &str, #[case] expected: &str) {
        let err = Decision::parse(text).unwrap_err();
        assert!(matches!(err, DecisionError::InvalidShape(_)));
        assert!(
            err.to_string().contains(expected),
            "{} does not mention {}",
            err,
            expected
        );
    }

    #[test]
    fn test_empty_question_list_is_valid() {
        let decision =
            Decision::parse(r#"{"action": "ask_questions", "reasoning": "", "questions": []}"#)
                .unwrap();
        assert!(matches!(decision, Decision::AskQuestions { questions, .. } if questions.is_empty()));
    }

    #[test]
    fn test_forced_answer_is_lenient_about_action() {
        assert_eq!(
            forced_answer(r#"{"action": "final_answer", "answer": "a"}"#),
            Some("a".to_string())
        );
        assert_eq!(
            forced_answer("```json\n{\"answer\": \"b\"}\n```"),
            Some("b".to_string())
        );
        assert_eq!(forced_answer(r#"{"action": "ask_questions"}"#), None);
        assert_eq!(forced_answer("no"), None);
    }
}
