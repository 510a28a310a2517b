//! Prompt text for the coordinator conversation.

use crate::catalog::SummaryRecord;

/// Returned when the forced-answer attempts are exhausted too.
pub const FAILED_ANSWER: &str = "Failed to generate a final answer after maximum attempts.";

/// Appended once the iteration budget is spent.
pub const FORCE_ANSWER_PROMPT: &str = r#"Maximum iterations reached. Please provide the best possible final answer based on the information gathered so far.
Your response should still be in a valid JSON format with the action 'final_answer' and an 'answer' field. Example:

```json
{
    "action": "final_answer",
    "answer": "Your final answer here."
}
```"#;

/// The system message: role, full catalog, response format.
pub fn system_prompt<'a>(
    course_name: &str,
    categories: &str,
    summaries: impl IntoIterator<Item = (u32, &'a SummaryRecord)>,
) -> String {
    let mut catalog = String::new();
    for (id, record) in summaries {
        catalog.push_str(&format!(
            "Lecture {}: {}\n  Keywords: {}\n  Brief: {}\n\n",
            id,
            record.title,
            record.keywords.join(", "),
            record.brief
        ));
    }

    let heading = if categories.is_empty() {
        "AVAILABLE LECTURES:".to_string()
    } else {
        format!("AVAILABLE LECTURES ({}):", categories)
    };

    format!(
        r#"You are an intelligent teaching assistant coordinator for {course_name}. Your role is to help students by strategically gathering information from specific lectures to answer their questions comprehensively.

{heading}
{catalog}
YOUR PROCESS:
1. Analyze the student's question to understand what concepts/topics are involved
2. Identify which specific lectures likely contain relevant information
3. Ask targeted questions to those specific lectures to gather detailed information
4. Synthesize the gathered information into a comprehensive final answer

RESPONSE FORMAT:
You must respond in JSON format with one of two actions:

1. To gather more information:
{{
    "action": "ask_questions",
    "reasoning": "Brief explanation of why you're asking these questions",
    "questions": [
        {{"lecture_number": N, "question": "Specific question about this lecture's content"}},
        ...
    ]
}}

2. When ready to provide final answer:
{{
    "action": "final_answer",
    "answer": "Your comprehensive answer based on the gathered information"
}}

GUIDELINES:
- Ask specific, targeted questions to relevant lectures
- Don't ask too many questions at once (3-5 max per iteration)
- Build upon previous answers to ask follow-up questions if needed
- Provide comprehensive final answers that synthesize information from multiple lectures when appropriate
- If a topic spans multiple lectures, gather information from all relevant ones
- Lecture slides may contain images and external links. Answers can include them using standard Markdown syntax "![]()" and "[]()" with appropriate paths/URLs."#
    )
}

/// The first user message.
pub fn question_prompt(question: &str) -> String {
    format!(
        "Student Question: {}\n\nPlease analyze this question and determine what information you need to gather from specific lectures to provide a comprehensive answer. Start by identifying which lectures are most likely to contain relevant information, then ask targeted questions to gather the details needed.",
        question
    )
}

/// Follows every answer block.
pub fn continue_prompt(question: &str) -> String {
    format!(
        r#"Based on the answers above, do you have enough information to provide a comprehensive final answer to the student's question?

If YES: Provide your final answer using the "final_answer" action.
If NO: Ask additional targeted questions to gather more specific information you need.

Remember to synthesize information from multiple lectures when relevant and provide practical examples or explanations that help the student understand the concepts.

Student's question was: {}
"#,
        question
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_lists_every_lecture() {
        let records = [
            SummaryRecord {
                title: "Pointers".to_string(),
                keywords: vec!["int*".to_string(), "NULL".to_string()],
                brief: "Addresses and indirection.".to_string(),
            },
            SummaryRecord {
                title: "Classes".to_string(),
                keywords: vec!["class".to_string()],
                brief: "User-defined types.".to_string(),
            },
        ];
        let prompt = system_prompt(
            "CS100",
            "0-0 are C, 1-1 are C++",
            [(0, &records[0]), (1, &records[1])],
        );

        assert!(prompt.contains("coordinator for CS100."));
        assert!(prompt.contains("AVAILABLE LECTURES (0-0 are C, 1-1 are C++):"));
        assert!(prompt.contains("Lecture 0: Pointers\n  Keywords: int*, NULL\n  Brief: Addresses and indirection."));
        assert!(prompt.contains("Lecture 1: Classes"));
        assert!(prompt.contains(r#""action": "ask_questions""#));
    }

    #[test]
    fn test_uncategorized_heading() {
        let prompt = system_prompt("CS100", "", std::iter::empty());
        assert!(prompt.contains("AVAILABLE LECTURES:\n"));
    }

    #[test]
    fn test_continue_prompt_repeats_question() {
        assert!(continue_prompt("What is RAII?").contains("Student's question was: What is RAII?"));
    }
}
