use crate::{
    agents::Agent,
    llm::{ChatMessage, CompletionService, InvokeOptions},
    resources::Resource,
    types::Result,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Settings shared by every specialist.
#[derive(Debug, Clone)]
pub struct SpecialistConfig {
    /// How the course is described in prompts.
    pub course_name: String,
    /// Sampling temperature for answers. Kept low so answers stay close to the text.
    pub temperature: f32,
}

impl Default for SpecialistConfig {
    fn default() -> Self {
        Self {
            course_name: "an introductory C/C++ programming course".to_string(),
            temperature: 0.3,
        }
    }
}

/// Answers questions using the content of exactly one lecture.
///
/// The restriction to the bound content is part of the request (system prompt
/// and low temperature on the deep tier); answers are not filtered afterwards.
/// There is no retry: failures go back to the caller as errors.
pub struct SpecialistAgent {
    resource: Resource,
    title: String,
    /// Catalog brief; carried for callers, not sent to the model.
    brief: String,
    config: SpecialistConfig,
    llm: Arc<dyn CompletionService>,
}

impl SpecialistAgent {
    pub fn new(
        resource: Resource,
        title: impl Into<String>,
        brief: impl Into<String>,
        config: SpecialistConfig,
        llm: Arc<dyn CompletionService>,
    ) -> Self {
        Self {
            resource,
            title: title.into(),
            brief: brief.into(),
            config,
            llm,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn brief(&self) -> &str {
        &self.brief
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// The user message for `question`.
    pub fn user_prompt(&self, question: &str) -> String {
        let mut prompt = format!(
            "Give a detailed answer to the following question using ONLY the information provided in the lecture content. Do not supplement with external knowledge.\n\nQuestion: {}\n",
            question
        );

        if let Some(media_dir) = &self.resource.media_dir {
            prompt.push_str(&format!(
                "\nNote: To use images from the lecture, use the normal Markdown syntax \"![]()\" and prefix each image's relative path with {}/",
                media_dir.display()
            ));
        }

        prompt
    }
}

#[async_trait]
impl Agent for SpecialistAgent {
    async fn answer(&self, question: &str) -> Result<String> {
        let messages = [
            ChatMessage::system(self.system_prompt()),
            ChatMessage::user(self.user_prompt(question)),
        ];
        let options = InvokeOptions::deep().with_temperature(self.config.temperature);

        tracing::debug!(resource_id = self.resource.id, "Specialist answering");
        self.llm.invoke(&messages, &options).await
    }

    fn system_prompt(&self) -> String {
        let kind = match &self.resource.category {
            Some(category) => format!(", which is a {} lecture", category),
            None => String::new(),
        };

        format!(
            r#"You are an expert teaching assistant for {course}. Answer student questions based STRICTLY AND EXCLUSIVELY on the content of Lecture {id}: "{title}"{kind}.

CRITICAL INSTRUCTIONS:
- Answer ONLY from the provided lecture content
- Do NOT use general programming knowledge or any external information
- If the answer is not in the lecture content, say explicitly "This topic is not covered in this lecture"
- Quote or reference specific parts of the lecture when possible
- Stay within the scope of what this lecture actually teaches
- The lecture may contain external links (for example to cppreference.com). If one is relevant and important, include it with Markdown link syntax "[]()". Never invent links; only use those present in the lecture.

Lecture content:

{content}"#,
            course = self.config.course_name,
            id = self.resource.id,
            title = self.title,
            kind = kind,
            content = self.resource.content,
        )
    }

    fn resource_id(&self) -> u32 {
        self.resource.id
    }
}
