use uuid::Uuid;

pub mod answer;
pub mod converse;

pub const DEFAULT_MODEL_VERSION: &str = "gemini-1.5-flash-001/answer_gen/v1";

pub const DEFAULT_PREAMBLE: &str = "Given the conversation between a user and a helpful \
assistant and some search results, create a final answer for the assistant. Always respond \
back to the user in the same language as the user. The answer should use all relevant \
information from the search results, not introduce any additional information, and use \
exactly the same words as the search results when possible. The assistant's answer should \
be formatted as a bulleted list.";

pub const DEFAULT_SUMMARY_RESULT_COUNT: u32 = 3;

/// A document supporting part of an answer. Citation markers refer to it by
/// its 1-based position in the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub uri: String,
    pub title: Option<String>,
}

impl Reference {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Text returned by the service together with its citation metadata.
///
/// `references` is `None` when the service omitted the field entirely, which
/// is distinct from an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerPayload {
    pub text: String,
    pub references: Option<Vec<Reference>>,
    pub related_questions: Vec<String>,
}

/// Model parameters sent with every query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    pub model_version: String,
    pub preamble: String,
    /// Number of search results the converse summary is built from.
    pub summary_result_count: u32,
    pub disable_query_rephraser: bool,
    pub related_questions: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model_version: DEFAULT_MODEL_VERSION.to_string(),
            preamble: DEFAULT_PREAMBLE.to_string(),
            summary_result_count: DEFAULT_SUMMARY_RESULT_COUNT,
            disable_query_rephraser: true,
            related_questions: true,
        }
    }
}

pub fn generate_user_pseudo_id() -> String {
    Uuid::new_v4().as_simple().to_string()
}
