use serde::{Deserialize, Serialize};

use super::{AnswerPayload, GenerationOptions, Reference};

// ── Conversational search REST types (v1) ──

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseRequest {
    pub query: TextInput,
    pub serving_config: String,
    pub summary_spec: SummarySpec,
}

#[derive(Debug, Serialize)]
pub struct TextInput {
    pub input: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySpec {
    pub summary_result_count: u32,
    pub include_citations: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_spec: Option<SummaryModelSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_prompt_spec: Option<ModelPromptSpec>,
}

#[derive(Debug, Serialize)]
pub struct SummaryModelSpec {
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ModelPromptSpec {
    pub preamble: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

// ── Conversational search response types ──

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseResponse {
    pub reply: Option<Reply>,
    pub conversation: Option<Conversation>,
}

#[derive(Debug, Deserialize)]
pub struct Reply {
    pub summary: Option<Summary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub summary_text: Option<String>,
    pub summary_with_metadata: Option<SummaryWithMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryWithMetadata {
    pub summary: Option<String>,
    pub references: Option<Vec<SummaryReference>>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryReference {
    pub title: Option<String>,
    pub document: Option<String>,
    pub uri: Option<String>,
}

// ── Conversion functions ──

pub fn build_converse_request(
    query: &str,
    serving_config: &str,
    options: &GenerationOptions,
) -> ConverseRequest {
    ConverseRequest {
        query: TextInput {
            input: query.to_string(),
        },
        serving_config: serving_config.to_string(),
        summary_spec: SummarySpec {
            summary_result_count: options.summary_result_count,
            include_citations: true,
            model_spec: (!options.model_version.is_empty()).then(|| SummaryModelSpec {
                version: options.model_version.clone(),
            }),
            model_prompt_spec: (!options.preamble.is_empty()).then(|| ModelPromptSpec {
                preamble: options.preamble.clone(),
            }),
        },
    }
}

pub fn convert_converse_response(resp: &ConverseResponse) -> AnswerPayload {
    let Some(summary) = resp.reply.as_ref().and_then(|r| r.summary.as_ref()) else {
        tracing::warn!("converse response carried no summary");
        return AnswerPayload::default();
    };

    let references = summary
        .summary_with_metadata
        .as_ref()
        .and_then(|m| m.references.as_ref())
        .map(|refs| refs.iter().map(convert_reference).collect());

    AnswerPayload {
        text: summary.summary_text.clone().unwrap_or_default(),
        references,
        related_questions: Vec::new(),
    }
}

// A reference without a uri still holds its position so later markers stay aligned.
fn convert_reference(r: &SummaryReference) -> Reference {
    Reference {
        uri: r.uri.clone().unwrap_or_default(),
        title: r.title.clone().filter(|t| !t.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_converse_request() {
        let req = build_converse_request(
            "how to open a juice bar",
            "projects/p/locations/global/collections/default_collection/dataStores/ds/servingConfigs/default_config",
            &GenerationOptions::default(),
        );
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["query"]["input"], "how to open a juice bar");
        assert_eq!(json["summarySpec"]["summaryResultCount"], 3);
        assert_eq!(json["summarySpec"]["includeCitations"], true);
        assert_eq!(
            json["summarySpec"]["modelSpec"]["version"],
            "gemini-1.5-flash-001/answer_gen/v1"
        );
        assert!(
            json["servingConfig"]
                .as_str()
                .unwrap()
                .ends_with("/servingConfigs/default_config")
        );
    }

    #[test]
    fn test_build_converse_request_omits_empty_specs() {
        let options = GenerationOptions {
            model_version: String::new(),
            preamble: String::new(),
            ..Default::default()
        };
        let json = serde_json::to_value(build_converse_request("q", "sc", &options)).unwrap();
        assert!(json["summarySpec"].get("modelSpec").is_none());
        assert!(json["summarySpec"].get("modelPromptSpec").is_none());
    }

    #[test]
    fn test_convert_converse_response() {
        let data = r#"{
            "reply": {
                "summary": {
                    "summaryText": "Juice bars need permits [1]. Location matters [2].",
                    "summaryWithMetadata": {
                        "summary": "Juice bars need permits. Location matters.",
                        "references": [
                            {"title": "Permits", "document": "projects/p/documents/1", "uri": "gs://bucket/permits.pdf"},
                            {"document": "projects/p/documents/2"}
                        ]
                    }
                }
            },
            "conversation": {"name": "projects/p/locations/global/dataStores/ds/conversations/123"}
        }"#;
        let resp: ConverseResponse = serde_json::from_str(data).unwrap();
        let payload = convert_converse_response(&resp);
        assert_eq!(payload.text, "Juice bars need permits [1]. Location matters [2].");
        let references = payload.references.unwrap();
        assert_eq!(references.len(), 2);
        assert_eq!(references[0].uri, "gs://bucket/permits.pdf");
        assert_eq!(references[0].title.as_deref(), Some("Permits"));
        assert_eq!(references[1], Reference::new(""));
    }

    #[test]
    fn test_convert_converse_response_without_metadata() {
        let data = r#"{"reply": {"summary": {"summaryText": "No citations [1]."}}}"#;
        let resp: ConverseResponse = serde_json::from_str(data).unwrap();
        let payload = convert_converse_response(&resp);
        assert_eq!(payload.text, "No citations [1].");
        assert!(payload.references.is_none());
    }

    #[test]
    fn test_convert_converse_response_without_reply() {
        let resp: ConverseResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(convert_converse_response(&resp), AnswerPayload::default());
    }
}
