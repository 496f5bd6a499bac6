use serde::{Deserialize, Serialize};

use super::{AnswerPayload, GenerationOptions, Reference};

// ── Answer API REST types (v1beta) ──

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerQueryRequest {
    pub query: Query,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    pub query_understanding_spec: QueryUnderstandingSpec,
    pub answer_generation_spec: AnswerGenerationSpec,
    pub related_questions_spec: RelatedQuestionsSpec,
}

#[derive(Debug, Serialize)]
pub struct Query {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryUnderstandingSpec {
    pub query_rephraser_spec: QueryRephraserSpec,
}

#[derive(Debug, Serialize)]
pub struct QueryRephraserSpec {
    pub disable: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerGenerationSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_spec: Option<AnswerModelSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_spec: Option<PromptSpec>,
    pub include_citations: bool,
    pub ignore_low_relevant_content: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerModelSpec {
    pub model_version: String,
}

#[derive(Debug, Serialize)]
pub struct PromptSpec {
    pub preamble: String,
}

#[derive(Debug, Serialize)]
pub struct RelatedQuestionsSpec {
    pub enable: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub user_pseudo_id: String,
}

#[derive(Debug, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub name: String,
}

// ── Answer API response types ──

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerQueryResponse {
    pub answer: Option<Answer>,
    pub session: Option<Session>,
    pub answer_query_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub answer_text: Option<String>,
    pub citations: Option<Vec<Citation>>,
    pub references: Option<Vec<AnswerReference>>,
    pub related_questions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct Citation {
    pub sources: Option<Vec<CitationSource>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationSource {
    pub reference_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerReference {
    pub chunk_info: Option<ChunkInfo>,
    pub unstructured_document_info: Option<DocumentInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkInfo {
    pub document_metadata: Option<DocumentInfo>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentInfo {
    pub uri: Option<String>,
    pub title: Option<String>,
}

// ── Conversion functions ──

pub fn build_answer_request(
    query: &str,
    session: Option<&str>,
    options: &GenerationOptions,
) -> AnswerQueryRequest {
    AnswerQueryRequest {
        query: Query {
            text: query.to_string(),
        },
        session: session.map(str::to_string),
        query_understanding_spec: QueryUnderstandingSpec {
            query_rephraser_spec: QueryRephraserSpec {
                disable: options.disable_query_rephraser,
            },
        },
        answer_generation_spec: AnswerGenerationSpec {
            model_spec: (!options.model_version.is_empty()).then(|| AnswerModelSpec {
                model_version: options.model_version.clone(),
            }),
            prompt_spec: (!options.preamble.is_empty()).then(|| PromptSpec {
                preamble: options.preamble.clone(),
            }),
            include_citations: true,
            ignore_low_relevant_content: true,
        },
        related_questions_spec: RelatedQuestionsSpec {
            enable: options.related_questions,
        },
    }
}

pub fn convert_answer_response(resp: &AnswerQueryResponse) -> AnswerPayload {
    let Some(answer) = resp.answer.as_ref() else {
        tracing::warn!("answer response carried no answer");
        return AnswerPayload::default();
    };

    let references = answer.references.as_ref().map(|refs| {
        let refs: Vec<Reference> = refs.iter().map(convert_reference).collect();
        match answer.citations.as_deref() {
            Some(citations) => order_by_citation(refs, citations),
            None => refs,
        }
    });

    AnswerPayload {
        text: answer.answer_text.clone().unwrap_or_default(),
        references,
        related_questions: answer.related_questions.clone().unwrap_or_default(),
    }
}

fn convert_reference(r: &AnswerReference) -> Reference {
    let info = r
        .chunk_info
        .as_ref()
        .and_then(|c| c.document_metadata.as_ref())
        .or(r.unstructured_document_info.as_ref());

    match info {
        Some(info) => Reference {
            uri: info.uri.clone().unwrap_or_default(),
            title: info.title.clone().filter(|t| !t.is_empty()),
        },
        None => Reference::new(""),
    }
}

/// Moves cited references to the front in order of first citation. Citation
/// sources carry 0-based ids into the reference list; ids past its end are
/// ignored and uncited references keep their relative order at the back.
fn order_by_citation(references: Vec<Reference>, citations: &[Citation]) -> Vec<Reference> {
    let mut order: Vec<usize> = Vec::with_capacity(references.len());
    let cited = citations
        .iter()
        .flat_map(|c| c.sources.iter().flatten())
        .filter_map(|s| s.reference_id.as_deref()?.trim().parse::<usize>().ok());

    for id in cited {
        if id < references.len() && !order.contains(&id) {
            order.push(id);
        }
    }
    let uncited: Vec<usize> = (0..references.len()).filter(|i| !order.contains(i)).collect();
    order.extend(uncited);

    let mut slots: Vec<Option<Reference>> = references.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|i| slots.get_mut(i).and_then(Option::take))
        .collect()
}
