//! HTTP form API client.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quizdrop_core::model::Form;
use quizdrop_core::response::{Answer, FormResponse};
use quizdrop_core::traits::FormApi;

use crate::error::ApiError;

/// JSON-over-HTTP form store.
pub struct HttpFormApi {
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpFormApi {
    pub fn new(base_url: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.timeout_secs)
            } else {
                ApiError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status,
                message: body,
            });
        }
        Ok(response)
    }
}

#[derive(Deserialize)]
struct CreatedForm {
    #[serde(rename = "_id", alias = "id")]
    id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePayload<'a> {
    form_id: &'a str,
    answers: &'a BTreeMap<usize, Answer>,
    submitted_at: String,
}

fn parse_error(e: reqwest::Error) -> ApiError {
    ApiError::Api {
        status: 0,
        message: format!("failed to parse response: {e}"),
    }
}

#[async_trait]
impl FormApi for HttpFormApi {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn list_forms(&self) -> anyhow::Result<Vec<Form>> {
        let response = self
            .send(self.client.get(format!("{}/forms", self.base_url)))
            .await?;
        let forms: Vec<Form> = response.json().await.map_err(parse_error)?;
        tracing::debug!(count = forms.len(), "listed forms");
        Ok(forms)
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_form(&self, id: &str) -> anyhow::Result<Form> {
        let request = self.client.get(format!("{}/forms/{}", self.base_url, id));
        let response = match self.send(request).await {
            Err(ApiError::Api { status: 404, .. }) => {
                return Err(ApiError::NotFound(id.to_string()).into())
            }
            other => other?,
        };
        let form: Form = response.json().await.map_err(parse_error)?;
        Ok(form)
    }

    #[instrument(skip(self, form), fields(base_url = %self.base_url, title = %form.title))]
    async fn create_form(&self, form: &Form) -> anyhow::Result<String> {
        let response = self
            .send(
                self.client
                    .post(format!("{}/forms", self.base_url))
                    .json(form),
            )
            .await?;
        let created: CreatedForm = response.json().await.map_err(parse_error)?;
        tracing::info!(id = %created.id, "form created");
        Ok(created.id)
    }

    #[instrument(skip(self, response), fields(base_url = %self.base_url, form_id = %response.form_id))]
    async fn create_response(&self, response: &FormResponse) -> anyhow::Result<()> {
        let payload = ResponsePayload {
            form_id: &response.form_id,
            answers: &response.answers,
            submitted_at: response.submitted_at.to_rfc3339(),
        };
        self.send(
            self.client
                .post(format!("{}/responses", self.base_url))
                .json(&payload),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizdrop_core::model::{ClozeQuestion, Question};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn form() -> Form {
        Form {
            id: None,
            title: "Animals".into(),
            header_image: None,
            questions: vec![Question::Cloze(ClozeQuestion {
                question_text: "the cat sat".into(),
                question_image: None,
                underlined: vec!["cat@1".parse().unwrap()],
            })],
        }
    }

    #[tokio::test]
    async fn list_forms() {
        let server = MockServer::start().await;

        let body = serde_json::json!([
            {"_id": "f1", "title": "Animals", "questions": []},
            {"_id": "f2", "title": "Plants", "questions": []}
        ]);
        Mock::given(method("GET"))
            .and(path("/forms"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let api = HttpFormApi::new(&server.uri(), 5).unwrap();
        let forms = api.list_forms().await.unwrap();
        assert_eq!(forms.len(), 2);
        assert_eq!(forms[1].id.as_deref(), Some("f2"));
    }

    #[tokio::test]
    async fn fetch_form_by_id() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "_id": "f1",
            "title": "Animals",
            "questions": [{"type": "cloze", "question_text": "the cat sat", "underlined": ["cat@1"]}]
        });
        Mock::given(method("GET"))
            .and(path("/forms/f1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let api = HttpFormApi::new(&server.uri(), 5).unwrap();
        let form = api.fetch_form("f1").await.unwrap();
        assert_eq!(form.title, "Animals");
        assert_eq!(form.questions.len(), 1);
    }

    #[tokio::test]
    async fn missing_form_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forms/nope"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let api = HttpFormApi::new(&server.uri(), 5).unwrap();
        let err = api.fetch_form("nope").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::NotFound(id)) if id == "nope"
        ));
    }

    #[tokio::test]
    async fn create_form_returns_server_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/forms"))
            .and(body_partial_json(serde_json::json!({"title": "Animals"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"_id": "abc123"})))
            .mount(&server)
            .await;

        let api = HttpFormApi::new(&format!("{}/", server.uri()), 5).unwrap();
        let id = api.create_form(&form()).await.unwrap();
        assert_eq!(id, "abc123");
    }

    #[tokio::test]
    async fn create_response_posts_form_id_and_answers() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/responses"))
            .and(body_partial_json(serde_json::json!({
                "formId": "f1",
                "answers": {"0": {"type": "choices", "value": ["sleep"]}}
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let mut answers = BTreeMap::new();
        answers.insert(0, Answer::Choices(vec!["sleep".into()]));
        let api = HttpFormApi::new(&server.uri(), 5).unwrap();
        api.create_response(&FormResponse::new("f1", answers))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn server_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/forms"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let api = HttpFormApi::new(&server.uri(), 5).unwrap();
        let err = api.create_form(&form()).await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }
}
