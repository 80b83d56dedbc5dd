//! Core trait definition for the form persistence API.
//!
//! Implemented by the `quizdrop-client` crate (HTTP and in-memory mock).

use async_trait::async_trait;

use crate::model::Form;
use crate::response::FormResponse;

/// Remote store for forms and their responses.
#[async_trait]
pub trait FormApi: Send + Sync {
    /// Human-readable backend name (e.g. "http").
    fn name(&self) -> &str;

    /// List every saved form.
    async fn list_forms(&self) -> anyhow::Result<Vec<Form>>;

    /// Fetch a single form by id.
    async fn fetch_form(&self, id: &str) -> anyhow::Result<Form>;

    /// Save a new form and return the id assigned by the server.
    async fn create_form(&self, form: &Form) -> anyhow::Result<String>;

    /// Record a submitted response.
    async fn create_response(&self, response: &FormResponse) -> anyhow::Result<()>;
}
