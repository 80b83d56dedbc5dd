//! In-memory form API for testing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use quizdrop_core::model::Form;
use quizdrop_core::response::FormResponse;
use quizdrop_core::traits::FormApi;

use crate::error::ApiError;

/// A form store that keeps everything in memory.
///
/// Created forms get sequential ids (`form-1`, `form-2`, ...).
#[derive(Default)]
pub struct MockFormApi {
    forms: Mutex<BTreeMap<String, Form>>,
    responses: Mutex<Vec<FormResponse>>,
    next_id: AtomicU32,
    call_count: AtomicU32,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockFormApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock pre-loaded with forms; forms without an id get one.
    pub fn with_forms(forms: impl IntoIterator<Item = Form>) -> Self {
        let api = Self::new();
        for mut form in forms {
            let id = form.id.clone().unwrap_or_else(|| api.allocate_id());
            form.id = Some(id.clone());
            lock(&api.forms).insert(id, form);
        }
        api
    }

    fn allocate_id(&self) -> String {
        format!("form-{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Number of trait calls made so far.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Every response recorded so far, oldest first.
    pub fn responses(&self) -> Vec<FormResponse> {
        lock(&self.responses).clone()
    }

    fn record_call(&self) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl FormApi for MockFormApi {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_forms(&self) -> anyhow::Result<Vec<Form>> {
        self.record_call();
        Ok(lock(&self.forms).values().cloned().collect())
    }

    async fn fetch_form(&self, id: &str) -> anyhow::Result<Form> {
        self.record_call();
        lock(&self.forms)
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(id.to_string()).into())
    }

    async fn create_form(&self, form: &Form) -> anyhow::Result<String> {
        self.record_call();
        let id = self.allocate_id();
        let mut stored = form.clone();
        stored.id = Some(id.clone());
        lock(&self.forms).insert(id.clone(), stored);
        Ok(id)
    }

    async fn create_response(&self, response: &FormResponse) -> anyhow::Result<()> {
        self.record_call();
        if !lock(&self.forms).contains_key(&response.form_id) {
            return Err(ApiError::NotFound(response.form_id.clone()).into());
        }
        lock(&self.responses).push(response.clone());
        Ok(())
    }
}
