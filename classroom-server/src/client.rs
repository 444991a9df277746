//! Blocking HTTP client for a running classroom server.

use std::time::Duration;

use serde::de::DeserializeOwned;

use classroom_core::{Class, ClassInput, Task, TaskInput};

use crate::api::{ErrorBody, HealthResponse};
use crate::error::ServerError;

const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    agent: ureq::Agent,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let agent = ureq::AgentBuilder::new().timeout(CLIENT_TIMEOUT).build();
        Self { base_url, agent }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn health(&self) -> Result<HealthResponse, ServerError> {
        self.get("/health")
    }

    // -- classes ------------------------------------------------------------

    pub fn list_classes(&self) -> Result<Vec<Class>, ServerError> {
        self.get("/classes")
    }

    pub fn get_class(&self, id: &str) -> Result<Class, ServerError> {
        self.get(&format!("/classes/{id}"))
    }

    pub fn create_class(&self, input: &ClassInput) -> Result<Class, ServerError> {
        let url = self.url("/classes");
        decode(&url, self.agent.post(&url).send_json(input))
    }

    pub fn update_class(&self, id: &str, input: &ClassInput) -> Result<Class, ServerError> {
        let url = self.url(&format!("/classes/{id}"));
        decode(&url, self.agent.put(&url).send_json(input))
    }

    pub fn delete_class(&self, id: &str) -> Result<(), ServerError> {
        let url = self.url(&format!("/classes/{id}"));
        check(&url, self.agent.delete(&url).call())
    }

    pub fn list_class_tasks(&self, id: &str) -> Result<Vec<Task>, ServerError> {
        self.get(&format!("/classes/{id}/tasks"))
    }

    // -- tasks --------------------------------------------------------------

    pub fn list_tasks(&self) -> Result<Vec<Task>, ServerError> {
        self.get("/tasks")
    }

    pub fn get_task(&self, id: &str) -> Result<Task, ServerError> {
        self.get(&format!("/tasks/{id}"))
    }

    pub fn create_task(&self, input: &TaskInput) -> Result<Task, ServerError> {
        let url = self.url("/tasks");
        decode(&url, self.agent.post(&url).send_json(input))
    }

    pub fn update_task(&self, id: &str, input: &TaskInput) -> Result<Task, ServerError> {
        let url = self.url(&format!("/tasks/{id}"));
        decode(&url, self.agent.put(&url).send_json(input))
    }

    pub fn delete_task(&self, id: &str) -> Result<(), ServerError> {
        let url = self.url(&format!("/tasks/{id}"));
        check(&url, self.agent.delete(&url).call())
    }

    pub fn close_task(&self, id: &str) -> Result<Task, ServerError> {
        let url = self.url(&format!("/tasks/{id}/close"));
        decode(&url, self.agent.request("PATCH", &url).call())
    }

    pub fn open_task(&self, id: &str) -> Result<Task, ServerError> {
        let url = self.url(&format!("/tasks/{id}/open"));
        decode(&url, self.agent.request("PATCH", &url).call())
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServerError> {
        let url = self.url(path);
        decode(&url, self.agent.get(&url).call())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn decode<T: DeserializeOwned>(
    url: &str,
    result: Result<ureq::Response, ureq::Error>,
) -> Result<T, ServerError> {
    let response = result.map_err(|err| classify(url, err))?;
    response
        .into_json::<T>()
        .map_err(|e| ServerError::Protocol(format!("malformed response from {url}: {e}")))
}

fn check(url: &str, result: Result<ureq::Response, ureq::Error>) -> Result<(), ServerError> {
    result.map(|_| ()).map_err(|err| classify(url, err))
}

fn classify(url: &str, err: ureq::Error) -> ServerError {
    match err {
        ureq::Error::Status(status, response) => {
            let fallback = response.status_text().to_string();
            let message = response
                .into_json::<ErrorBody>()
                .map(|body| body.message)
                .unwrap_or(fallback);
            ServerError::Api { status, message }
        }
        ureq::Error::Transport(transport) => ServerError::Unreachable {
            url: url.to_string(),
            message: transport.to_string(),
        },
    }
}
