use reqwest::blocking::Client;
use serde_json::Value as JsonValue;
use url::Url;

use teamwork_model::{ModelType, Record};

use crate::error::Error;
use crate::models::{Log, Person, Project, Task, Tasklist};
use crate::remote::{RemoteService, Session};
use crate::types::{HttpRequest, HttpResponse};
use crate::wire::{self, TimeEntryBody};

/// [`RemoteService`] over Teamwork's JSON API.
///
/// Requests are sent to the installation URL with the session token as the
/// basic auth user name, the way Teamwork API keys are used.
///
/// # Example
///
/// ```ignore
/// use teamwork_api::{HttpTeamworkApi, RemoteService, Session};
///
/// let api = HttpTeamworkApi::with_session(&Session::new("token", "https://acme.teamwork.com"))?;
/// for project in api.projects()? {
///     println!("{}", project);
/// }
/// ```
pub struct HttpTeamworkApi {
    client: Client,
    base_url: Option<Url>,
    token: Option<String>,
}

impl HttpTeamworkApi {
    /// Create a client with no installation or token yet; call `login`.
    pub fn new() -> Result<Self, Error> {
        Ok(Self::with_client(Self::default_client()?))
    }

    /// Create a client for an existing session.
    pub fn with_session(session: &Session) -> Result<Self, Error> {
        let mut api = Self::new()?;
        api.base_url = Some(Url::parse(&session.installation)?);
        api.token = Some(session.token.clone());
        Ok(api)
    }

    /// Create a client with a custom reqwest client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: None,
            token: None,
        }
    }

    fn default_client() -> Result<Client, Error> {
        let mut headers = http::HeaderMap::new();
        headers.insert(
            http::header::USER_AGENT,
            http::HeaderValue::from_str(&format!("tw/{}", env!("CARGO_PKG_VERSION")))?,
        );
        headers.insert(
            http::header::ACCEPT,
            http::HeaderValue::from_static("application/json"),
        );
        Ok(Client::builder().default_headers(headers).build()?)
    }

    /// The current session, if logged in.
    pub fn session(&self) -> Option<Session> {
        match (&self.token, &self.base_url) {
            (Some(token), Some(url)) => Some(Session::new(
                token.clone(),
                url.as_str().trim_end_matches('/'),
            )),
            _ => None,
        }
    }

    /// Execute an HTTP request and return the response
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
        let url = if request.path.starts_with("http://") || request.path.starts_with("https://") {
            Url::parse(&request.path)?
        } else {
            self.base_url
                .as_ref()
                .ok_or(Error::Unauthenticated)?
                .join(&request.path)?
        };

        log::debug!("{} {}", request.method, url);

        let mut builder = self.client.request(request.method.into(), url.clone());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if request.authenticated {
            let token = self.token.as_ref().ok_or(Error::Unauthenticated)?;
            builder = builder.basic_auth(token, Some("X"));
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send()?;

        let status = response.status();
        let body_text = response.text()?;
        let body = serde_json::from_str(&body_text).unwrap_or(JsonValue::Null);

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            url: url.to_string(),
            body,
        })
    }

    /// Execute a request and fail on anything but a 2xx.
    ///
    /// `resource` names what was asked for in a 404 error.
    fn fetch(&self, request: &HttpRequest, resource: impl FnOnce() -> String) -> Result<HttpResponse, Error> {
        let response = self.execute(request)?;
        match response.status {
            _ if response.is_success() => Ok(response),
            401 => Err(Error::Unauthenticated),
            404 => Err(Error::NotFound {
                resource: resource(),
            }),
            status => Err(Error::Status {
                status,
                reason: response.status_text,
                url: response.url,
            }),
        }
    }

    fn list<T: ModelType>(
        &self,
        path: String,
        field: &'static str,
        to_record: fn(&JsonValue) -> Record,
    ) -> Result<Vec<T>, Error> {
        let response = self.fetch(&HttpRequest::get(path.as_str()), || path.clone())?;
        response
            .field(field)
            .and_then(JsonValue::as_array)
            .ok_or(Error::MissingField { field })?
            .iter()
            .map(|item| build(item, to_record))
            .collect()
    }
}

fn build<T: ModelType>(json: &JsonValue, to_record: fn(&JsonValue) -> Record) -> Result<T, Error> {
    T::from_record(to_record(json)).map_err(|source| Error::Model {
        model: T::DESCRIPTOR.name(),
        source,
    })
}

impl RemoteService for HttpTeamworkApi {
    fn login(
        &mut self,
        email: &str,
        password: &str,
        installation: &str,
    ) -> Result<Session, Error> {
        let base_url = Url::parse(installation)?;
        let request = HttpRequest::post(base_url.join("launchpad/v1/login.json")?.as_str())
            .unauthenticated()
            .with_body(serde_json::json!({ "email": email, "password": password }))?;

        let response = self.execute(&request)?;
        if matches!(response.status, 401 | 403) {
            return Err(Error::Login {
                email: email.to_string(),
            });
        }
        if !response.is_success() {
            return Err(Error::Status {
                status: response.status,
                reason: response.status_text,
                url: response.url,
            });
        }

        let token = response
            .field("token")
            .and_then(JsonValue::as_str)
            .ok_or(Error::MissingField { field: "token" })?;

        self.base_url = Some(base_url);
        self.token = Some(token.to_string());
        Ok(Session::new(token, installation.trim_end_matches('/')))
    }

    fn profile(&self) -> Result<Person, Error> {
        let response = self.fetch(&HttpRequest::get("me.json"), || "Profile".to_string())?;
        let person = response
            .field("person")
            .ok_or(Error::MissingField { field: "person" })?;
        build(person, wire::person_record)
    }

    fn projects(&self) -> Result<Vec<Project>, Error> {
        self.list("projects.json".to_string(), "projects", wire::project_record)
    }

    fn tasklists(&self, project_id: i64) -> Result<Vec<Tasklist>, Error> {
        self.list(
            format!("projects/{}/tasklists.json", project_id),
            "tasklists",
            wire::tasklist_record,
        )
    }

    fn tasks(&self, tasklist_id: i64) -> Result<Vec<Task>, Error> {
        self.list(
            format!("tasklists/{}/tasks.json", tasklist_id),
            "todo-items",
            wire::task_record,
        )
    }

    fn task(&self, id: i64) -> Result<Task, Error> {
        let request = HttpRequest::get(format!("tasks/{}.json", id));
        let response = self.fetch(&request, || format!("Task #{}", id))?;
        let task = response
            .field("todo-item")
            .ok_or(Error::MissingField { field: "todo-item" })?;
        build(task, wire::task_record)
    }

    fn logs(&self, task_id: i64) -> Result<Vec<Log>, Error> {
        self.list(
            format!("tasks/{}/time_entries.json", task_id),
            "time-entries",
            wire::log_record,
        )
    }

    fn log_time(&mut self, task_id: i64, log: &Log) -> Result<Log, Error> {
        let request = HttpRequest::post(format!("tasks/{}/time_entries.json", task_id))
            .with_body(TimeEntryBody::from_log(log))?;
        let response = self.fetch(&request, || format!("Task #{}", task_id))?;

        let id = response
            .field("timeLogId")
            .and_then(|id| match id {
                JsonValue::String(s) => s.parse().ok(),
                other => other.as_i64(),
            })
            .ok_or(Error::MissingField { field: "timeLogId" })?;
        Ok(log.with_id(id))
    }

    fn delete_log(&mut self, log_id: i64) -> Result<(), Error> {
        let request = HttpRequest::delete(format!("time_entries/{}.json", log_id));
        self.fetch(&request, || format!("Time log #{}", log_id))?;
        Ok(())
    }
}
