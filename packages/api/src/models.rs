//! Teamwork domain models.
//!
//! Each model is a typed wrapper around a descriptor-built [`Model`].
//! Properties derived at runtime (a person's full name, a tasklist's title)
//! are stored as model extras: they travel with the packed config but never
//! appear in `to_json`.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use teamwork_config::{ConfigError, TypeRegistry};
use teamwork_model::{
    coerce, record, Descriptor, FieldSpec, Model, ModelType, Record, Taggable, ValidationError,
    Value,
};

use crate::error::Error;
use crate::parse::parse_installation;
use crate::remote::Session;

macro_rules! teamwork_model {
    (
        $(#[$meta:meta])*
        $name:ident $(($runtime:path))? {
            $($field:literal => $spec:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            model: Model,
        }

        impl ModelType for $name {
            const DESCRIPTOR: &'static Descriptor =
                &Descriptor::new(stringify!($name), &[$(($field, $spec)),+]);

            #[allow(unused_mut)]
            fn from_model(mut model: Model) -> Self {
                $($runtime(&mut model);)?
                Self { model }
            }

            fn model(&self) -> &Model {
                &self.model
            }
        }

        impl Taggable for $name {
            fn type_name(&self) -> &str {
                Self::DESCRIPTOR.name()
            }

            fn properties(&self) -> Record {
                self.model.properties()
            }
        }
    };
}

teamwork_model! {
    Company {
        "name" => FieldSpec::OptionalFn(coerce::string),
        "id" => FieldSpec::RequiredFn(coerce::number),
    }
}

impl Company {
    pub fn id(&self) -> Option<i64> {
        self.model.i64("id")
    }

    pub fn name(&self) -> Option<&str> {
        self.model.str("name")
    }
}

teamwork_model! {
    /// A Teamwork user. `name` is derived as "First Last".
    Person (person_runtime) {
        "id" => FieldSpec::RequiredFn(coerce::number),
        "firstName" => FieldSpec::RequiredFn(coerce::string),
        "lastName" => FieldSpec::RequiredFn(coerce::string),
        "avatar" => FieldSpec::OptionalFn(coerce::string),
        "username" => FieldSpec::OptionalFn(coerce::string),
    }
}

fn person_runtime(model: &mut Model) {
    let name = format!(
        "{} {}",
        model.str("firstName").unwrap_or_default(),
        model.str("lastName").unwrap_or_default()
    );
    model.set("name", name);
}

impl Person {
    pub fn id(&self) -> Option<i64> {
        self.model.i64("id")
    }

    pub fn first_name(&self) -> &str {
        self.model.str("firstName").unwrap_or_default()
    }

    pub fn last_name(&self) -> &str {
        self.model.str("lastName").unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.model
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// "First L."
    pub fn initialed(&self) -> String {
        match self.last_name().trim().chars().next() {
            Some(initial) => format!("{} {}.", self.first_name(), initial.to_uppercase()),
            None => self.first_name().to_string(),
        }
    }
}

teamwork_model! {
    Project {
        "id" => FieldSpec::RequiredFn(coerce::integer),
        "name" => FieldSpec::OptionalFn(coerce::string),
        "description" => FieldSpec::OptionalFn(coerce::string),
        "company" => FieldSpec::Optional(Company::construct_instance),
    }
}

impl Project {
    pub fn id(&self) -> Option<i64> {
        self.model.i64("id")
    }

    pub fn name(&self) -> &str {
        self.model.str("name").unwrap_or_default()
    }

    pub fn description(&self) -> Option<&str> {
        self.model.str("description")
    }

    pub fn company(&self) -> Option<&Company> {
        self.model.nested("company")
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[#{}] {}", self.id().unwrap_or_default(), self.name())
    }
}

teamwork_model! {
    /// A list of tasks inside a project. `title` mirrors `name`.
    Tasklist (tasklist_runtime) {
        "id" => FieldSpec::OptionalFn(coerce::integer),
        "name" => FieldSpec::OptionalFn(coerce::string),
        "description" => FieldSpec::OptionalFn(coerce::string),
        "domain" => FieldSpec::OptionalFn(coerce::string),
        "complete" => FieldSpec::OptionalFn(coerce::boolean),
        "private" => FieldSpec::OptionalFn(coerce::boolean),
        "uncompletedCount" => FieldSpec::OptionalFn(coerce::number),
        "project" => FieldSpec::Optional(Project::construct_instance),
    }
}

fn tasklist_runtime(model: &mut Model) {
    let title = model.field("name").clone();
    model.set("title", title);
}

impl Tasklist {
    pub fn id(&self) -> Option<i64> {
        self.model.i64("id")
    }

    pub fn name(&self) -> &str {
        self.model.str("name").unwrap_or_default()
    }

    pub fn title(&self) -> Option<&str> {
        self.model.get("title").and_then(Value::as_str)
    }

    pub fn uncompleted_count(&self) -> i64 {
        self.model.i64("uncompletedCount").unwrap_or_default()
    }

    pub fn project(&self) -> Option<&Project> {
        self.model.nested("project")
    }

    pub fn url(&self) -> String {
        format!(
            "http://{}/tasklists/{}",
            self.model.str("domain").unwrap_or_default(),
            self.id().unwrap_or_default()
        )
    }
}

impl fmt::Display for Tasklist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[#{}] {}", self.id().unwrap_or_default(), self.name())
    }
}

teamwork_model! {
    Tag {
        "id" => FieldSpec::RequiredFn(coerce::integer),
        "name" => FieldSpec::RequiredFn(coerce::string),
        "color" => FieldSpec::OptionalFn(coerce::string),
    }
}

impl Tag {
    pub fn name(&self) -> &str {
        self.model.str("name").unwrap_or_default()
    }
}

teamwork_model! {
    Task {
        "id" => FieldSpec::RequiredFn(coerce::integer),
        "title" => FieldSpec::RequiredFn(coerce::string),
        "description" => FieldSpec::OptionalFn(coerce::string),
        "status" => FieldSpec::OptionalFn(coerce::string),
        "priority" => FieldSpec::OptionalFn(coerce::string),
        "progress" => FieldSpec::OptionalFn(coerce::number),
        "tags" => FieldSpec::Optional(Tag::construct_instance),
        "tasklist" => FieldSpec::Optional(Tasklist::construct_instance),
        "project" => FieldSpec::Optional(Project::construct_instance),
        "author" => FieldSpec::Optional(Person::construct_instance),
        "assigned" => FieldSpec::Optional(Person::construct_instance),
    }
}

impl Task {
    pub fn id(&self) -> Option<i64> {
        self.model.i64("id")
    }

    pub fn title(&self) -> &str {
        self.model.str("title").unwrap_or_default()
    }

    pub fn priority(&self) -> Option<&str> {
        self.model.str("priority").filter(|p| !p.is_empty())
    }

    pub fn tags(&self) -> Vec<&Tag> {
        self.model
            .field("tags")
            .as_array()
            .unwrap_or_default()
            .iter()
            .filter_map(Value::downcast_ref)
            .collect()
    }

    pub fn tasklist(&self) -> Option<&Tasklist> {
        self.model.nested("tasklist")
    }

    pub fn project(&self) -> Option<&Project> {
        self.model.nested("project")
    }

    pub fn author(&self) -> Option<&Person> {
        self.model.nested("author")
    }

    pub fn assigned(&self) -> Option<&Person> {
        self.model.nested("assigned")
    }

    /// "<n>%"
    pub fn progress_label(&self) -> String {
        format!("{}%", self.model.i64("progress").unwrap_or_default())
    }

    /// The task's page on `installation`.
    pub fn url(&self, installation: &Installation) -> String {
        format!(
            "{}/tasks/{}",
            installation.url().trim_end_matches('/'),
            self.id().unwrap_or_default()
        )
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[#{}] {} ({})",
            self.id().unwrap_or_default(),
            self.title(),
            self.progress_label()
        )
    }
}

teamwork_model! {
    /// A time entry against a task.
    Log {
        "id" => FieldSpec::OptionalFn(coerce::integer),
        "minutes" => FieldSpec::RequiredFn(coerce::integer),
        "hours" => FieldSpec::RequiredFn(coerce::integer),
        "description" => FieldSpec::OptionalFn(coerce::string),
        "date" => FieldSpec::OptionalFn(coerce::timestamp),
        "isBilled" => FieldSpec::OptionalFn(coerce::boolean),
        "author" => FieldSpec::Optional(Person::construct_instance),
        "task" => FieldSpec::Optional(Task::construct_instance),
        "tasklist" => FieldSpec::Optional(Tasklist::construct_instance),
        "project" => FieldSpec::Optional(Project::construct_instance),
        "company" => FieldSpec::Optional(Company::construct_instance),
    }
}

impl Log {
    /// A new entry of `minutes` length starting at `offset`, split into
    /// whole hours and remaining minutes.
    pub fn create(
        minutes: i64,
        offset: DateTime<Utc>,
        author: Option<&Person>,
        description: Option<&str>,
    ) -> Result<Self, ValidationError> {
        Self::from_record(record! {
            "minutes" => minutes.rem_euclid(60),
            "hours" => minutes.div_euclid(60),
            "description" => description,
            "date" => Value::instance(offset),
            "author" => author.cloned().map(Value::instance),
        })
    }

    pub fn id(&self) -> Option<i64> {
        self.model.i64("id")
    }

    pub fn hours(&self) -> i64 {
        self.model.i64("hours").unwrap_or_default()
    }

    pub fn minutes(&self) -> i64 {
        self.model.i64("minutes").unwrap_or_default()
    }

    /// Whole length in minutes, saturating on absurd server values.
    pub fn total_minutes(&self) -> i64 {
        self.hours().saturating_mul(60).saturating_add(self.minutes())
    }

    /// `None` when the length is beyond what a [`Duration`] can hold.
    pub fn duration(&self) -> Option<Duration> {
        Duration::try_minutes(self.total_minutes())
    }

    pub fn description(&self) -> Option<&str> {
        self.model.str("description")
    }

    pub fn date(&self) -> Option<&DateTime<Utc>> {
        self.model.nested("date")
    }

    pub fn author(&self) -> Option<&Person> {
        self.model.nested("author")
    }

    pub fn task(&self) -> Option<&Task> {
        self.model.nested("task")
    }

    /// Returns a copy attached to `task`.
    pub fn with_task(&self, task: &Task) -> Self {
        let mut model = self.model.clone();
        model.set("task", Value::instance(task.clone()));
        Self { model }
    }

    /// Returns a copy carrying the id the server assigned.
    pub fn with_id(&self, id: i64) -> Self {
        let mut model = self.model.clone();
        model.set("id", id);
        Self { model }
    }
}

impl fmt::Display for Log {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let who = self
            .author()
            .map(Person::initialed)
            .unwrap_or_else(|| "Someone".to_string());
        write!(f, "{} logged {}", who, format_duration(self.total_minutes()))?;
        if let Some(date) = self.date() {
            write!(f, " on {}", date.format("%Y-%m-%d %H:%M"))?;
        }
        if let Some(description) = self.description().filter(|d| !d.is_empty()) {
            write!(f, "\n\n    {}", description.replace('\n', "\n    "))?;
        }
        Ok(())
    }
}

/// "1h 30m", "45m", "2h" for a length in minutes.
pub fn format_duration(total: i64) -> String {
    match (total / 60, total % 60) {
        (0, minutes) => format!("{}m", minutes),
        (hours, 0) => format!("{}h", hours),
        (hours, minutes) => format!("{}h {}m", hours, minutes),
    }
}

teamwork_model! {
    /// A Teamwork site, e.g. `acme.teamwork.com`.
    Installation {
        "domain" => FieldSpec::OptionalFn(coerce::string),
        "url" => FieldSpec::OptionalFn(coerce::string),
        "name" => FieldSpec::OptionalFn(coerce::string),
        "projectsEnabled" => FieldSpec::OptionalFn(coerce::boolean),
        "chatEnabled" => FieldSpec::OptionalFn(coerce::boolean),
        "deskEnabled" => FieldSpec::OptionalFn(coerce::boolean),
        "company" => FieldSpec::Optional(Company::construct_instance),
    }
}

impl Installation {
    /// An installation known only by its URL.
    pub fn from_url(url: &str) -> Result<Self, Error> {
        let name = parse_installation(url)?;
        Self::from_record(record! {
            "domain" => format!("{}.teamwork.com", name),
            "url" => format!("https://{}.teamwork.com", name),
            "name" => name,
        })
        .map_err(|source| Error::Model {
            model: "Installation",
            source,
        })
    }

    pub fn name(&self) -> &str {
        self.model.str("name").unwrap_or_default()
    }

    pub fn domain(&self) -> &str {
        self.model.str("domain").unwrap_or_default()
    }

    pub fn url(&self) -> &str {
        self.model.str("url").unwrap_or_default()
    }
}

impl fmt::Display for Installation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.domain())
    }
}

/// A registry holding every domain model, the authenticated session and
/// the built-in `Date` and `Pattern` serializers.
pub fn registry() -> Result<TypeRegistry, ConfigError> {
    let mut registry = TypeRegistry::with_builtins();
    registry
        .register_model::<Company>()?
        .register_model::<Person>()?
        .register_model::<Project>()?
        .register_model::<Tasklist>()?
        .register_model::<Tag>()?
        .register_model::<Task>()?
        .register_model::<Log>()?
        .register_model::<Installation>()?
        .register(crate::remote::SESSION_TYPE, Session::serializer())?;
    Ok(registry)
}
