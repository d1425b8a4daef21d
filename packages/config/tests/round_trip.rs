use std::sync::Arc;

use chrono::{TimeZone, Utc};
use serde_json::json;

use teamwork_config::{ConfigError, ConfigStore, Pattern, Serializer, TypeEntry, TypeRegistry};
use teamwork_model::{
    coerce, construct, record, Descriptor, FieldSpec, Instance, Model, Record, Taggable,
    ValidationError, Value,
};

static TASK: Descriptor = Descriptor::new(
    "Task",
    &[
        ("id", FieldSpec::RequiredFn(coerce::number)),
        ("title", FieldSpec::RequiredFn(coerce::string)),
    ],
);

static CUSTOMER: Descriptor = Descriptor::new(
    "Customer",
    &[
        ("id", FieldSpec::RequiredFn(coerce::integer)),
        ("name", FieldSpec::OptionalFn(coerce::string)),
    ],
);

fn customer(data: Record) -> Result<Instance, ValidationError> {
    construct(&CUSTOMER, data).map(Instance::new)
}

static ORDER: Descriptor = Descriptor::new(
    "Order",
    &[
        ("number", FieldSpec::RequiredFn(coerce::integer)),
        ("customer", FieldSpec::Required(customer)),
        ("previous", FieldSpec::Optional(customer)),
    ],
);

#[derive(Debug, PartialEq)]
struct SampleModel {
    foo: Value,
    bar: Value,
}

impl Taggable for SampleModel {
    fn type_name(&self) -> &str {
        "SampleModel"
    }

    fn properties(&self) -> Record {
        record! { "foo" => self.foo.clone(), "bar" => self.bar.clone() }
    }
}

#[derive(Debug, PartialEq)]
struct ExampleModel {
    root: Value,
    items: Vec<Value>,
    boof: String,
    boot: Value,
}

impl Taggable for ExampleModel {
    fn type_name(&self) -> &str {
        "ExampleModel"
    }

    fn properties(&self) -> Record {
        record! {
            "root" => self.root.clone(),
            "items" => self.items.clone(),
            "boof" => self.boof.as_str(),
            "boot" => self.boot.clone(),
        }
    }
}

#[derive(Debug, PartialEq)]
struct Foobar;

impl Taggable for Foobar {
    fn type_name(&self) -> &str {
        "Foobar"
    }
}

fn sample_model(mut data: Record) -> Result<Instance, ConfigError> {
    assert!(!data.contains_key("className"), "className still present");
    Ok(Instance::new(SampleModel {
        foo: data.shift_remove("foo").unwrap_or_default(),
        bar: data.shift_remove("bar").unwrap_or_default(),
    }))
}

fn example_model(mut data: Record) -> Result<Instance, ConfigError> {
    let items = match data.shift_remove("items") {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    assert!(items
        .iter()
        .all(|item| item.downcast_ref::<SampleModel>().is_some()));

    Ok(Instance::new(ExampleModel {
        root: data.shift_remove("root").unwrap_or_default(),
        items,
        boof: "foobar".to_string(),
        boot: data.shift_remove("boot").unwrap_or_default(),
    }))
}

fn registry() -> Arc<TypeRegistry> {
    let mut registry = TypeRegistry::with_builtins();
    registry
        .register("SampleModel", TypeEntry::constructor(sample_model))
        .unwrap()
        .register("ExampleModel", TypeEntry::constructor(example_model))
        .unwrap()
        .register(
            "Foobar",
            Serializer::typed::<Foobar>(
                |_| Ok(Value::Map(record! { "foo" => "bar" })),
                |_| Ok(Foobar),
            ),
        )
        .unwrap()
        .register_descriptor(&TASK)
        .unwrap()
        .register_descriptor(&CUSTOMER)
        .unwrap()
        .register_descriptor(&ORDER)
        .unwrap();
    Arc::new(registry)
}

fn sample(foo: i64, bar: i64) -> Value {
    Value::instance(SampleModel {
        foo: foo.into(),
        bar: bar.into(),
    })
}

#[test]
fn test_current_task_round_trip() {
    let registry = registry();
    let task = construct(&TASK, record! { "id" => 5, "title" => "Fix bug" }).unwrap();

    let mut store = ConfigStore::new(registry.clone());
    store.set("current", Value::instance(task.clone()));

    let json = store.to_json().unwrap();
    assert_eq!(
        json,
        json!({"current": {"className": "Task", "id": 5, "title": "Fix bug"}})
    );

    let reloaded = ConfigStore::from_json(registry, json).unwrap();
    let current: &Model = reloaded.get_as("current").unwrap();
    assert_eq!(current, &task);
    assert_eq!(current.str("title"), Some("Fix bug"));
}

#[test]
fn test_nested_instances_and_serializer_pack() {
    let registry = registry();
    let example = Value::instance(ExampleModel {
        root: sample(1, 2),
        items: vec![sample(1, 2), sample(1, 2)],
        boof: "foobar".to_string(),
        boot: Value::instance(Foobar),
    });

    let packed = registry.pack(&example).unwrap();
    let expected = teamwork_model::json_to_value(json!({
        "root": {"foo": 1, "bar": 2, "className": "SampleModel"},
        "items": [
            {"className": "SampleModel", "foo": 1, "bar": 2},
            {"className": "SampleModel", "foo": 1, "bar": 2}
        ],
        "className": "ExampleModel",
        "boof": "foobar",
        "boot": {"serialized": {"foo": "bar"}, "className": "Foobar"}
    }));
    assert_eq!(packed, expected);

    assert_eq!(registry.unpack(packed).unwrap(), example);
}

#[test]
fn test_order_with_customer_survives_json_text() {
    let registry = registry();
    let order = construct(
        &ORDER,
        record! {
            "number" => "42",
            "customer" => record! { "id" => "7", "name" => "Ann" },
        },
    )
    .unwrap();

    let mut store = ConfigStore::new(registry.clone());
    store.set("order", Value::instance(order.clone()));

    let text = serde_json::to_string_pretty(&store.to_json().unwrap()).unwrap();
    assert!(!text.contains("previous"));

    let reloaded =
        ConfigStore::from_json(registry, serde_json::from_str(&text).unwrap()).unwrap();
    let revived: &Model = reloaded.get_as("order").unwrap();
    assert_eq!(revived, &order);
    assert!(revived.field("previous").is_undefined());

    let customer: &Model = revived.nested("customer").unwrap();
    assert_eq!(customer.i64("id"), Some(7));
    assert_eq!(
        reloaded.get_path("order/customer/name"),
        Some(Value::from("Ann"))
    );
}

#[test]
fn test_dates_and_patterns_round_trip() {
    let registry = registry();
    let since = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();

    let mut store = ConfigStore::new(registry.clone());
    store.set("since", Value::instance(since));
    store.set("filter", Value::instance(Pattern::new("^fix", "gi").unwrap()));

    let json = store.to_json().unwrap();
    assert_eq!(
        json["since"],
        json!({"className": "Date", "serialized": "2024-03-01T09:30:00Z"})
    );

    let reloaded = ConfigStore::from_json(registry, json).unwrap();
    assert_eq!(reloaded.get_as::<chrono::DateTime<Utc>>("since"), Some(&since));

    let filter: &Pattern = reloaded.get_as("filter").unwrap();
    assert_eq!(filter.source(), "^fix");
    assert_eq!(filter.flags(), "gi");
    assert!(filter.is_match("FIX the build"));
}

#[test]
fn test_missing_required_field_fails_on_reload() {
    let registry = registry();
    let err = ConfigStore::from_json(
        registry,
        json!({"current": {"className": "Task", "title": "No id"}}),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        ConfigError::Validation { ref name, source: ValidationError::Required { ref field } }
            if name == "Task" && field == "id"
    ));
}

#[test]
fn test_unknown_type_fails_on_reload() {
    let err = ConfigStore::from_json(
        registry(),
        json!({"current": {"className": "NotRegistered"}}),
    )
    .unwrap_err();

    assert_eq!(err.to_string(), "Unknown model NotRegistered.");
}
