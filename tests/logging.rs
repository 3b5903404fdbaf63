//! Compilation events carry structured fields so operators can filter on
//! table, field and reason without parsing messages.

mod common;

use common::*;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

type Fields = BTreeMap<String, String>;

/// Records the fields of every event
#[derive(Clone, Default)]
struct Recorder {
    events: Arc<Mutex<Vec<Fields>>>,
}

struct FieldVisitor<'a>(&'a mut Fields);

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
}

impl<S: Subscriber> Layer<S> for Recorder {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = Fields::new();
        event.record(&mut FieldVisitor(&mut fields));
        self.events.lock().unwrap().push(fields);
    }
}

fn record(json: &str) -> Vec<Fields> {
    let policy = load_policy("policy.yaml");
    let recorder = Recorder::default();
    let subscriber = tracing_subscriber::registry().with(recorder.clone());
    tracing::subscriber::with_default(subscriber, || run_json(&policy, &finance(), json));
    let events = recorder.events.lock().unwrap().clone();
    events
}

fn with_message<'a>(events: &'a [Fields], message: &str) -> Vec<&'a Fields> {
    events
        .iter()
        .filter(|e| e.get("message").map(String::as_str) == Some(message))
        .collect()
}

#[test]
fn test_start_event_names_table() {
    let events = record(r#"{"table": "Sales_Orders", "metrics": [{"field": "amount_total"}]}"#);
    let start = with_message(&events, "compiling query intent");
    assert_eq!(start.len(), 1);
    assert_eq!(start[0]["table"], "sales_orders");
    assert_eq!(start[0]["metrics"], "1");
}

#[test]
fn test_dropped_field_event_is_structured() {
    let events = record(
        r#"{"table": "sales_orders", "metrics": [{"field": "amount_total"}, {"field": "salary"}],
            "filters": [{"field": "bad field", "operator": "eq", "value": "x"}]}"#,
    );
    let adjusted = with_message(&events, "query intent adjusted");
    assert_eq!(adjusted.len(), 2);

    assert_eq!(adjusted[0]["table"], "sales_orders");
    assert_eq!(adjusted[0]["field"], "salary");
    assert_eq!(adjusted[0]["reason"], "not_accessible");

    assert_eq!(adjusted[1]["reason"], "invalid_identifier");
    assert!(!adjusted[1].contains_key("field"));
}

#[test]
fn test_time_fallback_event_is_structured() {
    let events = record(
        r#"{"table": "sales_orders", "metrics": [{"field": "amount_total"}],
            "timeFilter": {"type": "last_n_days", "n": 0}}"#,
    );
    let adjusted = with_message(&events, "query intent adjusted");
    assert_eq!(adjusted.len(), 1);
    assert_eq!(adjusted[0]["field"], "order_date");
    assert_eq!(adjusted[0]["reason"], "time_fallback");
}
