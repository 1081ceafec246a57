use call_profiler::formatter::{
    format_call, format_identity, format_return_value, format_value, Describe, ProxiedTarget,
    ProxyRenameRule, TargetDescriptor, ToTraceValue, TraceValue,
};
use call_profiler::utils::error::RenderError;
use pretty_assertions::assert_eq;
use std::borrow::Cow;

#[derive(Debug)]
struct Order {
    id: u32,
}

impl ToTraceValue for Order {
    fn to_trace_value(&self) -> TraceValue {
        TraceValue::object("Order", format!("Order(id={})", self.id))
    }
}

struct Unprintable;

impl Describe for Unprintable {
    fn type_name(&self) -> Cow<'_, str> {
        Cow::Borrowed("Unprintable")
    }

    fn describe(&self) -> Result<String, RenderError> {
        Err(RenderError::new("failed to lazily initialize a collection"))
    }
}

#[test]
fn test_collection_of_orders_is_summarised() {
    let orders: Vec<Order> = (1..=5).map(|id| Order { id }).collect();
    assert_eq!(
        format_value(&orders.to_trace_value(), false, None),
        "Vec containing 5 Order"
    );

    let slice: &[Order] = &orders[..2];
    assert_eq!(
        format_value(&slice.to_trace_value(), false, None),
        "Array containing 2 Order"
    );
}

#[test]
fn test_single_element_collection_shows_element() {
    let orders = vec![Order { id: 9 }];
    assert_eq!(
        format_value(&orders.to_trace_value(), false, None),
        "Vec containing Order(id=9)"
    );
}

#[test]
fn test_empty_collection() {
    let orders: Vec<Order> = Vec::new();
    assert_eq!(format_value(&orders.to_trace_value(), false, None), "empty Vec");
}

#[test]
fn test_long_single_line_is_truncated() {
    let text = "a".repeat(200);
    let rendered = format_value(&TraceValue::text(text), false, Some(10));

    assert_eq!(rendered.chars().count(), 10);
    assert!(rendered.ends_with("..."));
}

#[test]
fn test_multiline_then_truncated() {
    let value = TraceValue::text("first line that is long\nsecond");
    assert_eq!(format_value(&value, false, None), "first line that is long...");
    assert_eq!(format_value(&value, false, Some(12)), "first lin...");
}

#[test]
fn test_pretty_mode_keeps_everything() {
    let value = TraceValue::text(format!("{}\n{}", "b".repeat(150), "tail"));
    let rendered = format_value(&value, true, Some(10));
    assert_eq!(rendered.chars().count(), 155);
}

#[test]
fn test_render_failure_becomes_text() {
    let value = TraceValue::dynamic(Unprintable);
    assert_eq!(
        format_call("Report.build", &[value.clone()], false, Some(100)),
        "Report.build(failed to lazily initialize a collection)"
    );
    assert_eq!(
        format_return_value(&value, false, false, Some(100)),
        "[failed to lazily initialize a collection]"
    );
}

#[test]
fn test_call_with_mixed_arguments() {
    let args = vec![
        TraceValue::request("GET", "/orders"),
        42u64.to_trace_value(),
        Some("express").to_trace_value(),
        None::<u8>.to_trace_value(),
    ];

    assert_eq!(
        format_call("OrderController.list", &args, false, Some(100)),
        "OrderController.list(Request(method=GET, requestURI=/orders), 42, express, null)"
    );
}

#[test]
fn test_pretty_call_layout() {
    let args = vec![TraceValue::response(404), TraceValue::uploaded_file("a.csv")];
    assert_eq!(
        format_call("Upload.store", &args, true, None),
        "\nUpload.store\n(\n\tResponse(status=404),\n\tUploadedFile(name=a.csv)\n)\n"
    );
}

#[test]
fn test_identity_with_custom_rules() {
    let rules = vec![ProxyRenameRule::Suffix("Dao".to_string())];
    let target = TargetDescriptor::proxy(ProxiedTarget::Known("GenericDao".into()))
        .with_interface("CustomerStore");

    assert_eq!(
        format_identity(Some(&target), "load", &rules),
        "CustomerStore.load"
    );
    assert_eq!(format_identity(Some(&target), "load", &[]), "GenericDao.load");
}
