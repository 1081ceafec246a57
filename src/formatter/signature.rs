//! Render call signatures, argument values and return values.
//!
//! Output is bounded: sequences are summarised instead of listed, and outside
//! of pretty mode every value is cut to its first line and to `truncate` chars.

use super::value::TraceValue;
use crate::utils::config::ELLIPSIS;
use crate::utils::error::RenderError;

/// Render `identity(arg1, arg2, ...)`
///
/// # Arguments
/// * `identity` - "Target.method"
/// * `arguments` - Call arguments in declaration order
/// * `pretty` - Multi-line layout, values not shortened
/// * `truncate` - Max chars per value when not pretty
pub fn format_call(
    identity: &str,
    arguments: &[TraceValue],
    pretty: bool,
    truncate: Option<usize>,
) -> String {
    let multiline = pretty && arguments.len() > 1;
    let separator = if multiline { ",\n\t" } else { ", " };

    let rendered: Vec<String> = arguments
        .iter()
        .map(|argument| format_value(argument, pretty, truncate))
        .collect();

    let mut msg = String::new();
    if pretty {
        msg.push('\n');
    }
    msg.push_str(identity);
    if multiline {
        msg.push('\n');
    }
    msg.push('(');
    if multiline {
        msg.push_str("\n\t");
    }
    msg.push_str(&rendered.join(separator));
    if multiline {
        msg.push('\n');
    }
    msg.push(')');
    if pretty {
        msg.push('\n');
    }
    msg
}

/// Render a single value
///
/// Never fails: if the value cannot produce its text, the error message is
/// used instead.
pub fn format_value(value: &TraceValue, pretty: bool, truncate: Option<usize>) -> String {
    let text = render(value).unwrap_or_else(|e| e.message);
    if pretty {
        text
    } else {
        shorten(&text, truncate)
    }
}

/// Render a return value
///
/// Void calls render as "void". Rendering errors are shown as "[message]".
pub fn format_return_value(
    value: &TraceValue,
    returns_void: bool,
    pretty: bool,
    truncate: Option<usize>,
) -> String {
    if returns_void {
        return "void".to_string();
    }

    match render(value) {
        Ok(text) if pretty => text,
        Ok(text) => shorten(&text, truncate),
        Err(e) => format!("[{}]", e.message),
    }
}

/// Full textual form, before shortening
fn render(value: &TraceValue) -> Result<String, RenderError> {
    match value {
        TraceValue::Null => Ok("null".to_string()),
        TraceValue::Plain { text, .. } => Ok(text.clone()),
        TraceValue::Dynamic(value) => value.describe(),
        TraceValue::Sequence {
            type_name,
            elements,
        } => Ok(describe_sequence(type_name, elements)),
        TraceValue::Request(request) => Ok(format!(
            "{}(method={}, requestURI={})",
            request.type_name, request.method, request.uri
        )),
        TraceValue::Response(response) => {
            Ok(format!("{}(status={})", response.type_name, response.status))
        }
        TraceValue::UploadedFile(file) => Ok(format!("{}(name={})", file.type_name, file.name)),
        TraceValue::ProgramArgs(args) => Ok(args.join(", ")),
    }
}

/// Summarise a sequence without listing its elements
fn describe_sequence(type_name: &str, elements: &[TraceValue]) -> String {
    match elements {
        [] => format!("empty {}", type_name),
        [only] => format!(
            "{} containing {}",
            type_name,
            render(only).unwrap_or_else(|e| e.message)
        ),
        [first, ..] => format!(
            "{} containing {} {}",
            type_name,
            elements.len(),
            first.type_name()
        ),
    }
}

/// Keep the first line only, then cut to `truncate` chars
fn shorten(text: &str, truncate: Option<usize>) -> String {
    let first_line = match text.find('\n') {
        Some(index) => format!("{}{}", &text[..index], ELLIPSIS),
        None => text.to_string(),
    };

    match truncate {
        Some(max_len) => truncate_chars(&first_line, max_len),
        None => first_line,
    }
}

/// Cut `text` to at most `max_len` chars, ending in the ellipsis when cut.
///
/// The kept prefix never goes below zero chars, so a limit shorter than the
/// ellipsis yields just the ellipsis.
pub fn truncate_chars(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }

    let keep = max_len.saturating_sub(ELLIPSIS.chars().count());
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::value::Describe;
    use std::borrow::Cow;

    struct Broken;

    impl Describe for Broken {
        fn type_name(&self) -> Cow<'_, str> {
            Cow::Borrowed("Broken")
        }

        fn describe(&self) -> Result<String, RenderError> {
            Err(RenderError::new("lazy collection not initialised"))
        }
    }

    #[test]
    fn test_compact_call() {
        let args = vec![TraceValue::display(&7), TraceValue::text("rush")];
        assert_eq!(
            format_call("OrderService.process", &args, false, Some(100)),
            "OrderService.process(7, rush)"
        );
    }

    #[test]
    fn test_no_arguments() {
        assert_eq!(format_call("A.run", &[], false, None), "A.run()");
        assert_eq!(format_call("A.run", &[], true, None), "\nA.run()\n");
    }

    #[test]
    fn test_pretty_call_single_argument() {
        let args = vec![TraceValue::text("x")];
        assert_eq!(format_call("A.run", &args, true, None), "\nA.run(x)\n");
    }

    #[test]
    fn test_pretty_call_multiple_arguments() {
        let args = vec![TraceValue::text("x"), TraceValue::text("y")];
        assert_eq!(
            format_call("A.run", &args, true, None),
            "\nA.run\n(\n\tx,\n\ty\n)\n"
        );
    }

    #[test]
    fn test_sequences() {
        let empty = TraceValue::sequence("List", vec![]);
        assert_eq!(format_value(&empty, false, None), "empty List");

        let single = TraceValue::sequence("List", vec![TraceValue::object("Order", "Order(1)")]);
        assert_eq!(format_value(&single, false, None), "List containing Order(1)");

        let many = TraceValue::sequence(
            "List",
            (0..3).map(|i| TraceValue::object("Order", format!("Order({})", i))),
        );
        assert_eq!(format_value(&many, false, None), "List containing 3 Order");
    }

    #[test]
    fn test_sequence_of_nulls() {
        let nulls = TraceValue::sequence("Array", vec![TraceValue::Null, TraceValue::Null]);
        assert_eq!(format_value(&nulls, false, None), "Array containing 2 ");
    }

    #[test]
    fn test_payload_shapes() {
        assert_eq!(
            format_value(&TraceValue::request("POST", "/orders"), false, None),
            "Request(method=POST, requestURI=/orders)"
        );
        assert_eq!(
            format_value(&TraceValue::response(201), false, None),
            "Response(status=201)"
        );
        assert_eq!(
            format_value(&TraceValue::uploaded_file("invoice.pdf"), false, None),
            "UploadedFile(name=invoice.pdf)"
        );
        assert_eq!(
            format_value(&TraceValue::program_args(["--port", "8080"]), false, None),
            "--port, 8080"
        );
        assert_eq!(format_value(&TraceValue::Null, false, None), "null");
    }

    #[test]
    fn test_first_line_only() {
        let value = TraceValue::text("line one\nline two");
        assert_eq!(format_value(&value, false, None), "line one...");
        assert_eq!(format_value(&value, true, Some(3)), "line one\nline two");
    }

    #[test]
    fn test_truncate_long_string() {
        let value = TraceValue::text("x".repeat(200));
        let rendered = format_value(&value, false, Some(10));
        assert_eq!(rendered.chars().count(), 10);
        assert_eq!(rendered, "xxxxxxx...");
    }

    #[test]
    fn test_truncate_shorter_than_ellipsis() {
        assert_eq!(truncate_chars("abcdef", 2), "...");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn test_render_error_is_captured() {
        let value = TraceValue::dynamic(Broken);
        assert_eq!(
            format_value(&value, false, None),
            "lazy collection not initialised"
        );
        assert_eq!(
            format_return_value(&value, false, false, None),
            "[lazy collection not initialised]"
        );
    }

    #[test]
    fn test_void_return() {
        assert_eq!(
            format_return_value(&TraceValue::Null, true, false, None),
            "void"
        );
        assert_eq!(
            format_return_value(&TraceValue::Null, false, false, None),
            "null"
        );
    }
}
