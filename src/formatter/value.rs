//! Values as seen by the formatter.
//!
//! Arguments and return values of instrumented calls are converted into a
//! `TraceValue` before rendering. Common payload shapes (requests, responses,
//! uploads, program arguments, sequences) get their own variants so they can
//! be summarised instead of dumped.

use crate::utils::error::RenderError;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// A value whose textual form is produced on demand and may fail
pub trait Describe: Send + Sync {
    /// Simple type name, e.g. "Order"
    fn type_name(&self) -> Cow<'_, str>;

    fn describe(&self) -> Result<String, RenderError>;
}

/// Incoming request, rendered as method and URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSummary {
    pub type_name: String,
    pub method: String,
    pub uri: String,
}

/// Outgoing response, rendered as its status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSummary {
    pub type_name: String,
    pub status: u16,
}

/// Uploaded file, rendered as its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub type_name: String,
    pub name: String,
}

/// An argument or return value of an instrumented call
#[derive(Clone)]
pub enum TraceValue {
    Null,

    /// Already-rendered text with the type it came from
    Plain { type_name: String, text: String },

    /// Rendered lazily; rendering may fail
    Dynamic(Arc<dyn Describe>),

    /// Array or collection
    Sequence {
        type_name: String,
        elements: Vec<TraceValue>,
    },

    Request(RequestSummary),
    Response(ResponseSummary),
    UploadedFile(UploadedFile),

    /// Raw command-line arguments of the program
    ProgramArgs(Vec<String>),
}

impl TraceValue {
    /// A string value
    pub fn text(text: impl Into<String>) -> Self {
        TraceValue::Plain {
            type_name: "String".to_string(),
            text: text.into(),
        }
    }

    /// Any `Display` value, typed by its Rust type name
    pub fn display<T: fmt::Display + ?Sized>(value: &T) -> Self {
        TraceValue::Plain {
            type_name: simple_type_name(std::any::type_name::<T>()).to_string(),
            text: value.to_string(),
        }
    }

    /// Any `Debug` value, typed by its Rust type name
    pub fn debug<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        TraceValue::Plain {
            type_name: simple_type_name(std::any::type_name::<T>()).to_string(),
            text: format!("{:?}", value),
        }
    }

    /// Explicitly typed text, e.g. `TraceValue::object("Order", "Order(id=1)")`
    pub fn object(type_name: impl Into<String>, text: impl Into<String>) -> Self {
        TraceValue::Plain {
            type_name: type_name.into(),
            text: text.into(),
        }
    }

    pub fn dynamic(value: impl Describe + 'static) -> Self {
        TraceValue::Dynamic(Arc::new(value))
    }

    pub fn sequence(
        type_name: impl Into<String>,
        elements: impl IntoIterator<Item = TraceValue>,
    ) -> Self {
        TraceValue::Sequence {
            type_name: type_name.into(),
            elements: elements.into_iter().collect(),
        }
    }

    pub fn request(method: impl Into<String>, uri: impl Into<String>) -> Self {
        TraceValue::Request(RequestSummary {
            type_name: "Request".to_string(),
            method: method.into(),
            uri: uri.into(),
        })
    }

    pub fn response(status: u16) -> Self {
        TraceValue::Response(ResponseSummary {
            type_name: "Response".to_string(),
            status,
        })
    }

    pub fn uploaded_file(name: impl Into<String>) -> Self {
        TraceValue::UploadedFile(UploadedFile {
            type_name: "UploadedFile".to_string(),
            name: name.into(),
        })
    }

    pub fn program_args<S: Into<String>>(args: impl IntoIterator<Item = S>) -> Self {
        TraceValue::ProgramArgs(args.into_iter().map(Into::into).collect())
    }

    /// Simple type name; empty for null
    pub fn type_name(&self) -> Cow<'_, str> {
        match self {
            TraceValue::Null => Cow::Borrowed(""),
            TraceValue::Plain { type_name, .. } => Cow::Borrowed(type_name),
            TraceValue::Dynamic(value) => value.type_name(),
            TraceValue::Sequence { type_name, .. } => Cow::Borrowed(type_name),
            TraceValue::Request(request) => Cow::Borrowed(&request.type_name),
            TraceValue::Response(response) => Cow::Borrowed(&response.type_name),
            TraceValue::UploadedFile(file) => Cow::Borrowed(&file.type_name),
            TraceValue::ProgramArgs(_) => Cow::Borrowed("ProgramArgs"),
        }
    }
}

impl fmt::Debug for TraceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceValue::Null => f.write_str("Null"),
            TraceValue::Plain { type_name, text } => f
                .debug_struct("Plain")
                .field("type_name", type_name)
                .field("text", text)
                .finish(),
            TraceValue::Dynamic(value) => write!(f, "Dynamic({})", value.type_name()),
            TraceValue::Sequence {
                type_name,
                elements,
            } => f
                .debug_struct("Sequence")
                .field("type_name", type_name)
                .field("elements", elements)
                .finish(),
            TraceValue::Request(request) => f.debug_tuple("Request").field(request).finish(),
            TraceValue::Response(response) => f.debug_tuple("Response").field(response).finish(),
            TraceValue::UploadedFile(file) => f.debug_tuple("UploadedFile").field(file).finish(),
            TraceValue::ProgramArgs(args) => f.debug_tuple("ProgramArgs").field(args).finish(),
        }
    }
}

/// Strip module paths and generic parameters from a Rust type name.
///
/// "alloc::vec::Vec<shop::Order>" becomes "Vec".
pub fn simple_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Conversion of host values into trace values
pub trait ToTraceValue {
    fn to_trace_value(&self) -> TraceValue;

    /// Message of the failure this value represents, if any
    fn failure(&self) -> Option<String> {
        None
    }

    /// True for the unit type, which renders as "void"
    fn is_void(&self) -> bool {
        false
    }
}

impl ToTraceValue for () {
    fn to_trace_value(&self) -> TraceValue {
        TraceValue::Null
    }

    fn is_void(&self) -> bool {
        true
    }
}

impl ToTraceValue for TraceValue {
    fn to_trace_value(&self) -> TraceValue {
        self.clone()
    }
}

impl ToTraceValue for str {
    fn to_trace_value(&self) -> TraceValue {
        TraceValue::text(self)
    }
}

impl ToTraceValue for String {
    fn to_trace_value(&self) -> TraceValue {
        TraceValue::text(self.as_str())
    }
}

macro_rules! display_trace_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToTraceValue for $ty {
                fn to_trace_value(&self) -> TraceValue {
                    TraceValue::display(self)
                }
            }
        )*
    };
}

display_trace_value!(bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl<T: ToTraceValue + ?Sized> ToTraceValue for &T {
    fn to_trace_value(&self) -> TraceValue {
        (**self).to_trace_value()
    }

    fn failure(&self) -> Option<String> {
        (**self).failure()
    }

    fn is_void(&self) -> bool {
        (**self).is_void()
    }
}

impl<T: ToTraceValue> ToTraceValue for Option<T> {
    fn to_trace_value(&self) -> TraceValue {
        match self {
            Some(value) => value.to_trace_value(),
            None => TraceValue::Null,
        }
    }
}

impl<T: ToTraceValue> ToTraceValue for [T] {
    fn to_trace_value(&self) -> TraceValue {
        TraceValue::sequence("Array", self.iter().map(ToTraceValue::to_trace_value))
    }
}

impl<T: ToTraceValue> ToTraceValue for Vec<T> {
    fn to_trace_value(&self) -> TraceValue {
        TraceValue::sequence("Vec", self.iter().map(ToTraceValue::to_trace_value))
    }
}

impl<T: ToTraceValue, E: fmt::Display> ToTraceValue for Result<T, E> {
    fn to_trace_value(&self) -> TraceValue {
        match self {
            Ok(value) => value.to_trace_value(),
            Err(_) => TraceValue::Null,
        }
    }

    fn failure(&self) -> Option<String> {
        self.as_ref().err().map(ToString::to_string)
    }

    fn is_void(&self) -> bool {
        match self {
            Ok(value) => value.is_void(),
            Err(_) => false,
        }
    }
}
