//! Seam through which tracing infrastructure hands identifiers to a logger.
//!
//! The engine does not know how an id was produced. It only asks a context
//! for `(key, value)` pairs and bakes the printable ones into base fields.

/// An external context that can yield correlation fields.
pub trait Correlation {
    fn for_each_field(&self, visit: &mut dyn FnMut(&str, &str));
}

pub const TRACE_ID_KEY: &str = "trace_id";
pub const SPAN_ID_KEY: &str = "span_id";

/// Distributed-trace identifiers, emitted as `trace_id` / `span_id`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TraceContext {
    pub trace_id: String,
    pub span_id: Option<String>,
}

impl TraceContext {
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            span_id: None,
        }
    }

    pub fn with_span(mut self, span_id: impl Into<String>) -> Self {
        self.span_id = Some(span_id.into());
        self
    }
}

impl Correlation for TraceContext {
    fn for_each_field(&self, visit: &mut dyn FnMut(&str, &str)) {
        visit(TRACE_ID_KEY, &self.trace_id);
        if let Some(span_id) = &self.span_id {
            visit(SPAN_ID_KEY, span_id);
        }
    }
}

impl<K, V> Correlation for [(K, V)]
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn for_each_field(&self, visit: &mut dyn FnMut(&str, &str)) {
        for (key, value) in self {
            visit(key.as_ref(), value.as_ref());
        }
    }
}

impl<K, V, const N: usize> Correlation for [(K, V); N]
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn for_each_field(&self, visit: &mut dyn FnMut(&str, &str)) {
        self.as_slice().for_each_field(visit);
    }
}

impl<K, V> Correlation for Vec<(K, V)>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn for_each_field(&self, visit: &mut dyn FnMut(&str, &str)) {
        self.as_slice().for_each_field(visit);
    }
}
