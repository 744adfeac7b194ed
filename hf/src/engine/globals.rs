//! Lenient template globals
//!
//! Undefined variables render as nothing instead of failing the render. Every
//! object lookup that misses, at any depth, yields [`Missing`], which behaves
//! like `nil` and can itself be indexed further. Array indexes past the end
//! do the same.

use std::collections::BTreeMap;
use std::fmt;

use liquid::model::{ArrayView, DisplayCow, KStringCow, State, Value};
use liquid::{ObjectView, ValueView};

static MISSING: Missing = Missing;

/// An undefined value: renders empty, is falsy, and indexes to itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Missing;

impl ValueView for Missing {
    fn as_debug(&self) -> &dyn fmt::Debug {
        self
    }

    fn render(&self) -> DisplayCow<'_> {
        DisplayCow::Borrowed(&"")
    }

    fn source(&self) -> DisplayCow<'_> {
        DisplayCow::Borrowed(&"nil")
    }

    fn type_name(&self) -> &'static str {
        "nil"
    }

    fn query_state(&self, state: State) -> bool {
        match state {
            State::Truthy => false,
            State::DefaultValue | State::Empty | State::Blank => true,
        }
    }

    fn to_kstr(&self) -> KStringCow<'_> {
        KStringCow::from_static("")
    }

    fn to_value(&self) -> Value {
        Value::Nil
    }

    fn as_object(&self) -> Option<&dyn ObjectView> {
        Some(self)
    }

    fn is_nil(&self) -> bool {
        true
    }
}

impl ObjectView for Missing {
    fn as_value(&self) -> &dyn ValueView {
        self
    }

    fn size(&self) -> i64 {
        0
    }

    fn keys<'k>(&'k self) -> Box<dyn Iterator<Item = KStringCow<'k>> + 'k> {
        Box::new(std::iter::empty())
    }

    fn values<'k>(&'k self) -> Box<dyn Iterator<Item = &'k dyn ValueView> + 'k> {
        Box::new(std::iter::empty())
    }

    fn iter<'k>(&'k self) -> Box<dyn Iterator<Item = (KStringCow<'k>, &'k dyn ValueView)> + 'k> {
        Box::new(std::iter::empty())
    }

    fn contains_key(&self, _index: &str) -> bool {
        false
    }

    fn get<'s>(&'s self, _index: &str) -> Option<&'s dyn ValueView> {
        Some(&MISSING)
    }
}

/// A global value whose nested lookups never fail
#[derive(Debug)]
pub enum Lenient {
    Value(Value),
    Array(LenientArray),
    Object(LenientObject),
}

impl From<&serde_json::Value> for Lenient {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Value(Value::Nil),
            serde_json::Value::Bool(b) => Self::Value(Value::scalar(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Value(Value::scalar(i)),
                None => Self::Value(Value::scalar(n.as_f64().unwrap_or_default())),
            },
            serde_json::Value::String(s) => Self::Value(Value::scalar(s.clone())),
            serde_json::Value::Array(items) => Self::Array(LenientArray(items.iter().map(Lenient::from).collect())),
            serde_json::Value::Object(map) => Self::Object(LenientObject(
                map.iter().map(|(k, v)| (k.clone(), Lenient::from(v))).collect(),
            )),
        }
    }
}

impl ValueView for Lenient {
    fn as_debug(&self) -> &dyn fmt::Debug {
        self
    }

    fn render(&self) -> DisplayCow<'_> {
        match self {
            Self::Value(v) => v.render(),
            Self::Array(a) => a.render(),
            Self::Object(o) => o.render(),
        }
    }

    fn source(&self) -> DisplayCow<'_> {
        match self {
            Self::Value(v) => v.source(),
            Self::Array(a) => a.source(),
            Self::Object(o) => o.source(),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Value(v) => v.type_name(),
            Self::Array(a) => a.type_name(),
            Self::Object(o) => o.type_name(),
        }
    }

    fn query_state(&self, state: State) -> bool {
        match self {
            Self::Value(v) => v.query_state(state),
            Self::Array(a) => a.query_state(state),
            Self::Object(o) => o.query_state(state),
        }
    }

    fn to_kstr(&self) -> KStringCow<'_> {
        match self {
            Self::Value(v) => v.to_kstr(),
            Self::Array(a) => a.to_kstr(),
            Self::Object(o) => o.to_kstr(),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Value(v) => v.to_value(),
            Self::Array(a) => a.to_value(),
            Self::Object(o) => o.to_value(),
        }
    }

    fn as_scalar(&self) -> Option<liquid::model::ScalarCow<'_>> {
        match self {
            Self::Value(v) => v.as_scalar(),
            _ => None,
        }
    }

    fn as_array(&self) -> Option<&dyn ArrayView> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    fn as_object(&self) -> Option<&dyn ObjectView> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    fn as_state(&self) -> Option<State> {
        match self {
            Self::Value(v) => v.as_state(),
            _ => None,
        }
    }

    fn is_nil(&self) -> bool {
        matches!(self, Self::Value(Value::Nil))
    }
}

#[derive(Debug)]
pub struct LenientArray(Vec<Lenient>);

impl ValueView for LenientArray {
    fn as_debug(&self) -> &dyn fmt::Debug {
        self
    }

    fn render(&self) -> DisplayCow<'_> {
        ValueView::render(&self.0)
    }

    fn source(&self) -> DisplayCow<'_> {
        ValueView::source(&self.0)
    }

    fn type_name(&self) -> &'static str {
        "array"
    }

    fn query_state(&self, state: State) -> bool {
        ValueView::query_state(&self.0, state)
    }

    fn to_kstr(&self) -> KStringCow<'_> {
        ValueView::to_kstr(&self.0)
    }

    fn to_value(&self) -> Value {
        ValueView::to_value(&self.0)
    }

    fn as_array(&self) -> Option<&dyn ArrayView> {
        Some(self)
    }
}

impl ArrayView for LenientArray {
    fn as_value(&self) -> &dyn ValueView {
        self
    }

    fn size(&self) -> i64 {
        self.0.len() as i64
    }

    fn values<'k>(&'k self) -> Box<dyn Iterator<Item = &'k dyn ValueView> + 'k> {
        Box::new(self.0.iter().map(|v| v as &dyn ValueView))
    }

    fn contains_key(&self, index: i64) -> bool {
        ArrayView::contains_key(&self.0, index)
    }

    fn get(&self, index: i64) -> Option<&dyn ValueView> {
        Some(ArrayView::get(&self.0, index).unwrap_or(&MISSING))
    }
}

#[derive(Debug)]
pub struct LenientObject(BTreeMap<String, Lenient>);

impl ValueView for LenientObject {
    fn as_debug(&self) -> &dyn fmt::Debug {
        self
    }

    fn render(&self) -> DisplayCow<'_> {
        ValueView::render(&self.0)
    }

    fn source(&self) -> DisplayCow<'_> {
        ValueView::source(&self.0)
    }

    fn type_name(&self) -> &'static str {
        "object"
    }

    fn query_state(&self, state: State) -> bool {
        ValueView::query_state(&self.0, state)
    }

    fn to_kstr(&self) -> KStringCow<'_> {
        ValueView::to_kstr(&self.0)
    }

    fn to_value(&self) -> Value {
        ValueView::to_value(&self.0)
    }

    fn as_object(&self) -> Option<&dyn ObjectView> {
        Some(self)
    }
}

impl ObjectView for LenientObject {
    fn as_value(&self) -> &dyn ValueView {
        self
    }

    fn size(&self) -> i64 {
        self.0.len() as i64
    }

    fn keys<'k>(&'k self) -> Box<dyn Iterator<Item = KStringCow<'k>> + 'k> {
        Box::new(self.0.keys().map(|k| KStringCow::from_ref(k.as_str())))
    }

    fn values<'k>(&'k self) -> Box<dyn Iterator<Item = &'k dyn ValueView> + 'k> {
        Box::new(self.0.values().map(|v| v as &dyn ValueView))
    }

    fn iter<'k>(&'k self) -> Box<dyn Iterator<Item = (KStringCow<'k>, &'k dyn ValueView)> + 'k> {
        Box::new(
            self.0
                .iter()
                .map(|(k, v)| (KStringCow::from_ref(k.as_str()), v as &dyn ValueView)),
        )
    }

    fn contains_key(&self, index: &str) -> bool {
        self.0.contains_key(index)
    }

    fn get<'s>(&'s self, index: &str) -> Option<&'s dyn ValueView> {
        Some(self.0.get(index).map(|v| v as &dyn ValueView).unwrap_or(&MISSING))
    }
}

/// The root scope handed to a render
///
/// Claims every name so lookups of undefined variables land here rather than
/// reaching the engine's "Unknown variable" error.
#[derive(Debug)]
pub struct LenientGlobals(LenientObject);

impl LenientGlobals {
    pub fn new(globals: &BTreeMap<String, serde_json::Value>) -> Self {
        Self(LenientObject(
            globals.iter().map(|(k, v)| (k.clone(), Lenient::from(v))).collect(),
        ))
    }
}

impl ValueView for LenientGlobals {
    fn as_debug(&self) -> &dyn fmt::Debug {
        self
    }

    fn render(&self) -> DisplayCow<'_> {
        self.0.render()
    }

    fn source(&self) -> DisplayCow<'_> {
        self.0.source()
    }

    fn type_name(&self) -> &'static str {
        "object"
    }

    fn query_state(&self, state: State) -> bool {
        self.0.query_state(state)
    }

    fn to_kstr(&self) -> KStringCow<'_> {
        self.0.to_kstr()
    }

    fn to_value(&self) -> Value {
        self.0.to_value()
    }

    fn as_object(&self) -> Option<&dyn ObjectView> {
        Some(self)
    }
}

impl ObjectView for LenientGlobals {
    fn as_value(&self) -> &dyn ValueView {
        self
    }

    fn size(&self) -> i64 {
        ObjectView::size(&self.0)
    }

    fn keys<'k>(&'k self) -> Box<dyn Iterator<Item = KStringCow<'k>> + 'k> {
        ObjectView::keys(&self.0)
    }

    fn values<'k>(&'k self) -> Box<dyn Iterator<Item = &'k dyn ValueView> + 'k> {
        ObjectView::values(&self.0)
    }

    fn iter<'k>(&'k self) -> Box<dyn Iterator<Item = (KStringCow<'k>, &'k dyn ValueView)> + 'k> {
        ObjectView::iter(&self.0)
    }

    fn contains_key(&self, _index: &str) -> bool {
        true
    }

    fn get<'s>(&'s self, index: &str) -> Option<&'s dyn ValueView> {
        ObjectView::get(&self.0, index)
    }
}
