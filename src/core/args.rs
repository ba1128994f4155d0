//! Positional key/value arguments for the `*_kv` logging calls
//!
//! Each argument is classified once, when it is built, into an [`Arg`]
//! variant. [`parse_kv`] then turns a sequence of them into a field batch:
//!
//! - a bare error becomes a field named `"error"`
//! - a batch of fields contributes all of its fields
//! - a pre-built field is used as-is
//! - otherwise two consecutive arguments form a `(key, value)` pair; a
//!   non-string key is rendered with its display form
//! - a trailing unpaired argument becomes a field named `"unknown"`
//!
//! A single argument that is itself a list is expanded into the argument
//! list.

use super::error_value::{ErrorValue, StructuredError};
use super::field::{Field, FieldValue, Fielder, Fields, Sanitizer};
use super::pool::FieldPool;
use serde::Serialize;

/// One positional argument of a key/value logging call.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Value(FieldValue),
    Error(ErrorValue),
    Fields(Fields),
    Field(Field),
    List(Vec<Arg>),
}

impl Arg {
    /// A plain error; recorded as its message.
    pub fn error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        Arg::Error(ErrorValue::new(err))
    }

    /// An error whose custom serialization, if any, replaces its message.
    pub fn structured_error<E: StructuredError + ?Sized>(err: &E) -> Self {
        Arg::Error(ErrorValue::structured(err))
    }

    /// A value that must not reach the log verbatim.
    pub fn sanitized<S: Sanitizer + ?Sized>(value: &S) -> Self {
        Arg::Value(value.sanitize())
    }

    /// Every field a [`Fielder`] contributes.
    pub fn fielder<F: Fielder + ?Sized>(value: &F) -> Self {
        Arg::Fields(value.fields())
    }

    /// Any value captured through its serde representation.
    pub fn serialized<T: Serialize + ?Sized>(value: &T) -> Self {
        Arg::Value(FieldValue::from_serialize(value))
    }

    /// Value recorded when this argument sits in value position.
    fn into_value(self) -> FieldValue {
        match self {
            Arg::Value(v) => v,
            Arg::Error(e) => e.to_field_value(),
            Arg::Fields(f) => FieldValue::from_serialize(&f),
            Arg::Field(f) => {
                let mut map = serde_json::Map::new();
                map.insert(f.name, f.value.to_json_value());
                FieldValue::Json(serde_json::Value::Object(map))
            }
            Arg::List(items) => FieldValue::Json(serde_json::Value::Array(
                items
                    .into_iter()
                    .map(|a| a.into_value().to_json_value())
                    .collect(),
            )),
        }
    }

    /// Name used when this argument sits in key position.
    fn into_key(self) -> String {
        match self.into_value() {
            FieldValue::String(s) => s,
            other => other.to_string(),
        }
    }
}

macro_rules! impl_arg_from_value {
    ($($t:ty),*) => {
        $(impl From<$t> for Arg {
            fn from(v: $t) -> Self {
                Arg::Value(v.into())
            }
        })*
    };
}

impl_arg_from_value!(
    &str, String, &String, bool, f32, f64, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize,
    FieldValue, serde_json::Value
);

impl From<Field> for Arg {
    fn from(f: Field) -> Self {
        Arg::Field(f)
    }
}

impl From<Fields> for Arg {
    fn from(f: Fields) -> Self {
        Arg::Fields(f)
    }
}

impl From<ErrorValue> for Arg {
    fn from(e: ErrorValue) -> Self {
        Arg::Error(e)
    }
}

impl From<Vec<Arg>> for Arg {
    fn from(items: Vec<Arg>) -> Self {
        Arg::List(items)
    }
}

/// Parse positional arguments into one field batch.
///
/// Fields created for key/value pairs come from `pool`.
pub(crate) fn parse_kv<I>(args: I, pool: &FieldPool) -> Fields
where
    I: IntoIterator<Item = Arg>,
{
    let mut iter = args.into_iter();
    let first = match iter.next() {
        Some(first) => first,
        None => return Fields::new(),
    };

    let mut out = Fields::with_capacity(iter.size_hint().0.div_ceil(2) + 1);
    match iter.next() {
        None => match first {
            Arg::List(items) => collect_fields(items.into_iter(), &mut out, pool),
            single => collect_fields(std::iter::once(single), &mut out, pool),
        },
        Some(second) => collect_fields(
            [first, second].into_iter().chain(iter),
            &mut out,
            pool,
        ),
    }
    out
}

fn collect_fields<I>(mut iter: I, out: &mut Fields, pool: &FieldPool)
where
    I: Iterator<Item = Arg>,
{
    while let Some(arg) = iter.next() {
        match arg {
            Arg::Error(err) => out.push_shared(pool.acquire("error", err.to_field_value())),
            Arg::Fields(fields) => out.extend_from(&fields),
            Arg::Field(field) => out.push(field),
            key => match iter.next() {
                Some(value) => {
                    let name = key.into_key();
                    out.push_shared(pool.acquire(&name, value.into_value()));
                }
                None => out.push_shared(pool.acquire("unknown", key.into_value())),
            },
        }
    }
}

/// Build a fixed-size argument list for the `*_kv` logging calls.
///
/// ```
/// use fieldlog::kv;
///
/// let args = kv!["file", "sloth.png", "size", 1024];
/// assert_eq!(args.len(), 4);
/// ```
#[macro_export]
macro_rules! kv {
    () => {{
        let args: [$crate::Arg; 0] = [];
        args
    }};
    ($($arg:expr),+ $(,)?) => {
        [$($crate::Arg::from($arg)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: Vec<Arg>) -> Fields {
        parse_kv(args, &FieldPool::new(16))
    }

    fn pairs(fields: &Fields) -> Vec<(String, FieldValue)> {
        fields
            .iter()
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect()
    }

    #[test]
    fn test_empty_args() {
        assert!(parse(vec![]).is_empty());
    }

    #[test]
    fn test_key_value_pairs() {
        let fields = parse(vec!["file".into(), "sloth.png".into(), "user".into(), "Tobi".into()]);
        assert_eq!(
            pairs(&fields),
            vec![
                ("file".to_string(), FieldValue::from("sloth.png")),
                ("user".to_string(), FieldValue::from("Tobi")),
            ]
        );
    }

    #[test]
    fn test_bare_error_anywhere() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "comparison failed");
        let fields = parse(vec![Arg::error(&err), "file".into(), "sloth.png".into()]);
        assert_eq!(
            pairs(&fields),
            vec![
                ("error".to_string(), FieldValue::from("comparison failed")),
                ("file".to_string(), FieldValue::from("sloth.png")),
            ]
        );
    }

    #[test]
    fn test_trailing_value_is_unknown() {
        let fields = parse(vec!["a".into(), 1.into(), "dangling".into()]);
        assert_eq!(fields.get("a"), Some(&FieldValue::Int(1)));
        assert_eq!(fields.get("unknown"), Some(&FieldValue::from("dangling")));
    }

    #[test]
    fn test_non_string_key_rendered() {
        let fields = parse(vec![42.into(), "answer".into()]);
        assert_eq!(fields.get("42"), Some(&FieldValue::from("answer")));
    }

    #[test]
    fn test_fields_and_prebuilt_field() {
        let batch = Fields::new().append("a", 1).append("b", 2);
        let fields = parse(vec![batch.into(), Field::new("c", 3).into()]);
        let names: Vec<String> = pairs(&fields).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_single_list_is_expanded() {
        let list: Vec<Arg> = vec!["k1".into(), "v1".into(), "k2".into(), 2.into()];
        let fields = parse(vec![Arg::List(list)]);
        assert_eq!(fields.get("k1"), Some(&FieldValue::from("v1")));
        assert_eq!(fields.get("k2"), Some(&FieldValue::Int(2)));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_list_among_others_is_a_value() {
        let list: Vec<Arg> = vec![1.into(), 2.into()];
        let fields = parse(vec!["ids".into(), Arg::List(list)]);
        assert_eq!(
            fields.get("ids").map(FieldValue::to_json_value),
            Some(serde_json::json!([1, 2]))
        );
    }

    #[test]
    fn test_single_scalar_is_unknown() {
        let fields = parse(vec!["lonely".into()]);
        assert_eq!(fields.get("unknown"), Some(&FieldValue::from("lonely")));
    }

    #[test]
    fn test_sanitized_value() {
        struct Password;
        impl Sanitizer for Password {
            fn sanitize(&self) -> FieldValue {
                FieldValue::from("***")
            }
        }

        let fields = parse(vec!["password".into(), Arg::sanitized(&Password)]);
        assert_eq!(fields.get("password"), Some(&FieldValue::from("***")));
    }

    #[test]
    fn test_kv_macro() {
        let fields = parse_kv(kv!["a", 1, "b", true], &FieldPool::new(4));
        assert_eq!(fields.get("b"), Some(&FieldValue::Bool(true)));
        assert!(parse_kv(kv![], &FieldPool::new(4)).is_empty());
    }
}
