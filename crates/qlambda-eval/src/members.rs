//! Member registry: the attributes and methods each value type exposes.
//!
//! Data attributes resolve to a value directly; methods resolve to a
//! [`NativeFn`] bound to the receiver. Records expose their fields.

use std::sync::LazyLock;

use qlambda_ast::{EvalError, Kwargs};
use rustc_hash::FxHashMap;

use crate::native::{Method, NativeFn};
use crate::ops::loose_eq;
use crate::value::Value;

#[derive(Clone, Copy)]
enum Member {
    Field(fn(&Value) -> Value),
    Method(Method),
}

/// Per-type member tables keyed by type name.
struct MemberRegistry {
    types: FxHashMap<&'static str, FxHashMap<&'static str, Member>>,
}

impl MemberRegistry {
    fn new() -> Self {
        Self {
            types: FxHashMap::default(),
        }
    }

    fn register(&mut self, type_name: &'static str, name: &'static str, member: Member) {
        self.types.entry(type_name).or_default().insert(name, member);
    }

    fn field(&mut self, type_name: &'static str, name: &'static str, get: fn(&Value) -> Value) {
        self.register(type_name, name, Member::Field(get));
    }

    fn method(&mut self, type_name: &'static str, name: &'static str, method: Method) {
        self.register(type_name, name, Member::Method(method));
    }

    fn lookup(&self, type_name: &str, name: &str) -> Option<Member> {
        self.types.get(type_name)?.get(name).copied()
    }
}

static REGISTRY: LazyLock<MemberRegistry> = LazyLock::new(|| {
    let mut registry = MemberRegistry::new();
    register_numbers(&mut registry);
    register_str(&mut registry);
    register_bytes(&mut registry);
    register_tuple(&mut registry);
    registry.field("function", "__name__", |v| match v {
        Value::Func(f) => Value::string(f.name()),
        _ => Value::None,
    });
    registry
});

/// Resolve `name` on `value`. Records expose only their own fields.
pub(crate) fn get_attr(value: &Value, name: &str) -> Result<Value, EvalError> {
    if let Value::Record(record) = value {
        return record
            .fields
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::attribute_not_found(&record.type_name, name));
    }
    let type_name = value.type_name();
    match REGISTRY.lookup(type_name, name) {
        Some(Member::Field(get)) => Ok(get(value)),
        Some(Member::Method(method)) => Ok(Value::Func(NativeFn::bound(
            value.clone(),
            format!("{type_name}.{name}"),
            method,
        ))),
        None => Err(EvalError::attribute_not_found(type_name, name)),
    }
}

// ─── Argument binding ───────────────────────────────────────────────

/// Bind positional and keyword arguments to `params`; the first `required`
/// parameters must be supplied.
fn bind<'a>(
    callee: &str,
    params: &[&str],
    required: usize,
    args: &'a [Value],
    kwargs: &'a Kwargs<Value>,
) -> Result<Vec<Option<&'a Value>>, EvalError> {
    if args.len() > params.len() {
        return Err(EvalError::call_failed(
            callee,
            format!(
                "takes at most {} argument(s) ({} given)",
                params.len(),
                args.len()
            ),
        ));
    }
    let mut bound: Vec<Option<&Value>> = args.iter().map(Some).collect();
    bound.resize(params.len(), None);
    for (key, value) in kwargs {
        match params.iter().position(|p| *p == key.as_str()) {
            Some(i) if bound[i].is_none() => bound[i] = Some(value),
            Some(_) => {
                return Err(EvalError::call_failed(
                    callee,
                    format!("got multiple values for argument '{key}'"),
                ));
            }
            None => {
                return Err(EvalError::call_failed(
                    callee,
                    format!("got an unexpected keyword argument '{key}'"),
                ));
            }
        }
    }
    if let Some(missing) = params[..required]
        .iter()
        .zip(&bound)
        .find_map(|(p, b)| b.is_none().then_some(p))
    {
        return Err(EvalError::call_failed(
            callee,
            format!("missing required argument '{missing}'"),
        ));
    }
    Ok(bound)
}

fn required<'a>(callee: &str, value: Option<&'a Value>) -> Result<&'a Value, EvalError> {
    value.ok_or_else(|| EvalError::call_failed(callee, "missing argument"))
}

fn no_args(callee: &str, args: &[Value], kwargs: &Kwargs<Value>) -> Result<(), EvalError> {
    bind(callee, &[], 0, args, kwargs).map(|_| ())
}

fn expect_str<'a>(callee: &str, value: Option<&'a Value>) -> Result<&'a str, EvalError> {
    match value {
        Some(Value::Str(s)) => Ok(s),
        Some(other) => Err(EvalError::call_failed(
            callee,
            format!("argument must be str, not {}", other.type_name()),
        )),
        None => Err(EvalError::call_failed(callee, "missing string argument")),
    }
}

/// Optional string argument; `None` and absence are equivalent.
fn optional_str<'a>(callee: &str, value: Option<&'a Value>) -> Result<Option<&'a str>, EvalError> {
    match value {
        None | Some(Value::None) => Ok(None),
        other => expect_str(callee, other).map(Some),
    }
}

fn receiver_str(value: &Value) -> &str {
    value.as_str().unwrap_or_default()
}

// ─── Numbers ────────────────────────────────────────────────────────

fn register_numbers(registry: &mut MemberRegistry) {
    for int_like in ["int", "bool"] {
        registry.field(int_like, "real", |v| Value::Int(v.as_int().unwrap_or(0)));
        registry.field(int_like, "imag", |_| Value::Int(0));
        registry.field(int_like, "numerator", |v| Value::Int(v.as_int().unwrap_or(0)));
        registry.field(int_like, "denominator", |_| Value::Int(1));
        registry.method(int_like, "bit_length", |v, args, kwargs| {
            no_args("int.bit_length", args, kwargs)?;
            let n = v.as_int().unwrap_or(0);
            Ok(Value::Int(i64::from(64 - n.unsigned_abs().leading_zeros())))
        });
        registry.method(int_like, "conjugate", |v, args, kwargs| {
            no_args("int.conjugate", args, kwargs)?;
            Ok(Value::Int(v.as_int().unwrap_or(0)))
        });
    }

    registry.field("float", "real", |v| v.clone());
    registry.field("float", "imag", |_| Value::float(0.0));
    registry.method("float", "is_integer", |v, args, kwargs| {
        no_args("float.is_integer", args, kwargs)?;
        let f = v.as_f64().unwrap_or(f64::NAN);
        Ok(Value::Bool(f.is_finite() && f.fract() == 0.0))
    });
    registry.method("float", "conjugate", |v, args, kwargs| {
        no_args("float.conjugate", args, kwargs)?;
        Ok(v.clone())
    });

    registry.field("complex", "real", |v| match v {
        Value::Complex(re, _) => Value::Float(*re),
        _ => Value::None,
    });
    registry.field("complex", "imag", |v| match v {
        Value::Complex(_, im) => Value::Float(*im),
        _ => Value::None,
    });
    registry.method("complex", "conjugate", |v, args, kwargs| {
        no_args("complex.conjugate", args, kwargs)?;
        match v {
            Value::Complex(re, im) => Ok(Value::complex(re.0, -im.0)),
            other => Ok(other.clone()),
        }
    });
}

// ─── Strings ────────────────────────────────────────────────────────

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if in_word {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        in_word = c.is_alphabetic();
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn register_str(registry: &mut MemberRegistry) {
    registry.method("str", "upper", |v, args, kwargs| {
        no_args("str.upper", args, kwargs)?;
        Ok(Value::string(receiver_str(v).to_uppercase()))
    });
    registry.method("str", "lower", |v, args, kwargs| {
        no_args("str.lower", args, kwargs)?;
        Ok(Value::string(receiver_str(v).to_lowercase()))
    });
    registry.method("str", "title", |v, args, kwargs| {
        no_args("str.title", args, kwargs)?;
        Ok(Value::string(title_case(receiver_str(v))))
    });
    registry.method("str", "capitalize", |v, args, kwargs| {
        no_args("str.capitalize", args, kwargs)?;
        Ok(Value::string(capitalize(receiver_str(v))))
    });
    registry.method("str", "strip", |v, args, kwargs| {
        let callee = "str.strip";
        let bound = bind(callee, &["chars"], 0, args, kwargs)?;
        let s = receiver_str(v);
        let stripped = match optional_str(callee, bound[0])? {
            Some(chars) => s.trim_matches(|c: char| chars.contains(c)),
            None => s.trim(),
        };
        Ok(Value::string(stripped))
    });
    registry.method("str", "startswith", |v, args, kwargs| {
        let callee = "str.startswith";
        let bound = bind(callee, &["prefix"], 1, args, kwargs)?;
        let prefix = expect_str(callee, bound[0])?;
        Ok(Value::Bool(receiver_str(v).starts_with(prefix)))
    });
    registry.method("str", "endswith", |v, args, kwargs| {
        let callee = "str.endswith";
        let bound = bind(callee, &["suffix"], 1, args, kwargs)?;
        let suffix = expect_str(callee, bound[0])?;
        Ok(Value::Bool(receiver_str(v).ends_with(suffix)))
    });
    registry.method("str", "replace", |v, args, kwargs| {
        let callee = "str.replace";
        let bound = bind(callee, &["old", "new"], 2, args, kwargs)?;
        let old = expect_str(callee, bound[0])?;
        let new = expect_str(callee, bound[1])?;
        Ok(Value::string(receiver_str(v).replace(old, new)))
    });
    registry.method("str", "split", |v, args, kwargs| {
        let callee = "str.split";
        let bound = bind(callee, &["sep"], 0, args, kwargs)?;
        let s = receiver_str(v);
        let parts: Vec<Value> = match optional_str(callee, bound[0])? {
            Some("") => return Err(EvalError::call_failed(callee, "empty separator")),
            Some(sep) => s.split(sep).map(Value::from).collect(),
            None => s.split_whitespace().map(Value::from).collect(),
        };
        Ok(Value::tuple(parts))
    });
    registry.method("str", "join", |v, args, kwargs| {
        let callee = "str.join";
        let bound = bind(callee, &["iterable"], 1, args, kwargs)?;
        let Some(Value::Tuple(items)) = bound[0] else {
            return Err(EvalError::call_failed(callee, "can only join a tuple"));
        };
        let parts = items
            .iter()
            .map(|item| expect_str(callee, Some(item)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::string(parts.join(receiver_str(v))))
    });
    registry.method("str", "count", |v, args, kwargs| {
        let callee = "str.count";
        let bound = bind(callee, &["sub"], 1, args, kwargs)?;
        let sub = expect_str(callee, bound[0])?;
        let s = receiver_str(v);
        let n = if sub.is_empty() {
            s.chars().count() + 1
        } else {
            s.matches(sub).count()
        };
        Ok(Value::Int(n as i64))
    });
    registry.method("str", "find", |v, args, kwargs| {
        let callee = "str.find";
        let bound = bind(callee, &["sub"], 1, args, kwargs)?;
        let sub = expect_str(callee, bound[0])?;
        let s = receiver_str(v);
        let index = s
            .find(sub)
            .map_or(-1, |byte| s[..byte].chars().count() as i64);
        Ok(Value::Int(index))
    });
}

// ─── Bytes and tuples ───────────────────────────────────────────────

fn receiver_bytes(value: &Value) -> &[u8] {
    match value {
        Value::Bytes(b) => b,
        _ => &[],
    }
}

fn register_bytes(registry: &mut MemberRegistry) {
    registry.method("bytes", "decode", |v, args, kwargs| {
        no_args("bytes.decode", args, kwargs)?;
        std::str::from_utf8(receiver_bytes(v))
            .map(Value::from)
            .map_err(|e| EvalError::call_failed("bytes.decode", e.to_string()))
    });
    registry.method("bytes", "hex", |v, args, kwargs| {
        no_args("bytes.hex", args, kwargs)?;
        let hex: String = receiver_bytes(v).iter().map(|b| format!("{b:02x}")).collect();
        Ok(Value::string(hex))
    });
    registry.method("bytes", "upper", |v, args, kwargs| {
        no_args("bytes.upper", args, kwargs)?;
        Ok(Value::bytes(receiver_bytes(v).to_ascii_uppercase()))
    });
    registry.method("bytes", "lower", |v, args, kwargs| {
        no_args("bytes.lower", args, kwargs)?;
        Ok(Value::bytes(receiver_bytes(v).to_ascii_lowercase()))
    });
}

fn receiver_items(value: &Value) -> &[Value] {
    match value {
        Value::Tuple(items) => items,
        _ => &[],
    }
}

fn register_tuple(registry: &mut MemberRegistry) {
    registry.method("tuple", "count", |v, args, kwargs| {
        let callee = "tuple.count";
        let bound = bind(callee, &["value"], 1, args, kwargs)?;
        let needle = required(callee, bound[0])?;
        let n = receiver_items(v)
            .iter()
            .filter(|item| loose_eq(item, needle))
            .count();
        Ok(Value::Int(n as i64))
    });
    registry.method("tuple", "index", |v, args, kwargs| {
        let callee = "tuple.index";
        let bound = bind(callee, &["value"], 1, args, kwargs)?;
        let needle = required(callee, bound[0])?;
        receiver_items(v)
            .iter()
            .position(|item| loose_eq(item, needle))
            .map(|i| Value::Int(i as i64))
            .ok_or_else(|| EvalError::call_failed(callee, format!("{needle:?} is not in tuple")))
    });
}
