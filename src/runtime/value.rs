//! Dynamic values shared by the interpreter and the VM.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use zirconium_parser::ast::format_number;

use super::enums::{ZrEnum, ZrEnumItem};
use super::function::ZrFunction;
use super::range::ZrRange;
use super::userdata::ZrUserdata;

/// Shared, mutable array storage.
pub type ZrArray = Rc<RefCell<Vec<ZrValue>>>;

/// Shared, mutable, insertion-ordered object storage.
pub type ZrObject = Rc<RefCell<IndexMap<String, ZrValue>>>;

/// A runtime value.
///
/// Arrays and objects have reference semantics: cloning a value shares the
/// underlying storage.
#[derive(Clone, Default)]
pub enum ZrValue {
    /// The absent-value sentinel.
    #[default]
    Undefined,
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
    Array(ZrArray),
    Object(ZrObject),
    Range(ZrRange),
    Enum(Rc<ZrEnum>),
    EnumItem(Rc<ZrEnumItem>),
    Function(ZrFunction),
    Userdata(Rc<dyn ZrUserdata>),
}

impl ZrValue {
    pub fn string(value: impl AsRef<str>) -> Self {
        ZrValue::String(Rc::from(value.as_ref()))
    }

    pub fn array(values: Vec<ZrValue>) -> Self {
        ZrValue::Array(Rc::new(RefCell::new(values)))
    }

    pub fn object(entries: IndexMap<String, ZrValue>) -> Self {
        ZrValue::Object(Rc::new(RefCell::new(entries)))
    }

    /// Get a human-readable name for this value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            ZrValue::Undefined => "undefined",
            ZrValue::Boolean(_) => "boolean",
            ZrValue::Number(_) => "number",
            ZrValue::String(_) => "string",
            ZrValue::Array(_) => "array",
            ZrValue::Object(_) => "object",
            ZrValue::Range(_) => "range",
            ZrValue::Enum(_) => "enum",
            ZrValue::EnumItem(_) => "enumitem",
            ZrValue::Function(_) => "function",
            ZrValue::Userdata(_) => "userdata",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, ZrValue::Undefined)
    }

    /// `false`, `undefined` and zero are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            ZrValue::Undefined => false,
            ZrValue::Boolean(b) => *b,
            ZrValue::Number(n) => *n != 0.0,
            _ => true,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ZrValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ZrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ZrValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Property lookup shared by the interpreter and the VM.
    ///
    /// Returns `None` when the value has no properties at all; a missing key
    /// on a value that does have properties is `Some(Undefined)`.
    pub fn get_property(&self, name: &str) -> Option<ZrValue> {
        match self {
            ZrValue::Object(map) => Some(map.borrow().get(name).cloned().unwrap_or_default()),
            ZrValue::Array(items) => match name {
                "length" => Some(ZrValue::Number(items.borrow().len() as f64)),
                _ => name
                    .parse::<usize>()
                    .ok()
                    .map(|index| self.get_index(index).unwrap_or_default()),
            },
            ZrValue::String(s) => match name {
                "length" => Some(ZrValue::Number(s.chars().count() as f64)),
                _ => Some(ZrValue::Undefined),
            },
            ZrValue::Range(range) => match name {
                "start" => Some(ZrValue::Number(range.start() as f64)),
                "stop" => Some(ZrValue::Number(range.stop() as f64)),
                "length" => Some(ZrValue::Number(range.len() as f64)),
                _ => Some(ZrValue::Undefined),
            },
            ZrValue::Enum(e) => Some(e.item(name).map(ZrValue::EnumItem).unwrap_or_default()),
            ZrValue::EnumItem(item) => match name {
                "name" => Some(ZrValue::string(item.name())),
                "index" => Some(ZrValue::Number(item.index() as f64)),
                _ => Some(ZrValue::Undefined),
            },
            ZrValue::Userdata(data) => Some(data.get(name).unwrap_or_default()),
            _ => None,
        }
    }

    /// Integer index access on arrays and strings.
    pub fn get_index(&self, index: usize) -> Option<ZrValue> {
        match self {
            ZrValue::Array(items) => Some(items.borrow().get(index).cloned().unwrap_or_default()),
            ZrValue::String(s) => Some(
                s.chars()
                    .nth(index)
                    .map(|c| ZrValue::string(c.encode_utf8(&mut [0; 4])))
                    .unwrap_or_default(),
            ),
            _ => None,
        }
    }

    /// Render with strings quoted, as they appear inside composites.
    pub fn repr(&self) -> String {
        match self {
            ZrValue::String(s) => format!("{:?}", s),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ZrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(self, f, &mut Vec::new(), false)
    }
}

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROW_SIZE: usize = 1024 * 1024;

/// Render `value`. `open` holds the composites currently being written; one
/// that refers back to itself renders as `[...]` or `{...}`.
fn write_value(value: &ZrValue, f: &mut fmt::Formatter<'_>, open: &mut Vec<*const ()>, quoted: bool) -> fmt::Result {
    match value {
        ZrValue::Undefined => write!(f, "undefined"),
        ZrValue::Boolean(b) => write!(f, "{}", b),
        ZrValue::Number(n) => write!(f, "{}", format_number(*n)),
        ZrValue::String(s) if quoted => write!(f, "{:?}", s),
        ZrValue::String(s) => write!(f, "{}", s),
        ZrValue::Array(items) => {
            let ptr = Rc::as_ptr(items) as *const ();
            if open.contains(&ptr) {
                return write!(f, "[...]");
            }
            open.push(ptr);
            write!(f, "[")?;
            for (i, item) in items.borrow().iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || write_value(item, f, open, true))?;
            }
            open.pop();
            write!(f, "]")
        }
        ZrValue::Object(map) => {
            let ptr = Rc::as_ptr(map) as *const ();
            if open.contains(&ptr) {
                return write!(f, "{{...}}");
            }
            open.push(ptr);
            write!(f, "{{")?;
            for (i, (key, item)) in map.borrow().iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: ", key)?;
                stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || write_value(item, f, open, true))?;
            }
            open.pop();
            write!(f, "}}")
        }
        ZrValue::Range(range) => write!(f, "{}", range),
        ZrValue::Enum(e) => write!(f, "enum {}", e.name()),
        ZrValue::EnumItem(item) => write!(f, "{}.{}", item.enum_name(), item.name()),
        ZrValue::Function(func) => write!(f, "function {}", func.name()),
        ZrValue::Userdata(data) => write!(f, "userdata<{}>", data.type_name()),
    }
}

impl fmt::Debug for ZrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZrValue::String(s) => write!(f, "String({:?})", s),
            ZrValue::Number(n) => write!(f, "Number({})", format_number(*n)),
            ZrValue::Boolean(b) => write!(f, "Boolean({})", b),
            other => write!(f, "{}({})", other.type_name(), other),
        }
    }
}

/// Primitives compare by value, enum items by enum and item name, and
/// composites by identity.
impl PartialEq for ZrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ZrValue::Undefined, ZrValue::Undefined) => true,
            (ZrValue::Boolean(a), ZrValue::Boolean(b)) => a == b,
            (ZrValue::Number(a), ZrValue::Number(b)) => a == b,
            (ZrValue::String(a), ZrValue::String(b)) => a == b,
            (ZrValue::Array(a), ZrValue::Array(b)) => Rc::ptr_eq(a, b),
            (ZrValue::Object(a), ZrValue::Object(b)) => Rc::ptr_eq(a, b),
            (ZrValue::Range(a), ZrValue::Range(b)) => a == b,
            (ZrValue::Enum(a), ZrValue::Enum(b)) => Rc::ptr_eq(a, b),
            (ZrValue::EnumItem(a), ZrValue::EnumItem(b)) => a == b,
            (ZrValue::Function(a), ZrValue::Function(b)) => a == b,
            (ZrValue::Userdata(a), ZrValue::Userdata(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            _ => false,
        }
    }
}

impl From<f64> for ZrValue {
    fn from(value: f64) -> Self {
        ZrValue::Number(value)
    }
}

impl From<bool> for ZrValue {
    fn from(value: bool) -> Self {
        ZrValue::Boolean(value)
    }
}

impl From<&str> for ZrValue {
    fn from(value: &str) -> Self {
        ZrValue::string(value)
    }
}

impl From<String> for ZrValue {
    fn from(value: String) -> Self {
        ZrValue::String(Rc::from(value))
    }
}

impl From<Vec<ZrValue>> for ZrValue {
    fn from(values: Vec<ZrValue>) -> Self {
        ZrValue::array(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names() {
        assert_eq!(ZrValue::Undefined.type_name(), "undefined");
        assert_eq!(ZrValue::from(1.0).type_name(), "number");
        assert_eq!(ZrValue::from("a").type_name(), "string");
        assert_eq!(ZrValue::array(vec![]).type_name(), "array");
    }

    #[test]
    fn truthiness() {
        assert!(!ZrValue::Undefined.is_truthy());
        assert!(!ZrValue::from(false).is_truthy());
        assert!(!ZrValue::from(0.0).is_truthy());
        assert!(ZrValue::from(-1.0).is_truthy());
        assert!(ZrValue::from("").is_truthy());
        assert!(ZrValue::array(vec![]).is_truthy());
    }

    #[test]
    fn display() {
        assert_eq!(ZrValue::from(10.0).to_string(), "10");
        assert_eq!(ZrValue::from(2.5).to_string(), "2.5");
        assert_eq!(ZrValue::from("hi").to_string(), "hi");
        let array = ZrValue::array(vec![ZrValue::from(1.0), ZrValue::from("a")]);
        assert_eq!(array.to_string(), "[1, \"a\"]");
        let mut entries = IndexMap::new();
        entries.insert("b".to_string(), ZrValue::from(true));
        entries.insert("a".to_string(), ZrValue::Undefined);
        assert_eq!(ZrValue::object(entries).to_string(), "{b: true, a: undefined}");
    }

    #[test]
    fn cycles_render_once() {
        let object = ZrValue::object(IndexMap::new());
        let array = ZrValue::array(vec![ZrValue::from(1.0)]);
        if let (ZrValue::Object(map), ZrValue::Array(items)) = (&object, &array) {
            map.borrow_mut().insert("me".to_string(), object.clone());
            map.borrow_mut().insert("list".to_string(), array.clone());
            items.borrow_mut().push(array.clone());
            items.borrow_mut().push(object.clone());
        }
        assert_eq!(object.to_string(), "{me: {...}, list: [1, [...], {...}]}");
        assert_eq!(array.to_string(), "[1, [...], {me: {...}, list: [...]}]");
        assert_eq!(array.repr(), array.to_string());
    }

    #[test]
    fn shared_but_acyclic_values_render_in_full() {
        let inner = ZrValue::array(vec![ZrValue::from("x")]);
        let outer = ZrValue::array(vec![inner.clone(), inner]);
        assert_eq!(outer.to_string(), "[[\"x\"], [\"x\"]]");
    }

    #[test]
    fn deep_nesting_renders() {
        let mut value = ZrValue::array(vec![]);
        for _ in 0..50_000 {
            value = ZrValue::array(vec![value]);
        }
        let rendered = value.to_string();
        assert_eq!(rendered.len(), 2 * 50_001);
        // Unwind the chain iteratively so the nested drop stays shallow.
        while let ZrValue::Array(items) = value {
            let next = items.borrow_mut().pop();
            match next {
                Some(inner) => value = inner,
                None => break,
            }
        }
    }

    #[test]
    fn composites_share_storage() {
        let a = ZrValue::array(vec![ZrValue::from(1.0)]);
        let b = a.clone();
        if let ZrValue::Array(items) = &b {
            items.borrow_mut().push(ZrValue::from(2.0));
        }
        assert_eq!(a.get_property("length"), Some(ZrValue::from(2.0)));
        assert_eq!(a, b);
        assert_ne!(a, ZrValue::array(vec![ZrValue::from(1.0), ZrValue::from(2.0)]));
    }

    #[test]
    fn property_access() {
        let mut entries = IndexMap::new();
        entries.insert("hp".to_string(), ZrValue::from(100.0));
        let object = ZrValue::object(entries);
        assert_eq!(object.get_property("hp"), Some(ZrValue::from(100.0)));
        assert_eq!(object.get_property("mana"), Some(ZrValue::Undefined));

        let array = ZrValue::array(vec![ZrValue::from("x")]);
        assert_eq!(array.get_property("0"), Some(ZrValue::from("x")));
        assert_eq!(array.get_index(3), Some(ZrValue::Undefined));

        assert_eq!(ZrValue::from("héllo").get_property("length"), Some(ZrValue::from(5.0)));
        assert_eq!(ZrValue::from(1.0).get_property("x"), None);
    }
}
