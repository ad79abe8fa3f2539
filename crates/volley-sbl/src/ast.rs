use rustc_hash::FxHashMap;

/// A constructor argument produced by a syntax rule handler and consumed by
/// the runtime when it builds the node's ticker.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Int(i64),
    Text(String),
    Bool(bool),
    List(Vec<Arg>),
}

impl Arg {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Arg::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Arg::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Arg::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Arg]> {
        match self {
            Arg::List(items) => Some(items),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Flag(bool),
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            AttrValue::Flag(_) => None,
        }
    }
}

pub type Attrs = FxHashMap<String, AttrValue>;

/// One parsed template token. `echo` nodes carry literal text in `data[0]`
/// and never enter the dependency graph; every other node owns a unique id
/// in `attr` and maps onto a generator primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub opcode: &'static str,
    pub data: Vec<Arg>,
    pub attr: Attrs,
}

impl Node {
    pub fn is_echo(&self) -> bool {
        self.opcode == "echo"
    }

    pub fn id(&self) -> Option<&str> {
        self.attr.get("id").and_then(AttrValue::as_text)
    }

    pub fn pow(&self) -> Option<&str> {
        self.attr.get("pow").and_then(AttrValue::as_text)
    }

    pub fn encoding(&self) -> Option<&str> {
        self.attr.get("encoding").and_then(AttrValue::as_text)
    }

    pub fn echo_text(&self) -> Option<&str> {
        if self.is_echo() {
            self.data.first().and_then(Arg::as_text)
        } else {
            None
        }
    }
}
