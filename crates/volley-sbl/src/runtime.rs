use rustc_hash::FxHashMap;

use crate::{
    ast::{Arg, Node},
    encode::Encoding,
    error::SblError,
    generator::{Choose, Power, Product, Rand, RandText, Seq, Step, Ticker, Time},
    topo::Edge,
    value::Value,
};

/// A registered tag: its generator, the value from its latest advance,
/// the link attributes and the overflow flag other tags may watch.
#[derive(Debug)]
struct Entry {
    ticker: Ticker,
    value: Option<Value>,
    pow: Option<String>,
    encoding: Vec<Encoding>,
    overflow: bool,
}

/// Owns every registered tag, keyed by full id.
#[derive(Debug, Default)]
pub struct Runtime {
    heap: FxHashMap<String, Entry>,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node's generator under its id and returns the edge the
    /// scheduler needs: references depend on their target, linked tags on
    /// their `^` target.
    pub fn register(&mut self, node: &Node) -> Result<Edge, SblError> {
        let id = node
            .id()
            .ok_or_else(|| SblError::InvalidArguments(node.opcode.to_string()))?
            .to_string();
        let pow = node.pow().map(String::from);
        let direction = if node.opcode == "ref" {
            node.data.first().and_then(Arg::as_text).map(String::from)
        } else {
            pow.clone()
        };

        let ticker = build_ticker(node)?;
        let encoding = match node.encoding() {
            Some(spec) => Encoding::parse_list(spec)?,
            None => vec![Encoding::Str],
        };

        self.heap.insert(
            id.clone(),
            Entry {
                ticker,
                value: None,
                pow,
                encoding,
                overflow: true,
            },
        );
        Ok(Edge { id, direction })
    }

    /// Advances the tag and returns its encoded value. A tag with a `^`
    /// link holds its previous value on rounds where the target did not
    /// overflow; held values are returned as stored, without re-encoding.
    pub fn evaluate(&mut self, id: &str) -> Result<Value, SblError> {
        let (has_value, pow, direction) = {
            let entry = self.entry(id)?;
            (
                entry.value.is_some(),
                entry.pow.clone(),
                entry.ticker.direction().map(String::from),
            )
        };

        if let (Some(target), true) = (&pow, has_value) {
            let target_overflow = self.entry(target)?.overflow;
            if !target_overflow {
                let entry = self.entry_mut(id)?;
                entry.overflow = false;
                return Ok(entry.value.clone().unwrap_or_default());
            }
        }

        let step = match direction {
            Some(target) => Step {
                value: self.entry(&target)?.value.clone().unwrap_or_default(),
                overflow: true,
            },
            None => self.entry_mut(id)?.ticker.tick(),
        };

        let entry = self.entry_mut(id)?;
        let mut value = step.value;
        for encoding in &entry.encoding {
            value = encoding.apply(value);
        }
        entry.value = Some(value.clone());
        entry.overflow = step.overflow;
        Ok(value)
    }

    /// The latest value stored under an id, if it has been evaluated.
    pub fn value(&self, id: &str) -> Option<&Value> {
        self.heap.get(id).and_then(|entry| entry.value.as_ref())
    }

    fn entry(&self, id: &str) -> Result<&Entry, SblError> {
        self.heap
            .get(id)
            .ok_or_else(|| SblError::UnknownId(id.to_string()))
    }

    fn entry_mut(&mut self, id: &str) -> Result<&mut Entry, SblError> {
        self.heap
            .get_mut(id)
            .ok_or_else(|| SblError::UnknownId(id.to_string()))
    }
}

fn int_arg(node: &Node, index: usize) -> Result<i64, SblError> {
    node.data
        .get(index)
        .and_then(Arg::as_int)
        .ok_or_else(|| SblError::InvalidArguments(node.opcode.to_string()))
}

fn text_arg<'a>(node: &'a Node, index: usize) -> Result<&'a str, SblError> {
    node.data
        .get(index)
        .and_then(Arg::as_text)
        .ok_or_else(|| SblError::InvalidArguments(node.opcode.to_string()))
}

fn bool_arg(node: &Node, index: usize) -> Result<bool, SblError> {
    node.data
        .get(index)
        .and_then(Arg::as_bool)
        .ok_or_else(|| SblError::InvalidArguments(node.opcode.to_string()))
}

fn texts(node: &Node, items: &[Arg]) -> Result<Vec<String>, SblError> {
    items
        .iter()
        .map(|item| {
            item.as_text()
                .map(String::from)
                .ok_or_else(|| SblError::InvalidArguments(node.opcode.to_string()))
        })
        .collect()
}

fn build_ticker(node: &Node) -> Result<Ticker, SblError> {
    let invalid = || SblError::InvalidArguments(node.opcode.to_string());

    match node.opcode {
        "seq" => Ok(Ticker::Seq(Seq::new(
            int_arg(node, 0)?,
            int_arg(node, 1)?,
            int_arg(node, 2)?,
        ))),
        "rand" => Ok(Ticker::Rand(Rand::new(
            int_arg(node, 0)?,
            int_arg(node, 1)?,
            int_arg(node, 2)?,
        ))),
        "choose" => {
            let values = match node.data.first() {
                Some(Arg::List(items)) => texts(node, items)?,
                _ => return Err(invalid()),
            };
            Ok(Ticker::Choose(Choose::new(values, bool_arg(node, 1)?)))
        }
        "chooseFromFile" => Ok(Ticker::Choose(Choose::from_file(
            text_arg(node, 0)?,
            bool_arg(node, 1)?,
        )?)),
        "randText" => Ok(Ticker::RandText(RandText::new(
            text_arg(node, 0)?,
            int_arg(node, 1)?,
            int_arg(node, 2)?,
        ))),
        "time" => Ok(Ticker::Time(Time::new(bool_arg(node, 0)?))),
        "product" => {
            let pools = match node.data.first() {
                Some(Arg::List(items)) => items
                    .iter()
                    .map(|pool| pool.as_list().ok_or_else(invalid).and_then(|items| texts(node, items)))
                    .collect::<Result<Vec<_>, _>>()?,
                _ => return Err(invalid()),
            };
            Ok(Ticker::Product(Product::new(pools, text_arg(node, 1)?)))
        }
        "power" => {
            let pool = match node.data.first() {
                Some(Arg::Text(chars)) => chars.chars().map(String::from).collect(),
                Some(Arg::List(items)) => texts(node, items)?,
                _ => return Err(invalid()),
            };
            Ok(Ticker::Power(Power::new(
                pool,
                int_arg(node, 1)?,
                int_arg(node, 2)?,
                text_arg(node, 3)?,
            )))
        }
        "ref" => Ok(Ticker::Ref {
            direction: text_arg(node, 0)?.to_string(),
        }),
        "echo" => Ok(Ticker::Echo {
            text: text_arg(node, 0)?.to_string(),
        }),
        _ => Err(SblError::UnknownOpcode(node.opcode.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn parse(input: &str) -> Vec<Node> {
        Parser::default().parse(input, "main")
    }

    fn register_all(runtime: &mut Runtime, input: &str) -> Vec<Edge> {
        parse(input)
            .iter()
            .filter(|node| !node.is_echo())
            .map(|node| runtime.register(node).ok())
            .collect::<Option<Vec<_>>>()
            .unwrap_or_default()
    }

    #[test]
    fn test_register_returns_edges() {
        let mut runtime = Runtime::new();
        let edges = register_all(&mut runtime, "{1:3 #q ^w}{11:33:11 #w}{#q}");
        assert_eq!(edges.len(), 3);
        assert_eq!(edges[0].id, "main:q");
        assert_eq!(edges[0].direction, Some("main:w".to_string()));
        assert_eq!(edges[1].id, "main:w");
        assert_eq!(edges[1].direction, None);
        assert_eq!(edges[2].direction, Some("main:q".to_string()));
    }

    #[test]
    fn test_register_unknown_opcode() {
        let mut runtime = Runtime::new();
        let mut node = parse("{1:5}").remove(0);
        node.opcode = "frobnicate";
        assert_eq!(
            runtime.register(&node),
            Err(SblError::UnknownOpcode("frobnicate".to_string()))
        );
    }

    #[test]
    fn test_register_unknown_encoder() {
        let mut runtime = Runtime::new();
        let node = parse("{1:5 encoding=base64}").remove(0);
        assert_eq!(
            runtime.register(&node),
            Err(SblError::UnknownEncoder("base64".to_string()))
        );
    }

    #[test]
    fn test_evaluate_stringifies_by_default() {
        let mut runtime = Runtime::new();
        register_all(&mut runtime, "{1:3}");
        let values: Vec<Value> = (0..4)
            .map(|_| runtime.evaluate("main:0").ok().unwrap_or_default())
            .collect();
        assert_eq!(
            values,
            vec![
                Value::Text("1".to_string()),
                Value::Text("2".to_string()),
                Value::Text("3".to_string()),
                Value::Text("1".to_string()),
            ]
        );
    }

    #[test]
    fn test_evaluate_unknown_id() {
        let mut runtime = Runtime::new();
        assert_eq!(
            runtime.evaluate("main:9"),
            Err(SblError::UnknownId("main:9".to_string()))
        );
    }

    #[test]
    fn test_linked_tag_holds_until_target_overflows() {
        let mut runtime = Runtime::new();
        register_all(&mut runtime, "{1:3 #q ^w}{11:33:11 #w}");

        let mut rounds = Vec::new();
        for _ in 0..4 {
            let w = runtime.evaluate("main:w").ok();
            let q = runtime.evaluate("main:q").ok();
            rounds.push((q, w));
        }

        let text = |s: &str| Some(Value::Text(s.to_string()));
        assert_eq!(rounds[0], (text("1"), text("11")));
        assert_eq!(rounds[1], (text("1"), text("22")));
        assert_eq!(rounds[2], (text("1"), text("33")));
        assert_eq!(rounds[3], (text("2"), text("11")));
    }

    #[test]
    fn test_reference_mirrors_target_value() {
        let mut runtime = Runtime::new();
        register_all(&mut runtime, "{1:9 #q}{#q}");
        for expected in ["1", "2", "3"] {
            let q = runtime.evaluate("main:q").ok();
            let r = runtime.evaluate("main:0").ok();
            assert_eq!(q, Some(Value::Text(expected.to_string())));
            assert_eq!(r, Some(Value::Text(expected.to_string())));
        }
    }

    #[test]
    fn test_reference_applies_own_encoding() {
        let mut runtime = Runtime::new();
        register_all(&mut runtime, "{'a b|a b' #q}{#q encoding=urlc}");
        let q = runtime.evaluate("main:q").ok();
        let r = runtime.evaluate("main:0").ok();
        assert_eq!(q, Some(Value::Text("a b".to_string())));
        assert_eq!(r, Some(Value::Text("a%20b".to_string())));
    }

    #[test]
    fn test_encoding_chain_applies_in_order() {
        let mut runtime = Runtime::new();
        let node = Node {
            opcode: "echo",
            data: vec![Arg::Text("a b".to_string())],
            attr: [
                ("id".to_string(), crate::ast::AttrValue::Text("main:e".to_string())),
                (
                    "encoding".to_string(),
                    crate::ast::AttrValue::Text("urlc,urlc".to_string()),
                ),
            ]
            .into_iter()
            .collect(),
        };
        runtime.register(&node).ok();
        assert_eq!(
            runtime.evaluate("main:e"),
            Ok(Value::Text("a%2520b".to_string()))
        );
    }

    #[test]
    fn test_held_value_is_not_reencoded() {
        let mut runtime = Runtime::new();
        register_all(&mut runtime, "{'a b|a b' #q ^w encoding=urlc}{11:33:11 #w}");

        runtime.evaluate("main:w").ok();
        let first = runtime.evaluate("main:q").ok();
        runtime.evaluate("main:w").ok();
        let held = runtime.evaluate("main:q").ok();

        assert_eq!(first, held);
        assert!(matches!(held, Some(Value::Text(t)) if t.contains("%20")));
    }
}
