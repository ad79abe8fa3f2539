use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::{error::SblError, value::Value};

/// Everything except alphanumerics and the unreserved marks `-_.!~*'()`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// The component set minus the URI reserved characters `;,/?:@&=+$#`,
/// which stay literal so whole URLs survive encoding.
const URI: &AsciiSet = &COMPONENT
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'#');

/// An output encoding applied to a tag's value after each advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Str,
    Url,
    UrlComponent,
}

impl Encoding {
    pub fn from_name(name: &str) -> Result<Self, SblError> {
        match name {
            "str" => Ok(Encoding::Str),
            "url" => Ok(Encoding::Url),
            "urlc" => Ok(Encoding::UrlComponent),
            _ => Err(SblError::UnknownEncoder(name.to_string())),
        }
    }

    /// Parses a comma-separated encoder list, ignoring blank entries.
    pub fn parse_list(spec: &str) -> Result<Vec<Self>, SblError> {
        spec.split(',')
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(Self::from_name)
            .collect()
    }

    pub fn apply(&self, value: Value) -> Value {
        let text = value.to_string();
        match self {
            Encoding::Str => Value::Text(text),
            Encoding::Url => Value::Text(utf8_percent_encode(&text, URI).to_string()),
            Encoding::UrlComponent => {
                Value::Text(utf8_percent_encode(&text, COMPONENT).to_string())
            }
        }
    }
}
