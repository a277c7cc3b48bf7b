//! Lenient decoder for the stringified NBT the server prints in command feedback.
//!
//! The output is close to JSON but uses bare keys, single-quoted strings, typed numbers (`1b`,
//! `64.0d`) and typed arrays (`[I; 1, 2]`). Everything is mapped onto [`serde_json::Value`]:
//! number suffixes and array types are dropped, bare words that aren't numbers or booleans become
//! strings.

use serde_json::{
    Map,
    Number,
    Value,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message} at offset {offset}")]
pub struct SnbtError {
    pub message: &'static str,
    pub offset: usize,
}

pub fn from_str(input: &str) -> Result<Value, SnbtError> {
    let mut parser = Parser { input, pos: 0 };

    let value = parser.value()?;

    parser.skip_whitespace();
    if parser.pos != input.len() {
        return Err(parser.error("trailing characters"));
    }

    Ok(value)
}

fn is_bare_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+')
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn error(&self, message: &'static str) -> SnbtError {
        SnbtError {
            message,
            offset: self.pos,
        }
    }

    fn value(&mut self) -> Result<Value, SnbtError> {
        self.skip_whitespace();

        match self.peek() {
            Some('{') => self.compound(),
            Some('[') => self.list(),
            Some(quote @ ('"' | '\'')) => self.quoted(quote).map(Value::String),
            Some(_) => self.bare_value(),
            None => Err(self.error("expected value")),
        }
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            true
        }
        else {
            false
        }
    }

    fn compound(&mut self) -> Result<Value, SnbtError> {
        self.bump();
        let mut map = Map::new();

        self.skip_whitespace();
        if self.eat('}') {
            return Ok(Value::Object(map));
        }

        loop {
            self.skip_whitespace();
            let key = match self.peek() {
                Some(quote @ ('"' | '\'')) => self.quoted(quote)?,
                _ => self.bare_word("expected key")?.to_owned(),
            };

            self.skip_whitespace();
            if !self.eat(':') {
                return Err(self.error("expected ':'"));
            }

            let value = self.value()?;
            map.insert(key, value);

            if self.end_of_element('}')? {
                return Ok(Value::Object(map));
            }
        }
    }

    fn list(&mut self) -> Result<Value, SnbtError> {
        self.bump();

        // typed arrays: [B; ...], [I; ...], [L; ...]
        let rest = self.rest().as_bytes();
        if rest.len() >= 2 && matches!(rest[0], b'B' | b'I' | b'L') && rest[1] == b';' {
            self.pos += 2;
        }

        let mut values = vec![];

        self.skip_whitespace();
        if self.eat(']') {
            return Ok(Value::Array(values));
        }

        loop {
            values.push(self.value()?);

            if self.end_of_element(']')? {
                return Ok(Value::Array(values));
            }
        }
    }

    /// Consumes the separator after an element. Returns `true` once `close` has been consumed.
    /// Trailing commas are accepted.
    fn end_of_element(&mut self, close: char) -> Result<bool, SnbtError> {
        self.skip_whitespace();

        match self.peek() {
            Some(c) if c == close => {
                self.bump();
                Ok(true)
            }
            Some(',') => {
                self.bump();
                self.skip_whitespace();
                Ok(self.eat(close))
            }
            Some(_) => Err(self.error("expected separator")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn quoted(&mut self, quote: char) -> Result<String, SnbtError> {
        self.bump();
        let mut string = String::new();

        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(string),
                Some('\\') => {
                    let escaped = match self.bump() {
                        Some(c @ ('\\' | '\'' | '"')) => c,
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some(_) => return Err(self.error("invalid escape sequence")),
                        None => return Err(self.error("unterminated string")),
                    };
                    string.push(escaped);
                }
                Some(c) => string.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn bare_word(&mut self, message: &'static str) -> Result<&'a str, SnbtError> {
        let rest = self.rest();
        let end = rest.find(|c: char| !is_bare_char(c)).unwrap_or(rest.len());

        if end == 0 {
            return Err(self.error(message));
        }

        self.pos += end;
        Ok(&rest[..end])
    }

    fn bare_value(&mut self) -> Result<Value, SnbtError> {
        let word = self.bare_word("unexpected character")?;

        let value = match word {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => parse_number(word).unwrap_or_else(|| Value::String(word.to_owned())),
        };

        Ok(value)
    }
}

fn parse_number(word: &str) -> Option<Value> {
    let (digits, suffix) = match word.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => (&word[..i], Some(c.to_ascii_lowercase())),
        _ => (word, None),
    };

    let float = |digits: &str| {
        digits
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
    };

    match suffix {
        Some('b' | 's' | 'l') => digits.parse::<i64>().ok().map(Value::from),
        Some('f' | 'd') => float(digits),
        Some(_) => None,
        None => digits
            .parse::<i64>()
            .ok()
            .map(Value::from)
            .or_else(|| float(digits)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::snbt::{
        SnbtError,
        from_str,
    };

    #[test]
    fn decodes_sign_block_data() {
        let value = from_str(
            r#"{is_waxed: 0b, x: 10, y: 64, z: -3, id: "minecraft:sign", front_text: {has_glowing_text: 0b, color: "black", messages: ['""', '{"text":"hi"}', '""', '""']}}"#,
        )
        .unwrap();

        assert_eq!(value["id"], "minecraft:sign");
        assert_eq!(value["z"], -3);
        assert_eq!(value["is_waxed"], 0);
        assert_eq!(value["front_text"]["messages"][1], r#"{"text":"hi"}"#);
    }

    #[test]
    fn decodes_typed_numbers() {
        assert_eq!(
            from_str("[1.5d, 64.0D, -3.25d]").unwrap(),
            json!([1.5, 64.0, -3.25])
        );
        assert_eq!(from_str("[90.0f, -12.5f]").unwrap(), json!([90.0, -12.5]));
        assert_eq!(from_str("[1b, 2s, 3L, 4]").unwrap(), json!([1, 2, 3, 4]));
    }

    #[test]
    fn decodes_typed_arrays() {
        assert_eq!(
            from_str("{UUID: [I; 1, -2, 3, 4]}").unwrap(),
            json!({ "UUID": [1, -2, 3, 4] })
        );
        assert_eq!(from_str("[B;]").unwrap(), json!([]));
    }

    #[test]
    fn bare_words_are_strings() {
        assert_eq!(
            from_str("{color: black, glowing: true, weird: 1x}").unwrap(),
            json!({ "color": "black", "glowing": true, "weird": "1x" })
        );
    }

    #[test]
    fn unescapes_single_quoted_strings() {
        assert_eq!(
            from_str(r#"'{"text":"Bob\'s \\ place"}'"#).unwrap(),
            json!(r#"{"text":"Bob's \ place"}"#)
        );
    }

    #[test]
    fn accepts_empty_and_trailing_commas() {
        assert_eq!(from_str("{}").unwrap(), json!({}));
        assert_eq!(from_str("[ ]").unwrap(), json!([]));
        assert_eq!(from_str("{a: [1, 2,],}").unwrap(), json!({ "a": [1, 2] }));
    }

    #[test]
    fn quoted_keys() {
        assert_eq!(
            from_str(r#"{"minecraft:custom": 'x'}"#).unwrap(),
            json!({ "minecraft:custom": "x" })
        );
    }

    #[test]
    fn reports_offsets() {
        assert_eq!(
            from_str("{a: 1 b: 2}").unwrap_err(),
            SnbtError {
                message: "expected separator",
                offset: 6,
            }
        );
        assert_eq!(
            from_str("{a: 'open").unwrap_err(),
            SnbtError {
                message: "unterminated string",
                offset: 9,
            }
        );
        assert_eq!(from_str("[1] x").unwrap_err().message, "trailing characters");
        assert_eq!(from_str("").unwrap_err().message, "expected value");
    }
}
