use indexmap::IndexMap;

use crate::ast::{Expr, Value};
use crate::context::{ElementDef, LineDef};
use crate::tree::Config;

/// JSON formatting style.
#[derive(Clone, Copy)]
pub enum JsonStyle {
    /// Compact: no whitespace between tokens.
    Compact,
    /// Pretty: 2-space indented, one entry per line.
    Pretty,
}

struct JsonWriter {
    buf: String,
    style: JsonStyle,
    depth: usize,
}

impl JsonWriter {
    fn new(style: JsonStyle) -> Self {
        JsonWriter {
            buf: String::new(),
            style,
            depth: 0,
        }
    }

    fn is_pretty(&self) -> bool {
        matches!(self.style, JsonStyle::Pretty)
    }

    fn newline(&mut self) {
        if self.is_pretty() {
            self.buf.push('\n');
            for _ in 0..self.depth {
                self.buf.push_str("  ");
            }
        }
    }

    fn space(&mut self) {
        if self.is_pretty() {
            self.buf.push(' ');
        }
    }

    /// `{"variables": {...}, "elements": {...}, "lines": {...}}`
    fn write_config(&mut self, conf: &Config) {
        self.begin_object();
        let mut first = true;

        self.entry_sep(&mut first);
        self.write_key("variables");
        self.begin_object();
        let mut first_var = true;
        for (name, value) in conf.vars() {
            self.entry_sep(&mut first_var);
            self.write_key(name);
            self.write_value(value);
        }
        self.end_object(first_var);

        self.entry_sep(&mut first);
        self.write_key("elements");
        self.begin_object();
        let mut first_elem = true;
        for (name, elem) in conf.elements() {
            self.entry_sep(&mut first_elem);
            self.write_key(name);
            self.write_element(elem);
        }
        self.end_object(first_elem);

        self.entry_sep(&mut first);
        self.write_key("lines");
        self.begin_object();
        let mut first_line = true;
        for (name, line) in conf.lines() {
            self.entry_sep(&mut first_line);
            self.write_key(name);
            self.write_line(line);
        }
        self.end_object(first_line);

        self.end_object(first);
    }

    fn write_element(&mut self, elem: &ElementDef) {
        self.begin_object();
        let mut first = true;
        self.entry_sep(&mut first);
        self.write_key("type");
        self.write_string_value(&elem.etype);
        self.entry_sep(&mut first);
        self.write_key("properties");
        self.write_properties(&elem.properties);
        self.end_object(first);
    }

    fn write_line(&mut self, line: &LineDef) {
        self.begin_object();
        let mut first = true;
        self.entry_sep(&mut first);
        self.write_key("type");
        self.write_string_value(&line.etype);
        self.entry_sep(&mut first);
        self.write_key("elements");
        self.write_string_array(&line.names);
        self.end_object(first);
    }

    fn write_properties(&mut self, props: &IndexMap<String, Expr>) {
        self.begin_object();
        let mut first = true;
        for (key, expr) in props {
            self.entry_sep(&mut first);
            self.write_key(key);
            self.write_value(expr.value());
        }
        self.end_object(first);
    }

    fn write_value(&mut self, value: &Value) {
        match value {
            Value::Number(n) => self.write_number(*n),
            Value::Vector(v) => {
                self.buf.push('[');
                for (i, n) in v.iter().enumerate() {
                    if i > 0 {
                        self.buf.push(',');
                        self.space();
                    }
                    self.write_number(*n);
                }
                self.buf.push(']');
            }
            Value::Text(s) => self.write_string_value(s),
            Value::Line(names) => self.write_string_array(names),
            Value::Config(conf) => self.write_config(conf),
        }
    }

    fn write_number(&mut self, n: f64) {
        // Integers print without a decimal point while every integer is
        // exactly representable (below 2^53). JSON has no NaN or infinity.
        if !n.is_finite() {
            self.buf.push_str("null");
        } else if n.fract() == 0.0 && n.abs() < (1u64 << 53) as f64 {
            self.buf.push_str(&(n as i64).to_string());
        } else {
            self.buf.push_str(&n.to_string());
        }
    }

    fn write_string_array(&mut self, arr: &[String]) {
        self.buf.push('[');
        for (i, s) in arr.iter().enumerate() {
            if i > 0 {
                self.buf.push(',');
                self.space();
            }
            self.write_string_value(s);
        }
        self.buf.push(']');
    }

    fn begin_object(&mut self) {
        self.buf.push('{');
        self.depth += 1;
    }

    /// Close an object; `empty` is true when no entry was written.
    fn end_object(&mut self, empty: bool) {
        self.depth -= 1;
        if !empty {
            self.newline();
        }
        self.buf.push('}');
    }

    fn entry_sep(&mut self, first: &mut bool) {
        if *first {
            *first = false;
        } else {
            self.buf.push(',');
        }
        self.newline();
    }

    fn write_key(&mut self, key: &str) {
        self.write_string_value(key);
        self.buf.push(':');
        self.space();
    }

    fn write_string_value(&mut self, s: &str) {
        self.buf.push('"');
        for ch in s.chars() {
            match ch {
                '"' => self.buf.push_str("\\\""),
                '\\' => self.buf.push_str("\\\\"),
                '\n' => self.buf.push_str("\\n"),
                '\r' => self.buf.push_str("\\r"),
                '\t' => self.buf.push_str("\\t"),
                '\u{0008}' => self.buf.push_str("\\b"),
                '\u{000C}' => self.buf.push_str("\\f"),
                c if c < '\u{0020}' => {
                    self.buf.push_str(&format!("\\u{:04x}", c as u32));
                }
                c => self.buf.push(c),
            }
        }
        self.buf.push('"');
    }
}

/// Serialize a Config to a compact JSON string (no whitespace).
pub fn to_json(conf: &Config) -> String {
    let mut w = JsonWriter::new(JsonStyle::Compact);
    w.write_config(conf);
    w.buf
}

/// Serialize a Config to a pretty-printed JSON string (2-space indent).
pub fn to_json_pretty(conf: &Config) -> String {
    let mut w = JsonWriter::new(JsonStyle::Pretty);
    w.write_config(conf);
    w.buf
}
