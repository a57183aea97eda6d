//! Inline math evaluation
//!
//! Finds the arithmetic expression that ends at the cursor (`2*(3+4)|`) and
//! computes it. This is an editor hint: every failure is reported as `None`.

use tracing::debug;

use crate::error::{Error, Result};
use crate::span::Span;
use crate::text;

/// Expression scanning options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MathOptions {
    /// Step over closing parentheses right after the offset
    pub look_ahead: bool,
    /// Allow whitespace inside the expression
    pub whitespace: bool,
}

impl Default for MathOptions {
    fn default() -> Self {
        Self {
            look_ahead: true,
            whitespace: true,
        }
    }
}

/// An evaluated expression
#[derive(Debug, Clone, PartialEq)]
pub struct MathResult {
    pub start: usize,
    pub end: usize,
    pub result: f64,
    /// `result` with at most four decimals, trailing zeros removed
    pub snippet: String,
}

/// Find and evaluate the expression ending at `pos` on its line
pub fn evaluate_math(code: &str, pos: usize, options: MathOptions) -> Option<MathResult> {
    if pos > code.len() || !code.is_char_boundary(pos) {
        debug!("math offset {} out of range", pos);
        return None;
    }

    let line = text::line_span(code, pos);
    let expr = extract(line.slice(code), pos - line.start, options)?.shift(line.start);

    match evaluate(expr.slice(code)) {
        Ok(result) if result.is_finite() => Some(MathResult {
            start: expr.start,
            end: expr.end,
            result,
            snippet: format_result(result),
        }),
        Ok(result) => {
            debug!("math expression {:?} is not finite: {}", expr.slice(code), result);
            None
        }
        Err(err) => {
            debug!("math expression {:?} rejected: {}", expr.slice(code), err);
            None
        }
    }
}

fn format_result(value: f64) -> String {
    format!("{:.4}", value)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Span of the expression ending at `pos` in `line`
pub fn extract(line: &str, pos: usize, options: MathOptions) -> Option<Span> {
    let bytes = line.as_bytes();
    let mut pos = text::clamp_offset(line, pos);

    if options.look_ahead && bytes.get(pos) == Some(&b')') {
        pos += 1;
        // Spaces are stepped over only when another `)` follows them
        loop {
            let mut next = pos;
            while options.whitespace && next < bytes.len() && is_space(bytes[next]) {
                next += 1;
            }
            if bytes.get(next) != Some(&b')') {
                break;
            }
            pos = next + 1;
        }
    }

    let end = pos;
    let mut cursor = pos;
    let mut braces = 0usize;

    while cursor > 0 {
        if let Some(before) = number_start(bytes, cursor) {
            cursor = before;
            continue;
        }
        match bytes[cursor - 1] {
            b')' => braces += 1,
            b'(' if braces == 0 => break,
            b'(' => braces -= 1,
            b if options.whitespace && is_space(b) => {}
            b'+' | b'-' | b'*' | b'/' | b'\\' => {}
            _ => break,
        }
        cursor -= 1;
    }

    if cursor == end || braces != 0 {
        return None;
    }
    while cursor < end && is_space(bytes[cursor]) {
        cursor += 1;
    }
    Some(Span::new(cursor, end))
}

/// Start of a number ending at `cursor`, if one does
fn number_start(bytes: &[u8], cursor: usize) -> Option<usize> {
    if !bytes[cursor - 1].is_ascii_digit() {
        return None;
    }
    let mut i = cursor - 1;
    let mut dot = false;
    while i > 0 {
        match bytes[i - 1] {
            b'.' if dot => break,
            b'.' => dot = true,
            b if b.is_ascii_digit() => {}
            _ => break,
        }
        i -= 1;
    }
    Some(i)
}

fn is_space(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Evaluate an arithmetic expression
///
/// Supports `+ - * /`, `\` (integer division), unary signs, parentheses
/// and decimal numbers.
pub fn evaluate(expr: &str) -> Result<f64> {
    let mut parser = ExprParser {
        bytes: expr.as_bytes(),
        pos: 0,
    };
    let value = parser.expression()?;
    parser.skip_space();
    if parser.pos < parser.bytes.len() {
        return Err(parser.error("unexpected character"));
    }
    Ok(value)
}

struct ExprParser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl ExprParser<'_> {
    fn error(&self, message: &str) -> Error {
        Error::MalformedExpression(format!("{} at {}", message, self.pos))
    }

    fn skip_space(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_space();
        self.bytes.get(self.pos).copied()
    }

    fn expression(&mut self) -> Result<f64> {
        let mut value = self.term()?;
        while let Some(op @ (b'+' | b'-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == b'+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64> {
        let mut value = self.factor()?;
        while let Some(op @ (b'*' | b'/' | b'\\')) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            value = match op {
                b'*' => value * rhs,
                _ if rhs == 0.0 => return Err(self.error("division by zero")),
                b'/' => value / rhs,
                _ => (value / rhs).floor(),
            };
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64> {
        match self.peek() {
            Some(b'+') => {
                self.pos += 1;
                self.factor()
            }
            Some(b'-') => {
                self.pos += 1;
                Ok(-self.factor()?)
            }
            Some(b'(') => {
                self.pos += 1;
                let value = self.expression()?;
                if self.peek() != Some(b')') {
                    return Err(self.error("expected ')'"));
                }
                self.pos += 1;
                Ok(value)
            }
            Some(b) if b.is_ascii_digit() || b == b'.' => self.number(),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    fn number(&mut self) -> Result<f64> {
        let start = self.pos;
        while self.pos < self.bytes.len()
            && (self.bytes[self.pos].is_ascii_digit() || self.bytes[self.pos] == b'.')
        {
            self.pos += 1;
        }
        // Only ASCII digits and dots were consumed
        let literal = std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| self.error("invalid number"))?;
        literal
            .parse::<f64>()
            .map_err(|_| Error::MalformedExpression(format!("invalid number {:?}", literal)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(code: &str) -> Option<String> {
        evaluate_math(code, code.len(), MathOptions::default()).map(|r| r.snippet)
    }

    fn extracted(line: &str, pos: usize) -> Option<&str> {
        extract(line, pos, MathOptions::default()).map(|s| s.slice(line))
    }

    #[test]
    fn test_trims_trailing_zeros() {
        assert_eq!(eval("2/3").as_deref(), Some("0.6667"));
        assert_eq!(eval("1+3").as_deref(), Some("4"));
        assert_eq!(eval("1.5*3").as_deref(), Some("4.5"));
        assert_eq!(eval("0.1+0.2").as_deref(), Some("0.3"));
    }

    #[test]
    fn test_failures_are_none() {
        assert_eq!(eval("1/0"), None);
        assert_eq!(eval("5\\0"), None);
        assert_eq!(eval("foo"), None);
        assert_eq!(eval("1+"), None);
        assert_eq!(eval(""), None);
        assert_eq!(evaluate_math("1+1", 10, MathOptions::default()), None);
        assert_eq!(evaluate_math("é", 1, MathOptions::default()), None);
    }

    #[test]
    fn test_result_offsets() {
        let code = "width: 10*2";
        let result = evaluate_math(code, code.len(), MathOptions::default()).unwrap();
        assert_eq!((result.start, result.end), (7, 11));
        assert_eq!(result.result, 20.0);
    }

    #[test]
    fn test_line_local() {
        let code = "1+1\n2*3\n";
        let result = evaluate_math(code, 7, MathOptions::default()).unwrap();
        assert_eq!((result.start, result.end), (4, 7));
        assert_eq!(result.snippet, "6");
    }

    #[test]
    fn test_extract() {
        assert_eq!(extracted("a 2 + 3", 7), Some("2 + 3"));
        assert_eq!(extracted("(1+2)*3", 7), Some("(1+2)*3"));
        assert_eq!(extracted("f(1+2", 5), Some("1+2"));
        assert_eq!(extracted("1.2.3", 5), Some("2.3"));
        assert_eq!(extracted("abc", 3), None);
        assert_eq!(extracted("1+2)", 4), None);
    }

    #[test]
    fn test_extract_without_whitespace() {
        let options = MathOptions {
            look_ahead: true,
            whitespace: false,
        };
        assert_eq!(
            extract("a 2 + 3", 7, options).map(|s| s.slice("a 2 + 3")),
            Some("3")
        );
    }

    #[test]
    fn test_extract_look_ahead() {
        let line = "(1+2)";
        assert_eq!(extracted(line, 4), Some("(1+2)"));

        let options = MathOptions {
            look_ahead: false,
            whitespace: true,
        };
        assert_eq!(extract(line, 4, options).map(|s| s.slice(line)), Some("1+2"));
    }

    #[test]
    fn test_look_ahead_keeps_trailing_space() {
        assert_eq!(extracted("(1+2) px", 4), Some("(1+2)"));
        assert_eq!(extracted("((1+2) ) px", 5), Some("((1+2) )"));

        let result = evaluate_math("(1+2) px", 4, MathOptions::default()).unwrap();
        assert_eq!((result.start, result.end), (0, 5));
        assert_eq!(result.snippet, "3");
    }

    #[test]
    fn test_evaluate() {
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(evaluate("-3 + +1").unwrap(), -2.0);
        assert_eq!(evaluate("7 \\ 2").unwrap(), 3.0);
        assert_eq!(evaluate(".5 * 4").unwrap(), 2.0);
        assert_eq!(evaluate("10 - 4 - 3").unwrap(), 3.0);

        assert!(matches!(evaluate("(1"), Err(Error::MalformedExpression(_))));
        assert!(evaluate("1 2").is_err());
        assert!(evaluate("1..2").is_err());
        assert!(evaluate("4/0").is_err());
    }
}
