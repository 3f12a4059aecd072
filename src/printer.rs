use std::fmt;

use crate::value::SchemeValue;

/// Render a value in its readable (write) form: strings keep their quotes.
pub fn print_value(val: &SchemeValue) -> String {
    render(val, true)
}

/// Render a value for `display`: strings are printed raw.
pub fn display_value(val: &SchemeValue) -> String {
    render(val, false)
}

fn render(val: &SchemeValue, quote_strings: bool) -> String {
    match val {
        SchemeValue::Pair(_) => {
            let mut s = String::from("(");
            let mut first = true;
            let mut current = val;
            loop {
                match current {
                    SchemeValue::Pair(pair) => {
                        if !first {
                            s.push(' ');
                        }
                        s.push_str(&render(&pair.first, quote_strings));
                        current = &pair.second;
                        first = false;
                    }
                    SchemeValue::Nil => {
                        s.push(')');
                        break;
                    }
                    _ => {
                        s.push_str(" . ");
                        s.push_str(&render(current, quote_strings));
                        s.push(')');
                        break;
                    }
                }
            }
            s
        }
        SchemeValue::Symbol(sym) => sym.name().to_string(),
        SchemeValue::Int(i) => i.to_string(),
        SchemeValue::Float(f) if f.fract() == 0.0 && f.abs() < 1e16 => format!("{:.1}", f),
        SchemeValue::Float(f) => f.to_string(),
        SchemeValue::Str(s) if quote_strings => format!("{:?}", s),
        SchemeValue::Str(s) => s.to_string(),
        SchemeValue::Bool(true) => "#t".to_string(),
        SchemeValue::Bool(false) => "#f".to_string(),
        SchemeValue::Nil => "()".to_string(),
        SchemeValue::Procedure(proc) => proc.to_string(),
        SchemeValue::Environment(env) => env.borrow().to_string(),
        SchemeValue::Undefined => "#!undefined".to_string(),
    }
}

impl fmt::Display for SchemeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&print_value(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{cons, list_from_vec};

    #[test]
    fn test_print_lists() {
        let list = list_from_vec(vec![
            SchemeValue::int(1),
            SchemeValue::symbol("a"),
            list_from_vec(vec![SchemeValue::Bool(true)]),
        ]);
        assert_eq!(print_value(&list), "(1 a (#t))");

        let dotted = cons(SchemeValue::int(1), SchemeValue::int(2));
        assert_eq!(print_value(&dotted), "(1 . 2)");
        assert_eq!(print_value(&SchemeValue::Nil), "()");
    }

    #[test]
    fn test_print_vs_display_strings() {
        let s = SchemeValue::string("hi there");
        assert_eq!(print_value(&s), "\"hi there\"");
        assert_eq!(display_value(&s), "hi there");
    }

    #[test]
    fn test_print_float() {
        assert_eq!(print_value(&SchemeValue::Float(2.5)), "2.5");
        assert_eq!(print_value(&SchemeValue::Float(5.0)), "5.0");
    }
}
