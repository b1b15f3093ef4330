//! S-expression reader.
//!
//! Produces Kernel-value actors straight from a character source: list
//! spines are immutable `pair_type` actors, numbers and symbols intern
//! through their factories, and `#t`/`#f`/`#inert`/`#ignore` resolve to
//! the singletons. Lexical errors return a raw `Int` (the offending
//! character), which no caller can mistake for a Kernel value; end of
//! input is `Int(-1)`.

use crate::ctx::{a_false, a_ignore, a_inert, a_nil, a_true};
use crate::data::{get_number, get_symbol};
use crate::io::{Source, END_OF_INPUT};
use crate::pair::pair_type;
use abe_core::{Config, Value};

const DELIMITERS: &str = "\"();'`,[]{}|";

fn is_space(c: i64) -> bool {
    matches!(c, 0x20 | 0x09..=0x0d)
}

fn is_digit(c: i64) -> bool {
    (('0' as i64)..=('9' as i64)).contains(&c)
}

fn is_graph(c: i64) -> bool {
    c > ' ' as i64 && c != 0x7f
}

fn one_of(c: i64, set: &str) -> bool {
    char::from_u32(c.max(0) as u32).is_some_and(|ch| c > 0 && set.contains(ch))
}

/// The end-of-input marker the reader hands back.
pub const EOF: Value = Value::Int(END_OF_INPUT);

/// Read one s-expression. Returns a Kernel-value actor, `EOF` at end of
/// input, or a raw `Int` holding the offending character on a lexical
/// error.
pub fn read_sexpr(cfg: &mut Config, src: &mut dyn Source) -> Value {
    let mut c;
    loop {
        c = src.get();
        if c == ';' as i64 {
            src.next();
            loop {
                c = src.get();
                if c == '\n' as i64 || c == '\r' as i64 || c == END_OF_INPUT {
                    break;
                }
                src.next();
            }
        }
        if !is_space(c) {
            break;
        }
        src.next();
    }

    if c == END_OF_INPUT {
        EOF
    } else if c == '(' as i64 {
        src.next();
        let mut seen = Value::Nil;
        loop {
            let x = read_sexpr(cfg, src);
            if x.is_actor() {
                seen = cfg.heap.cons(x, seen);
            } else if x == Value::Nil || x.is_cell() {
                // ')' closed the list, or a dotted tail arrived
                let mut tail = if x == Value::Nil {
                    a_nil()
                } else {
                    cfg.heap.first(x)
                };
                while seen.is_cell() {
                    let head = cfg.heap.first(seen);
                    let state = cfg.heap.cons(head, tail);
                    tail = cfg.actor(pair_type, state);
                    seen = cfg.heap.rest(seen);
                }
                return tail;
            } else {
                return x;
            }
        }
    } else if c == ')' as i64 {
        src.next();
        Value::Nil
    } else if c == '.' as i64 {
        src.next();
        let x = read_sexpr(cfg, src);
        let y = read_sexpr(cfg, src);
        if y == Value::Nil {
            cfg.heap.cons(x, y)
        } else {
            Value::Int(')' as i64) // items after the dotted tail
        }
    } else if c == '-' as i64 || is_digit(c) {
        let mut minus = false;
        if c == '-' as i64 {
            src.next();
            c = src.get();
            if is_digit(c) {
                minus = true;
            } else {
                let name = cfg.heap.atom("-");
                return get_symbol(cfg, name);
            }
        }
        let mut n: i64 = 0;
        loop {
            n = n.wrapping_mul(10).wrapping_add(c - '0' as i64);
            src.next();
            c = src.get();
            if !is_digit(c) {
                break;
            }
        }
        if c == END_OF_INPUT || is_space(c) || one_of(c, DELIMITERS) {
            get_number(cfg, Value::Int(if minus { -n } else { n }))
        } else {
            Value::Int(c) // malformed number
        }
    } else if c == '\'' as i64 {
        src.next();
        c = src.get();
        if c == '\\' as i64 {
            src.next();
            c = src.get();
            c = match char::from_u32(c.max(0) as u32) {
                Some('\\') | Some('\'') | Some('"') => c,
                Some('r') => '\r' as i64,
                Some('n') => '\n' as i64,
                Some('t') => '\t' as i64,
                Some('b') => 0x08,
                _ => END_OF_INPUT,
            };
        } else if c == '\'' as i64 {
            c = END_OF_INPUT; // '' is not a character
        }
        let x = get_number(cfg, Value::Int(c));
        if c != END_OF_INPUT {
            src.next();
            c = src.get();
        }
        if c == '\'' as i64 {
            src.next();
            x
        } else {
            Value::Int(c) // malformed character literal
        }
    } else if c == '"' as i64 {
        Value::Int(c) // no string literals
    } else if one_of(c, DELIMITERS) {
        Value::Int(c) // stray delimiter
    } else {
        let sharp = c == '#' as i64;
        let mut name = String::new();
        loop {
            if let Some(ch) = char::from_u32(c as u32) {
                name.push(ch.to_ascii_lowercase());
            }
            src.next();
            c = src.get();
            if !(is_graph(c) && !one_of(c, DELIMITERS)) {
                break;
            }
        }
        if sharp {
            match name.as_str() {
                "#inert" => return a_inert(),
                "#t" => return a_true(),
                "#f" => return a_false(),
                "#ignore" => return a_ignore(),
                _ => {}
            }
        }
        let atom = cfg.heap.atom(&name);
        get_symbol(cfg, atom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ground::init_kernel;
    use crate::io::StrSource;
    use crate::pred::eq;
    use abe_core::Config;

    fn setup() -> Config {
        let mut cfg = Config::new(1000);
        init_kernel(&mut cfg);
        cfg
    }

    fn read(cfg: &mut Config, text: &str) -> Value {
        let mut src = StrSource::new(text);
        read_sexpr(cfg, &mut src)
    }

    #[test]
    fn test_read_end_of_input() {
        let mut cfg = setup();
        assert_eq!(read(&mut cfg, ""), EOF);
        assert_eq!(read(&mut cfg, "   \r\n"), EOF);
        assert_eq!(read(&mut cfg, "; only a comment"), EOF);
    }

    #[test]
    fn test_read_singletons() {
        let mut cfg = setup();
        assert_eq!(read(&mut cfg, "#t"), a_true());
        assert_eq!(read(&mut cfg, "#f"), a_false());
        assert_eq!(read(&mut cfg, "#inert"), a_inert());
        assert_eq!(read(&mut cfg, "#ignore"), a_ignore());
        assert_eq!(read(&mut cfg, "()"), a_nil());
    }

    #[test]
    fn test_read_numbers() {
        let mut cfg = setup();
        for (text, n) in [("0", 0), ("42", 42), ("-1", -1)] {
            let got = read(&mut cfg, text);
            let want = get_number(&mut cfg, Value::Int(n));
            assert!(eq(&cfg.heap, want, got), "{}", text);
        }
    }

    #[test]
    fn test_read_minus_alone_is_symbol() {
        let mut cfg = setup();
        let got = read(&mut cfg, "-");
        let dash = cfg.heap.atom("-");
        let want = get_symbol(&mut cfg, dash);
        assert_eq!(got, want);
    }

    #[test]
    fn test_symbols_intern() {
        let mut cfg = setup();
        let a = read(&mut cfg, "foo");
        let b = read(&mut cfg, "FOO"); // forced lowercase
        assert_eq!(a, b);
        assert_ne!(a, read(&mut cfg, "bar"));
    }

    #[test]
    fn test_read_character_literals() {
        let mut cfg = setup();
        let got = read(&mut cfg, "' '");
        let want = get_number(&mut cfg, Value::Int(32));
        assert!(eq(&cfg.heap, want, got));

        let got = read(&mut cfg, "'\\n'");
        let want = get_number(&mut cfg, Value::Int(10));
        assert!(eq(&cfg.heap, want, got));

        // '' and unknown escapes are errors
        assert!(!read(&mut cfg, "''").is_actor());
        assert!(!read(&mut cfg, "'\\q'").is_actor());
    }

    #[test]
    fn test_read_lists() {
        let mut cfg = setup();
        let got = read(&mut cfg, "(x y)");
        assert!(got.is_actor());
        // spine of immutable pairs, interned symbols inside
        let x_atom = cfg.heap.atom("x");
        let x = get_symbol(&mut cfg, x_atom);
        let state = cfg.heap.rest(got);
        assert_eq!(cfg.heap.first(state), x);
    }

    #[test]
    fn test_read_dotted_pair() {
        let mut cfg = setup();
        let got = read(&mut cfg, "(a . b)");
        assert!(got.is_actor());
        let state = cfg.heap.rest(got);
        let b_atom = cfg.heap.atom("b");
        let b = get_symbol(&mut cfg, b_atom);
        assert_eq!(cfg.heap.rest(state), b);
        // more than one item after the dot is an error
        assert!(!read(&mut cfg, "(a . b c)").is_actor());
    }

    #[test]
    fn test_read_unterminated_list() {
        let mut cfg = setup();
        assert_eq!(read(&mut cfg, "(x (y"), EOF);
    }
}
