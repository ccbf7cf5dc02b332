use anyhow::Result;

use crate::ast::{Edit, Literal};

#[derive(Debug, thiserror::Error)]
#[error("ParseError at {pos} in '{input}': {msg}")]
pub struct Error {
    msg: String,
    pos: usize,
    input: String,
}

/// Parse a single value literal, e.g. `0.5`, `[1, 2]` or `{tp: 3}`.
/// A bare top-level comma list (`1,2,3`) parses as a list.
pub fn parse_value(text: &str) -> Result<Literal<'_>> {
    use combine::{eof, EasyParser, Parser};
    value::value()
        .skip(eof())
        .easy_parse(text)
        .map(|(lit, _)| lit)
        .map_err(|e| stringify_error(text, e))
}

/// Parse an edit of the form `name=value` or `name=start..stop:num`.
pub fn parse_edit(text: &str) -> Result<Edit<'_>> {
    use combine::EasyParser;
    edit::edit()
        .easy_parse(text)
        .map(|(edit, _)| edit)
        .map_err(|e| stringify_error(text, e))
}

// combine's errors borrow the input, so we stringify them before returning.
fn stringify_error(
    text: &str,
    e: combine::easy::Errors<char, &str, combine::stream::PointerOffset<str>>,
) -> anyhow::Error {
    Error {
        pos: e.position.translate_position(text),
        input: text.to_owned(),
        msg: format!("{}", e),
    }
    .into()
}

pub mod prelude {
    pub use combine::parser::char::{char, string};
    pub use combine::parser::range::{recognize, take_while1};
    pub use combine::*;
}

pub mod util {

    use super::prelude::*;
    use combine::parser::char::{alpha_num, letter, space};

    p! {
        ident_start() -> char, {
            char('_').or(letter())
        }
    }

    p! {
        ident_rest() -> Vec<char>, {
            many(char('_').or(alpha_num()))
        }
    }

    p! {
        ident() -> &'a str, {
            recognize(ident_start().and(ident_rest()))
        }
    }

    p! {
        ws() -> (), {
            skip_many(space())
        }
    }

    wrapper! {
        lex(parser), {
            ws().with(parser).skip(ws())
        }
    }

    // zero or more items, whitespace allowed around each comma; no trailing comma.
    repeater! {
        comma_delim(parser), {
            sep_by(parser.skip(ws()), char(',').skip(ws()))
        }
    }

    #[cfg(test)]
    mod test {
        use anyhow::Result;
        use combine::parser::char::char;
        use combine::EasyParser;
        #[test]
        fn test_ident() -> Result<()> {
            assert_eq!("price", super::ident().easy_parse("price").unwrap().0);
            assert_eq!(
                "_num_trials2",
                super::ident().easy_parse("_num_trials2").unwrap().0
            );
            assert!(super::ident().easy_parse("2price").is_err());
            Ok(())
        }
        #[test]
        fn test_lex() -> Result<()> {
            assert_eq!('x', super::lex(char('x')).easy_parse("  x  ").unwrap().0);
            assert_eq!(('x', "y"), super::lex(char('x')).easy_parse("x\t y").unwrap());
            Ok(())
        }
        #[test]
        fn test_comma_delim() -> Result<()> {
            let empty: Vec<char> = vec![];
            assert_eq!(empty, super::comma_delim(char('x')).easy_parse("").unwrap().0);
            assert_eq!(
                vec!['x', 'x'],
                super::comma_delim(char('x')).easy_parse("x , x").unwrap().0
            );
            Ok(())
        }
    }
}

mod number {
    use super::prelude::*;
    use combine::parser::char::digit;

    p! {
        digits() -> &'a str, {
            take_while1(|c: char| c.is_ascii_digit())
        }
    }

    p! {
        sign() -> Option<char>, {
            optional(char('-').or(char('+')))
        }
    }

    p! {
        exponent() -> &'a str, {
            recognize((
                one_of("eE".chars()),
                optional(one_of("+-".chars())),
                skip_many1(digit()),
            ))
        }
    }

    // requires either a fractional part or an exponent, so plain ints don't match.
    p! {
        float() -> f64, {
            recognize((
                sign(),
                digits(),
                choice((
                    (char('.'), digits(), optional(exponent())).map(|_| ()),
                    exponent().map(|_| ()),
                )),
            ))
            .and_then(|s: &str| s.parse::<f64>())
        }
    }

    p! {
        int() -> i64, {
            recognize((sign(), digits())).and_then(|s: &str| s.parse::<i64>())
        }
    }

    p! {
        count() -> usize, {
            digits().and_then(|s: &str| s.parse::<usize>())
        }
    }

    // any number, widened to f64.
    p! {
        real() -> f64, {
            attempt(float()).or(int().map(|i| i as f64))
        }
    }

    #[cfg(test)]
    mod test {
        use anyhow::Result;
        use combine::EasyParser;
        #[test]
        fn test_float() -> Result<()> {
            assert_eq!(0.5, super::float().easy_parse("0.5").unwrap().0);
            assert_eq!(-1500.0, super::float().easy_parse("-1.5e3").unwrap().0);
            assert_eq!(200.0, super::float().easy_parse("2E2").unwrap().0);
            assert!(super::float().easy_parse("12").is_err());
            Ok(())
        }
        #[test]
        fn test_int() -> Result<()> {
            assert_eq!(42, super::int().easy_parse("42").unwrap().0);
            assert_eq!(-7, super::int().easy_parse("-7").unwrap().0);
            assert_eq!(3, super::int().easy_parse("+3").unwrap().0);
            Ok(())
        }
        #[test]
        fn test_real() -> Result<()> {
            assert_eq!((10.0, "..90"), super::real().easy_parse("10..90").unwrap());
            assert_eq!(2.25, super::real().easy_parse("2.25").unwrap().0);
            Ok(())
        }
    }
}

mod value {
    use super::number::{float, int};
    use super::prelude::*;
    use super::util::{comma_delim, ident, lex, ws};
    use crate::ast::{Ident, Literal};

    p! {
        quoted() -> &'a str, {
            char('"')
                .with(recognize(skip_many(none_of("\"".chars()))))
                .skip(char('"'))
        }
    }

    p! {
        word() -> Literal<'a>, {
            ident().map(|w| match w {
                "true" => Literal::Bool(true),
                "false" => Literal::Bool(false),
                _ => Literal::Text(w),
            })
        }
    }

    p! {
        number() -> Literal<'a>, {
            attempt(float().map(Literal::Float)).or(int().map(Literal::Int))
        }
    }

    p! {
        list() -> Vec<Literal<'a>>, {
            char('[').skip(ws()).with(comma_delim(literal())).skip(char(']'))
        }
    }

    p! {
        entry() -> (Ident<'a>, Literal<'a>), {
            (ident().skip(ws()), char(':').skip(ws()), literal()).map(|(k, _, v)| (k, v))
        }
    }

    p! {
        map() -> Vec<(Ident<'a>, Literal<'a>)>, {
            char('{').skip(ws()).with(comma_delim(entry())).skip(char('}'))
        }
    }

    p! {
        literal() -> Literal<'a>, {
            choice((
                quoted().map(Literal::Text),
                list().map(Literal::List),
                map().map(Literal::Map),
                number(),
                word(),
            ))
        }
    }

    p! {
        value() -> Literal<'a>, {
            sep_by1(lex(literal()), char(',')).map(|mut items: Vec<Literal<'a>>| {
                if items.len() == 1 {
                    items.swap_remove(0)
                } else {
                    Literal::List(items)
                }
            })
        }
    }

}

mod edit {
    use super::number::{count, real};
    use super::prelude::*;
    use super::util::{ident, lex};
    use super::value::value;
    use crate::ast::{Edit, Rhs};

    p! {
        sweep() -> Rhs<'a>, {
            (lex(real()), string(".."), lex(real()), char(':'), lex(count()))
                .map(|(start, _, stop, _, num)| Rhs::Sweep { start, stop, num })
        }
    }

    p! {
        rhs() -> Rhs<'a>, {
            attempt(sweep()).or(value().map(Rhs::Value))
        }
    }

    p! {
        edit() -> Edit<'a>, {
            (lex(ident()), char('='), rhs())
                .skip(eof())
                .map(|(name, _, rhs)| Edit { name, rhs })
        }
    }

    #[cfg(test)]
    mod test {
        use crate::ast::{Edit, Literal, Rhs};
        use anyhow::Result;
        use combine::EasyParser;
        #[test]
        fn test_edit() -> Result<()> {
            assert_eq!(
                Edit {
                    name: "a",
                    rhs: Rhs::Value(Literal::Int(2))
                },
                super::edit().easy_parse("a=2").unwrap().0
            );
            assert_eq!(
                Edit {
                    name: "y_true",
                    rhs: Rhs::Value(Literal::ints(&[1, 0]))
                },
                super::edit().easy_parse("y_true = 1,0").unwrap().0
            );
            Ok(())
        }
        #[test]
        fn test_sweep() -> Result<()> {
            assert_eq!(
                Edit {
                    name: "price",
                    rhs: Rhs::Sweep {
                        start: 10.0,
                        stop: 90.0,
                        num: 5
                    }
                },
                super::edit().easy_parse("price=10..90:5").unwrap().0
            );
            assert_eq!(
                Rhs::Value(Literal::Float(1.5)),
                super::edit().easy_parse("x=1.5").unwrap().0.rhs
            );
            Ok(())
        }
        #[test]
        fn test_bad_edit() -> Result<()> {
            assert!(super::edit().easy_parse("=2").is_err());
            assert!(super::edit().easy_parse("a=").is_err());
            assert!(super::edit().easy_parse("a=1 2").is_err());
            Ok(())
        }
    }
}
