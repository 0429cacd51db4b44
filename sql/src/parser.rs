//! SQL parser: lexes and parses the restricted dialect of §4.5 using
//! `nom` combinators over the raw `&str` — small composable functions
//! (`keyword`, `identifier`, `string_literal`, `number_literal`,
//! `where_clause`) assembled with `tuple`/`alt`/`many0`, rather than a
//! hand-rolled recursive-descent scanner.
//!
//! Parse errors produce a single `EngineError::BadParse`; there is no error
//! recovery (§4.5) — the caller echoes the verbatim command text back on
//! the wire.

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, digit1, multispace0, multispace1, satisfy};
use nom::combinator::{all_consuming, map, map_res, opt, recognize, value};
use nom::multi::separated_list1;
use nom::sequence::{delimited, pair, preceded, tuple};
use nom::IResult;

use catalog::{RelOp, MAX_COLUMNS_PER_TABLE};
use common::err::EngineError;
use common::Result;

use crate::ast::{
    Assignment, Command, CommandKind, Literal, Projection, WhereTerm, DEFAULT_LIMIT, DEFAULT_OFFSET,
};

fn nom_fail(input: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Failure(nom::error::Error::new(input, nom::error::ErrorKind::Verify))
}

/// Matches a keyword case-insensitively, on a full-word boundary (so
/// `SELECTED` does not parse as the keyword `SELECT` followed by `ED`).
fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input: &'a str| {
        let (rest, token) = recognize(pair(
            satisfy(|c: char| c.is_alphabetic()),
            nom::bytes::complete::take_while(|c: char| c.is_alphanumeric() || c == '_'),
        ))(input)?;
        if token.eq_ignore_ascii_case(word) {
            Ok((rest, token))
        } else {
            Err(nom_fail(input))
        }
    }
}

/// `name` — identifiers are case-sensitive (§4.5); the first character
/// must be alphabetic or `_`, the rest alphanumeric or `_`. No reserved word
/// may be used as an identifier without quoting, and this dialect has no
/// quoting, so a reserved-word spelling is rejected here rather than
/// accepted and left to fail later as an unresolved table/column (§4.5).
fn identifier(input: &str) -> IResult<&str, String> {
    let (rest, first) = satisfy(|c: char| c.is_alphabetic() || c == '_')(input)?;
    let (rest, tail) =
        nom::bytes::complete::take_while(|c: char| c.is_alphanumeric() || c == '_')(rest)?;
    let mut ident = String::with_capacity(tail.len() + 1);
    ident.push(first);
    ident.push_str(tail);
    if catalog::reserved::is_reserved_word(&ident) {
        return Err(nom_fail(input));
    }
    Ok((rest, ident))
}

/// `'string'` — the opposite quote character (`"`) may appear freely inside;
/// no escape processing, matching the grammar (§4.5).
fn single_quoted_string(input: &str) -> IResult<&str, String> {
    map(
        delimited(
            char('\''),
            nom::bytes::complete::take_while(|c: char| c != '\''),
            char('\''),
        ),
        |s: &str| s.to_string(),
    )(input)
}

/// `"string"` with one escape: `\"` decodes to a literal `"`. Everything
/// else passes through verbatim, including a lone backslash. This is the
/// read side of the savefile engine's quoting rule (§4.7, §9 open question)
/// for strings that contain both quote characters; ordinary double-quoted
/// literals with no embedded `"` never exercise the escape path.
fn double_quoted_string(input: &str) -> IResult<&str, String> {
    let (mut rest, _) = char('"')(input)?;
    let mut out = String::new();
    loop {
        match rest.chars().next() {
            Some('"') => {
                rest = &rest[1..];
                return Ok((rest, out));
            }
            Some('\\') => {
                let after_backslash = &rest[1..];
                match after_backslash.chars().next() {
                    Some('"') => {
                        out.push('"');
                        rest = &after_backslash[1..];
                    }
                    _ => {
                        out.push('\\');
                        rest = after_backslash;
                    }
                }
            }
            Some(c) => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
            None => return Err(nom_fail(rest)),
        }
    }
}

/// `"string" | 'string'` — the opposite quote character may appear freely
/// inside (§4.5).
fn string_literal(input: &str) -> IResult<&str, Literal> {
    map(alt((double_quoted_string, single_quoted_string)), Literal::Str)(input)
}

/// `integer | real` — an optional leading `-`, a run of digits, and an
/// optional `.digits` fractional part deciding int vs. float.
fn number_literal(input: &str) -> IResult<&str, Literal> {
    let (input, sign) = opt(char('-'))(input)?;
    let (input, int_part) = digit1(input)?;
    let (input, frac) = opt(preceded(char('.'), digit1))(input)?;

    let is_negative = sign.is_some();
    match frac {
        Some(frac_digits) => {
            let text = format!(
                "{}{}.{}",
                if is_negative { "-" } else { "" },
                int_part,
                frac_digits
            );
            let v: f64 = text.parse().map_err(|_| nom_fail(input))?;
            Ok((input, Literal::Float(v)))
        }
        None => {
            let text = format!("{}{}", if is_negative { "-" } else { "" }, int_part);
            let v: i64 = text.parse().map_err(|_| nom_fail(input))?;
            Ok((input, Literal::Int(v)))
        }
    }
}

/// `literal := name | "string" | 'string' | integer | real` (§4.5).
fn literal(input: &str) -> IResult<&str, Literal> {
    alt((string_literal, number_literal, map(identifier, Literal::Ident)))(input)
}

/// `relop := "=" | "!=" | ">" | "<" | ">=" | "<="` — multi-character
/// operators are tried first so `>=` is not swallowed as `>` followed by a
/// dangling `=`.
fn relop(input: &str) -> IResult<&str, RelOp> {
    alt((
        value(RelOp::Ne, tag("!=")),
        value(RelOp::Ge, tag(">=")),
        value(RelOp::Le, tag("<=")),
        value(RelOp::Eq, tag("=")),
        value(RelOp::Gt, tag(">")),
        value(RelOp::Lt, tag("<")),
    ))(input)
}

fn where_term(input: &str) -> IResult<&str, WhereTerm> {
    let (input, column) = identifier(input)?;
    let (input, _) = multispace0(input)?;
    let (input, op) = relop(input)?;
    let (input, _) = multispace0(input)?;
    let (input, literal) = literal(input)?;
    Ok((input, WhereTerm { column, op, literal }))
}

/// `cond := cond AND cond | "(" cond ")" | name relop literal` (§4.5). The
/// dialect has no OR, so a `cond` chain is just conjunction; parentheses
/// are accepted around an individual term for familiarity but change no
/// semantics.
fn cond_term(input: &str) -> IResult<&str, WhereTerm> {
    alt((
        delimited(
            pair(char('('), multispace0),
            where_term,
            pair(multispace0, char(')')),
        ),
        where_term,
    ))(input)
}

fn where_clause(input: &str) -> IResult<&str, Vec<WhereTerm>> {
    preceded(
        tuple((keyword("WHERE"), multispace1)),
        separated_list1(
            tuple((multispace1, keyword("AND"), multispace1)),
            cond_term,
        ),
    )(input)
}

fn limit_clause(input: &str) -> IResult<&str, (u32, u32)> {
    let (input, _) = tuple((keyword("LIMIT"), multispace1))(input)?;
    let (input, limit) = map_res(digit1, |s: &str| s.parse::<u32>())(input)?;
    let (input, offset) = opt(preceded(
        tuple((multispace1, keyword("OFFSET"), multispace1)),
        map_res(digit1, |s: &str| s.parse::<u32>()),
    ))(input)?;
    Ok((input, (limit, offset.unwrap_or(DEFAULT_OFFSET))))
}

fn comma_sep(input: &str) -> IResult<&str, ()> {
    value((), tuple((multispace0, char(','), multispace0)))(input)
}

fn col_list(input: &str) -> IResult<&str, Vec<String>> {
    separated_list1(comma_sep, identifier)(input)
}

fn lit_list(input: &str) -> IResult<&str, Vec<Literal>> {
    separated_list1(comma_sep, literal)(input)
}

fn projection(input: &str) -> IResult<&str, Projection> {
    alt((
        value(Projection::Star, char('*')),
        map(col_list, Projection::Columns),
    ))(input)
}

fn assignment(input: &str) -> IResult<&str, Assignment> {
    let (input, column) = identifier(input)?;
    let (input, _) = tuple((multispace0, char('='), multispace0))(input)?;
    let (input, literal) = literal(input)?;
    Ok((input, Assignment { column, literal }))
}

fn set_list(input: &str) -> IResult<&str, Vec<Assignment>> {
    separated_list1(comma_sep, assignment)(input)
}

fn select_stmt(input: &str) -> IResult<&str, Command> {
    let (input, _) = tuple((keyword("SELECT"), multispace1))(input)?;
    let (input, projection) = projection(input)?;
    let (input, _) = tuple((multispace1, keyword("FROM"), multispace1))(input)?;
    let (input, table) = identifier(input)?;
    let (input, where_terms) = opt(preceded(multispace1, where_clause))(input)?;
    let (input, limit_offset) = opt(preceded(multispace1, limit_clause))(input)?;
    let (limit, offset) = limit_offset.unwrap_or((DEFAULT_LIMIT, DEFAULT_OFFSET));
    Ok((
        input,
        Command {
            kind: CommandKind::Select,
            table,
            projection,
            assignments: Vec::new(),
            where_terms: where_terms.unwrap_or_default(),
            limit,
            offset,
            sql_text: String::new(),
        },
    ))
}

fn update_stmt(input: &str) -> IResult<&str, Command> {
    let (input, _) = tuple((keyword("UPDATE"), multispace1))(input)?;
    let (input, table) = identifier(input)?;
    let (input, _) = tuple((multispace1, keyword("SET"), multispace1))(input)?;
    let (input, assignments) = set_list(input)?;
    let (input, where_terms) = opt(preceded(multispace1, where_clause))(input)?;
    let (input, limit_offset) = opt(preceded(multispace1, limit_clause))(input)?;
    let (limit, offset) = limit_offset.unwrap_or((DEFAULT_LIMIT, DEFAULT_OFFSET));
    Ok((
        input,
        Command {
            kind: CommandKind::Update,
            table,
            projection: Projection::Columns(Vec::new()),
            assignments,
            where_terms: where_terms.unwrap_or_default(),
            limit,
            offset,
            sql_text: String::new(),
        },
    ))
}

fn insert_stmt(input: &str) -> IResult<&str, Command> {
    let (input, _) = tuple((keyword("INSERT"), multispace1, keyword("INTO"), multispace1))(input)?;
    let (input, table) = identifier(input)?;
    let (input, _) = tuple((multispace0, char('('), multispace0))(input)?;
    let (input, cols) = col_list(input)?;
    let (input, _) = tuple((multispace0, char(')'), multispace1, keyword("VALUES"), multispace0))(input)?;
    let (input, _) = tuple((char('('), multispace0))(input)?;
    let (input, lits) = lit_list(input)?;
    let (input, _) = tuple((multispace0, char(')')))(input)?;
    let (input, limit_offset) = opt(preceded(multispace1, limit_clause))(input)?;
    let (limit, offset) = limit_offset.unwrap_or((DEFAULT_LIMIT, DEFAULT_OFFSET));

    if cols.len() != lits.len() {
        return Err(nom_fail(input));
    }
    let assignments = cols
        .into_iter()
        .zip(lits)
        .map(|(column, literal)| Assignment { column, literal })
        .collect();

    Ok((
        input,
        Command {
            kind: CommandKind::Insert,
            table,
            projection: Projection::Columns(Vec::new()),
            assignments,
            where_terms: Vec::new(),
            limit,
            offset,
            sql_text: String::new(),
        },
    ))
}

fn delete_stmt(input: &str) -> IResult<&str, Command> {
    let (input, _) = tuple((keyword("DELETE"), multispace1, keyword("FROM"), multispace1))(input)?;
    let (input, table) = identifier(input)?;
    let (input, where_terms) = opt(preceded(multispace1, where_clause))(input)?;
    let (input, limit_offset) = opt(preceded(multispace1, limit_clause))(input)?;
    let (limit, offset) = limit_offset.unwrap_or((DEFAULT_LIMIT, DEFAULT_OFFSET));
    Ok((
        input,
        Command {
            kind: CommandKind::Delete,
            table,
            projection: Projection::Columns(Vec::new()),
            assignments: Vec::new(),
            where_terms: where_terms.unwrap_or_default(),
            limit,
            offset,
            sql_text: String::new(),
        },
    ))
}

fn statement(input: &str) -> IResult<&str, Command> {
    alt((select_stmt, update_stmt, insert_stmt, delete_stmt))(input)
}

/// Parses one statement, with an optional terminating `;` (§4.5). Returns
/// `EngineError::BadParse` on any malformed input — there is no partial
/// result and no recovery.
pub fn parse(sql_text: &str) -> Result<Command> {
    let trimmed = sql_text.trim();
    let body = trimmed.strip_suffix(';').unwrap_or(trimmed);

    let parsed = all_consuming(delimited(multispace0, statement, multispace0))(body);
    match parsed {
        Ok((_, mut command)) => {
            validate_column_bounds(&command)?;
            command.sql_text = sql_text.to_string();
            Ok(command)
        }
        Err(_) => Err(EngineError::BadParse),
    }
}

/// The column/update arrays are bounded by the per-table column ceiling
/// (§4.5); exceeding it is a parse error.
fn validate_column_bounds(command: &Command) -> Result<()> {
    let projection_len = match &command.projection {
        Projection::Columns(cols) => cols.len(),
        Projection::Star => 0,
    };
    let widest = projection_len
        .max(command.assignments.len())
        .max(command.where_terms.len());
    if widest > MAX_COLUMNS_PER_TABLE {
        return Err(EngineError::BadParse);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_simple_select_star() {
        let cmd = parse("SELECT * FROM mytable").unwrap();
        assert_eq!(cmd.kind, CommandKind::Select);
        assert_eq!(cmd.table, "mytable");
        assert_eq!(cmd.projection, Projection::Star);
        assert_eq!(cmd.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn parses_select_with_limit_offset() {
        let cmd = parse("SELECT myint, notes FROM mytable LIMIT 3 OFFSET 0").unwrap();
        assert_eq!(
            cmd.projection,
            Projection::Columns(vec!["myint".into(), "notes".into()])
        );
        assert_eq!(cmd.limit, 3);
        assert_eq!(cmd.offset, 0);
    }

    #[test]
    fn parses_update_with_where_and_double_quoted_string() {
        let cmd = parse(r#"UPDATE mytable SET notes="hello" WHERE myint=0 LIMIT 1"#).unwrap();
        assert_eq!(cmd.kind, CommandKind::Update);
        assert_eq!(cmd.assignments.len(), 1);
        assert_eq!(cmd.assignments[0].column, "notes");
        assert_eq!(cmd.assignments[0].literal, Literal::Str("hello".into()));
        assert_eq!(cmd.where_terms.len(), 1);
        assert_eq!(cmd.where_terms[0].op, RelOp::Eq);
        assert_eq!(cmd.limit, 1);
    }

    #[test]
    fn single_quoted_strings_allow_embedded_double_quotes() {
        let cmd = parse(r#"UPDATE t SET s='he said "hi"' WHERE id=1"#).unwrap();
        assert_eq!(cmd.assignments[0].literal, Literal::Str(r#"he said "hi""#.into()));
    }

    #[test]
    fn double_quoted_strings_unescape_backslash_quote() {
        let cmd = parse(r#"UPDATE t SET s="it's \"quoted\"" WHERE id=1"#).unwrap();
        assert_eq!(cmd.assignments[0].literal, Literal::Str(r#"it's "quoted""#.into()));
    }

    #[test]
    fn parses_insert_with_zipped_columns_and_values() {
        let cmd = parse("INSERT INTO demo (dllong) VALUES (5)").unwrap();
        assert_eq!(cmd.kind, CommandKind::Insert);
        assert_eq!(cmd.assignments[0].column, "dllong");
        assert_eq!(cmd.assignments[0].literal, Literal::Int(5));
    }

    #[test]
    fn parses_delete_with_and_chain() {
        let cmd = parse("DELETE FROM t WHERE a=1 AND b!=2").unwrap();
        assert_eq!(cmd.kind, CommandKind::Delete);
        assert_eq!(cmd.where_terms.len(), 2);
    }

    #[test]
    fn parses_negative_and_float_literals() {
        let cmd = parse("UPDATE t SET f=-1.5 WHERE id=-3").unwrap();
        assert_eq!(cmd.assignments[0].literal, Literal::Float(-1.5));
        assert_eq!(cmd.where_terms[0].literal, Literal::Int(-3));
    }

    #[test]
    fn rejects_garbage_with_bad_parse() {
        let err = parse("SELECT FROM WHERE").unwrap_err();
        assert!(matches!(err, EngineError::BadParse));
    }

    #[test]
    fn tolerates_trailing_semicolon() {
        let cmd = parse("SELECT * FROM t;").unwrap();
        assert_eq!(cmd.table, "t");
    }

    #[test]
    fn keyword_matching_is_word_bounded() {
        // A table named `fromage` must parse as one identifier, not as
        // the keyword `FROM` followed by a dangling `age`.
        let cmd = parse("SELECT * FROM fromage").unwrap();
        assert_eq!(cmd.table, "fromage");
    }

    #[test]
    fn rejects_reserved_word_used_as_a_column_identifier() {
        let err = parse("SELECT set FROM t").unwrap_err();
        assert!(matches!(err, EngineError::BadParse));
    }

    #[test]
    fn rejects_reserved_word_used_as_a_table_identifier() {
        let err = parse("SELECT * FROM select").unwrap_err();
        assert!(matches!(err, EngineError::BadParse));
    }
}
