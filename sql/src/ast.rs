use catalog::RelOp;

/// Default `LIMIT` when the clause is absent: 2^30 (§4.5).
pub const DEFAULT_LIMIT: u32 = 1 << 30;
/// Default `OFFSET` when the clause is absent (§4.5).
pub const DEFAULT_OFFSET: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Select,
    Update,
    Insert,
    Delete,
}

/// A parsed literal, still untyped against any particular column (§4.5
/// `literal`). The executor (`engine`) resolves each one against the
/// target column's `ColumnKind` (§4.6 step 3).
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// The `name` alternative of the `literal` production: a bare,
    /// unquoted token used as a string-shaped value.
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
}

/// SELECT's projection: `*` or an explicit column list (§4.5 `col_list`).
/// Kept as its own type per §9's open question — `*` is a pure expansion
/// marker here, never an alias for caller-owned storage.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Star,
    Columns(Vec<String>),
}

/// One `name = literal` pair, used by both UPDATE's `set_list` and
/// INSERT's zipped `(col_list, lit_list)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub literal: Literal,
}

/// One `name relop literal` triple from a WHERE clause (§4.5 `cond`).
/// Conjunctive only: a `Command`'s `where_terms` are ANDed together
/// left-to-right (§4.6 scan loop); the grammar's parenthesized `cond` just
/// controls grouping of the same AND chain, since there is no OR.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereTerm {
    pub column: String,
    pub op: RelOp,
    pub literal: Literal,
}

/// The parsed form of one SQL statement (§4.5 Output). Carries the
/// verbatim source text alongside the structured fields because write
/// callbacks receive the original SQL text (§4.6, §9 Callbacks).
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub kind: CommandKind,
    pub table: String,
    pub projection: Projection,
    pub assignments: Vec<Assignment>,
    pub where_terms: Vec<WhereTerm>,
    pub limit: u32,
    pub offset: u32,
    pub sql_text: String,
}
