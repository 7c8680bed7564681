use super::compiled::CompiledQuery;
use crate::error::DbResult;
use crate::ident::Ident;
use crate::value::Value;

#[derive(Debug)]
enum SqlPart {
    Raw(String),
    Param,
}

/// A parameter-safe dynamic SQL builder.
///
/// `Sql` stores SQL pieces and parameters separately and generates `$1, $2, ...`
/// placeholders in the order values were bound.
#[derive(Debug)]
#[must_use]
pub struct Sql {
    parts: Vec<SqlPart>,
    params: Vec<Value>,
    tag: Option<String>,
}

impl Sql {
    /// Create a new builder with an initial SQL fragment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        Self {
            parts: vec![SqlPart::Raw(initial_sql.into())],
            params: Vec::new(),
            tag: None,
        }
    }

    /// Create an empty builder.
    pub fn empty() -> Self {
        Self {
            parts: Vec::new(),
            params: Vec::new(),
            tag: None,
        }
    }

    /// Associate a tag for observability (consuming version).
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a parameter placeholder and bind its value.
    pub fn push_bind(&mut self, value: impl Into<Value>) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self.params.push(value.into());
        self
    }

    /// Append placeholders for every value, joined by `separator`.
    ///
    /// An empty iterator appends nothing.
    pub fn push_bind_list<V>(
        &mut self,
        values: impl IntoIterator<Item = V>,
        separator: &str,
    ) -> &mut Self
    where
        V: Into<Value>,
    {
        for (i, v) in values.into_iter().enumerate() {
            if i > 0 {
                self.push(separator);
            }
            self.push_bind(v);
        }
        self
    }

    /// Append a SQL identifier (schema/table/column) after validating it.
    ///
    /// Postgres can't parameterize identifiers, so this is the only way
    /// caller-provided names reach the statement text.
    pub fn push_ident(&mut self, ident: &str) -> DbResult<&mut Self> {
        let ident = Ident::parse(ident)?;
        Ok(self.push(ident.as_str()))
    }

    /// Append ` LIMIT $n` and bind the row count.
    pub fn limit(&mut self, n: i64) -> &mut Self {
        self.push(" LIMIT ").push_bind(n)
    }

    /// Number of values bound so far.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Render SQL with `$1, $2, ...` placeholders.
    pub fn to_sql(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let mut idx: usize = 0;

        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    idx += 1;
                    let _ = write!(&mut out, "${}", idx);
                }
            }
        }
        out
    }

    /// Freeze the builder into an executable statement.
    pub fn compile(self) -> CompiledQuery {
        let sql = self.to_sql();
        let compiled = CompiledQuery::from_parts(sql, self.params);
        match self.tag {
            Some(tag) => compiled.tag(tag),
            None => compiled,
        }
    }
}
