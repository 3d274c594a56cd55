use chrono::NaiveDate;

/// A value bound to a positional placeholder (`$1`, `$2`, ...) of a [`Query`].
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Int(i32),
    BigInt(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    /// A NULL that the database treats as text
    Null,
}

/// A SQL statement together with the values bound to its placeholders.
///
/// Values that originate from the user are only ever passed as a [`Param`],
/// the statement text itself is always a constant.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    sql: String,
    params: Vec<Param>,
}

impl Query {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: vec![],
        }
    }

    /// Binds the next placeholder
    pub fn bind(mut self, param: impl Into<Param>) -> Self {
        self.params.push(param.into());
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Self::BigInt(value)
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDate> for Param {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl<T> From<Option<T>> for Param
where
    T: Into<Param>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}
