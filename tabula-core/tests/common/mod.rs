#![allow(dead_code)]

use std::{
    borrow::Cow,
    collections::VecDeque,
    fmt::{self, Display},
    future::Future,
};
use tabula_core::{
    AsValue, ColumnDef, Connection, Driver, Entity, Error, Executor, GenericSqlWriter, Prepared,
    Query, QueryResult, Result, RowLabeled, RowsAffected, Statement, Value,
    stream::{self, Stream},
};

/// Hand written entity, the same shape `#[derive(Entity)]` produces.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub session: Option<String>,
}

fn user_id(entity: &User) -> Value {
    entity.id.as_value()
}

fn user_name(entity: &User) -> Value {
    entity.name.clone().as_value()
}

fn user_age(entity: &User) -> Value {
    entity.age.as_value()
}

static USER_COLUMNS: [ColumnDef<User>; 3] = [
    ColumnDef {
        name: "id",
        field: "id",
        identity: true,
        value: user_id,
    },
    ColumnDef {
        name: "name",
        field: "name",
        identity: false,
        value: user_name,
    },
    ColumnDef {
        name: "age",
        field: "age",
        identity: false,
        value: user_age,
    },
];

impl Entity for User {
    fn columns() -> &'static [ColumnDef<Self>] {
        &USER_COLUMNS
    }
    fn from_row(row: RowLabeled) -> Result<Self> {
        let mut result = User::default();
        for (name, value) in row.into_columns() {
            match name.as_str() {
                "id" => result.id = AsValue::try_from_value(value)?,
                "name" => result.name = AsValue::try_from_value(value)?,
                "age" => result.age = AsValue::try_from_value(value)?,
                _ => {}
            }
        }
        Ok(result)
    }
    fn identity(&self) -> i64 {
        self.id
    }
    fn with_identity(&self, identity: i64) -> Self {
        User {
            id: identity,
            ..self.clone()
        }
    }
}

pub fn user(name: &str, age: i32) -> User {
    User {
        id: 0,
        name: name.into(),
        age,
        session: None,
    }
}

pub fn user_row(id: i64, name: &str, age: i64) -> QueryResult {
    QueryResult::Row(RowLabeled::new(
        ["id", "name", "age"].map(String::from).into(),
        [
            Value::Int64(Some(id)),
            Value::Varchar(Some(name.into())),
            Value::Int64(Some(age)),
        ]
        .into(),
    ))
}

pub fn count_row(count: i64) -> QueryResult {
    QueryResult::Row(RowLabeled::new(
        ["COUNT(*)".to_string()].into(),
        [Value::Int64(Some(count))].into(),
    ))
}

pub fn affected(rows_affected: u64, last_affected_id: Option<i64>) -> QueryResult {
    QueryResult::Affected(RowsAffected {
        rows_affected,
        last_affected_id,
    })
}

pub struct ScriptedDriver;

impl Driver for ScriptedDriver {
    type Connection = ScriptedConnection;
    type SqlWriter = GenericSqlWriter;
    type Prepared = ScriptedPrepared;

    const NAME: &'static str = "scripted";

    fn sql_writer(&self) -> GenericSqlWriter {
        GenericSqlWriter
    }
}

pub struct ScriptedPrepared {
    sql: String,
    params: Vec<Value>,
}

impl Display for ScriptedPrepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

impl Prepared for ScriptedPrepared {
    fn bind(&mut self, value: impl Into<Value>) -> Result<&mut Self> {
        self.params.push(value.into());
        Ok(self)
    }
    fn bind_index(&mut self, value: impl Into<Value>, index: u64) -> Result<&mut Self> {
        let index = index as usize;
        if index == 0 {
            return Err(Error::msg("Parameter indexes start from 1"));
        }
        if self.params.len() < index {
            self.params.resize(index, Value::Null);
        }
        self.params[index - 1] = value.into();
        Ok(self)
    }
}

/// Connection answering every statement with the next scripted response and
/// recording what it was asked to run.
pub struct ScriptedConnection {
    driver: ScriptedDriver,
    pub open: bool,
    pub ping_fails: bool,
    pub pings: usize,
    pub executed: Vec<Statement>,
    responses: VecDeque<Result<Vec<QueryResult>>>,
}

impl ScriptedConnection {
    pub fn new() -> Self {
        Self {
            driver: ScriptedDriver,
            open: true,
            ping_fails: false,
            pings: 0,
            executed: Vec::new(),
            responses: VecDeque::new(),
        }
    }

    pub fn respond(&mut self, results: impl IntoIterator<Item = QueryResult>) -> &mut Self {
        self.responses.push_back(Ok(results.into_iter().collect()));
        self
    }

    pub fn fail(&mut self, message: &'static str) -> &mut Self {
        self.responses.push_back(Err(Error::msg(message)));
        self
    }

    pub fn sql(&self) -> Vec<&str> {
        self.executed.iter().map(|v| v.sql.as_str()).collect()
    }
}

impl Executor for ScriptedConnection {
    type Driver = ScriptedDriver;

    fn driver(&self) -> &ScriptedDriver {
        &self.driver
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn ping(&mut self) -> impl Future<Output = Result<()>> + Send {
        self.pings += 1;
        let fails = self.ping_fails;
        async move {
            if fails {
                Err(Error::msg("The server went away"))
            } else {
                Ok(())
            }
        }
    }

    fn prepare(
        &mut self,
        query: String,
    ) -> impl Future<Output = Result<Query<ScriptedDriver>>> + Send {
        async move {
            Ok(Query::Prepared(ScriptedPrepared {
                sql: query,
                params: Vec::new(),
            }))
        }
    }

    fn run(
        &mut self,
        query: Query<ScriptedDriver>,
    ) -> impl Stream<Item = Result<QueryResult>> + Send {
        let statement = match query {
            Query::Raw(sql) => Statement {
                sql,
                params: Vec::new(),
            },
            Query::Prepared(prepared) => Statement {
                sql: prepared.sql,
                params: prepared.params,
            },
        };
        self.executed.push(statement);
        let items: Vec<Result<QueryResult>> = match self.responses.pop_front() {
            Some(Ok(results)) => results.into_iter().map(Ok).collect(),
            Some(Err(error)) => vec![Err(error)],
            None => Vec::new(),
        };
        stream::iter(items)
    }
}

impl Connection for ScriptedConnection {
    fn connect(_url: Cow<'static, str>) -> impl Future<Output = Result<Self>> + Send {
        async { Ok(ScriptedConnection::new()) }
    }

    fn disconnect(self) -> impl Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }
}
