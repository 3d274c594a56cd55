use std::{collections::VecDeque, io};

use async_trait::async_trait;
use hotel_core::{
    BoxedError, Executor, ExecutorError, ExecutorResult, Input, Output, Query, ResultSet,
};

/// A reply the scripted executor hands out to the next data call
pub enum Reply {
    Rows(ResultSet),
    Affected(u64),
    Id(i64),
    Fail(ExecutorError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Begin,
    Commit,
    Rollback,
    Effect(Query),
    Count(Query),
    Collect(Query),
    Id(Query),
}

/// An executor that replays scripted replies and records every call
#[derive(Default)]
pub struct ScriptedExecutor {
    replies: VecDeque<Reply>,
    pub calls: Vec<Call>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, reply: Reply) -> Self {
        self.replies.push_back(reply);
        self
    }

    pub fn rows(self, columns: &[&str], rows: &[&[&str]]) -> Self {
        self.reply(Reply::Rows(ResultSet::from_parts(columns, rows)))
    }

    pub fn empty(self) -> Self {
        self.reply(Reply::Rows(ResultSet::default()))
    }

    /// Replies to a count with this many rows
    pub fn count(self, rows: usize) -> Self {
        let row: &[&str] = &["x"];
        self.rows(&["x"], &vec![row; rows])
    }

    pub fn affected(self, rows: u64) -> Self {
        self.reply(Reply::Affected(rows))
    }

    pub fn id(self, id: i64) -> Self {
        self.reply(Reply::Id(id))
    }

    pub fn fail(self, error: ExecutorError) -> Self {
        self.reply(Reply::Fail(error))
    }

    /// Every statement sent, leaving out transaction boundaries
    pub fn queries(&self) -> Vec<&Query> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Effect(q) | Call::Count(q) | Call::Collect(q) | Call::Id(q) => Some(q),
                _ => None,
            })
            .collect()
    }

    /// Statements that write, by their SQL
    pub fn writes(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Effect(q) => Some(q.sql()),
                _ => None,
            })
            .collect()
    }

    pub fn boundaries(&self) -> Vec<Call> {
        self.calls
            .iter()
            .filter(|call| matches!(call, Call::Begin | Call::Commit | Call::Rollback))
            .cloned()
            .collect()
    }

    fn next(&mut self, call: Call) -> Reply {
        let description = format!("{:?}", call);
        self.calls.push(call);

        self.replies
            .pop_front()
            .unwrap_or_else(|| panic!("no reply scripted for {}", description))
    }
}

#[async_trait]
impl Executor for ScriptedExecutor {
    async fn run_for_effect(&mut self, statement: &Query) -> ExecutorResult<u64> {
        match self.next(Call::Effect(statement.clone())) {
            Reply::Affected(rows) => Ok(rows),
            Reply::Fail(e) => Err(e),
            _ => panic!("expected an affected or fail reply for {}", statement.sql()),
        }
    }

    async fn run_count_only(&mut self, query: &Query) -> ExecutorResult<usize> {
        match self.next(Call::Count(query.clone())) {
            Reply::Rows(records) => Ok(records.row_count()),
            Reply::Fail(e) => Err(e),
            _ => panic!("expected a rows or fail reply for {}", query.sql()),
        }
    }

    async fn run_and_collect(&mut self, query: &Query) -> ExecutorResult<ResultSet> {
        match self.next(Call::Collect(query.clone())) {
            Reply::Rows(records) => Ok(records),
            Reply::Fail(e) => Err(e),
            _ => panic!("expected a rows or fail reply for {}", query.sql()),
        }
    }

    async fn last_generated_id(&mut self, lookup: &Query) -> ExecutorResult<i64> {
        match self.next(Call::Id(lookup.clone())) {
            Reply::Id(id) => Ok(id),
            Reply::Fail(e) => Err(e),
            _ => panic!("expected an id or fail reply for {}", lookup.sql()),
        }
    }

    async fn begin(&mut self) -> ExecutorResult<()> {
        self.calls.push(Call::Begin);
        Ok(())
    }

    async fn commit(&mut self) -> ExecutorResult<()> {
        self.calls.push(Call::Commit);
        Ok(())
    }

    async fn rollback(&mut self) -> ExecutorResult<()> {
        self.calls.push(Call::Rollback);
        Ok(())
    }
}

pub fn boxed(message: &str) -> BoxedError {
    message.into()
}

/// Feeds prepared lines, then reports the input as closed
pub struct ScriptedInput {
    lines: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }
}

impl Input for ScriptedInput {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

#[derive(Default)]
pub struct CapturedOutput {
    pub lines: Vec<String>,
    pub prompts: Vec<String>,
    pub errors: Vec<String>,
}

impl CapturedOutput {
    pub fn printed(&self, text: &str) -> bool {
        self.lines.iter().any(|l| l == text)
    }

    pub fn reported(&self, text: &str) -> bool {
        self.errors.iter().any(|e| e == text)
    }
}

impl Output for CapturedOutput {
    fn line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn prompt(&mut self, text: &str) {
        self.prompts.push(text.to_string());
    }

    fn error(&mut self, text: &str) {
        self.errors.push(text.to_string());
    }
}
