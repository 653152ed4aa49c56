//! Todo list entries and the edits applied to them

use serde::{Deserialize, Serialize};

/// A todo entry persisted under `userTodos`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoEntry {
    /// Millisecond timestamp of creation
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

/// One mutation of the todo list.
///
/// Every edit rewrites the whole array; there is no partial update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoEdit {
    Add { text: String, now_ms: i64 },
    Edit { id: i64, text: String },
    Delete { id: i64 },
    Toggle { id: i64 },
}

impl TodoEdit {
    /// Apply the edit, returning false when it changed nothing
    pub fn apply(&self, todos: &mut Vec<TodoEntry>) -> bool {
        match self {
            TodoEdit::Add { text, now_ms } => {
                let text = text.trim();
                if text.is_empty() {
                    return false;
                }
                let id = next_id(todos, *now_ms);
                todos.push(TodoEntry {
                    id,
                    text: text.to_string(),
                    done: false,
                });
                true
            }
            // Blank text keeps the entry; only Delete removes one
            TodoEdit::Edit { id, text } => {
                let text = text.trim();
                if text.is_empty() {
                    return false;
                }
                todos
                    .iter_mut()
                    .find(|t| t.id == *id)
                    .map(|todo| todo.text = text.to_string())
                    .is_some()
            }
            TodoEdit::Delete { id } => {
                let original_len = todos.len();
                todos.retain(|t| t.id != *id);
                todos.len() < original_len
            }
            TodoEdit::Toggle { id } => todos
                .iter_mut()
                .find(|t| t.id == *id)
                .map(|todo| todo.done = !todo.done)
                .is_some(),
        }
    }
}

/// Timestamp id, bumped past the newest entry so keys stay distinct
fn next_id(todos: &[TodoEntry], now_ms: i64) -> i64 {
    todos
        .iter()
        .map(|t| t.id + 1)
        .max()
        .map_or(now_ms, |min| now_ms.max(min))
}

pub fn remaining(todos: &[TodoEntry]) -> usize {
    todos.iter().filter(|t| !t.done).count()
}
