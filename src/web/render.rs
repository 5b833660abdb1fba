//! Response formatters for the todo list.
//!
//! The store hands back the same `Vec<Todo>` for every route; the route picks
//! how it is shown.

use std::fmt::Display;

use axum::{
    http::header,
    response::{Html, IntoResponse, Response},
};
use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use tera::{Context, Tera};

use super::error::ApiError;
use crate::entities::Todo;

const LAYOUT: &str = "layout.html";
const LAYOUT_SOURCE: &str = include_str!("../../templates/layout.html");

pub trait TodoFormatter {
    fn render(&self, todos: Vec<Todo>) -> Result<Response, ApiError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl TodoFormatter for JsonFormatter {
    fn render(&self, todos: Vec<Todo>) -> Result<Response, ApiError> {
        let mut body = serde_json::to_vec(&todos).map_err(ApiError::Encode)?;
        body.push(b'\n');
        Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
    }
}

pub struct HtmlFormatter {
    tera: Tera,
}

impl HtmlFormatter {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template(LAYOUT, LAYOUT_SOURCE)?;
        Ok(Self { tera })
    }
}

#[derive(Serialize)]
struct TodoView<'a> {
    id: String,
    task: &'a str,
    done: bool,
    created_at: String,
    completed_at: String,
}

impl TodoFormatter for HtmlFormatter {
    fn render(&self, todos: Vec<Todo>) -> Result<Response, ApiError> {
        let tasks: Vec<TodoView<'_>> = todos
            .iter()
            .map(|todo| TodoView {
                id: todo.id.to_string(),
                task: &todo.task,
                done: todo.done,
                created_at: format_date(Some(todo.created_at.with_timezone(&Local))),
                completed_at: format_date(todo.completed_at.map(|at| at.with_timezone(&Local))),
            })
            .collect();

        let mut context = Context::new();
        context.insert("tasks", &tasks);
        let page = self.tera.render(LAYOUT, &context)?;
        Ok(Html(page).into_response())
    }
}

/// `Jan 2, 2006 at 3:04pm`, or `-` when unset.
pub fn format_date<Tz>(at: Option<DateTime<Tz>>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match at {
        Some(at) => at.format("%b %-d, %Y at %-I:%M%P").to_string(),
        None => "-".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use chrono::Utc;

    use super::*;

    #[test]
    fn formats_dates_like_the_list_view() {
        let at = Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap();
        assert_eq!(format_date(Some(at)), "Jan 2, 2006 at 3:04pm");

        let morning = Utc.with_ymd_and_hms(2025, 11, 20, 9, 7, 0).unwrap();
        assert_eq!(format_date(Some(morning)), "Nov 20, 2025 at 9:07am");

        assert_eq!(format_date::<Utc>(None), "-");
    }

    #[tokio::test]
    async fn html_escapes_task_text() {
        let formatter = HtmlFormatter::new().unwrap();
        let todo = Todo::new("<script>alert(1)</script>".into(), Utc::now());

        let response = formatter.render(vec![todo]).unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let page = String::from_utf8(body.to_vec()).unwrap();

        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>alert(1)"));
    }

    #[tokio::test]
    async fn json_lists_todos_in_order() {
        let first = Todo::new("first".into(), Utc::now());
        let second = Todo::new("second".into(), Utc::now());

        let response = JsonFormatter
            .render(vec![first.clone(), second.clone()])
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let decoded: Vec<Todo> = serde_json::from_slice(&body).unwrap();

        assert_eq!(decoded, vec![first, second]);
    }
}
