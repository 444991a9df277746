pub mod class;
pub mod serve;
pub mod task;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use classroom_core::{Class, Task, TaskState};

/// How client commands print their results.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!(
            "{}",
            serde_json::to_string_pretty(value).context("failed to serialize JSON output")?
        );
        Ok(())
    }
}

#[derive(Tabled)]
struct ClassRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "class")]
    class_name: String,
    #[tabled(rename = "teacher")]
    teacher: String,
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "title")]
    title: String,
    #[tabled(rename = "due")]
    due: String,
    #[tabled(rename = "class")]
    class_id: String,
}

pub fn print_classes(mut classes: Vec<Class>) {
    if classes.is_empty() {
        println!("No classes.");
        return;
    }
    classes.sort_by(|a, b| {
        a.class_name
            .cmp(&b.class_name)
            .then_with(|| a.id.cmp(&b.id))
    });
    let rows: Vec<ClassRow> = classes
        .into_iter()
        .map(|class| ClassRow {
            id: class.id.0,
            class_name: class.class_name,
            teacher: class.teacher,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

/// Tasks without a due date sort last.
pub fn print_tasks(mut tasks: Vec<Task>) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    tasks.sort_by(|a, b| {
        (a.due_at.is_none(), a.due_at, &a.title, &a.id).cmp(&(
            b.due_at.is_none(),
            b.due_at,
            &b.title,
            &b.id,
        ))
    });
    let rows: Vec<TaskRow> = tasks
        .into_iter()
        .map(|task| TaskRow {
            state: state_label(task.state()),
            due: format_time(task.due_at),
            id: task.id.0,
            title: task.title,
            class_id: task.class_id.0,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

pub fn print_class(class: &Class) {
    println!("{} {}", class.class_name.bold(), format!("({})", class.id).bright_black());
    println!("  teacher: {}", class.teacher);
}

pub fn print_task(task: &Task) {
    println!(
        "{} {} {}",
        state_label(task.state()),
        task.title.bold(),
        format!("({})", task.id).bright_black()
    );
    println!("  class:  {}", task.class_id);
    if !task.description.is_empty() {
        println!("  notes:  {}", task.description);
    }
    println!("  due:    {}", format_time(task.due_at));
    if let Some(closed_at) = task.closed_at {
        println!("  closed: {}", format_time(Some(closed_at)));
    }
}

fn state_label(state: TaskState) -> String {
    match state {
        TaskState::Open => "OPEN".green().bold().to_string(),
        TaskState::Closed => "CLOSED".bright_black().bold().to_string(),
    }
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    match time {
        Some(time) => time.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => "-".to_string(),
    }
}
