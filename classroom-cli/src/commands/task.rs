//! `classroom task ...`

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde_json::json;

use classroom_core::{Task, TaskInput};
use classroom_server::ApiClient;

use super::{print_task, print_tasks, Output};

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// List tasks, optionally narrowed to one class or one state.
    List(ListArgs),

    /// Show one task.
    Show { id: String },

    /// Create an open task in an existing class.
    Create(CreateArgs),

    /// Edit a task. Omitted fields keep their value; the open/closed state is untouched.
    Update(UpdateArgs),

    /// Delete a task.
    Delete { id: String },

    /// Mark a task closed. Closing a closed task keeps its original close time.
    Close { id: String },

    /// Reopen a closed task.
    Open { id: String },
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only tasks of this class.
    #[arg(long = "class", value_name = "CLASS_ID")]
    pub class_id: Option<String>,

    /// Only open tasks.
    #[arg(long, conflicts_with = "closed")]
    pub open: bool,

    /// Only closed tasks.
    #[arg(long)]
    pub closed: bool,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Class the task belongs to.
    #[arg(long = "class", value_name = "CLASS_ID")]
    pub class_id: String,

    #[arg(long)]
    pub title: String,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Due date as RFC3339, e.g. 2025-01-10T23:59:00Z.
    #[arg(long = "due", value_name = "RFC3339")]
    pub due_at: Option<String>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub id: String,

    /// Move the task to another class.
    #[arg(long = "class", value_name = "CLASS_ID")]
    pub class_id: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// New due date as RFC3339.
    #[arg(long = "due", value_name = "RFC3339", conflicts_with = "clear_due")]
    pub due_at: Option<String>,

    /// Remove the due date.
    #[arg(long)]
    pub clear_due: bool,
}

impl UpdateArgs {
    /// Merge the given flags over the task as currently stored.
    fn merge(self, current: Task) -> TaskInput {
        let due_at = if self.clear_due {
            None
        } else {
            self.due_at
                .or_else(|| current.due_at.map(|due| due.to_rfc3339()))
        };
        TaskInput {
            class_id: self.class_id.unwrap_or(current.class_id.0),
            title: self.title.unwrap_or(current.title),
            description: self.description.unwrap_or(current.description),
            due_at,
        }
    }
}

pub fn run(command: TaskCommand, client: &ApiClient, output: Output) -> Result<()> {
    match command {
        TaskCommand::List(args) => {
            let mut tasks = match &args.class_id {
                Some(class_id) => client
                    .list_class_tasks(class_id)
                    .with_context(|| format!("failed to list tasks of class '{class_id}'"))?,
                None => client.list_tasks().context("failed to list tasks")?,
            };
            if args.open {
                tasks.retain(|task| !task.is_closed);
            } else if args.closed {
                tasks.retain(|task| task.is_closed);
            }
            if output.json {
                return output.print_json(&tasks);
            }
            print_tasks(tasks);
        }
        TaskCommand::Show { id } => {
            let task = client
                .get_task(&id)
                .with_context(|| format!("failed to load task '{id}'"))?;
            if output.json {
                return output.print_json(&task);
            }
            print_task(&task);
        }
        TaskCommand::Create(args) => {
            let mut input = TaskInput::new(args.class_id, args.title).description(args.description);
            input.due_at = args.due_at;
            let task = client
                .create_task(&input)
                .context("failed to create task")?;
            report(output, "created", &task)?;
        }
        TaskCommand::Update(args) => {
            let id = args.id.clone();
            let current = client
                .get_task(&id)
                .with_context(|| format!("failed to load task '{id}'"))?;
            let task = client
                .update_task(&id, &args.merge(current))
                .with_context(|| format!("failed to update task '{id}'"))?;
            report(output, "updated", &task)?;
        }
        TaskCommand::Delete { id } => {
            client
                .delete_task(&id)
                .with_context(|| format!("failed to delete task '{id}'"))?;
            if output.json {
                return output.print_json(&json!({ "deleted": id }));
            }
            println!("{} task {}", "deleted".red(), id);
        }
        TaskCommand::Close { id } => {
            let task = client
                .close_task(&id)
                .with_context(|| format!("failed to close task '{id}'"))?;
            report(output, "closed", &task)?;
        }
        TaskCommand::Open { id } => {
            let task = client
                .open_task(&id)
                .with_context(|| format!("failed to reopen task '{id}'"))?;
            report(output, "opened", &task)?;
        }
    }
    Ok(())
}

fn report(output: Output, verb: &str, task: &Task) -> Result<()> {
    if output.json {
        return output.print_json(task);
    }
    println!("{} task {}", verb.green(), task.id);
    print_task(task);
    Ok(())
}
