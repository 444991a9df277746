//! `classroom class ...`

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use serde_json::json;

use classroom_core::ClassInput;
use classroom_server::ApiClient;

use super::{print_class, print_classes, print_tasks, Output};

#[derive(Subcommand, Debug)]
pub enum ClassCommand {
    /// List all classes.
    List,

    /// Show one class.
    Show { id: String },

    /// Create a class.
    Create {
        /// Class name, e.g. "Algorithms".
        #[arg(long)]
        name: String,

        #[arg(long)]
        teacher: String,
    },

    /// Rename a class or change its teacher. Omitted fields keep their value.
    Update {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        teacher: Option<String>,
    },

    /// Delete a class together with all of its tasks.
    Delete { id: String },

    /// List the tasks of one class.
    Tasks { id: String },
}

pub fn run(command: ClassCommand, client: &ApiClient, output: Output) -> Result<()> {
    match command {
        ClassCommand::List => {
            let classes = client.list_classes().context("failed to list classes")?;
            if output.json {
                return output.print_json(&classes);
            }
            print_classes(classes);
        }
        ClassCommand::Show { id } => {
            let class = client
                .get_class(&id)
                .with_context(|| format!("failed to load class '{id}'"))?;
            if output.json {
                return output.print_json(&class);
            }
            print_class(&class);
        }
        ClassCommand::Create { name, teacher } => {
            let class = client
                .create_class(&ClassInput::new(name, teacher))
                .context("failed to create class")?;
            if output.json {
                return output.print_json(&class);
            }
            println!("{} class {}", "created".green(), class.id);
            print_class(&class);
        }
        ClassCommand::Update { id, name, teacher } => {
            let current = client
                .get_class(&id)
                .with_context(|| format!("failed to load class '{id}'"))?;
            let input = ClassInput::new(
                name.unwrap_or(current.class_name),
                teacher.unwrap_or(current.teacher),
            );
            let class = client
                .update_class(&id, &input)
                .with_context(|| format!("failed to update class '{id}'"))?;
            if output.json {
                return output.print_json(&class);
            }
            println!("{} class {}", "updated".green(), class.id);
            print_class(&class);
        }
        ClassCommand::Delete { id } => {
            client
                .delete_class(&id)
                .with_context(|| format!("failed to delete class '{id}'"))?;
            if output.json {
                return output.print_json(&json!({ "deleted": id }));
            }
            println!("{} class {} and its tasks", "deleted".red(), id);
        }
        ClassCommand::Tasks { id } => {
            let tasks = client
                .list_class_tasks(&id)
                .with_context(|| format!("failed to list tasks of class '{id}'"))?;
            if output.json {
                return output.print_json(&tasks);
            }
            print_tasks(tasks);
        }
    }
    Ok(())
}
