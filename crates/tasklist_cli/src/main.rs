use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::warn;
use std::io::{self, Write};
use time::Date;

use tasklist_cli::cli::{self, Cli, Command};
use tasklist_cli::{logging, render};
use tasklist_core::config;
use tasklist_core::error::AppError;
use tasklist_core::form::{Submission, TaskForm};
use tasklist_core::model::{Priority, Task};
use tasklist_core::status::{classify, today_local};
use tasklist_core::store::TaskStore;
use tasklist_core::view::{Filter, project, split_groups};

const CANCEL_WORD: &str = ":cancel";

fn task_value(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "title": task.title,
        "deadline": task.deadline,
        "priority": task.priority,
        "completed": task.completed,
    })
}

fn print_task_json(task: &Task) {
    println!("{}", task_value(task));
}

fn list_payload(tasks: &[Task], filter: Filter, today: Date) -> serde_json::Value {
    let visible = project(tasks, filter, today);
    let (_, completed) = split_groups(tasks);

    let active: Vec<serde_json::Value> = visible
        .iter()
        .map(|task| {
            let mut value = task_value(task);
            value["status"] = serde_json::Value::String(
                classify(task.deadline.as_deref(), today).label().to_string(),
            );
            value
        })
        .collect();

    serde_json::json!({
        "filter": filter.label(),
        "active": active,
        "completed": completed.iter().map(|task| task_value(task)).collect::<Vec<_>>(),
    })
}

/// A mutation that found no matching task: a silent no-op in the store,
/// reported neutrally here with a zero exit.
fn report_miss(json: bool, id: &str) {
    if json {
        println!("null");
    } else {
        println!("No task with id {id}; nothing changed.");
    }
}

fn read_line() -> Result<Option<String>, AppError> {
    let mut line = String::new();
    let bytes = io::stdin()
        .read_line(&mut line)
        .map_err(|err| AppError::io(err.to_string()))?;

    if bytes == 0 { Ok(None) } else { Ok(Some(line)) }
}

fn confirm(question: &str) -> Result<bool, AppError> {
    print!("{question} [y/N]: ");
    io::stdout()
        .flush()
        .map_err(|err| AppError::io(err.to_string()))?;

    let answer = read_line()?.unwrap_or_default();
    let answer = answer.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::validation(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if in_quotes => match chars.next() {
                Some(escaped @ ('"' | '\\')) => current.push(escaped),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => current.push('\\'),
            },
            '"' => in_quotes = !in_quotes,
            ch if ch.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            ch => current.push(ch),
        }
    }

    if in_quotes {
        return Err(AppError::validation("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_command(cli_args: Cli) -> Result<(), AppError> {
    let config_load = config::load_config_with_fallback();
    if let Some(err) = &config_load.error {
        warn!("using default config: {err}");
    }
    let palette = config::palette_for_theme(config_load.config.theme.as_deref());
    let mut store = TaskStore::open_default()?;

    match cli_args.command {
        Command::Add {
            title,
            deadline,
            priority,
        } => {
            let deadline = match deadline.as_deref() {
                Some(raw) => cli::parse_deadline_arg(raw)?,
                None => None,
            };
            let priority = cli::parse_priority_arg(priority.as_deref())?;

            let mut form = TaskForm::new();
            form.open_for_new();
            form.set_title(&title);
            form.set_deadline(deadline.as_deref().unwrap_or(""));
            form.set_priority(priority);

            if let Submission::Created(task) = form.submit(&mut store)? {
                if cli_args.json {
                    print_task_json(&task);
                } else {
                    println!("Added task: {} ({})", task.title, task.id);
                }
            }
        }
        Command::Edit {
            id,
            title,
            deadline,
            priority,
        } => {
            let deadline = match deadline.as_deref() {
                Some(raw) => cli::parse_deadline_arg(raw)?,
                None => None,
            };
            let priority = cli::parse_priority_arg(priority.as_deref())?;

            let Some(bound) = store.get(&id).cloned() else {
                report_miss(cli_args.json, &id);
                return Ok(());
            };

            let mut form = TaskForm::new();
            form.open_for_edit(&bound);
            form.set_title(&title);
            form.set_deadline(deadline.as_deref().unwrap_or(""));
            form.set_priority(priority);

            match form.submit(&mut store)? {
                Submission::Updated(task) => {
                    if cli_args.json {
                        print_task_json(&task);
                    } else {
                        println!("Updated task: {} ({})", task.title, task.id);
                    }
                }
                Submission::Missed => report_miss(cli_args.json, &id),
                Submission::Created(_) => {}
            }
        }
        Command::Done { id } => match store.set_completed(&id, true)? {
            Some(task) => {
                if cli_args.json {
                    print_task_json(&task);
                } else {
                    println!("Completed task: {} ({})", task.title, task.id);
                }
            }
            None => report_miss(cli_args.json, &id),
        },
        Command::Reopen { id } => match store.set_completed(&id, false)? {
            Some(task) => {
                if cli_args.json {
                    print_task_json(&task);
                } else {
                    println!("Reopened task: {} ({})", task.title, task.id);
                }
            }
            None => report_miss(cli_args.json, &id),
        },
        Command::Delete { id, yes } => {
            let Some(task) = store.get(&id).cloned() else {
                report_miss(cli_args.json, &id);
                return Ok(());
            };

            if !yes {
                let question = format!("Delete '{}'? This cannot be undone.", task.title);
                if !confirm(&question)? {
                    println!("Aborted; nothing was deleted.");
                    return Ok(());
                }
            }

            if let Some(removed) = store.remove(&id)? {
                if cli_args.json {
                    print_task_json(&removed);
                } else {
                    println!("Deleted task: {} ({})", removed.title, removed.id);
                }
            }
        }
        Command::List {
            filter,
            hide_completed,
        } => {
            let filter = filter
                .map(|choice| choice.filter())
                .or(config_load.config.default_filter)
                .unwrap_or_default();
            let today = today_local();

            if cli_args.json {
                println!("{}", list_payload(store.tasks(), filter, today));
            } else {
                print!(
                    "{}",
                    render::render_board(store.tasks(), filter, today, &palette, hide_completed)
                );
            }
        }
    }

    Ok(())
}

enum FieldInput {
    Cancelled,
    Keep,
    Clear,
    Value(String),
}

fn prompt_field(label: &str, current: &str) -> Result<FieldInput, AppError> {
    let shown = if current.is_empty() { "-" } else { current };
    print!("{label} [{shown}]: ");
    io::stdout()
        .flush()
        .map_err(|err| AppError::io(err.to_string()))?;

    let Some(line) = read_line()? else {
        return Ok(FieldInput::Cancelled);
    };

    let trimmed = line.trim();
    Ok(match trimmed {
        CANCEL_WORD => FieldInput::Cancelled,
        "" => FieldInput::Keep,
        "-" => FieldInput::Clear,
        value => FieldInput::Value(value.to_string()),
    })
}

fn cancel_form(form: &mut TaskForm) -> Result<(), AppError> {
    form.cancel();
    println!("Cancelled; nothing was saved.");
    Ok(())
}

/// Walks the open form through its fields. A failed validation gate keeps
/// the form open and starts the prompts over; `:cancel` or end-of-input
/// discards the draft.
fn drive_form(form: &mut TaskForm, store: &mut TaskStore) -> Result<(), AppError> {
    loop {
        match prompt_field("Title", form.title())? {
            FieldInput::Cancelled => return cancel_form(form),
            FieldInput::Keep => {}
            FieldInput::Clear => form.set_title(""),
            FieldInput::Value(value) => form.set_title(&value),
        }

        loop {
            match prompt_field("Deadline (YYYY-MM-DDTHH:MM)", form.deadline())? {
                FieldInput::Cancelled => return cancel_form(form),
                FieldInput::Keep => break,
                FieldInput::Clear => {
                    form.set_deadline("");
                    break;
                }
                FieldInput::Value(value) => match cli::parse_deadline_arg(&value) {
                    Ok(deadline) => {
                        form.set_deadline(deadline.as_deref().unwrap_or(""));
                        break;
                    }
                    Err(err) => eprintln!("ERROR: {err}"),
                },
            }
        }

        loop {
            let current = form.priority().map(|p| p.label()).unwrap_or("");
            match prompt_field("Priority (High/Medium/Low)", current)? {
                FieldInput::Cancelled => return cancel_form(form),
                FieldInput::Keep => break,
                FieldInput::Clear => {
                    form.set_priority(None);
                    break;
                }
                FieldInput::Value(value) => match value.parse::<Priority>() {
                    Ok(priority) => {
                        form.set_priority(Some(priority));
                        break;
                    }
                    Err(err) => eprintln!("ERROR: {err}"),
                },
            }
        }

        match form.submit(store) {
            Ok(Submission::Created(task)) => {
                println!("Added task: {} ({})", task.title, task.id);
                return Ok(());
            }
            Ok(Submission::Updated(task)) => {
                println!("Updated task: {} ({})", task.title, task.id);
                return Ok(());
            }
            Ok(Submission::Missed) => {
                println!("No matching task; nothing changed.");
                return Ok(());
            }
            Err(err) if err.code() == "validation" => eprintln!("ERROR: {err}"),
            Err(err) => return Err(err),
        }
    }
}

fn run_form_new() -> Result<(), AppError> {
    let mut store = TaskStore::open_default()?;
    let mut form = TaskForm::new();
    form.open_for_new();
    drive_form(&mut form, &mut store)
}

fn run_form_edit(id: &str) -> Result<(), AppError> {
    let mut store = TaskStore::open_default()?;
    let Some(task) = store.get(id).cloned() else {
        println!("No task with id {id}; nothing changed.");
        return Ok(());
    };

    let mut form = TaskForm::new();
    form.open_for_edit(&task);
    drive_form(&mut form, &mut store)
}

fn run_interactive() -> Result<(), AppError> {
    loop {
        let Some(input) = read_line()? else {
            break;
        };

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        if args[0] == "new" && args.len() == 1 {
            if let Err(err) = run_form_new() {
                eprintln!("ERROR: {}", err);
            }
            continue;
        }

        if args[0] == "edit" && args.len() == 2 {
            if let Err(err) = run_form_edit(&args[1]) {
                eprintln!("ERROR: {}", err);
            }
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("tasklist".to_string());
        argv.extend(args);

        let cli_args = match Cli::try_parse_from(argv) {
            Ok(cli_args) => cli_args,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli_args) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn main() {
    let _logger = logging::init().ok();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive() {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli_args = match Cli::try_parse() {
        Ok(cli_args) => cli_args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli_args) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
