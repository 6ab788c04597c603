mod render;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use dayplan_core::db::open_db;
use dayplan_core::{
    default_log_level, AuthSession, Clock, HabitId, KvStore, LocalAuth, Planner, ProjectId,
    SqliteKvStore, SystemClock, TaskDraft, TaskId, TaskQuery, TaskScope, ToggleOutcome,
    DEFAULT_HABIT_DAYS,
};
use directories::ProjectDirs;
use log::info;
use std::path::{Path, PathBuf};

const DB_FILE_NAME: &str = "dayplan.sqlite3";
const DEFAULT_CATEGORY_COLOR: &str = "#6200ea";
const DEFAULT_TAG_COLOR: &str = "#4caf50";

type Session<'s, S> = Planner<'s, S, SystemClock>;

#[derive(Parser, Debug)]
#[command(name = "dayplan", version, long_about = None)]
#[command(about = "Habits, tasks and projects kept in a local store")]
struct Args {
    #[arg(
        long,
        global = true,
        env = "DAYPLAN_DB_PATH",
        help = "Database file. Defaults to the platform data directory"
    )]
    db: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "DAYPLAN_LOG_DIR",
        help = "Write rolling log files into this directory"
    )]
    log_dir: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "DAYPLAN_LOG_LEVEL",
        help = "trace|debug|info|warn|error"
    )]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(subcommand, about = "Track daily habits")]
    Habit(HabitCommand),
    #[command(subcommand, about = "Manage the global task list")]
    Task(TaskCommand),
    #[command(subcommand, about = "Manage task categories")]
    Category(LabelCommand),
    #[command(subcommand, about = "Manage task tags")]
    Tag(LabelCommand),
    #[command(subcommand, about = "Manage projects")]
    Project(ProjectCommand),
    #[command(subcommand, about = "Manage the tasks of one project")]
    ProjectTask(ProjectTaskCommand),
    #[command(about = "List every task scheduled on a day")]
    Today {
        #[arg(long, help = "Day to show (YYYY-MM-DD). Defaults to today")]
        date: Option<NaiveDate>,
    },
    #[command(about = "Show dashboard counts")]
    Summary,
    #[command(subcommand, about = "Local account session")]
    User(UserCommand),
}

#[derive(Subcommand, Debug)]
enum HabitCommand {
    Add {
        name: String,
        #[arg(long, default_value_t = DEFAULT_HABIT_DAYS)]
        days: u32,
        #[arg(long, default_value = "")]
        color: String,
    },
    #[command(about = "Rename or resize a habit. Resets its progress")]
    Edit {
        id: HabitId,
        name: String,
        #[arg(long)]
        days: u32,
    },
    #[command(about = "Flip one day (0-based) of a habit")]
    Toggle { id: HabitId, day: usize },
    Rm { id: HabitId },
    Ls,
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    Add(TaskAddArgs),
    Edit { id: TaskId, text: String },
    #[command(about = "Toggle completion")]
    Done { id: TaskId },
    Rm { id: TaskId },
    Ls,
    Search(SearchArgs),
}

#[derive(ClapArgs, Debug)]
struct TaskAddArgs {
    text: String,
    #[arg(long)]
    category: Option<String>,
    #[arg(long = "tag")]
    tags: Vec<String>,
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    start: Option<String>,
    #[arg(long)]
    end: Option<String>,
}

#[derive(ClapArgs, Debug)]
struct SearchArgs {
    text: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    tag: Option<String>,
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long, conflicts_with = "done")]
    open: bool,
    #[arg(long)]
    done: bool,
    #[arg(long, conflicts_with = "global", help = "Only tasks of this project")]
    project: Option<ProjectId>,
    #[arg(long, help = "Only tasks of the global list")]
    global: bool,
}

#[derive(Subcommand, Debug)]
enum LabelCommand {
    Add {
        name: String,
        #[arg(long)]
        color: Option<String>,
    },
    Rm {
        name: String,
    },
    Ls,
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    Add { name: String },
    Rename { id: ProjectId, name: String },
    #[command(about = "Delete a project and all of its tasks")]
    Rm { id: ProjectId },
    Ls,
    Show { id: ProjectId },
}

#[derive(Subcommand, Debug)]
enum ProjectTaskCommand {
    Add { project: ProjectId, text: String },
    Edit {
        project: ProjectId,
        task: TaskId,
        text: String,
    },
    Done { project: ProjectId, task: TaskId },
    Rm { project: ProjectId, task: TaskId },
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Register {
        name: String,
        email: String,
        #[arg(long, env = "DAYPLAN_PASSWORD")]
        password: String,
    },
    Login {
        email: String,
        #[arg(long, env = "DAYPLAN_PASSWORD")]
        password: String,
    },
    Logout,
    Whoami,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    enable_logging(args.log_dir.as_deref(), args.log_level.as_deref())?;

    let db_path = resolve_db_path(args.db)?;
    let conn = open_db(&db_path)
        .with_context(|| format!("failed to open database `{}`", db_path.display()))?;
    let store = SqliteKvStore::new(&conn);
    info!("event=cli_start module=cli status=ok");

    match args.command {
        Command::User(command) => run_user(&LocalAuth::new(&store), command),
        command => {
            let mut session = Planner::open(&store, SystemClock);
            dispatch(&mut session, command)
        }
    }
}

fn dispatch<S: KvStore>(session: &mut Session<'_, S>, command: Command) -> Result<()> {
    match command {
        Command::Habit(command) => run_habit(session, command),
        Command::Task(command) => run_task(session, command),
        Command::Category(command) => run_category(session, command),
        Command::Tag(command) => run_tag(session, command),
        Command::Project(command) => run_project(session, command),
        Command::ProjectTask(command) => run_project_task(session, command),
        Command::Today { date } => {
            let date = date.unwrap_or_else(|| SystemClock.today());
            let hits = session.tasks_on(date);
            if hits.is_empty() {
                println!("Nothing scheduled on {date}.");
            }
            for hit in &hits {
                println!("{}", render::scoped_task_line(hit));
            }
            Ok(())
        }
        Command::Summary => {
            print!("{}", render::summary(&session.summary()));
            Ok(())
        }
        Command::User(_) => bail!("user commands run without a planner session"),
    }
}

fn run_habit<S: KvStore>(session: &mut Session<'_, S>, command: HabitCommand) -> Result<()> {
    let habits = session.habits_mut();
    match command {
        HabitCommand::Add { name, days, color } => {
            let habit = habits.create(&name, days, &color)?;
            println!(
                "Created habit {}: {} ({} days)",
                habit.id, habit.name, habit.duration_days
            );
        }
        HabitCommand::Edit { id, name, days } => match habits.update(id, &name, days)? {
            Some(habit) => println!(
                "Updated habit {}: {} ({} days, progress reset)",
                habit.id, habit.name, habit.duration_days
            ),
            None => println!("No habit with id {id}."),
        },
        HabitCommand::Toggle { id, day } => match habits.toggle_day(id, day)? {
            ToggleOutcome::Toggled { completed: true } => {
                println!("Day {day} of habit {id} marked done.")
            }
            ToggleOutcome::Toggled { completed: false } => {
                println!("Day {day} of habit {id} marked not done.")
            }
            ToggleOutcome::Locked => {
                println!("Day {day} of habit {id} is still ahead; not toggled.")
            }
            ToggleOutcome::OutOfRange => println!("Habit {id} has no day {day}."),
            ToggleOutcome::NotFound => println!("No habit with id {id}."),
        },
        HabitCommand::Rm { id } => {
            if habits.delete(id)? {
                println!("Deleted habit {id}.");
            } else {
                println!("No habit with id {id}.");
            }
        }
        HabitCommand::Ls => {
            let today = habits.today();
            if habits.list().is_empty() {
                println!("No habits yet.");
            }
            for habit in habits.list() {
                println!("{}", render::habit_line(habit, today));
            }
        }
    }
    Ok(())
}

fn run_task<S: KvStore>(session: &mut Session<'_, S>, command: TaskCommand) -> Result<()> {
    match command {
        TaskCommand::Add(args) => {
            let draft = TaskDraft {
                text: args.text,
                date: args.date,
                start_time: args.start,
                end_time: args.end,
                category: args.category,
                tags: args.tags,
            };
            let task = session.tasks_mut().add(draft)?;
            println!("Created task {}: {}", task.id, task.text);
        }
        TaskCommand::Edit { id, text } => {
            let tasks = session.tasks_mut();
            let Some(mut task) = tasks.get(id).cloned() else {
                println!("No task with id {id}.");
                return Ok(());
            };
            task.text = text;
            tasks.update(task)?;
            println!("Updated task {id}.");
        }
        TaskCommand::Done { id } => match session.tasks_mut().toggle_completed(id)? {
            Some(true) => println!("Task {id} completed."),
            Some(false) => println!("Task {id} reopened."),
            None => println!("No task with id {id}."),
        },
        TaskCommand::Rm { id } => {
            if session.tasks_mut().delete(id)? {
                println!("Deleted task {id}.");
            } else {
                println!("No task with id {id}.");
            }
        }
        TaskCommand::Ls => {
            let tasks = session.tasks();
            if tasks.list().is_empty() {
                println!("No tasks yet.");
            }
            for task in tasks.list() {
                println!("{}", render::task_line(task));
            }
        }
        TaskCommand::Search(args) => {
            let scope = match (args.project, args.global) {
                (Some(id), _) => Some(TaskScope::Project(id)),
                (None, true) => Some(TaskScope::Global),
                (None, false) => None,
            };
            let completed = match (args.open, args.done) {
                (true, _) => Some(false),
                (false, true) => Some(true),
                (false, false) => None,
            };
            let query = TaskQuery {
                text: args.text,
                category: args.category,
                tag: args.tag,
                date: args.date,
                completed,
            };
            let hits = session.search_tasks(scope, &query);
            if hits.is_empty() {
                println!("No matching tasks.");
            }
            for hit in &hits {
                println!("{}", render::scoped_task_line(hit));
            }
        }
    }
    Ok(())
}

fn run_category<S: KvStore>(session: &mut Session<'_, S>, command: LabelCommand) -> Result<()> {
    let tasks = session.tasks_mut();
    match command {
        LabelCommand::Add { name, color } => {
            let color = color.unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string());
            if tasks.add_category(&name, &color)? {
                println!("Added category {}.", name.trim());
            } else {
                println!("Category {} already exists.", name.trim());
            }
        }
        LabelCommand::Rm { name } => {
            if tasks.delete_category(&name)? {
                println!("Deleted category {name}.");
            } else {
                println!("No category named {name}.");
            }
        }
        LabelCommand::Ls => {
            let selected = tasks.labels().selected_category();
            for category in tasks.labels().categories() {
                let marker = if selected == Some(category.name.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {}  {}", category.name, category.color);
            }
        }
    }
    Ok(())
}

fn run_tag<S: KvStore>(session: &mut Session<'_, S>, command: LabelCommand) -> Result<()> {
    let tasks = session.tasks_mut();
    match command {
        LabelCommand::Add { name, color } => {
            let color = color.unwrap_or_else(|| DEFAULT_TAG_COLOR.to_string());
            if tasks.add_tag(&name, &color)? {
                println!("Added tag {}.", name.trim());
            } else {
                println!("Tag {} already exists.", name.trim());
            }
        }
        LabelCommand::Rm { name } => {
            if tasks.delete_tag(&name)? {
                println!("Deleted tag {name}.");
            } else {
                println!("No tag named {name}.");
            }
        }
        LabelCommand::Ls => {
            for tag in tasks.labels().tags() {
                println!("{}  {}", tag.name, tag.color);
            }
        }
    }
    Ok(())
}

fn run_project<S: KvStore>(session: &mut Session<'_, S>, command: ProjectCommand) -> Result<()> {
    let projects = session.projects_mut();
    match command {
        ProjectCommand::Add { name } => {
            let project = projects.add(&name)?;
            println!("Created project {}: {}", project.id, project.name);
        }
        ProjectCommand::Rename { id, name } => {
            let Some(mut project) = projects.get_by_id(id).cloned() else {
                println!("No project with id {id}.");
                return Ok(());
            };
            project.name = name;
            projects.update(&project)?;
            println!("Renamed project {id}.");
        }
        ProjectCommand::Rm { id } => {
            let removed_tasks = projects.task_count(id);
            if projects.delete(id)? {
                println!(
                    "Deleted project {id} and {} task(s).",
                    removed_tasks.unwrap_or(0)
                );
            } else {
                println!("No project with id {id}.");
            }
        }
        ProjectCommand::Ls => {
            if projects.list().is_empty() {
                println!("No projects yet.");
            }
            for project in projects.list() {
                println!(
                    "{}  {}  ({} task(s))",
                    project.id,
                    project.name,
                    project.task_count()
                );
            }
        }
        ProjectCommand::Show { id } => {
            let Some(project) = projects.get_by_id(id) else {
                println!("No project with id {id}.");
                return Ok(());
            };
            println!("{}  {}", project.id, project.name);
            for task in &project.tasks {
                println!("  {}", render::task_line(task));
            }
        }
    }
    Ok(())
}

fn run_project_task<S: KvStore>(
    session: &mut Session<'_, S>,
    command: ProjectTaskCommand,
) -> Result<()> {
    let projects = session.projects_mut();
    match command {
        ProjectTaskCommand::Add { project, text } => match projects.add_task(project, &text)? {
            Some(task) => println!("Created task {} in project {project}: {}", task.id, task.text),
            None => println!("No project with id {project}."),
        },
        ProjectTaskCommand::Edit {
            project,
            task,
            text,
        } => {
            let existing = projects
                .get_by_id(project)
                .and_then(|p| p.tasks.get(task))
                .cloned();
            let Some(mut existing) = existing else {
                println!("No task {task} in project {project}.");
                return Ok(());
            };
            existing.text = text;
            projects.update_task(project, existing)?;
            println!("Updated task {task} in project {project}.");
        }
        ProjectTaskCommand::Done { project, task } => {
            match projects.toggle_task(project, task)? {
                Some(true) => println!("Task {task} completed."),
                Some(false) => println!("Task {task} reopened."),
                None => println!("No task {task} in project {project}."),
            }
        }
        ProjectTaskCommand::Rm { project, task } => {
            if projects.delete_task(project, task)? {
                println!("Deleted task {task} from project {project}.");
            } else {
                println!("No task {task} in project {project}.");
            }
        }
    }
    Ok(())
}

fn run_user<S: KvStore>(auth: &LocalAuth<S>, command: UserCommand) -> Result<()> {
    match command {
        UserCommand::Register {
            name,
            email,
            password,
        } => {
            let user = auth.register(&name, &email, &password)?;
            println!("Registered and signed in as {}.", user.email);
        }
        UserCommand::Login { email, password } => {
            if !auth.login(&email, &password)? {
                bail!("email or password is incorrect");
            }
            println!("Signed in as {}.", email.trim());
        }
        UserCommand::Logout => {
            auth.logout()?;
            println!("Signed out.");
        }
        UserCommand::Whoami => match auth.current_user() {
            Some(user) => println!("{} <{}>  {}", user.name, user.email, user.avatar()),
            None => println!("Not signed in."),
        },
    }
    Ok(())
}

fn enable_logging(log_dir: Option<&Path>, level: Option<&str>) -> Result<()> {
    let Some(dir) = log_dir else {
        return Ok(());
    };
    let dir = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir()?.join(dir)
    };
    let level = level.unwrap_or(default_log_level());
    dayplan_core::init_logging(level, &dir.to_string_lossy()).map_err(anyhow::Error::msg)
}

fn resolve_db_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    match ProjectDirs::from("", "", "dayplan") {
        Some(dirs) => Ok(dirs.data_dir().join(DB_FILE_NAME)),
        None => bail!("could not determine a data directory; pass --db or set DAYPLAN_DB_PATH"),
    }
}
