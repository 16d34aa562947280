//! Line-oriented terminal front-end for the controller.

use std::{io::Write, str::FromStr};

use entity::{DEPARTMENTS, Employee, resolve_department};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::watch,
    task::JoinHandle,
};
use tracing::warn;

use crate::controller::{Alert, EmployeeController};

const HELP: &str = "\
commands:
  list                              show all employees
  add <full name> | <department>    add an employee (department by number or name)
  delete <id>                       delete an employee
  departments                       show the selectable departments
  help                              show this help
  quit                              leave the desk";

/// Alerts shown on stderr, out of band from the table on stdout.
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrAlert;

impl Alert for StderrAlert {
    fn alert(&self, message: &str) {
        eprintln!("! {message}");
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    List,
    Add { full_name: String, unit: String },
    Delete(String),
    Departments,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(word, rest)| (word, rest.trim()))
            .unwrap_or((line, ""));
        match word.to_ascii_lowercase().as_str() {
            "list" | "ls" => Ok(Self::List),
            "add" => {
                let (name, department) = rest.split_once('|').unwrap_or((rest, ""));
                // An unknown department submits as unselected.
                let unit = resolve_department(department).unwrap_or_default();
                Ok(Self::Add {
                    full_name: name.trim().to_string(),
                    unit: unit.to_string(),
                })
            }
            "delete" | "rm" if !rest.is_empty() => Ok(Self::Delete(rest.to_string())),
            "delete" | "rm" => Err("usage: delete <id>".to_string()),
            "departments" => Ok(Self::Departments),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command `{other}`; try `help`")),
        }
    }
}

/// Read commands from `input` until it ends or the user quits.
pub async fn run<R, W>(
    controller: &mut EmployeeController,
    input: R,
    out: &mut W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    render_employees(controller.employees(), out)?;
    prompt(out)?;
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            prompt(out)?;
            continue;
        }
        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => execute(controller, command, out).await?,
            Err(usage) => writeln!(out, "{usage}")?,
        }
        prompt(out)?;
    }
    Ok(())
}

async fn execute<W: Write>(
    controller: &mut EmployeeController,
    command: Command,
    out: &mut W,
) -> std::io::Result<()> {
    match command {
        Command::List => render_employees(controller.employees(), out)?,
        Command::Add { full_name, unit } => {
            // Rejections are reported through alerts and the log.
            if let Ok(created) = controller.submit_new_employee(&full_name, &unit).await {
                writeln!(out, "added {} ({})", created.full_name, created.id)?;
            }
        }
        Command::Delete(id) => {
            if let Ok(deleted) = controller.request_delete(&id).await {
                writeln!(out, "deleted {deleted}")?;
            }
        }
        Command::Departments => render_departments(out)?,
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => {}
    }
    Ok(())
}

fn prompt<W: Write>(out: &mut W) -> std::io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}

pub fn render_employees<W: Write>(employees: &[Employee], out: &mut W) -> std::io::Result<()> {
    if employees.is_empty() {
        return writeln!(out, "(no employees)");
    }
    writeln!(out, "{:<36}  {:<24}  {:<16}  AVATAR", "ID", "NAME", "DEPARTMENT")?;
    for employee in employees {
        writeln!(
            out,
            "{:<36}  {:<24}  {:<16}  {}",
            employee.id, employee.full_name, employee.unit, employee.avatar_url
        )?;
    }
    Ok(())
}

pub fn render_departments<W: Write>(out: &mut W) -> std::io::Result<()> {
    for (index, name) in DEPARTMENTS.iter().enumerate() {
        writeln!(out, "{:>2}. {name}", index + 1)?;
    }
    Ok(())
}

/// Print a marker on stderr whenever the controller starts waiting on the backend.
pub fn spawn_loading_indicator(mut loading: watch::Receiver<bool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while loading.changed().await.is_ok() {
            if *loading.borrow_and_update() {
                eprintln!("… loading");
            }
        }
    })
}

/// Wait for the indicator to wind down once its controller is gone.
/// Returns whether it ended cleanly.
pub async fn finish_loading_indicator(indicator: JoinHandle<()>) -> bool {
    match indicator.await {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "loading indicator task failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use platform_api::EmployeeClient;
    use platform_backend::{BackendSettings, build_stack};

    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!("list".parse::<Command>(), Ok(Command::List));
        assert_eq!(" LS ".parse::<Command>(), Ok(Command::List));
        assert_eq!("rm abc".parse::<Command>(), Ok(Command::Delete("abc".into())));
        assert_eq!("exit".parse::<Command>(), Ok(Command::Quit));
        assert!("delete".parse::<Command>().is_err());
        assert!("fire everyone".parse::<Command>().is_err());
    }

    #[test]
    fn add_resolves_department() {
        assert_eq!(
            "add Ada Lovelace | 1".parse::<Command>(),
            Ok(Command::Add {
                full_name: "Ada Lovelace".into(),
                unit: "Engineering".into()
            })
        );
        assert_eq!(
            "add Ada Lovelace | human resources".parse::<Command>(),
            Ok(Command::Add {
                full_name: "Ada Lovelace".into(),
                unit: "Human Resources".into()
            })
        );
    }

    #[test]
    fn add_without_known_department_leaves_unit_empty() {
        for line in ["add Ada Lovelace", "add Ada Lovelace | Legal", "add"] {
            match line.parse::<Command>() {
                Ok(Command::Add { unit, .. }) => assert!(unit.is_empty(), "{line}"),
                other => panic!("{line}: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn indicator_stops_with_its_controller() {
        let (flag, rx) = watch::channel(false);
        let indicator = spawn_loading_indicator(rx);
        flag.send_replace(true);
        flag.send_replace(false);
        drop(flag);
        assert!(finish_loading_indicator(indicator).await);
    }

    #[tokio::test]
    async fn failed_indicator_is_reported_not_propagated() {
        let indicator: JoinHandle<()> = tokio::spawn(async { panic!("indicator blew up") });
        assert!(!finish_loading_indicator(indicator).await);
    }

    #[test]
    fn renders_empty_list() {
        let mut out = Vec::new();
        render_employees(&[], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "(no employees)\n");
    }

    #[tokio::test]
    async fn scripted_session() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("employes.json"),
            r#"[{"id":"e-1","full_name":"Grace Hopper","unit":"Engineering","emp_avatar":"a"}]"#,
        )
        .unwrap();
        let stack = build_stack(BackendSettings::new(dir.path()).with_latency(Duration::ZERO))
            .unwrap();
        let mut controller =
            EmployeeController::new(EmployeeClient::new(stack), Arc::new(StderrAlert));
        controller.initialize().await.unwrap();

        let script: &[u8] = b"add Ada Lovelace | Engineering\nadd | 2\ndelete e-1\nlist\nquit\nlist\n";
        let mut out = Vec::new();
        run(&mut controller, script, &mut out).await.unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("added Ada Lovelace"));
        assert!(out.contains("deleted e-1"));
        assert_eq!(controller.employees().len(), 1);
        assert_eq!(controller.employees()[0].full_name, "Ada Lovelace");
        // initial render plus one `list`; nothing runs after `quit`
        assert_eq!(out.matches("DEPARTMENT").count(), 2);
    }
}
