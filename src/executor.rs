use crate::config::UninstallConfig;
use crate::error::DispatchError;
use crate::model::InstalledEntity;
use std::process::{Command, Stdio};

/// Starts processes on behalf of the dispatcher.
pub trait Launcher {
    /// Runs a literal command line without waiting for it.
    fn start(&self, command_line: &str) -> Result<(), DispatchError>;
    /// Runs `program` with a hidden window and waits for it to exit.
    fn run_hidden(&self, program: &str, args: &[String]) -> Result<(), DispatchError>;
}

pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn start(&self, command_line: &str) -> Result<(), DispatchError> {
        let mut command = shell_command(command_line);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        command.spawn().map_err(|source| DispatchError::Spawn {
            program: command_line.to_string(),
            source,
        })?;
        Ok(())
    }

    fn run_hidden(&self, program: &str, args: &[String]) -> Result<(), DispatchError> {
        let mut command = Command::new(program);
        command.args(args);
        hide_window(&mut command);

        let mut child = command.spawn().map_err(|source| DispatchError::Spawn {
            program: program.to_string(),
            source,
        })?;
        let status = child.wait().map_err(DispatchError::Wait)?;
        log::info!("{} exited with {}", program, status);
        Ok(())
    }
}

#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    use std::os::windows::process::CommandExt;

    // `/S` makes cmd strip only the outer quote pair, leaving the uninstall
    // string's own quoting intact even around `(x86)` paths.
    let mut command = Command::new("cmd");
    command.raw_arg(format!("/S /C \"{command_line}\""));
    command
}

#[cfg(not(windows))]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(command_line);
    command
}

#[cfg(windows)]
fn hide_window(command: &mut Command) {
    use std::os::windows::process::CommandExt;

    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    command.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn hide_window(_command: &mut Command) {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The package installer ran to completion.
    ProductRemoved,
    /// The uninstall command was started.
    CommandStarted,
    NoMechanism,
}

pub fn dispatch(
    entity: &InstalledEntity,
    launcher: &impl Launcher,
    config: &UninstallConfig,
) -> Result<DispatchOutcome, DispatchError> {
    if !entity.is_removable() {
        return Ok(DispatchOutcome::NoMechanism);
    }

    if !entity.product_identifier.is_empty() {
        let mut args = vec!["/x".to_string(), entity.product_identifier.clone()];
        if config.prompt_restart {
            args.push("/promptrestart".to_string());
        }
        log::info!("Removing {} via {} {}", entity.display_name, config.installer, args.join(" "));
        launcher.run_hidden(&config.installer, &args)?;
        return Ok(DispatchOutcome::ProductRemoved);
    }

    log::info!("Starting {}", entity.uninstall_command);
    launcher.start(&entity.uninstall_command)?;
    Ok(DispatchOutcome::CommandStarted)
}


#[cfg(test)]
mod tests {
    use super::testing::{Launch, RecordingLauncher};
    use super::*;

    const PRODUCT: &str = "{90160000-008C-0000-0000-0000000FF1CE}";

    #[test]
    fn product_identifier_takes_precedence() {
        let mut entity = InstalledEntity::new("Office".into(), "setup.exe /uninstall".into());
        entity.product_identifier = PRODUCT.into();
        let launcher = RecordingLauncher::default();

        let outcome = dispatch(&entity, &launcher, &UninstallConfig::default()).unwrap();

        assert_eq!(outcome, DispatchOutcome::ProductRemoved);
        assert_eq!(
            *launcher.launches.borrow(),
            vec![Launch::Hidden(
                "msiexec.exe".into(),
                vec!["/x".into(), PRODUCT.into(), "/promptrestart".into()]
            )]
        );
    }

    #[test]
    fn restart_prompt_can_be_disabled() {
        let mut entity = InstalledEntity::new("Office".into(), String::new());
        entity.product_identifier = PRODUCT.into();
        let launcher = RecordingLauncher::default();
        let config = UninstallConfig {
            prompt_restart: false,
            ..Default::default()
        };

        dispatch(&entity, &launcher, &config).unwrap();

        assert_eq!(
            *launcher.launches.borrow(),
            vec![Launch::Hidden("msiexec.exe".into(), vec!["/x".into(), PRODUCT.into()])]
        );
    }

    #[test]
    fn falls_back_to_uninstall_command() {
        let entity = InstalledEntity::new("Notepad++".into(), r#""C:\Program Files\Notepad++\uninstall.exe""#.into());
        let launcher = RecordingLauncher::default();

        let outcome = dispatch(&entity, &launcher, &UninstallConfig::default()).unwrap();

        assert_eq!(outcome, DispatchOutcome::CommandStarted);
        assert_eq!(
            *launcher.launches.borrow(),
            vec![Launch::Started(r#""C:\Program Files\Notepad++\uninstall.exe""#.into())]
        );
    }

    #[test]
    fn reports_missing_mechanism() {
        let entity = InstalledEntity::new("Ghost".into(), String::new());
        let launcher = RecordingLauncher::default();

        let outcome = dispatch(&entity, &launcher, &UninstallConfig::default()).unwrap();

        assert_eq!(outcome, DispatchOutcome::NoMechanism);
        assert!(launcher.launches.borrow().is_empty());
    }

    #[cfg(windows)]
    #[test]
    fn shell_command_wraps_quoted_line_for_cmd() {
        let line = r#""C:\Program Files (x86)\Foo\uninst.exe" /S /LOG="C:\a b\x.log""#;
        let command = shell_command(line);

        assert_eq!(command.get_program(), "cmd");
        let expected = format!("/S /C \"{line}\"");
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, vec![expected.as_str()]);
    }

    #[cfg(unix)]
    #[test]
    fn shell_command_hands_line_to_sh() {
        let line = r#""/opt/Foo (x86)/uninst" --quiet"#;
        let command = shell_command(line);

        assert_eq!(command.get_program(), "sh");
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, vec!["-c", line]);
    }

    #[cfg(unix)]
    #[test]
    fn system_launcher_reports_missing_program() {
        let err = SystemLauncher
            .run_hidden("/nonexistent/uninstaller", &[])
            .unwrap_err();
        assert!(matches!(err, DispatchError::Spawn { .. }));
    }
}
