use crate::config::UninstallConfig;
use crate::executor::{dispatch, DispatchOutcome, Launcher};
use crate::matcher::{candidates, rank, Matcher};
use crate::model::{InstalledEntity, Inventory};
use crate::query::SearchTerm;
use anyhow::Result;
use std::io::{BufRead, Write};

pub const USAGE: &str = "Usage: bye [program-name]\nEx: bye chrome";

/// The operator-facing conversation: one query, at most one removal.
pub struct Shell<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn print_usage(&mut self) -> Result<()> {
        writeln!(self.output, "{}", USAGE)?;
        Ok(())
    }

    /// Prints the whole inventory sorted by name.
    pub fn list(&mut self, inventory: &Inventory) -> Result<()> {
        for (i, entity) in inventory.sorted_by_name().into_iter().enumerate() {
            let mut line = format!("[{}] {}", i, entity.display_name);
            if !entity.version.is_empty() {
                line.push(' ');
                line.push_str(&entity.version);
            }
            if entity.is_update && !entity.parent_display_name.is_empty() {
                line.push_str(&format!(" (update to {})", entity.parent_display_name));
            }
            writeln!(self.output, "{}", line)?;
        }
        Ok(())
    }

    pub fn run(
        &mut self,
        inventory: &Inventory,
        term: &SearchTerm,
        matcher: &impl Matcher,
        launcher: &impl Launcher,
        config: &UninstallConfig,
    ) -> Result<()> {
        let found = candidates(matcher, inventory, term);

        match found.as_slice() {
            [] => writeln!(self.output, "Nothing found. Bye.")?,
            [only] => {
                writeln!(self.output, "Uninstall {}?", only.display_name)?;
                if self.read_line()?.contains('y') {
                    self.uninstall(only, launcher, config)?;
                }
            }
            _ => {
                let ranked = rank(&found, term);
                writeln!(self.output, "Which?")?;
                for (i, candidate) in ranked.iter().enumerate() {
                    writeln!(self.output, "[{}] {}", i, candidate.entity.display_name)?;
                }

                let reply = self.read_line()?;
                match reply.trim().parse::<i64>() {
                    Ok(index) => match usize::try_from(index).ok().and_then(|i| ranked.get(i)) {
                        Some(choice) => self.uninstall(choice.entity, launcher, config)?,
                        None => writeln!(self.output, "There is no [{}].", index)?,
                    },
                    Err(_) => writeln!(self.output, "Write a number next time, please!")?,
                }
            }
        }
        Ok(())
    }

    fn uninstall(
        &mut self,
        entity: &InstalledEntity,
        launcher: &impl Launcher,
        config: &UninstallConfig,
    ) -> Result<()> {
        match dispatch(entity, launcher, config) {
            Ok(DispatchOutcome::ProductRemoved | DispatchOutcome::CommandStarted) => {
                writeln!(self.output, "..bye")?
            }
            Ok(DispatchOutcome::NoMechanism) => writeln!(
                self.output,
                "I'm sorry, I couldn't figure out how to uninstall it"
            )?,
            Err(e) => writeln!(self.output, "Could not start the uninstaller: {}", e)?,
        }
        Ok(())
    }

    fn read_line(&mut self) -> Result<String> {
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line)
    }
}
