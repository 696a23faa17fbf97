//! Command-line surface and dispatch

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use farmoptima_common::config::{default_config_path, write_toml_config, TomlConfig};
use farmoptima_common::editors::{
    MachineDetails, NewField, NewFieldWork, NewMachine, NewRepair, RepairsEditor, WorkFilter,
};
use farmoptima_common::snapshot::{import_from_path, write_export};
use farmoptima_common::{time, Error, FarmStore};
use tracing::info;

use crate::render;

/// Command-line arguments for farmoptima
#[derive(Parser, Debug)]
#[command(name = "farmoptima")]
#[command(about = "Farm record keeping: fields, machinery, field work and repairs")]
#[command(version)]
pub struct Args {
    /// Folder holding the persisted collections
    #[arg(short, long, global = true)]
    pub data_folder: Option<PathBuf>,

    /// Configuration file (default: <config dir>/farmoptima/config.toml)
    #[arg(short, long, global = true, env = "FARMOPTIMA_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage fields
    #[command(subcommand)]
    Field(FieldCommand),

    /// Manage machinery
    #[command(subcommand)]
    Machine(MachineCommand),

    /// Manage the machine type list
    #[command(subcommand)]
    Types(TypesCommand),

    /// Manage the field operations log
    #[command(subcommand)]
    Work(WorkCommand),

    /// Manage the repair log
    #[command(subcommand)]
    Repair(RepairCommand),

    /// Write every collection to farm-data-<date>.json
    Export {
        /// Destination folder
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Replace collections from a snapshot file
    Import {
        file: PathBuf,
        /// Report what would be replaced without changing stored data
        #[arg(long)]
        dry_run: bool,
    },

    /// Request an efficiency analysis of the fields and fleet
    Analyze,

    /// Record counts and totals
    Summary,

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write the effective configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum FieldCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        acres: f64,
        #[arg(long)]
        crop: Option<String>,
    },
    List,
    Remove {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum MachineCommand {
    Add {
        #[arg(long)]
        manufacturer: String,
        #[arg(long)]
        model: String,
        #[arg(long = "type")]
        machine_type: String,
    },
    List {
        #[arg(long = "type")]
        machine_type: Option<String>,
    },
    /// Edit details; omitted options keep their current value
    Edit(MachineEditArgs),
    Remove {
        id: String,
    },
}

#[derive(ClapArgs, Debug, Default)]
pub struct MachineEditArgs {
    pub id: String,
    #[arg(long)]
    pub manufacturer: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub license_plate: Option<String>,
    #[arg(long)]
    pub horsepower: Option<f64>,
    #[arg(long)]
    pub year: Option<i32>,
    #[arg(long)]
    pub usage: Option<String>,
    #[arg(long)]
    pub fuel_type: Option<String>,
}

impl MachineEditArgs {
    /// Overlay the given options on the machine's current details
    pub fn apply_to(self, mut details: MachineDetails) -> MachineDetails {
        if let Some(manufacturer) = self.manufacturer {
            details.manufacturer = manufacturer;
        }
        if let Some(model) = self.model {
            details.model = model;
        }
        if self.license_plate.is_some() {
            details.license_plate = self.license_plate;
        }
        if self.horsepower.is_some() {
            details.horsepower = self.horsepower;
        }
        if self.year.is_some() {
            details.year = self.year;
        }
        if self.usage.is_some() {
            details.usage = self.usage;
        }
        if self.fuel_type.is_some() {
            details.fuel_type = self.fuel_type;
        }
        details
    }
}

#[derive(Subcommand, Debug)]
pub enum TypesCommand {
    List,
    Add { name: String },
    Remove { name: String },
    /// Move a type one position earlier
    Up { name: String },
    /// Move a type one position later
    Down { name: String },
}

#[derive(Subcommand, Debug)]
pub enum WorkCommand {
    Add {
        #[arg(long)]
        field: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[arg(long)]
        task: String,
        #[arg(long)]
        notes: Option<String>,
    },
    List {
        #[arg(long)]
        field: Option<String>,
        #[arg(long)]
        task: Option<String>,
    },
    /// Distinct task names in the log
    Tasks,
    Remove {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum RepairCommand {
    Add {
        #[arg(long)]
        machine: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        cost: Option<f64>,
        /// YYYY-MM-DD
        #[arg(long)]
        next_due: Option<String>,
    },
    List {
        /// Only repairs due within the next two weeks
        #[arg(long)]
        upcoming: bool,
    },
    Remove {
        id: String,
    },
}

/// Run one command against the store, returning the text to print
///
/// `config_path` is the `--config` override, if any.
pub async fn run(
    command: Command,
    store: &FarmStore,
    config: &TomlConfig,
    config_path: Option<&Path>,
) -> Result<String> {
    match command {
        Command::Field(cmd) => run_field(cmd, store),
        Command::Machine(cmd) => run_machine(cmd, store),
        Command::Types(cmd) => run_types(cmd, store),
        Command::Work(cmd) => run_work(cmd, store),
        Command::Repair(cmd) => run_repair(cmd, store),
        Command::Export { out } => {
            let path = write_export(store, &out)
                .with_context(|| format!("Failed to export to {}", out.display()))?;
            Ok(format!("Exported to {}", path.display()))
        }
        Command::Import { file, dry_run: false } => run_import(&file, store, false),
        Command::Import { file, dry_run: true } => {
            run_import(&file, &FarmStore::in_memory(), true)
        }
        Command::Analyze => run_analyze(store, config).await,
        Command::Summary => Ok(render::summary(store)),
        Command::Config(cmd) => run_config(cmd, config, config_path),
    }
}

fn run_config(cmd: ConfigCommand, config: &TomlConfig, config_path: Option<&Path>) -> Result<String> {
    match cmd {
        ConfigCommand::Init { force } => {
            let path = config_path
                .map(Path::to_path_buf)
                .or_else(default_config_path)
                .context("No config directory on this platform; pass --config")?;

            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }

            write_toml_config(config, &path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Configuration written to {}", path.display());
            Ok(format!("Wrote configuration to {}", path.display()))
        }
    }
}

fn run_field(cmd: FieldCommand, store: &FarmStore) -> Result<String> {
    let editor = store.field_editor();
    match cmd {
        FieldCommand::Add { name, acres, crop } => {
            let field = editor.create(NewField {
                name,
                acres,
                crop_type: crop,
            })?;
            Ok(format!("Added field {} ({})", field.name, field.id))
        }
        FieldCommand::List => Ok(render::fields(&editor.list(), editor.total_acres())),
        FieldCommand::Remove { id } => removed(editor.delete(&id), "field", &id),
    }
}

fn run_machine(cmd: MachineCommand, store: &FarmStore) -> Result<String> {
    let editor = store.machine_editor();
    match cmd {
        MachineCommand::Add {
            manufacturer,
            model,
            machine_type,
        } => {
            let machine = editor.create(NewMachine {
                manufacturer,
                model,
                machine_type,
            })?;
            Ok(format!("Added machine {} ({})", machine.name, machine.id))
        }
        MachineCommand::List { machine_type } => {
            let machines = match machine_type {
                Some(t) => editor.by_type(&t),
                None => editor.list(),
            };
            Ok(render::machines(&machines))
        }
        MachineCommand::Edit(args) => {
            let current = editor
                .get(&args.id)
                .ok_or_else(|| Error::NotFound(format!("Machine {}", args.id)))?;
            let id = args.id.clone();
            let details = args.apply_to(MachineDetails::from(&current));
            let machine = editor.update_details(&id, details)?;
            Ok(format!("Updated machine {} ({})", machine.name, machine.id))
        }
        MachineCommand::Remove { id } => removed(editor.delete(&id), "machine", &id),
    }
}

fn run_types(cmd: TypesCommand, store: &FarmStore) -> Result<String> {
    let editor = store.machine_type_editor();
    let position = |name: &str| {
        editor
            .position(name)
            .ok_or_else(|| Error::NotFound(format!("Machine type '{}'", name)))
    };

    let message = match cmd {
        TypesCommand::List => return Ok(render::machine_types(&editor.list())),
        TypesCommand::Add { name } => {
            if editor.add(&name) {
                format!("Added machine type '{}'", name.trim())
            } else {
                format!("Machine type '{}' not added (blank or already listed)", name.trim())
            }
        }
        TypesCommand::Remove { name } => {
            if !editor.remove(&name) {
                bail!("Machine type '{}' is not listed", name);
            }
            format!("Removed machine type '{}'", name)
        }
        TypesCommand::Up { name } => {
            editor.move_up(position(&name)?);
            render::machine_types(&editor.list())
        }
        TypesCommand::Down { name } => {
            editor.move_down(position(&name)?);
            render::machine_types(&editor.list())
        }
    };
    Ok(message)
}

fn run_work(cmd: WorkCommand, store: &FarmStore) -> Result<String> {
    let editor = store.work_editor();
    match cmd {
        WorkCommand::Add {
            field,
            date,
            task,
            notes,
        } => {
            let work = editor.create(NewFieldWork {
                field_id: field,
                date,
                task,
                notes,
            })?;
            Ok(format!(
                "Logged {} on {} ({})",
                work.task,
                editor.field_label(&work),
                work.id
            ))
        }
        WorkCommand::List { field, task } => {
            let filter = WorkFilter {
                field_id: field,
                task,
            };
            let works = editor.filter(&filter);
            let rows: Vec<_> = works
                .iter()
                .map(|w| (w.clone(), editor.field_label(w)))
                .collect();
            Ok(render::works(&rows, filter.is_empty()))
        }
        WorkCommand::Tasks => {
            let tasks = editor.unique_tasks();
            if tasks.is_empty() {
                return Ok("No field work logged yet.".to_string());
            }
            Ok(tasks.join("\n"))
        }
        WorkCommand::Remove { id } => removed(editor.delete(&id), "field work", &id),
    }
}

fn run_repair(cmd: RepairCommand, store: &FarmStore) -> Result<String> {
    let editor = store.repair_editor();
    match cmd {
        RepairCommand::Add {
            machine,
            date,
            description,
            cost,
            next_due,
        } => {
            let repair = editor.create(NewRepair {
                machine_id: machine,
                date,
                description,
                cost,
                next_due_date: next_due,
            })?;
            Ok(format!(
                "Logged repair for {} ({})",
                editor.machine_label(&repair),
                repair.id
            ))
        }
        RepairCommand::List { upcoming } => {
            let today = time::today();
            let repairs = if upcoming {
                editor.upcoming(today)
            } else {
                editor.list()
            };
            let rows: Vec<_> = repairs
                .iter()
                .map(|r| {
                    (
                        r.clone(),
                        editor.machine_label(r),
                        RepairsEditor::is_upcoming(r, today),
                    )
                })
                .collect();
            Ok(render::repairs(&rows, editor.total_cost()))
        }
        RepairCommand::Remove { id } => removed(editor.delete(&id), "repair", &id),
    }
}

/// A dry run imports into a scratch store, so the real one is never touched
fn run_import(file: &Path, store: &FarmStore, dry_run: bool) -> Result<String> {
    let report = import_from_path(store, file)
        .with_context(|| format!("Failed to import {}", file.display()))?;

    let replaced: Vec<String> = report.replaced.iter().map(|k| k.to_string()).collect();
    let verb = if dry_run { "Would import" } else { "Imported" };
    let mut message = format!("{}: {}", verb, replaced.join(", "));
    if !report.skipped.is_empty() {
        let skipped: Vec<String> = report.skipped.iter().map(|k| k.to_string()).collect();
        message.push_str(&format!("\nSkipped (missing or invalid): {}", skipped.join(", ")));
    }
    Ok(message)
}

async fn run_analyze(store: &FarmStore, config: &TomlConfig) -> Result<String> {
    let outcome = match farmoptima_ai::client_from_config(&config.analysis) {
        Ok(client) => farmoptima_ai::analyze_store(&client, store).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(analysis) => Ok(render::analysis(&analysis)),
        Err(e) => {
            info!("Analysis unavailable: {}", e);
            bail!("{}", e.user_message())
        }
    }
}

fn removed(found: bool, what: &str, id: &str) -> Result<String> {
    if !found {
        return Err(Error::NotFound(format!("No {} with id {}", what, id)).into());
    }
    Ok(format!("Removed {} {}", what, id))
}
