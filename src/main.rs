use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::{NaiveDate, Utc};
use clap::{ArgGroup, Parser, Subcommand};
use tracing::debug;

mod aggregate;
mod classify;
mod config;
mod error;
mod filter;
mod import;
mod models;
mod notes;
mod report;
mod store;

use config::AppConfig;
use models::{AttendanceRecord, FilterCriteria, MenteeStatus, Priority};
use report::ReportWeek;

#[derive(Parser)]
#[command(name = "mentee-tracker")]
#[command(about = "Mentee attendance tracker for mentorship programs", long_about = None)]
struct Cli {
    /// Roster CSV (id,name,email,phone,attendance,last_attendance,status,current_week)
    #[arg(long, env = "MENTEE_DATA", global = true)]
    data: Option<PathBuf>,
    /// Check-in notes JSON file
    #[arg(long, env = "MENTEE_NOTES", global = true)]
    notes: Option<PathBuf>,
    #[arg(long, env = "MENTEE_LOG", default_value = "info", global = true)]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List mentees, optionally filtered
    List {
        /// P0, P1, P2, P3 or None
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        status: Option<MenteeStatus>,
        /// Case-insensitive match on name or email
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show counts by priority and status
    Summary {
        #[arg(long)]
        json: bool,
    },
    /// Attendance rate for a week of the tracking window
    Rate {
        /// One-based week number
        #[arg(long)]
        week: usize,
    },
    /// Read and write check-in notes
    Notes {
        #[command(subcommand)]
        action: NoteCommand,
    },
    /// Change a mentee's follow-up status
    SetStatus {
        #[arg(long)]
        mentee: String,
        #[arg(long)]
        status: MenteeStatus,
    },
    /// Record attendance for one week
    Mark {
        #[arg(long)]
        mentee: String,
        /// One-based week number
        #[arg(long)]
        week: usize,
        #[arg(long)]
        absent: bool,
        /// Session date, used as last attendance when present
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Preview a CSV import without loading it
    Preview {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Replace the roster with the contents of a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Write the roster to a CSV file
    Export {
        #[arg(long)]
        out: PathBuf,
    },
    /// Generate a weekly markdown summary
    Report {
        /// current, or week1..week4
        #[arg(long, default_value = "current")]
        week: ReportWeek,
        /// Include notes logged within this many days
        #[arg(long, default_value_t = 7)]
        since_days: i64,
        #[arg(long, default_value = "weekly-summary.md")]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum NoteCommand {
    /// Show a mentee's notes, most recent first
    List {
        #[arg(long)]
        mentee: String,
    },
    /// Add a note, either free text or a numbered template
    #[command(group(
        ArgGroup::new("content")
            .args(["text", "template"])
            .required(true)
            .multiple(false)
    ))]
    Add {
        #[arg(long)]
        mentee: String,
        #[arg(long)]
        text: Option<String>,
        /// Template number from `notes templates`
        #[arg(long)]
        template: Option<usize>,
        #[arg(long, env = "MENTEE_EXECUTIVE")]
        author: String,
    },
    /// Replace the text of a note
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        text: String,
    },
    /// List quick-note templates
    Templates,
    /// Copy notes into an archive file
    Archive {
        #[arg(long)]
        out: PathBuf,
        /// Only archive notes logged within this many days
        #[arg(long)]
        since_days: Option<i64>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig {
        data: cli.data,
        notes: cli.notes,
        log_level: cli.log_level,
    };
    config.init_logging();
    debug!(?config, "mentee-tracker starting");

    let mut store = config.load_store()?;

    match cli.command {
        Commands::List {
            priority,
            status,
            search,
            json,
        } => {
            let criteria = FilterCriteria {
                priority,
                status,
                search_term: search,
            };
            let visible = filter::filter(store.records(), &criteria);

            if json {
                println!("{}", serde_json::to_string_pretty(&visible)?);
            } else if visible.is_empty() {
                println!("No mentees match the current filters.");
            } else {
                for record in visible {
                    print_record(record);
                }
            }
        }
        Commands::Summary { json } => {
            if store.is_empty() {
                println!("No mentees loaded.");
                return Ok(());
            }
            let records = store.records();
            let priorities = aggregate::priority_distribution(records);
            let statuses = aggregate::status_distribution(records);
            let rates = aggregate::weekly_rates(records);

            if json {
                let summary = serde_json::json!({
                    "total": records.len(),
                    "priorities": priorities,
                    "statuses": statuses,
                    "weekly_rates": rates,
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{} mentees tracked.", records.len());
                println!("By priority:");
                for entry in priorities {
                    println!("- {}: {}", entry.priority, entry.count);
                }
                println!("By status:");
                for entry in statuses {
                    println!("- {}: {}", entry.status, entry.count);
                }
                println!("Attendance by week:");
                for entry in rates {
                    println!("- Week {}: {}%", entry.week_index + 1, entry.rate);
                }
            }
        }
        Commands::Rate { week } => {
            let rate = week
                .checked_sub(1)
                .map_or(0, |index| aggregate::attendance_rate(store.records(), index));
            println!("Week {week} attendance: {rate}%");
        }
        Commands::Notes { action } => {
            let repo = config.load_notes()?;
            match action {
                NoteCommand::List { mentee } => {
                    let notes = repo.list_notes(&mentee);
                    if notes.is_empty() {
                        println!("No notes yet for mentee {mentee}.");
                    }
                    for note in notes {
                        let edited = if note.edited_at.is_some() { " (edited)" } else { "" };
                        println!(
                            "[{}] {} by {}{}: {}",
                            note.id,
                            note.timestamp.format("%Y-%m-%d %H:%M"),
                            note.executive_name,
                            edited,
                            note.note
                        );
                    }
                }
                NoteCommand::Add {
                    mentee,
                    text,
                    template,
                    author,
                } => {
                    if store.get(&mentee).is_none() {
                        bail!("mentee {mentee} not found");
                    }
                    let text = match (text, template) {
                        (Some(text), _) => text,
                        (None, Some(number)) => notes::NOTE_TEMPLATES
                            .get(number.wrapping_sub(1))
                            .map(|t| t.to_string())
                            .with_context(|| {
                                format!(
                                    "template {number} does not exist (1-{})",
                                    notes::NOTE_TEMPLATES.len()
                                )
                            })?,
                        (None, None) => bail!("either --text or --template is required"),
                    };
                    let note = repo.add_note(&mentee, &text, &author)?;
                    config.save_notes(&repo.all_notes())?;
                    println!("Added note {} for mentee {}.", note.id, note.mentee_id);
                }
                NoteCommand::Update { id, text } => {
                    let note = repo.update_note(&id, &text)?;
                    config.save_notes(&repo.all_notes())?;
                    println!("Updated note {}.", note.id);
                }
                NoteCommand::Templates => {
                    for (index, template) in notes::NOTE_TEMPLATES.iter().enumerate() {
                        println!("{}. {}", index + 1, template);
                    }
                }
                NoteCommand::Archive { out, since_days } => {
                    let since = since_days.map(report::cutoff).transpose()?;
                    let archived = import::archive_notes(&repo, &out, since)?;
                    println!("Archived {archived} notes to {}.", out.display());
                }
            }
        }
        Commands::SetStatus { mentee, status } => {
            let record = store.set_status(&mentee, status)?;
            println!("{} is now {}.", record.name, record.status);
            config.save_store(store.records())?;
        }
        Commands::Mark {
            mentee,
            week,
            absent,
            date,
        } => {
            let index = week
                .checked_sub(1)
                .context("weeks are numbered from 1")?;
            let record = store.mark_week(&mentee, index, !absent, date)?;
            println!(
                "{} has missed {} classes (priority {}).",
                record.name,
                record.missed_classes(),
                record.priority()
            );
            config.save_store(store.records())?;
        }
        Commands::Preview { csv, json } => {
            let preview = import::preview(&csv)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&preview)?);
                return Ok(());
            }
            println!(
                "{} mentees would be imported from {}:",
                preview.records.len(),
                csv.display()
            );
            for record in &preview.records {
                print_record(record);
            }
            for entry in &preview.priorities {
                println!("- {}: {}", entry.priority, entry.count);
            }
        }
        Commands::Import { csv } => {
            let imported = import::confirm_import(&mut store, &csv)?;
            config.save_store(store.records())?;
            println!("Imported {imported} mentees from {}.", csv.display());
        }
        Commands::Export { out } => {
            import::write_records(&out, store.records())?;
            println!("Exported {} mentees to {}.", store.len(), out.display());
        }
        Commands::Report {
            week,
            since_days,
            out,
        } => {
            let repo = config.load_notes()?;
            let recent = repo.notes_since(report::cutoff(since_days)?);
            let report = report::build_report(
                store.records(),
                &recent,
                week,
                Utc::now().date_naive(),
            );
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn print_record(record: &AttendanceRecord) {
    let last_seen = record
        .last_attendance
        .map_or_else(|| "never".to_string(), |d| d.to_string());
    println!(
        "- [{}] {} <{}> {} | missed {} | {} | last attended {}",
        record.id,
        record.name,
        record.email,
        record.priority(),
        record.missed_classes(),
        record.status,
        last_seen
    );
}
