use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use jobdesk::config::{Config, StorageKind};
use jobdesk::error::StoreError;
use jobdesk::folder::{LocalFolder, PresetPicker};
use jobdesk::jobs::JobStore;
use jobdesk::models::{Job, JobStatus, JobUpdate, NewResume, Resume, ResumeUpdate, TagColor};
use jobdesk::resumes::ResumeStore;
use jobdesk::review::{preselected, ImportPlan};
use jobdesk::storage::{self, Backend};

#[derive(Parser)]
#[command(name = "jobdesk")]
#[command(about = "Track job applications and the resumes you send with them")]
struct Cli {
    /// Directory holding jobs.json and resumes.json
    #[arg(long, global = true, env = "JOBDESK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Where documents are kept
    #[arg(long, global = true, value_enum, default_value = "file", env = "JOBDESK_STORAGE")]
    storage: StorageKind,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage job postings
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },

    /// Choose or inspect the resume folder
    Folder {
        #[command(subcommand)]
        command: FolderCommands,
    },

    /// Manage resumes in the selected folder
    Resume {
        #[command(subcommand)]
        command: ResumeCommands,
    },

    /// Manage resume tags
    Tag {
        #[command(subcommand)]
        command: TagCommands,
    },
}

#[derive(Subcommand)]
enum JobCommands {
    /// Add a job posting
    Add {
        /// Job title
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,

        #[arg(short, long, default_value = "")]
        url: String,

        /// applying, applied, interviewing, rejected, ghosted
        #[arg(short, long, default_value = "applying")]
        status: JobStatus,

        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// List jobs
    List {
        /// Filter by status
        #[arg(short, long)]
        status: Option<JobStatus>,
    },

    /// Show job details
    Show {
        /// Job ID or unique prefix
        id: String,
    },

    /// Change fields of a job
    Update {
        /// Job ID or unique prefix
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        url: Option<String>,

        #[arg(short, long)]
        status: Option<JobStatus>,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Delete a job
    Delete {
        /// Job ID or unique prefix
        id: String,
    },

    /// Counts per status
    Stats,
}

#[derive(Subcommand)]
enum FolderCommands {
    /// Select the resume folder (forgets all tracked resumes, keeps tags)
    Select {
        path: PathBuf,
    },

    /// Forget the folder and its resumes; files on disk are left alone
    Clear,

    /// Show the selected folder
    Show,

    /// Check that the selected folder is still reachable
    Validate,
}

#[derive(Subcommand)]
enum ResumeCommands {
    /// List resume files in the folder and whether they are tracked
    Scan,

    /// Review detected files: track the chosen ones, untrack excluded ones
    Import {
        /// File names to track
        files: Vec<String>,

        /// Track every detected file
        #[arg(long)]
        all: bool,

        /// File names to stop tracking
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// List tracked resumes
    List {
        /// Only resumes with this tag (ID, prefix, or name)
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Track one file that is already in the folder
    Add {
        /// File name inside the folder
        file: String,

        #[arg(short, long)]
        title: Option<String>,

        /// Tag ID, prefix, or name
        #[arg(long)]
        tag: Option<String>,
    },

    /// Copy a file into the folder and track it
    Upload {
        source: PathBuf,

        #[arg(short, long)]
        title: Option<String>,

        /// Tag ID, prefix, or name
        #[arg(long)]
        tag: Option<String>,
    },

    /// Open a resume in the default application for its file type
    Open {
        /// Resume ID or unique prefix
        id: String,
    },

    /// Rename or retag a resume
    Update {
        /// Resume ID or unique prefix
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        /// Tag ID, prefix, or name
        #[arg(long, conflicts_with = "untag")]
        tag: Option<String>,

        /// Remove the tag
        #[arg(long)]
        untag: bool,
    },

    /// Stop tracking resumes (files are kept)
    Delete {
        /// Resume IDs or unique prefixes
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Drop resumes whose files are gone
    Cleanup {
        /// Also collapse records pointing at the same file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum TagCommands {
    /// Add a tag
    Add {
        name: String,

        /// Palette color name or hex code; defaults to the first unused color
        #[arg(short, long)]
        color: Option<TagColor>,
    },

    /// List tags
    List,

    /// Delete a tag and clear it from every resume
    Delete {
        /// Tag ID, prefix, or name
        id: String,
    },

    /// Show palette colors not used by any tag
    Colors,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {:#}", err);
        if let Some(store_err) = err.downcast_ref::<StoreError>() {
            if store_err.needs_folder_reselection() {
                eprintln!("Select a resume folder with 'jobdesk folder select <path>'.");
            }
        }
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::new(cli.data_dir, cli.storage);
    let backend = storage::open_backend(&config);

    match cli.command {
        Commands::Job { command } => {
            let mut store = JobStore::open(backend);
            if let Some(err) = store.error() {
                return Err(anyhow!("{}", err)).context("Failed to load jobs");
            }
            run_job(&mut store, command)
        }

        Commands::Folder { command } => {
            let mut store = open_resumes(backend);
            run_folder(&mut store, command)
        }

        Commands::Resume { command } => {
            let mut store = open_resumes(backend);
            run_resume(&mut store, command)
        }

        Commands::Tag { command } => {
            let mut store = open_resumes(backend);
            run_tag(&mut store, command)
        }
    }
}

fn open_resumes(backend: Arc<dyn Backend>) -> ResumeStore {
    let store = ResumeStore::open(backend, Arc::new(LocalFolder));
    if let Some(err) = store.error() {
        eprintln!("Warning: {}", err);
    }
    store
}

fn run_job(store: &mut JobStore, command: JobCommands) -> Result<()> {
    match command {
        JobCommands::Add {
            title,
            description,
            url,
            status,
            notes,
        } => {
            let job = Job::new(&title, &description, &url, status, &notes)?;
            let id = job.id.clone();
            store.add(job)?;
            println!("Added job {}", id);
        }

        JobCommands::List { status } => {
            let jobs: Vec<&Job> = store
                .list()
                .iter()
                .filter(|job| status.is_none_or(|s| job.status == s))
                .collect();
            if jobs.is_empty() {
                println!("No jobs found.");
            } else {
                println!("{:<10} {:<13} {:<36} {:<20}", "ID", "STATUS", "TITLE", "UPDATED");
                println!("{}", "-".repeat(82));
                for job in jobs {
                    println!(
                        "{:<10} {:<13} {:<36} {:<20}",
                        short_id(&job.id),
                        job.status,
                        truncate(&job.title, 34),
                        job.updated_at.format("%Y-%m-%d %H:%M")
                    );
                }
            }
        }

        JobCommands::Show { id } => {
            let id = resolve_id(store.list().iter().map(|j| j.id.as_str()), &id, "job")?;
            let job = store.get(&id).ok_or_else(|| anyhow!("Job {} not found", id))?;
            println!("Job {}", job.id);
            println!("Title: {}", job.title);
            println!("Status: {}", job.status);
            if !job.url.is_empty() {
                println!("URL: {}", job.url);
            }
            println!("Created: {}", job.created_at.to_rfc3339());
            println!("Updated: {}", job.updated_at.to_rfc3339());
            if !job.description.is_empty() {
                println!("\n--- Description ---\n{}", job.description);
            }
            if !job.notes.is_empty() {
                println!("\n--- Notes ---\n{}", job.notes);
            }
        }

        JobCommands::Update {
            id,
            title,
            description,
            url,
            status,
            notes,
        } => {
            let id = resolve_id(store.list().iter().map(|j| j.id.as_str()), &id, "job")?;
            let changes = JobUpdate {
                title,
                description,
                url,
                status,
                notes,
            };
            if changes.is_empty() {
                println!("Nothing to update.");
                return Ok(());
            }
            let job = store.update(&id, &changes)?;
            println!("Updated job {} ({})", short_id(&job.id), job.status);
        }

        JobCommands::Delete { id } => {
            let id = resolve_id(store.list().iter().map(|j| j.id.as_str()), &id, "job")?;
            let job = store.delete(&id)?;
            println!("Deleted job '{}'", job.title);
        }

        JobCommands::Stats => {
            let stats = store.stats();
            println!("Total: {}", stats.total);
            for status in JobStatus::ALL {
                println!("  {:<13} {}", status.as_str(), stats.count(status));
            }
        }
    }
    Ok(())
}

fn run_folder(store: &mut ResumeStore, command: FolderCommands) -> Result<()> {
    match command {
        FolderCommands::Select { path } => {
            let path = std::fs::canonicalize(&path)
                .with_context(|| format!("Cannot resolve {}", path.display()))?;
            store.validate_folder(&path.to_string_lossy())?;
            let mut picker = PresetPicker::choose(path);
            match store.select_folder(&mut picker)? {
                Some(folder) => {
                    println!("Resume folder set to {}", folder);
                    println!("Run 'jobdesk resume scan' to see detected files.");
                }
                None => println!("No folder selected."),
            }
        }

        FolderCommands::Clear => {
            store.clear_folder()?;
            println!("Resume folder cleared. Tags were kept; files on disk were not touched.");
        }

        FolderCommands::Show => match store.selected_folder() {
            Some(folder) => println!("{} ({} tracked resumes)", folder, store.resumes().len()),
            None => println!("No resume folder selected."),
        },

        FolderCommands::Validate => {
            let folder = selected_folder(store)?;
            store.validate_folder(&folder)?;
            println!("{} is accessible.", folder);
        }
    }
    Ok(())
}

fn run_resume(store: &mut ResumeStore, command: ResumeCommands) -> Result<()> {
    match command {
        ResumeCommands::Scan => {
            let folder = selected_folder(store)?;
            let files = store.scan_folder(&folder)?;
            if files.is_empty() {
                println!("No resume files found. Supported formats: pdf, docx, doc, txt");
                return Ok(());
            }
            let tracked = preselected(&files, store.resumes());
            println!("{:<8} {:<5} {:>10}  {:<40}", "TRACKED", "TYPE", "SIZE", "FILE");
            println!("{}", "-".repeat(66));
            for file in &files {
                println!(
                    "{:<8} {:<5} {:>10}  {:<40}",
                    if tracked.contains(&file.file_path) { "yes" } else { "" },
                    file.file_type,
                    format_size(file.size),
                    truncate(&file.file_name, 40)
                );
            }
            println!("\n{} of {} files tracked", tracked.len(), files.len());
        }

        ResumeCommands::Import {
            files: names,
            all,
            exclude,
        } => {
            let folder = selected_folder(store)?;
            let detected = store.scan_folder(&folder)?;

            let mut chosen = preselected(&detected, store.resumes());
            for file in &detected {
                if all || names.contains(&file.file_name) {
                    chosen.insert(file.file_path.clone());
                }
                if exclude.contains(&file.file_name) {
                    chosen.remove(&file.file_path);
                }
            }
            let known: HashSet<&str> = detected.iter().map(|f| f.file_name.as_str()).collect();
            for name in names.iter().chain(exclude.iter()) {
                if !known.contains(name.as_str()) {
                    eprintln!("Warning: '{}' was not found in {}", name, folder);
                }
            }

            let plan = ImportPlan::build(&detected, store.resumes(), &chosen);
            if plan.is_empty() {
                println!("Nothing to change.");
                return Ok(());
            }
            let outcome = store.apply_import(&plan)?;
            println!(
                "Tracked {} new resume(s), untracked {}.",
                outcome.added.len(),
                outcome.removed.len()
            );
        }

        ResumeCommands::List { tag } => {
            let tag_id = match tag {
                Some(tag) => Some(resolve_tag(store, &tag)?),
                None => None,
            };
            let resumes: Vec<_> = store
                .resumes()
                .iter()
                .filter(|r| tag_id.is_none() || r.tag_id == tag_id)
                .collect();
            if resumes.is_empty() {
                println!("No resumes found.");
            } else {
                println!("{:<10} {:<5} {:<28} {:<16} {:<30}", "ID", "TYPE", "TITLE", "TAG", "FILE");
                println!("{}", "-".repeat(92));
                for resume in resumes {
                    let tag = resume
                        .tag_id
                        .as_deref()
                        .and_then(|id| store.tag(id))
                        .map(|t| t.name.as_str())
                        .unwrap_or("");
                    println!(
                        "{:<10} {:<5} {:<28} {:<16} {:<30}",
                        short_id(&resume.id),
                        resume.file_type,
                        truncate(&resume.title, 26),
                        truncate(tag, 14),
                        truncate(&resume.file_name, 30)
                    );
                }
            }
        }

        ResumeCommands::Add { file, title, tag } => {
            let folder = selected_folder(store)?;
            let detected = store.scan_folder(&folder)?;
            let found = detected
                .iter()
                .find(|f| f.file_name == file || f.file_path == file)
                .ok_or_else(|| anyhow!("'{}' is not a resume file in {}", file, folder))?;
            if store.resumes().iter().any(|r| r.file_path == found.file_path) {
                return Err(anyhow!("'{}' is already tracked", found.file_name));
            }
            let new = with_overrides(store, found.to_new_resume(), title, tag)?;
            let resume = store.add_resume(new)?;
            println!("Tracking '{}' ({})", resume.title, short_id(&resume.id));
        }

        ResumeCommands::Upload { source, title, tag } => {
            let resume = upload_resume(store, &source, title, tag)?;
            println!("Copied to {} and tracking '{}'", resume.file_path, resume.title);
        }

        ResumeCommands::Open { id } => {
            let id = resolve_id(store.resumes().iter().map(|r| r.id.as_str()), &id, "resume")?;
            let resume = store
                .resume(&id)
                .ok_or_else(|| StoreError::not_found("resume", &id))?;
            LocalFolder.open_file(Path::new(&resume.file_path))?;
            println!("Opened {}", resume.file_name);
        }

        ResumeCommands::Update {
            id,
            title,
            tag,
            untag,
        } => {
            let id = resolve_id(store.resumes().iter().map(|r| r.id.as_str()), &id, "resume")?;
            let tag_id = match (tag, untag) {
                (Some(tag), _) => Some(Some(resolve_tag(store, &tag)?)),
                (None, true) => Some(None),
                (None, false) => None,
            };
            if title.is_none() && tag_id.is_none() {
                println!("Nothing to update.");
                return Ok(());
            }
            let resume = store.update_resume(&id, &ResumeUpdate { title, tag_id })?;
            println!("Updated '{}'", resume.title);
        }

        ResumeCommands::Delete { ids } => {
            let ids = ids
                .iter()
                .map(|id| resolve_id(store.resumes().iter().map(|r| r.id.as_str()), id, "resume"))
                .collect::<Result<Vec<_>>>()?;
            let removed = store.delete_multiple_resumes(&ids)?;
            println!("Stopped tracking {} resume(s). Files were not deleted.", removed.len());
        }

        ResumeCommands::Cleanup { force } => {
            if force {
                let report = store.force_cleanup()?;
                println!(
                    "Removed {} orphaned and {} duplicate record(s).",
                    report.orphaned.len(),
                    report.duplicates.len()
                );
            } else {
                let orphaned = store.check_for_orphaned_resumes()?;
                for resume in &orphaned {
                    println!("  missing: {}", resume.file_name);
                }
                println!("Removed {} orphaned record(s).", orphaned.len());
            }
        }
    }
    Ok(())
}

fn run_tag(store: &mut ResumeStore, command: TagCommands) -> Result<()> {
    match command {
        TagCommands::Add { name, color } => {
            let color = match color {
                Some(color) => color,
                None => store
                    .available_colors()
                    .first()
                    .copied()
                    .unwrap_or(TagColor::Gray),
            };
            let tag = store.add_tag(&name, color)?;
            println!("Added tag '{}' {} ({})", tag.name, tag.color, short_id(&tag.id));
        }

        TagCommands::List => {
            if store.tags().is_empty() {
                println!("No tags.");
            } else {
                println!("{:<10} {:<20} {:<18} {:>7}", "ID", "NAME", "COLOR", "RESUMES");
                println!("{}", "-".repeat(58));
                for tag in store.tags() {
                    let used = store
                        .resumes()
                        .iter()
                        .filter(|r| r.tag_id.as_deref() == Some(tag.id.as_str()))
                        .count();
                    println!(
                        "{:<10} {:<20} {:<18} {:>7}",
                        short_id(&tag.id),
                        truncate(&tag.name, 18),
                        tag.color.to_string(),
                        used
                    );
                }
            }
        }

        TagCommands::Delete { id } => {
            let id = resolve_tag(store, &id)?;
            let tag = store.delete_tag(&id)?;
            println!("Deleted tag '{}'", tag.name);
        }

        TagCommands::Colors => {
            let colors = store.available_colors();
            if colors.is_empty() {
                println!("Every palette color is in use.");
            }
            for color in colors {
                println!("{}", color);
            }
        }
    }
    Ok(())
}

/// Copies `source` into the folder and tracks it. The copy is removed again
/// if tracking fails, so a retry does not trip over it.
fn upload_resume(
    store: &mut ResumeStore,
    source: &Path,
    title: Option<String>,
    tag: Option<String>,
) -> Result<Resume> {
    let folder = selected_folder(store)?;
    let tag_id = match tag {
        Some(tag) => Some(resolve_tag(store, &tag)?),
        None => None,
    };

    let copied = LocalFolder.copy_into_folder(source, Path::new(&folder))?;
    let mut new = copied.to_new_resume();
    if let Some(title) = title {
        new.title = title;
    }
    new.tag_id = tag_id;

    match store.add_resume(new) {
        Ok(resume) => Ok(resume),
        Err(err) => {
            LocalFolder.discard_copy(&copied);
            Err(err.into())
        }
    }
}

fn selected_folder(store: &ResumeStore) -> Result<String> {
    store
        .selected_folder()
        .map(str::to_string)
        .ok_or_else(|| StoreError::NoFolderSelected.into())
}

fn with_overrides(
    store: &ResumeStore,
    mut new: NewResume,
    title: Option<String>,
    tag: Option<String>,
) -> Result<NewResume> {
    if let Some(title) = title {
        new.title = title;
    }
    if let Some(tag) = tag {
        new.tag_id = Some(resolve_tag(store, &tag)?);
    }
    Ok(new)
}

/// Accepts a tag ID, a unique ID prefix, or an exact (case-insensitive) name.
fn resolve_tag(store: &ResumeStore, needle: &str) -> Result<String> {
    if let Some(tag) = store.tags().iter().find(|t| t.name.eq_ignore_ascii_case(needle)) {
        return Ok(tag.id.clone());
    }
    resolve_id(store.tags().iter().map(|t| t.id.as_str()), needle, "tag")
}

fn resolve_id<'a>(ids: impl Iterator<Item = &'a str>, needle: &str, kind: &str) -> Result<String> {
    let matches: Vec<&str> = ids.filter(|id| id.starts_with(needle)).collect();
    match matches.as_slice() {
        [id] => Ok(id.to_string()),
        [] => Err(anyhow!("No {} matches '{}'", kind, needle)),
        _ if matches.contains(&needle) => Ok(needle.to_string()),
        _ => Err(anyhow!("'{}' matches {} {}s; use more characters", needle, matches.len(), kind)),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobdesk::storage::{FileBackend, MemoryBackend};
    use tempfile::tempdir;

    fn store_with_folder(backend: Arc<dyn Backend>, folder: &Path) -> ResumeStore {
        let mut store = ResumeStore::open(backend, Arc::new(LocalFolder));
        store.select_folder(&mut PresetPicker::choose(folder)).unwrap();
        store
    }

    #[test]
    fn test_upload_with_unknown_tag_copies_nothing() {
        let folder = tempdir().unwrap();
        let downloads = tempdir().unwrap();
        let source = downloads.path().join("cv.pdf");
        std::fs::write(&source, b"%PDF").unwrap();
        let mut store = store_with_folder(Arc::new(MemoryBackend::new()), folder.path());

        let err = upload_resume(&mut store, &source, None, Some("typo".to_string())).unwrap_err();
        assert!(err.to_string().contains("typo"));
        assert!(!folder.path().join("cv.pdf").exists());
        assert!(store.resumes().is_empty());

        let resume = upload_resume(&mut store, &source, None, None).unwrap();
        assert_eq!(resume.file_name, "cv.pdf");
        assert_eq!(store.resumes().len(), 1);
        assert!(folder.path().join("cv.pdf").exists());
    }

    #[test]
    fn test_upload_removes_copy_when_tracking_fails() {
        let data = tempdir().unwrap();
        let data_dir = data.path().join("store");
        let folder = tempdir().unwrap();
        let downloads = tempdir().unwrap();
        let source = downloads.path().join("cv.pdf");
        std::fs::write(&source, b"%PDF").unwrap();
        let mut store = store_with_folder(Arc::new(FileBackend::new(data_dir.clone())), folder.path());

        // A plain file where the data directory was makes every read and write fail.
        std::fs::remove_dir_all(&data_dir).unwrap();
        std::fs::write(&data_dir, b"").unwrap();

        assert!(upload_resume(&mut store, &source, None, None).is_err());
        assert!(!folder.path().join("cv.pdf").exists());
        assert!(source.exists());
    }

    #[test]
    fn test_cli_parses_resume_open() {
        let cli = Cli::try_parse_from(["jobdesk", "resume", "open", "3f2a"]).unwrap();
        match cli.command {
            Commands::Resume {
                command: ResumeCommands::Open { id },
            } => assert_eq!(id, "3f2a"),
            _ => panic!("expected resume open"),
        }
    }

    #[test]
    fn test_resolve_id_by_prefix() {
        let ids = ["abc123", "abd456", "zzz"];
        assert_eq!(resolve_id(ids.into_iter(), "abc", "job").unwrap(), "abc123");
        assert_eq!(resolve_id(ids.into_iter(), "zzz", "job").unwrap(), "zzz");
        assert!(resolve_id(ids.into_iter(), "ab", "job").is_err());
        assert!(resolve_id(ids.into_iter(), "q", "job").is_err());
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Ingénieur logiciel", 10), "Ingénie...");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_cli_parses_job_add() {
        let cli = Cli::try_parse_from([
            "jobdesk", "--storage", "memory", "job", "add", "Platform Engineer", "--status", "applied",
        ])
        .unwrap();
        assert_eq!(cli.storage, StorageKind::Memory);
        match cli.command {
            Commands::Job {
                command: JobCommands::Add { title, status, .. },
            } => {
                assert_eq!(title, "Platform Engineer");
                assert_eq!(status, JobStatus::Applied);
            }
            _ => panic!("expected job add"),
        }
    }

    #[test]
    fn test_cli_parses_tag_color() {
        let cli = Cli::try_parse_from(["jobdesk", "tag", "add", "Backend", "--color", "#10B981"])
            .unwrap();
        match cli.command {
            Commands::Tag {
                command: TagCommands::Add { color, .. },
            } => assert_eq!(color, Some(TagColor::Green)),
            _ => panic!("expected tag add"),
        }
    }
}
