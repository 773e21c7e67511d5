//! CLI route: single route table and run context. Dispatches to views, the
//! repository and presentation.

use crate::cli::parse::{Commands, ExamCommands, ItemCommands};
use crate::cli::presentation::{
    format_exam_detail_json, format_exam_detail_text, format_exam_list_json,
    format_exam_list_text, format_item_types_text, format_items_text, format_notices,
    format_status_json, format_status_text, StatusReport,
};
use crate::config::{ConfigLoader, ExamwiseConfig};
use crate::error::ExamError;
use crate::exam::ExamPartition;
use crate::form::AddExamForm;
use crate::item::{CommitPolicy, FieldName, ItemType};
use crate::notice::Notices;
use crate::repository::ExamRepository;
use crate::session::{Gate, SessionContext, StaticAuthProvider, UserIdentity};
use crate::store::{DocumentStore, SledDocumentStore};
use crate::types::{parse_instant, DocId, UserId};
use crate::views::{ExamCard, ExamListView, PendingWrite};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{debug, info};

/// Runtime context for CLI execution: workspace, config, store and session.
pub struct RunContext {
    runtime: Runtime,
    workspace_root: PathBuf,
    config: ExamwiseConfig,
    store_path: PathBuf,
    repo: ExamRepository,
    session: SessionContext,
}

impl RunContext {
    /// Create run context from workspace root, optional config path and
    /// optional user override.
    pub fn new(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        user: Option<String>,
    ) -> Result<Self, ExamError> {
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        config.validate().map_err(|errors| {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ExamError::Config(format!(
                "Configuration validation failed:\n{}",
                msgs.join("\n")
            ))
        })?;

        let uid = match user.or_else(|| config.session.user.clone()) {
            Some(raw) => Some(UserId::parse(&raw)?),
            None => None,
        };

        let store_path = config.storage.resolve_path(&workspace_root);
        std::fs::create_dir_all(&store_path).map_err(crate::error::StoreError::from)?;
        let store: Arc<dyn DocumentStore> = Arc::new(SledDocumentStore::new(&store_path)?);
        debug!(store = %store_path.display(), "Store opened");

        let identity = uid.map(|uid| UserIdentity {
            uid,
            display_name: config.session.display_name.clone(),
        });
        let session = SessionContext::init(&StaticAuthProvider::new(identity));

        let runtime = Runtime::new()
            .map_err(|e| ExamError::Config(format!("Failed to start async runtime: {}", e)))?;

        Ok(Self {
            runtime,
            workspace_root,
            config,
            store_path,
            repo: ExamRepository::new(store),
            session,
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn repository(&self) -> &ExamRepository {
        &self.repo
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ExamError> {
        match command {
            Commands::Init { force } => self.handle_init(*force),
            Commands::Exam { command } => self.handle_exam(command),
            Commands::Item { command } => self.handle_item(command),
            Commands::Watch {
                exam,
                interval_ms,
                count,
            } => self.handle_watch(exam.as_deref(), *interval_ms, *count),
            Commands::Status { format } => self.handle_status(format),
        }
    }

    fn handle_init(&self, force: bool) -> Result<String, ExamError> {
        let path = ConfigLoader::workspace_config_path(&self.workspace_root);
        if path.exists() && !force {
            return Ok(format!(
                "Configuration already exists at {} (use --force to overwrite)",
                path.display()
            ));
        }
        let text = ConfigLoader::starter_toml()
            .map_err(|e| ExamError::Config(format!("Failed to render config: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(crate::error::StoreError::from)?;
        }
        std::fs::write(&path, text).map_err(crate::error::StoreError::from)?;
        info!(path = %path.display(), "Wrote starter configuration");
        Ok(format!("Wrote {}", path.display()))
    }

    fn handle_exam(&self, command: &ExamCommands) -> Result<String, ExamError> {
        match command {
            ExamCommands::Add {
                name,
                date,
                subtitle,
                image_url,
            } => {
                let mut form = AddExamForm::with_defaults(
                    image_url
                        .clone()
                        .unwrap_or_else(|| self.config.defaults.image_url.clone()),
                );
                form.name = name.clone();
                form.subtitle = subtitle.clone().unwrap_or_default();
                form.date = Some(parse_instant(date).ok_or_else(|| ExamError::InvalidValue {
                    field: "date",
                    reason: format!("'{}' is not a date (expected YYYY-MM-DD or RFC 3339)", date),
                })?);
                let notices = Notices::new();
                let id = self
                    .runtime
                    .block_on(form.submit(&self.repo, &self.session, &notices))?;
                Ok(format!("{}\nID: {}", format_notices(&notices.drain()), id))
            }
            ExamCommands::List { format } => {
                self.session.require_user()?;
                let mut view = ExamListView::new(self.repo.clone(), self.session.clone());
                view.poll();
                let partition = view.partition_at(Utc::now());
                view.close();
                match format.as_str() {
                    "json" => Ok(format_exam_list_json(&partition)),
                    _ => Ok(format_exam_list_text(&partition, Utc::now())),
                }
            }
            ExamCommands::Show { exam_id, format } => {
                let card = self.open_card(exam_id)?;
                match format.as_str() {
                    "json" => Ok(format_exam_detail_json(card.exam(), card.items())),
                    _ => Ok(format_exam_detail_text(card.exam(), card.items(), Utc::now())),
                }
            }
            ExamCommands::Delete { exam_id, yes } => {
                let mut card = self.open_card(exam_id)?;
                if !yes {
                    let confirmed = dialoguer::Confirm::new()
                        .with_prompt(format!(
                            "Delete '{}' and its {} item(s)?",
                            card.exam().name,
                            card.items().len()
                        ))
                        .interact()
                        .map_err(|e| {
                            ExamError::Config(format!("Failed to get user input: {}", e))
                        })?;
                    if !confirmed {
                        return Ok("Deletion cancelled".to_string());
                    }
                }
                let result = self.runtime.block_on(card.delete_exam());
                let notices = format_notices(&card.notices().drain());
                let report = result?;
                Ok(format!(
                    "{}\nRemoved {} item(s).",
                    notices, report.items_deleted
                ))
            }
        }
    }

    fn handle_item(&self, command: &ItemCommands) -> Result<String, ExamError> {
        let exam_id = match command {
            ItemCommands::Types => return Ok(format_item_types_text()),
            ItemCommands::Add { exam_id, .. }
            | ItemCommands::Set { exam_id, .. }
            | ItemCommands::Toggle { exam_id, .. }
            | ItemCommands::Delete { exam_id, .. } => exam_id,
        };
        let mut card = self.open_card(exam_id)?;
        let pending = {
            let _guard = self.runtime.enter();
            issue_item_write(&mut card, command)?
        };
        if let Some(pending) = pending {
            self.runtime.block_on(pending.settle())?;
        }
        card.poll();
        Ok(format_items_text(card.items(), Utc::now()))
    }

    fn handle_watch(
        &self,
        exam: Option<&str>,
        interval_ms: u64,
        count: Option<u64>,
    ) -> Result<String, ExamError> {
        let interval = Duration::from_millis(interval_ms);
        let mut polls = 0u64;
        let mut updates = 0u64;
        match exam {
            Some(exam_id) => {
                let mut card = self.open_card(exam_id)?;
                println!("{}", format_items_text(card.items(), Utc::now()));
                while count.map_or(true, |c| polls < c) {
                    std::thread::sleep(interval);
                    polls += 1;
                    if card.poll() {
                        updates += 1;
                        println!("{}", format_items_text(card.items(), Utc::now()));
                    }
                }
            }
            None => {
                self.session.require_user()?;
                let mut view = ExamListView::new(self.repo.clone(), self.session.clone());
                view.poll();
                println!("{}", format_exam_list_text(&view.partition_at(Utc::now()), Utc::now()));
                while count.map_or(true, |c| polls < c) {
                    std::thread::sleep(interval);
                    polls += 1;
                    if view.poll() {
                        updates += 1;
                        let now = Utc::now();
                        println!("{}", format_exam_list_text(&view.partition_at(now), now));
                    }
                }
            }
        }
        Ok(format!("Watch finished after {} poll(s), {} update(s)", polls, updates))
    }

    fn handle_status(&self, format: &str) -> Result<String, ExamError> {
        let (session, user) = match self.session.gate() {
            Gate::Loading => ("loading".to_string(), None),
            Gate::SignedOut => ("signed out".to_string(), None),
            Gate::SignedIn(uid) => ("signed in".to_string(), Some(uid.to_string())),
        };
        let partition = match self.session.user() {
            Some(uid) => {
                let exams = self.runtime.block_on(self.repo.list_exams(&uid))?;
                ExamPartition::at(&exams, Utc::now())
            }
            None => ExamPartition::default(),
        };
        let report = StatusReport {
            session,
            user,
            workspace: self.workspace_root.clone(),
            store_path: self.store_path.clone(),
            upcoming: partition.upcoming.len(),
            past: partition.past.len(),
        };
        match format {
            "json" => Ok(format_status_json(&report)),
            _ => Ok(format_status_text(&report)),
        }
    }

    /// Load the exam and open its card with the current item snapshot.
    fn open_card(&self, exam_id: &str) -> Result<ExamCard, ExamError> {
        let user = self.session.require_user()?;
        let exam = self
            .runtime
            .block_on(self.repo.get_exam(&user, &DocId::from(exam_id)))?;
        let mut card = ExamCard::new(
            self.repo.clone(),
            self.session.clone(),
            Notices::new(),
            exam,
        );
        card.poll();
        Ok(card)
    }
}

/// Start the write an item command asks for. Text fields go through the
/// same input-then-blur path as an interactive edit.
fn issue_item_write(
    card: &mut ExamCard,
    command: &ItemCommands,
) -> Result<Option<PendingWrite>, ExamError> {
    let pending = match command {
        ItemCommands::Types => return Ok(None),
        ItemCommands::Add { item_type, .. } => card.add_item(item_type.parse::<ItemType>()?)?,
        ItemCommands::Set {
            item_id,
            field,
            value,
            ..
        } => {
            let item_id = DocId::from(item_id.as_str());
            let name: FieldName = field.parse()?;
            let value = name.parse_value(value)?;
            match name.commit_policy() {
                CommitPolicy::OnBlur => {
                    card.input(&item_id, &value)?;
                    card.blur(&item_id, name)?
                }
                CommitPolicy::Immediate => card.commit_field(&item_id, value)?,
            }
        }
        ItemCommands::Toggle { item_id, .. } => card.toggle_checked(&DocId::from(item_id.as_str()))?,
        ItemCommands::Delete { item_id, .. } => card.delete_item(&DocId::from(item_id.as_str()))?,
    };
    Ok(Some(pending))
}
