//! Society editing service
//!
//! Loads a society XML file, applies the standard edit plan and writes it back.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::plan::{GLS_INIT_SERVLET, LDM_SQL_PLUGIN};
use crate::domain::{EditPlan, EditReport, Society};
use crate::infrastructure::traits::FileSystem;
use crate::infrastructure::xml::{
    parse_document, society_from_element, society_to_element, write_document, XmlDocument,
};

/// A society file loaded into memory.
#[derive(Debug, Clone)]
pub struct LoadedSociety {
    pub path: PathBuf,
    pub document: XmlDocument,
    pub society: Society,
}

/// Result of an edit pass, serialized but not yet written.
#[derive(Debug, Clone)]
pub struct EditOutcome {
    pub path: PathBuf,
    pub report: EditReport,
    pub society: Society,
    pub xml: String,
}

/// Pipeline stage announced by [`SocietyEditor::edit_file_with_progress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Editing,
    Writing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Editing => "EDITING",
            Stage::Writing => "WRITING",
            Stage::Done => "DONE",
        })
    }
}

/// Service for the load → edit → write pipeline.
pub struct SocietyEditor {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl SocietyEditor {
    /// Create a new editor service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// The plan applied to the society at `path`.
    ///
    /// The society-file parameter is set to `path` exactly as given.
    pub fn plan_for(&self, path: &Path) -> EditPlan {
        EditPlan::standard(&path.display().to_string())
            .with_display(self.settings.display.as_deref())
            .with_argument_value(LDM_SQL_PLUGIN, &self.settings.ldm_query_file)
            .with_argument_value(GLS_INIT_SERVLET, &self.settings.gls_query_file)
    }

    /// Read and decode a society file.
    pub fn load(&self, path: &Path) -> ApplicationResult<LoadedSociety> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::InputNotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read society file", path)?;
        let document = parse_document(&content).map_err(|e| ApplicationError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let society = society_from_element(&document.root)?;
        debug!(
            "load: {} hosts, {} nodes, {} agents",
            society.hosts.len(),
            society.nodes().count(),
            society.agents().count()
        );
        Ok(LoadedSociety {
            path: path.to_path_buf(),
            document,
            society,
        })
    }

    /// Serialize a society inside the document it was loaded from.
    pub fn render(&self, loaded: &LoadedSociety) -> ApplicationResult<String> {
        let document = XmlDocument {
            root: society_to_element(&loaded.society),
            ..loaded.document.clone()
        };
        write_document(&document).map_err(|e| ApplicationError::OperationFailed {
            context: format!("serialize {}", loaded.path.display()),
            source: Box::new(e),
        })
    }

    /// Load, edit and serialize in memory. Nothing is written.
    #[instrument(skip(self))]
    pub fn edit(&self, path: &Path) -> ApplicationResult<EditOutcome> {
        let mut loaded = self.load(path)?;
        let plan = self.plan_for(path);
        let report = plan.apply(&mut loaded.society)?;
        debug!("edit: {}", report);
        let xml = self.render(&loaded)?;
        Ok(EditOutcome {
            path: loaded.path,
            report,
            society: loaded.society,
            xml,
        })
    }

    /// Write serialized XML over `path`.
    pub fn save(&self, path: &Path, xml: &str) -> ApplicationResult<()> {
        self.fs
            .write_atomic(path, xml)
            .map_err(|source| ApplicationError::Write {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Full pipeline: edit in memory, then overwrite the file.
    ///
    /// The file is only touched after every edit succeeded.
    pub fn edit_file(&self, path: &Path) -> ApplicationResult<EditOutcome> {
        self.edit_file_with_progress(path, |_| {})
    }

    /// Same as [`edit_file`](Self::edit_file), reporting each stage as it starts.
    #[instrument(skip(self, on_stage))]
    pub fn edit_file_with_progress(
        &self,
        path: &Path,
        mut on_stage: impl FnMut(Stage),
    ) -> ApplicationResult<EditOutcome> {
        let mut enter = |stage: Stage| {
            info!("{}: {}", stage, path.display());
            on_stage(stage);
        };

        enter(Stage::Editing);
        let outcome = self.edit(path)?;
        enter(Stage::Writing);
        self.save(path, &outcome.xml)?;
        enter(Stage::Done);
        Ok(outcome)
    }
}
