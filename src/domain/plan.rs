//! The fixed edit pass applied to every node, agent and component.

use std::fmt;

use tracing::{debug, trace};

use crate::domain::{DomainError, Override, Society};

pub const DATABASE_URL: &str = "-Dorg.cougaar.configuration.database";
pub const DATABASE_PASSWORD: &str = "-Dorg.cougaar.configuration.password";
pub const DATABASE_USER: &str = "-Dorg.cougaar.configuration.user";
pub const EXPERIMENT_ID: &str = "-Dorg.cougaar.experiment.id";
pub const CONTROL_PORT: &str = "-Dorg.cougaar.control.port";
pub const SWALLOW_OUTPUT: &str = "-Dorg.cougaar.tools.server.swallowOutputConnectionException";

pub const INITIALIZATION_COMPONENT: &str = "-Dorg.cougaar.core.node.InitializationComponent";
pub const SOCIETY_FILE: &str = "-Dorg.cougaar.society.file";

pub const TOPOLOGY_READER_SERVLET: &str = "org.cougaar.core.topology.TopologyReaderServlet";
pub const LDM_SQL_PLUGIN: &str = "org.cougaar.mlm.plugin.ldm.LDMSQLPlugin";
pub const GLS_INIT_SERVLET: &str = "org.cougaar.mlm.plugin.organization.GLSInitServlet";

pub const DEFAULT_LDM_QUERY_FILE: &str = "fdm_equip_ref.q";
pub const DEFAULT_GLS_QUERY_FILE: &str = "093FF.oplan.noncsmart.q";

/// Environment variable set on every node when a display target is configured.
///
/// An existing entry is rewritten rather than joined by a second one.
pub const DISPLAY_ENV: &str = "DISPLAY";

/// Overwrite one argument of every component with a given classname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentPatch {
    pub classname: String,
    pub index: usize,
    pub value: String,
}

/// Everything one edit pass does, in the order it does it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditPlan {
    /// X display target; `DISPLAY=<target>:0.0` is set on each node when present
    pub display: Option<String>,
    pub removed_parameters: Vec<String>,
    pub overrides: Vec<(String, String)>,
    pub removed_components: Vec<String>,
    pub argument_patches: Vec<ArgumentPatch>,
}

/// Counts of what an edit pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditReport {
    pub nodes: usize,
    pub agents: usize,
    pub env_entries_set: usize,
    pub parameters_removed: usize,
    pub parameters_replaced: usize,
    pub parameters_appended: usize,
    pub components_removed: usize,
    pub arguments_patched: usize,
}

impl fmt::Display for EditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, {} agents: {} parameters removed, {} replaced, {} appended, \
             {} components removed, {} arguments patched, {} env entries set",
            self.nodes,
            self.agents,
            self.parameters_removed,
            self.parameters_replaced,
            self.parameters_appended,
            self.components_removed,
            self.arguments_patched,
            self.env_entries_set,
        )
    }
}

impl EditPlan {
    /// The standard plan for running a society from the given XML file.
    pub fn standard(society_file: &str) -> Self {
        Self {
            display: None,
            removed_parameters: [
                DATABASE_URL,
                DATABASE_PASSWORD,
                DATABASE_USER,
                EXPERIMENT_ID,
                CONTROL_PORT,
                SWALLOW_OUTPUT,
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            overrides: vec![
                (INITIALIZATION_COMPONENT.to_string(), "XML".to_string()),
                (SOCIETY_FILE.to_string(), society_file.to_string()),
            ],
            removed_components: vec![TOPOLOGY_READER_SERVLET.to_string()],
            argument_patches: vec![
                ArgumentPatch {
                    classname: LDM_SQL_PLUGIN.to_string(),
                    index: 0,
                    value: DEFAULT_LDM_QUERY_FILE.to_string(),
                },
                ArgumentPatch {
                    classname: GLS_INIT_SERVLET.to_string(),
                    index: 0,
                    value: DEFAULT_GLS_QUERY_FILE.to_string(),
                },
            ],
        }
    }

    /// Set the display target. Empty or whitespace-only targets count as unset.
    pub fn with_display(mut self, display: Option<&str>) -> Self {
        self.display = display
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        self
    }

    /// Replace the value written by the patch for `classname`.
    pub fn with_argument_value(mut self, classname: &str, value: &str) -> Self {
        for patch in self
            .argument_patches
            .iter_mut()
            .filter(|p| p.classname == classname)
        {
            patch.value = value.to_string();
        }
        self
    }

    /// Apply the plan to every node, agent and component in document order.
    ///
    /// Stops at the first error; the tree may then be partially edited and
    /// must not be written.
    pub fn apply(&self, society: &mut Society) -> Result<EditReport, DomainError> {
        let mut report = EditReport::default();
        let display = self.display.as_ref().map(|d| format!("{}:0.0", d));

        for host in society.hosts.iter_mut() {
            for node in host.nodes.iter_mut() {
                debug!("apply: host={} node={}", host.name, node.name);
                report.nodes += 1;

                if let Some(display) = &display {
                    node.set_env(DISPLAY_ENV, display);
                    report.env_entries_set += 1;
                }
                for name in &self.removed_parameters {
                    report.parameters_removed += node.remove_parameter(name);
                }
                for (name, value) in &self.overrides {
                    match node.override_parameter(name, value) {
                        Override::Replaced => report.parameters_replaced += 1,
                        Override::Appended => report.parameters_appended += 1,
                    }
                }

                for agent in node.agents.iter_mut() {
                    report.agents += 1;
                    for classname in &self.removed_components {
                        let removed = agent.remove_component(classname);
                        if removed > 0 {
                            trace!("apply: agent={} removed {} x {}", agent.name, removed, classname);
                        }
                        report.components_removed += removed;
                    }
                    for component in agent.components.iter_mut() {
                        let patches: Vec<&ArgumentPatch> = self
                            .argument_patches
                            .iter()
                            .filter(|p| p.classname == component.classname)
                            .collect();
                        for patch in patches {
                            component
                                .set_argument(patch.index, &patch.value)
                                .map_err(|e| {
                                    DomainError::structural(
                                        format!(
                                            "host {} / node {} / agent {}",
                                            host.name, node.name, agent.name
                                        ),
                                        e.to_string(),
                                    )
                                })?;
                            report.arguments_patched += 1;
                        }
                    }
                }
            }
        }

        Ok(report)
    }
}
