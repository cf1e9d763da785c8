//! Domain entities: the typed society tree

use std::fmt;

use crate::domain::DomainError;

/// Ordered attribute list as it appeared on the element.
pub type Attributes = Vec<(String, String)>;

/// XML content the model does not name, carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawElement {
    pub name: String,
    pub attributes: Attributes,
    pub children: Vec<RawNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawNode {
    Element(RawElement),
    Text(String),
    CData(String),
    Comment(String),
}

impl RawElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Look up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over child elements, skipping text and comments.
    pub fn elements(&self) -> impl Iterator<Item = &RawElement> {
        self.children.iter().filter_map(|c| match c {
            RawNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Concatenated text and CDATA content of this element.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                RawNode::Text(t) | RawNode::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Kind of one child in document order.
///
/// Containers record a `layout` when decoded; typed children are written back
/// into the slots of their kind, so untouched content keeps its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Host,
    Node,
    Agent,
    Component,
    Argument,
    Facet,
    Class,
    ProgParameter,
    EnvParameter,
    VmParameter,
    Extra,
    /// Comment or stray text, kept verbatim
    Raw(RawNode),
}

/// A command-line or environment parameter, e.g. `-Dorg.cougaar.node.name=NodeA`.
///
/// The name is everything before the first `=`; a parameter without `=` is all name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter(String);

impl Parameter {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn from_pair(name: &str, value: &str) -> Self {
        Self(format!("{}={}", name, value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn name(&self) -> &str {
        self.0.split_once('=').map(|(n, _)| n).unwrap_or(self.0.as_str())
    }

    pub fn value(&self) -> Option<&str> {
        self.0.split_once('=').map(|(_, v)| v)
    }

    /// Exact match on the name or on the whole string; never a prefix match.
    pub fn matches(&self, name: &str) -> bool {
        self.name() == name || self.0 == name
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Parameter {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Outcome of an upsert on a parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Override {
    /// An existing entry was rewritten at its position.
    Replaced,
    /// No entry matched; a new one was pushed to the end.
    Appended,
}

/// Remove every parameter matching `name`. Returns how many were removed.
fn remove_matching(params: &mut Vec<Parameter>, name: &str) -> usize {
    let before = params.len();
    params.retain(|p| !p.matches(name));
    before - params.len()
}

/// Set `name=value`: rewrite the first match in place and drop later matches,
/// or append when nothing matches.
fn upsert(params: &mut Vec<Parameter>, name: &str, value: &str) -> Override {
    let new = Parameter::from_pair(name, value);
    match params.iter().position(|p| p.matches(name)) {
        Some(first) => {
            params[first] = new;
            let mut index = 0;
            params.retain(|p| {
                let keep = index <= first || !p.matches(name);
                index += 1;
                keep
            });
            Override::Replaced
        }
        None => {
            params.push(new);
            Override::Appended
        }
    }
}

/// Root of a society description.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Society {
    pub name: Option<String>,
    pub attributes: Attributes,
    pub hosts: Vec<Host>,
    pub extras: Vec<RawElement>,
    pub layout: Vec<Slot>,
}

impl Society {
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.hosts.iter().flat_map(|h| h.nodes.iter())
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.nodes().flat_map(|n| n.agents.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Host {
    pub name: String,
    pub attributes: Attributes,
    pub facets: Vec<RawElement>,
    pub nodes: Vec<Node>,
    pub extras: Vec<RawElement>,
    pub layout: Vec<Slot>,
}

/// A runtime process on a host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Node {
    pub name: String,
    pub attributes: Attributes,
    /// Bootstrap class (`<class>`), if declared
    pub class: Option<String>,
    pub program_parameters: Vec<String>,
    /// `KEY=VALUE` environment entries
    pub env_parameters: Vec<Parameter>,
    /// JVM command-line parameters
    pub parameters: Vec<Parameter>,
    pub facets: Vec<RawElement>,
    pub agents: Vec<Agent>,
    /// Node-agent components; no edit touches these
    pub components: Vec<Component>,
    pub extras: Vec<RawElement>,
    pub layout: Vec<Slot>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Remove all parameters named `name`. Absent parameters are not an error.
    pub fn remove_parameter(&mut self, name: &str) -> usize {
        remove_matching(&mut self.parameters, name)
    }

    pub fn override_parameter(&mut self, name: &str, value: &str) -> Override {
        upsert(&mut self.parameters, name, value)
    }

    pub fn set_env(&mut self, name: &str, value: &str) -> Override {
        upsert(&mut self.env_parameters, name, value)
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.matches(name))
    }

    pub fn env(&self, name: &str) -> Option<&Parameter> {
        self.env_parameters.iter().find(|p| p.matches(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Agent {
    pub name: String,
    pub class: Option<String>,
    pub attributes: Attributes,
    pub facets: Vec<RawElement>,
    pub components: Vec<Component>,
    pub extras: Vec<RawElement>,
    pub layout: Vec<Slot>,
}

impl Agent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Drop every component with this exact classname.
    pub fn remove_component(&mut self, classname: &str) -> usize {
        let before = self.components.len();
        self.components.retain(|c| c.classname != classname);
        before - self.components.len()
    }
}

/// A plugin, servlet or other module loaded into an agent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Component {
    pub name: Option<String>,
    pub classname: String,
    /// Remaining attributes (priority, insertionpoint, order, ...)
    pub attributes: Attributes,
    pub arguments: Vec<Argument>,
    pub extras: Vec<RawElement>,
    pub layout: Vec<Slot>,
}

impl Component {
    pub fn new(classname: impl Into<String>) -> Self {
        Self {
            classname: classname.into(),
            ..Default::default()
        }
    }

    pub fn with_arguments<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = values.into_iter().map(Argument::new).collect();
        self
    }

    /// Overwrite the value of the argument at `index`.
    pub fn set_argument(&mut self, index: usize, value: &str) -> Result<(), DomainError> {
        match self.arguments.get_mut(index) {
            Some(arg) => {
                arg.value = value.to_string();
                Ok(())
            }
            None => Err(DomainError::MissingArgument {
                classname: self.classname.clone(),
                index,
                count: self.arguments.len(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Argument {
    pub value: String,
}

impl Argument {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(raw: &[&str]) -> Vec<Parameter> {
        raw.iter().map(|p| Parameter::from(*p)).collect()
    }

    #[test]
    fn given_parameter_with_value_when_splitting_then_name_is_before_first_equals() {
        let p = Parameter::new("-Dorg.cougaar.society.file=a=b.xml");
        assert_eq!(p.name(), "-Dorg.cougaar.society.file");
        assert_eq!(p.value(), Some("a=b.xml"));
    }

    #[test]
    fn given_bare_flag_when_matching_then_whole_string_is_name() {
        let p = Parameter::new("-server");
        assert_eq!(p.name(), "-server");
        assert_eq!(p.value(), None);
        assert!(p.matches("-server"));
    }

    #[test]
    fn given_longer_name_when_matching_then_prefix_does_not_count() {
        let p = Parameter::new("-Dorg.cougaar.control.portal=1");
        assert!(!p.matches("-Dorg.cougaar.control.port"));
    }

    #[test]
    fn given_absent_parameter_when_removing_then_list_is_unchanged() {
        let mut node = Node::new("NodeA");
        node.parameters = params(&["-Dfoo=bar", "-Xmx512m"]);
        let before = node.parameters.clone();

        assert_eq!(node.remove_parameter("-Dorg.cougaar.experiment.id"), 0);
        assert_eq!(node.parameters, before);
    }

    #[test]
    fn given_duplicate_parameters_when_removing_then_all_are_removed() {
        let mut node = Node::new("NodeA");
        node.parameters = params(&["-Dx=1", "-Dfoo=bar", "-Dx=2"]);

        assert_eq!(node.remove_parameter("-Dx"), 2);
        assert_eq!(node.parameters, params(&["-Dfoo=bar"]));
    }

    #[test]
    fn given_existing_parameter_when_overriding_then_replaced_in_place() {
        let mut node = Node::new("NodeA");
        node.parameters = params(&["-Da=1", "-Dx=old", "-Db=2"]);

        assert_eq!(node.override_parameter("-Dx", "new"), Override::Replaced);
        assert_eq!(node.parameters, params(&["-Da=1", "-Dx=new", "-Db=2"]));
    }

    #[test]
    fn given_duplicates_when_overriding_then_first_kept_and_rest_dropped() {
        let mut node = Node::new("NodeA");
        node.parameters = params(&["-Dx=1", "-Da=1", "-Dx=2"]);

        node.override_parameter("-Dx", "3");
        assert_eq!(node.parameters, params(&["-Dx=3", "-Da=1"]));
    }

    #[test]
    fn given_missing_parameter_when_overriding_then_appended() {
        let mut node = Node::new("NodeA");
        node.parameters = params(&["-Da=1"]);

        assert_eq!(node.override_parameter("-Dx", "v"), Override::Appended);
        assert_eq!(node.parameters, params(&["-Da=1", "-Dx=v"]));
    }

    #[test]
    fn given_matching_components_when_removing_then_only_those_are_dropped() {
        let mut agent = Agent::new("1-35-ARBN");
        agent.components = vec![
            Component::new("a.Plugin"),
            Component::new("b.Servlet"),
            Component::new("a.Plugin"),
        ];

        assert_eq!(agent.remove_component("a.Plugin"), 2);
        assert_eq!(agent.components.len(), 1);
        assert_eq!(agent.components[0].classname, "b.Servlet");
    }

    #[test]
    fn given_component_without_arguments_when_setting_then_missing_argument() {
        let mut comp = Component::new("x.Plugin");
        let err = comp.set_argument(0, "v").unwrap_err();
        assert!(matches!(err, DomainError::MissingArgument { index: 0, count: 0, .. }));
    }
}
