//! Mapping between the generic XML tree and the typed society model
//!
//! Known elements and attributes become typed fields. Anything else is kept as a
//! `RawElement`. Each container records the document order of its children in
//! `layout`, and encoding replays that order.

use crate::domain::{
    Agent, Argument, Attributes, Component, DomainError, Host, Node, Parameter, RawElement,
    RawNode, Slot, Society,
};

const SOCIETY: &str = "society";
const HOST: &str = "host";
const NODE: &str = "node";
const AGENT: &str = "agent";
const COMPONENT: &str = "component";
const ARGUMENT: &str = "argument";
const FACET: &str = "facet";
const CLASS: &str = "class";
const PROG_PARAMETER: &str = "prog_parameter";
const ENV_PARAMETER: &str = "env_parameter";
const VM_PARAMETER: &str = "vm_parameter";

/// Split `wanted` attributes out of an element, keeping the rest in document order.
fn take_attributes<const N: usize>(
    element: &RawElement,
    wanted: [&str; N],
) -> ([Option<String>; N], Attributes) {
    let mut found: [Option<String>; N] = std::array::from_fn(|_| None);
    let mut rest = Vec::new();
    for (key, value) in &element.attributes {
        match wanted.iter().position(|w| *w == key.as_str()) {
            Some(i) => found[i] = Some(value.clone()),
            None => rest.push((key.clone(), value.clone())),
        }
    }
    (found, rest)
}

fn required(value: Option<String>, attr: &str, context: &str) -> Result<String, DomainError> {
    value.ok_or_else(|| {
        DomainError::structural(context, format!("missing required attribute '{}'", attr))
    })
}

/// Visit every child in order. Elements go to `decode`, which files them and
/// names their slot; comments and text are recorded as raw slots.
fn decode_children(
    element: &RawElement,
    mut decode: impl FnMut(&RawElement) -> Result<Slot, DomainError>,
) -> Result<Vec<Slot>, DomainError> {
    let mut layout = Vec::with_capacity(element.children.len());
    for child in &element.children {
        let slot = match child {
            RawNode::Element(child) => decode(child)?,
            other => Slot::Raw(other.clone()),
        };
        layout.push(slot);
    }
    Ok(layout)
}

/// Build the typed tree from a `<society>` root element.
pub fn society_from_element(root: &RawElement) -> Result<Society, DomainError> {
    if root.name != SOCIETY {
        return Err(DomainError::structural(
            "document root",
            format!("expected <{}>, found <{}>", SOCIETY, root.name),
        ));
    }
    let ([name], attributes) = take_attributes(root, ["name"]);
    let mut society = Society {
        name,
        attributes,
        ..Default::default()
    };
    society.layout = decode_children(root, |child| match child.name.as_str() {
        HOST => {
            society.hosts.push(host_from_element(child)?);
            Ok(Slot::Host)
        }
        _ => {
            society.extras.push(child.clone());
            Ok(Slot::Extra)
        }
    })?;
    Ok(society)
}

fn host_from_element(element: &RawElement) -> Result<Host, DomainError> {
    let ([name], attributes) = take_attributes(element, ["name"]);
    let name = required(name, "name", "<host>")?;
    let mut nodes = Vec::new();
    let mut facets = Vec::new();
    let mut extras = Vec::new();
    let layout = decode_children(element, |child| match child.name.as_str() {
        NODE => {
            nodes.push(node_from_element(child, &name)?);
            Ok(Slot::Node)
        }
        FACET => {
            facets.push(child.clone());
            Ok(Slot::Facet)
        }
        _ => {
            extras.push(child.clone());
            Ok(Slot::Extra)
        }
    })?;
    Ok(Host {
        name,
        attributes,
        facets,
        nodes,
        extras,
        layout,
    })
}

fn node_from_element(element: &RawElement, host: &str) -> Result<Node, DomainError> {
    let ([name], attributes) = take_attributes(element, ["name"]);
    let mut node = Node {
        name: required(name, "name", &format!("host {} / <node>", host))?,
        attributes,
        ..Default::default()
    };
    let node_name = node.name.clone();
    node.layout = decode_children(element, |child| {
        let slot = match child.name.as_str() {
            CLASS => {
                node.class = Some(child.text());
                Slot::Class
            }
            PROG_PARAMETER => {
                node.program_parameters.push(child.text());
                Slot::ProgParameter
            }
            ENV_PARAMETER => {
                node.env_parameters.push(Parameter::new(child.text()));
                Slot::EnvParameter
            }
            VM_PARAMETER => {
                node.parameters.push(Parameter::new(child.text()));
                Slot::VmParameter
            }
            FACET => {
                node.facets.push(child.clone());
                Slot::Facet
            }
            AGENT => {
                node.agents.push(agent_from_element(child, &node_name)?);
                Slot::Agent
            }
            COMPONENT => {
                node.components
                    .push(component_from_element(child, &node_name)?);
                Slot::Component
            }
            _ => {
                node.extras.push(child.clone());
                Slot::Extra
            }
        };
        Ok(slot)
    })?;
    Ok(node)
}

fn agent_from_element(element: &RawElement, node: &str) -> Result<Agent, DomainError> {
    let ([name, class], attributes) = take_attributes(element, ["name", "class"]);
    let mut agent = Agent {
        name: required(name, "name", &format!("node {} / <agent>", node))?,
        class,
        attributes,
        ..Default::default()
    };
    let agent_name = agent.name.clone();
    agent.layout = decode_children(element, |child| {
        let slot = match child.name.as_str() {
            FACET => {
                agent.facets.push(child.clone());
                Slot::Facet
            }
            COMPONENT => {
                agent
                    .components
                    .push(component_from_element(child, &agent_name)?);
                Slot::Component
            }
            _ => {
                agent.extras.push(child.clone());
                Slot::Extra
            }
        };
        Ok(slot)
    })?;
    Ok(agent)
}

fn component_from_element(element: &RawElement, owner: &str) -> Result<Component, DomainError> {
    let ([name, class], attributes) = take_attributes(element, ["name", "class"]);
    let context = format!("{} / <component name={:?}>", owner, name.as_deref().unwrap_or(""));
    let mut component = Component {
        name,
        classname: required(class, "class", &context)?,
        attributes,
        ..Default::default()
    };
    component.layout = decode_children(element, |child| {
        let slot = match child.name.as_str() {
            ARGUMENT => {
                component.arguments.push(Argument::new(child.text()));
                Slot::Argument
            }
            _ => {
                component.extras.push(child.clone());
                Slot::Extra
            }
        };
        Ok(slot)
    })?;
    Ok(component)
}

// ============================================================
// typed tree -> XML
// ============================================================

/// Place rendered children into the recorded layout.
///
/// `buckets` lists each kind with its rendered children, in the order used when
/// nothing was recorded. A kind fills its slots in turn; leftovers (added by an
/// edit) follow its last slot. Kinds absent from the layout go in front of the
/// first later kind that is present, or at the end.
fn arrange(layout: &[Slot], buckets: Vec<(Slot, Vec<RawNode>)>) -> Vec<RawNode> {
    let mut buckets: Vec<(Slot, bool, std::vec::IntoIter<RawNode>)> = buckets
        .into_iter()
        .map(|(kind, nodes)| {
            let placed = layout.contains(&kind);
            (kind, placed, nodes.into_iter())
        })
        .collect();

    let mut out = Vec::new();
    for (i, slot) in layout.iter().enumerate() {
        let Some(b) = buckets.iter().position(|(kind, _, _)| kind == slot) else {
            if let Slot::Raw(node) = slot {
                out.push(node.clone());
            }
            continue;
        };
        for (_, _, nodes) in buckets[..b].iter_mut().filter(|(_, placed, _)| !*placed) {
            out.extend(nodes);
        }
        let nodes = &mut buckets[b].2;
        out.extend(nodes.next());
        if !layout[i + 1..].contains(slot) {
            out.extend(nodes);
        }
    }
    for (_, _, nodes) in buckets {
        out.extend(nodes);
    }
    out
}

fn text_element(name: &str, text: &str) -> RawNode {
    let mut element = RawElement::new(name);
    if !text.is_empty() {
        element.children.push(RawNode::Text(text.to_string()));
    }
    RawNode::Element(element)
}

fn with_attributes(name: &str, leading: &[(&str, Option<&str>)], rest: &Attributes) -> RawElement {
    let mut element = RawElement::new(name);
    for (key, value) in leading {
        if let Some(value) = value {
            element.attributes.push((key.to_string(), value.to_string()));
        }
    }
    element.attributes.extend(rest.iter().cloned());
    element
}

fn raw(elements: &[RawElement]) -> Vec<RawNode> {
    elements.iter().cloned().map(RawNode::Element).collect()
}

fn rendered<T>(items: &[T], render: impl Fn(&T) -> RawNode) -> Vec<RawNode> {
    items.iter().map(render).collect()
}

pub fn society_to_element(society: &Society) -> RawElement {
    let mut element = with_attributes(SOCIETY, &[("name", society.name.as_deref())], &society.attributes);
    element.children = arrange(
        &society.layout,
        vec![
            (Slot::Host, rendered(&society.hosts, |h| RawNode::Element(host_to_element(h)))),
            (Slot::Extra, raw(&society.extras)),
        ],
    );
    element
}

fn host_to_element(host: &Host) -> RawElement {
    let mut element = with_attributes(HOST, &[("name", Some(host.name.as_str()))], &host.attributes);
    element.children = arrange(
        &host.layout,
        vec![
            (Slot::Facet, raw(&host.facets)),
            (Slot::Node, rendered(&host.nodes, |n| RawNode::Element(node_to_element(n)))),
            (Slot::Extra, raw(&host.extras)),
        ],
    );
    element
}

fn node_to_element(node: &Node) -> RawElement {
    let mut element = with_attributes(NODE, &[("name", Some(node.name.as_str()))], &node.attributes);
    let class: Vec<RawNode> = node
        .class
        .iter()
        .map(|c| text_element(CLASS, c))
        .collect();
    element.children = arrange(
        &node.layout,
        vec![
            (Slot::Class, class),
            (
                Slot::ProgParameter,
                rendered(&node.program_parameters, |p| text_element(PROG_PARAMETER, p)),
            ),
            (
                Slot::EnvParameter,
                rendered(&node.env_parameters, |p| text_element(ENV_PARAMETER, p.as_str())),
            ),
            (
                Slot::VmParameter,
                rendered(&node.parameters, |p| text_element(VM_PARAMETER, p.as_str())),
            ),
            (Slot::Facet, raw(&node.facets)),
            (Slot::Agent, rendered(&node.agents, |a| RawNode::Element(agent_to_element(a)))),
            (
                Slot::Component,
                rendered(&node.components, |c| RawNode::Element(component_to_element(c))),
            ),
            (Slot::Extra, raw(&node.extras)),
        ],
    );
    element
}

fn agent_to_element(agent: &Agent) -> RawElement {
    let mut element = with_attributes(
        AGENT,
        &[("name", Some(agent.name.as_str())), ("class", agent.class.as_deref())],
        &agent.attributes,
    );
    element.children = arrange(
        &agent.layout,
        vec![
            (Slot::Facet, raw(&agent.facets)),
            (
                Slot::Component,
                rendered(&agent.components, |c| RawNode::Element(component_to_element(c))),
            ),
            (Slot::Extra, raw(&agent.extras)),
        ],
    );
    element
}

fn component_to_element(component: &Component) -> RawElement {
    let mut element = with_attributes(
        COMPONENT,
        &[
            ("name", component.name.as_deref()),
            ("class", Some(component.classname.as_str())),
        ],
        &component.attributes,
    );
    element.children = arrange(
        &component.layout,
        vec![
            (
                Slot::Argument,
                rendered(&component.arguments, |a| text_element(ARGUMENT, &a.value)),
            ),
            (Slot::Extra, raw(&component.extras)),
        ],
    );
    element
}
