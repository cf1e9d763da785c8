//! Round-trip stability of the XML codec

use socedit::domain::{RawNode, Society};
use socedit::infrastructure::xml::{
    parse_document, society_from_element, society_to_element, write_document, XmlDocument,
};

const SOCIETY: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<!DOCTYPE society>
<!-- 1AD minimal -->
<society name="1AD-small" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:noNamespaceSchemaLocation="society.xsd">
  <host name="sb022">
    <facet service="acme"/>
    <node name="NodeA">
      <class>org.cougaar.bootstrap.Bootstrapper</class>
      <prog_parameter>org.cougaar.core.node.Node</prog_parameter>
      <env_parameter>COUGAAR_INSTALL_PATH=/opt/cougaar &amp; friends</env_parameter>
      <vm_parameter>-Dorg.cougaar.node.name=NodeA</vm_parameter>
      <vm_parameter>-Xmx768m</vm_parameter>
      <facet role="NodeRole"/>
      <agent name="1-35-ARBN" class="org.cougaar.core.agent.SimpleAgent">
        <facet org_id="1-35-ARBN" superior_org_id="2-BDE-1-AD"/>
        <component name="org.cougaar.mlm.plugin.ldm.LDMSQLPlugin(fdm_equip.q)" class="org.cougaar.mlm.plugin.ldm.LDMSQLPlugin" priority="COMPONENT" insertionpoint="Node.AgentManager.Agent.PluginManager.Plugin" order="3">
          <argument>fdm_equip.q</argument>
        </component>
      </agent>
      <component name="node-servlet" class="org.cougaar.core.servlet.ServletService" priority="HIGH" insertionpoint="Node.AgentManager.Agent.NodeAgent"/>
    </node>
  </host>
  <rules/>
</society>
"#;

fn decode(xml: &str) -> (XmlDocument, Society) {
    let document = parse_document(xml).expect("parse");
    let society = society_from_element(&document.root).expect("decode");
    (document, society)
}

fn encode(document: &XmlDocument, society: &Society) -> String {
    let document = XmlDocument {
        root: society_to_element(society),
        ..document.clone()
    };
    write_document(&document).expect("write")
}

#[test]
fn given_unedited_society_when_written_and_reloaded_then_structurally_equal() {
    let (document, society) = decode(SOCIETY);

    let xml = encode(&document, &society);
    let (document_again, society_again) = decode(&xml);

    assert_eq!(society_again, society);
    assert_eq!(document_again.declaration, document.declaration);
    assert_eq!(document_again.doctype.as_deref(), Some("society"));
    assert_eq!(document_again.prolog, vec![RawNode::Comment(" 1AD minimal ".into())]);
}

#[test]
fn given_written_society_when_written_again_then_output_is_stable() {
    let (document, society) = decode(SOCIETY);
    let first = encode(&document, &society);

    let (document, society) = decode(&first);
    let second = encode(&document, &society);

    assert_eq!(first, second);
}

#[test]
fn given_society_when_decoding_then_all_levels_are_typed() {
    let (_, society) = decode(SOCIETY);

    assert_eq!(
        society.attributes[0],
        (
            "xmlns:xsi".to_string(),
            "http://www.w3.org/2001/XMLSchema-instance".to_string()
        )
    );
    assert_eq!(society.extras[0].name, "rules");
    let node = &society.hosts[0].nodes[0];
    assert_eq!(
        node.env_parameters[0].value(),
        Some("/opt/cougaar & friends")
    );
    assert_eq!(node.parameters.len(), 2);
    assert_eq!(node.facets.len(), 1);
    assert_eq!(node.components.len(), 1);
    assert_eq!(node.components[0].classname, "org.cougaar.core.servlet.ServletService");
    let agent = &node.agents[0];
    assert_eq!(agent.class.as_deref(), Some("org.cougaar.core.agent.SimpleAgent"));
    assert_eq!(agent.components[0].arguments[0].value, "fdm_equip.q");
}

#[test]
fn given_written_society_when_inspecting_text_then_escaping_preserved() {
    let (document, society) = decode(SOCIETY);

    let xml = encode(&document, &society);

    assert!(xml.contains("/opt/cougaar &amp; friends"));
    assert!(xml.contains("<argument>fdm_equip.q</argument>"));
}

const INTERLEAVED: &str = r#"<society name="s">
  <host name="h">
    <node name="n">
      <!-- agents are listed before node components on purpose -->
      <vm_parameter>-Dorg.cougaar.node.name=n</vm_parameter>
      <component class="org.cougaar.core.servlet.ServletService"/>
      <agent name="A">
        <component class="org.cougaar.mlm.plugin.ldm.LDMSQLPlugin">
          <argument> padded.q </argument>
        </component>
        <facet org_id="A"/>
      </agent>
      <facet role="late"/>
    </node>
  </host>
</society>
"#;

#[test]
fn given_interleaved_society_when_written_then_child_order_and_comments_kept() {
    let (document, society) = decode(INTERLEAVED);

    let xml = encode(&document, &society);
    let (document_again, _) = decode(&xml);

    assert_eq!(document_again.root, document.root);
    let comment = xml.find("<!-- agents are listed").expect("comment kept");
    let vm = xml.find("<vm_parameter>").unwrap();
    let servlet = xml.find("ServletService").unwrap();
    let agent = xml.find("<agent").unwrap();
    let facet = xml.find(r#"<facet role="late"/>"#).unwrap();
    assert!(comment < vm && vm < servlet && servlet < agent && agent < facet);
    assert!(xml.contains("<argument> padded.q </argument>"));
}
