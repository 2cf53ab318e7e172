use serde::{Deserialize, Serialize};

use super::ElementType;

/// One node of a consolidation tree returned by a recursive
/// `$expand=Components(...)` request.
///
/// `components` is `None` when the server did not expand the node, either
/// because it is a leaf or because the requested depth was exhausted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationNode {
    /// Element name
    #[serde(rename = "Name")]
    pub name: String,
    /// Element type
    #[serde(rename = "Type")]
    pub element_type: ElementType,
    /// Direct components, in server order
    #[serde(rename = "Components", default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ConsolidationNode>>,
}

impl ConsolidationNode {
    /// Flattens the tree below this node into member names, depth first.
    ///
    /// Each component is named before its own components are visited. With
    /// `leaves_only` only numeric components are named. The starting node is
    /// named only when it is itself numeric.
    pub fn members(&self, leaves_only: bool) -> Vec<String> {
        let mut members = Vec::new();
        if self.element_type == ElementType::Numeric {
            members.push(self.name.clone());
        } else {
            collect_members(self, leaves_only, &mut members);
        }
        members
    }
}

fn collect_members(node: &ConsolidationNode, leaves_only: bool, members: &mut Vec<String>) {
    for component in node.components.iter().flatten() {
        if !leaves_only || component.element_type == ElementType::Numeric {
            members.push(component.name.clone());
        }
        collect_members(component, leaves_only, members);
    }
}
