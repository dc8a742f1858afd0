//! Provider resolution
//!
//! Several components may satisfy the same logical requirement. The graph
//! never picks a winner: a dependent's alternative group simply lists every
//! provider, and the executor passes along whichever ones produced a value,
//! in provider-declaration order. Precedence is the dependent's decision.

use crate::component::{ComponentId, DependencyGroup, Descriptor};
use crate::logging::codes;
use crate::log_warning;
use crate::registry::Registry;
use crate::resolution::error::GraphError;

/// Expand a descriptor's alternative groups into concrete member lists
///
/// Capability groups become the registered providers of that capability in
/// registration order, excluding the dependent itself. A capability with no
/// providers is an error under strict references; otherwise the group is kept
/// empty and can never be satisfied.
pub fn expand_groups(
    descriptor: &Descriptor,
    registry: &Registry,
    strict_references: bool,
) -> Result<Vec<Vec<ComponentId>>, GraphError> {
    let mut groups = Vec::with_capacity(descriptor.at_least_one().len());

    for group in descriptor.at_least_one() {
        let members = match group {
            DependencyGroup::Members(members) => members.clone(),
            DependencyGroup::Capability(capability) => {
                let providers: Vec<ComponentId> = registry
                    .providers_of(capability)
                    .iter()
                    .filter(|provider| *provider != descriptor.id())
                    .cloned()
                    .collect();

                if providers.is_empty() {
                    if strict_references {
                        return Err(GraphError::UnknownCapability {
                            component: descriptor.id().clone(),
                            capability: capability.clone(),
                        });
                    }
                    log_warning!(
                        code = codes::graph::EMPTY_PROVIDER_GROUP,
                        "Alternative group has no providers",
                        "component" => descriptor.id(),
                        "capability" => capability
                    );
                }

                providers
            }
        };
        groups.push(members);
    }

    Ok(groups)
}
