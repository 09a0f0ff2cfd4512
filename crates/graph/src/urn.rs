use crate::types::PreviewEvent;

/// Identifier pieces extracted from a resource URN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrn {
    pub provider: String,
    pub resource_type: String,
    pub name: String,
}

/// Parse a resource URN of the form
/// `urn:pulumi:<stack>::<project>::<type>::<name>`.
///
/// The type segment is itself `provider/subservice:TypeName`-shaped;
/// `provider` is the part of its first `:`-segment before any `/`. A URN
/// missing expected segments degrades to raw-string fallbacks rather than
/// failing.
pub fn parse_urn(urn: &str) -> ParsedUrn {
    let parts: Vec<&str> = urn.split("::").collect();
    let type_part = parts.get(2).copied().unwrap_or("");
    let name = parts.get(3).copied().unwrap_or(urn);

    let provider_part = type_part.split(':').next().unwrap_or("unknown");
    let provider = provider_part.split('/').next().unwrap_or(provider_part);
    let provider = if provider.is_empty() { "unknown" } else { provider };

    ParsedUrn {
        provider: provider.to_string(),
        resource_type: type_part.to_string(),
        name: name.to_string(),
    }
}

/// Bookkeeping pseudo-resources never appear in the visualized graph.
fn is_bookkeeping(resource_type: &str) -> bool {
    resource_type == "pulumi:pulumi:Stack"
        || resource_type.starts_with("pulumi:providers:")
        || resource_type == "pulumi:pulumi:StackReference"
}

/// Drop stack-root, provider-instance, and stack-reference events,
/// preserving the relative order of the rest.
pub fn filter_events(events: &[PreviewEvent]) -> Vec<&PreviewEvent> {
    events
        .iter()
        .filter(|e| !is_bookkeeping(&e.resource_type))
        .collect()
}
