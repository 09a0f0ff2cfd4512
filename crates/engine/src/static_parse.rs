use infraviz_graph::PreviewEvent;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static RESOURCE_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?:(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*)?",
        r"new\s+([A-Za-z_$][\w$]*)\.([A-Za-z_$][\w$]*)\.([A-Za-z_$][\w$]*)\s*",
        r#"\(\s*["'`]([^"'`]+)["'`]"#,
    ))
    .expect("valid resource declaration regex")
});

static PARENT_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"parent\s*:\s*([A-Za-z_$][\w$]*)").expect("valid parent regex"));

static DEPENDS_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"dependsOn\s*:\s*\[([^\]]*)\]").expect("valid dependsOn regex"));

/// Best-effort static scan of a program text for resource constructor
/// calls, used when the provisioning collaborator cannot run a real
/// preview.
///
/// Matches `new <alias>.<module>.<Type>("name", …)` declarations and
/// recovers `parent:`/`dependsOn:` hints that reference other declared
/// resource variables. Synthetic URNs use the real four-segment shape so
/// the graph pipeline treats the result like genuine preview output.
pub fn parse_resources_from_code(code: &str) -> Vec<PreviewEvent> {
    struct Decl {
        urn: String,
        resource_type: String,
        parent_var: Option<String>,
        dep_vars: Vec<String>,
    }

    let mut decls: Vec<Decl> = Vec::new();
    let mut var_to_urn: HashMap<String, String> = HashMap::new();

    for caps in RESOURCE_DECL.captures_iter(code) {
        let alias = &caps[2];
        let module = &caps[3];
        let type_name = &caps[4];
        let name = &caps[5];

        let resource_type = format!("{alias}:{module}/{}:{type_name}", lower_first(type_name));
        let urn = format!("urn:pulumi:dev::preview::{resource_type}::{name}");

        let match_start = caps.get(0).map_or(0, |m| m.start());
        let body = code[match_start..]
            .find('(')
            .map(|offset| constructor_span(code, match_start + offset))
            .unwrap_or("");

        let parent_var = PARENT_HINT.captures(body).map(|c| c[1].to_string());
        let dep_vars: Vec<String> = DEPENDS_HINT
            .captures(body)
            .map(|c| {
                c[1].split(',')
                    .map(str::trim)
                    .filter(|ident| {
                        !ident.is_empty()
                            && ident
                                .chars()
                                .all(|ch| ch.is_alphanumeric() || ch == '_' || ch == '$')
                    })
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        if let Some(var) = caps.get(1) {
            var_to_urn.insert(var.as_str().to_string(), urn.clone());
        }
        decls.push(Decl {
            urn,
            resource_type,
            parent_var,
            dep_vars,
        });
    }

    decls
        .into_iter()
        .map(|decl| {
            let mut event = PreviewEvent::new(decl.urn, decl.resource_type, "create");
            event.parent = decl
                .parent_var
                .and_then(|var| var_to_urn.get(&var).cloned());
            event.dependencies = decl
                .dep_vars
                .into_iter()
                .filter_map(|var| var_to_urn.get(&var).cloned())
                .collect();
            event
        })
        .collect()
}

/// Slice from the opening paren through its balanced close. Parens inside
/// string literals are not tracked; a truncated span only weakens hint
/// recovery, never the resource match itself.
fn constructor_span(code: &str, open_idx: usize) -> &str {
    let mut depth = 0usize;
    for (i, b) in code.bytes().enumerate().skip(open_idx) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return &code[open_idx..=i];
                }
            }
            _ => {}
        }
    }
    &code[open_idx..]
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
