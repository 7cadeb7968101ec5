use std::sync::OnceLock;

use agentrt_domain::Decision;
use regex::Regex;

use crate::react::{ParserStyle, TextParser};

fn think_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<think>(.*?)</think>").unwrap())
}

fn reflection_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<reflection>(.*?)</reflection>").unwrap())
}

fn action_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<action>(.*?)</action>").unwrap())
}

/// Extracts `<think>`, `<reflection>`, and `<action>` elements. The
/// content of `<action>` is re-parsed through the same function-call /
/// JSON-action machinery the text parser uses, since models that emit
/// XML wrapper tags still write the call itself in one of those forms.
pub fn parse_xml_decision(text: &str, available_tools: &[String]) -> Option<Decision> {
    let action_body = action_tag().captures(text).map(|c| c.get(1).unwrap().as_str().to_string())?;
    let rationale = reflection_tag()
        .captures(text)
        .or_else(|| think_tag().captures(text))
        .map(|c| c.get(1).unwrap().as_str().trim().to_string());

    let inner = TextParser::new(ParserStyle::Default).parse(&format!("Action: {}", action_body.trim()), available_tools);
    match inner {
        Decision::Act { actions, .. } => Some(Decision::Act { actions, rationale }),
        other => Some(other),
    }
}
