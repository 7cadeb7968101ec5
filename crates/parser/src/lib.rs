//! Converts raw LLM completion text into a typed [`Decision`], tolerating
//! the several shapes real models actually produce: a JSON object, a
//! ReAct-style `Thought/Action/Final Answer` block, or XML wrapper tags.
//! The entry point never panics and never returns an `Err` — a string
//! that matches none of the recognized forms still produces a `Decision`
//! (a synthesized `final`), because silence from the parser would stall
//! the engine with no way to recover.

pub mod json;
pub mod react;
pub mod scan;
pub mod tool_call;
pub mod xml;

use agentrt_domain::Decision;

pub use react::ParserStyle;

/// Parse one turn of raw model output into a [`Decision`].
///
/// Tries, in order: a JSON decision object anywhere in the text, then
/// XML `<action>` wrapper tags, then the ReAct-style text form. The
/// first flavor that recognizes a decision shape wins; none of them
/// error out on a non-match; they return `None` so the next flavor gets
/// a turn. If nothing recognizes the text at all, the ReAct/Default text
/// parser's own recovery rule applies (an action form if found, else a
/// synthesized final answer from the raw text).
pub fn parse(raw_text: &str, available_tool_names: &[String]) -> Decision {
    if let Some(decision) = json::parse_json_decision(raw_text, available_tool_names) {
        return decision;
    }
    if let Some(decision) = xml::parse_xml_decision(raw_text, available_tool_names) {
        return decision;
    }
    react::TextParser::new(ParserStyle::Default).parse(raw_text, available_tool_names)
}

/// Like [`parse`], but applies the ReAct-style priority order, checking
/// for a final answer before looking for an action invocation. Use this
/// for models known to emit `Thought:`/`Final Answer:` transcripts.
pub fn parse_react(raw_text: &str, available_tool_names: &[String]) -> Decision {
    if let Some(decision) = json::parse_json_decision(raw_text, available_tool_names) {
        return decision;
    }
    if let Some(decision) = xml::parse_xml_decision(raw_text, available_tool_names) {
        return decision;
    }
    react::TextParser::new(ParserStyle::ReAct).parse(raw_text, available_tool_names)
}
