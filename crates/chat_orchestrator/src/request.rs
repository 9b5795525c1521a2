//! Outgoing request assembly.
//!
//! Prior transcript turns are role-mapped onto the wire (assistant ->
//! "model", user -> "user"); the new turn carries one inline-data part per
//! ready file followed by one text part holding the RAG preamble plus the
//! user's literal input.

use chat_core::{Message, RagSources, Role};
use gemini_client::{Content, Part, ROLE_MODEL, ROLE_USER};
use upload_manager::FileDescriptor;

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::User => ROLE_USER,
        Role::Assistant => ROLE_MODEL,
    }
}

/// The text part of the new turn: preamble (when any source is enabled)
/// prepended to the literal input.
fn prompt_text(rag: &RagSources, input: &str) -> String {
    match rag.context_preamble() {
        Some(preamble) => format!("{preamble}\n\n{input}"),
        None => input.to_string(),
    }
}

/// Assemble the full ordered content list for one turn.
pub fn build_contents(
    prior: &[Message],
    rag: &RagSources,
    input: &str,
    files: &[FileDescriptor],
) -> Vec<Content> {
    let mut contents: Vec<Content> = prior
        .iter()
        .map(|message| {
            Content::new(
                wire_role(message.role),
                vec![Part::text(message.content.clone())],
            )
        })
        .collect();

    let mut parts: Vec<Part> = files
        .iter()
        .map(|file| Part::inline_data(file.mime_type.clone(), file.data.clone()))
        .collect();
    parts.push(Part::text(prompt_text(rag, input)));
    contents.push(Content::new(ROLE_USER, parts));

    contents
}
