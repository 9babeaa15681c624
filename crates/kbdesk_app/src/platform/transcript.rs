//! Export of the chat transcript as a standalone HTML page.

use std::path::PathBuf;

use kbdesk_core::{ChatTurn, Sender};
use kbdesk_engine::{render_bot_html, render_user_html, PersistError, StateDir};

pub const TRANSCRIPT_FILENAME: &str = "transcript.html";

pub fn transcript_html(session_id: &str, turns: &[ChatTurn]) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Chat ");
    out.push_str(&render_user_html(session_id));
    out.push_str("</title></head>\n<body>\n");
    for turn in turns {
        match turn.sender {
            Sender::User => {
                out.push_str("<div class=\"user-message\">");
                out.push_str(&render_user_html(&turn.text));
                out.push_str("</div>\n");
            }
            Sender::Bot => {
                out.push_str("<div class=\"bot-message\">");
                out.push_str(&render_bot_html(&turn.text));
                out.push_str("</div>\n");
            }
        }
    }
    out.push_str("</body>\n</html>\n");
    out
}

pub fn export_transcript(
    store: &StateDir,
    session_id: &str,
    turns: &[ChatTurn],
) -> Result<PathBuf, PersistError> {
    store.write_atomic(TRANSCRIPT_FILENAME, &transcript_html(session_id, turns))
}
